pub mod assertions;
pub mod mirror;
pub mod packet_exchange;
pub mod test_entity;

pub use mirror::mirror_of;
pub use packet_exchange::{Delivery, TestClient, TestSession};
pub use test_entity::TestEntity;
