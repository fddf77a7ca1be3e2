// TestEntity - Simple u64-based entity
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct TestEntity(u64);

impl TestEntity {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}
