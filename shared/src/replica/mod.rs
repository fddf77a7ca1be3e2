pub mod apply_diff;
pub mod change_tracker;
pub mod error;
pub mod gen_diff;
pub mod property_mutate;
pub mod replicator;

mod tracked_slot;
