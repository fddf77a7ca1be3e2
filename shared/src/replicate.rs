use std::{cell::OnceCell, fmt, sync::Arc};

use crate::{
    replica::{change_tracker::ChangeTracker, replicator::Data},
    schema::class_schema::ClassSchema,
    types::Version,
    Diff,
};

/// A user type whose instances can be replicated.
///
/// The tracker is created on first use and lives in the instance's
/// [`TrackerCell`]. A nested replicated field reports its own tracker from
/// `raw_values` (via [`tracker_of`]) so that it gets linked to its parent.
pub trait Replicate {
    fn schema(&self) -> Arc<ClassSchema>;

    fn tracker_cell(&self) -> &TrackerCell;

    /// Current values of the instance's declared fields, read once when the
    /// tracker is created
    fn raw_values(&self) -> Vec<(&'static str, Data)>;
}

// TrackerCell
#[derive(Default)]
pub struct TrackerCell {
    cell: OnceCell<ChangeTracker>,
}

impl TrackerCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Option<&ChangeTracker> {
        self.cell.get()
    }
}

impl fmt::Debug for TrackerCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerCell")
            .field("created", &self.cell.get().is_some())
            .finish()
    }
}

/// Returns the instance's tracker, creating and seeding it on first use
pub fn tracker_of<R: Replicate + ?Sized>(instance: &R) -> ChangeTracker {
    instance
        .tracker_cell()
        .cell
        .get_or_init(|| ChangeTracker::with_values(instance.schema(), instance.raw_values()))
        .clone()
}

/// Changes of the graph rooted at `root` for the window `(from, to]`
pub fn compute_delta<R: Replicate + ?Sized>(root: &R, from: Version, to: Version) -> Diff {
    tracker_of(root).gen_diff(from, to)
}
