use crate::types::{Version, BASELINE_VERSION};

use super::replicator::Data;

// TrackedSlot
/// Current value of one tracked property and the version it was last stamped at
pub(crate) struct TrackedSlot {
    pub data: Data,
    pub version: Version,
    pub dirty: bool,
}

impl TrackedSlot {
    pub fn seeded(data: Data) -> Self {
        Self {
            data,
            version: BASELINE_VERSION,
            dirty: false,
        }
    }

    /// Clears the dirty flag, stamping the slot with `to`
    pub fn stamp(&mut self, to: Version) {
        self.dirty = false;
        self.version = self.version.max(to);
    }
}
