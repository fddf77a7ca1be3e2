/// A synchronization round. Rounds only ever increase.
pub type Version = u64;

/// The round every observer starts from: it knows the schema defaults and nothing else.
pub const BASELINE_VERSION: Version = 0;

/// Whether an observer that acknowledged `acked` still needs a slot stamped at
/// `slot_version`. Observers at the baseline need every slot of a tracker that
/// has diverged from its defaults.
pub fn observer_lacks(slot_version: Version, acked: Version) -> bool {
    acked == BASELINE_VERSION || slot_version > acked
}
