use naia_replica_shared::ChangeTracker;

/// Builds an observer-side tracker with the same shape as `source`: same
/// schema, every slot at its default, nested trackers mirrored recursively.
pub fn mirror_of(source: &ChangeTracker) -> ChangeTracker {
    let mirror = ChangeTracker::new(source.schema());
    for name in source.tracked_names() {
        if let Some(child) = source.child(&name) {
            mirror.set(&name, mirror_of(&child));
        }
    }
    mirror
}
