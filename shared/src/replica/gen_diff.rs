use log::debug;

use crate::{
    types::{observer_lacks, Version},
    Diff, DiffMap,
};

use super::{
    change_tracker::ChangeTracker,
    replicator::{Data, ReplicaRef},
};

impl ChangeTracker {
    /// Builds the changes an observer that has seen `from` needs to reach `to`.
    ///
    /// Dirty slots are always included and get stamped with `to`. Clean slots
    /// are included when stamped after `from`, or when `from` is the
    /// baseline. Nested replicas contribute their own diff under their key.
    /// Returns `Diff::NoDifference` when nothing concerns the observer.
    pub fn gen_diff(&self, from: Version, to: Version) -> Diff {
        if to < from {
            debug!(
                "{}: diff window ({}, {}] runs backwards, nothing to report",
                self.schema().name(),
                from,
                to
            );
            return Diff::NoDifference;
        }

        let mut output = DiffMap::new();
        let mut children: Vec<(String, ReplicaRef)> = Vec::new();

        {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;

            if !inner.dirty && inner.version <= from {
                return Diff::NoDifference;
            }

            let mut stamped = false;
            for (name, slot) in inner.slots.iter_mut() {
                let include = if slot.dirty {
                    slot.stamp(to);
                    stamped = true;
                    true
                } else {
                    observer_lacks(slot.version, from)
                };
                if !include {
                    continue;
                }
                match &slot.data {
                    Data::Plain(value) => {
                        output.insert(name.clone(), value.clone());
                    }
                    Data::Child(child) => children.push((name.clone(), child.clone())),
                }
            }

            if stamped {
                inner.version = inner.version.max(to);
            }
            inner.dirty = false;
            inner.pending_notify = false;
            inner.last_diff_version = inner.last_diff_version.max(to);
        }

        // children are visited with this tracker released, they may look back up
        for (name, child) in children {
            if let Some(payload) = child.gen_diff(from, to).into_value() {
                output.insert(name, payload);
            }
        }

        Diff::Changes(output)
    }
}
