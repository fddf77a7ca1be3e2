use std::{fmt, sync::Arc};

use naia_replica_shared::{ChangeTracker, DiffMap, Value, Version, BASELINE_VERSION};

// ObserverKey
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct ObserverKey(u64);

impl ObserverKey {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

// ObserverRecord
pub(crate) struct ObserverRecord {
    pub acked: Version,
}

impl ObserverRecord {
    pub fn new() -> Self {
        Self {
            acked: BASELINE_VERSION,
        }
    }
}

// ObserverFilter
/// Sync condition deciding which observers receive a property. Attach it to
/// a property with `PropertyMark::with_sync_condition`, on a root or on any
/// tracker nested beneath one.
#[derive(Clone)]
pub struct ObserverFilter {
    accepts: Arc<dyn Fn(ObserverKey) -> bool + Send + Sync>,
}

impl ObserverFilter {
    pub fn new<F>(accepts: F) -> Self
    where
        F: Fn(ObserverKey) -> bool + Send + Sync + 'static,
    {
        Self {
            accepts: Arc::new(accepts),
        }
    }

    /// Only the listed observers receive the property
    pub fn only<I: IntoIterator<Item = ObserverKey>>(observers: I) -> Self {
        let observers: Vec<ObserverKey> = observers.into_iter().collect();
        Self::new(move |observer| observers.contains(&observer))
    }

    pub fn accepts(&self, observer: ObserverKey) -> bool {
        (self.accepts)(observer)
    }
}

impl fmt::Debug for ObserverFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ObserverFilter(..)")
    }
}

/// Drops the keys of `tracker`'s diff whose filter rejects `observer`, then
/// does the same inside the diffs of its nested trackers
pub(crate) fn filter_for_observer(tracker: &ChangeTracker, observer: ObserverKey, diff: &mut DiffMap) {
    let schema = tracker.schema();
    diff.retain(|key, _| {
        schema
            .mark(key)
            .and_then(|mark| mark.sync_condition())
            .and_then(|condition| condition.downcast_ref::<ObserverFilter>())
            .map_or(true, |filter| filter.accepts(observer))
    });

    for (key, payload) in diff.iter_mut() {
        let Value::Map(nested) = payload else {
            continue;
        };
        if let Some(child) = tracker.child(key) {
            filter_for_observer(&child, observer, nested);
        }
    }
}
