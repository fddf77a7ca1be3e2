use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    fmt::Debug,
    hash::Hash,
    rc::Rc,
};

use log::{debug, info, warn};

use naia_replica_shared::{
    ChangeTracker, DeltaPacket, Diff, PropertyMutator, Version, BASELINE_VERSION,
};

use crate::{
    error::HostWorldError,
    observer::{filter_for_observer, ObserverKey, ObserverRecord},
    root_mutator::RootMutator,
    ServerConfig,
};

/// Authority side of replication. Owns the replicated roots, advances one
/// version per round, and builds each observer's delta packet from the
/// version that observer last acknowledged.
pub struct HostWorld<E: Copy + Eq + Hash + Debug + 'static> {
    config: ServerConfig,
    round: Version,
    roots: HashMap<E, ChangeTracker>,
    changed: Rc<RefCell<HashSet<E>>>,
    observers: HashMap<ObserverKey, ObserverRecord>,
    next_observer: u64,
}

impl<E: Copy + Eq + Hash + Debug + 'static> HostWorld<E> {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            round: BASELINE_VERSION,
            roots: HashMap::new(),
            changed: Rc::new(RefCell::new(HashSet::new())),
            observers: HashMap::new(),
            next_observer: 0,
        }
    }

    /// The version of the most recent round
    pub fn round(&self) -> Version {
        self.round
    }

    // Roots

    /// Registers `tracker` as a replicated root. Logs and ignores a key that
    /// is already taken.
    pub fn register_root(&mut self, key: E, tracker: ChangeTracker) {
        if let Err(error) = self.try_register_root(key, tracker) {
            warn!("{}: {:?}", error, key);
        }
    }

    pub fn try_register_root(&mut self, key: E, tracker: ChangeTracker) -> Result<(), HostWorldError> {
        if self.roots.contains_key(&key) {
            return Err(HostWorldError::RootAlreadyRegistered);
        }
        if tracker.parent().is_some() {
            warn!(
                "root {:?} ({}) is nested in another tracker, its changes will also reach that parent",
                key,
                tracker.schema().name()
            );
        }

        tracker.set_mutator(PropertyMutator::new(RootMutator::new(key, &self.changed)));
        // seeded values were relayed before the mutator existed
        if tracker.is_dirty() {
            self.changed.borrow_mut().insert(key);
        }

        info!("registered root {:?} ({})", key, tracker.schema().name());
        self.roots.insert(key, tracker);
        Ok(())
    }

    pub fn deregister_root(&mut self, key: &E) -> Option<ChangeTracker> {
        let tracker = self.roots.remove(key)?;
        tracker.clear_mutator();
        self.changed.borrow_mut().remove(key);
        info!("deregistered root {:?}", key);
        Some(tracker)
    }

    pub fn root(&self, key: &E) -> Option<&ChangeTracker> {
        self.roots.get(key)
    }

    pub fn root_keys(&self) -> impl Iterator<Item = &E> {
        self.roots.keys()
    }

    /// Whether any root changed since the last round
    pub fn has_changes(&self) -> bool {
        !self.changed.borrow().is_empty()
    }

    // Observers

    pub fn add_observer(&mut self) -> ObserverKey {
        let key = ObserverKey::new(self.next_observer);
        self.next_observer += 1;
        self.observers.insert(key, ObserverRecord::new());
        info!("added observer {:?}", key);
        key
    }

    pub fn remove_observer(&mut self, observer: &ObserverKey) -> bool {
        let removed = self.observers.remove(observer).is_some();
        if removed {
            info!("removed observer {:?}", observer);
        }
        removed
    }

    pub fn observer_keys(&self) -> impl Iterator<Item = &ObserverKey> {
        self.observers.keys()
    }

    /// The last version `observer` acknowledged
    pub fn observer_acked(&self, observer: &ObserverKey) -> Option<Version> {
        self.observers.get(observer).map(|record| record.acked)
    }

    /// Sends the observer a full window from the baseline next round
    pub fn resync_observer(&mut self, observer: &ObserverKey) {
        if let Err(error) = self.try_resync_observer(observer) {
            warn!("{}", error);
        }
    }

    pub fn try_resync_observer(&mut self, observer: &ObserverKey) -> Result<(), HostWorldError> {
        let record = self
            .observers
            .get_mut(observer)
            .ok_or(HostWorldError::NoSuchObserver {
                observer: *observer,
            })?;
        record.acked = BASELINE_VERSION;
        info!("observer {:?} will be resynced from the baseline", observer);
        Ok(())
    }

    /// Records that `observer` has applied everything up to `version`
    pub fn ack(&mut self, observer: &ObserverKey, version: Version) {
        if let Err(error) = self.try_ack(observer, version) {
            warn!("{}", error);
        }
    }

    pub fn try_ack(&mut self, observer: &ObserverKey, version: Version) -> Result<(), HostWorldError> {
        let round = self.round;
        let record = self
            .observers
            .get_mut(observer)
            .ok_or(HostWorldError::NoSuchObserver {
                observer: *observer,
            })?;

        if version > round {
            return Err(HostWorldError::FutureAck {
                observer: *observer,
                version,
                round,
            });
        }
        if version < record.acked {
            debug!(
                "observer {:?} acked {} after already acking {}, ignoring",
                observer, version, record.acked
            );
            return Ok(());
        }
        record.acked = version;
        Ok(())
    }

    // Rounds

    /// Closes the current round and returns one packet per observer that is
    /// behind it.
    ///
    /// The round only advances when some root changed, unless
    /// `advance_idle_rounds` is set. Observers still behind an unchanged round
    /// get the same window again until they acknowledge it.
    pub fn send_round(&mut self) -> Vec<(ObserverKey, DeltaPacket<E>)> {
        let changed: Vec<E> = self.changed.borrow_mut().drain().collect();
        let dirty = !changed.is_empty() || self.roots.values().any(ChangeTracker::is_dirty);
        if dirty || self.config.advance_idle_rounds {
            self.round += 1;
            debug!("round {} ({} roots changed)", self.round, changed.len());
        }
        let to = self.round;

        if let Some(limit) = self.config.resync_after_rounds {
            for (key, record) in self.observers.iter_mut() {
                if record.acked != BASELINE_VERSION && to - record.acked > limit {
                    info!(
                        "observer {:?} is {} rounds behind, resyncing from the baseline",
                        key,
                        to - record.acked
                    );
                    record.acked = BASELINE_VERSION;
                }
            }
        }

        let mut observers: Vec<(ObserverKey, Version)> = self
            .observers
            .iter()
            .filter(|(_, record)| record.acked < to)
            .map(|(key, record)| (*key, record.acked))
            .collect();
        observers.sort();

        let mut output = Vec::with_capacity(observers.len());
        for (observer, from) in observers {
            let mut packet = DeltaPacket::new(from, to);
            for (key, tracker) in &self.roots {
                let Diff::Changes(mut diff) = tracker.gen_diff(from, to) else {
                    continue;
                };
                filter_for_observer(tracker, observer, &mut diff);
                packet.insert(*key, diff);
            }
            output.push((observer, packet));
        }

        output
    }
}

impl<E: Copy + Eq + Hash + Debug + 'static> Default for HostWorld<E> {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}
