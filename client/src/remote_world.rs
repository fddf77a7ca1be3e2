use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    hash::Hash,
};

use log::{debug, info, warn};

use naia_replica_shared::{ChangeTracker, DeltaPacket, Version, BASELINE_VERSION};

use crate::{AppliedWindow, ClientConfig, RemoteWorldError};

/// Observer side of replication: mirrors of remote roots, kept up to date by
/// merging delta packets in version order.
pub struct RemoteWorld<E: Copy + Eq + Hash + Debug + 'static> {
    config: ClientConfig,
    applied: Version,
    mirrors: HashMap<E, ChangeTracker>,
    buffered: BTreeMap<(Version, Version), DeltaPacket<E>>,
}

impl<E: Copy + Eq + Hash + Debug + 'static> RemoteWorld<E> {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            applied: BASELINE_VERSION,
            mirrors: HashMap::new(),
            buffered: BTreeMap::new(),
        }
    }

    /// Every mirror reflects the remote state as of this version. This is the
    /// version to acknowledge.
    pub fn applied_version(&self) -> Version {
        self.applied
    }

    pub fn buffered_len(&self) -> usize {
        self.buffered.len()
    }

    // Mirrors

    pub fn insert_mirror(&mut self, key: E, mirror: ChangeTracker) {
        if let Err(error) = self.try_insert_mirror(key, mirror) {
            warn!("{}: {:?}", error, key);
        }
    }

    pub fn try_insert_mirror(&mut self, key: E, mirror: ChangeTracker) -> Result<(), RemoteWorldError> {
        if self.mirrors.contains_key(&key) {
            return Err(RemoteWorldError::MirrorAlreadyInserted);
        }
        info!("inserted mirror {:?} ({})", key, mirror.schema().name());
        self.mirrors.insert(key, mirror);
        Ok(())
    }

    pub fn remove_mirror(&mut self, key: &E) -> Option<ChangeTracker> {
        let mirror = self.mirrors.remove(key)?;
        info!("removed mirror {:?}", key);
        Some(mirror)
    }

    pub fn mirror(&self, key: &E) -> Option<&ChangeTracker> {
        self.mirrors.get(key)
    }

    pub fn mirror_keys(&self) -> impl Iterator<Item = &E> {
        self.mirrors.keys()
    }

    // Packets

    /// Merges `packet` into the mirrors, or holds it until the window it
    /// builds on has been applied. Rejected packets are logged.
    pub fn receive_packet(&mut self, packet: DeltaPacket<E>) -> Vec<AppliedWindow<E>> {
        match self.try_receive_packet(packet) {
            Ok(applied) => applied,
            Err(error) => {
                warn!("{}", error);
                Vec::new()
            }
        }
    }

    /// Merges `packet` into the mirrors and returns every window applied as a
    /// result, in order.
    ///
    /// Diffs carry absolute values, so any window with
    /// `from <= applied < to` brings the mirrors to `to`. Windows starting
    /// later are buffered, and a full buffer drops the window farthest from
    /// the applied version. Windows ending at or before the applied version
    /// are stale.
    pub fn try_receive_packet(
        &mut self,
        packet: DeltaPacket<E>,
    ) -> Result<Vec<AppliedWindow<E>>, RemoteWorldError> {
        let (from, to) = (packet.from, packet.to);

        if to <= from {
            return Err(RemoteWorldError::BackwardsWindow { from, to });
        }
        if to <= self.applied {
            return Err(RemoteWorldError::StalePacket {
                from,
                to,
                applied: self.applied,
            });
        }
        if from > self.applied {
            self.buffer(packet);
            return Ok(Vec::new());
        }

        let mut applied = vec![self.apply(packet)];
        self.drain_buffered(&mut applied);
        Ok(applied)
    }

    fn buffer(&mut self, packet: DeltaPacket<E>) {
        debug!(
            "buffering window ({}, {}], applied up to {}",
            packet.from, packet.to, self.applied
        );
        self.buffered.insert((packet.from, packet.to), packet);

        // keep the windows nearest to the applied version, they drain first
        while self.buffered.len() > self.config.max_buffered_packets {
            if let Some(((from, to), _)) = self.buffered.pop_last() {
                warn!("packet buffer full, dropping window ({}, {}]", from, to);
            }
        }
    }

    fn drain_buffered(&mut self, applied: &mut Vec<AppliedWindow<E>>) {
        while let Some(&(from, to)) = self.buffered.keys().next() {
            if from > self.applied {
                break;
            }
            let Some(packet) = self.buffered.remove(&(from, to)) else {
                break;
            };
            if to <= self.applied {
                debug!("dropping buffered window ({}, {}], already covered", from, to);
                continue;
            }
            applied.push(self.apply(packet));
        }
    }

    fn apply(&mut self, packet: DeltaPacket<E>) -> AppliedWindow<E> {
        let mut window = AppliedWindow {
            from: packet.from,
            to: packet.to,
            reports: HashMap::new(),
            missing: Vec::new(),
        };

        for (key, diff) in packet.updates {
            match self.mirrors.get(&key) {
                Some(mirror) => {
                    window.reports.insert(key, mirror.apply_diff(&diff));
                }
                None => {
                    warn!("no mirror for {:?}, dropping its diff", key);
                    window.missing.push(key);
                }
            }
        }

        self.applied = packet.to;
        window
    }
}

impl<E: Copy + Eq + Hash + Debug + 'static> Default for RemoteWorld<E> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}
