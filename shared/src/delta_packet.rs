use std::{collections::HashMap, hash::Hash};

use crate::{types::Version, DiffMap};

cfg_if! {
    if #[cfg(feature = "serde_support")] {
        use serde::{Deserialize, Serialize};
    }
}

// DeltaPacket
/// One window of diffs for a set of replicated roots, keyed by the
/// transport's identity for each root
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct DeltaPacket<E: Eq + Hash> {
    pub from: Version,
    pub to: Version,
    pub updates: HashMap<E, DiffMap>,
}

impl<E: Eq + Hash> DeltaPacket<E> {
    pub fn new(from: Version, to: Version) -> Self {
        Self {
            from,
            to,
            updates: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: E, diff: DiffMap) {
        self.updates.insert(key, diff);
    }

    pub fn get(&self, key: &E) -> Option<&DiffMap> {
        self.updates.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }
}
