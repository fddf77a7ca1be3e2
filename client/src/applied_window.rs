use std::{collections::HashMap, hash::Hash};

use naia_replica_shared::{ApplyReport, Version};

// AppliedWindow
/// One packet merged into the mirrors
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedWindow<E: Eq + Hash> {
    pub from: Version,
    pub to: Version,
    /// What happened to each mirror the packet touched
    pub reports: HashMap<E, ApplyReport>,
    /// Keys in the packet with no mirror on this side
    pub missing: Vec<E>,
}

impl<E: Eq + Hash> AppliedWindow<E> {
    pub fn updated(&self) -> impl Iterator<Item = &E> {
        self.reports
            .iter()
            .filter(|(_, report)| report.applied > 0 || report.remote_calls > 0)
            .map(|(key, _)| key)
    }

    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.reports.values().all(ApplyReport::is_clean)
    }
}
