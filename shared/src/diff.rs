use std::collections::BTreeMap;

use crate::Value;

/// Changed or still-needed values of one replica, keyed by property name.
/// Nested replicas appear as nested `Value::Map`s.
pub type DiffMap = BTreeMap<String, Value>;

/// Result of a diff generation over a version window
#[derive(Clone, Debug, PartialEq)]
pub enum Diff {
    /// Nothing in the window concerns this replica
    NoDifference,
    /// The replica was touched. The map may be empty when only a descendant
    /// was touched and that descendant had nothing to report.
    Changes(DiffMap),
}

impl Diff {
    pub fn is_no_difference(&self) -> bool {
        matches!(self, Diff::NoDifference)
    }

    pub fn changes(&self) -> Option<&DiffMap> {
        match self {
            Diff::NoDifference => None,
            Diff::Changes(map) => Some(map),
        }
    }

    pub fn into_changes(self) -> Option<DiffMap> {
        match self {
            Diff::NoDifference => None,
            Diff::Changes(map) => Some(map),
        }
    }

    /// Converts to the payload form nested under a parent's key
    pub fn into_value(self) -> Option<Value> {
        self.into_changes().map(Value::Map)
    }
}

impl From<DiffMap> for Diff {
    fn from(map: DiffMap) -> Self {
        Diff::Changes(map)
    }
}
