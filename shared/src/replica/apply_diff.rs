use std::collections::BTreeMap;

use log::{trace, warn};

use crate::{DiffMap, Value};

use super::{
    change_tracker::ChangeTracker,
    error::{join_path, DeltaError},
    replicator::Data,
};

// ApplyReport
/// Outcome of merging one diff into a live object. Dropped keys are logged
/// as they happen and kept here for callers that want to inspect them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: usize,
    pub remote_calls: usize,
    pub skipped: Vec<DeltaError>,
}

impl ApplyReport {
    pub(crate) fn not_structured(path: &str) -> Self {
        let mut report = Self::default();
        report.skip(DeltaError::NotStructured {
            path: path.to_string(),
        });
        report
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    pub(crate) fn skip(&mut self, error: DeltaError) {
        warn!("{}", error);
        self.skipped.push(error);
    }

    /// Folds in the report of a nested object found at `prefix`
    pub fn absorb(&mut self, prefix: &str, other: ApplyReport) {
        self.applied += other.applied;
        self.remote_calls += other.remote_calls;
        self.skipped.extend(
            other
                .skipped
                .into_iter()
                .map(|error| error.prefixed(prefix)),
        );
    }
}

/// Merges `diff` key by key into the plain graph `root`
pub fn apply_delta(diff: &DiffMap, root: &mut Value) -> ApplyReport {
    let mut report = ApplyReport::default();
    match root {
        Value::Map(map) => merge_map(map, diff, "", &mut report),
        _ => report.skip(DeltaError::NotStructured {
            path: String::new(),
        }),
    }
    report
}

fn merge_map(
    target: &mut BTreeMap<String, Value>,
    diff: &DiffMap,
    prefix: &str,
    report: &mut ApplyReport,
) {
    for (key, payload) in diff {
        let path = join_path(prefix, key);
        match payload {
            Value::Map(nested) => match target.get_mut(key) {
                Some(Value::Map(existing)) => merge_map(existing, nested, &path, report),
                Some(_) => report.skip(DeltaError::StructuralMismatch { path }),
                None => report.skip(DeltaError::UnknownProperty { path }),
            },
            _ => {
                target.insert(key.clone(), payload.clone());
                report.applied += 1;
            }
        }
    }
}

impl ChangeTracker {
    /// Merges an incoming diff into this tracker and its nested replicas.
    ///
    /// Leaf values go through `set`, so applying is itself tracked. Keys
    /// naming a remote call invoke it with the payload. Keys that cannot be
    /// applied are skipped and reported.
    pub fn apply_diff(&self, diff: &DiffMap) -> ApplyReport {
        let mut report = ApplyReport::default();
        let schema = self.schema();

        for (key, payload) in diff {
            if let Some(call) = schema.remote_call(key) {
                call(self, payload);
                report.remote_calls += 1;
                continue;
            }

            let Some(current) = self.get(key) else {
                report.skip(DeltaError::UnknownProperty { path: key.clone() });
                continue;
            };

            match (current, payload) {
                (Data::Child(child), Value::Map(_)) => {
                    let nested = child.apply_diff(payload);
                    report.absorb(key, nested);
                }
                (Data::Child(_), Value::Null) => {
                    trace!(
                        "{}: null payload for nested replica `{}` ignored",
                        schema.name(),
                        key
                    );
                }
                (Data::Child(_), _) => {
                    report.skip(DeltaError::StructuralMismatch { path: key.clone() })
                }
                (Data::Plain(Value::Map(mut existing)), Value::Map(nested)) => {
                    merge_map(&mut existing, nested, key, &mut report);
                    self.set(key, Value::Map(existing));
                }
                (Data::Plain(_), Value::Map(_)) => {
                    report.skip(DeltaError::StructuralMismatch { path: key.clone() })
                }
                (Data::Plain(_), _) => {
                    self.set(key, payload.clone());
                    report.applied += 1;
                }
            }
        }

        report
    }
}
