use thiserror::Error;

/// Errors returned by `ChangeTracker::try_set`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The property is not tracked by the tracker's schema
    #[error("Schema {schema} does not track property `{property}`")]
    UnknownProperty { schema: String, property: String },

    /// A replica was assigned somewhere beneath itself
    #[error("Cannot assign a replica to `{property}` of {schema}: the replica is this tracker or one of its ancestors")]
    CyclicAssignment { schema: String, property: String },
}

/// A key dropped while applying a diff. These are collected into an
/// `ApplyReport` and logged, never returned as failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeltaError {
    /// The payload is a mapping but the live value at `path` is not structured
    #[error("Structural mismatch at `{path}`: diff carries a mapping, live value is not structured. Key dropped")]
    StructuralMismatch { path: String },

    /// The live target has no property at `path`
    #[error("No property at `{path}` on the live target. Key dropped")]
    UnknownProperty { path: String },

    /// The diff or the live target at `path` is not a mapping at all
    #[error("Cannot merge into `{path}`: expected a mapping")]
    NotStructured { path: String },
}

impl DeltaError {
    pub fn path(&self) -> &str {
        match self {
            DeltaError::StructuralMismatch { path }
            | DeltaError::UnknownProperty { path }
            | DeltaError::NotStructured { path } => path,
        }
    }

    /// Re-roots the error under `prefix`
    pub fn prefixed(self, prefix: &str) -> Self {
        let join = |path: String| join_path(prefix, &path);
        match self {
            DeltaError::StructuralMismatch { path } => DeltaError::StructuralMismatch { path: join(path) },
            DeltaError::UnknownProperty { path } => DeltaError::UnknownProperty { path: join(path) },
            DeltaError::NotStructured { path } => DeltaError::NotStructured { path: join(path) },
        }
    }
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    match (prefix.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}.{}", prefix, key),
    }
}
