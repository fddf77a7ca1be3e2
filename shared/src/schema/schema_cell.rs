use std::sync::{Arc, OnceLock};

use super::class_schema::ClassSchema;

/// Holds the schema of one type, built the first time it is needed.
///
/// Meant to live in a `static` next to the type it describes:
///
/// ```
/// # use std::sync::Arc;
/// # use naia_replica_shared::{ClassSchema, SchemaCell};
/// fn unit_schema() -> Arc<ClassSchema> {
///     static SCHEMA: SchemaCell = SchemaCell::new();
///     SCHEMA.get_or_build(|| ClassSchema::builder("Unit").property("hp", 100).build())
/// }
///
/// assert!(Arc::ptr_eq(&unit_schema(), &unit_schema()));
/// ```
pub struct SchemaCell {
    cell: OnceLock<Arc<ClassSchema>>,
}

impl SchemaCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Returns the schema, running `build` if this is the first request
    pub fn get_or_build<F>(&self, build: F) -> Arc<ClassSchema>
    where
        F: FnOnce() -> Arc<ClassSchema>,
    {
        Arc::clone(self.cell.get_or_init(build))
    }

    pub fn get(&self) -> Option<Arc<ClassSchema>> {
        self.cell.get().cloned()
    }

    pub fn is_built(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Default for SchemaCell {
    fn default() -> Self {
        Self::new()
    }
}
