use thiserror::Error;

/// Problems found while building a ClassSchema. None of them are fatal:
/// the offending entry is logged and left out of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A property was registered, but the type does not declare a field with that name
    #[error("Schema {schema} registers property `{property}`, but the type declares no such field. Entry skipped")]
    MissingDescriptor { schema: String, property: String },
}
