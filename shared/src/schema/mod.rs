pub mod class_schema;
pub mod error;
pub mod property_mark;
pub mod schema_cell;
