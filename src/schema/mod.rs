//! Inferred schema model and DDL generation

pub mod ddl;
pub mod types;

pub use ddl::{generate_ddl, map_sql_type, sanitize_name};
pub use types::{FieldMapping, InferredSchema, Srid};
