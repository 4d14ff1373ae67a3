//! PostGIS DDL generation from an inferred schema
//!
//! The statement targets the `layers` schema and always appends a typed
//! `geom` column built from the inferred geometry type and SRID.

use super::types::InferredSchema;
use regex::Regex;
use std::sync::OnceLock;

/// Schema that holds user layers
pub const LAYERS_SCHEMA: &str = "layers";

const DEFAULT_GEOMETRY_TYPE: &str = "POINT";

fn separator_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s-]").expect("static regex"))
}

fn disallowed_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_]").expect("static regex"))
}

/// Reduces an identifier to `[a-z0-9_]`, safe to splice into SQL
///
/// Whitespace and hyphens become underscores, everything else outside the
/// allowed set is dropped, and a leading digit gets a `t_` prefix.
pub fn sanitize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let underscored = separator_pattern().replace_all(&lowered, "_");
    let clean = disallowed_pattern().replace_all(&underscored, "").into_owned();

    match clean.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("t_{}", clean),
        _ => clean,
    }
}

/// Maps a loosely-typed inference tag onto a PostgreSQL column type
pub fn map_sql_type(raw: &str) -> &'static str {
    let upper = raw.to_uppercase();

    if upper.contains("INT") {
        "INTEGER"
    } else if upper.contains("FLOAT") || upper.contains("DOUBLE") {
        "DOUBLE PRECISION"
    } else if upper.contains("BOOL") {
        "BOOLEAN"
    } else if upper.contains("TIME") || upper.contains("DATE") {
        "TIMESTAMP"
    } else {
        "TEXT"
    }
}

/// Builds a `CREATE TABLE IF NOT EXISTS` statement for the given layer
pub fn generate_ddl(table_name: &str, schema: &InferredSchema) -> String {
    let safe_table = sanitize_name(table_name);

    let mut columns: Vec<String> = schema
        .fields
        .iter()
        .map(|field| {
            format!(
                "{} {}",
                sanitize_name(&field.target_name),
                map_sql_type(&field.field_type)
            )
        })
        .collect();

    let geometry_type = match schema.geometry_type.trim() {
        "" => DEFAULT_GEOMETRY_TYPE.to_string(),
        other => sanitize_name(other).to_uppercase(),
    };
    let srid = schema
        .srid
        .code()
        .map(|code| code.to_string())
        .unwrap_or_else(|| "4326".to_string());

    columns.push(format!("geom GEOMETRY({}, {})", geometry_type, srid));

    format!(
        "CREATE TABLE IF NOT EXISTS {}.{} (\n    id SERIAL PRIMARY KEY,\n    {}\n);\n",
        LAYERS_SCHEMA,
        safe_table,
        columns.join(",\n    ")
    )
}
