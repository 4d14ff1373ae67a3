//! Inferred schema types
//!
//! These types describe the target layout proposed by the inference service for
//! a sampled dataset: which geometry it carries, in which spatial reference, and
//! how each source attribute maps onto a destination column.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Spatial Reference Identifier as returned by the inference service
///
/// Services reply with either a bare EPSG code (`4326`) or a textual form
/// (`"EPSG:4326"`, `"4674"`), so both are accepted and kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Srid {
    Code(i64),
    Text(String),
}

impl Srid {
    /// Numeric EPSG code, when one can be read from the value
    pub fn code(&self) -> Option<i64> {
        match self {
            Srid::Code(code) => Some(*code),
            Srid::Text(text) => {
                let trimmed = text.trim();
                let digits = trimmed
                    .rsplit(':')
                    .next()
                    .unwrap_or(trimmed)
                    .trim();
                digits.parse().ok()
            }
        }
    }
}

impl Default for Srid {
    fn default() -> Self {
        Srid::Code(4326)
    }
}

impl fmt::Display for Srid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Srid::Code(code) => write!(f, "{}", code),
            Srid::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Proposed mapping of one source attribute to a destination column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Attribute name as found in the sample
    pub original_name: String,
    /// Suggested destination column name
    pub target_name: String,
    /// Suggested destination type (TEXT, INTEGER, FLOAT, ...)
    #[serde(rename = "type")]
    pub field_type: String,
}

impl FieldMapping {
    pub fn new(
        original_name: impl Into<String>,
        target_name: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            target_name: target_name.into(),
            field_type: field_type.into(),
        }
    }
}

/// Structured result of schema inference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredSchema {
    /// Geometry tag such as `POINT` or `POLYGON`
    pub geometry_type: String,

    /// Spatial reference of the geometry
    pub srid: Srid,

    /// Ordered field mappings
    pub fields: Vec<FieldMapping>,

    /// Source attribute carrying the geometry, when the service names one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_field: Option<String>,
}

impl InferredSchema {
    pub fn new(geometry_type: impl Into<String>, srid: Srid, fields: Vec<FieldMapping>) -> Self {
        Self {
            geometry_type: geometry_type.into(),
            srid,
            fields,
            geometry_field: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_numeric_srid() {
        let schema: InferredSchema = serde_json::from_value(json!({
            "geometry_type": "POINT",
            "srid": 4326,
            "fields": [
                { "original_name": "nm_mun", "target_name": "nome_municipio", "type": "TEXT" }
            ]
        }))
        .unwrap();

        assert_eq!(schema.srid, Srid::Code(4326));
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields[0].field_type, "TEXT");
        assert!(schema.geometry_field.is_none());
    }

    #[test]
    fn test_deserialize_text_srid() {
        let schema: InferredSchema = serde_json::from_value(json!({
            "geometry_type": "POLYGON",
            "srid": "EPSG:4674",
            "fields": [],
            "geometry_field": "geometry"
        }))
        .unwrap();

        assert_eq!(schema.srid, Srid::Text("EPSG:4674".to_string()));
        assert_eq!(schema.srid.code(), Some(4674));
        assert_eq!(schema.geometry_field.as_deref(), Some("geometry"));
    }

    #[test]
    fn test_srid_code_unparseable() {
        assert_eq!(Srid::Text("unknown".to_string()).code(), None);
        assert_eq!(Srid::Text(" 31983 ".to_string()).code(), Some(31983));
    }

    #[test]
    fn test_field_type_serializes_as_type() {
        let field = FieldMapping::new("lat", "latitude", "FLOAT");
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "FLOAT");
        assert!(value.get("field_type").is_none());
    }

    #[test]
    fn test_missing_fields_is_rejected() {
        let result: Result<InferredSchema, _> = serde_json::from_value(json!({
            "geometry_type": "POINT",
            "srid": 4326
        }));
        assert!(result.is_err());
    }
}
