//! Prompts for LLM-based schema inference

use serde_json::Value;

/// System prompt for schema inference
pub const SYSTEM_PROMPT: &str =
    "You are a GIS and data engineering expert. Reply ONLY with valid JSON.";

/// SQL types the model may choose from
pub const ALLOWED_SQL_TYPES: &[&str] = &[
    "TEXT",
    "INTEGER",
    "FLOAT",
    "TIMESTAMP",
    "BOOLEAN",
    "GEOMETRY",
];

/// Builds the user prompt embedding the pretty-printed sample
pub fn build_inference_prompt(sample: &Value) -> String {
    let pretty = serde_json::to_string_pretty(sample).unwrap_or_else(|_| sample.to_string());

    format!(
        r#"Analyze this JSON data sample:
{sample}

Task:
1. Identify geometry fields (lat, lon, wkt, geojson).
2. Identify the SRID (4326 for lat/lon).
3. Suggest SQL column names (snake_case).
4. SQL types: {types}.

Return ONLY a JSON object with this exact structure, without explanations:
{{
    "geometry_field": "original_field_name",
    "geometry_type": "POINT/POLYGON",
    "srid": 4326,
    "fields": [
        {{ "original_name": "nm_x", "target_name": "name_x", "type": "TEXT" }}
    ]
}}"#,
        sample = pretty,
        types = ALLOWED_SQL_TYPES.join(", ")
    )
}
