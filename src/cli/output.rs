//! Output formatting for command results
//!
//! Every command result can be rendered as JSON, YAML or human-readable text.
//!
//! # Example
//!
//! ```
//! use easyapigis::cli::output::{OutputFormat, OutputFormatter, ProcessReport};
//! use easyapigis::pipeline::PipelineSnapshot;
//!
//! let snapshot = PipelineSnapshot::default();
//! let report = ProcessReport::new("https://example.com/layer.json", &snapshot);
//! let output = OutputFormatter::new(OutputFormat::Json).format_process(&report).unwrap();
//! assert!(output.contains("\"state\": \"IDLE\""));
//! ```

use anyhow::{Context, Result};
use serde::Serialize;

use crate::collaborator::HealthResponse;
use crate::pipeline::PipelineSnapshot;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Machine-readable
    Json,
    Yaml,
    /// Formatted text for terminals
    Human,
}

/// Result of one `process` run
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport<'a> {
    pub source_url: &'a str,

    #[serde(flatten)]
    pub snapshot: &'a PipelineSnapshot,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddl: Option<String>,
}

impl<'a> ProcessReport<'a> {
    pub fn new(source_url: &'a str, snapshot: &'a PipelineSnapshot) -> Self {
        Self {
            source_url,
            snapshot,
            ddl: None,
        }
    }

    pub fn with_ddl(mut self, ddl: String) -> Self {
        self.ddl = Some(ddl);
        self
    }
}

/// Outcome of a middleware health check
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub endpoint: String,
    pub available: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthResponse>,
}

impl HealthStatus {
    pub fn new(endpoint: impl Into<String>, details: Option<HealthResponse>) -> Self {
        let available = details.as_ref().is_some_and(HealthResponse::is_online);
        Self {
            endpoint: endpoint.into(),
            available,
            details,
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_process(&self, report: &ProcessReport<'_>) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize process result to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize process result to YAML")
            }
            OutputFormat::Human => self.format_process_human(report),
        }
    }

    pub fn format_health(&self, status: &HealthStatus) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(status)
                .context("Failed to serialize health status to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(status).context("Failed to serialize health status to YAML")
            }
            OutputFormat::Human => Ok(self.format_health_human(status)),
        }
    }

    fn format_process_human(&self, report: &ProcessReport<'_>) -> Result<String> {
        let snapshot = report.snapshot;
        let mut output = String::new();

        if snapshot.is_done() {
            output.push_str("\u{2713} Schema Inferred\n");
        } else {
            output.push_str("\u{2717} Processing Failed\n");
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Source:  {}\n", report.source_url));
        output.push_str(&format!("State:   {}\n", snapshot.state));

        if let Some(ref error) = snapshot.error {
            output.push_str(&format!("Error:   {}\n", error));
        }

        if let Some(ref schema) = snapshot.schema {
            output.push_str(&format!("\nGeometry: {}\n", schema.geometry_type));
            output.push_str(&format!("SRID:     {}\n", schema.srid));
            if let Some(ref geometry_field) = schema.geometry_field {
                output.push_str(&format!("Geometry Field: {}\n", geometry_field));
            }

            output.push_str("\nFields:\n");
            if schema.fields.is_empty() {
                output.push_str("\u{2514}\u{2500} (none)\n");
            }
            for (i, field) in schema.fields.iter().enumerate() {
                let connector = if i == schema.fields.len() - 1 {
                    "\u{2514}"
                } else {
                    "\u{251C}"
                };
                output.push_str(&format!(
                    "{}\u{2500} {} \u{2192} {} ({})\n",
                    connector, field.original_name, field.target_name, field.field_type
                ));
            }
        }

        if let Some(ref sample) = snapshot.sample {
            let pretty =
                serde_json::to_string_pretty(sample).context("Failed to render sample")?;
            output.push_str("\nSample:\n");
            output.push_str(&pretty);
            output.push('\n');
        }

        if let Some(ref ddl) = report.ddl {
            output.push_str("\nDDL:\n");
            output.push_str(ddl);
        }

        Ok(output)
    }

    fn format_health_human(&self, status: &HealthStatus) -> String {
        let mut output = String::new();

        output.push_str("Middleware Health Status\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        let symbol = if status.available { "\u{2713}" } else { "\u{2717}" };
        output.push_str(&format!("{} {}\n", symbol, status.endpoint));
        output.push_str(&format!(
            "  Status: {}\n",
            if status.available { "Online" } else { "Offline" }
        ));

        if let Some(ref details) = status.details {
            if let Some(ref version) = details.duckdb_version {
                output.push_str(&format!("  DuckDB: {}\n", version));
            }
            if let Some(ref message) = details.message {
                output.push_str(&format!("  Message: {}\n", message));
            }
        }

        output
    }
}
