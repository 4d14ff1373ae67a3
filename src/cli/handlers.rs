//! Command handlers
//!
//! Each handler runs one subcommand to completion and returns the process
//! exit code. Errors are logged and printed to stderr here rather than
//! propagated to `main`.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use super::commands::{DdlArgs, HealthArgs, ProcessArgs};
use super::output::{HealthStatus, OutputFormat, OutputFormatter, ProcessReport};
use crate::config::{EasyApiGisConfig, ExecutionMode};
use crate::schema::{generate_ddl, InferredSchema};

pub async fn handle_process(args: &ProcessArgs, quiet: bool) -> i32 {
    match run_process(args, quiet).await {
        Ok(done) => {
            if done {
                0
            } else {
                1
            }
        }
        Err(e) => {
            error!("Process failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

async fn run_process(args: &ProcessArgs, quiet: bool) -> Result<bool> {
    let config = config_for_process(args);
    config.validate().context("Invalid configuration")?;
    debug!("{}", config);

    let mode = if args.local {
        ExecutionMode::Local
    } else {
        ExecutionMode::Proxy
    };
    let controller = config
        .create_controller(mode)
        .context("Failed to set up pipeline")?;

    if !quiet {
        info!(?mode, "Processing {}", args.url);
    }

    let snapshot = controller.process(&args.url).await?;

    let mut report = ProcessReport::new(&args.url, &snapshot);
    if let (Some(table), Some(schema)) = (&args.ddl, &snapshot.schema) {
        report = report.with_ddl(generate_ddl(table, schema));
    }

    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    let output = formatter.format_process(&report)?;
    write_output(&output, args.output.as_deref())?;

    Ok(snapshot.is_done())
}

fn config_for_process(args: &ProcessArgs) -> EasyApiGisConfig {
    let mut config = EasyApiGisConfig::default();

    if let Some(ref endpoint) = args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(provider) = args.backend {
        config.provider = provider;
    }
    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }

    config
}

pub async fn handle_health(args: &HealthArgs) -> i32 {
    match run_health(args).await {
        Ok(available) => {
            if available {
                0
            } else {
                1
            }
        }
        Err(e) => {
            error!("Health check failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

async fn run_health(args: &HealthArgs) -> Result<bool> {
    let mut config = EasyApiGisConfig::default();
    if let Some(ref endpoint) = args.endpoint {
        config.endpoint = endpoint.clone();
    }
    config.validate().context("Invalid configuration")?;

    let client = config.create_proxy_client()?;
    let details = match client.health_check().await {
        Ok(details) => details,
        Err(e) => {
            debug!("Health endpoint returned an error: {}", e);
            None
        }
    };

    let status = HealthStatus::new(client.endpoint(), details);
    let output = OutputFormatter::new(OutputFormat::from(args.format)).format_health(&status)?;
    println!("{}", output);

    Ok(status.available)
}

pub async fn handle_ddl(args: &DdlArgs) -> i32 {
    match run_ddl(args) {
        Ok(()) => 0,
        Err(e) => {
            error!("DDL generation failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn run_ddl(args: &DdlArgs) -> Result<()> {
    let schema = read_schema(&args.schema_file)?;
    let ddl = generate_ddl(&args.table, &schema);
    write_output(&ddl, args.output.as_deref())
}

/// Loads a saved schema, accepting JSON or YAML
pub fn read_schema(path: &Path) -> Result<InferredSchema> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON schema in {}", path.display()))
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid schema in {}", path.display()))
    }
}

fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output written to {}", path.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn schema_json() -> &'static str {
        r#"{
            "geometry_type": "POLYGON",
            "srid": "EPSG:31983",
            "fields": [{"original_name": "Área Total", "target_name": "area_total", "type": "FLOAT"}]
        }"#
    }

    #[test]
    fn test_read_schema_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, schema_json()).unwrap();

        let schema = read_schema(&path).unwrap();
        assert_eq!(schema.geometry_type, "POLYGON");
        assert_eq!(schema.srid.code(), Some(31983));
        assert_eq!(schema.fields.len(), 1);
    }

    #[test]
    fn test_read_schema_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.yaml");
        fs::write(
            &path,
            "geometry_type: POINT\nsrid: 4326\nfields:\n  - original_name: id\n    target_name: id\n    type: INTEGER\n",
        )
        .unwrap();

        let schema = read_schema(&path).unwrap();
        assert_eq!(schema.geometry_type, "POINT");
        assert_eq!(schema.srid.code(), Some(4326));
    }

    #[test]
    fn test_read_schema_missing_file() {
        let result = read_schema(Path::new("/nonexistent/schema.json"));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_handle_ddl_writes_file() {
        let dir = TempDir::new().unwrap();
        let schema_path = dir.path().join("schema.json");
        let out_path = dir.path().join("table.sql");
        fs::write(&schema_path, schema_json()).unwrap();

        let args = DdlArgs {
            schema_file: schema_path,
            table: "Lotes 2024".to_string(),
            output: Some(out_path.clone()),
        };

        assert_eq!(handle_ddl(&args).await, 0);

        let ddl = fs::read_to_string(out_path).unwrap();
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS layers.lotes_2024 ("));
        assert!(ddl.contains("area_total DOUBLE PRECISION"));
        assert!(ddl.contains("geom GEOMETRY(POLYGON, 31983)"));
    }

    #[tokio::test]
    async fn test_handle_ddl_invalid_schema() {
        let dir = TempDir::new().unwrap();
        let schema_path = dir.path().join("schema.json");
        fs::write(&schema_path, "{\"fields\": 3}").unwrap();

        let args = DdlArgs {
            schema_file: schema_path,
            table: "t".to_string(),
            output: None,
        };

        assert_eq!(handle_ddl(&args).await, 1);
    }

    #[test]
    fn test_process_overrides() {
        let args = ProcessArgs {
            url: "https://example.com".to_string(),
            endpoint: Some("http://gis:9000".to_string()),
            local: false,
            backend: None,
            model: Some("other-model".to_string()),
            timeout: Some(5),
            format: super::super::commands::OutputFormatArg::Json,
            ddl: None,
            output: Some(PathBuf::from("/tmp/x.json")),
        };

        let config = config_for_process(&args);
        assert_eq!(config.endpoint, "http://gis:9000");
        assert_eq!(config.model, "other-model");
        assert_eq!(config.request_timeout_secs, 5);
    }
}
