use clap::{Parser, Subcommand, ValueEnum};
use genai::adapter::AdapterKind;
use std::path::PathBuf;

/// Sample a geospatial API and infer a PostGIS table schema for it
#[derive(Parser, Debug)]
#[command(
    name = "easyapigis",
    about = "Sample a geospatial API and infer a PostGIS table schema for it",
    version,
    author,
    long_about = "easyapigis fetches a JSON or GeoJSON payload from a URL, picks a \
                  representative record and asks an LLM to map it to a PostGIS layer: \
                  geometry type, SRID and typed columns. Calls go through the easyapigis \
                  middleware by default, or run in-process with --local."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Fetch a source URL and infer its schema",
        long_about = "Runs one attempt of the fetch, sample and infer pipeline against a \
                      source URL and prints the resulting snapshot.\n\n\
                      Examples:\n  \
                      easyapigis process https://example.com/layer.geojson\n  \
                      easyapigis process https://example.com/api --format json\n  \
                      easyapigis process https://example.com/api --local --backend ollama --model llama3.1:8b\n  \
                      easyapigis process https://example.com/api --ddl parcels"
    )]
    Process(ProcessArgs),

    #[command(
        about = "Check middleware availability",
        long_about = "Calls the middleware health endpoint.\n\n\
                      Examples:\n  \
                      easyapigis health\n  \
                      easyapigis health --endpoint http://gis.internal:8000"
    )]
    Health(HealthArgs),

    #[command(
        about = "Generate PostGIS DDL from a saved schema",
        long_about = "Reads an inferred schema (JSON or YAML) and prints a CREATE TABLE \
                      statement for it in the layers schema.\n\n\
                      Examples:\n  \
                      easyapigis ddl schema.json --table parcels"
    )]
    Ddl(DdlArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ProcessArgs {
    #[arg(value_name = "URL", help = "Source URL to sample")]
    pub url: String,

    #[arg(
        short = 'e',
        long,
        value_name = "URL",
        help = "Middleware base URL (overrides EASYAPIGIS_ENDPOINT)"
    )]
    pub endpoint: Option<String>,

    #[arg(long, help = "Fetch directly and infer with a local LLM client")]
    pub local: bool,

    #[arg(
        short = 'b',
        long,
        value_parser = parse_adapter_kind,
        requires = "local",
        help = "LLM provider for --local (overrides EASYAPIGIS_PROVIDER)"
    )]
    pub backend: Option<AdapterKind>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        requires = "local",
        help = "Model name for --local (provider-specific)"
    )]
    pub model: Option<String>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Request timeout in seconds (overrides EASYAPIGIS_REQUEST_TIMEOUT)"
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        long,
        value_name = "TABLE",
        help = "Also print PostGIS DDL for the inferred schema"
    )]
    pub ddl: Option<String>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'e',
        long,
        value_name = "URL",
        help = "Middleware base URL (overrides EASYAPIGIS_ENDPOINT)"
    )]
    pub endpoint: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct DdlArgs {
    #[arg(value_name = "SCHEMA_FILE", help = "Inferred schema as JSON or YAML")]
    pub schema_file: PathBuf,

    #[arg(short = 't', long, value_name = "NAME", help = "Table name")]
    pub table: String,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write DDL to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_adapter_kind(s: &str) -> Result<AdapterKind, String> {
    AdapterKind::from_lower_str(&s.to_lowercase()).ok_or_else(|| {
        format!(
            "Invalid provider: {}. Valid options: groq, ollama, openai, anthropic, gemini, xai",
            s
        )
    })
}
