use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use pidify_core::config_file::{self, ConfigFile};
use pidify_core::{
    Config, PlainTextRenderer, Pipeline, Report, Resolutions, TextRenderer, extract_fields,
};
use pidify_pdf_mupdf::MupdfRenderer;

mod output;

/// Extract identifiers from a DMPTool plan export and resolve them to PIDs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the plan export (PDF, or pre-rendered .txt)
    #[arg(short, long = "input-pdf", visible_alias = "input_pdf")]
    input_pdf: PathBuf,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file to use instead of the platform and .pidify.toml files
    #[arg(long)]
    config: Option<PathBuf>,

    /// Contact address for the Crossref and OpenAlex polite pools
    #[arg(long)]
    crossref_mailto: Option<String>,

    /// OpenAlex API key
    #[arg(long)]
    openalex_key: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Extract fields only; make no registry requests
    #[arg(long)]
    extract_only: bool,

    /// Log debug output to stderr (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli, |key| std::env::var(key).ok())?;
    tracing::debug!(?config, "resolved configuration");

    let text = render_input(&cli.input_pdf)?;

    let report = if cli.extract_only {
        Report::compile(&extract_fields(&text), &Resolutions::default())
    } else {
        Pipeline::with_reqwest(config)?.run(&text).await
    };

    if cli.verbose > 0 {
        output::print_resolution_summary(&mut std::io::stderr(), &report)?;
    }

    let mut writer = output::open_writer(cli.output.as_deref())?;
    output::write_report(&mut *writer, &report)
}

fn init_tracing(verbose: u8) {
    let default_level = if verbose > 0 { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve configuration: CLI flags > env vars > config file > defaults.
fn resolve_config(
    cli: &Cli,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Config> {
    let file = match cli.config {
        Some(ref path) => config_file::load_from_path(path).ok_or_else(|| {
            anyhow::anyhow!("Could not read config file: {}", path.display())
        })?,
        None => config_file::load_config(),
    };

    let mut config = Config::default();
    apply_layers(&mut config, &file, &env);

    if let Some(ref mailto) = cli.crossref_mailto {
        config.crossref_mailto = Some(mailto.clone());
    }
    if let Some(ref key) = cli.openalex_key {
        config.openalex_key = Some(key.clone());
    }
    if let Some(secs) = cli.timeout {
        config.http_timeout_secs = secs;
    }
    Ok(config)
}

/// Config file values, then environment overrides.
fn apply_layers(config: &mut Config, file: &ConfigFile, env: &impl Fn(&str) -> Option<String>) {
    file.apply_to(config);

    if let Some(key) = env("OPENALEX_KEY").filter(|v| !v.is_empty()) {
        config.openalex_key = Some(key);
    }
    if let Some(mailto) = env("CROSSREF_MAILTO").filter(|v| !v.is_empty()) {
        config.crossref_mailto = Some(mailto);
    }
    if let Some(raw) = env("PIDIFY_HTTP_TIMEOUT") {
        match raw.parse::<u64>() {
            Ok(secs) => config.http_timeout_secs = secs,
            Err(_) => tracing::warn!(value = %raw, "ignoring invalid PIDIFY_HTTP_TIMEOUT"),
        }
    }
}

/// Render the input to text. Unreadable input aborts the run.
fn render_input(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let is_txt = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);

    let renderer: Box<dyn TextRenderer> = if is_txt {
        Box::new(PlainTextRenderer)
    } else {
        Box::new(MupdfRenderer::new())
    };

    renderer
        .render_text(path)
        .map_err(|e| anyhow::anyhow!("Could not render {}: {}", path.display(), e))
}
