//! wsi-anonymize: strip label imagery from a batch of whole-slide images.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use wsi_anon_core::config::AnonymizeConfig;
use wsi_anon_exec::{BatchPipeline, CommandRedactor};

#[derive(Parser, Debug, Default)]
#[command(name = "wsi-anonymize")]
#[command(about = "Remove label images from whole-slide images listed in a manifest", long_about = None)]
struct Cli {
    /// Input manifest (metadata) file, relative to --inpdir
    #[arg(long)]
    inpmeta: Option<String>,

    /// Output manifest (metadata) file, relative to --outdir
    #[arg(long)]
    outmeta: Option<String>,

    /// Error log file, relative to --outdir
    #[arg(long)]
    errfile: Option<String>,

    /// Input folder
    #[arg(long)]
    inpdir: Option<PathBuf>,

    /// Output folder
    #[arg(long)]
    outdir: Option<PathBuf>,

    /// Single slide as a JSON object; switches to single-record mode
    #[arg(long)]
    slide: Option<String>,

    /// Redaction tool command line; the slide path is appended
    #[arg(long)]
    redactor: Option<String>,

    /// Per-slide redaction timeout in seconds (0 disables)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Slides redacted concurrently
    #[arg(long)]
    max_parallel: Option<usize>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AnonymizeConfig::from_env();
    apply_cli_overrides(&mut config, &cli);

    match run(config) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(config: AnonymizeConfig) -> Result<i32, Box<dyn std::error::Error>> {
    config.validate()?;
    let redactor = CommandRedactor::from_config(&config).ok_or("redactor command is empty")?;
    tracing::debug!(program = redactor.program(), mode = ?config.mode(), "starting run");

    let pipeline = BatchPipeline::new(config, redactor);
    let report = pipeline.run()?;

    if let Some(payload) = &report.payload {
        println!("{}", payload.to_json()?);
    }
    Ok(report.exit_code())
}

fn apply_cli_overrides(cfg: &mut AnonymizeConfig, cli: &Cli) {
    if let Some(name) = &cli.inpmeta {
        cfg.input_manifest = name.clone();
    }
    if let Some(name) = &cli.outmeta {
        cfg.output_manifest = name.clone();
    }
    if let Some(name) = &cli.errfile {
        cfg.error_log = name.clone();
    }
    if let Some(dir) = &cli.inpdir {
        cfg.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.outdir {
        cfg.output_dir = dir.clone();
    }
    if let Some(slide) = &cli.slide {
        cfg.slide = Some(slide.clone());
    }
    if let Some(cmd) = &cli.redactor {
        cfg.redactor = cmd.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        cfg.redact_timeout_secs = secs;
    }
    if let Some(n) = cli.max_parallel {
        cfg.max_parallel = n;
    }
}
