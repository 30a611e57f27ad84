use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use oidfix_core::config::{self, CONFIG_FILE_NAME, PipelineConfig, SourceConfig};
use oidfix_core::{NormalizeReport, Pipeline};

#[derive(Parser)]
#[command(
    name = "oidfix",
    about = "Strip tag prefixes from OpenAPI operationIds",
    version
)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch or read a document, normalize it, and write it out
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Destination file (overwritten)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// HTTP timeout in seconds (0 disables)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show which operationIds would change, without writing anything
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: ReportFormat,
    },

    /// Initialize a new oidfix configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// URL to fetch the OpenAPI document from
    #[arg(short, long, conflicts_with = "input")]
    url: Option<String>,

    /// Local OpenAPI file (JSON or YAML) to read instead of fetching
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum ReportFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            output,
            timeout,
        } => cmd_run(&cli.config, source, output, timeout),

        Commands::Check { source, format } => cmd_check(&cli.config, source, format),

        Commands::Init { force } => cmd_init(&cli.config, force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oidfix", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the config file if present and apply command-line overrides.
fn resolve_config(
    path: &Path,
    source: SourceArgs,
    output: Option<PathBuf>,
    timeout: Option<u64>,
) -> Result<PipelineConfig> {
    let mut cfg = config::load_config(path)?.unwrap_or_default();

    if let Some(url) = source.url {
        cfg.source = SourceConfig::Url(url);
    } else if let Some(input) = source.input {
        cfg.source = SourceConfig::File(input);
    }
    if let Some(output) = output {
        cfg.output = output;
    }
    if let Some(timeout) = timeout {
        cfg.fetch.timeout_secs = timeout;
    }

    cfg.validate()?;
    log::debug!("resolved config: {cfg:?}");
    Ok(cfg)
}

fn print_summary(report: &NormalizeReport) {
    eprintln!(
        "  {} operations, {} operationIds normalized",
        report.operations,
        report.renames.len()
    );
    for (id, refs) in &report.collisions {
        let locations: Vec<String> = refs
            .iter()
            .map(|r| format!("{} {}", r.method.to_uppercase(), r.path))
            .collect();
        eprintln!(
            "  warning: operationId `{id}` is shared by {}",
            locations.join(", ")
        );
    }
}

fn cmd_run(
    config_path: &Path,
    source: SourceArgs,
    output: Option<PathBuf>,
    timeout: Option<u64>,
) -> Result<()> {
    let cfg = resolve_config(config_path, source, output, timeout)?;
    let mut pipeline = Pipeline::from_config(&cfg)?;

    eprintln!(
        "Normalizing {} -> {}",
        pipeline.source().describe(),
        pipeline.destination().display()
    );
    let outcome = pipeline
        .run()
        .with_context(|| format!("failed to normalize {}", pipeline.source().describe()))?;

    print_summary(&outcome.report);
    eprintln!("Saved {}", cfg.output.display());
    Ok(())
}

fn cmd_check(config_path: &Path, source: SourceArgs, format: ReportFormat) -> Result<()> {
    let cfg = resolve_config(config_path, source, None, None)?;
    let mut pipeline = Pipeline::from_config(&cfg)?;

    let outcome = pipeline
        .dry_run()
        .with_context(|| format!("failed to check {}", pipeline.source().describe()))?;

    match format {
        ReportFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&outcome.report)?;
            print!("{}", yaml);
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome.report)?;
            println!("{}", json);
        }
    }

    print_summary(&outcome.report);
    Ok(())
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
