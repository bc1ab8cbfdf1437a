use anyhow::Result;
use clap::{Parser, Subcommand};
use compose_result::{
    config::Config,
    output::{format_result_to_string, print_result, Catalog, OutputFormat},
    pipeline::{compose_unit, discover_unit_files, hints_file_name, load_units},
    result::ChecksumKind,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const UNIT_FAILED: u8 = 2;
}

#[derive(Parser)]
#[command(name = "compose-result")]
#[command(
    author,
    version,
    about = "Compose per-unit component results with global component IDs"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose unit files (or directories of unit files)
    Compose {
        /// Unit files or directories to walk for *.json unit files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Checksum used for global component IDs (sha256, sha512)
        #[arg(long)]
        checksum: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the hints of every unit as JSON into this directory
        #[arg(long)]
        hints_json: Option<PathBuf>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });

    match cli.command {
        Commands::Compose {
            paths,
            format,
            checksum,
            output,
            hints_json,
        } => {
            if let Some(checksum) = checksum {
                config.checksum = ChecksumKind::from_str(&checksum).map_err(|e| anyhow::anyhow!(e))?;
            }
            let format_str = format.unwrap_or(config.default_format.clone());
            let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;

            run_compose(&paths, &config, format, output, hints_json).await
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_compose(
    paths: &[PathBuf],
    config: &Config,
    format: OutputFormat,
    output_file: Option<PathBuf>,
    hints_dir: Option<PathBuf>,
) -> Result<u8> {
    let is_interactive = format == OutputFormat::Table && output_file.is_none();

    let files = discover_unit_files(paths);
    debug!(count = files.len(), "Discovered unit files");

    let progress = if is_interactive {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Loading units...");
        Some(pb)
    } else {
        None
    };

    let units = load_units(&files).await;

    if let Some(ref pb) = progress {
        pb.set_message("Composing units...");
    }

    if let Some(ref dir) = hints_dir {
        tokio::fs::create_dir_all(dir).await?;
    }

    let mut hint_files = HashSet::new();
    let mut catalog = Catalog::new();
    for (path, unit) in units {
        let source = path.display().to_string();
        match unit {
            Ok(unit) => {
                let result = compose_unit(unit, config);
                if let Some(ref dir) = hints_dir {
                    if result.hints_count() > 0 {
                        let name = hints_file_name(&path);
                        if !hint_files.insert(name.clone()) {
                            anyhow::bail!(
                                "Hints export {} of {} would overwrite another unit's hints",
                                name,
                                source
                            );
                        }
                        tokio::fs::write(dir.join(&name), result.hints_to_json()?).await?;
                    }
                }
                catalog.add_result(source, &result);
            }
            Err(e) => {
                warn!(source, error = %e, "Failed to load unit");
                catalog.add_failure(source, &e);
            }
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!("Found {} components", catalog.components_count()));
    }

    if let Some(path) = output_file {
        let content = format_result_to_string(&catalog, format)?;
        tokio::fs::write(&path, content).await?;
    } else {
        print_result(&catalog, format)?;
    }

    if catalog.failed_units.is_empty() {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::UNIT_FAILED)
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'compose-result config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
