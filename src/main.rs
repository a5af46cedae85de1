use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log4scan::{
    checker::{checker_with_dos_range, VulnerabilityChecker, ALL_ADVISORIES},
    config::Config,
    output::{sink_for, OutputFormat},
    scanner::{ScanOptions, Scanner, WalkStats},
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const VULNERABLE: u8 = 2;
}

#[derive(Parser)]
#[command(name = "log4scan")]
#[command(
    author,
    version,
    about = "Find vulnerable Log4j releases inside jar, war and ear archives"
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree for Log4j archives
    Scan {
        /// Directory (or single archive) to scan
        #[arg(short, long, default_value = "/")]
        path: PathBuf,

        /// Number of filesystem entries between throttling pauses
        #[arg(short, long)]
        batch_size: Option<u64>,

        /// Output format (text, json, table)
        #[arg(short, long)]
        format: Option<String>,

        /// Exit with code 2 if any vulnerable release is found
        #[arg(long)]
        fail_on_vulnerable: bool,

        /// Also flag releases affected by CVE-2021-45105
        #[arg(long = "include-cve-2021-45105")]
        include_dos_range: bool,
    },

    /// List the advisory ranges releases are checked against
    Ranges {
        /// Mark CVE-2021-45105 as active
        #[arg(long = "include-cve-2021-45105")]
        include_dos_range: bool,
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
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    let config = Config::load()?;

    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Scan {
            path,
            batch_size,
            format,
            fail_on_vulnerable,
            include_dos_range,
        } => {
            let format_str = format.unwrap_or(config.default_format.clone());
            let include_dos_range = include_dos_range || config.include_dos_range;

            let mut options = config.scan_options(path);
            if let Some(batch_size) = batch_size {
                options = options.with_batch_size(batch_size);
            }

            run_scan(options, format_str, include_dos_range, fail_on_vulnerable).await
        }
        Commands::Ranges { include_dos_range } => {
            list_ranges(include_dos_range || config.include_dos_range)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

/// Logs go to stderr so they never mix with findings on stdout.
fn init_tracing(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_scan(
    options: ScanOptions,
    format: String,
    include_dos_range: bool,
    fail_on_vulnerable: bool,
) -> Result<u8> {
    let format = OutputFormat::from_str(&format).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table;

    let checker = checker_with_dos_range(include_dos_range)?;
    let scanner = Scanner::new(options, Arc::new(checker));

    let progress = if is_interactive {
        Some(spawn_progress(scanner.stats()))
    } else {
        None
    };

    let mut sink = sink_for(format, std::io::stdout());
    let result = scanner.run(sink.as_mut()).await;

    if let Some((pb, ticker)) = progress {
        ticker.abort();
        pb.finish_and_clear();
    }

    let summary = result?;
    if fail_on_vulnerable && summary.vulnerable > 0 {
        Ok(exit_codes::VULNERABLE)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

/// Spinner on stderr showing live walk counters.
fn spawn_progress(stats: Arc<WalkStats>) -> (ProgressBar, tokio::task::JoinHandle<()>) {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Scanning...");

    let ticker_pb = pb.clone();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            ticker_pb.set_message(format!(
                "Scanned {} entries, {} archives",
                stats.entries_seen(),
                stats.candidates()
            ));
        }
    });

    (pb, ticker)
}

fn list_ranges(include_dos_range: bool) -> Result<()> {
    let checker = checker_with_dos_range(include_dos_range)?;
    let active: Vec<&str> = checker
        .advisories()
        .iter()
        .flat_map(|advisory| advisory.ids.iter().copied())
        .collect();

    println!("Checked by: {}", checker.name());
    println!();

    for advisory in ALL_ADVISORIES {
        let enabled = advisory.ids.iter().all(|id| active.contains(id));
        let mark = if enabled { "active" } else { "off" };

        println!("  {:<34} [{}]", advisory.label(), mark);
        println!("  {:<34} {}", "", advisory.summary);
        for range in advisory.ranges {
            println!("  {:<34} {}", "", range);
        }
        println!();
    }

    Ok(())
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
        println!("Run 'log4scan config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
