// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use livesub::app_config::{Config, LogLevel};
use livesub::errors::AppError;
use livesub::reflow::reflow_entries;
use livesub::replay::{parse_replay, ReplayFormat};
use livesub::session::CaptureSession;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded snapshot stream through a capture session
    Replay(ReplayArgs),

    /// Generate shell completions for livesub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Recorded snapshot stream (JSON lines or plain text)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "livesub.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Input format; guessed from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<ReplayFormat>,

    /// Re-cut the final units into sentences
    #[arg(long)]
    reflow: bool,

    /// Print session statistics as JSON
    #[arg(long)]
    stats: bool,
}

/// livesub - live caption capture
///
/// Reconstructs a clean, non-duplicated caption transcript from repeated
/// full reads of a live caption region.
#[derive(Parser, Debug)]
#[command(name = "livesub")]
#[command(version)]
#[command(about = "Live caption deduplication and assembly")]
#[command(long_about = "livesub reconciles repeated reads of a live caption region into subtitle units.

EXAMPLES:
    livesub replay capture.jsonl                  # Replay a recorded capture
    livesub replay capture.txt --format plain     # One snapshot per line, '---' = cleared
    livesub replay capture.jsonl --reflow         # Re-cut the transcript into sentences
    livesub replay capture.jsonl --stats          # Print session statistics
    livesub completions bash > livesub.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in livesub.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation; filtering follows log::max_level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI colour for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, colour) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at info; the level is adjusted once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "livesub", &mut std::io::stdout());
            Ok(())
        }
        Commands::Replay(args) => run_replay(args).await,
    }
}

fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        return Config::from_file(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config
        .save(config_path)
        .context(format!("Failed to write default config to file: {}", config_path))?;
    Ok(config)
}

async fn run_replay(options: ReplayArgs) -> Result<()> {
    if let Some(cli_level) = &options.log_level {
        log::set_max_level(LogLevel::from(cli_level.clone()).to_level_filter());
    }

    let mut config = load_or_create_config(&options.config_path)?;
    if let Some(cli_level) = &options.log_level {
        config.log_level = cli_level.clone().into();
    }
    config
        .validate()
        .map_err(|e| AppError::Config(e.to_string()))?;
    log::set_max_level(config.log_level.to_level_filter());

    let input = std::fs::read_to_string(&options.input)
        .context(format!("Failed to read replay file: {:?}", options.input))?;
    let format = options
        .format
        .unwrap_or_else(|| ReplayFormat::from_path(&options.input));
    // Capped at a day so the offset arithmetic stays in range
    let step = Duration::milliseconds(config.session.replay_step_ms.min(86_400_000) as i64);
    let events = parse_replay(&input, format, Utc::now(), step).map_err(AppError::from)?;
    info!("Replaying {} event(s) from {:?}", events.len(), options.input);

    let progress_bar = ProgressBar::new(events.len() as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} events ({percent}%) {msg}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));

    let printer = progress_bar.clone();
    let session = CaptureSession::start_with_sink(&config, move |fragment: &str| {
        printer.suspend(|| println!("+ {}", fragment));
    });

    for event in events {
        session.send(event).await.map_err(AppError::from)?;
        progress_bar.inc(1);
    }

    let report = session.finalize_all().await.map_err(AppError::from)?;
    progress_bar.finish_with_message("done");

    let units = if options.reflow {
        reflow_entries(&report.units)
    } else {
        report.units.clone()
    };

    let mut stdout = std::io::stdout().lock();
    for unit in &units {
        writeln!(stdout, "{}", unit)?;
    }
    if options.stats {
        let json = serde_json::to_string_pretty(&report.stats).context("Failed to serialize session stats")?;
        writeln!(stdout, "{}", json)?;
    }

    info!("{}", report);
    Ok(())
}
