// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use l10n_fill::app_config::{Config, LogLevel};
use l10n_fill::engine::{Engine, HttpEngine};
use l10n_fill::Controller;

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
    /// Fill missing translations of a localization dataset
    Translate(TranslateArgs),

    /// Generate shell completions for l10n-fill
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input dataset (JSON: file -> key -> language -> text)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Output file, or an existing directory to keep the input file name
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,

    /// Source languages in priority order (e.g. 'en,ru')
    #[arg(long, value_delimiter = ',')]
    src: Option<Vec<String>>,

    /// Target languages (e.g. 'ru,tr,ua')
    #[arg(long, value_delimiter = ',')]
    targets: Option<Vec<String>>,

    /// Texts per engine call
    #[arg(long)]
    batch_size: Option<usize>,

    /// Files per checkpoint group (0 = all files)
    #[arg(long)]
    file_batch_size: Option<usize>,

    /// Reload the engine after N sub-batches (0 = never)
    #[arg(long)]
    reload_after: Option<usize>,

    /// Stop after applying N translations (0 = unlimited)
    #[arg(long)]
    limit: Option<usize>,

    #[arg(long)]
    repetition_penalty: Option<f32>,

    #[arg(long)]
    no_repeat_ngram: Option<u32>,

    #[arg(long)]
    num_beams: Option<u32>,

    #[arg(long)]
    length_penalty: Option<f32>,

    /// Retry attempts when placeholders get lost
    #[arg(long)]
    max_retries: Option<u32>,

    /// Glossary file (source text -> target -> translation)
    #[arg(long)]
    glossary: Option<String>,

    /// Model server URL
    #[arg(long, env = "L10N_FILL_ENDPOINT")]
    endpoint: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl TranslateArgs {
    /// Override config values with the ones given on the command line
    fn apply_to(&self, config: &mut Config) {
        if let Some(src) = &self.src {
            config.source_languages = src.clone();
        }
        if let Some(targets) = &self.targets {
            config.target_languages = targets.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.batch.batch_size = batch_size;
        }
        if let Some(file_batch_size) = self.file_batch_size {
            config.batch.file_batch_size = file_batch_size;
        }
        if let Some(reload_after) = self.reload_after {
            config.batch.reload_after = reload_after;
        }
        if let Some(limit) = self.limit {
            config.batch.limit = limit;
        }
        if let Some(repetition_penalty) = self.repetition_penalty {
            config.generation.repetition_penalty = repetition_penalty;
        }
        if let Some(no_repeat_ngram) = self.no_repeat_ngram {
            config.generation.no_repeat_ngram_size = no_repeat_ngram;
        }
        if let Some(num_beams) = self.num_beams {
            config.generation.num_beams = num_beams;
        }
        if let Some(length_penalty) = self.length_penalty {
            config.generation.length_penalty = length_penalty;
        }
        if let Some(max_retries) = self.max_retries {
            config.generation.max_retries = max_retries;
        }
        if let Some(glossary) = &self.glossary {
            config.glossary_path = glossary.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.engine.endpoint = endpoint.clone();
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone().into();
        }
    }
}

/// l10n-fill - fill missing translations of localization datasets
#[derive(Parser, Debug)]
#[command(name = "l10n-fill")]
#[command(version)]
#[command(about = "Multi-source machine translation for localization datasets")]
#[command(long_about = "l10n-fill translates the missing languages of a localization dataset with an NLLB model server,
protecting placeholders and choosing among candidates from several source languages.

EXAMPLES:
    l10n-fill translate -i lang.json -o out.json                   # Use conf.json
    l10n-fill translate -i lang.json -o out/ --src en,ru --targets ua,tr
    l10n-fill translate -i lang.json -o out.json --limit 50         # Bounded QA run
    l10n-fill completions bash > l10n-fill.bash                    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself lets everything through; log::max_level filters
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
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
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "l10n-fill", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    // Load or create configuration, then apply CLI overrides
    let mut config = Config::load_or_create(&options.config)?;
    options.apply_to(&mut config);

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let http = HttpEngine::new(
        &config.engine.endpoint,
        config.engine.timeout_secs,
        config.engine.retry_count,
        config.engine.retry_backoff_ms,
    )?;
    info!("Connecting to model server at {}", http.base_url());
    let mut engine = Engine::loaded(http)
        .await
        .context("Failed to load the translation engine")?;

    let controller = Controller::with_config(config)?.with_progress(!options.no_progress);
    controller.run(&options.input, &options.output, &mut engine).await?;

    Ok(())
}
