use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use url::Url;

use crate::file_utils::FileManager;
use crate::translation::DecodingParams;

/// Run configuration read from conf.json
///
/// Every field has a default, so a partial file is enough; command-line
/// flags are applied on top before `validate` runs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source languages in priority order; the first one is the primary source
    #[serde(default = "default_source_languages")]
    pub source_languages: Vec<String>,

    /// Target languages to fill in
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Batching, checkpointing and limits
    #[serde(default)]
    pub batch: BatchConfig,

    /// Decoding hyperparameters
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Model server connection
    #[serde(default)]
    pub engine: EngineConfig,

    /// Optional glossary file
    #[serde(default = "default_glossary_path")]
    pub glossary_path: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Batching configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BatchConfig {
    /// Texts per engine call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Files per checkpoint group (0 = all files in one group)
    #[serde(default)]
    pub file_batch_size: usize,

    /// Reload the engine after this many sub-batches (0 = never)
    #[serde(default)]
    pub reload_after: usize,

    /// Stop after applying this many translations (0 = unlimited)
    #[serde(default)]
    pub limit: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            file_batch_size: 0,
            reload_after: 0,
            limit: 0,
        }
    }
}

/// Decoding configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerationConfig {
    #[serde(default = "default_num_beams")]
    pub num_beams: u32,

    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,

    #[serde(default = "default_no_repeat_ngram_size")]
    pub no_repeat_ngram_size: u32,

    #[serde(default = "default_length_penalty")]
    pub length_penalty: f32,

    /// Retry attempts after the first one when placeholders get lost
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            num_beams: default_num_beams(),
            repetition_penalty: default_repetition_penalty(),
            no_repeat_ngram_size: default_no_repeat_ngram_size(),
            length_penalty: default_length_penalty(),
            max_retries: default_max_retries(),
        }
    }
}

impl GenerationConfig {
    pub fn decoding_params(&self) -> DecodingParams {
        DecodingParams {
            num_beams: self.num_beams,
            repetition_penalty: self.repetition_penalty,
            no_repeat_ngram_size: self.no_repeat_ngram_size,
            length_penalty: self.length_penalty,
        }
    }
}

/// Model server configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// Service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport-level retries per request
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff between retries in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_target_languages() -> Vec<String> {
    vec!["ru".to_string(), "tr".to_string()]
}

fn default_batch_size() -> usize {
    32
}

fn default_num_beams() -> u32 {
    3
}

fn default_repetition_penalty() -> f32 {
    1.3
}

fn default_no_repeat_ngram_size() -> u32 {
    2
}

fn default_length_penalty() -> f32 {
    0.6
}

fn default_max_retries() -> u32 {
    3
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8765".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_glossary_path() -> String {
    "glossary.json".to_string()
}

impl Config {
    /// Load a configuration file, writing a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if FileManager::file_exists(path) {
            let content = FileManager::read_to_string(path)?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path));
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(path, &config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
        Ok(config)
    }

    /// The source used when no other tie-break applies
    pub fn primary_source(&self) -> &str {
        self.source_languages.first().map(String::as_str).unwrap_or("en")
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.source_languages.is_empty() {
            return Err(anyhow!("At least one source language is required"));
        }
        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }

        // Validate languages
        for code in self.source_languages.iter().chain(&self.target_languages) {
            crate::language_utils::validate_language_code(code)
                .with_context(|| format!("Unsupported language code '{}'", code))?;
        }

        if self.batch.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than 0"));
        }
        if self.generation.num_beams == 0 {
            return Err(anyhow!("num_beams must be greater than 0"));
        }

        let endpoint = if self.engine.endpoint.contains("://") {
            self.engine.endpoint.clone()
        } else {
            format!("http://{}", self.engine.endpoint)
        };
        Url::parse(&endpoint).with_context(|| format!("Invalid engine endpoint '{}'", self.engine.endpoint))?;

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_languages: default_source_languages(),
            target_languages: default_target_languages(),
            batch: BatchConfig::default(),
            generation: GenerationConfig::default(),
            engine: EngineConfig::default(),
            glossary_path: default_glossary_path(),
            log_level: LogLevel::default(),
        }
    }
}
