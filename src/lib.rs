/*!
 * # l10n-fill - Multi-source machine translation for localization datasets
 *
 * A Rust library that fills the missing languages of a localization dataset
 * (file -> key -> language -> text) with a neural translation engine.
 *
 * ## Features
 *
 * - Placeholder protection for macros, variables, printf specifiers and markup
 * - Task discovery over the dataset with source priorities
 * - Batching per (source, target) pair with short and regular decoding modes
 * - Retry ladder that relaxes decoding until every placeholder survives
 * - Cleanup of common generation artifacts
 * - Consensus selection among candidates from several source languages
 * - Checkpointing after each file group, application limits and engine reloads
 * - Glossary of fixed translations that bypass the engine
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `dataset`: Order-preserving localization dataset
 * - `translation`: Orchestration stages:
 *   - `translation::placeholders`: Placeholder protection and restoration
 *   - `translation::postprocess`: Output cleanup
 *   - `translation::tasks`: Task discovery
 *   - `translation::batch`: Work queues and decoding modes
 *   - `translation::retry`: Retry ladder
 *   - `translation::consensus`: Multi-source selection
 *   - `translation::checkpoint`: Application, persistence and reloads
 *   - `translation::core`: Sub-batch translation service
 * - `validation`: Placeholder integrity and script plausibility checks
 * - `engine`: Translation engine contract, lifecycle handle and clients
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Bitrix, NLLB and ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
// Add other lints you want to allow but not auto-fix

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod dataset;
pub mod engine;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod translation;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary};
pub use dataset::LocalizationDataset;
pub use engine::{DecodingConfig, Engine, HttpEngine, MockEngine, TranslationEngine};
pub use errors::{DatasetError, EngineError};
pub use language_utils::get_language_name;
pub use translation::TranslationService;
