/*!
 * Multi-source translation orchestration.
 *
 * This module contains the text processing and scheduling stages that sit
 * between the dataset and the engine. It is split into several submodules:
 *
 * - `placeholders`: Masking of macros, variables and markup
 * - `postprocess`: Cleanup of raw engine output
 * - `tasks`: Discovery of keys with usable sources and missing targets
 * - `batch`: Work queues and decoding-mode selection
 * - `retry`: Retry ladder for placeholder integrity
 * - `glossary`: Fixed translations that bypass the engine
 * - `core`: Translation service for one sub-batch
 * - `consensus`: Selection among candidates from several sources
 * - `checkpoint`: Applying results, persistence and reload timing
 */

// Re-export main types for easier usage
pub use self::batch::{BatchScheduler, DecodingMode, DecodingParams, SubBatch, WorkQueue};
pub use self::checkpoint::CheckpointCoordinator;
pub use self::consensus::{CandidateSet, Candidates, ConsensusSelector};
pub use self::core::TranslationService;
pub use self::glossary::Glossary;
pub use self::placeholders::{PlaceholderMap, PlaceholderProtector, ProtectedText};
pub use self::postprocess::PostProcessor;
pub use self::retry::{GenerationAttempt, ItemState, RetryLadder};
pub use self::tasks::{TaskCollector, TranslationTask};

// Submodules
pub mod batch;
pub mod checkpoint;
pub mod consensus;
pub mod core;
pub mod glossary;
pub mod placeholders;
pub mod postprocess;
pub mod retry;
pub mod tasks;
