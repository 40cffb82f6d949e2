/*!
 * Error types for the l10n-fill application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine was called while no model is loaded
    #[error("Translation engine is not loaded")]
    NotLoaded,

    /// Loading or reloading the model failed
    #[error("Failed to load translation engine: {0}")]
    LoadFailed(String),

    /// Error when making a request fails
    #[error("Engine request failed: {0}")]
    RequestFailed(String),

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error returned by the engine server itself
    #[error("Engine responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the server
        message: String,
    },

    /// Error when parsing an engine response fails
    #[error("Failed to parse engine response: {0}")]
    ParseError(String),

    /// The engine returned a different number of outputs than inputs
    #[error("Engine returned {actual} outputs for {expected} inputs")]
    ResponseMismatch {
        /// Number of texts sent
        expected: usize,
        /// Number of outputs received
        actual: usize,
    },
}

/// Errors that can occur while loading or persisting the localization dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The dataset file could not be read
    #[error("Failed to read dataset {path}: {message}")]
    Read {
        /// Path of the file
        path: String,
        /// Underlying error
        message: String,
    },

    /// The dataset does not have the file -> key -> language -> text shape
    #[error("Malformed dataset: {0}")]
    Malformed(String),

    /// The dataset could not be written
    #[error("Failed to write dataset {path}: {message}")]
    Write {
        /// Path of the file
        path: String,
        /// Underlying error
        message: String,
    },
}
