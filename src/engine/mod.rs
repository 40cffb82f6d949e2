/*!
 * Translation engine implementations.
 *
 * The engine is the external model that turns protected source strings into
 * target-language strings. This module contains:
 * - `TranslationEngine`: the contract every engine implements
 * - `DecodingConfig`: generation parameters sent with each call
 * - `Engine`: the explicit lifecycle handle the orchestrator holds
 * - `http`: client for a model server over HTTP
 * - `mock`: deterministic engine for tests
 */

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::EngineError;

pub mod http;
pub mod mock;

pub use http::HttpEngine;
pub use mock::{MockBehavior, MockEngine};

/// Generation parameters for one engine call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodingConfig {
    /// Number of beams (1 = no beam search)
    #[serde(rename = "num_beams")]
    pub beam_count: u32,
    /// Whether to sample instead of searching
    pub do_sample: bool,
    /// Sampling temperature, only meaningful with `do_sample`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_repeat_ngram_size: Option<u32>,
    pub length_penalty: f32,
    /// Token budget for the generated text
    pub max_new_tokens: u32,
}

/// Common trait for all translation engines
///
/// Engines are called strictly one batch at a time. `translate` returns one
/// entry per input text, in input order; `None` marks a generation failure
/// for that text.
#[async_trait]
pub trait TranslationEngine: Send + Sync + Debug {
    /// Load the model so that `translate` can be served
    async fn load(&mut self) -> Result<(), EngineError>;

    /// Release the model and its memory
    async fn unload(&mut self) -> Result<(), EngineError>;

    /// Replace the loaded model with a fresh instance
    ///
    /// Returns once the new instance is ready.
    async fn reload(&mut self) -> Result<(), EngineError> {
        self.unload().await?;
        self.load().await
    }

    /// Translate a batch of protected texts
    async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
        config: &DecodingConfig,
    ) -> Result<Vec<Option<String>>, EngineError>;
}

/// Lifecycle state of an engine handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unloaded,
    Loaded,
}

/// Explicit engine resource handed to the orchestrator
///
/// The handle refuses to call the engine unless a load has completed, so no
/// request can land between an unload and the following load.
#[derive(Debug)]
pub struct Engine<E: TranslationEngine> {
    inner: E,
    state: EngineState,
    reloads: usize,
}

impl<E: TranslationEngine> Engine<E> {
    /// Wrap an engine that has not been loaded yet
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            state: EngineState::Unloaded,
            reloads: 0,
        }
    }

    /// Wrap and load an engine
    pub async fn loaded(inner: E) -> Result<Self, EngineError> {
        let mut engine = Self::new(inner);
        engine.load().await?;
        Ok(engine)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == EngineState::Loaded
    }

    /// Number of completed reloads
    pub fn reload_count(&self) -> usize {
        self.reloads
    }

    /// Borrow the wrapped engine
    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub async fn load(&mut self) -> Result<(), EngineError> {
        if self.is_loaded() {
            return Ok(());
        }
        self.inner.load().await?;
        self.state = EngineState::Loaded;
        info!("Translation engine loaded");
        Ok(())
    }

    pub async fn unload(&mut self) -> Result<(), EngineError> {
        // Whatever the outcome, the engine must not be used until the next load
        self.state = EngineState::Unloaded;
        self.inner.unload().await?;
        debug!("Translation engine unloaded");
        Ok(())
    }

    /// Reload the engine; the handle stays unusable if the reload fails
    pub async fn reload(&mut self) -> Result<(), EngineError> {
        self.state = EngineState::Unloaded;
        self.inner.reload().await?;
        self.state = EngineState::Loaded;
        self.reloads += 1;
        info!("Translation engine reloaded ({} so far)", self.reloads);
        Ok(())
    }

    /// Translate a batch, enforcing the lifecycle and the length contract
    pub async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
        config: &DecodingConfig,
    ) -> Result<Vec<Option<String>>, EngineError> {
        if !self.is_loaded() {
            return Err(EngineError::NotLoaded);
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let outputs = self
            .inner
            .translate(texts, source_language, target_language, config)
            .await?;

        if outputs.len() != texts.len() {
            return Err(EngineError::ResponseMismatch {
                expected: texts.len(),
                actual: outputs.len(),
            });
        }

        Ok(outputs)
    }
}
