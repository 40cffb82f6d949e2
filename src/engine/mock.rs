/*!
 * Mock engine implementation for testing.
 *
 * This module provides a mock engine that simulates different behaviors:
 * - `MockEngine::echo()` - Returns every input unchanged (tokens survive)
 * - `MockEngine::with_generator(..)` - Computes each output with a function
 * - `MockEngine::dropping_placeholders()` - Loses every placeholder token
 * - `MockEngine::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::engine::{DecodingConfig, TranslationEngine};
use crate::errors::EngineError;

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*__PH_\d+__").expect("Invalid token regex")
});

/// One text as seen by a generator function
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The protected text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
    /// Decoding parameters of the call
    pub config: DecodingConfig,
}

/// A recorded engine call
#[derive(Debug, Clone)]
pub struct MockCall {
    pub texts: Vec<String>,
    pub source_language: String,
    pub target_language: String,
    pub config: DecodingConfig,
}

/// Behavior mode for the mock engine
#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    /// Return every input unchanged
    Echo,
    /// Compute each output with a function
    Generator(fn(&MockRequest) -> Option<String>),
    /// Return the input with every placeholder token removed
    DropPlaceholders,
    /// Return no output for any text
    Absent,
    /// Fail every Nth call
    Intermittent { fail_every: usize },
    /// Always fail with an error
    Failing,
    /// Return one output fewer than requested
    ShortResponse,
}

/// Mock engine for testing orchestration behavior
#[derive(Debug, Clone)]
pub struct MockEngine {
    /// Behavior mode
    behavior: MockBehavior,
    /// Every translate call received, shared between clones
    calls: Arc<Mutex<Vec<MockCall>>>,
    loads: Arc<AtomicUsize>,
    unloads: Arc<AtomicUsize>,
    loaded: Arc<AtomicBool>,
}

impl MockEngine {
    /// Create a new mock engine with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
            loads: Arc::new(AtomicUsize::new(0)),
            unloads: Arc::new(AtomicUsize::new(0)),
            loaded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create an engine that echoes its input
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create an engine driven by a per-text function
    pub fn with_generator(generator: fn(&MockRequest) -> Option<String>) -> Self {
        Self::new(MockBehavior::Generator(generator))
    }

    /// Create an engine that never keeps placeholder tokens
    pub fn dropping_placeholders() -> Self {
        Self::new(MockBehavior::DropPlaceholders)
    }

    /// Create an engine that never produces output
    pub fn absent() -> Self {
        Self::new(MockBehavior::Absent)
    }

    /// Create an intermittently failing engine
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing engine that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create an engine that breaks the length contract
    pub fn short_response() -> Self {
        Self::new(MockBehavior::ShortResponse)
    }

    /// All translate calls received so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn unload_count(&self) -> usize {
        self.unloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationEngine for MockEngine {
    async fn load(&mut self) -> Result<(), EngineError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn unload(&mut self) -> Result<(), EngineError> {
        self.unloads.fetch_add(1, Ordering::SeqCst);
        self.loaded.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
        config: &DecodingConfig,
    ) -> Result<Vec<Option<String>>, EngineError> {
        if !self.loaded.load(Ordering::SeqCst) {
            return Err(EngineError::NotLoaded);
        }

        let count = {
            let mut calls = self.calls.lock();
            calls.push(MockCall {
                texts: texts.to_vec(),
                source_language: source_language.to_string(),
                target_language: target_language.to_string(),
                config: config.clone(),
            });
            calls.len()
        };

        match self.behavior {
            MockBehavior::Echo => Ok(texts.iter().cloned().map(Some).collect()),

            MockBehavior::Generator(generator) => Ok(texts
                .iter()
                .map(|text| {
                    generator(&MockRequest {
                        text: text.clone(),
                        source_language: source_language.to_string(),
                        target_language: target_language.to_string(),
                        config: config.clone(),
                    })
                })
                .collect()),

            MockBehavior::DropPlaceholders => Ok(texts
                .iter()
                .map(|text| Some(TOKEN_REGEX.replace_all(text, "").trim().to_string()))
                .collect()),

            MockBehavior::Absent => Ok(vec![None; texts.len()]),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == 0 {
                    Err(EngineError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (call #{})", count),
                    })
                } else {
                    Ok(texts.iter().cloned().map(Some).collect())
                }
            }

            MockBehavior::Failing => Err(EngineError::ApiError {
                status_code: 500,
                message: "Simulated engine failure".to_string(),
            }),

            MockBehavior::ShortResponse => Ok(texts
                .iter()
                .skip(1)
                .cloned()
                .map(Some)
                .collect()),
        }
    }
}
