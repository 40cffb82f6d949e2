/*!
 * Retry ladder for placeholder integrity.
 *
 * Every item of a sub-batch starts as `Pending` with its first-attempt
 * decoding mode. After each engine call, outputs that carry every token of
 * their placeholder map move to `Succeeded`; the rest stay pending with a
 * relaxed sampling mode, until `max_retries` is exhausted and they become
 * `Failed`.
 */

use log::{debug, warn};

use crate::engine::{Engine, TranslationEngine};
use crate::errors::EngineError;
use crate::translation::batch::{DecodingMode, DecodingParams};
use crate::translation::placeholders::ProtectedText;
use crate::validation::PlaceholderValidator;

/// Describes the next generation attempt for a pending item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationAttempt {
    /// Attempt number, 0 for the first try
    pub attempt: u32,
    /// Decoding mode to use for this attempt
    pub mode: DecodingMode,
}

impl GenerationAttempt {
    /// First attempt for a protected text
    pub fn first(text: &str) -> Self {
        Self {
            attempt: 0,
            mode: DecodingMode::initial_for(text),
        }
    }

    /// Attempt that follows this one
    pub fn next(&self) -> Self {
        let attempt = self.attempt + 1;
        Self {
            attempt,
            mode: DecodingMode::Sampling { attempt },
        }
    }
}

/// State of one item on the ladder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemState {
    /// Waiting for the described attempt
    Pending(GenerationAttempt),
    /// Raw engine output with every placeholder token intact
    Succeeded(String),
    /// Gave up after the last attempt
    Failed,
}

impl ItemState {
    /// Raw output for a succeeded item
    pub fn output(&self) -> Option<&str> {
        match self {
            ItemState::Succeeded(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_output(self) -> Option<String> {
        match self {
            ItemState::Succeeded(text) => Some(text),
            _ => None,
        }
    }
}

/// Escalating decoding strategy driven by placeholder validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryLadder {
    params: DecodingParams,
    max_retries: u32,
}

impl RetryLadder {
    pub fn new(params: DecodingParams, max_retries: u32) -> Self {
        Self { params, max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run the ladder over one sub-batch of protected texts
    ///
    /// Returns one final state per input, in input order. Engine errors are
    /// returned as is; the caller decides how far they reach.
    pub async fn run<E: TranslationEngine>(
        &self,
        engine: &Engine<E>,
        items: &[ProtectedText],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<ItemState>, EngineError> {
        let mut states: Vec<ItemState> = items
            .iter()
            .map(|item| ItemState::Pending(GenerationAttempt::first(&item.text)))
            .collect();

        loop {
            let groups = Self::pending_groups(&states);
            if groups.is_empty() {
                break;
            }

            for (attempt, positions) in groups {
                let texts: Vec<String> = positions.iter().map(|&i| items[i].text.clone()).collect();
                let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                let config = attempt.mode.config(&self.params, &refs);

                debug!(
                    "{} -> {}: attempt {} with {:?} for {} text(s)",
                    source_language,
                    target_language,
                    attempt.attempt,
                    attempt.mode,
                    texts.len()
                );

                let outputs = engine
                    .translate(&texts, source_language, target_language, &config)
                    .await?;

                for (&position, output) in positions.iter().zip(outputs) {
                    states[position] = self.advance(attempt, output, &items[position]);
                }
            }
        }

        let failed = states.iter().filter(|s| **s == ItemState::Failed).count();
        if failed > 0 {
            warn!(
                "{} -> {}: {} of {} text(s) lost placeholders after {} attempt(s)",
                source_language,
                target_language,
                failed,
                states.len(),
                self.max_retries + 1
            );
        }

        Ok(states)
    }

    /// Next state of an item given the output of its attempt
    fn advance(&self, attempt: GenerationAttempt, output: Option<String>, item: &ProtectedText) -> ItemState {
        let passed = output
            .as_deref()
            .is_some_and(|text| PlaceholderValidator::validate(text, &item.placeholders).passed());

        match output {
            Some(text) if passed => ItemState::Succeeded(text),
            _ if attempt.attempt >= self.max_retries => ItemState::Failed,
            _ => ItemState::Pending(attempt.next()),
        }
    }

    /// Pending items grouped by attempt, in first-seen order
    fn pending_groups(states: &[ItemState]) -> Vec<(GenerationAttempt, Vec<usize>)> {
        let mut groups: Vec<(GenerationAttempt, Vec<usize>)> = Vec::new();
        for (position, state) in states.iter().enumerate() {
            if let ItemState::Pending(attempt) = state {
                match groups.iter_mut().find(|(a, _)| a == attempt) {
                    Some((_, positions)) => positions.push(position),
                    None => groups.push((*attempt, vec![position])),
                }
            }
        }
        groups
    }
}
