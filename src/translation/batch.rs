/*!
 * Work queues and decoding-mode selection.
 *
 * Tasks are fanned out into one queue per (source, target) pair, in the
 * order the pairs are first seen. Each queue keeps the source texts and a
 * parallel list of task indices so results can be scattered back. Queues are
 * cut into sub-batches of at most `batch_size` texts for the engine.
 */

use crate::engine::DecodingConfig;
use crate::translation::tasks::TranslationTask;

/// Character limit for the short decoding mode
const SHORT_TEXT_MAX_CHARS: usize = 30;

/// Upper bound for estimated input tokens (engine-side truncation length)
pub const MAX_INPUT_TOKENS: u32 = 128;

/// Token budget used by every retry attempt
pub const RETRY_TOKEN_BUDGET: u32 = 128;

/// Texts for one (source, target) pair
#[derive(Debug, Clone, PartialEq)]
pub struct WorkQueue {
    pub source_language: String,
    pub target_language: String,
    /// Source texts, one per task needing this pair
    pub texts: Vec<String>,
    /// Index into the task list for each text
    pub task_indices: Vec<usize>,
}

impl WorkQueue {
    fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            texts: Vec::new(),
            task_indices: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Split into sub-batches of at most `batch_size` texts
    pub fn sub_batches(&self, batch_size: usize) -> Vec<SubBatch<'_>> {
        let size = batch_size.max(1);
        self.texts
            .chunks(size)
            .zip(self.task_indices.chunks(size))
            .map(|(texts, task_indices)| SubBatch { texts, task_indices })
            .collect()
    }
}

/// A slice of a queue sent to the engine in one go
#[derive(Debug, Clone, Copy)]
pub struct SubBatch<'a> {
    pub texts: &'a [String],
    pub task_indices: &'a [usize],
}

/// Builds work queues from collected tasks
pub struct BatchScheduler;

impl BatchScheduler {
    /// Fan tasks out into queues keyed by (source, target)
    ///
    /// Only the first `max_tasks` tasks are scheduled when a bound is given.
    pub fn build(tasks: &[TranslationTask], max_tasks: Option<usize>) -> Vec<WorkQueue> {
        let take = max_tasks.unwrap_or(tasks.len()).min(tasks.len());
        let mut queues: Vec<WorkQueue> = Vec::new();

        for (task_index, task) in tasks.iter().enumerate().take(take) {
            for (source, text) in &task.available_sources {
                for target in &task.missing_targets {
                    let position = match queues
                        .iter()
                        .position(|q| &q.source_language == source && &q.target_language == target)
                    {
                        Some(position) => position,
                        None => {
                            queues.push(WorkQueue::new(source, target));
                            queues.len() - 1
                        }
                    };
                    let queue = &mut queues[position];
                    queue.texts.push(text.clone());
                    queue.task_indices.push(task_index);
                }
            }
        }

        queues
    }

    /// Total number of queued texts
    pub fn queued_count(queues: &[WorkQueue]) -> usize {
        queues.iter().map(WorkQueue::len).sum()
    }
}

/// Base decoding hyperparameters from the configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingParams {
    pub num_beams: u32,
    pub repetition_penalty: f32,
    pub no_repeat_ngram_size: u32,
    pub length_penalty: f32,
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self {
            num_beams: 3,
            repetition_penalty: 1.3,
            no_repeat_ngram_size: 2,
            length_penalty: 0.6,
        }
    }
}

/// Decoding strategy for one engine call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingMode {
    /// Single hypothesis, no sampling, strict repetition constraint
    Short,
    /// Beam search with the configured parameters
    Regular,
    /// Relaxed sampling used by retry attempts
    Sampling { attempt: u32 },
}

impl DecodingMode {
    /// Mode for the first attempt of a protected text
    pub fn initial_for(text: &str) -> Self {
        if is_short(text) {
            DecodingMode::Short
        } else {
            DecodingMode::Regular
        }
    }

    /// Engine parameters for this mode and a group of texts
    pub fn config(&self, params: &DecodingParams, texts: &[&str]) -> DecodingConfig {
        let input_tokens = texts.iter().map(|t| estimate_tokens(t)).max().unwrap_or(1);

        match *self {
            DecodingMode::Short => DecodingConfig {
                beam_count: 1,
                do_sample: false,
                temperature: None,
                repetition_penalty: Some(params.repetition_penalty),
                no_repeat_ngram_size: Some(1),
                length_penalty: params.length_penalty,
                max_new_tokens: short_token_budget(input_tokens),
            },
            DecodingMode::Regular => DecodingConfig {
                beam_count: params.num_beams,
                do_sample: false,
                temperature: None,
                repetition_penalty: Some(params.repetition_penalty),
                no_repeat_ngram_size: Some(params.no_repeat_ngram_size),
                length_penalty: params.length_penalty,
                max_new_tokens: regular_token_budget(input_tokens),
            },
            DecodingMode::Sampling { attempt } => DecodingConfig {
                beam_count: 1,
                do_sample: true,
                temperature: Some(sampling_temperature(attempt)),
                repetition_penalty: None,
                no_repeat_ngram_size: None,
                length_penalty: params.length_penalty,
                max_new_tokens: RETRY_TOKEN_BUDGET,
            },
        }
    }
}

/// Whether a text qualifies for the short decoding mode
///
/// At most one space and fewer than 30 characters.
pub fn is_short(text: &str) -> bool {
    text.matches(' ').count() <= 1 && text.chars().count() < SHORT_TEXT_MAX_CHARS
}

/// Rough input token count without a tokenizer
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count() as u32;
    (chars.div_ceil(4) + 1).min(MAX_INPUT_TOKENS)
}

pub fn short_token_budget(input_tokens: u32) -> u32 {
    (input_tokens * 3 / 2).max(5)
}

pub fn regular_token_budget(input_tokens: u32) -> u32 {
    (input_tokens * 2).clamp(20, 64)
}

/// Temperature for a retry attempt: 0.8, 1.0, 1.2, ...
pub fn sampling_temperature(attempt: u32) -> f32 {
    0.6 + 0.2 * attempt as f32
}
