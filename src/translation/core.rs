/*!
 * Core translation service implementation.
 *
 * The service turns one sub-batch of source texts into cleaned translations:
 * glossary hits first, then placeholder protection, the retry ladder,
 * restoration and cleanup for the items that made it through.
 */

use log::debug;

use crate::engine::{Engine, TranslationEngine};
use crate::errors::EngineError;
use crate::translation::glossary::Glossary;
use crate::translation::placeholders::PlaceholderProtector;
use crate::translation::postprocess::PostProcessor;
use crate::translation::retry::RetryLadder;

/// Translation service for one (source, target) sub-batch at a time
#[derive(Debug, Clone)]
pub struct TranslationService {
    glossary: Glossary,
    protector: PlaceholderProtector,
    ladder: RetryLadder,
    cleaner: PostProcessor,
}

impl TranslationService {
    /// Create a new translation service
    pub fn new(glossary: Glossary, ladder: RetryLadder) -> Self {
        Self {
            glossary,
            protector: PlaceholderProtector::new(),
            ladder,
            cleaner: PostProcessor::new(),
        }
    }

    /// Translate a batch of source texts
    ///
    /// Returns one entry per input; `None` marks an item that never produced
    /// output with all of its placeholders.
    pub async fn translate_batch<E: TranslationEngine>(
        &self,
        engine: &Engine<E>,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<Option<String>>, EngineError> {
        let mut results: Vec<Option<String>> = vec![None; texts.len()];
        let mut positions = Vec::with_capacity(texts.len());
        let mut protected = Vec::with_capacity(texts.len());

        for (position, text) in texts.iter().enumerate() {
            if let Some(fixed) = self.glossary.lookup(text, target_language) {
                results[position] = Some(fixed.to_string());
                continue;
            }
            positions.push(position);
            protected.push(self.protector.protect(text));
        }

        let glossary_hits = texts.len() - positions.len();
        if glossary_hits > 0 {
            debug!("{} -> {}: {} glossary hit(s)", source_language, target_language, glossary_hits);
        }

        if protected.is_empty() {
            return Ok(results);
        }

        let states = self
            .ladder
            .run(engine, &protected, source_language, target_language)
            .await?;

        for ((&position, item), state) in positions.iter().zip(&protected).zip(states) {
            if let Some(raw) = state.into_output() {
                let restored = self.protector.restore(&raw, &item.placeholders);
                results[position] = Some(self.cleaner.clean(&restored));
            }
        }

        Ok(results)
    }
}
