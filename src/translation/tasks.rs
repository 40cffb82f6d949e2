/*!
 * Discovery of translation work in a localization dataset.
 */

use crate::dataset::{KeyTranslations, LocalizationDataset};

/// One key that has at least one usable source and at least one missing target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTask {
    /// File the key belongs to
    pub file_id: String,
    /// Key inside the file
    pub key: String,
    /// Usable source texts in source priority order
    pub available_sources: Vec<(String, String)>,
    /// Targets whose stored value is absent, null or empty, in target order
    pub missing_targets: Vec<String>,
}

impl TranslationTask {
    /// Build a task from one dataset entry, or None when there is nothing to do
    pub fn from_entry(
        file_id: &str,
        key: &str,
        translations: &KeyTranslations,
        source_languages: &[String],
        target_languages: &[String],
    ) -> Option<Self> {
        let mut available_sources: Vec<(String, String)> = Vec::new();
        for lang in source_languages {
            if available_sources.iter().any(|(l, _)| l == lang) {
                continue;
            }
            if let Some(text) = translations.get(lang).and_then(|v| v.as_str()) {
                if !text.trim().is_empty() {
                    available_sources.push((lang.clone(), text.to_string()));
                }
            }
        }

        if available_sources.is_empty() {
            return None;
        }

        let mut missing_targets: Vec<String> = Vec::new();
        for lang in target_languages {
            if missing_targets.contains(lang) {
                continue;
            }
            let present = translations
                .get(lang)
                .and_then(|v| v.as_str())
                .is_some_and(|text| !text.is_empty());
            if !present {
                missing_targets.push(lang.clone());
            }
        }

        if missing_targets.is_empty() {
            return None;
        }

        Some(Self {
            file_id: file_id.to_string(),
            key: key.to_string(),
            available_sources,
            missing_targets,
        })
    }

    /// Source text for a language, if it is one of the usable sources
    pub fn source_text(&self, lang: &str) -> Option<&str> {
        self.available_sources
            .iter()
            .find(|(l, _)| l == lang)
            .map(|(_, text)| text.as_str())
    }
}

/// Scans a dataset for keys that need translation
pub struct TaskCollector<'a> {
    source_languages: &'a [String],
    target_languages: &'a [String],
}

impl<'a> TaskCollector<'a> {
    pub fn new(source_languages: &'a [String], target_languages: &'a [String]) -> Self {
        Self {
            source_languages,
            target_languages,
        }
    }

    /// Collect tasks over the selected files, or over every file when no filter is given
    ///
    /// Files and keys are visited in dataset order; unknown files in the
    /// filter are skipped.
    pub fn collect(&self, dataset: &LocalizationDataset, file_filter: Option<&[String]>) -> Vec<TranslationTask> {
        let files: Vec<&str> = match file_filter {
            Some(filter) => filter.iter().map(String::as_str).collect(),
            None => dataset.file_ids().collect(),
        };

        let mut tasks = Vec::new();
        for file_id in files {
            for (key, translations) in dataset.entries(file_id) {
                if let Some(task) = TranslationTask::from_entry(
                    file_id,
                    key,
                    translations,
                    self.source_languages,
                    self.target_languages,
                ) {
                    tasks.push(task);
                }
            }
        }
        tasks
    }
}
