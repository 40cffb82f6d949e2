/*!
 * Fixed translations that bypass the engine.
 *
 * The glossary maps an exact source text to per-target translations. A hit
 * is used verbatim for that (text, target) pair.
 */

use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;

use crate::file_utils::FileManager;

/// Exact-match glossary: source text -> target language -> translation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glossary {
    entries: HashMap<String, HashMap<String, String>>,
}

impl Glossary {
    /// Create an empty glossary
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a glossary file; a missing or unreadable file gives an empty glossary
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !FileManager::file_exists(path) {
            warn!("Glossary file not found: {}, continuing without glossary", path.display());
            return Self::new();
        }

        let glossary = FileManager::read_to_string(path)
            .map_err(|e| format!("{:#}", e))
            .and_then(|content| Self::from_json_str(&content).map_err(|e| e.to_string()));

        match glossary {
            Ok(glossary) => {
                info!("Loaded glossary with {} entries from {}", glossary.len(), path.display());
                glossary
            }
            Err(e) => {
                warn!("Failed to load glossary {}: {}, continuing without glossary", path.display(), e);
                Self::new()
            }
        }
    }

    /// Parse a glossary from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let entries: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    /// Add or replace one entry
    pub fn insert(&mut self, source_text: &str, target_language: &str, translation: &str) {
        self.entries
            .entry(source_text.to_string())
            .or_default()
            .insert(target_language.to_string(), translation.to_string());
    }

    /// Fixed translation of `source_text` into `target_language`
    pub fn lookup(&self, source_text: &str, target_language: &str) -> Option<&str> {
        self.entries
            .get(source_text)?
            .get(target_language)
            .map(String::as_str)
    }

    /// Number of source texts
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
