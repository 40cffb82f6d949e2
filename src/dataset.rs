/*!
 * Localization dataset: file -> key -> language -> text-or-null.
 *
 * The dataset is kept as an order-preserving JSON tree so files, keys and
 * languages come back out in the order they were read. The shape is checked
 * once at load time; after that the accessors can rely on it.
 */

use serde_json::{Map, Value};
use std::path::Path;

use crate::errors::DatasetError;
use crate::file_utils::FileManager;

/// Translations of one key, language code -> text or null
pub type KeyTranslations = Map<String, Value>;

/// In-memory localization dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalizationDataset {
    files: Map<String, Value>,
}

impl LocalizationDataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from a parsed JSON value, checking its shape
    pub fn from_value(value: Value) -> Result<Self, DatasetError> {
        let Value::Object(files) = value else {
            return Err(DatasetError::Malformed("root must be an object".to_string()));
        };

        for (file_id, keys) in &files {
            let Value::Object(keys) = keys else {
                return Err(DatasetError::Malformed(format!("file '{}' must map keys to objects", file_id)));
            };
            for (key, translations) in keys {
                let Value::Object(translations) = translations else {
                    return Err(DatasetError::Malformed(format!(
                        "entry '{}' in '{}' must map languages to text",
                        key, file_id
                    )));
                };
                for (lang, text) in translations {
                    if !(text.is_string() || text.is_null()) {
                        return Err(DatasetError::Malformed(format!(
                            "value for '{}' of '{}' in '{}' must be a string or null",
                            lang, key, file_id
                        )));
                    }
                }
            }
        }

        Ok(Self { files })
    }

    /// Parse a dataset from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| DatasetError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Load a dataset from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path).map_err(|e| DatasetError::Read {
            path: path.display().to_string(),
            message: format!("{:#}", e),
        })?;
        Self::from_json_str(&content)
    }

    /// Serialize as pretty JSON (2-space indent, non-ASCII kept as is)
    pub fn to_json_string(&self) -> Result<String, DatasetError> {
        serde_json::to_string_pretty(&self.files).map_err(|e| DatasetError::Write {
            path: String::new(),
            message: e.to_string(),
        })
    }

    /// Rewrite the whole dataset file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DatasetError> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        FileManager::write_atomic(path, &json).map_err(|e| DatasetError::Write {
            path: path.display().to_string(),
            message: format!("{:#}", e),
        })
    }

    /// File identifiers in insertion order
    pub fn file_ids(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Keys of one file with their translations, in insertion order
    ///
    /// An unknown file yields nothing.
    pub fn entries<'a>(&'a self, file_id: &str) -> impl Iterator<Item = (&'a str, &'a KeyTranslations)> + 'a {
        self.files
            .get(file_id)
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|keys| keys.iter())
            .filter_map(|(key, translations)| translations.as_object().map(|t| (key.as_str(), t)))
    }

    /// Stored text for (file, key, language); null and absent are both None
    pub fn text(&self, file_id: &str, key: &str, lang: &str) -> Option<&str> {
        self.files
            .get(file_id)?
            .get(key)?
            .get(lang)?
            .as_str()
    }

    /// Write a translation into an existing (file, key) entry
    ///
    /// Returns false when the file or key does not exist; the dataset is
    /// never grown with new files or keys.
    pub fn set_text(&mut self, file_id: &str, key: &str, lang: &str, text: &str) -> bool {
        let Some(translations) = self
            .files
            .get_mut(file_id)
            .and_then(Value::as_object_mut)
            .and_then(|keys| keys.get_mut(key))
            .and_then(Value::as_object_mut)
        else {
            return false;
        };

        translations.insert(lang.to_string(), Value::String(text.to_string()));
        true
    }

    /// Split the file identifiers into checkpoint groups
    ///
    /// A group size of 0 puts every file in a single group.
    pub fn file_groups(&self, group_size: usize) -> Vec<Vec<String>> {
        let ids: Vec<String> = self.files.keys().cloned().collect();
        if group_size == 0 {
            return vec![ids];
        }
        ids.chunks(group_size).map(<[String]>::to_vec).collect()
    }
}
