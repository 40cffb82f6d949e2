/*!
 * Script plausibility check for translation candidates.
 *
 * A coarse hallucination filter: a Cyrillic-class target must contain some
 * Cyrillic when it contains Latin letters, and a Latin-class target must not
 * contain any Cyrillic. It is not language identification.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::language_utils::{self, ScriptClass};

static CYRILLIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{Cyrillic}").expect("Invalid cyrillic regex")
});

static LATIN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z]").expect("Invalid latin regex")
});

/// Script validator for candidate translations
pub struct ScriptValidator;

impl ScriptValidator {
    /// Check whether a candidate is plausible for the target language
    ///
    /// Empty candidates are never plausible. Languages outside both script
    /// classes are not checked.
    pub fn is_plausible(text: &str, target_language: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let has_cyrillic = CYRILLIC_REGEX.is_match(text);
        let has_latin = LATIN_REGEX.is_match(text);

        match language_utils::script_class(target_language) {
            ScriptClass::Cyrillic => !(has_latin && !has_cyrillic),
            ScriptClass::Latin => !has_cyrillic,
            ScriptClass::Unchecked => true,
        }
    }
}
