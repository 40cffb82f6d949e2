/*!
 * Cleanup of raw engine output.
 *
 * NLLB-style models have a few stable artifacts on short UI strings: they
 * repeat a word ("Delete Delete"), repeat it around a dash ("Час - час."),
 * and append stray punctuation to one-word answers ("Yes,"). The cleaner
 * removes those after placeholders have been restored.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// "WORD - WORD." where the two words may be the same
static DASH_REPEAT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\w+)\s*-\s*(\w+\.?)\s*").expect("Invalid dash repeat regex")
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Single words shorter than this lose their trailing punctuation
const SHORT_WORD_MAX_CHARS: usize = 15;

/// Cleaner for translated text
#[derive(Debug, Clone, Copy, Default)]
pub struct PostProcessor;

impl PostProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a translation whose placeholders are already restored
    ///
    /// The cleanup steps are applied until the text stops changing, which
    /// makes the function idempotent. Every step only ever shortens the text,
    /// so the loop terminates.
    pub fn clean(&self, text: &str) -> String {
        let mut current = Self::clean_once(text);
        loop {
            let next = Self::clean_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn clean_once(text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = normalize_whitespace(text);
        let text = normalize_whitespace(&collapse_dash_repeats(&text));
        let result = remove_consecutive_duplicates(&text);

        if result.split_whitespace().count() == 1 && result.chars().count() < SHORT_WORD_MAX_CHARS {
            return result.trim_end_matches(TRAILING_PUNCTUATION).to_string();
        }

        result
    }
}

/// Collapse runs of whitespace to single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collapse_dash_repeats(text: &str) -> String {
    DASH_REPEAT_REGEX
        .replace_all(text, |caps: &Captures| {
            let first = &caps[1];
            let second = caps[2].trim_end_matches('.');
            if first.to_lowercase() == second.to_lowercase() {
                format!("{} ", first)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn comparable(word: &str) -> String {
    word.trim_end_matches(TRAILING_PUNCTUATION).to_lowercase()
}

fn remove_consecutive_duplicates(text: &str) -> String {
    let mut deduped: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        let is_repeat = deduped
            .last()
            .is_some_and(|previous| comparable(previous) == comparable(word));
        if !is_repeat {
            deduped.push(word);
        }
    }
    deduped.join(" ")
}
