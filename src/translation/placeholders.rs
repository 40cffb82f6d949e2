/*!
 * Placeholder protection for translatable text.
 *
 * Localization strings carry spans the model must never touch: Bitrix macros
 * (`#NAME#`), brace and shell variables, printf specifiers, HTML tags and
 * entities, and a few BBCode tags. Before a text is sent to the engine every
 * such span is swapped for a synthetic `__PH_<n>__` token, and the original
 * spans are put back once the translation comes out.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Ordered alternatives; on overlap the first listed pattern wins.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    r"#\w+#",           // Bitrix macros
    r"\{\w+\}",         // brace variables
    r"%\w+",            // printf style
    r"\$\{\w+\}",       // shell style
    r"<[^>]+>",         // HTML/XML tags
    r"&[a-zA-Z0-9#]+;", // HTML entities
    r"\[url=.*?\]",
    r"\[/url\]",
    r"\[b\]",
    r"\[/b\]",
];

/// One combined pattern so already-matched spans are never matched twice
static COMBINED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&PLACEHOLDER_PATTERNS.join("|")).expect("Invalid placeholder regex")
});

/// Token-shaped runs already present in the input, with their number
static LITERAL_TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"__PH_(\d+)").expect("Invalid placeholder token regex")
});

/// Build the synthetic token for a given index
pub fn placeholder_token(index: usize) -> String {
    format!("__PH_{}__", index)
}

/// Mapping from synthetic token to the span it replaced, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, token: String, original: String) {
        self.entries.push((token, original));
    }

    /// Get the original span for a token
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, original)| original.as_str())
    }

    /// Iterate over the tokens in creation order
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(token, _)| token.as_str())
    }

    /// Iterate over (token, original) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, o)| (t.as_str(), o.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of protecting a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedText {
    /// The text the engine sees
    pub text: String,
    /// Tokens to put back after translation
    pub placeholders: PlaceholderMap,
}

/// Masks and unmasks non-translatable spans
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderProtector;

impl PlaceholderProtector {
    pub fn new() -> Self {
        Self
    }

    /// Replace every protectable span with a fresh token
    ///
    /// Tokens are numbered left to right, starting above every number that
    /// follows a literal `__PH_` in the input. Any token-shaped run that
    /// starts in the original text, including one that runs into a following
    /// token, then carries a number outside the map.
    pub fn protect(&self, text: &str) -> ProtectedText {
        if text.is_empty() {
            return ProtectedText {
                text: String::new(),
                placeholders: PlaceholderMap::new(),
            };
        }

        let mut placeholders = PlaceholderMap::new();
        let mut counter = Self::first_free_number(text);

        let protected = COMBINED_PATTERN.replace_all(text, |caps: &Captures| {
            let token = placeholder_token(counter);
            counter += 1;
            placeholders.insert(token.clone(), caps[0].to_string());
            token
        });

        ProtectedText {
            text: protected.into_owned(),
            placeholders,
        }
    }

    /// Put the original spans back in place of their tokens
    ///
    /// Only the map's own tokens are replaced, in one left-to-right pass:
    /// the earliest occurrence of any token is restored next, and restored
    /// spans are never scanned again. Other token-shaped text is left alone.
    pub fn restore(&self, text: &str, placeholders: &PlaceholderMap) -> String {
        if text.is_empty() || placeholders.is_empty() {
            return text.to_string();
        }

        let mut restored = String::with_capacity(text.len());
        let mut rest = text;

        loop {
            let next = placeholders
                .iter()
                .filter_map(|(token, original)| rest.find(token).map(|position| (position, token, original)))
                .min_by_key(|(position, _, _)| *position);
            let Some((position, token, original)) = next else {
                break;
            };

            restored.push_str(&rest[..position]);
            restored.push_str(original);
            rest = &rest[position + token.len()..];
        }

        restored.push_str(rest);
        restored
    }

    fn first_free_number(text: &str) -> usize {
        LITERAL_TOKEN_PATTERN
            .captures_iter(text)
            .filter_map(|caps| caps[1].parse::<usize>().ok())
            .map(|number| number.saturating_add(1))
            .max()
            .unwrap_or(0)
    }
}
