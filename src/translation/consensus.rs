/*!
 * Multi-source consensus selection.
 *
 * When one key has text in several source languages, each source produces
 * its own candidate for a target. The selector picks one of them with fixed
 * tie-breaks so the same candidates always yield the same choice.
 */

use log::debug;

use crate::validation::ScriptValidator;

/// Candidate translations for one (task, target), keyed by source language
///
/// Sources keep the order in which their candidates were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    entries: Vec<(String, String)>,
}

impl Candidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the candidate of a source, replacing an earlier one
    pub fn insert(&mut self, source_language: &str, text: String) {
        match self.entries.iter_mut().find(|(lang, _)| lang == source_language) {
            Some((_, existing)) => *existing = text,
            None => self.entries.push((source_language.to_string(), text)),
        }
    }

    pub fn get(&self, source_language: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(lang, _)| lang == source_language)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(lang, text)| (lang.as_str(), text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>, T: Into<String>> FromIterator<(S, T)> for Candidates {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        let mut candidates = Candidates::new();
        for (lang, text) in iter {
            let lang: String = lang.into();
            candidates.insert(&lang, text.into());
        }
        candidates
    }
}

/// All candidates of one task, grouped by target language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    targets: Vec<(String, Candidates)>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target_language: &str, source_language: &str, text: String) {
        let position = match self.targets.iter().position(|(lang, _)| lang == target_language) {
            Some(position) => position,
            None => {
                self.targets.push((target_language.to_string(), Candidates::new()));
                self.targets.len() - 1
            }
        };
        self.targets[position].1.insert(source_language, text);
    }

    pub fn for_target(&self, target_language: &str) -> Option<&Candidates> {
        self.targets
            .iter()
            .find(|(lang, _)| lang == target_language)
            .map(|(_, candidates)| candidates)
    }

    /// Targets in the order their first candidate arrived
    pub fn targets(&self) -> impl Iterator<Item = (&str, &Candidates)> {
        self.targets.iter().map(|(lang, candidates)| (lang.as_str(), candidates))
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Preferred source languages for a target, most preferred first
///
/// The target code is trimmed and lowercased first, like every other
/// language lookup.
pub fn preferred_sources(target_language: &str) -> &'static [&'static str] {
    match target_language.trim().to_lowercase().as_str() {
        "ua" | "by" | "kz" => &["ru", "en"],
        "pl" | "de" | "fr" | "es" | "tr" => &["en", "ru"],
        _ => &[],
    }
}

/// Picks one translation among the candidates of a (task, target)
#[derive(Debug, Clone)]
pub struct ConsensusSelector {
    primary_source: String,
}

impl ConsensusSelector {
    /// Create a selector that falls back to `primary_source`
    pub fn new(primary_source: &str) -> Self {
        Self {
            primary_source: primary_source.to_string(),
        }
    }

    /// Select the final translation, or None when no candidate is plausible
    ///
    /// Order of preference: the only valid candidate, the value all valid
    /// candidates agree on (byte equality), the proximity table, the primary
    /// source, then the first valid candidate.
    pub fn select(&self, candidates: &Candidates, target_language: &str) -> Option<String> {
        let valid: Vec<(&str, &str)> = candidates
            .iter()
            .filter(|(_, text)| ScriptValidator::is_plausible(text, target_language))
            .collect();

        if valid.len() < candidates.len() {
            debug!(
                "Script check rejected {} of {} candidate(s) for {}",
                candidates.len() - valid.len(),
                candidates.len(),
                target_language
            );
        }

        let (_, first) = *valid.first()?;
        if valid.len() == 1 || valid.iter().all(|(_, text)| *text == first) {
            return Some(first.to_string());
        }

        let from = |lang: &str| {
            valid
                .iter()
                .find(|(source, _)| source.trim().eq_ignore_ascii_case(lang.trim()))
                .map(|(_, text)| text.to_string())
        };

        preferred_sources(target_language)
            .iter()
            .find_map(|lang| from(lang))
            .or_else(|| from(&self.primary_source))
            .or_else(|| Some(first.to_string()))
    }
}
