/*!
 * Placeholder integrity validation for generated text.
 *
 * The retry ladder only accepts an output when every synthetic token that
 * was handed to the engine comes back verbatim.
 */

use log::debug;

use crate::translation::placeholders::PlaceholderMap;

/// Placeholder validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderValidationResult {
    /// Number of tokens the output had to contain
    pub expected_count: usize,
    /// Tokens that were not found in the output
    pub missing_tokens: Vec<String>,
}

impl PlaceholderValidationResult {
    /// Check if validation passed (all tokens present)
    pub fn passed(&self) -> bool {
        self.missing_tokens.is_empty()
    }
}

/// Placeholder validator for engine output
pub struct PlaceholderValidator;

impl PlaceholderValidator {
    /// Validate that every token of the map appears in the output
    pub fn validate(output: &str, placeholders: &PlaceholderMap) -> PlaceholderValidationResult {
        let missing_tokens: Vec<String> = placeholders
            .tokens()
            .filter(|token| !output.contains(token))
            .map(str::to_string)
            .collect();

        if !missing_tokens.is_empty() {
            debug!(
                "Placeholder validation: expected={}, missing={:?}",
                placeholders.len(),
                missing_tokens
            );
        }

        PlaceholderValidationResult {
            expected_count: placeholders.len(),
            missing_tokens,
        }
    }
}
