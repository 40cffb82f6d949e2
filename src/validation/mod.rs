/*!
 * Validation of engine output and translation candidates.
 *
 * - `placeholders`: every protected token must survive generation
 * - `script`: coarse script check of a candidate against its target language
 */

pub mod placeholders;
pub mod script;

// Re-export main types
pub use placeholders::{PlaceholderValidationResult, PlaceholderValidator};
pub use script::ScriptValidator;
