/*!
 * Language utilities for Bitrix-style language codes.
 *
 * Bitrix localization files use their own two-letter codes ("ua" for
 * Ukrainian, "br" for Brazilian Portuguese, "cn"/"tw" for Chinese). This
 * module maps them to the FLORES-200 codes the NLLB engine expects and to
 * ISO 639-1 codes for validation and display names.
 */

use anyhow::{Result, anyhow};
use isolang::Language;

/// Writing system of a target language, as far as the script check cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptClass {
    /// Languages written in Cyrillic
    Cyrillic,
    /// Languages written in Latin script
    Latin,
    /// Anything the script check does not know about
    Unchecked,
}

/// Bitrix code, NLLB code, ISO 639-1 code
const LANGUAGE_TABLE: &[(&str, &str, &str)] = &[
    ("ru", "rus_Cyrl", "ru"),
    ("en", "eng_Latn", "en"),
    ("tr", "tur_Latn", "tr"),
    ("ua", "ukr_Cyrl", "uk"),
    ("de", "deu_Latn", "de"),
    ("fr", "fra_Latn", "fr"),
    ("es", "spa_Latn", "es"),
    ("it", "ita_Latn", "it"),
    ("pl", "pol_Latn", "pl"),
    ("br", "por_Latn", "pt"),
    ("vn", "vie_Latn", "vi"),
    ("cn", "zho_Hans", "zh"), // Simplified Chinese
    ("tw", "zho_Hant", "zh"), // Traditional Chinese
    ("by", "bel_Cyrl", "be"),
    ("kz", "kaz_Cyrl", "kk"),
    ("bg", "bul_Cyrl", "bg"),
    ("mk", "mkd_Cyrl", "mk"),
    ("sr", "srp_Cyrl", "sr"),
];

const CYRILLIC_LANGUAGES: &[&str] = &["ru", "ua", "by", "bg", "mk", "sr", "kz"];
const LATIN_LANGUAGES: &[&str] = &["en", "tr", "de", "fr", "es", "it", "pl", "br", "vn"];

fn lookup(code: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    let normalized = code.trim().to_lowercase();
    LANGUAGE_TABLE.iter().find(|(bitrix, _, _)| *bitrix == normalized)
}

/// Get the NLLB (FLORES-200) code for a Bitrix language code
///
/// Unknown codes are passed through unchanged and left for the engine to judge.
pub fn nllb_code(code: &str) -> String {
    lookup(code)
        .map(|(_, nllb, _)| nllb.to_string())
        .unwrap_or_else(|| code.trim().to_string())
}

/// Normalize a Bitrix language code to ISO 639-1
pub fn to_iso_639_1(code: &str) -> Result<String> {
    if let Some((_, _, iso)) = lookup(code) {
        return Ok(iso.to_string());
    }

    let normalized = code.trim().to_lowercase();
    if normalized.len() == 2 && Language::from_639_1(&normalized).is_some() {
        return Ok(normalized);
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Validate that a language code is usable for translation
pub fn validate_language_code(code: &str) -> Result<()> {
    to_iso_639_1(code).map(|_| ())
}

/// Get the English language name for a Bitrix language code
pub fn get_language_name(code: &str) -> Result<String> {
    let iso = to_iso_639_1(code)?;
    let lang = Language::from_639_1(&iso)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", iso))?;

    Ok(lang.to_name().to_string())
}

/// Get the script class used by the plausibility check
pub fn script_class(code: &str) -> ScriptClass {
    let normalized = code.trim().to_lowercase();
    if CYRILLIC_LANGUAGES.contains(&normalized.as_str()) {
        ScriptClass::Cyrillic
    } else if LATIN_LANGUAGES.contains(&normalized.as_str()) {
        ScriptClass::Latin
    } else {
        ScriptClass::Unchecked
    }
}
