//! Fixed set of languages accepted for videos and tracks.

/// Language codes accepted for videos and tracks.
///
/// Codes are lowercase ISO 639-1, kept sorted so membership checks can use
/// binary search.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "ar", "de", "en", "es", "fr", "hi", "it", "ja", "ko", "nl", "pl", "pt", "ru", "sv", "tr", "zh",
];

/// Returns whether a language code belongs to the supported set
pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.binary_search(&code).is_ok()
}
