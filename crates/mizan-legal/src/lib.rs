pub mod advisor;
pub mod drafting;
pub mod laws;
pub mod ocr;
pub mod search;

use mizan_core::types::Language;

/// Resolve an optional language code from a request, falling back to `default`.
/// Unknown codes fall back too.
pub fn resolve_language(code: Option<&str>, default: Language) -> Language {
    code.and_then(Language::parse).unwrap_or(default)
}
