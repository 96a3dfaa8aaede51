//! Locale identifiers: validated handles for target catalogs.

use crate::config::ConfigError;
use crate::i18n::registry::{LanguageRegistry, CANONICAL_CODE};
use std::fmt;

/// A validated locale identifier such as `fr` or `zh-CN`.
///
/// The identifier doubles as the catalog file stem (`fr.json`), so only
/// ASCII letters, digits, `-` and `_` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocaleId(String);

impl LocaleId {
    /// Parse a locale identifier, trimming surrounding whitespace.
    pub fn parse(code: &str) -> Result<LocaleId, ConfigError> {
        let code = code.trim();
        let valid = !code.is_empty()
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ConfigError::InvalidLocale(code.to_string()));
        }
        Ok(LocaleId(code.to_string()))
    }

    /// The canonical (source) locale.
    pub fn canonical() -> LocaleId {
        LocaleId(CANONICAL_CODE.to_string())
    }

    /// The raw identifier.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Human-readable language name for prompts, falling back to the raw
    /// identifier for codes the registry does not know.
    pub fn label(&self) -> &str {
        LanguageRegistry::get()
            .name_for(&self.0)
            .unwrap_or(self.0.as_str())
    }

    /// File name of this locale's catalog (`<code>.json`).
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }

    pub fn is_canonical(&self) -> bool {
        self.0 == CANONICAL_CODE
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a comma-separated list of locale codes (`"fr, es,,de"`).
///
/// Entries are trimmed and empties dropped. Duplicates keep their first
/// position and the canonical locale is removed.
pub fn parse_locale_list(list: &str) -> Result<Vec<LocaleId>, ConfigError> {
    let mut locales = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        locales.push(LocaleId::parse(part)?);
    }
    Ok(dedup_targets(locales))
}

/// Drop duplicates (first occurrence wins) and the canonical locale.
pub fn dedup_targets(locales: Vec<LocaleId>) -> Vec<LocaleId> {
    let mut seen = Vec::with_capacity(locales.len());
    for locale in locales {
        if !locale.is_canonical() && !seen.contains(&locale) {
            seen.push(locale);
        }
    }
    seen
}
