//! Language registry: the table of locale codes and their human-readable names.
//!
//! The registry is used to build translation prompts ("Translate to French")
//! and to supply the preset target list used when a catalog has no target files
//! yet. It uses a singleton pattern with `OnceLock`; the table is immutable.

use std::sync::OnceLock;

/// Code of the canonical (source) catalog, stored as `en.json`.
pub const CANONICAL_CODE: &str = "en";

/// Target languages used when none are requested and none exist on disk.
pub const DEFAULT_TARGETS: [&str; 10] = [
    "zh-CN", "zh-TW", "ja", "ko", "fr", "es", "de", "ar", "ru", "tr",
];

/// Metadata for a known language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Locale code as used in catalog file names (e.g., "fr", "zh-CN")
    pub code: &'static str,

    /// English name of the language, used in prompts (e.g., "French")
    pub name: &'static str,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Look up a language by code. Matching ignores ASCII case and treats
    /// `_` and `-` as the same separator, so `zh_cn` finds `zh-CN`.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        let wanted = normalize_code(code);
        self.languages
            .iter()
            .find(|lang| normalize_code(lang.code) == wanted)
    }

    /// English name for a code, if the code is known.
    pub fn name_for(&self, code: &str) -> Option<&'static str> {
        self.get_by_code(code).map(|lang| lang.name)
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().replace('_', "-").to_ascii_lowercase()
}

fn default_languages() -> Vec<LanguageConfig> {
    macro_rules! lang {
        ($code:expr, $name:expr) => {
            LanguageConfig {
                code: $code,
                name: $name,
            }
        };
    }

    vec![
        lang!("en", "English"),
        lang!("zh-CN", "Simplified Chinese"),
        lang!("zh-TW", "Traditional Chinese"),
        lang!("zh", "Chinese"),
        lang!("ja", "Japanese"),
        lang!("ko", "Korean"),
        lang!("fr", "French"),
        lang!("es", "Spanish"),
        lang!("de", "German"),
        lang!("ar", "Arabic"),
        lang!("ru", "Russian"),
        lang!("tr", "Turkish"),
        lang!("it", "Italian"),
        lang!("pt", "Portuguese"),
        lang!("pt-BR", "Brazilian Portuguese"),
        lang!("nl", "Dutch"),
        lang!("pl", "Polish"),
        lang!("uk", "Ukrainian"),
        lang!("sv", "Swedish"),
        lang!("da", "Danish"),
        lang!("fi", "Finnish"),
        lang!("nb", "Norwegian Bokmål"),
        lang!("cs", "Czech"),
        lang!("el", "Greek"),
        lang!("he", "Hebrew"),
        lang!("hi", "Hindi"),
        lang!("id", "Indonesian"),
        lang!("ms", "Malay"),
        lang!("th", "Thai"),
        lang!("vi", "Vietnamese"),
        lang!("fa", "Persian"),
        lang!("hu", "Hungarian"),
        lang!("ro", "Romanian"),
    ]
}
