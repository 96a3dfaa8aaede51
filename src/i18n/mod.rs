//! Locale handling for catalog reconciliation.
//!
//! # Architecture
//!
//! - `registry`: table of known language codes and names, canonical code,
//!   preset target list
//! - `language`: validated `LocaleId` and list parsing
//! - `metrics`: per-locale reconciliation counters

mod language;
mod metrics;
mod registry;

pub use language::{dedup_targets, parse_locale_list, LocaleId};
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry, CANONICAL_CODE, DEFAULT_TARGETS};
