//! Catalog set management: one canonical catalog (`en.json`) and one catalog
//! per target locale, all in the same directory.

use crate::config::Config;
use crate::i18n::{dedup_targets, LocaleId, MetricsReport, DEFAULT_TARGETS};
use crate::normalize::{json_files, write_document};
use crate::provider::Translator;
use crate::reconcile::reconcile_document;
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of one locale's pass.
#[derive(Debug, Clone)]
pub struct LocaleReport {
    pub locale: LocaleId,
    /// The catalog file did not exist before this run
    pub created: bool,
    pub metrics: MetricsReport,
}

/// Outcome of a whole run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub locales: Vec<LocaleReport>,
}

impl RunSummary {
    pub fn translated(&self) -> usize {
        self.locales.iter().map(|l| l.metrics.translated).sum()
    }

    /// Leaves that kept the source text because translation failed.
    pub fn fallbacks(&self) -> usize {
        self.locales.iter().map(|l| l.metrics.fallbacks).sum()
    }

    pub fn preserved(&self) -> usize {
        self.locales.iter().map(|l| l.metrics.preserved).sum()
    }

    /// True if every attempted translation fell back to source text.
    pub fn is_fully_degraded(&self) -> bool {
        self.fallbacks() > 0 && self.translated() == 0
    }

    /// Apply the exit policy: with `fail_on_fallback` set, any leaf that kept
    /// its source text fails the run.
    pub fn check(&self, config: &Config) -> Result<()> {
        if config.fail_on_fallback && self.fallbacks() > 0 {
            bail!(
                "{} entries could not be translated and were filled with source text",
                self.fallbacks()
            );
        }
        Ok(())
    }
}

/// The locale catalogs in one directory.
#[derive(Debug, Clone)]
pub struct CatalogSet {
    dir: PathBuf,
}

impl CatalogSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of a locale's catalog file.
    pub fn path_for(&self, locale: &LocaleId) -> PathBuf {
        self.dir.join(locale.file_name())
    }

    /// Load the canonical catalog. A missing or malformed canonical catalog
    /// is fatal: there is nothing to reconcile against.
    pub async fn load_canonical(&self) -> Result<Map<String, Value>> {
        let path = self.path_for(&LocaleId::canonical());
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            bail!("Canonical catalog {} not found", path.display());
        }

        match read_document(&path).await? {
            Value::Object(map) => Ok(map),
            _ => bail!("Canonical catalog {} must contain a JSON object", path.display()),
        }
    }

    /// Locales with an existing catalog file, excluding canonical, sorted.
    /// Files whose name is not a valid locale identifier are skipped.
    pub async fn discover_locales(&self) -> Result<Vec<LocaleId>> {
        let mut locales = Vec::new();
        for path in json_files(&self.dir).await? {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match LocaleId::parse(stem) {
                Ok(locale) if !locale.is_canonical() => locales.push(locale),
                Ok(_) => {}
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
        locales.sort();
        Ok(locales)
    }

    /// The locales to process: the requested list if non-empty, otherwise
    /// the catalogs already present, otherwise the preset list.
    pub async fn resolve_targets(&self, requested: &[LocaleId]) -> Result<Vec<LocaleId>> {
        let requested = dedup_targets(requested.to_vec());
        if !requested.is_empty() {
            return Ok(requested);
        }

        info!(
            "No target languages specified. Using existing language files in {}",
            self.dir.display()
        );
        let existing = self.discover_locales().await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        info!("No existing language files found, using the default language set");
        DEFAULT_TARGETS
            .iter()
            .map(|code| LocaleId::parse(code).map_err(anyhow::Error::from))
            .collect()
    }

    /// Create `<locale>.json` as an empty object if it does not exist.
    /// Returns whether the file was created.
    pub async fn ensure_document(&self, locale: &LocaleId) -> Result<bool> {
        let path = self.path_for(locale);
        debug!("Checking if file exists: {}", path.display());
        if tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to check {}", path.display()))?
        {
            return Ok(false);
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        write_document(&path, &Value::Object(Map::new())).await?;
        info!("Created empty catalog {}", path.display());
        Ok(true)
    }

    /// Load a target catalog. A missing or blank file reads as `{}`.
    pub async fn load_target(&self, locale: &LocaleId) -> Result<Value> {
        let path = self.path_for(locale);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(Value::Object(Map::new()));
        }
        read_document(&path).await
    }

    /// Reconcile every target locale against the canonical catalog, one
    /// locale at a time, and write the results back.
    ///
    /// An empty `targets` list is resolved through [`Self::resolve_targets`].
    pub async fn run<T: Translator>(
        &self,
        translator: &T,
        targets: &[LocaleId],
    ) -> Result<RunSummary> {
        let canonical = self.load_canonical().await?;
        let targets = self.resolve_targets(targets).await?;
        info!(
            "Target languages: {}",
            targets
                .iter()
                .map(LocaleId::code)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut created = Vec::new();
        for locale in &targets {
            if self.ensure_document(locale).await? {
                created.push(locale.clone());
            }
        }

        let mut summary = RunSummary::default();
        for locale in targets {
            let path = self.path_for(&locale);
            info!("Processing {}...", path.display());

            let target = self.load_target(&locale).await?;
            let (merged, metrics) =
                reconcile_document(translator, &locale, &canonical, &target).await;

            write_document(&path, &Value::Object(merged)).await?;
            info!(
                "{}: {} translated, {} preserved, {} copied, {} fell back to source ({:.0}% of {} provider calls succeeded)",
                locale,
                metrics.translated,
                metrics.preserved,
                metrics.copied,
                metrics.fallbacks,
                metrics.api_success_rate,
                metrics.api_calls
            );

            summary.locales.push(LocaleReport {
                created: created.contains(&locale),
                locale,
                metrics,
            });
        }

        info!("All language files have been processed");
        Ok(summary)
    }
}

async fn read_document(path: &Path) -> Result<Value> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
