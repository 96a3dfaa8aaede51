//! Missing-key reconciliation.
//!
//! Walks the canonical tree in key order and builds a merged tree with exactly
//! the canonical key set. Values already present in the target are carried
//! over untouched; only string leaves missing from the target are sent to the
//! translator. A failed translation keeps the canonical text for that leaf.

use crate::i18n::{LocaleId, MetricsReport, TranslationMetrics};
use crate::provider::Translator;
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// One locale's reconciliation pass.
pub struct Reconciler<'a, T> {
    translator: &'a T,
    locale: &'a LocaleId,
    metrics: &'a TranslationMetrics,
}

impl<'a, T: Translator> Reconciler<'a, T> {
    pub fn new(translator: &'a T, locale: &'a LocaleId, metrics: &'a TranslationMetrics) -> Self {
        Self {
            translator,
            locale,
            metrics,
        }
    }

    /// Merge `target` into the shape of `canonical`.
    ///
    /// `path_prefix` is prepended to key paths in log output (empty at the
    /// document root).
    pub async fn reconcile(
        &self,
        canonical: &Map<String, Value>,
        target: &Map<String, Value>,
        path_prefix: &str,
    ) -> Map<String, Value> {
        self.reconcile_object(canonical, target, path_prefix).await
    }

    fn reconcile_object<'s>(
        &'s self,
        canonical: &'s Map<String, Value>,
        target: &'s Map<String, Value>,
        prefix: &'s str,
    ) -> LocalBoxFuture<'s, Map<String, Value>> {
        async move {
            let mut merged = Map::with_capacity(canonical.len());

            for (key, canonical_value) in canonical {
                let path = join_key(prefix, key);
                let existing = target.get(key);

                let value = match canonical_value {
                    Value::Object(child) => {
                        let empty = Map::new();
                        let child_target = match existing {
                            Some(Value::Object(current)) => current,
                            Some(_) => {
                                debug!("{}: target value is not an object, rebuilding", path);
                                &empty
                            }
                            None => &empty,
                        };
                        Value::Object(self.reconcile_object(child, child_target, &path).await)
                    }
                    Value::Array(items) => {
                        Value::Array(self.reconcile_array(items, existing, &path).await)
                    }
                    _ => match existing {
                        Some(current) => {
                            self.metrics.record_preserved();
                            current.clone()
                        }
                        None => self.fill_missing(canonical_value, &path).await,
                    },
                };

                merged.insert(key.clone(), value);
            }

            merged
        }
        .boxed_local()
    }

    /// Arrays keep every element the target already has (never truncated)
    /// and gain the canonical elements past the target's length.
    fn reconcile_array<'s>(
        &'s self,
        items: &'s [Value],
        existing: Option<&'s Value>,
        path: &'s str,
    ) -> LocalBoxFuture<'s, Vec<Value>> {
        async move {
            let mut merged = match existing {
                Some(Value::Array(current)) => {
                    for _ in current {
                        self.metrics.record_preserved();
                    }
                    current.clone()
                }
                Some(_) => {
                    debug!("{}: target value is not an array, rebuilding", path);
                    Vec::with_capacity(items.len())
                }
                None => Vec::with_capacity(items.len()),
            };

            for (index, item) in items.iter().enumerate().skip(merged.len()) {
                let item_path = format!("{}[{}]", path, index);
                let value = match item {
                    Value::Object(child) => {
                        let empty = Map::new();
                        Value::Object(self.reconcile_object(child, &empty, &item_path).await)
                    }
                    Value::Array(nested) => {
                        Value::Array(self.reconcile_array(nested, None, &item_path).await)
                    }
                    _ => self.fill_missing(item, &item_path).await,
                };
                merged.push(value);
            }

            merged
        }
        .boxed_local()
    }

    /// Value for a leaf absent from the target: strings are translated,
    /// every other scalar is copied from canonical.
    async fn fill_missing(&self, canonical: &Value, path: &str) -> Value {
        match canonical {
            Value::String(text) => Value::String(self.translate_leaf(text, path).await),
            other => {
                debug!("{}: missing non-string value, copying from source", path);
                self.metrics.record_copied();
                other.clone()
            }
        }
    }

    async fn translate_leaf(&self, text: &str, path: &str) -> String {
        info!("Translating missing key \"{}\" to {}", path, self.locale);
        self.metrics.record_api_call();

        match self.translator.translate(text, self.locale.label()).await {
            Ok(translated) => {
                self.metrics.record_translated();
                translated
            }
            Err(e) => {
                warn!(
                    "Translation of \"{}\" to {} failed, keeping source text: {}",
                    path, self.locale, e
                );
                self.metrics.record_fallback();
                text.to_string()
            }
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Reconcile whole documents. A target root that is not an object is treated
/// as empty.
pub async fn reconcile_document<T: Translator>(
    translator: &T,
    locale: &LocaleId,
    canonical: &Map<String, Value>,
    target: &Value,
) -> (Map<String, Value>, MetricsReport) {
    let metrics = TranslationMetrics::new();
    let empty = Map::new();
    let target = match target {
        Value::Object(map) => map,
        _ => {
            warn!("{} catalog root is not an object, rebuilding it", locale);
            &empty
        }
    };

    let merged = Reconciler::new(translator, locale, &metrics)
        .reconcile(canonical, target, "")
        .await;
    (merged, metrics.report())
}
