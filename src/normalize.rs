//! Stable on-disk formatting for catalog files.
//!
//! Every write goes through [`render`], so a catalog's layout depends only on
//! its contents: 2-space indentation, one entry per line, keys in canonical
//! order, non-ASCII text written as-is, trailing newline.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// Render a document in the canonical textual form.
pub fn render(document: &Value) -> Result<String> {
    let mut text =
        serde_json::to_string_pretty(document).context("Failed to serialize catalog")?;
    text.push('\n');
    Ok(text)
}

/// Write a document to `path` in the canonical textual form.
///
/// The text goes to a sibling temp file first and is then renamed over
/// `path`, so an interrupted write never leaves a truncated catalog.
pub async fn write_document(path: &Path, document: &Value) -> Result<()> {
    let text = render(document)?;
    let tmp = temp_path(path);

    tokio::fs::write(&tmp, text)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}

/// `dir/fr.json` -> `dir/.fr.json.tmp` (not matched by `*.json` listing)
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Re-render one JSON file in place.
pub async fn tidy_file(path: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    write_document(path, &document).await?;
    info!("{} has been tidied", path.display());
    Ok(())
}

/// Re-render every `*.json` file in `dir`, in file-name order. Returns the
/// files that were rewritten.
pub async fn tidy_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = json_files(dir).await?;
    files.sort();

    for file in &files {
        tidy_file(file).await?;
    }

    info!("All {} JSON files in {} have been tidied", files.len(), dir.display());
    Ok(files)
}

/// List `*.json` files directly inside `dir` (unsorted).
pub async fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let path = entry.path();
        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        if is_json && entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
            files.push(path);
        }
    }
    Ok(files)
}
