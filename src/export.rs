use crate::models::ScoreEntry;
use anyhow::{Context, Result};
use std::path::Path;

/// Header of the exported score file
pub const EXPORT_HEADER: [&str; 3] = ["question_id", "llm", "score"];

/// Serialize scores as CSV text, one row per entry in the given order.
/// The header is written even when there are no entries.
pub fn scores_to_csv(entries: &[ScoreEntry]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(EXPORT_HEADER)
        .context("Failed to write CSV header")?;
    for entry in entries {
        writer
            .serialize(entry)
            .with_context(|| format!("Failed to serialize score for {}", entry.question_id))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("Exported CSV is not valid UTF-8")
}

/// Write scores to `path`, creating parent directories as needed
pub fn write_scores(entries: &[ScoreEntry], path: &Path) -> Result<()> {
    let content = scores_to_csv(entries)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create directory: {}", parent.display())
            })?;
        }
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write scores file: {}", path.display()))?;

    tracing::info!(path = %path.display(), entries = entries.len(), "Exported scores");
    Ok(())
}
