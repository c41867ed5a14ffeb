//! Bounded excerpt loading for upstream artifacts.
//!
//! Stages never consume whole upstream documents: each (stage, upstream
//! type) pairing declares a character budget, and the loader returns at most
//! that many characters of the referenced content. Truncation is a plain
//! prefix cut — it may land mid-sentence or mid-table. That bounds the
//! worst-case task size regardless of how large any upstream document has
//! grown, at the accepted cost of silently dropping tail content.

use crate::core::ArtifactRecord;
use std::fs;
use tracing::warn;

/// Loads a bounded excerpt of an artifact's content.
///
/// Never fails and never blocks the pipeline:
///
/// - a `None` record (an optional input with no registry entry) yields `""`;
/// - an unreadable path yields `""` (the record may outlive its file —
///   readability is re-checked here, at consumption time, every time);
/// - otherwise the first `max_chars` characters of the content are returned.
///
/// The bound is measured in characters, not bytes, so the cut never splits
/// a UTF-8 code point.
#[must_use]
pub fn load_excerpt(record: Option<&ArtifactRecord>, max_chars: usize) -> String {
    let Some(record) = record else {
        return String::new();
    };

    match fs::read_to_string(record.path()) {
        Ok(content) => truncate_chars(&content, max_chars),
        Err(err) => {
            warn!(
                artifact_type = %record.artifact_type,
                path = %record.path().display(),
                "artifact content unreadable, degrading to empty excerpt: {err}"
            );
            String::new()
        }
    }
}

fn truncate_chars(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => content[..byte_idx].to_string(),
        None => content.to_string(),
    }
}
