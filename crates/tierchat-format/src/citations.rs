// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Numbered source lists built from grounding metadata.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use tierchat_core::types::GroundingMetadata;

/// Heading placed above the numbered sources.
pub const BIBLIOGRAPHY_HEADING: &str = "Referensi:";

/// Map 1-based chunk position to web URL.
///
/// Empty unless the metadata has both supports and chunks. Chunks without a
/// web URL keep their position but get no entry, so numbering matches the
/// `[n]` markers the model writes.
pub fn collect_citations(grounding: Option<&GroundingMetadata>) -> BTreeMap<usize, String> {
    let Some(meta) = grounding else {
        return BTreeMap::new();
    };
    if meta.supports.is_empty() || meta.chunks.is_empty() {
        return BTreeMap::new();
    }

    meta.chunks
        .iter()
        .enumerate()
        .filter_map(|(i, chunk)| {
            let uri = chunk.web.as_ref()?.uri.as_deref()?;
            (!uri.is_empty()).then(|| (i + 1, uri.to_string()))
        })
        .collect()
}

/// Render `[n] url` lines under the heading, or an empty string.
pub fn render_bibliography(citations: &BTreeMap<usize, String>) -> String {
    if citations.is_empty() {
        return String::new();
    }
    let mut out = String::from(BIBLIOGRAPHY_HEADING);
    for (idx, url) in citations {
        let _ = write!(out, "\n[{idx}] {url}");
    }
    out
}

/// Collect and render in one step.
pub fn citation_block(grounding: Option<&GroundingMetadata>) -> String {
    render_bibliography(&collect_citations(grounding))
}
