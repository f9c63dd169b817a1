// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-processing of generated replies.
//!
//! - [`reflow`]: unwraps fenced and indented code into plain lines (lossy)
//! - [`tidy_fences`]: keeps fences but normalizes their markers, for
//!   markdown-capable surfaces
//! - [`citation_block`]: builds the numbered source list from grounding metadata

pub mod citations;
pub mod fences;
pub mod reflow;

pub use citations::{citation_block, collect_citations, render_bibliography};
pub use fences::tidy_fences;
pub use reflow::reflow;
