//! Page Paginator: cuts (photo, text chunk) pairs into printable pages.
//!
//! Input segments must already be in capture-time order (see
//! `models::sort_by_capture_time`). Output pages are rebuilt from scratch on every
//! call; nothing here is mutated in place.

use serde::{Deserialize, Serialize};

use crate::composer::segmenter::fold_into;
use crate::composer::template::TemplateName;
use crate::models::PhotoSegment;

/// Photos per page for the multi-page templates.
pub const DEFAULT_PAGE_CAPACITY: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaginationPolicy {
    /// Everything on one page; the template's arrangement handles sub-layout.
    SinglePage,
    /// `ceil(n / capacity)` pages of sequential slices. The last page may be short.
    FixedCapacity { capacity: usize },
}

/// One printable canvas. `segments.len() == text_chunks.len()` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub segments: Vec<PhotoSegment>,
    pub text_chunks: Vec<String>,
}

/// Groups segments and their aligned text chunks into pages for `template`.
///
/// `text_chunks` is aligned to `segments` first: missing chunks become empty strings
/// and surplus chunks are appended to the last one, so no text is lost and every page
/// keeps the 1:1 alignment. An empty segment list yields no pages.
pub fn paginate(
    segments: &[PhotoSegment],
    text_chunks: &[String],
    template: TemplateName,
) -> Vec<Page> {
    if segments.is_empty() {
        return Vec::new();
    }

    let chunks = fold_into(text_chunks.to_vec(), segments.len());

    let capacity = match template.policy() {
        PaginationPolicy::SinglePage => segments.len(),
        PaginationPolicy::FixedCapacity { capacity } => capacity.max(1),
    };

    segments
        .chunks(capacity)
        .zip(chunks.chunks(capacity))
        .enumerate()
        .map(|(index, (segs, texts))| Page {
            index,
            segments: segs.to_vec(),
            text_chunks: texts.to_vec(),
        })
        .collect()
}
