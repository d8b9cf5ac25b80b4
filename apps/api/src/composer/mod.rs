// Diary Page Composer
// Text segmentation, template selection, pagination, and per-template arrangement.
// Everything here is pure and synchronous; handlers call straight into it.

pub mod arrange;
pub mod handlers;
pub mod paginator;
pub mod segmenter;
pub mod template;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::composer::arrange::{arrangement_for, Block};
use crate::composer::paginator::{paginate, Page};
use crate::composer::segmenter::{segment, strip_annotations};
use crate::composer::template::TemplateName;
use crate::models::{sort_by_capture_time, PhotoSegment};
use crate::overlay::Overlay;

#[derive(Debug, Error, PartialEq)]
pub enum ComposeError {
    #[error("target chunk count must be at least 1")]
    ZeroTargetCount,

    #[error("target chunk count {count} exceeds the limit of {max}")]
    TargetCountTooLarge { count: usize, max: usize },

    #[error("layout choice index must be 0 or 1, got {0}")]
    ChoiceOutOfRange(usize),
}

/// A page ready for rendering: its slice of the diary, the template's block
/// geometry, and any decorative overlays the user placed on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedPage {
    #[serde(flatten)]
    pub page: Page,
    pub blocks: Vec<Block>,
    /// Display date per photo, aligned with `page.segments`.
    pub photo_dates: Vec<String>,
    #[serde(default)]
    pub overlays: Vec<Overlay>,
}

/// Date format printed under each photo.
pub const PHOTO_DATE_FORMAT: &str = "%Y.%m.%d";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedDiary {
    pub title: String,
    pub template: TemplateName,
    pub pages: Vec<ComposedPage>,
}

/// Full composition pass: order photos, split the text, paginate, arrange.
///
/// With no photos the result has zero pages and the renderer shows only the title.
/// Photos without a timestamp are dated `now`. Overlays are left empty; the caller
/// attaches them from an overlay board.
pub fn compose(
    title: &str,
    full_text: &str,
    template: TemplateName,
    segments: &[PhotoSegment],
    now: DateTime<Utc>,
) -> Result<ComposedDiary, ComposeError> {
    let mut ordered = segments.to_vec();
    sort_by_capture_time(&mut ordered);

    let chunks = if ordered.is_empty() {
        Vec::new()
    } else {
        segment(&strip_annotations(full_text), ordered.len())?
    };

    let arrangement = arrangement_for(template);
    let pages: Vec<ComposedPage> = paginate(&ordered, &chunks, template)
        .into_iter()
        .map(|page| {
            let blocks = arrangement.arrange(&page.segments, &page.text_chunks);
            let photo_dates = page
                .segments
                .iter()
                .map(|s| s.display_time(now).format(PHOTO_DATE_FORMAT).to_string())
                .collect();
            ComposedPage {
                page,
                blocks,
                photo_dates,
                overlays: Vec::new(),
            }
        })
        .collect();

    Ok(ComposedDiary {
        title: title.to_string(),
        template,
        pages,
    })
}
