//! Per-template slot geometry.
//!
//! Each template is an `Arrangement` strategy that turns one page's segments and
//! text chunks into blocks of photo frames, tags, and prose. Sizes are in
//! millimetres on an A4 page; the renderer owns everything finer than that.

use serde::{Deserialize, Serialize};

use crate::composer::template::TemplateName;
use crate::models::PhotoSegment;

/// Tag cap for the default and friend templates.
const TAG_LIMIT: usize = 3;
/// Couple blocks merge tags from two photos, so they get a longer list.
const COUPLE_TAG_LIMIT: usize = 5;
/// Photos per row under the family template's lead photo.
const FAMILY_ROW_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeMm {
    pub width: f64,
    pub height: f64,
}

const fn mm(width: f64, height: f64) -> SizeMm {
    SizeMm { width, height }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FramePlacement {
    /// Laid out in normal flow.
    Inline,
    /// Overlaps the previous frame's bottom-right corner, pushed out by `inset_mm`.
    OverlapBottomRight { inset_mm: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoFrame {
    pub segment_id: String,
    pub size: SizeMm,
    pub placement: FramePlacement,
    pub z_index: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSide {
    Left,
    Right,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPosition {
    WithText,
    UnderPhoto,
}

/// A row of the page: photos, their tags, and the prose that goes with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub photos: Vec<PhotoFrame>,
    pub tags: Vec<String>,
    pub tag_position: TagPosition,
    pub text: String,
    pub text_side: TextSide,
}

/// A template's layout strategy.
pub trait Arrangement: Send + Sync {
    fn template(&self) -> TemplateName;

    /// `texts` is aligned 1:1 with `segments`.
    fn arrange(&self, segments: &[PhotoSegment], texts: &[String]) -> Vec<Block>;
}

pub fn arrangement_for(template: TemplateName) -> &'static dyn Arrangement {
    match template {
        TemplateName::Default => &ZigzagArrangement,
        TemplateName::Family => &FamilyArrangement,
        TemplateName::Friend => &FriendArrangement,
        TemplateName::Couple => &CoupleArrangement,
    }
}

fn inline_frame(segment: &PhotoSegment, size: SizeMm) -> PhotoFrame {
    PhotoFrame {
        segment_id: segment.id.clone(),
        size,
        placement: FramePlacement::Inline,
        z_index: 1,
    }
}

fn join_non_empty<'a>(texts: impl IntoIterator<Item = &'a String>) -> String {
    texts
        .into_iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Union of keywords in first-seen order, capped at `limit`.
fn merged_tags<'a>(segments: impl IntoIterator<Item = &'a PhotoSegment>, limit: usize) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for keyword in segments.into_iter().flat_map(|s| s.keywords.iter()) {
        if tags.len() == limit {
            break;
        }
        if !tags.contains(keyword) {
            tags.push(keyword.clone());
        }
    }
    tags
}

// ────────────────────────────────────────────────────────────────────────────
// Default: one polaroid per row, photo and text swap sides every row
// ────────────────────────────────────────────────────────────────────────────

pub struct ZigzagArrangement;

impl Arrangement for ZigzagArrangement {
    fn template(&self) -> TemplateName {
        TemplateName::Default
    }

    fn arrange(&self, segments: &[PhotoSegment], texts: &[String]) -> Vec<Block> {
        segments
            .iter()
            .zip(texts)
            .enumerate()
            .map(|(i, (segment, text))| Block {
                photos: vec![inline_frame(segment, mm(80.0, 100.0))],
                tags: segment.display_keywords(TAG_LIMIT),
                tag_position: TagPosition::WithText,
                text: text.clone(),
                text_side: if i % 2 == 0 {
                    TextSide::Right
                } else {
                    TextSide::Left
                },
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Friend: two-column rows, tags under the photo
// ────────────────────────────────────────────────────────────────────────────

pub struct FriendArrangement;

impl Arrangement for FriendArrangement {
    fn template(&self) -> TemplateName {
        TemplateName::Friend
    }

    fn arrange(&self, segments: &[PhotoSegment], texts: &[String]) -> Vec<Block> {
        segments
            .iter()
            .zip(texts)
            .map(|(segment, text)| Block {
                photos: vec![inline_frame(segment, mm(70.0, 90.0))],
                tags: segment.display_keywords(TAG_LIMIT),
                tag_position: TagPosition::UnderPhoto,
                text: text.clone(),
                text_side: TextSide::Right,
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Family: large lead photo with its full tag list, remaining photos in rows
// ────────────────────────────────────────────────────────────────────────────

pub struct FamilyArrangement;

impl Arrangement for FamilyArrangement {
    fn template(&self) -> TemplateName {
        TemplateName::Family
    }

    fn arrange(&self, segments: &[PhotoSegment], texts: &[String]) -> Vec<Block> {
        let Some((lead, rest)) = segments.split_first() else {
            return Vec::new();
        };

        let mut blocks = vec![Block {
            photos: vec![inline_frame(lead, mm(60.0, 70.0))],
            tags: lead.keywords.clone(),
            tag_position: TagPosition::WithText,
            text: texts.first().cloned().unwrap_or_default(),
            text_side: TextSide::Right,
        }];

        let rest_texts = texts.get(1..).unwrap_or_default();
        blocks.extend(
            rest.chunks(FAMILY_ROW_LEN)
                .zip(rest_texts.chunks(FAMILY_ROW_LEN))
                .map(|(row, row_texts)| Block {
                    photos: row.iter().map(|s| inline_frame(s, mm(60.0, 70.0))).collect(),
                    tags: Vec::new(),
                    tag_position: TagPosition::WithText,
                    text: join_non_empty(row_texts),
                    text_side: TextSide::Below,
                }),
        );
        blocks
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Couple: photos in pairs, the second overlapping the first
// ────────────────────────────────────────────────────────────────────────────

pub struct CoupleArrangement;

impl Arrangement for CoupleArrangement {
    fn template(&self) -> TemplateName {
        TemplateName::Couple
    }

    fn arrange(&self, segments: &[PhotoSegment], texts: &[String]) -> Vec<Block> {
        segments
            .chunks(2)
            .zip(texts.chunks(2))
            .map(|(pair, pair_texts)| {
                let mut photos = vec![inline_frame(&pair[0], mm(50.0, 70.0))];
                if let Some(second) = pair.get(1) {
                    photos.push(PhotoFrame {
                        segment_id: second.id.clone(),
                        size: mm(25.0, 35.0),
                        placement: FramePlacement::OverlapBottomRight { inset_mm: 3.0 },
                        z_index: 2,
                    });
                }
                Block {
                    photos,
                    tags: merged_tags(pair, COUPLE_TAG_LIMIT),
                    tag_position: TagPosition::WithText,
                    text: join_non_empty(pair_texts),
                    text_side: TextSide::Right,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::segment::make_segment;

    fn segments(n: usize) -> Vec<PhotoSegment> {
        (0..n).map(|i| make_segment(&format!("p{i}"), None)).collect()
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("text {i}")).collect()
    }

    fn frame_ids(block: &Block) -> Vec<&str> {
        block.photos.iter().map(|f| f.segment_id.as_str()).collect()
    }

    #[test]
    fn test_strategy_matches_template() {
        for template in [
            TemplateName::Default,
            TemplateName::Family,
            TemplateName::Friend,
            TemplateName::Couple,
        ] {
            assert_eq!(arrangement_for(template).template(), template);
        }
    }

    #[test]
    fn test_zigzag_alternates_text_side() {
        let blocks = ZigzagArrangement.arrange(&segments(2), &texts(2));
        assert_eq!(blocks[0].text_side, TextSide::Right);
        assert_eq!(blocks[1].text_side, TextSide::Left);
        assert_eq!(blocks[0].photos[0].size, mm(80.0, 100.0));
    }

    #[test]
    fn test_tag_limit_applied() {
        let mut segs = segments(1);
        segs[0].keywords = (0..6).map(|i| format!("k{i}")).collect();
        let blocks = FriendArrangement.arrange(&segs, &texts(1));
        assert_eq!(blocks[0].tags, vec!["k0", "k1", "k2"]);
        assert_eq!(blocks[0].tag_position, TagPosition::UnderPhoto);
    }

    #[test]
    fn test_family_lead_then_rows_of_three() {
        let blocks = FamilyArrangement.arrange(&segments(6), &texts(6));
        assert_eq!(blocks.len(), 3);
        assert_eq!(frame_ids(&blocks[0]), vec!["p0"]);
        assert_eq!(blocks[0].text, "text 0");
        assert_eq!(frame_ids(&blocks[1]), vec!["p1", "p2", "p3"]);
        assert_eq!(blocks[1].text, "text 1 text 2 text 3");
        assert_eq!(frame_ids(&blocks[2]), vec!["p4", "p5"]);
        assert_eq!(blocks[2].text_side, TextSide::Below);
    }

    #[test]
    fn test_family_single_photo_and_empty() {
        assert_eq!(FamilyArrangement.arrange(&segments(1), &texts(1)).len(), 1);
        assert!(FamilyArrangement.arrange(&[], &[]).is_empty());
    }

    #[test]
    fn test_couple_pairs_overlap_and_merge_tags() {
        let mut segs = segments(3);
        segs[0].keywords = vec!["바다".into(), "노을".into(), "커피".into()];
        segs[1].keywords = vec!["노을".into(), "산책".into(), "행복했다".into(), "밤".into()];
        let blocks = CoupleArrangement.arrange(&segs, &texts(3));

        assert_eq!(blocks.len(), 2);
        assert_eq!(frame_ids(&blocks[0]), vec!["p0", "p1"]);
        assert_eq!(
            blocks[0].photos[1].placement,
            FramePlacement::OverlapBottomRight { inset_mm: 3.0 }
        );
        assert!(blocks[0].photos[1].z_index > blocks[0].photos[0].z_index);
        assert_eq!(
            blocks[0].tags,
            vec!["바다", "노을", "커피", "산책", "행복했다"]
        );
        assert_eq!(blocks[0].text, "text 0 text 1");
        assert_eq!(frame_ids(&blocks[1]), vec!["p2"]);
    }

    #[test]
    fn test_empty_text_chunks_are_skipped_when_joining() {
        let blocks = CoupleArrangement.arrange(&segments(2), &["".to_string(), "b".to_string()]);
        assert_eq!(blocks[0].text, "b");
    }

    #[test]
    fn test_every_segment_gets_exactly_one_frame() {
        for template in [
            TemplateName::Default,
            TemplateName::Family,
            TemplateName::Friend,
            TemplateName::Couple,
        ] {
            let blocks = arrangement_for(template).arrange(&segments(7), &texts(7));
            let ids: Vec<String> = blocks
                .iter()
                .flat_map(|b| b.photos.iter().map(|f| f.segment_id.clone()))
                .collect();
            let expected: Vec<String> = (0..7).map(|i| format!("p{i}")).collect();
            assert_eq!(ids, expected, "{template:?}");
        }
    }
}
