//! Text Segmenter: splits generated diary prose into one chunk per photo slot.
//!
//! Generated prose does not reliably contain one paragraph per photo, so there are
//! two tiers:
//! 1. Blank-line paragraphs, used when there are at least as many as photos.
//! 2. Otherwise sentences, spread evenly with `ceil(sentences / photos)` per bucket.
//!
//! Both tiers always return exactly `target_count` chunks. Empty buckets are empty
//! strings; the renderer decides whether to show anything for them.

use crate::composer::ComposeError;

const PARAGRAPH_BREAK: &str = "\n\n";
const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Upper bound on photo slots per diary.
pub const MAX_TARGET_COUNT: usize = 200;

/// Splits `full_text` into exactly `target_count` chunks aligned to photo slots.
pub fn segment(full_text: &str, target_count: usize) -> Result<Vec<String>, ComposeError> {
    if target_count == 0 {
        return Err(ComposeError::ZeroTargetCount);
    }
    if target_count > MAX_TARGET_COUNT {
        return Err(ComposeError::TargetCountTooLarge {
            count: target_count,
            max: MAX_TARGET_COUNT,
        });
    }

    let normalized = full_text.replace("\r\n", "\n");

    let paragraphs: Vec<String> = normalized
        .split(PARAGRAPH_BREAK)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if paragraphs.len() >= target_count {
        return Ok(fold_into(paragraphs, target_count));
    }

    let sentences = split_sentences(&normalized);
    Ok(distribute(&sentences, target_count))
}

/// Resizes `parts` to exactly `count` entries: missing entries become empty strings,
/// surplus entries are appended to the last kept entry as extra paragraphs.
pub(crate) fn fold_into(mut parts: Vec<String>, count: usize) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }
    if parts.len() > count {
        let surplus: Vec<String> = parts.split_off(count);
        let last = &mut parts[count - 1];
        for extra in surplus.into_iter().filter(|s| !s.is_empty()) {
            if !last.is_empty() {
                last.push_str(PARAGRAPH_BREAK);
            }
            last.push_str(&extra);
        }
    }
    parts.resize(count, String::new());
    parts
}

/// Spreads sentences over `count` buckets sequentially, `ceil(n / count)` per bucket.
fn distribute(sentences: &[&str], count: usize) -> Vec<String> {
    let per_bucket = sentences.len().div_ceil(count);
    (0..count)
        .map(|i| {
            let start = (i * per_bucket).min(sentences.len());
            let end = (start + per_bucket).min(sentences.len());
            sentences[start..end].join(" ")
        })
        .collect()
}

/// Splits after `.`, `!` or `?` when followed by whitespace. Whitespace runs between
/// sentences are dropped; blank fragments are discarded.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let ends_sentence = prev.is_some_and(|p| SENTENCE_TERMINATORS.contains(&p));
        if ch.is_whitespace() && ends_sentence {
            push_trimmed(&mut sentences, &text[start..idx]);
            let mut end = idx + ch.len_utf8();
            while let Some(&(next_idx, next_ch)) = chars.peek() {
                if !next_ch.is_whitespace() {
                    break;
                }
                end = next_idx + next_ch.len_utf8();
                chars.next();
            }
            start = end;
            prev = None;
            continue;
        }
        prev = Some(ch);
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, fragment: &'a str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        out.push(fragment);
    }
}

/// Removes bracketed annotations such as `[장소: 해운대]` that the text model sometimes
/// leaves in its output, then trims the result.
pub fn strip_annotations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open + 1..].find(']') else {
            break;
        };
        // `[]` is not an annotation
        if close == 0 {
            out.push_str(&rest[..open + 2]);
            rest = &rest[open + 2..];
            continue;
        }
        out.push_str(&rest[..open]);
        rest = &rest[open + 1 + close + 1..];
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Thumbnail excerpt: the first half of the chunk's words, with `...` when cut.
/// An empty chunk previews as `...`.
pub fn excerpt(chunk: &str) -> String {
    let words: Vec<&str> = chunk.split_whitespace().collect();
    if words.is_empty() {
        return "...".to_string();
    }
    let half = words.len().div_ceil(2);
    let mut preview = words[..half].join(" ");
    if words.len() > half {
        preview.push_str("...");
    }
    preview
}
