use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a photo's pixels live. The composer never dereferences it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    Url { url: String },
    Inline { mime_type: String, data: String },
}

/// One uploaded photo plus its AI-derived keywords. The unit of composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSegment {
    pub id: String,
    pub image_ref: ImageRef,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// EXIF capture time, milliseconds since the Unix epoch.
    #[serde(default)]
    pub capture_time: Option<i64>,
    /// Upload time in milliseconds; used for ordering when EXIF data is missing.
    #[serde(default)]
    pub uploaded_at: Option<i64>,
}

impl PhotoSegment {
    /// Ordering key: capture time, else upload time. Segments with neither sort last.
    pub fn sort_key(&self) -> i64 {
        self.capture_time.or(self.uploaded_at).unwrap_or(i64::MAX)
    }

    /// The date shown next to the photo. Falls back to `now` when the photo has no
    /// usable timestamp.
    pub fn display_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.capture_time
            .or(self.uploaded_at)
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(now)
    }

    /// First `limit` keywords, for templates that cap the tag list.
    pub fn display_keywords(&self, limit: usize) -> Vec<String> {
        self.keywords.iter().take(limit).cloned().collect()
    }
}

/// Stable sort by capture time ascending. Ties keep their input order.
pub fn sort_by_capture_time(segments: &mut [PhotoSegment]) {
    segments.sort_by_key(PhotoSegment::sort_key);
}

#[cfg(test)]
pub(crate) fn make_segment(id: &str, capture_time: Option<i64>) -> PhotoSegment {
    PhotoSegment {
        id: id.to_string(),
        image_ref: ImageRef::Url {
            url: format!("https://cdn.example.com/{id}.jpg"),
        },
        keywords: vec!["바다".to_string(), "여유로웠다".to_string()],
        capture_time,
        uploaded_at: None,
    }
}
