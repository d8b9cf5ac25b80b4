#![allow(dead_code)]

//! Rasterization Adapter: the hand-off from composed pages to printable bitmaps.
//!
//! Rendering happens outside this service (a browser or headless renderer draws
//! the page tree). This module only fixes the contract: one composed page in, one
//! encoded image out, in page order.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::composer::{ComposedDiary, ComposedPage};

/// Device-pixel scale used for print output.
pub const PRINT_SCALE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("render scale must be positive, got {0}")]
    InvalidScale(f32),

    #[error("rasterizing page {page} failed: {message}")]
    Backend { page: usize, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub page_index: usize,
    pub mime_type: String,
    pub data: Bytes,
}

impl RasterImage {
    /// Bare base64 payload, the form the print backend accepts.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

#[async_trait]
pub trait PageRasterizer: Send + Sync {
    async fn rasterize(&self, page: &ComposedPage, scale: f32) -> Result<RasterImage, RasterError>;
}

/// Rasterizes every page of `diary` in order. Stops at the first failure; a
/// partial print run is never returned.
pub async fn rasterize_pages(
    rasterizer: &dyn PageRasterizer,
    diary: &ComposedDiary,
    scale: f32,
) -> Result<Vec<RasterImage>, RasterError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(RasterError::InvalidScale(scale));
    }

    let mut images = Vec::with_capacity(diary.pages.len());
    for page in &diary.pages {
        let image = rasterizer.rasterize(page, scale).await?;
        debug!(page = page.page.index, bytes = image.data.len(), "Rasterized page");
        images.push(image);
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::compose;
    use crate::composer::template::TemplateName;
    use crate::models::segment::make_segment;

    /// Encodes the page index and photo count instead of pixels.
    struct FakeRasterizer {
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl PageRasterizer for FakeRasterizer {
        async fn rasterize(
            &self,
            page: &ComposedPage,
            _scale: f32,
        ) -> Result<RasterImage, RasterError> {
            if self.fail_on == Some(page.page.index) {
                return Err(RasterError::Backend {
                    page: page.page.index,
                    message: "canvas unavailable".to_string(),
                });
            }
            Ok(RasterImage {
                page_index: page.page.index,
                mime_type: "image/png".to_string(),
                data: Bytes::from(vec![page.page.index as u8, page.page.segments.len() as u8]),
            })
        }
    }

    fn diary() -> ComposedDiary {
        let segments: Vec<_> = (0..5).map(|i| make_segment(&format!("p{i}"), Some(i))).collect();
        compose(
            "여행",
            "a. b. c. d. e.",
            TemplateName::Default,
            &segments,
            chrono::Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_pages_rasterized_in_order() {
        let images = rasterize_pages(&FakeRasterizer { fail_on: None }, &diary(), PRINT_SCALE)
            .await
            .unwrap();
        let indices: Vec<usize> = images.iter().map(|i| i.page_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(&images[2].data[..], &[2, 1]);
        assert_eq!(images[0].to_base64(), "AAI=");
    }

    #[tokio::test]
    async fn test_failure_aborts_run() {
        let err = rasterize_pages(&FakeRasterizer { fail_on: Some(1) }, &diary(), PRINT_SCALE)
            .await
            .unwrap_err();
        assert!(matches!(err, RasterError::Backend { page: 1, .. }));
    }

    #[tokio::test]
    async fn test_invalid_scale_rejected() {
        let err = rasterize_pages(&FakeRasterizer { fail_on: None }, &diary(), 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, RasterError::InvalidScale(_)));
    }
}
