//! Format-preserving downscaling for derived views.
//!
//! Thumbnails and backgrounds are computed on demand and never persisted.
//! The output is always re-encoded in the format the source was sniffed as.

use std::io::Cursor;

use image::imageops::FilterType;
use image::ImageError;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mime::image_format;

/// Resampling filter applied when an image has to shrink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    /// Bicubic; the default for thumbnails.
    #[default]
    CatmullRom,
    Gaussian,
    /// Highest quality, used for the tiny background preview.
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Bounding box and filter for a derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizePreset {
    pub max_width: u32,
    pub max_height: u32,
    #[serde(default)]
    pub filter: ResampleFilter,
}

impl ResizePreset {
    /// 90x90, bicubic.
    pub const fn thumbnail() -> Self {
        Self {
            max_width: 90,
            max_height: 90,
            filter: ResampleFilter::CatmullRom,
        }
    }

    /// 20x20, Lanczos3.
    pub const fn background() -> Self {
        Self {
            max_width: 20,
            max_height: 20,
            filter: ResampleFilter::Lanczos3,
        }
    }
}

/// Shrink `data` to fit within `max_width`x`max_height`, keeping its aspect
/// ratio, and re-encode it as `mime`.
///
/// Images already inside the bounds are re-encoded at their original size;
/// nothing is ever upscaled.
///
/// # Errors
///
/// * [`Error::UnsupportedFormat`] if `mime` has no `image` format or the
///   format cannot be encoded.
/// * [`Error::Decode`] if `data` is not a decodable image of that format.
pub fn resize(
    data: &[u8],
    mime: &str,
    max_width: u32,
    max_height: u32,
    filter: ResampleFilter,
) -> Result<Vec<u8>> {
    let format = image_format(mime).ok_or_else(|| Error::unsupported(mime))?;

    let img = image::load_from_memory_with_format(data, format).map_err(|e| match e {
        ImageError::Unsupported(_) => Error::unsupported(mime),
        other => Error::Decode(other.to_string()),
    })?;

    let (width, height) = (img.width(), img.height());
    let scaled = if width <= max_width && height <= max_height {
        img
    } else {
        img.resize(max_width, max_height, filter.into())
    };

    tracing::debug!(
        "Resized {mime} {width}x{height} -> {}x{} ({filter:?})",
        scaled.width(),
        scaled.height()
    );

    let mut buf = Cursor::new(Vec::new());
    scaled.write_to(&mut buf, format).map_err(|e| match e {
        ImageError::Unsupported(_) => Error::unsupported(mime),
        other => Error::Internal(format!("failed to encode {mime}: {other}")),
    })?;

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;

    fn dimensions(data: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory(data).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn thumbnail_fits_bounds_and_keeps_aspect() {
        let src = test_fixtures::png(300, 150);
        let p = ResizePreset::thumbnail();
        let out = resize(&src, "image/png", p.max_width, p.max_height, p.filter).unwrap();
        assert_eq!(dimensions(&out), (90, 45));
    }

    #[test]
    fn tall_image_is_bounded_by_height() {
        let src = test_fixtures::png(100, 400);
        let out = resize(&src, "image/png", 90, 90, ResampleFilter::CatmullRom).unwrap();
        let (w, h) = dimensions(&out);
        assert_eq!(h, 90);
        assert!(w <= 90);
        // 100/400 * 90 = 22.5, rounding either way is fine.
        assert!((22..=23).contains(&w));
    }

    #[test]
    fn small_image_is_not_upscaled() {
        let src = test_fixtures::png(40, 30);
        let out = resize(&src, "image/png", 90, 90, ResampleFilter::CatmullRom).unwrap();
        assert_eq!(dimensions(&out), (40, 30));
    }

    #[test]
    fn extreme_aspect_ratio_keeps_at_least_one_pixel() {
        let wide = test_fixtures::png(1000, 1);
        let out = resize(&wide, "image/png", 90, 90, ResampleFilter::CatmullRom).unwrap();
        assert_eq!(dimensions(&out), (90, 1));

        let tall = test_fixtures::png(1, 1000);
        let p = ResizePreset::background();
        let out = resize(&tall, "image/png", p.max_width, p.max_height, p.filter).unwrap();
        assert_eq!(dimensions(&out), (1, 20));
    }

    #[test]
    fn background_preset_uses_lanczos() {
        let p = ResizePreset::background();
        assert_eq!(p.filter, ResampleFilter::Lanczos3);

        let src = test_fixtures::jpeg(640, 480);
        let out = resize(&src, "image/jpeg", p.max_width, p.max_height, p.filter).unwrap();
        assert_eq!(dimensions(&out), (20, 15));
    }

    #[test]
    fn output_keeps_source_format() {
        let src = test_fixtures::jpeg(200, 200);
        let out = resize(&src, "image/jpeg", 90, 90, ResampleFilter::CatmullRom).unwrap();
        assert_eq!(
            image::guess_format(&out).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn unknown_mime_is_unsupported() {
        let src = test_fixtures::png(10, 10);
        let err = resize(&src, "application/pdf", 90, 90, ResampleFilter::CatmullRom).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = resize(b"\x89PNG\r\n\x1a\ntruncated", "image/png", 90, 90, ResampleFilter::CatmullRom)
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn filter_serde_names() {
        let f: ResampleFilter = serde_json::from_str("\"catmull_rom\"").unwrap();
        assert_eq!(f, ResampleFilter::CatmullRom);
        let f: ResampleFilter = serde_json::from_str("\"lanczos3\"").unwrap();
        assert_eq!(f, ResampleFilter::Lanczos3);
    }
}
