use std::io::Cursor;

use async_trait::async_trait;
use image::ImageReader;

use crate::errors::AppError;

/// Image capability boundary: probe dimensions and re-encode to WebP.
/// Pure with respect to the stores; the workflow sequences it before any
/// storage write so a transcode failure is side-effect-free.
#[async_trait]
pub trait ImageTranscoder: Send + Sync {
    /// `None` for byte-valid but undecodable images; the caller substitutes
    /// a default resolution instead of aborting.
    async fn dimensions(&self, bytes: &[u8]) -> Option<(u32, u32)>;

    async fn encode_webp(&self, bytes: &[u8], quality: f32) -> Result<Vec<u8>, AppError>;
}

/// `image`-crate decode plus libwebp lossy encode. Both run on the blocking
/// pool so a large upload does not stall the worker.
pub struct ImageRsTranscoder;

#[async_trait]
impl ImageTranscoder for ImageRsTranscoder {
    async fn dimensions(&self, bytes: &[u8]) -> Option<(u32, u32)> {
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || {
            ImageReader::new(Cursor::new(bytes))
                .with_guessed_format()
                .ok()?
                .into_dimensions()
                .ok()
        })
        .await
        .ok()
        .flatten()
    }

    async fn encode_webp(&self, bytes: &[u8], quality: f32) -> Result<Vec<u8>, AppError> {
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || encode_webp_blocking(&bytes, quality))
            .await
            .map_err(|e| AppError::InternalError(format!("transcode task panicked: {e}")))?
    }
}

fn encode_webp_blocking(bytes: &[u8], quality: f32) -> Result<Vec<u8>, AppError> {
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::Transcode(format!("failed to probe image format: {e}")))?
        .decode()
        .map_err(|e| AppError::Transcode(format!("failed to decode image: {e}")))?;

    let rgba = decoded.to_rgba8();
    let encoded = webp::Encoder::from_rgba(&rgba, rgba.width(), rgba.height()).encode(quality);

    Ok(encoded.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 40, 200]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Jpeg)
            .unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn probes_dimensions_of_a_jpeg() {
        let transcoder = ImageRsTranscoder;
        let dims = transcoder.dimensions(&sample_jpeg(320, 200)).await;
        assert_eq!(dims, Some((320, 200)));
    }

    #[tokio::test]
    async fn undecodable_bytes_yield_none() {
        let transcoder = ImageRsTranscoder;
        assert_eq!(transcoder.dimensions(b"garbage").await, None);
    }

    #[tokio::test]
    async fn encodes_webp_with_riff_header() {
        let transcoder = ImageRsTranscoder;
        let encoded = transcoder.encode_webp(&sample_jpeg(64, 64), 80.0).await.unwrap();
        assert_eq!(&encoded[..4], b"RIFF");
        assert_eq!(&encoded[8..12], b"WEBP");
    }

    #[tokio::test]
    async fn encoding_garbage_is_a_transcode_error() {
        let transcoder = ImageRsTranscoder;
        let result = transcoder.encode_webp(b"garbage", 80.0).await;
        assert!(matches!(result, Err(AppError::Transcode(_))));
    }
}
