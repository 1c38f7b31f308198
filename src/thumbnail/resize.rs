//! Fixed-width thumbnail rendering with the `image` crate.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::Result;

/// Thumbnail widths, in generation order.
pub const THUMBNAIL_WIDTHS: [u32; 3] = [500, 250, 100];

/// Target size for a width, keeping the aspect ratio. Height is at least 1.
///
/// Never upscales: a source no wider than `target_width` keeps its own size,
/// so the output is never larger than the decoded source.
pub fn thumbnail_dimensions(orig_width: u32, orig_height: u32, target_width: u32) -> (u32, u32) {
    if target_width >= orig_width {
        return (orig_width, orig_height);
    }
    let aspect_ratio = orig_height as f32 / orig_width.max(1) as f32;
    let height = (target_width as f32 * aspect_ratio).round() as u32;
    (target_width, height.max(1))
}

/// Pick a cheaper filter for strong downscales.
fn select_filter(orig: (u32, u32), target: (u32, u32)) -> FilterType {
    let width_ratio = orig.0 as f32 / target.0.max(1) as f32;
    let height_ratio = orig.1 as f32 / target.1.max(1) as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        FilterType::Triangle
    } else if max_ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

/// A decoded source image and the format to write thumbnails in.
pub struct SourceImage {
    image: DynamicImage,
    format: ImageFormat,
}

impl SourceImage {
    /// Decode image bytes, sniffing the format from content.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes)?;
        let image = image::load_from_memory_with_format(bytes, format)?;
        Ok(Self {
            image,
            format: output_format(format),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Format thumbnails are encoded in.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Resize to `width` and encode.
    pub fn render(&self, width: u32) -> Result<Vec<u8>> {
        let orig = self.image.dimensions();
        let target = thumbnail_dimensions(orig.0, orig.1, width);
        let resized = if target == orig {
            self.image.clone()
        } else {
            self.image
                .resize_exact(target.0, target.1, select_filter(orig, target))
        };

        let mut out = Cursor::new(Vec::new());
        match self.format {
            ImageFormat::Jpeg => {
                DynamicImage::ImageRgb8(resized.to_rgb8()).write_to(&mut out, self.format)?
            }
            ImageFormat::Png => resized.write_to(&mut out, self.format)?,
            _ => DynamicImage::ImageRgba8(resized.to_rgba8()).write_to(&mut out, self.format)?,
        }
        Ok(out.into_inner())
    }
}

/// Source formats we can encode back to; everything else becomes PNG.
fn output_format(source: ImageFormat) -> ImageFormat {
    match source {
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP => source,
        _ => ImageFormat::Png,
    }
}
