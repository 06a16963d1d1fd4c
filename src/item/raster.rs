use std::fmt;

use egui::{Color32, Rect, Vec2};
use image::{RgbaImage, imageops};
use serde::{Deserialize, Serialize};

/// Pixel buffer with an explicit per-pixel alpha channel.
///
/// Every constructor routes through RGBA8, so a buffer sourced from an
/// opaque native format can never silently drop alpha — clearing a region
/// always yields genuinely transparent pixels, not black ones.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterImage {
    width: u32,
    height: u32,
    /// RGBA8, row-major, `width * height * 4` bytes.
    data: Vec<u8>,
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl RasterImage {
    /// A fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    /// A buffer filled with a single color.
    pub fn solid(width: u32, height: u32, color: Color32) -> Self {
        let mut image = Self::new(width, height);
        for px in image.data.chunks_exact_mut(4) {
            px.copy_from_slice(&color.to_array());
        }
        image
    }

    /// Wrap raw RGBA8 bytes. Returns `None` if the length does not match.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != (width * height * 4) as usize || width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height, data })
    }

    /// Convert any decoded image to an alpha-explicit buffer.
    pub fn from_dynamic(image: &image::DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            data: rgba.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The RGBA bytes at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Set every pixel inside `rect` (local pixel coordinates) to fully
    /// transparent (0,0,0,0). The rect is clamped to the buffer; an empty
    /// intersection is a no-op.
    pub fn clear_rect(&mut self, rect: Rect) {
        let x0 = rect.min.x.floor().max(0.0) as u32;
        let y0 = rect.min.y.floor().max(0.0) as u32;
        let x1 = (rect.max.x.ceil() as i64).clamp(0, i64::from(self.width)) as u32;
        let y1 = (rect.max.y.ceil() as i64).clamp(0, i64::from(self.height)) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                let i = ((y * self.width + x) * 4) as usize;
                self.data[i..i + 4].fill(0);
            }
        }
    }

    /// Resample to a new size with a smooth (triangle) filter.
    pub fn resample(&self, new_width: u32, new_height: u32) -> Self {
        let (new_width, new_height) = (new_width.max(1), new_height.max(1));
        if new_width == self.width && new_height == self.height {
            return self.clone();
        }
        // The length invariant makes from_raw infallible here.
        let source = RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height));
        let resized = imageops::resize(&source, new_width, new_height, imageops::FilterType::Triangle);
        Self {
            width: new_width,
            height: new_height,
            data: resized.into_raw(),
        }
    }
}
