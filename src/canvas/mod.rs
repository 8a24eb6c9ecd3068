//! Pixel buffer owned by an editing session.

mod paint;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use crate::geometry::{Color, ImageBounds, ToolBounds, ToolPoint};

pub use paint::RoundedRect;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    #[error("buffer dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("failed to encode buffer as PNG: {source}")]
    Encode {
        #[source]
        source: image::ImageError,
    },
}

pub type CanvasResult<T> = std::result::Result<T, CanvasError>;

/// Row-major RGBA8 raster with a top-left origin.
///
/// The byte length is always `width * height * 4`; every constructor goes through
/// `RgbaImage`, which upholds that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: RgbaImage,
}

impl PixelBuffer {
    pub fn filled(width: u32, height: u32, color: Color) -> CanvasResult<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        Ok(Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba(color.to_array())),
        })
    }

    pub fn from_rgba_image(pixels: RgbaImage) -> CanvasResult<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(CanvasError::InvalidDimensions {
                width: pixels.width(),
                height: pixels.height(),
            });
        }
        Ok(Self { pixels })
    }

    /// Sizes the buffer to the decoded image's own pixel dimensions.
    pub fn from_image(image: &DynamicImage) -> CanvasResult<Self> {
        Self::from_rgba_image(image.to_rgba8())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn bounds(&self) -> ImageBounds {
        ImageBounds::new(
            i32::try_from(self.width()).unwrap_or(i32::MAX),
            i32::try_from(self.height()).unwrap_or(i32::MAX),
        )
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn contains(&self, point: ToolPoint) -> bool {
        self.bounds().contains(point)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width() as usize + x as usize) * 4
    }

    fn out_of_bounds(&self, x: i32, y: i32) -> CanvasError {
        CanvasError::OutOfBounds {
            x,
            y,
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn get(&self, x: i32, y: i32) -> CanvasResult<Color> {
        if !self.contains(ToolPoint::new(x, y)) {
            return Err(self.out_of_bounds(x, y));
        }
        Ok(self.color_at(x as u32, y as u32))
    }

    /// Unchecked read for callers that already validated the coordinates.
    pub(crate) fn color_at(&self, x: u32, y: u32) -> Color {
        let index = self.index(x, y);
        let raw = self.pixels.as_raw();
        Color::rgba(raw[index], raw[index + 1], raw[index + 2], raw[index + 3])
    }

    pub fn set(&mut self, x: i32, y: i32, color: Color) -> CanvasResult<()> {
        if !self.contains(ToolPoint::new(x, y)) {
            return Err(self.out_of_bounds(x, y));
        }
        self.write(x as u32, y as u32, color);
        Ok(())
    }

    pub(crate) fn write(&mut self, x: u32, y: u32, color: Color) {
        self.pixels.put_pixel(x, y, Rgba(color.to_array()));
    }

    /// Fills `bounds` with a solid color, clipping to the buffer. Returns pixels written.
    pub fn set_rect(&mut self, bounds: ToolBounds, color: Color) -> u64 {
        let Some(clipped) = bounds.clamp_to(self.bounds()) else {
            return 0;
        };
        let rgba = color.to_array();
        let row_width = self.width() as usize * 4;
        let left = clipped.x as usize * 4;
        let span = clipped.width as usize * 4;
        let buffer: &mut [u8] = &mut self.pixels;
        for row in clipped.y as usize..clipped.y as usize + clipped.height as usize {
            let start = row * row_width + left;
            for pixel in buffer[start..start + span].chunks_exact_mut(4) {
                pixel.copy_from_slice(&rgba);
            }
        }
        u64::from(clipped.width) * u64::from(clipped.height)
    }

    /// Source-over blend of `color` scaled by `coverage` (0..=1). Out-of-range pixels are skipped.
    pub(crate) fn blend(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if !self.contains(ToolPoint::new(x, y)) {
            return;
        }
        let src_alpha = (f32::from(color.a) / 255.0) * coverage.clamp(0.0, 1.0);
        if src_alpha <= 0.0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if src_alpha >= 1.0 {
            self.write(x, y, color.opaque());
            return;
        }
        let dst = self.color_at(x, y);
        let dst_alpha = f32::from(dst.a) / 255.0;
        let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
        let channel = |src: u8, dst: u8| -> u8 {
            let value = (f32::from(src) * src_alpha
                + f32::from(dst) * dst_alpha * (1.0 - src_alpha))
                / out_alpha;
            value.round().clamp(0.0, 255.0) as u8
        };
        let blended = Color::rgba(
            channel(color.r, dst.r),
            channel(color.g, dst.g),
            channel(color.b, dst.b),
            (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
        );
        self.write(x, y, blended);
    }

    /// 4-connected fill from `seed` over pixels accepted by `matches`.
    ///
    /// Traversal uses an explicit stack and a visited bitmap covering the whole buffer.
    /// Returns the number of pixels replaced.
    pub fn flood_fill<F>(&mut self, seed: ToolPoint, matches: F, replacement: Color) -> usize
    where
        F: Fn(Color) -> bool,
    {
        if !self.contains(seed) {
            return 0;
        }
        let width = self.width() as usize;
        let height = self.height() as usize;
        let mut visited = vec![false; width * height];
        let mut stack = vec![(seed.x as usize, seed.y as usize)];
        let mut replaced = 0_usize;

        while let Some((x, y)) = stack.pop() {
            let slot = y * width + x;
            if visited[slot] {
                continue;
            }
            visited[slot] = true;
            if !matches(self.color_at(x as u32, y as u32)) {
                continue;
            }
            self.write(x as u32, y as u32, replacement);
            replaced += 1;

            if x > 0 && !visited[slot - 1] {
                stack.push((x - 1, y));
            }
            if x + 1 < width && !visited[slot + 1] {
                stack.push((x + 1, y));
            }
            if y > 0 && !visited[slot - width] {
                stack.push((x, y - 1));
            }
            if y + 1 < height && !visited[slot + width] {
                stack.push((x, y + 1));
            }
        }
        replaced
    }

    pub fn to_png(&self) -> CanvasResult<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|source| CanvasError::Encode { source })?;
        Ok(bytes.into_inner())
    }
}
