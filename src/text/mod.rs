//! Glyph measurement and rasterization behind a small trait seam.

use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("font data could not be parsed: {source}")]
    InvalidFont {
        #[source]
        source: ab_glyph::InvalidFont,
    },
}

pub type TextResult<T> = std::result::Result<T, TextError>;

/// Measures and draws single lines of text.
pub trait TextRenderer {
    /// Horizontal advance of `text` at `font_size` pixels.
    fn measure(&self, text: &str, font_size: f32) -> f32;

    /// Reports each covered pixel as `(x, y, coverage)` for a line whose top-left corner
    /// sits at `origin`.
    fn rasterize_line(
        &self,
        text: &str,
        font_size: f32,
        origin: (f32, f32),
        plot: &mut dyn FnMut(i32, i32, f32),
    );
}

/// Outline-font renderer backed by `ab_glyph`.
#[derive(Clone)]
pub struct GlyphRenderer {
    font: FontArc,
}

impl std::fmt::Debug for GlyphRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphRenderer").finish_non_exhaustive()
    }
}

impl GlyphRenderer {
    pub fn from_bytes(bytes: Vec<u8>) -> TextResult<Self> {
        let font = FontArc::try_from_vec(bytes).map_err(|source| TextError::InvalidFont { source })?;
        Ok(Self { font })
    }

    pub fn from_font(font: FontArc) -> Self {
        Self { font }
    }

    fn glyph_positions(&self, text: &str, font_size: f32) -> (Vec<(GlyphId, f32)>, f32) {
        let scaled = self.font.as_scaled(font_size);
        let mut positions = Vec::with_capacity(text.len());
        let mut cursor_x = 0.0_f32;
        let mut previous: Option<GlyphId> = None;
        for ch in text.chars() {
            let glyph_id = self.font.glyph_id(ch);
            if let Some(previous) = previous {
                cursor_x += scaled.kern(previous, glyph_id);
            }
            positions.push((glyph_id, cursor_x));
            cursor_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }
        (positions, cursor_x)
    }
}

impl TextRenderer for GlyphRenderer {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        self.glyph_positions(text, font_size).1
    }

    fn rasterize_line(
        &self,
        text: &str,
        font_size: f32,
        origin: (f32, f32),
        plot: &mut dyn FnMut(i32, i32, f32),
    ) {
        let ascent = self.font.as_scaled(font_size).ascent();
        let baseline = origin.1 + ascent;
        let (positions, _) = self.glyph_positions(text, font_size);
        for (glyph_id, offset_x) in positions {
            let glyph = glyph_id.with_scale_and_position(font_size, point(origin.0 + offset_x, baseline));
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let (left, top) = (bounds.min.x as i32, bounds.min.y as i32);
            outlined.draw(|x, y, coverage| {
                plot(left + x as i32, top + y as i32, coverage);
            });
        }
    }
}
