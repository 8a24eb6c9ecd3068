use serde::{Deserialize, Serialize};

use crate::canvas::{PixelBuffer, RoundedRect};
use crate::geometry::{Color, ToolBounds};
use crate::text::TextRenderer;

const LINE_HEIGHT_FACTOR: f32 = 1.2;
const MIN_FONT_SIZE: f32 = 4.0;
const MAX_FONT_SIZE: f32 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Left offset of a line of `line_width` inside `available` width.
    pub fn offset(self, available: f32, line_width: f32) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => (available - line_width) / 2.0,
            Self::Right => available - line_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBoxStyle {
    pub font_size: f32,
    pub text_color: Color,
    pub background_color: Color,
    /// 0 disables the background fill.
    pub background_opacity: f32,
    pub corner_radius: f32,
    /// 0 disables the border.
    pub border_width: f32,
    pub border_color: Color,
    pub padding: f32,
    pub align: TextAlign,
}

impl Default for TextBoxStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            text_color: Color::BLACK,
            background_color: Color::WHITE,
            background_opacity: 1.0,
            corner_radius: 0.0,
            border_width: 0.0,
            border_color: Color::BLACK,
            padding: 4.0,
            align: TextAlign::Left,
        }
    }
}

impl TextBoxStyle {
    /// Clamps every attribute into its usable range.
    pub fn sanitized(self) -> Self {
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };
        Self {
            font_size: finite_or(self.font_size, 16.0).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE),
            background_opacity: finite_or(self.background_opacity, 1.0).clamp(0.0, 1.0),
            corner_radius: finite_or(self.corner_radius, 0.0).max(0.0),
            border_width: finite_or(self.border_width, 0.0).max(0.0),
            padding: finite_or(self.padding, 0.0).max(0.0),
            ..self
        }
    }

    /// The reduced style surface: only text attributes are user-controlled.
    pub fn simplified(self) -> Self {
        let defaults = Self::default();
        Self {
            font_size: self.font_size,
            text_color: self.text_color,
            align: self.align,
            ..defaults
        }
    }

    pub fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT_FACTOR
    }
}

/// A committed text box request: where, what, and how it looks.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBoxSpec {
    pub bounds: ToolBounds,
    pub content: String,
    pub style: TextBoxStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

/// Splits on newlines, then greedily fills each line word by word.
pub fn wrap_text(
    renderer: &dyn TextRenderer,
    content: &str,
    font_size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        let mut line = String::new();
        for word in paragraph.split(' ') {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if !line.is_empty() && renderer.measure(&candidate, font_size) > max_width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    lines
}

/// Positions wrapped lines inside the padded box. Lines past the bottom are kept.
pub fn layout_text_box(renderer: &dyn TextRenderer, spec: &TextBoxSpec) -> Vec<LaidOutLine> {
    let style = spec.style.sanitized();
    let inner_left = spec.bounds.x as f32 + style.padding;
    let inner_top = spec.bounds.y as f32 + style.padding;
    let available = (spec.bounds.width as f32 - style.padding * 2.0).max(0.0);

    wrap_text(renderer, &spec.content, style.font_size, available)
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let width = renderer.measure(&text, style.font_size);
            LaidOutLine {
                x: inner_left + style.align.offset(available, width),
                y: inner_top + index as f32 * style.line_height(),
                width,
                text,
            }
        })
        .collect()
}

/// Draws background, border, then text into the buffer.
pub fn composite_text_box(
    buffer: &mut PixelBuffer,
    renderer: &dyn TextRenderer,
    spec: &TextBoxSpec,
) -> usize {
    let style = spec.style.sanitized();
    let shape = RoundedRect::new(
        spec.bounds.x as f32,
        spec.bounds.y as f32,
        spec.bounds.width as f32,
        spec.bounds.height as f32,
        style.corner_radius,
    );

    if style.background_opacity > 0.0 {
        buffer.fill_rounded_rect(&shape, style.background_color, style.background_opacity);
    }
    if style.border_width > 0.0 {
        buffer.stroke_rounded_rect(&shape, style.border_color, style.border_width);
    }

    let lines = layout_text_box(renderer, spec);
    for line in &lines {
        if line.text.is_empty() {
            continue;
        }
        renderer.rasterize_line(&line.text, style.font_size, (line.x, line.y), &mut |x, y, coverage| {
            buffer.blend(x, y, style.text_color, coverage);
        });
    }
    tracing::debug!(lines = lines.len(), bounds = ?spec.bounds, "text box composited");
    lines.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::test_support::FixedAdvanceRenderer;

    const TEN_PX: FixedAdvanceRenderer = FixedAdvanceRenderer { advance: 10.0 };

    fn spec(content: &str, style: TextBoxStyle) -> TextBoxSpec {
        TextBoxSpec {
            bounds: ToolBounds::new(20, 10, 120, 60),
            content: content.to_string(),
            style,
        }
    }

    #[test]
    fn wrap_breaks_on_newlines_then_words() {
        let lines = wrap_text(&TEN_PX, "Mon 9am\nMaths room twelve", 16.0, 100.0);
        assert_eq!(lines, vec!["Mon 9am", "Maths room", "twelve"]);
    }

    #[test]
    fn wrap_keeps_overlong_single_word_on_its_own_line() {
        let lines = wrap_text(&TEN_PX, "a Chemistry b", 16.0, 50.0);
        assert_eq!(lines, vec!["a", "Chemistry", "b"]);
    }

    #[test]
    fn wrap_preserves_blank_paragraphs() {
        let lines = wrap_text(&TEN_PX, "A\n\nB", 16.0, 100.0);
        assert_eq!(lines, vec!["A", "", "B"]);
    }

    #[test]
    fn center_alignment_offsets_by_half_the_slack() {
        assert_eq!(TextAlign::Center.offset(100.0, 40.0), 30.0);
        assert_eq!(TextAlign::Right.offset(100.0, 40.0), 60.0);
        assert_eq!(TextAlign::Left.offset(100.0, 40.0), 0.0);
    }

    #[test]
    fn layout_centers_line_inside_padded_box() {
        let style = TextBoxStyle {
            padding: 10.0,
            align: TextAlign::Center,
            ..Default::default()
        };
        // Inner width 120 - 2 * 10 = 100; "abcd" measures 40.
        let lines = layout_text_box(&TEN_PX, &spec("abcd", style));
        assert_eq!(lines.len(), 1);
        let inner_left = 20.0 + 10.0;
        assert_eq!(lines[0].x - inner_left, 30.0);
        assert_eq!(lines[0].y, 20.0);
    }

    #[test]
    fn layout_advances_lines_by_one_point_two_font_size() {
        let style = TextBoxStyle {
            font_size: 20.0,
            padding: 0.0,
            ..Default::default()
        };
        let lines = layout_text_box(&TEN_PX, &spec("a\nb\nc\nd\ne", style));
        assert_eq!(lines.len(), 5);
        assert!((lines[1].y - lines[0].y - 24.0).abs() < 1e-4);
        // The last line starts below the 60px box; it is not dropped.
        assert!(lines[4].y > 10.0 + 60.0);
    }

    #[test]
    fn composite_draws_background_border_and_text() {
        let mut buffer = PixelBuffer::filled(200, 100, Color::new(200, 200, 255))
            .expect("buffer should build");
        let style = TextBoxStyle {
            font_size: 10.0,
            text_color: Color::new(200, 0, 0),
            background_color: Color::new(255, 255, 0),
            border_width: 2.0,
            border_color: Color::new(0, 128, 0),
            padding: 6.0,
            ..Default::default()
        };

        let lines = composite_text_box(&mut buffer, &TEN_PX, &spec("Hi", style));

        assert_eq!(lines, 1);
        assert_eq!(buffer.get(20, 40).expect("in range"), Color::new(0, 128, 0));
        assert_eq!(buffer.get(100, 60).expect("in range"), Color::new(255, 255, 0));
        assert_eq!(buffer.get(27, 17).expect("in range"), Color::new(200, 0, 0));
        assert_eq!(buffer.get(5, 5).expect("in range"), Color::new(200, 200, 255));
    }

    #[test]
    fn zero_opacity_background_is_skipped() {
        let base = Color::new(10, 200, 10);
        let mut buffer = PixelBuffer::filled(200, 100, base).expect("buffer should build");
        let style = TextBoxStyle {
            background_opacity: 0.0,
            ..Default::default()
        };
        composite_text_box(&mut buffer, &TEN_PX, &spec(" ", style));
        assert_eq!(buffer.get(60, 40).expect("in range"), base);
    }

    #[test]
    fn simplified_style_drops_decorations() {
        let style = TextBoxStyle {
            font_size: 30.0,
            border_width: 5.0,
            corner_radius: 9.0,
            background_opacity: 0.2,
            ..Default::default()
        }
        .simplified();
        assert_eq!(style.font_size, 30.0);
        assert_eq!(style.border_width, 0.0);
        assert_eq!(style.corner_radius, 0.0);
        assert_eq!(style.background_opacity, 1.0);
    }
}
