use crate::geometry::{Color, ToolPoint};

use super::PixelBuffer;

/// A rectangle with optionally rounded corners, in buffer space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

impl RoundedRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Self {
        let max_radius = (width.min(height) / 2.0).max(0.0);
        Self {
            x,
            y,
            width,
            height,
            radius: radius.clamp(0.0, max_radius),
        }
    }

    /// Signed distance from `(px, py)` to the outline; negative inside.
    fn signed_distance(&self, px: f32, py: f32) -> f32 {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        let qx = (px - (self.x + half_w)).abs() - (half_w - self.radius);
        let qy = (py - (self.y + half_h)).abs() - (half_h - self.radius);
        let outside = qx.max(0.0).hypot(qy.max(0.0));
        let inside = qx.max(qy).min(0.0);
        outside + inside - self.radius
    }

    fn pixel_span(&self, margin: f32) -> (i32, i32, i32, i32) {
        (
            (self.x - margin).floor() as i32,
            (self.y - margin).floor() as i32,
            (self.x + self.width + margin).ceil() as i32,
            (self.y + self.height + margin).ceil() as i32,
        )
    }
}

impl PixelBuffer {
    /// Fills the shape at `opacity` (0..=1) with a half-pixel antialiased edge.
    pub fn fill_rounded_rect(&mut self, shape: &RoundedRect, color: Color, opacity: f32) {
        if shape.width <= 0.0 || shape.height <= 0.0 || opacity <= 0.0 {
            return;
        }
        let (left, top, right, bottom) = shape.pixel_span(1.0);
        for y in top..bottom {
            for x in left..right {
                let distance = shape.signed_distance(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage * opacity);
                }
            }
        }
    }

    /// Strokes the outline with a band of `line_width` centered on the edge.
    pub fn stroke_rounded_rect(&mut self, shape: &RoundedRect, color: Color, line_width: f32) {
        if shape.width <= 0.0 || shape.height <= 0.0 || line_width <= 0.0 {
            return;
        }
        let half = line_width / 2.0;
        let (left, top, right, bottom) = shape.pixel_span(half + 1.0);
        for y in top..bottom {
            for x in left..right {
                let distance = shape.signed_distance(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (half + 0.5 - distance.abs()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    /// Paints every pixel whose center lies within `radius` of the segment `from..to`.
    ///
    /// A zero-length segment paints a disc. Returns the number of pixels written.
    pub fn paint_segment(
        &mut self,
        from: ToolPoint,
        to: ToolPoint,
        radius: f32,
        color: Color,
    ) -> usize {
        if radius <= 0.0 {
            return 0;
        }
        let (ax, ay) = (from.x as f32 + 0.5, from.y as f32 + 0.5);
        let (bx, by) = (to.x as f32 + 0.5, to.y as f32 + 0.5);
        let left = (ax.min(bx) - radius).floor() as i32;
        let top = (ay.min(by) - radius).floor() as i32;
        let right = (ax.max(bx) + radius).ceil() as i32;
        let bottom = (ay.max(by) + radius).ceil() as i32;
        let bounds = self.bounds();
        let (dx, dy) = (bx - ax, by - ay);
        let length_sq = dx * dx + dy * dy;
        let radius_sq = radius * radius;
        let mut painted = 0;

        for y in top.max(0)..bottom.min(bounds.height) {
            for x in left.max(0)..right.min(bounds.width) {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let t = if length_sq > 0.0 {
                    (((px - ax) * dx + (py - ay) * dy) / length_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let (cx, cy) = (ax + t * dx - px, ay + t * dy - py);
                if cx * cx + cy * cy <= radius_sq {
                    self.write(x as u32, y as u32, color);
                    painted += 1;
                }
            }
        }
        painted
    }
}
