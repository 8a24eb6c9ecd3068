//! Display transform between screen space and buffer space.
//!
//! Pan and zoom only change how the buffer is shown. Buffer coordinates never move.
//! The pan offset lives in the surface frame, i.e. the frame of the editing surface
//! before the optional 90° clockwise display rotation is applied.

mod gesture;

use crate::geometry::{ImageBounds, ScreenPoint, ScreenRect, ToolPoint};

pub use gesture::{TouchMode, TouchTracker, TouchUpdate, WheelInput, WheelOutcome};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;
const KEYBOARD_ZOOM_FACTOR: f64 = 1.2;
const NARROW_VIEWPORT_MAX_WIDTH: f64 = 768.0;

pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub scale: f64,
    pub pan: ScreenPoint,
    pub rotated: bool,
}

#[derive(Debug, Clone)]
pub struct ViewTransform {
    container: ScreenRect,
    buffer_width: u32,
    buffer_height: u32,
    scale: f64,
    pan: ScreenPoint,
    auto_rotate_enabled: bool,
    rotation_override: Option<bool>,
}

impl ViewTransform {
    pub fn new(container: ScreenRect, auto_rotate_enabled: bool) -> Self {
        Self {
            container,
            buffer_width: 0,
            buffer_height: 0,
            scale: 1.0,
            pan: ScreenPoint::default(),
            auto_rotate_enabled,
            rotation_override: None,
        }
    }

    pub fn state(&self) -> ViewState {
        ViewState {
            scale: self.scale,
            pan: self.pan,
            rotated: self.is_rotated(),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pan(&self) -> ScreenPoint {
        self.pan
    }

    pub fn container(&self) -> ScreenRect {
        self.container
    }

    /// Portrait and narrow viewports show the surface rotated unless the user overrode it.
    pub fn is_rotated(&self) -> bool {
        self.rotation_override.unwrap_or_else(|| {
            self.auto_rotate_enabled
                && self.container.height > self.container.width
                && self.container.width <= NARROW_VIEWPORT_MAX_WIDTH
        })
    }

    pub fn toggle_rotation(&mut self) {
        let rotated = !self.is_rotated();
        self.rotation_override = Some(rotated);
        tracing::debug!(rotated, "display rotation toggled");
        self.reset();
    }

    pub fn set_container(&mut self, container: ScreenRect) {
        self.container = container;
    }

    /// Adopts a freshly loaded buffer and fits it to the container.
    pub fn set_buffer_size(&mut self, width: u32, height: u32) {
        self.buffer_width = width;
        self.buffer_height = height;
        self.reset();
    }

    /// Scale at which the whole (possibly rotated) surface fits the container.
    pub fn fit_scale(&self) -> f64 {
        if self.buffer_width == 0 || self.buffer_height == 0 {
            return 1.0;
        }
        let (surface_w, surface_h) = self.display_extent(1.0);
        if self.container.width <= 0.0 || self.container.height <= 0.0 {
            return 1.0;
        }
        clamp_scale((self.container.width / surface_w).min(self.container.height / surface_h))
    }

    pub fn reset(&mut self) {
        self.pan = ScreenPoint::default();
        self.scale = self.fit_scale();
    }

    fn display_extent(&self, scale: f64) -> (f64, f64) {
        let width = f64::from(self.buffer_width) * scale;
        let height = f64::from(self.buffer_height) * scale;
        if self.is_rotated() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Converts a display-space vector into the surface frame.
    pub fn display_delta_to_surface(&self, dx: f64, dy: f64) -> (f64, f64) {
        if self.is_rotated() {
            (dy, -dx)
        } else {
            (dx, dy)
        }
    }

    fn surface_delta_to_display(&self, sx: f64, sy: f64) -> (f64, f64) {
        if self.is_rotated() {
            (-sy, sx)
        } else {
            (sx, sy)
        }
    }

    /// On-screen bounding box of the rendered canvas.
    pub fn canvas_rect(&self) -> ScreenRect {
        let (width, height) = self.display_extent(self.scale);
        let center = self.container.center();
        let (offset_x, offset_y) = self.surface_delta_to_display(self.pan.x, self.pan.y);
        ScreenRect::new(
            center.x + offset_x - width / 2.0,
            center.y + offset_y - height / 2.0,
            width,
            height,
        )
    }

    /// Maps a screen point to fractional buffer coordinates without clamping.
    pub fn screen_to_buffer(&self, point: ScreenPoint) -> (f64, f64) {
        let rect = self.canvas_rect();
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return (0.0, 0.0);
        }
        let bw = f64::from(self.buffer_width);
        let bh = f64::from(self.buffer_height);
        if self.is_rotated() {
            (
                (point.y - rect.top) * (bw / rect.height),
                (rect.right() - point.x) * (bh / rect.width),
            )
        } else {
            (
                (point.x - rect.left) * (bw / rect.width),
                (point.y - rect.top) * (bh / rect.height),
            )
        }
    }

    fn buffer_extent(&self) -> (i32, i32) {
        (
            i32::try_from(self.buffer_width).unwrap_or(i32::MAX),
            i32::try_from(self.buffer_height).unwrap_or(i32::MAX),
        )
    }

    /// Maps a screen point to the buffer pixel under it, clamped to the buffer edges.
    pub fn screen_to_pixel(&self, point: ScreenPoint) -> ToolPoint {
        let (x, y) = self.screen_to_buffer(point);
        let (width, height) = self.buffer_extent();
        ImageBounds::new(width, height).clamp_point(ToolPoint::new(floor_to_i32(x), floor_to_i32(y)))
    }

    /// Maps a screen point to a pixel-grid corner, clamped to `0..=width` and `0..=height`.
    ///
    /// Rectangle drags use corners so a drag past the far edge covers the last row and column.
    pub fn screen_to_corner(&self, point: ScreenPoint) -> ToolPoint {
        let (x, y) = self.screen_to_buffer(point);
        let (width, height) = self.buffer_extent();
        ToolPoint::new(
            floor_to_i32(x).clamp(0, width),
            floor_to_i32(y).clamp(0, height),
        )
    }

    pub fn buffer_to_screen(&self, x: f64, y: f64) -> ScreenPoint {
        let rect = self.canvas_rect();
        let bw = f64::from(self.buffer_width.max(1));
        let bh = f64::from(self.buffer_height.max(1));
        if self.is_rotated() {
            ScreenPoint::new(
                rect.right() - y * (rect.width / bh),
                rect.top + x * (rect.height / bw),
            )
        } else {
            ScreenPoint::new(
                rect.left + x * (rect.width / bw),
                rect.top + y * (rect.height / bh),
            )
        }
    }

    pub fn pan_by_display(&mut self, dx: f64, dy: f64) {
        let (sx, sy) = self.display_delta_to_surface(dx, dy);
        self.pan = ScreenPoint::new(self.pan.x + sx, self.pan.y + sy);
    }

    /// Sets the scale while keeping the buffer point under `anchor` visually fixed.
    pub fn zoom_to(&mut self, new_scale: f64, anchor: ScreenPoint) {
        let new_scale = clamp_scale(new_scale);
        let old_scale = self.scale;
        if old_scale <= 0.0 || (new_scale - old_scale).abs() < f64::EPSILON {
            return;
        }
        let center = self.container.center();
        let (px, py) = self.display_delta_to_surface(anchor.x - center.x, anchor.y - center.y);
        let ratio = new_scale / old_scale;
        self.pan = ScreenPoint::new(
            px - (px - self.pan.x) * ratio,
            py - (py - self.pan.y) * ratio,
        );
        self.scale = new_scale;
    }

    pub fn zoom_by(&mut self, factor: f64, anchor: ScreenPoint) {
        self.zoom_to(self.scale * factor, anchor);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(KEYBOARD_ZOOM_FACTOR, self.container.center());
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / KEYBOARD_ZOOM_FACTOR, self.container.center());
    }
}

fn floor_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        0
    } else {
        value.floor().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
    }
}
