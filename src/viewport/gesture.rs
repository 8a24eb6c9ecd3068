use crate::geometry::ScreenPoint;

use super::ViewTransform;

const WHEEL_ZOOM_SENSITIVITY: f64 = 0.01;

/// One wheel or trackpad scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelInput {
    pub delta_x: f64,
    pub delta_y: f64,
    /// Ctrl or Cmd held; trackpad pinch also arrives this way.
    pub zoom_modifier: bool,
    pub shift: bool,
    pub pointer: ScreenPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    Panned,
    Zoomed,
    Ignored,
}

impl ViewTransform {
    pub fn apply_wheel(&mut self, input: WheelInput, zoom_enabled: bool) -> WheelOutcome {
        if input.zoom_modifier {
            if !zoom_enabled || input.delta_y == 0.0 {
                return WheelOutcome::Ignored;
            }
            let factor = (-input.delta_y * WHEEL_ZOOM_SENSITIVITY).exp();
            self.zoom_by(factor, input.pointer);
            return WheelOutcome::Zoomed;
        }

        let (dx, dy) = if input.shift && input.delta_x == 0.0 {
            (input.delta_y, 0.0)
        } else {
            (input.delta_x, input.delta_y)
        };
        if dx == 0.0 && dy == 0.0 {
            return WheelOutcome::Ignored;
        }
        self.pan_by_display(-dx, -dy);
        WheelOutcome::Panned
    }
}

/// How a touch gesture was classified when it began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchMode {
    /// Single finger drives the active tool.
    Draw,
    /// Two or more fingers pinch and pan the view.
    Navigate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchUpdate {
    Draw(ScreenPoint),
    Navigated,
    Ignored,
}

/// Arbitrates touch gestures by the number of touch points present at gesture start.
///
/// The mode is fixed until `end`; adding or lifting fingers mid-gesture never switches it.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    mode: Option<TouchMode>,
    last_distance: f64,
    last_midpoint: ScreenPoint,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Option<TouchMode> {
        self.mode
    }

    pub fn begin(&mut self, points: &[ScreenPoint]) -> Option<TouchMode> {
        let mode = match points {
            [] => return None,
            [_] => TouchMode::Draw,
            [first, second, ..] => {
                self.last_distance = first.distance_to(*second);
                self.last_midpoint = first.midpoint(*second);
                TouchMode::Navigate
            }
        };
        tracing::debug!(?mode, touches = points.len(), "touch gesture started");
        self.mode = Some(mode);
        Some(mode)
    }

    pub fn update(
        &mut self,
        points: &[ScreenPoint],
        view: &mut ViewTransform,
        zoom_enabled: bool,
    ) -> TouchUpdate {
        match (self.mode, points) {
            (Some(TouchMode::Draw), [first, ..]) => TouchUpdate::Draw(*first),
            (Some(TouchMode::Navigate), [first, second, ..]) => {
                let distance = first.distance_to(*second);
                let midpoint = first.midpoint(*second);
                if zoom_enabled && self.last_distance > 0.0 && distance > 0.0 {
                    let scale = view.scale() * (distance / self.last_distance);
                    view.zoom_to_unanchored(scale);
                }
                view.pan_by_display(
                    midpoint.x - self.last_midpoint.x,
                    midpoint.y - self.last_midpoint.y,
                );
                self.last_distance = distance;
                self.last_midpoint = midpoint;
                TouchUpdate::Navigated
            }
            _ => TouchUpdate::Ignored,
        }
    }

    pub fn end(&mut self) -> Option<TouchMode> {
        self.mode.take()
    }
}

impl ViewTransform {
    /// Pinch zoom scales about the surface center; the midpoint delta carries the pan.
    fn zoom_to_unanchored(&mut self, scale: f64) {
        self.scale = super::clamp_scale(scale);
    }
}
