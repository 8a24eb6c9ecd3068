use super::{ToolError, ToolInteraction, ToolKind};
use crate::config::{clamp_brush_radius, FeatureFlags};
use crate::geometry::{ScreenPoint, ToolBounds, ToolPoint};

/// A pointer sample in both coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub screen: ScreenPoint,
    /// Pixel under the pointer, clamped to `0..width` and `0..height`.
    pub pixel: ToolPoint,
    /// Grid corner nearest the pointer, clamped to `0..=width` and `0..=height`.
    pub corner: ToolPoint,
}

impl PointerInput {
    pub const fn new(screen: ScreenPoint, pixel: ToolPoint) -> Self {
        Self {
            screen,
            pixel,
            corner: pixel,
        }
    }

    pub fn with_corner(mut self, corner: ToolPoint) -> Self {
        self.corner = corner;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseFill {
    White,
    /// Inferred from the surrounding paper, or the picked color in manual mode.
    Background,
}

/// What the session must do in response to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolCommand {
    None,
    RemoveColor {
        seed: ToolPoint,
    },
    PickColor {
        at: ToolPoint,
    },
    EraseRect {
        bounds: ToolBounds,
        fill: EraseFill,
    },
    PaintStroke {
        from: ToolPoint,
        to: ToolPoint,
        radius: u32,
    },
    CommitStroke,
    RequestTextBox {
        bounds: ToolBounds,
    },
    Pan {
        dx: f64,
        dy: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Rect {
        tool: ToolKind,
        start: ToolPoint,
        current: ToolPoint,
    },
    Stroke {
        last: ToolPoint,
    },
    Pan {
        last: ScreenPoint,
    },
}

/// Active tool plus the pointer gesture currently in flight.
#[derive(Debug, Clone)]
pub struct ToolController {
    active: ToolKind,
    momentary_previous: Option<ToolKind>,
    gesture: Option<Gesture>,
    brush_radius: u32,
    features: FeatureFlags,
}

impl ToolController {
    pub fn new(features: FeatureFlags, brush_radius: u32) -> Self {
        Self {
            active: default_tool(&features),
            momentary_previous: None,
            gesture: None,
            brush_radius: clamp_brush_radius(brush_radius),
            features,
        }
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active
    }

    pub fn features(&self) -> &FeatureFlags {
        &self.features
    }

    pub fn brush_radius(&self) -> u32 {
        self.brush_radius
    }

    pub fn set_brush_radius(&mut self, radius: u32) {
        self.brush_radius = clamp_brush_radius(radius);
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn is_momentary_pan(&self) -> bool {
        self.momentary_previous.is_some()
    }

    /// Normalized rectangle of an in-flight drag, for preview drawing.
    pub fn drag_bounds(&self) -> Option<ToolBounds> {
        match self.gesture {
            Some(Gesture::Rect { start, current, .. }) => {
                Some(ToolBounds::from_corners(start, current))
            }
            _ => None,
        }
    }

    pub fn select(&mut self, tool: ToolKind) -> Result<(), ToolError> {
        if !tool.is_enabled(&self.features) {
            return Err(ToolError::ToolDisabled(tool));
        }
        if self.gesture.is_some() {
            return Err(ToolError::GestureInProgress(self.active));
        }
        self.momentary_previous = None;
        if self.active != tool {
            tracing::debug!(from = ?self.active, to = ?tool, "tool selected");
        }
        self.active = tool;
        Ok(())
    }

    /// Applies new feature switches, falling back when the active tool became disabled.
    ///
    /// Returns what the abandoned gesture still owes, such as the commit of a stroke
    /// that has already painted.
    pub fn set_features(&mut self, features: FeatureFlags) -> ToolCommand {
        self.features = features;
        if let Some(previous) = self.momentary_previous {
            if !previous.is_enabled(&features) {
                self.momentary_previous = Some(default_tool(&features));
            }
            return ToolCommand::None;
        }
        if self.active.is_enabled(&features) {
            return ToolCommand::None;
        }
        let pending = self.cancel_gesture();
        let fallback = default_tool(&features);
        tracing::debug!(from = ?self.active, to = ?fallback, "active tool disabled");
        self.active = fallback;
        pending
    }

    /// Switches to pan while the pan key is held. Returns false when nothing changed.
    pub fn begin_momentary_pan(&mut self) -> bool {
        if self.momentary_previous.is_some()
            || self.gesture.is_some()
            || self.active == ToolKind::Pan
        {
            return false;
        }
        self.momentary_previous = Some(self.active);
        self.active = ToolKind::Pan;
        true
    }

    pub fn end_momentary_pan(&mut self) -> bool {
        let Some(previous) = self.momentary_previous.take() else {
            return false;
        };
        if matches!(self.gesture, Some(Gesture::Pan { .. })) {
            self.gesture = None;
        }
        self.active = previous;
        true
    }

    pub fn pointer_down(&mut self, input: PointerInput) -> ToolCommand {
        if self.gesture.is_some() {
            return ToolCommand::None;
        }
        let tool = self.active;
        match tool.interaction() {
            ToolInteraction::SingleShot => match tool {
                ToolKind::ColorPicker => {
                    if ToolKind::TextEraser.is_enabled(&self.features) {
                        self.active = ToolKind::TextEraser;
                    }
                    ToolCommand::PickColor { at: input.pixel }
                }
                ToolKind::ColorWand => ToolCommand::RemoveColor { seed: input.pixel },
                _ => ToolCommand::None,
            },
            ToolInteraction::RectDrag => {
                self.gesture = Some(Gesture::Rect {
                    tool,
                    start: input.corner,
                    current: input.corner,
                });
                ToolCommand::None
            }
            ToolInteraction::Stroke => {
                self.gesture = Some(Gesture::Stroke { last: input.pixel });
                ToolCommand::PaintStroke {
                    from: input.pixel,
                    to: input.pixel,
                    radius: self.brush_radius,
                }
            }
            ToolInteraction::Pan => {
                self.gesture = Some(Gesture::Pan { last: input.screen });
                ToolCommand::None
            }
        }
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> ToolCommand {
        match self.gesture.as_mut() {
            Some(Gesture::Rect { current, .. }) => {
                *current = input.corner;
                ToolCommand::None
            }
            Some(Gesture::Stroke { last }) => {
                if *last == input.pixel {
                    return ToolCommand::None;
                }
                let from = std::mem::replace(last, input.pixel);
                ToolCommand::PaintStroke {
                    from,
                    to: input.pixel,
                    radius: self.brush_radius,
                }
            }
            Some(Gesture::Pan { last }) => {
                let from = std::mem::replace(last, input.screen);
                ToolCommand::Pan {
                    dx: input.screen.x - from.x,
                    dy: input.screen.y - from.y,
                }
            }
            None => ToolCommand::None,
        }
    }

    pub fn pointer_up(&mut self, input: PointerInput) -> ToolCommand {
        match self.gesture.take() {
            Some(Gesture::Rect { tool, start, .. }) => {
                let bounds = ToolBounds::from_corners(start, input.corner);
                if bounds.is_empty() {
                    tracing::debug!(?tool, "empty drag discarded");
                    return ToolCommand::None;
                }
                match tool {
                    ToolKind::RectEraser => ToolCommand::EraseRect {
                        bounds,
                        fill: EraseFill::White,
                    },
                    ToolKind::TextEraser => ToolCommand::EraseRect {
                        bounds,
                        fill: EraseFill::Background,
                    },
                    _ => ToolCommand::RequestTextBox { bounds },
                }
            }
            Some(Gesture::Stroke { .. }) => ToolCommand::CommitStroke,
            Some(Gesture::Pan { .. }) | None => ToolCommand::None,
        }
    }

    /// Abandons the in-flight gesture. A stroke has already painted, so it still commits.
    pub fn cancel_gesture(&mut self) -> ToolCommand {
        match self.gesture.take() {
            Some(Gesture::Stroke { .. }) => ToolCommand::CommitStroke,
            _ => ToolCommand::None,
        }
    }
}

fn default_tool(features: &FeatureFlags) -> ToolKind {
    ToolKind::ALL
        .into_iter()
        .find(|tool| tool.is_enabled(features))
        .unwrap_or(ToolKind::Pan)
}
