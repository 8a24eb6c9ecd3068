mod controller;

use thiserror::Error;

use crate::config::FeatureFlags;

pub use controller::{EraseFill, PointerInput, ToolCommand, ToolController};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ColorWand,
    RectEraser,
    TextEraser,
    Pan,
    ColorPicker,
    TextBox,
    FreehandBrush,
}

/// How a tool consumes a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToolInteraction {
    /// Acts once on pointer down.
    SingleShot,
    /// Tracks a rectangle and acts on release.
    RectDrag,
    /// Paints continuously while the pointer moves.
    Stroke,
    /// Moves the view.
    Pan,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        Self::TextEraser,
        Self::RectEraser,
        Self::ColorPicker,
        Self::ColorWand,
        Self::FreehandBrush,
        Self::TextBox,
        Self::Pan,
    ];

    pub(crate) const fn interaction(self) -> ToolInteraction {
        match self {
            Self::ColorWand | Self::ColorPicker => ToolInteraction::SingleShot,
            Self::RectEraser | Self::TextEraser | Self::TextBox => ToolInteraction::RectDrag,
            Self::FreehandBrush => ToolInteraction::Stroke,
            Self::Pan => ToolInteraction::Pan,
        }
    }

    pub const fn is_enabled(self, features: &FeatureFlags) -> bool {
        match self {
            Self::ColorWand => features.remove_color,
            Self::RectEraser | Self::TextEraser | Self::ColorPicker => features.remove_text,
            Self::TextBox => features.word_box || features.word_box_simplified,
            Self::FreehandBrush => features.eraser,
            Self::Pan => true,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ColorWand => "Remove color",
            Self::RectEraser => "Erase area",
            Self::TextEraser => "Remove text",
            Self::Pan => "Pan",
            Self::ColorPicker => "Pick background",
            Self::TextBox => "Text box",
            Self::FreehandBrush => "Eraser",
        }
    }
}

/// Tools offered by the selection surface, in display order.
pub fn available_tools(features: &FeatureFlags) -> Vec<ToolKind> {
    ToolKind::ALL
        .into_iter()
        .filter(|tool| tool.is_enabled(features))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("tool {0:?} is disabled by configuration")]
    ToolDisabled(ToolKind),
    #[error("a {0:?} gesture is still in progress")]
    GestureInProgress(ToolKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_tools_share_drag_interaction() {
        for tool in [ToolKind::RectEraser, ToolKind::TextEraser, ToolKind::TextBox] {
            assert_eq!(tool.interaction(), ToolInteraction::RectDrag, "{tool:?}");
        }
        assert_eq!(ToolKind::ColorWand.interaction(), ToolInteraction::SingleShot);
        assert_eq!(ToolKind::FreehandBrush.interaction(), ToolInteraction::Stroke);
    }

    #[test]
    fn disabled_features_hide_their_tools() {
        let features = FeatureFlags {
            remove_text: false,
            eraser: false,
            ..FeatureFlags::default()
        };
        let tools = available_tools(&features);
        assert_eq!(
            tools,
            vec![ToolKind::ColorWand, ToolKind::TextBox, ToolKind::Pan]
        );
    }

    #[test]
    fn simplified_word_box_alone_enables_text_box() {
        let features = FeatureFlags {
            word_box: false,
            word_box_simplified: true,
            ..FeatureFlags::default()
        };
        assert!(ToolKind::TextBox.is_enabled(&features));

        let features = FeatureFlags {
            word_box: false,
            word_box_simplified: false,
            ..FeatureFlags::default()
        };
        assert!(!ToolKind::TextBox.is_enabled(&features));
    }

    #[test]
    fn selection_surface_labels_are_distinct() {
        let labels: Vec<&str> = available_tools(&FeatureFlags::default())
            .into_iter()
            .map(ToolKind::label)
            .collect();
        assert_eq!(labels.len(), ToolKind::ALL.len());
        assert!(labels.iter().all(|label| !label.trim().is_empty()));
        let mut unique = labels.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), labels.len(), "labels should be unique: {labels:?}");
        assert_eq!(ToolKind::ColorWand.label(), "Remove color");
    }

    #[test]
    fn pan_is_always_available() {
        let features = FeatureFlags {
            remove_text: false,
            remove_color: false,
            word_box: false,
            word_box_simplified: false,
            eraser: false,
            zoom: false,
            undo_redo: false,
        };
        assert_eq!(available_tools(&features), vec![ToolKind::Pan]);
    }
}
