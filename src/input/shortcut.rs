use crate::config::FeatureFlags;
use crate::editor::tools::ToolKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    Character(char),
    Space,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutModifiers {
    /// Ctrl, or Cmd on macOS.
    pub primary: bool,
    pub shift: bool,
}

impl ShortcutModifiers {
    pub const fn new(primary: bool, shift: bool) -> Self {
        Self { primary, shift }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    pub features: FeatureFlags,
    /// Focus is inside a text field owned by the host.
    pub text_input_focused: bool,
    pub composing_text: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    SelectTool(ToolKind),
    BeginMomentaryPan,
    EndMomentaryPan,
    CommitTextBox,
    CancelTextBox,
}

fn resolve_composing_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
) -> Option<ShortcutAction> {
    match (key, modifiers.primary) {
        (ShortcutKey::Escape, _) => Some(ShortcutAction::CancelTextBox),
        (ShortcutKey::Enter, true) => Some(ShortcutAction::CommitTextBox),
        _ => None,
    }
}

fn resolve_tool_shortcut(key: ShortcutKey) -> Option<ToolKind> {
    let ShortcutKey::Character(c) = key else {
        return None;
    };
    match c.to_ascii_lowercase() {
        'w' => Some(ToolKind::ColorWand),
        'r' => Some(ToolKind::RectEraser),
        'e' => Some(ToolKind::TextEraser),
        'i' => Some(ToolKind::ColorPicker),
        't' => Some(ToolKind::TextBox),
        'b' => Some(ToolKind::FreehandBrush),
        'h' => Some(ToolKind::Pan),
        _ => None,
    }
}

fn resolve_primary_shortcut(
    key: ShortcutKey,
    shift: bool,
    features: &FeatureFlags,
) -> Option<ShortcutAction> {
    let ShortcutKey::Character(c) = key else {
        return None;
    };
    let action = match (c.to_ascii_lowercase(), shift) {
        ('z', false) => ShortcutAction::Undo,
        ('z', true) | ('y', false) => ShortcutAction::Redo,
        ('+' | '=', _) => ShortcutAction::ZoomIn,
        ('-', _) => ShortcutAction::ZoomOut,
        ('0', _) => ShortcutAction::ZoomReset,
        _ => return None,
    };
    let enabled = match action {
        ShortcutAction::Undo | ShortcutAction::Redo => features.undo_redo,
        _ => features.zoom,
    };
    enabled.then_some(action)
}

fn resolve_editor_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    features: &FeatureFlags,
) -> Option<ShortcutAction> {
    if modifiers.primary {
        return resolve_primary_shortcut(key, modifiers.shift, features);
    }
    match key {
        ShortcutKey::Space => Some(ShortcutAction::BeginMomentaryPan),
        _ => resolve_tool_shortcut(key)
            .filter(|tool| tool.is_enabled(features))
            .map(ShortcutAction::SelectTool),
    }
}

pub fn resolve_shortcut(
    key: ShortcutKey,
    phase: KeyPhase,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<ShortcutAction> {
    if phase == KeyPhase::Released {
        // A release must always end the override, even if focus moved meanwhile.
        return (key == ShortcutKey::Space).then_some(ShortcutAction::EndMomentaryPan);
    }

    if context.composing_text {
        return resolve_composing_shortcut(key, modifiers);
    }

    if context.text_input_focused {
        return None;
    }

    resolve_editor_shortcut(key, modifiers, &context.features)
}
