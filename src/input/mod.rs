mod shortcut;

pub use shortcut::{
    resolve_shortcut, InputContext, KeyPhase, ShortcutAction, ShortcutKey, ShortcutModifiers,
};
