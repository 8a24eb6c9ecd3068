/// Lifecycle phase of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No decoded image yet. Pointer input is refused.
    #[default]
    Loading,
    Editing,
    /// A text box rectangle is waiting for its content and style.
    ComposingText,
}

impl SessionPhase {
    pub const fn accepts_pointer_input(self) -> bool {
        matches!(self, Self::Editing)
    }
}
