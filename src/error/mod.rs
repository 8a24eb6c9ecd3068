use crate::canvas::CanvasError;
use crate::config::ConfigError;
use crate::editor::tools::ToolError;
use crate::source::SourceError;
use crate::state::StateError;
use thiserror::Error;

pub type EditorResult<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("no image has been loaded")]
    NotLoaded,
    #[error("no text box is waiting for content")]
    NoPendingTextBox,
    #[error("failed to export edited image")]
    Save(#[source] CanvasError),
}
