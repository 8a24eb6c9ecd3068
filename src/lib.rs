//! Raster editing engine for timetable images: a pixel buffer with undo history, a
//! pan/zoom/rotate view, and the tools that erase, recolor and annotate it.

pub mod canvas;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod input;
pub mod logging;
pub mod ops;
pub mod source;
pub mod state;
pub mod text;
pub mod viewport;

pub use canvas::PixelBuffer;
pub use config::{ConfigStore, EditorConfiguration, FeatureFlags, JsonConfigStore};
pub use editor::tools::ToolKind;
pub use editor::{EditOutcome, EditorSession};
pub use error::{EditorError, EditorResult};
pub use history::HistoryStack;
pub use source::{PageRasterizer, SourceDocument};
pub use text::{GlyphRenderer, TextRenderer};
pub use viewport::ViewTransform;
