//! Turning uploaded bytes into a decoded raster the session can load.

use image::DynamicImage;
use thiserror::Error;

/// Page 1 of a PDF is rendered at twice its nominal size.
pub const PDF_RENDER_SCALE: f32 = 2.0;
const PDF_FIRST_PAGE: u32 = 0;
const PDF_MAGIC: &[u8] = b"%PDF";
/// Readers accept the header anywhere in the first kilobyte.
const PDF_HEADER_WINDOW: usize = 1024;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source document is empty")]
    EmptyInput,
    #[error("failed to decode image")]
    Decode(#[from] image::ImageError),
    #[error("failed to render PDF page {page}: {message}")]
    PageRender { page: u32, message: String },
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Raster,
}

/// Renders one PDF page to pixels. Supplied by the host.
pub trait PageRasterizer {
    fn render_page(&self, pdf: &[u8], page_index: u32, scale: f32) -> SourceResult<DynamicImage>;
}

/// Rasterizer for hosts that only accept image uploads.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPdfSupport;

impl PageRasterizer for NoPdfSupport {
    fn render_page(&self, _pdf: &[u8], page_index: u32, _scale: f32) -> SourceResult<DynamicImage> {
        Err(SourceError::PageRender {
            page: page_index,
            message: "no PDF rasterizer configured".to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SourceDocument<'a> {
    bytes: &'a [u8],
    kind: SourceKind,
}

impl<'a> SourceDocument<'a> {
    pub fn detect(bytes: &'a [u8]) -> SourceResult<Self> {
        if bytes.is_empty() {
            return Err(SourceError::EmptyInput);
        }
        let header = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
        let kind = if header
            .windows(PDF_MAGIC.len())
            .any(|window| window == PDF_MAGIC)
        {
            SourceKind::Pdf
        } else {
            SourceKind::Raster
        };
        Ok(Self { bytes, kind })
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn decode(&self, rasterizer: &dyn PageRasterizer) -> SourceResult<DynamicImage> {
        let image = match self.kind {
            SourceKind::Pdf => {
                rasterizer.render_page(self.bytes, PDF_FIRST_PAGE, PDF_RENDER_SCALE)?
            }
            SourceKind::Raster => image::load_from_memory(self.bytes)?,
        };
        tracing::debug!(
            kind = ?self.kind,
            width = image.width(),
            height = image.height(),
            "source decoded"
        );
        Ok(image)
    }
}
