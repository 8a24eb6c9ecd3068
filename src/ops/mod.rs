//! Raster editing algorithms applied to a [`PixelBuffer`](crate::canvas::PixelBuffer).

mod background;
mod flood_fill;
mod text_box;

pub use background::infer_background;
pub use flood_fill::{is_protected_seed, remove_color_region, ColorRemoval, COLOR_WAND_TOLERANCE};
pub use text_box::{
    composite_text_box, layout_text_box, wrap_text, LaidOutLine, TextAlign, TextBoxSpec,
    TextBoxStyle,
};
