use crate::canvas::PixelBuffer;
use crate::geometry::{Color, ToolPoint};

/// Euclidean RGB distance a pixel must stay under to join the fill.
pub const COLOR_WAND_TOLERANCE: f64 = 40.0;
const NEAR_WHITE_FLOOR: u8 = 240;
const NEAR_BLACK_CEILING: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRemoval {
    Removed { pixels: usize, seed: Color },
    /// The seed is background white or solid ink; those are never wand targets.
    RefusedSeed { seed: Color },
    OutsideBuffer,
}

impl ColorRemoval {
    pub const fn changed(&self) -> bool {
        matches!(self, Self::Removed { pixels, .. } if *pixels > 0)
    }
}

pub fn is_protected_seed(seed: Color) -> bool {
    seed.all_channels_above(NEAR_WHITE_FLOOR) || seed.all_channels_below(NEAR_BLACK_CEILING)
}

/// Turns the 4-connected region of colors similar to the seed pixel opaque white.
pub fn remove_color_region(buffer: &mut PixelBuffer, seed_point: ToolPoint) -> ColorRemoval {
    let Ok(seed) = buffer.get(seed_point.x, seed_point.y) else {
        return ColorRemoval::OutsideBuffer;
    };
    if is_protected_seed(seed) {
        tracing::debug!(?seed, "color wand refused protected seed color");
        return ColorRemoval::RefusedSeed { seed };
    }

    let pixels = buffer.flood_fill(
        seed_point,
        |candidate| candidate.rgb_distance(seed) < COLOR_WAND_TOLERANCE,
        Color::WHITE,
    );
    tracing::debug!(pixels, ?seed, x = seed_point.x, y = seed_point.y, "color region removed");
    ColorRemoval::Removed { pixels, seed }
}
