use std::collections::HashMap;

use crate::canvas::PixelBuffer;
use crate::geometry::{Color, ToolBounds};

const RING_OFFSET: u32 = 2;
const INK_CEILING: u8 = 80;
const BUCKET_WIDTH: u8 = 5;

struct Bucket {
    first_color: Color,
    count: usize,
}

/// Estimates the paper color around `target` so an erased area blends in.
///
/// Only the outer edge of the sample box grown 2px around `target` (clamped to the
/// buffer) is read. Dark ink and borders are skipped, the rest is bucketed per channel,
/// and the first color seen in the fullest bucket wins. Falls back to white.
pub fn infer_background(buffer: &PixelBuffer, target: ToolBounds) -> Color {
    let Some(sample) = target.inflate(RING_OFFSET).clamp_to(buffer.bounds()) else {
        return Color::WHITE;
    };
    let left = sample.x as u32;
    let top = sample.y as u32;
    let right = left + sample.width - 1;
    let bottom = top + sample.height - 1;

    // Buckets keep first-seen order so ties resolve by scan order.
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut slots: HashMap<(u8, u8, u8), usize> = HashMap::new();

    for y in top..=bottom {
        for x in left..=right {
            let on_edge = x == left || x == right || y == top || y == bottom;
            if !on_edge {
                continue;
            }
            let color = buffer.color_at(x, y);
            if color.all_channels_below(INK_CEILING) {
                continue;
            }
            let key = (
                color.r / BUCKET_WIDTH,
                color.g / BUCKET_WIDTH,
                color.b / BUCKET_WIDTH,
            );
            let slot = *slots.entry(key).or_insert_with(|| {
                buckets.push(Bucket {
                    first_color: color,
                    count: 0,
                });
                buckets.len() - 1
            });
            buckets[slot].count += 1;
        }
    }

    let mut winner: Option<&Bucket> = None;
    for bucket in &buckets {
        match winner {
            Some(best) if bucket.count <= best.count => {}
            _ => winner = Some(bucket),
        }
    }
    winner
        .map(|bucket| bucket.first_color.opaque())
        .unwrap_or(Color::WHITE)
}
