//! Depth-relative bucketing of the window around a palm.
//!
//! Every pixel inside the window is labelled with
//! `(palm_depth - depth) / quantum_mm` (truncating), so bucket 0 is the palm
//! plane (and anything less than one quantum behind it) and bucket 6 is six
//! quanta in front. Anything else, invalid samples, and everything outside the
//! window is [`BACKGROUND`].

use crate::frame::{DepthGrid, DepthSample, Point2D};

use super::labels::{LabelBuffer, BACKGROUND};

/// Geometry and quantization of the hand window.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Half-width of the window (pixels); also its extent above the palm.
    pub half_width: i32,
    /// Extent below the palm as a multiple of `half_width`.
    pub below_factor: f32,
    /// Depth bucket size (millimetres).
    pub quantum_mm: i32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            half_width: 60,
            below_factor: 1.5,
            quantum_mm: 25,
        }
    }
}

/// Clamped window that was classified, plus its reference depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegionWindow {
    /// Inclusive left column.
    pub x0: u32,
    /// Inclusive top row.
    pub y0: u32,
    /// Exclusive right column.
    pub x1: u32,
    /// Exclusive bottom row.
    pub y1: u32,
    /// Depth at the palm pixel (reference plane).
    pub palm_depth: DepthSample,
}

impl RegionWindow {
    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= self.x0 as i32 && p.x < self.x1 as i32 && p.y >= self.y0 as i32 && p.y < self.y1 as i32
    }

    pub fn area(&self) -> usize {
        (self.x1 - self.x0) as usize * (self.y1 - self.y0) as usize
    }
}

/// Bucket for one sample relative to the palm plane.
#[inline]
pub fn depth_bucket(palm_depth: DepthSample, depth: DepthSample, quantum_mm: i32) -> u8 {
    if depth == 0 || quantum_mm <= 0 {
        return BACKGROUND;
    }
    let bucket = (palm_depth as i32 - depth as i32) / quantum_mm;
    if (0..BACKGROUND as i32).contains(&bucket) {
        bucket as u8
    } else {
        BACKGROUND
    }
}

/// Clamp the configured window around `palm` to the grid.
fn window_bounds(grid: &DepthGrid, palm: Point2D, cfg: &RegionConfig) -> Option<[u32; 4]> {
    let hw = cfg.half_width.max(0);
    let below = (hw as f32 * cfg.below_factor.max(0.0)).round() as i32;
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    let x0 = (palm.x - hw).clamp(0, w);
    let x1 = (palm.x + hw).clamp(0, w);
    let y0 = (palm.y - hw).clamp(0, h);
    let y1 = (palm.y + below).clamp(0, h);
    (x0 < x1 && y0 < y1).then_some([x0 as u32, y0 as u32, x1 as u32, y1 as u32])
}

/// Label the window around `palm` into `labels`.
///
/// Returns `None` (leaving `labels` untouched) when the palm lies outside the
/// grid, its depth is invalid, or `labels` does not match the grid size.
pub fn classify_hand_region(
    grid: &DepthGrid,
    palm: Point2D,
    labels: &mut LabelBuffer,
    cfg: &RegionConfig,
) -> Option<RegionWindow> {
    if labels.dimensions() != grid.dimensions() {
        tracing::debug!(
            "label buffer {:?} does not match grid {:?}",
            labels.dimensions(),
            grid.dimensions()
        );
        return None;
    }
    let palm_depth = grid.get(palm)?;
    if palm_depth == 0 {
        return None;
    }
    let [x0, y0, x1, y1] = window_bounds(grid, palm, cfg)?;

    for y in y0..y1 {
        let src = grid.row(y)?.get(x0 as usize..x1 as usize)?;
        let dst = labels.row_span_mut(y, x0, x1)?;
        for (label, &depth) in dst.iter_mut().zip(src) {
            *label = depth_bucket(palm_depth, depth, cfg.quantum_mm);
        }
    }

    Some(RegionWindow {
        x0,
        y0,
        x1,
        y1,
        palm_depth,
    })
}
