//! Per-pixel label buffer shared by the classifier and the ray casters.

use crate::frame::{DepthGrid, Point2D};

/// Number of depth buckets (0..=6 foreground, 7 background).
pub const BUCKET_COUNT: u8 = 8;
/// Background bucket: too far, invalid depth, or outside the hand window.
pub const BACKGROUND: u8 = 7;
/// Overlay mark left by a previously detected fingertip guide line.
pub const GUIDE: u8 = 8;

/// Row-major label buffer with the same dimensions as the depth grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelBuffer {
    width: u32,
    height: u32,
    labels: Vec<u8>,
}

impl LabelBuffer {
    /// Buffer of the given size, all [`BACKGROUND`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            labels: vec![BACKGROUND; width as usize * height as usize],
        }
    }

    /// Buffer sized for `grid`.
    pub fn for_grid(grid: &DepthGrid) -> Self {
        Self::new(grid.width(), grid.height())
    }

    /// Reset to all background, resizing when the grid shape changed.
    pub fn reset_for(&mut self, grid: &DepthGrid) {
        if self.dimensions() != grid.dimensions() {
            *self = Self::for_grid(grid);
        } else {
            self.labels.fill(BACKGROUND);
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.labels
    }

    #[inline]
    fn index(&self, p: Point2D) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x as u32 >= self.width || p.y as u32 >= self.height {
            return None;
        }
        Some(p.y as usize * self.width as usize + p.x as usize)
    }

    /// Label at `p`, `None` outside the buffer.
    #[inline]
    pub fn get(&self, p: Point2D) -> Option<u8> {
        self.index(p).and_then(|i| self.labels.get(i).copied())
    }

    /// Write a label; out-of-range writes are dropped.
    #[inline]
    pub fn set(&mut self, p: Point2D, label: u8) -> bool {
        match self.index(p).and_then(|i| self.labels.get_mut(i)) {
            Some(slot) => {
                *slot = label;
                true
            }
            None => false,
        }
    }

    /// Mutable slice of row `y` covering columns `[x0, x1)`.
    pub(crate) fn row_span_mut(&mut self, y: u32, x0: u32, x1: u32) -> Option<&mut [u8]> {
        if y >= self.height || x0 > x1 || x1 > self.width {
            return None;
        }
        let start = y as usize * self.width as usize;
        self.labels
            .get_mut(start + x0 as usize..start + x1 as usize)
    }

    /// Depth bucket 0..=6 at `p`. Guide marks count as foreground too.
    #[inline]
    pub fn is_foreground(&self, p: Point2D) -> bool {
        matches!(self.get(p), Some(l) if l != BACKGROUND)
    }

    #[inline]
    pub fn is_guide(&self, p: Point2D) -> bool {
        self.get(p) == Some(GUIDE)
    }

    /// Number of pixels currently labelled with each bucket (guide marks excluded).
    pub fn histogram(&self) -> [usize; BUCKET_COUNT as usize] {
        let mut hist = [0usize; BUCKET_COUNT as usize];
        for &l in &self.labels {
            if let Some(slot) = hist.get_mut(l as usize) {
                *slot += 1;
            }
        }
        hist
    }

    /// Mark the straight line from `from` to `to` with [`GUIDE`].
    ///
    /// Pixels outside the buffer are skipped.
    pub fn draw_guide(&mut self, from: Point2D, to: Point2D) {
        let dx = (to.x - from.x) as f32;
        let dy = (to.y - from.y) as f32;
        let n = dx.abs().max(dy.abs()).ceil() as i32;
        if n == 0 {
            self.set(from, GUIDE);
            return;
        }
        let sx = dx / n as f32;
        let sy = dy / n as f32;
        for k in 0..=n {
            let p = Point2D::from_f32(from.x as f32 + sx * k as f32, from.y as f32 + sy * k as f32);
            self.set(p, GUIDE);
        }
    }
}
