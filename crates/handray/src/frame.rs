//! Depth frame snapshots and the owned, bounds-checked grid the detector reads.
//!
//! A [`DepthFrame`] is the raw view handed over by the depth source: a byte
//! buffer plus declared dimensions. It is validated into a [`DepthGrid`] before
//! any classification happens; a frame whose buffer does not match its declared
//! shape is rejected as a whole.

use image::{ImageBuffer, Luma};
use serde::{Deserialize, Serialize};

/// Depth sample in millimetres. `0` means "no return".
pub type DepthSample = u16;

/// Bytes per depth sample accepted by [`DepthFrame::to_grid`].
pub const DEPTH_BYTES_PER_PIXEL: usize = 2;

/// Integer pixel coordinate in depth-grid space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: i32,
    pub y: i32,
}

impl Point2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Round a sub-pixel position to the nearest pixel.
    #[inline]
    pub fn from_f32(x: f32, y: f32) -> Self {
        Self {
            x: x.round() as i32,
            y: y.round() as i32,
        }
    }

    /// Euclidean distance to `other` in pixels.
    pub fn distance(self, other: Point2D) -> f32 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy) as f32
    }
}

// ── Error type ─────────────────────────────────────────────────────────────

/// Reasons a depth frame is rejected before processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Width or height is zero.
    EmptyFrame,
    /// Sample size other than [`DEPTH_BYTES_PER_PIXEL`].
    UnsupportedBytesPerPixel(usize),
    /// Buffer length disagrees with `width * height`.
    ShapeMismatch {
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
        /// Number of samples actually present in the buffer.
        samples: usize,
    },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFrame => write!(f, "depth frame has zero width or height"),
            Self::UnsupportedBytesPerPixel(bpp) => {
                write!(f, "unsupported depth sample size: {} bytes", bpp)
            }
            Self::ShapeMismatch {
                width,
                height,
                samples,
            } => write!(
                f,
                "depth buffer holds {} samples, expected {}x{}",
                samples, width, height
            ),
        }
    }
}

impl std::error::Error for FrameError {}

// ── Raw frame ──────────────────────────────────────────────────────────────

/// Borrowed view of one depth frame as delivered by the depth source.
#[derive(Debug, Clone, Copy)]
pub struct DepthFrame<'a> {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: usize,
    /// Little-endian samples, row-major.
    pub data: &'a [u8],
}

impl<'a> DepthFrame<'a> {
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            bytes_per_pixel,
            data,
        }
    }

    /// Validate the declared shape and copy the samples into an owned grid.
    pub fn to_grid(&self) -> Result<DepthGrid, FrameError> {
        if self.bytes_per_pixel != DEPTH_BYTES_PER_PIXEL {
            return Err(FrameError::UnsupportedBytesPerPixel(self.bytes_per_pixel));
        }
        let samples = self.data.len() / self.bytes_per_pixel;
        if self.data.len() % self.bytes_per_pixel != 0 {
            return Err(FrameError::ShapeMismatch {
                width: self.width,
                height: self.height,
                samples,
            });
        }
        let decoded = self
            .data
            .chunks_exact(DEPTH_BYTES_PER_PIXEL)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        DepthGrid::from_samples(self.width, self.height, decoded)
    }
}

// ── Owned grid ─────────────────────────────────────────────────────────────

/// Owned row-major grid of depth samples for one time step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthGrid {
    width: u32,
    height: u32,
    samples: Vec<DepthSample>,
}

impl DepthGrid {
    /// Wrap a sample vector, checking `samples.len() == width * height`.
    pub fn from_samples(
        width: u32,
        height: u32,
        samples: Vec<DepthSample>,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyFrame);
        }
        if samples.len() != width as usize * height as usize {
            return Err(FrameError::ShapeMismatch {
                width,
                height,
                samples: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Grid with every sample set to `depth`.
    ///
    /// Zero-sized dimensions are bumped to one pixel.
    pub fn filled(width: u32, height: u32, depth: DepthSample) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            samples: vec![depth; width as usize * height as usize],
        }
    }

    /// Build a grid from a 16-bit grayscale image (one sample per pixel).
    pub fn from_luma16(img: &ImageBuffer<Luma<u16>, Vec<u16>>) -> Result<Self, FrameError> {
        let (w, h) = img.dimensions();
        Self::from_samples(w, h, img.as_raw().clone())
    }

    /// Convert back into a 16-bit grayscale image.
    pub fn to_luma16(&self) -> ImageBuffer<Luma<u16>, Vec<u16>> {
        ImageBuffer::from_raw(self.width, self.height, self.samples.clone())
            .unwrap_or_else(|| ImageBuffer::new(self.width, self.height))
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

    pub fn samples(&self) -> &[DepthSample] {
        &self.samples
    }

    /// Row `y` as a slice, or `None` when `y` is outside the grid.
    pub fn row(&self, y: u32) -> Option<&[DepthSample]> {
        if y >= self.height {
            return None;
        }
        let stride = self.width as usize;
        let start = y as usize * stride;
        self.samples.get(start..start + stride)
    }

    #[inline]
    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height
    }

    /// Linear index of `p`, or `None` if it lies outside the grid.
    #[inline]
    pub fn index(&self, p: Point2D) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        Some(p.y as usize * self.width as usize + p.x as usize)
    }

    /// Sample at `p`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, p: Point2D) -> Option<DepthSample> {
        self.index(p).and_then(|i| self.samples.get(i).copied())
    }

    /// Mutable access for building synthetic frames.
    pub fn samples_mut(&mut self) -> &mut [DepthSample] {
        &mut self.samples
    }
}
