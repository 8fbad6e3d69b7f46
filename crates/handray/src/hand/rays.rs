//! Boundary ray casting over the label buffer.
//!
//! Two fans are cast from the palm:
//!
//! - **finger fan**: parallel rays along the wrist→palm axis, shifted sideways
//!   by one offset step each. Every ray is walked from its far end back toward
//!   the palm, so the recorded hit is the outermost foreground pixel (the
//!   fingertip), not the nearest one.
//! - **thumb fan**: rays rotated away from the axis toward the thumb side of
//!   the given hand, walked the same way.
//!
//! A ray that reaches a guide mark before any foreground is discarded
//! (distance 0). Both fans can be clipped to one hand's [`RegionWindow`] with
//! `within`; pixels outside it then read as background, so labels left by
//! another hand in the same buffer are never hit.
//!
//! Both fans are exposed as iterators yielding one [`BoundarySample`] per ray.

use nalgebra::Vector2;

use crate::body::HandSide;
use crate::frame::Point2D;

use super::classify::RegionWindow;
use super::labels::{LabelBuffer, BACKGROUND, GUIDE};

/// Finger fan geometry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FingerFanConfig {
    /// Rays are cast for offsets in `[-scan_width, scan_width)`.
    pub scan_width: i32,
    /// Lateral shift per offset step is `1 / offset_divisor` pixels.
    pub offset_divisor: f32,
    /// Farthest step searched along each ray (pixels).
    pub max_steps: u32,
}

impl Default for FingerFanConfig {
    fn default() -> Self {
        Self {
            scan_width: 60,
            offset_divisor: 1.0,
            max_steps: 80,
        }
    }
}

/// Thumb fan geometry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ThumbFanConfig {
    /// Number of rotation steps.
    pub rays: u32,
    /// Farthest radial step searched (inclusive, pixels).
    pub max_radius: u32,
    /// Rotation of the first ray away from the wrist→palm axis (degrees).
    pub start_deg: f32,
    /// Rotation between consecutive rays (degrees).
    pub step_deg: f32,
    /// Direction coefficients `(d1, d2)` for the right hand.
    pub right_coeffs: [f32; 2],
    /// Direction coefficients `(d1, d2)` for the left hand.
    pub left_coeffs: [f32; 2],
}

impl Default for ThumbFanConfig {
    fn default() -> Self {
        Self {
            rays: 30,
            max_radius: 40,
            start_deg: 20.0,
            step_deg: 3.0,
            right_coeffs: [1.0, -1.0],
            left_coeffs: [-1.0, 1.0],
        }
    }
}

impl ThumbFanConfig {
    pub fn coeffs(&self, side: HandSide) -> [f32; 2] {
        match side {
            HandSide::Right => self.right_coeffs,
            HandSide::Left => self.left_coeffs,
        }
    }
}

/// One ray's result. `distance == 0` means no boundary was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoundarySample {
    /// Lateral offset (finger fan) or rotation index (thumb fan).
    pub offset: i32,
    /// Step along the ray at which the boundary was found.
    pub distance: u32,
    /// Boundary pixel, or the ray origin when nothing was found.
    pub point: Point2D,
}

/// Unit vector from wrist to palm, `None` when the two coincide.
///
/// Joint positions are untrusted, so the difference is taken in `f64`.
pub fn hand_axis(palm: Point2D, wrist: Point2D) -> Option<Vector2<f32>> {
    let dx = f64::from(palm.x) - f64::from(wrist.x);
    let dy = f64::from(palm.y) - f64::from(wrist.y);
    let n = dx.hypot(dy);
    (n > f64::from(f32::EPSILON)).then(|| Vector2::new((dx / n) as f32, (dy / n) as f32))
}

#[inline]
fn to_pixel(v: Vector2<f32>) -> Point2D {
    Point2D::from_f32(v.x, v.y)
}

#[derive(Debug, Clone, Copy)]
enum Hit {
    Foreground,
    Guide,
    Miss,
}

/// Label lookup shared by both fans. Pixels outside `clip` are background.
#[inline]
fn label_hit(labels: &LabelBuffer, clip: Option<&RegionWindow>, p: Point2D) -> Hit {
    if clip.is_some_and(|w| !w.contains(p)) {
        return Hit::Miss;
    }
    match labels.get(p) {
        Some(GUIDE) => Hit::Guide,
        Some(l) if l != BACKGROUND => Hit::Foreground,
        _ => Hit::Miss,
    }
}

/// Finger fan iterator. See [`finger_rays`].
#[derive(Debug, Clone)]
pub struct FingerRays<'a> {
    labels: &'a LabelBuffer,
    clip: Option<RegionWindow>,
    palm: Vector2<f32>,
    axis: Vector2<f32>,
    perp: Vector2<f32>,
    lateral_step: f32,
    max_steps: u32,
    next: i32,
    end: i32,
}

impl FingerRays<'_> {
    /// Treat every pixel outside `window` as background.
    pub fn within(mut self, window: RegionWindow) -> Self {
        self.clip = Some(window);
        self
    }

    fn cast(&self, offset: i32) -> BoundarySample {
        let origin = self.palm + self.perp * (offset as f32 * self.lateral_step);
        let none = BoundarySample {
            offset,
            distance: 0,
            point: to_pixel(origin),
        };
        for j in (1..=self.max_steps).rev() {
            let p = to_pixel(origin + self.axis * j as f32);
            match label_hit(self.labels, self.clip.as_ref(), p) {
                Hit::Guide => return none,
                Hit::Foreground => {
                    return BoundarySample {
                        offset,
                        distance: j,
                        point: p,
                    }
                }
                Hit::Miss => {}
            }
        }
        none
    }
}

impl Iterator for FingerRays<'_> {
    type Item = BoundarySample;

    fn next(&mut self) -> Option<BoundarySample> {
        if self.next >= self.end {
            return None;
        }
        let offset = self.next;
        self.next += 1;
        Some(self.cast(offset))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end - self.next).max(0) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for FingerRays<'_> {}

/// Cast the finger fan. `None` when palm and wrist coincide.
pub fn finger_rays<'a>(
    labels: &'a LabelBuffer,
    palm: Point2D,
    wrist: Point2D,
    cfg: &FingerFanConfig,
) -> Option<FingerRays<'a>> {
    let axis = hand_axis(palm, wrist)?;
    let lateral_step = if cfg.offset_divisor > 0.0 {
        1.0 / cfg.offset_divisor
    } else {
        1.0
    };
    let scan_width = cfg.scan_width.max(0);
    Some(FingerRays {
        labels,
        clip: None,
        palm: Vector2::new(palm.x as f32, palm.y as f32),
        axis,
        perp: Vector2::new(-axis.y, axis.x),
        lateral_step,
        max_steps: cfg.max_steps,
        next: -scan_width,
        end: scan_width,
    })
}

/// Thumb fan iterator. See [`thumb_rays`].
#[derive(Debug, Clone)]
pub struct ThumbRays<'a> {
    labels: &'a LabelBuffer,
    clip: Option<RegionWindow>,
    palm: Vector2<f32>,
    axis: Vector2<f32>,
    coeffs: [f32; 2],
    start_rad: f32,
    step_rad: f32,
    max_radius: u32,
    next: u32,
    end: u32,
}

impl ThumbRays<'_> {
    /// Treat every pixel outside `window` as background.
    pub fn within(mut self, window: RegionWindow) -> Self {
        self.clip = Some(window);
        self
    }

    fn direction(&self, i: u32) -> Vector2<f32> {
        let theta = self.start_rad + i as f32 * self.step_rad;
        let (s, c) = theta.sin_cos();
        let [d1, d2] = self.coeffs;
        let u = self.axis;
        Vector2::new(u.x * c + d1 * u.y * s, d2 * u.x * s + u.y * c)
    }

    fn cast(&self, i: u32) -> BoundarySample {
        let dir = self.direction(i);
        let offset = i as i32;
        let none = BoundarySample {
            offset,
            distance: 0,
            point: to_pixel(self.palm),
        };
        for j in (0..=self.max_radius).rev() {
            let p = to_pixel(self.palm + dir * j as f32);
            match label_hit(self.labels, self.clip.as_ref(), p) {
                Hit::Guide => return none,
                Hit::Foreground => {
                    return BoundarySample {
                        offset,
                        distance: j,
                        point: p,
                    }
                }
                Hit::Miss => {}
            }
        }
        none
    }
}

impl Iterator for ThumbRays<'_> {
    type Item = BoundarySample;

    fn next(&mut self) -> Option<BoundarySample> {
        if self.next >= self.end {
            return None;
        }
        let i = self.next;
        self.next += 1;
        Some(self.cast(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end.saturating_sub(self.next) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for ThumbRays<'_> {}

/// Cast the thumb fan for `side`. `None` when palm and wrist coincide.
pub fn thumb_rays<'a>(
    labels: &'a LabelBuffer,
    palm: Point2D,
    wrist: Point2D,
    side: HandSide,
    cfg: &ThumbFanConfig,
) -> Option<ThumbRays<'a>> {
    let axis = hand_axis(palm, wrist)?;
    Some(ThumbRays {
        labels,
        clip: None,
        palm: Vector2::new(palm.x as f32, palm.y as f32),
        axis,
        coeffs: cfg.coeffs(side),
        start_rad: cfg.start_deg.to_radians(),
        step_rad: cfg.step_deg.to_radians(),
        max_radius: cfg.max_radius,
        next: 0,
        end: cfg.rays,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fill_labels;

    #[test]
    fn finger_fan_reports_outermost_foreground() {
        let mut labels = LabelBuffer::new(100, 100);
        // Palm block plus a gap and a detached tip further out along -y.
        fill_labels(&mut labels, 40, 40, 21, 21, 0);
        fill_labels(&mut labels, 48, 20, 3, 3, 4);
        let rays = finger_rays(
            &labels,
            Point2D::new(50, 50),
            Point2D::new(50, 70),
            &FingerFanConfig {
                scan_width: 4,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(rays.len(), 8);
        let samples: Vec<_> = rays.collect();
        let offsets: Vec<i32> = samples.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![-4, -3, -2, -1, 0, 1, 2, 3]);
        // perp of (0,-1) is (1,0): offset 0 runs through x = 50.
        let centre = samples[4];
        assert_eq!(centre.distance, 30);
        assert_eq!(centre.point, Point2D::new(50, 20));
        // Offset -4 (x = 46) misses the tip and stops at the palm block.
        assert_eq!(samples[0].distance, 10);
    }

    #[test]
    fn finger_fan_discards_rays_reaching_a_guide_first() {
        let mut labels = LabelBuffer::new(100, 100);
        fill_labels(&mut labels, 40, 20, 21, 41, 0);
        let palm = Point2D::new(50, 50);
        let wrist = Point2D::new(50, 70);
        let cfg = FingerFanConfig {
            scan_width: 2,
            ..Default::default()
        };
        labels.draw_guide(palm, Point2D::new(50, 10));
        let samples: Vec<_> = finger_rays(&labels, palm, wrist, &cfg).unwrap().collect();
        // Offset 0 runs along the guide, the others hit the block top.
        assert_eq!(samples[2].distance, 0);
        assert_eq!(samples[2].point, palm);
        assert_eq!(samples[1].distance, 30);
        assert_eq!(samples[3].distance, 30);
    }

    #[test]
    fn clipped_fans_ignore_labels_outside_the_window() {
        let mut labels = LabelBuffer::new(100, 100);
        fill_labels(&mut labels, 0, 0, 100, 100, 0);
        let palm = Point2D::new(50, 50);
        let wrist = Point2D::new(50, 70);
        let window = RegionWindow {
            x0: 40,
            y0: 40,
            x1: 61,
            y1: 61,
            palm_depth: 1000,
        };
        let cfg = FingerFanConfig {
            scan_width: 3,
            ..Default::default()
        };

        let open: Vec<_> = finger_rays(&labels, palm, wrist, &cfg).unwrap().collect();
        assert!(open.iter().all(|s| s.distance == 50), "{open:?}");

        let clipped: Vec<_> = finger_rays(&labels, palm, wrist, &cfg)
            .unwrap()
            .within(window)
            .collect();
        assert!(clipped.iter().all(|s| s.distance == 10), "{clipped:?}");
        assert!(clipped.iter().all(|s| window.contains(s.point)));

        let thumb_cfg = ThumbFanConfig {
            rays: 4,
            ..Default::default()
        };
        let thumb: Vec<_> = thumb_rays(&labels, palm, wrist, HandSide::Right, &thumb_cfg)
            .unwrap()
            .within(window)
            .collect();
        assert!(thumb.iter().all(|s| window.contains(s.point)), "{thumb:?}");
        assert!(thumb.iter().all(|s| s.distance < 15), "{thumb:?}");
    }

    #[test]
    fn hand_axis_survives_extreme_joints() {
        let palm = Point2D::new(200, 200);
        for wrist in [
            Point2D::new(i32::MIN, 0),
            Point2D::new(i32::MAX, i32::MIN),
            Point2D::new(200, i32::MAX),
        ] {
            let axis = hand_axis(palm, wrist).unwrap();
            assert!((axis.norm() - 1.0).abs() < 1e-4, "{wrist:?} -> {axis:?}");
        }
        let up = hand_axis(palm, Point2D::new(200, i32::MAX)).unwrap();
        assert!(up.y < -0.99);
        let far = Point2D::new(i32::MAX, i32::MAX);
        assert!(hand_axis(far, far).is_none());
    }

    #[test]
    fn finger_fan_without_foreground_yields_zero() {
        let labels = LabelBuffer::new(30, 30);
        let samples: Vec<_> = finger_rays(
            &labels,
            Point2D::new(15, 15),
            Point2D::new(15, 25),
            &FingerFanConfig::default(),
        )
        .unwrap()
        .collect();
        assert_eq!(samples.len(), 120);
        assert!(samples.iter().all(|s| s.distance == 0));
    }

    #[test]
    fn degenerate_axis_casts_nothing() {
        let labels = LabelBuffer::new(10, 10);
        let p = Point2D::new(5, 5);
        assert!(finger_rays(&labels, p, p, &FingerFanConfig::default()).is_none());
        assert!(thumb_rays(&labels, p, p, HandSide::Left, &ThumbFanConfig::default()).is_none());
    }

    #[test]
    fn thumb_fan_rotates_toward_hand_side() {
        let labels = LabelBuffer::new(10, 10);
        let palm = Point2D::new(5, 5);
        let wrist = Point2D::new(5, 9);
        let cfg = ThumbFanConfig {
            start_deg: 90.0,
            ..Default::default()
        };
        let right = thumb_rays(&labels, palm, wrist, HandSide::Right, &cfg).unwrap();
        let left = thumb_rays(&labels, palm, wrist, HandSide::Left, &cfg).unwrap();
        let r = right.direction(0);
        let l = left.direction(0);
        assert!(r.x < -0.99 && r.y.abs() < 1e-5, "{r:?}");
        assert!(l.x > 0.99 && l.y.abs() < 1e-5, "{l:?}");
    }

    #[test]
    fn thumb_fan_skips_guide_marks() {
        let mut labels = LabelBuffer::new(60, 60);
        fill_labels(&mut labels, 0, 0, 60, 60, 0);
        let palm = Point2D::new(30, 30);
        let wrist = Point2D::new(30, 50);
        let cfg = ThumbFanConfig {
            rays: 1,
            start_deg: 90.0,
            ..Default::default()
        };
        let hit: Vec<_> = thumb_rays(&labels, palm, wrist, HandSide::Right, &cfg)
            .unwrap()
            .collect();
        assert_eq!(hit[0].distance, 30);
        assert_eq!(hit[0].point, Point2D::new(0, 30));

        labels.draw_guide(palm, Point2D::new(0, 30));
        let hit: Vec<_> = thumb_rays(&labels, palm, wrist, HandSide::Right, &cfg)
            .unwrap()
            .collect();
        assert_eq!(hit[0].distance, 0);
    }
}
