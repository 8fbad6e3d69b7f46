//! Synthetic scenes shared by unit tests.

use crate::frame::{DepthGrid, DepthSample, Point2D};
use crate::hand::LabelBuffer;

/// Palm joint of the [`pointing_hand_grid`] scene.
pub(crate) const POINTING_PALM: Point2D = Point2D::new(200, 200);
/// Wrist joint of the [`pointing_hand_grid`] scene.
pub(crate) const POINTING_WRIST: Point2D = Point2D::new(200, 260);

/// Set a `w × h` block of labels with top-left corner `(x, y)`.
pub(crate) fn fill_labels(labels: &mut LabelBuffer, x: i32, y: i32, w: i32, h: i32, label: u8) {
    for yy in y..y + h {
        for xx in x..x + w {
            labels.set(Point2D::new(xx, yy), label);
        }
    }
}

/// Set the inclusive rectangle `[x0, x1] × [y0, y1]` to `depth`.
pub(crate) fn fill_depth(grid: &mut DepthGrid, x0: i32, y0: i32, x1: i32, y1: i32, depth: DepthSample) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            if let Some(i) = grid.index(Point2D::new(x, y)) {
                grid.samples_mut()[i] = depth;
            }
        }
    }
}

/// 512×424 palm with no raised finger.
///
/// Backdrop at 2500 mm and a palm-plane silhouette (x 170..=230,
/// y 170..=265) at 1000 mm.
pub(crate) fn palm_slab_grid() -> DepthGrid {
    let mut grid = DepthGrid::filled(512, 424, 2500);
    fill_depth(&mut grid, 170, 170, 230, 265, 1000);
    grid
}

/// [`palm_slab_grid`] plus a 5×5 fingertip patch centred on (160, 150) at
/// 900 mm.
pub(crate) fn pointing_hand_grid() -> DepthGrid {
    let mut grid = palm_slab_grid();
    fill_depth(&mut grid, 158, 148, 162, 152, 900);
    grid
}

/// The same fingertip patch over a flat wall at palm depth (1000 mm).
pub(crate) fn flat_wall_pointing_grid() -> DepthGrid {
    let mut grid = DepthGrid::filled(512, 424, 1000);
    fill_depth(&mut grid, 158, 148, 162, 152, 900);
    grid
}

/// Little-endian byte encoding of a grid, as a depth source delivers it.
pub(crate) fn grid_bytes(grid: &DepthGrid) -> Vec<u8> {
    grid.samples().iter().flat_map(|d| d.to_le_bytes()).collect()
}
