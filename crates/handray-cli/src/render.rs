//! PNG rendering of label buffers and detections.

use std::path::PathBuf;

use handray::{HandDetection, LabelBuffer, VisualizationSink, BACKGROUND, GUIDE};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

/// Bucket colours, nearest to the palm plane first. Index 7 is background.
const PALETTE: [[u8; 3]; 8] = [
    [230, 60, 60],
    [240, 140, 40],
    [240, 220, 60],
    [120, 210, 80],
    [60, 190, 200],
    [70, 110, 230],
    [160, 80, 220],
    [16, 16, 16],
];
const GUIDE_RGB: Rgb<u8> = Rgb([255, 255, 255]);
const FINGERTIP_RGB: Rgb<u8> = Rgb([255, 0, 255]);
const THUMB_RGB: Rgb<u8> = Rgb([0, 255, 255]);
const AXIS_RGB: Rgb<u8> = Rgb([200, 200, 200]);

fn label_rgb(label: u8) -> Rgb<u8> {
    match label {
        GUIDE => GUIDE_RGB,
        l if l < BACKGROUND => Rgb(PALETTE[l as usize]),
        _ => Rgb(PALETTE[BACKGROUND as usize]),
    }
}

/// Colour the label buffer and overlay palm axis, fingertips and thumb.
pub fn render_labels(labels: &LabelBuffer, hands: &[HandDetection]) -> RgbImage {
    let (w, h) = labels.dimensions();
    let raw = labels.as_raw();
    let mut img = RgbImage::from_fn(w, h, |x, y| {
        label_rgb(raw[y as usize * w as usize + x as usize])
    });

    for hand in hands {
        draw_line_segment_mut(
            &mut img,
            (hand.wrist.x as f32, hand.wrist.y as f32),
            (hand.palm.x as f32, hand.palm.y as f32),
            AXIS_RGB,
        );
        for tip in &hand.fingertips {
            draw_filled_circle_mut(&mut img, (tip.point.x, tip.point.y), 3, FINGERTIP_RGB);
        }
        if let Some(thumb) = &hand.thumb {
            draw_filled_circle_mut(&mut img, (thumb.point.x, thumb.point.y), 3, THUMB_RGB);
        }
    }
    img
}

/// Writes one numbered PNG per presented frame into a directory.
pub struct PngSequenceSink {
    dir: PathBuf,
    next_index: usize,
}

impl PngSequenceSink {
    pub fn new(dir: PathBuf) -> std::io::Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, next_index: 0 })
    }

    pub fn written(&self) -> usize {
        self.next_index
    }
}

impl VisualizationSink for PngSequenceSink {
    fn present(&mut self, labels: &LabelBuffer, hands: &[HandDetection]) {
        let path = self.dir.join(format!("labels_{:05}.png", self.next_index));
        self.next_index += 1;
        if let Err(e) = render_labels(labels, hands).save(&path) {
            tracing::warn!("failed to write {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_and_guides_use_fixed_colours() {
        assert_eq!(label_rgb(BACKGROUND), Rgb(PALETTE[7]));
        assert_eq!(label_rgb(200), Rgb(PALETTE[7]));
        assert_eq!(label_rgb(GUIDE), GUIDE_RGB);
        assert_eq!(label_rgb(0), Rgb(PALETTE[0]));
    }

    #[test]
    fn render_matches_buffer_size() {
        let labels = LabelBuffer::new(40, 30);
        let img = render_labels(&labels, &[]);
        assert_eq!(img.dimensions(), (40, 30));
        assert_eq!(*img.get_pixel(10, 10), Rgb(PALETTE[7]));
    }
}
