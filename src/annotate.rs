//! Drawing tracked vehicles, speeds and reference lines onto frames.

use std::fs;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect as PixelRect;

use crate::error::ConfigError;
use crate::speed::{CrossingConfig, FrameReport};

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LINE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const TEXT_SCALE: f32 = 20.0;

pub struct Annotator {
    lines: CrossingConfig,
    font: Option<FontVec>,
}

impl Annotator {
    /// Annotator without text labels.
    pub fn new(lines: CrossingConfig) -> Self {
        Self { lines, font: None }
    }

    /// Load a TTF/OTF font so ids, speeds and line names are drawn too.
    pub fn with_font_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|_| ConfigError::Font(path.to_path_buf()))?;
        self.font = Some(font);
        Ok(self)
    }

    pub fn draw(&self, image: &RgbImage, report: &FrameReport) -> RgbImage {
        let mut canvas = image.clone();
        let width = canvas.width() as f32;

        for (y, name) in [
            (self.lines.line_first, "1line"),
            (self.lines.line_second, "2line"),
        ] {
            draw_line_segment_mut(&mut canvas, (0.0, y), (width - 1.0, y), LINE_COLOR);
            self.label(&mut canvas, 8, y as i32 - 24, name);
        }

        for vehicle in &report.vehicles {
            let [x1, y1, x2, y2] = vehicle.bbox.to_tlbr();
            let w = (x2 - x1).round() as u32;
            let h = (y2 - y1).round() as u32;
            if w > 0 && h > 0 {
                let rect = PixelRect::at(x1.round() as i32, y1.round() as i32).of_size(w, h);
                draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);
            }

            let (cx, cy) = (vehicle.centroid.x as i32, vehicle.centroid.y as i32);
            draw_filled_circle_mut(&mut canvas, (cx, cy), 4, BOX_COLOR);
            let id = format!("#{}", vehicle.track_id);
            self.label(&mut canvas, x1 as i32, y1 as i32 - 22, &id);

            if let Some(record) = vehicle.speed {
                let text = match record.speed_kmh {
                    Some(kmh) => format!("{} Km/h", kmh as i64),
                    None => "Speed N/A".to_string(),
                };
                self.label(&mut canvas, x2 as i32, y2 as i32, &text);
            }
        }

        canvas
    }

    fn label(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str) {
        if let Some(font) = &self.font {
            let scale = PxScale::from(TEXT_SCALE);
            draw_text_mut(canvas, TEXT_COLOR, x, y, scale, font, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speed::{SpeedRecord, VehicleObservation};
    use crate::tracker::Rect;

    #[test]
    fn test_draws_lines_boxes_and_centroids() {
        let image = RgbImage::new(200, 400);
        let bbox = Rect::from_tlbr(40.0, 100.0, 120.0, 160.0);
        let report = FrameReport {
            vehicles: vec![VehicleObservation {
                track_id: 1,
                bbox,
                centroid: bbox.centroid(),
                speed: Some(SpeedRecord {
                    track_id: 1,
                    speed_kmh: Some(42.0),
                }),
            }],
            ..FrameReport::default()
        };

        let annotated = Annotator::new(CrossingConfig::default()).draw(&image, &report);
        assert_eq!(annotated.get_pixel(100, 322), &LINE_COLOR);
        assert_eq!(annotated.get_pixel(10, 368), &LINE_COLOR);
        assert_eq!(annotated.get_pixel(40, 130), &BOX_COLOR);
        assert_eq!(annotated.get_pixel(80, 130), &BOX_COLOR);
        assert_eq!(annotated.get_pixel(60, 130), &Rgb([0, 0, 0]));
        // The source image is left alone.
        assert_eq!(image.get_pixel(100, 322), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_missing_font_file() {
        let err = Annotator::new(CrossingConfig::default())
            .with_font_file(Path::new("/nonexistent/font.ttf"))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
