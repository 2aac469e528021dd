//! Burns shape outlines into a copy of the image.
//!
//! Labels are not rasterized: that needs a font rasterizer, so text only
//! appears in the viewer and the sidecar.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};

use crate::error::ExportError;
use crate::layer::TextLayer;
use crate::model::{Point, ShapeKind};

const ELLIPSE_SEGMENTS: usize = 64;

/// `cells.png` → `cells_labeled.png`
pub fn export_path(image_path: &Path) -> PathBuf {
    image_path.with_file_name(format!(
        "{}_labeled.png",
        image_path
            .file_stem()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("out")
    ))
}

pub fn export_labeled(
    image_path: &Path,
    image: &DynamicImage,
    layer: &TextLayer,
) -> Result<PathBuf, ExportError> {
    let mut img = image.to_rgba8();
    draw_outlines(&mut img, layer);
    let out_path = export_path(image_path);
    img.save(&out_path)?;
    tracing::info!(path = %out_path.display(), "exported labeled image");
    Ok(out_path)
}

/// Draws every shape of `layer` in its label color.
pub fn draw_outlines(img: &mut RgbaImage, layer: &TextLayer) {
    for (i, shape) in layer.shapes().iter().enumerate() {
        let color = layer.effective_style(i).color.to_rgba8();
        let segments: Vec<(Point, Point)> = match shape.kind {
            ShapeKind::Rectangle => closed_segments(&shape.points),
            ShapeKind::Line => shape.points.windows(2).map(|w| (w[0], w[1])).collect(),
            ShapeKind::Ellipse => {
                let (min, max) = shape.bounds();
                let center = min.midpoint(max);
                let semi_row = (max.row - min.row) * 0.5;
                let semi_col = (max.col - min.col) * 0.5;
                let outline: Vec<Point> = (0..ELLIPSE_SEGMENTS)
                    .map(|k| {
                        let t = k as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
                        Point::new(center.row + semi_row * t.sin(), center.col + semi_col * t.cos())
                    })
                    .collect();
                closed_segments(&outline)
            }
        };
        for (a, b) in segments {
            draw_segment(img, a, b, color);
        }
    }
}

fn closed_segments(points: &[Point]) -> Vec<(Point, Point)> {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
        .collect()
}

/// Plots a one-pixel segment by sampling it every half pixel. Points are
/// `(row, col)`, so `col` is x and `row` is y.
fn draw_segment(img: &mut RgbaImage, a: Point, b: Point, color: [u8; 4]) {
    let delta = b - a;
    let len = delta.row.hypot(delta.col);
    let steps = ((len * 2.0) as u32).max(1);
    for i in 0..=steps {
        let p = a + delta * (i as f32 / steps as f32);
        let (x, y) = (p.col.floor(), p.row.floor());
        if x >= 0.0 && y >= 0.0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, image::Rgba(color));
        }
    }
}
