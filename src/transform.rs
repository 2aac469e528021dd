//! Conversion between data space and screen points.
//!
//! Data points are `(row, col)`; the canvas and camera are combined in that
//! order and the result is flipped to egui's `(x, y)` at the very end.

use crate::model::Point;

pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 50.0;

/// Pan/zoom state of the viewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Data point shown at the middle of the canvas.
    pub center: Point,
    /// Screen points per data unit.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: Point::default(),
            zoom: 1.0,
        }
    }
}

/// On-screen geometry of the drawing area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub origin: egui::Pos2,
    pub size: egui::Vec2,
}

impl Canvas {
    pub fn from_rect(rect: egui::Rect) -> Self {
        Self {
            origin: rect.min,
            size: rect.size(),
        }
    }

    /// Canvas middle in `(row, col)` order.
    fn center(&self) -> Point {
        Point::new(
            self.origin.y + self.size.y * 0.5,
            self.origin.x + self.size.x * 0.5,
        )
    }
}

/// Camera plus canvas: everything needed to place data on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub camera: Camera,
    pub canvas: Canvas,
}

impl Viewport {
    pub fn new(camera: Camera, canvas: Canvas) -> Self {
        Self { camera, canvas }
    }

    /// Exact screen position of a data point, for drawing.
    pub fn project(&self, point: Point) -> egui::Pos2 {
        let crds = self.canvas.center() + (point - self.camera.center) * self.camera.zoom;
        egui::pos2(crds.col, crds.row)
    }

    /// Screen position of a data point truncated to whole points, used to
    /// place widgets.
    pub fn data_to_screen(&self, point: Point) -> egui::Pos2 {
        let p = self.project(point);
        egui::pos2(p.x.trunc(), p.y.trunc())
    }

    pub fn screen_to_data(&self, screen: egui::Pos2) -> Point {
        let rel = Point::new(screen.y, screen.x) - self.canvas.center();
        self.camera.center + rel * (1.0 / self.camera.zoom)
    }

    /// Converts a screen distance to data units.
    pub fn screen_len_to_data(&self, len: f32) -> f32 {
        len / self.camera.zoom
    }

    /// Shifts the camera so the scene follows a screen-space drag.
    pub fn pan_by(&mut self, delta: egui::Vec2) {
        let zoom = self.camera.zoom;
        self.camera.center = self.camera.center - Point::new(delta.y / zoom, delta.x / zoom);
    }

    /// Zooms by `factor` keeping the data point under `screen` in place.
    pub fn zoom_about(&mut self, screen: egui::Pos2, factor: f32) {
        let anchor = self.screen_to_data(screen);
        self.camera.zoom = (self.camera.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let rel = Point::new(screen.y, screen.x) - self.canvas.center();
        self.camera.center = anchor - rel * (1.0 / self.camera.zoom);
    }

    /// Centers an image of `rows × cols` and zooms it to fit the canvas.
    pub fn fit(&mut self, rows: f32, cols: f32) {
        self.camera.center = Point::new(rows * 0.5, cols * 0.5);
        if rows > 0.0 && cols > 0.0 && self.canvas.size.x > 0.0 && self.canvas.size.y > 0.0 {
            let zoom = (self.canvas.size.x / cols).min(self.canvas.size.y / rows) * 0.95;
            self.camera.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(center: Point, zoom: f32) -> Viewport {
        Viewport::new(
            Camera { center, zoom },
            Canvas {
                origin: egui::pos2(100.0, 50.0),
                size: egui::vec2(800.0, 600.0),
            },
        )
    }

    #[test]
    fn camera_center_maps_to_canvas_center() {
        let vp = viewport(Point::new(30.0, 40.0), 3.0);
        assert_eq!(vp.data_to_screen(Point::new(30.0, 40.0)), egui::pos2(500.0, 350.0));
    }

    #[test]
    fn axes_come_out_reversed() {
        let vp = viewport(Point::new(0.0, 0.0), 2.0);
        // one row down moves the screen y, one column right moves x
        assert_eq!(vp.data_to_screen(Point::new(10.0, 0.0)), egui::pos2(500.0, 370.0));
        assert_eq!(vp.data_to_screen(Point::new(0.0, 10.0)), egui::pos2(520.0, 350.0));
    }

    #[test]
    fn widget_positions_are_truncated() {
        let vp = viewport(Point::new(0.0, 0.0), 1.0);
        assert_eq!(vp.data_to_screen(Point::new(0.75, 0.25)), egui::pos2(500.0, 350.0));
        assert_eq!(vp.project(Point::new(0.75, 0.25)), egui::pos2(500.25, 350.75));
    }

    #[test]
    fn screen_to_data_inverts_projection() {
        let vp = viewport(Point::new(12.0, -7.0), 1.5);
        let p = Point::new(3.0, 9.0);
        let back = vp.screen_to_data(vp.project(p));
        assert!((back.row - p.row).abs() < 1e-4);
        assert!((back.col - p.col).abs() < 1e-4);
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let mut vp = viewport(Point::new(0.0, 0.0), 1.0);
        let cursor = egui::pos2(640.0, 200.0);
        let before = vp.screen_to_data(cursor);
        vp.zoom_about(cursor, 2.0);
        let after = vp.screen_to_data(cursor);
        assert!((before.row - after.row).abs() < 1e-3);
        assert!((before.col - after.col).abs() < 1e-3);
        assert_eq!(vp.camera.zoom, 2.0);
    }

    #[test]
    fn pan_follows_drag() {
        let mut vp = viewport(Point::new(0.0, 0.0), 2.0);
        let p = Point::new(5.0, 5.0);
        let before = vp.project(p);
        vp.pan_by(egui::vec2(10.0, -4.0));
        assert_eq!(vp.project(p), before + egui::vec2(10.0, -4.0));
    }
}
