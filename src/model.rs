use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

// ── Geometry ────────────────────────────────────────────────────────────────

/// A position in data space, stored in array order (row first).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub row: f32,
    pub col: f32,
}

impl Point {
    pub const fn new(row: f32, col: f32) -> Self {
        Self { row, col }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.row + other.row) * 0.5, (self.col + other.col) * 0.5)
    }

    pub fn get(self, axis: Axis) -> f32 {
        match axis {
            Axis::Row => self.row,
            Axis::Col => self.col,
        }
    }

    fn get_mut(&mut self, axis: Axis) -> &mut f32 {
        match axis {
            Axis::Row => &mut self.row,
            Axis::Col => &mut self.col,
        }
    }

    fn length(self) -> f32 {
        (self.row * self.row + self.col * self.col).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.row + rhs.row, self.col + rhs.col)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.row - rhs.row, self.col - rhs.col)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.row * rhs, self.col * rhs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Row,
    Col,
}

// ── Style ───────────────────────────────────────────────────────────────────

pub const MIN_ROTATION: i32 = -180;
pub const MAX_ROTATION: i32 = 180;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4 {
    pub const WHITE: Color4 = Color4 {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn to_egui(&self) -> egui::Color32 {
        let [r, g, b, a] = self.to_rgba8();
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0) as u8,
            (self.g.clamp(0.0, 1.0) * 255.0) as u8,
            (self.b.clamp(0.0, 1.0) * 255.0) as u8,
            (self.a.clamp(0.0, 1.0) * 255.0) as u8,
        ]
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color4 {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Where a label sits relative to its shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
    #[default]
    Center,
}

impl Anchor {
    pub const ALL: [Anchor; 5] = [
        Anchor::UpperLeft,
        Anchor::UpperRight,
        Anchor::LowerLeft,
        Anchor::LowerRight,
        Anchor::Center,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Anchor::UpperLeft => "◤",
            Anchor::UpperRight => "◥",
            Anchor::LowerLeft => "◣",
            Anchor::LowerRight => "◢",
            Anchor::Center => "●",
        }
    }

    /// Picks the anchor position out of a `(min, max)` bounding box.
    pub fn resolve(self, min: Point, max: Point) -> Point {
        match self {
            Anchor::UpperLeft => Point::new(min.row, min.col),
            Anchor::UpperRight => Point::new(min.row, max.col),
            Anchor::LowerLeft => Point::new(max.row, min.col),
            Anchor::LowerRight => Point::new(max.row, max.col),
            Anchor::Center => min.midpoint(max),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: Color4,
    pub size: u32,
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub anchor: Anchor,
}

impl TextStyle {
    pub fn set_size(&mut self, size: u32, min: u32, max: u32) {
        self.size = size.clamp(min, max);
    }

    pub fn set_rotation(&mut self, degrees: i32) {
        self.rotation = degrees.clamp(MIN_ROTATION, MAX_ROTATION);
    }
}

// ── Shapes ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Line,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub kind: ShapeKind,
    pub points: Vec<Point>,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
}

impl Shape {
    /// Builds a shape spanning two opposite points. Rectangles and ellipses
    /// store their four bounding-box corners, lines their two endpoints.
    pub fn from_corners(kind: ShapeKind, a: Point, b: Point) -> Self {
        Self {
            kind,
            points: corner_points(kind, a, b),
            label: String::new(),
            style: None,
        }
    }

    pub fn rectangle(origin: Point, height: f32, width: f32) -> Self {
        Self::from_corners(
            ShapeKind::Rectangle,
            origin,
            origin + Point::new(height, width),
        )
    }

    /// Re-spans the shape between two points, keeping label and style.
    pub fn reshape(&mut self, a: Point, b: Point) {
        self.points = corner_points(self.kind, a, b);
    }

    pub fn centroid(&self) -> Point {
        if self.points.is_empty() {
            return Point::default();
        }
        let sum = self
            .points
            .iter()
            .fold(Point::default(), |acc, p| acc + *p);
        sum * (1.0 / self.points.len() as f32)
    }

    pub fn bounds(&self) -> (Point, Point) {
        let mut it = self.points.iter();
        let Some(first) = it.next() else {
            return (Point::default(), Point::default());
        };
        let mut min = *first;
        let mut max = *first;
        for p in it {
            min.row = min.row.min(p.row);
            min.col = min.col.min(p.col);
            max.row = max.row.max(p.row);
            max.col = max.col.max(p.col);
        }
        (min, max)
    }

    pub fn extent(&self, axis: Axis) -> f32 {
        let (min, max) = self.bounds();
        max.get(axis) - min.get(axis)
    }

    pub fn translate(&mut self, delta: Point) {
        for p in &mut self.points {
            *p = *p + delta;
        }
    }

    pub fn translate_axis(&mut self, axis: Axis, delta: f32) {
        for p in &mut self.points {
            *p.get_mut(axis) += delta;
        }
    }

    /// Grows any extent at or below the given minimum to exactly the minimum,
    /// keeping the shape's own center. A zero-length line grows along the
    /// column axis.
    pub fn enforce_min_extent(&mut self, min_height: f32, min_width: f32) {
        match self.kind {
            ShapeKind::Rectangle | ShapeKind::Ellipse => {
                let (mut min, mut max) = self.bounds();
                if max.col - min.col <= min_width {
                    let center = (min.col + max.col) * 0.5;
                    min.col = center - min_width * 0.5;
                    max.col = center + min_width * 0.5;
                }
                if max.row - min.row <= min_height {
                    let center = (min.row + max.row) * 0.5;
                    min.row = center - min_height * 0.5;
                    max.row = center + min_height * 0.5;
                }
                self.reshape(min, max);
            }
            ShapeKind::Line => {
                if let [a, b] = self.points[..] {
                    if (b - a).length() <= f32::EPSILON {
                        let half = Point::new(0.0, min_width * 0.5);
                        self.points = vec![a - half, a + half];
                    }
                }
            }
        }
    }

    /// Point containment in data space. `line_tolerance` is the hit distance
    /// for lines, in data units.
    pub fn contains(&self, p: Point, line_tolerance: f32) -> bool {
        match self.kind {
            ShapeKind::Rectangle => {
                let (min, max) = self.bounds();
                p.row >= min.row && p.row <= max.row && p.col >= min.col && p.col <= max.col
            }
            ShapeKind::Ellipse => {
                let (min, max) = self.bounds();
                let center = min.midpoint(max);
                let semi_row = (max.row - min.row) * 0.5;
                let semi_col = (max.col - min.col) * 0.5;
                if semi_row <= f32::EPSILON || semi_col <= f32::EPSILON {
                    return false;
                }
                let dr = (p.row - center.row) / semi_row;
                let dc = (p.col - center.col) / semi_col;
                dr * dr + dc * dc <= 1.0
            }
            ShapeKind::Line => match self.points[..] {
                [a, b] => point_to_segment_dist(p, a, b) <= line_tolerance,
                _ => false,
            },
        }
    }
}

fn corner_points(kind: ShapeKind, a: Point, b: Point) -> Vec<Point> {
    match kind {
        ShapeKind::Line => vec![a, b],
        ShapeKind::Rectangle | ShapeKind::Ellipse => {
            let (r0, r1) = (a.row.min(b.row), a.row.max(b.row));
            let (c0, c1) = (a.col.min(b.col), a.col.max(b.col));
            vec![
                Point::new(r0, c0),
                Point::new(r0, c1),
                Point::new(r1, c1),
                Point::new(r1, c0),
            ]
        }
    }
}

fn point_to_segment_dist(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let len2 = ab.row * ab.row + ab.col * ab.col;
    if len2 <= f32::EPSILON {
        return ap.length();
    }
    let t = ((ap.row * ab.row + ap.col * ab.col) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}
