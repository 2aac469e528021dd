use std::collections::BTreeSet;

use crate::model::{Axis, Point, Shape, ShapeKind, TextStyle};

/// Drawing mode of the layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tool {
    Select,
    #[default]
    AddRectangle,
    AddEllipse,
    AddLine,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Select, Tool::AddRectangle, Tool::AddEllipse, Tool::AddLine];

    /// The shape kind an add tool draws; `None` for selection.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Tool::Select => None,
            Tool::AddRectangle => Some(ShapeKind::Rectangle),
            Tool::AddEllipse => Some(ShapeKind::Ellipse),
            Tool::AddLine => Some(ShapeKind::Line),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::AddRectangle => "Rectangle",
            Tool::AddEllipse => "Ellipse",
            Tool::AddLine => "Line",
        }
    }
}

/// The shape collection with its selection and shared text style.
#[derive(Clone, Debug)]
pub struct TextLayer {
    shapes: Vec<Shape>,
    selected: BTreeSet<usize>,
    style: TextStyle,
    tool: Tool,
}

impl TextLayer {
    pub fn new(style: TextStyle) -> Self {
        Self {
            shapes: Vec::new(),
            selected: BTreeSet::new(),
            style,
            tool: Tool::default(),
        }
    }

    pub fn with_shapes(style: TextStyle, shapes: Vec<Shape>) -> Self {
        Self {
            shapes,
            ..Self::new(style)
        }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub(crate) fn shape_mut(&mut self, index: usize) -> Option<&mut Shape> {
        self.shapes.get_mut(index)
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub(crate) fn style_mut(&mut self) -> &mut TextStyle {
        &mut self.style
    }

    /// The style a shape's label is drawn with.
    pub fn effective_style(&self, index: usize) -> &TextStyle {
        self.shapes
            .get(index)
            .and_then(|s| s.style.as_ref())
            .unwrap_or(&self.style)
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.shapes.get(index).map(|s| s.label.as_str())
    }

    /// Stores `text` as the label of `index`, trimmed. Returns false for an
    /// index out of range.
    pub fn set_label(&mut self, index: usize, text: &str) -> bool {
        match self.shapes.get_mut(index) {
            Some(shape) => {
                shape.label = text.trim().to_string();
                true
            }
            None => false,
        }
    }

    pub fn push(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    /// Removes one shape, shifting the selection indices above it down.
    pub fn remove(&mut self, index: usize) -> Option<Shape> {
        if index >= self.shapes.len() {
            return None;
        }
        let shape = self.shapes.remove(index);
        self.selected = self
            .selected
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        Some(shape)
    }

    pub fn remove_selected(&mut self) -> usize {
        let selected = std::mem::take(&mut self.selected);
        for &i in selected.iter().rev() {
            if i < self.shapes.len() {
                self.shapes.remove(i);
            }
        }
        selected.len()
    }

    /// Swaps in a whole collection (undo/redo). The selection is cleared.
    pub fn replace_shapes(&mut self, shapes: Vec<Shape>) -> Vec<Shape> {
        self.selected.clear();
        std::mem::replace(&mut self.shapes, shapes)
    }

    // ── Selection ───────────────────────────────────────────────────────────

    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// The greatest selected index.
    pub fn last_selected(&self) -> Option<usize> {
        self.selected.last().copied()
    }

    pub fn select_only(&mut self, index: usize) {
        self.selected.clear();
        if index < self.shapes.len() {
            self.selected.insert(index);
        }
    }

    pub fn toggle_selected(&mut self, index: usize) {
        if index >= self.shapes.len() {
            return;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
    }

    pub fn select_all(&mut self) {
        self.selected = (0..self.shapes.len()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Moves every selected shape by `delta` along one axis.
    pub fn translate_selected(&mut self, axis: Axis, delta: f32) -> bool {
        let mut moved = false;
        for &i in &self.selected {
            if let Some(shape) = self.shapes.get_mut(i) {
                shape.translate_axis(axis, delta);
                moved = true;
            }
        }
        moved
    }

    /// Topmost shape containing `point`.
    pub fn shape_at(&self, point: Point, line_tolerance: f32) -> Option<usize> {
        self.shapes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, shape)| shape.contains(point, line_tolerance))
            .map(|(i, _)| i)
    }

    /// Where an "add next" shape goes: a minimum-size rectangle at `origin`
    /// for an empty layer, a diagonal copy of a single shape, or a
    /// continuation of the step between the last two shapes.
    pub fn next_placement(&self, origin: Point, min_height: f32, min_width: f32) -> Shape {
        let mut next = match self.shapes.as_slice() {
            [] => return Shape::rectangle(origin, min_height, min_width),
            [only] => {
                let mut next = only.clone();
                next.translate(Point::new(min_height, min_width));
                next
            }
            [.., before, last] => {
                let step = last.centroid() - before.centroid();
                let mut next = last.clone();
                next.translate(step);
                next
            }
        };
        next.label.clear();
        next.style = None;
        next
    }
}
