//! The interactive state machine behind the text layer.
//!
//! The host feeds pointer and command events in; the controller mutates the
//! [`TextLayer`] and reports whether a text box should be shown, where, and
//! with what content. Nothing here can fail: bad preconditions are ignored
//! and numeric inputs are clamped.

use tracing::debug;

use crate::config::LayerConfig;
use crate::keymap::Command;
use crate::layer::{TextLayer, Tool};
use crate::model::{Anchor, Axis, Color4, Point, Shape, TextStyle};
use crate::transform::Viewport;

/// Screen distance under which a press/release pair counts as a click.
const CLICK_SLOP: f32 = 2.0;

/// An open text box bound to one shape.
#[derive(Clone, Debug, PartialEq)]
pub struct EditSession {
    index: usize,
    screen_pos: egui::Pos2,
    buffer: String,
}

impl EditSession {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Top-left corner of the text box.
    pub fn screen_pos(&self) -> egui::Pos2 {
        self.screen_pos
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }
}

/// A shape being drawn by dragging.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    index: usize,
    start: Point,
    start_screen: egui::Pos2,
    current: Point,
    undo_depth: usize,
}

impl Placement {
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Placing(Placement),
    Editing(EditSession),
}

/// What the host should do after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Unchanged,
    Changed,
    /// The layer should be written out; the controller has no I/O.
    SaveRequested,
}

/// A shape created by a plain click, with the undo depth from before it.
#[derive(Clone, Copy, Debug)]
struct Placeholder {
    index: usize,
    undo_depth: usize,
}

pub struct AnnotationController {
    layer: TextLayer,
    config: LayerConfig,
    interaction: Interaction,
    placeholders: Vec<Placeholder>,
    undo_stack: Vec<Vec<Shape>>,
    redo_stack: Vec<Vec<Shape>>,
    dirty: bool,
}

impl AnnotationController {
    pub fn new(config: LayerConfig) -> Self {
        let layer = TextLayer::new(config.initial_style());
        Self::with_layer(config, layer)
    }

    /// Wraps a loaded layer. Styles read from disk are clamped to the
    /// configured bounds.
    pub fn with_layer(config: LayerConfig, mut layer: TextLayer) -> Self {
        let (min, max) = (config.min_font_size, config.max_font_size);
        let clamp = |style: &mut TextStyle| {
            style.set_size(style.size, min, max);
            style.set_rotation(style.rotation);
        };
        clamp(layer.style_mut());
        for index in 0..layer.len() {
            if let Some(style) = layer.shape_mut(index).and_then(|s| s.style.as_mut()) {
                clamp(style);
            }
        }
        Self {
            layer,
            config,
            interaction: Interaction::Idle,
            placeholders: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            dirty: false,
        }
    }

    pub fn layer(&self) -> &TextLayer {
        &self.layer
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        match &self.interaction {
            Interaction::Editing(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.interaction, Interaction::Editing(_))
    }

    pub fn is_placing(&self) -> bool {
        matches!(self.interaction, Interaction::Placing(_))
    }

    /// Returns whether the layer changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn push_undo(&mut self) {
        self.undo_stack.push(self.layer.shapes().to_vec());
        self.redo_stack.clear();
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
        self.placeholders.clear();
    }

    // ── Pointer ─────────────────────────────────────────────────────────────

    /// Primary button down on the canvas. Starts drawing when an add tool is
    /// active; any open text box loses focus first.
    pub fn pointer_pressed(&mut self, data: Point, screen: egui::Pos2) {
        self.finish_editing();
        let Some(kind) = self.layer.tool().shape_kind() else {
            return;
        };
        if self.is_placing() {
            return;
        }
        let undo_depth = self.undo_stack.len();
        self.push_undo();
        let index = self.layer.push(Shape::from_corners(kind, data, data));
        self.layer.select_only(index);
        self.dirty = true;
        debug!(index, ?kind, "placing shape");
        self.interaction = Interaction::Placing(Placement {
            index,
            start: data,
            start_screen: screen,
            current: data,
            undo_depth,
        });
    }

    /// Cursor motion while the button is held: the new shape follows it.
    pub fn pointer_moved(&mut self, data: Point) {
        let Interaction::Placing(placement) = &mut self.interaction else {
            return;
        };
        placement.current = data;
        let (index, start) = (placement.index, placement.start);
        if let Some(shape) = self.layer.shape_mut(index) {
            shape.reshape(start, data);
        }
    }

    /// Button release: finalize the drawn shape and open its text box at the
    /// middle of the drag.
    pub fn pointer_released(&mut self, data: Point, screen: egui::Pos2) {
        if !self.is_placing() {
            return;
        }
        let Interaction::Placing(placement) = std::mem::take(&mut self.interaction) else {
            return;
        };
        let (min_h, min_w) = (self.config.min_shape_height, self.config.min_shape_width);
        let Some(shape) = self.layer.shape_mut(placement.index) else {
            return;
        };
        shape.reshape(placement.start, data);
        shape.enforce_min_extent(min_h, min_w);

        let is_click = placement.start_screen.distance(screen) <= CLICK_SLOP;
        if is_click {
            if self.placeholders.len() == 2 {
                self.placeholders.remove(0);
            }
            self.placeholders.push(Placeholder {
                index: placement.index,
                undo_depth: placement.undo_depth,
            });
        } else {
            self.placeholders.clear();
        }

        let mid = egui::pos2(
            ((placement.start_screen.x + screen.x) * 0.5).trunc(),
            ((placement.start_screen.y + screen.y) * 0.5).trunc(),
        );
        debug!(index = placement.index, is_click, "shape placed");
        self.open_session(placement.index, mid, false);
    }

    /// The button came up where the host could not see it: finish the drag
    /// at the last position the cursor was tracked at.
    pub fn pointer_lost(&mut self, viewport: &Viewport) {
        let Interaction::Placing(placement) = &self.interaction else {
            return;
        };
        let last = placement.current;
        self.pointer_released(last, viewport.project(last));
    }

    /// Double-click: edit the topmost shape under the cursor. Shapes the
    /// clicks of this double-click created are dropped first.
    pub fn double_click(&mut self, data: Point, screen: egui::Pos2, viewport: &Viewport) -> bool {
        if self.is_placing() {
            self.interaction = Interaction::Idle;
        }
        self.discard_placeholders();

        let tolerance = viewport.screen_len_to_data(self.config.line_hit_tolerance);
        let Some(index) = self.layer.shape_at(data, tolerance) else {
            return false;
        };
        self.layer.select_only(index);
        self.open_session(index, screen, true);
        true
    }

    fn discard_placeholders(&mut self) {
        let mut placeholders = std::mem::take(&mut self.placeholders);
        if placeholders.is_empty() {
            return;
        }
        self.finish_editing();
        placeholders.sort_unstable_by_key(|p| p.index);
        for Placeholder { index, undo_depth } in placeholders.into_iter().rev() {
            let is_tail = index + 1 == self.layer.len();
            let unlabeled = self.layer.label(index).is_some_and(str::is_empty);
            if !(is_tail && unlabeled) {
                break;
            }
            self.layer.remove(index);
            // the click's own snapshot goes with it
            self.undo_stack.truncate(undo_depth);
            self.dirty = true;
            debug!(index, "discarded click placeholder");
        }
    }

    // ── Text editing ────────────────────────────────────────────────────────

    fn open_session(&mut self, index: usize, screen_pos: egui::Pos2, record: bool) {
        self.finish_editing();
        let Some(label) = self.layer.label(index) else {
            return;
        };
        let buffer = label.to_string();
        if record {
            self.push_undo();
            self.placeholders.clear();
        }
        debug!(index, x = screen_pos.x, y = screen_pos.y, "editing label");
        self.interaction = Interaction::Editing(EditSession {
            index,
            screen_pos,
            buffer,
        });
    }

    /// New contents of the text box. The label follows immediately, trimmed.
    pub fn set_edit_text(&mut self, text: &str) {
        let Interaction::Editing(session) = &mut self.interaction else {
            return;
        };
        session.buffer = text.to_string();
        let index = session.index;
        if self.layer.set_label(index, text) {
            self.dirty = true;
            if !text.trim().is_empty() {
                self.placeholders.retain(|p| p.index != index);
            }
        }
    }

    /// Focus loss or commit key: close the text box.
    pub fn finish_editing(&mut self) {
        if let Interaction::Editing(session) = &self.interaction {
            debug!(index = session.index, "finished editing");
            self.interaction = Interaction::Idle;
        }
    }

    // ── Commands ────────────────────────────────────────────────────────────

    pub fn execute(&mut self, command: Command, viewport: &Viewport) -> Effect {
        if self.is_placing() {
            return Effect::Unchanged;
        }
        let changed = match command {
            Command::EditSelected => return self.edit_selected(viewport),
            Command::AddNext => self.add_next(viewport),
            Command::MoveLeft => self.move_selected(Axis::Col, -1.0),
            Command::MoveRight => self.move_selected(Axis::Col, 1.0),
            Command::MoveUp => self.move_selected(Axis::Row, -1.0),
            Command::MoveDown => self.move_selected(Axis::Row, 1.0),
            Command::FontSizeDown => {
                let size = self.layer.style().size.saturating_sub(1);
                self.set_font_size(size)
            }
            Command::FontSizeUp => {
                let size = self.layer.style().size.saturating_add(1);
                self.set_font_size(size)
            }
            Command::RotateCcw => {
                let step = self.config.rotation_step;
                let rotation = self.layer.style().rotation.saturating_sub(step);
                self.set_rotation(rotation)
            }
            Command::RotateCw => {
                let step = self.config.rotation_step;
                let rotation = self.layer.style().rotation.saturating_add(step);
                self.set_rotation(rotation)
            }
            Command::DeleteSelected => self.delete_selected(),
            Command::SelectAll => {
                self.layer.select_all();
                return Effect::Unchanged;
            }
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::Save => {
                self.finish_editing();
                return Effect::SaveRequested;
            }
        };
        if changed {
            Effect::Changed
        } else {
            Effect::Unchanged
        }
    }

    /// Opens a text box on the last selected shape, or the newest shape when
    /// nothing is selected.
    fn edit_selected(&mut self, viewport: &Viewport) -> Effect {
        let Some(index) = self
            .layer
            .last_selected()
            .or_else(|| self.layer.len().checked_sub(1))
        else {
            return Effect::Unchanged;
        };
        let Some(shape) = self.layer.shape(index) else {
            return Effect::Unchanged;
        };
        let screen = viewport.data_to_screen(shape.centroid());
        self.open_session(index, screen, true);
        Effect::Unchanged
    }

    fn add_next(&mut self, viewport: &Viewport) -> bool {
        self.finish_editing();
        self.push_undo();
        let shape = self.layer.next_placement(
            self.config.default_origin,
            self.config.min_shape_height,
            self.config.min_shape_width,
        );
        let screen = viewport.data_to_screen(shape.centroid());
        let index = self.layer.push(shape);
        self.layer.select_only(index);
        self.mark_changed();
        debug!(index, "added next shape");
        self.open_session(index, screen, false);
        true
    }

    fn move_selected(&mut self, axis: Axis, delta: f32) -> bool {
        if self.layer.selected().is_empty() {
            return false;
        }
        self.push_undo();
        let moved = self.layer.translate_selected(axis, delta);
        if moved {
            self.mark_changed();
        }
        moved
    }

    fn delete_selected(&mut self) -> bool {
        if self.layer.selected().is_empty() {
            return false;
        }
        self.finish_editing();
        self.push_undo();
        let removed = self.layer.remove_selected();
        debug!(removed, "deleted shapes");
        self.mark_changed();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.finish_editing();
        self.interaction = Interaction::Idle;
        let current = self.layer.replace_shapes(previous);
        self.redo_stack.push(current);
        self.mark_changed();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.finish_editing();
        self.interaction = Interaction::Idle;
        let current = self.layer.replace_shapes(next);
        self.undo_stack.push(current);
        self.mark_changed();
        true
    }

    // ── Style and selection (dock panel) ────────────────────────────────────

    pub fn set_font_size(&mut self, size: u32) -> bool {
        let (min, max) = (self.config.min_font_size, self.config.max_font_size);
        let before = self.layer.style().size;
        self.layer.style_mut().set_size(size, min, max);
        self.style_changed(before != self.layer.style().size)
    }

    pub fn set_rotation(&mut self, degrees: i32) -> bool {
        let before = self.layer.style().rotation;
        self.layer.style_mut().set_rotation(degrees);
        self.style_changed(before != self.layer.style().rotation)
    }

    pub fn set_color(&mut self, color: Color4) -> bool {
        let changed = self.layer.style().color != color;
        self.layer.style_mut().color = color;
        self.style_changed(changed)
    }

    pub fn set_anchor(&mut self, anchor: Anchor) -> bool {
        let changed = self.layer.style().anchor != anchor;
        self.layer.style_mut().anchor = anchor;
        self.style_changed(changed)
    }

    fn style_changed(&mut self, changed: bool) -> bool {
        if changed {
            self.dirty = true;
        }
        changed
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.is_placing() {
            return;
        }
        self.layer.set_tool(tool);
    }

    /// Selects the topmost shape under `data`; `extend` toggles instead of
    /// replacing. Empty space clears the selection unless extending.
    pub fn select_at(&mut self, data: Point, viewport: &Viewport, extend: bool) -> Option<usize> {
        let tolerance = viewport.screen_len_to_data(self.config.line_hit_tolerance);
        let hit = self.layer.shape_at(data, tolerance);
        match (hit, extend) {
            (Some(index), true) => self.layer.toggle_selected(index),
            (Some(index), false) => self.layer.select_only(index),
            (None, false) => self.layer.clear_selection(),
            (None, true) => {}
        }
        hit
    }

    pub fn select(&mut self, index: usize, extend: bool) {
        if extend {
            self.layer.toggle_selected(index);
        } else {
            self.layer.select_only(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeKind;
    use crate::transform::{Camera, Canvas};

    fn viewport() -> Viewport {
        // identity-ish: data (r, c) lands on screen (c, r)
        Viewport::new(
            Camera {
                center: Point::new(300.0, 400.0),
                zoom: 1.0,
            },
            Canvas {
                origin: egui::pos2(0.0, 0.0),
                size: egui::vec2(800.0, 600.0),
            },
        )
    }

    fn drag(ctrl: &mut AnnotationController, from: Point, to: Point) {
        let vp = viewport();
        ctrl.pointer_pressed(from, vp.data_to_screen(from));
        ctrl.pointer_moved(from.midpoint(to));
        ctrl.pointer_moved(to);
        ctrl.pointer_released(to, vp.data_to_screen(to));
    }

    #[test]
    fn drag_draws_shape_and_opens_box_at_midpoint() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        drag(&mut ctrl, Point::new(10.0, 20.0), Point::new(50.0, 100.0));

        assert_eq!(ctrl.layer().len(), 1);
        let shape = &ctrl.layer().shapes()[0];
        assert_eq!(shape.kind, ShapeKind::Rectangle);
        assert_eq!(shape.bounds(), (Point::new(10.0, 20.0), Point::new(50.0, 100.0)));

        let session = ctrl.edit_session().expect("box open after drag");
        assert_eq!(session.index(), 0);
        assert_eq!(session.screen_pos(), egui::pos2(60.0, 30.0));
    }

    #[test]
    fn move_updates_extent_while_placing() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        ctrl.pointer_pressed(Point::new(0.0, 0.0), egui::pos2(400.0, 300.0));
        ctrl.pointer_moved(Point::new(40.0, 30.0));
        assert!(ctrl.is_placing());
        assert_eq!(ctrl.layer().shapes()[0].extent(Axis::Row), 40.0);
        assert_eq!(ctrl.layer().shapes()[0].extent(Axis::Col), 30.0);
    }

    #[test]
    fn small_drag_is_clamped_around_midpoint() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        drag(&mut ctrl, Point::new(100.0, 100.0), Point::new(104.0, 160.0));
        let shape = &ctrl.layer().shapes()[0];
        assert_eq!(shape.extent(Axis::Row), 16.0);
        assert_eq!(shape.extent(Axis::Col), 60.0);
        assert_eq!(shape.centroid(), Point::new(102.0, 130.0));
    }

    #[test]
    fn select_tool_does_not_draw() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        ctrl.set_tool(Tool::Select);
        drag(&mut ctrl, Point::new(0.0, 0.0), Point::new(40.0, 40.0));
        assert!(ctrl.layer().is_empty());
        assert_eq!(ctrl.interaction(), &Interaction::Idle);
    }

    #[test]
    fn typing_writes_trimmed_label_per_keystroke() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        ctrl.execute(Command::AddNext, &viewport());
        ctrl.set_edit_text(" a");
        assert_eq!(ctrl.layer().label(0), Some("a"));
        ctrl.set_edit_text(" ab");
        ctrl.set_edit_text(" abc  ");
        assert_eq!(ctrl.edit_session().map(EditSession::text), Some(" abc  "));
        ctrl.finish_editing();
        assert!(!ctrl.is_editing());
        assert_eq!(ctrl.layer().label(0), Some("abc"));
    }

    #[test]
    fn edit_selected_targets_last_selection_then_newest() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        assert_eq!(ctrl.execute(Command::EditSelected, &vp), Effect::Unchanged);
        assert!(!ctrl.is_editing());

        for _ in 0..3 {
            ctrl.execute(Command::AddNext, &vp);
        }
        ctrl.finish_editing();
        ctrl.select(0, false);
        ctrl.select(1, true);
        ctrl.execute(Command::EditSelected, &vp);
        assert_eq!(ctrl.edit_session().map(EditSession::index), Some(1));

        ctrl.finish_editing();
        ctrl.layer.clear_selection();
        ctrl.execute(Command::EditSelected, &vp);
        let session = ctrl.edit_session().unwrap();
        assert_eq!(session.index(), 2);
        let centroid = ctrl.layer().shapes()[2].centroid();
        assert_eq!(session.screen_pos(), vp.data_to_screen(centroid));
    }

    #[test]
    fn edit_box_starts_with_existing_label() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        ctrl.execute(Command::AddNext, &vp);
        ctrl.set_edit_text("mitochondria");
        ctrl.finish_editing();
        ctrl.execute(Command::EditSelected, &vp);
        assert_eq!(ctrl.edit_session().map(EditSession::text), Some("mitochondria"));
    }

    #[test]
    fn double_click_on_empty_space_is_a_no_op() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        ctrl.execute(Command::AddNext, &vp);
        ctrl.finish_editing();
        ctrl.take_dirty();
        let before = ctrl.layer().shapes().to_vec();

        assert!(!ctrl.double_click(Point::new(500.0, 500.0), egui::pos2(500.0, 500.0), &vp));
        assert_eq!(ctrl.layer().shapes(), &before[..]);
        assert!(ctrl.edit_session().is_none());
        assert!(!ctrl.take_dirty());
    }

    #[test]
    fn double_click_edits_topmost_hit() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        ctrl.set_tool(Tool::Select);
        ctrl.layer.push(Shape::rectangle(Point::new(0.0, 0.0), 40.0, 40.0));
        ctrl.layer.push(Shape::rectangle(Point::new(20.0, 20.0), 40.0, 40.0));
        let click = egui::pos2(430.0, 330.0);
        assert!(ctrl.double_click(Point::new(30.0, 30.0), click, &vp));
        let session = ctrl.edit_session().unwrap();
        assert_eq!(session.index(), 1);
        assert_eq!(session.screen_pos(), click);
    }

    #[test]
    fn double_click_drops_click_placeholders() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        drag(&mut ctrl, Point::new(0.0, 0.0), Point::new(40.0, 40.0));
        ctrl.set_edit_text("cell");
        ctrl.finish_editing();

        // the two clicks of a double-click each place a shape first
        let p = Point::new(20.0, 20.0);
        let s = vp.data_to_screen(p);
        for _ in 0..2 {
            ctrl.pointer_pressed(p, s);
            ctrl.pointer_released(p, s);
        }
        assert_eq!(ctrl.layer().len(), 3);

        assert!(ctrl.double_click(p, s, &vp));
        assert_eq!(ctrl.layer().len(), 1);
        assert_eq!(ctrl.edit_session().map(EditSession::text), Some("cell"));
    }

    #[test]
    fn labeled_click_shapes_survive_double_click() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        let p = Point::new(200.0, 200.0);
        let s = vp.data_to_screen(p);
        ctrl.pointer_pressed(p, s);
        ctrl.pointer_released(p, s);
        ctrl.set_edit_text("keep me");
        ctrl.finish_editing();
        ctrl.double_click(Point::new(900.0, 900.0), egui::pos2(0.0, 0.0), &vp);
        assert_eq!(ctrl.layer().len(), 1);
    }

    #[test]
    fn add_next_follows_placement_heuristic() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        ctrl.execute(Command::AddNext, &vp);
        assert_eq!(
            ctrl.layer().shapes()[0],
            Shape::rectangle(Point::new(0.0, 0.0), 16.0, 16.0)
        );
        ctrl.execute(Command::AddNext, &vp);
        assert_eq!(ctrl.layer().shapes()[1].centroid(), Point::new(24.0, 24.0));
        ctrl.execute(Command::AddNext, &vp);
        assert_eq!(ctrl.layer().shapes()[2].centroid(), Point::new(40.0, 40.0));
        assert_eq!(ctrl.edit_session().map(EditSession::index), Some(2));
    }

    #[test]
    fn arrows_move_selection_by_one_unit() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        ctrl.execute(Command::AddNext, &vp);
        ctrl.execute(Command::AddNext, &vp);
        ctrl.finish_editing();
        ctrl.select(0, false);
        let untouched = ctrl.layer().shapes()[1].clone();

        ctrl.execute(Command::MoveRight, &vp);
        ctrl.execute(Command::MoveRight, &vp);
        ctrl.execute(Command::MoveUp, &vp);
        assert_eq!(ctrl.layer().shapes()[0].centroid(), Point::new(7.0, 10.0));
        ctrl.execute(Command::MoveLeft, &vp);
        ctrl.execute(Command::MoveDown, &vp);
        assert_eq!(ctrl.layer().shapes()[0].centroid(), Point::new(8.0, 9.0));
        assert_eq!(ctrl.layer().shapes()[1], untouched);
    }

    #[test]
    fn arrows_without_selection_do_nothing() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        ctrl.execute(Command::AddNext, &vp);
        ctrl.finish_editing();
        ctrl.layer.clear_selection();
        assert_eq!(ctrl.execute(Command::MoveLeft, &vp), Effect::Unchanged);
    }

    #[test]
    fn font_size_and_rotation_stay_in_bounds() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        for _ in 0..100 {
            ctrl.execute(Command::FontSizeUp, &vp);
            ctrl.execute(Command::RotateCw, &vp);
        }
        assert_eq!(ctrl.layer().style().size, 48);
        assert_eq!(ctrl.layer().style().rotation, 180);
        assert_eq!(ctrl.execute(Command::FontSizeUp, &vp), Effect::Unchanged);

        for _ in 0..200 {
            ctrl.execute(Command::FontSizeDown, &vp);
            ctrl.execute(Command::RotateCcw, &vp);
        }
        assert_eq!(ctrl.layer().style().size, 2);
        assert_eq!(ctrl.layer().style().rotation, -180);

        assert!(!ctrl.set_font_size(0));
        assert!(ctrl.set_rotation(725));
        assert_eq!(ctrl.layer().style().rotation, 180);
    }

    #[test]
    fn delete_and_undo_redo() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        ctrl.execute(Command::AddNext, &vp);
        ctrl.set_edit_text("first");
        ctrl.execute(Command::AddNext, &vp);
        ctrl.finish_editing();
        assert_eq!(ctrl.layer().len(), 2);

        ctrl.select(0, false);
        assert_eq!(ctrl.execute(Command::DeleteSelected, &vp), Effect::Changed);
        assert_eq!(ctrl.layer().len(), 1);
        assert_eq!(ctrl.layer().label(0), Some(""));

        assert!(ctrl.undo());
        assert_eq!(ctrl.layer().len(), 2);
        assert_eq!(ctrl.layer().label(0), Some("first"));
        assert!(ctrl.layer().selected().is_empty());

        assert!(ctrl.redo());
        assert_eq!(ctrl.layer().len(), 1);
        assert!(!ctrl.redo());
    }

    #[test]
    fn save_closes_box_and_requests_write() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        ctrl.execute(Command::AddNext, &vp);
        assert_eq!(ctrl.execute(Command::Save, &vp), Effect::SaveRequested);
        assert!(!ctrl.is_editing());
    }

    #[test]
    fn commands_are_ignored_mid_drag() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        ctrl.pointer_pressed(Point::new(0.0, 0.0), egui::pos2(400.0, 300.0));
        assert_eq!(ctrl.execute(Command::AddNext, &vp), Effect::Unchanged);
        assert_eq!(ctrl.layer().len(), 1);
    }

    #[test]
    fn huge_rotation_step_saturates() {
        let config = LayerConfig {
            rotation_step: i32::MAX,
            ..LayerConfig::default()
        };
        let mut ctrl = AnnotationController::new(config);
        let vp = viewport();
        ctrl.execute(Command::RotateCw, &vp);
        ctrl.execute(Command::RotateCw, &vp);
        assert_eq!(ctrl.layer().style().rotation, 180);
        ctrl.execute(Command::RotateCcw, &vp);
        ctrl.execute(Command::RotateCcw, &vp);
        assert_eq!(ctrl.layer().style().rotation, -180);
    }

    #[test]
    fn loaded_styles_are_clamped() {
        let config = LayerConfig::default();
        let mut style = config.initial_style();
        style.size = 500;
        style.rotation = 720;
        let mut shape = Shape::rectangle(Point::new(0.0, 0.0), 20.0, 20.0);
        shape.style = Some(TextStyle {
            size: 0,
            rotation: -720,
            ..style
        });
        let layer = TextLayer::with_shapes(style, vec![shape]);
        let ctrl = AnnotationController::with_layer(config, layer);

        assert_eq!(ctrl.layer().style().size, 48);
        assert_eq!(ctrl.layer().style().rotation, 180);
        let own = ctrl.layer().shapes()[0].style.expect("override kept");
        assert_eq!(own.size, 2);
        assert_eq!(own.rotation, -180);
    }

    #[test]
    fn undo_after_double_click_skips_click_shapes() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        let p = Point::new(250.0, 250.0);
        let s = vp.data_to_screen(p);
        for _ in 0..2 {
            ctrl.pointer_pressed(p, s);
            ctrl.pointer_released(p, s);
        }
        assert_eq!(ctrl.layer().len(), 2);

        ctrl.double_click(Point::new(500.0, 500.0), egui::pos2(500.0, 500.0), &vp);
        assert!(ctrl.layer().is_empty());
        assert!(!ctrl.can_undo());
        assert!(!ctrl.undo());
        assert!(ctrl.layer().is_empty());
    }

    #[test]
    fn undo_after_double_click_returns_to_state_before_clicks() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        ctrl.execute(Command::AddNext, &vp);
        ctrl.finish_editing();
        ctrl.execute(Command::AddNext, &vp);
        ctrl.finish_editing();

        let p = Point::new(250.0, 250.0);
        let s = vp.data_to_screen(p);
        for _ in 0..2 {
            ctrl.pointer_pressed(p, s);
            ctrl.pointer_released(p, s);
        }
        ctrl.double_click(p, s, &vp);
        assert_eq!(ctrl.layer().len(), 2);

        assert!(ctrl.undo());
        assert_eq!(ctrl.layer().len(), 1);
    }

    #[test]
    fn lost_pointer_finishes_drag_at_last_position() {
        let mut ctrl = AnnotationController::new(LayerConfig::default());
        let vp = viewport();
        let start = Point::new(10.0, 10.0);
        ctrl.pointer_pressed(start, vp.data_to_screen(start));
        ctrl.pointer_moved(Point::new(60.0, 90.0));
        ctrl.pointer_lost(&vp);

        assert!(!ctrl.is_placing());
        assert!(ctrl.is_editing());
        assert_eq!(
            ctrl.layer().shapes()[0].bounds(),
            (start, Point::new(60.0, 90.0))
        );
        assert_eq!(ctrl.execute(Command::AddNext, &vp), Effect::Changed);
    }
}
