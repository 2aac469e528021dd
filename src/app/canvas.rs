use eframe::egui;
use text_layer::{Shape, ShapeKind, TextLayer, Viewport};

const OUTLINE: egui::Color32 = egui::Color32::from_gray(200);
const SELECTED: egui::Color32 = egui::Color32::from_rgb(0, 120, 255);

pub(super) fn draw_layer(painter: &egui::Painter, viewport: &Viewport, layer: &TextLayer) {
    for (i, shape) in layer.shapes().iter().enumerate() {
        let color = if layer.is_selected(i) { SELECTED } else { OUTLINE };
        draw_outline(painter, viewport, shape, egui::Stroke::new(1.5, color));
        if !shape.label.is_empty() {
            draw_label(painter, viewport, layer, i);
        }
    }
}

fn draw_outline(painter: &egui::Painter, viewport: &Viewport, shape: &Shape, stroke: egui::Stroke) {
    let points: Vec<egui::Pos2> = shape.points.iter().map(|p| viewport.project(*p)).collect();
    match shape.kind {
        ShapeKind::Rectangle => {
            painter.add(egui::Shape::closed_line(points, stroke));
        }
        ShapeKind::Ellipse => {
            let rect = egui::Rect::from_points(&points);
            painter.add(egui::Shape::ellipse_stroke(rect.center(), rect.size() * 0.5, stroke));
        }
        ShapeKind::Line => {
            if let [a, b] = points[..] {
                painter.line_segment([a, b], stroke);
            }
        }
    }
}

/// Draws a label centered on its anchor, rotated about that point.
fn draw_label(painter: &egui::Painter, viewport: &Viewport, layer: &TextLayer, index: usize) {
    let Some(shape) = layer.shape(index) else {
        return;
    };
    let style = layer.effective_style(index);
    let (min, max) = shape.bounds();
    let anchor = viewport.project(style.anchor.resolve(min, max));
    let color = style.color.to_egui();
    let galley = painter.layout_no_wrap(
        shape.label.clone(),
        egui::FontId::proportional(style.size as f32),
        color,
    );
    let half = galley.size() * 0.5;
    let angle = (style.rotation as f32).to_radians();
    let (sin, cos) = angle.sin_cos();
    let offset = egui::vec2(-half.x * cos + half.y * sin, -half.x * sin - half.y * cos);

    let mut text = egui::Shape::galley(anchor + offset, galley, color);
    if let egui::Shape::Text(ref mut text_shape) = text {
        text_shape.angle = angle;
    }
    painter.add(text);
}
