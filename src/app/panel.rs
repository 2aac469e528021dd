use eframe::egui;
use text_layer::{Anchor, AnnotationController, Color4, Command, Keymap, Tool};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum DockArea {
    Left,
    #[allow(dead_code)]
    Right,
}

/// Where the host should dock the panel.
#[derive(Clone, Copy, Debug)]
pub(super) struct PanelPlacement {
    pub name: &'static str,
    pub area: DockArea,
}

/// Something the panel wants the app to do outside of the controller.
pub(super) enum PanelAction {
    Run(Command),
    Select { index: usize, extend: bool },
    OpenImage,
}

/// Style pickers, tool choice and the shape list.
pub(super) struct LayerPanel {
    placement: PanelPlacement,
}

pub(super) fn provide_dock_widget() -> (LayerPanel, PanelPlacement) {
    let placement = PanelPlacement {
        name: "text layer",
        area: DockArea::Left,
    };
    (LayerPanel { placement }, placement)
}

impl LayerPanel {
    pub fn placement(&self) -> PanelPlacement {
        self.placement
    }

    pub fn show(
        &self,
        ui: &mut egui::Ui,
        controller: &mut AnnotationController,
        keymap: &Keymap,
    ) -> Option<PanelAction> {
        let mut action = None;
        ui.heading(self.placement.name);
        if ui.button("Open image…").clicked() {
            action = Some(PanelAction::OpenImage);
        }
        ui.separator();

        ui.horizontal_wrapped(|ui| {
            let current = controller.layer().tool();
            for tool in Tool::ALL {
                if ui.selectable_label(current == tool, tool.label()).clicked() {
                    controller.set_tool(tool);
                }
            }
        });
        ui.separator();

        let style = *controller.layer().style();
        let min_size = controller.config().min_font_size;
        let max_size = controller.config().max_font_size;
        let rotation_step = controller.config().rotation_step.max(1);

        egui::Grid::new("text_style").num_columns(2).show(ui, |ui| {
            ui.label("color");
            let mut rgba = style.color.to_array();
            if ui
                .color_edit_button_rgba_unmultiplied(&mut rgba)
                .on_hover_text("Select text color")
                .changed()
            {
                controller.set_color(Color4::from_array(rgba));
            }
            ui.end_row();

            ui.label("font size");
            let mut size = style.size;
            if ui
                .add(egui::DragValue::new(&mut size).range(min_size..=max_size))
                .changed()
            {
                controller.set_font_size(size);
            }
            ui.end_row();

            ui.label("text rotation");
            let mut rotation = style.rotation;
            if ui
                .add(
                    egui::DragValue::new(&mut rotation)
                        .range(-180..=180)
                        .speed(rotation_step as f64),
                )
                .changed()
            {
                controller.set_rotation(rotation);
            }
            ui.end_row();

            ui.label("anchor");
            ui.horizontal(|ui| {
                for anchor in Anchor::ALL {
                    if ui
                        .selectable_label(style.anchor == anchor, anchor.symbol())
                        .on_hover_text("Text anchor")
                        .clicked()
                    {
                        controller.set_anchor(anchor);
                    }
                }
            });
            ui.end_row();
        });
        ui.separator();

        ui.horizontal(|ui| {
            let undo = ui.add_enabled(controller.can_undo(), egui::Button::new("Undo"));
            if undo.clicked() {
                action = Some(PanelAction::Run(Command::Undo));
            }
            let redo = ui.add_enabled(controller.can_redo(), egui::Button::new("Redo"));
            if redo.clicked() {
                action = Some(PanelAction::Run(Command::Redo));
            }
            if ui.button("Save").clicked() {
                action = Some(PanelAction::Run(Command::Save));
            }
        });
        ui.separator();

        ui.label(format!("{} shapes", controller.layer().len()));
        let shift = ui.input(|i| i.modifiers.shift);
        egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
            for (i, shape) in controller.layer().shapes().iter().enumerate() {
                let text = if shape.label.is_empty() {
                    format!("#{i} {:?}", shape.kind)
                } else {
                    format!("#{i} {}", shape.label)
                };
                if ui
                    .selectable_label(controller.layer().is_selected(i), text)
                    .clicked()
                {
                    action = Some(PanelAction::Select { index: i, extend: shift });
                }
            }
        });

        ui.collapsing("Shortcuts", |ui| {
            egui::Grid::new("shortcuts").num_columns(2).show(ui, |ui| {
                for command in Command::ALL {
                    ui.label(command.name());
                    match keymap.chord_for(command) {
                        Some(chord) => ui.monospace(chord.to_string()),
                        None => ui.weak("unbound"),
                    };
                    ui.end_row();
                }
            });
        });

        action
    }
}
