use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui;
use image::DynamicImage;
use text_layer::{
    export, store, AnnotationController, Camera, Canvas, Command, Effect, Interaction, Keymap,
    LayerConfig, Point, TextLayer, Viewport,
};

mod canvas;
mod panel;

use panel::{DockArea, LayerPanel, PanelAction};

// ── App ─────────────────────────────────────────────────────────────────────

pub struct TextLayerApp {
    image_path: PathBuf,
    raw_image: DynamicImage,
    texture: Option<egui::TextureHandle>,

    controller: AnnotationController,
    keymap: Keymap,
    panel: LayerPanel,

    // pan & zoom
    camera: Camera,
    fitted: bool,
    panning: bool,

    // text box shown last frame, to focus a newly opened one
    shown_session: Option<(usize, egui::Pos2)>,
    // commands from the panel, run once the canvas is laid out
    pending: Vec<Command>,
    autosave: bool,
    status: Option<String>,
}

impl TextLayerApp {
    pub fn new(image_path: PathBuf, config: LayerConfig) -> Result<Self> {
        let keymap = config.keymap().context("building key bindings")?;
        let autosave = config.autosave;
        let (raw_image, controller, status) = load_document(&image_path, config)?;
        let (panel, placement) = panel::provide_dock_widget();
        tracing::debug!(name = placement.name, area = ?placement.area, "dock panel");

        Ok(Self {
            image_path,
            raw_image,
            texture: None,
            controller,
            keymap,
            panel,
            camera: Camera::default(),
            fitted: false,
            panning: false,
            shown_session: None,
            pending: Vec::new(),
            autosave: autosave && status.is_none(),
            status,
        })
    }

    fn open_image(&mut self, path: PathBuf) {
        self.save_sidecar();
        let config = self.controller.config().clone();
        match load_document(&path, config) {
            Ok((raw_image, controller, status)) => {
                self.autosave = self.controller.config().autosave && status.is_none();
                self.image_path = path;
                self.raw_image = raw_image;
                self.controller = controller;
                self.texture = None;
                self.fitted = false;
                self.shown_session = None;
                self.status = status;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not open image");
                self.status = Some(format!("Could not open {}: {e:#}", path.display()));
            }
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        let rgba = self.raw_image.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        self.texture = Some(ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR));
    }

    fn image_size(&self) -> (f32, f32) {
        (self.raw_image.height() as f32, self.raw_image.width() as f32)
    }

    fn save_sidecar(&mut self) {
        if !self.autosave {
            return;
        }
        if let Err(e) = store::save(&self.image_path, self.controller.layer()) {
            tracing::warn!(error = %e, "autosave failed");
            self.status = Some(format!("Autosave failed: {e}"));
        }
    }

    fn save_and_export(&mut self) {
        match store::save(&self.image_path, self.controller.layer()) {
            Ok(path) => {
                self.autosave = self.controller.config().autosave;
                self.status = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                self.status = Some(format!("Save failed: {e}"));
                return;
            }
        }
        match export::export_labeled(&self.image_path, &self.raw_image, self.controller.layer()) {
            Ok(path) => self.status = Some(format!("Exported {}", path.display())),
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                self.status = Some(format!("Export failed: {e}"));
            }
        }
    }

    fn run_command(&mut self, command: Command, viewport: &Viewport) {
        tracing::debug!(command = command.name(), "command");
        if self.controller.execute(command, viewport) == Effect::SaveRequested {
            self.save_and_export();
        }
    }

    /// Key presses go to the layer only while no text field has focus.
    fn handle_keys(&mut self, ctx: &egui::Context, viewport: &Viewport) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let commands: Vec<Command> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => self.keymap.lookup(*key, *modifiers),
                    _ => None,
                })
                .collect()
        });
        for command in commands {
            self.run_command(command, viewport);
        }
    }

    fn handle_pointer(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        viewport: &mut Viewport,
    ) {
        // Pan (middle mouse button)
        let middle_down = ctx.input(|i| i.pointer.middle_down());
        if middle_down {
            let delta = ctx.input(|i| i.pointer.delta());
            viewport.pan_by(delta);
            self.panning = true;
        } else {
            self.panning = false;
        }

        // Zoom (scroll wheel)
        let scroll_delta = ctx.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta != 0.0 && response.hovered() {
            if let Some(cursor) = response.hover_pos() {
                viewport.zoom_about(cursor, 1.0 + scroll_delta * 0.002);
            }
        }

        if self.panning {
            return;
        }

        let (pressed, released, shift, pos) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.modifiers.shift,
                i.pointer.interact_pos(),
            )
        });
        let Some(pos) = pos else {
            if released {
                self.controller.pointer_lost(viewport);
            }
            return;
        };
        let data = viewport.screen_to_data(pos);

        if pressed && response.hovered() {
            if self.controller.layer().tool().shape_kind().is_some() {
                self.controller.pointer_pressed(data, pos);
            } else {
                self.controller.finish_editing();
                self.controller.select_at(data, viewport, shift);
            }
        }
        if self.controller.is_placing() {
            self.controller.pointer_moved(data);
            if released {
                self.controller.pointer_released(data, pos);
            }
        }
        if response.double_clicked() {
            self.controller.double_click(data, pos, viewport);
        }
    }

    /// The inline label editor over the canvas.
    fn show_text_box(&mut self, ctx: &egui::Context) {
        let Some(session) = self.controller.edit_session() else {
            self.shown_session = None;
            return;
        };
        let key = (session.index(), session.screen_pos());
        let newly_opened = self.shown_session != Some(key);
        let mut buffer = session.text().to_string();
        let char_count = buffer.chars().count();
        let width = self.controller.config().text_box_width;
        let font = egui::FontId::proportional(self.controller.config().text_box_font_size);

        let mut changed = false;
        let mut lost_focus = false;
        egui::Area::new(egui::Id::new("text_box"))
            .fixed_pos(key.1)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let output = egui::TextEdit::singleline(&mut buffer)
                    .id(egui::Id::new("text_box_edit"))
                    .desired_width(width)
                    .font(font)
                    .show(ui);
                if newly_opened {
                    output.response.request_focus();
                    let mut state = output.state.clone();
                    state.cursor.set_char_range(Some(egui::text::CCursorRange::two(
                        egui::text::CCursor::new(0),
                        egui::text::CCursor::new(char_count),
                    )));
                    state.store(ui.ctx(), output.response.id);
                }
                changed = output.response.changed();
                lost_focus = output.response.lost_focus();
            });
        self.shown_session = Some(key);

        if changed {
            self.controller.set_edit_text(&buffer);
        }
        if lost_focus {
            self.controller.finish_editing();
        }
    }
}

fn load_document(
    image_path: &Path,
    config: LayerConfig,
) -> Result<(DynamicImage, AnnotationController, Option<String>)> {
    let raw_image = image::open(image_path)
        .with_context(|| format!("opening image {}", image_path.display()))?;
    let (layer, status) = match store::load(image_path) {
        Ok(Some(file)) => (file.into_layer(), None),
        Ok(None) => (TextLayer::new(config.initial_style()), None),
        Err(e) => {
            // keep the broken file on disk: autosave stays off until an explicit save
            tracing::warn!(error = %e, "could not load text layer, starting empty");
            (
                TextLayer::new(config.initial_style()),
                Some(format!("Could not load labels: {e}")),
            )
        }
    };
    tracing::info!(image = %image_path.display(), shapes = layer.len(), "opened image");
    Ok((raw_image, AnnotationController::with_layer(config, layer), status))
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for TextLayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        // Dock panel
        let side_panel = match self.panel.placement().area {
            DockArea::Left => egui::SidePanel::left("text_layer_panel"),
            DockArea::Right => egui::SidePanel::right("text_layer_panel"),
        };
        let mut action = None;
        side_panel.resizable(false).show(ctx, |ui| {
            action = self.panel.show(ui, &mut self.controller, &self.keymap);
        });
        match action {
            Some(PanelAction::Run(command)) => self.pending.push(command),
            Some(PanelAction::Select { index, extend }) => {
                self.controller.finish_editing();
                self.controller.select(index, extend);
            }
            Some(PanelAction::OpenImage) => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("images", &["png", "jpg", "jpeg", "tif", "tiff", "bmp"])
                    .pick_file()
                {
                    self.open_image(path);
                }
            }
            None => {}
        }

        // Status line
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Zoom: {:.0}%", self.camera.zoom * 100.0));
                ui.separator();
                ui.label(match self.controller.interaction() {
                    Interaction::Idle => "idle",
                    Interaction::Placing(_) => "drawing",
                    Interaction::Editing(_) => "editing label",
                });
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });

        // Canvas
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let mut viewport = Viewport::new(self.camera, Canvas::from_rect(response.rect));
            if !self.fitted {
                let (rows, cols) = self.image_size();
                viewport.fit(rows, cols);
                self.fitted = true;
            }

            for command in std::mem::take(&mut self.pending) {
                self.run_command(command, &viewport);
            }
            self.handle_keys(ctx, &viewport);
            self.handle_pointer(ctx, &response, &mut viewport);
            self.camera = viewport.camera;

            painter.rect_filled(response.rect, 0.0, egui::Color32::from_gray(40));
            if let Some(ref tex) = self.texture {
                let (rows, cols) = self.image_size();
                let img_rect = egui::Rect::from_two_pos(
                    viewport.project(Point::new(0.0, 0.0)),
                    viewport.project(Point::new(rows, cols)),
                );
                painter.image(
                    tex.id(),
                    img_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            canvas::draw_layer(&painter, &viewport, self.controller.layer());
        });

        self.show_text_box(ctx);

        if !self.controller.is_placing() && self.controller.take_dirty() {
            self.save_sidecar();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.finish_editing();
        self.save_sidecar();
    }
}
