use clap::Parser;
use eframe::egui;
use std::path::{Path, PathBuf};
use std::time::Duration;

use quick_atlas::input::{ButtonMask, Key, Modifiers, PointerButton};
use quick_atlas::{
    AtlasEditor, CommandHistory, Effect, EditorConfig, FsScanner, FsStore, Highlight, InputEvent,
    PreviewInput, Rect, RegionKey, Vec2, Zoom,
};

type Editor = AtlasEditor<FsStore, FsScanner>;

const POLL_INTERVAL: f64 = 1.0;

// ── Command line ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "quick-atlas", version, about = "Edit atlas texture regions of a sprite sheet")]
struct Args {
    /// Source image or atlas region resource to open
    source: Option<PathBuf>,

    /// Project root; resource paths are stored relative to it
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to quick-atlas.toml in the project root)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Forward-slash path relative to `root`, as the editor stores it.
fn project_path(root: &Path, path: &Path) -> Option<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    let absolute = std::fs::canonicalize(&absolute).unwrap_or(absolute);
    let relative = absolute.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn show_error(message: &str) {
    log::error!("{message}");
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("Quick Atlas")
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

fn confirm(message: &str) -> bool {
    let answer = rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title("Please confirm...")
        .set_description(message)
        .set_buttons(rfd::MessageButtons::YesNo)
        .show();
    answer == rfd::MessageDialogResult::Yes
}

fn window_title(root: &Path) -> String {
    format!("quick-atlas - {}", root.display())
}

fn to_egui(rect: Rect, origin: egui::Pos2) -> egui::Rect {
    egui::Rect::from_min_size(origin + egui::vec2(rect.x, rect.y), egui::vec2(rect.w, rect.h))
}

// ── App ─────────────────────────────────────────────────────────────────────

struct AtlasApp {
    root: PathBuf,
    editor: Editor,
    input: PreviewInput,

    texture: Option<egui::TextureHandle>,
    texture_source: Option<String>,
    image_size: egui::Vec2,

    // preview scroll offset
    pan: egui::Vec2,
    last_poll: f64,

    // inspector path field
    path_field: String,
    path_field_key: Option<RegionKey>,
}

impl AtlasApp {
    fn new(root: PathBuf, editor: Editor) -> Self {
        let input = PreviewInput::new(Zoom::new(&editor.config().zoom));
        Self {
            root,
            editor,
            input,
            texture: None,
            texture_source: None,
            image_size: egui::Vec2::ZERO,
            pan: egui::vec2(16.0, 16.0),
            last_poll: 0.0,
            path_field: String::new(),
            path_field_key: None,
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        let source = self.editor.source().map(str::to_string);
        if self.texture_source == source {
            return;
        }
        self.texture = None;
        self.image_size = egui::Vec2::ZERO;
        self.texture_source = source.clone();
        let Some(source) = source else {
            return;
        };
        match image::open(self.editor.store().absolute(&source)) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let pixels = rgba.as_flat_samples();
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
                self.image_size = egui::vec2(size[0] as f32, size[1] as f32);
                self.texture = Some(ctx.load_texture(
                    "source",
                    color_image,
                    egui::TextureOptions::NEAREST,
                ));
            }
            Err(e) => log::warn!("Cannot load source image {source}: {e}"),
        }
    }

    fn open_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "webp", "bmp"])
            .add_filter("Atlas regions", &["tres"])
            .set_directory(&self.root)
            .pick_file();
        let Some(picked) = picked else {
            return;
        };
        match project_path(&self.root, &picked) {
            Some(path) => {
                if let Err(e) = self.editor.open(&path) {
                    show_error(&e.to_string());
                }
            }
            None => show_error(&format!(
                "{} is outside the project root {}",
                picked.display(),
                self.root.display()
            )),
        }
    }

    fn apply_effects(&mut self, ctx: &egui::Context, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Redraw | Effect::ZoomChanged(_) => ctx.request_repaint(),
                Effect::Scroll(by) => self.pan -= egui::vec2(by.x, by.y),
                Effect::ShowError(message) => show_error(&message),
                Effect::ConfirmDelete(prompt) => self.delete_with_confirmation(&prompt.message),
            }
        }
    }

    fn delete_with_confirmation(&mut self, message: &str) {
        let confirmed = confirm(message);
        if let Err(e) = self.editor.resolve_delete(confirmed) {
            show_error(&e.to_string());
        }
    }

    /// Translates this frame's egui input into preview events.
    fn collect_events(
        &self,
        ctx: &egui::Context,
        response: &egui::Response,
        origin: egui::Pos2,
    ) -> Vec<InputEvent> {
        let typing = ctx.wants_keyboard_input();
        ctx.input(|i| {
            let mut events = Vec::new();
            let local = |p: egui::Pos2| Vec2::new(p.x - origin.x, p.y - origin.y);
            let pointer = i.pointer.interact_pos().map(local);

            if let Some(position) = pointer {
                if response.hovered() && i.pointer.button_pressed(egui::PointerButton::Primary) {
                    events.push(InputEvent::ButtonDown {
                        button: PointerButton::Primary,
                        position,
                    });
                }
                let delta = i.pointer.delta();
                if delta != egui::Vec2::ZERO {
                    events.push(InputEvent::PointerMove {
                        position,
                        delta: Vec2::new(delta.x, delta.y),
                        buttons: ButtonMask {
                            primary: i.pointer.primary_down(),
                            middle: i.pointer.middle_down(),
                        },
                    });
                }
                if i.pointer.button_released(egui::PointerButton::Primary) {
                    events.push(InputEvent::ButtonUp {
                        button: PointerButton::Primary,
                        position,
                    });
                }
                let scroll = i.raw_scroll_delta.y;
                if response.hovered() && scroll != 0.0 {
                    events.push(InputEvent::Wheel {
                        steps: if scroll > 0.0 { 1 } else { -1 },
                        position,
                    });
                }
            }

            if !typing {
                let modifiers = Modifiers {
                    ctrl: i.modifiers.ctrl || i.modifiers.command,
                    shift: i.modifiers.shift,
                };
                for (egui_key, key) in [
                    (egui::Key::Delete, Key::Delete),
                    (egui::Key::Z, Key::Z),
                    (egui::Key::Y, Key::Y),
                ] {
                    if i.key_pressed(egui_key) {
                        events.push(InputEvent::KeyPress { key, modifiers });
                    }
                }
            }
            events
        })
    }

    fn draw_regions(&self, painter: &egui::Painter, origin: egui::Pos2) {
        for view in self.editor.frame(self.input.zoom().scale()) {
            let color = match view.highlight {
                Highlight::Normal => egui::Color32::from_rgb(120, 200, 255),
                Highlight::Selected => egui::Color32::YELLOW,
                Highlight::Active => egui::Color32::from_rgb(255, 140, 0),
            };
            painter.rect_stroke(
                to_egui(view.rect, origin),
                0.0,
                egui::Stroke::new(1.0, color),
                egui::StrokeKind::Middle,
            );
            // handles of every region are hit-tested, not just the selected one
            for (i, handle) in view.handles.iter().enumerate() {
                let fill = match view.active_handle {
                    Some(active) if active.index() == i => egui::Color32::RED,
                    _ if view.highlight == Highlight::Normal => egui::Color32::from_gray(60),
                    _ => egui::Color32::WHITE,
                };
                let rect = to_egui(*handle, origin);
                painter.rect_filled(rect, 0.0, fill);
                painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, color), egui::StrokeKind::Inside);
            }
        }
    }

    fn inspector(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open…").clicked() {
                self.open_dialog();
            }
            let can_undo = self.editor.history().can_undo();
            let can_redo = self.editor.history().can_redo();
            if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                if let Err(e) = self.editor.undo() {
                    show_error(&e.to_string());
                }
            }
            if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                if let Err(e) = self.editor.redo() {
                    show_error(&e.to_string());
                }
            }
        });
        ui.label(format!("Source: {}", self.editor.source().unwrap_or("(none)")));
        ui.horizontal(|ui| {
            if ui.button("−").clicked() {
                self.input.zoom_mut().step_by(-1);
            }
            ui.label(format!("Zoom: {}%", self.input.zoom().percent()));
            if ui.button("+").clicked() {
                self.input.zoom_mut().step_by(1);
            }
            if ui.button("100%").clicked() {
                self.input.zoom_mut().reset();
            }
        });

        ui.separator();
        ui.heading("Grid");
        let mut grid = self.editor.grid().clone();
        ui.checkbox(&mut grid.snap, "Snap to grid");
        ui.horizontal(|ui| {
            let mut x = grid.size_x;
            let mut y = grid.size_y;
            if ui.add(egui::DragValue::new(&mut x).range(1..=1024).prefix("x: ")).changed() {
                grid.set_size_x(x);
            }
            if ui.add(egui::DragValue::new(&mut y).range(1..=1024).prefix("y: ")).changed() {
                grid.set_size_y(y);
            }
        });
        let mut square = grid.square;
        if ui.checkbox(&mut square, "Square").changed() {
            grid.set_square(square);
        }
        *self.editor.grid_mut() = grid;

        ui.separator();
        let Some(key) = self.editor.selected() else {
            ui.label("No atlas region selected");
            self.path_field_key = None;
            return;
        };
        let Some(edits) = self.editor.region(key) else {
            return;
        };
        if self.path_field_key != Some(key) {
            self.path_field = edits.path().to_string();
            self.path_field_key = Some(key);
        }
        let mut region = edits.region();
        let mut margin = edits.margin();
        let mut filter_clip = edits.filter_clip();

        if let Some(texture) = &self.texture {
            if region.has_area() && self.image_size.x > 0.0 {
                let scale = (200.0 / region.w.max(region.h)).min(4.0);
                let size = egui::vec2(region.w * scale, region.h * scale);
                let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                let uv = egui::Rect::from_min_size(
                    egui::pos2(region.x / self.image_size.x, region.y / self.image_size.y),
                    egui::vec2(region.w / self.image_size.x, region.h / self.image_size.y),
                );
                ui.painter().image(texture.id(), rect, uv, egui::Color32::WHITE);
            }
        }

        let mut result = Ok(false);
        ui.horizontal(|ui| {
            let field = ui.text_edit_singleline(&mut self.path_field);
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if submitted || ui.button("Rename").clicked() {
                result = self.editor.rename(key, &self.path_field);
                self.path_field_key = None;
            }
        });

        ui.label("Region");
        if rect_fields(ui, "region", &mut region) {
            result = self.editor.edit_region(key, region);
        }
        ui.label("Margin");
        if rect_fields(ui, "margin", &mut margin) {
            result = self.editor.edit_margin(key, margin);
        }
        if ui.checkbox(&mut filter_clip, "Filter clip").changed() {
            result = self.editor.edit_filter_clip(key, filter_clip);
        }
        if let Err(e) = result {
            show_error(&e.to_string());
            self.path_field_key = None;
        }

        ui.separator();
        if ui.button("Delete region").clicked() {
            if let Some(prompt) = self.editor.request_delete() {
                self.delete_with_confirmation(&prompt.message);
            }
        }
    }
}

fn rect_fields(ui: &mut egui::Ui, id: &str, rect: &mut Rect) -> bool {
    let mut changed = false;
    egui::Grid::new(id).num_columns(4).show(ui, |ui| {
        for (label, value) in [("x", &mut rect.x), ("y", &mut rect.y), ("w", &mut rect.w), ("h", &mut rect.h)] {
            ui.label(label);
            changed |= ui.add(egui::DragValue::new(value).speed(1.0)).changed();
        }
    });
    changed
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        let now = ctx.input(|i| i.time);
        if now - self.last_poll >= POLL_INTERVAL {
            self.last_poll = now;
            if self.editor.poll_filesystem() {
                ctx.request_repaint();
            }
        }
        ctx.request_repaint_after(Duration::from_secs_f64(POLL_INTERVAL));

        egui::SidePanel::right("inspector")
            .min_width(260.0)
            .show(ctx, |ui| self.inspector(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let canvas_rect = response.rect;
            let origin = canvas_rect.min + self.pan;
            let scale = self.input.zoom().scale();

            painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));
            if let Some(ref tex) = self.texture {
                let img_rect = egui::Rect::from_min_size(origin, self.image_size * scale);
                painter.image(
                    tex.id(),
                    img_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            } else if self.editor.source().is_none() {
                painter.text(
                    canvas_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Open an image to edit its atlas regions",
                    egui::FontId::proportional(16.0),
                    egui::Color32::GRAY,
                );
            }
            self.draw_regions(&painter, origin);

            let events = self.collect_events(ctx, &response, origin);
            for event in events {
                let effects = self.input.handle(&mut self.editor, event);
                self.apply_effects(ctx, effects);
            }
        });
    }
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let root = match std::fs::canonicalize(&args.root) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Cannot open project root {}: {e}", args.root.display());
            std::process::exit(1);
        }
    };
    let config = match EditorConfig::discover(args.config.as_deref(), &root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let history = config.history.build();
    let mut editor = AtlasEditor::new(config, FsStore::new(&root), FsScanner::new(&root), history);
    log::info!("Indexed {} atlas regions under {}", editor.index().len(), root.display());

    if let Some(source) = &args.source {
        match project_path(&root, source) {
            Some(path) => {
                if let Err(e) = editor.open(&path) {
                    log::error!("Cannot open {path}: {e}");
                }
            }
            None => log::error!("{} is outside the project root", source.display()),
        }
    }

    let title = window_title(&root);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(AtlasApp::new(root, editor)))),
    )
}
