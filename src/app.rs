// ============================================================================
// DESKTOP APP: the studio window
// ============================================================================
//
// Layout (top to bottom): heading, upload buttons, the square frame boundary,
// zoom / lock / download controls, footer. Decoding and PNG writing run on the
// rayon pool and report back through `IoResult`, polled every frame.

use std::path::PathBuf;
use std::sync::mpsc;

use eframe::egui::{self, Color32, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Vec2};
use image::RgbaImage;

use crate::io;
use crate::settings::AppSettings;
use crate::studio::compose::contain;
use crate::studio::{
    Asset, AssetRole, InteractionMode, Point, ResizeHandle, SavedSnapshot, Size, Studio,
    StudioError, ZoomDirection,
};
use crate::theme::{Theme, ThemeMode};
use crate::{log_err, log_info};

/// Pointer distance (points) that still grabs a handle.
const HANDLE_HIT_RADIUS: f64 = 12.0;
/// Side of a drawn resize handle.
const HANDLE_SIDE: f32 = 20.0;
/// Rotate handle centre, above the top edge in local box units.
const ROTATE_HANDLE_OFFSET: f64 = -15.0;
/// Accumulated wheel travel for one zoom step.
const WHEEL_NOTCH: f32 = 40.0;

/// Side of the square frame boundary for a given window width.
pub fn boundary_side(viewport_width: f32) -> f32 {
    if viewport_width < 640.0 {
        350.0
    } else if viewport_width < 768.0 {
        450.0
    } else {
        500.0
    }
}

/// Results from background IO jobs.
pub enum IoResult {
    Decoded {
        role: AssetRole,
        result: Result<RgbaImage, StudioError>,
    },
    Saved(PathBuf),
    SaveFailed(String),
}

struct CachedTexture {
    generation: u64,
    smooth: bool,
    handle: TextureHandle,
}

/// What the pointer grabbed on press.
#[derive(Clone, Copy, Debug, PartialEq)]
enum HitTarget {
    Rotate,
    Resize(ResizeHandle),
    Body,
}

pub struct StudioApp {
    studio: Studio,
    settings: AppSettings,
    theme: Theme,
    frame_texture: Option<CachedTexture>,
    subject_texture: Option<CachedTexture>,
    io_sender: mpsc::Sender<IoResult>,
    io_receiver: mpsc::Receiver<IoResult>,
    pending_decodes: usize,
    /// Uploads that finished decoding while a download was running.
    deferred_decodes: Vec<(AssetRole, Result<RgbaImage, StudioError>)>,
    /// Frame number the download was armed on; completed on a later frame.
    pending_download: Option<u64>,
    notices: Vec<String>,
    status: Option<String>,
    wheel_accum: f32,
}

impl StudioApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        let theme = Theme::new(settings.theme_mode);
        theme.apply(&cc.egui_ctx);
        let (io_sender, io_receiver) = mpsc::channel();
        log_info!("Studio window opened ({:?} theme)", settings.theme_mode);
        Self {
            studio: Studio::new(),
            settings,
            theme,
            frame_texture: None,
            subject_texture: None,
            io_sender,
            io_receiver,
            pending_decodes: 0,
            deferred_decodes: Vec::new(),
            pending_download: None,
            notices: Vec::new(),
            status: None,
            wheel_accum: 0.0,
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
    }

    // --- background IO -----------------------------------------------------

    fn request_upload(&mut self, role: AssetRole) {
        let Some(path) = io::pick_image(role) else { return };
        log_info!("Decoding {} from {}", role, path.display());
        let sender = self.io_sender.clone();
        self.pending_decodes += 1;
        rayon::spawn(move || {
            let result = io::load_image_sync(&path, role);
            let _ = sender.send(IoResult::Decoded { role, result });
        });
    }

    fn poll_io(&mut self) {
        if !self.studio.mode().is_downloading() {
            for (role, result) in std::mem::take(&mut self.deferred_decodes) {
                self.apply_upload(role, result);
            }
        }
        while let Ok(result) = self.io_receiver.try_recv() {
            match result {
                IoResult::Decoded { role, result } => {
                    self.pending_decodes = self.pending_decodes.saturating_sub(1);
                    if self.studio.mode().is_downloading() {
                        self.deferred_decodes.push((role, result));
                    } else {
                        self.apply_upload(role, result);
                    }
                }
                IoResult::Saved(path) => {
                    log_info!("Saved {}", path.display());
                    self.status = Some(format!("Saved {}", path.display()));
                }
                IoResult::SaveFailed(e) => {
                    log_err!("Save failed: {}", e);
                    self.notify(format!("Download failed: {}", e));
                }
            }
        }
    }

    fn apply_upload(&mut self, role: AssetRole, result: Result<RgbaImage, StudioError>) {
        if let Err(e) = self.studio.apply_decoded(role, result) {
            self.notify(e.to_string());
        }
    }

    // --- lock & download ---------------------------------------------------

    fn toggle_lock(&mut self) {
        match self.studio.toggle_lock() {
            Ok(change) => self.notify(change.message()),
            Err(e) => self.notify(e.to_string()),
        }
    }

    fn request_download(&mut self, ctx: &egui::Context) {
        match self.studio.begin_download() {
            Ok(()) => {
                self.pending_download = Some(ctx.frame_nr());
                ctx.request_repaint();
            }
            Err(e) => self.notify(e.to_string()),
        }
    }

    /// Second phase: the armed frame has been drawn without handles.
    fn finish_download(&mut self, ctx: &egui::Context) {
        let Some(armed) = self.pending_download else { return };
        if ctx.frame_nr() <= armed {
            ctx.request_repaint();
            return;
        }
        self.pending_download = None;

        let image = match self.studio.complete_download(Ok) {
            Ok(image) => image,
            Err(e) => {
                self.notify(e.to_string());
                return;
            }
        };
        let Some(path) = io::pick_export_path() else {
            log_info!("Export cancelled");
            return;
        };
        let sender = self.io_sender.clone();
        rayon::spawn(move || match io::write_png(&image, &path) {
            Ok(()) => {
                let _ = sender.send(IoResult::Saved(path));
            }
            Err(e) => {
                let _ = sender.send(IoResult::SaveFailed(e.to_string()));
            }
        });
    }

    // --- textures ----------------------------------------------------------

    fn sync_textures(&mut self, ctx: &egui::Context) {
        let smooth_subject = self.studio.display_placement().transform.smooth_preview();
        sync_texture(ctx, &mut self.frame_texture, self.studio.frame(), true, "frame");
        sync_texture(ctx, &mut self.subject_texture, self.studio.subject(), smooth_subject, "photo");
    }

    // --- boundary canvas ---------------------------------------------------

    fn boundary_ui(&mut self, ui: &mut egui::Ui) {
        let side = self.studio.boundary().map_or(500.0, |b| b.width as f32);
        let (rect, response) = ui.allocate_exact_size(Vec2::splat(side), Sense::click_and_drag());

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, self.theme.boundary_bg);

        if let Some(message) = self.studio.placeholder_message() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                message,
                egui::FontId::proportional(18.0),
                self.theme.text_muted,
            );
            return;
        }

        self.handle_pointer(ui.ctx(), rect, &response);

        let placed = self.studio.display_placement();
        if let Some(tex) = &self.subject_texture {
            paint_subject(&painter, rect.min, &placed, tex);
        }
        if let Some(tex) = &self.frame_texture {
            let [w, h] = tex.handle.size();
            let fit = contain(w as u32, h as u32, side as f64, side as f64);
            let frame_rect = Rect::from_min_size(
                rect.min + Vec2::new(fit.x as f32, fit.y as f32),
                Vec2::new(fit.width as f32, fit.height as f32),
            );
            painter.image(
                tex.handle.id(),
                frame_rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        if self.studio.can_edit() {
            self.paint_handles(&painter, rect.min, &placed);
        }

        let cursor = match self.studio.mode() {
            InteractionMode::Dragging(_) => Some(egui::CursorIcon::Grabbing),
            InteractionMode::Resizing(_) => Some(egui::CursorIcon::ResizeNwSe),
            InteractionMode::Rotating(_) => Some(egui::CursorIcon::Alias),
            _ if response.hovered() && self.studio.can_edit() => Some(egui::CursorIcon::Grab),
            _ => None,
        };
        if let Some(cursor) = cursor {
            ui.ctx().set_cursor_icon(cursor);
        }
    }

    fn handle_pointer(&mut self, ctx: &egui::Context, rect: Rect, response: &egui::Response) {
        let to_boundary = |p: Pos2| Point::new((p.x - rect.min.x) as f64, (p.y - rect.min.y) as f64);
        let (pressed, down, origin, current, scroll) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.press_origin(),
                i.pointer.interact_pos(),
                i.scroll_delta.y,
            )
        });

        // Press: pick a handle or the body
        if pressed
            && response.hovered()
            && let Some(origin) = origin
            && rect.contains(origin)
        {
            let p = to_boundary(origin);
            match self.hit_test(p) {
                Some(HitTarget::Rotate) => {
                    self.studio.begin_rotate(p);
                }
                Some(HitTarget::Resize(handle)) => {
                    self.studio.begin_resize(handle, p);
                }
                Some(HitTarget::Body) => {
                    self.studio.begin_drag(p);
                }
                None => {}
            }
        }

        // Move / release. Tracking continues outside the boundary.
        if self.studio.mode().is_gesture() {
            if let Some(p) = current {
                self.studio.pointer_moved(to_boundary(p));
            }
            if !down {
                self.studio.end_gesture();
            }
        }

        // Wheel zoom, only over the subject
        if scroll != 0.0
            && response.hovered()
            && let Some(p) = ctx.input(|i| i.pointer.hover_pos())
        {
            self.wheel_accum += scroll;
            let mut consumed = false;
            while self.wheel_accum.abs() >= WHEEL_NOTCH {
                let direction = if self.wheel_accum > 0.0 {
                    self.wheel_accum -= WHEEL_NOTCH;
                    ZoomDirection::In
                } else {
                    self.wheel_accum += WHEEL_NOTCH;
                    ZoomDirection::Out
                };
                consumed |= self.studio.wheel(to_boundary(p), direction);
            }
            if consumed {
                ctx.input_mut(|i| i.scroll_delta = Vec2::ZERO);
            }
        } else if scroll == 0.0 {
            self.wheel_accum = 0.0;
        }
    }

    fn hit_test(&self, p: Point) -> Option<HitTarget> {
        if !self.studio.can_edit() || !self.studio.has_assets() {
            return None;
        }
        let t = self.studio.transform();
        let pos = self.studio.position();
        let near = |local: Point| {
            let anchor = t.to_boundary(pos, local);
            (anchor.x - p.x).hypot(anchor.y - p.y) <= HANDLE_HIT_RADIUS
        };
        let (w, h) = (t.width as f64, t.height as f64);
        if near(Point::new(w / 2.0, ROTATE_HANDLE_OFFSET)) {
            return Some(HitTarget::Rotate);
        }
        for handle in ResizeHandle::CORNERS {
            if near(handle.local_anchor(w, h)) {
                return Some(HitTarget::Resize(handle));
            }
        }
        t.contains(pos, p).then_some(HitTarget::Body)
    }

    fn paint_handles(&self, painter: &egui::Painter, origin: Pos2, placed: &SavedSnapshot) {
        let t = &placed.transform;
        let (w, h) = (t.width as f64, t.height as f64);
        let screen = |local: Point| {
            let p = t.to_boundary(placed.position, local);
            origin + Vec2::new(p.x as f32, p.y as f32)
        };
        let outline = Stroke::new(2.0, self.theme.on_accent);
        for handle in ResizeHandle::CORNERS {
            let centre = screen(handle.local_anchor(w, h));
            let square = Rect::from_center_size(centre, Vec2::splat(HANDLE_SIDE));
            painter.rect(square, 2.0, self.theme.accent, outline);
        }
        let top = screen(Point::new(w / 2.0, 0.0));
        let knob = screen(Point::new(w / 2.0, ROTATE_HANDLE_OFFSET));
        painter.line_segment([top, knob], Stroke::new(1.0, self.theme.accent));
        painter.circle(knob, HANDLE_SIDE / 2.0, self.theme.accent, outline);
    }

    // --- panels ------------------------------------------------------------

    fn controls_ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let editable = self.studio.has_assets() && self.studio.can_edit();
        ui.horizontal(|ui| {
            if ui.add_enabled(editable, egui::Button::new("-")).on_hover_text("Zoom out").clicked() {
                self.studio.zoom(ZoomDirection::Out);
            }
            ui.label(format!("{:.0}%", self.studio.display_placement().transform.scale * 100.0));
            if ui.add_enabled(editable, egui::Button::new("+")).on_hover_text("Zoom in").clicked() {
                self.studio.zoom(ZoomDirection::In);
            }
            ui.add_space(12.0);

            let (label, fill, text) = if self.studio.is_locked() {
                ("Unlock & Edit View", self.theme.locked, Color32::WHITE)
            } else {
                ("Save & Lock View", self.theme.accent, self.theme.on_accent)
            };
            let lock = egui::Button::new(egui::RichText::new(label).strong().color(text)).fill(fill);
            if ui.add_enabled(self.studio.can_toggle_lock(), lock).clicked() {
                self.toggle_lock();
            }

            let label = if self.studio.mode().is_downloading() {
                "Downloading..."
            } else {
                "Download"
            };
            let download = egui::Button::new(
                egui::RichText::new(label).strong().color(self.theme.on_accent),
            )
            .fill(self.theme.accent);
            if ui.add_enabled(self.studio.can_download(), download).clicked() {
                self.request_download(ctx);
            }
        });
    }

    fn notices_ui(&mut self, ctx: &egui::Context) {
        let Some(message) = self.notices.first().cloned() else { return };
        let mut dismissed = false;
        egui::Window::new("Zoom Photo Studio")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.notices.remove(0);
        }
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Measure before applying uploads so the initial fit sees the boundary
        let screen = ctx.screen_rect();
        self.studio
            .set_viewport(Size::new(screen.width() as f64, screen.height() as f64));
        let side = boundary_side(screen.width());
        self.studio.set_boundary(Some(Size::square(side as f64)));

        self.poll_io();
        self.finish_download(ctx);
        self.sync_textures(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Zoom Photo");
                ui.heading(egui::RichText::new("Studio").color(self.theme.accent));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let icon = match self.theme.mode {
                        ThemeMode::Dark => "Light theme",
                        ThemeMode::Light => "Dark theme",
                    };
                    if ui.button(icon).clicked() {
                        self.settings.theme_mode = self.settings.theme_mode.toggled();
                        self.theme = Theme::new(self.settings.theme_mode);
                        self.theme.apply(ctx);
                        self.settings.save();
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                if let Some(status) = &self.status {
                    ui.label(egui::RichText::new(status).small().color(self.theme.text_muted));
                }
                ui.label(egui::RichText::new("© Zoom Photo Studio.").small().color(self.theme.text_faint));
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    for role in [AssetRole::Frame, AssetRole::Subject] {
                        let label = self.studio.upload_label(role);
                        let button = egui::Button::new(egui::RichText::new(label).color(self.theme.accent))
                            .stroke(Stroke::new(2.0, self.theme.accent))
                            .fill(Color32::TRANSPARENT);
                        if ui.add_enabled(!self.studio.mode().is_downloading(), button).clicked() {
                            self.request_upload(role);
                        }
                    }
                    if self.pending_decodes > 0 {
                        ui.spinner();
                    }
                });
                ui.add_space(16.0);
                self.boundary_ui(ui);
                ui.add_space(16.0);
                self.controls_ui(ui, ctx);
            });
        });

        self.notices_ui(ctx);

        if self.pending_decodes > 0
            || !self.deferred_decodes.is_empty()
            || self.studio.mode().is_gesture()
        {
            ctx.request_repaint();
        }
    }
}

/// Keep `slot` in step with `asset`: upload on a new generation or filter
/// change, drop when the asset is gone.
fn sync_texture(
    ctx: &egui::Context,
    slot: &mut Option<CachedTexture>,
    asset: Option<&Asset>,
    smooth: bool,
    name: &str,
) {
    let Some(asset) = asset else {
        *slot = None;
        return;
    };
    if let Some(cached) = slot
        && cached.generation == asset.generation
        && cached.smooth == smooth
    {
        return;
    }
    let options = if smooth {
        TextureOptions::LINEAR
    } else {
        TextureOptions::NEAREST
    };
    let max_side = ctx.input(|i| i.max_texture_side) as u32;
    let pixels = preview_pixels(&asset.image, max_side);
    let color_image = egui::ColorImage::from_rgba_unmultiplied(
        [pixels.width() as usize, pixels.height() as usize],
        pixels.as_raw(),
    );
    *slot = Some(CachedTexture {
        generation: asset.generation,
        smooth,
        handle: ctx.load_texture(name, color_image, options),
    });
}

/// Downscale for the GPU when a side exceeds `max_side`.
fn preview_pixels(image: &RgbaImage, max_side: u32) -> std::borrow::Cow<'_, RgbaImage> {
    let (w, h) = image.dimensions();
    if max_side == 0 || (w <= max_side && h <= max_side) {
        return std::borrow::Cow::Borrowed(image);
    }
    let ratio = max_side as f64 / w.max(h) as f64;
    let nw = ((w as f64 * ratio).round() as u32).max(1);
    let nh = ((h as f64 * ratio).round() as u32).max(1);
    std::borrow::Cow::Owned(image::imageops::resize(
        image,
        nw,
        nh,
        image::imageops::FilterType::Triangle,
    ))
}

/// Draw the subject as a textured quad through the placement's rotation and
/// zoom. The image is contained in its box.
fn paint_subject(painter: &egui::Painter, origin: Pos2, placed: &SavedSnapshot, tex: &CachedTexture) {
    let t = &placed.transform;
    let [iw, ih] = tex.handle.size();
    let fit = contain(iw as u32, ih as u32, t.width as f64, t.height as f64);
    let corners = [
        (Point::new(fit.x, fit.y), Pos2::new(0.0, 0.0)),
        (Point::new(fit.x + fit.width, fit.y), Pos2::new(1.0, 0.0)),
        (Point::new(fit.x + fit.width, fit.y + fit.height), Pos2::new(1.0, 1.0)),
        (Point::new(fit.x, fit.y + fit.height), Pos2::new(0.0, 1.0)),
    ];
    let mut mesh = egui::Mesh::with_texture(tex.handle.id());
    for (local, uv) in corners {
        let p = t.to_boundary(placed.position, local);
        mesh.vertices.push(egui::epaint::Vertex {
            pos: origin + Vec2::new(p.x as f32, p.y as f32),
            uv,
            color: Color32::WHITE,
        });
    }
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    painter.add(egui::Shape::mesh(mesh));
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_boundary_follows_window_width() {
        assert_eq!(boundary_side(375.0), 350.0);
        assert_eq!(boundary_side(639.9), 350.0);
        assert_eq!(boundary_side(640.0), 450.0);
        assert_eq!(boundary_side(767.0), 450.0);
        assert_eq!(boundary_side(1280.0), 500.0);
    }

    #[test]
    fn test_preview_downscales_only_oversized() {
        let small = RgbaImage::from_pixel(8, 4, Rgba([1, 2, 3, 255]));
        assert!(matches!(preview_pixels(&small, 16), std::borrow::Cow::Borrowed(_)));
        let scaled = preview_pixels(&small, 4);
        assert_eq!(scaled.dimensions(), (4, 2));
    }
}
