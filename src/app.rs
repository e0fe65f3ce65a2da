use std::path::PathBuf;
use std::time::Duration;

use eframe::egui::{self, ColorImage, Key, TextureHandle, TextureOptions};
use egui_extras::{Size, StripBuilder};

use crate::color::{colorize, ColorMapKind};
use crate::config::ViewerConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CubeViewerApp {
    pub state: AppState,
    texture: Option<TextureHandle>,
    /// (session serial, view generation, colour map) the texture was built from.
    texture_key: Option<(u64, u64, ColorMapKind)>,
}

impl CubeViewerApp {
    pub fn new(config: ViewerConfig, file: Option<PathBuf>) -> Self {
        let mut state = AppState::new(config);
        if let Some(path) = file {
            state.open_path(&path);
        }
        Self {
            state,
            texture: None,
            texture_key: None,
        }
    }

    /// Arrow keys step the slice (±1, ±10 with up/down); `S` toggles smoothing.
    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.state.session.is_none() {
            return;
        }
        let (delta, toggle) = ctx.input(|i| {
            let mut delta = 0i64;
            if i.key_pressed(Key::ArrowRight) {
                delta += 1;
            }
            if i.key_pressed(Key::ArrowLeft) {
                delta -= 1;
            }
            if i.key_pressed(Key::ArrowUp) {
                delta += 10;
            }
            if i.key_pressed(Key::ArrowDown) {
                delta -= 10;
            }
            (delta, i.key_pressed(Key::S))
        });
        if delta != 0 {
            self.state.update_session(|s| s.step_index(delta));
        }
        if toggle {
            self.state.update_session(|s| s.toggle_smoothing());
        }
    }

    /// Key of the texture the current view needs; `None` without a session.
    fn wanted_texture_key(&self) -> Option<(u64, u64, ColorMapKind)> {
        self.state.session.as_ref().map(|session| {
            (
                self.state.session_serial,
                session.view().generation,
                self.state.colormap,
            )
        })
    }

    /// Rebuild the slice texture when the view or colour map changed.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let Some(key) = self.wanted_texture_key() else {
            self.texture = None;
            self.texture_key = None;
            return;
        };
        if self.texture_key == Some(key) {
            return;
        }
        let Some(session) = &self.state.session else {
            return;
        };

        let view = session.view();
        let img = colorize(&view.slice, view.color_range, self.state.colormap);
        let size = [img.width() as usize, img.height() as usize];
        let color_image = ColorImage::from_rgba_unmultiplied(size, img.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(color_image, TextureOptions::NEAREST),
            None => {
                self.texture =
                    Some(ctx.load_texture("slice", color_image, TextureOptions::NEAREST));
            }
        }
        self.texture_key = Some(key);
    }
}

impl eframe::App for CubeViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_export();
        if self.state.exporting {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        self.handle_keys(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: status line ----
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            panels::status_bar(ui, &self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: slice above spectrum ----
        self.refresh_texture(ctx);
        let texture = self.texture.clone();
        let state = &mut self.state;
        egui::CentralPanel::default().show(ctx, |ui| {
            StripBuilder::new(ui)
                .size(Size::relative(0.6))
                .size(Size::remainder())
                .vertical(|mut strip| {
                    strip.cell(|ui| {
                        plot::slice_view(ui, state, texture.as_ref());
                    });
                    strip.cell(|ui| {
                        plot::spectrum_view(ui, state);
                    });
                });
        });

        // a click on the slice changes the view after the texture was drawn
        if self.wanted_texture_key() != self.texture_key {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;

    use super::*;
    use crate::cube::model::Cube;

    fn app_with_cube() -> CubeViewerApp {
        let mut app = CubeViewerApp::new(ViewerConfig::default(), None);
        let data = Array3::from_shape_fn((4, 3, 5), |(i, j, k)| (i + j + k) as f64);
        app.state.set_cube(Cube::new(data).unwrap(), "test".to_string());
        app
    }

    #[test]
    fn test_texture_follows_session_changes() {
        let ctx = egui::Context::default();
        let mut app = app_with_cube();
        assert!(app.texture_key.is_none());

        app.refresh_texture(&ctx);
        assert_eq!(app.texture_key, app.wanted_texture_key());
        assert_eq!(app.texture.as_ref().unwrap().size(), [4, 3]);

        // a change made after drawing leaves the texture stale until the next pass
        app.state.update_session(|s| s.step_index(1));
        assert_ne!(app.texture_key, app.wanted_texture_key());
        app.refresh_texture(&ctx);
        assert_eq!(app.texture_key, app.wanted_texture_key());

        app.state.colormap = ColorMapKind::Magma;
        assert_ne!(app.texture_key, app.wanted_texture_key());
    }

    #[test]
    fn test_no_session_drops_texture() {
        let ctx = egui::Context::default();
        let mut app = CubeViewerApp::new(ViewerConfig::default(), None);
        app.refresh_texture(&ctx);
        assert!(app.texture.is_none());
        assert!(app.wanted_texture_key().is_none());
    }
}
