use eframe::egui::{self, Color32, Rect, RichText, ScrollArea, Sense, Ui};

use crate::color::ColorMapKind;
use crate::cube::model::SliceAxis;
use crate::display::scale::ScaleMode;
use crate::export::ExportFormat;
use crate::session::format_value;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – navigation and display controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    let Some(session) = &state.session else {
        ui.label("No cube loaded.");
        return;
    };

    // Copy what the widgets edit; changes go back through the session.
    let current_axis = session.axis();
    let mut axis = current_axis;
    let mut index = session.index();
    let extent = session.extent();
    let shape = session.cube().shape();
    let voxel = session.voxel();
    let mut ijk = [voxel.i, voxel.j, voxel.k];
    let raw_value = session.voxel_value();
    let shown_value = session.displayed_value();
    let mut image_scale = session.image_scale();
    let mut spectrum_scale = session.spectrum_scale();
    let mut smoothing = session.smoothing();
    let sigma = session.sigma();
    let color_range = session.view().color_range;
    let manual = session.limits().is_manual();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Slice axis and index ----
            ui.strong("Slice axis");
            ui.horizontal(|ui: &mut Ui| {
                for candidate in SliceAxis::ALL {
                    ui.radio_value(&mut axis, candidate, format!("dim {candidate}"));
                }
            });
            if axis != current_axis {
                state.update_session(|s| s.set_axis(axis.number()));
            }

            ui.add_space(4.0);
            ui.strong("Slice index");
            let slider =
                ui.add(egui::Slider::new(&mut index, 1..=extent).text(format!("/ {extent}")));
            if slider.changed() {
                state.update_session(|s| s.set_index(index as i64));
            }
            ui.separator();

            // ---- Voxel ----
            ui.strong("Voxel (i, j, k)");
            let mut voxel_changed = false;
            ui.horizontal(|ui: &mut Ui| {
                for (component, &n) in ijk.iter_mut().zip(shape.iter()) {
                    voxel_changed |= ui
                        .add(egui::DragValue::new(component).range(1..=n).speed(0.2))
                        .changed();
                }
            });
            if voxel_changed {
                let [i, j, k] = ijk;
                state.update_session(|s| s.select_voxel(i as i64, j as i64, k as i64));
            }
            ui.label(format!(
                "value {}  (shown {})",
                format_value(raw_value),
                format_value(shown_value)
            ));
            ui.separator();

            // ---- Scales and smoothing ----
            ui.strong("Image scale");
            if scale_combo(ui, "image_scale", &mut image_scale) {
                state.update_session(|s| s.set_image_scale(image_scale));
            }
            ui.strong("Spectrum scale");
            if scale_combo(ui, "spectrum_scale", &mut spectrum_scale) {
                state.update_session(|s| s.set_spectrum_scale(spectrum_scale));
            }
            if ui
                .checkbox(&mut smoothing, format!("Gaussian smoothing (σ = {sigma})"))
                .changed()
            {
                state.update_session(|s| s.set_smoothing(smoothing));
            }
            ui.separator();

            // ---- Colour limits ----
            ui.strong("Colour limits");
            ui.horizontal(|ui: &mut Ui| {
                ui.label("low");
                ui.add(egui::TextEdit::singleline(&mut state.low_text).desired_width(70.0));
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("high");
                ui.add(egui::TextEdit::singleline(&mut state.high_text).desired_width(70.0));
            });
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Apply").clicked() {
                    state.apply_limits();
                }
                ui.label(if manual { "manual" } else { "auto" });
            });
            ui.small("Leave a field empty for automatic limits.");
            ui.separator();

            // ---- Colour map ----
            ui.strong("Colour map");
            egui::ComboBox::from_id_salt("colormap")
                .selected_text(state.colormap.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for map in ColorMapKind::ALL {
                        ui.selectable_value(&mut state.colormap, map, map.to_string());
                    }
                });
            colorbar(ui, state.colormap, color_range);
            ui.separator();

            // ---- Export frame range ----
            ui.strong("Animation frames");
            let range = &mut state.frame_range;
            egui::Grid::new("frame_range").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("start");
                ui.add(egui::DragValue::new(&mut range.start).range(1..=extent));
                ui.end_row();
                ui.label("stop");
                ui.add(egui::DragValue::new(&mut range.stop).range(1..=extent));
                ui.end_row();
                ui.label("step");
                ui.add(egui::DragValue::new(&mut range.step).range(1..=extent.max(1)));
                ui.end_row();
            });
            ui.checkbox(&mut range.ping_pong, "Ping-pong");
            let count = range.frames(extent).len();
            ui.label(format!("{count} frames"));
        });
}

/// Scale selector; returns true when the selection changed.
fn scale_combo(ui: &mut Ui, id: &str, mode: &mut ScaleMode) -> bool {
    let before = *mode;
    egui::ComboBox::from_id_salt(id)
        .selected_text(mode.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for candidate in ScaleMode::ALL {
                ui.selectable_value(mode, candidate, candidate.to_string());
            }
        });
    *mode != before
}

/// Horizontal colour bar with the effective range printed underneath.
fn colorbar(ui: &mut Ui, map: ColorMapKind, (low, high): (f64, f64)) {
    const STEPS: usize = 64;
    let width = ui.available_width().min(200.0);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 14.0), Sense::hover());
    let painter = ui.painter();
    let step_width = rect.width() / STEPS as f32;
    for n in 0..STEPS {
        let [r, g, b, _] = map.sample(n as f64 / (STEPS - 1) as f64);
        let x = rect.left() + n as f32 * step_width;
        let cell = Rect::from_min_max(
            egui::pos2(x, rect.top()),
            egui::pos2(x + step_width + 0.5, rect.bottom()),
        );
        painter.rect_filled(cell, 0.0, Color32::from_rgb(r, g, b));
    }
    ui.horizontal(|ui: &mut Ui| {
        ui.small(format_value(low));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            ui.small(format_value(high));
        });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.add_enabled_ui(state.session.is_some() && !state.exporting, |ui: &mut Ui| {
            ui.menu_button("Export", |ui: &mut Ui| {
                for format in [ExportFormat::Png, ExportFormat::Gif, ExportFormat::SpectrumCsv] {
                    if ui.button(format!("{format}…")).clicked() {
                        save_file_dialog(state, format);
                        ui.close_menu();
                    }
                }
            });
        });

        ui.separator();

        if let Some(name) = &state.source_name {
            ui.label(name);
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

pub fn status_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        match &state.session {
            Some(session) => ui.monospace(session.status_text()),
            None => ui.label("Ready"),
        };
        if let Some(export) = &state.export_status {
            ui.separator();
            if state.exporting {
                ui.spinner();
            }
            ui.label(export);
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open data cube")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

fn save_file_dialog(state: &mut AppState, format: ExportFormat) {
    let extension = format.extension();
    let default_name = match format {
        ExportFormat::SpectrumCsv => format!("spectrum.{extension}"),
        _ => format!("slice.{extension}"),
    };
    let file = rfd::FileDialog::new()
        .set_title(format!("Export {format}"))
        .add_filter(extension.to_uppercase(), &[extension])
        .set_file_name(default_name)
        .save_file();

    if let Some(path) = file {
        state.start_export(format, path);
    }
}
