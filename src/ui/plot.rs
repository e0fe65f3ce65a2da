use eframe::egui::{Color32, TextureHandle, Ui};
use egui_plot::{HLine, Line, Plot, PlotBounds, PlotImage, PlotPoint, PlotPoints, Points, VLine};

use crate::cube::axis::plane_axes;
use crate::cube::model::{SliceAxis, Spectrum};
use crate::state::AppState;

/// Consecutive finite samples of a trace as plot points.
///
/// NaN samples (e.g. non-positive values in log scale) have no display value,
/// so they split the trace instead of being bridged.
pub fn finite_runs(spectrum: &Spectrum) -> Vec<Vec<[f64; 2]>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (position, value) in spectrum.iter() {
        if value.is_finite() {
            current.push([position as f64, value]);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Axis label used on both plots.
pub fn dim_label(axis: SliceAxis) -> String {
    format!("dim {axis}")
}

// ---------------------------------------------------------------------------
// Slice image (upper central panel)
// ---------------------------------------------------------------------------

/// Render the current slice; a click selects the voxel under the pointer.
pub fn slice_view(ui: &mut Ui, state: &mut AppState, texture: Option<&TextureHandle>) {
    let Some(session) = &state.session else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a cube to view slices  (File → Open…)");
        });
        return;
    };

    let (u_axis, v_axis) = plane_axes(session.axis());
    let (nu, nv) = session.view().slice.dim();
    let coord = session.slice_coord();

    let response = Plot::new("slice_plot")
        .data_aspect(1.0)
        .x_axis_label(dim_label(u_axis))
        .y_axis_label(dim_label(v_axis))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if let Some(texture) = texture {
                // pixel centres sit on integer (u, v)
                let centre = PlotPoint::new((nu as f64 + 1.0) / 2.0, (nv as f64 + 1.0) / 2.0);
                plot_ui.image(PlotImage::new(
                    texture.id(),
                    centre,
                    [nu as f32, nv as f32],
                ));
            }
            plot_ui.vline(VLine::new(coord.u as f64).color(Color32::WHITE).width(1.0));
            plot_ui.hline(HLine::new(coord.v as f64).color(Color32::WHITE).width(1.0));
            plot_ui.pointer_coordinate()
        });

    if response.response.clicked() {
        if let Some(pointer) = response.inner {
            let (u, v) = (pointer.x.round() as i64, pointer.y.round() as i64);
            state.update_session(|s| s.select_slice_coord(u, v));
        }
    }
}

// ---------------------------------------------------------------------------
// Spectrum plot (lower central panel)
// ---------------------------------------------------------------------------

/// Render the trace through the selected voxel with a marker at the slice index.
pub fn spectrum_view(ui: &mut Ui, state: &AppState) {
    let Some(session) = &state.session else {
        return;
    };

    let view = session.view();
    let (low, high) = view.spectrum_range;
    let extent = view.spectrum.len() as f64;

    let runs = finite_runs(&view.spectrum);
    let y_label = format!("value ({})", session.spectrum_scale());

    Plot::new("spectrum_plot")
        .x_axis_label(dim_label(session.axis()))
        .y_axis_label(y_label)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            let name = format!("voxel {}", session.voxel());
            for run in runs {
                if let [point] = run.as_slice() {
                    plot_ui.points(
                        Points::new(vec![*point])
                            .name(&name)
                            .color(Color32::LIGHT_BLUE)
                            .radius(2.0),
                    );
                } else {
                    plot_ui.line(
                        Line::new(PlotPoints::from(run))
                            .name(&name)
                            .color(Color32::LIGHT_BLUE)
                            .width(1.5),
                    );
                }
            }
            plot_ui.vline(
                VLine::new(session.index() as f64)
                    .color(Color32::GRAY)
                    .width(1.0),
            );
            if low.is_finite() && high.is_finite() {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [0.5, low],
                    [extent + 0.5, high],
                ));
            }
        });
}
