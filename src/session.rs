use ndarray::Array2;

use crate::config::ViewerConfig;
use crate::cube::axis::{plane_axes, to_slice_coord, to_voxel};
use crate::cube::extract::{extract_slice, extract_spectrum};
use crate::cube::model::{Cube, SliceAxis, SliceCoord, Spectrum, Voxel};
use crate::cube::smooth::gaussian_smooth;
use crate::display::extent::FALLBACK_RANGE;
use crate::display::limits::ColorLimits;
use crate::display::scale::{apply_scale, apply_scale_values, ScaleMode};
use crate::error::ViewerError;

// ---------------------------------------------------------------------------
// Derived views – caches rebuilt by `ViewerSession::refresh`
// ---------------------------------------------------------------------------

/// Everything the UI draws, recomputed after every state change.
#[derive(Debug, Clone)]
pub struct DerivedViews {
    /// Displayed slice after smoothing and scaling; rows = u, columns = v.
    pub slice: Array2<f64>,
    /// Colour range for `slice`.
    pub color_range: (f64, f64),
    /// Scaled trace through the selected voxel.
    pub spectrum: Spectrum,
    /// Vertical range of the spectrum plot.
    pub spectrum_range: (f64, f64),
    /// Bumped on every refresh so the UI knows when to re-upload textures.
    pub generation: u64,
}

impl DerivedViews {
    fn empty() -> Self {
        Self {
            slice: Array2::zeros((0, 0)),
            color_range: FALLBACK_RANGE,
            spectrum: Spectrum::default(),
            spectrum_range: FALLBACK_RANGE,
            generation: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// ViewerSession – state + explicit recompute pipeline
// ---------------------------------------------------------------------------

/// Interactive state for one cube.
///
/// Every mutating method updates the state and then calls [`Self::refresh`],
/// which recomputes in a fixed order:
///
/// 1. clamp index / voxel into the cube
/// 2. extract the slice (axis mapper orientation)
/// 3. optional smoothing, then the image scale
/// 4. colour range from the limit policy
/// 5. extract, smooth and scale the spectrum
/// 6. spectrum range from the same policy
///
/// The voxel's component along the slice axis always equals the slice index,
/// so switching axis keeps the selected voxel in view.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    cube: Cube,
    axis: SliceAxis,
    index: usize,
    voxel: Voxel,
    image_scale: ScaleMode,
    spectrum_scale: ScaleMode,
    smoothing: bool,
    sigma: f64,
    limits: ColorLimits,
    view: DerivedViews,
}

impl ViewerSession {
    /// Start a session at the cube centre using the configured axis, scale and limits.
    pub fn new(cube: Cube, config: &ViewerConfig) -> Result<Self, ViewerError> {
        let axis = SliceAxis::try_from(config.axis)?;
        let voxel = cube.center();
        let mut session = Self {
            cube,
            axis,
            index: voxel.component(axis),
            voxel,
            image_scale: config.scale,
            spectrum_scale: config.scale,
            smoothing: false,
            sigma: config.sigma,
            limits: ColorLimits::initial(config.vmin, config.vmax),
            view: DerivedViews::empty(),
        };
        session.refresh()?;
        Ok(session)
    }

    // -- accessors --

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn axis(&self) -> SliceAxis {
        self.axis
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of slices along the current axis.
    pub fn extent(&self) -> usize {
        self.cube.extent(self.axis)
    }

    pub fn voxel(&self) -> Voxel {
        self.voxel
    }

    /// Selected voxel in slice coordinates.
    pub fn slice_coord(&self) -> SliceCoord {
        to_slice_coord(self.voxel, self.axis)
    }

    pub fn image_scale(&self) -> ScaleMode {
        self.image_scale
    }

    pub fn spectrum_scale(&self) -> ScaleMode {
        self.spectrum_scale
    }

    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn limits(&self) -> ColorLimits {
        self.limits
    }

    pub fn view(&self) -> &DerivedViews {
        &self.view
    }

    /// Raw (unsmoothed, unscaled) sample at the selected voxel.
    pub fn voxel_value(&self) -> f64 {
        self.cube.value_at(self.voxel).unwrap_or(f64::NAN)
    }

    /// Displayed value at the selected voxel.
    pub fn displayed_value(&self) -> f64 {
        let coord = self.slice_coord();
        self.view
            .slice
            .get([coord.u - 1, coord.v - 1])
            .copied()
            .unwrap_or(f64::NAN)
    }

    // -- navigation --

    /// Change the slice axis; the slice index follows the selected voxel.
    pub fn set_axis(&mut self, axis: u8) -> Result<(), ViewerError> {
        let axis = SliceAxis::try_from(axis)?;
        if axis == self.axis {
            return Ok(());
        }
        self.axis = axis;
        self.index = self.voxel.component(axis);
        self.refresh()
    }

    /// Jump to a slice; out-of-range requests are clamped.
    pub fn set_index(&mut self, index: i64) -> Result<(), ViewerError> {
        let extent = self.extent();
        let clamped = clamp_index(index, extent);
        if clamped as i64 != index {
            log::debug!("Clamped slice index {index} into 1..={extent}");
        }
        self.index = clamped;
        self.voxel = self.voxel.with_component(self.axis, clamped);
        self.refresh()
    }

    pub fn step_index(&mut self, delta: i64) -> Result<(), ViewerError> {
        self.set_index(self.index as i64 + delta)
    }

    /// Select a voxel; each component is clamped into the cube.
    pub fn select_voxel(&mut self, i: i64, j: i64, k: i64) -> Result<(), ViewerError> {
        let [nx, ny, nz] = self.cube.shape();
        self.voxel = Voxel::new(clamp_index(i, nx), clamp_index(j, ny), clamp_index(k, nz));
        self.index = self.voxel.component(self.axis);
        self.refresh()
    }

    /// Select a position in the current slice (e.g. from a click).
    pub fn select_slice_coord(&mut self, u: i64, v: i64) -> Result<(), ViewerError> {
        let (u_axis, v_axis) = plane_axes(self.axis);
        let coord = SliceCoord::new(
            clamp_index(u, self.cube.extent(u_axis)),
            clamp_index(v, self.cube.extent(v_axis)),
        );
        self.voxel = to_voxel(coord, self.axis, self.index);
        self.refresh()
    }

    // -- display settings --

    pub fn set_image_scale(&mut self, mode: ScaleMode) -> Result<(), ViewerError> {
        self.image_scale = mode;
        self.refresh()
    }

    /// Change the spectrum scale. Manual limits stay in force.
    pub fn set_spectrum_scale(&mut self, mode: ScaleMode) -> Result<(), ViewerError> {
        self.spectrum_scale = mode;
        self.refresh()
    }

    pub fn set_smoothing(&mut self, enabled: bool) -> Result<(), ViewerError> {
        self.smoothing = enabled;
        self.refresh()
    }

    pub fn toggle_smoothing(&mut self) -> Result<(), ViewerError> {
        self.set_smoothing(!self.smoothing)
    }

    /// "Apply limits" action. On a parse failure nothing changes.
    pub fn apply_limits(&mut self, low_text: &str, high_text: &str) -> Result<(), ViewerError> {
        self.limits.apply(low_text, high_text)?;
        self.refresh()
    }

    // -- pipeline --

    fn refresh(&mut self) -> Result<(), ViewerError> {
        self.index = self.index.clamp(1, self.extent());
        self.voxel = self.voxel.with_component(self.axis, self.index);

        let raw = extract_slice(&self.cube, self.axis.number(), self.index)?;
        let filtered = if self.smoothing {
            gaussian_smooth(&raw, self.sigma)
        } else {
            raw
        };
        let slice = apply_scale(&filtered, self.image_scale);
        let color_range = self.limits.effective_range(&slice);

        let trace = extract_spectrum(&self.cube, self.voxel, self.axis.number())?;
        let trace = if self.smoothing {
            trace.smoothed(self.sigma)
        } else {
            trace
        };
        let spectrum = trace.with_values(apply_scale_values(&trace.values, self.spectrum_scale));
        let spectrum_range = self.limits.spectrum_range(&spectrum.values);

        self.view = DerivedViews {
            slice,
            color_range,
            spectrum,
            spectrum_range,
            generation: self.view.generation + 1,
        };
        log::debug!(
            "Refreshed axis {} slice {} voxel {} range {:?}",
            self.axis,
            self.index,
            self.voxel,
            color_range
        );
        Ok(())
    }

    /// One-line summary for the status bar.
    pub fn status_text(&self) -> String {
        let (low, high) = self.view.color_range;
        let mode = if self.limits.is_manual() { "manual" } else { "auto" };
        format!(
            "axis {} | slice {}/{} | voxel {} | value {} | range [{:.4e}, {:.4e}] ({mode}){}",
            self.axis,
            self.index,
            self.extent(),
            self.voxel,
            format_value(self.voxel_value()),
            low,
            high,
            if self.smoothing { " | smoothed" } else { "" },
        )
    }
}

/// Clamp a possibly out-of-range 1-based request into `[1, extent]`.
pub fn clamp_index(index: i64, extent: usize) -> usize {
    index.clamp(1, extent.max(1) as i64) as usize
}

/// Compact number formatting for labels.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value != 0.0 && (value.abs() >= 1e4 || value.abs() < 1e-3) {
        format!("{value:.3e}")
    } else {
        format!("{value:.4}")
    }
}
