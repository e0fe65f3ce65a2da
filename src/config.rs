use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::color::ColorMapKind;
use crate::display::scale::ScaleMode;

/// Window size used when neither the config file nor the CLI sets one.
pub const DEFAULT_FIGURE_SIZE: [f32; 2] = [1200.0, 800.0];

// ---------------------------------------------------------------------------
// Session configuration
// ---------------------------------------------------------------------------

/// Settings read once at session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Initial scale mode for both the image and the spectrum.
    pub scale: ScaleMode,
    /// Lower colour limit; with `vmax` the session starts in manual mode.
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    /// Initial slice axis (1, 2 or 3).
    pub axis: u8,
    /// Window size in logical points.
    pub figure_size: Option<[f32; 2]>,
    /// Gaussian smoothing width in voxels.
    pub sigma: f64,
    pub colormap: ColorMapKind,
    /// Delay between animated export frames.
    pub frame_delay_ms: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scale: ScaleMode::Linear,
            vmin: None,
            vmax: None,
            axis: 3,
            figure_size: None,
            sigma: 1.0,
            colormap: ColorMapKind::Viridis,
            frame_delay_ms: 100,
        }
    }
}

impl ViewerConfig {
    /// Explicit figure size, else [`DEFAULT_FIGURE_SIZE`].
    pub fn figure_size(&self) -> [f32; 2] {
        self.figure_size.unwrap_or(DEFAULT_FIGURE_SIZE)
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Reject values the viewer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            bail!("smoothing sigma must be a finite number > 0, got {}", self.sigma);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Slice and spectrum viewer for 3D data cubes.
#[derive(Debug, Parser)]
#[command(name = "rusty-cube")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Cube to open on startup (.parquet, .json or .csv)
    pub file: Option<PathBuf>,

    /// JSON config file; command-line flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Slice axis (1, 2 or 3)
    #[arg(long)]
    pub axis: Option<u8>,

    /// Display scale for image and spectrum
    #[arg(long, value_enum)]
    pub scale: Option<ScaleMode>,

    /// Lower colour limit
    #[arg(long, allow_hyphen_values = true)]
    pub vmin: Option<f64>,

    /// Upper colour limit
    #[arg(long, allow_hyphen_values = true)]
    pub vmax: Option<f64>,

    /// Window size in logical points
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    pub figsize: Option<Vec<f32>>,

    /// Gaussian smoothing width in voxels
    #[arg(long, allow_hyphen_values = true)]
    pub sigma: Option<f64>,

    /// Colour map
    #[arg(long, value_enum)]
    pub colormap: Option<ColorMapKind>,

    /// Delay between animated export frames in milliseconds
    #[arg(long)]
    pub frame_delay: Option<u32>,
}

impl CliArgs {
    /// Config file (if any) with command-line overrides applied.
    pub fn resolve(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::from_json_file(path)?,
            None => ViewerConfig::default(),
        };
        if let Some(axis) = self.axis {
            config.axis = axis;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if self.vmin.is_some() {
            config.vmin = self.vmin;
        }
        if self.vmax.is_some() {
            config.vmax = self.vmax;
        }
        if let Some([w, h]) = self.figsize.as_deref() {
            config.figure_size = Some([*w, *h]);
        }
        if let Some(sigma) = self.sigma {
            config.sigma = sigma;
        }
        if let Some(colormap) = self.colormap {
            config.colormap = colormap;
        }
        if let Some(delay) = self.frame_delay {
            config.frame_delay_ms = delay;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.axis, 3);
        assert_eq!(config.scale, ScaleMode::Linear);
        assert_eq!(config.figure_size(), DEFAULT_FIGURE_SIZE);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = CliArgs::try_parse_from([
            "rusty-cube",
            "cube.parquet",
            "--axis",
            "1",
            "--scale",
            "log10",
            "--vmin",
            "-2.5",
            "--vmax",
            "4",
            "--figsize",
            "640",
            "480",
        ])
        .unwrap();
        let config = cli.resolve().unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("cube.parquet")));
        assert_eq!(config.axis, 1);
        assert_eq!(config.scale, ScaleMode::Log10);
        assert_eq!(config.vmin, Some(-2.5));
        assert_eq!(config.vmax, Some(4.0));
        assert_eq!(config.figure_size(), [640.0, 480.0]);
    }

    #[test]
    fn test_json_file_with_cli_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"scale": "ln", "sigma": 2.0, "colormap": "magma"}}"#).unwrap();

        let path = file.path().to_string_lossy().to_string();
        let cli = CliArgs::try_parse_from(["rusty-cube", "--config", &path, "--sigma", "0.5"])
            .unwrap();
        let config = cli.resolve().unwrap();
        assert_eq!(config.scale, ScaleMode::Ln);
        assert_eq!(config.colormap, ColorMapKind::Magma);
        assert_eq!(config.sigma, 0.5);
        assert_eq!(config.axis, 3);
    }

    #[test]
    fn test_cli_rejects_unusable_sigma() {
        for sigma in ["inf", "NaN", "0", "-1.5"] {
            let cli = CliArgs::try_parse_from(["rusty-cube", "--sigma", sigma]).unwrap();
            let err = cli.resolve().unwrap_err();
            assert!(err.to_string().contains("sigma"), "{sigma}: {err}");
        }
    }

    #[test]
    fn test_config_file_rejects_unusable_sigma() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sigma": -2.0}}"#).unwrap();
        let err = ViewerConfig::from_json_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("sigma must be a finite number"));
    }

    #[test]
    fn test_bad_config_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = ViewerConfig::from_json_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}
