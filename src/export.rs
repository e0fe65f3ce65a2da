use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use anyhow::{bail, Context, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, Frame, ImageFormat, RgbaImage};
use serde::Serialize;

use crate::color::{colorize, ColorMapKind};
use crate::cube::extract::extract_slice;
use crate::cube::model::{Cube, SliceAxis, Spectrum};
use crate::cube::smooth::gaussian_smooth;
use crate::display::scale::{apply_scale, ScaleMode};
use crate::session::ViewerSession;

// ---------------------------------------------------------------------------
// Export formats
// ---------------------------------------------------------------------------

/// What an export request writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Current slice as a PNG image.
    Png,
    /// Animated GIF, one frame per slice index.
    Gif,
    /// Current spectrum as `position,value` rows.
    SpectrumCsv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Gif => "gif",
            ExportFormat::SpectrumCsv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Png => write!(f, "PNG image"),
            ExportFormat::Gif => write!(f, "GIF animation"),
            ExportFormat::SpectrumCsv => write!(f, "spectrum CSV"),
        }
    }
}

/// Messages sent from the export worker to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportMessage {
    /// Fraction done and a short description.
    Progress(f32, String),
    Done(PathBuf),
    Failed(String),
}

// ---------------------------------------------------------------------------
// Export job – snapshot taken at submission
// ---------------------------------------------------------------------------

/// Everything the worker needs, copied out of the session once.
///
/// The worker never looks at the live session, so the user can keep
/// navigating while a long export runs.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub format: ExportFormat,
    pub path: PathBuf,
    pub cube: Cube,
    pub axis: SliceAxis,
    pub frames: Vec<usize>,
    pub scale: ScaleMode,
    /// Colour range fixed for every frame.
    pub range: (f64, f64),
    /// Smoothing width, `None` when smoothing is off.
    pub sigma: Option<f64>,
    pub colormap: ColorMapKind,
    pub frame_delay_ms: u32,
    /// Longest image side in pixels; small slices are upscaled (nearest).
    pub target_size: u32,
    pub spectrum: Spectrum,
}

impl ExportJob {
    /// Snapshot the session. `frames` is used by [`ExportFormat::Gif`]; the
    /// other formats use the current slice.
    pub fn snapshot(
        session: &ViewerSession,
        format: ExportFormat,
        path: PathBuf,
        frames: Vec<usize>,
        colormap: ColorMapKind,
        frame_delay_ms: u32,
        target_size: u32,
    ) -> Self {
        let frames = match format {
            ExportFormat::Gif => frames,
            ExportFormat::Png | ExportFormat::SpectrumCsv => vec![session.index()],
        };
        Self {
            format,
            path,
            cube: session.cube().clone(),
            axis: session.axis(),
            frames,
            scale: session.image_scale(),
            range: session.view().color_range,
            sigma: session.smoothing().then_some(session.sigma()),
            colormap,
            frame_delay_ms,
            target_size,
            spectrum: session.view().spectrum.clone(),
        }
    }

    /// Render one slice index exactly as the viewer would.
    pub fn render_frame(&self, index: usize) -> Result<RgbaImage> {
        let raw = extract_slice(&self.cube, self.axis.number(), index)
            .with_context(|| format!("extracting slice {index}"))?;
        let filtered = match self.sigma {
            Some(sigma) => gaussian_smooth(&raw, sigma),
            None => raw,
        };
        let scaled = apply_scale(&filtered, self.scale);
        Ok(upscale(colorize(&scaled, self.range, self.colormap), self.target_size))
    }
}

/// Integer nearest-neighbour upscale so the longest side approaches `target`.
fn upscale(img: RgbaImage, target: u32) -> RgbaImage {
    let longest = img.width().max(img.height()).max(1);
    let factor = (target / longest).max(1);
    if factor == 1 {
        return img;
    }
    imageops::resize(
        &img,
        img.width() * factor,
        img.height() * factor,
        FilterType::Nearest,
    )
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Run `job` on a background thread, reporting through `tx`.
pub fn spawn_export(job: ExportJob, tx: Sender<ExportMessage>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let message = match run_export(&job, &tx) {
            Ok(path) => {
                log::info!("Exported {} to {}", job.format, path.display());
                ExportMessage::Done(path)
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                ExportMessage::Failed(format!("{e:#}"))
            }
        };
        let _ = tx.send(message);
    })
}

/// Write the export synchronously; progress goes to `tx`.
pub fn run_export(job: &ExportJob, tx: &Sender<ExportMessage>) -> Result<PathBuf> {
    match job.format {
        ExportFormat::Png => write_png(job)?,
        ExportFormat::Gif => write_gif(job, tx)?,
        ExportFormat::SpectrumCsv => write_spectrum_csv(&job.spectrum, &job.path)?,
    }
    Ok(job.path.clone())
}

fn write_png(job: &ExportJob) -> Result<()> {
    let Some(&index) = job.frames.first() else {
        bail!("no slice to export");
    };
    job.render_frame(index)?
        .save_with_format(&job.path, ImageFormat::Png)
        .with_context(|| format!("writing {}", job.path.display()))
}

fn write_gif(job: &ExportJob, tx: &Sender<ExportMessage>) -> Result<()> {
    if job.frames.is_empty() {
        bail!("frame range is empty: start must not exceed stop");
    }
    let file = File::create(&job.path)
        .with_context(|| format!("creating {}", job.path.display()))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder
        .set_repeat(Repeat::Infinite)
        .context("configuring GIF loop")?;

    let total = job.frames.len();
    for (n, &index) in job.frames.iter().enumerate() {
        let img = job.render_frame(index)?;
        let delay = Delay::from_numer_denom_ms(job.frame_delay_ms, 1);
        encoder
            .encode_frame(Frame::from_parts(img, 0, 0, delay))
            .with_context(|| format!("encoding frame for slice {index}"))?;
        let _ = tx.send(ExportMessage::Progress(
            (n + 1) as f32 / total as f32,
            format!("frame {}/{total}", n + 1),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct SpectrumRow {
    position: usize,
    value: f64,
}

/// Write `position,value` rows.
pub fn write_spectrum_csv(spectrum: &Spectrum, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for (position, value) in spectrum.iter() {
        writer
            .serialize(SpectrumRow { position, value })
            .context("writing spectrum row")?;
    }
    writer.flush().context("flushing spectrum CSV")?;
    Ok(())
}
