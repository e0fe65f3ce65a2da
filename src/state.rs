use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};

use crate::color::ColorMapKind;
use crate::config::ViewerConfig;
use crate::cube::loader::load_file;
use crate::cube::model::Cube;
use crate::display::frames::FrameRange;
use crate::error::ViewerError;
use crate::export::{spawn_export, ExportFormat, ExportJob, ExportMessage};
use crate::session::ViewerSession;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Startup configuration; reused when a new cube is opened.
    pub config: ViewerConfig,

    /// Active viewing session (None until a cube is loaded).
    pub session: Option<ViewerSession>,

    /// Bumped for every new session so cached textures are dropped.
    pub session_serial: u64,

    /// File name of the loaded cube.
    pub source_name: Option<String>,

    /// Colour-limit text fields, applied with the "Apply" button.
    pub low_text: String,
    pub high_text: String,

    /// Slice range for animated export.
    pub frame_range: FrameRange,

    /// Active colour map.
    pub colormap: ColorMapKind,

    /// Error / warning message shown in the UI.
    pub status_message: Option<String>,

    /// Progress or result of the last export.
    pub export_status: Option<String>,

    /// Whether an export worker is running.
    pub exporting: bool,

    export_rx: Option<Receiver<ExportMessage>>,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        let bound_text = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        let (low_text, high_text) = match (config.vmin, config.vmax) {
            (Some(_), Some(_)) => (bound_text(config.vmin), bound_text(config.vmax)),
            _ => (String::new(), String::new()),
        };
        Self {
            colormap: config.colormap,
            config,
            session: None,
            session_serial: 0,
            source_name: None,
            low_text,
            high_text,
            frame_range: FrameRange::full(1),
            status_message: None,
            export_status: None,
            exporting: false,
            export_rx: None,
        }
    }

    /// Start a session on a freshly loaded cube.
    pub fn set_cube(&mut self, cube: Cube, name: String) {
        match ViewerSession::new(cube, &self.config) {
            Ok(session) => {
                self.frame_range = FrameRange::full(session.extent());
                self.session = Some(session);
                self.session_serial += 1;
                self.source_name = Some(name);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Cannot start session: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Load a cube file and start a session on it.
    pub fn open_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(cube) => {
                log::info!("Loaded cube {:?} from {}", cube.shape(), path.display());
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.set_cube(cube, name);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Run a session operation, surfacing failures as a warning.
    pub fn update_session<F>(&mut self, op: F)
    where
        F: FnOnce(&mut ViewerSession) -> Result<(), ViewerError>,
    {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match op(session) {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(format!("Warning: {e}"));
            }
        }
    }

    /// "Apply" button for the colour-limit fields.
    pub fn apply_limits(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.apply_limits(&self.low_text, &self.high_text) {
            Ok(()) => {
                self.status_message = None;
                if !session.limits().is_manual() {
                    self.low_text.clear();
                    self.high_text.clear();
                }
            }
            Err(e) => self.status_message = Some(format!("Warning: {e}")),
        }
    }

    /// Snapshot the session and hand it to a background export worker.
    pub fn start_export(&mut self, format: ExportFormat, path: PathBuf) {
        let Some(session) = &self.session else {
            return;
        };
        if self.exporting {
            self.status_message = Some("An export is already running".to_string());
            return;
        }
        let frames = self.frame_range.frames(session.extent());
        let target_size = self.config.figure_size()[1].max(1.0) as u32;
        let job = ExportJob::snapshot(
            session,
            format,
            path,
            frames,
            self.colormap,
            self.config.frame_delay_ms,
            target_size,
        );
        let (tx, rx) = channel();
        let _worker = spawn_export(job, tx);
        self.export_rx = Some(rx);
        self.exporting = true;
        self.export_status = Some(format!("Exporting {format}…"));
    }

    /// Drain worker messages; call once per frame.
    pub fn poll_export(&mut self) {
        let Some(rx) = &self.export_rx else {
            return;
        };
        let messages: Vec<ExportMessage> = rx.try_iter().collect();
        let mut finished = false;
        for message in messages {
            match message {
                ExportMessage::Progress(fraction, text) => {
                    self.export_status =
                        Some(format!("Exporting… {text} ({:.0}%)", fraction * 100.0));
                }
                ExportMessage::Done(path) => {
                    self.export_status = Some(format!("Saved {}", path.display()));
                    finished = true;
                }
                ExportMessage::Failed(err) => {
                    self.export_status = None;
                    self.status_message = Some(format!("Export failed: {err}"));
                    finished = true;
                }
            }
        }
        if finished {
            self.export_rx = None;
            self.exporting = false;
        }
    }
}
