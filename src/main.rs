mod app;
mod color;
mod config;
mod cube;
mod display;
mod error;
mod export;
mod session;
mod state;
mod ui;

use anyhow::anyhow;
use app::CubeViewerApp;
use clap::Parser;
use config::CliArgs;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let config = args.resolve()?;
    log::debug!("Resolved configuration: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.figure_size())
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let file = args.file.clone();
    eframe::run_native(
        "Rusty Cube – Slice Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(CubeViewerApp::new(config, file)))),
    )
    .map_err(|e| anyhow!("viewer terminated: {e}"))
}
