//! # Overlay Frontend
//!
//! A thin viewer for the multi-party landmark overlay: it subscribes to the
//! overlay channels like any other participant would, and draws every
//! participant's point cloud with their display colour. It shares **types**
//! with the backend library so the two processes remain "in sync", but runs
//! no detection or publishing of its own.
use clap::Parser;

use env_logger::Env;
use log::debug;
use model::Model;

mod cli;
mod model;
mod ui;

use cli::Cli;

fn main() -> Result<(), eframe::Error> {
    let cli = Cli::parse();

    // Initialize the logger from the environment

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level))
        .filter_module("paho_mqtt", log::LevelFilter::Warn)
        .filter_module("winit", log::LevelFilter::Warn)
        .filter_module("eframe", log::LevelFilter::Warn)
        .init();

    debug!("Started; args: {:?}", cli);

    let options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(1280.0, 960.0)),
        ..Default::default()
    };
    eframe::run_native(
        "Tether Face Overlay",
        options,
        Box::new(|_cc| Box::<Model>::default()),
    )
}
