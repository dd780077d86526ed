// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod app;
mod config;
mod map;
mod state;
mod status;
mod ui;

use clap::Parser;
use eframe::egui;
use log::{info, warn};

use app::GeoportalApp;
use config::AppConfig;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "geoportal-desktop", version, about)]
struct Args {
    /// Base URL or directory holding the overlay files (overrides the config file)
    #[arg(long)]
    data_root: Option<String>,

    /// Initial zoom level (overrides the config file)
    #[arg(long)]
    zoom: Option<f64>,

    /// Ignore the config file and start with built-in defaults
    #[arg(long, default_value_t = false)]
    defaults: bool,

    /// Print the config file location and exit
    #[arg(long, default_value_t = false)]
    print_config_path: bool,
}

fn load_config(args: &Args) -> AppConfig {
    let mut config = if args.defaults {
        AppConfig::default()
    } else {
        AppConfig::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {e}");
            AppConfig::default()
        })
    };

    if let Some(data_root) = &args.data_root {
        config.data_root.clone_from(data_root);
    }
    if let Some(zoom) = args.zoom {
        config.initial_zoom = zoom;
    }
    config.sanitized()
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.print_config_path {
        match AppConfig::get_config_path() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => eprintln!("Could not resolve config path: {e}"),
        }
        return Ok(());
    }

    let config = load_config(&args);
    info!(
        "Starting Geoportal Desktop ({} overlays from {})",
        config.overlays.len(),
        config.data_root()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_title("Geoportal Balneário Camboriú"),
        ..Default::default()
    };

    eframe::run_native(
        "Geoportal Desktop",
        options,
        Box::new(move |cc| Ok(Box::new(GeoportalApp::new(cc, &config)))),
    )
}
