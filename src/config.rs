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

//! Application configuration management.
//!
//! Configuration is read from a TOML file through confy. Every field has a
//! serde default, so a partial or missing file yields a working setup. The
//! file is only read; UI state is never written back.

use std::path::PathBuf;
use std::time::Duration;

use overlay_kit::{default_sources, DataRoot, OverlaySource};
use serde::{Deserialize, Serialize};

use crate::map::BaseLayer;

pub const APP_NAME: &str = "geoportal-desktop";
const CONFIG_NAME: &str = "config";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Base URL (`http(s)://...`) or local directory holding the overlay files
    #[serde(default = "default_data_root")]
    pub data_root: String,

    /// Overlay files and their layer labels, in load order
    #[serde(default = "default_sources")]
    pub overlays: Vec<OverlaySource>,

    /// Initial map center latitude
    #[serde(default = "default_latitude")]
    pub initial_latitude: f64,

    /// Initial map center longitude
    #[serde(default = "default_longitude")]
    pub initial_longitude: f64,

    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub initial_zoom: f64,

    /// Base layer selected at startup
    #[serde(default)]
    pub default_base_layer: BaseLayer,

    /// Starting opacity of the informal urban nucleus overlay (0.0 - 1.0)
    #[serde(default = "default_nui_opacity")]
    pub initial_nui_opacity: f32,

    /// Delay before the first attempt to attach the opacity slider
    #[serde(default = "default_opacity_control_delay_ms")]
    pub opacity_control_delay_ms: u64,

    /// Tile cache directory; defaults to the user cache dir
    #[serde(default)]
    pub tile_cache: Option<PathBuf>,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_data_root() -> String {
    "data".to_string()
}

fn default_latitude() -> f64 {
    -27.010_564
}

fn default_longitude() -> f64 {
    -48.601_37
}

fn default_zoom() -> f64 {
    14.0
}

fn default_nui_opacity() -> f32 {
    0.6
}

fn default_opacity_control_delay_ms() -> u64 {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            data_root: default_data_root(),
            overlays: default_sources(),
            initial_latitude: default_latitude(),
            initial_longitude: default_longitude(),
            initial_zoom: default_zoom(),
            default_base_layer: BaseLayer::default(),
            initial_nui_opacity: default_nui_opacity(),
            opacity_control_delay_ms: default_opacity_control_delay_ms(),
            tile_cache: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk. confy creates the file with defaults
    /// when it does not exist yet.
    pub fn load() -> Result<Self, confy::ConfyError> {
        let config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;
        Ok(config.sanitized())
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    pub fn data_root(&self) -> DataRoot {
        DataRoot::new(&self.data_root)
    }

    pub fn opacity_control_delay(&self) -> Duration {
        Duration::from_millis(self.opacity_control_delay_ms)
    }

    pub fn tile_cache_dir(&self) -> PathBuf {
        self.tile_cache.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join(APP_NAME)
                .join("tiles")
        })
    }

    /// Clamp values a hand-edited file could push out of range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if !self.initial_nui_opacity.is_finite() {
            self.initial_nui_opacity = default_nui_opacity();
        }
        self.initial_nui_opacity = self.initial_nui_opacity.clamp(0.0, 1.0);
        if !self.initial_zoom.is_finite() {
            self.initial_zoom = default_zoom();
        }
        self.initial_zoom = self.initial_zoom.clamp(0.0, 19.0);
        self
    }
}
