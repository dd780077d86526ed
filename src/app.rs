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

use std::time::Instant;

use eframe::egui;
use log::{error, info, warn};
use overlay_kit::{LoadEvent, Loader};
use tokio::sync::mpsc;
use walkers::{lon_lat, Map, MapMemory, Position};

use crate::config::AppConfig;
use crate::map::{BaseMaps, OverlayPlugin};
use crate::state::AppState;
use crate::status::DiagnosticLevel;

pub struct GeoportalApp {
    state: AppState,
    events: mpsc::UnboundedReceiver<LoadEvent>,
    base_maps: BaseMaps,
    map_memory: MapMemory,
    home: Position,
    data_root: String,
}

impl GeoportalApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig) -> Self {
        let ctx = cc.egui_ctx.clone();
        let mut state = AppState::new(config, Instant::now());

        // Overlay loading runs on its own thread; the map is usable right away
        let events = match Loader::new(config.data_root()) {
            Ok(loader) => {
                let repaint_ctx = ctx.clone();
                loader.spawn_background(config.overlays.clone(), move || repaint_ctx.request_repaint())
            }
            Err(e) => {
                error!("Overlay loader unavailable: {e}");
                state
                    .journal
                    .add_diagnostic(DiagnosticLevel::Error, format!("Carregador indisponível: {e}"));
                let (_tx, rx) = mpsc::unbounded_channel();
                rx
            }
        };

        let cache_dir = config.tile_cache_dir();
        info!("Tile cache: {}", cache_dir.display());

        let mut map_memory = MapMemory::default();
        if map_memory.set_zoom(config.initial_zoom).is_err() {
            warn!("Initial zoom {} is out of range, keeping default", config.initial_zoom);
        }

        Self {
            state,
            events,
            base_maps: BaseMaps::new(&ctx, &cache_dir),
            map_memory,
            home: lon_lat(config.initial_longitude, config.initial_latitude),
            data_root: config.data_root().to_string(),
        }
    }

    fn drain_load_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.state.handle_load_event(event);
        }
    }

    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        if let Some(wait) = self.state.ui.opacity_control.next_attempt_in(now) {
            ctx.request_repaint_after(wait);
        }
    }
}

impl eframe::App for GeoportalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.state.tick(now);
        self.drain_load_events();
        self.schedule_repaint(ctx, now);

        let state = &mut self.state;
        state.ui.sidebar.render(ctx, &state.journal, &self.data_root);

        let actions = state.ui.layers_control.render(
            ctx,
            state.base_layer,
            &state.registry,
            state.opacity,
            state.ui.opacity_control.is_attached(),
        );
        state.ui.legends.render(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let tiles = self.base_maps.tiles_mut(state.base_layer);
                let map = Map::new(Some(tiles), &mut self.map_memory, self.home)
                    .with_plugin(OverlayPlugin::new(&state.registry, &mut state.popup));
                ui.add(map);
            });

        for action in actions {
            state.apply(action);
        }
    }
}
