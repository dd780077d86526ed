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

//! Session state mutated on the UI thread.
//!
//! Everything here is plain data driven by load events and user actions, so
//! it can be exercised without a window.

use std::time::Instant;

use log::{debug, info};
use overlay_kit::{
    informal_nucleus_style, LoadEvent, OverlayDocument, OverlayEvent, OverlayLayer,
    OverlayRegistry, OverlaySource, RegistryError, StylePatch, INFORMAL_NUCLEUS,
};

use crate::config::AppConfig;
use crate::map::BaseLayer;
use crate::status::LoadJournal;
use crate::ui::{Attachment, LayersAction, OpacityState, Popup, UiCoordinator};

pub struct AppState {
    pub registry: OverlayRegistry,
    pub opacity: OpacityState,
    pub ui: UiCoordinator,
    pub base_layer: BaseLayer,
    pub popup: Option<Popup>,
    pub journal: LoadJournal,
}

impl AppState {
    pub fn new(config: &AppConfig, now: Instant) -> Self {
        Self {
            registry: OverlayRegistry::new(),
            opacity: OpacityState::new(config.initial_nui_opacity),
            ui: UiCoordinator::new(now, config.opacity_control_delay()),
            base_layer: config.default_base_layer,
            popup: None,
            journal: LoadJournal::new(config.overlays.len()),
        }
    }

    /// Run once per frame before load events are drained.
    pub fn tick(&mut self, now: Instant) -> Attachment {
        self.ui.reconcile_opacity_control(now)
    }

    pub fn handle_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Loaded { source, document } => {
                let label = source.label.clone();
                let features = document.len();
                match self.register(source, document) {
                    Ok(()) => self.journal.record_loaded(&label, features),
                    Err(RegistryError::Duplicate(_)) => self.journal.record_rejected(&label),
                }
            }
            LoadEvent::Failed { source, error } => {
                self.journal.record_failed(&source.label, &error);
            }
            LoadEvent::Finished(summary) => {
                debug!("Loader totals: {summary:?}");
                info!(
                    "Overlay loading finished: {} registered, {} failed",
                    self.registry.len(),
                    self.journal.failed()
                );
                self.journal.finish();
            }
        }
    }

    /// Register a loaded overlay and let the UI know about it.
    ///
    /// The informal nucleus overlay is styled from the current opacity and
    /// shown right away; every other overlay starts hidden.
    pub fn register(
        &mut self,
        source: OverlaySource,
        document: OverlayDocument,
    ) -> Result<(), RegistryError> {
        let is_nucleus = source.label == INFORMAL_NUCLEUS;
        let mut layer = OverlayLayer::new(source, document);
        if is_nucleus {
            layer = layer.with_style(informal_nucleus_style(self.opacity.get()));
        }

        let label = self.registry.register(layer)?.label().to_string();
        self.ui.on_registered(&label);
        if is_nucleus {
            self.set_overlay_active(&label, true);
        }
        Ok(())
    }

    /// Show or hide an overlay, forwarding the resulting event to the UI.
    pub fn set_overlay_active(&mut self, label: &str, active: bool) -> Option<OverlayEvent> {
        let event = self.registry.set_active(label, active)?;
        debug!("Overlay event {event:?}");
        self.ui.on_overlay_event(&event);
        Some(event)
    }

    /// Update the opacity state and restyle the informal nucleus overlay.
    pub fn set_opacity(&mut self, value: f32) {
        self.opacity.set(value);
        if let Some(layer) = self.registry.get_mut(INFORMAL_NUCLEUS) {
            layer.apply_patch(&StylePatch::opacity(self.opacity.get()));
        }
    }

    pub fn select_base_layer(&mut self, layer: BaseLayer) {
        if self.base_layer != layer {
            info!("Base layer: {}", layer.display_name());
            self.base_layer = layer;
        }
    }

    pub fn apply(&mut self, action: LayersAction) {
        match action {
            LayersAction::SelectBase(layer) => self.select_base_layer(layer),
            LayersAction::SetOverlay { label, active } => {
                self.set_overlay_active(&label, active);
            }
            LayersAction::SetOpacity(value) => self.set_opacity(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use eframe::egui;
    use overlay_kit::style::rules::{GEOLOGY, LAND_USE, STATES, VEGETATION};
    use overlay_kit::{Coord, DataRoot, Feature, LoadError, Loader, LoadSummary};
    use uuid::Uuid;

    use super::*;
    use crate::map::overlay_plugin::popup_for_click;
    use crate::ui::popup::PopupContent;

    const POLYGON_DOC: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"nome": "teste"},
         "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}}
    ]}"#;

    fn test_config(overlays: Vec<OverlaySource>) -> AppConfig {
        AppConfig {
            overlays,
            opacity_control_delay_ms: 60_000,
            ..AppConfig::default()
        }
    }

    fn document() -> OverlayDocument {
        OverlayDocument::parse(POLYGON_DOC).unwrap()
    }

    fn source(label: &str) -> OverlaySource {
        OverlaySource::new(format!("{label}.geojson"), label)
    }

    fn first_feature(state: &AppState, label: &str) -> Feature {
        state.registry.get(label).unwrap().document.features[0].clone()
    }

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!("geoportal-state-{}", Uuid::new_v4()));
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_nucleus_is_auto_activated_with_current_opacity() {
        let start = Instant::now();
        let mut state = AppState::new(&test_config(vec![]), start);

        state.register(source(INFORMAL_NUCLEUS), document()).unwrap();
        state.register(source(LAND_USE), document()).unwrap();

        let nucleus = state.registry.get(INFORMAL_NUCLEUS).unwrap();
        assert!(nucleus.is_active());
        let style = nucleus.feature_style(&first_feature(&state, INFORMAL_NUCLEUS));
        assert_eq!(style.fill_color.to_string(), "#ff0000");
        assert!((style.fill_opacity - 0.6).abs() < f32::EPSILON);
        assert!(!state.registry.get(LAND_USE).unwrap().is_active());

        // Registration scheduled a deferred attempt; the anchor is listed now.
        assert_eq!(state.tick(start), Attachment::Attached);
    }

    #[test]
    fn test_opacity_slider_updates_state_and_layer() {
        let mut state = AppState::new(&test_config(vec![]), Instant::now());
        state.register(source(INFORMAL_NUCLEUS), document()).unwrap();

        state.apply(LayersAction::SetOpacity(0.3));

        assert!((state.opacity.get() - 0.3).abs() < f32::EPSILON);
        assert_eq!(state.opacity.label(), "Opacidade NUI: 0.3");
        let style = state
            .registry
            .get(INFORMAL_NUCLEUS)
            .unwrap()
            .feature_style(&first_feature(&state, INFORMAL_NUCLEUS));
        assert!((style.fill_opacity - 0.3).abs() < f32::EPSILON);
        assert!((style.effective_stroke_opacity() - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_opacity_before_nucleus_loads_is_used_at_registration() {
        let mut state = AppState::new(&test_config(vec![]), Instant::now());
        state.set_opacity(0.2);
        state.register(source(INFORMAL_NUCLEUS), document()).unwrap();

        let style = state.registry.get(INFORMAL_NUCLEUS).unwrap().style_override().copied();
        assert!(style.is_some_and(|s| (s.fill_opacity - 0.2).abs() < f32::EPSILON));
    }

    #[test]
    fn test_legends_follow_overlay_toggles() {
        let mut state = AppState::new(&test_config(vec![]), Instant::now());
        for label in [GEOLOGY, VEGETATION, STATES] {
            state.register(source(label), document()).unwrap();
        }

        state.apply(LayersAction::SetOverlay { label: GEOLOGY.to_string(), active: true });
        state.apply(LayersAction::SetOverlay { label: VEGETATION.to_string(), active: true });
        state.apply(LayersAction::SetOverlay { label: STATES.to_string(), active: true });
        assert!(state.ui.legends.is_visible(GEOLOGY));
        assert!(state.ui.legends.is_visible(VEGETATION));
        assert_eq!(state.ui.legends.visible().count(), 2);

        state.apply(LayersAction::SetOverlay { label: GEOLOGY.to_string(), active: false });
        assert!(!state.ui.legends.is_visible(GEOLOGY));
        assert!(state.ui.legends.is_visible(VEGETATION));
    }

    #[test]
    fn test_duplicate_load_is_counted_as_rejected() {
        let mut state = AppState::new(&test_config(vec![source("A")]), Instant::now());
        for _ in 0..2 {
            state.handle_load_event(LoadEvent::Loaded { source: source("A"), document: document() });
        }
        state.handle_load_event(LoadEvent::Finished(LoadSummary { loaded: 2, failed: 0 }));

        assert_eq!(state.registry.len(), 1);
        assert_eq!((state.journal.loaded(), state.journal.failed()), (1, 1));
        assert_eq!(state.ui.layers_control.overlays().count(), 1);

        let last = state.journal.diagnostics().back().map(|d| d.message.as_str()).unwrap();
        assert!(last.ends_with(": 1 ok, 1 falhas"), "{last}");
    }

    fn mixed_events() -> Vec<LoadEvent> {
        let missing = |label: &str| LoadEvent::Failed {
            source: source(label),
            error: LoadError::Io {
                path: format!("{label}.geojson").into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
        };
        let loaded = |label: &str| LoadEvent::Loaded { source: source(label), document: document() };
        vec![
            loaded(GEOLOGY),
            missing(LAND_USE),
            loaded(INFORMAL_NUCLEUS),
            missing(VEGETATION),
            loaded(STATES),
        ]
    }

    fn replay(events: Vec<LoadEvent>) -> AppState {
        let sources = [GEOLOGY, LAND_USE, INFORMAL_NUCLEUS, VEGETATION, STATES].map(source);
        let mut state = AppState::new(&test_config(sources.to_vec()), Instant::now());
        for event in events {
            state.handle_load_event(event);
        }
        state.handle_load_event(LoadEvent::Finished(LoadSummary { loaded: 3, failed: 2 }));
        state
    }

    #[test]
    fn test_completion_order_does_not_change_the_outcome() {
        let forward = replay(mixed_events());
        let mut reversed_events = mixed_events();
        reversed_events.reverse();
        let reversed = replay(reversed_events);

        for state in [&forward, &reversed] {
            let mut labels: Vec<&str> = state.registry.labels().collect();
            labels.sort_unstable();
            let mut expected = vec![GEOLOGY, INFORMAL_NUCLEUS, STATES];
            expected.sort_unstable();
            assert_eq!(labels, expected);

            assert_eq!((state.journal.loaded(), state.journal.failed()), (3, 2));
            assert!(state.journal.is_finished());
            assert_eq!(state.ui.layers_control.overlays().count(), 3);

            let active: Vec<&str> = state.registry.active().map(OverlayLayer::label).collect();
            assert_eq!(active, vec![INFORMAL_NUCLEUS]);
            assert!(!state.ui.legends.is_visible(GEOLOGY));
        }
    }

    #[test]
    fn test_base_layer_switch() {
        let mut state = AppState::new(&test_config(vec![]), Instant::now());
        assert_eq!(state.base_layer, BaseLayer::Satellite);
        state.apply(LayersAction::SelectBase(BaseLayer::Territorial));
        assert_eq!(state.base_layer, BaseLayer::Territorial);
    }

    #[tokio::test]
    async fn test_unreachable_file_leaves_the_rest_of_the_map_working() {
        let dir = TempDir::new();
        let sources = vec![source(GEOLOGY), source(LAND_USE), source(INFORMAL_NUCLEUS)];
        for present in [GEOLOGY, INFORMAL_NUCLEUS] {
            std::fs::write(dir.0.join(format!("{present}.geojson")), POLYGON_DOC).unwrap();
        }

        let start = Instant::now();
        let mut state = AppState::new(&test_config(sources.clone()), start);
        let loader = Loader::new(DataRoot::Directory(dir.0.clone())).unwrap();

        let mut events = Vec::new();
        let summary = loader.load_all(sources, |event| events.push(event)).await;
        for event in events {
            state.handle_load_event(event);
        }
        state.handle_load_event(LoadEvent::Finished(summary));

        assert!(!state.registry.contains(LAND_USE));
        assert!(state.registry.contains(GEOLOGY));
        assert!(state.registry.contains(INFORMAL_NUCLEUS));
        assert_eq!((state.journal.loaded(), state.journal.failed()), (2, 1));
        assert!(state.journal.is_finished());

        // Layers control and slider still work without the missing overlay.
        assert_eq!(state.tick(start + Duration::from_secs(61)), Attachment::Attached);
        state.apply(LayersAction::SelectBase(BaseLayer::Territorial));
        assert_eq!(state.base_layer, BaseLayer::Territorial);

        // A click away from every feature opens the coordinates popup.
        let project = |c: Coord| egui::pos2(c.lon as f32 * 100.0, -c.lat as f32 * 100.0);
        let clicked = Coord::new(-48.60137, -27.010564);
        state.popup = Some(popup_for_click(&state.registry, clicked, project(clicked), &project));
        let popup = state.popup.as_ref().unwrap();
        assert_eq!(popup.content, PopupContent::Coordinates);
        assert_eq!(popup.coordinate_text(), "Lat: -27.010564, Lng: -48.601370");
    }
}
