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

//! Label-keyed registry of loaded overlays.
//!
//! Layers are kept in registration order, which is also the order the layers
//! control lists them in. A label is registered at most once per session.

use log::{debug, warn};
use thiserror::Error;

use crate::document::{Feature, OverlayDocument};
use crate::source::OverlaySource;
use crate::style::{renderer_for, resolve_style, LayerRenderer, StyleDescriptor, StylePatch};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("overlay '{0}' is already registered")]
    Duplicate(String),
}

/// Emitted when an overlay's visibility changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    Shown(String),
    Hidden(String),
}

impl OverlayEvent {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Shown(label) | Self::Hidden(label) => label,
        }
    }
}

/// A loaded overlay and its display state.
#[derive(Debug)]
pub struct OverlayLayer {
    pub source: OverlaySource,
    pub document: OverlayDocument,
    pub renderer: LayerRenderer,
    style_override: Option<StyleDescriptor>,
    patch: StylePatch,
    active: bool,
}

impl OverlayLayer {
    /// New inactive layer styled through the rule table.
    #[must_use]
    pub fn new(source: OverlaySource, document: OverlayDocument) -> Self {
        let renderer = renderer_for(&source.label);
        Self {
            source,
            document,
            renderer,
            style_override: None,
            patch: StylePatch::default(),
            active: false,
        }
    }

    /// Style every feature with `style` instead of the rule table.
    #[must_use]
    pub fn with_style(mut self, style: StyleDescriptor) -> Self {
        self.style_override = Some(style);
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.source.label
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn style_override(&self) -> Option<&StyleDescriptor> {
        self.style_override.as_ref()
    }

    /// Update the live style. Applies to every feature of the layer.
    pub fn apply_patch(&mut self, patch: &StylePatch) {
        match &mut self.style_override {
            Some(style) => style.apply(patch),
            None => self.patch.merge(patch),
        }
    }

    /// Path style for one feature of this layer.
    #[must_use]
    pub fn feature_style(&self, feature: &Feature) -> StyleDescriptor {
        let mut style = self
            .style_override
            .unwrap_or_else(|| resolve_style(self.label(), feature.properties.as_ref()));
        if !self.patch.is_empty() {
            style.apply(&self.patch);
        }
        style
    }
}

/// Every overlay registered this session, in registration order.
#[derive(Debug, Default)]
pub struct OverlayRegistry {
    layers: Vec<OverlayLayer>,
}

impl OverlayRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer under its label. A label that is already present is
    /// rejected and the existing layer is left untouched.
    pub fn register(&mut self, layer: OverlayLayer) -> Result<&mut OverlayLayer, RegistryError> {
        if self.contains(layer.label()) {
            warn!("Ignoring second registration of overlay '{}'", layer.label());
            return Err(RegistryError::Duplicate(layer.source.label));
        }
        debug!("Registered overlay '{}' at position {}", layer.label(), self.layers.len());
        self.layers.push(layer);
        let index = self.layers.len() - 1;
        Ok(&mut self.layers[index])
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&OverlayLayer> {
        self.layers.iter().find(|l| l.label() == label)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut OverlayLayer> {
        self.layers.iter_mut().find(|l| l.label() == label)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(OverlayLayer::label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverlayLayer> {
        self.layers.iter()
    }

    /// Active layers, drawn bottom to top in registration order.
    pub fn active(&self) -> impl DoubleEndedIterator<Item = &OverlayLayer> {
        self.layers.iter().filter(|l| l.active)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Show or hide the overlay called `label`.
    ///
    /// Returns the resulting event, or `None` when the label is unknown or
    /// the layer was already in the requested state.
    pub fn set_active(&mut self, label: &str, active: bool) -> Option<OverlayEvent> {
        let layer = self.get_mut(label)?;
        if layer.active == active {
            return None;
        }
        layer.active = active;
        let label = label.to_string();
        Some(if active {
            OverlayEvent::Shown(label)
        } else {
            OverlayEvent::Hidden(label)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::rules::{informal_nucleus_style, INFORMAL_NUCLEUS, LAND_USE, SPRINGS_POINTS};

    const LAND_USE_DOC: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"CLASSE_USO": "silvicultura"},
         "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}}
    ]}"#;

    fn layer(label: &str) -> OverlayLayer {
        OverlayLayer::new(
            OverlaySource::new(format!("{label}.geojson"), label),
            OverlayDocument::parse(LAND_USE_DOC).unwrap(),
        )
    }

    #[test]
    fn test_register_keeps_order_and_rejects_duplicates() {
        let mut registry = OverlayRegistry::new();
        registry.register(layer("B")).unwrap();
        registry.register(layer("A")).unwrap();
        assert_eq!(
            registry.register(layer("B")).unwrap_err(),
            RegistryError::Duplicate("B".to_string())
        );
        assert_eq!(registry.labels().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_set_active_emits_only_on_change() {
        let mut registry = OverlayRegistry::new();
        registry.register(layer(LAND_USE)).unwrap();

        assert_eq!(
            registry.set_active(LAND_USE, true),
            Some(OverlayEvent::Shown(LAND_USE.to_string()))
        );
        assert_eq!(registry.set_active(LAND_USE, true), None);
        assert_eq!(registry.active().count(), 1);
        assert_eq!(
            registry.set_active(LAND_USE, false),
            Some(OverlayEvent::Hidden(LAND_USE.to_string()))
        );
        assert_eq!(registry.set_active("Desconhecida", true), None);
    }

    #[test]
    fn test_feature_style_uses_rules_then_patch() {
        let mut land_use = layer(LAND_USE);
        let feature = land_use.document.features[0].clone();
        assert_eq!(land_use.feature_style(&feature).fill_color.to_string(), "#d6da5e");

        land_use.apply_patch(&StylePatch::opacity(0.4));
        let style = land_use.feature_style(&feature);
        assert_eq!(style.fill_color.to_string(), "#d6da5e");
        assert_eq!(style.fill_opacity, 0.4);
        assert_eq!(style.stroke_opacity, Some(0.4));
    }

    #[test]
    fn test_override_bypasses_rules() {
        let mut nucleus = layer(INFORMAL_NUCLEUS).with_style(informal_nucleus_style(0.6));
        let feature = nucleus.document.features[0].clone();
        assert_eq!(nucleus.feature_style(&feature).fill_color.to_string(), "#ff0000");

        nucleus.apply_patch(&StylePatch::opacity(0.3));
        let style = nucleus.feature_style(&feature);
        assert_eq!(style.fill_opacity, 0.3);
        assert_eq!(style.stroke_opacity, Some(0.3));
        assert_eq!(nucleus.style_override().map(|s| s.fill_opacity), Some(0.3));
    }

    #[test]
    fn test_point_layers_pick_point_renderer() {
        assert!(matches!(layer(SPRINGS_POINTS).renderer, LayerRenderer::PointSymbol(_)));
        assert_eq!(layer(LAND_USE).renderer, LayerRenderer::Styled);
    }
}
