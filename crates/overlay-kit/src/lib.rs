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

//! Overlay library for the geoportal map.
//!
//! Everything here is free of UI code and can be used on its own:
//!
//! - **Style layer**: a static, label-keyed rule table resolving each
//!   feature to a stroke/fill descriptor, including attribute-driven
//!   categorical colors and circle markers for point layers
//! - **Document layer**: GeoJSON parsing into an owned feature model with
//!   precomputed bounds and polygon triangulation
//! - **Loader layer**: concurrent fetch (HTTP or local directory) and parse,
//!   with per-source failure isolation
//! - **Registry layer**: loaded overlays keyed by label, in registration
//!   order, with visibility events and live style patches
//!
//! # Quick Start
//!
//! ```no_run
//! use overlay_kit::{default_sources, DataRoot, LoadEvent, Loader, OverlayLayer, OverlayRegistry};
//!
//! let loader = Loader::new(DataRoot::new("https://example.org/geoportal/")).unwrap();
//! let mut events = loader.spawn_background(default_sources(), || {});
//!
//! let mut registry = OverlayRegistry::new();
//! while let Some(event) = events.blocking_recv() {
//!     match event {
//!         LoadEvent::Loaded { source, document } => {
//!             let _ = registry.register(OverlayLayer::new(source, document));
//!         }
//!         LoadEvent::Failed { source, error } => eprintln!("{}: {error}", source.label),
//!         LoadEvent::Finished(summary) => {
//!             println!("{} loaded, {} failed", summary.loaded, summary.failed);
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! # Styling a single feature
//!
//! ```
//! use overlay_kit::style::{resolve_style, rules::LAND_USE};
//!
//! let properties = serde_json::json!({"CLASSE_USO": "água"});
//! let style = resolve_style(LAND_USE, properties.as_object());
//! assert_eq!(style.fill_color.to_string(), "#01fff2");
//! ```

pub mod document;
pub mod geometry;
pub mod loader;
pub mod registry;
pub mod source;
pub mod style;
pub mod tessellate;

pub use document::{Feature, OverlayDocument, ParseError, Properties};
pub use geometry::{BoundingBox, Coord, Geometry, Polygon};
pub use loader::{DataRoot, LoadError, LoadEvent, LoadSummary, Loader};
pub use registry::{OverlayEvent, OverlayLayer, OverlayRegistry, RegistryError};
pub use source::{default_sources, OverlaySource};
pub use style::{
    informal_nucleus_style, resolve_style, Color, LayerRenderer, PointSymbol, StyleDescriptor,
    StylePatch, INFORMAL_NUCLEUS, THEMATIC_LABELS,
};
