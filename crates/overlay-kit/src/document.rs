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

//! Parsing of overlay files into an owned feature model.
//!
//! Overlay files are GeoJSON documents. A FeatureCollection is the normal
//! case, but a bare Feature or Geometry is accepted and wrapped. Attribute
//! sets are open-ended and kept in file order for popups.

use geojson::GeoJson;
use thiserror::Error;

use crate::geometry::{BoundingBox, Coord, Geometry, Polygon};

/// Feature attributes, in the order they appear in the source file.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Errors produced while parsing an overlay file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a GeoJSON object: {0}")]
    NotGeoJson(#[source] geojson::Error),
}

/// One feature: optional geometry plus its attributes.
///
/// `properties` is `None` when the file has no attribute object (`null` or
/// absent), which is different from an empty one.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    pub properties: Option<Properties>,
    pub bounds: Option<BoundingBox>,
}

impl Feature {
    #[must_use]
    pub fn new(geometry: Option<Geometry>, properties: Option<Properties>) -> Self {
        let bounds = geometry.as_ref().and_then(Geometry::bounds);
        Self {
            geometry,
            properties,
            bounds,
        }
    }

    /// Attribute rows for the feature popup, in file order. Null values
    /// render as empty cells.
    #[must_use]
    pub fn popup_rows(&self) -> Vec<(String, String)> {
        self.properties
            .iter()
            .flatten()
            .map(|(key, value)| (key.clone(), display_value(value)))
            .collect()
    }
}

/// Render an attribute value as popup text.
#[must_use]
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// A parsed overlay file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayDocument {
    pub features: Vec<Feature>,
}

impl OverlayDocument {
    /// Parse overlay text. Fails when the text is not JSON, or is JSON but
    /// not a GeoJSON object.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let geojson = GeoJson::from_json_value(value).map_err(ParseError::NotGeoJson)?;
        Ok(Self::from_geojson(geojson))
    }

    #[must_use]
    pub fn from_geojson(geojson: GeoJson) -> Self {
        let features = match geojson {
            GeoJson::FeatureCollection(collection) => {
                collection.features.into_iter().map(convert_feature).collect()
            }
            GeoJson::Feature(feature) => vec![convert_feature(feature)],
            GeoJson::Geometry(geometry) => {
                vec![Feature::new(convert_geometry(geometry.value), None)]
            }
        };
        Self { features }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Extent of every feature with a geometry.
    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.features
            .iter()
            .filter_map(|f| f.bounds)
            .reduce(|mut acc, b| {
                acc.union(&b);
                acc
            })
    }
}

fn convert_feature(feature: geojson::Feature) -> Feature {
    Feature::new(
        feature.geometry.and_then(|g| convert_geometry(g.value)),
        feature.properties,
    )
}

fn line(positions: &[Vec<f64>]) -> Vec<Coord> {
    positions
        .iter()
        .filter_map(|p| Coord::from_position(p))
        .collect()
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon> {
    let (exterior, holes) = rings.split_first()?;
    let exterior = line(exterior);
    if exterior.len() < 3 {
        return None;
    }
    Some(Polygon::new(exterior, holes.iter().map(|h| line(h)).collect()))
}

fn convert_geometry(value: geojson::Value) -> Option<Geometry> {
    use geojson::Value;

    let geometry = match value {
        Value::Point(position) => Geometry::Point(Coord::from_position(&position)?),
        Value::MultiPoint(positions) => Geometry::MultiPoint(line(&positions)),
        Value::LineString(positions) => Geometry::LineString(line(&positions)),
        Value::MultiLineString(lines) => {
            Geometry::MultiLineString(lines.iter().map(|l| line(l)).collect())
        }
        Value::Polygon(rings) => Geometry::Polygon(polygon(&rings)?),
        Value::MultiPolygon(polygons) => {
            Geometry::MultiPolygon(polygons.iter().filter_map(|p| polygon(p)).collect())
        }
        Value::GeometryCollection(parts) => Geometry::Collection(
            parts
                .into_iter()
                .filter_map(|g| convert_geometry(g.value))
                .collect(),
        ),
    };
    Some(geometry)
}
