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

//! Owned geometry model for overlay features (WGS-84 degrees).

use crate::tessellate;

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

impl Coord {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Build from a GeoJSON position (`[lon, lat, ...]`); extra ordinates are ignored.
    #[must_use]
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Some(Self::new(*lon, *lat)),
            _ => None,
        }
    }
}

/// Axis-aligned lon/lat extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn from_coord(coord: Coord) -> Self {
        Self {
            min_lon: coord.lon,
            min_lat: coord.lat,
            max_lon: coord.lon,
            max_lat: coord.lat,
        }
    }

    pub fn extend(&mut self, coord: Coord) {
        self.min_lon = self.min_lon.min(coord.lon);
        self.min_lat = self.min_lat.min(coord.lat);
        self.max_lon = self.max_lon.max(coord.lon);
        self.max_lat = self.max_lat.max(coord.lat);
    }

    pub fn union(&mut self, other: &Self) {
        self.extend(Coord::new(other.min_lon, other.min_lat));
        self.extend(Coord::new(other.max_lon, other.max_lat));
    }

    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }

    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.lon >= self.min_lon
            && coord.lon <= self.max_lon
            && coord.lat >= self.min_lat
            && coord.lat <= self.max_lat
    }

    fn around<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let mut bounds = Self::from_coord(*iter.next()?);
        for coord in iter {
            bounds.extend(*coord);
        }
        Some(bounds)
    }
}

/// Polygon with its fill triangulation precomputed.
///
/// Rings are stored open (no repeated closing vertex). `triangles` index into
/// [`Polygon::fill_vertices`], so holes stay unfilled.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<Coord>,
    pub holes: Vec<Vec<Coord>>,
    pub triangles: Vec<[u32; 3]>,
}

impl Polygon {
    #[must_use]
    pub fn new(exterior: Vec<Coord>, holes: Vec<Vec<Coord>>) -> Self {
        let exterior = open_ring(exterior);
        let holes: Vec<Vec<Coord>> = holes.into_iter().map(open_ring).collect();
        let triangles = tessellate::triangulate_with_holes(&exterior, &holes);
        Self {
            exterior,
            holes,
            triangles,
        }
    }

    /// Exterior vertices followed by every hole's vertices, the index space
    /// of `triangles`.
    pub fn fill_vertices(&self) -> impl Iterator<Item = Coord> + '_ {
        self.exterior.iter().chain(self.holes.iter().flatten()).copied()
    }

    /// Even-odd containment test against the exterior and its holes.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        ring_contains(&self.exterior, coord) && !self.holes.iter().any(|h| ring_contains(h, coord))
    }
}

fn open_ring(mut ring: Vec<Coord>) -> Vec<Coord> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

pub(crate) fn ring_contains(ring: &[Coord], coord: Coord) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for (i, a) in ring.iter().enumerate() {
        let b = ring[j];
        if (a.lat > coord.lat) != (b.lat > coord.lat)
            && coord.lon < (b.lon - a.lon) * (coord.lat - a.lat) / (b.lat - a.lat) + a.lon
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Geometry of one overlay feature.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
    Collection(Vec<Geometry>),
}

impl Geometry {
    /// Lon/lat extent, or `None` for a geometry without coordinates.
    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBox> {
        match self {
            Self::Point(coord) => Some(BoundingBox::from_coord(*coord)),
            Self::MultiPoint(coords) | Self::LineString(coords) => BoundingBox::around(coords),
            Self::MultiLineString(lines) => BoundingBox::around(lines.iter().flatten()),
            Self::Polygon(polygon) => BoundingBox::around(&polygon.exterior),
            Self::MultiPolygon(polygons) => {
                BoundingBox::around(polygons.iter().flat_map(|p| p.exterior.iter()))
            }
            Self::Collection(parts) => parts.iter().filter_map(Self::bounds).reduce(|mut a, b| {
                a.union(&b);
                a
            }),
        }
    }

    /// Whether this geometry has an area that can contain a clicked point.
    #[must_use]
    pub fn area_contains(&self, coord: Coord) -> bool {
        match self {
            Self::Polygon(polygon) => polygon.contains(coord),
            Self::MultiPolygon(polygons) => polygons.iter().any(|p| p.contains(coord)),
            Self::Collection(parts) => parts.iter().any(|g| g.area_contains(coord)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<Coord> {
        vec![
            Coord::new(0.0, 0.0),
            Coord::new(size, 0.0),
            Coord::new(size, size),
            Coord::new(0.0, size),
            Coord::new(0.0, 0.0),
        ]
    }

    #[test]
    fn test_from_position_requires_two_finite_ordinates() {
        assert_eq!(Coord::from_position(&[-48.6, -27.0, 12.0]), Some(Coord::new(-48.6, -27.0)));
        assert_eq!(Coord::from_position(&[-48.6]), None);
        assert_eq!(Coord::from_position(&[f64::NAN, 1.0]), None);
    }

    #[test]
    fn test_polygon_drops_closing_vertex_and_triangulates() {
        let polygon = Polygon::new(square(1.0), Vec::new());
        assert_eq!(polygon.exterior.len(), 4);
        assert_eq!(polygon.triangles.len(), 2);
    }

    #[test]
    fn test_polygon_contains_respects_holes() {
        let hole = vec![
            Coord::new(0.25, 0.25),
            Coord::new(0.75, 0.25),
            Coord::new(0.75, 0.75),
            Coord::new(0.25, 0.75),
        ];
        let polygon = Polygon::new(square(1.0), vec![hole]);
        assert!(polygon.contains(Coord::new(0.1, 0.1)));
        assert!(!polygon.contains(Coord::new(0.5, 0.5)));
        assert!(!polygon.contains(Coord::new(1.5, 0.5)));
    }

    #[test]
    fn test_polygon_fill_skips_holes() {
        let hole = vec![
            Coord::new(0.25, 0.25),
            Coord::new(0.75, 0.25),
            Coord::new(0.75, 0.75),
            Coord::new(0.25, 0.75),
            Coord::new(0.25, 0.25),
        ];
        let polygon = Polygon::new(square(1.0), vec![hole]);
        let vertices: Vec<Coord> = polygon.fill_vertices().collect();
        assert_eq!(vertices.len(), 8);

        let filled: f64 = polygon
            .triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|i| vertices[i as usize]);
                ((b.lon - a.lon) * (c.lat - a.lat) - (b.lat - a.lat) * (c.lon - a.lon)).abs() / 2.0
            })
            .sum();
        assert!((filled - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_collection_bounds_union() {
        let geometry = Geometry::Collection(vec![
            Geometry::Point(Coord::new(-1.0, 2.0)),
            Geometry::LineString(vec![Coord::new(3.0, -4.0), Coord::new(0.0, 0.0)]),
            Geometry::Collection(Vec::new()),
        ]);
        let bounds = geometry.bounds().unwrap();
        assert_eq!(
            bounds,
            BoundingBox {
                min_lon: -1.0,
                min_lat: -4.0,
                max_lon: 3.0,
                max_lat: 2.0
            }
        );
        assert!(bounds.contains(Coord::new(0.0, 0.0)));
        assert!(Geometry::Collection(Vec::new()).bounds().is_none());
    }
}
