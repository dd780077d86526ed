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

//! Walkers plugin that draws the active overlays and handles map clicks.
//!
//! Features are projected every frame; anything whose bounding box falls
//! outside the viewport is skipped. A click on a feature with an attribute
//! object opens its attribute popup, any other click opens the coordinate
//! popup.

use eframe::egui::{self, epaint::Mesh, Pos2, Shape, Stroke};
use log::debug;
use overlay_kit::{
    BoundingBox, Coord, Feature, Geometry, LayerRenderer, OverlayLayer, OverlayRegistry,
    PointSymbol, Polygon, StyleDescriptor,
};
use walkers::{lon_lat, MapMemory, Plugin, Projector};

use crate::ui::{to_color32, Popup};

/// Marker radius for point features of layers without a point symbol
const DEFAULT_POINT_RADIUS: f32 = 6.0;

/// Extra screen distance accepted around lines and markers when clicking
const CLICK_SLOP: f32 = 4.0;

pub struct OverlayPlugin<'a> {
    registry: &'a OverlayRegistry,
    popup: &'a mut Option<Popup>,
}

impl<'a> OverlayPlugin<'a> {
    pub fn new(registry: &'a OverlayRegistry, popup: &'a mut Option<Popup>) -> Self {
        Self { registry, popup }
    }
}

impl Plugin for OverlayPlugin<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let Self { registry, popup } = *self;
        let project = |coord: Coord| project(projector, coord);

        let painter = ui.painter_at(response.rect);
        let view = view_bounds(projector, response.rect);
        for layer in registry.active() {
            draw_layer(&painter, &project, layer, &view);
        }

        if response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let coord = unproject(projector, pointer);
                debug!("Map click at {coord:?}");
                *popup = Some(popup_for_click(registry, coord, pointer, &project));
            }
        }

        if let Some(open) = popup.as_ref() {
            let tip = project(open.anchor);
            if !open.show(ui.ctx(), tip) {
                *popup = None;
            }
        }
    }
}

fn project(projector: &Projector, coord: Coord) -> Pos2 {
    projector.project(lon_lat(coord.lon, coord.lat)).to_pos2()
}

fn unproject(projector: &Projector, pos: Pos2) -> Coord {
    let position = projector.unproject(pos.to_vec2());
    Coord::new(position.x(), position.y())
}

fn view_bounds(projector: &Projector, rect: egui::Rect) -> BoundingBox {
    let mut bounds = BoundingBox::from_coord(unproject(projector, rect.left_top()));
    bounds.extend(unproject(projector, rect.right_bottom()));
    bounds
}

fn draw_layer(
    painter: &egui::Painter,
    project: &impl Fn(Coord) -> Pos2,
    layer: &OverlayLayer,
    view: &BoundingBox,
) {
    let symbol = match layer.renderer {
        LayerRenderer::PointSymbol(symbol) => Some(symbol),
        LayerRenderer::Styled => None,
    };

    for feature in &layer.document.features {
        let (Some(geometry), Some(bounds)) = (&feature.geometry, feature.bounds) else {
            continue;
        };
        if !bounds.intersects(view) {
            continue;
        }
        let style = layer.feature_style(feature);
        draw_geometry(painter, project, geometry, &style, symbol.as_ref());
    }
}

fn draw_geometry(
    painter: &egui::Painter,
    project: &impl Fn(Coord) -> Pos2,
    geometry: &Geometry,
    style: &StyleDescriptor,
    symbol: Option<&PointSymbol>,
) {
    match geometry {
        Geometry::Point(coord) => draw_point(painter, project(*coord), style, symbol),
        Geometry::MultiPoint(coords) => {
            for coord in coords {
                draw_point(painter, project(*coord), style, symbol);
            }
        }
        Geometry::LineString(line) => draw_line(painter, project, line, style),
        Geometry::MultiLineString(lines) => {
            for line in lines {
                draw_line(painter, project, line, style);
            }
        }
        Geometry::Polygon(polygon) => draw_polygon(painter, project, polygon, style),
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons {
                draw_polygon(painter, project, polygon, style);
            }
        }
        Geometry::Collection(parts) => {
            for part in parts {
                draw_geometry(painter, project, part, style, symbol);
            }
        }
    }
}

fn stroke_of(style: &StyleDescriptor) -> Stroke {
    Stroke::new(
        style.stroke_weight,
        to_color32(style.stroke_color, style.effective_stroke_opacity()),
    )
}

fn draw_point(
    painter: &egui::Painter,
    center: Pos2,
    style: &StyleDescriptor,
    symbol: Option<&PointSymbol>,
) {
    match symbol {
        Some(symbol) => painter.circle(
            center,
            symbol.radius,
            to_color32(symbol.fill_color, symbol.fill_opacity),
            Stroke::new(symbol.stroke_weight, to_color32(symbol.stroke_color, 1.0)),
        ),
        None => painter.circle(
            center,
            DEFAULT_POINT_RADIUS,
            to_color32(style.fill_color, style.fill_opacity),
            stroke_of(style),
        ),
    };
}

fn draw_line(
    painter: &egui::Painter,
    project: &impl Fn(Coord) -> Pos2,
    line: &[Coord],
    style: &StyleDescriptor,
) {
    if line.len() < 2 {
        return;
    }
    let points = line.iter().map(|c| project(*c)).collect();
    painter.add(Shape::line(points, stroke_of(style)));
}

fn draw_polygon(
    painter: &egui::Painter,
    project: &impl Fn(Coord) -> Pos2,
    polygon: &Polygon,
    style: &StyleDescriptor,
) {
    let exterior: Vec<Pos2> = polygon.exterior.iter().map(|c| project(*c)).collect();

    if style.fill_opacity > 0.0 && !polygon.triangles.is_empty() {
        let fill = to_color32(style.fill_color, style.fill_opacity);
        let mut mesh = Mesh::default();
        for coord in polygon.fill_vertices() {
            mesh.colored_vertex(project(coord), fill);
        }
        for [a, b, c] in &polygon.triangles {
            mesh.add_triangle(*a, *b, *c);
        }
        painter.add(Shape::mesh(mesh));
    }

    if style.stroke_weight > 0.0 {
        let stroke = stroke_of(style);
        painter.add(Shape::closed_line(exterior, stroke));
        for hole in &polygon.holes {
            let points = hole.iter().map(|c| project(*c)).collect();
            painter.add(Shape::closed_line(points, stroke));
        }
    }
}

/// Popup opened by a click: the attributes of the feature under the pointer,
/// or the clicked coordinates when there is none.
pub fn popup_for_click(
    registry: &OverlayRegistry,
    coord: Coord,
    pointer: Pos2,
    project: &impl Fn(Coord) -> Pos2,
) -> Popup {
    match hit_test(registry, coord, pointer, project) {
        Some(feature) => Popup::attributes(coord, feature),
        None => Popup::coordinates(coord),
    }
}

/// Topmost feature with an attribute object under the pointer, if any.
///
/// Layers are searched from the last drawn to the first, so the feature on
/// top wins. Areas are tested in map coordinates, lines and markers in screen
/// space with a small tolerance.
fn hit_test<'r>(
    registry: &'r OverlayRegistry,
    coord: Coord,
    pointer: Pos2,
    project: &impl Fn(Coord) -> Pos2,
) -> Option<&'r Feature> {
    for layer in registry.active().rev() {
        for feature in layer.document.features.iter().rev() {
            if feature.properties.is_none() {
                continue;
            }
            let Some(geometry) = &feature.geometry else {
                continue;
            };

            let tolerance = match layer.renderer {
                LayerRenderer::PointSymbol(symbol) => symbol.radius + symbol.stroke_weight + CLICK_SLOP,
                LayerRenderer::Styled => {
                    let style = layer.feature_style(feature);
                    (style.stroke_weight / 2.0).max(DEFAULT_POINT_RADIUS) + CLICK_SLOP
                }
            };

            if geometry_hit(geometry, coord, pointer, project, tolerance) {
                return Some(feature);
            }
        }
    }
    None
}

fn geometry_hit(
    geometry: &Geometry,
    coord: Coord,
    pointer: Pos2,
    project: &impl Fn(Coord) -> Pos2,
    tolerance: f32,
) -> bool {
    match geometry {
        Geometry::Point(point) => project(*point).distance(pointer) <= tolerance,
        Geometry::MultiPoint(points) => points
            .iter()
            .any(|p| project(*p).distance(pointer) <= tolerance),
        Geometry::LineString(line) => line_hit(line, pointer, project, tolerance),
        Geometry::MultiLineString(lines) => lines
            .iter()
            .any(|line| line_hit(line, pointer, project, tolerance)),
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => geometry.area_contains(coord),
        Geometry::Collection(parts) => parts
            .iter()
            .any(|part| geometry_hit(part, coord, pointer, project, tolerance)),
    }
}

fn line_hit(line: &[Coord], pointer: Pos2, project: &impl Fn(Coord) -> Pos2, tolerance: f32) -> bool {
    let points: Vec<Pos2> = line.iter().map(|c| project(*c)).collect();
    points
        .windows(2)
        .any(|segment| segment_distance(pointer, segment[0], segment[1]) <= tolerance)
}

fn segment_distance(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use overlay_kit::style::rules::{LAND_USE, RIVERS_SIMPLE, SPRINGS_POINTS};
    use overlay_kit::{OverlayDocument, OverlaySource};

    use super::*;

    // 100 px per degree, y grows downwards like the screen
    #[allow(clippy::cast_possible_truncation, reason = "test coordinates are small")]
    fn screen(coord: Coord) -> Pos2 {
        egui::pos2((coord.lon * 100.0) as f32, (-coord.lat * 100.0) as f32)
    }

    fn register(registry: &mut OverlayRegistry, label: &str, geojson: &str) {
        let document = OverlayDocument::parse(geojson).unwrap();
        registry
            .register(OverlayLayer::new(OverlaySource::new("f.geojson", label), document))
            .unwrap();
        registry.set_active(label, true);
    }

    fn click(registry: &OverlayRegistry, lon: f64, lat: f64) -> Option<&Feature> {
        let coord = Coord::new(lon, lat);
        hit_test(registry, coord, screen(coord), &screen)
    }

    #[test]
    fn test_click_popup_kind() {
        let mut registry = OverlayRegistry::new();
        register(&mut registry, LAND_USE, SQUARE);

        let inside = Coord::new(1.0, 1.0);
        let popup = popup_for_click(&registry, inside, screen(inside), &screen);
        assert_eq!(popup.title(), "Atributos");

        let outside = Coord::new(-5.0, 1.0);
        let popup = popup_for_click(&registry, outside, screen(outside), &screen);
        assert_eq!(popup, Popup::coordinates(outside));
    }

    const SQUARE: &str = r#"{"type": "Feature", "properties": {"CLASSE_USO": "água"},
        "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]]]}}"#;

    #[test]
    fn test_click_inside_polygon_hits_feature() {
        let mut registry = OverlayRegistry::new();
        register(&mut registry, LAND_USE, SQUARE);

        let feature = click(&registry, 1.0, 1.0).unwrap();
        assert_eq!(feature.popup_rows(), vec![("CLASSE_USO".to_string(), "água".to_string())]);
        assert!(click(&registry, 3.0, 1.0).is_none());
    }

    #[test]
    fn test_hidden_layers_and_bare_features_are_not_clickable() {
        let mut registry = OverlayRegistry::new();
        register(&mut registry, LAND_USE, SQUARE);
        registry.set_active(LAND_USE, false);
        assert!(click(&registry, 1.0, 1.0).is_none());

        let mut registry = OverlayRegistry::new();
        register(
            &mut registry,
            LAND_USE,
            r#"{"type": "Feature", "properties": null,
                "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 0]]]}}"#,
        );
        assert!(click(&registry, 1.5, 0.5).is_none());
    }

    #[test]
    fn test_empty_attribute_object_is_still_clickable() {
        let mut registry = OverlayRegistry::new();
        register(
            &mut registry,
            LAND_USE,
            r#"{"type": "Feature", "properties": {},
                "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 0]]]}}"#,
        );
        let feature = click(&registry, 1.5, 0.5).unwrap();
        assert!(feature.popup_rows().is_empty());

        let coord = Coord::new(1.5, 0.5);
        let popup = popup_for_click(&registry, coord, screen(coord), &screen);
        assert_eq!(popup, Popup::attributes(coord, feature));
    }

    #[test]
    fn test_lines_and_points_use_screen_tolerance() {
        let mut registry = OverlayRegistry::new();
        register(
            &mut registry,
            RIVERS_SIMPLE,
            r#"{"type": "Feature", "properties": {"nome": "Rio Camboriú"},
                "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 0]]}}"#,
        );
        register(
            &mut registry,
            SPRINGS_POINTS,
            r#"{"type": "Feature", "properties": {"id": 1},
                "geometry": {"type": "Point", "coordinates": [5, 5]}}"#,
        );

        // 0.05 degrees = 5 px off the line, within weight/2 + slop
        assert!(click(&registry, 0.5, 0.05).is_some());
        assert!(click(&registry, 0.5, 0.5).is_none());

        let spring = click(&registry, 5.03, 5.0).unwrap();
        assert_eq!(spring.popup_rows()[0].0, "id");
        assert!(click(&registry, 5.2, 5.0).is_none());
    }

    #[test]
    fn test_topmost_layer_wins() {
        let mut registry = OverlayRegistry::new();
        register(&mut registry, "Baixo", SQUARE);
        register(
            &mut registry,
            "Cima",
            r#"{"type": "Feature", "properties": {"camada": "cima"},
                "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]]]}}"#,
        );
        let feature = click(&registry, 1.0, 1.0).unwrap();
        assert_eq!(feature.popup_rows()[0].1, "cima");
    }

    #[test]
    fn test_segment_distance() {
        let a = egui::pos2(0.0, 0.0);
        let b = egui::pos2(10.0, 0.0);
        assert!((segment_distance(egui::pos2(5.0, 3.0), a, b) - 3.0).abs() < 1e-6);
        assert!((segment_distance(egui::pos2(13.0, 4.0), a, b) - 5.0).abs() < 1e-6);
        assert!((segment_distance(egui::pos2(1.0, 1.0), a, a) - 2f32.sqrt()).abs() < 1e-6);
    }
}
