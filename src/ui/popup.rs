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

use eframe::egui;
use overlay_kit::{Coord, Feature};

/// What a popup shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupContent {
    /// Attribute table of a clicked feature, in file order
    Attributes(Vec<(String, String)>),
    /// Clicked location on empty map
    Coordinates,
}

/// A single popup anchored at a map coordinate. Only one is open at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub anchor: Coord,
    pub content: PopupContent,
}

impl Popup {
    pub fn coordinates(anchor: Coord) -> Self {
        Self {
            anchor,
            content: PopupContent::Coordinates,
        }
    }

    pub fn attributes(anchor: Coord, feature: &Feature) -> Self {
        Self {
            anchor,
            content: PopupContent::Attributes(feature.popup_rows()),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.content {
            PopupContent::Attributes(_) => "Atributos",
            PopupContent::Coordinates => "Coordenadas",
        }
    }

    /// `Lat: -27.010564, Lng: -48.601370`
    pub fn coordinate_text(&self) -> String {
        format!("Lat: {:.6}, Lng: {:.6}", self.anchor.lat, self.anchor.lon)
    }

    /// Draw the popup with its tip at `tip`. Returns false once the user closed it.
    pub fn show(&self, ctx: &egui::Context, tip: egui::Pos2) -> bool {
        let mut open = true;

        egui::Area::new(egui::Id::new("map_popup"))
            .fixed_pos(tip)
            .pivot(egui::Align2::CENTER_BOTTOM)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(&ctx.style())
                    .fill(egui::Color32::WHITE)
                    .corner_radius(6.0)
                    .show(ui, |ui| {
                        ui.set_max_width(320.0);
                        ui.horizontal(|ui| {
                            ui.label(
                                egui::RichText::new(self.title())
                                    .strong()
                                    .color(egui::Color32::from_rgb(30, 30, 30)),
                            );
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                if ui.small_button("✕").clicked() {
                                    open = false;
                                }
                            });
                        });

                        match &self.content {
                            PopupContent::Coordinates => {
                                ui.label(
                                    egui::RichText::new(self.coordinate_text())
                                        .color(egui::Color32::from_rgb(40, 40, 40)),
                                );
                            }
                            PopupContent::Attributes(rows) => render_rows(ui, rows),
                        }
                    });
            });

        open
    }
}

fn render_rows(ui: &mut egui::Ui, rows: &[(String, String)]) {
    egui::ScrollArea::vertical()
        .max_height(260.0)
        .auto_shrink([true, true])
        .show(ui, |ui| {
            egui::Grid::new("popup_attributes")
                .striped(true)
                .num_columns(2)
                .spacing(egui::vec2(8.0, 2.0))
                .show(ui, |ui| {
                    for (key, value) in rows {
                        ui.label(
                            egui::RichText::new(key)
                                .strong()
                                .size(12.0)
                                .color(egui::Color32::from_rgb(30, 30, 30)),
                        );
                        ui.label(
                            egui::RichText::new(value)
                                .size(12.0)
                                .color(egui::Color32::from_rgb(50, 50, 50)),
                        );
                        ui.end_row();
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use overlay_kit::OverlayDocument;

    use super::*;

    #[test]
    fn test_coordinate_text_has_six_decimals() {
        let popup = Popup::coordinates(Coord::new(-48.60137, -27.010564));
        assert_eq!(popup.title(), "Coordenadas");
        assert_eq!(popup.coordinate_text(), "Lat: -27.010564, Lng: -48.601370");
    }

    #[test]
    fn test_attribute_popup_rows() {
        let document = OverlayDocument::parse(
            r#"{"type": "Feature", "properties": {"nome": "Vila Fortaleza", "obs": null},
                "geometry": {"type": "Point", "coordinates": [-48.6, -27.0]}}"#,
        )
        .unwrap();
        let popup = Popup::attributes(Coord::new(-48.6, -27.0), &document.features[0]);
        assert_eq!(popup.title(), "Atributos");
        assert_eq!(
            popup.content,
            PopupContent::Attributes(vec![
                ("nome".to_string(), "Vila Fortaleza".to_string()),
                ("obs".to_string(), String::new()),
            ])
        );
    }
}
