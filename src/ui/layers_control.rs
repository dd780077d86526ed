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

//! Floating layers control: base layer radio buttons and overlay checkboxes.

use eframe::egui;
use overlay_kit::{OverlayRegistry, INFORMAL_NUCLEUS};

use super::opacity::{self, OpacityState};
use crate::map::BaseLayer;

/// User input collected while drawing the control, applied afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum LayersAction {
    SelectBase(BaseLayer),
    SetOverlay { label: String, active: bool },
    SetOpacity(f32),
}

/// Entries listed in the control, in the order overlays were added.
#[derive(Debug)]
pub struct LayersControl {
    overlays: Vec<String>,
    expanded: bool,
}

impl Default for LayersControl {
    fn default() -> Self {
        Self {
            overlays: Vec::new(),
            expanded: true,
        }
    }
}

impl LayersControl {
    /// List an overlay. Adding the same label twice keeps a single entry.
    pub fn add_overlay(&mut self, label: &str) {
        if !self.lists(label) {
            self.overlays.push(label.to_string());
        }
    }

    pub fn lists(&self, label: &str) -> bool {
        self.overlays.iter().any(|l| l == label)
    }

    pub fn overlays(&self) -> impl Iterator<Item = &str> {
        self.overlays.iter().map(String::as_str)
    }

    /// Draw the control in the top-right corner.
    ///
    /// The opacity slider is drawn under the informal nucleus entry only
    /// when `slider_attached` is set.
    pub fn render(
        &mut self,
        ctx: &egui::Context,
        base: BaseLayer,
        registry: &OverlayRegistry,
        opacity: OpacityState,
        slider_attached: bool,
    ) -> Vec<LayersAction> {
        let mut actions = Vec::new();

        egui::Window::new("layers_control")
            .title_bar(false)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
            .resizable(false)
            .collapsible(false)
            .frame(
                egui::Frame::window(&ctx.style())
                    .fill(egui::Color32::from_rgba_unmultiplied(255, 255, 255, 235))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(180)))
                    .corner_radius(6.0),
            )
            .show(ctx, |ui| {
                ui.visuals_mut().override_text_color = Some(egui::Color32::from_rgb(30, 30, 30));

                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Camadas").strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let icon = if self.expanded { "▲" } else { "▼" };
                        if ui.small_button(icon).clicked() {
                            self.expanded = !self.expanded;
                        }
                    });
                });

                if !self.expanded {
                    return;
                }

                ui.separator();
                for layer in BaseLayer::ALL {
                    if ui.radio(base == layer, layer.display_name()).clicked() && base != layer {
                        actions.push(LayersAction::SelectBase(layer));
                    }
                }

                ui.separator();
                egui::ScrollArea::vertical()
                    .max_height(420.0)
                    .show(ui, |ui| {
                        for label in self.overlays() {
                            let mut active = registry.get(label).is_some_and(|l| l.is_active());
                            if ui.checkbox(&mut active, label).changed() {
                                actions.push(LayersAction::SetOverlay {
                                    label: label.to_string(),
                                    active,
                                });
                            }

                            if slider_attached && label == INFORMAL_NUCLEUS {
                                if let Some(value) = opacity::show_slider(ui, opacity) {
                                    actions.push(LayersAction::SetOpacity(value));
                                }
                            }
                        }

                        if self.overlays.is_empty() {
                            ui.label(
                                egui::RichText::new("Nenhuma camada carregada")
                                    .italics()
                                    .size(11.0),
                            );
                        }
                    });
            });

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlays_listed_once_in_insertion_order() {
        let mut control = LayersControl::default();
        control.add_overlay("B");
        control.add_overlay("A");
        control.add_overlay("B");
        assert_eq!(control.overlays().collect::<Vec<_>>(), vec!["B", "A"]);
        assert!(control.lists("A"));
        assert!(!control.lists(INFORMAL_NUCLEUS));
    }
}
