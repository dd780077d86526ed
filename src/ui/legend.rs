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

//! Static legends for the thematic overlays.
//!
//! Each thematic overlay owns at most one legend. A legend is visible exactly
//! while its overlay is active; legends are independent of each other.

use eframe::egui;
use overlay_kit::style::rules::{GEOLOGY, GEOMORPHOLOGY, LAND_USE, SOILS, VEGETATION};
use overlay_kit::{Color, OverlayEvent};

use super::to_color32;

#[derive(Debug)]
pub struct Legend {
    pub overlay_label: &'static str,
    pub title: &'static str,
    pub entries: &'static [(Color, &'static str)],
}

pub static LEGENDS: [Legend; 5] = [
    Legend {
        overlay_label: LAND_USE,
        title: "Uso e Ocupação",
        entries: &[
            (Color::hex("#01fff2"), "Água"),
            (Color::hex("#ffed89"), "Área antropizada"),
            (Color::hex("#dc515f"), "Área edificada"),
            (Color::hex("#60cc64"), "Formação florestal"),
            (Color::hex("#d6da5e"), "Silvicultura"),
        ],
    },
    Legend {
        overlay_label: GEOMORPHOLOGY,
        title: "Geomorfologia",
        entries: &[
            (Color::hex("#42dfe2"), "Planícies Litorâneas"),
            (Color::hex("#9fdc67"), "Serras do Leste Catarinense"),
            (Color::hex("#7923c9"), "Corpo d'água continental"),
        ],
    },
    Legend {
        overlay_label: GEOLOGY,
        title: "Geologia",
        entries: &[
            (Color::hex("#e14ddf"), "Botuverá"),
            (Color::hex("#da4c79"), "Corpo d'água continental"),
            (Color::hex("#57c9c9"), "Depósitos Aluvionares Holocênicos"),
            (Color::hex("#d98051"), "Depósitos Colúvio-aluvionares"),
            (Color::hex("#1d5ce4"), "Depósitos Litorâneos Holocênicos"),
            (Color::hex("#d5d574"), "Guabiruba"),
            (Color::hex("#7cd64f"), "Luiz Alves"),
            (Color::hex("#59cd80"), "Valsungana"),
        ],
    },
    Legend {
        overlay_label: VEGETATION,
        title: "Vegetação",
        entries: &[
            (Color::hex("#ea4f16"), "Floresta Ombrófila Densa Submontana"),
            (Color::hex("#3950e5"), "Agropecuária"),
            (Color::hex("#65e0b7"), "Influência urbana"),
            (Color::hex("#91c852"), "Corpo d'água continental"),
        ],
    },
    Legend {
        overlay_label: SOILS,
        title: "Solos (Pedologia)",
        entries: &[
            (Color::hex("#ff1a0b"), "Área Urbana"),
            (Color::hex("#4223dd"), "Corpo d'água continental"),
            (Color::hex("#e87d65"), "CYbd - Cambissolo Flúvico Tb Distrófico"),
            (Color::hex("#abc924"), "ESKo - Espodossolo Ferri-Humilúvico Órtico"),
            (Color::hex("#2cadca"), "PVAa - Argissolo Vermelho-Amarelo Alumínico"),
        ],
    },
];

pub fn legend_for(label: &str) -> Option<&'static Legend> {
    LEGENDS.iter().find(|l| l.overlay_label == label)
}

/// Which legends are on screen, in the order they were shown.
#[derive(Debug, Default)]
pub struct LegendSet {
    visible: Vec<&'static Legend>,
}

impl LegendSet {
    /// React to an overlay visibility change. Returns true when the set changed.
    pub fn handle(&mut self, event: &OverlayEvent) -> bool {
        let Some(legend) = legend_for(event.label()) else {
            return false;
        };

        match event {
            OverlayEvent::Shown(_) => {
                if self.is_visible(legend.overlay_label) {
                    return false;
                }
                self.visible.push(legend);
            }
            OverlayEvent::Hidden(_) => {
                let before = self.visible.len();
                self.visible.retain(|l| l.overlay_label != legend.overlay_label);
                if self.visible.len() == before {
                    return false;
                }
            }
        }
        true
    }

    pub fn is_visible(&self, overlay_label: &str) -> bool {
        self.visible.iter().any(|l| l.overlay_label == overlay_label)
    }

    pub fn visible(&self) -> impl DoubleEndedIterator<Item = &'static Legend> + '_ {
        self.visible.iter().copied()
    }

    /// Stack the visible legends in the bottom-right corner
    pub fn render(&self, ctx: &egui::Context) {
        if self.visible.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("thematic_legends"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -24.0))
            .interactable(false)
            .show(ctx, |ui| {
                for legend in self.visible().rev() {
                    egui::Frame::window(&ctx.style())
                        .fill(egui::Color32::from_rgba_unmultiplied(255, 255, 255, 230))
                        .corner_radius(4.0)
                        .inner_margin(egui::Margin::same(6))
                        .show(ui, |ui| render_legend(ui, legend));
                    ui.add_space(6.0);
                }
            });
    }
}

fn render_legend(ui: &mut egui::Ui, legend: &Legend) {
    ui.label(
        egui::RichText::new(legend.title)
            .strong()
            .size(12.0)
            .color(egui::Color32::from_rgb(30, 30, 30)),
    );

    for (color, text) in legend.entries {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 10.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 1.0, to_color32(*color, 1.0));
            ui.painter().rect_stroke(
                rect,
                1.0,
                egui::Stroke::new(0.5, egui::Color32::from_gray(80)),
                egui::StrokeKind::Inside,
            );
            ui.label(
                egui::RichText::new(*text)
                    .size(11.0)
                    .color(egui::Color32::from_rgb(40, 40, 40)),
            );
        });
    }
}
