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

//! Collapsible side panel with project notes and the load journal.

use eframe::egui;
use log::warn;

use crate::map::BaseLayer;
use crate::status::{DiagnosticLevel, LoadJournal};

const EXPANDED_TEXT: &str = "« recolher painel";
const COLLAPSED_TEXT: &str = "» expandir painel";

#[derive(Debug, Default)]
pub struct Sidebar {
    collapsed: bool,
}

impl Sidebar {
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Flip the collapsed flag and return the new button text.
    pub fn toggle(&mut self) -> &'static str {
        self.collapsed = !self.collapsed;
        self.button_text()
    }

    pub fn button_text(&self) -> &'static str {
        if self.collapsed {
            COLLAPSED_TEXT
        } else {
            EXPANDED_TEXT
        }
    }

    pub fn render(&mut self, ctx: &egui::Context, journal: &LoadJournal, data_root: &str) {
        if self.is_collapsed() {
            egui::SidePanel::left("sidebar_collapsed")
                .resizable(false)
                .exact_width(130.0)
                .show(ctx, |ui| {
                    ui.add_space(6.0);
                    if ui.button(self.button_text()).clicked() {
                        self.toggle();
                    }
                });
            return;
        }

        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                if ui.button(self.button_text()).clicked() {
                    self.toggle();
                }

                ui.add_space(8.0);
                ui.heading("Geoportal Balneário Camboriú");
                ui.label(
                    egui::RichText::new(
                        "Camadas temáticas do município e do Núcleo Urbano Informal Vila Fortaleza.",
                    )
                    .size(12.0),
                );
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new("Use o controle de camadas para ligar ou desligar os temas. \
                        Clique em uma feição para ver seus atributos ou no mapa para ver as coordenadas.")
                        .size(11.0)
                        .color(egui::Color32::from_gray(150)),
                );

                ui.separator();
                render_load_section(ui, journal, data_root);

                ui.separator();
                render_credits(ui);
            });
    }
}

fn render_credits(ui: &mut egui::Ui) {
    ui.label(
        egui::RichText::new("MAPAS BASE")
            .color(egui::Color32::from_rgb(150, 150, 150))
            .size(10.0)
            .strong(),
    );
    for layer in BaseLayer::ALL {
        let attribution = layer.attribution();
        let response = ui
            .link(egui::RichText::new(layer.display_name()).size(10.0))
            .on_hover_text(attribution.text);
        if response.clicked() {
            if let Err(e) = webbrowser::open(attribution.url) {
                warn!("Failed to open {}: {e}", attribution.url);
            }
        }
    }
}

fn render_load_section(ui: &mut egui::Ui, journal: &LoadJournal, data_root: &str) {
    ui.label(
        egui::RichText::new("CAMADAS")
            .color(egui::Color32::from_rgb(150, 150, 150))
            .size(10.0)
            .strong(),
    );
    ui.label(egui::RichText::new(format!("Origem: {data_root}")).size(10.0).monospace());

    let progress = if journal.is_finished() {
        format!("{} carregadas, {} com falha", journal.loaded(), journal.failed())
    } else {
        format!(
            "Carregando... {}/{}",
            journal.loaded() + journal.failed(),
            journal.expected()
        )
    };
    ui.label(egui::RichText::new(progress).size(11.0));

    ui.add_space(6.0);
    ui.label(
        egui::RichText::new("DIAGNÓSTICO")
            .color(egui::Color32::from_rgb(150, 150, 150))
            .size(10.0)
            .strong(),
    );

    if journal.diagnostics().is_empty() {
        ui.label(
            egui::RichText::new("Sem mensagens")
                .color(egui::Color32::from_rgb(100, 100, 100))
                .size(9.0)
                .italics(),
        );
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .show(ui, |ui| {
            // Newest first
            for diagnostic in journal.diagnostics().iter().rev() {
                ui.horizontal_wrapped(|ui| {
                    let (icon, color) = match diagnostic.level {
                        DiagnosticLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 180, 255)),
                        DiagnosticLevel::Warning => ("⚠", egui::Color32::from_rgb(255, 200, 100)),
                        DiagnosticLevel::Error => ("✕", egui::Color32::from_rgb(255, 100, 100)),
                    };

                    ui.label(egui::RichText::new(icon).color(color).size(9.0));
                    ui.label(
                        egui::RichText::new(diagnostic.timestamp.format("%H:%M:%S").to_string())
                            .color(egui::Color32::from_rgb(100, 100, 100))
                            .size(8.0)
                            .monospace(),
                    );
                    ui.label(egui::RichText::new(&diagnostic.message).size(9.0));
                });
            }
        });
}
