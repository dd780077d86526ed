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

//! Overlay sources: which files to load and the label each one is shown under.

use serde::{Deserialize, Serialize};

use crate::style::rules;

/// A file identifier paired with its human-readable layer label.
///
/// The label doubles as the registry key and the style rule key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySource {
    pub file: String,
    pub label: String,
}

impl OverlaySource {
    pub fn new(file: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            label: label.into(),
        }
    }
}

/// The deployed overlay list for the Balneário Camboriú study area.
#[must_use]
pub fn default_sources() -> Vec<OverlaySource> {
    [
        ("app.geojson", rules::APP),
        ("app_uso.geojson", rules::APP_USE),
        ("massa_dagua.geojson", rules::WATER_BODY),
        ("rio_duplos.geojson", rules::DOUBLE_RIVERS),
        ("rio_simples.geojson", rules::RIVERS_SIMPLE),
        ("nascentes_pt.geojson", rules::SPRINGS_POINTS),
        ("nascentes.geojson", rules::SPRINGS_AREAS),
        ("uso_ocupacao_SC_4202008_USO.geojson", rules::LAND_USE),
        ("curso_dagua_bc.geojson", rules::WATERCOURSES_BC),
        ("massa_dagua_bc.geojson", rules::WATER_BODIES_BC),
        ("geomorfologia.geojson", rules::GEOMORPHOLOGY),
        ("geologia.geojson", rules::GEOLOGY),
        ("vegetacao.geojson", rules::VEGETATION),
        ("pedologia.geojson", rules::SOILS),
        (
            "balneario_camboriu_santacatarina.geojson",
            "Balneário Camboriú - Limite Municipal",
        ),
        ("curva-nivel-10m.geojson", "Curvas de Nível - 10m"),
        ("municipios_santacatarina.geojson", rules::MUNICIPALITIES),
        ("estados_brasil.geojson", rules::STATES),
        ("nui_vilafortaleza.geojson", rules::INFORMAL_NUCLEUS),
    ]
    .into_iter()
    .map(|(file, label)| OverlaySource::new(file, label))
    .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_default_sources_have_unique_labels() {
        let sources = default_sources();
        assert_eq!(sources.len(), 19);

        let labels: HashSet<_> = sources.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels.len(), sources.len());
        assert!(labels.contains(rules::INFORMAL_NUCLEUS));
        for label in rules::THEMATIC_LABELS {
            assert!(labels.contains(label), "{label}");
        }
    }
}
