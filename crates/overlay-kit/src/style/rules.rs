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

//! Label-keyed style table derived from the project's SLD style sheets.

use super::{CategoricalRule, Color, PointSymbol, StyleDescriptor, StyleRule};

pub const APP: &str = "APP";
pub const APP_USE: &str = "APP - Uso";
pub const WATER_BODY: &str = "Massa d'Água";
pub const DOUBLE_RIVERS: &str = "Rios (Duplos)";
pub const RIVERS_SIMPLE: &str = "Rios (Simples)";
pub const SPRINGS_POINTS: &str = "Nascentes (Pontos)";
pub const SPRINGS_AREAS: &str = "Nascentes (Polígonos/Linhas)";
pub const LAND_USE: &str = "Uso e Ocupação - Município 4202008";
pub const WATERCOURSES_BC: &str = "Cursos d'Água - Bal. Camboriú";
pub const WATER_BODIES_BC: &str = "Massas d'Água - Bal. Camboriú";
pub const GEOMORPHOLOGY: &str = "Geomorfologia";
pub const GEOLOGY: &str = "Geologia";
pub const VEGETATION: &str = "Vegetação";
pub const SOILS: &str = "Pedologia (Solos)";
pub const MUNICIPALITIES: &str = "Municípios - SC";
pub const STATES: &str = "Estados do Brasil";

/// Overlay whose style is driven by the opacity slider instead of this table.
pub const INFORMAL_NUCLEUS: &str = "Núcleo Urbano Informal - Vila Fortaleza";

/// Overlays styled by a categorical rule; each one has a legend panel.
pub const THEMATIC_LABELS: [&str; 5] = [LAND_USE, GEOMORPHOLOGY, GEOLOGY, VEGETATION, SOILS];

/// Fill used for attribute values missing from a categorical table.
pub const FALLBACK_FILL: Color = Color::hex("#cccccc");

/// Style for any label without a rule.
pub const DEFAULT_STYLE: StyleDescriptor =
    StyleDescriptor::stroke(Color::hex("#0052cc"), 1.0).with_fill(Color::hex("#3388ff"), 0.3);

const OUTLINE: Color = Color::hex("#232323");

const fn outlined(fill: &str, fill_opacity: f32) -> StyleDescriptor {
    StyleDescriptor::stroke(OUTLINE, 1.0).with_fill(Color::hex(fill), fill_opacity)
}

const CATEGORICAL_BASE: StyleDescriptor =
    StyleDescriptor::stroke(OUTLINE, 1.0).with_fill(FALLBACK_FILL, 0.7);

const fn categorical(
    attribute: &'static str,
    categories: &'static [(&'static str, Color)],
) -> StyleRule {
    StyleRule::Categorical(CategoricalRule {
        attribute,
        base: CATEGORICAL_BASE,
        categories,
        fallback_fill: FALLBACK_FILL,
    })
}

const LAND_USE_CLASSES: &[(&str, Color)] = &[
    ("água", Color::hex("#01fff2")),
    ("área antropizada", Color::hex("#ffed89")),
    ("área edificada", Color::hex("#dc515f")),
    ("formação florestal", Color::hex("#60cc64")),
    ("silvicultura", Color::hex("#d6da5e")),
];

const GEOMORPHOLOGY_UNITS: &[(&str, Color)] = &[
    ("1Planícies Litorâneas", Color::hex("#42dfe2")),
    ("4Serras do Leste Catarinense", Color::hex("#9fdc67")),
    ("6Corpo d´água continental", Color::hex("#7923c9")),
];

const GEOLOGY_UNITS: &[(&str, Color)] = &[
    ("Botuverá", Color::hex("#e14ddf")),
    ("Corpo d'água continental", Color::hex("#da4c79")),
    ("Depósitos Aluvionares Holocênicos", Color::hex("#57c9c9")),
    ("Depósitos Colúvio-aluvionares", Color::hex("#d98051")),
    ("Depósitos Litorâneos Holocênicos", Color::hex("#1d5ce4")),
    ("Guabiruba", Color::hex("#d5d574")),
    ("Luiz Alves", Color::hex("#7cd64f")),
    ("Valsungana", Color::hex("#59cd80")),
];

const VEGETATION_CLASSES: &[(&str, Color)] = &[
    ("1Ds - Floresta Ombrófila Densa Submontana", Color::hex("#ea4f16")),
    ("3Ag - Agropecuária", Color::hex("#3950e5")),
    ("3Iu - Influência urbana", Color::hex("#65e0b7")),
    ("5Corpo d'água continental", Color::hex("#91c852")),
];

// Only the five classes present in the study area's style sheet.
const SOIL_CLASSES: &[(&str, Color)] = &[
    ("Área Urbana", Color::hex("#ff1a0b")),
    ("Corpo d'água continental", Color::hex("#4223dd")),
    ("CYbd - Cambissolo Flúvico Tb Distrófico", Color::hex("#e87d65")),
    ("ESKo - Espodossolo Ferri-Humilúvico Órtico", Color::hex("#abc924")),
    ("PVAa - Argissolo Vermelho-Amarelo Alumínico", Color::hex("#2cadca")),
];

const WATER: StyleDescriptor = outlined("#aadeff", 0.7);
const WATERCOURSE: StyleDescriptor = StyleDescriptor::stroke(Color::hex("#487bb6"), 2.0);

/// Rule table, one row per configured overlay label.
pub static RULES: &[(&str, StyleRule)] = &[
    (APP, StyleRule::Fixed(outlined("#9abe97", 0.6))),
    (APP_USE, StyleRule::Fixed(outlined("#80d899", 0.6))),
    (WATER_BODY, StyleRule::Fixed(WATER)),
    (WATER_BODIES_BC, StyleRule::Fixed(WATER)),
    (RIVERS_SIMPLE, StyleRule::Fixed(WATERCOURSE)),
    (WATERCOURSES_BC, StyleRule::Fixed(WATERCOURSE)),
    (DOUBLE_RIVERS, StyleRule::Fixed(outlined("#71c4e8", 0.7))),
    (SPRINGS_AREAS, StyleRule::Fixed(outlined("#a6b8f3", 0.7))),
    (
        SPRINGS_POINTS,
        StyleRule::Point(PointSymbol {
            radius: 4.0,
            stroke_color: OUTLINE,
            stroke_weight: 0.5,
            fill_color: Color::hex("#0043ff"),
            fill_opacity: 1.0,
        }),
    ),
    (LAND_USE, categorical("CLASSE_USO", LAND_USE_CLASSES)),
    (
        MUNICIPALITIES,
        StyleRule::Fixed(
            StyleDescriptor::stroke(Color::hex("#ffffff"), 1.0)
                .with_stroke_opacity(0.5)
                .with_fill(Color::hex("#fa4b3c"), 0.2),
        ),
    ),
    (
        STATES,
        StyleRule::Fixed(StyleDescriptor::stroke(Color::hex("#ff0003"), 1.0).with_fill_opacity(0.0)),
    ),
    (GEOMORPHOLOGY, categorical("legenda", GEOMORPHOLOGY_UNITS)),
    (GEOLOGY, categorical("nm_unidade", GEOLOGY_UNITS)),
    (VEGETATION, categorical("legenda", VEGETATION_CLASSES)),
    (SOILS, categorical("legenda", SOIL_CLASSES)),
];

/// Style of the informal urban nucleus overlay at the given opacity.
#[must_use]
pub fn informal_nucleus_style(opacity: f32) -> StyleDescriptor {
    let red = Color::hex("#ff0000");
    StyleDescriptor::stroke(red, 2.0)
        .with_stroke_opacity(opacity)
        .with_fill(red, opacity)
}
