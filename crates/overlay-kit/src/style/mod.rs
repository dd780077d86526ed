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

//! Style resolution for overlay features.
//!
//! Every overlay label maps to one [`StyleRule`] in a static table
//! ([`rules::RULES`]). A rule is either a fixed descriptor, a categorical
//! rule keyed on one feature attribute, or a point symbol for layers drawn
//! as circle markers. Labels without a rule use [`rules::DEFAULT_STYLE`].

pub mod rules;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::document::Properties;

pub use rules::{
    informal_nucleus_style, DEFAULT_STYLE, FALLBACK_FILL, INFORMAL_NUCLEUS, RULES,
    THEMATIC_LABELS,
};

/// Stroke opacity used when a descriptor leaves it unset.
pub const DEFAULT_STROKE_OPACITY: f32 = 1.0;

/// Fill opacity used when a descriptor only defines a stroke.
pub const DEFAULT_FILL_OPACITY: f32 = 0.2;

/// Errors produced when parsing a `#rrggbb` color string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must be 7 characters like #rrggbb, got {0:?}")]
    Length(String),

    #[error("invalid hex digit in color {0:?}")]
    Digit(String),
}

/// Opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a `#rrggbb` literal at compile time.
    ///
    /// Only meant for constant tables: a malformed literal fails the build.
    #[must_use]
    pub const fn hex(literal: &str) -> Self {
        let bytes = literal.as_bytes();
        assert!(
            bytes.len() == 7 && bytes[0] == b'#',
            "color literal must look like #rrggbb"
        );
        Self {
            r: (nibble(bytes[1]) << 4) | nibble(bytes[2]),
            g: (nibble(bytes[3]) << 4) | nibble(bytes[4]),
            b: (nibble(bytes[5]) << 4) | nibble(bytes[6]),
        }
    }
}

const fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => panic!("invalid hex digit in color literal"),
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .filter(|d| d.len() == 6)
            .ok_or_else(|| ColorParseError::Length(s.to_string()))?;

        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| ColorParseError::Digit(s.to_string()))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Stroke and fill settings applied to one rendered feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleDescriptor {
    pub stroke_color: Color,
    pub stroke_weight: f32,
    /// `None` means fully opaque.
    pub stroke_opacity: Option<f32>,
    pub fill_color: Color,
    pub fill_opacity: f32,
}

impl StyleDescriptor {
    /// Stroke-only descriptor; the fill inherits the stroke color at the
    /// default fill opacity.
    #[must_use]
    pub const fn stroke(color: Color, weight: f32) -> Self {
        Self {
            stroke_color: color,
            stroke_weight: weight,
            stroke_opacity: None,
            fill_color: color,
            fill_opacity: DEFAULT_FILL_OPACITY,
        }
    }

    #[must_use]
    pub const fn with_fill(mut self, color: Color, opacity: f32) -> Self {
        self.fill_color = color;
        self.fill_opacity = opacity;
        self
    }

    #[must_use]
    pub const fn with_fill_opacity(mut self, opacity: f32) -> Self {
        self.fill_opacity = opacity;
        self
    }

    #[must_use]
    pub const fn with_stroke_opacity(mut self, opacity: f32) -> Self {
        self.stroke_opacity = Some(opacity);
        self
    }

    #[must_use]
    pub fn effective_stroke_opacity(&self) -> f32 {
        self.stroke_opacity.unwrap_or(DEFAULT_STROKE_OPACITY)
    }

    /// Merge the fields set in `patch` into this descriptor.
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(color) = patch.stroke_color {
            self.stroke_color = color;
        }
        if let Some(weight) = patch.stroke_weight {
            self.stroke_weight = weight;
        }
        if let Some(opacity) = patch.stroke_opacity {
            self.stroke_opacity = Some(opacity);
        }
        if let Some(color) = patch.fill_color {
            self.fill_color = color;
        }
        if let Some(opacity) = patch.fill_opacity {
            self.fill_opacity = opacity;
        }
    }
}

/// Partial style update applied to a live layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StylePatch {
    pub stroke_color: Option<Color>,
    pub stroke_weight: Option<f32>,
    pub stroke_opacity: Option<f32>,
    pub fill_color: Option<Color>,
    pub fill_opacity: Option<f32>,
}

impl StylePatch {
    /// Patch that sets both stroke and fill opacity to `opacity`.
    #[must_use]
    pub fn opacity(opacity: f32) -> Self {
        Self {
            stroke_opacity: Some(opacity),
            fill_opacity: Some(opacity),
            ..Self::default()
        }
    }

    /// Fold a later patch into this one; fields set in `later` win.
    pub fn merge(&mut self, later: &Self) {
        self.stroke_color = later.stroke_color.or(self.stroke_color);
        self.stroke_weight = later.stroke_weight.or(self.stroke_weight);
        self.stroke_opacity = later.stroke_opacity.or(self.stroke_opacity);
        self.fill_color = later.fill_color.or(self.fill_color);
        self.fill_opacity = later.fill_opacity.or(self.fill_opacity);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Circle marker used for point layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSymbol {
    pub radius: f32,
    pub stroke_color: Color,
    pub stroke_weight: f32,
    pub fill_color: Color,
    pub fill_opacity: f32,
}

/// Fill color chosen by the value of a single feature attribute.
#[derive(Debug, Clone, Copy)]
pub struct CategoricalRule {
    pub attribute: &'static str,
    pub base: StyleDescriptor,
    pub categories: &'static [(&'static str, Color)],
    pub fallback_fill: Color,
}

impl CategoricalRule {
    /// Fill color for an attribute value; unknown or missing values get the
    /// fallback fill.
    #[must_use]
    pub fn fill_for(&self, value: Option<&str>) -> Color {
        value
            .and_then(|v| {
                self.categories
                    .iter()
                    .find(|(category, _)| *category == v)
                    .map(|(_, color)| *color)
            })
            .unwrap_or(self.fallback_fill)
    }

    #[must_use]
    pub fn resolve(&self, properties: Option<&Properties>) -> StyleDescriptor {
        let value = properties
            .and_then(|props| props.get(self.attribute))
            .and_then(serde_json::Value::as_str);

        let mut style = self.base;
        style.fill_color = self.fill_for(value);
        style
    }
}

/// How a labelled overlay is styled.
#[derive(Debug, Clone, Copy)]
pub enum StyleRule {
    Fixed(StyleDescriptor),
    Categorical(CategoricalRule),
    Point(PointSymbol),
}

/// Rendering path for a whole layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerRenderer {
    /// Paths and areas styled per feature through [`resolve_style`].
    Styled,
    /// Point geometries drawn as circle markers.
    PointSymbol(PointSymbol),
}

/// Look up the rule configured for `label`.
#[must_use]
pub fn rule_for(label: &str) -> Option<&'static StyleRule> {
    RULES
        .iter()
        .find(|(rule_label, _)| *rule_label == label)
        .map(|(_, rule)| rule)
}

/// Resolve the style for one feature of the overlay called `label`.
///
/// `properties` is only consulted by categorical rules. Labels without a
/// rule, and point-symbol layers (whose non-point geometries still need a
/// path style), resolve to [`DEFAULT_STYLE`].
#[must_use]
pub fn resolve_style(label: &str, properties: Option<&Properties>) -> StyleDescriptor {
    match rule_for(label) {
        Some(StyleRule::Fixed(style)) => *style,
        Some(StyleRule::Categorical(rule)) => rule.resolve(properties),
        Some(StyleRule::Point(_)) | None => DEFAULT_STYLE,
    }
}

/// Pick the rendering path for the overlay called `label`.
#[must_use]
pub fn renderer_for(label: &str) -> LayerRenderer {
    match rule_for(label) {
        Some(StyleRule::Point(symbol)) => LayerRenderer::PointSymbol(*symbol),
        _ => LayerRenderer::Styled,
    }
}
