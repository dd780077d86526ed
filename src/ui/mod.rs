//! UI components for Geoportal Desktop.
//!
//! This module contains the floating controls drawn over the map and the
//! coordinator that keeps them in step with overlay visibility.

pub mod coordinator;
pub mod layers_control;
pub mod legend;
pub mod opacity;
pub mod popup;
pub mod sidebar;

pub use coordinator::UiCoordinator;
pub use layers_control::{LayersAction, LayersControl};
pub use legend::LegendSet;
pub use opacity::{Attachment, OpacityControl, OpacityState};
pub use popup::Popup;
pub use sidebar::Sidebar;

use eframe::egui;
use overlay_kit::Color;

/// Convert a style color and opacity into an egui color.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "opacity is clamped to 0..=1 first")]
pub fn to_color32(color: Color, opacity: f32) -> egui::Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}
