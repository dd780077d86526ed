//! Map canvas: base layer tiles and the overlay plugin.
//!
//! Base layers come from walkers `HttpTiles`; overlays and popups are drawn
//! by a walkers plugin on top of the tiles.

pub mod basemaps;
pub mod overlay_plugin;

pub use basemaps::{BaseLayer, BaseMaps};
pub use overlay_plugin::OverlayPlugin;
