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

//! Base layer tile sources.

use std::path::Path;

use eframe::egui;
use serde::{Deserialize, Serialize};
use walkers::sources::{Attribution, TileSource};
use walkers::{HttpOptions, HttpTiles, TileId};

/// Mutually exclusive base layers offered in the layers control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseLayer {
    #[default]
    Satellite,
    Territorial,
}

impl BaseLayer {
    pub const ALL: [BaseLayer; 2] = [BaseLayer::Satellite, BaseLayer::Territorial];

    /// Name shown next to the radio button
    pub fn display_name(self) -> &'static str {
        match self {
            BaseLayer::Satellite => "Imagem de Satélite (Esri)",
            BaseLayer::Territorial => "Mapa Territorial (OSM)",
        }
    }

    /// Credits of the tile provider behind this layer
    pub fn attribution(self) -> Attribution {
        match self {
            BaseLayer::Satellite => EsriWorldImagery.attribution(),
            BaseLayer::Territorial => OpenStreetMapTerritorial.attribution(),
        }
    }

    fn cache_key(self) -> &'static str {
        match self {
            BaseLayer::Satellite => "esri_world_imagery",
            BaseLayer::Territorial => "osm",
        }
    }
}

/// Esri World Imagery satellite tiles
pub struct EsriWorldImagery;

impl TileSource for EsriWorldImagery {
    fn tile_url(&self, tile_id: TileId) -> String {
        // Esri orders the path as z/y/x
        format!(
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{}/{}/{}",
            tile_id.zoom, tile_id.y, tile_id.x
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "Tiles © Esri — Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community",
            url: "https://www.esri.com/",
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// OpenStreetMap standard tiles
/// Uses subdomain load balancing across a-c.tile.openstreetmap.org
pub struct OpenStreetMapTerritorial;

impl TileSource for OpenStreetMapTerritorial {
    fn tile_url(&self, tile_id: TileId) -> String {
        let subdomain = ['a', 'b', 'c'][((tile_id.x + tile_id.y) % 3) as usize];

        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            subdomain, tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenStreetMap contributors",
            url: "https://www.openstreetmap.org/copyright",
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// Disk-cached tile fetchers for both base layers; only the selected one is drawn.
pub struct BaseMaps {
    satellite: HttpTiles,
    territorial: HttpTiles,
}

impl BaseMaps {
    pub fn new(ctx: &egui::Context, cache_root: &Path) -> Self {
        let options = |layer: BaseLayer| HttpOptions {
            cache: Some(cache_root.join(layer.cache_key())),
            ..Default::default()
        };

        Self {
            satellite: HttpTiles::with_options(
                EsriWorldImagery,
                options(BaseLayer::Satellite),
                ctx.clone(),
            ),
            territorial: HttpTiles::with_options(
                OpenStreetMapTerritorial,
                options(BaseLayer::Territorial),
                ctx.clone(),
            ),
        }
    }

    pub fn tiles_mut(&mut self, layer: BaseLayer) -> &mut HttpTiles {
        match layer {
            BaseLayer::Satellite => &mut self.satellite,
            BaseLayer::Territorial => &mut self.territorial,
        }
    }
}
