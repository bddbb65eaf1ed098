//! Static Leaflet page: base tiles, time-slider choropleth, legend and
//! clustered percentage markers.

use crate::colors::ColorScale;
use crate::error::{Error, Result};
use crate::merge::JoinedRow;
use crate::style::StyleIndex;
use geojson::GeoJson;
use serde::Serialize;
use serde_json::json;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tracing::info;

pub const LEGEND_CAPTION: &str = "Number of confirmed full vaccination x1000";
const LEGEND_TICKS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TileLayer {
    pub name: &'static str,
    pub url: &'static str,
    pub attribution: &'static str,
}

pub const TILE_LAYERS: &[TileLayer] = &[
    TileLayer {
        name: "CartoDB Positron",
        url: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
        attribution: "&copy; OpenStreetMap contributors &copy; CARTO",
    },
    TileLayer {
        name: "Stamen Terrain",
        url: "https://tiles.stadiamaps.com/tiles/stamen_terrain/{z}/{x}/{y}{r}.png",
        attribution: "&copy; Stadia Maps &copy; Stamen Design &copy; OpenStreetMap contributors",
    },
    TileLayer {
        name: "Stamen Toner",
        url: "https://tiles.stadiamaps.com/tiles/stamen_toner/{z}/{x}/{y}{r}.png",
        attribution: "&copy; Stadia Maps &copy; Stamen Design &copy; OpenStreetMap contributors",
    },
    TileLayer {
        name: "Stamen Watercolor",
        url: "https://tiles.stadiamaps.com/tiles/stamen_watercolor/{z}/{x}/{y}.jpg",
        attribution: "&copy; Stadia Maps &copy; Stamen Design &copy; OpenStreetMap contributors",
    },
    TileLayer {
        name: "CartoDB Dark Matter",
        url: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
        attribution: "&copy; OpenStreetMap contributors &copy; CARTO",
    },
];

/// South-west and north-east corners of the whole world, as `[lat, lng]`.
pub const WORLD_BOUNDS: [[f64; 2]; 2] = [[-90.0, -180.0], [90.0, 180.0]];

/// Map framing. Defaults show peninsular and East Malaysia; panning stops at
/// the edge of the world instead of wrapping.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    pub max_bounds: Option<[[f64; 2]; 2]>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [5.0, 101.0],
            zoom: 6,
            max_bounds: Some(WORLD_BOUNDS),
        }
    }
}

/// Tooltip text: percentage rounded to two decimals.
pub fn percent_label(percent_vaccinated: Option<f64>) -> String {
    match percent_vaccinated {
        Some(p) if p.is_finite() => format!("{:.2}%", p * 100.0),
        _ => "n/a".to_string(),
    }
}

/// One marker per row that has both coordinates; the rest are skipped.
pub fn markers(rows: &[JoinedRow]) -> Vec<Marker> {
    rows.iter()
        .filter_map(|row| match (row.lat, row.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some(Marker {
                lat,
                lng,
                label: percent_label(row.percent_vaccinated),
            }),
            _ => None,
        })
        .collect()
}

/// JSON text made safe for a `<script>` block.
fn script_json(json: &impl Display) -> String {
    json.to_string().replace("</", "<\\/")
}

pub fn render_page(
    index: &StyleIndex,
    scale: &ColorScale,
    markers: &[Marker],
    view: &MapView,
) -> String {
    let legend = json!({
        "caption": LEGEND_CAPTION,
        "stops": ColorScale::stops(),
        "ticks": scale.ticks(LEGEND_TICKS),
    });
    let config = json!({
        "view": view,
        "tiles": TILE_LAYERS,
        "timestamps": index.timestamps(),
    });

    PAGE_TEMPLATE
        .replace("__CONFIG__", &script_json(&config))
        .replace(
            "__FEATURES__",
            &script_json(&GeoJson::from(index.to_feature_collection())),
        )
        .replace("__STYLES__", &script_json(&index.to_style_dict()))
        .replace("__LEGEND__", &script_json(&legend))
        .replace("__MARKERS__", &script_json(&json!(markers)))
}

pub fn write_page(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = html.len(), "map written");
    Ok(())
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Full vaccination by state</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"></script>
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.css" />
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.Default.css" />
  <script src="https://unpkg.com/leaflet.markercluster@1.4.1/dist/leaflet.markercluster.js"></script>
  <style>
    html, body { height: 100%; margin: 0; padding: 0; }
    #map { position: absolute; top: 0; bottom: 0; left: 0; right: 0; }
    .slider-box {
      position: absolute; top: 10px; left: 60px; z-index: 1000;
      background: rgba(255, 255, 255, 0.9); padding: 6px 10px; border-radius: 4px;
      font: 13px sans-serif;
    }
    .slider-box input { width: 320px; vertical-align: middle; }
    .legend { background: rgba(255, 255, 255, 0.9); padding: 6px 10px; border-radius: 4px; font: 11px sans-serif; }
    .legend .bar { width: 300px; height: 12px; }
    .legend .ticks { position: relative; width: 300px; height: 14px; }
    .legend .ticks span { position: absolute; transform: translateX(-50%); }
    .legend .caption { margin-top: 2px; font-weight: bold; }
  </style>
</head>
<body>
  <div id="map"></div>
  <div class="slider-box">
    <input id="slider" type="range" min="0" value="0" step="1" />
    <span id="slider-date"></span>
  </div>
  <script>
    const config = __CONFIG__;
    const features = __FEATURES__;
    const styles = __STYLES__;
    const legend = __LEGEND__;
    const markers = __MARKERS__;

    const map = L.map('map', { center: config.view.center, zoom: config.view.zoom });
    const baseLayers = {};
    config.tiles.forEach((tile, i) => {
      const layer = L.tileLayer(tile.url, { attribution: tile.attribution, subdomains: 'abcd', maxZoom: 18 });
      if (i === 0) layer.addTo(map);
      baseLayers[tile.name] = layer;
    });

    const choropleth = L.geoJSON(features, {
      style: () => ({ color: '#555555', weight: 1, fillOpacity: 0 })
    }).addTo(map);

    if (config.view.max_bounds) {
      map.setMaxBounds(config.view.max_bounds);
    }

    function applyStyles(timestamp) {
      choropleth.eachLayer((layer) => {
        const byDate = styles[layer.feature.id] || {};
        const style = byDate[timestamp];
        layer.setStyle(style
          ? { fillColor: style.color, fillOpacity: style.opacity, opacity: style.opacity }
          : { fillOpacity: 0, opacity: 0 });
      });
    }

    const slider = document.getElementById('slider');
    const sliderDate = document.getElementById('slider-date');
    slider.max = Math.max(config.timestamps.length - 1, 0);
    function onSlide() {
      const ts = config.timestamps[Number(slider.value)];
      if (ts === undefined) return;
      sliderDate.textContent = new Date(ts * 1000).toISOString().slice(0, 10);
      applyStyles(String(ts));
    }
    slider.addEventListener('input', onSlide);
    onSlide();

    const legendControl = L.control({ position: 'topright' });
    legendControl.onAdd = () => {
      const div = L.DomUtil.create('div', 'legend');
      const bar = L.DomUtil.create('div', 'bar', div);
      bar.style.background = 'linear-gradient(to right, ' + legend.stops.join(', ') + ')';
      const ticks = L.DomUtil.create('div', 'ticks', div);
      const n = legend.ticks.length;
      legend.ticks.forEach((value, i) => {
        const span = L.DomUtil.create('span', '', ticks);
        span.style.left = (n > 1 ? (100 * i) / (n - 1) : 0) + '%';
        span.textContent = Number(value).toFixed(value >= 100 ? 0 : 1);
      });
      const caption = L.DomUtil.create('div', 'caption', div);
      caption.textContent = legend.caption;
      return div;
    };
    legendControl.addTo(map);

    const cluster = L.markerClusterGroup();
    markers.forEach((m) => {
      cluster.addLayer(L.marker([m.lat, m.lng]).bindTooltip(m.label));
    });
    map.addLayer(cluster);

    L.control.layers(baseLayers, { 'Vaccination': choropleth, 'Markers': cluster }).addTo(map);
  </script>
</body>
</html>
"#;
