//! Per-state, per-date choropleth styles paired with each state's geometry.

use crate::colors::ColorScale;
use crate::merge::JoinedRow;
use geojson::{Feature, FeatureCollection, Geometry};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

pub const FILL_OPACITY: f64 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub color: String,
    pub opacity: f64,
}

/// One choropleth feature: the state's boundary and its color on each date.
#[derive(Debug, Clone, PartialEq)]
pub struct StateLayer {
    pub state: String,
    pub geometry: Option<Geometry>,
    pub styles: BTreeMap<i64, Style>,
}

/// Ordered state layers. A layer's position is its feature id in the
/// rendered map, so geometry and styles cannot drift apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleIndex {
    pub layers: Vec<StateLayer>,
}

impl StyleIndex {
    /// Group rows by state in first-appearance order, then by date.
    pub fn build(rows: &[JoinedRow], scale: &ColorScale) -> Self {
        let mut layers: Vec<StateLayer> = Vec::new();
        for row in rows {
            let pos = match layers.iter().position(|l| l.state == row.state) {
                Some(pos) => pos,
                None => {
                    layers.push(StateLayer {
                        state: row.state.clone(),
                        geometry: None,
                        styles: BTreeMap::new(),
                    });
                    layers.len() - 1
                }
            };
            let layer = &mut layers[pos];
            if layer.geometry.is_none() {
                layer.geometry = row.geometry.clone();
            }
            layer.styles.insert(
                row.date,
                Style {
                    color: scale.color(row.cumul_full),
                    opacity: FILL_OPACITY,
                },
            );
        }
        Self { layers }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Sorted distinct timestamps across every layer.
    pub fn timestamps(&self) -> Vec<i64> {
        let mut all: Vec<i64> = self
            .layers
            .iter()
            .flat_map(|l| l.styles.keys().copied())
            .collect();
        all.sort_unstable();
        all.dedup();
        all
    }

    /// `{"0": {"<epoch>": {"color", "opacity"}}, "1": ...}` keyed by layer position.
    pub fn to_style_dict(&self) -> Value {
        let mut dict = Map::new();
        for (idx, layer) in self.layers.iter().enumerate() {
            let mut by_date = Map::new();
            for (date, style) in &layer.styles {
                by_date.insert(
                    date.to_string(),
                    json!({ "color": style.color, "opacity": style.opacity }),
                );
            }
            dict.insert(idx.to_string(), Value::Object(by_date));
        }
        Value::Object(dict)
    }

    /// Feature ids match the keys of [`StyleIndex::to_style_dict`].
    /// A state without a boundary keeps its slot with a null geometry.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .layers
            .iter()
            .enumerate()
            .map(|(idx, layer)| {
                let mut feature = Feature {
                    bbox: None,
                    geometry: layer.geometry.clone(),
                    id: Some(geojson::feature::Id::String(idx.to_string())),
                    properties: None,
                    foreign_members: None,
                };
                feature.set_property("state", layer.state.clone());
                feature
            })
            .collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Value as GeoValue;

    fn row(date: i64, state: &str, cumul_full: f64, with_geometry: bool) -> JoinedRow {
        JoinedRow {
            date,
            state: state.to_string(),
            cumul_full,
            pop: None,
            lat: None,
            lng: None,
            geometry: with_geometry.then(|| Geometry::new(GeoValue::Point(vec![101.0, 3.0]))),
            percent_vaccinated: None,
        }
    }

    fn fixture() -> Vec<JoinedRow> {
        vec![
            row(100, "Terengganu", 200.0, true),
            row(100, "Labuan", 10.0, true),
            row(200, "Terengganu", 300.0, true),
            row(200, "Labuan", 20.0, true),
        ]
    }

    #[test]
    fn one_layer_per_state_in_first_appearance_order() {
        let rows = fixture();
        let scale = ColorScale::from_rows(&rows).unwrap();
        let index = StyleIndex::build(&rows, &scale);
        assert_eq!(index.len(), 2);
        assert_eq!(index.layers[0].state, "Terengganu");
        assert_eq!(index.layers[1].state, "Labuan");
        for layer in &index.layers {
            assert_eq!(layer.styles.keys().copied().collect::<Vec<_>>(), vec![100, 200]);
            assert!(layer.styles.values().all(|s| s.opacity == FILL_OPACITY));
        }
    }

    #[test]
    fn no_rows_means_empty_index() {
        let scale = ColorScale::new(0.0, 1.0);
        let index = StyleIndex::build(&[], &scale);
        assert!(index.is_empty());
        assert!(index.to_feature_collection().features.is_empty());
        assert!(!StyleIndex::build(&fixture(), &scale).is_empty());
    }

    #[test]
    fn colors_follow_global_scale() {
        let rows = fixture();
        let scale = ColorScale::from_rows(&rows).unwrap();
        let index = StyleIndex::build(&rows, &scale);
        assert_eq!(index.layers[1].styles[&100].color, "#ffffcc");
        assert_eq!(index.layers[0].styles[&200].color, "#800026");
    }

    #[test]
    fn style_dict_is_keyed_by_position() {
        let rows = fixture();
        let scale = ColorScale::from_rows(&rows).unwrap();
        let dict = StyleIndex::build(&rows, &scale).to_style_dict();
        let obj = dict.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["0", "1"]);
        for entry in obj.values() {
            assert_eq!(entry.as_object().unwrap().len(), 2);
        }
        assert_eq!(dict["0"]["200"]["opacity"], 0.7);
        assert_eq!(dict["0"]["200"]["color"], "#800026");
    }

    #[test]
    fn dates_per_state_are_exactly_its_own() {
        let rows = vec![
            row(100, "Johor", 1.0, true),
            row(200, "Johor", 2.0, true),
            row(300, "Perlis", 3.0, true),
        ];
        let scale = ColorScale::from_rows(&rows).unwrap();
        let index = StyleIndex::build(&rows, &scale);
        assert_eq!(index.layers[1].styles.len(), 1);
        assert!(index.layers[1].styles.contains_key(&300));
        assert_eq!(index.timestamps(), vec![100, 200, 300]);
    }

    #[test]
    fn features_align_with_style_keys() {
        let rows = vec![
            row(100, "Sabah", 1.0, false),
            row(100, "Johor", 2.0, true),
        ];
        let scale = ColorScale::from_rows(&rows).unwrap();
        let index = StyleIndex::build(&rows, &scale);
        let fc = index.to_feature_collection();
        assert_eq!(fc.features.len(), index.len());
        assert!(fc.features[0].geometry.is_none());
        assert!(fc.features[1].geometry.is_some());
        assert_eq!(
            fc.features[1].id,
            Some(geojson::feature::Id::String("1".to_string()))
        );
        assert_eq!(
            fc.features[1].property("state").and_then(|v| v.as_str()),
            Some("Johor")
        );
    }
}
