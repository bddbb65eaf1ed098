//! State boundary polygons from an administrative-level-1 shapefile.

use crate::error::{Error, Result};
use geojson::{Geometry, PolygonType, Value};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{Point, Polygon, PolygonRing};
use std::path::Path;
use tracing::{info, warn};

/// Attribute holding the state name in GADM level-1 files.
pub const NAME_FIELD: &str = "NAME_1";

#[derive(Debug, Clone, PartialEq)]
pub struct BorderRecord {
    pub name: String,
    pub geometry: Geometry,
}

/// Read every polygon and its state name. Records without a name are skipped.
pub fn read_borders(path: &Path) -> Result<Vec<BorderRecord>> {
    let shapes = shapefile::read_as::<_, Polygon, Record>(path).map_err(|source| {
        Error::Shapefile {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let mut borders = Vec::with_capacity(shapes.len());
    for (polygon, record) in shapes {
        let Some(name) = field_text(record.get(NAME_FIELD)) else {
            warn!(path = %path.display(), "border record without {NAME_FIELD}, skipped");
            continue;
        };
        borders.push(BorderRecord {
            name,
            geometry: polygon_to_geometry(&polygon),
        });
    }
    info!(borders = borders.len(), "state borders loaded");
    Ok(borders)
}

fn field_text(value: Option<&FieldValue>) -> Option<String> {
    match value {
        Some(FieldValue::Character(Some(text))) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Some(FieldValue::Memo(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        _ => None,
    }
}

/// Convert a shapefile polygon into a GeoJSON MultiPolygon.
/// Each outer ring opens a new polygon; inner rings attach to the last one.
pub fn polygon_to_geometry(polygon: &Polygon) -> Geometry {
    Geometry::new(Value::MultiPolygon(rings_to_polygons(polygon.rings())))
}

fn rings_to_polygons(rings: &[PolygonRing<Point>]) -> Vec<PolygonType> {
    let mut polygons: Vec<PolygonType> = Vec::new();
    for ring in rings {
        let coords: Vec<Vec<f64>> = ring.points().iter().map(|p| vec![p.x, p.y]).collect();
        match ring {
            PolygonRing::Outer(_) => polygons.push(vec![coords]),
            PolygonRing::Inner(_) => match polygons.last_mut() {
                Some(current) => current.push(coords),
                // Hole before any shell; keep it as its own shell.
                None => polygons.push(vec![coords]),
            },
        }
    }
    polygons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x, y + size),
            Point::new(x + size, y + size),
            Point::new(x + size, y),
            Point::new(x, y),
        ]
    }

    #[test]
    fn outer_rings_start_polygons() {
        let rings = vec![
            PolygonRing::Outer(square(0.0, 0.0, 10.0)),
            PolygonRing::Inner(square(2.0, 2.0, 1.0)),
            PolygonRing::Outer(square(20.0, 20.0, 5.0)),
        ];
        let polygons = rings_to_polygons(&rings);
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].len(), 2);
        assert_eq!(polygons[1].len(), 1);
        assert_eq!(polygons[1][0][0], vec![20.0, 20.0]);
    }

    #[test]
    fn geometry_is_multipolygon() {
        let polygon = Polygon::new(PolygonRing::Outer(square(101.0, 3.0, 1.0)));
        let geometry = polygon_to_geometry(&polygon);
        match geometry.value {
            Value::MultiPolygon(polys) => {
                assert_eq!(polys.len(), 1);
                assert_eq!(polys[0][0].len(), 5);
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn names_come_from_character_fields() {
        let value = FieldValue::Character(Some("Trengganu ".to_string()));
        assert_eq!(field_text(Some(&value)), Some("Trengganu".to_string()));
        assert_eq!(field_text(Some(&FieldValue::Character(None))), None);
        assert_eq!(field_text(None), None);
    }

    #[test]
    fn missing_shapefile_fails() {
        let err = read_borders(Path::new("no/such/MYS_adm1.shp")).unwrap_err();
        assert!(matches!(err, Error::Shapefile { .. }));
    }
}
