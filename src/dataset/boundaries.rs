use crate::dataset::spatial::{BBox, FeatureGrid};
use crate::error::LoadError;
use geojson::{GeoJson, Geometry, Value};
use glam::DVec2;
use std::fs;
use std::path::Path;

/// Feature property carrying the district name (join key with the sheet)
pub const NAME_PROPERTY: &str = "Dist_Name";

/// Grid cell size in degrees. MP districts are roughly 1° across.
const GRID_CELL_DEGREES: f64 = 0.5;

/// Closed ring of (lon, lat) points
pub type Ring = Vec<DVec2>;

/// Exterior ring followed by holes
pub type Polygon = Vec<Ring>;

/// One district boundary
#[derive(Debug, Clone)]
pub struct DistrictShape {
    pub name: String,
    pub polygons: Vec<Polygon>,
    pub bbox: BBox,
}

impl DistrictShape {
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.bbox.contains(lon, lat)
            && self
                .polygons
                .iter()
                .any(|polygon| polygon_contains(polygon, DVec2::new(lon, lat)))
    }

    /// Every ring, exterior and hole alike (outline drawing)
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.polygons.iter().flatten()
    }
}

/// Even-odd crossing test
pub fn ring_contains(ring: &[DVec2], p: DVec2) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Inside the exterior ring and outside every hole
pub fn polygon_contains(polygon: &[Ring], p: DVec2) -> bool {
    match polygon.split_first() {
        Some((exterior, holes)) => {
            ring_contains(exterior, p) && !holes.iter().any(|hole| ring_contains(hole, p))
        }
        None => false,
    }
}

/// All district boundaries of the state, with a point index for hit tests
pub struct DistrictBoundaries {
    shapes: Vec<DistrictShape>,
    grid: FeatureGrid,
    bbox: BBox,
}

impl DistrictBoundaries {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let mut bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&mut bytes)
    }

    /// Parse GeoJSON in place (simd-json mutates the buffer)
    pub fn from_slice(bytes: &mut [u8]) -> Result<Self, LoadError> {
        let geojson: GeoJson = simd_json::serde::from_slice(bytes)?;
        let mut shapes = Vec::new();

        match geojson {
            GeoJson::FeatureCollection(fc) => {
                for feature in fc.features {
                    if let Some(shape) = shape_from_feature(feature) {
                        shapes.push(shape);
                    }
                }
            }
            GeoJson::Feature(feature) => shapes.extend(shape_from_feature(feature)),
            GeoJson::Geometry(_) => {}
        }

        Self::from_shapes(shapes)
    }

    pub fn from_shapes(shapes: Vec<DistrictShape>) -> Result<Self, LoadError> {
        if shapes.is_empty() {
            return Err(LoadError::NoFeatures);
        }
        let bbox = shapes
            .iter()
            .fold(BBox::EMPTY, |acc, shape| acc.union(&shape.bbox));
        let grid = FeatureGrid::build(shapes.iter().map(|s| &s.bbox), GRID_CELL_DEGREES);
        tracing::debug!(districts = shapes.len(), "indexed district boundaries");
        Ok(Self { shapes, grid, bbox })
    }

    /// District under a geographic point
    pub fn locate(&self, lon: f64, lat: f64) -> Option<&DistrictShape> {
        self.grid
            .query_point(lon, lat)
            .iter()
            .filter_map(|&idx| self.shapes.get(idx))
            .find(|shape| shape.contains(lon, lat))
    }

    pub fn shapes(&self) -> &[DistrictShape] {
        &self.shapes
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn shape_from_feature(feature: geojson::Feature) -> Option<DistrictShape> {
    let name = feature
        .properties
        .as_ref()
        .and_then(|p| p.get(NAME_PROPERTY))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|n| !n.is_empty())?
        .to_string();

    let mut polygons = Vec::new();
    if let Some(ref geometry) = feature.geometry {
        collect_polygons(geometry, &mut polygons);
    }
    if polygons.is_empty() {
        tracing::warn!(district = %name, "boundary feature has no polygon geometry");
        return None;
    }

    let mut bbox = BBox::EMPTY;
    for point in polygons.iter().flat_map(|p| p.first()).flatten() {
        bbox.extend(point.x, point.y);
    }

    Some(DistrictShape { name, polygons, bbox })
}

fn to_ring(coords: &[Vec<f64>]) -> Ring {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| DVec2::new(c[0], c[1]))
        .collect()
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    match &geometry.value {
        Value::Polygon(rings) => {
            out.push(rings.iter().map(|r| to_ring(r)).collect());
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.push(rings.iter().map(|r| to_ring(r)).collect());
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"Dist_Name": "Bhopal"},
                "geometry": {"type": "Polygon", "coordinates": [
                    [[77.0, 23.0], [78.0, 23.0], [78.0, 24.0], [77.0, 24.0], [77.0, 23.0]],
                    [[77.4, 23.4], [77.6, 23.4], [77.6, 23.6], [77.4, 23.6], [77.4, 23.4]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {"Dist_Name": " Indore "},
                "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[75.0, 22.0], [76.0, 22.0], [76.0, 23.0], [75.0, 23.0], [75.0, 22.0]]],
                    [[[79.0, 22.0], [79.5, 22.0], [79.5, 22.5], [79.0, 22.0]]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {"other": 1},
                "geometry": {"type": "Polygon", "coordinates": [
                    [[70.0, 20.0], [71.0, 20.0], [71.0, 21.0], [70.0, 20.0]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {"Dist_Name": "Point"},
                "geometry": {"type": "Point", "coordinates": [77.0, 23.0]}
            }
        ]
    }"#;

    fn fixture() -> DistrictBoundaries {
        let mut bytes = FIXTURE.as_bytes().to_vec();
        DistrictBoundaries::from_slice(&mut bytes).unwrap()
    }

    #[test]
    fn test_unnamed_and_pointlike_features_skipped() {
        let boundaries = fixture();
        let names: Vec<&str> = boundaries.shapes().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bhopal", "Indore"]);
    }

    #[test]
    fn test_locate_inside_polygon() {
        let boundaries = fixture();
        assert_eq!(boundaries.locate(77.2, 23.2).unwrap().name, "Bhopal");
        assert_eq!(boundaries.locate(75.5, 22.5).unwrap().name, "Indore");
    }

    #[test]
    fn test_locate_second_part_of_multipolygon() {
        let boundaries = fixture();
        assert_eq!(boundaries.locate(79.4, 22.1).unwrap().name, "Indore");
    }

    #[test]
    fn test_hole_is_not_inside() {
        let boundaries = fixture();
        assert!(boundaries.locate(77.5, 23.5).is_none());
    }

    #[test]
    fn test_outside_everything() {
        let boundaries = fixture();
        assert!(boundaries.locate(60.0, 10.0).is_none());
        assert!(boundaries.locate(76.5, 22.5).is_none());
    }

    #[test]
    fn test_state_bbox_covers_all_districts() {
        let bbox = fixture().bbox();
        assert_eq!(bbox.min_lon, 75.0);
        assert_eq!(bbox.max_lon, 79.5);
        assert_eq!(bbox.min_lat, 22.0);
        assert_eq!(bbox.max_lat, 24.0);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let mut bytes = b"{\"type\": \"Feature".to_vec();
        assert!(matches!(
            DistrictBoundaries::from_slice(&mut bytes),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_collection_without_named_polygons_is_an_error() {
        let mut bytes = br#"{"type": "FeatureCollection", "features": []}"#.to_vec();
        assert!(matches!(
            DistrictBoundaries::from_slice(&mut bytes),
            Err(LoadError::NoFeatures)
        ));
    }
}
