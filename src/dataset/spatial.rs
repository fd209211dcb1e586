use std::collections::HashMap;

/// Geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    pub const EMPTY: BBox = BBox {
        min_lon: f64::INFINITY,
        min_lat: f64::INFINITY,
        max_lon: f64::NEG_INFINITY,
        max_lat: f64::NEG_INFINITY,
    };

    pub fn extend(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_lon > self.max_lon || self.min_lat > self.max_lat
    }

    #[inline]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) * 0.5,
            (self.min_lat + self.max_lat) * 0.5,
        )
    }
}

/// Spatial index over feature bounding boxes.
/// Each feature is inserted into every cell its bbox overlaps, so a point
/// query never misses a feature; callers refine with an exact test.
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    pub fn build<'a>(bboxes: impl Iterator<Item = &'a BBox>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.enumerate() {
            if bbox.is_empty() {
                continue;
            }
            let min_cell = grid.to_cell(bbox.min_lon, bbox.min_lat);
            let max_cell = grid.to_cell(bbox.max_lon, bbox.max_lat);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Candidate feature indices for a point
    pub fn query_point(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_extend_and_contains() {
        let mut bbox = BBox::EMPTY;
        assert!(bbox.is_empty());
        bbox.extend(77.0, 23.0);
        bbox.extend(78.0, 24.0);
        assert!(bbox.contains(77.5, 23.5));
        assert!(!bbox.contains(79.0, 23.5));
        assert_eq!(bbox.center(), (77.5, 23.5));
    }

    #[test]
    fn test_grid_point_query_spans_cells() {
        let boxes = [
            BBox { min_lon: 0.0, min_lat: 0.0, max_lon: 0.9, max_lat: 0.9 },
            BBox { min_lon: 0.5, min_lat: 0.5, max_lon: 2.5, max_lat: 1.5 },
        ];
        let grid = FeatureGrid::build(boxes.iter(), 1.0);
        assert_eq!(grid.query_point(0.2, 0.2), &[0, 1]);
        assert_eq!(grid.query_point(2.2, 1.2), &[1]);
        assert!(grid.query_point(-5.0, -5.0).is_empty());
    }
}
