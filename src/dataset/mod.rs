mod boundaries;
mod spatial;
mod table;

pub use boundaries::{
    polygon_contains, ring_contains, DistrictBoundaries, DistrictShape, Polygon, Ring, NAME_PROPERTY,
};
pub use spatial::{BBox, FeatureGrid};
pub use table::{columns, normalize_name, DistrictRecord, DistrictTable};

use crate::config::Config;
use anyhow::{Context, Result};

/// Everything loaded at startup. Immutable for the life of the process and
/// handed to the binder by reference.
pub struct DataContext {
    pub table: DistrictTable,
    pub boundaries: Option<DistrictBoundaries>,
}

impl DataContext {
    pub fn new(table: DistrictTable) -> Self {
        Self {
            table,
            boundaries: None,
        }
    }

    pub fn with_boundaries(mut self, boundaries: DistrictBoundaries) -> Self {
        self.boundaries = Some(boundaries);
        self
    }

    /// Sheet only (dropdown dashboard)
    pub fn load_table(config: &Config) -> Result<Self> {
        let table = DistrictTable::load(&config.sheet_path, &config.sheet_name, config.header_offset)
            .with_context(|| format!("loading district sheet {}", config.sheet_path.display()))?;
        tracing::info!(
            districts = table.len(),
            path = %config.sheet_path.display(),
            "loaded district sheet"
        );
        Ok(Self::new(table))
    }

    /// Sheet and boundary file (map dashboard)
    pub fn load_with_boundaries(config: &Config) -> Result<Self> {
        let context = Self::load_table(config)?;
        let boundaries = DistrictBoundaries::load(&config.boundary_path).with_context(|| {
            format!("loading district boundaries {}", config.boundary_path.display())
        })?;
        tracing::info!(
            districts = boundaries.len(),
            path = %config.boundary_path.display(),
            "loaded district boundaries"
        );

        let unmatched: Vec<&str> = boundaries
            .shapes()
            .iter()
            .filter(|s| context.table.get(&s.name).is_none())
            .map(|s| s.name.as_str())
            .collect();
        if !unmatched.is_empty() {
            tracing::warn!(?unmatched, "boundary districts without a sheet row");
        }

        Ok(context.with_boundaries(boundaries))
    }
}
