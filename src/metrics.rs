//! Derived values for one district row.
//!
//! Every function here is total: missing cells read as zero and every ratio
//! guards its denominator.

use crate::dataset::{columns, DistrictRecord, DistrictTable};

/// Days per year, for converting e-waste from TPA to TPD
const DAYS_PER_YEAR: f64 = 365.0;

/// Headroom above the tallest bar in the current/2030 comparison
const BAR_HEADROOM: f64 = 1.1;

pub const PROCESSED_LABEL: &str = "Processed";
pub const PROCESSED_CLAMPED_LABEL: &str = "Processed (100%)";
pub const GAP_LABEL: &str = "Gap";

/// Generated / processed / collection gap, all in TPD
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WasteFigures {
    pub generated: f64,
    pub processed: f64,
    pub gap: f64,
}

impl WasteFigures {
    pub fn max(&self) -> f64 {
        self.generated.max(self.processed).max(self.gap)
    }
}

/// Processed vs gap pie, forced to sum to the generated total
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSplit {
    pub processed: f64,
    pub gap: f64,
    /// Raw processed exceeded generated and was cut back
    pub clamped: bool,
}

impl PieSplit {
    pub fn processed_label(&self) -> &'static str {
        if self.clamped {
            PROCESSED_CLAMPED_LABEL
        } else {
            PROCESSED_LABEL
        }
    }
}

/// Waste composition in TPD
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Composition {
    pub plastic: f64,
    pub construction: f64,
    pub ewaste: f64,
    pub other: f64,
}

/// Census and projected population
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PopulationSeries {
    pub census_2011: f64,
    pub projected_2025: f64,
    pub projected_2030: f64,
}

impl PopulationSeries {
    pub const YEARS: [&'static str; 3] = ["2011", "2025", "2030"];

    pub fn values(&self) -> [f64; 3] {
        [self.census_2011, self.projected_2025, self.projected_2030]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    pub district: String,
    pub population: PopulationSeries,
    pub current: WasteFigures,
    pub future: WasteFigures,
    pub percent_processed: f64,
    pub sewage_mld: f64,
    /// Decadal growth 2001-2011 in percent
    pub growth_rate_percent: f64,
    pub pie: PieSplit,
    pub future_pie: PieSplit,
    pub composition: Composition,
    /// Shared y-axis ceiling for the current and 2030 bar charts
    pub bar_axis_max: f64,
}

/// processed / generated × 100, zero when nothing was generated.
/// Negative processed figures count as nothing processed.
pub fn percent_processed(processed: f64, generated: f64) -> f64 {
    if generated > 0.0 {
        processed.max(0.0) / generated * 100.0
    } else {
        0.0
    }
}

/// Both slices are non-negative and never exceed generated
pub fn pie_split(generated: f64, processed: f64) -> PieSplit {
    let processed_slice = processed.max(0.0).min(generated.max(0.0));
    PieSplit {
        processed: processed_slice,
        gap: (generated - processed_slice).max(0.0),
        clamped: processed > generated,
    }
}

/// `ewaste_tpa` is tonnes per annum; everything else is already TPD
pub fn composition(generated: f64, plastic: f64, construction: f64, ewaste_tpa: f64) -> Composition {
    let ewaste = ewaste_tpa / DAYS_PER_YEAR;
    Composition {
        plastic,
        construction,
        ewaste,
        other: (generated - (plastic + construction + ewaste)).max(0.0),
    }
}

pub fn derive(record: &DistrictRecord) -> DerivedMetrics {
    let current = WasteFigures {
        generated: record.value(columns::SW_GENERATED),
        processed: record.value(columns::SW_PROCESSED),
        // Taken as reported, not recomputed from generated - processed
        gap: record.value(columns::SW_GAP),
    };
    let future = WasteFigures {
        generated: record.value(columns::SW_GENERATED_2030),
        processed: record.value(columns::SW_PROCESSED_2030),
        gap: record.value(columns::SW_GAP_2030),
    };

    DerivedMetrics {
        district: record.name.clone(),
        population: PopulationSeries {
            census_2011: record.value(columns::CENSUS_2011),
            projected_2025: record.value(columns::PROJECTED_2025),
            projected_2030: record.value(columns::PROJECTED_2030),
        },
        current,
        future,
        percent_processed: percent_processed(current.processed, current.generated),
        sewage_mld: record.value(columns::SEWAGE_MLD),
        // Stored as a fraction in the sheet
        growth_rate_percent: record.value(columns::DECADAL_GROWTH) * 100.0,
        pie: pie_split(current.generated, current.processed),
        future_pie: pie_split(future.generated, future.processed),
        composition: composition(
            current.generated,
            record.value(columns::PLASTIC_TPD),
            record.value(columns::CD_TPD_2025),
            record.value(columns::EWASTE_TPA),
        ),
        bar_axis_max: current.max().max(future.max()).max(0.0) * BAR_HEADROOM,
    }
}

/// None when the table has no row for `district`
pub fn derive_for(table: &DistrictTable, district: &str) -> Option<DerivedMetrics> {
    table.get(district).map(derive)
}
