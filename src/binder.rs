//! Selection-to-view binding.
//!
//! Both dashboards funnel every selection event through a pure function of
//! `(Selection, &DataContext)` that returns the complete payload set for the
//! page. Nothing is cached between calls, so a failed lookup can never show
//! the previous district's figures.

use crate::dataset::DataContext;
use crate::error::BindError;
use crate::metrics::{self, DerivedMetrics, PieSplit, PopulationSeries, WasteFigures, GAP_LABEL};
use serde::Serialize;

pub const MAP_PROMPT: &str = "Click a district on the map";
pub const DROPDOWN_PROMPT: &str = "Select a District";
pub const NO_DATA: &str = "No data for selected district";
pub const LOAD_ERROR: &str = "Error loading data";

pub const POPULATION_TITLE: &str = "Population Forecast";
pub const COMPOSITION_TITLE: &str = "Waste Composition";

const COLOR_GENERATED: &str = "blue";
const COLOR_PROCESSED: &str = "green";
const COLOR_GAP: &str = "red";
const COMPOSITION_COLORS: [&str; 4] = ["#2ca02c", "#c7c7c7", "#ff7f0e", "#1f77b4"];

/// Which dashboard is asking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Choropleth click; unmatched names are a normal "no data" view
    MapClick,
    /// Dropdown; any failure is logged and shown as an error view
    Dropdown,
}

/// Currently chosen district
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(String),
}

impl Selection {
    pub fn select(name: impl Into<String>) -> Self {
        Selection::Selected(name.into())
    }

    pub fn district(&self) -> Option<&str> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    /// Nothing selected yet
    Prompt,
    /// Selected district has no row
    NoData,
    /// Derivation failed (dropdown dashboard)
    Error,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub title: String,
    pub value: String,
}

impl KpiCard {
    fn new(title: &str, value: String) -> Self {
        Self {
            title: title.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub y_title: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

impl LineChart {
    pub fn empty(title: &str) -> Self {
        Self {
            title: title.to_string(),
            y_title: String::new(),
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    /// Legend entry
    pub name: String,
    /// X-axis category
    pub category: String,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<BarSeries>,
    /// Fixed y-axis ceiling, shared between charts meant to be compared
    pub y_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn empty(title: &str) -> Self {
        Self {
            title: title.to_string(),
            slices: Vec::new(),
        }
    }

    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }
}

/// Everything one dashboard page shows for one selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payloads {
    pub status: ViewStatus,
    /// Prompt or failure text shown in place of the KPI cards
    pub notice: Option<String>,
    pub kpi_cards: Vec<KpiCard>,
    pub population: LineChart,
    pub waste_bars: Vec<BarChart>,
    pub processed_pies: Vec<PieChart>,
    /// Map dashboard only
    pub composition: Option<PieChart>,
}

impl Payloads {
    fn placeholder(variant: Variant, status: ViewStatus, notice: &str) -> Self {
        let (population, composition) = match (variant, status) {
            (Variant::MapClick, _) => (
                LineChart::empty(POPULATION_TITLE),
                Some(PieChart::empty(COMPOSITION_TITLE)),
            ),
            (Variant::Dropdown, ViewStatus::Error) => (LineChart::empty(""), None),
            (Variant::Dropdown, _) => (LineChart::empty(POPULATION_TITLE), None),
        };
        Self {
            status,
            notice: Some(notice.to_string()),
            kpi_cards: Vec::new(),
            population,
            waste_bars: Vec::new(),
            processed_pies: Vec::new(),
            composition,
        }
    }

    pub fn prompt(variant: Variant) -> Self {
        let notice = match variant {
            Variant::MapClick => MAP_PROMPT,
            Variant::Dropdown => DROPDOWN_PROMPT,
        };
        Self::placeholder(variant, ViewStatus::Prompt, notice)
    }

    pub fn no_data(variant: Variant) -> Self {
        Self::placeholder(variant, ViewStatus::NoData, NO_DATA)
    }

    pub fn error(variant: Variant) -> Self {
        Self::placeholder(variant, ViewStatus::Error, LOAD_ERROR)
    }

    pub fn is_ready(&self) -> bool {
        self.status == ViewStatus::Ready
    }
}

pub fn bind(variant: Variant, selection: &Selection, ctx: &DataContext) -> Payloads {
    match variant {
        Variant::MapClick => bind_map_click(selection, ctx),
        Variant::Dropdown => bind_dropdown(selection, ctx),
    }
}

/// Map dashboard: unmatched districts are an ordinary outcome
pub fn bind_map_click(selection: &Selection, ctx: &DataContext) -> Payloads {
    let Some(clicked) = selection.district() else {
        return Payloads::prompt(Variant::MapClick);
    };
    match metrics::derive_for(&ctx.table, clicked) {
        Some(m) => map_payloads(clicked, &m),
        None => {
            tracing::debug!(district = clicked, "clicked district has no sheet row");
            Payloads::no_data(Variant::MapClick)
        }
    }
}

/// Dropdown dashboard: failures are logged and replaced by an error view
pub fn bind_dropdown(selection: &Selection, ctx: &DataContext) -> Payloads {
    let Some(district) = selection.district() else {
        return Payloads::prompt(Variant::Dropdown);
    };
    match try_dropdown(district, ctx) {
        Ok(payloads) => payloads,
        Err(e) => {
            tracing::error!(error = %e, district, "dashboard update failed");
            Payloads::error(Variant::Dropdown)
        }
    }
}

fn try_dropdown(district: &str, ctx: &DataContext) -> Result<Payloads, BindError> {
    if ctx.table.is_empty() {
        return Err(BindError::EmptyTable);
    }
    let m = metrics::derive_for(&ctx.table, district)
        .ok_or_else(|| BindError::UnknownDistrict(district.to_string()))?;
    Ok(dropdown_payloads(&m))
}

fn map_payloads(clicked: &str, m: &DerivedMetrics) -> Payloads {
    let kpi_cards = vec![
        KpiCard::new("Census 2011 Pop", format_thousands(m.population.census_2011)),
        KpiCard::new("SW Generated", format!("{:.2} TPD", m.current.generated)),
        KpiCard::new("% Waste Processed", format!("{:.1}%", m.percent_processed)),
        KpiCard::new("Sewage Gen (MLD)", format!("{:.2}", m.sewage_mld)),
        KpiCard::new("Decadal Growth Rate", format!("{:.2}%", m.growth_rate_percent)),
        KpiCard::new("District", clicked.to_string()),
    ];

    let c = &m.current;
    let bars = BarChart {
        title: "Current Waste Metrics (TPD)".to_string(),
        bars: vec![
            bar(format!("Generated: {:.2} TPD", c.generated), "Generated", round2(c.generated), COLOR_GENERATED),
            bar(format!("Processed: {:.2} TPD", c.processed), "Processed", round2(c.processed), COLOR_PROCESSED),
            bar(format!("Gap: {:.2} TPD", c.gap), "Gap", round2(c.gap), COLOR_GAP),
        ],
        y_max: None,
    };

    let comp = &m.composition;
    let composition = PieChart {
        title: "Waste Composition (TPD)".to_string(),
        slices: [
            (format!("Plastic Waste: {:.2} TPD", comp.plastic), comp.plastic),
            (format!("C&D: {:.2} TPD", comp.construction), comp.construction),
            (format!("E-waste: {:.2} TPD", comp.ewaste), comp.ewaste),
            (format!("Other: {:.2} TPD", comp.other), comp.other),
        ]
        .into_iter()
        .zip(COMPOSITION_COLORS)
        .map(|((label, value), color)| PieSlice { label, value, color })
        .collect(),
    };

    Payloads {
        status: ViewStatus::Ready,
        notice: None,
        kpi_cards,
        population: population_chart(&m.population),
        waste_bars: vec![bars],
        processed_pies: vec![processed_pie("Processed vs Gap (TPD)", &m.pie)],
        composition: Some(composition),
    }
}

fn dropdown_payloads(m: &DerivedMetrics) -> Payloads {
    let kpi_cards = vec![
        KpiCard::new("Census 2011 Pop", format_thousands(m.population.census_2011)),
        KpiCard::new("SW Generated", format!("{:.2} TPD", m.current.generated)),
        KpiCard::new("% Waste Processed", format!("{:.1}%", m.percent_processed)),
        KpiCard::new("Gap in Collection", format!("{:.2} TPD", m.current.gap)),
    ];

    Payloads {
        status: ViewStatus::Ready,
        notice: None,
        kpi_cards,
        population: population_chart(&m.population),
        waste_bars: vec![
            comparison_bars("Current Waste Metrics (TPD)", "Current", &m.current, m.bar_axis_max),
            comparison_bars("2030 Waste Metrics (TPD)", "2030", &m.future, m.bar_axis_max),
        ],
        processed_pies: vec![
            processed_pie("Current Waste Processed vs Gap", &m.pie),
            processed_pie("2030 Waste Processed vs Gap", &m.future_pie),
        ],
        composition: None,
    }
}

fn population_chart(p: &PopulationSeries) -> LineChart {
    LineChart {
        title: POPULATION_TITLE.to_string(),
        y_title: "Population".to_string(),
        x: PopulationSeries::YEARS.iter().map(|y| y.to_string()).collect(),
        y: vec![round_to(p.census_2011, 3), round2(p.projected_2025), round2(p.projected_2030)],
    }
}

fn comparison_bars(title: &str, category: &str, w: &WasteFigures, y_max: f64) -> BarChart {
    BarChart {
        title: title.to_string(),
        bars: vec![
            bar("Generated".to_string(), category, w.generated, COLOR_GENERATED),
            bar("Processed".to_string(), category, w.processed, COLOR_PROCESSED),
            bar("Gap".to_string(), category, w.gap, COLOR_GAP),
        ],
        y_max: Some(y_max),
    }
}

fn processed_pie(title: &str, split: &PieSplit) -> PieChart {
    PieChart {
        title: title.to_string(),
        slices: vec![
            PieSlice {
                label: split.processed_label().to_string(),
                value: split.processed,
                color: COLOR_PROCESSED,
            },
            PieSlice {
                label: GAP_LABEL.to_string(),
                value: split.gap,
                color: COLOR_GAP,
            },
        ],
    }
}

fn bar(name: String, category: &str, value: f64, color: &'static str) -> BarSeries {
    BarSeries {
        name,
        category: category.to_string(),
        value,
        color,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Integer part with comma grouping: 2371061.7 -> "2,371,061"
pub fn format_thousands(value: f64) -> String {
    let whole = value.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
