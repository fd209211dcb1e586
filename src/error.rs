use std::path::PathBuf;

/// Startup failures. Any of these aborts the process.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed spreadsheet row")]
    Csv(#[from] csv::Error),
    #[error("unreadable workbook")]
    Workbook(#[from] calamine::Error),
    #[error("workbook has no sheet {sheet:?} (sheets: {available:?})")]
    MissingSheet { sheet: String, available: Vec<String> },
    #[error("malformed boundary file")]
    Json(#[from] simd_json::Error),
    #[error("spreadsheet has no header row at offset {0}")]
    MissingHeader(usize),
    #[error("spreadsheet header has no district column")]
    NoDistrictColumn,
    #[error("spreadsheet contains no district rows")]
    NoDistricts,
    #[error("boundary file contains no named district polygons")]
    NoFeatures,
}

/// Per-selection failures. Never fatal; the binder turns these into
/// placeholder payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("no row for district {0:?}")]
    UnknownDistrict(String),
    #[error("district table is empty")]
    EmptyTable,
}
