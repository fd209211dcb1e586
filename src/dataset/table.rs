use crate::error::LoadError;
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column names of the district pivot sheet, after trimming.
pub mod columns {
    pub const DISTRICT: &str = "District";
    pub const CENSUS_2011: &str = "Sum of Census 2011 Population";
    pub const PROJECTED_2025: &str = "Sum of Projected Population by 2025";
    pub const PROJECTED_2030: &str = "Sum of Projected Population by 2030";
    pub const SW_GENERATED: &str = "Sum of SW_Generation (TPD)";
    pub const SW_PROCESSED: &str = "Sum of SW_Processed_ (TPD)";
    pub const SW_GAP: &str = "Sum of SW Collection Gap (in TPD)";
    pub const SW_GENERATED_2030: &str = "Sum of SW_Generation (TPD)-2030";
    pub const SW_PROCESSED_2030: &str = "Sum of SW_Processed_ (TPD)-2030";
    pub const SW_GAP_2030: &str = "Sum of SW Collection Gap (in TPD)-2030";
    pub const SEWAGE_MLD: &str = "Sum of Sewage Generation (in MLD)";
    pub const DECADAL_GROWTH: &str = "Average of Decadal Grouth Rate in % (During 2001-2011)";
    pub const PLASTIC_TPD: &str = "Sum of Estimated PW Generation in TPD";
    pub const CD_TPD_2025: &str = "Sum of C&D Waste Generation in TPD - 2025";
    pub const EWASTE_TPA: &str = "Sum of e-waste Generation (TPA)";
}

/// Lookup key for district names: trimmed and lowercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One spreadsheet row. Cells that were blank or non-numeric are absent and
/// read back as 0.0.
#[derive(Debug, Clone, Default)]
pub struct DistrictRecord {
    pub name: String,
    values: HashMap<String, f64>,
}

impl DistrictRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    /// Builder used by fixtures and the bench
    pub fn with(mut self, column: &str, value: f64) -> Self {
        self.values.insert(column.to_string(), value);
        self
    }

    /// Numeric value of a column, 0.0 when missing
    #[inline]
    pub fn value(&self, column: &str) -> f64 {
        self.values
            .get(column)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    pub fn has(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}

/// Parse a spreadsheet cell. Thousands separators are tolerated.
fn parse_cell(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Worksheet cells as text rows anchored at A1. The used range starts at
/// the first non-empty cell, so leading blank rows and columns are restored
/// to keep the header offset and the district column where the sheet has them.
fn sheet_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let blank_rows = std::iter::repeat_with(Vec::<String>::new).take(first_row as usize);
    let used = range.rows().map(|row| {
        std::iter::repeat_with(String::new)
            .take(first_col as usize)
            .chain(row.iter().map(cell_text))
            .collect::<Vec<String>>()
    });
    blank_rows.chain(used).collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// District rows in sheet order, indexed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct DistrictTable {
    records: Vec<DistrictRecord>,
    index: HashMap<String, usize>,
}

impl DistrictTable {
    pub fn from_records(records: Vec<DistrictRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            // First row wins on duplicate names
            index.entry(normalize_name(&record.name)).or_insert(idx);
        }
        Self { records, index }
    }

    /// Load the pivot sheet. `.csv` files are read as an export of that one
    /// sheet; anything else is opened as a workbook and `sheet_name` selected.
    pub fn load(path: &Path, sheet_name: &str, header_offset: usize) -> Result<Self, LoadError> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Self::from_workbook(path, sheet_name, header_offset);
        }

        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, header_offset)
    }

    /// Read one worksheet of an xlsx/xls/ods workbook
    pub fn from_workbook(path: &Path, sheet_name: &str, header_offset: usize) -> Result<Self, LoadError> {
        let mut workbook = open_workbook_auto(path)?;
        let available = workbook.sheet_names();
        if !available.iter().any(|name| name == sheet_name) {
            return Err(LoadError::MissingSheet {
                sheet: sheet_name.to_string(),
                available,
            });
        }
        let range = workbook.worksheet_range(sheet_name)?;
        Self::from_rows(sheet_rows(&range).into_iter().map(Ok), header_offset)
    }

    /// Parse CSV text laid out like the pivot sheet
    pub fn from_reader<R: Read>(reader: R, header_offset: usize) -> Result<Self, LoadError> {
        let csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let rows = csv.into_records().map(|row| {
            row.map(|record| record.iter().map(str::to_string).collect::<Vec<String>>())
                .map_err(LoadError::from)
        });
        Self::from_rows(rows, header_offset)
    }

    /// Header sits `header_offset` rows down. The first column holds the
    /// district name whatever its header says.
    fn from_rows<I>(rows: I, header_offset: usize) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = Result<Vec<String>, LoadError>>,
    {
        let mut rows = rows.into_iter();
        for _ in 0..header_offset {
            rows.next().ok_or(LoadError::MissingHeader(header_offset))??;
        }
        let header = rows.next().ok_or(LoadError::MissingHeader(header_offset))??;

        let mut headers: Vec<String> = header.iter().map(|c| c.trim().to_string()).collect();
        match headers.first_mut() {
            Some(first) => *first = columns::DISTRICT.to_string(),
            None => return Err(LoadError::NoDistrictColumn),
        }

        let mut records = Vec::new();
        for row in rows {
            let row = row?;
            let name = row.first().map(|c| c.trim()).unwrap_or("");
            if name.is_empty() {
                continue;
            }

            let mut record = DistrictRecord::new(name);
            for (column, cell) in headers.iter().zip(row.iter()).skip(1) {
                if column.is_empty() {
                    continue;
                }
                if let Some(value) = parse_cell(cell) {
                    record.values.entry(column.clone()).or_insert(value);
                }
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(LoadError::NoDistricts);
        }

        tracing::debug!(districts = records.len(), columns = headers.len(), "parsed district sheet");
        Ok(Self::from_records(records))
    }

    /// Case- and whitespace-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&DistrictRecord> {
        self.index
            .get(&normalize_name(name))
            .and_then(|&idx| self.records.get(idx))
    }

    pub fn first(&self) -> Option<&DistrictRecord> {
        self.records.first()
    }

    pub fn records(&self) -> &[DistrictRecord] {
        &self.records
    }

    /// District names in sheet order (dropdown options)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
