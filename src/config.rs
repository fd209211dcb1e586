//! Environment-driven runtime configuration. There are no CLI flags.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SHEET: &str = "District data.xlsx";
/// Two spaces before "(2)", as named in the workbook
pub const DEFAULT_SHEET_NAME: &str = "Dist Wise Pivot  (2)";
pub const DEFAULT_HEADER_ROW: usize = 2;
pub const DEFAULT_BOUNDARIES: &str = "MP Districts Website Map final.geojson";
pub const DEFAULT_LOG: &str = "waste-map.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// HTTP port of the web dashboard (`PORT`)
    pub port: u16,
    /// District workbook, or a CSV export of its pivot sheet (`WASTE_SHEET`)
    pub sheet_path: PathBuf,
    /// Worksheet holding the pivot (`WASTE_SHEET_NAME`), matched exactly
    pub sheet_name: String,
    /// Records above the header row (`WASTE_HEADER_ROW`)
    pub header_offset: usize,
    /// GeoJSON district boundaries (`WASTE_BOUNDARIES`)
    pub boundary_path: PathBuf,
    /// Log file of the terminal dashboard (`WASTE_LOG`)
    pub log_path: PathBuf,
    /// Variables that were set but unparseable, reported once logging is up
    pub rejected: Vec<(&'static str, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            sheet_path: PathBuf::from(DEFAULT_SHEET),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            header_offset: DEFAULT_HEADER_ROW,
            boundary_path: PathBuf::from(DEFAULT_BOUNDARIES),
            log_path: PathBuf::from(DEFAULT_LOG),
            rejected: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.port = parse_var(&lookup, "PORT", DEFAULT_PORT, &mut config.rejected);
        config.header_offset = parse_var(
            &lookup,
            "WASTE_HEADER_ROW",
            DEFAULT_HEADER_ROW,
            &mut config.rejected,
        );
        if let Some(path) = non_empty(&lookup, "WASTE_SHEET") {
            config.sheet_path = PathBuf::from(path);
        }
        // Not trimmed: sheet names may carry significant spaces
        if let Some(name) = lookup("WASTE_SHEET_NAME").filter(|v| !v.trim().is_empty()) {
            config.sheet_name = name;
        }
        if let Some(path) = non_empty(&lookup, "WASTE_BOUNDARIES") {
            config.boundary_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty(&lookup, "WASTE_LOG") {
            config.log_path = PathBuf::from(path);
        }

        config
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Log variables that fell back to their defaults
    pub fn report_rejected(&self) {
        for (key, value) in &self.rejected {
            tracing::warn!(key, value = %value, "ignoring unparseable environment variable");
        }
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T, rejected: &mut Vec<(&'static str, String)>) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match non_empty(lookup, key) {
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                rejected.push((key, raw));
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 5000);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_port_from_env() {
        let config = config_from(&[("PORT", "8080")]);
        assert_eq!(config.port, 8080);
        assert!(config.rejected.is_empty());
    }

    #[test]
    fn test_garbage_port_falls_back() {
        let config = config_from(&[("PORT", "eighty"), ("WASTE_HEADER_ROW", "-1")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.header_offset, DEFAULT_HEADER_ROW);
        assert_eq!(config.rejected.len(), 2);
    }

    #[test]
    fn test_paths_from_env() {
        let config = config_from(&[
            ("WASTE_SHEET", "data/sheet.csv"),
            ("WASTE_BOUNDARIES", " "),
            ("WASTE_HEADER_ROW", "0"),
        ]);
        assert_eq!(config.sheet_path, PathBuf::from("data/sheet.csv"));
        assert_eq!(config.boundary_path, PathBuf::from(DEFAULT_BOUNDARIES));
        assert_eq!(config.header_offset, 0);
    }

    #[test]
    fn test_sheet_name_keeps_inner_spaces() {
        assert_eq!(config_from(&[]).sheet_name, "Dist Wise Pivot  (2)");
        let config = config_from(&[("WASTE_SHEET_NAME", "Pivot  A ")]);
        assert_eq!(config.sheet_name, "Pivot  A ");
        let config = config_from(&[("WASTE_SHEET_NAME", "  ")]);
        assert_eq!(config.sheet_name, DEFAULT_SHEET_NAME);
    }
}
