mod cli;
mod json;

pub use cli::print_cli_table;
pub use json::print_json;

use crate::result::{ResultSet, UnitReport};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Output format for composed results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

/// Composed results of every unit processed in one run.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub generated: DateTime<Utc>,
    pub units: Vec<UnitEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_units: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_units: Vec<FailedUnit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitEntry {
    pub source: String,
    #[serde(flatten)]
    pub report: UnitReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedUnit {
    pub source: String,
    pub error: String,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            generated: Utc::now(),
            units: Vec::new(),
            ignored_units: Vec::new(),
            failed_units: Vec::new(),
        }
    }

    /// Records the outcome of one unit. Units that produced neither
    /// components nor hints are only listed by source.
    pub fn add_result(&mut self, source: impl Into<String>, result: &ResultSet) {
        let source = source.into();
        if result.is_unit_ignored() {
            self.ignored_units.push(source);
        } else {
            self.units.push(UnitEntry {
                source,
                report: result.report(),
            });
        }
    }

    pub fn add_failure(&mut self, source: impl Into<String>, error: &anyhow::Error) {
        self.failed_units.push(FailedUnit {
            source: source.into(),
            error: format!("{:#}", error),
        });
    }

    pub fn components_count(&self) -> usize {
        self.units.iter().map(|u| u.report.components.len()).sum()
    }

    pub fn hints_count(&self) -> usize {
        self.units
            .iter()
            .flat_map(|u| u.report.hints.values())
            .map(Vec::len)
            .sum()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn print_result(catalog: &Catalog, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(catalog),
        OutputFormat::Json => print_json(catalog),
    }
}

/// Format result to string for file output
pub fn format_result_to_string(catalog: &Catalog, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Table => Ok(serde_json::to_string_pretty(catalog)?),
    }
}
