//! Reading country rows from a CSV file.
//!
//! The first row is a header. Columns are found by name, ignoring case:
//! `Name` is required, `Population` and `Region` are optional, and any
//! other column (such as `Id`) is ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use roster_core::error::{AppError, ErrorKind};
use roster_core::result::AppResult;
use roster_entity::{CountryRequest, Region};

/// One data row of an import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRow {
    /// 1-based line number in the file.
    pub line: u64,
    /// Country name, trimmed. Empty when the cell was blank.
    pub name: String,
    /// Population; `0` when the cell was blank.
    pub population: i64,
    /// Region; `Unknown` when blank or unrecognised.
    pub region: Region,
}

impl CountryRow {
    /// The record to stage for this row.
    pub fn into_request(self) -> CountryRequest {
        CountryRequest {
            id: 0,
            name: self.name,
            population: self.population,
            region: self.region,
        }
    }
}

/// Counts reported by a finished import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows stored.
    pub imported: usize,
    /// Rows skipped because the name was blank, already stored, or repeated.
    pub skipped: usize,
}

struct Columns {
    name: usize,
    population: Option<usize>,
    region: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> AppResult<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };
        Ok(Self {
            name: find("name").ok_or_else(|| {
                AppError::validation("Import file has no 'Name' column in its header")
            })?,
            population: find("population"),
            region: find("region"),
        })
    }
}

/// Read and validate every data row of the file at `path`.
pub async fn read_rows(path: &Path) -> AppResult<Vec<CountryRow>> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Io,
            format!("Failed to read import file '{}': {e}", path.display()),
            e,
        )
    })?;
    let rows = parse_rows(&bytes)?;
    debug!(path = %path.display(), rows = rows.len(), "Import file parsed");
    Ok(rows)
}

/// Parse CSV content. A file holding only the header yields no rows.
pub fn parse_rows(content: &[u8]) -> AppResult<Vec<CountryRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let headers = reader.headers().map_err(csv_error)?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Ok(Vec::new());
    }
    let columns = Columns::locate(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let cell = |index: Option<usize>| index.and_then(|i| record.get(i)).unwrap_or("");

        let population = match cell(columns.population) {
            "" => 0,
            raw => raw.parse::<i64>().map_err(|_| {
                AppError::validation(format!("Invalid population '{raw}' on line {line}"))
            })?,
        };

        rows.push(CountryRow {
            line,
            name: cell(Some(columns.name)).to_string(),
            population,
            region: Region::parse_lossy(cell(columns.region)),
        });
    }
    Ok(rows)
}

fn csv_error(err: csv::Error) -> AppError {
    let kind = if err.is_io_error() {
        ErrorKind::Io
    } else {
        ErrorKind::Validation
    };
    AppError::with_source(kind, format!("Malformed import file: {err}"), err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows() {
        let content = b"Id,Name,Population,Region\n\
            1,Ukraine,10000,Europe\n\
            2, Germany ,666666,europe\n\
            3,USA,5654654,NorthAmerica\n\
            4,Atlantis,,Lost\n";
        let rows = parse_rows(content).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].name, "Germany");
        assert_eq!(rows[1].region, Region::Europe);
        assert_eq!(rows[2].region, Region::NorthAmerica);
        assert_eq!(rows[3].population, 0);
        assert_eq!(rows[3].region, Region::Unknown);
        assert_eq!(rows[0].line, 2);
    }

    #[test]
    fn test_headers_are_case_insensitive_and_reorderable() {
        let rows = parse_rows(b"REGION,name\nAsia,Japan\n").unwrap();
        assert_eq!(rows[0].name, "Japan");
        assert_eq!(rows[0].region, Region::Asia);
        assert_eq!(rows[0].population, 0);
    }

    #[test]
    fn test_header_only_and_empty_files() {
        assert!(parse_rows(b"Id,Name,Population,Region\n").unwrap().is_empty());
        assert!(parse_rows(b"").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_population_is_rejected() {
        let err = parse_rows(b"Name,Population\nPeru,many\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("many"));
    }

    #[test]
    fn test_missing_name_column_is_rejected() {
        let err = parse_rows(b"Id,Population\n1,5\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = read_rows(Path::new("does/not/exist.csv")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }
}
