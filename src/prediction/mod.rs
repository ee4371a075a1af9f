//! Post-processing of knowledge-graph link predictions.
//!
//! A prediction file is comma separated, one prediction per line, with an
//! optional header row whose first cell starts with `input`. Column 0 is the
//! subject IRI and column 1 the predicted object (a phenotype IRI).
//!
//! The pipeline is: [`filter_file`] keeps rows whose object qualifies
//! against the ontology, [`generate_query_file`] optionally turns the
//! survivors into a follow-up query file, and [`humanize_file`] swaps IRIs
//! for labels in Markdown and CSV copies.

mod error;
mod filter;
mod humanize;
mod iri;
mod query_gen;

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

pub use error::PredictionError;
pub use filter::{FilterCriterion, FilterOutcome, Ontology, filter_file};
pub use humanize::{HumanizeOutcome, TABLE_COLUMNS, humanize_file, resolve_label};
pub use iri::shorten;
pub use query_gen::{PHENOTYPE_PREDICATE, QueryFileOutcome, generate_query_file, query_path};

/// First-cell prefix marking the header row.
pub const HEADER_PREFIX: &str = "input";

/// One line of a prediction file, split into cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRow {
    line: u64,
    cells: Vec<String>,
}

impl PredictionRow {
    pub fn new(line: u64, cells: Vec<String>) -> Self {
        Self { line, cells }
    }

    /// 1-based line number in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn is_header(&self) -> bool {
        self.cells
            .first()
            .is_some_and(|cell| cell.starts_with(HEADER_PREFIX))
    }

    pub fn subject(&self) -> Option<&str> {
        self.cells.first().map(String::as_str)
    }

    pub fn object(&self) -> Option<&str> {
        self.cells.get(1).map(String::as_str)
    }

    /// Fail with `MalformedRow` unless the row has at least `expected` cells.
    pub(crate) fn require_columns(
        &self,
        path: &Path,
        expected: usize,
    ) -> Result<(), PredictionError> {
        if self.cells.len() < expected {
            return Err(PredictionError::MalformedRow {
                path: path.to_path_buf(),
                line: self.line,
                columns: self.cells.len(),
                expected,
            });
        }
        Ok(())
    }
}

/// Read every non-blank row of a prediction file.
pub fn read_rows(path: &Path) -> Result<Vec<PredictionRow>, PredictionError> {
    let file = File::open(path).map_err(|source| PredictionError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| PredictionError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map_or(0, |pos| pos.line());
        rows.push(PredictionRow::new(
            line,
            record.iter().map(str::to_string).collect(),
        ));
    }
    Ok(rows)
}

/// Write rows as comma-separated lines, quoting cells only where needed.
pub(crate) fn write_rows<'a>(
    path: &Path,
    rows: impl IntoIterator<Item = &'a [String]>,
) -> Result<(), PredictionError> {
    let file = File::create(path).map_err(|source| PredictionError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);
    for cells in rows {
        writer
            .write_record(cells)
            .map_err(|source| csv_write_error(path, source))?;
    }
    writer.flush().map_err(|source| PredictionError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// `path` with `suffix` appended to its final component.
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn csv_write_error(path: &Path, source: csv::Error) -> PredictionError {
    PredictionError::Write {
        path: path.to_path_buf(),
        source: source.into(),
    }
}
