use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{PredictionError, read_rows};

/// SIO "has phenotype" predicate used in follow-up gene queries.
pub const PHENOTYPE_PREDICATE: &str = "http://semanticscience.org/resource/SIO_001279";

/// Result of [`generate_query_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFileOutcome {
    pub path: PathBuf,
    pub written: usize,
}

/// `filtered` with its extension replaced by `.rq`.
pub fn query_path(filtered: &Path) -> PathBuf {
    filtered.with_extension("rq")
}

/// Write one `?,<predicate>,<phenotype>` line for each of the first
/// `cutoff` predictions, in file order. Fewer rows than `cutoff` is fine.
pub fn generate_query_file(
    filtered: &Path,
    cutoff: usize,
) -> Result<QueryFileOutcome, PredictionError> {
    let rows = read_rows(filtered)?;
    let mut lines = Vec::new();
    for row in rows.iter().filter(|row| !row.is_header()).take(cutoff) {
        row.require_columns(filtered, 2)?;
        let phenotype = row.object().unwrap_or_default();
        lines.push(format!("?,{PHENOTYPE_PREDICATE},{phenotype}"));
    }

    let path = query_path(filtered);
    let write_err = |source| PredictionError::Write {
        path: path.clone(),
        source,
    };
    let file = File::create(&path).map_err(write_err)?;
    let mut out = BufWriter::new(file);
    for line in &lines {
        writeln!(out, "{line}").map_err(write_err)?;
    }
    out.flush().map_err(write_err)?;
    let written = lines.len();
    if written < cutoff {
        tracing::warn!(
            "{} holds only {written} predictions (cutoff {cutoff})",
            filtered.display()
        );
    }
    tracing::info!("Wrote {written} queries to {}", path.display());
    Ok(QueryFileOutcome { path, written })
}
