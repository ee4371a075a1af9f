use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{PredictionError, read_rows, shorten, with_suffix, write_rows};
use crate::sparql::{RemoteQueryError, SparqlEndpoint, SparqlQuery};

/// Columns emitted per table row.
pub const TABLE_COLUMNS: usize = 5;

const LABEL_VARIABLE: &str = "label";
const IRI_PREFIX: &str = "https";
const ALIGNMENT_ROW: &str = "| :-- | :-- | :--: | :--: | :--: |";

/// Files written by [`humanize_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanizeOutcome {
    pub markdown: PathBuf,
    pub csv: PathBuf,
    pub rows: usize,
    pub lookups: usize,
}

/// Look up the `rdfs:label` of a long gene or phenotype IRI.
pub fn resolve_label(
    iri: &str,
    endpoint: &dyn SparqlEndpoint,
) -> Result<String, PredictionError> {
    let short = shorten(iri)?;
    let results = endpoint.select(&SparqlQuery::label(&short))?;
    let label = results
        .column(LABEL_VARIABLE)?
        .into_iter()
        .next()
        .map(str::to_string)
        .ok_or_else(|| RemoteQueryError::MissingBinding {
            variable: LABEL_VARIABLE.to_string(),
            subject: short.to_string(),
        })?;
    Ok(label)
}

/// Write `<input>.md` and `<input>.csv` with IRIs replaced by labels.
///
/// Every cell starting with `https` costs one label query. Nothing is
/// written unless every lookup succeeds.
pub fn humanize_file(
    input: &Path,
    endpoint: &dyn SparqlEndpoint,
) -> Result<HumanizeOutcome, PredictionError> {
    let rows = read_rows(input)?;
    let mut header: Option<Vec<String>> = None;
    let mut body = Vec::with_capacity(rows.len());
    let mut lookups = 0usize;
    for row in &rows {
        row.require_columns(input, TABLE_COLUMNS)?;
        let cells = &row.cells()[..TABLE_COLUMNS];
        if row.is_header() {
            header.get_or_insert_with(|| cells.to_vec());
            continue;
        }
        let mut resolved = Vec::with_capacity(TABLE_COLUMNS);
        for cell in cells {
            if cell.starts_with(IRI_PREFIX) {
                resolved.push(resolve_label(cell, endpoint)?);
                lookups += 1;
            } else {
                resolved.push(cell.clone());
            }
        }
        body.push(resolved);
    }

    let markdown = with_suffix(input, ".md");
    write_markdown(&markdown, header.as_deref(), &body)?;
    let csv = with_suffix(input, ".csv");
    write_rows(&csv, header.iter().chain(body.iter()).map(Vec::as_slice))?;
    tracing::info!(
        "Humanized {} rows ({lookups} label lookups) -> {}, {}",
        body.len(),
        markdown.display(),
        csv.display()
    );
    Ok(HumanizeOutcome {
        markdown,
        csv,
        rows: body.len(),
        lookups,
    })
}

fn write_markdown(
    path: &Path,
    header: Option<&[String]>,
    body: &[Vec<String>],
) -> Result<(), PredictionError> {
    let write_err = |source| PredictionError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let mut out = BufWriter::new(file);
    if let Some(header) = header {
        writeln!(out, "{}", markdown_row(header)).map_err(write_err)?;
        writeln!(out, "{ALIGNMENT_ROW}").map_err(write_err)?;
    }
    for row in body {
        writeln!(out, "{}", markdown_row(row)).map_err(write_err)?;
    }
    out.flush().map_err(write_err)
}

fn markdown_row(cells: &[String]) -> String {
    let cells = cells
        .iter()
        .map(|cell| cell.replace('|', "\\|"))
        .collect::<Vec<_>>();
    format!("| {} |", cells.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparql::QueryResults;
    use std::collections::HashMap;
    use tempfile::tempdir;

    struct Labels(HashMap<&'static str, &'static str>);

    impl SparqlEndpoint for Labels {
        fn select(&self, query: &SparqlQuery) -> Result<QueryResults, RemoteQueryError> {
            let label = self
                .0
                .iter()
                .find(|(subject, _)| query.as_str().contains(&format!(" {subject} rdfs:label")))
                .map(|(_, label)| label.to_string());
            Ok(QueryResults::single_column(LABEL_VARIABLE, label))
        }
    }

    fn labels() -> Labels {
        Labels(HashMap::from([
            ("wbgene:00006993", "unc-22"),
            ("wbpheno:0000643", "locomotion variant | slow"),
        ]))
    }

    #[test]
    fn resolves_gene_label() {
        let label = resolve_label(
            "https://wormbase.org/species/c_elegans/gene/WBGene00006993",
            &labels(),
        )
        .unwrap();
        assert_eq!(label, "unc-22");
    }

    #[test]
    fn empty_result_is_missing_binding() {
        let err = resolve_label(
            "https://wormbase.org/species/c_elegans/gene/WBGene00000001",
            &labels(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PredictionError::Remote(RemoteQueryError::MissingBinding { .. })
        ));
    }

    #[test]
    fn writes_markdown_and_csv_tables() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("pred.txt");
        std::fs::write(
            &input,
            "input,prediction,score,rank,known\n\
             https://wormbase.org/species/c_elegans/gene/WBGene00006993,https://wormbase.org/species/all/phenotype/WBPhenotype:0000643,0.93,1,False\n",
        )
        .unwrap();
        let outcome = humanize_file(&input, &labels()).unwrap();
        assert_eq!(outcome.rows, 1);
        assert_eq!(outcome.lookups, 2);

        let markdown = std::fs::read_to_string(&outcome.markdown).unwrap();
        assert_eq!(
            markdown,
            "| input | prediction | score | rank | known |\n\
             | :-- | :-- | :--: | :--: | :--: |\n\
             | unc-22 | locomotion variant \\| slow | 0.93 | 1 | False |\n"
        );
        let csv = std::fs::read_to_string(&outcome.csv).unwrap();
        assert_eq!(
            csv,
            "input,prediction,score,rank,known\nunc-22,locomotion variant | slow,0.93,1,False\n"
        );
    }

    #[test]
    fn rows_need_five_columns() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("pred.txt");
        std::fs::write(&input, "a,b,c,d,e\na,b,c\n").unwrap();
        let err = humanize_file(&input, &labels()).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::MalformedRow {
                columns: 3,
                expected: 5,
                ..
            }
        ));
        assert!(!with_suffix(&input, ".md").exists());
    }

    #[test]
    fn unrecognized_iri_aborts() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("pred.txt");
        std::fs::write(&input, "https://example.org/x,b,c,d,e\n").unwrap();
        let err = humanize_file(&input, &labels()).unwrap_err();
        assert!(matches!(err, PredictionError::UnrecognizedIdentifier { .. }));
    }
}
