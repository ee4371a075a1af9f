//! Ontology-based filtering of prediction rows.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::{PredictionError, read_rows, with_suffix, write_rows};
use crate::sparql::{RemoteQueryError, SparqlEndpoint, SparqlQuery};

const LEAF_VARIABLE: &str = "leaf1";

/// Ontologies the ancestor-count filter knows how to recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ontology {
    Phenotype,
}

impl Ontology {
    /// Substring identifying this ontology's term IRIs.
    pub fn iri_key(self) -> &'static str {
        match self {
            Ontology::Phenotype => "heno",
        }
    }
}

impl FromStr for Ontology {
    type Err = PredictionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim() {
            "phenotype" => Ok(Ontology::Phenotype),
            other => Err(PredictionError::UnsupportedOntology {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Ontology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ontology::Phenotype => f.write_str("phenotype"),
        }
    }
}

/// Which ontology terms count as qualifying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCriterion {
    /// Terms with at least `count` ancestors.
    MinAncestors { count: u32, ontology: Ontology },
    /// Terms that are, or descend from, one of the labelled terms.
    Domains(Vec<String>),
}

impl FilterCriterion {
    /// Domain criterion; at least one term is required.
    pub fn domains<I, S>(terms: I) -> Result<Self, PredictionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(Into::into)
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty())
            .collect();
        if terms.is_empty() {
            return Err(PredictionError::EmptyDomainList);
        }
        Ok(FilterCriterion::Domains(terms))
    }

    /// Where the filtered copy of `input` is written.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        match self {
            FilterCriterion::MinAncestors { count, .. } => {
                with_suffix(input, &format!("_filtered_{count}_ancestors.txt"))
            }
            FilterCriterion::Domains(terms) => {
                let joined = terms
                    .iter()
                    .map(|term| term.replace(' ', "_"))
                    .collect::<Vec<_>>()
                    .join("+");
                with_suffix(input, &format!("_filtered_{joined}_domain.txt"))
            }
        }
    }

    /// Fetch the qualifying term IRIs, one query per domain term.
    pub fn qualifying_set(
        &self,
        endpoint: &dyn SparqlEndpoint,
    ) -> Result<BTreeSet<String>, RemoteQueryError> {
        let queries = match self {
            FilterCriterion::MinAncestors { count, ontology } => {
                vec![SparqlQuery::min_ancestors(*count, ontology.iri_key())]
            }
            FilterCriterion::Domains(terms) => terms
                .iter()
                .map(|term| SparqlQuery::descendants_of_label(term))
                .collect(),
        };
        let mut set = BTreeSet::new();
        for query in &queries {
            let results = endpoint.select(query)?;
            set.extend(
                results
                    .column(LEAF_VARIABLE)?
                    .into_iter()
                    .map(str::trim)
                    .filter(|iri| !iri.is_empty())
                    .map(str::to_string),
            );
        }
        Ok(set)
    }
}

/// Result of a filtering pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub output: PathBuf,
    pub kept: usize,
    pub dropped: usize,
}

/// Write the rows of `input` whose object qualifies under `criterion`.
///
/// Header rows are carried over so the filtered file can still be
/// humanized. Row order is preserved.
pub fn filter_file(
    input: &Path,
    criterion: &FilterCriterion,
    endpoint: &dyn SparqlEndpoint,
) -> Result<FilterOutcome, PredictionError> {
    let rows = read_rows(input)?;
    let qualifying = criterion.qualifying_set(endpoint)?;
    tracing::debug!("{} qualifying ontology terms", qualifying.len());

    let mut kept = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;
    for row in &rows {
        if row.is_header() {
            kept.push(row);
            continue;
        }
        row.require_columns(input, 2)?;
        if row.object().is_some_and(|object| qualifying.contains(object)) {
            kept.push(row);
        } else {
            dropped += 1;
        }
    }

    let output = criterion.output_path(input);
    write_rows(&output, kept.iter().map(|row| row.cells()))?;
    let kept = kept.iter().filter(|row| !row.is_header()).count();
    tracing::info!(
        "Filtered {}: kept {kept}, dropped {dropped} -> {}",
        input.display(),
        output.display()
    );
    Ok(FilterOutcome {
        output,
        kept,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparql::QueryResults;
    use std::cell::RefCell;
    use tempfile::tempdir;

    struct Canned {
        answers: RefCell<Vec<QueryResults>>,
        seen: RefCell<Vec<String>>,
    }

    impl Canned {
        fn new(answers: Vec<Vec<&str>>) -> Self {
            Self {
                answers: RefCell::new(
                    answers
                        .into_iter()
                        .rev()
                        .map(|values| {
                            QueryResults::single_column(
                                LEAF_VARIABLE,
                                values.into_iter().map(str::to_string),
                            )
                        })
                        .collect(),
                ),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl SparqlEndpoint for Canned {
        fn select(&self, query: &SparqlQuery) -> Result<QueryResults, RemoteQueryError> {
            self.seen.borrow_mut().push(query.as_str().to_string());
            self.answers
                .borrow_mut()
                .pop()
                .ok_or_else(|| RemoteQueryError::MalformedResponse {
                    reason: "no canned answer".to_string(),
                })
        }
    }

    #[test]
    fn ontology_names_parse() {
        assert_eq!("phenotype".parse::<Ontology>().unwrap(), Ontology::Phenotype);
        assert!(matches!(
            "anatomy".parse::<Ontology>(),
            Err(PredictionError::UnsupportedOntology { .. })
        ));
    }

    #[test]
    fn output_names_follow_criterion() {
        let input = Path::new("pred.txt");
        let ancestors = FilterCriterion::MinAncestors {
            count: 4,
            ontology: Ontology::Phenotype,
        };
        assert_eq!(
            ancestors.output_path(input),
            PathBuf::from("pred.txt_filtered_4_ancestors.txt")
        );
        let domains =
            FilterCriterion::domains(["cell physiology phenotype", "behavior"]).unwrap();
        assert_eq!(
            domains.output_path(input),
            PathBuf::from("pred.txt_filtered_cell_physiology_phenotype+behavior_domain.txt")
        );
    }

    #[test]
    fn empty_domain_list_is_rejected() {
        assert!(matches!(
            FilterCriterion::domains(Vec::<String>::new()),
            Err(PredictionError::EmptyDomainList)
        ));
        assert!(FilterCriterion::domains(["  "]).is_err());
    }

    #[test]
    fn domain_sets_are_unioned_over_every_term() {
        let endpoint = Canned::new(vec![vec!["a", "b"], vec!["c"], vec!["b", "d"]]);
        let criterion = FilterCriterion::domains(["one", "two", "three"]).unwrap();
        let set = criterion.qualifying_set(&endpoint).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), ["a", "b", "c", "d"]);
        assert_eq!(endpoint.seen.borrow().len(), 3);
        assert!(endpoint.seen.borrow()[1].contains("rdfs:label \"two\""));
    }

    #[test]
    fn keeps_header_and_qualifying_rows_in_order() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("pred.txt");
        std::fs::write(
            &input,
            "input,prediction,score,rank,known\ng1,p2,0.9,1,False\ng1,p1,0.8,2,False\ng2,p3,0.7,3,True\ng3,p2,0.6,4,False\n",
        )
        .unwrap();
        let endpoint = Canned::new(vec![vec!["p2", "p3"]]);
        let criterion = FilterCriterion::MinAncestors {
            count: 3,
            ontology: Ontology::Phenotype,
        };
        let outcome = filter_file(&input, &criterion, &endpoint).unwrap();
        assert_eq!(outcome.kept, 3);
        assert_eq!(outcome.dropped, 1);
        let written = std::fs::read_to_string(&outcome.output).unwrap();
        assert_eq!(
            written,
            "input,prediction,score,rank,known\ng1,p2,0.9,1,False\ng2,p3,0.7,3,True\ng3,p2,0.6,4,False\n"
        );
        assert!(endpoint.seen.borrow()[0].contains("subClassOf{3,}"));
    }

    #[test]
    fn single_column_row_is_malformed() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("pred.txt");
        std::fs::write(&input, "g1,p1\nlonely\n").unwrap();
        let endpoint = Canned::new(vec![vec!["p1"]]);
        let criterion = FilterCriterion::domains(["x"]).unwrap();
        let err = filter_file(&input, &criterion, &endpoint).unwrap_err();
        assert!(matches!(err, PredictionError::MalformedRow { line: 2, .. }));
    }
}
