use std::path::PathBuf;

use thiserror::Error;

use crate::sparql::RemoteQueryError;

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: csv::Error },
    #[error("Unrecognized identifier {iri:?}: expected a WBGene or WBPhenotype IRI")]
    UnrecognizedIdentifier { iri: String },
    #[error("{path}:{line}: expected at least {expected} columns, found {columns}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        columns: usize,
        expected: usize,
    },
    #[error(transparent)]
    Remote(#[from] RemoteQueryError),
    #[error("Unsupported ontology {name:?} (supported: phenotype)")]
    UnsupportedOntology { name: String },
    #[error("Domain filtering needs at least one ontology term")]
    EmptyDomainList,
}
