//! Remote SPARQL access.
//!
//! Every lookup is a blocking round trip; there is no batching, caching or
//! retry. A failed query aborts the caller's run.

mod error;
mod http;
mod query;
mod results;

pub use error::RemoteQueryError;
pub use http::{DEFAULT_READ_TIMEOUT, HttpEndpoint};
pub use query::{PrefixedName, RDFS_NAMESPACE, SparqlQuery, string_literal};
pub use results::QueryResults;

/// Something that can answer SELECT queries with tabular results.
pub trait SparqlEndpoint {
    fn select(&self, query: &SparqlQuery) -> Result<QueryResults, RemoteQueryError>;
}
