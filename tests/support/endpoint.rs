use std::cell::RefCell;
use std::collections::HashMap;

use kge_report::sparql::{QueryResults, RemoteQueryError, SparqlEndpoint, SparqlQuery};

/// In-memory endpoint answering label and term-set queries from fixed tables.
#[derive(Default)]
pub struct StubEndpoint {
    labels: HashMap<String, String>,
    domains: HashMap<String, Vec<String>>,
    deep_terms: Vec<String>,
    queries: RefCell<Vec<String>>,
}

impl StubEndpoint {
    pub fn with_label(mut self, subject: &str, label: &str) -> Self {
        self.labels.insert(subject.to_string(), label.to_string());
        self
    }

    pub fn with_domain(mut self, term: &str, members: &[&str]) -> Self {
        self.domains.insert(
            term.to_string(),
            members.iter().map(|member| member.to_string()).collect(),
        );
        self
    }

    pub fn with_deep_terms(mut self, terms: &[&str]) -> Self {
        self.deep_terms = terms.iter().map(|term| term.to_string()).collect();
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl SparqlEndpoint for StubEndpoint {
    fn select(&self, query: &SparqlQuery) -> Result<QueryResults, RemoteQueryError> {
        let text = query.as_str();
        self.queries.borrow_mut().push(text.to_string());
        if text.contains("SELECT ?label") {
            let label = self
                .labels
                .iter()
                .find(|(subject, _)| text.contains(&format!(" {subject} rdfs:label")))
                .map(|(_, label)| label.clone());
            return Ok(QueryResults::single_column("label", label));
        }
        if text.contains("rdfs:subClassOf*") {
            let members = self
                .domains
                .iter()
                .find(|(term, _)| text.contains(&format!("rdfs:label \"{term}\"")))
                .map(|(_, members)| members.clone())
                .unwrap_or_default();
            return Ok(QueryResults::single_column("leaf1", members));
        }
        if text.contains("rdfs:subClassOf{") {
            return Ok(QueryResults::single_column("leaf1", self.deep_terms.clone()));
        }
        Err(RemoteQueryError::MalformedResponse {
            reason: format!("unexpected query: {text}"),
        })
    }
}
