//! SPARQL query construction.
//!
//! Queries are only built from validated prefixed names and escaped string
//! literals, so caller-supplied identifiers and labels cannot change the
//! query structure.

use std::fmt;

use super::RemoteQueryError;

pub const RDFS_NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";

/// Namespaces declared on every label query.
const LABEL_PREFIXES: [(&str, &str); 3] = [
    ("wbgene", "https://wormbase.org/species/c_elegans/gene/WBGene"),
    ("wbpheno", "https://wormbase.org/species/all/phenotype/WBPhenotype:"),
    ("rdfs", RDFS_NAMESPACE),
];

/// A `prefix:local` name whose parts are restricted to safe characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrefixedName {
    prefix: String,
    local: String,
}

impl PrefixedName {
    pub fn new(prefix: &str, local: &str) -> Result<Self, RemoteQueryError> {
        let invalid = |reason| RemoteQueryError::InvalidTerm {
            term: format!("{prefix}:{local}"),
            reason,
        };
        let mut prefix_chars = prefix.chars();
        if !prefix_chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            || !prefix_chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid("prefix must be ASCII letters, digits, '_' or '-'"));
        }
        if local.is_empty()
            || local.ends_with('.')
            || !local
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(invalid("local part must be ASCII letters, digits, '_', '-' or '.'"));
        }
        Ok(Self {
            prefix: prefix.to_string(),
            local: local.to_string(),
        })
    }
}

impl fmt::Display for PrefixedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

/// Quote `value` as a SPARQL string literal.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// A ready-to-send SELECT query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlQuery {
    text: String,
}

impl SparqlQuery {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// `rdfs:label` of a WormBase gene or phenotype, bound to `?label`.
    pub fn label(subject: &PrefixedName) -> Self {
        let prefixes = LABEL_PREFIXES
            .iter()
            .map(|(prefix, namespace)| format!("PREFIX {prefix}: <{namespace}>"))
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text: format!("{prefixes} SELECT ?label WHERE {{ {subject} rdfs:label ?label . }}"),
        }
    }

    /// Terms with at least `count` ancestors whose IRI contains `key`, bound to `?leaf1`.
    pub fn min_ancestors(count: u32, key: &str) -> Self {
        Self {
            text: format!(
                "PREFIX rdfs: <{RDFS_NAMESPACE}> SELECT DISTINCT ?leaf1 WHERE {{ ?leaf1 rdfs:subClassOf{{{count},}} ?leaf2 . FILTER(CONTAINS(str(?leaf1), {})) }}",
                string_literal(key)
            ),
        }
    }

    /// The term labelled `label` and all its descendants, bound to `?leaf1`.
    pub fn descendants_of_label(label: &str) -> Self {
        Self {
            text: format!(
                "PREFIX rdfs: <{RDFS_NAMESPACE}> SELECT DISTINCT ?leaf1 WHERE {{ ?leaf1 rdfs:subClassOf* ?leaf2 . ?leaf2 rdfs:label {} . }}",
                string_literal(label)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_query_declares_prefixes_and_subject() {
        let name = PrefixedName::new("wbgene", "00006993").unwrap();
        let query = SparqlQuery::label(&name);
        assert!(query.as_str().starts_with(
            "PREFIX wbgene: <https://wormbase.org/species/c_elegans/gene/WBGene> PREFIX wbpheno: "
        ));
        assert!(query
            .as_str()
            .ends_with("SELECT ?label WHERE { wbgene:00006993 rdfs:label ?label . }"));
    }

    #[test]
    fn ancestor_query_uses_repetition_path() {
        let query = SparqlQuery::min_ancestors(4, "heno");
        assert!(query.as_str().contains("?leaf1 rdfs:subClassOf{4,} ?leaf2 ."));
        assert!(query.as_str().contains("FILTER(CONTAINS(str(?leaf1), \"heno\"))"));
    }

    #[test]
    fn domain_labels_are_escaped() {
        let query = SparqlQuery::descendants_of_label("odd \"term\" } #");
        assert!(query
            .as_str()
            .contains("?leaf2 rdfs:label \"odd \\\"term\\\" } #\" . }"));
        assert_eq!(string_literal("a\\b\nc"), "\"a\\\\b\\nc\"");
    }

    #[test]
    fn prefixed_names_reject_injection() {
        assert!(PrefixedName::new("wbpheno", "0000643").is_ok());
        assert!(PrefixedName::new("wbgene", "1 } ; DROP").is_err());
        assert!(PrefixedName::new("wbgene", "").is_err());
        assert!(PrefixedName::new("wbgene", "abc.").is_err());
        assert!(PrefixedName::new("9x", "1").is_err());
        assert_eq!(
            PrefixedName::new("wbgene", "00006993").unwrap().to_string(),
            "wbgene:00006993"
        );
    }
}
