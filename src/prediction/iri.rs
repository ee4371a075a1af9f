use super::PredictionError;
use crate::sparql::PrefixedName;

/// Identifier families known to the label lookup: marker, prefix, suffix length.
const FAMILIES: [(&str, &str, usize); 2] = [
    ("WBGene", "wbgene", 8),
    ("WBPhenotype", "wbpheno", 7),
];

/// Map a long WormBase IRI onto its `prefix:local` form.
pub fn shorten(iri: &str) -> Result<PrefixedName, PredictionError> {
    let iri = iri.trim();
    let unrecognized = || PredictionError::UnrecognizedIdentifier {
        iri: iri.to_string(),
    };
    let (_, prefix, len) = FAMILIES
        .iter()
        .find(|(marker, _, _)| iri.contains(marker))
        .ok_or_else(unrecognized)?;
    let local = suffix(iri, *len).ok_or_else(unrecognized)?;
    PrefixedName::new(prefix, local).map_err(|_| unrecognized())
}

fn suffix(text: &str, chars: usize) -> Option<&str> {
    let (start, _) = text.char_indices().rev().nth(chars.checked_sub(1)?)?;
    Some(&text[start..])
}
