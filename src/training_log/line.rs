//! Line classification and value parsing for training logs.

use std::sync::LazyLock;

use regex::Regex;

/// Kind of information carried by a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    StartTime,
    EntityCount,
    RelationTypeCount,
    TripleCount,
    Method,
    Epoch,
    HitAt1,
    BatchSize,
    EpochCount,
    Keywords,
    EmbeddingDone,
    ClassifierTrained,
}

/// Substring patterns in match order; the first hit decides the line kind.
const MARKERS: [(&str, Marker); 12] = [
    ("Start time:", Marker::StartTime),
    ("Number of entities", Marker::EntityCount),
    ("Number of relation types", Marker::RelationTypeCount),
    ("Number of triples", Marker::TripleCount),
    ("method :", Marker::Method),
    (" - Epoch ", Marker::Epoch),
    ("Hit@1 :", Marker::HitAt1),
    ("batch_size : ", Marker::BatchSize),
    ("n_epochs :", Marker::EpochCount),
    ("keywords :", Marker::Keywords),
    ("Training of Embedding Model done", Marker::EmbeddingDone),
    ("Classifier trained", Marker::ClassifierTrained),
];

static LAST_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("integer regex must compile"));

/// Return the marker of the first pattern contained in `line`.
pub(crate) fn classify(line: &str) -> Option<(Marker, &'static str)> {
    MARKERS
        .iter()
        .find(|(pattern, _)| line.contains(pattern))
        .map(|(pattern, marker)| (*marker, *pattern))
}

/// Text after the last `:` of the line, trimmed.
pub(crate) fn value_after_last_colon(line: &str) -> &str {
    line.rsplit(':').next().unwrap_or(line).trim()
}

/// Text after the first occurrence of `pattern`, trimmed.
pub(crate) fn value_after<'a>(line: &'a str, pattern: &str) -> &'a str {
    line.split_once(pattern)
        .map(|(_, rest)| rest.trim())
        .unwrap_or_default()
}

/// Last run of ASCII digits on the line.
pub(crate) fn last_integer(line: &str) -> Option<&str> {
    LAST_INTEGER.find_iter(line).last().map(|found| found.as_str())
}

/// Train and validation loss carried by an epoch line.
///
/// The losses live in the second `|` field; split on single spaces, token 3
/// is the train loss (trailing comma stripped) and token 6 the validation loss.
pub(crate) fn epoch_losses(line: &str) -> Result<(f64, f64), String> {
    let stats = line
        .split('|')
        .nth(1)
        .ok_or_else(|| "missing '|' separated statistics field".to_string())?;
    let tokens: Vec<&str> = stats.split(' ').collect();
    let token = |idx: usize, name: &str| {
        tokens
            .get(idx)
            .copied()
            .ok_or_else(|| format!("missing {name} loss token"))
    };
    let train_raw = token(3, "train")?.trim().trim_end_matches(',');
    let valid_raw = token(6, "validation")?.trim();
    let train = train_raw
        .parse::<f64>()
        .map_err(|_| format!("invalid train loss {train_raw:?}"))?;
    let valid = valid_raw
        .parse::<f64>()
        .map_err(|_| format!("invalid validation loss {valid_raw:?}"))?;
    Ok((train, valid))
}
