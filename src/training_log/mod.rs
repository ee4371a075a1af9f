//! Extraction of training runs from embedding-pipeline log files.
//!
//! A single forward scan turns a log into a [`LogRecord`]: dataset sizes,
//! the embedding method and its hyperparameters, one loss pair per epoch,
//! the final Hit@1 score and, when the phase markers are present, how long
//! each phase took.

mod error;
mod extract;
mod line;
mod timestamp;

use time::{Duration, PrimitiveDateTime};

pub use error::{ExtractError, RequiredField};
pub use extract::{extract_lines, extract_log};
pub use timestamp::format_duration;

/// A count that logs of concatenated runs may report inconsistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// Every observation agreed on this value.
    Known(u64),
    /// At least two observations disagreed.
    Ambiguous,
}

impl Count {
    /// Fold a new observation into an optional running value.
    ///
    /// The first value wins; any later differing value makes the field ambiguous
    /// for the rest of the scan.
    pub fn observe(current: Option<Count>, value: u64) -> Count {
        match current {
            None => Count::Known(value),
            Some(Count::Known(seen)) if seen == value => Count::Known(seen),
            Some(_) => Count::Ambiguous,
        }
    }
}

/// Whether the training data included an ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsesOntology {
    Yes,
    No,
    Unknown,
}

/// How the training graph links genes to phenotypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    Direct,
    Indirect,
    Unknown,
}

/// One `(train_loss, valid_loss)` observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochLoss {
    pub train: f64,
    pub valid: f64,
}

/// Timestamps of the pipeline phases, each set only when observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimestamps {
    pub start: Option<PrimitiveDateTime>,
    pub embedding_done: Option<PrimitiveDateTime>,
    pub classifier_done: Option<PrimitiveDateTime>,
}

impl PhaseTimestamps {
    /// Start of the run to the trained classifier.
    pub fn total_duration(&self) -> Option<Duration> {
        Some(self.classifier_done? - self.start?)
    }

    /// Start of the run to the trained embedding model.
    pub fn embedding_duration(&self) -> Option<Duration> {
        Some(self.embedding_done? - self.start?)
    }

    /// Trained embedding model to the trained classifier.
    pub fn classifier_duration(&self) -> Option<Duration> {
        Some(self.classifier_done? - self.embedding_done?)
    }
}

/// Everything extracted from one training log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// File name of the originating log.
    pub source_name: String,
    /// `None` when the log never reported the count.
    pub entity_count: Option<Count>,
    pub relation_type_count: Option<Count>,
    /// Sum over every `Number of triples` line.
    pub triple_count: u64,
    /// Last reported embedding method.
    pub algorithm: String,
    /// Epoch `i` (1-based) is `epoch_series[i - 1]`.
    pub epoch_series: Vec<EpochLoss>,
    pub hit_at_1: f64,
    pub batch_size: u64,
    /// Value of the `n_epochs` hyperparameter, if logged.
    pub epoch_count: Option<u64>,
    pub data_keywords: Option<String>,
    pub uses_ontology: UsesOntology,
    pub structure_kind: StructureKind,
    /// 1-based epoch with the lowest validation loss.
    pub best_epoch: usize,
    pub phase_timestamps: PhaseTimestamps,
}

impl LogRecord {
    pub fn total_duration(&self) -> Option<Duration> {
        self.phase_timestamps.total_duration()
    }

    pub fn embedding_duration(&self) -> Option<Duration> {
        self.phase_timestamps.embedding_duration()
    }

    pub fn classifier_duration(&self) -> Option<Duration> {
        self.phase_timestamps.classifier_duration()
    }

    /// True when `n_epochs` was logged and differs from the observed epoch lines.
    pub fn epoch_count_mismatch(&self) -> bool {
        self.epoch_count
            .is_some_and(|expected| expected != self.epoch_series.len() as u64)
    }

    /// Validation loss at the best epoch.
    pub fn best_valid_loss(&self) -> Option<f64> {
        self.epoch_series
            .get(self.best_epoch.checked_sub(1)?)
            .map(|loss| loss.valid)
    }
}

/// 1-based index of the smallest validation loss, first occurrence on ties.
///
/// Returns `None` for an empty series. NaN losses never win over a number.
pub fn best_epoch(series: &[EpochLoss]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, loss) in series.iter().enumerate() {
        let replace = match best {
            None => true,
            Some((_, value)) => loss.valid < value || (value.is_nan() && !loss.valid.is_nan()),
        };
        if replace {
            best = Some((idx, loss.valid));
        }
    }
    best.map(|(idx, _)| idx + 1)
}

/// Derive ontology usage and graph structure from the `keywords` value.
pub fn classify_keywords(keywords: Option<&str>) -> (UsesOntology, StructureKind) {
    let Some(keywords) = keywords else {
        return (UsesOntology::Unknown, StructureKind::Unknown);
    };
    let tokens: Vec<String> = keywords
        .split(|c: char| c == ',' || c.is_whitespace() || c == '[' || c == ']' || c == '\'')
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
        .collect();
    let uses_ontology = if tokens.iter().any(|token| token.contains("ontology")) {
        UsesOntology::Yes
    } else {
        UsesOntology::No
    };
    let structure = if tokens.iter().any(|token| token.contains("indirect")) {
        StructureKind::Indirect
    } else if tokens.iter().any(|token| token.contains("direct")) {
        StructureKind::Direct
    } else {
        StructureKind::Unknown
    };
    (uses_ontology, structure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(valid: &[f64]) -> Vec<EpochLoss> {
        valid
            .iter()
            .map(|&valid| EpochLoss { train: 1.0, valid })
            .collect()
    }

    #[test]
    fn best_epoch_prefers_first_of_equal_minima() {
        assert_eq!(best_epoch(&series(&[0.9, 0.4, 0.5, 0.4])), Some(2));
        assert_eq!(best_epoch(&series(&[0.3])), Some(1));
        assert_eq!(best_epoch(&[]), None);
    }

    #[test]
    fn best_epoch_skips_nan_losses() {
        assert_eq!(best_epoch(&series(&[f64::NAN, 0.8, 0.7])), Some(3));
        assert_eq!(best_epoch(&series(&[0.8, f64::NAN, 0.9])), Some(1));
    }

    #[test]
    fn count_flips_to_ambiguous_on_disagreement() {
        let count = Count::observe(None, 10);
        let count = Count::observe(Some(count), 10);
        assert_eq!(count, Count::Known(10));
        let count = Count::observe(Some(count), 11);
        assert_eq!(count, Count::Ambiguous);
        assert_eq!(Count::observe(Some(count), 10), Count::Ambiguous);
    }

    #[test]
    fn keywords_drive_ontology_and_structure() {
        assert_eq!(
            classify_keywords(None),
            (UsesOntology::Unknown, StructureKind::Unknown)
        );
        assert_eq!(
            classify_keywords(Some("['ontology', 'indirect']")),
            (UsesOntology::Yes, StructureKind::Indirect)
        );
        assert_eq!(
            classify_keywords(Some("direct, coexpression")),
            (UsesOntology::No, StructureKind::Direct)
        );
        assert_eq!(
            classify_keywords(Some("coexpression")),
            (UsesOntology::No, StructureKind::Unknown)
        );
    }
}
