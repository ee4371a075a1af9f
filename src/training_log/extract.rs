use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::line::{self, Marker};
use super::timestamp::find_timestamp;
use super::{
    Count, EpochLoss, ExtractError, LogRecord, PhaseTimestamps, RequiredField, best_epoch,
    classify_keywords,
};

/// Read a training log from disk and extract its record.
pub fn extract_log(path: &Path) -> Result<LogRecord, ExtractError> {
    let file = File::open(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    extract_lines(path, BufReader::new(file))
}

/// Extract a record from already-open log text; `path` names the source in errors.
pub fn extract_lines<R: BufRead>(path: &Path, reader: R) -> Result<LogRecord, ExtractError> {
    let mut accumulator = LogAccumulator::new(path);
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ExtractError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        accumulator.ingest(idx + 1, &line)?;
    }
    let record = accumulator.finish()?;
    tracing::info!(
        "Extracted {} epochs from {} (best epoch {})",
        record.epoch_series.len(),
        record.source_name,
        record.best_epoch
    );
    if record.epoch_count_mismatch() {
        tracing::warn!(
            "{}: n_epochs is {} but {} epoch lines were logged",
            record.source_name,
            record.epoch_count.unwrap_or_default(),
            record.epoch_series.len()
        );
    }
    Ok(record)
}

/// Running state of one scan, finalized once at end of input.
struct LogAccumulator {
    path: PathBuf,
    entity_count: Option<Count>,
    relation_type_count: Option<Count>,
    triple_count: u64,
    algorithm: Option<String>,
    epoch_series: Vec<EpochLoss>,
    hit_at_1: Option<f64>,
    batch_size: Option<u64>,
    epoch_count: Option<u64>,
    data_keywords: Option<String>,
    phases: PhaseTimestamps,
}

impl LogAccumulator {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            entity_count: None,
            relation_type_count: None,
            triple_count: 0,
            algorithm: None,
            epoch_series: Vec::new(),
            hit_at_1: None,
            batch_size: None,
            epoch_count: None,
            data_keywords: None,
            phases: PhaseTimestamps::default(),
        }
    }

    fn ingest(&mut self, line_no: usize, line: &str) -> Result<(), ExtractError> {
        let Some((marker, pattern)) = line::classify(line) else {
            return Ok(());
        };
        match marker {
            Marker::StartTime => {
                let text = line::value_after(line, pattern);
                self.phases.start = Some(self.timestamp(line_no, text)?);
            }
            Marker::EntityCount => {
                let value = self.integer(line_no, "entity count", line::last_integer(line), line)?;
                self.entity_count = Some(Count::observe(self.entity_count, value));
            }
            Marker::RelationTypeCount => {
                let value =
                    self.integer(line_no, "relation type count", line::last_integer(line), line)?;
                self.relation_type_count = Some(Count::observe(self.relation_type_count, value));
            }
            Marker::TripleCount => {
                let value = self.integer(line_no, "triple count", line::last_integer(line), line)?;
                self.triple_count = self.triple_count.saturating_add(value);
            }
            Marker::Method => {
                self.algorithm = Some(line::value_after_last_colon(line).to_string());
            }
            Marker::Epoch => {
                let (train, valid) =
                    line::epoch_losses(line).map_err(|reason| ExtractError::MalformedEpochLine {
                        path: self.path.clone(),
                        line: line_no,
                        reason,
                    })?;
                self.epoch_series.push(EpochLoss { train, valid });
            }
            Marker::HitAt1 => {
                let raw = line::value_after_last_colon(line);
                let value = raw.parse::<f64>().map_err(|_| self.invalid(line_no, "Hit@1", raw))?;
                self.hit_at_1 = Some(value);
            }
            Marker::BatchSize => {
                let raw = line::value_after_last_colon(line);
                self.batch_size = Some(self.integer(line_no, "batch_size", Some(raw), raw)?);
            }
            Marker::EpochCount => {
                let raw = line::value_after_last_colon(line);
                self.epoch_count = Some(self.integer(line_no, "n_epochs", Some(raw), raw)?);
            }
            Marker::Keywords => {
                self.data_keywords = Some(line::value_after(line, pattern).to_string());
            }
            Marker::EmbeddingDone => {
                self.phases.embedding_done = Some(self.timestamp(line_no, line)?);
            }
            Marker::ClassifierTrained => {
                self.phases.classifier_done = Some(self.timestamp(line_no, line)?);
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<LogRecord, ExtractError> {
        let mut missing = Vec::new();
        if self.algorithm.is_none() {
            missing.push(RequiredField::Algorithm);
        }
        if self.hit_at_1.is_none() {
            missing.push(RequiredField::HitAt1);
        }
        if self.batch_size.is_none() {
            missing.push(RequiredField::BatchSize);
        }
        let (Some(algorithm), Some(hit_at_1), Some(batch_size)) =
            (self.algorithm, self.hit_at_1, self.batch_size)
        else {
            return Err(ExtractError::MalformedLog {
                path: self.path,
                missing,
            });
        };
        let Some(best_epoch) = best_epoch(&self.epoch_series) else {
            return Err(ExtractError::EmptySeries { path: self.path });
        };
        let (uses_ontology, structure_kind) = classify_keywords(self.data_keywords.as_deref());
        let source_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        Ok(LogRecord {
            source_name,
            entity_count: self.entity_count,
            relation_type_count: self.relation_type_count,
            triple_count: self.triple_count,
            algorithm,
            epoch_series: self.epoch_series,
            hit_at_1,
            batch_size,
            epoch_count: self.epoch_count,
            data_keywords: self.data_keywords,
            uses_ontology,
            structure_kind,
            best_epoch,
            phase_timestamps: self.phases,
        })
    }

    fn integer(
        &self,
        line_no: usize,
        field: &'static str,
        raw: Option<&str>,
        context: &str,
    ) -> Result<u64, ExtractError> {
        raw.and_then(|raw| raw.parse::<u64>().ok())
            .ok_or_else(|| self.invalid(line_no, field, raw.unwrap_or(context)))
    }

    fn timestamp(
        &self,
        line_no: usize,
        text: &str,
    ) -> Result<time::PrimitiveDateTime, ExtractError> {
        match find_timestamp(text) {
            Some(Ok(parsed)) => Ok(parsed),
            _ => Err(ExtractError::InvalidTimestamp {
                path: self.path.clone(),
                line: line_no,
                value: text.trim().to_string(),
            }),
        }
    }

    fn invalid(&self, line_no: usize, field: &'static str, value: &str) -> ExtractError {
        ExtractError::InvalidValue {
            path: self.path.clone(),
            line: line_no,
            field,
            value: value.to_string(),
        }
    }
}
