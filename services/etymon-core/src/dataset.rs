//! Tabular headword datasets.
//!
//! One row per headword, one column per candidate language plus optional
//! report columns. Columns are resolved to positions once, when the dataset
//! is loaded; a missing language column stops the load.

use csv::{ByteRecord, StringRecord};
use rayon::prelude::*;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{EtymonConfig, DEFAULT_PREDICTED_COLUMN, LEGACY_PREDICTED_COLUMN};
use crate::error::{EtymonError, Result};
use crate::metric::PhoneticMetric;
use crate::score::{GradedScorer, ScoreReport};
use crate::select::{select_nearest, ScanPolicy};
use crate::types::{Estimate, LanguageSet};

/// Names of the columns appended by an estimation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportColumns {
    pub predicted: String,
    pub rendering: String,
    pub distance: String,
}

impl From<&EtymonConfig> for ReportColumns {
    fn from(config: &EtymonConfig) -> Self {
        Self {
            predicted: config.predicted_column.clone(),
            rendering: config.rendering_column.clone(),
            distance: config.distance_column.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    headers: StringRecord,
    records: Vec<StringRecord>,
    headword_idx: usize,
    /// Column position of each language, in language order
    language_idx: Vec<usize>,
}

impl Dataset {
    pub fn from_path(
        path: impl AsRef<Path>,
        languages: &LanguageSet,
        headword_column: Option<&str>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let dataset = Self::from_reader(File::open(path)?, languages, headword_column)?;
        info!(path = %path.display(), rows = dataset.len(), "loaded dataset");
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        languages: &LanguageSet,
        headword_column: Option<&str>,
    ) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let mut headers = decode_lossy(rdr.byte_headers()?);
        headers.trim();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name)
                .ok_or_else(|| EtymonError::MissingColumn(name.to_string()))
        };

        let headword_idx = match headword_column {
            Some(name) => position(name)?,
            None => 0,
        };
        let language_idx = languages
            .iter()
            .map(|lang| position(&lang.column))
            .collect::<Result<Vec<_>>>()?;

        // Cells are decoded lossily; badly encoded text reaches the selector
        // with U+FFFD and is skipped there.
        let mut records = Vec::new();
        for result in rdr.byte_records() {
            let record = result?;
            if record.len() > headers.len() {
                let line = record.position().map_or(0, |p| p.line());
                return Err(EtymonError::RaggedRow {
                    line,
                    fields: record.len(),
                    expected: headers.len(),
                });
            }
            if std::str::from_utf8(record.as_slice()).is_err() {
                warn!(
                    line = record.position().map_or(0, |p| p.line()),
                    "row is not valid UTF-8, decoding lossily"
                );
            }
            records.push(decode_lossy(&record));
        }

        Ok(Self {
            headers,
            records,
            headword_idx,
            language_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn headword(&self, row: usize) -> &str {
        self.records[row].get(self.headword_idx).unwrap_or("").trim()
    }

    /// `(language index, cell)` pairs for a row, in language order
    pub fn candidates(&self, row: usize) -> impl Iterator<Item = (usize, Option<&str>)> + '_ {
        let record = &self.records[row];
        self.language_idx
            .iter()
            .enumerate()
            .map(move |(language, &col)| (language, record.get(col)))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
    }

    /// Cells of a named column; rows too short for it yield `None`
    pub fn column(&self, name: &str) -> Result<Vec<Option<&str>>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| EtymonError::MissingColumn(name.to_string()))?;
        Ok(self.records.iter().map(|r| r.get(idx)).collect())
    }

    fn estimate_row<M>(&self, metric: &M, policy: ScanPolicy, row: usize) -> Option<Estimate>
    where
        M: PhoneticMetric + ?Sized,
    {
        select_nearest(metric, self.headword(row), self.candidates(row), policy)
    }

    /// Run the selector over every row, in row order
    pub fn estimate<M>(&self, metric: &M, policy: ScanPolicy) -> Vec<Option<Estimate>>
    where
        M: PhoneticMetric + ?Sized,
    {
        let estimates: Vec<_> = (0..self.len())
            .map(|row| self.estimate_row(metric, policy, row))
            .collect();
        log_coverage(&estimates);
        estimates
    }

    /// Same result as [`Dataset::estimate`], with rows spread over threads
    pub fn estimate_parallel<M>(&self, metric: &M, policy: ScanPolicy) -> Vec<Option<Estimate>>
    where
        M: PhoneticMetric + Sync + ?Sized,
    {
        let estimates: Vec<_> = (0..self.len())
            .into_par_iter()
            .map(|row| self.estimate_row(metric, policy, row))
            .collect();
        log_coverage(&estimates);
        estimates
    }

    /// Score estimates against the ground-truth column.
    ///
    /// Rows without an estimate or with a blank label are unscored.
    pub fn score_estimates(
        &self,
        scorer: &GradedScorer,
        estimates: &[Option<Estimate>],
        truth_column: &str,
    ) -> Result<ScoreReport> {
        let truths = self.column(truth_column)?;
        let mut tally = scorer.tally();

        for (row, (estimate, truth)) in estimates.iter().zip(truths).enumerate() {
            match (estimate, non_blank(truth)) {
                (Some(estimate), Some(truth)) => {
                    let actual = scorer.languages().index_of(truth)?;
                    tally.add(estimate.language, actual)?;
                }
                _ => {
                    debug!(headword = self.headword(row), "row not scored");
                    tally.skip();
                }
            }
        }

        Ok(tally.finish())
    }

    /// Score a previously written report, reading predictions from a column.
    ///
    /// Predictions may be language names or, as in older reports, language
    /// indices. When `predicted_column` is the default header and absent, the
    /// legacy predicted-language header is read instead.
    pub fn score_report(
        &self,
        scorer: &GradedScorer,
        predicted_column: &str,
        truth_column: &str,
    ) -> Result<ScoreReport> {
        let predicted = match self.column(predicted_column) {
            Err(EtymonError::MissingColumn(_)) if predicted_column == DEFAULT_PREDICTED_COLUMN => {
                debug!("falling back to legacy predicted-language column");
                self.column(LEGACY_PREDICTED_COLUMN)?
            }
            other => other?,
        };
        let truths = self.column(truth_column)?;
        let languages = scorer.languages();
        let mut tally = scorer.tally();

        for (predicted, truth) in predicted.into_iter().zip(truths) {
            match (non_blank(predicted), non_blank(truth)) {
                (Some(predicted), Some(truth)) => {
                    let predicted = match predicted.parse::<usize>() {
                        Ok(index) => languages.check_index(index)?,
                        Err(_) => languages.index_of(predicted)?,
                    };
                    tally.add(predicted, languages.index_of(truth)?)?;
                }
                _ => tally.skip(),
            }
        }

        Ok(tally.finish())
    }

    /// Write the dataset with report columns filled from `estimates`.
    ///
    /// Existing report columns are overwritten, missing ones appended.
    pub fn write_augmented<W: Write>(
        &self,
        writer: W,
        languages: &LanguageSet,
        estimates: &[Option<Estimate>],
        columns: &ReportColumns,
    ) -> Result<()> {
        let mut headers: Vec<String> = self.headers.iter().map(str::to_string).collect();
        let mut slot = |name: &str| match headers.iter().position(|h| h == name) {
            Some(idx) => idx,
            None => {
                headers.push(name.to_string());
                headers.len() - 1
            }
        };
        let predicted_idx = slot(&columns.predicted);
        let rendering_idx = slot(&columns.rendering);
        let distance_idx = slot(&columns.distance);

        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&headers)?;

        for (row, record) in self.records.iter().enumerate() {
            let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
            fields.resize(headers.len(), String::new());

            if let Some(Some(estimate)) = estimates.get(row) {
                let language = languages
                    .get(estimate.language)
                    .map(|l| l.name.clone())
                    .unwrap_or_default();
                fields[predicted_idx] = language;
                fields[rendering_idx] = estimate.rendering.clone();
                fields[distance_idx] = estimate.distance.to_string();
            } else {
                fields[predicted_idx].clear();
                fields[rendering_idx].clear();
                fields[distance_idx].clear();
            }

            wtr.write_record(&fields)?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn save_augmented(
        &self,
        path: impl AsRef<Path>,
        languages: &LanguageSet,
        estimates: &[Option<Estimate>],
        columns: &ReportColumns,
    ) -> Result<()> {
        let path = path.as_ref();
        self.write_augmented(File::create(path)?, languages, estimates, columns)?;
        info!(path = %path.display(), "wrote augmented dataset");
        Ok(())
    }
}

fn decode_lossy(record: &ByteRecord) -> StringRecord {
    record.iter().map(String::from_utf8_lossy).collect()
}

fn non_blank(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|c| !c.is_empty())
}

fn log_coverage(estimates: &[Option<Estimate>]) {
    let estimated = estimates.iter().filter(|e| e.is_some()).count();
    info!(
        rows = estimates.len(),
        estimated,
        without_estimate = estimates.len() - estimated,
        "estimation finished"
    );
}
