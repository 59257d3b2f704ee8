//! Nearest-candidate selection.
//!
//! For one headword, scan its renderings in language order and keep the one
//! phonetically nearest to the headword. Unusable renderings are skipped and
//! never abort the scan; a headword whose candidates are all skipped yields
//! no estimate.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::metric::PhoneticMetric;
use crate::types::{classify_rendering, Estimate, SkipReason};

/// How far the candidate scan runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ScanPolicy {
    /// Every candidate is considered
    #[default]
    Full,
    /// Stop at the first usable candidate whose language index exceeds
    /// `max_index`, as one legacy script variant did
    Bounded { max_index: usize },
}

impl ScanPolicy {
    fn stops_at(self, language: usize) -> bool {
        match self {
            Self::Full => false,
            Self::Bounded { max_index } => language > max_index,
        }
    }
}

fn checked_distance<M>(
    metric: &M,
    headword: &str,
    language: usize,
    rendering: &str,
) -> Result<f64, SkipReason>
where
    M: PhoneticMetric + ?Sized,
{
    let distance = metric.distance_for(language, headword, rendering);
    if distance.is_nan() || distance < 0.0 {
        return Err(SkipReason::InvalidDistance);
    }
    Ok(distance)
}

/// Measure one candidate, or say why it was skipped
fn measure<M>(
    metric: &M,
    headword: &str,
    language: usize,
    rendering: Option<&str>,
) -> Result<(String, f64), SkipReason>
where
    M: PhoneticMetric + ?Sized,
{
    let rendering = classify_rendering(rendering)?;
    let distance = checked_distance(metric, headword, language, rendering)?;
    Ok((rendering.to_string(), distance))
}

/// Pick the candidate nearest to `headword`.
///
/// `candidates` yields `(language index, rendering cell)` in language order.
/// Ties keep the first candidate seen.
pub fn select_nearest<'a, M, I>(
    metric: &M,
    headword: &str,
    candidates: I,
    policy: ScanPolicy,
) -> Option<Estimate>
where
    M: PhoneticMetric + ?Sized,
    I: IntoIterator<Item = (usize, Option<&'a str>)>,
{
    let mut best: Option<Estimate> = None;

    for (language, cell) in candidates {
        let rendering = match classify_rendering(cell) {
            Ok(rendering) => rendering,
            Err(reason) => {
                trace!(headword, language, ?reason, "skipped candidate");
                continue;
            }
        };

        if policy.stops_at(language) {
            debug!(headword, language, "bounded scan stopped");
            break;
        }

        let distance = match checked_distance(metric, headword, language, rendering) {
            Ok(distance) => distance,
            Err(reason) => {
                trace!(headword, language, ?reason, "skipped candidate");
                continue;
            }
        };

        if best.as_ref().map_or(true, |b| distance < b.distance) {
            best = Some(Estimate {
                language,
                rendering: rendering.to_string(),
                distance,
            });
        }
    }

    if best.is_none() {
        debug!(headword, "no usable candidate");
    }

    best
}

/// Every usable candidate, nearest first; ties keep language order
pub fn rank_candidates<'a, M, I>(metric: &M, headword: &str, candidates: I) -> Vec<Estimate>
where
    M: PhoneticMetric + ?Sized,
    I: IntoIterator<Item = (usize, Option<&'a str>)>,
{
    let mut ranked: Vec<Estimate> = candidates
        .into_iter()
        .filter_map(|(language, rendering)| {
            measure(metric, headword, language, rendering)
                .ok()
                .map(|(rendering, distance)| Estimate {
                    language,
                    rendering,
                    distance,
                })
        })
        .collect();

    ranked.sort_by_key(|e| OrderedFloat(e.distance));
    ranked
}
