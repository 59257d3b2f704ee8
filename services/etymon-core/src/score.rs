//! Graded accuracy against ground-truth etymologies.
//!
//! A miss earns partial credit `max(1 - d, 0)` where `d` is the shortest
//! path between predicted and true donor in the relatedness graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::error::Result;
use crate::graph::{RelatednessGraph, ShortestPathMatrix};
use crate::types::LanguageSet;

/// Credit for a prediction at shortest-path distance `distance` from the truth
pub fn graded_credit(distance: f64) -> f64 {
    (1.0 - distance).max(0.0)
}

/// Scores predictions against a fixed language set and relatedness graph
#[derive(Debug, Clone)]
pub struct GradedScorer {
    languages: LanguageSet,
    paths: ShortestPathMatrix,
}

impl GradedScorer {
    pub fn new(languages: LanguageSet, graph: &RelatednessGraph) -> Result<Self> {
        graph.ensure_matches(&languages)?;
        Ok(Self {
            paths: graph.shortest_paths(),
            languages,
        })
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    pub fn paths(&self) -> &ShortestPathMatrix {
        &self.paths
    }

    /// Credit for a pair of language indices
    pub fn credit(&self, predicted: usize, actual: usize) -> Result<f64> {
        let predicted = self.languages.check_index(predicted)?;
        let actual = self.languages.check_index(actual)?;
        let distance = self
            .paths
            .get(predicted, actual)
            .unwrap_or(f64::INFINITY);
        Ok(graded_credit(distance))
    }

    /// Credit for a pair of language labels
    pub fn credit_labels(&self, predicted: &str, actual: &str) -> Result<f64> {
        let predicted = self.languages.index_of(predicted)?;
        let actual = self.languages.index_of(actual)?;
        self.credit(predicted, actual)
    }

    pub fn tally(&self) -> ScoreTally<'_> {
        ScoreTally {
            scorer: self,
            total: 0.0,
            scored: 0,
            unscored: 0,
            exact_matches: 0,
        }
    }

    /// Score `(predicted, actual)` index pairs; `None` marks a headword
    /// without an estimate or without a ground-truth label
    pub fn score<I>(&self, pairs: I) -> Result<ScoreReport>
    where
        I: IntoIterator<Item = Option<(usize, usize)>>,
    {
        let mut tally = self.tally();
        for pair in pairs {
            match pair {
                Some((predicted, actual)) => {
                    tally.add(predicted, actual)?;
                }
                None => tally.skip(),
            }
        }
        Ok(tally.finish())
    }
}

/// Running score over headwords
#[derive(Debug)]
pub struct ScoreTally<'a> {
    scorer: &'a GradedScorer,
    total: f64,
    scored: usize,
    unscored: usize,
    exact_matches: usize,
}

impl ScoreTally<'_> {
    pub fn add(&mut self, predicted: usize, actual: usize) -> Result<f64> {
        let credit = self.scorer.credit(predicted, actual)?;
        self.total += credit;
        self.scored += 1;
        if predicted == actual {
            self.exact_matches += 1;
        }
        Ok(credit)
    }

    pub fn add_labels(&mut self, predicted: &str, actual: &str) -> Result<f64> {
        let languages = self.scorer.languages();
        let predicted = languages.index_of(predicted)?;
        let actual = languages.index_of(actual)?;
        self.add(predicted, actual)
    }

    /// Record a headword that cannot be scored; it stays out of the denominator
    pub fn skip(&mut self) {
        self.unscored += 1;
    }

    pub fn finish(self) -> ScoreReport {
        let report = ScoreReport {
            dynamic_score: self.total,
            dynamic_score_percentage: (self.scored > 0)
                .then(|| self.total / self.scored as f64),
            scored: self.scored,
            unscored: self.unscored,
            exact_matches: self.exact_matches,
        };
        info!(
            score = report.dynamic_score,
            scored = report.scored,
            unscored = report.unscored,
            exact = report.exact_matches,
            "scoring finished"
        );
        report
    }
}

/// Aggregate graded score at full precision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub dynamic_score: f64,
    /// `None` when nothing could be scored
    pub dynamic_score_percentage: Option<f64>,
    pub scored: usize,
    pub unscored: usize,
    pub exact_matches: usize,
}

impl ScoreReport {
    /// Score rounded half-to-even to an integer, as legacy reports print it
    pub fn rounded_score(&self) -> f64 {
        self.dynamic_score.round_ties_even()
    }

    /// Percentage rounded half-to-even to 3 decimals
    pub fn rounded_percentage(&self) -> Option<f64> {
        self.dynamic_score_percentage
            .map(|p| (p * 1000.0).round_ties_even() / 1000.0)
    }
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dynamic Score = {}", self.rounded_score())?;
        match self.rounded_percentage() {
            // Debug keeps the trailing ".0" Python prints for whole floats
            Some(p) => write!(f, "Dynamic Score Percentage = {p:?}"),
            None => write!(f, "Dynamic Score Percentage = n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtymonError;

    fn two_language_scorer() -> GradedScorer {
        let languages = LanguageSet::from_names(["A", "B"]).unwrap();
        let graph = RelatednessGraph::from_rows(&[vec![0.0, 0.8], vec![0.8, 0.0]]).unwrap();
        GradedScorer::new(languages, &graph).unwrap()
    }

    #[test]
    fn test_partial_credit() {
        let scorer = two_language_scorer();
        let credit = scorer.credit(0, 1).unwrap();
        assert!((credit - 0.2).abs() < 1e-12);
        assert_eq!(scorer.credit(1, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_credit_clamped() {
        assert_eq!(graded_credit(1.0), 0.0);
        assert_eq!(graded_credit(1.7), 0.0);
        assert_eq!(graded_credit(f64::INFINITY), 0.0);
        assert_eq!(graded_credit(0.0), 1.0);
    }

    #[test]
    fn test_all_exact() {
        let scorer = two_language_scorer();
        let report = scorer.score((0..10).map(|i| Some((i % 2, i % 2)))).unwrap();
        assert_eq!(report.dynamic_score, 10.0);
        assert_eq!(report.dynamic_score_percentage, Some(1.0));
        assert_eq!(report.exact_matches, 10);
    }

    #[test]
    fn test_unscored_excluded_from_denominator() {
        let scorer = two_language_scorer();
        let report = scorer.score([Some((0, 0)), None, None]).unwrap();
        assert_eq!(report.scored, 1);
        assert_eq!(report.unscored, 2);
        assert_eq!(report.dynamic_score_percentage, Some(1.0));
    }

    #[test]
    fn test_nothing_scored() {
        let scorer = two_language_scorer();
        let report = scorer.score([None]).unwrap();
        assert_eq!(report.dynamic_score_percentage, None);
        assert!(report.to_string().ends_with("n/a"));
    }

    #[test]
    fn test_invalid_labels() {
        let scorer = two_language_scorer();
        assert!(matches!(
            scorer.credit_labels("A", "Klingon"),
            Err(EtymonError::InvalidLabel { .. })
        ));
        assert!(matches!(
            scorer.score([Some((2, 0))]),
            Err(EtymonError::InvalidLabel { .. })
        ));
    }

    #[test]
    fn test_graph_size_mismatch() {
        let languages = LanguageSet::from_names(["A", "B", "C"]).unwrap();
        let graph = RelatednessGraph::from_rows(&[vec![0.0, 0.8], vec![0.8, 0.0]]).unwrap();
        assert!(matches!(
            GradedScorer::new(languages, &graph),
            Err(EtymonError::GraphShape(_))
        ));
    }

    #[test]
    fn test_legacy_display() {
        let report = ScoreReport {
            dynamic_score: 2.5,
            dynamic_score_percentage: Some(0.83333),
            scored: 3,
            unscored: 0,
            exact_matches: 2,
        };
        assert_eq!(report.rounded_score(), 2.0);
        assert_eq!(report.rounded_percentage(), Some(0.833));
        assert_eq!(
            report.to_string(),
            "Dynamic Score = 2\nDynamic Score Percentage = 0.833"
        );
    }

    #[test]
    fn test_display_whole_percentage() {
        let scorer = two_language_scorer();
        let report = scorer.score([Some((0, 0)), Some((1, 1))]).unwrap();
        assert_eq!(
            report.to_string(),
            "Dynamic Score = 2\nDynamic Score Percentage = 1.0"
        );
    }
}
