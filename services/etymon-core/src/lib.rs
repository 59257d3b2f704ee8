//! Etymon Core: donor-language estimation for English headwords.
//!
//! Provides:
//! - Nearest-candidate selection over per-language renderings
//! - Language relatedness graphs with Floyd–Warshall shortest paths
//! - Graded accuracy scoring against known etymologies
//! - CSV dataset I/O and JSON run configuration
//! - Python bindings (feature `python`)

pub mod config;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod logging;
pub mod metric;
pub mod score;
pub mod select;
pub mod types;

#[cfg(feature = "python")]
mod python;

pub use config::{EtymonConfig, LanguageConfig};
pub use dataset::{Dataset, ReportColumns};
pub use error::{EtymonError, Result};
pub use graph::{floyd_warshall, GraphStats, RelatednessGraph, ShortestPathMatrix};
pub use metric::{
    build_metric, BoxedMetric, FeatureMetric, GraphemeDistance, PhoneticMetric,
    TransliteratingMetric,
};
pub use score::{graded_credit, GradedScorer, ScoreReport, ScoreTally};
pub use select::{rank_candidates, select_nearest, ScanPolicy};
pub use types::{classify_rendering, Estimate, Language, LanguageSet, SkipReason, PLACEHOLDER};
