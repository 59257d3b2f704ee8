//! Run configuration, loaded from JSON.
//!
//! The default reproduces the legacy six-language setup and its expert
//! relatedness matrix. Relatedness entries of `null` mean "no direct edge".

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{EtymonError, Result};
use crate::graph::RelatednessGraph;
use crate::select::ScanPolicy;
use crate::types::{Language, LanguageSet};

pub const DEFAULT_TRUTH_COLUMN: &str = "Actual Etymology";
pub const DEFAULT_PREDICTED_COLUMN: &str = "Epitran-PanPhon estimated closest language";
/// Older reports stored the predicted language under this header
pub const LEGACY_PREDICTED_COLUMN: &str = "Epitran-PanPhon estimated closest word";
pub const DEFAULT_RENDERING_COLUMN: &str = "Epitran-PanPhon estimation";
pub const DEFAULT_DISTANCE_COLUMN: &str = "Epitran-PanPhon estimated distance";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    /// Dataset column; defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Orthography-to-IPA mapping applied to this language's renderings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<PathBuf>,
}

impl LanguageConfig {
    fn named(name: &str, column: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            column: column.map(str::to_string),
            transliteration: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtymonConfig {
    /// Candidate languages, in graph order
    pub languages: Vec<LanguageConfig>,
    pub relatedness: Vec<Vec<Option<f64>>>,
    /// Headword column; the first column when unset
    pub headword_column: Option<String>,
    pub truth_column: String,
    pub predicted_column: String,
    pub rendering_column: String,
    pub distance_column: String,
    pub scan: ScanPolicy,
    /// PanPhon-style feature table; grapheme distance is used without one
    pub feature_table: Option<PathBuf>,
}

impl Default for EtymonConfig {
    fn default() -> Self {
        let languages = vec![
            LanguageConfig::named("Brittonic", Some("Brythonic")),
            LanguageConfig::named("Latin", None),
            LanguageConfig::named("Old English", None),
            LanguageConfig::named("Old Norse", None),
            LanguageConfig::named("Middle French", None),
            LanguageConfig::named("Greek", None),
        ];
        let relatedness = [
            [0.0, 0.8, 0.9, 1.0, 1.0, 1.0],
            [0.8, 0.0, 0.6, 1.0, 0.4, 0.3],
            [0.9, 0.6, 0.0, 0.2, 0.5, 1.0],
            [1.0, 1.0, 0.2, 0.0, 1.0, 1.0],
            [1.0, 0.4, 0.5, 1.0, 0.0, 1.0],
            [1.0, 0.3, 1.0, 1.0, 1.0, 0.0],
        ]
        .iter()
        .map(|row| row.iter().copied().map(Some).collect())
        .collect();

        Self {
            languages,
            relatedness,
            headword_column: None,
            truth_column: DEFAULT_TRUTH_COLUMN.to_string(),
            predicted_column: DEFAULT_PREDICTED_COLUMN.to_string(),
            rendering_column: DEFAULT_RENDERING_COLUMN.to_string(),
            distance_column: DEFAULT_DISTANCE_COLUMN.to_string(),
            scan: ScanPolicy::Full,
            feature_table: None,
        }
    }
}

impl EtymonConfig {
    /// Read and validate a JSON configuration file.
    ///
    /// Relative resource paths are resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| EtymonError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&raw)?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(table) = self.feature_table.as_mut() {
            resolve(table);
        }
        for lang in &mut self.languages {
            if let Some(mapping) = lang.transliteration.as_mut() {
                resolve(mapping);
            }
        }
    }

    /// Check language set and graph agree before any work starts
    pub fn validate(&self) -> Result<()> {
        let languages = self.language_set()?;
        let graph = self.relatedness_graph()?;
        graph.ensure_matches(&languages)?;

        if let ScanPolicy::Bounded { max_index } = self.scan {
            warn!(
                max_index,
                "bounded candidate scan enabled, languages past the bound are ignored"
            );
        }
        Ok(())
    }

    pub fn language_set(&self) -> Result<LanguageSet> {
        LanguageSet::new(
            self.languages
                .iter()
                .map(|l| match &l.column {
                    Some(column) => Language::with_column(&l.name, column),
                    None => Language::new(&l.name),
                })
                .collect(),
        )
    }

    pub fn relatedness_graph(&self) -> Result<RelatednessGraph> {
        let rows: Vec<Vec<f64>> = self
            .relatedness
            .iter()
            .map(|row| row.iter().map(|w| w.unwrap_or(f64::INFINITY)).collect())
            .collect();
        RelatednessGraph::from_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EtymonConfig::default();
        config.validate().unwrap();
        let languages = config.language_set().unwrap();
        assert_eq!(languages.len(), 6);
        assert_eq!(languages.get(0).unwrap().column, "Brythonic");
        assert_eq!(languages.index_of("Greek").unwrap(), 5);
    }

    #[test]
    fn test_default_shortest_paths() {
        let paths = EtymonConfig::default()
            .relatedness_graph()
            .unwrap()
            .shortest_paths();
        // Old Norse reaches Latin through Old English
        assert!((paths.get(3, 1).unwrap() - 0.8).abs() < 1e-12);
        // Greek reaches Middle French through Latin
        assert!((paths.get(5, 4).unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_load_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etymon.json");
        fs::write(
            &path,
            r#"{
                "languages": [
                    {"name": "Latin"},
                    {"name": "Old Norse", "column": "no", "transliteration": "nno.csv"}
                ],
                "relatedness": [[0, null], [null, 0]],
                "feature_table": "ipa_all.csv",
                "scan": {"mode": "bounded", "max_index": 5}
            }"#,
        )
        .unwrap();

        let config = EtymonConfig::load(&path).unwrap();
        assert_eq!(config.truth_column, DEFAULT_TRUTH_COLUMN);
        assert_eq!(config.scan, ScanPolicy::Bounded { max_index: 5 });
        assert_eq!(config.feature_table, Some(dir.path().join("ipa_all.csv")));
        assert_eq!(
            config.languages[1].transliteration,
            Some(dir.path().join("nno.csv"))
        );
        let paths = config.relatedness_graph().unwrap().shortest_paths();
        assert_eq!(paths.get(0, 1), Some(f64::INFINITY));
    }

    #[test]
    fn test_load_rejects_mismatched_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etymon.json");
        fs::write(
            &path,
            r#"{"languages": [{"name": "Latin"}], "relatedness": [[0, 1], [1, 0]]}"#,
        )
        .unwrap();
        assert!(matches!(
            EtymonConfig::load(&path),
            Err(EtymonError::GraphShape(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            EtymonConfig::load("/nonexistent/etymon.json"),
            Err(EtymonError::Config { .. })
        ));
    }
}
