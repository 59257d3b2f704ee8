//! Distance metrics consumed by the selector.
//!
//! The selector only sees [`PhoneticMetric`]. Expensive resources (feature
//! tables, transliteration rules) are loaded when the metric is built and
//! then borrowed for the whole run.

use etymon_phonetic::{grapheme_edit_distance, FeatureDistance, Transliterator};
use tracing::info;

use crate::config::EtymonConfig;
use crate::error::Result;

/// Phonetic dissimilarity between a headword and a candidate rendering.
///
/// Lower is closer. Implementations should be deterministic.
pub trait PhoneticMetric {
    fn distance(&self, headword: &str, rendering: &str) -> f64;

    /// Distance for a rendering known to come from `language`
    fn distance_for(&self, _language: usize, headword: &str, rendering: &str) -> f64 {
        self.distance(headword, rendering)
    }
}

impl<F> PhoneticMetric for F
where
    F: Fn(&str, &str) -> f64,
{
    fn distance(&self, headword: &str, rendering: &str) -> f64 {
        self(headword, rendering)
    }
}

/// Feature edit distance over a table loaded once per run
#[derive(Debug, Clone)]
pub struct FeatureMetric(pub FeatureDistance);

impl PhoneticMetric for FeatureMetric {
    fn distance(&self, headword: &str, rendering: &str) -> f64 {
        self.0.distance(headword, rendering)
    }
}

/// Grapheme Levenshtein, used when no feature table is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphemeDistance;

impl PhoneticMetric for GraphemeDistance {
    fn distance(&self, headword: &str, rendering: &str) -> f64 {
        grapheme_edit_distance(headword, rendering)
    }
}

/// Transliterates renderings into IPA before measuring.
///
/// Slots follow language order; a language without rules compares its raw
/// rendering.
pub struct TransliteratingMetric<M> {
    inner: M,
    transliterators: Vec<Option<Transliterator>>,
}

impl<M: PhoneticMetric> TransliteratingMetric<M> {
    pub fn new(inner: M, transliterators: Vec<Option<Transliterator>>) -> Self {
        Self {
            inner,
            transliterators,
        }
    }
}

impl<M: PhoneticMetric> PhoneticMetric for TransliteratingMetric<M> {
    fn distance(&self, headword: &str, rendering: &str) -> f64 {
        self.inner.distance(headword, rendering)
    }

    fn distance_for(&self, language: usize, headword: &str, rendering: &str) -> f64 {
        match self.transliterators.get(language).and_then(Option::as_ref) {
            Some(translit) => self
                .inner
                .distance(headword, &translit.transliterate(rendering)),
            None => self.inner.distance(headword, rendering),
        }
    }
}

pub type BoxedMetric = Box<dyn PhoneticMetric + Send + Sync>;

/// Build the run's metric from configuration, loading every resource once
pub fn build_metric(config: &EtymonConfig) -> Result<BoxedMetric> {
    let transliterators = config
        .languages
        .iter()
        .map(|lang| {
            lang.transliteration
                .as_ref()
                .map(Transliterator::from_path)
                .transpose()
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let any_translit = transliterators.iter().any(Option::is_some);

    let metric: BoxedMetric = match (&config.feature_table, any_translit) {
        (Some(path), true) => {
            info!(path = %path.display(), "using feature edit distance with transliteration");
            Box::new(TransliteratingMetric::new(
                FeatureMetric(FeatureDistance::from_path(path)?),
                transliterators,
            ))
        }
        (Some(path), false) => {
            info!(path = %path.display(), "using feature edit distance");
            Box::new(FeatureMetric(FeatureDistance::from_path(path)?))
        }
        (None, true) => {
            info!("using grapheme edit distance with transliteration");
            Box::new(TransliteratingMetric::new(GraphemeDistance, transliterators))
        }
        (None, false) => {
            info!("no feature table configured, using grapheme edit distance");
            Box::new(GraphemeDistance)
        }
    };

    Ok(metric)
}
