//! Articulatory feature tables in the PanPhon `ipa_all.csv` layout.
//!
//! The first column holds the IPA segment, every following column one
//! ternary feature (`+`, `-`, `0`). A table is loaded once and shared by
//! every distance computation of a run.

use ahash::AHashMap;
use ndarray::{Array2, ArrayView1};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{PhoneticError, Result};

/// Ternary articulatory feature value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureValue {
    Minus,
    Zero,
    Plus,
}

impl FeatureValue {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "+" => Some(Self::Plus),
            "-" => Some(Self::Minus),
            "0" => Some(Self::Zero),
            _ => None,
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Self::Minus => -1,
            Self::Zero => 0,
            Self::Plus => 1,
        }
    }
}

/// Segment inventory with one feature row per IPA segment
#[derive(Debug, Clone)]
pub struct FeatureTable {
    feature_names: Vec<String>,
    features: Array2<i8>,
    index: AHashMap<String, usize>,
    /// Longest segment in chars, bounds the greedy match window
    max_segment_len: usize,
}

impl FeatureTable {
    /// Load a table from a CSV file on disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let table = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            segments = table.len(),
            features = table.feature_names.len(),
            "loaded feature table"
        );
        Ok(table)
    }

    /// Load a table from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let feature_names: Vec<String> = rdr
            .headers()?
            .iter()
            .skip(1)
            .map(str::to_string)
            .collect();
        if feature_names.is_empty() {
            return Err(PhoneticError::NoFeatures);
        }

        let mut index = AHashMap::new();
        let mut rows: Vec<i8> = Vec::new();
        let mut max_segment_len = 0;

        for result in rdr.records() {
            let record = result?;
            let segment = record.get(0).unwrap_or("");
            if segment.is_empty() || index.contains_key(segment) {
                continue;
            }

            for raw in record.iter().skip(1) {
                let value =
                    FeatureValue::parse(raw).ok_or_else(|| PhoneticError::InvalidFeatureValue {
                        segment: segment.to_string(),
                        value: raw.to_string(),
                    })?;
                rows.push(value.as_i8());
            }

            max_segment_len = max_segment_len.max(segment.chars().count());
            index.insert(segment.to_string(), index.len());
        }

        let features = Array2::from_shape_vec((index.len(), feature_names.len()), rows)
            .map_err(|_| PhoneticError::NoFeatures)?;

        Ok(Self {
            feature_names,
            features,
            index,
            max_segment_len,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.index.contains_key(segment)
    }

    /// Feature row of a segment id returned by [`FeatureTable::segment`]
    pub fn features(&self, id: usize) -> ArrayView1<'_, i8> {
        self.features.row(id)
    }

    /// Split an IPA string into segment ids by greedy longest match.
    ///
    /// Characters that start no known segment are dropped.
    pub fn segment(&self, ipa: &str) -> Vec<usize> {
        let chars: Vec<char> = ipa.chars().collect();
        let mut ids = Vec::with_capacity(chars.len());
        let mut start = 0;

        while start < chars.len() {
            let window = self.max_segment_len.min(chars.len() - start);
            let hit = (1..=window).rev().find_map(|len| {
                let candidate: String = chars[start..start + len].iter().collect();
                self.index.get(&candidate).map(|&id| (id, len))
            });

            match hit {
                Some((id, len)) => {
                    ids.push(id);
                    start += len;
                }
                None => start += 1,
            }
        }

        ids
    }

    /// Normalized feature difference between two segments, in `[0, 1]`.
    ///
    /// Opposite values (`+` vs `-`) count twice as much as a specified value
    /// against an unspecified one.
    pub fn feature_difference(&self, a: usize, b: usize) -> f64 {
        let row_a = self.features.row(a);
        let row_b = self.features.row(b);
        let total: i32 = row_a
            .iter()
            .zip(row_b.iter())
            .map(|(&x, &y)| (i32::from(x) - i32::from(y)).abs())
            .sum();

        total as f64 / (2.0 * self.feature_names.len() as f64)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SMALL_TABLE: &str = "\
ipa,syl,son,cons,voi,lab
p,-,-,+,-,+
b,-,-,+,+,+
m,-,+,+,+,+
a,+,+,-,+,-
t,-,-,+,-,-
tʃ,-,-,+,-,0
";

    pub(crate) fn small_table() -> FeatureTable {
        FeatureTable::from_reader(SMALL_TABLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_load_table() {
        let table = small_table();
        assert_eq!(table.len(), 6);
        assert_eq!(table.feature_names().len(), 5);
        assert!(table.contains("tʃ"));
    }

    #[test]
    fn test_longest_match_segmentation() {
        let table = small_table();
        let ids = table.segment("tʃa");
        assert_eq!(ids.len(), 2);
        assert_eq!(table.features(ids[1])[0], 1);
    }

    #[test]
    fn test_unknown_characters_dropped() {
        let table = small_table();
        assert_eq!(table.segment("pxa").len(), 2);
        assert!(table.segment("xyz").is_empty());
    }

    #[test]
    fn test_feature_difference() {
        let table = small_table();
        let p = table.segment("p")[0];
        let b = table.segment("b")[0];
        assert_eq!(table.feature_difference(p, p), 0.0);
        // one opposite feature out of five
        assert!((table.feature_difference(p, b) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_feature_value() {
        let csv = "ipa,syl\np,?\n";
        let err = FeatureTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PhoneticError::InvalidFeatureValue { .. }));
    }

    #[test]
    fn test_no_feature_columns() {
        let err = FeatureTable::from_reader("ipa\np\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PhoneticError::NoFeatures));
    }
}
