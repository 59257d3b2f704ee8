//! Edit distances over phonetic segments.

use ndarray::Array2;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::features::FeatureTable;

/// Feature-weighted edit distance between two IPA strings.
///
/// Insertions and deletions cost 1, substitutions cost the feature
/// difference of the two segments. The result is not length-normalized.
pub fn feature_edit_distance(table: &FeatureTable, ipa_a: &str, ipa_b: &str) -> f64 {
    let segments_a = table.segment(ipa_a);
    let segments_b = table.segment(ipa_b);

    let len_a = segments_a.len();
    let len_b = segments_b.len();

    if len_a == 0 {
        return len_b as f64;
    }
    if len_b == 0 {
        return len_a as f64;
    }

    let mut dp = Array2::<f64>::zeros((len_a + 1, len_b + 1));

    for i in 0..=len_a {
        dp[[i, 0]] = i as f64;
    }
    for j in 0..=len_b {
        dp[[0, j]] = j as f64;
    }

    for i in 1..=len_a {
        for j in 1..=len_b {
            let seg_a = segments_a[i - 1];
            let seg_b = segments_b[j - 1];

            let subst_cost = if seg_a == seg_b {
                0.0
            } else {
                table.feature_difference(seg_a, seg_b)
            };

            dp[[i, j]] = f64::min(
                f64::min(
                    dp[[i - 1, j]] + 1.0, // Deletion
                    dp[[i, j - 1]] + 1.0, // Insertion
                ),
                dp[[i - 1, j - 1]] + subst_cost,
            );
        }
    }

    dp[[len_a, len_b]]
}

/// Levenshtein distance over extended grapheme clusters
pub fn grapheme_edit_distance(a: &str, b: &str) -> f64 {
    let segments_a: Vec<&str> = a.graphemes(true).collect();
    let segments_b: Vec<&str> = b.graphemes(true).collect();

    levenshtein(&segments_a, &segments_b) as f64
}

/// Standard Levenshtein distance using dynamic programming
fn levenshtein(a: &[&str], b: &[&str]) -> usize {
    let len_a = a.len();
    let len_b = b.len();

    if len_a == 0 {
        return len_b;
    }
    if len_b == 0 {
        return len_a;
    }

    let mut prev_row: Vec<usize> = (0..=len_b).collect();
    let mut curr_row = vec![0; len_b + 1];

    for (i, seg_a) in a.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, seg_b) in b.iter().enumerate() {
            let cost = if seg_a == seg_b { 0 } else { 1 };

            curr_row[j + 1] = std::cmp::min(
                std::cmp::min(curr_row[j] + 1, prev_row[j + 1] + 1),
                prev_row[j] + cost,
            );
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len_b]
}

/// Batch compute distances for many pairs (parallelized, order preserved)
pub fn batch_distance<F>(pairs: &[(String, String)], metric: F) -> Vec<f64>
where
    F: Fn(&str, &str) -> f64 + Sync,
{
    pairs.par_iter().map(|(a, b)| metric(a, b)).collect()
}

/// Feature edit distance bound to a shared, already loaded table.
///
/// Cloning is cheap; every clone reads the same table.
#[derive(Debug, Clone)]
pub struct FeatureDistance {
    table: Arc<FeatureTable>,
}

impl FeatureDistance {
    pub fn new(table: FeatureTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FeatureTable::from_path(path)?))
    }

    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    pub fn distance(&self, ipa_a: &str, ipa_b: &str) -> f64 {
        feature_edit_distance(&self.table, ipa_a, ipa_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tests::small_table;

    #[test]
    fn test_grapheme_distance() {
        assert_eq!(grapheme_edit_distance("pater", "pater"), 0.0);
        assert_eq!(grapheme_edit_distance("pater", "mater"), 1.0);
        assert_eq!(grapheme_edit_distance("", "abc"), 3.0);
    }

    #[test]
    fn test_grapheme_distance_combining_marks() {
        // "é" as e + combining acute is one grapheme
        assert_eq!(grapheme_edit_distance("e\u{301}t", "et"), 1.0);
    }

    #[test]
    fn test_feature_distance_identical() {
        let table = small_table();
        assert_eq!(feature_edit_distance(&table, "pab", "pab"), 0.0);
    }

    #[test]
    fn test_feature_distance_prefers_similar_segments() {
        let table = small_table();
        let close = feature_edit_distance(&table, "pa", "ba");
        let far = feature_edit_distance(&table, "pa", "ma");
        assert!(close < far);
        assert!(close > 0.0);
    }

    #[test]
    fn test_feature_distance_indel() {
        let table = small_table();
        assert_eq!(feature_edit_distance(&table, "pa", "pat"), 1.0);
        assert_eq!(feature_edit_distance(&table, "", "pat"), 3.0);
    }

    #[test]
    fn test_batch_distance_preserves_order() {
        let pairs = vec![
            ("pater".to_string(), "pater".to_string()),
            ("pater".to_string(), "mater".to_string()),
            ("a".to_string(), "bcd".to_string()),
        ];
        let distances = batch_distance(&pairs, grapheme_edit_distance);
        assert_eq!(distances, vec![0.0, 1.0, 3.0]);
    }

    #[test]
    fn test_shared_table_distance() {
        let metric = FeatureDistance::new(small_table());
        let clone = metric.clone();
        assert_eq!(metric.distance("pa", "ba"), clone.distance("pa", "ba"));
        assert_eq!(metric.table().len(), 6);
    }
}
