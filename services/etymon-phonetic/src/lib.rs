//! Etymon Phonetic: reference phonetic metric for donor-language estimation.
//!
//! Provides:
//! - PanPhon-style articulatory feature tables loaded once from CSV
//! - Feature-weighted edit distance over IPA segments
//! - Grapheme-level edit distance (fallback when no feature table is available)
//! - Orthography-to-IPA transliteration from two-column mapping files

mod distance;
mod error;
mod features;
mod transliterate;

pub use distance::{
    batch_distance, feature_edit_distance, grapheme_edit_distance, FeatureDistance,
};
pub use error::{PhoneticError, Result};
pub use features::{FeatureTable, FeatureValue};
pub use transliterate::Transliterator;
