//! Orthography-to-IPA transliteration from two-column mapping files.
//!
//! Mapping files carry an `Orth` column and a `Phon` (or `IPA`) column, as
//! produced from scraped pronunciation tables. Pronunciations are cleaned on
//! load: slashes and quotes are stripped and variants separated by `~` or `,`
//! are split, keeping the first variant for each orthography.

use ahash::AHashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{PhoneticError, Result};

#[derive(Debug, Clone, Default)]
pub struct Transliterator {
    rules: AHashMap<String, String>,
    max_orth_len: usize,
}

impl Transliterator {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let translit = Self::from_reader(File::open(path)?)?;
        debug!(path = %path.display(), rules = translit.len(), "loaded transliteration rules");
        Ok(translit)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let position = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim_start_matches('\u{feff}');
                names.iter().any(|n| h.eq_ignore_ascii_case(n))
            })
        };
        let idx_orth = position(&["orth"]).ok_or(PhoneticError::MissingColumn("Orth"))?;
        let idx_phon = position(&["phon", "ipa"]).ok_or(PhoneticError::MissingColumn("Phon"))?;

        let mut translit = Self::default();
        for result in rdr.records() {
            let record = result?;
            let orth = record.get(idx_orth).unwrap_or("").to_lowercase();
            let phon = record.get(idx_phon).unwrap_or("");
            if let Some(variant) = first_variant(phon) {
                translit.insert(orth, variant);
            }
        }

        Ok(translit)
    }

    /// Add a rule unless the orthography is already mapped
    pub fn insert(&mut self, orth: impl Into<String>, ipa: impl Into<String>) {
        let orth = orth.into();
        if orth.is_empty() || self.rules.contains_key(&orth) {
            return;
        }
        self.max_orth_len = self.max_orth_len.max(orth.chars().count());
        self.rules.insert(orth, ipa.into());
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite a word by greedy longest match; unmapped characters pass through
    pub fn transliterate(&self, word: &str) -> String {
        let chars: Vec<char> = word.to_lowercase().chars().collect();
        let mut out = String::with_capacity(word.len());
        let mut start = 0;

        while start < chars.len() {
            let window = self.max_orth_len.min(chars.len() - start);
            let hit = (1..=window).rev().find_map(|len| {
                let candidate: String = chars[start..start + len].iter().collect();
                self.rules.get(&candidate).map(|ipa| (ipa, len))
            });

            match hit {
                Some((ipa, len)) => {
                    out.push_str(ipa);
                    start += len;
                }
                None => {
                    out.push(chars[start]);
                    start += 1;
                }
            }
        }

        out
    }
}

fn first_variant(raw: &str) -> Option<String> {
    let cleaned = raw.replace(['/', '"'], "");
    cleaned
        .split(['~', ','])
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELSH: &str = "\
Orth,Phon
ll,/ɬ/
dd,/ð/
d,/d/
w,\"/u/ ~ /w/\"
y,/ə/
";

    #[test]
    fn test_longest_match_wins() {
        let translit = Transliterator::from_reader(WELSH.as_bytes()).unwrap();
        assert_eq!(translit.transliterate("dd"), "ð");
        assert_eq!(translit.transliterate("d"), "d");
    }

    #[test]
    fn test_variants_keep_first() {
        let translit = Transliterator::from_reader(WELSH.as_bytes()).unwrap();
        assert_eq!(translit.transliterate("w"), "u");
    }

    #[test]
    fn test_unmapped_pass_through() {
        let translit = Transliterator::from_reader(WELSH.as_bytes()).unwrap();
        assert_eq!(translit.transliterate("Llyn"), "ɬən");
    }

    #[test]
    fn test_duplicate_orth_keeps_first() {
        let csv = "Orth,IPA\na,a\na,ɑ\n";
        let translit = Transliterator::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(translit.len(), 1);
        assert_eq!(translit.transliterate("a"), "a");
    }

    #[test]
    fn test_missing_column() {
        let err = Transliterator::from_reader("Word,Sound\na,a\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PhoneticError::MissingColumn("Orth")));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cym-Latn.csv");
        std::fs::write(&path, WELSH).unwrap();
        let translit = Transliterator::from_path(&path).unwrap();
        assert_eq!(translit.len(), 5);
    }
}
