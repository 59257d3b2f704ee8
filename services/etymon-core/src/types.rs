//! Shared data structures for donor-language estimation.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{EtymonError, Result};

/// Reserved "no data" token in rendering columns
pub const PLACEHOLDER: &str = "-";

/// Candidate donor language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Display name, also the label used for predictions and ground truth
    pub name: String,
    /// Dataset column holding this language's renderings
    pub column: String,
}

impl Language {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
        }
    }

    pub fn with_column(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
        }
    }
}

/// Ordered language enumeration.
///
/// The position of a language is its index into candidate arrays and into
/// the relatedness graph. Built once and shared by selector and scorer.
#[derive(Debug, Clone)]
pub struct LanguageSet {
    languages: Vec<Language>,
    by_name: AHashMap<String, usize>,
}

impl LanguageSet {
    pub fn new(languages: Vec<Language>) -> Result<Self> {
        if languages.is_empty() {
            return Err(EtymonError::NoLanguages);
        }

        let mut by_name = AHashMap::with_capacity(languages.len());
        let mut columns = AHashMap::with_capacity(languages.len());
        for (idx, language) in languages.iter().enumerate() {
            if by_name.insert(language.name.clone(), idx).is_some() {
                return Err(EtymonError::DuplicateLanguage(language.name.clone()));
            }
            if columns.insert(language.column.as_str(), idx).is_some() {
                return Err(EtymonError::DuplicateLanguage(language.column.clone()));
            }
        }

        Ok(Self { languages, by_name })
    }

    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Language::new).collect())
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Language> {
        self.languages.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Language> {
        self.languages.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.languages.iter().map(|l| l.name.as_str()).collect()
    }

    /// Resolve a label to its index; unknown labels are a hard error
    pub fn index_of(&self, label: &str) -> Result<usize> {
        self.by_name
            .get(label.trim())
            .copied()
            .ok_or_else(|| self.invalid_label(label))
    }

    /// Check that an index addresses a known language
    pub fn check_index(&self, index: usize) -> Result<usize> {
        if index < self.languages.len() {
            Ok(index)
        } else {
            Err(self.invalid_label(&format!("#{index}")))
        }
    }

    fn invalid_label(&self, label: &str) -> EtymonError {
        EtymonError::InvalidLabel {
            label: label.to_string(),
            known: self.names().join(", "),
        }
    }
}

/// Why a candidate rendering took no part in the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No cell for this language
    Absent,
    /// Empty or whitespace only
    Blank,
    /// The `-` placeholder
    Placeholder,
    /// Undecodable or control-only text
    Malformed,
    /// The metric returned NaN or a negative value
    InvalidDistance,
}

/// Classify a raw rendering cell, returning the trimmed text when usable
pub fn classify_rendering(raw: Option<&str>) -> std::result::Result<&str, SkipReason> {
    let raw = raw.ok_or(SkipReason::Absent)?;
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        Err(SkipReason::Blank)
    } else if trimmed == PLACEHOLDER {
        Err(SkipReason::Placeholder)
    } else if trimmed.contains(char::REPLACEMENT_CHARACTER) || trimmed.chars().all(char::is_control)
    {
        Err(SkipReason::Malformed)
    } else {
        Ok(trimmed)
    }
}

/// Nearest candidate found for one headword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Index into the language set
    pub language: usize,
    pub rendering: String,
    pub distance: f64,
}
