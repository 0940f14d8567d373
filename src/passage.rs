use crate::segment::{Locale, Segmenter};
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static PASSAGE_DIR: Dir = include_dir!("src/passages");

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    Nepali,
    English,
}

impl Default for Language {
    fn default() -> Self {
        Language::Nepali
    }
}

impl Language {
    pub fn locale(&self) -> Locale {
        match self {
            Language::Nepali => Locale::Ne,
            Language::English => Locale::En,
        }
    }

    pub fn segmenter(&self) -> Segmenter {
        Segmenter::new(self.locale())
    }

    pub fn toggle(&self) -> Self {
        match self {
            Language::Nepali => Language::English,
            Language::English => Language::Nepali,
        }
    }

    /// Label in the language's own script
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Nepali => "नेपाली",
            Language::English => "English",
        }
    }
}

#[derive(Debug, Error)]
pub enum PassageError {
    #[error("passage is empty")]
    Empty,
    #[error("passage pool {0} not found")]
    UnknownPool(String),
    #[error("passage pool {name} is malformed: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// An immutable reference text, pre-segmented into the units typed against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    text: String,
    language: Language,
    segmenter: Segmenter,
    units: Vec<String>,
}

impl Passage {
    pub fn new(text: impl Into<String>, language: Language) -> Result<Self, PassageError> {
        Self::with_segmenter(text, language, language.segmenter())
    }

    pub fn with_segmenter(
        text: impl Into<String>,
        language: Language,
        segmenter: Segmenter,
    ) -> Result<Self, PassageError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PassageError::Empty);
        }
        let units = segmenter.segment(&text);
        Ok(Self {
            text,
            language,
            segmenter,
            units,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// The segmenter the passage was split with; typed input must use the same one
    pub fn segmenter(&self) -> Segmenter {
        self.segmenter
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Source of passage text for new sessions
pub trait PassageProvider {
    fn random_passage(&self, language: Language) -> String;
}

#[derive(Deserialize, Clone, Debug)]
struct PassagePool {
    name: String,
    passages: Vec<String>,
}

/// The built-in pools, ten passages per language
#[derive(Debug, Clone)]
pub struct EmbeddedPassages {
    nepali: Vec<String>,
    english: Vec<String>,
}

impl EmbeddedPassages {
    pub fn load() -> Result<Self, PassageError> {
        Ok(Self {
            nepali: read_pool(Language::Nepali)?.passages,
            english: read_pool(Language::English)?.passages,
        })
    }

    pub fn pool(&self, language: Language) -> &[String] {
        match language {
            Language::Nepali => &self.nepali,
            Language::English => &self.english,
        }
    }
}

impl PassageProvider for EmbeddedPassages {
    fn random_passage(&self, language: Language) -> String {
        let rng = &mut rand::thread_rng();
        self.pool(language)
            .choose(rng)
            .cloned()
            .unwrap_or_default()
    }
}

fn read_pool(language: Language) -> Result<PassagePool, PassageError> {
    let file_name = format!("{language}.json");
    let contents = PASSAGE_DIR
        .get_file(&file_name)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| PassageError::UnknownPool(file_name.clone()))?;

    let pool: PassagePool =
        serde_json::from_str(contents).map_err(|source| PassageError::Malformed {
            name: file_name.clone(),
            source,
        })?;

    if pool.passages.iter().any(|p| p.trim().is_empty()) || pool.passages.is_empty() {
        return Err(PassageError::Empty);
    }
    log::debug!("loaded {} passages from pool {}", pool.passages.len(), pool.name);
    Ok(pool)
}

/// Serves the same text for every language; used for `--passage` and tests
#[derive(Debug, Clone)]
pub struct FixedPassage(pub String);

impl PassageProvider for FixedPassage {
    fn random_passage(&self, _language: Language) -> String {
        self.0.clone()
    }
}
