pub mod gloss;

use async_trait::async_trait;
use serde::{
    Deserialize,
    Serialize,
};

pub use gloss::{
    select_gloss,
    shorten_gloss,
};

use crate::core::KikitoriError;

/// Looks up candidate entries for a term. Implementations may hit a local
/// index, a database or a remote service.
#[async_trait]
pub trait Dictionary: Send + Sync {
    async fn lookup(&self, term: &str, limit: usize) -> Result<Vec<DictEntry>, KikitoriError>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Sense {
    pub gloss: Vec<String>,
}

/// A dictionary hit. The shape follows the source the language is usually
/// served from: JMdict style for Japanese, CC-CEDICT style for Chinese and a
/// flat term/meaning pair for Vietnamese.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DictEntry {
    Japanese {
        #[serde(default)]
        kana: Vec<String>,
        #[serde(default)]
        kanji: Vec<String>,
        #[serde(default)]
        senses: Vec<Sense>,
    },
    Chinese {
        content: String,
        #[serde(default)]
        simplified: String,
        #[serde(default)]
        meaning: Vec<String>,
    },
    Vietnamese {
        content: String,
        meaning: String,
    },
}

impl DictEntry {
    pub fn headword(&self) -> &str {
        match self {
            DictEntry::Japanese { kana, kanji, .. } => {
                kanji.first().or(kana.first()).map(String::as_str).unwrap_or_default()
            }
            DictEntry::Chinese { content, .. } | DictEntry::Vietnamese { content, .. } => content,
        }
    }
}

/// Used for languages without a configured dictionary.
pub struct NoDictionary;

#[async_trait]
impl Dictionary for NoDictionary {
    async fn lookup(&self, _term: &str, _limit: usize) -> Result<Vec<DictEntry>, KikitoriError> {
        Ok(Vec::new())
    }
}
