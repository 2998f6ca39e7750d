use std::{
    collections::HashMap,
    path::Path,
    time::Instant,
};

use async_trait::async_trait;
use tracing::info;

use super::{
    token::Token,
    tokenizer::Tokenizer,
};
use crate::{
    core::KikitoriError,
    dictionary::{
        DictEntry,
        Dictionary,
    },
};

/// Word list backed segmenter and dictionary for Vietnamese.
///
/// Vietnamese writes every syllable as its own space separated word, so
/// segmentation is a matter of grouping syllables into the longest known
/// compounds.
#[derive(Debug, Default, Clone)]
pub struct VietnameseDictionary {
    terms: HashMap<String, String>,
}

impl VietnameseDictionary {
    /// Parses `term : meaning` lines. Lines without the separator are skipped.
    pub fn from_text(text: &str) -> Self {
        let terms = text
            .lines()
            .filter_map(|line| line.trim().split_once(" : "))
            .map(|(term, meaning)| (term.trim(), meaning.trim()))
            .filter(|(term, meaning)| !term.is_empty() && !meaning.is_empty())
            .map(|(term, meaning)| (term.to_string(), meaning.to_string()))
            .collect();
        Self { terms }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, KikitoriError> {
        let start = Instant::now();
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await?;
        let dictionary = Self::from_text(&text);

        info!(
            "Loaded {} Vietnamese terms from {} ({:.1}s)",
            dictionary.len(),
            path.display(),
            start.elapsed().as_secs_f32()
        );
        Ok(dictionary)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn meaning(&self, term: &str) -> Option<&str> {
        self.terms.get(term).map(String::as_str)
    }

    /// Scans from the end of the sentence, taking the longest known compound
    /// that ends at the current syllable. Unknown syllables become single
    /// tokens with an empty meaning.
    pub fn segment(&self, sentence: &str) -> Vec<Token> {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        let mut tokens = Vec::new();

        let mut end = words.len();
        while end > 0 {
            let start = (0..end)
                .find(|&start| self.terms.contains_key(&words[start..end].join(" ")))
                .unwrap_or(end - 1);

            let origin = words[start..end].join(" ");
            let meaning = self.meaning(&origin).unwrap_or_default().to_string();
            tokens.push(Token::vietnamese(origin, meaning));
            end = start;
        }

        tokens.reverse();
        tokens
    }
}

#[async_trait]
impl Tokenizer for VietnameseDictionary {
    async fn tokenize(&self, text: &str) -> Result<Vec<Token>, KikitoriError> {
        Ok(self.segment(text))
    }
}

#[async_trait]
impl Dictionary for VietnameseDictionary {
    async fn lookup(&self, term: &str, limit: usize) -> Result<Vec<DictEntry>, KikitoriError> {
        Ok(self
            .meaning(term)
            .map(|meaning| DictEntry::Vietnamese { content: term.to_string(), meaning: meaning.to_string() })
            .into_iter()
            .take(limit)
            .collect())
    }
}
