use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::Language,
    segmentation::Token,
};

/// Raw text until the line has been tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineContent {
    Raw(String),
    Tokens(Vec<Token>),
}

/// A padded, time-bounded subtitle line. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub time_start: i64,
    pub time_end: i64,
    pub content: LineContent,
    /// One gloss per token, empty when unresolved.
    #[serde(default)]
    pub meaning: Vec<String>,
}

impl Line {
    pub fn new(time_start: i64, time_end: i64, text: impl Into<String>) -> Self {
        Self { time_start, time_end, content: LineContent::Raw(text.into()), meaning: Vec::new() }
    }

    pub fn contains(&self, time_ms: i64) -> bool {
        self.time_start <= time_ms && time_ms <= self.time_end
    }

    pub fn raw_text(&self) -> Option<&str> {
        match &self.content {
            LineContent::Raw(text) => Some(text),
            LineContent::Tokens(_) => None,
        }
    }

    pub fn tokens(&self) -> Option<&[Token]> {
        match &self.content {
            LineContent::Raw(_) => None,
            LineContent::Tokens(tokens) => Some(tokens),
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self.content, LineContent::Tokens(_))
    }

    /// Display text, rebuilt from the token surfaces once tokenized.
    pub fn text(&self) -> String {
        match &self.content {
            LineContent::Raw(text) => text.clone(),
            LineContent::Tokens(tokens) => {
                let spaced = tokens.first().is_some_and(|token| token.language() == Language::Vietnamese);
                let surfaces: Vec<&str> = tokens.iter().map(|token| token.origin.as_str()).collect();
                surfaces.join(if spaced { " " } else { "" })
            }
        }
    }
}
