use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    utils::is_short_kana,
    Language,
};

/// A piece of a token's surface with its own reading, e.g. the kanji stem of
/// a verb with its furigana, or one syllable of a Vietnamese compound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubToken {
    pub main: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
}

impl SubToken {
    pub fn new(main: impl Into<String>, reading: Option<String>) -> Self {
        Self { main: main.into(), reading }
    }

    pub fn plain(main: impl Into<String>) -> Self {
        Self { main: main.into(), reading: None }
    }
}

/// Language specific annotations carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TokenKind {
    Japanese { basic_form: String, hiragana: String },
    Cantonese { jyutping: String },
    Mandarin { pinyin: String },
    Vietnamese { meaning: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub origin: String,
    #[serde(flatten)]
    pub kind: TokenKind,
    #[serde(default)]
    pub separation: Vec<SubToken>,
}

impl Token {
    pub fn japanese(
        origin: impl Into<String>,
        basic_form: impl Into<String>,
        hiragana: impl Into<String>,
    ) -> Self {
        let origin = origin.into();
        Self {
            separation: vec![SubToken::plain(origin.clone())],
            origin,
            kind: TokenKind::Japanese { basic_form: basic_form.into(), hiragana: hiragana.into() },
        }
    }

    pub fn mandarin(origin: impl Into<String>, pinyin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            separation: vec![SubToken::plain(origin.clone())],
            origin,
            kind: TokenKind::Mandarin { pinyin: pinyin.into() },
        }
    }

    pub fn cantonese(origin: impl Into<String>, jyutping: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            separation: vec![SubToken::plain(origin.clone())],
            origin,
            kind: TokenKind::Cantonese { jyutping: jyutping.into() },
        }
    }

    pub fn vietnamese(origin: impl Into<String>, meaning: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            separation: origin.split(' ').map(SubToken::plain).collect(),
            origin,
            kind: TokenKind::Vietnamese { meaning: meaning.into() },
        }
    }

    pub fn with_separation(mut self, separation: Vec<SubToken>) -> Self {
        self.separation = separation;
        self
    }

    pub fn language(&self) -> Language {
        match self.kind {
            TokenKind::Japanese { .. } => Language::Japanese,
            TokenKind::Cantonese { .. } => Language::Cantonese,
            TokenKind::Mandarin { .. } => Language::Chinese,
            TokenKind::Vietnamese { .. } => Language::Vietnamese,
        }
    }

    /// The form counted in frequency maps and sent to the dictionary: the
    /// dictionary form for Japanese, the surface for everything else.
    pub fn canonical_form(&self) -> &str {
        match &self.kind {
            TokenKind::Japanese { basic_form, .. } if !basic_form.is_empty() && basic_form != "*" => {
                basic_form
            }
            _ => &self.origin,
        }
    }

    pub fn reading(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Japanese { hiragana, .. } => Some(hiragana),
            TokenKind::Cantonese { jyutping } => Some(jyutping),
            TokenKind::Mandarin { pinyin } => Some(pinyin),
            TokenKind::Vietnamese { .. } => None,
        }
    }

    /// Whether a dictionary lookup is worth issuing for this token.
    pub fn needs_lookup(&self) -> bool {
        let target = self.canonical_form();
        if !target.chars().any(char::is_alphanumeric) {
            return false;
        }
        match self.kind {
            TokenKind::Japanese { .. } => !is_short_kana(target),
            _ => true,
        }
    }
}
