use std::{
    fmt,
    str::FromStr,
};

use serde::{
    Deserialize,
    Serialize,
};

use super::KikitoriError;

/// A raw subtitle cue as produced by the format parsers. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub from: i64,
    pub to: i64,
    pub text: String,
}

impl Entry {
    pub fn new(id: impl Into<String>, from: i64, to: i64, text: impl Into<String>) -> Self {
        Self { id: id.into(), from, to, text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "zh-CN", alias = "zh-TW", alias = "zh")]
    Chinese,
    #[serde(rename = "yue", alias = "zh-HK")]
    Cantonese,
    #[serde(rename = "vi")]
    Vietnamese,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Japanese => "ja",
            Language::Chinese => "zh-CN",
            Language::Cantonese => "yue",
            Language::Vietnamese => "vi",
            Language::English => "en",
        }
    }

    pub fn is_cjk(&self) -> bool {
        matches!(self, Language::Japanese | Language::Chinese | Language::Cantonese)
    }

    /// Maximum number of dictionary candidates inspected per token.
    pub fn lookup_limit(&self) -> usize {
        match self {
            Language::Japanese => 2,
            Language::Chinese | Language::Cantonese => 3,
            Language::Vietnamese | Language::English => 1,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = KikitoriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ja" => Ok(Language::Japanese),
            "zh-CN" | "zh-TW" | "zh" => Ok(Language::Chinese),
            "yue" | "zh-HK" => Ok(Language::Cantonese),
            "vi" => Ok(Language::Vietnamese),
            "en" => Ok(Language::English),
            other => Err(KikitoriError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Script used when displaying Chinese subtitles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChineseVariant {
    #[default]
    Simplified,
    Traditional,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        for lang in [
            Language::Japanese,
            Language::Chinese,
            Language::Cantonese,
            Language::Vietnamese,
            Language::English,
        ] {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }

        assert_eq!("zh-HK".parse::<Language>().unwrap(), Language::Cantonese);
        assert!(matches!("xx".parse::<Language>(), Err(KikitoriError::UnknownLanguage(_))));

        assert_eq!(serde_json::to_string(&Language::Chinese).unwrap(), r#""zh-CN""#);
        assert_eq!(serde_json::from_str::<Language>(r#""zh-HK""#).unwrap(), Language::Cantonese);
    }
}
