use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use wana_kana::IsJapaneseStr;

static OVERRIDE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\\.+?\}").unwrap());

static HEARING_IMPAIRED_BRACKETS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"\[.*?\]", r"\(.*?\)", r"（.*?）", r"「.*?」", r"『.*?』", r"【.*?】"]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
});

static SPEAKER_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".*?:").unwrap());

static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s\s+").unwrap());

pub trait SubtitleText {
    /// Removes ASS style override blocks such as `{\an8}` or `{\i1}`.
    fn strip_override_tags(&self) -> String;

    /// Removes sound cues, speaker labels and bracketed asides, line by line.
    fn strip_hearing_impaired(&self) -> String;

    fn contains_cjk(&self) -> bool;
}

impl SubtitleText for str {
    fn strip_override_tags(&self) -> String {
        OVERRIDE_TAG.replace_all(self, "").into_owned()
    }

    fn strip_hearing_impaired(&self) -> String {
        self.split('\n')
            .map(|line| {
                let mut cleaned = line.to_string();
                for bracket in HEARING_IMPAIRED_BRACKETS.iter() {
                    cleaned = bracket.replace_all(&cleaned, "").into_owned();
                }
                cleaned = SPEAKER_PREFIX.replace_all(&cleaned, "").into_owned();
                MULTI_SPACE.replace_all(&cleaned, " ").trim().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn contains_cjk(&self) -> bool {
        self.chars().any(is_cjk_char)
    }
}

impl SubtitleText for String {
    fn strip_override_tags(&self) -> String {
        self.as_str().strip_override_tags()
    }

    fn strip_hearing_impaired(&self) -> String {
        self.as_str().strip_hearing_impaired()
    }

    fn contains_cjk(&self) -> bool {
        self.as_str().contains_cjk()
    }
}

// CJK ideographs, kana, hangul syllables and CJK punctuation
fn is_cjk_char(c: char) -> bool {
    matches!(c,
        '\u{4e00}'..='\u{9fff}'
        | '\u{3040}'..='\u{309f}'
        | '\u{30a0}'..='\u{30ff}'
        | '\u{ac00}'..='\u{d7af}'
        | '\u{3000}'..='\u{303f}')
}

/// Particles and short kana words produce noisy dictionary hits.
pub fn is_short_kana(text: &str) -> bool {
    !text.is_empty() && text.is_kana() && text.chars().count() <= 3
}

pub fn has_kanji(text: &str) -> bool {
    text.chars().any(|c| matches!(c, '\u{3400}'..='\u{4dbf}' | '\u{4e00}'..='\u{9fff}' | '々'))
}

pub fn is_kana_char(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{309f}' | '\u{30a1}'..='\u{30fa}' | 'ー')
}

pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
