use std::sync::LazyLock;

use regex::Regex;
use wana_kana::ConvertJapanese;

use super::DictEntry;
use crate::segmentation::{
    Token,
    TokenKind,
};

/// Glosses longer than this are cut down to one clause.
const MAX_GLOSS_CHARS: usize = 10;

static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((.*?)\)").unwrap());
static INNERMOST_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)(]*\)").unwrap());
static INNERMOST_BRACKET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]\[]*]").unwrap());
static CLAUSE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,;\n]").unwrap());
static OPEN_PAREN_TAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*").unwrap());
static PIPE_TAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|.*").unwrap());

/// Picks a short gloss for `token` from the lookup candidates. The first
/// candidate that matches the token decides the result, even if its gloss
/// turns out empty.
pub fn select_gloss(token: &Token, entries: &[DictEntry]) -> Option<String> {
    let target = token.canonical_form();

    for entry in entries {
        match (&token.kind, entry) {
            (TokenKind::Japanese { hiragana, .. }, DictEntry::Japanese { kana, kanji, senses }) => {
                let reading_matches = kana.iter().any(|k| k.to_hiragana() == *hiragana);
                let writing_matches = kanji.iter().any(|k| k == target);
                if !reading_matches && !writing_matches {
                    continue;
                }

                let gloss = senses
                    .first()
                    .and_then(|sense| sense.gloss.first())
                    .map(|gloss| PARENTHESIZED.replace_all(gloss, "").trim().to_string())
                    .unwrap_or_default();
                return Some(gloss).filter(|g| !g.is_empty());
            }
            (
                TokenKind::Mandarin { .. } | TokenKind::Cantonese { .. },
                DictEntry::Chinese { content, simplified, meaning },
            ) => {
                let matches = content.split('，').any(|c| c == target)
                    || simplified.split(", ").any(|s| s == target);
                if matches {
                    return shorten_gloss(&meaning.join("\n"));
                }
            }
            (TokenKind::Vietnamese { .. }, DictEntry::Vietnamese { content, meaning }) => {
                if content == target {
                    return shorten_gloss(meaning);
                }
            }
            _ => {}
        }
    }

    None
}

/// Strips bracketed asides and, when the gloss is long, keeps its shortest
/// clause. Returns `None` when no clause fits.
pub fn shorten_gloss(raw: &str) -> Option<String> {
    let mut cleaned = raw.to_string();
    // nested asides go one level per pass
    for _ in 0..3 {
        cleaned = INNERMOST_PAREN.replace_all(&cleaned, "").into_owned();
    }
    for _ in 0..3 {
        cleaned = INNERMOST_BRACKET.replace_all(&cleaned, "").into_owned();
    }

    let mut clauses: Vec<&str> = CLAUSE_SEPARATOR.split(&cleaned).collect();
    if clauses.first().is_some_and(|first| first.chars().count() > MAX_GLOSS_CHARS) {
        clauses.sort_by_key(|clause| clause.chars().count());
    }

    clauses
        .into_iter()
        .map(|clause| {
            let clause = OPEN_PAREN_TAIL.replace(clause.trim(), "");
            PIPE_TAIL.replace(&clause, "").trim().to_string()
        })
        .find(|clause| !clause.is_empty() && clause.chars().count() <= MAX_GLOSS_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Sense;

    fn jmdict(kana: &str, kanji: &str, gloss: &str) -> DictEntry {
        DictEntry::Japanese {
            kana: vec![kana.into()],
            kanji: if kanji.is_empty() { vec![] } else { vec![kanji.into()] },
            senses: vec![Sense { gloss: vec![gloss.into()] }],
        }
    }

    #[test]
    fn test_japanese_gloss_matches_reading_or_writing() {
        let token = Token::japanese("食べた", "食べる", "たべた");
        let entries = [jmdict("のむ", "飲む", "to drink"), jmdict("たべる", "食べる", "to eat (food)")];
        assert_eq!(select_gloss(&token, &entries).as_deref(), Some("to eat"));

        // katakana reading compared as hiragana
        let token = Token::japanese("ネコ", "ネコ", "ねこ");
        assert_eq!(select_gloss(&token, &[jmdict("ネコ", "", "cat")]).as_deref(), Some("cat"));

        let token = Token::japanese("犬", "犬", "いぬ");
        assert_eq!(select_gloss(&token, &[jmdict("ねこ", "猫", "cat")]), None);
    }

    #[test]
    fn test_chinese_gloss() {
        let entry = DictEntry::Chinese {
            content: "學習".into(),
            simplified: "学习".into(),
            meaning: vec!["to learn (a subject)".into(), "to study".into()],
        };
        let token = Token::mandarin("学习", "xué xí");
        assert_eq!(select_gloss(&token, &[entry]).as_deref(), Some("to learn"));

        let unrelated = DictEntry::Chinese {
            content: "你好".into(),
            simplified: "你好".into(),
            meaning: vec!["hello".into()],
        };
        assert_eq!(select_gloss(&token, &[unrelated]), None);
    }

    #[test]
    fn test_shorten_gloss() {
        assert_eq!(shorten_gloss("cat").as_deref(), Some("cat"));
        assert_eq!(shorten_gloss("to go (somewhere [far])").as_deref(), Some("to go"));
        assert_eq!(
            shorten_gloss("a very long explanation of things; brief").as_deref(),
            Some("brief")
        );
        assert_eq!(shorten_gloss("variant of 學|学[xue2]").as_deref(), None);
        assert_eq!(shorten_gloss("a|b, cd").as_deref(), Some("a"));
        assert_eq!(shorten_gloss(""), None);
    }
}
