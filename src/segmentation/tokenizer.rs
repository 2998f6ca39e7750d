use std::{
    fs::File,
    io::BufReader,
    path::Path,
    sync::Arc,
    time::Instant,
};

use async_trait::async_trait;
use tracing::info;
use vibrato::Dictionary;
use wana_kana::ConvertJapanese;

use super::token::{
    SubToken,
    Token,
};
use crate::core::{
    utils::{
        has_kanji,
        is_kana_char,
    },
    KikitoriError,
};

/// Splits a line of text into annotated tokens.
#[async_trait]
pub trait Tokenizer: Send + Sync {
    async fn tokenize(&self, text: &str) -> Result<Vec<Token>, KikitoriError>;
}

/// Feature layout of the system dictionary loaded into vibrato.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictType {
    Unidic,
    Ipadic,
}

impl DictType {
    // base form index, surface reading index
    pub fn feature_indices(&self) -> (usize, usize) {
        match self {
            DictType::Unidic => (10, 20),
            DictType::Ipadic => (6, 7),
        }
    }
}

#[derive(Clone)]
pub struct VibratoTokenizer {
    tokenizer: Arc<vibrato::Tokenizer>,
    dict_type: DictType,
}

impl VibratoTokenizer {
    pub fn new(tokenizer: vibrato::Tokenizer, dict_type: DictType) -> Self {
        Self { tokenizer: Arc::new(tokenizer), dict_type }
    }

    /// Loads a compiled system dictionary, either raw (`system.dic`) or zstd
    /// compressed (`system.dic.zst`).
    pub fn from_path(path: &Path, dict_type: DictType) -> Result<Self, KikitoriError> {
        let start = Instant::now();
        let file = File::open(path)?;

        let dict = if path.extension().is_some_and(|ext| ext == "zst") {
            Dictionary::read(zstd::stream::read::Decoder::new(file)?)?
        } else {
            Dictionary::read(BufReader::new(file))?
        };

        info!("Loaded tokenizer dictionary {} ({:.1}s)", path.display(), start.elapsed().as_secs_f32());
        Ok(Self::new(vibrato::Tokenizer::new(dict), dict_type))
    }

    pub fn tokenize_sentence(&self, text: &str) -> Vec<Token> {
        let mut worker = self.tokenizer.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();

        let (base_index, reading_index) = self.dict_type.feature_indices();
        worker
            .token_iter()
            .filter(|token| !token.surface().trim().is_empty())
            .map(|token| {
                let surface = token.surface().to_string();
                let features: Vec<&str> = token.feature().split(',').collect();
                let field = |index: usize| {
                    features.get(index).copied().filter(|f| !f.is_empty() && *f != "*")
                };

                let basic_form = field(base_index).unwrap_or(&surface).to_string();
                let hiragana = field(reading_index)
                    .map(|reading| reading.to_hiragana())
                    .unwrap_or_else(|| surface.to_hiragana());

                let separation = split_furigana(&surface, &hiragana);
                Token::japanese(surface, basic_form, hiragana).with_separation(separation)
            })
            .collect()
    }
}

#[async_trait]
impl Tokenizer for VibratoTokenizer {
    /// Morphological analysis is CPU bound, so it runs on the blocking pool.
    async fn tokenize(&self, text: &str) -> Result<Vec<Token>, KikitoriError> {
        let tokenizer = self.clone();
        let text = text.to_string();

        tokio::task::spawn_blocking(move || tokenizer.tokenize_sentence(&text))
            .await
            .map_err(|e| KikitoriError::Tokenize(format!("tokenizer task failed: {}", e)))
    }
}

/// Attaches the reading to the kanji part of a surface form, leaving leading
/// and trailing kana (okurigana) bare: 食べる/たべる -> [食:た][べる].
pub fn split_furigana(surface: &str, reading: &str) -> Vec<SubToken> {
    if !has_kanji(surface) || reading.is_empty() {
        return vec![SubToken::plain(surface)];
    }

    let surface_chars: Vec<char> = surface.chars().collect();
    let reading_chars: Vec<char> = reading.chars().collect();
    let same_kana = |a: char, b: char| is_kana_char(a) && a.to_string().to_hiragana() == b.to_string();

    let mut prefix = 0;
    while prefix < surface_chars.len()
        && prefix < reading_chars.len()
        && same_kana(surface_chars[prefix], reading_chars[prefix])
    {
        prefix += 1;
    }

    let mut suffix = 0;
    while suffix < surface_chars.len() - prefix
        && suffix < reading_chars.len() - prefix
        && same_kana(
            surface_chars[surface_chars.len() - 1 - suffix],
            reading_chars[reading_chars.len() - 1 - suffix],
        )
    {
        suffix += 1;
    }

    let core_surface: String = surface_chars[prefix..surface_chars.len() - suffix].iter().collect();
    let core_reading: String = reading_chars[prefix..reading_chars.len() - suffix].iter().collect();
    if core_reading.is_empty() {
        return vec![SubToken::plain(surface)];
    }

    let mut separation = Vec::with_capacity(3);
    if prefix > 0 {
        separation.push(SubToken::plain(surface_chars[..prefix].iter().collect::<String>()));
    }
    separation.push(SubToken::new(core_surface, Some(core_reading)));
    if suffix > 0 {
        separation.push(SubToken::plain(
            surface_chars[surface_chars.len() - suffix..].iter().collect::<String>(),
        ));
    }
    separation
}

#[cfg(test)]
mod tests {
    use vibrato::SystemDictionaryBuilder;

    use super::*;

    // IPADIC layout: pos..., conjugation type, conjugation form, base form, reading, pronunciation
    const LEXICON: &str = "食べ,1,1,0,動詞,自立,*,*,一段,連用形,食べる,タベ,タベ\n\
                           た,1,1,0,助動詞,*,*,*,特殊・タ,基本形,た,タ,タ\n\
                           テレビ,1,1,0,名詞,一般,*,*,*,*,*,*,*\n";
    const MATRIX: &str = "2 2\n0 0 0\n0 1 0\n1 0 0\n1 1 0\n";
    const CHAR_DEF: &str = "DEFAULT 0 1 0\n";
    const UNK_DEF: &str = "DEFAULT,1,1,10000,*,*,*,*,*,*,*,*,*\n";

    fn tiny_tokenizer() -> VibratoTokenizer {
        let dict = SystemDictionaryBuilder::from_readers(
            LEXICON.as_bytes(),
            MATRIX.as_bytes(),
            CHAR_DEF.as_bytes(),
            UNK_DEF.as_bytes(),
        )
        .unwrap();
        VibratoTokenizer::new(vibrato::Tokenizer::new(dict), DictType::Ipadic)
    }

    #[test]
    fn test_tokenize_sentence_maps_features() {
        let tokens = tiny_tokenizer().tokenize_sentence("食べたテレビ");
        let origins: Vec<&str> = tokens.iter().map(|t| t.origin.as_str()).collect();
        assert_eq!(origins, vec!["食べ", "た", "テレビ"]);

        assert_eq!(tokens[0].canonical_form(), "食べる");
        assert_eq!(tokens[0].reading(), Some("たべ"));
        assert_eq!(
            tokens[0].separation,
            vec![SubToken::new("食", Some("た".into())), SubToken::plain("べ")]
        );

        assert_eq!(tokens[1].canonical_form(), "た");
        assert_eq!(tokens[1].separation, vec![SubToken::plain("た")]);
    }

    #[test]
    fn test_missing_fields_fall_back_to_surface() {
        let tokens = tiny_tokenizer().tokenize_sentence("テレビ");

        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0],
            Token::japanese("テレビ", "テレビ", "てれび").with_separation(vec![SubToken::plain("テレビ")])
        );
    }

    #[tokio::test]
    async fn test_tokenize_runs_off_the_runtime() {
        let tokens = tiny_tokenizer().tokenize("食べた").await.unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].reading(), Some("たべ"));
    }

    #[test]
    fn test_split_furigana() {
        assert_eq!(
            split_furigana("食べる", "たべる"),
            vec![SubToken::new("食", Some("た".into())), SubToken::plain("べる")]
        );
        assert_eq!(
            split_furigana("お茶", "おちゃ"),
            vec![SubToken::plain("お"), SubToken::new("茶", Some("ちゃ".into()))]
        );
        assert_eq!(split_furigana("学校", "がっこう"), vec![SubToken::new("学校", Some("がっこう".into()))]);
        assert_eq!(split_furigana("ありがとう", "ありがとう"), vec![SubToken::plain("ありがとう")]);
    }

    #[test]
    fn test_dict_type_indices() {
        assert_eq!(DictType::Ipadic.feature_indices(), (6, 7));
        assert_eq!(DictType::Unidic.feature_indices(), (10, 20));
    }
}
