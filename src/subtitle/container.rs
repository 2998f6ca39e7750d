use std::{
    collections::HashMap,
    fmt,
    path::{
        Path,
        PathBuf,
    },
    sync::Arc,
    time::Instant,
};

use parking_lot::RwLock;
use tracing::{
    debug,
    info,
};
use uuid::Uuid;

use super::line::{
    Line,
    LineContent,
};
use crate::{
    config::TimingSettings,
    core::{
        utils::SubtitleText,
        ChineseVariant,
        Entry,
        KikitoriError,
        Language,
    },
    parser::{
        self,
        PLAIN_TEXT_END_MS,
    },
    segmentation::Token,
};

/// How many leading entries are inspected when guessing the language.
const LANGUAGE_SAMPLE: usize = 20;
const MIN_CJK_ENTRIES: usize = 3;

pub type SharedSubtitle = Arc<RwLock<SubtitleContainer>>;

/// Converts Chinese text between scripts (e.g. an OpenCC binding).
pub trait ScriptConverter: Send + Sync {
    fn convert(&self, text: &str, target: ChineseVariant) -> String;
}

#[derive(Clone, Default)]
pub struct IngestOptions {
    pub timing: TimingSettings,
    pub remove_hearing_impaired: bool,
    pub chinese_variant: ChineseVariant,
    pub converter: Option<Arc<dyn ScriptConverter>>,
}

impl IngestOptions {
    pub fn with_converter(mut self, converter: Arc<dyn ScriptConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    fn clean(&self, text: &str, requested: Language) -> String {
        let mut text = text.strip_override_tags();
        if requested == Language::Chinese {
            if let Some(converter) = &self.converter {
                text = converter.convert(&text, self.chinese_variant);
            }
        }
        if self.remove_hearing_impaired {
            text = text.strip_hearing_impaired();
        }
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Progress {
    #[default]
    Pending,
    Percent(f64),
    Done,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Pending => Ok(()),
            Progress::Percent(percent) => write!(f, "{:.2}%", percent),
            Progress::Done => f.write_str("done"),
        }
    }
}

/// The lines of one loaded subtitle file, ordered and non-overlapping.
#[derive(Debug, Clone)]
pub struct SubtitleContainer {
    id: Uuid,
    language: Language,
    path: Option<PathBuf>,
    variant: ChineseVariant,
    lines: Vec<Line>,
    progress: Progress,
    frequency: HashMap<String, u32>,
}

impl SubtitleContainer {
    fn empty(language: Language, variant: ChineseVariant) -> Self {
        Self {
            id: Uuid::new_v4(),
            language,
            path: None,
            variant,
            lines: Vec::new(),
            progress: Progress::default(),
            frequency: HashMap::new(),
        }
    }

    /// Builds the timeline from parsed entries.
    ///
    /// Each cue is padded by the lead-in and tail of `options.timing` and
    /// clamped so it starts no earlier than one frame after the previous
    /// padded end. Cues squeezed out entirely by the clamping are dropped.
    pub fn new(entries: Vec<Entry>, requested: Language, options: &IngestOptions) -> Self {
        let mut entries: Vec<Entry> = entries.into_iter().filter(|entry| !entry.text.is_empty()).collect();
        let language = detect_language(&entries, requested);
        entries.sort_by_key(|entry| entry.from);

        let mut container = Self::empty(language, options.chinese_variant);
        let timing = &options.timing;
        let mut last_end = 0;

        for entry in entries {
            let real_from = (entry.from - timing.lead_in_ms()).max(last_end);
            let real_to = entry.to + timing.tail_ms();
            if real_from > real_to {
                debug!("Dropping cue {} at {}ms, overlapped by earlier lines", entry.id, entry.from);
                continue;
            }

            container.lines.push(Line::new(entry.from.max(last_end), real_to, options.clean(&entry.text, requested)));
            last_end = last_end.max(real_to + timing.frame_rate_ms + 1);
        }

        container
    }

    /// A single line shown for the whole video.
    pub fn from_text(text: &str, language: Language) -> Self {
        let mut container = Self::empty(language, ChineseVariant::default());
        if !text.is_empty() {
            container.lines.push(Line::new(0, PLAIN_TEXT_END_MS, text));
        }
        container
    }

    pub async fn from_file(
        path: impl AsRef<Path>,
        requested: Language,
        options: &IngestOptions,
    ) -> Result<Self, KikitoriError> {
        let start = Instant::now();
        let path = path.as_ref();
        let entries = parser::read_file(path).await?;

        let mut container = Self::new(entries, requested, options);
        container.path = Some(path.to_path_buf());

        info!(
            "Loaded {} lines ({}) from {} ({:.1}s)",
            container.lines.len(),
            container.language,
            path.display(),
            start.elapsed().as_secs_f32()
        );
        Ok(container)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn variant(&self) -> ChineseVariant {
        self.variant
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn frequency(&self) -> &HashMap<String, u32> {
        &self.frequency
    }

    /// Index of the line shown at `time_ms` with the subtitle delayed by `shift_ms`.
    pub fn line_index_at(&self, shift_ms: i64, time_ms: i64) -> Option<usize> {
        let query = time_ms - shift_ms;
        // number of lines starting at or before the query
        let candidate = self.lines.partition_point(|line| line.time_start <= query).checked_sub(1)?;
        self.lines[candidate].contains(query).then_some(candidate)
    }

    pub fn line_at(&self, shift_ms: i64, time_ms: i64) -> Option<&Line> {
        self.line_index_at(shift_ms, time_ms).map(|index| &self.lines[index])
    }

    /// The `n` most frequent terms, ties broken alphabetically.
    pub fn top_terms(&self, n: usize) -> Vec<(String, u32)> {
        let mut terms: Vec<(String, u32)> =
            self.frequency.iter().map(|(term, count)| (term.clone(), *count)).collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(n);
        terms
    }

    pub(crate) fn set_progress(&mut self, progress: Progress) {
        self.progress = progress;
    }

    /// Replaces the raw text of line `index` with its tokens and glosses and
    /// counts the tokens.
    pub(crate) fn commit_line(&mut self, index: usize, tokens: Vec<Token>, meaning: Vec<String>) {
        let Some(line) = self.lines.get_mut(index) else {
            return;
        };
        for token in &tokens {
            *self.frequency.entry(token.canonical_form().to_string()).or_insert(0) += 1;
        }
        line.content = LineContent::Tokens(tokens);
        line.meaning = meaning;
    }

    pub fn into_shared(self) -> SharedSubtitle {
        Arc::new(RwLock::new(self))
    }
}

/// Non CJK requests are trusted as is. For CJK requests the container falls
/// back to English unless enough of the first entries contain CJK text.
pub fn detect_language(entries: &[Entry], requested: Language) -> Language {
    if !requested.is_cjk() {
        return requested;
    }
    let cjk_entries = entries.iter().take(LANGUAGE_SAMPLE).filter(|entry| entry.text.contains_cjk()).count();
    if cjk_entries >= MIN_CJK_ENTRIES {
        requested
    } else {
        Language::English
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn entry(from: i64, to: i64, text: &str) -> Entry {
        Entry::new(from.to_string(), from, to, text)
    }

    fn japanese_entries(times: &[(i64, i64)]) -> Vec<Entry> {
        times.iter().map(|&(from, to)| entry(from, to, "日本語")).collect()
    }

    #[test]
    fn test_ingestion_pads_and_clamps() {
        let entries = japanese_entries(&[(1000, 2000), (2100, 3000), (2150, 2200), (10_000, 11_000)]);
        let container = SubtitleContainer::new(entries, Language::Japanese, &IngestOptions::default());
        let bounds: Vec<(i64, i64)> = container.lines().iter().map(|l| (l.time_start, l.time_end)).collect();

        // second cue starts after the first tail plus one frame, the third is swallowed
        assert_eq!(bounds, vec![(1000, 2240), (2271, 3240), (10_000, 11_240)]);
        assert_eq!(container.language(), Language::Japanese);
        assert_eq!(container.progress(), Progress::Pending);
    }

    #[test]
    fn test_lines_never_overlap() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let entries: Vec<Entry> = (0..200)
                .map(|_| {
                    let from = rng.random_range(0..60_000);
                    entry(from, from + rng.random_range(0..3_000), "字幕")
                })
                .collect();
            let container = SubtitleContainer::new(entries, Language::Chinese, &IngestOptions::default());

            for pair in container.lines().windows(2) {
                assert!(pair[0].time_start <= pair[0].time_end);
                assert!(pair[1].time_start >= pair[0].time_end);
            }
        }
    }

    #[test]
    fn test_lookup_matches_linear_scan() {
        let mut rng = rand::rng();
        for _ in 0..30 {
            let mut from = 0;
            let entries: Vec<Entry> = (0..100)
                .map(|_| {
                    from += rng.random_range(0..2_000);
                    entry(from, from + rng.random_range(0..1_500), "台詞")
                })
                .collect();
            let container = SubtitleContainer::new(entries, Language::Japanese, &IngestOptions::default());
            let shift = rng.random_range(-500..500);

            for _ in 0..500 {
                let time = rng.random_range(-1_000..250_000);
                let expected = container.lines().iter().position(|line| line.contains(time - shift));
                assert_eq!(container.line_index_at(shift, time), expected);
            }
        }
    }

    #[test]
    fn test_lookup_gap_and_shift() {
        let entries = japanese_entries(&[(1000, 2000), (5000, 6000), (9000, 9500)]);
        let container = SubtitleContainer::new(entries, Language::Japanese, &IngestOptions::default());

        assert_eq!(container.line_index_at(0, 1500), Some(0));
        assert_eq!(container.line_index_at(0, 4000), None);
        assert_eq!(container.line_index_at(0, 500), None);
        assert_eq!(container.line_index_at(1000, 6500), Some(1));
        assert_eq!(container.line_index_at(-4000, 1500), Some(1));
        assert!(SubtitleContainer::from_text("", Language::Japanese).line_at(0, 0).is_none());
    }

    #[test]
    fn test_language_detection() {
        let mostly_english = vec![
            entry(0, 1, "hello"),
            entry(2, 3, "日本"),
            entry(4, 5, "world"),
            entry(6, 7, "中文"),
        ];
        assert_eq!(detect_language(&mostly_english, Language::Japanese), Language::English);

        let cjk = japanese_entries(&[(0, 1), (2, 3), (4, 5)]);
        assert_eq!(detect_language(&cjk, Language::Cantonese), Language::Cantonese);
        assert_eq!(detect_language(&mostly_english, Language::Vietnamese), Language::Vietnamese);
    }

    struct Upper;

    impl ScriptConverter for Upper {
        fn convert(&self, text: &str, target: ChineseVariant) -> String {
            match target {
                ChineseVariant::Simplified => text.to_lowercase(),
                ChineseVariant::Traditional => text.to_uppercase(),
            }
        }
    }

    #[test]
    fn test_text_cleanup() {
        let entries = vec![
            entry(0, 100, "{\\an8}[音楽]中文 abc"),
            entry(1000, 1100, "中文"),
            entry(2000, 2100, "中文"),
            entry(3000, 3100, ""),
        ];
        let options = IngestOptions {
            remove_hearing_impaired: true,
            chinese_variant: ChineseVariant::Traditional,
            ..IngestOptions::default()
        }
        .with_converter(Arc::new(Upper));

        let container = SubtitleContainer::new(entries.clone(), Language::Chinese, &options);
        assert_eq!(container.lines().len(), 3);
        assert_eq!(container.lines()[0].raw_text(), Some("中文 ABC"));
        assert_eq!(container.variant(), ChineseVariant::Traditional);

        let japanese = SubtitleContainer::new(entries, Language::Japanese, &IngestOptions::default());
        assert_eq!(japanese.lines()[0].raw_text(), Some("[音楽]中文 abc"));
    }

    #[test]
    fn test_top_terms_and_progress() {
        let mut container = SubtitleContainer::from_text("我 爱 我", Language::Chinese);
        container.commit_line(
            0,
            vec![Token::mandarin("我", "wǒ"), Token::mandarin("爱", "ài"), Token::mandarin("我", "wǒ")],
            vec![String::new(), "love".into(), String::new()],
        );
        container.commit_line(7, Vec::new(), Vec::new());

        assert_eq!(container.top_terms(5), vec![("我".to_string(), 2), ("爱".to_string(), 1)]);
        assert_eq!(container.lines()[0].text(), "我爱我");
        assert!(container.lines()[0].is_enriched());

        assert_eq!(Progress::Percent(12.5).to_string(), "12.50%");
        assert_eq!(Progress::Done.to_string(), "done");
    }
}
