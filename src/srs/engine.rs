use std::{
    collections::{
        hash_map::Entry,
        HashMap,
    },
    sync::Arc,
    time::Instant,
};

use futures::future::join_all;
use rand::seq::SliceRandom;
use tokio::sync::Mutex;
use tracing::{
    debug,
    error,
    info,
    warn,
};

use super::{
    index::{
        RankedSet,
        SchedulingKey,
    },
    question::{
        sample_distractor_ranks,
        Question,
        QuestionItem,
        QuestionMode,
    },
    record::SrsRecord,
    skill::{
        Grade,
        SkillKind,
    },
};
use crate::{
    config::Settings,
    core::{
        utils::now_secs,
        KikitoriError,
        Language,
    },
    dictionary::Dictionary,
    store::{
        put_as,
        KeyValueStore,
    },
};

pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub const DEFAULT_QUESTION_OPTIONS: usize = 3;

/// In-memory view of one language: every record plus one due-ordered index
/// per skill.
#[derive(Debug, Default)]
struct LanguageDeck {
    records: HashMap<String, SrsRecord>,
    trees: HashMap<SkillKind, RankedSet<SchedulingKey>>,
}

impl LanguageDeck {
    fn index(&mut self, record: &SrsRecord) {
        for kind in SkillKind::ALL {
            if let Some(key) = record.scheduling_key(kind) {
                self.trees.entry(kind).or_default().insert(key);
            }
        }
    }

    fn unindex(&mut self, record: &SrsRecord) {
        for kind in SkillKind::ALL {
            if let (Some(tree), Some(key)) = (self.trees.get_mut(&kind), record.scheduling_key(kind)) {
                tree.remove(&key);
            }
        }
    }

    fn insert(&mut self, record: SrsRecord) {
        if let Some(previous) = self.records.remove(&record.character) {
            self.unindex(&previous);
        }
        self.index(&record);
        self.records.insert(record.character.clone(), record);
    }
}

/// Spaced repetition scheduler.
///
/// Records live in the key-value store under `srs/{lang}/{term}`. A
/// language's records are read into memory on first use and every later
/// change is written through to the store before the in-memory indexes are
/// updated, so a failed write leaves both sides as they were.
pub struct SrsEngine {
    store: Arc<dyn KeyValueStore>,
    dictionaries: HashMap<Language, Arc<dyn Dictionary>>,
    decks: Mutex<HashMap<Language, LanguageDeck>>,
    clock: Clock,
    question_options: usize,
}

impl SrsEngine {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            dictionaries: HashMap::new(),
            decks: Mutex::new(HashMap::new()),
            clock: Arc::new(now_secs),
            question_options: DEFAULT_QUESTION_OPTIONS,
        }
    }

    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.question_options = settings.question_options;
        self
    }

    /// Dictionary used to describe question terms of `lang`.
    pub fn with_dictionary(mut self, lang: Language, dictionary: Arc<dyn Dictionary>) -> Self {
        self.dictionaries.insert(lang, dictionary);
        self
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> i64 + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }

    async fn deck<'a>(
        &self,
        decks: &'a mut HashMap<Language, LanguageDeck>,
        lang: Language,
    ) -> Result<&'a mut LanguageDeck, KikitoriError> {
        match decks.entry(lang) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let deck = self.read_deck(lang).await?;
                Ok(entry.insert(deck))
            }
        }
    }

    async fn read_deck(&self, lang: Language) -> Result<LanguageDeck, KikitoriError> {
        let start = Instant::now();
        let mut deck = LanguageDeck::default();

        for (key, value) in self.store.scan_prefix(&SrsRecord::store_prefix(lang)).await? {
            match serde_json::from_value::<SrsRecord>(value) {
                Ok(record) => deck.insert(record),
                Err(e) => warn!("Skipping unreadable SRS record {}: {}", key, e),
            }
        }

        info!(
            "Loaded {} SRS records for {} ({:.1}s)",
            deck.records.len(),
            lang,
            start.elapsed().as_secs_f32()
        );
        Ok(deck)
    }

    /// Reads the records of `lang` from the store unless already in memory.
    pub async fn ensure_loaded(&self, lang: Language) -> Result<(), KikitoriError> {
        let mut decks = self.decks.lock().await;
        self.deck(&mut decks, lang).await.map(|_| ())
    }

    /// Returns the record of `term`, creating and persisting a fresh one
    /// (every skill level 0, due now) on first touch.
    pub async fn track_term(&self, lang: Language, term: &str) -> Result<SrsRecord, KikitoriError> {
        let mut decks = self.decks.lock().await;
        let deck = self.deck(&mut decks, lang).await?;
        if let Some(record) = deck.records.get(term) {
            return Ok(record.clone());
        }

        let record = SrsRecord::new(term, lang, self.now());
        put_as(self.store.as_ref(), &record.key(), &record).await?;
        deck.insert(record.clone());

        debug!("Tracking {} ({})", term, lang);
        Ok(record)
    }

    /// Grades one skill of a tracked term and reschedules it. Returns false
    /// when the term is not tracked.
    pub async fn update_skill_level(
        &self,
        lang: Language,
        term: &str,
        skill: SkillKind,
        grade: Grade,
    ) -> Result<bool, KikitoriError> {
        let now = self.now();
        let mut decks = self.decks.lock().await;
        let deck = self.deck(&mut decks, lang).await?;

        let Some(current) = deck.records.get(term) else {
            debug!("Ignoring grade for untracked term {} ({})", term, lang);
            return Ok(false);
        };

        let mut updated = current.clone();
        updated.apply_grade(skill, grade, now);
        put_as(self.store.as_ref(), &updated.key(), &updated).await?;

        debug!(
            "Graded {} {} with {}: level {:?}",
            term,
            skill,
            grade.value(),
            updated.skills.get(&skill).map(|s| s.level)
        );
        deck.insert(updated);
        Ok(true)
    }

    /// Builds a quiz for the earliest due term of `skill`, with up to
    /// `option_count` other tracked terms as distractors.
    pub async fn get_question(
        &self,
        lang: Language,
        skill: SkillKind,
        option_count: usize,
    ) -> Result<Option<Question>, KikitoriError> {
        let now = self.now();

        let (due, distractors) = {
            let mut decks = self.decks.lock().await;
            let deck = self.deck(&mut decks, lang).await?;
            let Some(tree) = deck.trees.get(&skill) else {
                return Ok(None);
            };
            let Some(due) = tree.first().cloned() else {
                return Ok(None);
            };

            let ranks = sample_distractor_ranks(tree.len(), option_count, &mut rand::rng());
            let distractors: Vec<String> =
                ranks.into_iter().filter_map(|rank| tree.select(rank)).map(|key| key.term.clone()).collect();
            (due, distractors)
        };

        let mode = if due.due <= now { QuestionMode::Exam } else { QuestionMode::Review };

        let dictionary = self.dictionaries.get(&lang).cloned();
        let limit = lang.lookup_limit();
        let items = join_all(
            std::iter::once(due.term)
                .chain(distractors)
                .map(|term| describe(dictionary.as_deref(), term, limit)),
        )
        .await;

        let mut items = items.into_iter();
        let Some(question) = items.next() else {
            return Ok(None);
        };
        let mut options: Vec<QuestionItem> = items.collect();
        options.shuffle(&mut rand::rng());

        Ok(Some(Question { question, options, mode, skill }))
    }

    pub async fn record(&self, lang: Language, term: &str) -> Result<Option<SrsRecord>, KikitoriError> {
        let mut decks = self.decks.lock().await;
        let deck = self.deck(&mut decks, lang).await?;
        Ok(deck.records.get(term).cloned())
    }

    /// Every tracked record of `lang`, ordered by term.
    pub async fn records(&self, lang: Language) -> Result<Vec<SrsRecord>, KikitoriError> {
        let mut decks = self.decks.lock().await;
        let deck = self.deck(&mut decks, lang).await?;
        let mut records: Vec<SrsRecord> = deck.records.values().cloned().collect();
        records.sort_by(|a, b| a.character.cmp(&b.character));
        Ok(records)
    }

    /// Stops tracking `term` and deletes its stored record.
    pub async fn forget_term(&self, lang: Language, term: &str) -> Result<bool, KikitoriError> {
        let mut decks = self.decks.lock().await;
        let deck = self.deck(&mut decks, lang).await?;
        if !deck.records.contains_key(term) {
            return Ok(false);
        }

        self.store.delete(&SrsRecord::store_key(lang, term)).await?;
        if let Some(record) = deck.records.remove(term) {
            deck.unindex(&record);
        }
        Ok(true)
    }

    /// Number of terms whose `skill` is due now.
    pub async fn due_count(&self, lang: Language, skill: SkillKind) -> Result<usize, KikitoriError> {
        let now = self.now();
        let mut decks = self.decks.lock().await;
        let deck = self.deck(&mut decks, lang).await?;
        // "" sorts before every term, so this counts keys with due <= now
        let cutoff = SchedulingKey::new(now + 1, String::new());
        Ok(deck.trees.get(&skill).map_or(0, |tree| tree.count_below(&cutoff)))
    }

    /// Grades from the review screen. Failures are logged and reported as false.
    pub async fn answer(&self, lang: Language, term: &str, skill: SkillKind, grade: u8) -> bool {
        let result = match Grade::new(grade) {
            Ok(grade) => self.update_skill_level(lang, term, skill, grade).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(updated) => updated,
            Err(e) => {
                error!("Failed to grade {} ({}, {}): {}", term, lang, skill, e);
                false
            }
        }
    }

    /// Next quiz for the review screen, using the configured option count.
    pub async fn next_question(&self, lang: Language, skill: SkillKind) -> Option<Question> {
        match self.get_question(lang, skill, self.question_options).await {
            Ok(question) => question,
            Err(e) => {
                error!("Failed to build {} question for {}: {}", skill, lang, e);
                None
            }
        }
    }
}

async fn describe(dictionary: Option<&dyn Dictionary>, term: String, limit: usize) -> QuestionItem {
    let entries = match dictionary {
        Some(dictionary) => dictionary.lookup(&term, limit).await.unwrap_or_else(|e| {
            warn!("Lookup failed for {}: {}", term, e);
            Vec::new()
        }),
        None => Vec::new(),
    };
    QuestionItem { term, entries }
}
