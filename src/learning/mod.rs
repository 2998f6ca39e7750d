use std::{
    collections::HashMap,
    sync::Arc,
};

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;
use tracing::{
    debug,
    warn,
};

use crate::{
    core::{
        utils::now_millis,
        KikitoriError,
        Language,
    },
    store::{
        put_as,
        KeyValueStore,
    },
};

pub const MAX_LEVEL: u8 = 2;

/// Coarse per-term familiarity used for highlighting: 0 unknown,
/// 1 learning, 2 known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningState {
    pub level: u8,
    /// Epoch milliseconds of the last change.
    #[serde(default)]
    pub upd_time: i64,
}

impl LearningState {
    pub fn new(level: i64, upd_time: i64) -> Self {
        Self { level: level.clamp(0, MAX_LEVEL as i64) as u8, upd_time }
    }

    pub fn is_known(&self) -> bool {
        self.level >= MAX_LEVEL
    }
}

/// Shapes a state may have been stored in. Older versions stored the bare
/// level, as a number or a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredState {
    Current(LearningState),
    Level(i64),
    Text(String),
}

impl StoredState {
    /// The decoded state and whether it needs rewriting.
    fn upgrade(self, now: i64) -> Option<(LearningState, bool)> {
        match self {
            StoredState::Current(state) => {
                let clamped = LearningState::new(state.level.into(), state.upd_time);
                Some((clamped, clamped != state))
            }
            StoredState::Level(level) => Some((LearningState::new(level, now), true)),
            StoredState::Text(text) => text.trim().parse().ok().map(|level| (LearningState::new(level, now), true)),
        }
    }
}

/// Learning states stored under `{lang}/{term}`.
pub struct LearningStates {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Fn() -> i64 + Send + Sync>,
}

impl LearningStates {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, clock: Arc::new(now_millis) }
    }

    /// Clock in epoch milliseconds.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> i64 + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn key(lang: Language, term: &str) -> String {
        format!("{}/{}", lang.code(), term)
    }

    async fn decode(&self, key: &str, value: Value) -> Result<Option<LearningState>, KikitoriError> {
        let upgraded = serde_json::from_value::<StoredState>(value)
            .ok()
            .and_then(|stored| stored.upgrade((self.clock)()));

        match upgraded {
            Some((state, true)) => {
                debug!("Migrating learning state {}", key);
                put_as(self.store.as_ref(), key, &state).await?;
                Ok(Some(state))
            }
            Some((state, false)) => Ok(Some(state)),
            None => {
                warn!("Skipping unreadable learning state {}", key);
                Ok(None)
            }
        }
    }

    /// Every state of `lang`, keyed by term. Legacy values are rewritten in
    /// the current shape as they are read.
    pub async fn load(&self, lang: Language) -> Result<HashMap<String, LearningState>, KikitoriError> {
        let prefix = format!("{}/", lang.code());
        let mut states = HashMap::new();

        for (key, value) in self.store.scan_prefix(&prefix).await? {
            if let Some(state) = self.decode(&key, value).await? {
                states.insert(key[prefix.len()..].to_string(), state);
            }
        }
        Ok(states)
    }

    pub async fn get(&self, lang: Language, term: &str) -> Result<Option<LearningState>, KikitoriError> {
        let key = Self::key(lang, term);
        match self.store.get(&key).await? {
            Some(value) => self.decode(&key, value).await,
            None => Ok(None),
        }
    }

    /// Stores `level` (clamped to 0..=2) stamped with the current time.
    pub async fn set_level(&self, lang: Language, term: &str, level: i64) -> Result<LearningState, KikitoriError> {
        let state = LearningState::new(level, (self.clock)());
        put_as(self.store.as_ref(), &Self::key(lang, term), &state).await?;
        Ok(state)
    }

    /// States ordered by last change, newest first.
    pub async fn recent(&self, lang: Language) -> Result<Vec<(String, LearningState)>, KikitoriError> {
        let mut states: Vec<(String, LearningState)> = self.load(lang).await?.into_iter().collect();
        states.sort_by(|a, b| b.1.upd_time.cmp(&a.1.upd_time).then_with(|| a.0.cmp(&b.0)));
        Ok(states)
    }
}
