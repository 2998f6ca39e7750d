use std::{
    path::Path,
    sync::{
        atomic::{
            AtomicI64,
            Ordering,
        },
        Arc,
    },
};

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::info;

use super::{
    container::{
        IngestOptions,
        SharedSubtitle,
        SubtitleContainer,
    },
    enrichment::Enricher,
    line::Line,
};
use crate::{
    config::Settings,
    core::{
        ActiveSubtitle,
        Entry,
        KikitoriError,
        Language,
    },
    dictionary::Dictionary,
    segmentation::Tokenizer,
};

/// The subtitle currently on screen, its playback offset and the
/// background enrichment feeding it.
pub struct SubtitleSession {
    enricher: Enricher,
    options: IngestOptions,
    current: RwLock<Option<SharedSubtitle>>,
    shift_ms: AtomicI64,
    shift_step_ms: i64,
}

impl SubtitleSession {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, dictionary: Arc<dyn Dictionary>, settings: &Settings) -> Self {
        Self {
            enricher: Enricher::new(tokenizer, dictionary, ActiveSubtitle::new()),
            options: settings.ingest_options(),
            current: RwLock::new(None),
            shift_ms: AtomicI64::new(0),
            shift_step_ms: settings.shift_step_ms,
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Makes `container` the current subtitle and starts enriching it.
    /// Any enrichment still running for the previous subtitle stops
    /// committing from this point on. Must be called inside a Tokio runtime.
    pub fn load(&self, container: SubtitleContainer) -> JoinHandle<()> {
        let id = container.id();
        let language = container.language();
        let line_count = container.lines().len();
        let subtitle = container.into_shared();

        self.enricher.active().activate(id);
        *self.current.write() = Some(subtitle.clone());
        self.shift_ms.store(0, Ordering::SeqCst);
        info!("Loaded subtitle {} ({}, {} lines)", id, language, line_count);

        let enricher = self.enricher.clone();
        tokio::spawn(async move { enricher.enrich(&subtitle).await })
    }

    pub fn load_entries(&self, entries: Vec<Entry>, requested: Language) -> JoinHandle<()> {
        self.load(SubtitleContainer::new(entries, requested, &self.options))
    }

    pub fn load_text(&self, text: &str, language: Language) -> JoinHandle<()> {
        self.load(SubtitleContainer::from_text(text, language))
    }

    /// Parses a subtitle file and loads it. A file that fails to parse
    /// leaves the current subtitle in place.
    pub async fn open(&self, path: impl AsRef<Path>, requested: Language) -> Result<JoinHandle<()>, KikitoriError> {
        let container = SubtitleContainer::from_file(path, requested, &self.options).await?;
        Ok(self.load(container))
    }

    pub fn unload(&self) {
        self.enricher.active().clear();
        *self.current.write() = None;
    }

    pub fn current(&self) -> Option<SharedSubtitle> {
        self.current.read().clone()
    }

    pub fn shift_ms(&self) -> i64 {
        self.shift_ms.load(Ordering::SeqCst)
    }

    pub fn set_shift(&self, shift_ms: i64) {
        self.shift_ms.store(shift_ms, Ordering::SeqCst);
    }

    /// Moves the offset by `steps` configured steps, returning the new offset.
    pub fn adjust_shift(&self, steps: i64) -> i64 {
        let delta = steps * self.shift_step_ms;
        self.shift_ms.fetch_add(delta, Ordering::SeqCst) + delta
    }

    /// Snapshot of the line shown at playback time `time_ms`.
    pub fn line_at(&self, time_ms: i64) -> Option<Line> {
        let subtitle = self.current()?;
        let container = subtitle.read();
        container.line_at(self.shift_ms(), time_ms).cloned()
    }
}
