use std::{
    sync::Arc,
    time::Instant,
};

use tokio::task::JoinSet;
use tracing::{
    debug,
    info,
    warn,
};
use uuid::Uuid;

use super::container::{
    Progress,
    SharedSubtitle,
};
use crate::{
    core::{
        ActiveSubtitle,
        Language,
    },
    dictionary::{
        select_gloss,
        Dictionary,
    },
    segmentation::{
        Token,
        Tokenizer,
    },
};

/// Tokenizes and glosses every line of a subtitle in the background.
///
/// Every line runs as its own task. A task commits only if its subtitle is
/// still the active one when it finishes; work for a replaced subtitle runs
/// to completion and is thrown away.
#[derive(Clone)]
pub struct Enricher {
    tokenizer: Arc<dyn Tokenizer>,
    dictionary: Arc<dyn Dictionary>,
    active: ActiveSubtitle,
}

impl Enricher {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, dictionary: Arc<dyn Dictionary>, active: ActiveSubtitle) -> Self {
        Self { tokenizer, dictionary, active }
    }

    pub fn active(&self) -> &ActiveSubtitle {
        &self.active
    }

    pub async fn enrich(&self, subtitle: &SharedSubtitle) {
        let start = Instant::now();
        let (id, language, texts) = {
            let container = subtitle.read();
            let texts: Vec<Option<String>> =
                container.lines().iter().map(|line| line.raw_text().map(str::to_string)).collect();
            (container.id(), container.language(), texts)
        };

        if language == Language::English {
            debug!("Nothing to enrich for English subtitle {}", id);
            self.finish(subtitle, id);
            return;
        }

        let total = texts.len();
        let mut tasks = JoinSet::new();
        for (index, text) in texts.into_iter().enumerate() {
            if !self.active.is_current(id) {
                debug!("Subtitle {} was replaced, stopping after {} of {} lines", id, index, total);
                break;
            }

            if let Some(text) = text {
                let enricher = self.clone();
                let subtitle = subtitle.clone();
                tasks.spawn(async move { enricher.enrich_line(&subtitle, id, language, index, text).await });
            }
            subtitle.write().set_progress(Progress::Percent((index + 1) as f64 * 100.0 / total as f64));
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                warn!("Line enrichment task failed: {}", e);
            }
        }

        if self.finish(subtitle, id) {
            info!("Enriched {} lines of subtitle {} ({:.1}s)", total, id, start.elapsed().as_secs_f32());
        }
    }

    fn finish(&self, subtitle: &SharedSubtitle, id: Uuid) -> bool {
        let mut container = subtitle.write();
        if !self.active.is_current(id) {
            debug!("Discarding enrichment of replaced subtitle {}", id);
            return false;
        }
        container.set_progress(Progress::Done);
        true
    }

    async fn enrich_line(&self, subtitle: &SharedSubtitle, id: Uuid, language: Language, index: usize, text: String) {
        let tokens = match self.tokenizer.tokenize(&text.replace('\n', " ")).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("Failed to tokenize line {}: {}", index, e);
                return;
            }
        };

        let mut meaning = Vec::with_capacity(tokens.len());
        for token in &tokens {
            if !self.active.is_current(id) {
                return;
            }
            meaning.push(self.gloss(token, language.lookup_limit()).await);
        }

        let mut container = subtitle.write();
        if !self.active.is_current(id) {
            debug!("Dropping line {} of replaced subtitle {}", index, id);
            return;
        }
        container.commit_line(index, tokens, meaning);
    }

    async fn gloss(&self, token: &Token, limit: usize) -> String {
        if !token.needs_lookup() {
            return String::new();
        }

        let term = token.canonical_form();
        match self.dictionary.lookup(term, limit).await {
            Ok(entries) => select_gloss(token, &entries).unwrap_or_default(),
            Err(e) => {
                debug!("Lookup failed for {}: {}", term, e);
                String::new()
            }
        }
    }
}
