//! Test doubles for the tokenizer, dictionary and store collaborators.

use std::{
    collections::{
        HashMap,
        HashSet,
    },
    sync::{
        atomic::{
            AtomicBool,
            AtomicUsize,
            Ordering,
        },
        Arc,
    },
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::{
    core::KikitoriError,
    dictionary::{
        DictEntry,
        Dictionary,
    },
    segmentation::{
        Token,
        Tokenizer,
    },
    store::{
        KeyValueStore,
        MemoryStore,
    },
};

/// Splits on whitespace, producing Mandarin tokens without readings.
/// Optionally waits on a gate before answering.
#[derive(Default)]
pub struct FakeTokenizer {
    gate: Option<Arc<Semaphore>>,
    failing: HashSet<String>,
    pub calls: AtomicUsize,
}

impl FakeTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks every call until the returned semaphore receives permits.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (Self { gate: Some(gate.clone()), ..Self::default() }, gate)
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }
}

#[async_trait]
impl Tokenizer for FakeTokenizer {
    async fn tokenize(&self, text: &str) -> Result<Vec<Token>, KikitoriError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.map_err(|e| KikitoriError::Tokenize(e.to_string()))?;
        }
        if self.failing.contains(text) {
            return Err(KikitoriError::Tokenize(format!("cannot tokenize {}", text)));
        }
        Ok(text.split_whitespace().map(|word| Token::mandarin(word, "")).collect())
    }
}

#[derive(Default)]
pub struct FakeDictionary {
    entries: HashMap<String, Vec<DictEntry>>,
    failing: HashSet<String>,
}

impl FakeDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, term: &str, entry: DictEntry) -> Self {
        self.entries.entry(term.to_string()).or_default().push(entry);
        self
    }

    /// Chinese entry whose headword is `term` itself.
    pub fn with_gloss(self, term: &str, gloss: &str) -> Self {
        let entry = DictEntry::Chinese {
            content: term.to_string(),
            simplified: term.to_string(),
            meaning: vec![gloss.to_string()],
        };
        self.with_entry(term, entry)
    }

    pub fn failing_on(mut self, term: &str) -> Self {
        self.failing.insert(term.to_string());
        self
    }
}

#[async_trait]
impl Dictionary for FakeDictionary {
    async fn lookup(&self, term: &str, limit: usize) -> Result<Vec<DictEntry>, KikitoriError> {
        if self.failing.contains(term) {
            return Err(KikitoriError::Lookup(format!("lookup of {} failed", term)));
        }
        Ok(self.entries.get(term).map(|entries| entries.iter().take(limit).cloned().collect()).unwrap_or_default())
    }
}

/// Memory store whose reads or writes can be switched off.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), KikitoriError> {
        if flag.load(Ordering::SeqCst) {
            return Err(KikitoriError::Store("store unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, KikitoriError> {
        self.check(&self.fail_reads)?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), KikitoriError> {
        self.check(&self.fail_writes)?;
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), KikitoriError> {
        self.check(&self.fail_writes)?;
        self.inner.delete(key).await
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Value)>, KikitoriError> {
        self.check(&self.fail_reads)?;
        self.inner.scan_prefix(prefix).await
    }
}
