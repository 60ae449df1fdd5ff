//! In-process secret store.
//!
//! Behaves like AWS Secrets Manager (put requires an existing record,
//! create refuses to overwrite one) and can inject failures, which makes it
//! the store of choice for tests and dry runs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::trace;

use super::SecretStore;
use crate::error::StoreError;

/// In-memory secret store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, String>>,
    failing_reads: AtomicU32,
    failing_writes: AtomicU32,
    reads: AtomicU32,
    writes: AtomicU32,
    creates: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record.
    pub fn with_record(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        self
    }

    /// Fail the next `n` reads with a backend error.
    pub fn fail_reads(&self, n: u32) {
        self.failing_reads.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` writes (puts and creates) with a backend error.
    pub fn fail_writes(&self, n: u32) {
        self.failing_writes.store(n, Ordering::SeqCst);
    }

    /// Current record under `key`.
    pub fn record(&self, key: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of `get_value` calls.
    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `put_value` calls.
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of `create_value` calls.
    pub fn creates(&self) -> u32 {
        self.creates.load(Ordering::SeqCst)
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_value(&self, key: &str) -> Result<String, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.failing_reads) {
            return Err(StoreError::Backend("injected read failure".to_string()));
        }

        trace!(key, "memory read");
        self.record(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn put_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.failing_writes) {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }

        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        match records.get_mut(key) {
            Some(record) => {
                *record = value.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    async fn create_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.failing_writes) {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }

        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(key) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
