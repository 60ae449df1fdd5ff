//! Idempotent secret state.
//!
//! A [`SecretState`] owns one flat `{name: value}` record persisted as JSON
//! under a single store key. Initialization reconciles freshly generated
//! defaults with whatever is already persisted:
//!
//! ```text
//! candidate ──load──► persisted values win ──┐
//!     │                                      ├──save──► ready
//!     └──(read retries exhausted)──create────┘
//! ```
//!
//! Once a value has been persisted it is never regenerated or overwritten.

pub mod definition;
pub mod reference;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::core::retry::{retry, RetryExhausted, RetryPolicy};
use crate::core::store::SecretStore;
use crate::core::types::{Record, StateKey, StoreKey};
use crate::error::{Result, StateError, StoreError};

pub use definition::{default_definitions, parse_definitions, validate_key, Definition, StateValue};
pub use reference::SecretRef;

/// How the persisted record came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// An earlier run had already persisted it.
    Loaded,
    /// This run created it.
    Created,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded => f.write_str("loaded"),
            Self::Created => f.write_str("created"),
        }
    }
}

/// Collects definitions before initialization.
#[derive(Debug)]
pub struct SecretStateBuilder {
    key: StoreKey,
    store: Arc<dyn SecretStore>,
    values: BTreeMap<StateKey, StateValue>,
    read_policy: RetryPolicy,
    write_policy: RetryPolicy,
}

impl SecretStateBuilder {
    /// Define the default for `name`. A later definition replaces an earlier one.
    pub fn value(mut self, name: impl Into<StateKey>, value: impl Into<StateValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<StateKey>,
        V: Into<StateValue>,
    {
        self.values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn read_policy(mut self, policy: RetryPolicy) -> Self {
        self.read_policy = policy;
        self
    }

    pub fn write_policy(mut self, policy: RetryPolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// Load or create the persisted record, then save it.
    ///
    /// # Errors
    ///
    /// - `StateError::WriteExhausted` if the record cannot be saved
    /// - `StateError::Corrupt` if the persisted record is not a flat string map
    /// - `StateError::Conflict` if creation finds an existing record that
    ///   cannot be read back
    pub async fn initialize(self) -> Result<SecretState> {
        let Self {
            key,
            store,
            values,
            read_policy,
            write_policy,
        } = self;
        let store = &*store;

        // Generators run here, once, even if every value is later replaced
        // by its persisted counterpart.
        let mut data: Record = values
            .iter()
            .map(|(name, value)| (name.clone(), value.evaluate()))
            .collect();
        debug!(key = %key, fields = data.len(), backend = store.name(), "built candidate state");

        let provenance = match read_record(store, &key, read_policy).await {
            Ok(raw) => {
                reconcile(&key, &mut data, &raw)?;
                Provenance::Loaded
            }
            Err(exhausted) => {
                info!(key = %key, error = %exhausted.source, "no readable state, creating it");
                create_record(store, &key, &mut data, read_policy, write_policy).await?
            }
        };

        let json = serialize(&data)?;
        let body = json.as_str();
        let key_ref = key.as_str();
        retry(
            write_policy,
            "save secret state",
            move || store.put_value(key_ref, body),
            StoreError::is_retryable,
        )
        .await
        .map_err(|e| StateError::WriteExhausted {
            key: key.clone(),
            attempts: e.attempts,
            source: e.source,
        })?;

        let state = SecretState {
            key,
            data,
            local: Record::new(),
            provenance,
        };
        info!(
            key = %state.key,
            %provenance,
            fields = state.data.len(),
            fingerprint = &state.fingerprint()[..12],
            "secret state ready"
        );
        Ok(state)
    }
}

async fn read_record(
    store: &dyn SecretStore,
    key: &str,
    policy: RetryPolicy,
) -> std::result::Result<String, RetryExhausted<StoreError>> {
    retry(
        policy,
        "read secret state",
        move || store.get_value(key),
        StoreError::is_retryable,
    )
    .await
}

async fn create_record(
    store: &dyn SecretStore,
    key: &str,
    data: &mut Record,
    read_policy: RetryPolicy,
    write_policy: RetryPolicy,
) -> Result<Provenance> {
    let json = serialize(data)?;
    let body = json.as_str();

    let created = retry(
        write_policy,
        "create secret state",
        move || store.create_value(key, body),
        |e| e.is_retryable() && !matches!(e, StoreError::AlreadyExists(_)),
    )
    .await;

    match created {
        Ok(()) => Ok(Provenance::Created),
        Err(RetryExhausted {
            source: StoreError::AlreadyExists(_),
            ..
        }) => {
            // The record exists even though reading it failed. Reading it
            // again is the only way forward that cannot clobber it.
            warn!(key, "secret state already exists, reading it again");
            let raw = read_record(store, key, read_policy)
                .await
                .map_err(|e| StateError::Conflict {
                    key: key.to_string(),
                    source: e.source,
                })?;
            reconcile(key, data, &raw)?;
            Ok(Provenance::Loaded)
        }
        Err(e) => Err(StateError::WriteExhausted {
            key: key.to_string(),
            attempts: e.attempts,
            source: e.source,
        }
        .into()),
    }
}

/// Merge a persisted record over the candidate; persisted values win.
fn reconcile(key: &str, data: &mut Record, raw: &str) -> Result<()> {
    let persisted: Record = serde_json::from_str(raw).map_err(|e| StateError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })?;

    let kept = persisted
        .keys()
        .filter(|name| data.contains_key(name.as_str()))
        .count();
    debug!(key, kept, added = persisted.len() - kept, "merged persisted state");

    for (name, value) in persisted {
        if let Some(mut discarded) = data.insert(name, value) {
            discarded.zeroize();
        }
    }
    Ok(())
}

fn serialize(data: &Record) -> Result<Zeroizing<String>> {
    let json = serde_json::to_string(data).map_err(StoreError::from)?;
    Ok(Zeroizing::new(json))
}

/// Provisioned secret state, ready for lookups.
///
/// Holds two disjoint namespaces: the persisted record and values derived
/// during this run with [`SecretState::store`], which are never persisted.
pub struct SecretState {
    key: StoreKey,
    data: Record,
    local: Record,
    provenance: Provenance,
}

impl SecretState {
    pub fn builder(key: impl Into<StoreKey>, store: Arc<dyn SecretStore>) -> SecretStateBuilder {
        SecretStateBuilder {
            key: key.into(),
            store,
            values: BTreeMap::new(),
            read_policy: RetryPolicy::READ,
            write_policy: RetryPolicy::WRITE,
        }
    }

    /// Look up a persisted value, falling back to a value derived this run.
    ///
    /// # Errors
    ///
    /// Returns `StateError::KeyNotFound` if neither namespace has `name`.
    pub fn get(&self, name: &str) -> Result<&str> {
        self.data
            .get(name)
            .or_else(|| self.local.get(name))
            .map(String::as_str)
            .ok_or_else(|| StateError::KeyNotFound(name.to_string()).into())
    }

    /// Derive a run-local value once and keep it for the rest of the run.
    ///
    /// `supplier` is only invoked the first time `name` is stored; later
    /// calls return the cached value.
    ///
    /// # Errors
    ///
    /// Returns `StateError::DuplicateKey` without invoking `supplier` if
    /// `name` is persisted, or whatever error `supplier` yields.
    pub async fn store<F, Fut>(&mut self, name: &str, supplier: F) -> Result<&str>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        if self.data.contains_key(name) {
            return Err(StateError::DuplicateKey(name.to_string()).into());
        }

        if !self.local.contains_key(name) {
            let value = supplier().await?;
            debug!(name, "stored run-local value");
            self.local.insert(name.to_string(), value);
        }

        Ok(self.local[name].as_str())
    }

    /// Reference to the persisted field `name`, for use in deployment
    /// templates instead of the value itself.
    ///
    /// # Errors
    ///
    /// Returns `StateError::KeyNotFound` unless `name` is persisted. Run-local
    /// values have nothing to point at.
    pub fn secret_reference(&self, name: &str) -> Result<SecretRef> {
        if !self.data.contains_key(name) {
            return Err(StateError::KeyNotFound(name.to_string()).into());
        }
        Ok(SecretRef::new(self.key.as_str(), name))
    }

    /// The raw persisted value, for consumers that cannot take a reference.
    pub fn expose(&self, name: &str) -> Option<&str> {
        self.data.get(name).map(String::as_str)
    }

    /// Apply `f` to a reference for every persisted field.
    pub fn map_secrets<T, F>(&self, mut f: F) -> BTreeMap<StateKey, T>
    where
        F: FnMut(SecretRef) -> T,
    {
        self.data
            .keys()
            .map(|name| (name.clone(), f(SecretRef::new(self.key.as_str(), name.as_str()))))
            .collect()
    }

    /// References for every persisted field.
    pub fn references(&self) -> BTreeMap<StateKey, SecretRef> {
        self.map_secrets(|reference| reference)
    }

    /// The store key the record lives under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Persisted field names, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// SHA-256 of the persisted record, hex encoded.
    ///
    /// Changes whenever any persisted value changes, so it can be logged to
    /// compare runs without revealing values.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, value) in &self.data {
            hasher.update(name.as_bytes());
            hasher.update([0]);
            hasher.update(value.as_bytes());
            hasher.update([0]);
        }
        format!("{:x}", hasher.finalize())
    }
}

impl fmt::Debug for SecretState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretState")
            .field("key", &self.key)
            .field("provenance", &self.provenance)
            .field("fields", &self.data.keys().collect::<Vec<_>>())
            .field("local", &self.local.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Drop for SecretState {
    fn drop(&mut self) {
        for value in self.data.values_mut().chain(self.local.values_mut()) {
            value.zeroize();
        }
    }
}
