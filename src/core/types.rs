//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// Name of the remote secret holding the whole state record (e.g. `app/secret`).
pub type StoreKey = String;

/// A field of the state record (e.g. `APP_KEY`, `DB_PASSWORD`).
pub type StateKey = String;

/// The persisted state record: field name to plaintext value.
pub type Record = std::collections::BTreeMap<StateKey, String>;
