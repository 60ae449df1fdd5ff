//! Core library components.
//!
//! Layered configuration, value generators, and the secret-state lifecycle
//! with its storage backends.

pub mod config;
pub mod constants;
pub mod environment;
pub mod generator;
pub mod retry;
pub mod state;
pub mod store;
pub mod types;
