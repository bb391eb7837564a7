//! Core library components.
//!
//! Everything here is usable without the CLI: key management, vault storage,
//! the global config, legacy auth projection and the audit log.

pub mod atomic;
pub mod audit;
pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod env;
pub mod ingest;
pub mod legacy;
pub mod manager;
pub mod slug;
pub mod store;
pub mod vault;
