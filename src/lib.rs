//! # Analysis Store
//!
//! Persists one row per analysis result and restricts reads to the owning
//! user through row-level policies, usable both as a standalone binary and as
//! a library.
//!
//! SQLite has no native row-level security, so [`store::SqliteStore`]
//! enforces the [`types::PolicySet`] itself. [`store::postgres`] renders the
//! same table and policies as native Postgres DDL.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! analysis-store = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use analysis_store::config::StoreConfig;
//! use analysis_store::store::{SqliteStore, Store};
//! use analysis_store::types::{Identity, NewAnalysis};
//!
//! let config = StoreConfig::load("./data").unwrap();
//! let store = SqliteStore::open(&config).unwrap();
//! store.initialize().unwrap();
//!
//! // The backend writes with the service identity...
//! store.insert_analysis(&Identity::Service, &NewAnalysis::for_user(uid)).unwrap();
//! // ...and users only ever see their own rows.
//! let mine = store.list_analyses(&Identity::user(uid), "", 50).unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod store;
pub mod types;
