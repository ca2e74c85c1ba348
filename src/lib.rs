//! Bookinfo Core Library
//!
//! Read-through book metadata lookup keyed by ISBN. A lookup is answered from
//! the local `SQLite` catalog when the book is stored there, and otherwise
//! from the public online catalog by searching for the ISBN, following the
//! first result and extracting the detail page.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`record`] - The book metadata record exchanged by every operation
//! - [`fetch`] - HTTP session with browser headers and a cookie jar
//! - [`extract`] - Page parsing and the declarative field rule table
//! - [`crawler`] - Search, acquire and crawl against the online catalog
//! - [`store`] - Persistence gateway and its `SQLite` implementation
//! - [`service`] - Get (read-through) and Put (write-through with tag sync)
//! - [`db`] - Database connection and schema management
//! - [`config`] - TOML configuration file

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod crawler;
pub mod db;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod record;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use crawler::{CatalogEndpoints, Crawler};
pub use db::{Database, DatabaseOptions, DbError};
pub use error::BookError;
pub use extract::ExtractError;
pub use fetch::{FetchError, Fetcher, HttpFetcher, HttpTimeouts};
pub use record::{BookRecord, PutAck};
pub use service::BookService;
pub use store::{BookStore, SqliteBookStore, StoreError};
