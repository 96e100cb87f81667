//! Common utilities and shared types for regfeed.
//!
//! This crate provides foundational components used across all regfeed
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Pagination**: Page metadata and opaque log cursors
//!
//! # Example
//!
//! ```no_run
//! use regfeed_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod pagination;

pub use config::{Config, parse_duration};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use pagination::{Page, PageMeta, decode_cursor, encode_cursor};
