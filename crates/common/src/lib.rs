//! Common utilities and shared types for koinonia.
//!
//! This crate provides foundational components used across all koinonia
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Phone normalization**: login-key canonicalization via [`normalize_phone`]

pub mod config;
pub mod error;
pub mod id;
pub mod phone;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use phone::normalize_phone;
