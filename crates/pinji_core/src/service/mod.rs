//! Core use-case services.
//!
//! # Responsibility
//! - Enforce group/word integrity rules above the word store.
//! - Keep FFI callers decoupled from key-value storage details.

pub mod library_service;
