//! Vocabulary domain model.
//!
//! # Responsibility
//! - Define the persisted word record and group identifiers.
//! - Hold the pure group/word integrity operations over a loaded snapshot.
//!
//! # Invariants
//! - Word identity is positional; there is no stable id.
//! - Every word's `group` names a live group once a cascade delete completes.

pub mod library;
pub mod validation;
pub mod word;
