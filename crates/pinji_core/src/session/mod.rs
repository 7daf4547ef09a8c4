//! Per-screen session state.
//!
//! # Responsibility
//! - Hold transient quiz and review state outside the persisted store.
//!
//! # Invariants
//! - Sessions never write to the store; results are discarded on reset.

pub mod practice;
pub mod review;
