//! Flutter bridge crate for the PinJi core.

pub mod api;
