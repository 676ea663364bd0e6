//! # Language Bindings
//!
//! Built only with the `python` cargo feature.

#[cfg(feature = "python")]
pub mod python;
