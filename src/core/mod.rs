//! Core types: the capability catalog and the request-level error model.

pub mod error;
pub mod tool;
