//! Shared types, errors and fixed-point helpers.

pub(crate) mod core;
pub(crate) mod diag;
pub(crate) mod error;
pub(crate) mod math;
