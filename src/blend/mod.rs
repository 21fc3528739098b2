/// Pure per-channel blend functions.
pub mod algebra;
/// The closed set of supported blend modes.
pub mod mode;
