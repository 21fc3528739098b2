/// PNG decoding.
pub mod decode;
/// Rasters keyed by node path.
pub mod store;
