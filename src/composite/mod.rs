/// Canvas-level compositing with clipping, opacity and blend mode.
pub mod compositor;
/// Straight-alpha source-over for a single pixel.
pub mod over;
