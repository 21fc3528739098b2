/// Exporter directory and tree JSON loaders.
pub mod export_dir;
/// JSON side-car schema.
pub mod records;
