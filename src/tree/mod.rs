/// Native-document builder with per-parent path disambiguation.
pub mod build;
/// Conversion to and from flat metadata records.
pub mod flatten;
/// Read-only tree model.
pub mod model;
/// Summary statistics over a tree.
pub mod stats;
