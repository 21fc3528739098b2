/// Plan execution, optionally fork-join parallel.
pub mod execute;
/// One-shot compose entry points and options.
pub mod pipeline;
/// Ordered paint instructions compiled from a tree.
pub mod plan;
