use std::fmt;

/// A recoverable problem noticed while loading or compositing.
///
/// Diagnostics never abort a run. Each one is logged with `tracing::warn!` when it is recorded
/// and kept, in order, in a [`ComposeReport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A raster payload for a node could not be located or decoded; the node was skipped.
    MissingAsset {
        /// Path of the affected node.
        path: String,
        /// Human-readable cause.
        reason: String,
    },
    /// A node's metadata was unusable (missing or non-numeric geometry, unreadable side-car).
    MalformedMetadata {
        /// Path of the affected node, or the side-car file when no path is known.
        path: String,
        /// Human-readable cause.
        reason: String,
    },
    /// A blend mode string was not recognized and `Normal` was substituted.
    UnknownBlendMode {
        /// Path of the affected node.
        path: String,
        /// Raw blend mode string as found in the source.
        raw: String,
    },
    /// Two images that should match in size did not; `actual` was resized to `expected`.
    DimensionMismatch {
        /// Size that was kept, `(width, height)`.
        expected: (u32, u32),
        /// Size that was resized away, `(width, height)`.
        actual: (u32, u32),
    },
}

impl Diagnostic {
    /// Short stable identifier of the diagnostic kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingAsset { .. } => "missing_asset",
            Self::MalformedMetadata { .. } => "malformed_metadata",
            Self::UnknownBlendMode { .. } => "unknown_blend_mode",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
        }
    }

    /// Node path the diagnostic refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MissingAsset { path, .. }
            | Self::MalformedMetadata { path, .. }
            | Self::UnknownBlendMode { path, .. } => Some(path),
            Self::DimensionMismatch { .. } => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAsset { path, reason } => {
                write!(f, "missing asset for '{path}': {reason}")
            }
            Self::MalformedMetadata { path, reason } => {
                write!(f, "malformed metadata for '{path}': {reason}")
            }
            Self::UnknownBlendMode { path, raw } => {
                write!(f, "unknown blend mode '{raw}' on '{path}', using NORMAL")
            }
            Self::DimensionMismatch { expected, actual } => write!(
                f,
                "image size {}x{} does not match {}x{}, resized",
                actual.0, actual.1, expected.0, expected.1
            ),
        }
    }
}

/// Ordered collection of the diagnostics produced by one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComposeReport {
    diagnostics: Vec<Diagnostic>,
}

impl ComposeReport {
    /// Record `diag`, logging it as a warning.
    pub fn push(&mut self, diag: Diagnostic) {
        tracing::warn!(kind = diag.kind(), "{diag}");
        self.diagnostics.push(diag);
    }

    /// Move every diagnostic of `other` into `self` without logging them again.
    pub fn absorb(&mut self, other: ComposeReport) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// All diagnostics in the order they were recorded.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// `true` when nothing was recorded.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of diagnostics of the given [`Diagnostic::kind`].
    pub fn count_kind(&self, kind: &str) -> usize {
        self.diagnostics.iter().filter(|d| d.kind() == kind).count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/diag.rs"]
mod tests;
