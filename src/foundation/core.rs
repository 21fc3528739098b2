use crate::foundation::error::{ComposeError, ComposeResult};

/// Integer pixel bounds of a layer in document coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    /// Left edge (may be negative for layers hanging off the canvas).
    pub left: i32,
    /// Top edge (may be negative).
    pub top: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Geometry {
    /// Build bounds from origin and size.
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build bounds from edges; fails when `right < left` or `bottom < top`.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> ComposeResult<Self> {
        if right < left || bottom < top {
            return Err(ComposeError::validation(format!(
                "geometry edges are inverted: ({left},{top})-({right},{bottom})"
            )));
        }
        Ok(Self {
            left,
            top,
            width: right.abs_diff(left),
            height: bottom.abs_diff(top),
        })
    }

    /// `left + width`.
    pub fn right(self) -> i64 {
        i64::from(self.left) + i64::from(self.width)
    }

    /// `top + height`.
    pub fn bottom(self) -> i64 {
        i64::from(self.top) + i64::from(self.height)
    }

    /// Top-left corner as `(x, y)`.
    pub fn origin(self) -> (i32, i32) {
        (self.left, self.top)
    }

    /// `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Document canvas dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasSize {
    /// Validated constructor: both sides must be non-zero.
    pub fn new(width: u32, height: u32) -> ComposeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ComposeError::validation(format!(
                "document canvas size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
