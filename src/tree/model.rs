use crate::{
    blend::mode::BlendMode,
    foundation::core::{CanvasSize, Geometry},
};

/// Leaf or group payload of a [`LayerNode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerKind {
    /// A layer whose raster is supplied externally.
    Leaf,
    /// A group; children are sorted by `order_index` ascending (bottom first).
    Group {
        /// Child nodes in paint order.
        children: Vec<LayerNode>,
    },
}

/// Tag-only view of [`LayerKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// See [`LayerKind::Leaf`].
    Leaf,
    /// See [`LayerKind::Group`].
    Group,
}

/// One immutable layer or group.
///
/// Nodes are produced by [`crate::DocumentSpec::build`] or [`LayerTree::from_records`]; there is
/// no mutation API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerNode {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) geometry: Geometry,
    pub(crate) visible: bool,
    pub(crate) opacity: u8,
    pub(crate) blend_mode: BlendMode,
    pub(crate) order_index: u32,
    pub(crate) layer_type: Option<String>,
    pub(crate) kind: LayerKind,
}

impl LayerNode {
    /// Display label (not unique).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slash-joined identity key, unique within the tree.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of [`Self::path`] (the name after disambiguation).
    pub fn save_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Pixel bounds in document coordinates.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Own visibility flag (ancestors are not consulted).
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Opacity in 0..=255.
    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    /// Blend mode after fallback resolution.
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Position among siblings, 0 = bottom-most.
    pub fn order_index(&self) -> u32 {
        self.order_index
    }

    /// Source layer class as reported by the document provider, if known.
    pub fn layer_type(&self) -> Option<&str> {
        self.layer_type.as_deref()
    }

    /// Leaf/group payload.
    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    /// Tag of [`Self::kind`].
    pub fn node_kind(&self) -> NodeKind {
        match self.kind {
            LayerKind::Leaf => NodeKind::Leaf,
            LayerKind::Group { .. } => NodeKind::Group,
        }
    }

    /// `true` for groups.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, LayerKind::Group { .. })
    }

    /// Children in paint order; empty for leaves.
    pub fn children(&self) -> &[LayerNode] {
        match &self.kind {
            LayerKind::Leaf => &[],
            LayerKind::Group { children } => children,
        }
    }
}

/// A whole document: canvas size plus root-level siblings.
///
/// The document itself acts as an implicit pass-through group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerTree {
    pub(crate) name: String,
    pub(crate) size: CanvasSize,
    pub(crate) roots: Vec<LayerNode>,
}

impl LayerTree {
    /// Document name (usually the source file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Document canvas size.
    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Root-level siblings in paint order.
    pub fn roots(&self) -> &[LayerNode] {
        &self.roots
    }

    /// Children of `node` in paint order.
    pub fn children_of<'a>(&self, node: &'a LayerNode) -> &'a [LayerNode] {
        node.children()
    }

    /// Depth-first pre-order walk yielding `(node, depth)`; roots have depth 0.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.roots.iter().rev().map(|n| (n, 0)).collect(),
        }
    }

    /// Look a node up by path.
    pub fn find(&self, path: &str) -> Option<&LayerNode> {
        self.walk().map(|(n, _)| n).find(|n| n.path == path)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }
}

/// Iterator returned by [`LayerTree::walk`].
pub struct Walk<'a> {
    stack: Vec<(&'a LayerNode, usize)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (&'a LayerNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        self.stack
            .extend(node.children().iter().rev().map(|c| (c, depth + 1)));
        Some((node, depth))
    }
}

/// Stable sort of siblings by `order_index`; equal indices keep their input order.
pub(crate) fn sort_siblings(nodes: &mut [LayerNode]) {
    nodes.sort_by_key(|n| n.order_index);
}

#[cfg(test)]
#[path = "../../tests/unit/tree/model.rs"]
mod tests;
