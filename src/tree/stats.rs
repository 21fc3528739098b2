use std::collections::{BTreeMap, BTreeSet};

use crate::{
    blend::mode::BlendMode,
    tree::model::{LayerTree, NodeKind},
};

/// One step of a depth-first walk, as consumed by [`TreeStats::fold`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkEntry<'a> {
    /// Node path.
    pub path: &'a str,
    /// Depth below the document root (roots are 0).
    pub depth: usize,
    /// Leaf or group.
    pub kind: NodeKind,
    /// Own visibility flag.
    pub visible: bool,
    /// Resolved blend mode.
    pub blend_mode: BlendMode,
}

/// Summary counts over a layer tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of nodes.
    pub total: usize,
    /// Nodes whose own flag is visible.
    pub visible: usize,
    /// Nodes whose own flag is hidden.
    pub hidden: usize,
    /// Group nodes.
    pub groups: usize,
    /// Leaf nodes.
    pub leaves: usize,
    /// Node count per depth.
    pub depth_histogram: BTreeMap<usize, usize>,
    /// Greatest depth seen (0 for an empty tree).
    pub max_depth: usize,
    /// Leaf paths at the greatest leaf depth, in walk order.
    pub deepest_leaves: Vec<String>,
    /// Blend modes in use.
    pub blend_modes: BTreeSet<BlendMode>,
    deepest_leaf_depth: Option<usize>,
}

impl TreeStats {
    /// Collect statistics for a whole tree.
    pub fn of(tree: &LayerTree) -> Self {
        Self::fold(tree.walk().map(|(n, depth)| WalkEntry {
            path: n.path(),
            depth,
            kind: n.node_kind(),
            visible: n.is_visible(),
            blend_mode: n.blend_mode(),
        }))
    }

    /// Fold a walk sequence into statistics.
    pub fn fold<'a>(entries: impl IntoIterator<Item = WalkEntry<'a>>) -> Self {
        entries.into_iter().fold(Self::default(), Self::step)
    }

    fn step(mut self, e: WalkEntry<'_>) -> Self {
        self.total += 1;
        if e.visible {
            self.visible += 1;
        } else {
            self.hidden += 1;
        }
        *self.depth_histogram.entry(e.depth).or_default() += 1;
        self.max_depth = self.max_depth.max(e.depth);
        self.blend_modes.insert(e.blend_mode);

        match e.kind {
            NodeKind::Group => self.groups += 1,
            NodeKind::Leaf => {
                self.leaves += 1;
                match self.deepest_leaf_depth {
                    Some(d) if d > e.depth => {}
                    Some(d) if d == e.depth => self.deepest_leaves.push(e.path.to_string()),
                    _ => {
                        self.deepest_leaf_depth = Some(e.depth);
                        self.deepest_leaves = vec![e.path.to_string()];
                    }
                }
            }
        }
        self
    }
}

impl std::fmt::Display for TreeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "nodes: {} ({} groups, {} leaves), visible: {}, hidden: {}",
            self.total, self.groups, self.leaves, self.visible, self.hidden
        )?;
        writeln!(f, "max depth: {}", self.max_depth)?;
        for (depth, count) in &self.depth_histogram {
            writeln!(f, "  depth {depth}: {count}")?;
        }
        let modes: Vec<&str> = self.blend_modes.iter().map(|m| m.as_str()).collect();
        writeln!(f, "blend modes: {}", modes.join(", "))?;
        for path in &self.deepest_leaves {
            writeln!(f, "deepest: {path}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tree/stats.rs"]
mod tests;
