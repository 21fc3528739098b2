use std::collections::{HashMap, HashSet};

use crate::{
    blend::mode::BlendMode,
    foundation::core::CanvasSize,
    foundation::diag::{ComposeReport, Diagnostic},
    metadata::records::{DocumentRecord, LayerRecord},
    tree::build::{last_segment, sanitize_segment},
    tree::model::{LayerKind, LayerNode, LayerTree, sort_siblings},
};

impl LayerTree {
    /// One record per node, in depth-first pre-order, as the exporter writes them.
    pub fn to_records(&self) -> Vec<LayerRecord> {
        self.walk()
            .map(|(node, _)| {
                let mut rec = LayerRecord::from_parts(
                    node.name(),
                    node.path(),
                    node.geometry(),
                    node.is_visible(),
                    node.opacity(),
                    node.blend_mode().metadata_name(),
                );
                rec.index = i64::from(node.order_index());
                rec.layer_type = node.layer_type().map(str::to_string);
                if let LayerKind::Group { children } = node.kind() {
                    rec.children_count = Some(u32::try_from(children.len()).unwrap_or(u32::MAX));
                }
                rec
            })
            .collect()
    }

    /// Document-level record (name and canvas size).
    pub fn document_record(&self) -> DocumentRecord {
        DocumentRecord {
            name: self.name.clone(),
            width: Some(self.size.width.into()),
            height: Some(self.size.height.into()),
            color_mode: None,
            layers: None,
        }
    }

    /// Re-hydrate a tree from flat records.
    ///
    /// A record's parent is the record whose path is its own path minus the last segment.
    /// Siblings are ordered by `index`, ties keeping record order. Records with unusable
    /// geometry or a duplicate path are skipped, and so is everything below a record skipped
    /// for its geometry. Records whose parent has no record at all (or is not a group) are
    /// attached to the root. Every such case is reported.
    pub fn from_records(
        name: impl Into<String>,
        size: CanvasSize,
        records: &[LayerRecord],
    ) -> (LayerTree, ComposeReport) {
        let mut report = ComposeReport::default();
        let mut pending: Vec<Pending> = Vec::with_capacity(records.len());
        let mut seen: HashSet<String> = HashSet::new();
        let mut rejected: HashSet<String> = HashSet::new();

        for rec in records {
            let path = if rec.path.is_empty() {
                rec.save_name
                    .clone()
                    .unwrap_or_else(|| sanitize_segment(&rec.name))
            } else {
                rec.path.clone()
            };

            if !seen.insert(path.clone()) {
                report.push(Diagnostic::MalformedMetadata {
                    path,
                    reason: "duplicate path; later record ignored".to_string(),
                });
                continue;
            }

            let geometry = match rec.geometry() {
                Ok(g) => g,
                Err(reason) => {
                    rejected.insert(path.clone());
                    report.push(Diagnostic::MalformedMetadata { path, reason });
                    continue;
                }
            };

            let resolved = BlendMode::resolve(rec.blend_mode.as_deref());
            if let Some(raw) = resolved.unrecognized {
                report.push(Diagnostic::UnknownBlendMode {
                    path: path.clone(),
                    raw,
                });
            }

            pending.push(Pending {
                is_group: rec.is_group(),
                node: LayerNode {
                    name: rec.name.clone(),
                    path,
                    geometry,
                    visible: rec.visible,
                    opacity: rec.opacity_u8(),
                    blend_mode: resolved.mode,
                    order_index: rec.order_index(),
                    layer_type: rec.layer_type.clone(),
                    kind: LayerKind::Leaf,
                },
            });
        }

        // A rejected group takes its whole subtree with it.
        pending.retain(|p| match rejected_ancestor(&p.node.path, &rejected) {
            Some(ancestor) => {
                report.push(Diagnostic::MalformedMetadata {
                    path: p.node.path.clone(),
                    reason: format!("ancestor '{ancestor}' was rejected; dropped"),
                });
                false
            }
            None => true,
        });

        let groups: HashSet<String> = pending
            .iter()
            .filter(|p| p.is_group)
            .map(|p| p.node.path.clone())
            .collect();

        let mut by_parent: HashMap<Option<String>, Vec<Pending>> = HashMap::new();
        for p in pending {
            let parent = parent_path(&p.node.path).map(str::to_string);
            let parent = match parent {
                Some(pp) if groups.contains(&pp) => Some(pp),
                Some(pp) => {
                    report.push(Diagnostic::MalformedMetadata {
                        path: p.node.path.clone(),
                        reason: format!("parent '{pp}' is not a known group; attached to root"),
                    });
                    None
                }
                None => None,
            };
            by_parent.entry(parent).or_default().push(p);
        }

        let roots = assemble(None, &mut by_parent);
        (
            LayerTree {
                name: name.into(),
                size,
                roots,
            },
            report,
        )
    }
}

struct Pending {
    node: LayerNode,
    is_group: bool,
}

fn parent_path(path: &str) -> Option<&str> {
    let seg = last_segment(path);
    if seg.len() == path.len() {
        return None;
    }
    Some(&path[..path.len() - seg.len() - 1])
}

fn rejected_ancestor<'a>(path: &'a str, rejected: &HashSet<String>) -> Option<&'a str> {
    let mut cur = parent_path(path);
    while let Some(p) = cur {
        if rejected.contains(p) {
            return Some(p);
        }
        cur = parent_path(p);
    }
    None
}

fn assemble(
    parent: Option<String>,
    by_parent: &mut HashMap<Option<String>, Vec<Pending>>,
) -> Vec<LayerNode> {
    let items = by_parent.remove(&parent).unwrap_or_default();
    let mut nodes: Vec<LayerNode> = items
        .into_iter()
        .map(|p| {
            let mut node = p.node;
            if p.is_group {
                let children = assemble(Some(node.path.clone()), by_parent);
                node.kind = LayerKind::Group { children };
            }
            node
        })
        .collect();
    sort_siblings(&mut nodes);
    nodes
}

#[cfg(test)]
#[path = "../../tests/unit/tree/flatten.rs"]
mod tests;
