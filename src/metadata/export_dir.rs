use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use serde_json::Value;

use crate::{
    assets::{decode::read_raster, store::RasterStore},
    foundation::diag::{ComposeReport, Diagnostic},
    foundation::error::{ComposeError, ComposeResult},
    metadata::records::{DocumentRecord, LayerRecord, flatten_nested, parse_record},
    tree::model::{LayerNode, LayerTree},
};

/// A document re-hydrated from disk: tree, raster payloads and load-time diagnostics.
#[derive(Clone, Debug)]
pub struct LoadedDocument {
    /// Layer tree.
    pub tree: LayerTree,
    /// Raster payloads keyed by node path.
    pub rasters: RasterStore,
    /// Problems found while loading.
    pub report: ComposeReport,
}

/// Load either an exporter directory or a single tree JSON file.
///
/// `raster_root` overrides where tree JSON files look for PNGs (default: the file's directory);
/// it is ignored for directories. Group rasters are decoded only when `group_rasters` is set or
/// the group has no children.
pub fn load_document(
    input: &Path,
    raster_root: Option<&Path>,
    group_rasters: bool,
) -> ComposeResult<LoadedDocument> {
    if input.is_dir() {
        load_export_dir(input, group_rasters)
    } else {
        let root = match raster_root {
            Some(r) => r.to_path_buf(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        load_tree_json(input, &root, group_rasters)
    }
}

/// Load the exporter layout: a root `<doc>.json` plus one directory per node holding
/// `<save_name>.json` and `<save_name>.png`, nested for groups.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_export_dir(dir: &Path, group_rasters: bool) -> ComposeResult<LoadedDocument> {
    let doc = find_document_record(dir)?;
    let size = doc.canvas_size()?;

    let mut report = ComposeReport::default();
    let mut records = Vec::new();
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for sub in sorted_subdirs(dir).with_context(|| format!("list '{}'", dir.display()))? {
        collect_node_dir(&sub, dir, &mut records, &mut files, &mut report);
    }

    let name = if doc.name.is_empty() {
        dir_label(dir)
    } else {
        doc.name.clone()
    };
    let (tree, tree_report) = LayerTree::from_records(name, size, &records);
    report.absorb(tree_report);
    tracing::debug!(nodes = tree.node_count(), "loaded export directory");

    let jobs: Vec<(String, PathBuf)> = files
        .into_iter()
        .filter(|(path, _)| tree.find(path).is_some_and(|n| wants_raster(n, group_rasters)))
        .collect();
    let rasters = decode_all(jobs);

    Ok(LoadedDocument {
        tree,
        rasters,
        report,
    })
}

/// Load a whole-tree JSON dump (`{name, width, height, layers: [{..., children}]}`).
///
/// Rasters are looked up under `raster_root` at `<path>/<save_name>.png`, then `<path>.png`.
#[tracing::instrument(skip_all, fields(file = %file.display()))]
pub fn load_tree_json(
    file: &Path,
    raster_root: &Path,
    group_rasters: bool,
) -> ComposeResult<LoadedDocument> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("read tree json '{}'", file.display()))?;
    let doc = DocumentRecord::from_json(&text)?;
    let size = doc.canvas_size()?;
    let layers = doc.layers.as_deref().ok_or_else(|| {
        ComposeError::metadata(format!("'{}' has no 'layers' array", file.display()))
    })?;

    let mut records = Vec::new();
    let mut diags = Vec::new();
    flatten_nested(layers, None, &mut records, &mut diags);

    let mut report = ComposeReport::default();
    for d in diags {
        report.push(d);
    }
    let name = if doc.name.is_empty() {
        file_label(file)
    } else {
        doc.name.clone()
    };
    let (tree, tree_report) = LayerTree::from_records(name, size, &records);
    report.absorb(tree_report);

    let jobs: Vec<(String, PathBuf)> = tree
        .walk()
        .filter(|(n, _)| wants_raster(n, group_rasters))
        .filter_map(|(n, _)| {
            let nested = raster_root
                .join(n.path())
                .join(format!("{}.png", n.save_name()));
            let flat = raster_root.join(format!("{}.png", n.path()));
            let found = [nested, flat].into_iter().find(|p| p.is_file())?;
            Some((n.path().to_string(), found))
        })
        .collect();
    let rasters = decode_all(jobs);

    Ok(LoadedDocument {
        tree,
        rasters,
        report,
    })
}

fn find_document_record(dir: &Path) -> ComposeResult<DocumentRecord> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("list '{}'", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|x| x == "json"))
        .collect();
    candidates.sort();

    for path in candidates {
        let Ok(text) = std::fs::read_to_string(&path) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        if DocumentRecord::looks_like_document(&value) {
            return serde_json::from_value(value).map_err(|e| {
                ComposeError::serde(format!("parse '{}': {e}", path.display()))
            });
        }
    }
    Err(ComposeError::validation(format!(
        "no document metadata (json with width/height) in '{}'",
        dir.display()
    )))
}

fn collect_node_dir(
    dir: &Path,
    root: &Path,
    records: &mut Vec<LayerRecord>,
    files: &mut Vec<(String, PathBuf)>,
    report: &mut ComposeReport,
) {
    let rel = relative_key(dir, root);
    let base = dir_label(dir);
    let side_car = dir.join(format!("{base}.json"));

    match read_side_car(&side_car, &rel) {
        Ok(mut rec) => {
            if rec.path.is_empty() {
                rec.path = rel.clone();
            }
            let png = dir.join(format!("{base}.png"));
            if png.is_file() {
                files.push((rec.path.clone(), png));
            }
            records.push(rec);
        }
        Err(d) => report.push(d),
    }

    match sorted_subdirs(dir) {
        Ok(subs) => {
            for sub in subs {
                collect_node_dir(&sub, root, records, files, report);
            }
        }
        Err(e) => report.push(Diagnostic::MalformedMetadata {
            path: rel,
            reason: format!("list directory: {e}"),
        }),
    }
}

fn read_side_car(file: &Path, rel: &str) -> Result<LayerRecord, Diagnostic> {
    let malformed = |reason: String| Diagnostic::MalformedMetadata {
        path: rel.to_string(),
        reason,
    };
    let text = std::fs::read_to_string(file)
        .map_err(|e| malformed(format!("read '{}': {e}", file.display())))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| malformed(format!("parse '{}': {e}", file.display())))?;
    parse_record(value, rel)
}

fn sorted_subdirs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

fn wants_raster(node: &LayerNode, group_rasters: bool) -> bool {
    !node.is_group() || group_rasters || node.children().is_empty()
}

fn decode_all(jobs: Vec<(String, PathBuf)>) -> RasterStore {
    let decoded: Vec<_> = jobs
        .into_par_iter()
        .map(|(path, file)| {
            let result = read_raster(&file);
            (path, result)
        })
        .collect();

    let mut store = RasterStore::new();
    for (path, result) in decoded {
        match result {
            Ok(img) => store.insert(path, img),
            Err(e) => store.mark_failed(path, e.to_string()),
        }
    }
    store
}

fn relative_key(dir: &Path, root: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn dir_label(dir: &Path) -> String {
    dir.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_label(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/metadata/export_dir.rs"]
mod tests;
