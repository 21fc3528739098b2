use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use serde_json::json;

use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_export_dir").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_json(path: &Path, value: Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn write_png(path: &Path, px: [u8; 4]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbaImage::from_pixel(2, 2, Rgba(px));
    image::save_buffer_with_format(
        path,
        img.as_raw(),
        2,
        2,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .unwrap();
}

fn layer(name: &str, path: &str, index: i64) -> Value {
    json!({
        "name": name, "save_name": name, "path": path, "visible": true, "opacity": 255,
        "blend_mode": "BlendMode.NORMAL", "left": 0, "top": 0, "width": 2, "height": 2,
        "right": 2, "bottom": 2, "type": "PixelLayer", "index": index
    })
}

fn exporter_layout(name: &str) -> PathBuf {
    let dir = scratch(name);
    write_json(
        &dir.join("doc.json"),
        json!({"name": "doc.psd", "width": 4, "height": 4, "color_mode": "RGB", "layers_count": 3}),
    );
    write_json(&dir.join("bg/bg.json"), layer("bg", "bg", 0));
    write_png(&dir.join("bg/bg.png"), [255, 0, 0, 255]);

    let mut grp = layer("grp", "grp", 1);
    grp["type"] = json!("Group");
    grp["children_count"] = json!(1);
    grp["blend_mode"] = json!("BlendMode.PASS_THROUGH");
    write_json(&dir.join("grp/grp.json"), grp);
    write_png(&dir.join("grp/grp.png"), [0, 255, 0, 255]);
    write_json(&dir.join("grp/a/a.json"), layer("a", "grp/a", 0));
    write_png(&dir.join("grp/a/a.png"), [0, 0, 255, 255]);

    std::fs::create_dir_all(dir.join("broken")).unwrap();
    std::fs::write(dir.join("broken/broken.json"), "{not json").unwrap();
    dir
}

#[test]
fn exporter_directory_is_rehydrated() {
    let dir = exporter_layout("basic");
    let doc = load_export_dir(&dir, false).unwrap();

    assert_eq!(doc.tree.name(), "doc.psd");
    assert_eq!((doc.tree.size().width, doc.tree.size().height), (4, 4));
    let paths: Vec<&str> = doc.tree.walk().map(|(n, _)| n.path()).collect();
    assert_eq!(paths, vec!["bg", "grp", "grp/a"]);

    assert_eq!(doc.report.count_kind("malformed_metadata"), 1);
    assert_eq!(doc.report.diagnostics()[0].path(), Some("broken"));

    assert!(doc.rasters.contains("bg"));
    assert!(doc.rasters.contains("grp/a"));
    assert!(!doc.rasters.contains("grp"));
}

#[test]
fn group_rasters_are_loaded_on_request() {
    let dir = exporter_layout("group_rasters");
    let doc = load_document(&dir, None, true).unwrap();
    assert!(doc.rasters.contains("grp"));
}

#[test]
fn corrupt_png_is_remembered_as_failure() {
    let dir = exporter_layout("corrupt");
    std::fs::write(dir.join("bg/bg.png"), b"nope").unwrap();
    let doc = load_export_dir(&dir, false).unwrap();
    assert!(!doc.rasters.contains("bg"));
    assert!(doc.rasters.missing_reason("bg").contains("bg.png"));
}

#[test]
fn missing_document_metadata_is_fatal() {
    let dir = scratch("no_root");
    write_json(&dir.join("bg/bg.json"), layer("bg", "bg", 0));
    let err = load_export_dir(&dir, false).unwrap_err();
    assert!(matches!(err, ComposeError::Validation(_)));
}

#[test]
fn tree_json_with_flat_rasters() {
    let dir = scratch("tree_json");
    let file = dir.join("tree.json");
    let mut g = layer("g", "", 0);
    g.as_object_mut().unwrap().remove("path");
    g["type"] = json!("Group");
    g["blend_mode"] = json!("MULTIPLY");
    let mut child = layer("c", "", 0);
    child.as_object_mut().unwrap().remove("path");
    g["children"] = json!([child]);
    write_json(
        &file,
        json!({"name": "t.psd", "width": 3, "height": 3, "layers": [g]}),
    );
    write_png(&dir.join("g/c.png"), [9, 9, 9, 255]);

    let doc = load_document(&file, None, false).unwrap();
    assert!(doc.report.is_clean(), "{:?}", doc.report.diagnostics());
    assert_eq!(doc.tree.find("g").unwrap().children().len(), 1);
    assert!(doc.rasters.contains("g/c"));
}

#[test]
fn tree_json_without_layers_is_rejected() {
    let dir = scratch("tree_json_empty");
    let file = dir.join("tree.json");
    write_json(&file, json!({"name": "t.psd", "width": 3, "height": 3}));
    assert!(load_document(&file, None, false).is_err());
}
