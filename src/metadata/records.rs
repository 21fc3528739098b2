use serde_json::Value;

use crate::{
    foundation::core::{CanvasSize, Geometry},
    foundation::diag::Diagnostic,
    foundation::error::{ComposeError, ComposeResult},
};

/// Side-car metadata for one layer or group, as written by the exporter.
///
/// Geometry fields are kept as raw JSON so a non-numeric value can be reported as
/// [`Diagnostic::MalformedMetadata`] instead of failing the whole document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerRecord {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Path segment used on disk (name after disambiguation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_name: Option<String>,
    /// Slash-joined identity key.
    #[serde(default)]
    pub path: String,
    /// Visibility; absent means visible.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Opacity 0..=255; absent means 255.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Raw blend mode string; absent means `NORMAL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<String>,
    /// Left edge.
    #[serde(default)]
    pub left: Option<Value>,
    /// Top edge.
    #[serde(default)]
    pub top: Option<Value>,
    /// Right edge (used when `width` is absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Value>,
    /// Bottom edge (used when `height` is absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Value>,
    /// Width.
    #[serde(default)]
    pub width: Option<Value>,
    /// Height.
    #[serde(default)]
    pub height: Option<Value>,
    /// Source layer class; `"Group"` marks groups.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub layer_type: Option<String>,
    /// Position among siblings; absent means 0.
    #[serde(default)]
    pub index: i64,
    /// Number of children, written for groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_count: Option<u32>,
}

fn default_visible() -> bool {
    true
}

fn default_opacity() -> f64 {
    255.0
}

impl LayerRecord {
    /// `true` when the record describes a group.
    pub fn is_group(&self) -> bool {
        self.layer_type.as_deref() == Some("Group") || self.children_count.is_some()
    }

    /// Opacity clamped and rounded into 0..=255.
    pub fn opacity_u8(&self) -> u8 {
        if self.opacity.is_nan() {
            return 255;
        }
        self.opacity.round().clamp(0.0, 255.0) as u8
    }

    /// Sibling index clamped into `u32`.
    pub fn order_index(&self) -> u32 {
        u32::try_from(self.index.max(0)).unwrap_or(u32::MAX)
    }

    /// Validated bounds; the error string explains which field is unusable.
    pub fn geometry(&self) -> Result<Geometry, String> {
        let left = required_int(&self.left, "left")?;
        let top = required_int(&self.top, "top")?;
        let width = extent(&self.width, &self.right, left, "width", "right")?;
        let height = extent(&self.height, &self.bottom, top, "height", "bottom")?;
        Ok(Geometry::new(left, top, width, height))
    }

    /// Build a record from a parsed node, as the exporter would write it.
    pub fn from_parts(
        name: &str,
        path: &str,
        geometry: Geometry,
        visible: bool,
        opacity: u8,
        blend_mode: String,
    ) -> Self {
        Self {
            name: name.to_string(),
            save_name: Some(crate::tree::build::last_segment(path).to_string()),
            path: path.to_string(),
            visible,
            opacity: f64::from(opacity),
            blend_mode: Some(blend_mode),
            left: Some(Value::from(geometry.left)),
            top: Some(Value::from(geometry.top)),
            right: Some(Value::from(geometry.right())),
            bottom: Some(Value::from(geometry.bottom())),
            width: Some(Value::from(geometry.width)),
            height: Some(Value::from(geometry.height)),
            layer_type: None,
            index: 0,
            children_count: None,
        }
    }
}

/// Parse one record from JSON; any shape error is reported against `origin`.
pub fn parse_record(value: Value, origin: &str) -> Result<LayerRecord, Diagnostic> {
    serde_json::from_value(value).map_err(|e| Diagnostic::MalformedMetadata {
        path: origin.to_string(),
        reason: e.to_string(),
    })
}

/// Document-level metadata: the root side-car or a whole-tree dump.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DocumentRecord {
    /// Document name, usually the source file name.
    #[serde(default)]
    pub name: String,
    /// Canvas width.
    #[serde(default)]
    pub width: Option<Value>,
    /// Canvas height.
    #[serde(default)]
    pub height: Option<Value>,
    /// Color mode reported by the parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_mode: Option<String>,
    /// Nested layer records (whole-tree dumps only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<Value>>,
}

impl DocumentRecord {
    /// Parse from JSON text.
    pub fn from_json(text: &str) -> ComposeResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ComposeError::serde(format!("parse document metadata: {e}")))
    }

    /// `true` when the JSON object looks like document metadata (has a size).
    pub fn looks_like_document(value: &Value) -> bool {
        value.get("width").is_some()
            && value.get("height").is_some()
            && value.get("path").is_none()
            && value.get("left").is_none()
    }

    /// Canvas size; absence or a non-positive value is fatal.
    pub fn canvas_size(&self) -> ComposeResult<CanvasSize> {
        let w = self
            .width
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok());
        let h = self
            .height
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok());
        match (w, h) {
            (Some(w), Some(h)) => CanvasSize::new(w, h),
            _ => Err(ComposeError::validation(format!(
                "document '{}' has no usable canvas size",
                self.name
            ))),
        }
    }
}

/// Flatten a nested `layers`/`children` dump into records in pre-order.
///
/// Records without a `path` get one derived from their ancestors' paths and their own name.
pub fn flatten_nested(
    values: &[Value],
    parent_path: Option<&str>,
    out: &mut Vec<LayerRecord>,
    diags: &mut Vec<Diagnostic>,
) {
    for (i, value) in values.iter().enumerate() {
        let children = value
            .get("children")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let origin = match value.get("path").and_then(Value::as_str) {
            Some(p) => p.to_string(),
            None => format!("{}[{i}]", parent_path.unwrap_or("<root>")),
        };

        let mut stripped = value.clone();
        if let Some(obj) = stripped.as_object_mut() {
            obj.remove("children");
        }

        match parse_record(stripped, &origin) {
            Ok(mut rec) => {
                if rec.path.is_empty() {
                    let seg = rec
                        .save_name
                        .clone()
                        .unwrap_or_else(|| crate::tree::build::sanitize_segment(&rec.name));
                    rec.path = crate::tree::build::join_path(parent_path, &seg);
                }
                if value.get("children").is_some() && rec.children_count.is_none() {
                    rec.children_count = Some(u32::try_from(children.len()).unwrap_or(u32::MAX));
                }
                let path = rec.path.clone();
                out.push(rec);
                flatten_nested(&children, Some(&path), out, diags);
            }
            Err(d) => diags.push(d),
        }
    }
}

fn number_as_i64(v: &Value) -> Option<i64> {
    if let Some(i) = v.as_i64() {
        return Some(i);
    }
    let f = v.as_f64()?;
    (f.fract() == 0.0 && f.is_finite()).then_some(f as i64)
}

fn required_int(v: &Option<Value>, field: &str) -> Result<i32, String> {
    let v = v.as_ref().ok_or_else(|| format!("'{field}' is missing"))?;
    let n = number_as_i64(v).ok_or_else(|| format!("'{field}' is not an integer: {v}"))?;
    i32::try_from(n).map_err(|_| format!("'{field}' is out of range: {n}"))
}

fn extent(
    size: &Option<Value>,
    far_edge: &Option<Value>,
    near: i32,
    size_field: &str,
    edge_field: &str,
) -> Result<u32, String> {
    let n = match (size, far_edge) {
        (Some(v), _) => {
            number_as_i64(v).ok_or_else(|| format!("'{size_field}' is not an integer: {v}"))?
        }
        (None, Some(v)) => {
            let far =
                number_as_i64(v).ok_or_else(|| format!("'{edge_field}' is not an integer: {v}"))?;
            far - i64::from(near)
        }
        (None, None) => return Err(format!("'{size_field}' is missing")),
    };
    u32::try_from(n).map_err(|_| format!("'{size_field}' must be >= 0, got {n}"))
}

#[cfg(test)]
#[path = "../../tests/unit/metadata/records.rs"]
mod tests;
