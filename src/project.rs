// src/project.rs

//! The JSON project document: canvas size plus layer records.
//!
//! Raster layers are not inlined. Each refers to a sidecar raster file
//! relative to the project file, named after its layer index (`_000.png`,
//! `_001.png`, ...). Reading and writing those files is the caller's job; this
//! module only produces the names and consumes loaded rasters.
//!
//! ```json
//! {
//!   "width": 640, "height": 480,
//!   "layers": [
//!     { "offsetX": 0, "offsetY": 0, "kind": "image", "path": "_000.png", "caption": "" },
//!     { "offsetX": 8, "offsetY": 8, "kind": "text", "text": "hi",
//!       "fontName": "Mono", "fontSize": 12, "color": "rgba(0, 0, 0, 255)" }
//!   ]
//! }
//! ```

use crate::color::Color;
use crate::layer::{Layer, LayerStack, RasterLayer, TextLayer};
use crate::raster::Raster;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the `layers` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum LayerRecord {
    Image {
        #[serde(default)]
        offset_x: isize,
        #[serde(default)]
        offset_y: isize,
        path: String,
        #[serde(default)]
        caption: String,
    },
    Text {
        #[serde(default)]
        offset_x: isize,
        #[serde(default)]
        offset_y: isize,
        text: String,
        font_name: String,
        font_size: u32,
        color: Color,
    },
}

const KNOWN_KINDS: [&str; 2] = ["image", "text"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDocument {
    pub width: usize,
    pub height: usize,
    pub layers: Vec<LayerRecord>,
}

/// Wire form before layer records are checked; keeps unknown kinds parseable.
#[derive(Deserialize)]
struct RawDocument {
    width: usize,
    height: usize,
    #[serde(default)]
    layers: Vec<Value>,
}

/// Sidecar file name for the raster layer at `index`.
pub fn sidecar_name(index: usize) -> String {
    format!("_{:03}.png", index)
}

impl ProjectDocument {
    /// Parses a project. Entries with an unrecognised `kind` are skipped with a
    /// warning; a recognised entry with bad fields is an error.
    pub fn from_json(json: &str) -> Result<ProjectDocument> {
        let raw: RawDocument = serde_json::from_str(json).context("Failed to parse project JSON")?;
        let mut layers = Vec::with_capacity(raw.layers.len());
        for (index, value) in raw.layers.into_iter().enumerate() {
            let kind = value.get("kind").and_then(Value::as_str).unwrap_or("");
            if !KNOWN_KINDS.contains(&kind) {
                warn!("Skipping project layer {} with unknown kind {:?}", index, kind);
                continue;
            }
            let record: LayerRecord = serde_json::from_value(value)
                .with_context(|| format!("Invalid project layer {}", index))?;
            layers.push(record);
        }
        debug!(
            "Parsed project {}x{} with {} layers",
            raw.width,
            raw.height,
            layers.len()
        );
        Ok(ProjectDocument {
            width: raw.width,
            height: raw.height,
            layers,
        })
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.context("Failed to serialize project")
    }

    /// Describes `stack`, returning the document and the sidecar rasters the
    /// caller must write next to it.
    pub fn from_stack(stack: &LayerStack) -> (ProjectDocument, Vec<(String, Raster)>) {
        let mut sidecars = Vec::new();
        let layers = stack
            .layers()
            .iter()
            .enumerate()
            .map(|(index, layer)| match layer {
                Layer::Raster(l) => {
                    let path = sidecar_name(index);
                    sidecars.push((path.clone(), l.raster.clone()));
                    LayerRecord::Image {
                        offset_x: l.offset_x,
                        offset_y: l.offset_y,
                        path,
                        caption: l.caption.clone(),
                    }
                }
                Layer::Text(l) => LayerRecord::Text {
                    offset_x: l.offset_x,
                    offset_y: l.offset_y,
                    text: l.text.clone(),
                    font_name: l.font_name.clone(),
                    font_size: l.font_size,
                    color: l.color,
                },
            })
            .collect();
        let doc = ProjectDocument {
            width: stack.width(),
            height: stack.height(),
            layers,
        };
        (doc, sidecars)
    }

    /// Builds a stack, asking `load_sidecar` for each image layer's raster.
    pub fn into_stack(self, mut load_sidecar: impl FnMut(&str) -> Result<Raster>) -> Result<LayerStack> {
        let mut stack = LayerStack::new(self.width, self.height);
        for record in self.layers {
            let layer = match record {
                LayerRecord::Image {
                    offset_x,
                    offset_y,
                    path,
                    caption,
                } => {
                    let raster = load_sidecar(&path)
                        .with_context(|| format!("Failed to load layer raster {}", path))?;
                    Layer::Raster(RasterLayer {
                        offset_x,
                        offset_y,
                        raster,
                        caption,
                    })
                }
                LayerRecord::Text {
                    offset_x,
                    offset_y,
                    text,
                    font_name,
                    font_size,
                    color,
                } => Layer::Text(TextLayer {
                    offset_x,
                    offset_y,
                    text,
                    font_name,
                    font_size,
                    color,
                }),
            };
            stack.push(layer);
        }
        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::collections::HashMap;
    use test_log::test;

    const SAMPLE: &str = r##"{
        "width": 4, "height": 3,
        "layers": [
            { "offsetX": 0, "offsetY": 0, "kind": "image", "path": "_000.png", "caption": "base" },
            { "offsetX": 1, "offsetY": -2, "kind": "sticker", "emoji": "x" },
            { "offsetX": 2, "offsetY": 1, "kind": "text", "text": "hi",
              "fontName": "Mono", "fontSize": 12, "color": "rgba(10, 20, 30, 40)" }
        ]
    }"##;

    #[test]
    fn test_parse_skips_unknown_kind() {
        let doc = ProjectDocument::from_json(SAMPLE).unwrap();
        assert_eq!((doc.width, doc.height), (4, 3));
        assert_eq!(doc.layers.len(), 2);
        assert_eq!(
            doc.layers[1],
            LayerRecord::Text {
                offset_x: 2,
                offset_y: 1,
                text: "hi".into(),
                font_name: "Mono".into(),
                font_size: 12,
                color: Color::new(10, 20, 30, 40),
            }
        );
    }

    #[test]
    fn test_bad_color_becomes_white() {
        let json = r#"{ "width": 1, "height": 1, "layers": [
            { "kind": "text", "text": "a", "fontName": "Mono", "fontSize": 8, "color": "teal-ish" }
        ] }"#;
        let doc = ProjectDocument::from_json(json).unwrap();
        match &doc.layers[0] {
            LayerRecord::Text { color, offset_x, .. } => {
                assert_eq!(*color, Color::WHITE);
                assert_eq!(*offset_x, 0);
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_known_kind_with_missing_fields_is_error() {
        let json = r#"{ "width": 1, "height": 1, "layers": [ { "kind": "image" } ] }"#;
        assert!(ProjectDocument::from_json(json).is_err());
        assert!(ProjectDocument::from_json("[]").is_err());
    }

    #[test]
    fn test_sidecar_names_are_zero_padded() {
        assert_eq!(sidecar_name(0), "_000.png");
        assert_eq!(sidecar_name(42), "_042.png");
        assert_eq!(sidecar_name(1234), "_1234.png");
    }

    #[test]
    fn test_stack_round_trip_through_json() {
        let mut stack = LayerStack::new(5, 5);
        stack.push(Layer::raster(Raster::filled(5, 5, Color::BLACK)));
        stack.push(Layer::text("ok", "Mono", 6, Color::new(1, 2, 3, 4)).at(-1, 2));
        stack.push(Layer::raster(Raster::filled(2, 1, Color::WHITE)).at(3, 3));

        let (doc, sidecars) = ProjectDocument::from_stack(&stack);
        let names: Vec<&str> = sidecars.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["_000.png", "_002.png"]);

        let json = doc.to_json(false).unwrap();
        assert!(json.contains(r#""kind":"text""#));
        assert!(json.contains(r#""fontName":"Mono""#));
        assert!(json.contains(r#""color":"rgba(1, 2, 3, 4)""#));

        let files: HashMap<String, Raster> = sidecars.into_iter().collect();
        let restored = ProjectDocument::from_json(&json)
            .unwrap()
            .into_stack(|path| match files.get(path) {
                Some(r) => Ok(r.clone()),
                None => bail!("missing {}", path),
            })
            .unwrap();
        assert_eq!(restored, stack);
    }

    #[test]
    fn test_missing_sidecar_is_error() {
        let doc = ProjectDocument::from_json(SAMPLE).unwrap();
        let err = doc.into_stack(|path| bail!("no file {}", path)).unwrap_err();
        assert!(format!("{:#}", err).contains("_000.png"));
    }
}
