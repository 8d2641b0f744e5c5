use std::collections::HashMap;

use anyhow::bail;
use canvas_core::codec::{self, PnmFormat};
use canvas_core::config::ExportFormat;
use canvas_core::font_driver::HeadlessFontDriver;
use canvas_core::project::ProjectDocument;
use canvas_core::{Color, Layer, LayerStack, Raster};

const RED: Color = Color::new(255, 0, 0, 255);
const BLUE: Color = Color::new(0, 0, 255, 255);

#[test]
fn test_project_bakes_like_the_stack_it_came_from() {
    let fonts = HeadlessFontDriver::default();
    let mut stack = LayerStack::new(6, 6);
    stack.push(Layer::raster(Raster::filled(6, 6, RED)));
    stack.push(Layer::raster(Raster::filled(2, 2, BLUE)).at(1, 1));
    stack.push(Layer::text("a", "Mono", 5, Color::new(0, 255, 0, 200)).at(3, 0));

    let (doc, sidecars) = ProjectDocument::from_stack(&stack);
    // Sidecars travel as PNG bytes, the way the CLI stores them.
    let files: HashMap<String, Vec<u8>> = sidecars
        .into_iter()
        .map(|(name, raster)| (name, codec::encode(&raster, ExportFormat::Png).unwrap()))
        .collect();
    let json = doc.to_json(true).unwrap();

    let restored = ProjectDocument::from_json(&json)
        .unwrap()
        .into_stack(|name| match files.get(name) {
            Some(bytes) => codec::decode(bytes),
            None => bail!("missing sidecar {}", name),
        })
        .unwrap();

    for upto in [None, Some(0), Some(1), Some(2)] {
        assert_eq!(
            restored.bake(&fonts, upto),
            stack.bake(&fonts, upto),
            "upto {:?}",
            upto
        );
    }
}

#[test]
fn test_reordering_changes_what_is_on_top() {
    let fonts = HeadlessFontDriver::default();
    let mut stack = LayerStack::new(4, 4);
    stack.push(Layer::raster(Raster::filled(4, 4, RED)));
    stack.push(Layer::raster(Raster::filled(2, 2, BLUE)).at(1, 1));

    assert_eq!(stack.bake(&fonts, None).pixel(1, 1), BLUE);
    assert_eq!(stack.move_fully_down(1), 0);
    let out = stack.bake(&fonts, None);
    assert_eq!(out.pixel(1, 1), RED);
    assert!(out.pixels().iter().all(|&c| c == RED));
}

#[test]
fn test_baked_image_survives_netpbm() {
    let fonts = HeadlessFontDriver::default();
    let mut stack = LayerStack::new(4, 4);
    stack.push(Layer::raster(Raster::filled(4, 4, RED)));
    stack.push(Layer::raster(Raster::filled(2, 2, BLUE)).at(1, 1));
    let flat = stack.bake(&fonts, None);

    let decoded = codec::decode(&codec::pnm::encode(&flat, PnmFormat::Ppm)).unwrap();
    assert_eq!(decoded, flat);

    let mask = codec::decode(&codec::pnm::encode(&flat, PnmFormat::Pbm)).unwrap();
    // Red and blue both read as dark.
    assert!(mask.pixels().iter().all(|&c| c == Color::BLACK));
}

#[test]
fn test_unknown_layer_kinds_are_skipped_end_to_end() {
    let fonts = HeadlessFontDriver::default();
    let json = r##"{
        "width": 2, "height": 2,
        "layers": [
            { "kind": "hologram", "offsetX": 0, "offsetY": 0 },
            { "kind": "text", "offsetX": 0, "offsetY": 0, "text": "", "fontName": "Mono",
              "fontSize": 8, "color": "#00ff00" }
        ]
    }"##;
    let stack = ProjectDocument::from_json(json)
        .unwrap()
        .into_stack(|name| bail!("no sidecars expected, asked for {}", name))
        .unwrap();
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.bake(&fonts, None), Raster::new(2, 2));
}
