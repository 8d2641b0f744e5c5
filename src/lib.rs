// src/lib.rs

//! `canvas-core`: RGBA raster buffers, pixel filters and a layer stack that
//! flattens raster and text layers into a single image.

pub mod codec;
pub mod color;
pub mod config;
pub mod font_driver;
pub mod layer;
pub mod project;
pub mod raster;

pub use color::Color;
pub use layer::{Layer, LayerStack};
pub use raster::Raster;
