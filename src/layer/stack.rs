// src/layer/stack.rs

//! `LayerStack`: a canvas size plus an ordered list of layers.
//!
//! Index 0 is the bottom layer; higher indices draw later and sit on top.
//! The stack never caches flattened pixels. `bake` recomputes them on every
//! call and never mutates the stack.

use super::Layer;
use crate::font_driver::FontDriver;
use crate::raster::Raster;
use log::{debug, trace};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerStack {
    width: usize,
    height: usize,
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
        }
    }

    pub fn with_layers(width: usize, height: usize, layers: Vec<Layer>) -> Self {
        Self {
            width,
            height,
            layers,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Changes the declared canvas size; layers are untouched.
    pub fn set_canvas_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Adds a layer on top.
    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Inserts at `index`, clamped to the current length. Returns the index used.
    pub fn insert(&mut self, index: usize, layer: Layer) -> usize {
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
        index
    }

    /// Swaps in `layer` at `index`, returning the old one; `None` (and no
    /// change) when `index` is out of range.
    pub fn replace(&mut self, index: usize, layer: Layer) -> Option<Layer> {
        self.layers
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, layer))
    }

    pub fn remove(&mut self, index: usize) -> Option<Layer> {
        if index < self.layers.len() {
            Some(self.layers.remove(index))
        } else {
            None
        }
    }

    /// Removes the layer at `from` and reinserts it at `to`.
    fn move_layer(&mut self, from: usize, to: usize) -> usize {
        if from >= self.layers.len() || from == to {
            return from;
        }
        let layer = self.layers.remove(from);
        let to = to.min(self.layers.len());
        self.layers.insert(to, layer);
        trace!("move_layer: {} -> {}", from, to);
        to
    }

    /// One step towards the top. Returns the layer's new index.
    pub fn move_one_up(&mut self, index: usize) -> usize {
        if index + 1 >= self.layers.len() {
            return index;
        }
        self.move_layer(index, index + 1)
    }

    /// One step towards the bottom. Returns the layer's new index.
    pub fn move_one_down(&mut self, index: usize) -> usize {
        if index == 0 || index >= self.layers.len() {
            return index;
        }
        self.move_layer(index, index - 1)
    }

    /// To the very top. Returns the layer's new index.
    pub fn move_fully_up(&mut self, index: usize) -> usize {
        match self.layers.len() {
            0 => index,
            len => self.move_layer(index, len - 1),
        }
    }

    /// To the very bottom. Returns the layer's new index.
    pub fn move_fully_down(&mut self, index: usize) -> usize {
        self.move_layer(index, 0)
    }

    /// Flattens layers `0..min(len, upto)` bottom to top onto a canvas of the
    /// declared size. `None` bakes every layer.
    pub fn bake(&self, fonts: &dyn FontDriver, upto: Option<usize>) -> Raster {
        let count = upto.map_or(self.layers.len(), |u| u.min(self.layers.len()));

        if count == 0 {
            trace!("bake: no layers, transparent {}x{}", self.width, self.height);
            return Raster::new(self.width, self.height);
        }

        let base = self.layers[0].as_canvas_raster(self.width, self.height);
        if count == 1 {
            if let Some(raster) = base {
                trace!("bake: single canvas-sized raster layer, copying");
                return raster.clone();
            }
        }

        let (mut canvas, first) = match base {
            Some(raster) => (raster.clone(), 1),
            None => (Raster::new(self.width, self.height), 0),
        };
        debug!(
            "bake: {}x{} canvas, drawing layers {}..{}",
            self.width, self.height, first, count
        );
        for layer in &self.layers[first..count] {
            layer.draw_onto(&mut canvas, fonts);
        }
        canvas
    }
}
