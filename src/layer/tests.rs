// src/layer/tests.rs

#[cfg(test)]
mod layer_tests {
    use crate::color::Color;
    use crate::font_driver::{FontDriver, HeadlessFontDriver};
    use crate::layer::{Layer, LayerStack};
    use crate::raster::Raster;
    use anyhow::{bail, Result};
    use test_log::test;

    const RED: Color = Color::new(255, 0, 0, 255);
    const BLUE: Color = Color::new(0, 0, 255, 255);

    /// Driver whose rasterization always fails.
    struct BrokenFontDriver;

    impl FontDriver for BrokenFontDriver {
        fn measure(&self, _text: &str, _font_name: &str, _size_px: u32) -> (usize, usize) {
            (4, 4)
        }

        fn rasterize(&self, _text: &str, _font_name: &str, _size_px: u32) -> Result<Raster> {
            bail!("no fonts here")
        }
    }

    fn red_blue_stack() -> LayerStack {
        let mut stack = LayerStack::new(4, 4);
        stack.push(Layer::raster(Raster::filled(4, 4, RED)));
        stack.push(Layer::raster(Raster::filled(2, 2, BLUE)).at(1, 1));
        stack
    }

    fn base_colors(stack: &LayerStack) -> Vec<Color> {
        stack
            .layers()
            .iter()
            .map(|l| match l {
                Layer::Raster(r) => r.raster.pixel(0, 0),
                Layer::Text(t) => t.color,
            })
            .collect()
    }

    #[test]
    fn test_bake_red_base_with_blue_square() {
        let fonts = HeadlessFontDriver::default();
        let out = red_blue_stack().bake(&fonts, None);
        assert_eq!(out.dimensions(), (4, 4));
        for y in 0..4 {
            for x in 0..4 {
                let inner = (1..=2).contains(&x) && (1..=2).contains(&y);
                let expected = if inner { BLUE } else { RED };
                assert_eq!(out.pixel(x, y), expected, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_bake_upto_one_is_base_copy() {
        let fonts = HeadlessFontDriver::default();
        let out = red_blue_stack().bake(&fonts, Some(1));
        assert_eq!(out, Raster::filled(4, 4, RED));
    }

    #[test]
    fn test_bake_upto_zero_and_empty_stack() {
        let fonts = HeadlessFontDriver::default();
        assert_eq!(red_blue_stack().bake(&fonts, Some(0)), Raster::new(4, 4));
        assert_eq!(LayerStack::new(3, 2).bake(&fonts, None), Raster::new(3, 2));
    }

    #[test]
    fn test_bake_upto_beyond_len_bakes_all() {
        let fonts = HeadlessFontDriver::default();
        let stack = red_blue_stack();
        assert_eq!(stack.bake(&fonts, Some(99)), stack.bake(&fonts, None));
    }

    #[test]
    fn test_bake_prefix_is_stable() {
        // Baking a prefix and drawing the next layer on top equals baking
        // one layer more.
        let fonts = HeadlessFontDriver::default();
        let mut stack = red_blue_stack();
        stack.push(Layer::raster(Raster::filled(3, 1, Color::new(0, 255, 0, 128))).at(-1, 2));
        stack.push(Layer::text("hi", "Mono", 4, Color::BLACK).at(0, 0));
        for k in 0..stack.len() {
            let mut prefix = stack.bake(&fonts, Some(k));
            stack.layers()[k].draw_onto(&mut prefix, &fonts);
            assert_eq!(prefix, stack.bake(&fonts, Some(k + 1)), "prefix {}", k);
        }
    }

    #[test]
    fn test_bake_offset_base_is_not_copied() {
        // A base that does not cover the canvas leaves transparent cells.
        let fonts = HeadlessFontDriver::default();
        let mut stack = LayerStack::new(3, 3);
        stack.push(Layer::raster(Raster::filled(3, 3, RED)).at(1, 0));
        let out = stack.bake(&fonts, None);
        assert_eq!(out.pixel(0, 0), Color::TRANSPARENT);
        assert_eq!(out.pixel(1, 0), RED);
    }

    #[test]
    fn test_bake_does_not_mutate_stack() {
        let fonts = HeadlessFontDriver::default();
        let stack = red_blue_stack();
        let before = stack.clone();
        let _ = stack.bake(&fonts, None);
        assert_eq!(stack, before);
    }

    #[test]
    fn test_text_layer_is_tinted() {
        let fonts = HeadlessFontDriver::default();
        let layer = Layer::text("x", "Mono", 10, BLUE);
        let (w, h) = layer.size(&fonts);
        let mut canvas = Raster::filled(w, h, Color::WHITE);
        layer.draw_onto(&mut canvas, &fonts);
        assert_eq!(canvas.pixel(w / 2, h / 2), BLUE);
        assert_eq!(canvas.pixel(0, 0), Color::WHITE);
    }

    #[test]
    fn test_text_layer_failure_draws_nothing() {
        let layer = Layer::text("x", "Missing", 10, BLUE);
        let mut canvas = Raster::filled(4, 4, RED);
        layer.draw_onto(&mut canvas, &BrokenFontDriver);
        assert_eq!(canvas, Raster::filled(4, 4, RED));
        assert_eq!(layer.size(&BrokenFontDriver), (4, 4));
    }

    #[test]
    fn test_layer_offsets_clip() {
        let fonts = HeadlessFontDriver::default();
        let layer = Layer::raster(Raster::filled(2, 2, BLUE)).at(-1, 3);
        let mut canvas = Raster::new(4, 4);
        layer.draw_onto(&mut canvas, &fonts);
        assert_eq!(canvas.pixel(0, 3), BLUE);
        assert_eq!(canvas.pixel(1, 3), Color::TRANSPARENT);
        assert_eq!(layer.offset(), (-1, 3));
    }

    fn shade(i: u8) -> Color {
        Color::rgb(i, i, i)
    }

    fn four_layer_stack() -> LayerStack {
        let mut stack = LayerStack::new(1, 1);
        for i in 0..4u8 {
            stack.push(Layer::raster(Raster::filled(1, 1, shade(i))));
        }
        stack
    }

    #[test]
    fn test_move_one_up_and_down() {
        let mut stack = four_layer_stack();
        assert_eq!(stack.move_one_up(1), 2);
        assert_eq!(base_colors(&stack), [0, 2, 1, 3].map(shade));
        assert_eq!(stack.move_one_down(2), 1);
        assert_eq!(base_colors(&stack), [0, 1, 2, 3].map(shade));
    }

    #[test]
    fn test_move_at_extremes_is_noop() {
        let mut stack = four_layer_stack();
        assert_eq!(stack.move_one_up(3), 3);
        assert_eq!(stack.move_one_down(0), 0);
        assert_eq!(stack.move_fully_up(3), 3);
        assert_eq!(stack.move_fully_down(0), 0);
        assert_eq!(stack.move_one_up(17), 17);
        assert_eq!(base_colors(&stack), [0, 1, 2, 3].map(shade));
    }

    #[test]
    fn test_move_fully_keeps_relative_order() {
        let mut stack = four_layer_stack();
        assert_eq!(stack.move_fully_up(0), 3);
        assert_eq!(base_colors(&stack), [1, 2, 3, 0].map(shade));
        assert_eq!(stack.move_fully_down(2), 0);
        assert_eq!(base_colors(&stack), [3, 1, 2, 0].map(shade));
    }

    #[test]
    fn test_insert_replace_remove() {
        let mut stack = four_layer_stack();
        assert_eq!(stack.insert(99, Layer::raster(Raster::filled(1, 1, RED))), 4);
        assert_eq!(stack.len(), 5);
        let old = stack.replace(0, Layer::raster(Raster::filled(1, 1, BLUE)));
        assert!(matches!(old, Some(Layer::Raster(_))));
        assert!(stack.replace(10, Layer::raster(Raster::new(1, 1))).is_none());
        assert!(stack.remove(10).is_none());
        assert!(stack.remove(4).is_some());
        assert_eq!(base_colors(&stack), [BLUE, shade(1), shade(2), shade(3)]);
    }

    #[test]
    fn test_set_canvas_size_changes_bake_extent() {
        let fonts = HeadlessFontDriver::default();
        let mut stack = red_blue_stack();
        stack.set_canvas_size(2, 2);
        let out = stack.bake(&fonts, None);
        assert_eq!(out.dimensions(), (2, 2));
        assert_eq!(out.pixel(0, 0), RED);
        assert_eq!(out.pixel(1, 1), BLUE);
    }
}
