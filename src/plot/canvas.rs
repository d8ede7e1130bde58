//! Pixel drawing primitives over an RGB image.

use image::{Rgb, RgbImage};

use super::font::{GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH, glyph, is_set, text_width};

/// Filled circle style with an outline ring.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Marker {
    pub(crate) radius: f64,
    pub(crate) fill: Rgb<u8>,
    pub(crate) edge: Rgb<u8>,
    pub(crate) edge_width: f64,
    pub(crate) alpha: f32,
}

pub(crate) struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub(crate) fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Self {
            image: RgbImage::from_pixel(width.max(1), height.max(1), background),
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.image.width()
    }

    pub(crate) fn height(&self) -> u32 {
        self.image.height()
    }

    pub(crate) fn into_image(self) -> RgbImage {
        self.image
    }

    /// Mix `color` into the pixel at `(x, y)` with opacity `alpha`; off-canvas writes are dropped.
    pub(crate) fn blend(&mut self, x: i64, y: i64, color: Rgb<u8>, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        for (dst, src) in pixel.0.iter_mut().zip(color.0) {
            let mixed = *dst as f32 * (1.0 - alpha) + src as f32 * alpha;
            *dst = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }

    pub(crate) fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: Rgb<u8>) {
        for py in y..y + height {
            for px in x..x + width {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    pub(crate) fn hline(&mut self, x0: i64, x1: i64, y: i64, thickness: i64, color: Rgb<u8>) {
        let (start, end) = (x0.min(x1), x0.max(x1));
        self.fill_rect(start, y - thickness / 2, end - start + 1, thickness, color);
    }

    pub(crate) fn vline(&mut self, x: i64, y0: i64, y1: i64, thickness: i64, color: Rgb<u8>) {
        let (start, end) = (y0.min(y1), y0.max(y1));
        self.fill_rect(x - thickness / 2, start, thickness, end - start + 1, color);
    }

    pub(crate) fn disc(&mut self, cx: f64, cy: f64, marker: Marker) {
        let Marker {
            radius,
            fill,
            edge,
            edge_width,
            alpha,
        } = marker;
        let reach = radius.ceil() as i64 + 1;
        let (ox, oy) = (cx.round() as i64, cy.round() as i64);
        for py in oy - reach..=oy + reach {
            for px in ox - reach..=ox + reach {
                let dx = px as f64 - cx;
                let dy = py as f64 - cy;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance > radius {
                    continue;
                }
                let color = if distance > radius - edge_width {
                    edge
                } else {
                    fill
                };
                self.blend(px, py, color, alpha);
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub(crate) fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>, alpha: f32) {
        let scale = scale.max(1) as i64;
        for (index, c) in text.chars().enumerate() {
            let glyph = glyph(c);
            let origin = x + index as i64 * GLYPH_ADVANCE as i64 * scale;
            for gy in 0..GLYPH_HEIGHT {
                for gx in 0..GLYPH_WIDTH {
                    if !is_set(&glyph, gx, gy) {
                        continue;
                    }
                    let px = origin + gx as i64 * scale;
                    let py = y + gy as i64 * scale;
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.blend(px + sx, py + sy, color, alpha);
                        }
                    }
                }
            }
        }
    }

    /// Draw `text` horizontally centred on `cx`.
    pub(crate) fn text_centered(&mut self, cx: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let width = text_width(text, scale) as i64;
        self.text(cx - width / 2, y, text, scale, color, 1.0);
    }

    /// Draw `text` rotated a quarter turn counter-clockwise, reading bottom to
    /// top and centred vertically on `cy`, with its glyph tops at column `x`.
    pub(crate) fn text_vertical(&mut self, x: i64, cy: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let scale_i = scale.max(1) as i64;
        let bottom = cy + text_width(text, scale) as i64 / 2;
        for (index, c) in text.chars().enumerate() {
            let glyph = glyph(c);
            let advance = index as i64 * GLYPH_ADVANCE as i64;
            for gy in 0..GLYPH_HEIGHT {
                for gx in 0..GLYPH_WIDTH {
                    if !is_set(&glyph, gx, gy) {
                        continue;
                    }
                    let px = x + gy as i64 * scale_i;
                    let py = bottom - (advance + gx as i64 + 1) * scale_i;
                    self.fill_rect(px, py, scale_i, scale_i, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    #[test]
    fn off_canvas_writes_are_ignored() {
        let mut canvas = Canvas::new(4, 4, WHITE);
        canvas.blend(-1, 0, BLACK, 1.0);
        canvas.blend(4, 4, BLACK, 1.0);
        canvas.fill_rect(2, 2, 10, 10, BLACK);
        let image = canvas.into_image();
        assert_eq!(*image.get_pixel(0, 0), WHITE);
        assert_eq!(*image.get_pixel(3, 3), BLACK);
    }

    #[test]
    fn blending_mixes_towards_colour() {
        let mut canvas = Canvas::new(1, 1, WHITE);
        canvas.blend(0, 0, BLACK, 0.5);
        let image = canvas.into_image();
        assert_eq!(image.get_pixel(0, 0).0, [128, 128, 128]);
    }

    #[test]
    fn disc_has_edge_ring_and_fill() {
        let mut canvas = Canvas::new(21, 21, WHITE);
        let red = Rgb([200, 0, 0]);
        let grey = Rgb([90, 90, 90]);
        let marker = Marker {
            radius: 8.0,
            fill: red,
            edge: grey,
            edge_width: 2.0,
            alpha: 1.0,
        };
        canvas.disc(10.0, 10.0, marker);
        let image = canvas.into_image();
        assert_eq!(*image.get_pixel(10, 10), red);
        assert_eq!(*image.get_pixel(10, 3), grey);
        assert_eq!(*image.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn text_sets_pixels_inside_its_box_only() {
        let mut canvas = Canvas::new(40, 20, WHITE);
        canvas.text(2, 2, "HI", 2, BLACK, 1.0);
        let image = canvas.into_image();
        let inked: Vec<(u32, u32)> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == BLACK)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());
        let width = text_width("HI", 2);
        assert!(inked.iter().all(|&(x, y)| (2..2 + width).contains(&x) && (2..16).contains(&y)));
    }

    #[test]
    fn vertical_text_runs_upwards() {
        let mut canvas = Canvas::new(20, 60, WHITE);
        canvas.text_vertical(2, 30, "L", 1, BLACK);
        let image = canvas.into_image();
        // The L stem is glyph column 0, drawn as the bottom row of the rotated glyph.
        let stem_row = 30 + text_width("L", 1) as u32 / 2 - 1;
        for x in 2..9 {
            assert_eq!(*image.get_pixel(x, stem_row), BLACK, "x {x}");
        }
    }
}
