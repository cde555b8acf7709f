//! Rasterizes a [`TreeLayout`] into a PNG.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};

use super::font;
use super::layout::{NodeShape, TreeLayout};
use crate::error::Result;

/// Largest width or height of a rendered image, in pixels.
pub const MAX_DIMENSION: i32 = 16_384;
/// Preferred pixels per layout unit. Large trees fall back to 1, and trees
/// that still do not fit are drawn below 1 with degraded labels.
pub const PREFERRED_SCALE: f32 = 2.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([33, 37, 41]);
const EDGE: Rgb<u8> = Rgb([108, 117, 125]);
const BIT_INK: Rgb<u8> = Rgb([200, 35, 51]);
const INTERNAL_FILL: Rgb<u8> = Rgb([207, 226, 255]);
const LEAF_FILL: Rgb<u8> = Rgb([209, 231, 221]);

struct Canvas {
    image: RgbImage,
    scale: f32,
    /// Side of the square painted for one layout unit, at least 1 pixel
    dot: i32,
}

impl Canvas {
    fn new(layout: &TreeLayout, scale: f32) -> Self {
        let (width, height) = image_size(layout, scale);
        Self {
            image: RgbImage::from_pixel(width, height, BACKGROUND),
            scale,
            dot: scale.ceil().max(1.0) as i32,
        }
    }

    /// Layout units to pixels.
    fn px(&self, units: i32) -> i32 {
        (units as f32 * self.scale).floor() as i32
    }

    fn plot(&mut self, x: i32, y: i32, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height()
        {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    fn square(&mut self, x: i32, y: i32, color: Rgb<u8>) {
        for ox in 0..self.dot {
            for oy in 0..self.dot {
                self.plot(x + ox, y + oy, color);
            }
        }
    }

    /// Bresenham line, one dot thick.
    fn line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb<u8>) {
        let (mut x, mut y) = (self.px(from.0), self.px(from.1));
        let (x1, y1) = (self.px(to.0), self.px(to.1));
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.square(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn disc(&mut self, center: (i32, i32), radius: i32, fill: Rgb<u8>) {
        let (cx, cy) = (self.px(center.0), self.px(center.1));
        let r = self.px(radius).max(1);
        let inner = (r - self.dot).max(0).pow(2);
        for dy in -r..=r {
            for dx in -r..=r {
                let d2 = dx * dx + dy * dy;
                if d2 <= r * r {
                    let color = if d2 > inner { INK } else { fill };
                    self.plot(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn rect(&mut self, center: (i32, i32), half: (i32, i32), fill: Rgb<u8>) {
        let d = self.dot;
        let (x0, y0) = (self.px(center.0 - half.0), self.px(center.1 - half.1));
        let (x1, y1) = (self.px(center.0 + half.0), self.px(center.1 + half.1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let border = x < x0 + d || x > x1 - d || y < y0 + d || y > y1 - d;
                self.plot(x, y, if border { INK } else { fill });
            }
        }
    }

    /// Draws lines of text centred on `center`.
    fn text(&mut self, center: (i32, i32), lines: &[String], color: Rgb<u8>) {
        let top = self.px(center.1) - self.px(font::block_height(lines.len())) / 2;
        for (i, line) in lines.iter().enumerate() {
            let left = self.px(center.0) - self.px(font::text_width(line)) / 2;
            let line_top = top + self.px(i as i32 * font::LINE_HEIGHT);
            let mut pixels = Vec::new();
            font::for_each_pixel(line, |px, py| pixels.push((px, py)));
            for (px, py) in pixels {
                self.square(left + self.px(px), line_top + self.px(py), color);
            }
        }
    }
}

/// Pixels per layout unit: [`PREFERRED_SCALE`] or 1 when the image fits in
/// [`MAX_DIMENSION`], otherwise the fraction that shrinks the longer side to
/// exactly [`MAX_DIMENSION`].
pub fn choose_scale(layout: &TreeLayout) -> f32 {
    let longest = layout.width.max(layout.height).max(1) as f32;
    [PREFERRED_SCALE, 1.0]
        .into_iter()
        .find(|s| longest * s <= MAX_DIMENSION as f32)
        .unwrap_or(MAX_DIMENSION as f32 / longest)
}

/// Image size in pixels for `layout` drawn at `scale`, clamped to
/// `1..=MAX_DIMENSION` on each side.
pub fn image_size(layout: &TreeLayout, scale: f32) -> (u32, u32) {
    let side = |units: i32| (units as f32 * scale).ceil().clamp(1.0, MAX_DIMENSION as f32) as u32;
    (side(layout.width), side(layout.height))
}

/// Draws the layout at `scale` pixels per layout unit.
pub fn rasterize(layout: &TreeLayout, scale: f32) -> RgbImage {
    let mut canvas = Canvas::new(layout, scale);

    for edge in &layout.edges {
        canvas.line(edge.start, edge.end, EDGE);
    }
    for edge in &layout.edges {
        canvas.text(edge.label_at, &[edge.bit.to_string()], BIT_INK);
    }
    for node in &layout.nodes {
        match node.shape {
            NodeShape::Disc => canvas.disc((node.x, node.y), node.half_width, INTERNAL_FILL),
            NodeShape::Box => canvas.rect(
                (node.x, node.y),
                (node.half_width, node.half_height),
                LEAF_FILL,
            ),
        }
        canvas.text((node.x, node.y), &node.label, INK);
    }

    canvas.image
}

/// Renders the layout and encodes it as PNG bytes.
pub fn render_png(layout: &TreeLayout) -> Result<Vec<u8>> {
    let scale = choose_scale(layout);
    if scale < 1.0 {
        tracing::debug!(
            "Tree layout of {}x{} drawn at scale {:.3}",
            layout.width,
            layout.height,
            scale
        );
    }
    let image = rasterize(layout, scale);

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}
