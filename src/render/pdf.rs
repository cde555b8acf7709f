//! PDF export of a [`TreeLayout`].
//!
//! Writes a self-contained PDF 1.4 file with vector drawing and the built-in
//! Helvetica font. Pages are A4 landscape. The drawing is scaled down to fit
//! one page, but never below `min_scale`; past that it is tiled over a grid
//! of pages, each clipped to its own tile. No timestamps are written, so a
//! layout always produces the same bytes.

use std::io::Write;

use super::layout::{LayoutNode, NodeShape, TreeLayout};
use crate::error::Result;

pub const PAGE_WIDTH: f32 = 842.0;
pub const PAGE_HEIGHT: f32 = 595.0;
pub const PAGE_MARGIN: f32 = 36.0;
pub const HEADER_HEIGHT: f32 = 28.0;
pub const DEFAULT_MIN_SCALE: f32 = 0.5;

/// Bezier handle length for a quarter circle.
const KAPPA: f32 = 0.552_284_8;
/// Average Helvetica glyph width relative to the font size.
const HELVETICA_WIDTH: f32 = 0.556;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGrid {
    pub scale: f32,
    pub columns: usize,
    pub rows: usize,
}

impl PageGrid {
    pub fn pages(&self) -> usize {
        self.columns * self.rows
    }
}

fn usable_area() -> (f32, f32) {
    (
        PAGE_WIDTH - 2.0 * PAGE_MARGIN,
        PAGE_HEIGHT - 2.0 * PAGE_MARGIN - HEADER_HEIGHT,
    )
}

/// Works out the drawing scale and how many pages the layout spans.
pub fn plan_pages(layout: &TreeLayout, min_scale: f32) -> PageGrid {
    let (usable_w, usable_h) = usable_area();
    let fit = (usable_w / layout.width as f32)
        .min(usable_h / layout.height as f32)
        .min(1.0);
    let scale = fit.max(min_scale.min(1.0));

    PageGrid {
        scale,
        columns: tiles(layout.width as f32 * scale, usable_w),
        rows: tiles(layout.height as f32 * scale, usable_h),
    }
}

/// Number of `span`-sized tiles covering `extent`, tolerating float noise
/// when the drawing was scaled to fit exactly.
fn tiles(extent: f32, span: f32) -> usize {
    ((extent / span) - 1e-3).ceil().max(1.0) as usize
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Maps layout coordinates onto one page tile.
struct Tile {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl Tile {
    fn new(grid: &PageGrid, column: usize, row: usize) -> Self {
        let (usable_w, usable_h) = usable_area();
        Self {
            scale: grid.scale,
            offset_x: column as f32 * usable_w,
            offset_y: row as f32 * usable_h,
        }
    }

    fn point(&self, x: i32, y: i32) -> (f32, f32) {
        let (_, usable_h) = usable_area();
        (
            PAGE_MARGIN + x as f32 * self.scale - self.offset_x,
            PAGE_MARGIN + usable_h - (y as f32 * self.scale - self.offset_y),
        )
    }

    fn len(&self, units: i32) -> f32 {
        units as f32 * self.scale
    }

    fn shows(&self, node: &LayoutNode) -> bool {
        let (usable_w, usable_h) = usable_area();
        let (x, y) = self.point(node.x, node.y);
        let (hw, hh) = (self.len(node.half_width), self.len(node.half_height));
        x + hw >= PAGE_MARGIN
            && x - hw <= PAGE_MARGIN + usable_w
            && y + hh >= PAGE_MARGIN
            && y - hh <= PAGE_MARGIN + usable_h
    }
}

fn text_line(out: &mut String, x: f32, y: f32, size: f32, text: &str) {
    out.push_str(&format!(
        "BT /F1 {:.2} Tf {:.2} {:.2} Td ({}) Tj ET\n",
        size,
        x,
        y,
        escape(text)
    ));
}

/// Centred block of lines around `(cx, cy)`.
fn centered_text(out: &mut String, cx: f32, cy: f32, size: f32, lines: &[String]) {
    let leading = size * 1.2;
    let block = leading * (lines.len() as f32 - 1.0) + size * 0.7;
    let mut baseline = cy + block / 2.0 - size * 0.7;
    for line in lines {
        let width = line.chars().count() as f32 * size * HELVETICA_WIDTH;
        text_line(out, cx - width / 2.0, baseline, size, line);
        baseline -= leading;
    }
}

fn circle(out: &mut String, cx: f32, cy: f32, r: f32) {
    let k = r * KAPPA;
    out.push_str(&format!("{:.2} {:.2} m\n", cx + r, cy));
    out.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        cx + r, cy + k, cx + k, cy + r, cx, cy + r
    ));
    out.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        cx - k, cy + r, cx - r, cy + k, cx - r, cy
    ));
    out.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        cx - r, cy - k, cx - k, cy - r, cx, cy - r
    ));
    out.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        cx + k, cy - r, cx + r, cy - k, cx + r, cy
    ));
}

fn page_content(layout: &TreeLayout, grid: &PageGrid, column: usize, row: usize, header: &str) -> String {
    let tile = Tile::new(grid, column, row);
    let (usable_w, usable_h) = usable_area();
    let page_number = row * grid.columns + column + 1;
    let mut out = String::new();

    out.push_str("0.13 0.15 0.16 rg\n");
    let title = format!("{} - page {} of {}", header, page_number, grid.pages());
    text_line(&mut out, PAGE_MARGIN, PAGE_HEIGHT - PAGE_MARGIN - 12.0, 12.0, &title);

    out.push_str("q\n");
    out.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} re W n\n",
        PAGE_MARGIN, PAGE_MARGIN, usable_w, usable_h
    ));

    let font_size = 8.0 * grid.scale;

    out.push_str(&format!("0.42 0.46 0.49 RG {:.2} w\n", (1.2 * grid.scale).max(0.3)));
    for edge in &layout.edges {
        let (x0, y0) = tile.point(edge.start.0, edge.start.1);
        let (x1, y1) = tile.point(edge.end.0, edge.end.1);
        out.push_str(&format!("{:.2} {:.2} m {:.2} {:.2} l S\n", x0, y0, x1, y1));
    }
    out.push_str("0.78 0.14 0.20 rg\n");
    for edge in &layout.edges {
        let (x, y) = tile.point(edge.label_at.0, edge.label_at.1);
        centered_text(&mut out, x, y, font_size, &[edge.bit.to_string()]);
    }

    out.push_str(&format!("0.13 0.15 0.16 RG {:.2} w\n", (0.8 * grid.scale).max(0.3)));
    for node in layout.nodes.iter().filter(|n| tile.shows(n)) {
        let (x, y) = tile.point(node.x, node.y);
        match node.shape {
            NodeShape::Disc => {
                out.push_str("0.81 0.89 1.00 rg\n");
                circle(&mut out, x, y, tile.len(node.half_width));
                out.push_str("B\n");
            }
            NodeShape::Box => {
                let (hw, hh) = (tile.len(node.half_width), tile.len(node.half_height));
                out.push_str("0.82 0.91 0.87 rg\n");
                out.push_str(&format!(
                    "{:.2} {:.2} {:.2} {:.2} re B\n",
                    x - hw,
                    y - hh,
                    2.0 * hw,
                    2.0 * hh
                ));
            }
        }
        out.push_str("0.13 0.15 0.16 rg\n");
        centered_text(&mut out, x, y, font_size, &node.label);
    }

    out.push_str("Q\n");
    out
}

/// Renders the layout as a PDF whose pages carry `header` at the top.
pub fn export_pdf(layout: &TreeLayout, header: &str, min_scale: f32) -> Result<Vec<u8>> {
    let grid = plan_pages(layout, min_scale);
    let page_count = grid.pages();

    // 1: catalog, 2: page tree, 3: font, 4: info, then a page and its
    // content stream for every page.
    let page_ids: Vec<usize> = (0..page_count).map(|i| 5 + 2 * i).collect();
    let mut objects: Vec<Vec<u8>> = Vec::with_capacity(4 + 2 * page_count);

    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{} 0 R", id)).collect();
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        )
        .into_bytes(),
    );
    objects.push(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    );
    objects.push(
        format!(
            "<< /Title ({}) /Producer (huffman-service {}) >>",
            escape(header),
            env!("CARGO_PKG_VERSION")
        )
        .into_bytes(),
    );

    for row in 0..grid.rows {
        for column in 0..grid.columns {
            let content_id = page_ids[row * grid.columns + column] + 1;
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                    PAGE_WIDTH, PAGE_HEIGHT, content_id
                )
                .into_bytes(),
            );

            let content = page_content(layout, &grid, column, row, header);
            let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
            stream.extend_from_slice(content.as_bytes());
            stream.extend_from_slice(b"\nendstream");
            objects.push(stream);
        }
    }

    let mut pdf: Vec<u8> = Vec::new();
    pdf.write_all(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        writeln!(pdf, "{} 0 obj", i + 1)?;
        pdf.write_all(body)?;
        pdf.write_all(b"\nendobj\n")?;
    }

    let xref_at = pdf.len();
    write!(pdf, "xref\n0 {}\n", objects.len() + 1)?;
    pdf.write_all(b"0000000000 65535 f \n")?;
    for offset in &offsets {
        write!(pdf, "{:010} 00000 n \n", offset)?;
    }
    write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R /Info 4 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    )?;

    Ok(pdf)
}
