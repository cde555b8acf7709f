//! Integration tests for PNG and PDF rendering of whole trees.

use huffman_service::render::{self, raster, TreeLayout, DEFAULT_MIN_SCALE};
use huffman_service::HuffmanTree;

fn layout(text: &str) -> TreeLayout {
    TreeLayout::compute(&HuffmanTree::from_text(text).unwrap())
}

/// A text with one occurrence of every printable ASCII and Latin-1 symbol.
fn wide_text() -> String {
    ('!'..='~').chain('¡'..='ÿ').collect()
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

mod png {
    use super::*;

    #[test]
    fn test_png_decodes_with_layout_size() {
        let layout = layout("abracadabra");
        let bytes = render::render_png(&layout).unwrap();

        let image = image::load_from_memory(&bytes).unwrap();
        assert_eq!(raster::choose_scale(&layout), raster::PREFERRED_SCALE);
        assert_eq!(image.width(), layout.width as u32 * 2);
        assert_eq!(image.height(), layout.height as u32 * 2);
    }

    #[test]
    fn test_all_printable_ascii_renders() {
        let text: String = ('!'..='~').collect();
        let layout = layout(&text);
        let bytes = render::render_png(&layout).unwrap();

        let image = image::load_from_memory(&bytes).unwrap();
        assert!(image.width() <= raster::MAX_DIMENSION as u32);
        assert!(image.height() <= raster::MAX_DIMENSION as u32);
    }

    #[test]
    fn test_oversized_tree_is_scaled_down() {
        let layout = layout(&wide_text());
        assert!(layout.width > raster::MAX_DIMENSION);
        let bytes = render::render_png(&layout).unwrap();

        let image = image::load_from_memory(&bytes).unwrap();
        assert_eq!(image.width(), raster::MAX_DIMENSION as u32);
        assert!(image.height() > 0 && image.height() < layout.height as u32);
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = HuffmanTree::from_text("aaaa").unwrap();
        let bytes = render::tree_png(&tree).unwrap();
        let image = image::load_from_memory(&bytes).unwrap();
        assert!(image.width() > 0 && image.height() > 0);
    }
}

mod pdf {
    use super::*;

    #[test]
    fn test_pdf_is_well_formed() {
        let tree = HuffmanTree::from_text("hello world").unwrap();
        let bytes = render::tree_pdf(&tree, "session-42", DEFAULT_MIN_SCALE).unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert_eq!(count(&bytes, b"/Type /Page "), 1);
        assert_eq!(count(&bytes, b"session-42"), 2, "title and page header");
        assert_eq!(count(&bytes, b"page 1 of 1"), 1);
    }

    #[test]
    fn test_wide_tree_paginates() {
        let layout = layout(&wide_text());
        let grid = render::plan_pages(&layout, DEFAULT_MIN_SCALE);
        assert!(grid.pages() > 1);
        assert_eq!(grid.scale, DEFAULT_MIN_SCALE);

        let bytes = render::export_pdf(&layout, "wide", DEFAULT_MIN_SCALE).unwrap();
        assert_eq!(count(&bytes, b"/Type /Page "), grid.pages());
        let pages = format!("/Count {} ", grid.pages());
        assert_eq!(count(&bytes, pages.as_bytes()), 1);
    }

    #[test]
    fn test_lower_min_scale_uses_fewer_pages() {
        let layout = layout(&wide_text());
        let default = render::plan_pages(&layout, DEFAULT_MIN_SCALE);
        let small = render::plan_pages(&layout, 0.1);
        assert!(small.pages() <= default.pages());
        assert!(small.scale < default.scale);
    }

    #[test]
    fn test_pdf_is_deterministic() {
        let tree = HuffmanTree::from_text("same input, same bytes").unwrap();
        let a = render::tree_pdf(&tree, "s", DEFAULT_MIN_SCALE).unwrap();
        let b = render::tree_pdf(&tree, "s", DEFAULT_MIN_SCALE).unwrap();
        assert_eq!(a, b);
    }
}
