//! Text shaping and rasterization.
//!
//! Text goes through usvg: each run is wrapped in a tiny SVG document, laid
//! out against the shared font database and rendered with resvg onto the
//! banner canvas. The same path measures widths for layout.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use tiny_skia::{PixmapMut, Transform};
use tracing::{info, warn};
use usvg::fontdb;

use super::draw::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// One run of text in a single style.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f32,
    pub weight: Weight,
    pub color: Rgba,
    pub align: Align,
}

impl TextStyle {
    pub fn new(size: f32, color: Rgba) -> Self {
        Self {
            size,
            weight: Weight::Regular,
            color,
            align: Align::Left,
        }
    }

    pub fn bold(self) -> Self {
        Self {
            weight: Weight::Bold,
            ..self
        }
    }

    pub fn centered(self) -> Self {
        Self {
            align: Align::Center,
            ..self
        }
    }
}

/// Width of a text run in pixels.
pub trait TextMeasure {
    fn measure(&self, text: &str, size: f32, weight: Weight) -> f32;
}

#[derive(Debug, thiserror::Error)]
#[error("text layout failed: {0}")]
pub struct TextError(#[from] usvg::Error);

/// Font database plus the family name every banner text uses.
pub struct FontBook {
    fontdb: Arc<fontdb::Database>,
    family: String,
}

impl FontBook {
    /// Load system fonts and, if `font_path` points at a readable font file,
    /// register it and use its family for all banner text.
    pub fn load(font_path: &str, loaded_label: &str) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let mut family = "sans-serif".to_string();
        if !font_path.is_empty() && Path::new(font_path).exists() {
            let before = db.len();
            match db.load_font_file(font_path) {
                Ok(()) if db.len() > before => {
                    if let Some((name, _)) = db.faces().last().and_then(|f| f.families.first()) {
                        info!(path = %font_path, family = %name, "{}", loaded_label);
                        family = name.clone();
                    }
                }
                Ok(()) => warn!(path = %font_path, "font file contained no usable faces"),
                Err(e) => warn!(path = %font_path, error = %e, "failed to load font file"),
            }
        }

        Self {
            fontdb: Arc::new(db),
            family,
        }
    }

    /// A book with no faces at all. Text draws nothing and widths are estimated.
    pub fn empty() -> Self {
        Self {
            fontdb: Arc::new(fontdb::Database::new()),
            family: "sans-serif".to_string(),
        }
    }

    /// Number of font faces available for layout.
    pub fn face_count(&self) -> usize {
        self.fontdb.len()
    }

    fn options(&self) -> usvg::Options<'static> {
        usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        }
    }

    fn svg_document(&self, width: f32, height: f32, x: f32, y: f32, text: &str, style: &TextStyle) -> String {
        let mut svg = String::with_capacity(256 + text.len());
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">"#
        );
        let anchor = match style.align {
            Align::Left => "start",
            Align::Center => "middle",
        };
        let weight = match style.weight {
            Weight::Regular => "normal",
            Weight::Bold => "bold",
        };
        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y}" font-family="{family}, sans-serif" font-size="{size}" font-weight="{weight}" text-anchor="{anchor}" fill="{fill}" fill-opacity="{opacity}" xml:space="preserve">{body}</text></svg>"#,
            family = escape_xml(&quote_family(&self.family)),
            size = style.size,
            fill = style.color.svg_rgb(),
            opacity = style.color.a,
            body = escape_xml(text),
        );
        svg
    }

    /// Draw `text` with its baseline at `y` onto `target`.
    pub fn draw(
        &self,
        target: &mut PixmapMut<'_>,
        x: f32,
        y: f32,
        text: &str,
        style: &TextStyle,
    ) -> Result<(), TextError> {
        if text.is_empty() {
            return Ok(());
        }
        let svg = self.svg_document(
            target.width() as f32,
            target.height() as f32,
            x,
            y,
            text,
            style,
        );
        let tree = usvg::Tree::from_str(&svg, &self.options())?;
        resvg::render(&tree, Transform::identity(), target);
        Ok(())
    }
}

impl TextMeasure for FontBook {
    fn measure(&self, text: &str, size: f32, weight: Weight) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let style = TextStyle {
            size,
            weight,
            color: Rgba::WHITE,
            align: Align::Left,
        };
        let svg = self.svg_document(1.0, 1.0, 0.0, size, text, &style);
        match usvg::Tree::from_str(&svg, &self.options()) {
            Ok(tree) if tree.root().has_children() => tree.root().abs_bounding_box().width(),
            // no glyphs available: approximate so layout still progresses
            _ => text.chars().count() as f32 * size * 0.55,
        }
    }
}

fn quote_family(family: &str) -> String {
    if family.contains(' ') {
        format!("'{}'", family)
    } else {
        family.to_string()
    }
}

/// Escape text for use in SVG character data and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(escape_xml("tab\there"), "tab here");
        assert_eq!(escape_xml("Ünïcødé ★"), "Ünïcødé ★");
    }

    #[test]
    fn test_quote_family() {
        assert_eq!(quote_family("sans-serif"), "sans-serif");
        assert_eq!(quote_family("Open Sans"), "'Open Sans'");
    }

    #[test]
    fn test_svg_document_escapes_user_text() {
        let fonts = FontBook::empty();
        let style = TextStyle::new(12.0, Rgba::WHITE).bold().centered();
        let svg = fonts.svg_document(100.0, 50.0, 10.0, 20.0, "<script>", &style);
        assert!(svg.contains("&lt;script&gt;"));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(usvg::Tree::from_str(&svg, &fonts.options()).is_ok());
    }

    #[test]
    fn test_measure_with_system_fonts() {
        let fonts = FontBook::load("", "font loaded");
        if fonts.face_count() == 0 {
            eprintln!("no system fonts installed, skipping glyph measurement check");
            return;
        }

        // the run is laid out as real glyph outlines, not estimated
        let style = TextStyle::new(12.0, Rgba::WHITE);
        let svg = fonts.svg_document(1.0, 1.0, 0.0, 12.0, "abc", &style);
        let tree = usvg::Tree::from_str(&svg, &fonts.options()).unwrap();
        assert!(tree.root().has_children());

        let short = fonts.measure("abc", 12.0, Weight::Regular);
        let long = fonts.measure("abcdef", 12.0, Weight::Regular);
        assert!(short > 0.0);
        assert!(long > short);
        assert!(fonts.measure("abc", 24.0, Weight::Regular) > short);
    }

    #[test]
    fn test_measure_empty_is_zero() {
        let fonts = FontBook::empty();
        assert_eq!(fonts.measure("", 12.0, Weight::Regular), 0.0);
        // without any fonts the estimate still grows with the text
        let short = fonts.measure("ab", 12.0, Weight::Regular);
        let long = fonts.measure("abcdef", 12.0, Weight::Regular);
        assert!(long > short);
    }
}
