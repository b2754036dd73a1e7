use tiny_skia::{
    FillRule, FilterQuality, Paint, Path, Pixmap, PixmapPaint, Rect, Shader, Stroke, Transform,
};

use super::draw::Rgba;
use super::text::{FontBook, TextError, TextStyle};

/// Failure that aborts a render attempt.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} canvas")]
    Allocation { width: u32, height: u32 },
    #[error(transparent)]
    Text(#[from] TextError),
    #[error("png encoding failed: {0}")]
    Encode(String),
}

/// Raster surface for one banner render. Wraps a pixmap and the font book so
/// widgets can paint shapes and text through a single handle.
pub struct Canvas<'f> {
    pixmap: Pixmap,
    fonts: &'f FontBook,
}

impl<'f> Canvas<'f> {
    pub fn new(width: u32, height: u32, fonts: &'f FontBook) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        Ok(Self { pixmap, fonts })
    }

    pub fn width(&self) -> f32 {
        self.pixmap.width() as f32
    }

    pub fn height(&self) -> f32 {
        self.pixmap.height() as f32
    }

    pub fn fill_path(&mut self, path: Option<Path>, color: Rgba) {
        let mut paint = Paint::default();
        paint.set_color(color.to_color());
        paint.anti_alias = true;
        self.fill_with(path, paint);
    }

    pub fn fill_path_shader(&mut self, path: Option<Path>, shader: Option<Shader<'static>>) {
        let Some(shader) = shader else { return };
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Default::default()
        };
        self.fill_with(path, paint);
    }

    fn fill_with(&mut self, path: Option<Path>, paint: Paint<'_>) {
        if let Some(path) = path {
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    pub fn stroke_path(&mut self, path: Option<Path>, color: Rgba, width: f32) {
        let mut paint = Paint::default();
        paint.set_color(color.to_color());
        paint.anti_alias = true;
        self.stroke_with(path, paint, width);
    }

    pub fn stroke_path_shader(&mut self, path: Option<Path>, shader: Option<Shader<'static>>, width: f32) {
        let Some(shader) = shader else { return };
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Default::default()
        };
        self.stroke_with(path, paint, width);
    }

    fn stroke_with(&mut self, path: Option<Path>, paint: Paint<'_>, width: f32) {
        if let Some(path) = path {
            let stroke = Stroke {
                width,
                ..Default::default()
            };
            self.pixmap
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    /// Fill an axis-aligned rectangle with a shader. Out-of-range rectangles are skipped.
    pub fn fill_rect_shader(&mut self, x: f32, y: f32, w: f32, h: f32, shader: Option<Shader<'static>>) {
        let (Some(rect), Some(shader)) = (Rect::from_xywh(x, y, w, h), shader) else {
            return;
        };
        let paint = Paint {
            shader,
            anti_alias: false,
            ..Default::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Draw `image` scaled into the destination rectangle.
    pub fn draw_image(&mut self, image: &Pixmap, x: f32, y: f32, w: f32, h: f32, opacity: f32) {
        if image.width() == 0 || image.height() == 0 || w <= 0.0 || h <= 0.0 {
            return;
        }
        let sx = w / image.width() as f32;
        let sy = h / image.height() as f32;
        let paint = PixmapPaint {
            opacity,
            quality: FilterQuality::Bicubic,
            ..Default::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            image.as_ref(),
            &paint,
            Transform::from_row(sx, 0.0, 0.0, sy, x, y),
            None,
        );
    }

    /// Draw text with its baseline at `y`.
    pub fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) -> Result<(), RenderError> {
        let fonts = self.fonts;
        let mut target = self.pixmap.as_mut();
        fonts.draw(&mut target, x, y, text, &style)?;
        Ok(())
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::draw::rounded_rect_path;

    fn inked(canvas: &Canvas<'_>, x0: u32, y0: u32, x1: u32, y1: u32) -> usize {
        let pixmap = canvas.pixmap();
        let width = pixmap.width();
        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .filter(|&(x, y)| pixmap.pixels()[(y * width + x) as usize].alpha() > 0)
            .count()
    }

    #[test]
    fn test_zero_size_canvas_is_allocation_error() {
        let fonts = FontBook::empty();
        assert!(matches!(
            Canvas::new(0, 150, &fonts),
            Err(RenderError::Allocation { width: 0, height: 150 })
        ));
    }

    #[test]
    fn test_text_inks_pixels_above_the_baseline() {
        let fonts = FontBook::load("", "font loaded");
        if fonts.face_count() == 0 {
            eprintln!("no system fonts installed, skipping glyph rasterization check");
            return;
        }

        let mut canvas = Canvas::new(200, 60, &fonts).unwrap();
        canvas
            .text(10.0, 40.0, "Hello", TextStyle::new(24.0, Rgba::WHITE).bold())
            .unwrap();

        // glyphs sit between the cap height and the baseline
        assert!(inked(&canvas, 10, 16, 120, 41) > 0, "text should leave ink");
        assert_eq!(inked(&canvas, 0, 0, 200, 8), 0, "nothing far above the text");
        assert_eq!(inked(&canvas, 150, 0, 200, 60), 0, "nothing right of the run");
    }

    #[test]
    fn test_fill_and_encode() {
        let fonts = FontBook::empty();
        let mut canvas = Canvas::new(20, 10, &fonts).unwrap();
        canvas.fill_path(rounded_rect_path(0.0, 0.0, 20.0, 10.0, 2.0), Rgba::WHITE);
        assert_eq!(inked(&canvas, 5, 3, 15, 7), 40);
        let png = canvas.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
