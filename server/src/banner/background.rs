//! Background layers: the built-in gradient used when no image is
//! configured, the legibility overlay, and the standalone artwork written
//! by `--generate-background`.

use super::canvas::{Canvas, RenderError};
use super::draw::{
    Rgba, SeededRng, circle_path, line_path, linear_gradient, parse_color, radial_gradient,
};
use super::text::FontBook;

const GRID_STEP: f32 = 40.0;
const GLOW_CIRCLES: usize = 6;

/// Diagonal three-stop gradient painted when the background image is
/// missing or unreadable.
pub fn paint_fallback(canvas: &mut Canvas<'_>) {
    let (w, h) = (canvas.width(), canvas.height());
    let edge = parse_color("#0a0e1a");
    let shader = linear_gradient(0.0, 0.0, w, h, &[(0.0, edge), (0.5, parse_color("#121829")), (1.0, edge)]);
    canvas.fill_rect_shader(0.0, 0.0, w, h, shader);
}

/// Dark vertical wash over the whole banner so text stays readable on
/// bright backgrounds.
pub fn paint_overlay(canvas: &mut Canvas<'_>) {
    let (w, h) = (canvas.width(), canvas.height());
    let shader = linear_gradient(
        0.0,
        0.0,
        0.0,
        h,
        &[(0.0, Rgba::new(8, 10, 18, 0.60)), (1.0, Rgba::new(8, 10, 18, 0.82))],
    );
    canvas.fill_rect_shader(0.0, 0.0, w, h, shader);
}

/// Centers and radii of the soft glow circles in the artwork.
pub fn glow_circles(width: f32, height: f32, seed: u32) -> Vec<(f32, f32, f32)> {
    let mut rng = SeededRng::new(seed);
    (0..GLOW_CIRCLES)
        .map(|_| {
            let cx = rng.next_f64() as f32 * width;
            let cy = rng.next_f64() as f32 * height;
            let r = 30.0 + rng.next_f64() as f32 * 80.0;
            (cx, cy, r)
        })
        .collect()
}

/// Paint the default background artwork: gradient, faint grid, glow circles.
pub fn paint_artwork(canvas: &mut Canvas<'_>, seed: u32) {
    let (w, h) = (canvas.width(), canvas.height());

    let shader = linear_gradient(
        0.0,
        0.0,
        w,
        h,
        &[
            (0.0, parse_color("#0f0c29")),
            (0.4, parse_color("#302b63")),
            (0.7, parse_color("#24243e")),
            (1.0, parse_color("#0f0c29")),
        ],
    );
    canvas.fill_rect_shader(0.0, 0.0, w, h, shader);

    let grid = Rgba::new(255, 255, 255, 0.03);
    let mut x = 0.0;
    while x < w {
        canvas.stroke_path(line_path(x, 0.0, x, h), grid, 1.0);
        x += GRID_STEP;
    }
    let mut y = 0.0;
    while y < h {
        canvas.stroke_path(line_path(0.0, y, w, y), grid, 1.0);
        y += GRID_STEP;
    }

    for (cx, cy, r) in glow_circles(w, h, seed) {
        let shader = radial_gradient(
            cx,
            cy,
            r,
            &[(0.0, Rgba::new(0, 180, 216, 0.08)), (1.0, Rgba::TRANSPARENT)],
        );
        canvas.fill_path_shader(circle_path(cx, cy, r), shader);
    }
}

/// Render the artwork to PNG bytes.
pub fn generate_artwork(width: u32, height: u32, seed: u32) -> Result<Vec<u8>, RenderError> {
    let fonts = FontBook::empty();
    let mut canvas = Canvas::new(width, height, &fonts)?;
    paint_artwork(&mut canvas, seed);
    canvas.encode_png()
}
