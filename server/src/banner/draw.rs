//! Stateless drawing helpers shared by all widgets: paths, colors, gradients
//! and the seeded generator behind the particle decoration.

use tiny_skia::{
    Color, GradientStop, LinearGradient, Path, PathBuilder, Point, RadialGradient, Shader,
    SpreadMode, Transform,
};

/// Straight-alpha color with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_color(self) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, alpha_byte(self.a))
    }

    /// `rgb(r, g, b)` form for SVG attributes; alpha goes in a separate opacity attribute.
    pub fn svg_rgb(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

fn alpha_byte(a: f32) -> u8 {
    (a.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Parse a `#RRGGBB` color and attach `alpha`. Hex groups that fail to parse
/// become 0 rather than an error.
pub fn color_with_alpha(hex: &str, alpha: f32) -> Rgba {
    let h = hex.trim().trim_start_matches('#');
    let channel = |i: usize| {
        h.get(i..i + 2)
            .and_then(|g| u8::from_str_radix(g, 16).ok())
            .unwrap_or(0)
    };
    Rgba::new(channel(0), channel(2), channel(4), alpha.clamp(0.0, 1.0))
}

/// Parse a palette entry: `#RGB`, `#RRGGBB`, `#RRGGBBAA`, `rgb(...)` or `rgba(...)`.
/// Anything else becomes transparent.
pub fn parse_color(css: &str) -> Rgba {
    let s = css.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).unwrap_or(Rgba::TRANSPARENT);
    }
    let lower = s.to_ascii_lowercase();
    let args = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'));
    match args {
        Some(args) => parse_rgb_args(args).unwrap_or(Rgba::TRANSPARENT),
        None if lower == "white" => Rgba::WHITE,
        None if lower == "black" => Rgba::new(0, 0, 0, 1.0),
        None => Rgba::TRANSPARENT,
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => {
            let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok().map(|n| n * 17);
            Some(Rgba::new(nibble(0)?, nibble(1)?, nibble(2)?, 1.0))
        }
        6 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, 1.0)),
        8 => Some(Rgba::new(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            f32::from(byte(6)?) / 255.0,
        )),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| s.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    let alpha = match parts.get(3) {
        Some(a) => a.parse::<f32>().ok()?.clamp(0.0, 1.0),
        None => 1.0,
    };
    Some(Rgba::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

/// Closed rounded-rectangle path with quadratic corners.
///
/// Returns `None` for degenerate rectangles (zero or negative size).
pub fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<Path> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

/// Open two-point path for strokes.
pub fn line_path(x0: f32, y0: f32, x1: f32, y1: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    pb.line_to(x1, y1);
    pb.finish()
}

pub fn circle_path(cx: f32, cy: f32, r: f32) -> Option<Path> {
    PathBuilder::from_circle(cx, cy, r)
}

/// Linear gradient from (x0, y0) to (x1, y1). Stops are (offset, color).
pub fn linear_gradient(
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    stops: &[(f32, Rgba)],
) -> Option<Shader<'static>> {
    LinearGradient::new(
        Point::from_xy(x0, y0),
        Point::from_xy(x1, y1),
        gradient_stops(stops),
        SpreadMode::Pad,
        Transform::identity(),
    )
}

/// Radial gradient centered at (cx, cy) reaching `radius`.
pub fn radial_gradient(cx: f32, cy: f32, radius: f32, stops: &[(f32, Rgba)]) -> Option<Shader<'static>> {
    let center = Point::from_xy(cx, cy);
    RadialGradient::new(
        center,
        center,
        radius,
        gradient_stops(stops),
        SpreadMode::Pad,
        Transform::identity(),
    )
}

fn gradient_stops(stops: &[(f32, Rgba)]) -> Vec<GradientStop> {
    stops
        .iter()
        .map(|&(pos, color)| GradientStop::new(pos, color.to_color()))
        .collect()
}

const LCG_MODULUS: u64 = 2_147_483_647;
const LCG_MULTIPLIER: u64 = 16_807;

/// Park–Miller style generator: `s = s * 16807 mod (2^31 - 1)`, yielding
/// `s / (2^31 - 1)`. The same seed always produces the same stream.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: u64::from(seed) % LCG_MODULUS,
        }
    }

    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state * LCG_MULTIPLIER % LCG_MODULUS;
        self.state as f64 / LCG_MODULUS as f64
    }
}

impl Iterator for SeededRng {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_with_alpha() {
        let c = color_with_alpha("#00b4d8", 0.5);
        assert_eq!((c.r, c.g, c.b), (0, 180, 216));
        assert_eq!(c.a, 0.5);
    }

    #[test]
    fn test_color_with_alpha_unparseable_groups_are_zero() {
        let c = color_with_alpha("#zz80", 1.0);
        assert_eq!((c.r, c.g, c.b), (0, 128, 0));
        let c = color_with_alpha("", 0.3);
        assert_eq!((c.r, c.g, c.b), (0, 0, 0));
    }

    #[test]
    fn test_parse_color_forms() {
        assert_eq!(parse_color("#ffffff"), Rgba::WHITE);
        assert_eq!(parse_color("#fff"), Rgba::WHITE);
        assert_eq!(parse_color("#7c3aed"), Rgba::new(0x7c, 0x3a, 0xed, 1.0));
        assert_eq!(
            parse_color("rgba(255, 255, 255, 0.05)"),
            Rgba::new(255, 255, 255, 0.05)
        );
        assert_eq!(parse_color("rgb(8,10,18)"), Rgba::new(8, 10, 18, 1.0));
        let half = parse_color("#00000080");
        assert!((half.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_color_garbage_is_transparent() {
        assert_eq!(parse_color("not-a-color"), Rgba::TRANSPARENT);
        assert_eq!(parse_color("#12"), Rgba::TRANSPARENT);
        assert_eq!(parse_color("rgba(1,2)"), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_rounded_rect_is_closed_and_bounded() {
        let path = rounded_rect_path(10.0, 20.0, 120.0, 56.0, 8.0).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.left(), 10.0);
        assert_eq!(bounds.top(), 20.0);
        assert_eq!(bounds.right(), 130.0);
        assert_eq!(bounds.bottom(), 76.0);
        assert_eq!(
            path.segments().last(),
            Some(tiny_skia::PathSegment::Close)
        );
    }

    #[test]
    fn test_rounded_rect_degenerate() {
        assert!(rounded_rect_path(0.0, 0.0, 0.0, 10.0, 4.0).is_none());
        assert!(rounded_rect_path(0.0, 0.0, 10.0, -1.0, 4.0).is_none());
    }

    #[test]
    fn test_seeded_rng_is_restartable() {
        let a: Vec<f64> = SeededRng::new(42).take(50).collect();
        let b: Vec<f64> = SeededRng::new(42).take(50).collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_seeded_rng_known_values() {
        let mut rng = SeededRng::new(42);
        // 42 * 16807 = 705894
        assert_eq!(rng.next_f64(), 705_894.0 / 2_147_483_647.0);
        // 705894 * 16807 mod (2^31 - 1)
        assert_eq!(
            rng.next_f64(),
            (705_894u64 * 16_807 % 2_147_483_647) as f64 / 2_147_483_647.0
        );
    }

    #[test]
    fn test_seeded_rng_different_seed() {
        assert_ne!(SeededRng::new(42).next_f64(), SeededRng::new(43).next_f64());
    }
}
