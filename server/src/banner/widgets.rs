//! Widget painters. Geometry that carries a rule (ratios, chart points, chip
//! placement) lives in plain functions so it can be checked without pixels.

use tiny_skia::PathBuilder;

use crate::config::Palette;
use crate::status::ClientInfo;

use super::canvas::{Canvas, RenderError};
use super::draw::{
    Rgba, SeededRng, circle_path, color_with_alpha, linear_gradient, parse_color,
    radial_gradient, rounded_rect_path,
};
use super::format::truncate;
use super::text::{TextMeasure, TextStyle, Weight};

pub const PARTICLE_COUNT: usize = 35;
pub const PARTICLE_SEED: u32 = 42;

pub const CARD_WIDTH: f32 = 120.0;
pub const CARD_HEIGHT: f32 = 56.0;
pub const CARD_GAP: f32 = 10.0;

pub const CHIP_LIMIT: usize = 6;
pub const CHIP_HEIGHT: f32 = 24.0;
const CHIP_GAP: f32 = 6.0;
const CHIP_PADDING: f32 = 24.0;
const CHIP_FONT_SIZE: f32 = 12.0;
const CHIP_NAME_LIMIT: usize = 14;
const CHIP_NAME_KEEP: usize = 12;

const SPARKLINE_PADDING: f32 = 6.0;

const TRACK_COLOR: Rgba = Rgba::new(255, 255, 255, 0.06);
const SPARKLINE_BG: Rgba = Rgba::new(255, 255, 255, 0.03);

/// Parsed palette. The raw strings are kept for the alpha variants, which
/// are derived from the configured hex values.
#[derive(Debug, Clone)]
pub struct Theme {
    pub palette: Palette,
    pub primary: Rgba,
    pub secondary: Rgba,
    pub accent: Rgba,
    pub accent_secondary: Rgba,
    pub online: Rgba,
    pub away: Rgba,
    pub card_bg: Rgba,
    pub card_border: Rgba,
}

impl Theme {
    pub fn new(palette: &Palette) -> Self {
        Self {
            palette: palette.clone(),
            primary: parse_color(&palette.primary),
            secondary: parse_color(&palette.secondary),
            accent: parse_color(&palette.accent),
            accent_secondary: parse_color(&palette.accent_secondary),
            online: parse_color(&palette.online),
            away: parse_color(&palette.away),
            card_bg: parse_color(&palette.card_bg),
            card_border: parse_color(&palette.card_border),
        }
    }

    pub fn accent_alpha(&self, alpha: f32) -> Rgba {
        color_with_alpha(&self.palette.accent, alpha)
    }

    pub fn accent_secondary_alpha(&self, alpha: f32) -> Rgba {
        color_with_alpha(&self.palette.accent_secondary, alpha)
    }
}

// ── Particles ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub alpha: f32,
}

/// Particle positions for a `width` x `height` banner. Always the same for
/// the same size.
pub fn particles(width: f32, height: f32) -> Vec<Particle> {
    let mut rng = SeededRng::new(PARTICLE_SEED);
    (0..PARTICLE_COUNT)
        .map(|_| {
            let x = rng.next_f64() as f32 * width;
            let y = rng.next_f64() as f32 * height;
            let radius = rng.next_f64() as f32 * 2.0 + 0.5;
            let alpha = rng.next_f64() as f32 * 0.35 + 0.05;
            Particle { x, y, radius, alpha }
        })
        .collect()
}

pub fn draw_particles(canvas: &mut Canvas<'_>, theme: &Theme) {
    for p in particles(canvas.width(), canvas.height()) {
        canvas.fill_path(circle_path(p.x, p.y, p.radius), theme.accent_alpha(p.alpha));
    }
}

// ── Cards ───────────────────────────────────────────────────────────

/// Soft radial highlight behind a card.
pub fn draw_accent_glow(canvas: &mut Canvas<'_>, x: f32, y: f32, w: f32, h: f32, color_hex: &str) {
    let shader = radial_gradient(
        x + w / 2.0,
        y + h / 2.0,
        w.max(h),
        &[
            (0.0, color_with_alpha(color_hex, 0.12)),
            (0.5, color_with_alpha(color_hex, 0.04)),
            (1.0, Rgba::TRANSPARENT),
        ],
    );
    canvas.fill_rect_shader(x - 20.0, y - 20.0, w + 40.0, h + 40.0, shader);
}

fn draw_card_frame(canvas: &mut Canvas<'_>, x: f32, y: f32, w: f32, h: f32, radius: f32, theme: &Theme) {
    canvas.fill_path(rounded_rect_path(x, y, w, h, radius), theme.card_bg);
    canvas.stroke_path(rounded_rect_path(x, y, w, h, radius), theme.card_border, 1.0);
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub x: f32,
    pub y: f32,
    pub value: String,
    pub label: String,
}

pub fn draw_stat_card(
    canvas: &mut Canvas<'_>,
    card: &StatCard,
    theme: &Theme,
    glow: bool,
) -> Result<(), RenderError> {
    let (x, y, w, h) = (card.x, card.y, CARD_WIDTH, CARD_HEIGHT);
    if glow {
        draw_accent_glow(canvas, x, y, w, h, &theme.palette.accent);
    }
    draw_card_frame(canvas, x, y, w, h, 8.0, theme);

    let cx = x + w / 2.0;
    canvas.text(cx, y + 28.0, &card.value, TextStyle::new(20.0, theme.accent).bold().centered())?;
    canvas.text(cx, y + 46.0, &card.label, TextStyle::new(11.0, theme.secondary).centered())
}

pub fn draw_clock_card(
    canvas: &mut Canvas<'_>,
    (x, y, w, h): (f32, f32, f32, f32),
    time: &str,
    date: &str,
    theme: &Theme,
    glow: bool,
) -> Result<(), RenderError> {
    if glow {
        draw_accent_glow(canvas, x, y, w, h, &theme.palette.accent_secondary);
    }
    draw_card_frame(canvas, x, y, w, h, 10.0, theme);

    let cx = x + w / 2.0;
    canvas.text(cx, y + 46.0, time, TextStyle::new(38.0, theme.primary).bold().centered())?;
    canvas.text(cx, y + 68.0, date, TextStyle::new(12.0, theme.secondary).centered())
}

// ── Progress bar ────────────────────────────────────────────────────

/// Fill ratio in [0, 1]. A zero maximum yields 0.
pub fn progress_ratio(current: u32, max: u32) -> f32 {
    if max == 0 {
        return 0.0;
    }
    (current as f32 / max as f32).clamp(0.0, 1.0)
}

/// Width of the filled part, or `None` when nothing is filled. Never
/// narrower than the bar height so the rounded cap stays round.
pub fn progress_fill_width(track_width: f32, bar_height: f32, ratio: f32) -> Option<f32> {
    (ratio > 0.0).then(|| bar_height.max(track_width * ratio))
}

pub fn progress_label(current: u32, max: u32) -> String {
    let pct = (progress_ratio(current, max) * 100.0).round() as u32;
    format!("{current}/{max}  ({pct}%)")
}

pub fn draw_progress_bar(
    canvas: &mut Canvas<'_>,
    (x, y, w, h): (f32, f32, f32, f32),
    current: u32,
    max: u32,
    theme: &Theme,
) -> Result<(), RenderError> {
    canvas.fill_path(rounded_rect_path(x, y, w, h, h / 2.0), TRACK_COLOR);

    if let Some(fill_w) = progress_fill_width(w, h, progress_ratio(current, max)) {
        let shader = linear_gradient(
            x,
            y,
            x + fill_w,
            y,
            &[(0.0, theme.accent), (1.0, theme.accent_secondary)],
        );
        canvas.fill_path_shader(rounded_rect_path(x, y, fill_w, h, h / 2.0), shader);
    }

    canvas.text(
        x + w + 10.0,
        y + h / 2.0 + 4.0,
        &progress_label(current, max),
        TextStyle::new(10.0, theme.primary).bold(),
    )
}

// ── Sparkline ───────────────────────────────────────────────────────

/// Chart points for `data` inside the card at (x, y, w, h). `None` when
/// there are fewer than two samples to connect.
pub fn sparkline_points(
    (x, y, w, h): (f32, f32, f32, f32),
    data: &[u32],
    max_value: u32,
) -> Option<Vec<(f32, f32)>> {
    if data.len() < 2 {
        return None;
    }
    let graph_w = w - SPARKLINE_PADDING * 2.0;
    let graph_h = h - SPARKLINE_PADDING * 2.0;
    let step = graph_w / (data.len() - 1) as f32;
    let max_value = max_value.max(1) as f32;
    Some(
        data.iter()
            .enumerate()
            .map(|(i, &v)| {
                let px = x + SPARKLINE_PADDING + i as f32 * step;
                let py = y + SPARKLINE_PADDING + graph_h - (v as f32 / max_value) * graph_h;
                (px, py)
            })
            .collect(),
    )
}

pub fn draw_sparkline(
    canvas: &mut Canvas<'_>,
    rect: (f32, f32, f32, f32),
    data: &[u32],
    max_value: u32,
    placeholder: &str,
    theme: &Theme,
) -> Result<(), RenderError> {
    let (x, y, w, h) = rect;
    let Some(points) = sparkline_points(rect, data, max_value) else {
        return canvas.text(
            x,
            y + h / 2.0 + 4.0,
            placeholder,
            TextStyle::new(11.0, theme.secondary),
        );
    };

    canvas.fill_path(rounded_rect_path(x, y, w, h, 6.0), SPARKLINE_BG);

    let baseline = y + h - SPARKLINE_PADDING;
    let (first_x, _) = points[0];
    let (last_x, last_y) = points[points.len() - 1];

    let mut area = PathBuilder::new();
    area.move_to(first_x, baseline);
    for &(px, py) in &points {
        area.line_to(px, py);
    }
    area.line_to(last_x, baseline);
    area.close();
    let fill = linear_gradient(
        x,
        y,
        x,
        y + h,
        &[(0.0, theme.accent_alpha(0.25)), (1.0, theme.accent_alpha(0.02))],
    );
    canvas.fill_path_shader(area.finish(), fill);

    let mut line = PathBuilder::new();
    line.move_to(first_x, points[0].1);
    for &(px, py) in &points[1..] {
        line.line_to(px, py);
    }
    canvas.stroke_path(line.finish(), theme.accent, 1.5);

    canvas.fill_path(circle_path(last_x, last_y, 3.0), theme.accent);
    Ok(())
}

// ── User chips ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Chip {
    pub x: f32,
    pub width: f32,
    pub label: String,
    pub away: bool,
}

/// Horizontal run of name chips plus the "+N" marker for clients that did
/// not get a chip.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipRow {
    pub chips: Vec<Chip>,
    /// (x, hidden client count)
    pub overflow: Option<(f32, usize)>,
}

impl ChipRow {
    /// No chips and nothing hidden: the "no players" line is shown instead.
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty() && self.overflow.is_none()
    }

    /// Vertical space the row takes in the left column.
    pub fn advance(&self) -> f32 {
        if self.is_empty() { 28.0 } else { 30.0 }
    }
}

/// Place up to six chips from `x`, stopping before the first one that
/// would cross `x + max_width`.
pub fn layout_chips(
    x: f32,
    max_width: f32,
    clients: &[ClientInfo],
    measure: &impl TextMeasure,
) -> ChipRow {
    let mut chips = Vec::new();
    let mut chip_x = x;

    for client in clients.iter().take(CHIP_LIMIT) {
        let label = truncate(&client.nickname, CHIP_NAME_LIMIT, CHIP_NAME_KEEP);
        let width = measure.measure(&label, CHIP_FONT_SIZE, Weight::Regular) + CHIP_PADDING;
        if chip_x + width > x + max_width {
            break;
        }
        chips.push(Chip {
            x: chip_x,
            width,
            label,
            away: client.is_away,
        });
        chip_x += width + CHIP_GAP;
    }

    let hidden = clients.len() - chips.len();
    let overflow = (hidden > 0).then_some((chip_x + 4.0, hidden));
    ChipRow { chips, overflow }
}

/// Paint the chip row, or the "no players" line, at `y`.
pub fn draw_user_chips(
    canvas: &mut Canvas<'_>,
    (x, y): (f32, f32),
    row: &ChipRow,
    no_players: &str,
    theme: &Theme,
) -> Result<(), RenderError> {
    if row.is_empty() {
        return canvas.text(x, y + 16.0, no_players, TextStyle::new(12.0, theme.secondary));
    }

    for chip in &row.chips {
        canvas.fill_path(rounded_rect_path(chip.x, y, chip.width, CHIP_HEIGHT, 12.0), theme.card_bg);
        canvas.stroke_path(
            rounded_rect_path(chip.x, y, chip.width, CHIP_HEIGHT, 12.0),
            theme.card_border,
            0.5,
        );

        let dot = if chip.away { theme.away } else { theme.online };
        canvas.fill_path(circle_path(chip.x + 10.0, y + CHIP_HEIGHT / 2.0, 2.5), dot);

        canvas.text(
            chip.x + 18.0,
            y + 16.0,
            &chip.label,
            TextStyle::new(CHIP_FONT_SIZE, theme.primary),
        )?;
    }

    if let Some((ox, hidden)) = row.overflow {
        canvas.text(ox, y + 16.0, &format!("+{hidden}"), TextStyle::new(11.0, theme.secondary))?;
    }

    Ok(())
}

// ── Decorations ─────────────────────────────────────────────────────

/// Thin gradient line along the bottom edge.
pub fn draw_footer_line(canvas: &mut Canvas<'_>, theme: &Theme) {
    let (w, h) = (canvas.width(), canvas.height());
    let line_h = 3.0;
    let shader = linear_gradient(
        0.0,
        h - line_h,
        w,
        h - line_h,
        &[
            (0.0, theme.accent_alpha(0.9)),
            (0.4, theme.accent_secondary_alpha(0.6)),
            (1.0, Rgba::TRANSPARENT),
        ],
    );
    canvas.fill_rect_shader(0.0, h - line_h, w, line_h, shader);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Fixed-width measurement: 7 px per character regardless of style.
    pub(crate) struct MonoMeasure;

    impl TextMeasure for MonoMeasure {
        fn measure(&self, text: &str, _size: f32, _weight: Weight) -> f32 {
            text.chars().count() as f32 * 7.0
        }
    }

    fn client(nick: &str, away: bool) -> ClientInfo {
        ClientInfo {
            nickname: nick.into(),
            is_away: away,
            channel_id: 1,
            connection_time: 60,
        }
    }

    #[test]
    fn test_progress_ratio() {
        assert_eq!(progress_ratio(0, 0), 0.0);
        assert_eq!(progress_ratio(7, 0), 0.0);
        assert_eq!(progress_ratio(50, 100), 0.5);
        assert_eq!(progress_ratio(150, 100), 1.0);
    }

    #[test]
    fn test_progress_fill_width_floor() {
        assert_eq!(progress_fill_width(200.0, 10.0, 0.0), None);
        // 1% of 200 would be a 2px sliver; the cap keeps it at bar height
        assert_eq!(progress_fill_width(200.0, 10.0, 0.01), Some(10.0));
        assert_eq!(progress_fill_width(200.0, 10.0, 0.5), Some(100.0));
    }

    #[test]
    fn test_progress_label() {
        assert_eq!(progress_label(5, 10), "5/10  (50%)");
        assert_eq!(progress_label(0, 0), "0/0  (0%)");
        assert_eq!(progress_label(1, 3), "1/3  (33%)");
    }

    #[test]
    fn test_sparkline_needs_two_samples() {
        let rect = (0.0, 0.0, 260.0, 70.0);
        assert_eq!(sparkline_points(rect, &[], 1), None);
        assert_eq!(sparkline_points(rect, &[5], 5), None);
    }

    #[test]
    fn test_sparkline_midpoint_is_half_height() {
        let (x, y, w, h) = (10.0, 20.0, 260.0, 70.0);
        let points = sparkline_points((x, y, w, h), &[2, 4, 2], 4).unwrap();
        let graph_h = h - 12.0;
        let baseline = y + 6.0 + graph_h;
        assert_eq!(points.len(), 3);
        // value 2 of max 4 sits half the graph height above the baseline
        assert_eq!(baseline - points[0].1, graph_h / 2.0);
        assert_eq!(baseline - points[2].1, graph_h / 2.0);
        // value 4 reaches the top
        assert_eq!(points[1].1, y + 6.0);
        // x steps evenly across the padded width
        assert_eq!(points[0].0, x + 6.0);
        assert_eq!(points[2].0, x + w - 6.0);
        assert_eq!(points[1].0, x + 6.0 + (w - 12.0) / 2.0);
    }

    #[test]
    fn test_sparkline_zero_values_sit_on_baseline() {
        let points = sparkline_points((0.0, 0.0, 100.0, 50.0), &[0, 0], 1).unwrap();
        assert!(points.iter().all(|&(_, py)| py == 44.0));
    }

    #[test]
    fn test_chips_width_cut_shows_remaining_count() {
        // each "playerN" chip is 7*7 + 24 = 73 px wide, 79 px with the gap
        let clients: Vec<ClientInfo> = (1..=8).map(|i| client(&format!("player{i}"), false)).collect();
        let max_width = 79.0 * 4.0 + 73.0;
        let row = layout_chips(36.0, max_width, &clients, &MonoMeasure);
        assert_eq!(row.chips.len(), 5);
        let (ox, hidden) = row.overflow.unwrap();
        assert_eq!(hidden, 3);
        assert_eq!(ox, 36.0 + 79.0 * 5.0 + 4.0);
    }

    #[test]
    fn test_chips_capped_at_six() {
        let clients: Vec<ClientInfo> = (1..=9).map(|i| client(&format!("p{i}"), i % 2 == 0)).collect();
        let row = layout_chips(0.0, 10_000.0, &clients, &MonoMeasure);
        assert_eq!(row.chips.len(), CHIP_LIMIT);
        assert_eq!(row.overflow.map(|(_, n)| n), Some(3));
        assert!(row.chips[1].away);
        assert!(!row.chips[0].away);
    }

    #[test]
    fn test_chips_no_overflow_when_all_fit() {
        let clients = vec![client("alice", false), client("bob", true)];
        let row = layout_chips(0.0, 1_000.0, &clients, &MonoMeasure);
        assert_eq!(row.chips.len(), 2);
        assert_eq!(row.overflow, None);
        assert_eq!(row.chips[1].x, row.chips[0].width + 6.0);
    }

    #[test]
    fn test_chip_labels_truncated() {
        let clients = vec![client("averyveryverylongnickname", false)];
        let row = layout_chips(0.0, 1_000.0, &clients, &MonoMeasure);
        assert_eq!(row.chips[0].label, "averyveryver…");
    }

    #[test]
    fn test_no_clients_gives_empty_row() {
        let row = layout_chips(0.0, 1_000.0, &[], &MonoMeasure);
        assert!(row.chips.is_empty());
        assert_eq!(row.overflow, None);
        assert!(row.is_empty());
        assert_eq!(row.advance(), 28.0);
    }

    #[test]
    fn test_chip_row_advance_with_clients() {
        let row = layout_chips(0.0, 1_000.0, &[client("alice", false)], &MonoMeasure);
        assert_eq!(row.advance(), 30.0);

        // nothing fits, but the "+N" marker still takes a full row
        let row = layout_chips(0.0, 10.0, &[client("alice", false)], &MonoMeasure);
        assert!(row.chips.is_empty());
        assert_eq!(row.overflow.map(|(_, n)| n), Some(1));
        assert_eq!(row.advance(), 30.0);
    }

    #[test]
    fn test_particles_deterministic_and_in_bounds() {
        let a = particles(1024.0, 300.0);
        let b = particles(1024.0, 300.0);
        assert_eq!(a.len(), PARTICLE_COUNT);
        assert_eq!(a, b);
        for p in &a {
            assert!((0.0..=1024.0).contains(&p.x));
            assert!((0.0..=300.0).contains(&p.y));
            assert!((0.5..=2.5).contains(&p.radius));
            assert!((0.05..=0.40).contains(&p.alpha));
        }
    }

    #[test]
    fn test_theme_alpha_variants_use_hex() {
        let theme = Theme::new(&Palette::default());
        assert_eq!(theme.accent_alpha(0.5), Rgba::new(0x00, 0xb4, 0xd8, 0.5));
        assert_eq!(theme.card_bg, Rgba::new(255, 255, 255, 0.05));
    }
}
