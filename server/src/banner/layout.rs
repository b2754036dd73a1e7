//! Turns one round of status data into positioned banner elements.
//!
//! The left column and the right column each keep their own vertical
//! cursor. Everything here is pure: painting happens in the compositor.

use crate::config::BannerConfig;
use crate::i18n::Strings;
use crate::status::{ClientInfo, ServerInfo, TopChannel};

use super::format::{format_uptime, truncate};
use super::text::{TextMeasure, Weight};
use super::widgets::{CARD_GAP, CARD_HEIGHT, CARD_WIDTH, ChipRow, StatCard, layout_chips};

pub const LEFT_X: f32 = 36.0;
pub const RIGHT_PANEL_WIDTH: f32 = 260.0;
const RIGHT_MARGIN: f32 = 30.0;
const LEFT_TOP: f32 = 30.0;
const RIGHT_TOP: f32 = 26.0;

const PROGRESS_HEIGHT: f32 = 10.0;
const CLOCK_HEIGHT: f32 = 82.0;
const SPARKLINE_HEIGHT: f32 = 70.0;
const BADGE_HEIGHT: f32 = 22.0;

/// Everything a render needs from the outside world, gathered up front.
#[derive(Debug, Clone)]
pub struct BannerData {
    pub info: ServerInfo,
    pub clients: Vec<ClientInfo>,
    pub top_channel: Option<TopChannel>,
    pub newest_client: String,
    pub last_joined: String,
    pub history: Vec<u32>,
    pub history_max: u32,
    /// Pre-formatted (time, date) for the clock card.
    pub clock: Option<(String, String)>,
}

/// (x, y, width, height)
pub type Rect = (f32, f32, f32, f32);

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    ServerName { x: f32, y: f32, text: String },
    Underline { x0: f32, x1: f32, y: f32 },
    EventBadge { rect: Rect, text: String },
    StatCard(StatCard),
    ProgressBar { rect: Rect, current: u32, max: u32 },
    UserChips { x: f32, y: f32, row: ChipRow },
    TopChannel { x: f32, y: f32, text: String },
    LastJoined { x: f32, y: f32, text: String },
    Clock { rect: Rect, time: String, date: String },
    Sparkline { rect: Rect, label: String, data: Vec<u32>, max: u32 },
    FooterLine,
}

/// Positions for the two columns of a `width` wide banner.
#[derive(Debug, Clone, Copy)]
pub struct Columns {
    pub right_x: f32,
    pub left_max_width: f32,
}

impl Columns {
    pub fn for_width(width: f32) -> Self {
        let right_x = width - RIGHT_PANEL_WIDTH - RIGHT_MARGIN;
        Self {
            right_x,
            left_max_width: right_x - LEFT_X - 20.0,
        }
    }
}

/// The stat cards, in display order. Ping only appears when it is known.
pub fn stat_cards(info: &ServerInfo, strings: &Strings, y: f32) -> Vec<StatCard> {
    let mut stats = vec![
        (strings.online, format!("{} / {}", info.clients_online, info.max_clients)),
        (strings.channels, info.channels_online.to_string()),
        (strings.uptime, format_uptime(info.uptime)),
    ];
    if info.ping > 0 {
        stats.push((strings.ping, format!("{}ms", info.ping)));
    }

    stats
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| StatCard {
            x: LEFT_X + i as f32 * (CARD_WIDTH + CARD_GAP),
            y,
            value,
            label: label.to_string(),
        })
        .collect()
}

/// Lay out all data-driven elements of the banner.
pub fn plan_banner(
    data: &BannerData,
    config: &BannerConfig,
    strings: &Strings,
    measure: &impl TextMeasure,
) -> Vec<Element> {
    let features = &config.features;
    let height = config.height as f32;
    let cols = Columns::for_width(config.width as f32);
    let mut out = Vec::new();

    // ── Left column ──
    let mut cursor = LEFT_TOP;

    out.push(Element::ServerName {
        x: LEFT_X,
        y: cursor + 26.0,
        text: data.info.name.clone(),
    });
    out.push(Element::Underline {
        x0: LEFT_X,
        x1: LEFT_X + cols.left_max_width,
        y: cursor + 38.0,
    });
    cursor += 50.0;

    if !features.event_text.is_empty() {
        let w = measure.measure(&features.event_text, 12.0, Weight::Bold) + 20.0;
        out.push(Element::EventBadge {
            rect: (LEFT_X, cursor - 6.0, w, BADGE_HEIGHT),
            text: features.event_text.clone(),
        });
        cursor += 22.0;
    }

    let cards = stat_cards(&data.info, strings, cursor);
    let card_count = cards.len() as f32;
    out.extend(cards.into_iter().map(Element::StatCard));
    cursor += CARD_HEIGHT + 12.0;

    if features.progress_bar {
        let bar_w = (card_count * (CARD_WIDTH + CARD_GAP) - CARD_GAP).min(cols.left_max_width * 0.55);
        out.push(Element::ProgressBar {
            rect: (LEFT_X, cursor, bar_w, PROGRESS_HEIGHT),
            current: data.info.clients_online,
            max: data.info.max_clients,
        });
        cursor += 22.0;
    }

    if features.user_chips {
        let row = layout_chips(LEFT_X, cols.left_max_width, &data.clients, measure);
        let advance = row.advance();
        out.push(Element::UserChips {
            x: LEFT_X,
            y: cursor,
            row,
        });
        cursor += advance + 4.0;
    }

    let info_y = cursor.max(height - 50.0);
    let mut info_x = LEFT_X;

    if features.top_channel
        && let Some(top) = &data.top_channel
    {
        let text = format!("{} ({})", truncate(&top.name, 22, 20), top.clients);
        let text_w = measure.measure(&text, 11.0, Weight::Regular);
        out.push(Element::TopChannel {
            x: info_x,
            y: info_y,
            text,
        });
        info_x += 14.0 + text_w + 20.0;
    }

    if features.last_joined {
        let name = if data.last_joined.is_empty() {
            &data.newest_client
        } else {
            &data.last_joined
        };
        if !name.is_empty() {
            out.push(Element::LastJoined {
                x: info_x,
                y: info_y,
                text: format!("{}: {}", strings.last_joined, truncate(name, 18, 16)),
            });
        }
    }

    // ── Right column ──
    let mut right_cursor = RIGHT_TOP;

    if features.clock
        && let Some((time, date)) = &data.clock
    {
        out.push(Element::Clock {
            rect: (cols.right_x, right_cursor, RIGHT_PANEL_WIDTH, CLOCK_HEIGHT),
            time: time.clone(),
            date: date.clone(),
        });
        right_cursor += CLOCK_HEIGHT + 14.0;
    }

    if features.sparkline {
        out.push(Element::Sparkline {
            rect: (cols.right_x, right_cursor, RIGHT_PANEL_WIDTH, SPARKLINE_HEIGHT),
            label: strings.sparkline_label.to_string(),
            data: data.history.clone(),
            max: data.history_max,
        });
    }

    if features.gradient_line {
        out.push(Element::FooterLine);
    }

    out
}
