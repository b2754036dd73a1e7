//! The render pipeline: cache check, background layers, data acquisition,
//! layout, paint, encode.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::config::{AppConfig, BannerConfig};
use crate::i18n::Strings;
use crate::status::StatusSource;

use super::assets::{AssetError, load_image};
use super::background::{paint_fallback, paint_overlay};
use super::cache::RenderCache;
use super::canvas::{Canvas, RenderError};
use super::clock::{clock_lines, resolve_timezone};
use super::draw::{Rgba, line_path, linear_gradient, rounded_rect_path};
use super::history::HistoryBuffer;
use super::layout::{BannerData, Element, plan_banner};
use super::text::{FontBook, TextStyle};
use super::widgets::{
    Theme, draw_clock_card, draw_footer_line, draw_particles, draw_progress_bar, draw_sparkline,
    draw_stat_card, draw_user_chips,
};

const LOGO_OPACITY: f32 = 0.07;
const LOGO_SCALE: f32 = 0.75;
const LOGO_MARGIN: f32 = 40.0;

/// Everything a render needs, built once at startup and shared.
pub struct RenderContext<S> {
    pub config: BannerConfig,
    pub strings: &'static Strings,
    pub theme: Theme,
    pub timezone: Tz,
    pub history: Arc<HistoryBuffer>,
    pub cache: RenderCache,
    pub source: Arc<S>,
    pub fonts: FontBook,
}

impl<S: StatusSource> RenderContext<S> {
    pub fn new(config: &AppConfig, history: Arc<HistoryBuffer>, source: Arc<S>, fonts: FontBook) -> Self {
        let banner = config.banner.clone();
        Self {
            strings: Strings::for_lang(&config.server.lang),
            theme: Theme::new(&banner.colors),
            timezone: resolve_timezone(&banner.timezone),
            history,
            cache: RenderCache::new(config.server.cache_ttl),
            source,
            fonts,
            config: banner,
        }
    }

    /// PNG bytes of the current banner, from cache while it is fresh.
    pub async fn render_banner(&self) -> Result<Arc<Vec<u8>>, RenderError> {
        self.cache.get_or_render(|| self.compose()).await
    }

    /// Fetch all feeds concurrently. Every feed already degrades on its own.
    pub async fn gather(&self) -> BannerData {
        let features = &self.config.features;
        let source = &self.source;

        let (info, clients, top_channel, newest_client) = tokio::join!(
            source.server_info(),
            source.clients(),
            async {
                if features.top_channel {
                    source.top_channel().await
                } else {
                    None
                }
            },
            async {
                if features.last_joined {
                    source.newest_client().await
                } else {
                    String::new()
                }
            },
        );

        let last_joined = if features.last_joined {
            source.last_joined()
        } else {
            String::new()
        };
        let (history, history_max) = if features.sparkline {
            (self.history.snapshot(), self.history.max_value())
        } else {
            (Vec::new(), 1)
        };
        let clock = features
            .clock
            .then(|| clock_lines(Utc::now(), self.timezone, self.strings));

        BannerData {
            info,
            clients,
            top_channel,
            newest_client,
            last_joined,
            history,
            history_max,
            clock,
        }
    }

    /// Run one full render, bypassing the cache.
    pub async fn compose(&self) -> Result<Vec<u8>, RenderError> {
        let cfg = &self.config;
        let mut canvas = Canvas::new(cfg.width, cfg.height, &self.fonts)?;
        let (w, h) = (canvas.width(), canvas.height());

        match load_image(&cfg.background).await {
            Ok(image) => canvas.draw_image(&image, 0.0, 0.0, w, h, 1.0),
            Err(e) => {
                log_asset_fallback("background", &e);
                paint_fallback(&mut canvas);
            }
        }
        paint_overlay(&mut canvas);

        match load_image(&cfg.logo).await {
            Ok(logo) => {
                let size = h * LOGO_SCALE;
                canvas.draw_image(&logo, w - size - LOGO_MARGIN, (h - size) / 2.0, size, size, LOGO_OPACITY);
            }
            Err(e) => log_asset_fallback("logo", &e),
        }

        if cfg.features.particles {
            draw_particles(&mut canvas, &self.theme);
        }

        let data = self.gather().await;
        let elements = plan_banner(&data, cfg, self.strings, &self.fonts);
        for element in &elements {
            self.paint(&mut canvas, element)?;
        }

        let png = canvas.encode_png()?;
        info!(bytes = png.len(), players = data.info.clients_online, "banner rendered");
        Ok(png)
    }

    fn paint(&self, canvas: &mut Canvas<'_>, element: &Element) -> Result<(), RenderError> {
        let theme = &self.theme;
        let glow = self.config.features.accent_glow;

        match element {
            Element::ServerName { x, y, text } => {
                canvas.text(*x, *y, text, TextStyle::new(28.0, theme.primary).bold())?;
            }
            Element::Underline { x0, x1, y } => {
                let shader = linear_gradient(
                    *x0,
                    *y,
                    *x1,
                    *y,
                    &[(0.0, theme.accent_alpha(0.5)), (1.0, Rgba::TRANSPARENT)],
                );
                canvas.stroke_path_shader(line_path(*x0, *y, *x1, *y), shader, 1.0);
            }
            Element::EventBadge { rect: (x, y, w, h), text } => {
                let shader = linear_gradient(
                    *x,
                    *y,
                    x + w,
                    *y,
                    &[(0.0, theme.accent_secondary), (1.0, theme.accent)],
                );
                canvas.fill_path_shader(rounded_rect_path(*x, *y, *w, *h, 4.0), shader);
                canvas.text(x + 10.0, y + 15.0, text, TextStyle::new(11.0, Rgba::WHITE).bold())?;
            }
            Element::StatCard(card) => draw_stat_card(canvas, card, theme, glow)?,
            Element::ProgressBar { rect, current, max } => {
                draw_progress_bar(canvas, *rect, *current, *max, theme)?;
            }
            Element::UserChips { x, y, row } => {
                draw_user_chips(canvas, (*x, *y), row, self.strings.no_players, theme)?;
            }
            Element::TopChannel { x, y, text } => {
                canvas.text(*x, *y, "★", TextStyle::new(11.0, theme.accent).bold())?;
                canvas.text(x + 14.0, *y, text, TextStyle::new(11.0, theme.secondary))?;
            }
            Element::LastJoined { x, y, text } => {
                canvas.text(*x, *y, "→", TextStyle::new(11.0, theme.accent_secondary).bold())?;
                canvas.text(x + 14.0, *y, text, TextStyle::new(11.0, theme.secondary))?;
            }
            Element::Clock { rect, time, date } => {
                draw_clock_card(canvas, *rect, time, date, theme, glow)?;
            }
            Element::Sparkline { rect, label, data, max } => {
                let (x, y, _, _) = *rect;
                canvas.text(x + 6.0, y - 4.0, label, TextStyle::new(10.0, theme.secondary))?;
                draw_sparkline(canvas, *rect, data, *max, self.strings.sparkline_loading, theme)?;
            }
            Element::FooterLine => draw_footer_line(canvas, theme),
        }
        Ok(())
    }
}

fn log_asset_fallback(kind: &str, err: &AssetError) {
    match err {
        AssetError::NotConfigured => {}
        other => debug!(asset = kind, error = %other, "image unavailable, using fallback"),
    }
}
