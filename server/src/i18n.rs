use chrono::Locale;

/// Localized texts for the banner, the preview page and operator logs.
#[derive(Debug)]
pub struct Strings {
    pub code: &'static str,

    // ── Banner ──
    pub date_locale: Locale,
    /// strftime pattern for the clock card's time line.
    pub time_format: &'static str,
    /// strftime pattern for the clock card's date line.
    pub date_format: &'static str,
    pub online: &'static str,
    pub channels: &'static str,
    pub uptime: &'static str,
    pub ping: &'static str,
    pub no_players: &'static str,
    pub last_joined: &'static str,
    pub sparkline_label: &'static str,
    pub sparkline_loading: &'static str,

    // ── Logs ──
    pub font_loaded: &'static str,
    pub ts_connecting: &'static str,
    pub ts_connected: &'static str,
    pub ts_connection_lost: &'static str,
    pub ts_connection_failed: &'static str,
    pub ts_retry: &'static str,
    pub ts_server_info_error: &'static str,
    pub server_banner_error: &'static str,
    pub server_running: &'static str,
    pub server_shutdown: &'static str,
    pub server_banner_render_fail: &'static str,

    // ── Preview page ──
    pub preview_title: &'static str,
    pub preview_subtitle: &'static str,
    pub preview_refresh: &'static str,
    pub preview_endpoints: &'static str,
}

pub static DE: Strings = Strings {
    code: "de",

    date_locale: Locale::de_DE,
    time_format: "%H:%M",
    date_format: "%a., %d. %b. %Y",
    online: "ONLINE",
    channels: "CHANNELS",
    uptime: "UPTIME",
    ping: "PING",
    no_players: "Keine Spieler online",
    last_joined: "Zuletzt",
    sparkline_label: "ONLINE VERLAUF",
    sparkline_loading: "Daten werden gesammelt…",

    font_loaded: "Font geladen",
    ts_connecting: "Verbinde zu",
    ts_connected: "Verbunden!",
    ts_connection_lost: "Verbindung verloren. Reconnect in 10s...",
    ts_connection_failed: "Verbindung fehlgeschlagen",
    ts_retry: "Retry in 10s...",
    ts_server_info_error: "serverinfo Fehler",
    server_banner_error: "Banner-Render Fehler",
    server_running: "Läuft auf",
    server_shutdown: "Herunterfahren...",
    server_banner_render_fail: "Banner konnte nicht gerendert werden",

    preview_title: "TeamSpeak Banner",
    preview_subtitle: "Live-Vorschau – aktualisiert sich automatisch",
    preview_refresh: "Banner aktualisieren",
    preview_endpoints: "Endpunkte",
};

pub static EN: Strings = Strings {
    code: "en",

    date_locale: Locale::en_US,
    time_format: "%I:%M %p",
    date_format: "%a, %b %d, %Y",
    online: "ONLINE",
    channels: "CHANNELS",
    uptime: "UPTIME",
    ping: "PING",
    no_players: "No players online",
    last_joined: "Last joined",
    sparkline_label: "ONLINE HISTORY",
    sparkline_loading: "Collecting data…",

    font_loaded: "Font loaded",
    ts_connecting: "Connecting to",
    ts_connected: "Connected!",
    ts_connection_lost: "Connection lost. Reconnect in 10s...",
    ts_connection_failed: "Connection failed",
    ts_retry: "Retry in 10s...",
    ts_server_info_error: "serverinfo error",
    server_banner_error: "Banner render error",
    server_running: "Running on",
    server_shutdown: "Shutting down...",
    server_banner_render_fail: "Could not render banner",

    preview_title: "TeamSpeak Banner",
    preview_subtitle: "Live preview – auto-refreshing",
    preview_refresh: "Refresh banner",
    preview_endpoints: "Endpoints",
};

impl Strings {
    /// Look up the table for a language code. Unknown codes fall back to German.
    pub fn for_lang(code: &str) -> &'static Strings {
        match code {
            "en" => &EN,
            _ => &DE,
        }
    }
}
