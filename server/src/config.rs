use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Errors raised while loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Top-level configuration, loaded from banner.toml.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub teamspeak: TeamSpeakSection,
    pub banner: BannerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub web_address: String,
    /// Language code for banner labels and log messages ("de" or "en").
    pub lang: String,
    /// Seconds a rendered banner stays valid.
    pub cache_ttl: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            web_address: "0.0.0.0:3200".into(),
            lang: "de".into(),
            cache_ttl: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TeamSpeakSection {
    pub host: String,
    pub query_port: u16,
    /// Voice port of the virtual server to select after login.
    pub server_port: u16,
    pub username: String,
    pub password: String,
    /// Nickname the query client shows while connected.
    pub nickname: String,
}

impl Default for TeamSpeakSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            query_port: 10011,
            server_port: 9987,
            username: "serveradmin".into(),
            password: String::new(),
            nickname: "BannerBot".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    pub width: u32,
    pub height: u32,
    /// Background image path. Empty means the built-in gradient.
    pub background: String,
    /// TTF/OTF font path. Empty means a system sans-serif font.
    pub font: String,
    /// Logo drawn as a faint watermark. Empty disables it.
    pub logo: String,
    /// IANA timezone for the clock card.
    pub timezone: String,
    pub colors: Palette,
    pub features: Features,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 300,
            background: String::new(),
            font: String::new(),
            logo: String::new(),
            timezone: "Europe/Berlin".into(),
            colors: Palette::default(),
            features: Features::default(),
        }
    }
}

/// The eight banner colors. Values are CSS color strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub accent_secondary: String,
    pub online: String,
    pub away: String,
    pub card_bg: String,
    pub card_border: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: "#ffffff".into(),
            secondary: "#8b949e".into(),
            accent: "#00b4d8".into(),
            accent_secondary: "#7c3aed".into(),
            online: "#34d399".into(),
            away: "#fbbf24".into(),
            card_bg: "rgba(255, 255, 255, 0.05)".into(),
            card_border: "rgba(255, 255, 255, 0.08)".into(),
        }
    }
}

/// Optional widgets. Everything is on by default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Features {
    pub clock: bool,
    pub user_chips: bool,
    pub progress_bar: bool,
    pub sparkline: bool,
    pub top_channel: bool,
    pub last_joined: bool,
    pub particles: bool,
    pub accent_glow: bool,
    pub gradient_line: bool,
    /// Free-text badge under the server name. Empty hides the badge.
    pub event_text: String,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            clock: true,
            user_chips: true,
            progress_bar: true,
            sparkline: true,
            top_channel: true,
            last_joined: true,
            particles: true,
            accent_glow: true,
            gradient_line: true,
            event_text: String::new(),
        }
    }
}

impl AppConfig {
    /// Load config from a TOML file. Falls back to defaults if the file doesn't exist.
    /// Environment variables override TOML values.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
            Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            })?
        } else {
            info!("No config file found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("WEB_ADDRESS") {
            self.server.web_address = v;
        }
        if let Ok(v) = std::env::var("BANNER_LANG") {
            self.server.lang = v;
        }
        if let Ok(v) = std::env::var("CACHE_TTL")
            && let Ok(ttl) = v.parse()
        {
            self.server.cache_ttl = ttl;
        }
        if let Ok(v) = std::env::var("TS_HOST") {
            self.teamspeak.host = v;
        }
        if let Ok(v) = std::env::var("TS_QUERY_PORT")
            && let Ok(port) = v.parse()
        {
            self.teamspeak.query_port = port;
        }
        if let Ok(v) = std::env::var("TS_SERVER_PORT")
            && let Ok(port) = v.parse()
        {
            self.teamspeak.server_port = port;
        }
        if let Ok(v) = std::env::var("TS_USERNAME") {
            self.teamspeak.username = v;
        }
        if let Ok(v) = std::env::var("TS_PASSWORD") {
            self.teamspeak.password = v;
        }
    }
}
