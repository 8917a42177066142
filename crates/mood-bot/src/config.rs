use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;

/// Top-level bot configuration.
///
/// Loaded from defaults, then an optional JSON file, then environment
/// variables. Credentials are opaque strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    pub places: PlacesConfig,
    pub geocoder: GeocoderConfig,
    pub completion: CompletionConfig,
    pub http: HttpConfig,
    /// Maximum number of users whose last category is remembered.
    pub store_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Polling,
    Webhook,
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "polling" | "poll" => Ok(TransportMode::Polling),
            "webhook" => Ok(TransportMode::Webhook),
            other => Err(ConfigError::Invalid(format!("unknown transport mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: String,
    pub api_base_url: String,
    pub mode: TransportMode,
    /// Public origin Telegram posts updates to, e.g. `https://bot.example.com`.
    pub webhook_host: Option<String>,
    pub webhook_path: String,
    /// Sent to `setWebhook`; updates without a matching
    /// `X-Telegram-Bot-Api-Secret-Token` header are rejected.
    pub webhook_secret: Option<String>,
    pub listen_host: String,
    pub listen_port: u16,
    pub poll_timeout_secs: u64,
    /// Drop updates that queued up while the bot was offline.
    pub skip_pending_updates: bool,
}

impl TelegramConfig {
    pub fn webhook_url(&self) -> Option<String> {
        self.webhook_host.as_ref().map(|host| {
            format!(
                "{}/{}",
                host.trim_end_matches('/'),
                self.webhook_path.trim_start_matches('/')
            )
        })
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base_url: "https://api.telegram.org".to_string(),
            mode: TransportMode::Polling,
            webhook_host: None,
            webhook_path: "/webhook".to_string(),
            webhook_secret: None,
            listen_host: "0.0.0.0".to_string(),
            listen_port: 5000,
            poll_timeout_secs: 30,
            skip_pending_updates: true,
        }
    }
}

/// Which places-search binding is active in this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacesBackend {
    /// Commercial places API with radius and relevance sort.
    Foursquare,
    /// Maps vendor business search.
    YandexMaps,
    /// OpenStreetMap keyword search inside a bounding box.
    Nominatim,
}

impl FromStr for PlacesBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "foursquare" => Ok(PlacesBackend::Foursquare),
            "yandex" | "yandex_maps" => Ok(PlacesBackend::YandexMaps),
            "nominatim" | "osm" => Ok(PlacesBackend::Nominatim),
            other => Err(ConfigError::Invalid(format!("unknown places backend '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    pub backend: PlacesBackend,
    pub radius_m: u32,
    pub limit: usize,
    pub foursquare_api_key: Option<String>,
    pub foursquare_base_url: String,
    pub yandex_api_key: Option<String>,
    pub yandex_base_url: String,
    pub nominatim_base_url: String,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            backend: PlacesBackend::Foursquare,
            radius_m: 3000,
            limit: 5,
            foursquare_api_key: None,
            foursquare_base_url: "https://api.foursquare.com".to_string(),
            yandex_api_key: None,
            yandex_base_url: "https://search-maps.yandex.ru".to_string(),
            nominatim_base_url: "https://nominatim.openstreetmap.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Without a key the conversational fallback is disabled.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-3.5-turbo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Nominatim rejects requests without an identifying agent.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
            user_agent: "MoodBot".to_string(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            places: PlacesConfig::default(),
            geocoder: GeocoderConfig::default(),
            completion: CompletionConfig::default(),
            http: HttpConfig::default(),
            store_capacity: 10_000,
        }
    }
}

impl BotConfig {
    /// Load a JSON config file; missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Defaults or `path`, then process environment, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("TELEGRAM_TOKEN") {
            self.telegram.token = token;
        }
        if let Some(key) = get("OPENROUTER_API_KEY") {
            self.completion.api_key = Some(key);
        }
        if let Some(model) = get("COMPLETION_MODEL") {
            self.completion.model = model;
        }
        if let Some(key) = get("FOURSQUARE_API_KEY") {
            self.places.foursquare_api_key = Some(key);
        }
        if let Some(key) = get("YANDEX_API_KEY") {
            self.places.yandex_api_key = Some(key);
        }
        if let Some(backend) = get("PLACES_BACKEND") {
            self.places.backend = backend.parse()?;
        }
        if let Some(radius) = get("SEARCH_RADIUS_M") {
            self.places.radius_m = radius
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("SEARCH_RADIUS_M='{}'", radius)))?;
        }
        if let Some(host) = get("WEBHOOK_HOST") {
            self.telegram.webhook_host = Some(host);
            self.telegram.mode = TransportMode::Webhook;
        }
        if let Some(secret) = get("WEBHOOK_SECRET") {
            self.telegram.webhook_secret = Some(secret);
        }
        if let Some(mode) = get("BOT_MODE") {
            self.telegram.mode = mode.parse()?;
        }
        if let Some(port) = get("PORT") {
            self.telegram.listen_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT='{}'", port)))?;
        }
        Ok(())
    }

    /// Reject configurations the bot cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token.trim().is_empty() {
            return Err(ConfigError::Missing("TELEGRAM_TOKEN"));
        }
        if self.telegram.mode == TransportMode::Webhook && self.telegram.webhook_host.is_none() {
            return Err(ConfigError::Missing("WEBHOOK_HOST"));
        }
        if let Some(secret) = &self.telegram.webhook_secret {
            let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';
            if secret.is_empty() || secret.len() > 256 || !secret.chars().all(allowed) {
                return Err(ConfigError::Invalid(
                    "webhook_secret must be 1-256 of A-Z, a-z, 0-9, _ and -".into(),
                ));
            }
        }
        match self.places.backend {
            PlacesBackend::Foursquare if is_blank(&self.places.foursquare_api_key) => {
                return Err(ConfigError::Missing("FOURSQUARE_API_KEY"));
            }
            PlacesBackend::YandexMaps if is_blank(&self.places.yandex_api_key) => {
                return Err(ConfigError::Missing("YANDEX_API_KEY"));
            }
            _ => {}
        }
        if self.places.limit == 0 {
            return Err(ConfigError::Invalid("places.limit must be > 0".into()));
        }
        if self.places.radius_m == 0 {
            return Err(ConfigError::Invalid("places.radius_m must be > 0".into()));
        }
        if self.store_capacity == 0 {
            return Err(ConfigError::Invalid("store_capacity must be > 0".into()));
        }
        Ok(())
    }

    pub fn fallback_enabled(&self) -> bool {
        !is_blank(&self.completion.api_key)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
