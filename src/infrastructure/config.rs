use anyhow::Context;
use chrono::FixedOffset;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub openweather: OpenWeatherSettings,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenWeatherSettings {
    #[serde(default = "default_openweather_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiSettings {
    #[serde(default = "default_gemini_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DisplaySettings {
    /// Offset from UTC used for every rendered date and time
    #[serde(default)]
    pub utc_offset_seconds: i32,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_openweather_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for OpenWeatherSettings {
    fn default() -> Self {
        Self {
            base_url: default_openweather_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: default_gemini_url(),
            api_key: String::new(),
            model: default_gemini_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OpenWeatherSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GeminiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DisplaySettings {
    pub fn offset(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_seconds)
            .with_context(|| format!("Invalid display.utc_offset_seconds: {}", self.utc_offset_seconds))
    }
}

impl AppConfig {
    /// Fill API keys left empty by the config sources from the conventional
    /// environment variables.
    fn with_key_fallback(mut self, openweather: Option<String>, gemini: Option<String>) -> Self {
        if self.openweather.api_key.is_empty() {
            self.openweather.api_key = openweather.unwrap_or_default();
        }
        if self.gemini.api_key.is_empty() {
            self.gemini.api_key = gemini.unwrap_or_default();
        }
        self
    }
}

/// Load `config/app.toml` (optional) overlaid with `APP__SECTION__KEY`
/// environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

    let app_config = build_config(builder)?.with_key_fallback(
        std::env::var("OPENWEATHER_API_KEY").ok(),
        std::env::var("GEMINI_API_KEY").ok(),
    );

    if app_config.openweather.api_key.is_empty() {
        tracing::warn!("No OpenWeather API key configured; air pollution requests will fail");
    }
    if app_config.gemini.api_key.is_empty() {
        tracing::warn!("No Gemini API key configured; advisory text will fall back");
    }

    Ok(app_config)
}

fn build_config(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<AppConfig> {
    let settings = builder.build()?;
    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> AppConfig {
        build_config(
            config::Config::builder().add_source(config::File::from_str(toml, config::FileFormat::Toml)),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = from_toml("");

        assert_eq!(cfg.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.openweather.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.gemini.model, "gemini-1.5-flash");
        assert_eq!(cfg.display.offset().unwrap(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn test_file_overrides() {
        let cfg = from_toml(
            r#"
            [openweather]
            api_key = "ow-key"
            timeout_secs = 3

            [display]
            utc_offset_seconds = 19800
            "#,
        );

        assert_eq!(cfg.openweather.api_key, "ow-key");
        assert_eq!(cfg.openweather.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.openweather.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(cfg.display.offset().unwrap().local_minus_utc(), 19800);
    }

    #[test]
    fn test_key_fallback_only_fills_empty_keys() {
        let cfg = from_toml("[openweather]\napi_key = \"from-file\"")
            .with_key_fallback(Some("from-env".to_string()), Some("gemini-env".to_string()));

        assert_eq!(cfg.openweather.api_key, "from-file");
        assert_eq!(cfg.gemini.api_key, "gemini-env");
    }

    #[test]
    fn test_invalid_offset() {
        let cfg = from_toml("[display]\nutc_offset_seconds = 90000");
        assert!(cfg.display.offset().is_err());
    }
}
