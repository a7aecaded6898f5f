use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Server-side credential, never sent to callers
    pub api_key: Option<String>,
    /// Forced model name; auto-detected when unset
    pub model: Option<String>,
    pub api_base: String,
    /// Used when the model list cannot be read
    pub fallback_model: String,
    /// Lifetime of an auto-detected model choice (accepts "30m", "1h", ...)
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub model_cache_ttl_secs: u64,
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from the given path, or the first config.toml found
    /// 2. Override with environment variables
    /// 3. Validate the final configuration
    pub fn load(path: Option<&str>) -> Result<Self, anyhow::Error> {
        let path = path.map(str::to_string).or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - GEMINI_API_KEY: Gemini API key
    /// - GEMINI_MODEL: Forced model name (empty means auto-detect)
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT: Server port (default: 8787)
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,market_analyzer=debug")
    /// - APP_GEMINI_API_BASE: API base URL
    /// - APP_GEMINI_MODEL_CACHE_TTL: Model cache TTL (accepts "1800", "30m", "1h")
    /// - APP_GEMINI_TIMEOUT_SECS: Upstream request timeout (accepts "30s", "1m")
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
            tracing::info!("Override gemini.api_key from env");
        }

        if let Some(model) = var("GEMINI_MODEL") {
            self.gemini.model = Some(model);
            tracing::info!("Override gemini.model from env: {:?}", self.gemini.model);
        }

        if let Some(host) = var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Some(port) = var("APP_SERVER_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
            tracing::info!("Override server.port from env: {}", self.server.port);
        }

        if let Some(level) = var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Some(base) = var("APP_GEMINI_API_BASE") {
            self.gemini.api_base = base;
            tracing::info!("Override gemini.api_base from env: {}", self.gemini.api_base);
        }

        if let Some(ttl) = var("APP_GEMINI_MODEL_CACHE_TTL") {
            match parse_duration_to_secs(&ttl) {
                Ok(val) => {
                    self.gemini.model_cache_ttl_secs = val;
                    tracing::info!(
                        "Override gemini.model_cache_ttl_secs from env: {}",
                        self.gemini.model_cache_ttl_secs
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_GEMINI_MODEL_CACHE_TTL '{}': {} (keep {})",
                    ttl,
                    e,
                    self.gemini.model_cache_ttl_secs
                ),
            }
        }

        if let Some(timeout) = var("APP_GEMINI_TIMEOUT_SECS") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.gemini.timeout_secs = val;
                    tracing::info!("Override gemini.timeout_secs from env: {}", val);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_GEMINI_TIMEOUT_SECS '{}': {} (keep {})",
                    timeout,
                    e,
                    self.gemini.timeout_secs
                ),
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        // A missing key is reported per request, the server still starts
        if self.gemini.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            tracing::warn!("GEMINI_API_KEY is not set; /analyze will answer 500");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.gemini.api_base.trim().is_empty() {
            anyhow::bail!("gemini.api_base cannot be empty");
        }

        if self.gemini.timeout_secs == 0 {
            anyhow::bail!("gemini.timeout_secs must be > 0");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8787 }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            fallback_model: "gemini-1.5-flash".to_string(),
            model_cache_ttl_secs: 30 * 60,
            timeout_secs: 60,
        }
    }
}

// Keeps the API key out of logs
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("fallback_model", &self.fallback_model)
            .field("model_cache_ttl_secs", &self.model_cache_ttl_secs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,market_analyzer=debug".to_string(), file: None }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Ok(n),
        "m" | "min" | "mins" | "minute" | "minutes" => Ok(n * 60),
        "h" | "hr" | "hour" | "hours" => Ok(n * 60 * 60),
        _ => Err(format!("unsupported unit: {}", unit)),
    }
}

// Custom serde deserializer to support numeric or human-friendly string values
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '30s', '5m', '1h'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v >= 0 { Ok(v as u64) } else { Err(E::custom("negative not allowed")) }
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}
