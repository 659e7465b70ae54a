use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use crate::core::DeliveryPolicy;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Application configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    pub embedding: AzureDeploymentSettings,
    pub chat: AzureDeploymentSettings,
    #[serde(default)]
    pub completion: CompletionSettings,
    pub whatsapp: WhatsAppSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub key: String,
    #[serde(default = "default_clinic_table")]
    pub clinic_table: String,
    #[serde(default = "default_match_function")]
    pub match_function: String,
    /// Table holding service documents and their embeddings
    #[serde(default = "default_services_table")]
    pub services_table: String,
}

fn default_clinic_table() -> String { "clinic_info".to_string() }
fn default_match_function() -> String { "match_services".to_string() }
fn default_services_table() -> String { "services".to_string() }

/// One Azure OpenAI deployment (used for both embeddings and chat)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AzureDeploymentSettings {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub deployment: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionSettings {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            currency: default_currency(),
        }
    }
}

fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 500 }
fn default_currency() -> String { "tenge".to_string() }

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WhatsAppSettings {
    pub token: String,
    pub phone_number_id: String,
    /// Default recipient when the request does not name one
    pub recipient: String,
    #[serde(default = "default_whatsapp_api_base")]
    pub api_base: String,
    #[serde(default = "default_whatsapp_api_version")]
    pub api_version: String,
}

fn default_whatsapp_api_base() -> String { "https://graph.facebook.com".to_string() }
fn default_whatsapp_api_version() -> String { "v22.0".to_string() }

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_match_count")]
    pub match_count: usize,
    #[serde(default)]
    pub delivery_policy: DeliveryPolicy,
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            match_count: default_match_count(),
            delivery_policy: DeliveryPolicy::default(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

impl PipelineSettings {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

fn default_match_count() -> usize { 5 }
fn default_call_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CacheSettings {
    /// Clinic info cache lifetime. Absent or 0 disables the cache.
    pub clinic_info_ttl_secs: Option<u64>,
}

impl CacheSettings {
    pub fn clinic_info_ttl(&self) -> Option<Duration> {
        self.clinic_info_ttl_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

/// Flat variable names used by existing deployments, mapped to config keys.
/// These override everything else.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("SUPABASE_URL", "supabase.url"),
    ("SUPABASE_KEY", "supabase.key"),
    ("AZURE_OPENAI_DEPLOYMENT_NAME", "embedding.deployment"),
    ("AZURE_OPENAI_API_VERSION", "embedding.api_version"),
    ("AZURE_OPENAI_ENDPOINT", "embedding.endpoint"),
    ("AZURE_OPENAI_API_KEY", "embedding.api_key"),
    ("AZURE_OPENAI_CHAT_API_KEY", "chat.api_key"),
    ("AZURE_OPENAI_CHAT_API_VERSION", "chat.api_version"),
    ("AZURE_OPENAI_CHAT_ENDPOINT", "chat.endpoint"),
    ("AZURE_OPENAI_CHAT_MODEL", "chat.deployment"),
    ("WHATSAPP_TOKEN", "whatsapp.token"),
    ("WHATSAPP_PHONE_NUMBER_ID", "whatsapp.phone_number_id"),
    ("WHATSAPP_RECIPIENT", "whatsapp.recipient"),
];

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables prefixed with CLINIC, e.g. CLINIC__PIPELINE__MATCH_COUNT
    /// 5. Legacy flat variables such as SUPABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("CLINIC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(apply_legacy_env(settings)?)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CLINIC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(apply_legacy_env(settings)?)
    }

    /// Process-wide settings, loaded on first use
    ///
    /// Every call after the first successful one returns the same instance.
    pub fn global() -> Result<&'static Settings, ConfigError> {
        if let Some(settings) = SETTINGS.get() {
            return Ok(settings);
        }

        let loaded = Self::load()?;
        Ok(SETTINGS.get_or_init(|| loaded))
    }

    /// Deserialize and validate an already built [`Config`]
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject empty required values and nonsensical limits
    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("supabase.url", &self.supabase.url),
            ("supabase.key", &self.supabase.key),
            ("embedding.endpoint", &self.embedding.endpoint),
            ("embedding.api_key", &self.embedding.api_key),
            ("embedding.api_version", &self.embedding.api_version),
            ("embedding.deployment", &self.embedding.deployment),
            ("chat.endpoint", &self.chat.endpoint),
            ("chat.api_key", &self.chat.api_key),
            ("chat.api_version", &self.chat.api_version),
            ("chat.deployment", &self.chat.deployment),
            ("whatsapp.token", &self.whatsapp.token),
            ("whatsapp.phone_number_id", &self.whatsapp.phone_number_id),
            ("whatsapp.recipient", &self.whatsapp.recipient),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!("{} must not be empty", key)));
            }
        }

        if self.pipeline.match_count == 0 {
            return Err(ConfigError::Message("pipeline.match_count must be at least 1".to_string()));
        }
        if self.pipeline.call_timeout_secs == 0 {
            return Err(ConfigError::Message("pipeline.call_timeout_secs must be at least 1".to_string()));
        }

        Ok(())
    }
}

/// Apply [`LEGACY_ENV_KEYS`] overrides from the process environment
fn apply_legacy_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in LEGACY_ENV_KEYS {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(*key, value)?;
        }
    }

    builder.build()
}
