use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub access: AccessSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelSettings {
    pub base_url: String,
    pub name: String,
    pub api_key: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub default_media_type: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisSettings {
    pub value_column: String,
    #[serde(default)]
    pub label_column: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AccessSettings {
    #[serde(default)]
    pub site_password: Option<String>,
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8000")?
        .set_default("model.base_url", "https://api.openai.com/v1")?
        .set_default("model.name", "gpt-4o")?
        .set_default("model.api_key", "")?
        .set_default("model.max_tokens", 500)?
        .set_default("model.timeout_secs", 60)?
        .set_default("model.default_media_type", "image/jpeg")?
        .set_default("analysis.value_column", "Value")
}

/// Load `config/app.toml` (optional), then `CHARTCHECK__*` environment
/// variables, then `OPENAI_KEY` for the model API key.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = defaults()?
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(
            config::Environment::with_prefix("CHARTCHECK")
                .prefix_separator("__")
                .separator("__"),
        )
        .set_override_option("model.api_key", std::env::var("OPENAI_KEY").ok())?
        .build()
        .context("Failed to build configuration")?;

    settings
        .try_deserialize()
        .context("Failed to parse configuration")
}
