use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

use storage::StorageSettings;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub moderation: ModerationSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
    // 每个请求传给 Store/Analyzer 的取消上下文超时
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct ModerationSettings {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_map = collect_env_vars();

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("server.request_timeout_secs", 10)?
            .set_default("storage.provider", "sqlite")?
            .set_default("storage.url", "sqlite://data/remarka.db")?
            .set_default("moderation.api_key", "")?
            .set_default("moderation.model", "gpt-3.5-turbo")?
            .set_default(
                "moderation.endpoint",
                "https://api.openai.com/v1/chat/completions",
            )?
            .set_default("moderation.timeout_secs", 30)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(
                &serde_json::to_string(&env_map)
                    .expect("Environment variables should serialize to JSON"),
                config::FileFormat::Json,
            ))
            .build()?;

        s.try_deserialize()
    }
}

fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("REMARKA_"))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches("REMARKA_")
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
