use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    pub data_dir: String,
    pub shard_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryConfig {
    pub default_limit: usize,
}

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("SPANDB_CONFIG").unwrap_or_else(|_| "config".to_string());
    load_settings_from(&config_path)
}

/// Loads settings from an explicit path. The file is optional; every key
/// has a default so an empty deployment still starts.
pub fn load_settings_from(path: &str) -> Result<Settings, config::ConfigError> {
    config::Config::builder()
        .set_default("engine.data_dir", "data")?
        .set_default("engine.shard_count", 2_i64)?
        .set_default("logging.log_dir", "logs")?
        .set_default("logging.stdout_level", "info")?
        .set_default("logging.file_level", "debug")?
        .set_default("query.default_limit", 100_i64)?
        .add_source(config::File::with_name(path).required(false))
        .build()?
        .try_deserialize()
}
