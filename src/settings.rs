// src/settings.rs

use std::{env, net::SocketAddr, path::Path, time::Duration};

use clap::Parser;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_LLM_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash";

/// The only environment variable read: the model service credential.
pub const API_KEY_ENV: &str = "API_KEY";

#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Path to the local configuration TOML file.
    #[arg(short, value_name = "CONFIG_PATH")]
    pub config: std::path::PathBuf,

    /// Path to the certificate file.
    #[arg(long, value_name = "CERT_PATH", requires = "key")]
    pub cert: Option<std::path::PathBuf>,

    /// Path to the key file.
    #[arg(long, value_name = "KEY_PATH", requires = "cert")]
    pub key: Option<std::path::PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Web {
    #[serde(deserialize_with = "deserialize_socket_addr")]
    pub address: SocketAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl LlmSettings {
    /// The configured key, treating a blank value as missing.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    pub stage_delay_ms: u64,
}

impl UploadSettings {
    pub fn stage_delay(&self) -> Duration {
        Duration::from_millis(self.stage_delay_ms)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub web: Web,
    pub llm: LlmSettings,
    pub upload: UploadSettings,
}

impl Settings {
    /// Load settings from the given TOML file, with sane defaults. The
    /// `API_KEY` environment variable takes precedence over `llm.api_key`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load(path, env::var(API_KEY_ENV).ok())
    }

    pub fn load(path: &Path, api_key: Option<String>) -> Result<Self, ConfigError> {
        let builder = ConfigBuilder::<DefaultState>::default()
            .set_default("web.address", DEFAULT_ADDR)?
            .set_default("llm.base_url", DEFAULT_LLM_URL)?
            .set_default("llm.model", DEFAULT_LLM_MODEL)?
            .set_default("llm.temperature", 0.1)?
            .set_default("llm.timeout_secs", 60)?
            .set_default("upload.stage_delay_ms", 1500)?;

        let cfg = builder
            .add_source(File::from(path))
            .set_override_option("llm.api_key", api_key)?
            .build()?;

        cfg.try_deserialize()
    }
}

fn deserialize_socket_addr<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}
