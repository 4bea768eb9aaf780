use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Default character budget for text forwarded to the completion model.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    pub upload_dir: PathBuf,
    pub llm_base_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub max_prompt_chars: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: 0.0.0.0");
                "0.0.0.0".to_string()
            }),
            server_port: Self::parse_env_var("SERVER_PORT", 5002)
                .context("Failed to parse SERVER_PORT")?,
            max_file_size_mb: Self::parse_env_var("MAX_FILE_SIZE_MB", 10)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    info!("UPLOAD_DIR not set, using default: ./uploads");
                    PathBuf::from("./uploads")
                }),
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.upstage.ai/v1/solar".to_string()),
            llm_api_key: env::var("LLM_API_KEY").unwrap_or_default(),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "solar-pro".to_string()),
            max_prompt_chars: Self::parse_env_var("MAX_PROMPT_CHARS", DEFAULT_MAX_PROMPT_CHARS)
                .context("Failed to parse MAX_PROMPT_CHARS")?,
        };

        config.validate()?;

        if config.llm_api_key.is_empty() {
            warn!("No LLM API key configured. Set LLM_API_KEY environment variable.");
        }

        info!(
            host = %config.server_host,
            port = config.server_port,
            upload_dir = %config.upload_dir.display(),
            model = %config.llm_model,
            max_prompt_chars = config.max_prompt_chars,
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.max_prompt_chars == 0 {
            return Err(anyhow::anyhow!("MAX_PROMPT_CHARS must be greater than 0"));
        }
        if self.llm_base_url.is_empty() {
            return Err(anyhow::anyhow!("LLM_BASE_URL must not be empty"));
        }
        Ok(())
    }
}
