use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for mergetip
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MergetipConfig {
    /// GitHub defaults
    pub github: GitHubConfig,
    /// Generative extraction endpoint
    pub extractor: ExtractorConfig,
    /// Reward settlement settings
    pub reward: RewardConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    /// Fallback access token for read-only actions. Merging always uses the
    /// credential carried by the conversation.
    pub token: Option<String>,
    /// Repository used when the conversation does not name one
    pub default_repository: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    /// Chat-completions endpoint the extractor posts to
    pub endpoint: String,
    /// Model name sent with each request
    pub model: String,
    /// Bearer token for the endpoint (can be set via env var)
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewardConfig {
    /// Token contract receiving transfer calls
    pub token_contract: String,
    /// Decimals of the reward token
    pub token_decimals: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level when RUST_LOG is unset
    pub log_level: String,
}

impl Default for MergetipConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig {
                token: None, // Will be read from env var or mergetip.toml
                default_repository: None,
            },
            extractor: ExtractorConfig {
                endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key: None,
            },
            reward: RewardConfig {
                // STRK token contract
                token_contract:
                    "0x04718f5a0fc34cc1af16a1cdee98ffb20c31f5cd61d6ab07201858f4287c938d"
                        .to_string(),
                token_decimals: 18,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

impl MergetipConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (mergetip.toml)
    /// 3. Environment variables (prefixed with MERGETIP_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("mergetip.toml").exists() {
            builder = builder.add_source(File::with_name("mergetip"));
        }

        builder = builder.add_source(
            Environment::with_prefix("MERGETIP")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut mergetip_config: MergetipConfig = config.try_deserialize()?;

        // GitHub token can come from the plain GITHUB_TOKEN variable too
        if mergetip_config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                mergetip_config.github.token = Some(token);
            }
        }
        if mergetip_config.extractor.api_key.is_none() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                mergetip_config.extractor.api_key = Some(key);
            }
        }

        Ok(mergetip_config)
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<MergetipConfig, anyhow::Error>> =
    std::sync::LazyLock::new(MergetipConfig::load);

/// Get the global configuration
pub fn config() -> Result<&'static MergetipConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_an_eighteen_decimal_token() {
        let config = MergetipConfig::default();
        assert_eq!(config.reward.token_decimals, 18);
        assert!(config.reward.token_contract.starts_with("0x"));
    }
}
