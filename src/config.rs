use std::net::IpAddr;

use crate::validation::BlankPolicy;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Whether whitespace-only field values count as missing.
    pub blank_policy: BlankPolicy,
    /// Largest accepted request body, enforced before the handler runs.
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            blank_policy: BlankPolicy::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Listen address: {}:{}", config.host, config.port);
        tracing::debug!("Blank field policy: {:?}", config.blank_policy);
        tracing::debug!("Max body size: {} bytes", config.max_body_bytes);

        Ok(config)
    }

    /// Builds a config from any key lookup; unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            host: match var("HOST") {
                Some(host) => host
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("HOST must be a valid IP address"))?,
                None => defaults.host,
            },
            port: match var("PORT") {
                Some(port) => port
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
                None => defaults.port,
            },
            blank_policy: match var("LEAD_BLANK_POLICY") {
                Some(policy) => policy.parse()?,
                None => defaults.blank_policy,
            },
            max_body_bytes: match var("MAX_BODY_BYTES") {
                Some(limit) => limit
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("MAX_BODY_BYTES must be a positive integer"))
                    .and_then(|limit: usize| {
                        if limit == 0 {
                            anyhow::bail!("MAX_BODY_BYTES cannot be zero");
                        }
                        Ok(limit)
                    })?,
                None => defaults.max_body_bytes,
            },
        })
    }
}
