use std::env;
use std::time::Duration;

use anyhow::Context;
use orders_types::domain::page::DEFAULT_PAGE_SIZE;
use reqwest::Url;

pub const ENDPOINT_VAR: &str = "ORDERS_API_ENDPOINT";
pub const TIMEOUT_VAR: &str = "ORDERS_API_TIMEOUT_SECS";
pub const PAGE_SIZE_VAR: &str = "ORDERS_PAGE_SIZE";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub api_endpoint: Url,
    pub timeout: Option<Duration>,
    pub page_size: u32,
}

impl StoreConfig {
    pub fn new(api_endpoint: &str) -> anyhow::Result<Self> {
        let api_endpoint = Url::parse(api_endpoint)
            .with_context(|| format!("invalid {ENDPOINT_VAR}: {api_endpoint}"))?;
        Ok(Self {
            api_endpoint,
            timeout: None,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let endpoint = env::var(ENDPOINT_VAR).with_context(|| format!("{ENDPOINT_VAR} not set"))?;
        let mut config = Self::new(&endpoint)?;

        if let Ok(raw) = env::var(TIMEOUT_VAR) {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("invalid {TIMEOUT_VAR}: {raw}"))?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Ok(raw) = env::var(PAGE_SIZE_VAR) {
            let size: u32 = raw
                .parse()
                .with_context(|| format!("invalid {PAGE_SIZE_VAR}: {raw}"))?;
            if size == 0 {
                anyhow::bail!("{PAGE_SIZE_VAR} must be > 0");
            }
            config.page_size = size;
        }
        Ok(config)
    }
}
