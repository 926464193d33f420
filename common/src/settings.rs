use crate::{LooseSource, LpPriceSource, NetworkConfig};
use bigdecimal::BigDecimal;
use config::{Config, File};
use serde::Deserialize;
use std::{path::Path, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

/// Site-wide configuration supplied by the host application.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(default)]
    pub indexer_api_key: Option<String>,
    /// TTL for a user's cached total, in minutes.
    #[serde(default = "default_balance_cache_minutes")]
    pub balance_cache_minutes: u64,
    /// TTL for the process-wide price quote, in minutes.
    #[serde(default = "default_price_cache_minutes")]
    pub price_cache_minutes: u64,
    #[serde(default = "default_network_timeout_secs")]
    pub network_timeout_secs: u64,
    #[serde(default = "default_ens_resolver_url")]
    pub ens_resolver_url: String,
    #[serde(default = "default_price_url")]
    pub price_url: String,
    #[serde(default = "default_price_coin_id")]
    pub price_coin_id: String,
    /// Ordered `group:amount` pairs separated by `|`.
    #[serde(default)]
    pub group_values: String,
    #[serde(default = "default_networks")]
    pub networks: Vec<NetworkConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRequirement {
    pub group: String,
    pub required: BigDecimal,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Settings>()?;

        Ok(settings)
    }

    pub fn balance_ttl(&self) -> Duration {
        Duration::from_secs(self.balance_cache_minutes * 60)
    }

    pub fn price_ttl(&self) -> Duration {
        Duration::from_secs(self.price_cache_minutes * 60)
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }

    /// Parses `group_values`, skipping malformed entries.
    pub fn group_requirements(&self) -> Vec<GroupRequirement> {
        self.group_values
            .split('|')
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| {
                let Some((group, amount)) = entry.split_once(':') else {
                    warn!(entry, "skipping group entry without `:`");
                    return None;
                };

                match BigDecimal::from_str(amount.trim()) {
                    Ok(required) => Some(GroupRequirement {
                        group: group.trim().to_string(),
                        required,
                    }),
                    Err(_) => {
                        warn!(entry, "skipping group entry with invalid amount");
                        None
                    }
                }
            })
            .collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            indexer_api_key: None,
            balance_cache_minutes: default_balance_cache_minutes(),
            price_cache_minutes: default_price_cache_minutes(),
            network_timeout_secs: default_network_timeout_secs(),
            ens_resolver_url: default_ens_resolver_url(),
            price_url: default_price_url(),
            price_coin_id: default_price_coin_id(),
            group_values: String::new(),
            networks: default_networks(),
        }
    }
}

fn default_balance_cache_minutes() -> u64 {
    30
}

fn default_price_cache_minutes() -> u64 {
    5
}

fn default_network_timeout_secs() -> u64 {
    5
}

fn default_ens_resolver_url() -> String {
    "https://api.ensideas.com/ens/resolve".to_string()
}

fn default_price_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price?ids=radiant-capital&vs_currencies=usd&precision=3"
        .to_string()
}

fn default_price_coin_id() -> String {
    "radiant-capital".to_string()
}

/// The mainnet deployments the original integration shipped with.
fn default_networks() -> Vec<NetworkConfig> {
    let multiplier = |raw: &str| {
        BigDecimal::from_str(raw).unwrap_or_else(|_| BigDecimal::from(1))
    };

    vec![
        NetworkConfig {
            name: "arbitrum".to_string(),
            subgraph_url:
                "https://api.thegraph.com/subgraphs/name/radiantcapitaldevelopment/radiantcapital"
                    .to_string(),
            rpc_url: "https://arb1.arbitrum.io/rpc".to_string(),
            token_contract: "0x3082cc23568ea640225c2467653db90e9250aaa0".to_string(),
            lp_contract: None,
            vesting_contract: None,
            multiplier: multiplier("0.8"),
            loose_source: LooseSource::Token,
            lp_price_source: LpPriceSource::Inline,
        },
        NetworkConfig {
            name: "bsc".to_string(),
            subgraph_url:
                "https://api.thegraph.com/subgraphs/name/radiantcapitaldevelopment/radiant-bsc"
                    .to_string(),
            rpc_url: "https://bsc-dataseed.binance.org".to_string(),
            token_contract: "0xf7de7e8a6bd59ed41a4b5fe50278b3b7f31384df".to_string(),
            lp_contract: None,
            vesting_contract: None,
            multiplier: multiplier("0.5"),
            loose_source: LooseSource::Token,
            lp_price_source: LpPriceSource::Inline,
        },
    ]
}
