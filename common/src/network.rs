use bigdecimal::BigDecimal;
use serde::Deserialize;

/// Which contract the loose-balance read targets, and therefore which
/// conversion path applies: a plain token contract returns token units
/// directly, an LP share contract is priced through the pool token.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LooseSource {
    Token,
    LpToken,
}

/// Where the LP token price comes from on this network: inline with
/// the locked-position query, or from a separate indexing endpoint.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LpPriceSource {
    Inline,
    Endpoint { url: String },
}

/// Static per-chain configuration. Loaded once, immutable at runtime.
#[derive(Deserialize, Debug, Clone)]
pub struct NetworkConfig {
    pub name: String,
    /// Indexer endpoint; may contain an `{api_key}` placeholder.
    pub subgraph_url: String,
    pub rpc_url: String,
    pub token_contract: String,
    pub lp_contract: Option<String>,
    pub vesting_contract: Option<String>,
    /// Share of a locked LP position that counts as the token, in [0, 1].
    pub multiplier: BigDecimal,
    pub loose_source: LooseSource,
    pub lp_price_source: LpPriceSource,
}

impl NetworkConfig {
    /// The contract the loose-balance `balanceOf` call targets, when
    /// one is configured.
    pub fn loose_contract(&self) -> Option<&str> {
        match self.loose_source {
            LooseSource::Token => Some(&self.token_contract),
            LooseSource::LpToken => self.lp_contract.as_deref(),
        }
    }
}
