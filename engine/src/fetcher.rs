use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use primitive_types::U256;
use radiant_common::{
    decimal::{from_price_raw, from_wei},
    LooseSource, LpPriceSource, NetworkConfig, ResolvedAddress,
};
use radiant_providers::{
    evm::jsonrpc::{self, CallData},
    price::PriceOracle,
    subgraph::{self, LockedQuery},
};
use std::sync::Arc;
use tracing::{debug, warn};

#[async_trait]
pub trait FetchNetworkTotal: Send + Sync {
    async fn network_total(&self, network: &NetworkConfig, address: &ResolvedAddress)
        -> BigDecimal;
}

/// Computes one network's contribution: locked + loose + vested, in
/// token units at full precision. Never fails; each component that
/// cannot be read degrades to zero.
pub struct NetworkBalanceFetcher {
    client: reqwest::Client,
    oracle: Arc<PriceOracle>,
    indexer_api_key: Option<String>,
}

impl NetworkBalanceFetcher {
    pub fn new(
        client: reqwest::Client,
        oracle: Arc<PriceOracle>,
        indexer_api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            oracle,
            indexer_api_key,
        }
    }

    fn indexer_url(&self, network: &NetworkConfig, raw: &str) -> Option<String> {
        let url = subgraph::keyed_url(raw, self.indexer_api_key.as_deref());

        if url.is_none() {
            warn!(network = %network.name, "indexer url needs an api key, none configured");
        }

        url
    }

    async fn locked_position(
        &self,
        network: &NetworkConfig,
        address: &ResolvedAddress,
    ) -> LockedQuery {
        let Some(url) = self.indexer_url(network, &network.subgraph_url) else {
            return LockedQuery::default();
        };
        let with_price = network.lp_price_source == LpPriceSource::Inline;

        match subgraph::locked_position(&self.client, &url, address.as_str(), with_price).await {
            Ok(result) => result,
            Err(err) => {
                warn!(network = %network.name, %err, "locked position query failed");
                LockedQuery::default()
            }
        }
    }

    async fn lp_price(
        &self,
        network: &NetworkConfig,
        inline_price: Option<U256>,
    ) -> Option<BigDecimal> {
        let raw = match &network.lp_price_source {
            LpPriceSource::Inline => inline_price,
            LpPriceSource::Endpoint { url } => {
                let url = self.indexer_url(network, url)?;

                match subgraph::lp_token_price(&self.client, &url).await {
                    Ok(price) => price,
                    Err(err) => {
                        warn!(network = %network.name, %err, "lp price query failed");
                        None
                    }
                }
            }
        };

        raw.map(from_price_raw)
    }

    async fn contract_uint(
        &self,
        network: &NetworkConfig,
        contract: &str,
        call_data: &CallData,
        word: Option<usize>,
    ) -> Option<U256> {
        let result = jsonrpc::eth_call(&self.client, &network.rpc_url, contract, call_data).await;

        let decoded = result.and_then(|payload| match word {
            Some(index) => jsonrpc::decode_word(&payload, index),
            None => jsonrpc::decode_uint(&payload),
        });

        match decoded {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(network = %network.name, contract, %err, "contract read failed");
                None
            }
        }
    }

    async fn loose(
        &self,
        network: &NetworkConfig,
        address: &ResolvedAddress,
        lp_price: Option<&BigDecimal>,
        usd_price: Option<&BigDecimal>,
    ) -> BigDecimal {
        let Some(contract) = network.loose_contract() else {
            warn!(network = %network.name, "no loose contract configured");
            return BigDecimal::zero();
        };

        let call_data = CallData::balance_of(address.as_str());
        match self.contract_uint(network, contract, &call_data, None).await {
            Some(raw) => loose_component(raw, network.loose_source, lp_price, usd_price),
            None => BigDecimal::zero(),
        }
    }

    async fn vested(&self, network: &NetworkConfig, address: &ResolvedAddress) -> BigDecimal {
        let Some(contract) = network.vesting_contract.as_deref() else {
            return BigDecimal::zero();
        };

        let call_data = CallData::vested(address.as_str());
        // the withdrawable amount is the second word of the tuple return
        match self
            .contract_uint(network, contract, &call_data, Some(1))
            .await
        {
            Some(raw) => from_wei(raw),
            None => BigDecimal::zero(),
        }
    }
}

#[async_trait]
impl FetchNetworkTotal for NetworkBalanceFetcher {
    async fn network_total(
        &self,
        network: &NetworkConfig,
        address: &ResolvedAddress,
    ) -> BigDecimal {
        let usd_price = self.oracle.usd_price().await;

        let indexed = self.locked_position(network, address).await;
        // the inline price stands on its own, a user without a locked
        // position can still hold loose lp tokens that need it
        let lp_price = self.lp_price(network, indexed.lp_token_price).await;

        let locked = indexed
            .position
            .map(|position| {
                locked_component(
                    position.locked_balance,
                    lp_price.as_ref(),
                    usd_price.as_ref(),
                    &network.multiplier,
                )
            })
            .unwrap_or_else(BigDecimal::zero);

        let loose = self
            .loose(network, address, lp_price.as_ref(), usd_price.as_ref())
            .await;
        let vested = self.vested(network, address).await;

        debug!(
            network = %network.name,
            %locked, %loose, %vested,
            "network components"
        );

        locked + loose + vested
    }
}

/// `(locked_wei / 1e18) * lp_price * multiplier / usd_price`, zero
/// without a usable LP or USD price.
fn locked_component(
    locked_balance: U256,
    lp_price: Option<&BigDecimal>,
    usd_price: Option<&BigDecimal>,
    multiplier: &BigDecimal,
) -> BigDecimal {
    let (Some(lp_price), Some(usd_price)) = (lp_price, usd_price) else {
        return BigDecimal::zero();
    };

    if usd_price.is_zero() {
        return BigDecimal::zero();
    }

    let locked_usd = from_wei(locked_balance) * lp_price;

    locked_usd * multiplier / usd_price
}

/// A plain-token read is already token units; an LP share read is
/// priced through the pool token and back into token units.
fn loose_component(
    raw: U256,
    source: LooseSource,
    lp_price: Option<&BigDecimal>,
    usd_price: Option<&BigDecimal>,
) -> BigDecimal {
    match source {
        LooseSource::Token => from_wei(raw),
        LooseSource::LpToken => {
            let (Some(lp_price), Some(usd_price)) = (lp_price, usd_price) else {
                return BigDecimal::zero();
            };

            if usd_price.is_zero() {
                return BigDecimal::zero();
            }

            from_wei(raw) * lp_price / usd_price
        }
    }
}
