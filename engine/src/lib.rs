#![deny(clippy::all)]
#![deny(clippy::dbg_macro)]

//! Multi-network RDNT holding aggregation: locked positions from the
//! indexer, loose wallet balances and vested amounts from contract
//! reads, summed across networks in exact decimal arithmetic and
//! cached per user against the resolved address.

pub use aggregator::BalanceAggregator;
pub use cache::BalanceCache;
pub use fetcher::{FetchNetworkTotal, NetworkBalanceFetcher};
pub use group::{GroupBackend, GroupSync, UserDirectory};

mod aggregator;
mod cache;
mod fetcher;
mod group;

use radiant_common::Settings;
use radiant_providers::{ens::AddressResolver, price::PriceOracle};
use std::sync::Arc;

/// Wires the concrete resolver, oracle and fetcher from settings.
/// The caller keeps driving group sync itself, after each total:
///
/// ```ignore
/// let aggregator = radiant_engine::from_settings(&settings, directory)?;
/// let sync = GroupSync::new(backend, settings.group_requirements());
///
/// if let Some(total) = aggregator.total_by_username("alice").await {
///     sync.sync(&user, &total).await;
/// }
/// ```
pub fn from_settings<D: UserDirectory>(
    settings: &Settings,
    directory: D,
) -> reqwest::Result<BalanceAggregator<AddressResolver, NetworkBalanceFetcher, D>> {
    let client = radiant_providers::http_client(settings.network_timeout())?;

    let resolver = AddressResolver::new(client.clone(), settings.ens_resolver_url.clone());
    let oracle = Arc::new(PriceOracle::new(
        client.clone(),
        settings.price_url.clone(),
        settings.price_coin_id.clone(),
        settings.price_ttl(),
    ));
    let fetcher = NetworkBalanceFetcher::new(client, oracle, settings.indexer_api_key.clone());

    Ok(BalanceAggregator::new(
        resolver,
        fetcher,
        directory,
        settings.networks.clone(),
        settings.balance_ttl(),
        settings.network_timeout(),
    ))
}
