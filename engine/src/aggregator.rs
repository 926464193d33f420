use crate::{cache::BalanceCache, fetcher::FetchNetworkTotal, group::UserDirectory};
use bigdecimal::{BigDecimal, Zero};
use futures::future::join_all;
use radiant_common::{decimal::truncate, NetworkConfig, ResolvedAddress, User};
use radiant_providers::ens::Resolve;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Orchestrates one user's total: resolve the linked identity, check
/// the cache against the resolved address, and on a miss fan out per
/// network concurrently, truncate the sum, and cache it. `None` means
/// the user has no usable linked wallet at all; callers
/// must not touch group memberships in that case.
pub struct BalanceAggregator<R, F, D> {
    resolver: R,
    fetcher: F,
    directory: D,
    networks: Vec<NetworkConfig>,
    cache: BalanceCache,
    network_timeout: Duration,
}

impl<R, F, D> BalanceAggregator<R, F, D>
where
    R: Resolve,
    F: FetchNetworkTotal,
    D: UserDirectory,
{
    pub fn new(
        resolver: R,
        fetcher: F,
        directory: D,
        networks: Vec<NetworkConfig>,
        cache_ttl: Duration,
        network_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            directory,
            networks,
            cache: BalanceCache::new(cache_ttl),
            network_timeout,
        }
    }

    pub async fn total_by_username(&self, username: &str) -> Option<BigDecimal> {
        let user = self.directory.find_by_username(username).await?;

        self.total_for_user(&user).await
    }

    pub async fn total_for_user(&self, user: &User) -> Option<BigDecimal> {
        let Some(identity) = self.directory.linked_identity(user).await else {
            debug!(username = %user.username, "no linked wallet");
            return None;
        };

        let address = self.resolver.resolve(&identity).await.ok()?;

        if let Some(total) = self.cache.read(user.id, &address).await {
            debug!(username = %user.username, %total, "serving cached total");
            return Some(total);
        }

        let total = self.recompute(&address).await;
        info!(username = %user.username, %address, %total, "recomputed total");

        self.cache.write(user.id, total.clone(), address).await;

        Some(total)
    }

    /// Drops the user's cache entries so the next lookup recomputes
    /// regardless of expiry; for external events that signal the
    /// linked address may have changed.
    pub async fn invalidate(&self, user: &User) {
        self.cache.invalidate(user.id).await;
    }

    async fn recompute(&self, address: &ResolvedAddress) -> BigDecimal {
        let totals = join_all(self.networks.iter().map(|network| async {
            match timeout(self.network_timeout, self.fetcher.network_total(network, address)).await
            {
                Ok(total) => total,
                Err(_) => {
                    warn!(network = %network.name, "network fetch timed out");
                    BigDecimal::zero()
                }
            }
        }))
        .await;

        let sum = totals
            .into_iter()
            .fold(BigDecimal::zero(), |acc, total| acc + total);

        truncate(&sum)
    }
}

#[cfg(test)]
mod test {
    use super::BalanceAggregator;
    use crate::{fetcher::FetchNetworkTotal, group::UserDirectory};
    use async_trait::async_trait;
    use bigdecimal::BigDecimal;
    use radiant_common::{
        Identity, LooseSource, LpPriceSource, NetworkConfig, ResolvedAddress, User,
    };
    use radiant_providers::ens::{ResolutionError, Resolve};
    use std::{
        str::FromStr,
        sync::atomic::{AtomicUsize, Ordering},
        sync::Mutex,
        time::Duration,
    };

    struct FixedResolver {
        address: Mutex<String>,
    }

    impl FixedResolver {
        fn new(address: &str) -> Self {
            Self {
                address: Mutex::new(address.to_string()),
            }
        }

        fn set(&self, address: &str) {
            *self.address.lock().unwrap() = address.to_string();
        }
    }

    #[async_trait]
    impl Resolve for &FixedResolver {
        async fn resolve(&self, _identity: &Identity) -> Result<ResolvedAddress, ResolutionError> {
            Ok(ResolvedAddress::new(self.address.lock().unwrap().clone()))
        }
    }

    struct CountingFetcher {
        per_network: BigDecimal,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(per_network: &str) -> Self {
            Self {
                per_network: BigDecimal::from_str(per_network).unwrap(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FetchNetworkTotal for &CountingFetcher {
        async fn network_total(
            &self,
            _network: &NetworkConfig,
            _address: &ResolvedAddress,
        ) -> BigDecimal {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.per_network.clone()
        }
    }

    struct SingleUserDirectory {
        identity: Option<Identity>,
    }

    #[async_trait]
    impl UserDirectory for &SingleUserDirectory {
        async fn find_by_username(&self, username: &str) -> Option<User> {
            (username == "alice").then(|| User::new(1, "alice"))
        }

        async fn linked_identity(&self, _user: &User) -> Option<Identity> {
            self.identity.clone()
        }
    }

    fn network(name: &str) -> NetworkConfig {
        NetworkConfig {
            name: name.to_string(),
            subgraph_url: "https://indexer.example/radiant".to_string(),
            rpc_url: "https://rpc.example".to_string(),
            token_contract: "0x3082cc23568ea640225c2467653db90e9250aaa0".to_string(),
            lp_contract: None,
            vesting_contract: None,
            multiplier: BigDecimal::from_str("0.8").unwrap(),
            loose_source: LooseSource::Token,
            lp_price_source: LpPriceSource::Inline,
        }
    }

    fn aggregator<'a>(
        resolver: &'a FixedResolver,
        fetcher: &'a CountingFetcher,
        directory: &'a SingleUserDirectory,
        networks: Vec<NetworkConfig>,
        cache_ttl: Duration,
    ) -> BalanceAggregator<&'a FixedResolver, &'a CountingFetcher, &'a SingleUserDirectory> {
        BalanceAggregator::new(
            resolver,
            fetcher,
            directory,
            networks,
            cache_ttl,
            Duration::from_secs(5),
        )
    }

    const ADDR_A: &str = "0x3082cc23568ea640225c2467653db90e9250aaa0";
    const ADDR_B: &str = "0xf7de7e8a6bd59ed41a4b5fe50278b3b7f31384df";

    fn linked_directory() -> SingleUserDirectory {
        SingleUserDirectory {
            identity: Some(Identity::new("alice.eth")),
        }
    }

    #[tokio::test]
    async fn cached_total_issues_no_further_fetches() {
        let resolver = FixedResolver::new(ADDR_A);
        let fetcher = CountingFetcher::new("0.85");
        let directory = linked_directory();
        let aggregator = aggregator(
            &resolver,
            &fetcher,
            &directory,
            vec![network("arbitrum"), network("bsc")],
            Duration::from_secs(60),
        );
        let user = User::new(1, "alice");

        let first = aggregator.total_for_user(&user).await.unwrap();
        assert_eq!(first, BigDecimal::from_str("1.70").unwrap());
        assert_eq!(fetcher.calls(), 2);

        let second = aggregator.total_for_user(&user).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn address_change_forces_recompute_within_ttl() {
        let resolver = FixedResolver::new(ADDR_A);
        let fetcher = CountingFetcher::new("1");
        let directory = linked_directory();
        let aggregator = aggregator(
            &resolver,
            &fetcher,
            &directory,
            vec![network("arbitrum")],
            Duration::from_secs(60),
        );
        let user = User::new(1, "alice");

        aggregator.total_for_user(&user).await.unwrap();
        assert_eq!(fetcher.calls(), 1);

        resolver.set(ADDR_B);
        aggregator.total_for_user(&user).await.unwrap();
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn expired_cache_forces_recompute() {
        let resolver = FixedResolver::new(ADDR_A);
        let fetcher = CountingFetcher::new("1");
        let directory = linked_directory();
        let aggregator = aggregator(
            &resolver,
            &fetcher,
            &directory,
            vec![network("arbitrum")],
            Duration::from_secs(0),
        );
        let user = User::new(1, "alice");

        aggregator.total_for_user(&user).await.unwrap();
        aggregator.total_for_user(&user).await.unwrap();
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn manual_invalidate_forces_recompute() {
        let resolver = FixedResolver::new(ADDR_A);
        let fetcher = CountingFetcher::new("1");
        let directory = linked_directory();
        let aggregator = aggregator(
            &resolver,
            &fetcher,
            &directory,
            vec![network("arbitrum")],
            Duration::from_secs(60),
        );
        let user = User::new(1, "alice");

        aggregator.total_for_user(&user).await.unwrap();
        aggregator.invalidate(&user).await;
        aggregator.total_for_user(&user).await.unwrap();
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn total_is_truncated_not_rounded() {
        let resolver = FixedResolver::new(ADDR_A);
        let fetcher = CountingFetcher::new("12.347");
        let directory = linked_directory();
        let aggregator = aggregator(
            &resolver,
            &fetcher,
            &directory,
            vec![network("arbitrum")],
            Duration::from_secs(60),
        );
        let user = User::new(1, "alice");

        assert_eq!(
            aggregator.total_for_user(&user).await.unwrap(),
            BigDecimal::from_str("12.34").unwrap()
        );
    }

    #[tokio::test]
    async fn no_linked_wallet_yields_none() {
        let resolver = FixedResolver::new(ADDR_A);
        let fetcher = CountingFetcher::new("1");
        let directory = SingleUserDirectory { identity: None };
        let aggregator = aggregator(
            &resolver,
            &fetcher,
            &directory,
            vec![network("arbitrum")],
            Duration::from_secs(60),
        );
        let user = User::new(1, "alice");

        assert!(aggregator.total_for_user(&user).await.is_none());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn username_lookup() {
        let resolver = FixedResolver::new(ADDR_A);
        let fetcher = CountingFetcher::new("1");
        let directory = linked_directory();
        let aggregator = aggregator(
            &resolver,
            &fetcher,
            &directory,
            vec![network("arbitrum")],
            Duration::from_secs(60),
        );

        assert!(aggregator.total_by_username("alice").await.is_some());
        assert!(aggregator.total_by_username("bob").await.is_none());
    }
}
