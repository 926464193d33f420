use bigdecimal::BigDecimal;
use radiant_common::ResolvedAddress;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

struct Expiring<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Expiring<T> {
    fn fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Per-user cache of the last computed total and the address it was
/// computed for, each with its own expiry. A read is only valid when
/// both entries are fresh and the cached address matches the currently
/// resolved one; an expired TTL is not the only reason to recompute.
/// Concurrent aggregations race benignly; last writer wins.
pub struct BalanceCache {
    ttl: Duration,
    totals: RwLock<HashMap<u64, Expiring<BigDecimal>>>,
    addresses: RwLock<HashMap<u64, Expiring<ResolvedAddress>>>,
}

impl BalanceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            totals: RwLock::new(HashMap::new()),
            addresses: RwLock::new(HashMap::new()),
        }
    }

    pub async fn read(&self, user_id: u64, current: &ResolvedAddress) -> Option<BigDecimal> {
        {
            let addresses = self.addresses.read().await;
            let cached = addresses.get(&user_id)?;

            if !cached.fresh() || cached.value != *current {
                return None;
            }
        }

        let totals = self.totals.read().await;
        let total = totals.get(&user_id)?;

        total.fresh().then(|| total.value.clone())
    }

    pub async fn write(&self, user_id: u64, total: BigDecimal, address: ResolvedAddress) {
        let expires_at = Instant::now() + self.ttl;

        let mut totals = self.totals.write().await;
        let mut addresses = self.addresses.write().await;

        totals.insert(user_id, Expiring { value: total, expires_at });
        addresses.insert(
            user_id,
            Expiring {
                value: address,
                expires_at,
            },
        );
    }

    pub async fn invalidate(&self, user_id: u64) {
        let mut totals = self.totals.write().await;
        let mut addresses = self.addresses.write().await;

        totals.remove(&user_id);
        addresses.remove(&user_id);
    }
}

#[cfg(test)]
mod test {
    use super::BalanceCache;
    use bigdecimal::BigDecimal;
    use radiant_common::ResolvedAddress;
    use std::time::Duration;

    fn address(raw: &str) -> ResolvedAddress {
        ResolvedAddress::new(raw)
    }

    #[tokio::test]
    async fn read_after_write() {
        let cache = BalanceCache::new(Duration::from_secs(60));
        let addr = address("0x3082cc23568ea640225c2467653db90e9250aaa0");

        assert!(cache.read(1, &addr).await.is_none());

        cache.write(1, BigDecimal::from(42), addr.clone()).await;
        assert_eq!(cache.read(1, &addr).await, Some(BigDecimal::from(42)));
    }

    #[tokio::test]
    async fn address_change_misses() {
        let cache = BalanceCache::new(Duration::from_secs(60));
        let old = address("0x3082cc23568ea640225c2467653db90e9250aaa0");
        let new = address("0xf7de7e8a6bd59ed41a4b5fe50278b3b7f31384df");

        cache.write(1, BigDecimal::from(42), old).await;
        assert!(cache.read(1, &new).await.is_none());
    }

    #[tokio::test]
    async fn expired_entry_misses() {
        let cache = BalanceCache::new(Duration::from_secs(0));
        let addr = address("0x3082cc23568ea640225c2467653db90e9250aaa0");

        cache.write(1, BigDecimal::from(42), addr.clone()).await;
        assert!(cache.read(1, &addr).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_forces_miss() {
        let cache = BalanceCache::new(Duration::from_secs(60));
        let addr = address("0x3082cc23568ea640225c2467653db90e9250aaa0");

        cache.write(1, BigDecimal::from(42), addr.clone()).await;
        cache.invalidate(1).await;
        assert!(cache.read(1, &addr).await.is_none());
    }
}
