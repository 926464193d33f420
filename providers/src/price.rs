use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum PriceError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("coin `{0}` missing from price response")]
    MissingCoin(String),
}

#[derive(Deserialize)]
struct CoinPrice {
    usd: BigDecimal,
}

#[derive(Clone, Debug)]
struct PriceQuote {
    price: BigDecimal,
    fetched_at: Instant,
}

/// Process-wide USD price quote with a short TTL. A failed refresh
/// keeps serving the previous quote; `None` is only returned when no
/// quote was ever fetched, and callers must then zero every
/// USD-denominated component rather than divide by a missing price.
pub struct PriceOracle {
    client: reqwest::Client,
    url: String,
    coin_id: String,
    ttl: Duration,
    quote: RwLock<Option<PriceQuote>>,
}

impl PriceOracle {
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        coin_id: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            coin_id: coin_id.into(),
            ttl,
            quote: RwLock::new(None),
        }
    }

    pub async fn usd_price(&self) -> Option<BigDecimal> {
        {
            let quote = self.quote.read().await;
            if let Some(quote) = quote.as_ref() {
                if quote.fetched_at.elapsed() < self.ttl {
                    return Some(quote.price.clone());
                }
            }
        }

        let mut quote = self.quote.write().await;

        // another task may have refreshed while we waited for the lock
        if let Some(current) = quote.as_ref() {
            if current.fetched_at.elapsed() < self.ttl {
                return Some(current.price.clone());
            }
        }

        match self.fetch().await {
            Ok(price) => {
                debug!(%price, "refreshed usd price quote");
                *quote = Some(PriceQuote {
                    price: price.clone(),
                    fetched_at: Instant::now(),
                });

                Some(price)
            }
            Err(err) => {
                warn!(%err, "price fetch failed, keeping previous quote");
                quote.as_ref().map(|quote| quote.price.clone())
            }
        }
    }

    async fn fetch(&self) -> Result<BigDecimal, PriceError> {
        let body: HashMap<String, CoinPrice> = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body.get(&self.coin_id)
            .map(|coin| coin.usd.clone())
            .ok_or_else(|| PriceError::MissingCoin(self.coin_id.clone()))
    }
}
