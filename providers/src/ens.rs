use async_trait::async_trait;
use radiant_common::{Identity, ResolvedAddress};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, identity: &Identity) -> Result<ResolvedAddress, ResolutionError>;
}

#[derive(Deserialize)]
struct ResolveResponse {
    address: Option<String>,
}

/// Turns a raw identity into a lowercase address. ENS names go through
/// the configured resolution service; on any resolution failure the
/// lowercased original string is returned instead of an error, which
/// keeps the cache key stable but leaves downstream contract reads to
/// degrade to zero.
pub struct AddressResolver {
    client: reqwest::Client,
    resolver_url: String,
}

impl AddressResolver {
    pub fn new(client: reqwest::Client, resolver_url: impl Into<String>) -> Self {
        Self {
            client,
            resolver_url: resolver_url.into(),
        }
    }

    async fn resolve_ens(&self, name: &str) -> Result<Option<String>, ResolutionError> {
        let url = format!("{}/{name}", self.resolver_url.trim_end_matches('/'));
        let res = self.client.get(url).send().await?;

        if !res.status().is_success() {
            return Ok(None);
        }

        let body: ResolveResponse = res.json().await?;

        Ok(body.address)
    }
}

#[async_trait]
impl Resolve for AddressResolver {
    async fn resolve(&self, identity: &Identity) -> Result<ResolvedAddress, ResolutionError> {
        if identity.is_hex_address() {
            return Ok(ResolvedAddress::new(identity.as_str()));
        }

        if identity.is_ens_name() {
            match self.resolve_ens(identity.as_str()).await {
                Ok(Some(address)) => return Ok(ResolvedAddress::new(address)),
                Ok(None) => warn!(name = identity.as_str(), "resolver returned no address"),
                Err(err) => warn!(name = identity.as_str(), %err, "ens resolution failed"),
            }
        }

        Ok(ResolvedAddress::new(identity.as_str()))
    }
}
