#![deny(clippy::all)]
#![deny(clippy::dbg_macro)]

pub mod ens;
pub mod evm;
pub mod price;
pub mod subgraph;

use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// The shared HTTP client every provider call goes through. Short
/// connect timeout plus an overall per-request deadline so an endpoint
/// that connects and then stalls degrades a component instead of
/// hanging the whole aggregation.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
}
