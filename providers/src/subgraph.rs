//! GraphQL queries against the per-network locked-position indexer.

use primitive_types::U256;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("graphql response contained errors: {0}")]
    GraphQl(String),
    #[error("malformed numeric field `{0}`")]
    MalformedNumber(String),
}

const LOCKED_QUERY: &str = "query Lock($address: String!) { \
     lockeds(where: {user_: {id: $address}}, orderBy: timestamp, orderDirection: desc, first: 1) \
     { lockedBalance timestamp } }";

const LOCKED_WITH_PRICE_QUERY: &str = "query Lock($address: String!) { \
     lockeds(where: {user_: {id: $address}}, orderBy: timestamp, orderDirection: desc, first: 1) \
     { lockedBalance timestamp } \
     lpTokenPrice(id: \"1\") { price } }";

const LP_PRICE_QUERY: &str = "{ lpTokenPrice(id: \"1\") { price } }";

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LockedData {
    lockeds: Vec<LockedRecord>,
    #[serde(default)]
    lp_token_price: Option<PriceRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LockedRecord {
    locked_balance: String,
    timestamp: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceData {
    lp_token_price: Option<PriceRecord>,
}

#[derive(Deserialize)]
struct PriceRecord {
    price: String,
}

/// A user's most recent locked position, raw as indexed: the balance
/// is an 18-decimals fixed-point integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedPosition {
    pub locked_balance: U256,
    pub timestamp: u64,
}

/// Result of the locked-position query. The inline LP price (an
/// 8-decimals raw integer) is carried independently of the record: a
/// user holding loose LP tokens without a lock still needs the price
/// for conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockedQuery {
    pub position: Option<LockedPosition>,
    pub lp_token_price: Option<U256>,
}

/// Substitutes an `{api_key}` placeholder in a configured indexer URL.
/// A no-op when the URL carries no placeholder.
pub fn with_api_key(url: &str, api_key: Option<&str>) -> String {
    match api_key {
        Some(key) => url.replace("{api_key}", key),
        None => url.to_string(),
    }
}

/// Like [`with_api_key`], but `None` when the URL still needs a key
/// that is not configured; callers skip the query instead of sending
/// the literal placeholder.
pub fn keyed_url(url: &str, api_key: Option<&str>) -> Option<String> {
    let url = with_api_key(url, api_key);

    (!url.contains("{api_key}")).then_some(url)
}

fn parse_uint(raw: &str) -> Result<U256, IndexerError> {
    U256::from_dec_str(raw).map_err(|_| IndexerError::MalformedNumber(raw.to_string()))
}

async fn query<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    document: &str,
    variables: serde_json::Value,
) -> Result<T, IndexerError> {
    let body = json!({ "query": document, "variables": variables });

    let response: GraphQlResponse<T> = client
        .post(url)
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if let Some(errors) = response.errors {
        return Err(IndexerError::GraphQl(errors.to_string()));
    }

    response
        .data
        .ok_or_else(|| IndexerError::GraphQl("empty data".to_string()))
}

/// The most recent locked-position record for `address`, if any, plus
/// the inline LP token price when `with_price` asked for it and the
/// network's schema has one.
pub async fn locked_position(
    client: &reqwest::Client,
    url: &str,
    address: &str,
    with_price: bool,
) -> Result<LockedQuery, IndexerError> {
    let document = if with_price {
        LOCKED_WITH_PRICE_QUERY
    } else {
        LOCKED_QUERY
    };

    let data: LockedData = query(client, url, document, json!({ "address": address })).await?;

    locked_query(data)
}

fn locked_query(data: LockedData) -> Result<LockedQuery, IndexerError> {
    let lp_token_price = data
        .lp_token_price
        .map(|record| parse_uint(&record.price))
        .transpose()?;

    let position = data
        .lockeds
        .into_iter()
        .next()
        .map(|record| {
            Ok::<_, IndexerError>(LockedPosition {
                locked_balance: parse_uint(&record.locked_balance)?,
                timestamp: record
                    .timestamp
                    .parse()
                    .map_err(|_| IndexerError::MalformedNumber(record.timestamp.clone()))?,
            })
        })
        .transpose()?;

    Ok(LockedQuery {
        position,
        lp_token_price,
    })
}

/// The raw 8-decimals LP token price from a separate price-indexing
/// endpoint, for networks that do not serve it inline.
pub async fn lp_token_price(
    client: &reqwest::Client,
    url: &str,
) -> Result<Option<U256>, IndexerError> {
    let data: PriceData = query(client, url, LP_PRICE_QUERY, json!({})).await?;

    data.lp_token_price
        .map(|record| parse_uint(&record.price))
        .transpose()
}
