//! Read-only `eth_call` plumbing against a JSON-RPC node.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

mod calldata;
mod decode;

pub use calldata::CallData;
pub use decode::{decode_uint, decode_word};

#[derive(Error, Debug)]
pub enum RpcError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("rpc node returned no result: {0}")]
    NoResult(String),
    #[error("malformed hex payload `{0}`")]
    MalformedHex(String),
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<Value>,
}

fn create_payload(method: &str, params: Value, id: u32) -> Value {
    json!({
        "method"  : method,
        "params"  : params,
        "id"      : id,
        "jsonrpc" : "2.0"
    })
}

/// Dispatches an `eth_call` against `contract` and returns the raw hex
/// result. Callers treat any error as a zero component rather than
/// aborting the whole aggregation.
pub async fn eth_call(
    client: &reqwest::Client,
    rpc_url: &str,
    contract: &str,
    call_data: &CallData,
) -> Result<String, RpcError> {
    let params = json!([
        {
            "to"   : contract,
            "data" : format!("0x{}", call_data.raw())
        },
        "latest"
    ]);
    let payload = create_payload("eth_call", params, 1);

    let response: RpcResponse = client
        .post(rpc_url)
        .json(&payload)
        .send()
        .await?
        .json()
        .await?;

    match response.result {
        Some(result) => Ok(result),
        None => Err(RpcError::NoResult(
            response
                .error
                .map(|error| error.to_string())
                .unwrap_or_default(),
        )),
    }
}
