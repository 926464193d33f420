use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw wallet identity as linked by the user's sign-in: either a
/// `0x`-prefixed hex address or an ENS name.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn is_hex_address(&self) -> bool {
        is_hex_address(&self.0)
    }

    pub fn is_ens_name(&self) -> bool {
        self.0.to_lowercase().ends_with(".eth")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lowercased address string. Canonically `0x` + 40 hex characters,
/// but after a failed ENS resolution it carries the unresolved name
/// instead, so contract reads against it degrade to zero downstream.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedAddress(String);

impl ResolvedAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().to_lowercase())
    }

    pub fn is_hex(&self) -> bool {
        is_hex_address(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_hex_address(raw: &str) -> bool {
    raw.len() == 42
        && raw.starts_with("0x")
        && raw[2..].bytes().all(|b| b.is_ascii_hexdigit())
}
