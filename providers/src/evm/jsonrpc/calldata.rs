const FUNC_BALANCE_OF: &str = "70a08231";
const FUNC_VESTED: &str = "df379876";

/// ABI-encoded call data: 4-byte selector plus the user address
/// left-padded to a 32-byte word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallData(String);

impl CallData {
    fn with_address(selector: &str, user_address: &str) -> Self {
        Self(format!(
            "{selector}{:0>64}",
            user_address.trim_start_matches("0x")
        ))
    }

    /// `balanceOf(address)`
    pub fn balance_of(user_address: &str) -> Self {
        Self::with_address(FUNC_BALANCE_OF, user_address)
    }

    /// The vesting contract's per-user amounts call; the withdrawable
    /// value is the second word of the return data.
    pub fn vested(user_address: &str) -> Self {
        Self::with_address(FUNC_VESTED, user_address)
    }

    pub fn raw(&self) -> &str {
        &self.0
    }
}
