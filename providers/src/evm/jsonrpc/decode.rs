use super::RpcError;
use primitive_types::U256;

fn checked_hex(payload: &str) -> Result<&str, RpcError> {
    let hex = payload.trim_start_matches("0x");

    if hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RpcError::MalformedHex(payload.to_string()));
    }

    Ok(hex)
}

/// Decodes a single big-endian unsigned integer result. An empty `0x`
/// payload decodes to zero.
pub fn decode_uint(payload: &str) -> Result<U256, RpcError> {
    let hex = checked_hex(payload)?;

    if hex.is_empty() {
        return Ok(U256::zero());
    }

    U256::from_str_radix(hex, 16).map_err(|_| RpcError::MalformedHex(payload.to_string()))
}

/// Decodes the `index`-th 32-byte word of a multi-word return payload.
/// A word past the end of the payload decodes to zero.
pub fn decode_word(payload: &str, index: usize) -> Result<U256, RpcError> {
    let hex = checked_hex(payload)?;

    // byte-index slicing is safe here: checked_hex only passes ascii
    let start = index * 64;
    if start >= hex.len() {
        return Ok(U256::zero());
    }
    let word = &hex[start..hex.len().min(start + 64)];

    U256::from_str_radix(word, 16).map_err(|_| RpcError::MalformedHex(payload.to_string()))
}

#[cfg(test)]
mod test {
    use super::{decode_uint, decode_word};
    use primitive_types::U256;

    #[test]
    fn uint_decoding() {
        assert_eq!(decode_uint("0x").unwrap(), U256::zero());
        assert_eq!(
            decode_uint("0x0000000000000000000000000000000000000000000000000de0b6b3a7640000")
                .unwrap(),
            U256::from(1_000_000_000_000_000_000_u128)
        );

        assert!(decode_uint("0x123").is_err());
        assert!(decode_uint("0xzz00").is_err());
    }

    #[test]
    fn second_word_of_tuple_return() {
        let payload = [
            "0x",
            "0000000000000000000000000000000000000000000000000de0b6b3a7640000",
            "00000000000000000000000000000000000000000000000006f05b59d3b20000",
        ]
        .join("");

        assert_eq!(
            decode_word(&payload, 1).unwrap(),
            U256::from(500_000_000_000_000_000_u128)
        );
    }

    #[test]
    fn word_past_payload_is_zero() {
        let payload = "0x0000000000000000000000000000000000000000000000000de0b6b3a7640000";

        assert_eq!(decode_word(payload, 1).unwrap(), U256::zero());
        assert_eq!(decode_word("0x", 0).unwrap(), U256::zero());
    }

    #[test]
    fn short_trailing_word_decodes() {
        // a word and a half of payload, the tail decodes as-is
        let payload = [
            "0x",
            "0000000000000000000000000000000000000000000000000de0b6b3a7640000",
            "000000000000000000000000075bcd15",
        ]
        .join("");

        assert_eq!(decode_word(&payload, 1).unwrap(), U256::from(123_456_789_u64));
        assert_eq!(decode_word(&payload, 2).unwrap(), U256::zero());
    }
}
