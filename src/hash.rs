//! Topic and hex helpers
//!
//! Event topics are 32-byte words. Indexed addresses are left-padded with
//! zeros, which is also how the log filter expects a wallet to be encoded.

use alloy::primitives::{Address, B256};

/// Left-pad a 20-byte address to a 32-byte topic
pub fn address_to_topic(addr: Address) -> B256 {
    let mut result = [0u8; 32];
    result[12..32].copy_from_slice(addr.as_slice());
    B256::from(result)
}

/// Convert a 32-byte word to hex string with 0x prefix
pub fn bytes32_to_hex(bytes: &B256) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_address_to_topic_left_pads() {
        let wallet = address!("9a4407Bf1Dc791383923cc0EA2706607c8E43eb1");
        let topic = address_to_topic(wallet);

        assert_eq!(&topic[..12], &[0u8; 12]);
        assert_eq!(&topic[12..], wallet.as_slice());
        assert_eq!(
            bytes32_to_hex(&topic),
            "0x0000000000000000000000009a4407bf1dc791383923cc0ea2706607c8e43eb1"
        );
    }
}
