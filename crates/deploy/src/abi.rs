//! Minimal ABI encoding for constructor arguments and single-call payloads.
//!
//! Only the types the deployment flow needs are supported: `uint256`, `address`
//! and `bytes`.

use alloy_core::primitives::{Address, Bytes, U256};
use serde_json::Value;

use crate::network::ActionInterval;

const WORD: usize = 32;

/// Selector of `upgradeTo(address)` on EIP-173 / UUPS style proxies.
pub const UPGRADE_TO_SELECTOR: [u8; 4] = [0x36, 0x59, 0xcf, 0xe6];

/// A single ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    Address(Address),
    Bytes(Bytes),
}

impl AbiValue {
    /// JSON rendering used in deployment records (`args` field).
    pub fn to_json(&self) -> Value {
        match self {
            AbiValue::Uint(value) => Value::String(value.to_string()),
            AbiValue::Address(address) => Value::String(address.to_string()),
            AbiValue::Bytes(bytes) => Value::String(format!("0x{}", hex::encode(bytes))),
        }
    }
}

impl From<ActionInterval> for AbiValue {
    fn from(interval: ActionInterval) -> Self {
        AbiValue::Uint(U256::from(interval.as_secs()))
    }
}

impl From<Address> for AbiValue {
    fn from(address: Address) -> Self {
        AbiValue::Address(address)
    }
}

impl From<Bytes> for AbiValue {
    fn from(bytes: Bytes) -> Self {
        AbiValue::Bytes(bytes)
    }
}

fn uint_word(value: U256) -> [u8; WORD] {
    value.to_be_bytes::<WORD>()
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 20..].copy_from_slice(address.as_slice());
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// ABI-encode `values` as a parameter tuple (the layout constructors and calls use).
pub fn encode_params(values: &[AbiValue]) -> Vec<u8> {
    let head_len = values.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for value in values {
        match value {
            AbiValue::Uint(v) => head.extend_from_slice(&uint_word(*v)),
            AbiValue::Address(a) => head.extend_from_slice(&address_word(a)),
            AbiValue::Bytes(bytes) => {
                let offset = U256::from(head_len + tail.len());
                head.extend_from_slice(&uint_word(offset));

                tail.extend_from_slice(&uint_word(U256::from(bytes.len())));
                let start = tail.len();
                tail.extend_from_slice(bytes);
                tail.resize(start + padded_len(bytes.len()), 0);
            }
        }
    }

    head.extend(tail);
    head
}

/// Encode a call to a function with the given selector.
pub fn encode_call(selector: [u8; 4], values: &[AbiValue]) -> Vec<u8> {
    let mut data = selector.to_vec();
    data.extend(encode_params(values));
    data
}

/// Creation payload: bytecode followed by the encoded constructor arguments.
pub fn encode_deploy_data(bytecode: &[u8], args: &[AbiValue]) -> Vec<u8> {
    let mut data = bytecode.to_vec();
    data.extend(encode_params(args));
    data
}

/// Hex-encode a payload with a `0x` prefix, as JSON-RPC expects.
pub fn to_hex_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::address;

    use super::*;

    const KORU_DAO: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
    const KORU_DAO_NFT: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

    #[test]
    fn test_encode_static_params() {
        let encoded = encode_params(&[
            ActionInterval::from_secs(43200).into(),
            KORU_DAO.into(),
            KORU_DAO_NFT.into(),
        ]);

        assert_eq!(encoded.len(), 3 * WORD);
        assert_eq!(
            hex::encode(&encoded[..WORD]),
            "000000000000000000000000000000000000000000000000000000000000a8c0"
        );
        assert_eq!(
            hex::encode(&encoded[WORD..2 * WORD]),
            "00000000000000000000000070997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
        assert_eq!(
            hex::encode(&encoded[2 * WORD..]),
            "0000000000000000000000003c44cdddb6a900fa2b585dd299e03d12fa4293bc"
        );
    }

    #[test]
    fn test_encode_empty_bytes_tail() {
        let encoded = encode_params(&[
            KORU_DAO.into(),
            KORU_DAO_NFT.into(),
            Bytes::new().into(),
        ]);

        // 3 head words + 1 length word.
        assert_eq!(encoded.len(), 4 * WORD);
        assert_eq!(encoded[3 * WORD - 1], 0x60);
        assert!(encoded[3 * WORD..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_bytes_is_padded() {
        let encoded = encode_params(&[Bytes::from(vec![0xde, 0xad, 0xbe]).into()]);

        // offset word + length word + one data word
        assert_eq!(encoded.len(), 3 * WORD);
        assert_eq!(encoded[WORD - 1], 0x20);
        assert_eq!(encoded[2 * WORD - 1], 3);
        assert_eq!(&encoded[2 * WORD..2 * WORD + 3], &[0xde, 0xad, 0xbe]);
        assert!(encoded[2 * WORD + 3..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_upgrade_call() {
        let calldata = to_hex_data(&encode_call(UPGRADE_TO_SELECTOR, &[KORU_DAO.into()]));

        assert!(calldata.starts_with("0x3659cfe6"));
        // "0x" + 8 (selector) + 64 (one word)
        assert_eq!(calldata.len(), 74);
        assert!(calldata.ends_with("70997970c51812dc3a010c7d01b50e0d17dc79c8"));
    }

    #[test]
    fn test_deploy_data_appends_args() {
        let data = encode_deploy_data(&[0x60, 0x80], &[ActionInterval::from_secs(300).into()]);

        assert_eq!(data.len(), 2 + WORD);
        assert_eq!(&data[..2], &[0x60, 0x80]);
        assert_eq!(&data[2 + WORD - 2..], &[0x01, 0x2c]);
    }

    #[test]
    fn test_to_json() {
        assert_eq!(
            AbiValue::from(ActionInterval::from_secs(300)).to_json(),
            Value::String("300".to_string())
        );
        assert_eq!(
            AbiValue::from(KORU_DAO).to_json(),
            Value::String("0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string())
        );
    }
}
