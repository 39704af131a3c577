//! Minimal ABI encoding and decoding for the harness's contract surface.
//!
//! Covers the value kinds the deployment and mint flows actually use (static
//! words, strings, string arrays) rather than the full ABI grammar. Selectors
//! and event topics are derived from canonical signatures at runtime, so call
//! sites name events and functions by signature instead of magic constants.

use alloy_core::primitives::{Address, B256, U256, keccak256};
use anyhow::{Context, Result};

/// A single ABI-encodable constructor or call argument.
#[derive(Debug, Clone)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    FixedBytes(B256),
    Bool(bool),
    Str(String),
    StrArray(Vec<String>),
}

impl AbiValue {
    /// Encode the tail of a dynamic value. Static values have no tail.
    fn encode_tail(&self) -> Vec<u8> {
        match self {
            AbiValue::Str(s) => encode_bytes(s.as_bytes()),
            AbiValue::StrArray(items) => {
                let mut out = uint_word(items.len() as u64).to_vec();
                let head_len = 32 * items.len();
                let mut heads = Vec::with_capacity(head_len);
                let mut tails = Vec::new();
                for item in items {
                    // Element offsets are relative to the start of the array's
                    // data area, right after the length word.
                    heads.extend_from_slice(&uint_word((head_len + tails.len()) as u64));
                    tails.extend(encode_bytes(item.as_bytes()));
                }
                out.extend(heads);
                out.extend(tails);
                out
            }
            _ => Vec::new(),
        }
    }
}

/// ABI-encode an argument list using standard head/tail encoding.
pub fn encode(values: &[AbiValue]) -> Vec<u8> {
    let head_len = 32 * values.len();
    let mut heads: Vec<u8> = Vec::with_capacity(head_len);
    let mut tails: Vec<u8> = Vec::new();

    for value in values {
        match value {
            AbiValue::Address(a) => heads.extend_from_slice(a.into_word().as_slice()),
            AbiValue::Uint(u) => heads.extend_from_slice(&u.to_be_bytes::<32>()),
            AbiValue::FixedBytes(b) => heads.extend_from_slice(b.as_slice()),
            AbiValue::Bool(b) => heads.extend_from_slice(&uint_word(u64::from(*b))),
            dynamic => {
                heads.extend_from_slice(&uint_word((head_len + tails.len()) as u64));
                tails.extend(dynamic.encode_tail());
            }
        }
    }

    heads.extend(tails);
    heads
}

/// ABI-encode a function call: 4-byte selector followed by the encoded arguments.
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend(encode(args));
    out
}

/// First four bytes of the keccak-256 hash of a canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Topic 0 for an event: the keccak-256 hash of its canonical signature.
pub fn event_topic(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

/// Read the 32-byte word at the given word index of an encoded blob.
pub fn word_at(data: &[u8], index: usize) -> Result<B256> {
    let start = index * 32;
    let word = data
        .get(start..start + 32)
        .with_context(|| format!("ABI data too short for word {index} (len {})", data.len()))?;
    Ok(B256::from_slice(word))
}

/// Decode the word at the given index as an unsigned integer.
pub fn decode_uint(data: &[u8], index: usize) -> Result<U256> {
    Ok(U256::from_be_bytes(word_at(data, index)?.0))
}

/// Decode the word at the given index as an address (left-padded).
pub fn decode_address(data: &[u8], index: usize) -> Result<Address> {
    Ok(Address::from_word(word_at(data, index)?))
}

/// Decode a return blob containing a single `string`.
pub fn decode_string(data: &[u8]) -> Result<String> {
    let offset: usize = decode_uint(data, 0)?
        .try_into()
        .ok()
        .context("string offset does not fit in usize")?;
    let contents_start = offset
        .checked_add(32)
        .context("string offset overflows")?;
    let len: usize = U256::from_be_bytes(
        B256::from_slice(
            data.get(offset..contents_start)
                .context("ABI data too short for string length")?,
        )
        .0,
    )
    .try_into()
    .ok()
    .context("string length does not fit in usize")?;
    let contents_end = contents_start
        .checked_add(len)
        .context("string length overflows")?;
    let bytes = data
        .get(contents_start..contents_end)
        .context("ABI data too short for string contents")?;
    String::from_utf8(bytes.to_vec()).context("string contents are not valid UTF-8")
}

/// Interpret an indexed event topic as an unsigned integer.
pub fn topic_u256(topic: &B256) -> U256 {
    U256::from_be_bytes(topic.0)
}

/// Interpret an indexed event topic as a u64 (subscription and request ids).
pub fn topic_u64(topic: &B256) -> Result<u64> {
    u64::try_from(topic_u256(topic)).context("topic value does not fit in u64")
}

fn uint_word(value: u64) -> [u8; 32] {
    U256::from(value).to_be_bytes::<32>()
}

/// Length word followed by the payload, right-padded to a 32-byte boundary.
fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = uint_word(bytes.len() as u64).to_vec();
    out.extend_from_slice(bytes);
    let rem = bytes.len() % 32;
    if rem != 0 {
        out.extend(std::iter::repeat_n(0u8, 32 - rem));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        // Well-known ERC-20/ERC-721 selectors.
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("tokenURI(uint256)"), [0xc8, 0x7b, 0x56, 0xdd]);
        assert_eq!(selector("ownerOf(uint256)"), [0x63, 0x52, 0x21, 0x1e]);
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn test_known_event_topic() {
        assert_eq!(
            hex::encode(event_topic("Transfer(address,address,uint256)")),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn test_encode_static_args() {
        let addr: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
            .parse()
            .unwrap();
        let encoded = encode(&[
            AbiValue::Address(addr),
            AbiValue::Uint(U256::from(1_000_000_000_000_000_000u64)),
            AbiValue::Bool(true),
        ]);

        assert_eq!(encoded.len(), 96);
        assert_eq!(
            hex::encode(&encoded[..32]),
            "00000000000000000000000070997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
        assert_eq!(
            hex::encode(&encoded[32..64]),
            "0000000000000000000000000000000000000000000000000de0b6b3a7640000"
        );
        assert_eq!(encoded[95], 1);
    }

    #[test]
    fn test_encode_single_string() {
        let encoded = encode(&[AbiValue::Str("hello".to_string())]);
        let expected = "0000000000000000000000000000000000000000000000000000000000000020\
                        0000000000000000000000000000000000000000000000000000000000000005\
                        68656c6c6f000000000000000000000000000000000000000000000000000000";
        assert_eq!(hex::encode(&encoded), expected);
    }

    #[test]
    fn test_encode_string_array_layout() {
        let encoded = encode(&[AbiValue::StrArray(vec![
            "ab".to_string(),
            "c".to_string(),
        ])]);

        // Head: offset to the array tail.
        assert_eq!(decode_uint(&encoded, 0).unwrap(), U256::from(32));
        // Array length.
        assert_eq!(decode_uint(&encoded, 1).unwrap(), U256::from(2));
        // Element offsets, relative to the start of the array data area.
        assert_eq!(decode_uint(&encoded, 2).unwrap(), U256::from(64));
        assert_eq!(decode_uint(&encoded, 3).unwrap(), U256::from(128));
        // First element: length 2, contents "ab".
        assert_eq!(decode_uint(&encoded, 4).unwrap(), U256::from(2));
        assert_eq!(&encoded[5 * 32..5 * 32 + 2], b"ab");
        // Second element: length 1, contents "c".
        assert_eq!(decode_uint(&encoded, 6).unwrap(), U256::from(1));
        assert_eq!(encoded[7 * 32], b'c');
    }

    #[test]
    fn test_decode_string_round_trip() {
        let encoded = encode(&[AbiValue::Str("ipfs://QmNifty".to_string())]);
        assert_eq!(decode_string(&encoded).unwrap(), "ipfs://QmNifty");
    }

    #[test]
    fn test_decode_string_rejects_truncated_data() {
        let mut encoded = encode(&[AbiValue::Str("hello world, this is long".to_string())]);
        encoded.truncate(64);
        assert!(decode_string(&encoded).is_err());
    }

    #[test]
    fn test_decode_string_rejects_overflowing_offset_and_length() {
        // Offset word at usize::MAX: offset + 32 must not wrap.
        let huge_offset = U256::from(usize::MAX).to_be_bytes::<32>();
        assert!(decode_string(&huge_offset).is_err());

        // Valid offset, length word at usize::MAX: start + len must not wrap.
        let mut huge_len = uint_word(32).to_vec();
        huge_len.extend_from_slice(&U256::from(usize::MAX).to_be_bytes::<32>());
        assert!(decode_string(&huge_len).is_err());
    }

    #[test]
    fn test_encode_call_prepends_selector() {
        let call = encode_call("ownerOf(uint256)", &[AbiValue::Uint(U256::ZERO)]);
        assert_eq!(call.len(), 36);
        assert_eq!(&call[..4], &[0x63, 0x52, 0x21, 0x1e]);
    }

    #[test]
    fn test_topic_round_trip() {
        let topic = B256::from(U256::from(42u64).to_be_bytes::<32>());
        assert_eq!(topic_u64(&topic).unwrap(), 42);
        assert_eq!(topic_u256(&topic), U256::from(42u64));
    }
}
