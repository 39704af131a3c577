//! Bindings for the randomness-backed NFT (asynchronous mint flow).

use std::path::Path;

use alloy_core::primitives::{Address, B256, U256};
use anyhow::{Context, Result};

use crate::{
    DeploymentRecord, HarnessError,
    abi::{self, AbiValue},
    deployer::deploy_contract,
    rpc::{ChainClient, LogEntry, POLL_INTERVAL, TxRequest},
};

/// Artifact name of the randomness-backed NFT contract.
pub const RANDOM_NFT_ARTIFACT: &str = "RandomIPFS_NFT";

/// Breed bucket, selected from the modded random word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breed {
    Pug,
    ShibaInu,
    StBernard,
}

impl Breed {
    /// Map a modded random word to a breed bucket: 0..10 is Pug, 10..40 is
    /// ShibaInu, 40..100 is StBernard. Anything else is uninterpretable.
    pub fn from_selector(selector: u64) -> Result<Self, HarnessError> {
        match selector {
            0..10 => Ok(Breed::Pug),
            10..40 => Ok(Breed::ShibaInu),
            40..100 => Ok(Breed::StBernard),
            _ => Err(HarnessError::RangeOutOfBounds(selector)),
        }
    }

    /// The ABI enum value, as emitted in the minted event and indexed by the
    /// contract's token URI list.
    pub fn from_index(index: u64) -> Result<Self, HarnessError> {
        match index {
            0 => Ok(Breed::Pug),
            1 => Ok(Breed::ShibaInu),
            2 => Ok(Breed::StBernard),
            _ => Err(HarnessError::RangeOutOfBounds(index)),
        }
    }

    pub fn index(&self) -> u64 {
        match self {
            Breed::Pug => 0,
            Breed::ShibaInu => 1,
            Breed::StBernard => 2,
        }
    }
}

/// Constructor arguments for the randomness-backed NFT.
#[derive(Debug, Clone)]
pub struct RandomNftCtor {
    pub vrf_coordinator: Address,
    pub key_hash: B256,
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    pub token_uris: Vec<String>,
    pub mint_fee: U256,
}

/// Decoded `NFT_Requested(uint256 indexed requestId, address requester)`.
#[derive(Debug, Clone)]
pub struct MintRequest {
    pub request_id: U256,
    /// Block the request transaction was included in; minted-event polling
    /// starts here.
    pub block_number: u64,
}

/// Decoded `NFT_Minted(uint256 indexed tokenId, uint8 breed, address minter)`.
#[derive(Debug, Clone)]
pub struct MintedEvent {
    pub token_id: U256,
    pub breed: Breed,
    pub minter: Address,
}

impl MintedEvent {
    fn decode(log: &LogEntry) -> Result<Self> {
        let token_id = abi::topic_u256(
            log.topics
                .get(1)
                .context("NFT_Minted event is missing its token id topic")?,
        );
        let breed_index = u64::try_from(abi::decode_uint(&log.data, 0)?)
            .context("NFT_Minted breed value does not fit in u64")?;
        Ok(Self {
            token_id,
            breed: Breed::from_index(breed_index)?,
            minter: abi::decode_address(&log.data, 1)?,
        })
    }
}

/// Handle to a deployed randomness-backed NFT.
#[derive(Debug, Clone)]
pub struct RandomNft {
    client: ChainClient,
    pub address: Address,
    from: Address,
}

impl RandomNft {
    pub async fn deploy(
        client: ChainClient,
        from: Address,
        artifacts_dir: &Path,
        confirmations: u64,
        ctor: RandomNftCtor,
    ) -> Result<(Self, DeploymentRecord)> {
        let record = deploy_contract(
            &client,
            from,
            artifacts_dir,
            RANDOM_NFT_ARTIFACT,
            &[
                AbiValue::Address(ctor.vrf_coordinator),
                AbiValue::FixedBytes(ctor.key_hash),
                AbiValue::Uint(U256::from(ctor.subscription_id)),
                AbiValue::Uint(U256::from(ctor.callback_gas_limit)),
                AbiValue::StrArray(ctor.token_uris),
                AbiValue::Uint(ctor.mint_fee),
            ],
            confirmations,
        )
        .await?;
        let address = record.address;
        Ok((Self { client, address, from }, record))
    }

    /// Attach to an already deployed randomness-backed NFT.
    pub fn at(client: ChainClient, address: Address, from: Address) -> Self {
        Self { client, address, from }
    }

    pub async fn mint_fee(&self) -> Result<U256> {
        let data = self
            .client
            .eth_call(self.address, abi::encode_call("getMintFee()", &[]))
            .await?;
        abi::decode_uint(&data, 0)
    }

    pub async fn token_counter(&self) -> Result<U256> {
        let data = self
            .client
            .eth_call(self.address, abi::encode_call("getTokenCounter()", &[]))
            .await?;
        abi::decode_uint(&data, 0)
    }

    pub async fn token_uri(&self, token_id: U256) -> Result<String> {
        let data = self
            .client
            .eth_call(
                self.address,
                abi::encode_call("tokenURI(uint256)", &[AbiValue::Uint(token_id)]),
            )
            .await?;
        abi::decode_string(&data)
    }

    /// The pre-set token URI for a breed.
    pub async fn breed_uri(&self, breed: Breed) -> Result<String> {
        let data = self
            .client
            .eth_call(
                self.address,
                abi::encode_call(
                    "getNFT_TokenURIs(uint256)",
                    &[AbiValue::Uint(U256::from(breed.index()))],
                ),
            )
            .await?;
        abi::decode_string(&data)
    }

    /// Submit a mint request carrying the fee and decode the request id from
    /// the `NFT_Requested` event.
    ///
    /// The fee is checked against the configured minimum up front so an
    /// underpayment surfaces as [`HarnessError::InsufficientPayment`] rather
    /// than an opaque revert.
    pub async fn request_nft(&self, value: U256) -> Result<MintRequest> {
        let required = self.mint_fee().await?;
        check_fee(value, required)?;

        let receipt = self
            .client
            .send_and_confirm(
                &TxRequest {
                    from: self.from,
                    to: Some(self.address),
                    value: Some(value),
                    data: Some(abi::encode_call("requestNFT()", &[]).into()),
                },
                1,
            )
            .await
            .context("Randomness mint request failed")?;

        let topic = abi::event_topic("NFT_Requested(uint256,address)");
        let log = receipt
            .logs
            .iter()
            .find(|log| log.matches(self.address, topic))
            .context("NFT_Requested event not found in request receipt")?;
        let request_id = abi::topic_u256(
            log.topics
                .get(1)
                .context("NFT_Requested event is missing its request id topic")?,
        );

        Ok(MintRequest {
            request_id,
            block_number: receipt.block_number,
        })
    }

    /// Poll for the `NFT_Minted` completion event from the given block onward.
    ///
    /// Unbounded by itself; the caller decides the timeout and drops this
    /// future if the timeout wins the race.
    pub async fn wait_for_minted(&self, from_block: u64) -> Result<MintedEvent> {
        let topic = abi::event_topic("NFT_Minted(uint256,uint8,address)");
        loop {
            let logs = self.client.get_logs(self.address, topic, from_block).await?;
            if let Some(log) = logs.last() {
                return MintedEvent::decode(log);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Fee pre-check for mint requests. Exactly the configured fee is enough;
/// anything below it is rejected before the transaction is submitted.
fn check_fee(sent: U256, required: U256) -> Result<(), HarnessError> {
    if sent < required {
        return Err(HarnessError::InsufficientPayment { sent, required });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::Bytes;

    #[test]
    fn test_breed_classification_thresholds() {
        assert_eq!(Breed::from_selector(7).unwrap(), Breed::Pug);
        assert_eq!(Breed::from_selector(21).unwrap(), Breed::ShibaInu);
        assert_eq!(Breed::from_selector(77).unwrap(), Breed::StBernard);
        assert!(matches!(
            Breed::from_selector(100).unwrap_err(),
            HarnessError::RangeOutOfBounds(100)
        ));
    }

    #[test]
    fn test_breed_boundaries() {
        assert_eq!(Breed::from_selector(0).unwrap(), Breed::Pug);
        assert_eq!(Breed::from_selector(9).unwrap(), Breed::Pug);
        assert_eq!(Breed::from_selector(10).unwrap(), Breed::ShibaInu);
        assert_eq!(Breed::from_selector(39).unwrap(), Breed::ShibaInu);
        assert_eq!(Breed::from_selector(40).unwrap(), Breed::StBernard);
        assert_eq!(Breed::from_selector(99).unwrap(), Breed::StBernard);
        assert!(Breed::from_selector(u64::MAX).is_err());
    }

    #[test]
    fn test_underpaid_request_is_rejected() {
        let required = U256::from(10_000_000_000_000_000u64);
        let sent = required - U256::from(1u64);
        assert!(matches!(
            check_fee(sent, required).unwrap_err(),
            HarnessError::InsufficientPayment { .. }
        ));
        assert!(matches!(
            check_fee(U256::ZERO, required).unwrap_err(),
            HarnessError::InsufficientPayment { .. }
        ));
    }

    #[test]
    fn test_exact_and_overpaid_fee_are_accepted() {
        let required = U256::from(10_000_000_000_000_000u64);
        assert!(check_fee(required, required).is_ok());
        assert!(check_fee(required + U256::from(1u64), required).is_ok());
    }

    #[test]
    fn test_breed_index_round_trip() {
        for breed in [Breed::Pug, Breed::ShibaInu, Breed::StBernard] {
            assert_eq!(Breed::from_index(breed.index()).unwrap(), breed);
        }
        assert!(Breed::from_index(3).is_err());
    }

    #[test]
    fn test_minted_event_decodes_by_named_topics() {
        let contract: Address = "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap();
        let minter: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap();

        let mut data = Vec::new();
        data.extend_from_slice(&U256::from(1u64).to_be_bytes::<32>()); // breed = ShibaInu
        data.extend_from_slice(minter.into_word().as_slice());

        let log = LogEntry {
            address: contract,
            topics: vec![
                abi::event_topic("NFT_Minted(uint256,uint8,address)"),
                B256::from(U256::from(5u64).to_be_bytes::<32>()),
            ],
            data: Bytes::from(data),
            block_number: Some(12),
        };

        let minted = MintedEvent::decode(&log).unwrap();
        assert_eq!(minted.token_id, U256::from(5u64));
        assert_eq!(minted.breed, Breed::ShibaInu);
        assert_eq!(minted.minter, minter);
    }

    #[test]
    fn test_minted_event_rejects_unknown_breed() {
        let contract: Address = "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap();
        let mut data = Vec::new();
        data.extend_from_slice(&U256::from(9u64).to_be_bytes::<32>());
        data.extend_from_slice(Address::ZERO.into_word().as_slice());

        let log = LogEntry {
            address: contract,
            topics: vec![
                abi::event_topic("NFT_Minted(uint256,uint8,address)"),
                B256::ZERO,
            ],
            data: Bytes::from(data),
            block_number: None,
        };
        assert!(MintedEvent::decode(&log).is_err());
    }
}
