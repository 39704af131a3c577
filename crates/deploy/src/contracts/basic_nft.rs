//! Bindings for the plain ERC-721 contract (synchronous mint flow).

use std::path::Path;

use alloy_core::primitives::{Address, U256};
use anyhow::{Context, Result};

use crate::{
    DeploymentRecord,
    abi::{self, AbiValue},
    deployer::deploy_contract,
    rpc::{ChainClient, TxReceipt, TxRequest},
};

/// Artifact name of the basic NFT contract.
pub const BASIC_NFT_ARTIFACT: &str = "BasicNFT";

/// Handle to a deployed basic NFT.
#[derive(Debug, Clone)]
pub struct BasicNft {
    client: ChainClient,
    pub address: Address,
    from: Address,
}

impl BasicNft {
    /// Deploy the basic NFT. Its constructor takes no arguments.
    pub async fn deploy(
        client: ChainClient,
        from: Address,
        artifacts_dir: &Path,
        confirmations: u64,
    ) -> Result<(Self, DeploymentRecord)> {
        let record =
            deploy_contract(&client, from, artifacts_dir, BASIC_NFT_ARTIFACT, &[], confirmations)
                .await?;
        let address = record.address;
        Ok((Self { client, address, from }, record))
    }

    /// Attach to an already deployed basic NFT.
    pub fn at(client: ChainClient, address: Address, from: Address) -> Self {
        Self { client, address, from }
    }

    /// Mint one token to the caller and wait for a single confirmation.
    pub async fn mint(&self) -> Result<TxReceipt> {
        self.client
            .send_and_confirm(
                &TxRequest {
                    from: self.from,
                    to: Some(self.address),
                    data: Some(abi::encode_call("mintNFT()", &[]).into()),
                    ..Default::default()
                },
                1,
            )
            .await
            .context("Basic NFT mint failed")
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

    pub async fn token_counter(&self) -> Result<U256> {
        let data = self
            .client
            .eth_call(self.address, abi::encode_call("getTokenCounter()", &[]))
            .await?;
        abi::decode_uint(&data, 0)
    }

    pub async fn owner_of(&self, token_id: U256) -> Result<Address> {
        let data = self
            .client
            .eth_call(
                self.address,
                abi::encode_call("ownerOf(uint256)", &[AbiValue::Uint(token_id)]),
            )
            .await?;
        abi::decode_address(&data, 0)
    }

    pub async fn name(&self) -> Result<String> {
        let data = self
            .client
            .eth_call(self.address, abi::encode_call("name()", &[]))
            .await?;
        abi::decode_string(&data)
    }

    pub async fn symbol(&self) -> Result<String> {
        let data = self
            .client
            .eth_call(self.address, abi::encode_call("symbol()", &[]))
            .await?;
        abi::decode_string(&data)
    }
}
