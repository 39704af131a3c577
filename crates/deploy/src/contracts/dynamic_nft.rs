//! Bindings for the price-threshold SVG NFT (threshold mint flow).

use std::path::Path;

use alloy_core::primitives::{Address, U256};
use anyhow::{Context, Result};

use crate::{
    DeploymentRecord,
    abi::{self, AbiValue},
    deployer::deploy_contract,
    rpc::{ChainClient, TxReceipt, TxRequest},
};

/// Artifact name of the dynamic SVG NFT contract.
pub const DYNAMIC_NFT_ARTIFACT: &str = "DynamicNFT";

/// Handle to a deployed dynamic SVG NFT.
#[derive(Debug, Clone)]
pub struct DynamicNft {
    client: ChainClient,
    pub address: Address,
    from: Address,
}

impl DynamicNft {
    /// Deploy with a price feed plus the two SVG variants the contract selects
    /// between: the "low" image below the threshold, the "high" image at or
    /// above it.
    pub async fn deploy(
        client: ChainClient,
        from: Address,
        artifacts_dir: &Path,
        confirmations: u64,
        price_feed: Address,
        low_svg: String,
        high_svg: String,
    ) -> Result<(Self, DeploymentRecord)> {
        let record = deploy_contract(
            &client,
            from,
            artifacts_dir,
            DYNAMIC_NFT_ARTIFACT,
            &[
                AbiValue::Address(price_feed),
                AbiValue::Str(low_svg),
                AbiValue::Str(high_svg),
            ],
            confirmations,
        )
        .await?;
        let address = record.address;
        Ok((Self { client, address, from }, record))
    }

    /// Attach to an already deployed dynamic NFT.
    pub fn at(client: ChainClient, address: Address, from: Address) -> Self {
        Self { client, address, from }
    }

    /// Mint one token with the caller's threshold value and wait for a single
    /// confirmation.
    pub async fn mint(&self, high_value: U256) -> Result<TxReceipt> {
        self.client
            .send_and_confirm(
                &TxRequest {
                    from: self.from,
                    to: Some(self.address),
                    data: Some(
                        abi::encode_call("mintNFT(int256)", &[AbiValue::Uint(high_value)]).into(),
                    ),
                    ..Default::default()
                },
                1,
            )
            .await
            .context("Dynamic NFT mint failed")
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
}
