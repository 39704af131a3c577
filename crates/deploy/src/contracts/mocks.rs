//! Mock oracle contracts provisioned on local development networks.
//!
//! Stand-ins for the VRF coordinator and the ETH/USD price feed, deployed with
//! fixed constants so the consumer contracts behave deterministically in tests.

use std::path::Path;

use alloy_core::primitives::{Address, U256};
use anyhow::{Context, Result};

use crate::{
    DeploymentRecord,
    abi::{self, AbiValue},
    deployer::deploy_contract,
    rpc::ChainClient,
};

/// Artifact name of the VRF coordinator mock.
pub const VRF_COORDINATOR_ARTIFACT: &str = "VRFCoordinatorV2Mock";
/// Artifact name of the price feed mock.
pub const PRICE_FEED_ARTIFACT: &str = "MockV3Aggregator";

/// Flat fee per randomness request: 0.20 ether.
pub const BASE_FEE_WEI: u128 = 200_000_000_000_000_000;
/// Simulated billing rate: 1 gwei of LINK per gas unit.
pub const GAS_PRICE_LINK: u64 = 1_000_000_000;
/// Decimal precision of the mock price feed.
pub const FEED_DECIMALS: u8 = 8;
/// Initial ETH/USD reading: 2000, at 8 decimals.
pub const FEED_INITIAL_ANSWER: u64 = 200_000_000_000;

/// Handle to a deployed VRF coordinator mock.
#[derive(Debug, Clone)]
pub struct VrfCoordinatorMock {
    client: ChainClient,
    pub address: Address,
    from: Address,
}

impl VrfCoordinatorMock {
    /// Deploy the coordinator mock with the fixed fee constants.
    pub async fn deploy(
        client: ChainClient,
        from: Address,
        artifacts_dir: &Path,
        confirmations: u64,
    ) -> Result<(Self, DeploymentRecord)> {
        let record = deploy_contract(
            &client,
            from,
            artifacts_dir,
            VRF_COORDINATOR_ARTIFACT,
            &[
                AbiValue::Uint(U256::from(BASE_FEE_WEI)),
                AbiValue::Uint(U256::from(GAS_PRICE_LINK)),
            ],
            confirmations,
        )
        .await?;
        let address = record.address;
        Ok((Self { client, address, from }, record))
    }

    /// Attach to an already deployed coordinator mock.
    pub fn at(client: ChainClient, address: Address, from: Address) -> Self {
        Self { client, address, from }
    }

    /// Create a subscription and decode its id from the `SubscriptionCreated`
    /// event of the creation receipt.
    pub async fn create_subscription(&self) -> Result<u64> {
        let receipt = self
            .client
            .send_and_confirm(
                &crate::rpc::TxRequest {
                    from: self.from,
                    to: Some(self.address),
                    data: Some(abi::encode_call("createSubscription()", &[]).into()),
                    ..Default::default()
                },
                1,
            )
            .await
            .context("Failed to create randomness subscription")?;

        let topic = abi::event_topic("SubscriptionCreated(uint64,address)");
        let log = receipt
            .logs
            .iter()
            .find(|log| log.matches(self.address, topic))
            .context("SubscriptionCreated event not found in creation receipt")?;
        let sub_id = abi::topic_u64(
            log.topics
                .get(1)
                .context("SubscriptionCreated event is missing its id topic")?,
        )?;

        tracing::info!(subscription_id = sub_id, "Randomness subscription created");
        Ok(sub_id)
    }

    /// Fund a subscription with the given amount of (simulated) LINK.
    pub async fn fund_subscription(&self, subscription_id: u64, amount: U256) -> Result<()> {
        self.client
            .send_and_confirm(
                &crate::rpc::TxRequest {
                    from: self.from,
                    to: Some(self.address),
                    data: Some(
                        abi::encode_call(
                            "fundSubscription(uint64,uint96)",
                            &[
                                AbiValue::Uint(U256::from(subscription_id)),
                                AbiValue::Uint(amount),
                            ],
                        )
                        .into(),
                    ),
                    ..Default::default()
                },
                1,
            )
            .await
            .context("Failed to fund randomness subscription")?;
        tracing::info!(subscription_id, %amount, "Subscription funded");
        Ok(())
    }

    /// Register a consumer contract against a subscription. A consumer must be
    /// registered before it can request randomness.
    pub async fn add_consumer(&self, subscription_id: u64, consumer: Address) -> Result<()> {
        self.client
            .send_and_confirm(
                &crate::rpc::TxRequest {
                    from: self.from,
                    to: Some(self.address),
                    data: Some(
                        abi::encode_call(
                            "addConsumer(uint64,address)",
                            &[
                                AbiValue::Uint(U256::from(subscription_id)),
                                AbiValue::Address(consumer),
                            ],
                        )
                        .into(),
                    ),
                    ..Default::default()
                },
                1,
            )
            .await
            .context("Failed to register consumer against subscription")?;
        tracing::info!(subscription_id, %consumer, "Consumer registered");
        Ok(())
    }

    /// Trigger fulfillment of a pending randomness request. Only the mock has
    /// this entry point; on public networks the oracle network fulfills.
    pub async fn fulfill_random_words(&self, request_id: U256, consumer: Address) -> Result<()> {
        self.client
            .send_and_confirm(
                &crate::rpc::TxRequest {
                    from: self.from,
                    to: Some(self.address),
                    data: Some(
                        abi::encode_call(
                            "fulfillRandomWords(uint256,address)",
                            &[AbiValue::Uint(request_id), AbiValue::Address(consumer)],
                        )
                        .into(),
                    ),
                    ..Default::default()
                },
                1,
            )
            .await
            .context("Failed to trigger mock randomness fulfillment")?;
        Ok(())
    }
}

/// Handle to a deployed price feed mock.
#[derive(Debug, Clone)]
pub struct PriceFeedMock {
    pub address: Address,
}

impl PriceFeedMock {
    /// Deploy the feed mock with the fixed precision and initial reading.
    pub async fn deploy(
        client: &ChainClient,
        from: Address,
        artifacts_dir: &Path,
        confirmations: u64,
    ) -> Result<(Self, DeploymentRecord)> {
        let record = deploy_contract(
            client,
            from,
            artifacts_dir,
            PRICE_FEED_ARTIFACT,
            &[
                AbiValue::Uint(U256::from(FEED_DECIMALS)),
                AbiValue::Uint(U256::from(FEED_INITIAL_ANSWER)),
            ],
            confirmations,
        )
        .await?;
        Ok((Self { address: record.address }, record))
    }
}
