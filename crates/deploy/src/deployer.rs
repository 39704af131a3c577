//! Top-level orchestrator: resolves the network profile, plans the step graph,
//! and runs each step in order.

use std::path::{Path, PathBuf};

use alloy_core::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    DeploymentRecord, DeploymentStore,
    abi::{self, AbiValue},
    artifact::ContractArtifact,
    config::{NetworkProfile, Profiles},
    contracts::{
        BasicNft, DynamicNft, PriceFeedMock, RandomNft, RandomNftCtor, VrfCoordinatorMock,
        basic_nft, dynamic_nft, mocks, random_nft,
    },
    mint::{self, RandomMintOutcome},
    publisher::{DEFAULT_TOKEN_URIS, Publisher},
    rpc::{ChainClient, TxRequest},
    steps::{self, StepId},
    verify::Verifier,
};

/// The default name for the nifty configuration file.
pub const NIFTYCONF_FILENAME: &str = "Nifty.toml";

/// Amount used to fund the per-run randomness subscription: 1 ether.
const SUBSCRIPTION_FUND_WEI: u128 = 1_000_000_000_000_000_000;

/// Main deployer that orchestrates the NFT suite deployment and mint flows.
///
/// This struct contains all the configuration needed for a run and can be
/// serialized to/from TOML format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployer {
    /// Human-readable label for this run; used to name the output directory.
    pub run_label: String,
    /// Chain id of the target network; must resolve to a known profile.
    pub chain_id: u64,
    /// JSON-RPC endpoint of the target node.
    pub rpc_url: String,
    /// Path to the output data directory (deployment records, saved config).
    pub outdata: PathBuf,
    /// Directory of compiled contract artifacts (`<Name>.json`).
    pub artifacts_dir: PathBuf,
    /// Directory of images for the random NFT collection.
    pub images_dir: PathBuf,
    /// Path of the below-threshold SVG variant for the dynamic NFT.
    pub low_svg: PathBuf,
    /// Path of the at-or-above-threshold SVG variant for the dynamic NFT.
    pub high_svg: PathBuf,
    /// Deployer account. If unset, the first node-managed account is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployer_account: Option<Address>,
    /// Publish images and metadata to the content-addressed store instead of
    /// using the pre-pinned token URIs. Requires `pinata_jwt`.
    pub upload_media: bool,
    /// Credential for the pinning service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinata_jwt: Option<String>,
    /// Explorer API credential; its presence enables best-effort source
    /// verification on public networks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etherscan_api_key: Option<String>,
}

impl Deployer {
    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize deployer config to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file (or a directory containing one).
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file or directory not found: {}",
                path.display()
            ));
        }

        let config_path = if path.is_dir() {
            path.join(NIFTYCONF_FILENAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(config_path)
            .context(format!("Failed to read config from {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Save the configuration to its default location in the output directory.
    pub fn save_config(&self) -> Result<PathBuf> {
        let config_path = self.outdata.join(NIFTYCONF_FILENAME);
        self.save_to_file(&config_path)?;
        Ok(config_path)
    }
}

impl Deployer {
    /// Execute the steps selected by `tags`, plus their dependencies, in
    /// topological order. Returns the deployment records accumulated in the
    /// output directory.
    pub async fn run(&self, tags: &[String], profiles: &Profiles) -> Result<Vec<DeploymentRecord>> {
        let profile = profiles.resolve(self.chain_id)?;
        let url = self.rpc_url.parse().context("Invalid RPC URL")?;
        let client = ChainClient::new(url)?;

        let node_chain_id = client
            .chain_id()
            .await
            .context("Failed to query the node's chain id (is it running?)")?;
        anyhow::ensure!(
            node_chain_id == self.chain_id,
            "Node reports chain id {} but the run targets {}",
            node_chain_id,
            self.chain_id
        );

        let from = match self.deployer_account {
            Some(address) => address,
            None => client
                .accounts()
                .await?
                .first()
                .copied()
                .context("Node manages no accounts; set deployer_account explicitly")?,
        };

        let store = DeploymentStore::new(&self.outdata)?;
        let plan = steps::plan(tags)?;
        tracing::info!(
            network = %profile.name,
            chain_id = self.chain_id,
            deployer = %from,
            ?plan,
            "Executing deployment plan"
        );

        for step in plan {
            tracing::info!(step = %step, "Running step");
            match step {
                StepId::Mocks => self.step_mocks(&client, profile, from, &store).await,
                StepId::BasicNft => self.step_basic_nft(&client, profile, from, &store).await,
                StepId::RandomNft => self.step_random_nft(&client, profile, from, &store).await,
                StepId::DynamicNft => self.step_dynamic_nft(&client, profile, from, &store).await,
                StepId::Mint => self.step_mint(&client, profile, from, &store).await,
            }
            .with_context(|| format!("Step {step} failed; aborting the remaining plan"))?;
        }

        store.all()
    }

    /// Provision mock oracle infrastructure. No-op off local networks.
    async fn step_mocks(
        &self,
        client: &ChainClient,
        profile: &NetworkProfile,
        from: Address,
        store: &DeploymentStore,
    ) -> Result<()> {
        if !profile.is_local {
            tracing::info!(network = %profile.name, "Public network; skipping mock provisioning");
            return Ok(());
        }

        let (_, record) =
            VrfCoordinatorMock::deploy(client.clone(), from, &self.artifacts_dir, profile.confirmations)
                .await?;
        store.save(&record)?;

        let (_, record) =
            PriceFeedMock::deploy(client, from, &self.artifacts_dir, profile.confirmations).await?;
        store.save(&record)?;

        tracing::info!("Mock oracle infrastructure provisioned");
        Ok(())
    }

    async fn step_basic_nft(
        &self,
        client: &ChainClient,
        profile: &NetworkProfile,
        from: Address,
        store: &DeploymentStore,
    ) -> Result<()> {
        let (nft, record) =
            BasicNft::deploy(client.clone(), from, &self.artifacts_dir, profile.confirmations)
                .await?;
        store.save(&record)?;

        // Constructor sanity reads.
        let name = nft.name().await?;
        let symbol = nft.symbol().await?;
        let counter = nft.token_counter().await?;
        tracing::info!(%name, %symbol, %counter, address = %record.address, "Basic NFT deployed");

        if let Some(verifier) = self.verifier(profile) {
            verifier.submit_best_effort(&record).await;
        }
        Ok(())
    }

    /// Deploy the randomness-backed NFT. On local networks this also creates
    /// and funds a subscription, then registers the consumer against it; the
    /// consumer must be registered before it can request randomness.
    async fn step_random_nft(
        &self,
        client: &ChainClient,
        profile: &NetworkProfile,
        from: Address,
        store: &DeploymentStore,
    ) -> Result<()> {
        let token_uris = self.resolve_token_uris().await?;

        let (vrf_coordinator, subscription_id, coordinator) = if profile.is_local {
            let mock_record = store.load(mocks::VRF_COORDINATOR_ARTIFACT)?;
            let coordinator = VrfCoordinatorMock::at(client.clone(), mock_record.address, from);

            let subscription_id = coordinator.create_subscription().await?;
            coordinator
                .fund_subscription(subscription_id, U256::from(SUBSCRIPTION_FUND_WEI))
                .await
                .with_context(|| {
                    format!(
                        "Subscription {subscription_id} was created but funding failed; \
                         it is orphaned and a rerun of the random tag creates a fresh one"
                    )
                })?;

            (mock_record.address, subscription_id, Some(coordinator))
        } else {
            (
                profile
                    .vrf_coordinator
                    .context("Profile has no VRF coordinator address")?,
                profile
                    .subscription_id
                    .context("Profile has no pre-funded subscription id")?,
                None,
            )
        };

        let ctor = RandomNftCtor {
            vrf_coordinator,
            key_hash: profile.key_hash,
            subscription_id,
            callback_gas_limit: profile.callback_gas_limit,
            token_uris,
            mint_fee: profile.mint_fee,
        };
        let (nft, record) = RandomNft::deploy(
            client.clone(),
            from,
            &self.artifacts_dir,
            profile.confirmations,
            ctor,
        )
        .await?;
        store.save(&record)?;

        if let Some(coordinator) = &coordinator {
            coordinator
                .add_consumer(subscription_id, record.address)
                .await
                .with_context(|| {
                    format!(
                        "Subscription {subscription_id} is funded but consumer registration \
                         failed; rerun the random tag to recreate the pair"
                    )
                })?;
        }

        let mint_fee = nft.mint_fee().await?;
        tracing::info!(address = %record.address, %mint_fee, "Random NFT deployed");

        if let Some(verifier) = self.verifier(profile) {
            verifier.submit_best_effort(&record).await;
        }
        Ok(())
    }

    async fn step_dynamic_nft(
        &self,
        client: &ChainClient,
        profile: &NetworkProfile,
        from: Address,
        store: &DeploymentStore,
    ) -> Result<()> {
        let price_feed = if profile.is_local {
            store.load(mocks::PRICE_FEED_ARTIFACT)?.address
        } else {
            profile
                .price_feed
                .context("Profile has no price feed address")?
        };

        let low_svg = std::fs::read_to_string(&self.low_svg)
            .with_context(|| format!("Failed to read {}", self.low_svg.display()))?;
        let high_svg = std::fs::read_to_string(&self.high_svg)
            .with_context(|| format!("Failed to read {}", self.high_svg.display()))?;

        let (_, record) = DynamicNft::deploy(
            client.clone(),
            from,
            &self.artifacts_dir,
            profile.confirmations,
            price_feed,
            low_svg,
            high_svg,
        )
        .await?;
        store.save(&record)?;
        tracing::info!(address = %record.address, "Dynamic NFT deployed");

        if let Some(verifier) = self.verifier(profile) {
            verifier.submit_best_effort(&record).await;
        }
        Ok(())
    }

    /// Drive all three mint flows against the recorded deployments.
    async fn step_mint(
        &self,
        client: &ChainClient,
        profile: &NetworkProfile,
        from: Address,
        store: &DeploymentStore,
    ) -> Result<()> {
        let basic = BasicNft::at(
            client.clone(),
            store.load(basic_nft::BASIC_NFT_ARTIFACT)?.address,
            from,
        );
        mint::mint_basic(&basic).await?;

        let random = RandomNft::at(
            client.clone(),
            store.load(random_nft::RANDOM_NFT_ARTIFACT)?.address,
            from,
        );
        let coordinator = if profile.is_local {
            Some(VrfCoordinatorMock::at(
                client.clone(),
                store.load(mocks::VRF_COORDINATOR_ARTIFACT)?.address,
                from,
            ))
        } else {
            None
        };
        match mint::mint_random(&random, coordinator.as_ref()).await? {
            RandomMintOutcome::Minted(minted) => {
                let counter = random.token_counter().await?;
                tracing::info!(
                    token_id = %minted.token_id,
                    %counter,
                    "Random mint confirmed; counter advanced"
                );
            }
            RandomMintOutcome::TimedOut => {
                tracing::warn!("Random mint left unconfirmed; continuing with the plan");
            }
        }

        let dynamic = DynamicNft::at(
            client.clone(),
            store.load(dynamic_nft::DYNAMIC_NFT_ARTIFACT)?.address,
            from,
        );
        mint::mint_dynamic(&dynamic, U256::from(mint::DYNAMIC_HIGH_VALUE_WEI)).await?;

        Ok(())
    }

    async fn resolve_token_uris(&self) -> Result<Vec<String>> {
        if !self.upload_media {
            tracing::info!("Media publishing disabled; using pre-pinned token URIs");
            return Ok(DEFAULT_TOKEN_URIS.iter().map(|s| s.to_string()).collect());
        }
        let jwt = self
            .pinata_jwt
            .as_deref()
            .context("upload_media is set but no pinning credential is configured")?;
        Publisher::new(jwt)?
            .publish_directory(&self.images_dir)
            .await
    }

    /// Verification is available only on public networks with both an explorer
    /// endpoint and a credential configured.
    fn verifier(&self, profile: &NetworkProfile) -> Option<Verifier> {
        if profile.is_local {
            return None;
        }
        let api_url = profile.explorer_api.as_deref()?;
        let api_key = self.etherscan_api_key.as_deref()?;
        Verifier::new(api_url, api_key)
            .map_err(|e| tracing::warn!(error = %e, "Failed to build verifier; skipping verification"))
            .ok()
    }
}

/// Deploy one contract: load its artifact, append the ABI-encoded constructor
/// arguments to the creation bytecode, submit, and wait for the configured
/// confirmation count.
pub(crate) async fn deploy_contract(
    client: &ChainClient,
    from: Address,
    artifacts_dir: &Path,
    name: &str,
    args: &[AbiValue],
    confirmations: u64,
) -> Result<DeploymentRecord> {
    let artifact = ContractArtifact::load(artifacts_dir, name)?;
    let encoded_args = abi::encode(args);
    let mut data = artifact.bytecode.to_vec();
    data.extend_from_slice(&encoded_args);

    tracing::info!(contract = name, confirmations, "Deploying...");
    let receipt = client
        .send_and_confirm(
            &TxRequest {
                from,
                to: None,
                data: Some(data.into()),
                ..Default::default()
            },
            confirmations,
        )
        .await
        .with_context(|| format!("Failed to deploy {name}"))?;

    let address = receipt
        .contract_address
        .with_context(|| format!("Deployment receipt for {name} carries no contract address"))?;
    tracing::info!(contract = name, %address, block = receipt.block_number, "Deployed");

    Ok(DeploymentRecord {
        name: artifact.contract_name,
        address,
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        constructor_args: hex::encode(encoded_args),
        deployed_at: chrono::Utc::now(),
    })
}
