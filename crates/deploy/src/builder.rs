//! Builder module for creating a [`Deployer`] configuration.
//!
//! This module provides the [`DeployerBuilder`] struct which simplifies the
//! creation of a [`Deployer`] by handling run label generation, output
//! directory creation, and chain id discovery from the target node.

use std::path::PathBuf;

use alloy_core::primitives::Address;
use anyhow::{Context, Result};

use crate::{Deployer, rpc::ChainClient};

/// Specifies how the output data directory should be created.
#[derive(Debug, Clone)]
pub enum OutDataPath {
    /// Use a temporary directory that will be cleaned up.
    TempDir,
    /// Use a specific path.
    Path(PathBuf),
}

/// Builder for creating a [`Deployer`] configuration.
///
/// This builder handles:
/// - Run label generation (if not provided)
/// - Chain id discovery from the node (if not provided)
/// - Output data directory creation
///
/// # Example
///
/// ```no_run
/// use nifty_deploy::DeployerBuilder;
///
/// # async fn example() -> anyhow::Result<()> {
/// let deployer = DeployerBuilder::new("http://localhost:8545")
///     .chain_id(31337)
///     .run_label("my-run")
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeployerBuilder {
    /// JSON-RPC endpoint of the target node (required).
    rpc_url: String,
    /// Chain id (optional, queried from the node if not provided).
    chain_id: Option<u64>,
    /// Run label (optional, generated if not provided).
    run_label: Option<String>,
    /// The output data path specification.
    outdata: Option<OutDataPath>,
    /// Directory of compiled contract artifacts.
    artifacts_dir: Option<PathBuf>,
    /// Directory of collection images.
    images_dir: Option<PathBuf>,
    /// Below-threshold SVG for the dynamic NFT.
    low_svg: Option<PathBuf>,
    /// At-or-above-threshold SVG for the dynamic NFT.
    high_svg: Option<PathBuf>,
    /// Explicit deployer account.
    deployer_account: Option<Address>,
    /// Whether to publish media instead of using pre-pinned URIs.
    upload_media: bool,
    /// Pinning service credential.
    pinata_jwt: Option<String>,
    /// Explorer API credential.
    etherscan_api_key: Option<String>,
}

impl DeployerBuilder {
    /// Create a new [`DeployerBuilder`] targeting the given RPC endpoint.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id: None,
            run_label: None,
            outdata: None,
            artifacts_dir: None,
            images_dir: None,
            low_svg: None,
            high_svg: None,
            deployer_account: None,
            upload_media: false,
            pinata_jwt: None,
            etherscan_api_key: None,
        }
    }

    /// Set the chain id.
    ///
    /// If not set, the node is queried for it during [`Self::build`].
    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Set the run label.
    ///
    /// If not set, a memorable two-word label will be generated (e.g.
    /// "nifty-happy-turtle").
    pub fn run_label(mut self, label: impl Into<String>) -> Self {
        self.run_label = Some(label.into());
        self
    }

    /// Set the output data directory path.
    ///
    /// If not set, defaults to `./data-<run-label>`.
    pub fn outdata(mut self, outdata: OutDataPath) -> Self {
        self.outdata = Some(outdata);
        self
    }

    /// Set the output data directory to a specific path.
    pub fn outdata_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.outdata = Some(OutDataPath::Path(path.into()));
        self
    }

    /// Set the directory of compiled contract artifacts.
    pub fn artifacts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(path.into());
        self
    }

    /// Set the directory of collection images.
    pub fn images_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.images_dir = Some(path.into());
        self
    }

    /// Set the below-threshold SVG path for the dynamic NFT.
    pub fn low_svg(mut self, path: impl Into<PathBuf>) -> Self {
        self.low_svg = Some(path.into());
        self
    }

    /// Set the at-or-above-threshold SVG path for the dynamic NFT.
    pub fn high_svg(mut self, path: impl Into<PathBuf>) -> Self {
        self.high_svg = Some(path.into());
        self
    }

    /// Set an explicit deployer account instead of the node's first account.
    pub fn deployer_account(mut self, account: Address) -> Self {
        self.deployer_account = Some(account);
        self
    }

    /// Enable or disable media publishing.
    pub fn upload_media(mut self, upload: bool) -> Self {
        self.upload_media = upload;
        self
    }

    /// Set the pinning service credential.
    pub fn pinata_jwt(mut self, jwt: impl Into<String>) -> Self {
        self.pinata_jwt = Some(jwt.into());
        self
    }

    /// Set the explorer API credential, enabling source verification on public
    /// networks.
    pub fn etherscan_api_key(mut self, key: impl Into<String>) -> Self {
        self.etherscan_api_key = Some(key.into());
        self
    }

    /// Build the [`Deployer`] configuration.
    ///
    /// This method:
    /// 1. Generates a run label if not provided
    /// 2. Queries the node for its chain id if not provided
    /// 3. Creates the output data directory if it doesn't exist
    pub async fn build(self) -> Result<Deployer> {
        // Generate run label if not provided
        let run_label = self.run_label.unwrap_or_else(|| {
            let name = names::Generator::default()
                .next()
                .unwrap_or_else(|| "unknown-run".to_string());
            format!("nifty-{}", name)
        });

        // Query the node for the chain id if not provided
        let chain_id = match self.chain_id {
            Some(id) => id,
            None => {
                let url = self.rpc_url.parse().context("Invalid RPC URL")?;
                ChainClient::new(url)?
                    .chain_id()
                    .await
                    .context("Failed to query the node's chain id (is it running?)")?
            }
        };

        // Determine output data path
        let outdata_path = match self.outdata {
            None => PathBuf::from(format!("data-{}", run_label)),
            Some(OutDataPath::TempDir) => {
                let temp_dir = tempdir::TempDir::new("data-nifty-")
                    .context("Failed to create temporary directory")?;
                PathBuf::from(temp_dir.path().to_string_lossy().to_string())
            }
            Some(OutDataPath::Path(path)) => path,
        };

        // Create the output data directory if it doesn't exist
        if !outdata_path.try_exists().context(format!(
            "Failed to check if output data directory exists at path {}. Ensure you provided valid permissions to the directory.",
            outdata_path.display()
        ))? {
            std::fs::create_dir_all(&outdata_path)
                .context("Failed to create output data directory")?;
        }

        let outdata_path = outdata_path
            .canonicalize()
            .context("Failed to canonicalize output data directory path")?;

        tracing::info!(
            run_label,
            chain_id,
            outdata_path = %outdata_path.display(),
            "Building NFT deployer configuration..."
        );

        Ok(Deployer {
            run_label,
            chain_id,
            rpc_url: self.rpc_url,
            outdata: outdata_path,
            artifacts_dir: self
                .artifacts_dir
                .unwrap_or_else(|| PathBuf::from("artifacts")),
            images_dir: self
                .images_dir
                .unwrap_or_else(|| PathBuf::from("images/collection")),
            low_svg: self
                .low_svg
                .unwrap_or_else(|| PathBuf::from("images/frown.svg")),
            high_svg: self
                .high_svg
                .unwrap_or_else(|| PathBuf::from("images/happy.svg")),
            deployer_account: self.deployer_account,
            upload_media: self.upload_media,
            pinata_jwt: self.pinata_jwt,
            etherscan_api_key: self.etherscan_api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = DeployerBuilder::new("http://localhost:8545");
        assert_eq!(builder.rpc_url, "http://localhost:8545");
        assert!(builder.chain_id.is_none());
        assert!(builder.run_label.is_none());
        assert!(builder.outdata.is_none());
        assert!(!builder.upload_media);
        assert!(builder.pinata_jwt.is_none());
    }

    #[test]
    fn test_builder_with_options() {
        let builder = DeployerBuilder::new("http://localhost:8545")
            .chain_id(31337)
            .run_label("test-run")
            .upload_media(true)
            .etherscan_api_key("key");

        assert_eq!(builder.chain_id, Some(31337));
        assert_eq!(builder.run_label, Some("test-run".to_string()));
        assert!(builder.upload_media);
        assert_eq!(builder.etherscan_api_key, Some("key".to_string()));
    }

    #[tokio::test]
    async fn test_build_with_explicit_chain_id_creates_outdata() {
        let tmp = tempdir::TempDir::new("nifty-builder").unwrap();
        let outdata = tmp.path().join("run");

        let deployer = DeployerBuilder::new("http://localhost:8545")
            .chain_id(31337)
            .outdata_path(&outdata)
            .build()
            .await
            .unwrap();

        assert_eq!(deployer.chain_id, 31337);
        assert!(deployer.run_label.starts_with("nifty-"));
        assert!(deployer.outdata.is_dir());
    }
}
