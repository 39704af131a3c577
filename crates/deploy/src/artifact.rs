//! Compiled contract artifacts and per-run deployment records.

use std::path::{Path, PathBuf};

use alloy_core::primitives::{Address, B256, Bytes};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A compiled contract as consumed by the deployer: ABI plus creation bytecode.
///
/// Artifacts come from the contract build (out of scope here) and are dropped
/// into the artifacts directory as `<Name>.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractArtifact {
    #[serde(rename = "contractName")]
    pub contract_name: String,
    pub abi: serde_json::Value,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Load `<dir>/<name>.json`.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let path = dir.join(format!("{name}.json"));
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))
    }
}

/// Result of a single contract deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub name: String,
    pub address: Address,
    pub tx_hash: B256,
    pub block_number: u64,
    /// Hex-encoded ABI constructor arguments, as submitted.
    pub constructor_args: String,
    pub deployed_at: chrono::DateTime<chrono::Utc>,
}

/// Persists deployment records under `<outdata>/deployments` so later steps of
/// a run (and reruns within a test session) can pick up addresses without
/// redeploying.
#[derive(Debug, Clone)]
pub struct DeploymentStore {
    dir: PathBuf,
}

impl DeploymentStore {
    pub fn new(outdata: &Path) -> Result<Self> {
        let dir = outdata.join("deployments");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn save(&self, record: &DeploymentRecord) -> Result<()> {
        let path = self.record_path(&record.name);
        let content = serde_json::to_string_pretty(record)
            .context("Failed to serialize deployment record")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(name = %record.name, path = %path.display(), "Deployment record saved");
        Ok(())
    }

    /// Load the record for a previously deployed contract. Fails if the step
    /// that deploys it has not run against this output directory.
    pub fn load(&self, name: &str) -> Result<DeploymentRecord> {
        let path = self.record_path(name);
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "No deployment record for {name} at {} (has its deploy step run?)",
                path.display()
            )
        })?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse deployment record {}", path.display()))
    }

    /// All records in this store, sorted by name.
    pub fn all(&self) -> Result<Vec<DeploymentRecord>> {
        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {}", self.dir.display()))?
        {
            let path = entry.context("Failed to read directory entry")?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                records.push(serde_json::from_str(&content).with_context(|| {
                    format!("Failed to parse deployment record {}", path.display())
                })?);
            }
        }
        records.sort_by(|a: &DeploymentRecord, b: &DeploymentRecord| a.name.cmp(&b.name));
        Ok(records)
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn sample_record(name: &str) -> DeploymentRecord {
        DeploymentRecord {
            name: name.to_string(),
            address: "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap(),
            tx_hash: B256::repeat_byte(0x42),
            block_number: 7,
            constructor_args: "deadbeef".to_string(),
            deployed_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_store_round_trip() {
        let tmp = TempDir::new("nifty-store").unwrap();
        let store = DeploymentStore::new(tmp.path()).unwrap();

        let record = sample_record("BasicNFT");
        store.save(&record).unwrap();

        let loaded = store.load("BasicNFT").unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_load_missing_record_fails() {
        let tmp = TempDir::new("nifty-store").unwrap();
        let store = DeploymentStore::new(tmp.path()).unwrap();
        assert!(store.load("DynamicNFT").is_err());
    }

    #[test]
    fn test_all_is_sorted_by_name() {
        let tmp = TempDir::new("nifty-store").unwrap();
        let store = DeploymentStore::new(tmp.path()).unwrap();
        store.save(&sample_record("RandomIPFS_NFT")).unwrap();
        store.save(&sample_record("BasicNFT")).unwrap();

        let names: Vec<String> = store.all().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["BasicNFT", "RandomIPFS_NFT"]);
    }

    #[test]
    fn test_artifact_parses_build_output() {
        let raw = r#"{
            "contractName": "BasicNFT",
            "abi": [],
            "bytecode": "0x6080604052"
        }"#;
        let artifact: ContractArtifact = serde_json::from_str(raw).unwrap();
        assert_eq!(artifact.contract_name, "BasicNFT");
        assert_eq!(artifact.bytecode.len(), 5);
    }
}
