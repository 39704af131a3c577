//! nifty-deploy - Deployment and test harness for an NFT contract suite.
//!
//! This crate deploys three NFT contracts (a plain ERC-721, a randomness-backed
//! collection, and a price-threshold dynamic token) against a local development
//! node or a public test network, provisions mock oracle infrastructure where
//! needed, publishes collection media, and drives each mint flow end to end.

pub mod abi;
pub mod config;
pub mod contracts;
pub mod mint;
pub mod publisher;
pub mod rpc;
pub mod steps;

mod artifact;
mod builder;
mod deployer;
mod error;
mod verify;

pub use artifact::{ContractArtifact, DeploymentRecord, DeploymentStore};
pub use builder::{DeployerBuilder, OutDataPath};
pub use config::{LOCAL_CHAIN_ID, NetworkProfile, Profiles, SEPOLIA_CHAIN_ID};
pub use deployer::{Deployer, NIFTYCONF_FILENAME};
pub use error::HarnessError;
pub use verify::Verifier;
