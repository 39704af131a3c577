//! Network profiles: per-chain oracle addresses and fee parameters.
//!
//! Profiles are an immutable set resolved once at startup and passed explicitly
//! to every stage; there is no ambient/global lookup.

use alloy_core::primitives::{Address, B256, U256, address, b256};
use serde::{Deserialize, Serialize};

use crate::HarnessError;

/// Chain id used by local anvil/hardhat development nodes.
pub const LOCAL_CHAIN_ID: u64 = 31337;

/// Chain id of the Sepolia test network.
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

/// Mint fee for the randomness-backed NFT: 0.01 ether.
const MINT_FEE_WEI: u64 = 10_000_000_000_000_000;

/// The 30 gwei VRF gas lane.
const KEY_HASH_30_GWEI: B256 =
    b256!("474e34a077df58807dbe9c96d3c009b23b3c6d0cce433e59bbf5b34f823bc56c");

/// Deployment parameters for one target network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub name: String,
    pub chain_id: u64,
    /// Ephemeral local development chain: mocks are provisioned on the fly and
    /// the randomness subscription is created per run.
    pub is_local: bool,
    /// VRF coordinator address. `None` on local chains (the mock provides it).
    pub vrf_coordinator: Option<Address>,
    /// ETH/USD price feed address. `None` on local chains.
    pub price_feed: Option<Address>,
    /// Gas lane key hash for randomness requests.
    pub key_hash: B256,
    /// Pre-created, pre-funded subscription id. `None` on local chains.
    pub subscription_id: Option<u64>,
    /// Gas limit for the randomness fulfillment callback.
    pub callback_gas_limit: u32,
    /// Fee required by the randomness-backed mint, in wei.
    pub mint_fee: U256,
    /// Block confirmations to wait for after each deployment.
    pub confirmations: u64,
    /// Etherscan-style API endpoint for source verification, if one exists.
    pub explorer_api: Option<String>,
}

/// The full set of known network profiles.
#[derive(Debug, Clone)]
pub struct Profiles {
    profiles: Vec<NetworkProfile>,
}

impl Profiles {
    /// The built-in profile set: a local development chain and Sepolia.
    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                NetworkProfile {
                    name: "localhost".to_string(),
                    chain_id: LOCAL_CHAIN_ID,
                    is_local: true,
                    vrf_coordinator: None,
                    price_feed: None,
                    key_hash: KEY_HASH_30_GWEI,
                    subscription_id: None,
                    callback_gas_limit: 500_000,
                    mint_fee: U256::from(MINT_FEE_WEI),
                    confirmations: 1,
                    explorer_api: None,
                },
                NetworkProfile {
                    name: "sepolia".to_string(),
                    chain_id: SEPOLIA_CHAIN_ID,
                    is_local: false,
                    vrf_coordinator: Some(address!(
                        "8103B0A8A00be2DDC778e6e7eaa21791Cd364625"
                    )),
                    price_feed: Some(address!("694AA1769357215DE4FAC081bf1f309aDC325306")),
                    key_hash: KEY_HASH_30_GWEI,
                    subscription_id: Some(1),
                    callback_gas_limit: 500_000,
                    mint_fee: U256::from(MINT_FEE_WEI),
                    confirmations: 6,
                    explorer_api: Some("https://api-sepolia.etherscan.io/api".to_string()),
                },
            ],
        }
    }

    /// Look up the profile for a chain id.
    pub fn resolve(&self, chain_id: u64) -> Result<&NetworkProfile, HarnessError> {
        self.profiles
            .iter()
            .find(|p| p.chain_id == chain_id)
            .ok_or(HarnessError::ConfigurationNotFound(chain_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkProfile> {
        self.profiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_local_profile() {
        let profiles = Profiles::builtin();
        let local = profiles.resolve(LOCAL_CHAIN_ID).unwrap();
        assert!(local.is_local);
        assert!(local.vrf_coordinator.is_none());
        assert!(local.subscription_id.is_none());
        assert_eq!(local.confirmations, 1);
    }

    #[test]
    fn test_resolve_sepolia_profile() {
        let profiles = Profiles::builtin();
        let sepolia = profiles.resolve(SEPOLIA_CHAIN_ID).unwrap();
        assert!(!sepolia.is_local);
        assert!(sepolia.vrf_coordinator.is_some());
        assert!(sepolia.price_feed.is_some());
        assert!(sepolia.explorer_api.is_some());
        assert_eq!(sepolia.confirmations, 6);
    }

    #[test]
    fn test_resolve_unknown_chain_fails() {
        let profiles = Profiles::builtin();
        let err = profiles.resolve(424242).unwrap_err();
        assert!(matches!(err, HarnessError::ConfigurationNotFound(424242)));
    }

    #[test]
    fn test_mint_fee_is_one_hundredth_ether() {
        let profiles = Profiles::builtin();
        let local = profiles.resolve(LOCAL_CHAIN_ID).unwrap();
        assert_eq!(local.mint_fee, U256::from(10u64).pow(U256::from(16u64)));
    }
}
