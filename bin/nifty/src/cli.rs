use alloy_core::primitives::Address;
use clap::Parser;
use tracing::level_filters::LevelFilter;

use nifty_deploy::{LOCAL_CHAIN_ID, SEPOLIA_CHAIN_ID};

/// The default target network.
const DEFAULT_NETWORK: Network = Network::Localhost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Network {
    Localhost,
    Sepolia,
    #[strum(to_string = "{0}")]
    Custom(u64),
}

impl std::str::FromStr for Network {
    type Err = String;

    /// Accepts a known network name or a bare chain id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "localhost" => Ok(Network::Localhost),
            "sepolia" => Ok(Network::Sepolia),
            other => other.parse::<u64>().map(Network::Custom).map_err(|_| {
                format!("unknown network '{other}' (expected localhost, sepolia, or a chain id)")
            }),
        }
    }
}

impl Network {
    pub fn to_chain_id(&self) -> u64 {
        match self {
            Network::Localhost => LOCAL_CHAIN_ID,
            Network::Sepolia => SEPOLIA_CHAIN_ID,
            Network::Custom(id) => *id,
        }
    }

    /// Default RPC endpoint for the network, if a public one exists.
    pub fn default_rpc_url(&self) -> Option<&'static str> {
        match self {
            Network::Localhost => Some("http://localhost:8545"),
            Network::Sepolia => Some("https://ethereum-sepolia-rpc.publicnode.com"),
            Network::Custom(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum OutData {
    TempDir,
    /// Anything that is not a known keyword is taken as a path.
    #[strum(default)]
    Path(String),
}

#[derive(Parser)]
#[command(name = "nifty")]
#[command(
    author,
    version,
    about = "Deploy and exercise an NFT contract suite in a few clicks"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "NIFTY_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// The target network (name or chain id).
    #[arg(short, long, env = "NIFTY_NETWORK", default_value_t = DEFAULT_NETWORK)]
    pub network: Network,

    /// The URL of the node's JSON-RPC endpoint.
    ///
    /// If not provided, a public endpoint for the selected network is used
    /// (or http://localhost:8545 for localhost).
    #[arg(long, alias = "rpc", env = "NIFTY_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Step tags to run, comma separated.
    ///
    /// Known tags: all, mocks, basic, random, dynamic, main, mint. Selected
    /// steps pull in their dependencies automatically.
    #[arg(short, long, env = "NIFTY_TAGS", value_delimiter = ',', default_value = "all")]
    pub tags: Vec<String>,

    /// A custom label for this run. If not provided, a memorable name is
    /// generated (e.g. nifty-happy-turtle).
    #[arg(short = 'l', long, visible_alias = "label", env = "NIFTY_RUN_LABEL")]
    pub run_label: Option<String>,

    /// The path to the output data directory.
    ///
    /// If not provided, the data will be stored at: ./data-<run-label>
    #[arg(long, alias = "outdata", env = "NIFTY_OUTDATA")]
    pub outdata: Option<OutData>,

    /// Directory of compiled contract artifacts (<Name>.json files).
    #[arg(long, env = "NIFTY_ARTIFACTS_DIR")]
    pub artifacts_dir: Option<String>,

    /// Directory of images for the random NFT collection.
    #[arg(long, env = "NIFTY_IMAGES_DIR")]
    pub images_dir: Option<String>,

    /// The account to deploy from. If not provided, the node's first managed
    /// account is used.
    #[arg(long, env = "NIFTY_DEPLOYER_ACCOUNT")]
    pub deployer_account: Option<Address>,

    /// Publish collection images and metadata to the pinning service instead
    /// of using the pre-pinned token URIs. Requires PINATA_JWT.
    #[arg(long, env = "NIFTY_UPLOAD_MEDIA", default_value_t = false)]
    pub upload_media: bool,

    /// Credential for the pinning service.
    #[arg(long, env = "PINATA_JWT", hide_env_values = true)]
    pub pinata_jwt: Option<String>,

    /// Explorer API credential; enables best-effort source verification on
    /// public networks.
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    pub etherscan_api_key: Option<String>,

    /// Path to an existing Nifty.toml configuration file to load.
    ///
    /// When provided, the run will use the configuration from this file
    /// instead of generating a new one from CLI arguments.
    #[arg(long, alias = "conf", env = "NIFTY_CONFIG")]
    pub config: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_network_parses_names_and_chain_ids() {
        assert_eq!(Network::from_str("localhost").unwrap(), Network::Localhost);
        assert_eq!(Network::from_str("sepolia").unwrap(), Network::Sepolia);
        assert_eq!(Network::from_str("31337").unwrap(), Network::Custom(31337));
        assert!(Network::from_str("bogus").is_err());
    }

    #[test]
    fn test_network_displays_its_parse_form() {
        assert_eq!(Network::Localhost.to_string(), "localhost");
        assert_eq!(Network::Sepolia.to_string(), "sepolia");
        assert_eq!(Network::Custom(31337).to_string(), "31337");
    }

    #[test]
    fn test_outdata_parses_temp_dir_and_arbitrary_paths() {
        assert_eq!(OutData::from_str("temp-dir").unwrap(), OutData::TempDir);
        assert_eq!(
            OutData::from_str("/tmp/nifty-run").unwrap(),
            OutData::Path("/tmp/nifty-run".to_string())
        );
    }
}
