//! Integration tests for nifty-deploy's offline surface: step planning,
//! network profiles, and configuration round-trips.
//!
//! Nothing here talks to a node; the end-to-end deploy and mint flows need a
//! local development chain plus compiled artifacts and are exercised manually.
//! Run with: cargo test --test plan_test

use std::path::PathBuf;

use nifty_deploy::{
    Deployer, DeployerBuilder, LOCAL_CHAIN_ID, NIFTYCONF_FILENAME, OutDataPath, Profiles,
    SEPOLIA_CHAIN_ID,
    steps::{self, StepId},
};

fn tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

#[test]
fn plan_orders_dependencies_before_dependents() {
    let plan = steps::plan(&tags(&["all"])).unwrap();

    let position = |id: StepId| plan.iter().position(|s| *s == id).unwrap();
    assert!(position(StepId::Mocks) < position(StepId::RandomNft));
    assert!(position(StepId::Mocks) < position(StepId::DynamicNft));
    assert!(position(StepId::BasicNft) < position(StepId::Mint));
    assert!(position(StepId::RandomNft) < position(StepId::Mint));
    assert!(position(StepId::DynamicNft) < position(StepId::Mint));
}

#[test]
fn plan_is_deterministic() {
    let first = steps::plan(&tags(&["mint"])).unwrap();
    let second = steps::plan(&tags(&["mint"])).unwrap();
    assert_eq!(first, second);
}

#[test]
fn builtin_profiles_cover_local_and_sepolia() {
    let profiles = Profiles::builtin();

    let local = profiles.resolve(LOCAL_CHAIN_ID).unwrap();
    assert!(local.is_local);

    let sepolia = profiles.resolve(SEPOLIA_CHAIN_ID).unwrap();
    assert!(!sepolia.is_local);

    // Both charge the same mint fee.
    assert_eq!(local.mint_fee, sepolia.mint_fee);
}

#[tokio::test]
async fn built_config_survives_a_toml_round_trip() {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();
    let tmp = tempdir::TempDir::new("nifty-it").unwrap();

    let deployer = DeployerBuilder::new("http://localhost:8545")
        .chain_id(LOCAL_CHAIN_ID)
        .run_label("nifty-it")
        .outdata(OutDataPath::Path(tmp.path().join("run")))
        .artifacts_dir(PathBuf::from("artifacts"))
        .build()
        .await
        .unwrap();

    let config_path = deployer.save_config().unwrap();
    assert!(config_path.ends_with(NIFTYCONF_FILENAME));

    let loaded = Deployer::load_from_file(&config_path).unwrap();
    assert_eq!(loaded, deployer);

    // Loading by directory finds the same file.
    let by_dir = Deployer::load_from_file(&deployer.outdata).unwrap();
    assert_eq!(by_dir, deployer);
}
