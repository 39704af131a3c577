//! nifty is a CLI tool to deploy and exercise an NFT contract suite in a few clicks.

mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::Table;

use cli::{Cli, OutData};
use nifty_deploy::{Deployer, DeployerBuilder, DeploymentRecord, OutDataPath, Profiles};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let profiles = Profiles::builtin();

    // If a config file is provided, load it and run
    if let Some(config_path) = &cli.config {
        let config_path = PathBuf::from(config_path);
        let deployer = Deployer::load_from_file(&config_path)?;

        tracing::info!(
            config_path = %config_path.display(),
            outdata_path = %deployer.outdata.display(),
            chain_id = deployer.chain_id,
            "Loading run from config file..."
        );

        let records = deployer.run(&cli.tags, &profiles).await?;
        print_summary(&records);

        return Ok(());
    }

    // Otherwise, create a new run from CLI arguments
    let rpc_url = match cli.rpc_url {
        Some(url) => url,
        None => cli
            .network
            .default_rpc_url()
            .context("No default RPC endpoint for this network; pass --rpc-url")?
            .to_string(),
    };

    let mut builder = DeployerBuilder::new(rpc_url)
        .chain_id(cli.network.to_chain_id())
        .upload_media(cli.upload_media);

    if let Some(run_label) = cli.run_label {
        builder = builder.run_label(run_label);
    }

    if let Some(outdata) = cli.outdata {
        let outdata_path = match outdata {
            OutData::TempDir => OutDataPath::TempDir,
            OutData::Path(path) => OutDataPath::Path(PathBuf::from(path)),
        };
        builder = builder.outdata(outdata_path);
    }

    if let Some(artifacts_dir) = cli.artifacts_dir {
        builder = builder.artifacts_dir(artifacts_dir);
    }

    if let Some(images_dir) = cli.images_dir {
        builder = builder.images_dir(images_dir);
    }

    if let Some(account) = cli.deployer_account {
        builder = builder.deployer_account(account);
    }

    if let Some(jwt) = cli.pinata_jwt {
        builder = builder.pinata_jwt(jwt);
    }

    if let Some(key) = cli.etherscan_api_key {
        builder = builder.etherscan_api_key(key);
    }

    // Build the deployer configuration
    let deployer = builder.build().await?;

    // Save the configuration to Nifty.toml before running
    deployer.save_config()?;

    let records = deployer.run(&cli.tags, &profiles).await?;
    print_summary(&records);

    Ok(())
}

/// Print the accumulated deployment records as a table.
fn print_summary(records: &[DeploymentRecord]) {
    if records.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(["Contract", "Address", "Block", "Tx hash"]);
    for record in records {
        table.add_row([
            record.name.clone(),
            record.address.to_string(),
            record.block_number.to_string(),
            record.tx_hash.to_string(),
        ]);
    }
    println!("{table}");
}
