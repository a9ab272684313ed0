//! Claims the Grass airdrop for every wallet of a keys file, or sweeps their balances

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Target};
use log::{info, set_boxed_logger, set_max_level, LevelFilter};
use solana_metrics::set_host_id;
use tokio::runtime::Runtime;

use crate::{
    args::{Args, Commands},
    utils::{read_wallets, Config},
};

mod args;
mod claim;
mod metrics;
mod transfer;
mod utils;

fn init_logger(region: &str) -> anyhow::Result<()> {
    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .filter_level(LevelFilter::Info)
        .parse_default_env();
    let logger = sentry_log::SentryLogger::with_dest(builder.build());
    set_max_level(LevelFilter::Debug);
    set_host_id(format!("grass-claimer-{region}"));
    Ok(set_boxed_logger(Box::new(logger))?)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logger(&args.region)?;

    let _guard = args.sentry_api_url.as_deref().map(|sentry_api_url| {
        sentry::init((
            sentry_api_url,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let config = Config::new(&args);
    let command = args.get_command();
    info!(
        "Running {command:?} with destination {}, tip {} to {}",
        config.destination, config.tip_fraction, config.tip_owner
    );

    let runtime = Runtime::new().context("failed to create tokio runtime")?;
    let result = runtime.block_on(async {
        let wallets = read_wallets(&args.keys_file).await?;
        info!("Keys: {}", wallets.len());

        match command {
            Commands::Claim => claim::claim_all(&config, &wallets).await,
            Commands::Transfer => transfer::transfer_all(&config, &wallets).await,
        }
    });

    solana_metrics::flush();
    result
}
