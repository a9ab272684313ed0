use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use grass_claim_core::{constants::DEFAULT_TIP_OWNER, TipFraction};
use solana_pubkey::Pubkey;

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = "Claim the Grass airdrop for a list of wallets")]
pub struct Args {
    /// File with one base58 keypair per line
    #[arg(long, env, default_value = "data/keys.txt")]
    pub keys_file: PathBuf,

    /// Directory receiving success.txt and failed.txt
    #[arg(long, env, default_value = "data")]
    pub output_dir: PathBuf,

    /// JSON RPC URL for the cluster
    #[arg(long, env, default_value = "https://api.mainnet-beta.solana.com")]
    pub rpc_url: String,

    /// RPC request timeout in seconds
    #[arg(long, env, default_value_t = 60)]
    pub rpc_timeout_secs: u64,

    /// Base URL of the claim receipt API
    #[arg(long, env, default_value = grass_api_client::MAINNET_BASE_URL)]
    pub api_url: String,

    /// Wallet receiving the claimed tokens
    #[arg(long, env)]
    pub destination: Pubkey,

    /// Wallet receiving the tip
    #[arg(long, env, default_value_t = DEFAULT_TIP_OWNER)]
    pub tip_address: Pubkey,

    /// Share of each allocation sent to the tip address, between 0 and 1
    #[arg(long, env, default_value = "0")]
    pub tip_fraction: TipFraction,

    /// Wallets processed concurrently
    #[arg(long, env, default_value_t = 5)]
    pub threads: usize,

    /// Claim attempts per wallet
    #[arg(long, env, default_value_t = 10)]
    pub max_attempts: usize,

    /// Sentry api url
    #[arg(long, env)]
    pub sentry_api_url: Option<String>,

    /// Region label for metrics purposes
    #[arg(long, env, default_value = "local")]
    pub region: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Claim the allocation of every wallet and forward it to the destination
    Claim,

    /// Forward the whole Grass balance of every wallet to the destination
    Transfer,
}

impl Args {
    pub fn get_command(&self) -> Commands {
        self.command.unwrap_or(Commands::Claim)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}
