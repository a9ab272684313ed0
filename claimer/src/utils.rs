use std::{
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context};
use grass_claim_core::TipFraction;
use log::*;
use solana_pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Semaphore};

use crate::args::Args;

/// Grass Claimer Config
pub struct Config {
    /// JSON RPC URL, each wallet gets its own client
    pub rpc_url: String,

    pub rpc_timeout: Duration,

    /// Claim receipt API base URL
    pub api_url: String,

    /// Wallet receiving the claimed tokens
    pub destination: Pubkey,

    /// Wallet receiving the tip
    pub tip_owner: Pubkey,

    pub tip_fraction: TipFraction,

    /// Wallets processed concurrently
    pub threads: usize,

    /// Claim attempts per wallet
    pub max_attempts: usize,

    /// Directory of the result files
    pub output_dir: PathBuf,

    /// Region label for metrics
    pub region: String,
}

impl Config {
    pub fn new(args: &Args) -> Self {
        Self {
            rpc_url: args.rpc_url.clone(),
            rpc_timeout: args.rpc_timeout(),
            api_url: args.api_url.clone(),
            destination: args.destination,
            tip_owner: args.tip_address,
            tip_fraction: args.tip_fraction,
            threads: args.threads.max(1),
            max_attempts: args.max_attempts.max(1),
            output_dir: args.output_dir.clone(),
            region: args.region.clone(),
        }
    }
}

/// A keypair together with the line of the keys file it was read from
pub struct Wallet {
    pub keypair: Keypair,
    pub line: String,
}

pub fn parse_keypair(encoded: &str) -> anyhow::Result<Keypair> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| anyhow!("invalid base58 keypair: {e}"))?;
    Keypair::try_from(bytes.as_slice()).map_err(|e| anyhow!("invalid keypair bytes: {e}"))
}

/// Parse one keypair per non-blank line
pub fn parse_wallets(contents: &str) -> anyhow::Result<Vec<Wallet>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let keypair = parse_keypair(line).with_context(|| format!("keys file line {}", i + 1))?;
            Ok(Wallet {
                keypair,
                line: line.trim().to_string(),
            })
        })
        .collect()
}

pub async fn read_wallets(path: &Path) -> anyhow::Result<Vec<Wallet>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read keys file {}", path.display()))?;
    parse_wallets(&contents)
}

/// Append one line to `file_name` under `output_dir`, creating both when missing
pub async fn append_line(output_dir: &Path, file_name: &str, line: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(file_name);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(format!("{line}\n").as_bytes()).await?;
    Ok(())
}

/// Run `process` for every wallet, at most `threads` at a time
///
/// A permit is held for the whole processing of a wallet. Results keep the order of `wallets`.
pub async fn process_wallets<'a, F, Fut>(
    wallets: &'a [Wallet],
    threads: usize,
    process: F,
) -> Vec<bool>
where
    F: Fn(&'a Wallet) -> Fut,
    Fut: Future<Output = bool>,
{
    let semaphore = Semaphore::new(threads.max(1));

    let tasks = wallets.iter().map(|wallet| {
        let semaphore = &semaphore;
        let process = &process;
        async move {
            let Ok(_permit) = semaphore.acquire().await else {
                error!("Wallet semaphore closed");
                return false;
            };
            process(wallet).await
        }
    });

    futures::future::join_all(tasks).await
}
