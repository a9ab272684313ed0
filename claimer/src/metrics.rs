use solana_metrics::datapoint_info;
use solana_pubkey::Pubkey;

/// One wallet's claim result
pub fn emit_claim_result(wallet: &Pubkey, result: &str, attempts: usize, region: &str) {
    datapoint_info!(
        "grass_claimer_claim",
        ("attempts", attempts, i64),
        "result" => result,
        "wallet" => &wallet.to_string(),
        "region" => region
    );
}

/// Totals of a whole run
pub fn emit_run_summary(command: &str, succeeded: usize, failed: usize, region: &str) {
    datapoint_info!(
        "grass_claimer_run",
        ("succeeded", succeeded, i64),
        ("failed", failed, i64),
        "command" => command,
        "region" => region
    );
}
