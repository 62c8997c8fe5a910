use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "adsb-sim", about = "ADS-B traffic simulator with anomaly injection")]
pub struct Args {
    /// JSONL output path (events are appended)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Number of simultaneous flights
    #[arg(short = 'n', long = "flights", default_value_t = 20)]
    pub flights: usize,

    /// Target events per second
    #[arg(short = 'r', long = "rate", default_value_t = 10)]
    pub rate: u32,

    /// Run duration in seconds (0 = unbounded)
    #[arg(short = 'd', long = "duration", default_value_t = 0)]
    pub duration: u64,

    /// Comma-separated anomaly kinds to inject:
    /// alt_neg,speed_impossible,dup_icao,teleport
    #[arg(short = 'A', long = "anomalies", default_value = "")]
    pub anomalies: String,

    /// RNG seed for reproducible runs (random when omitted)
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Remote ingestion endpoint URL (placeholder, export is skipped
    /// unless endpoint and index are both set)
    #[arg(long = "remote-endpoint")]
    pub remote_endpoint: Option<String>,

    /// API key for the remote endpoint
    #[arg(long = "remote-api-key")]
    pub remote_api_key: Option<String>,

    /// Target index name for remote ingestion
    #[arg(long = "remote-index")]
    pub remote_index: Option<String>,

    /// Batch size for remote bulk sends
    #[arg(long = "remote-batch-size", default_value_t = 200)]
    pub remote_batch_size: usize,

    /// Skip TLS verification for the remote endpoint (lab use only)
    #[arg(long = "remote-skip-verify")]
    pub remote_skip_verify: bool,
}
