use std::{
    net::Ipv4Addr,
    path::PathBuf,
};

use clap::Parser;

/// Command-line configuration for the coordinator.
#[derive(Parser, Clone, Debug)]
#[clap(about = "Work-dispatch coordinator for the scraping swarm")]
pub struct CoordinatorConfig {
    /// Directory holding the durable logs and rotated result segments
    #[clap(long, default_value = "output")]
    pub output: PathBuf,

    /// First work ID of the crawl range
    #[clap(long, default_value_t = 1)]
    pub start_id: u64,

    /// Last work ID of the crawl range (inclusive)
    #[clap(long, default_value_t = 16_000_000)]
    pub end_id: u64,

    /// Host interface to bind to
    #[clap(long, default_value = "0.0.0.0")]
    pub host: Ipv4Addr,

    /// Port to bind to
    #[clap(short, long, default_value = "8000")]
    pub port: u16,
}

impl CoordinatorConfig {
    pub fn public_file(&self) -> PathBuf {
        self.output.join("public.txt")
    }

    pub fn private_file(&self) -> PathBuf {
        self.output.join("private.txt")
    }

    pub fn results_file(&self) -> PathBuf {
        self.output.join("results.jsonl")
    }
}
