use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "horde-server", about = "Headless wave-survival server with bot players")]
pub struct Opt {
    /// Number of simulated bot players.
    #[clap(short, long)]
    pub players: Option<usize>,
    /// Seed of the session random stream.
    #[clap(short, long)]
    pub seed: Option<u64>,
    /// RON file overriding the default tunables.
    #[clap(short, long)]
    pub config: Option<PathBuf>,
    /// Stop after this much simulated time.
    #[clap(long)]
    pub duration_secs: Option<u64>,
    #[clap(long)]
    pub tick_ms: Option<u64>,
    #[clap(long)]
    pub cid: Option<String>,
}
