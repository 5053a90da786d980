//! Command line of the dedicated server.

use std::path::PathBuf;

use clap::Parser;
use utils::cid::CorrelationId;

mod cli;

const DEFAULT_PLAYERS: usize = 2;
const DEFAULT_DURATION_SECS: u64 = 300;
const DEFAULT_TICK_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct ServerArgs {
    pub players: usize,
    pub seed: u64,
    pub config: Option<PathBuf>,
    pub duration_secs: u64,
    pub tick_ms: u64,
    pub cid: CorrelationId,
}

impl From<cli::Opt> for ServerArgs {
    fn from(opt: cli::Opt) -> Self {
        Self {
            players: opt.players.unwrap_or(DEFAULT_PLAYERS),
            seed: opt.seed.unwrap_or_else(rand::random),
            config: opt.config,
            duration_secs: opt.duration_secs.unwrap_or(DEFAULT_DURATION_SECS),
            tick_ms: opt.tick_ms.unwrap_or(DEFAULT_TICK_MS).max(1),
            cid: opt
                .cid
                .map_or_else(CorrelationId::generate, CorrelationId::from),
        }
    }
}

pub fn get_args() -> ServerArgs {
    cli::Opt::parse().into()
}

/// Same as `get_args` but from an explicit argument list.
pub fn parse_args<I, T>(args: I) -> Result<ServerArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    cli::Opt::try_parse_from(args).map(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_flags() {
        let args = parse_args(["horde-server", "--seed", "7"]).unwrap();
        assert_eq!(args.players, DEFAULT_PLAYERS);
        assert_eq!(args.seed, 7);
        assert_eq!(args.tick_ms, DEFAULT_TICK_MS);
        assert!(args.config.is_none());
        assert_eq!(args.cid.as_str().len(), 6);
    }

    #[test]
    fn explicit_flags_win() {
        let args = parse_args([
            "horde-server",
            "--players",
            "4",
            "--duration-secs",
            "60",
            "--tick-ms",
            "0",
            "--cid",
            "soak",
            "--config",
            "tunables.ron",
        ])
        .unwrap();
        assert_eq!(args.players, 4);
        assert_eq!(args.duration_secs, 60);
        assert_eq!(args.tick_ms, 1);
        assert_eq!(args.cid.as_str(), "soak");
        assert_eq!(args.config, Some(PathBuf::from("tunables.ron")));
    }
}
