use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tracks newly published episodes on the catalog site and records them
/// locally.
#[derive(Parser, Debug)]
#[command(name = "airing", version, about)]
pub struct Args {
    /// Configuration file (TOML, YAML or JSON); replaces the default lookup
    #[arg(short, long, global = true, env = "AIRING_CONFIG")]
    pub config: Option<PathBuf>,

    /// More output (-v debug, -vv trace); `RUST_LOG` takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check the latest updates once and record new episodes
    Sync,
    /// Run a sync at every scheduled time of day until interrupted
    Watch,
    /// Show how many series and episodes are stored
    Stats,
    /// List tracked series, most recently checked first
    Series,
    /// List the recorded episodes of a series
    Episodes {
        /// Internal series identifier, as shown by `airing series`
        series_id: i64,
    },
}

impl Args {
    /// Default log filter for the workspace crates at the requested verbosity.
    pub fn log_filter(&self) -> String {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        ["airing", "airing_config", "airing_extract", "airing_metadata", "airing_render", "airing_store", "airing_sync"]
            .iter()
            .fold("warn".to_string(), |filter, target| format!("{filter},{target}={level}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["airing", "sync"], Command::Sync)]
    #[case(&["airing", "watch", "-v"], Command::Watch)]
    #[case(&["airing", "--config", "a.toml", "stats"], Command::Stats)]
    #[case(&["airing", "series"], Command::Series)]
    #[case(&["airing", "episodes", "12"], Command::Episodes { series_id: 12 })]
    fn test_parse(#[case] argv: &[&str], #[case] expected: Command) {
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.command, expected);
    }

    #[test]
    fn test_episodes_requires_numeric_id() {
        assert!(Args::try_parse_from(["airing", "episodes", "moving"]).is_err());
    }

    #[rstest]
    #[case(&["airing", "sync"], "airing_sync=info")]
    #[case(&["airing", "-v", "sync"], "airing_sync=debug")]
    #[case(&["airing", "sync", "-vvv"], "airing_sync=trace")]
    fn test_log_filter(#[case] argv: &[&str], #[case] expected: &str) {
        let filter = Args::try_parse_from(argv).unwrap().log_filter();
        assert!(filter.starts_with("warn,"));
        assert!(filter.contains(expected), "{filter}");
    }
}
