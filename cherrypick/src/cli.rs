//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Interactive picker for cherry-picking your commits between branches
///
/// Lists the commits on HEAD that are not yet on the source branch, marks
/// the ones already present on the target branch, and replays your
/// selection onto the target branch oldest first.
///
/// Settings are read from $XDG_CONFIG_HOME/cherrypick/config.toml. Set
/// CHERRYPICK_LOG=<file> to write a debug log; RUST_LOG sets the filter.
#[derive(Debug, Parser)]
#[command(name = "cherrypick")]
#[command(version, about)]
pub struct Cli {
    /// Start with the oldest commit at the top (flips `default_reverse`)
    #[arg(short, long)]
    pub reverse: bool,

    /// Write a default config file and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Read settings from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Effective starting orientation: the flag inverts the configured default.
    pub fn oldest_first(&self, default_reverse: bool) -> bool {
        self.reverse != default_reverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_flag_inverts_the_configured_default() {
        let cli = Cli::parse_from(["cherrypick", "-r"]);
        assert!(cli.oldest_first(false));
        assert!(!cli.oldest_first(true));
        let cli = Cli::parse_from(["cherrypick"]);
        assert!(cli.oldest_first(true));
    }

    #[test]
    fn config_path_is_optional() {
        let cli = Cli::parse_from(["cherrypick", "--config", "/tmp/c.toml", "--generate-config"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/c.toml")));
        assert!(cli.generate_config);
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
