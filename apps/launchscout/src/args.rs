//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Find and rank the launch targets of an extracted game build.
#[derive(Parser, Debug)]
#[command(name = "launchscout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    pub dir: PathBuf,

    /// Target OS (windows, darwin, linux); filters and ranks the result
    #[arg(long)]
    pub os: Option<String>,

    /// Target architecture (386, amd64, arm64)
    #[arg(long)]
    pub arch: Option<String>,

    /// Add execute bits to the candidates that need them
    #[arg(long)]
    pub fix_permissions: bool,

    /// With --fix-permissions, only report what would change
    #[arg(long)]
    pub dry_run: bool,

    /// JSON signature table replacing the built-in one
    #[arg(long)]
    pub signatures: Option<PathBuf>,

    /// Configuration file (defaults to the per-user config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_command_line() {
        let cli = Cli::try_parse_from([
            "launchscout",
            "/games/hex",
            "--os",
            "linux",
            "--arch",
            "amd64",
            "--fix-permissions",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.dir, PathBuf::from("/games/hex"));
        assert_eq!(cli.os.as_deref(), Some("linux"));
        assert_eq!(cli.arch.as_deref(), Some("amd64"));
        assert!(cli.fix_permissions);
        assert!(cli.dry_run);
        assert!(cli.signatures.is_none());
    }

    #[test]
    fn directory_is_required() {
        assert!(Cli::try_parse_from(["launchscout"]).is_err());
    }
}
