use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lftracker - Lightweight Package Tracker
#[derive(Parser)]
#[command(name = "lftracker")]
#[command(about = "Show which installed packages others depend on, grouped by sector, with disk usage")]
#[command(version)]
pub struct Cli {
    /// Configuration file (JSON); built-in defaults when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the catalog and print one filtered view (default command)
    Report {
        /// Sector to show, or "All"
        #[arg(short, long, default_value = "All")]
        sector: String,
        /// Only packages that other packages depend on
        #[arg(short, long)]
        dependents_only: bool,
        /// List reverse dependents under each package
        #[arg(long)]
        show_dependents: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the sector table and sector order
    Sectors,
    /// Print the sector of each package
    Classify {
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Print the reverse dependents of a package
    Dependents { package: String },
    /// Print the installed size of each package and their sum
    Size {
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write the default configuration to a file
    Init { path: PathBuf },
    /// Validate a configuration file
    Validate { path: PathBuf },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_args() {
        let cli = Cli::try_parse_from(["lftracker"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_report_flags() {
        let cli = Cli::try_parse_from([
            "lftracker",
            "report",
            "--sector",
            "Media",
            "--dependents-only",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Report {
                sector,
                dependents_only,
                show_dependents,
                json,
            }) => {
                assert_eq!(sector, "Media");
                assert!(dependents_only);
                assert!(!show_dependents);
                assert!(json);
            }
            _ => panic!("Expected Report command"),
        }
    }

    #[test]
    fn test_cli_report_default_sector() {
        let cli = Cli::try_parse_from(["lftracker", "report"]).unwrap();
        match cli.command {
            Some(Commands::Report { sector, .. }) => assert_eq!(sector, "All"),
            _ => panic!("Expected Report command"),
        }
    }

    #[test]
    fn test_cli_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["lftracker", "sectors", "--config", "/etc/lftracker.json"])
                .unwrap();
        assert_eq!(
            cli.config.unwrap().to_str().unwrap(),
            "/etc/lftracker.json"
        );
    }

    #[test]
    fn test_cli_classify_requires_package() {
        assert!(Cli::try_parse_from(["lftracker", "classify"]).is_err());
        assert!(Cli::try_parse_from(["lftracker", "classify", "bash", "vlc"]).is_ok());
    }

    #[test]
    fn test_cli_config_validate() {
        let cli = Cli::try_parse_from(["lftracker", "config", "validate", "/tmp/c.json"]).unwrap();
        match cli.command {
            Some(Commands::Config {
                action: ConfigCommands::Validate { path },
            }) => assert_eq!(path.to_str().unwrap(), "/tmp/c.json"),
            _ => panic!("Expected Config Validate command"),
        }
    }
}
