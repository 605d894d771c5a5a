//! Command-line interface (CLI) argument parsing module.
//!
//! This module provides CLI argument parsing using `clap`.
//! It exposes two command groups: `public-ip` and `nameserver` (with its
//! `probe` and `query` subcommands).

use crate::public_ip::{Selector, ServiceName};
use clap::{ArgGroup, Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI argument parser using clap derive macro.
///
/// # Example
///
/// ```ignore
/// let cli = Cli::parse();
/// match cli.command {
///     Commands::PublicIp(args) => { /* ... */ }
///     Commands::Nameserver { command } => { /* ... */ }
/// }
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "netter",
    version,
    about = "A network toolkit.",
    long_about = "Query the public IP address, list local nameservers, and probe nameservers for reachability and resolution",
    infer_subcommands = true
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Settings file (JSON)
    #[arg(long, global = true, env = "NETTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default, human-readable)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// TSV format (tab-separated)
    Tsv,
}

impl OutputFormat {
    /// Get all available output format names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["table", "json", "csv", "tsv"]
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            _ => Err(format!(
                "Unknown format: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
        }
    }
}

/// Available commands for the netter CLI.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Query public ip address
    #[command(name = "public-ip")]
    PublicIp(PublicIpArgs),

    /// View and probe nameservers, query domain name
    ///
    /// Without a subcommand, lists the nameservers configured on this host.
    #[command(alias = "ns")]
    Nameserver {
        #[command(subcommand)]
        command: Option<NameserverCommand>,
    },
}

/// Source selection for `public-ip`. At most one flag may be given.
#[derive(Debug, Clone, Default, Args)]
#[command(group(ArgGroup::new("source").multiple(false)))]
pub struct PublicIpArgs {
    /// Query from all sites
    #[arg(long, group = "source")]
    pub all: bool,

    /// Query from ident.me
    #[arg(long, group = "source")]
    pub ident: bool,

    /// Query from ipify.org
    #[arg(long, group = "source")]
    pub ipify: bool,

    /// Query from ipinfo.io
    #[arg(long, group = "source")]
    pub ipinfo: bool,

    /// Query from cloudflare.com
    #[arg(long, group = "source")]
    pub cloudflare: bool,

    /// Show which sites reported each address
    #[arg(long = "sites")]
    pub show_sites: bool,
}

impl PublicIpArgs {
    /// Service selection; a random single site when no flag is given.
    #[must_use]
    pub fn selector(&self) -> Selector {
        if self.all {
            Selector::all()
        } else if self.ident {
            Selector::only(ServiceName::Ident)
        } else if self.ipify {
            Selector::only(ServiceName::Ipify)
        } else if self.ipinfo {
            Selector::only(ServiceName::Ipinfo)
        } else if self.cloudflare {
            Selector::only(ServiceName::Cloudflare)
        } else {
            Selector::Random
        }
    }
}

/// Domain and nameserver arguments shared by `probe` and `query`.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Domain name (default: from settings, example.com)
    #[arg(long, value_name = "NAME")]
    pub domain: Option<String>,

    /// Nameservers to probe (default: local nameservers)
    #[arg(value_name = "NS")]
    pub nameservers: Vec<String>,
}

/// `nameserver` subcommands.
#[derive(Debug, Subcommand)]
pub enum NameserverCommand {
    /// Ping and resolve
    ///
    /// Measure ping latency and resolution time of each nameserver.
    #[command(alias = "p")]
    Probe {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Query domain name
    ///
    /// Resolve the domain against each nameserver separately.
    #[command(alias = "q")]
    Query {
        #[command(flatten)]
        target: TargetArgs,

        /// Also query AAAA records
        #[arg(short = '6', long = "ipv6")]
        ipv6: bool,

        /// Ping every resolved address
        #[arg(long)]
        ping: bool,
    },
}

/// Parse CLI arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("csv".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("tsv".parse::<OutputFormat>(), Ok(OutputFormat::Tsv));
        assert!("invalid".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_public_ip_default_random() {
        let cli = Cli::try_parse_from(["netter", "public-ip"]).unwrap();
        let Commands::PublicIp(args) = cli.command else {
            panic!("expected public-ip");
        };
        assert_eq!(args.selector(), Selector::Random);
    }

    #[test]
    fn test_public_ip_sources() {
        let cli = Cli::try_parse_from(["netter", "public-ip", "--all", "--sites"]).unwrap();
        let Commands::PublicIp(args) = cli.command else {
            panic!("expected public-ip");
        };
        assert_eq!(args.selector(), Selector::all());
        assert!(args.show_sites);

        let cli = Cli::try_parse_from(["netter", "public-ip", "--cloudflare"]).unwrap();
        let Commands::PublicIp(args) = cli.command else {
            panic!("expected public-ip");
        };
        assert_eq!(args.selector(), Selector::only(ServiceName::Cloudflare));
    }

    #[test]
    fn test_public_ip_sources_exclusive() {
        assert!(Cli::try_parse_from(["netter", "public-ip", "--ident", "--ipify"]).is_err());
    }

    #[test]
    fn test_nameserver_list() {
        let cli = Cli::try_parse_from(["netter", "nameserver"]).unwrap();
        assert!(matches!(cli.command, Commands::Nameserver { command: None }));
    }

    #[test]
    fn test_nameserver_query() {
        let cli = Cli::try_parse_from([
            "netter", "nameserver", "query", "-6", "--ping", "--domain", "rust-lang.org", "8.8.8.8",
            "1.1.1.1",
        ])
        .unwrap();
        let Commands::Nameserver {
            command: Some(NameserverCommand::Query { target, ipv6, ping }),
        } = cli.command
        else {
            panic!("expected nameserver query");
        };
        assert!(ipv6);
        assert!(ping);
        assert_eq!(target.domain.as_deref(), Some("rust-lang.org"));
        assert_eq!(target.nameservers, vec!["8.8.8.8", "1.1.1.1"]);
    }

    #[test]
    fn test_nameserver_probe_without_targets() {
        let cli = Cli::try_parse_from(["netter", "ns", "probe"]).unwrap();
        let Commands::Nameserver {
            command: Some(NameserverCommand::Probe { target }),
        } = cli.command
        else {
            panic!("expected nameserver probe");
        };
        assert!(target.domain.is_none());
        assert!(target.nameservers.is_empty());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["netter", "--format", "json", "-q", "public-ip"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet);
        assert!(Cli::try_parse_from(["netter", "-q", "-v", "public-ip"]).is_err());
    }
}
