//! netter - network diagnostics
//!
//! Binary entry point for the netter CLI application.

#![warn(clippy::all, warnings)]
#![warn(clippy::pedantic, clippy::nursery)]

use netter::cli::{Commands, NameserverCommand, OutputFormat, PublicIpArgs, TargetArgs};
use netter::config::{ConfigLoader, Settings};
use netter::dns::{IsolatedResolverFactory, ProbeAggregator};
use netter::error::Result;
use netter::ping::{self, IcmpPinger, NoPinger, Reachability};
use netter::platform::Platform;
use netter::public_ip::PublicIpProber;
use netter::{report, system};
use std::net::IpAddr;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up logging based on verbosity level.
///
/// Logs go to stderr so reports on stdout stay machine-readable.
fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

/// Nameservers given on the command line, or the local ones.
fn target_nameservers(args: &[String], platform: &Platform) -> Result<Vec<IpAddr>> {
    if args.is_empty() {
        system::local_nameservers(platform)
    } else {
        ConfigLoader::nameservers_from_args(args)
    }
}

fn aggregator(settings: &Settings, pinger: Arc<dyn Reachability>) -> ProbeAggregator {
    ProbeAggregator::from_settings(Arc::new(IsolatedResolverFactory), pinger, settings)
}

async fn run_public_ip(
    args: &PublicIpArgs,
    settings: &Settings,
    format: OutputFormat,
) -> Result<()> {
    let prober = PublicIpProber::from_settings(settings)?;
    let report = prober.query(&args.selector()).await;
    if report.is_empty() {
        tracing::warn!("no public IP service answered");
    }

    match format {
        OutputFormat::Json => println!("{}", report::to_json(&report)?),
        _ => println!("{}", report::public_ip_text(&report, args.show_sites)),
    }
    Ok(())
}

fn run_list_nameservers(platform: &Platform, format: OutputFormat) -> Result<()> {
    if platform.is_windows() {
        let adapters = system::adapter_nameservers(platform)?;
        match format {
            OutputFormat::Json => println!("{}", report::to_json(&adapters)?),
            _ => print!("{}", report::adapter_list(&adapters)),
        }
        return Ok(());
    }

    let nameservers = system::local_nameservers(platform)?;
    match format {
        OutputFormat::Json => println!("{}", report::to_json(&nameservers)?),
        _ => print!("{}", report::nameserver_list(&nameservers)),
    }
    Ok(())
}

async fn run_probe(
    target: &TargetArgs,
    settings: &Settings,
    platform: &Platform,
    format: OutputFormat,
) -> Result<()> {
    let nameservers = target_nameservers(&target.nameservers, platform)?;
    let domain = target.domain.as_deref().unwrap_or(&settings.domain);

    let results = aggregator(settings, ping::or_disabled(IcmpPinger::new()))
        .probe_and_ping(domain, &nameservers)
        .await?;

    match format {
        OutputFormat::Json => println!("{}", report::to_json(&results)?),
        _ => print!("{}", report::probe_table(domain, &results).render(format)),
    }
    Ok(())
}

async fn run_query(
    target: &TargetArgs,
    include_ipv6: bool,
    ping: bool,
    settings: &Settings,
    platform: &Platform,
    format: OutputFormat,
) -> Result<()> {
    let nameservers = target_nameservers(&target.nameservers, platform)?;
    let domain = target.domain.as_deref().unwrap_or(&settings.domain);

    // Only open ICMP sockets when reachability is asked for.
    let pinger: Arc<dyn Reachability> = if ping {
        ping::or_disabled(IcmpPinger::new())
    } else {
        Arc::new(NoPinger)
    };
    let aggregator = aggregator(settings, pinger);

    let rows = aggregator.probe_domain(domain, &nameservers, include_ipv6).await?;
    let reachability = if ping {
        let groups = ProbeAggregator::build_address_groups(&rows);
        Some(aggregator.probe_reachability(&groups).await)
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "domain": domain,
                "results": rows,
                "ping": reachability,
            });
            println!("{}", report::to_json(&value)?);
        }
        _ => {
            print!("{}", report::query_table(domain, &rows).render(format));
            if let Some(reachability) = reachability {
                println!();
                print!("{}", report::ping_table(domain, &reachability).render(format));
            }
        }
    }
    Ok(())
}

/// Main entry point for the netter CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = netter::cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let platform = Platform::detect();
    let settings = ConfigLoader::load(cli.config.as_deref())?;
    tracing::info!("netter starting on {platform}");
    tracing::debug!("settings: {settings:?}");

    match cli.command {
        Commands::PublicIp(args) => run_public_ip(&args, &settings, cli.format).await?,

        Commands::Nameserver { command: None } => run_list_nameservers(&platform, cli.format)?,

        Commands::Nameserver {
            command: Some(NameserverCommand::Probe { target }),
        } => run_probe(&target, &settings, &platform, cli.format).await?,

        Commands::Nameserver {
            command: Some(NameserverCommand::Query { target, ipv6, ping }),
        } => run_query(&target, ipv6, ping, &settings, &platform, cli.format).await?,
    }

    Ok(())
}
