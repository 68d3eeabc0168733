use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use metbrief::{ReportFetcher, metar, report, taf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fetch METAR/TAF for an airport and print a localized briefing
#[derive(Parser, Debug)]
#[command(name = "metbrief", version, about)]
struct Args {
    /// ICAO code of the airport, e.g. EPLB
    #[arg(long)]
    airport: String,

    /// IANA timezone for localized times, e.g. Europe/Warsaw
    #[arg(long, default_value = "UTC")]
    timezone: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let tz: Tz = args
        .timezone
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown timezone: {}", args.timezone))?;

    let fetcher = ReportFetcher::new()?;
    let (metar_raw, taf_raw) = fetcher
        .fetch(&args.airport)
        .with_context(|| format!("failed to retrieve reports for {}", args.airport))?;
    info!(metar = %metar_raw, "retrieved reports");

    let now = Utc::now();
    let observation = metar::decode(&metar_raw, &args.airport, now)
        .with_context(|| format!("failed to decode METAR for {}", args.airport))?;

    let issue = taf::extract_issue_time(&taf_raw, now);
    let summary = taf::summarize(&taf_raw, issue, tz, now);

    println!("{}", report::generate_report(&observation, tz, &summary));
    Ok(())
}
