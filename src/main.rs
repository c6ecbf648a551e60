//! cdr2udr - Synthesize call detail records and report subscriber usage

use cdr2udr::{
    aggregation::{Totals, UsageAggregator},
    cdr_report::CdrReporter,
    cli::{Cli, Command, parse_local_datetime, resolve_month},
    error::Result,
    generator::{CallRecordGenerator, StdRandom, seed_history},
    output::{get_formatter, write_call_records},
    store::{InMemoryRecordStore, InMemorySubscriberDirectory, RecordStore},
    timezone::TimezoneConfig,
    types::Msisdn,
};
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --verbose overrides RUST_LOG
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("cdr2udr=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cdr2udr=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let tz_config = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    info!("Using timezone: {}", tz_config.display_name());

    // Seed a fresh history before serving any report
    let records = Arc::new(InMemoryRecordStore::new());
    let subscribers = Arc::new(InMemorySubscriberDirectory::new());
    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let mut generator = CallRecordGenerator::new(
        cli.generator.config(),
        StdRandom::from_seed(cli.generator.seed),
    )
    .with_progress(show_progress);

    let written = seed_history(
        subscribers.as_ref(),
        records.as_ref(),
        &cli.generator.pool(),
        &mut generator,
        Utc::now(),
    )?;
    info!("Seeded {} call records", written);

    match cli.command {
        Command::Udr {
            msisdn,
            period,
            month,
        } => {
            info!("Running usage report for {}", msisdn);

            let month = resolve_month(period, month)?;
            let aggregator = UsageAggregator::new(records, subscribers, tz_config);
            let summary = aggregator.summarize(&Msisdn::new(msisdn), month)?;

            let formatter = get_formatter(cli.json);
            println!("{}", formatter.format_summary(&summary)?);
        }
        Command::UdrAll { month } => {
            info!("Running usage report for all subscribers");

            let aggregator = UsageAggregator::new(records, subscribers, tz_config);
            let summaries = aggregator.summarize_all(month)?;
            let totals = Totals::from_summaries(&summaries);

            let formatter = get_formatter(cli.json);
            println!("{}", formatter.format_summaries(&summaries, &totals)?);
        }
        Command::Cdr {
            msisdn,
            since,
            until,
            reports_dir,
        } => {
            info!("Running call detail report for {}", msisdn);

            let since = parse_local_datetime(&since, &tz_config)?;
            let until = parse_local_datetime(&until, &tz_config)?;
            let reporter = CdrReporter::new(records, subscribers, reports_dir, tz_config);
            let report = reporter
                .write_report(&Msisdn::new(msisdn), since, until)
                .await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.report_id);
            }
        }
        Command::Generate => {
            let history = records.all()?;
            write_call_records(std::io::stdout().lock(), &history, &tz_config)?;
        }
    }

    Ok(())
}
