use clap::Parser;
use colored::*;

use playback_telemetry::backend::{JsonLinesBackend, SamplingBackend};
use playback_telemetry::cli::Args;
use playback_telemetry::config::InstrumentConfig;
use playback_telemetry::hub::HubCoreAds;
use playback_telemetry::metricalc::MetricalcCore;
use playback_telemetry::replay::{ReplayReport, Scenario};
use playback_telemetry::{logging, Instrument};

fn print_summary(report: &ReplayReport, instrument_id: &str) {
    eprintln!();
    eprintln!("{}", "PLAYBACK REPLAY".bright_cyan().bold());
    eprintln!("  {} {}", "instrument:".bright_blue(), instrument_id);
    eprintln!("  {} {}", "steps:     ".bright_blue(), report.steps);
    eprintln!("  {} {}", "delivered: ".bright_blue(), report.delivered.to_string().green());
    eprintln!("  {} {}", "rejected:  ".bright_blue(), report.rejected.to_string().yellow());
    eprintln!("  {} {}", "vetoed:    ".bright_blue(), report.vetoed.to_string().yellow());
    if report.dropped > 0 {
        eprintln!("  {} {}", "dropped:   ".bright_blue(), report.dropped.to_string().red());
    }
    eprintln!("  {} {}", "pings:     ".bright_blue(), report.pings);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => InstrumentConfig::from_file(path)?,
        None => InstrumentConfig::default(),
    };
    logging::init(args.log_level.unwrap_or(config.log_level));

    let scenario = Scenario::from_file(&args.scenario)?;

    let mut instrument = Instrument::new(&config)
        .with_hub(HubCoreAds::from_config(&config))
        .with_metricalc(MetricalcCore::new());
    if args.sample {
        instrument.set_backend(SamplingBackend::from_config(JsonLinesBackend::stdout(), &config.reservoir));
    } else {
        instrument.set_backend(JsonLinesBackend::stdout());
    }

    let report = scenario.run(&mut instrument, args.speed).await?;
    instrument.shutdown();

    if !args.quiet {
        print_summary(&report, instrument.instrument_id());
    }
    Ok(())
}
