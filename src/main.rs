//! IRRBB Engine CLI
//!
//! Values an instrument snapshot under the six rate scenarios and prints the
//! headline metrics, or the full report as JSON with --json.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use irrbb_engine::config::DEFAULT_CONFIG_PATH;
use irrbb_engine::history::DEFAULT_HISTORY_CAPACITY;
use irrbb_engine::instrument::loader::DEFAULT_INSTRUMENTS_PATH;
use irrbb_engine::{load_instruments, RunConfig, ScenarioHistory, ScenarioKind, ScenarioRunner};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "irrbb_engine", version, about = "NII and EVE under rate scenarios")]
struct Cli {
    /// Instrument snapshot CSV
    #[arg(long, default_value = DEFAULT_INSTRUMENTS_PATH)]
    instruments: PathBuf,

    /// Run config JSON (defaults apply when the default path is absent)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Valuation date, YYYY-MM-DD (defaults to the local date). Repeat to
    /// value the snapshot as of several dates; the last one is printed.
    #[arg(long)]
    today: Vec<NaiveDate>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Number of runs kept in the history printed at the end
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history: usize,
}

fn load_config(path: &Path) -> Result<RunConfig> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
        log::info!("No config at {}, using defaults", path.display());
        return Ok(RunConfig::default());
    }
    RunConfig::from_json_path(path).with_context(|| format!("Failed to load config {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut dates = cli.today.clone();
    if dates.is_empty() {
        dates.push(chrono::Local::now().date_naive());
    }
    let config = load_config(&cli.config)?;
    let runner = ScenarioRunner::with_config(config).context("Invalid run config")?;
    let snapshot = load_instruments(&cli.instruments)
        .with_context(|| format!("Failed to load instruments from {}", cli.instruments.display()))?;

    let start = Instant::now();
    let mut history = ScenarioHistory::with_capacity(cli.history);
    let report = runner
        .run_dates(&snapshot, &dates, &mut history)
        .context("Valuation run failed")?
        .context("No valuation date given")?;
    let elapsed = start.elapsed();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("IRRBB Engine v{}", env!("CARGO_PKG_VERSION"));
    println!("==================\n");
    println!("Valuation date: {}", report.valuation_date);
    println!(
        "Instruments: {} loans, {} deposits/funding, {} derivatives ({} skipped)",
        report.metrics.loan_count,
        report.metrics.deposit_count,
        report.metrics.derivative_count,
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.id, skipped.reason);
    }

    let m = &report.metrics;
    println!("\nCurrent Metrics:");
    println!("  Base EVE:            ${:>16.2}", m.base_eve);
    println!("  Base NII:            ${:>16.2}", m.base_nii);
    println!("  Asset PV:            ${:>16.2}", m.total_asset_pv);
    println!("  Liability PV:        ${:>16.2}", m.total_liability_pv);
    println!("  EVE +200bps:          {:>+15.2}%", m.eve_sensitivity_up);
    println!("  EVE -200bps:          {:>+15.2}%", m.eve_sensitivity_down);
    println!("  NII +200bps:          {:>+15.2}%", m.nii_sensitivity_up);
    println!("  NII -200bps:          {:>+15.2}%", m.nii_sensitivity_down);

    println!("\n{:<22} {:>18} {:>16}", "Scenario", "EVE", "NII");
    println!("{}", "-".repeat(58));
    for s in &report.scenarios {
        println!("{:<22} {:>18.2} {:>16.2}", s.scenario, s.eve, s.nii);
    }

    println!("\n{:<28} {:>14} {:>14} {:>14}", "Repricing Bucket", "Assets", "Liabilities", "Gap");
    println!("{}", "-".repeat(73));
    for b in &report.repricing_gap {
        println!("{:<28} {:>14.2} {:>14.2} {:>14.2}", b.bucket, b.assets, b.liabilities, b.gap);
    }

    let up = ScenarioKind::ParallelUp.name();
    println!("\n{:<28} {:>14} {:>14} {:>14}", "NII by Bucket", "Net Position", "Base NII", "+200bps NII");
    println!("{}", "-".repeat(73));
    for p in report.repricing_net_positions.iter().filter(|p| p.scenario == up) {
        println!(
            "{:<28} {:>14.2} {:>14.2} {:>14.2}",
            p.bucket, p.net_position, p.nii_base, p.nii_shocked
        );
    }

    println!("\n{:<28} {:>14} {:>14} {:>14}", "Maturity Bucket", "Assets", "Liabilities", "Gap");
    println!("{}", "-".repeat(73));
    for b in &report.maturity_gap {
        println!("{:<28} {:>14.2} {:>14.2} {:>14.2}", b.bucket, b.assets, b.liabilities, b.gap);
    }

    println!("\nComposition:");
    for row in &report.composition {
        let rate = row
            .average_interest_rate
            .map_or_else(|| "n/a".to_string(), |r| format!("{:.4}%", r * 100.0));
        println!(
            "  {:<11} {:<10} {:>4} {:>16.2} {:>10}",
            row.instrument_type, row.category, row.volume_count, row.total_amount, rate
        );
    }

    println!("\nHistory ({} of {}):", history.len(), history.capacity());
    for snapshot in history.iter() {
        println!(
            "  {}  EVE {:.2} / {:.2} / {:.2}  NII {:.2} / {:.2} / {:.2}",
            snapshot.valuation_date,
            snapshot.base_eve,
            snapshot.up_eve,
            snapshot.down_eve,
            snapshot.base_nii,
            snapshot.up_nii,
            snapshot.down_nii
        );
    }

    println!("\nCompleted in {:?}", elapsed);
    Ok(())
}
