//! `pips roll`: headless rolls through the same controller the TUI uses.
//!
//! Rolls complete at their deadline without waiting in real time; the
//! printed history is newest-first and capped like the interactive one.

use crate::cmd::face::write_boxed_grid;
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};
use clap::Args;
use pips_core::config::RollConfig;
use pips_core::model::face::render_grid;
use pips_core::roller::FaceSource;
use pips_core::{Face, HistoryLedger, RollController, RollId, StatsSnapshot, Tier};
use serde::Serialize;
use std::io::Write;
use std::time::Instant;
use tracing::debug;

/// Arguments for `pips roll`.
#[derive(Args, Debug)]
pub struct RollArgs {
    /// Number of rolls to perform.
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10_000))]
    pub count: u32,

    /// Seed the random number generator for a reproducible sequence.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct RollRow {
    pub ordinal: usize,
    pub id: RollId,
    pub value: Face,
    pub tier: Tier,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct RollReport {
    pub current: Face,
    pub rolled: u32,
    pub history: Vec<RollRow>,
    pub stats: Option<StatsSnapshot>,
}

impl RollReport {
    pub fn from_history(current: Face, rolled: u32, history: &HistoryLedger) -> Self {
        let rows = history
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                Some(RollRow {
                    ordinal: history.ordinal(index)?,
                    id: record.id,
                    value: record.value,
                    tier: record.value.tier(),
                    time: record.time_of_day(),
                })
            })
            .collect();
        Self {
            current,
            rolled,
            history: rows,
            stats: StatsSnapshot::from_ledger(history),
        }
    }
}

/// Perform `count` rolls on `controller` and collect the report.
pub fn roll_report<S: FaceSource>(controller: &mut RollController<S>, count: u32) -> RollReport {
    let mut rolled = 0;
    for _ in 0..count {
        if controller.roll_now(Instant::now()).is_some() {
            rolled += 1;
        }
    }
    debug!(rolled, "headless rolls complete");
    RollReport::from_history(controller.current(), rolled, controller.history())
}

pub fn run_roll(args: &RollArgs, config: &RollConfig, output: OutputMode) -> anyhow::Result<()> {
    let seed = args.seed.or(config.seed);
    let mut controller = RollController::seeded(seed, config.delay());
    let report = roll_report(&mut controller, args.count);

    render_mode(
        output,
        &report,
        |report, w| render_roll_text(report, w),
        |report, w| render_roll_human(report, w),
    )
}

fn render_roll_text(report: &RollReport, w: &mut dyn Write) -> std::io::Result<()> {
    for row in &report.history {
        writeln!(w, "#{}\t{}\t{}", row.ordinal, row.value, row.time)?;
    }
    if let Some(stats) = &report.stats {
        writeln!(
            w,
            "count={} average={} highest={} lowest={}",
            stats.count, stats.average, stats.max, stats.min
        )?;
    }
    Ok(())
}

fn render_roll_human(report: &RollReport, w: &mut dyn Write) -> std::io::Result<()> {
    write_boxed_grid(w, &render_grid(report.current.get()))?;
    writeln!(w, "You rolled: {}", report.current)?;
    writeln!(w)?;

    if let Some(stats) = &report.stats {
        pretty_section(w, "Statistics")?;
        pretty_kv(w, "Total Rolls", stats.count.to_string())?;
        pretty_kv(w, "Average", stats.average.to_string())?;
        pretty_kv(w, "Highest", stats.max.to_string())?;
        pretty_kv(w, "Lowest", stats.min.to_string())?;
        writeln!(w)?;
    }

    pretty_section(w, "Roll History")?;
    if report.history.is_empty() {
        writeln!(w, "No rolls yet. Roll the dice to start!")?;
    }
    for row in &report.history {
        writeln!(w, "[{}]  Roll #{:<3} {:>12}", row.value, row.ordinal, row.time)?;
    }
    pretty_rule(w)
}
