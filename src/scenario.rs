//! Scenario runner for a full valuation
//!
//! Holds the base curve and run configuration, then values an instrument
//! snapshot under every catalog scenario and assembles the report.

use crate::cashflow::{CashflowGenerator, ProjectionHorizon};
use crate::config::RunConfig;
use crate::curve::{standard_scenarios, Scenario, ScenarioKind, YieldCurve};
use crate::error::{EngineError, EngineResult};
use crate::history::ScenarioHistory;
use crate::gap::{analyze_gaps, repricing_exposures, BucketExposure, BucketTable};
use crate::instrument::{Instrument, InstrumentSnapshot};
use crate::report::{
    bucket_nii, composition, curve_points, ladder_rows, net_positions, nii_breakdown, side_counts, CurrentMetrics,
    EveDriver, LadderRow, NiiDriver, ScenarioResult, SkippedInstrument, ValuationReport,
};
use crate::valuation::{sensitivity_pct, value_instrument, InstrumentValuation, ScenarioTotals};
use chrono::NaiveDate;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::Path;

/// Everything computed for one scenario
#[derive(Debug, Clone)]
struct ScenarioRun {
    kind: ScenarioKind,
    name: String,
    curve: YieldCurve,
    totals: ScenarioTotals,
    /// Same order as the valued instruments
    valuations: Vec<InstrumentValuation>,
    ladder: Vec<LadderRow>,
}

/// Pre-built runner for valuation runs
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_json_path("data/config.json")?;
/// let snapshot = load_instruments("data/instruments.csv")?;
/// let report = runner.run_snapshot(&snapshot, today)?;
/// println!("Base EVE: {:.2}", report.metrics.base_eve);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_curve: YieldCurve,
    config: RunConfig,
}

impl ScenarioRunner {
    /// Runner with the built-in curve and default config
    pub fn new() -> Self {
        Self {
            base_curve: YieldCurve::base(),
            config: RunConfig::default(),
        }
    }

    /// Runner from a config, resolving its base curve override
    pub fn with_config(config: RunConfig) -> EngineResult<Self> {
        Ok(Self {
            base_curve: config.base_curve()?,
            config,
        })
    }

    /// Runner from a JSON config file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        Self::with_config(RunConfig::from_json_path(path)?)
    }

    pub fn base_curve(&self) -> &YieldCurve {
        &self.base_curve
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Value a loaded snapshot. Rows the loader rejected are listed ahead of
    /// the instruments skipped during screening.
    pub fn run_snapshot(&self, snapshot: &InstrumentSnapshot, today: NaiveDate) -> EngineResult<ValuationReport> {
        let mut report = self.run(&snapshot.instruments, today)?;
        let mut skipped = snapshot.rejected.clone();
        skipped.append(&mut report.skipped);
        report.skipped = skipped;
        Ok(report)
    }

    /// Value a snapshot as of each date in turn, recording every run in
    /// `history`. Returns the report for the last date, or None without dates.
    pub fn run_dates(
        &self,
        snapshot: &InstrumentSnapshot,
        dates: &[NaiveDate],
        history: &mut ScenarioHistory,
    ) -> EngineResult<Option<ValuationReport>> {
        let mut latest = None;
        for &today in dates {
            let report = self.run_snapshot(snapshot, today)?;
            history.record(&report);
            latest = Some(report);
        }
        Ok(latest)
    }

    /// Value the snapshot under all six scenarios and run gap analysis.
    ///
    /// Malformed assumptions, scenarios or bucket tables abort the run.
    /// Malformed instruments are skipped and listed in the report.
    pub fn run(&self, instruments: &[Instrument], today: NaiveDate) -> EngineResult<ValuationReport> {
        self.config.assumptions.validate()?;
        if self.config.nii_horizon_days <= 0 {
            return Err(EngineError::InvalidAssumption {
                name: "nii_horizon_days",
                value: self.config.nii_horizon_days as f64,
                reason: "must be positive".to_string(),
            });
        }
        let catalog = standard_scenarios();
        for (_, scenario) in &catalog {
            scenario.validate()?;
        }
        let repricing_table = BucketTable::repricing()?;
        let maturity_table = BucketTable::maturity()?;

        let (valid, skipped) = self.screen(instruments, today)?;

        info!(
            "Valuing {} instruments as of {} across {} scenarios ({} skipped)",
            valid.len(),
            today,
            catalog.len(),
            skipped.len()
        );

        let runs: Vec<ScenarioRun> = if self.config.parallel {
            catalog
                .par_iter()
                .map(|(kind, scenario)| self.run_scenario(*kind, scenario, &valid, today))
                .collect::<EngineResult<Vec<_>>>()?
        } else {
            catalog
                .iter()
                .map(|(kind, scenario)| self.run_scenario(*kind, scenario, &valid, today))
                .collect::<EngineResult<Vec<_>>>()?
        };

        let base = runs
            .iter()
            .find(|r| r.kind == ScenarioKind::Base)
            .ok_or_else(|| EngineError::InvalidScenario {
                name: ScenarioKind::Base.name().to_string(),
                reason: "missing from catalog".to_string(),
            })?;

        let eve_of = |kind: ScenarioKind| runs.iter().find(|r| r.kind == kind).map_or(0.0, |r| r.totals.eve());
        let nii_of = |kind: ScenarioKind| runs.iter().find(|r| r.kind == kind).map_or(0.0, |r| r.totals.nii());
        let (base_eve, base_nii) = (base.totals.eve(), base.totals.nii());
        let (loan_count, deposit_count, derivative_count) = side_counts(&valid);

        let metrics = CurrentMetrics {
            base_eve,
            base_nii,
            eve_sensitivity_up: sensitivity_pct(base_eve, eve_of(ScenarioKind::ParallelUp)),
            nii_sensitivity_up: sensitivity_pct(base_nii, nii_of(ScenarioKind::ParallelUp)),
            eve_sensitivity_down: sensitivity_pct(base_eve, eve_of(ScenarioKind::ParallelDown)),
            nii_sensitivity_down: sensitivity_pct(base_nii, nii_of(ScenarioKind::ParallelDown)),
            total_asset_pv: base.totals.asset_pv,
            total_liability_pv: base.totals.liability_pv.abs(),
            portfolio_value: base.totals.asset_pv,
            loan_count,
            deposit_count,
            derivative_count,
        };

        let gaps = analyze_gaps(&valid, today, &repricing_table, &maturity_table);
        let exposures: Vec<Vec<BucketExposure>> = valid
            .iter()
            .map(|i| repricing_exposures(i, today, &repricing_table))
            .collect();
        let nii_values = |run: &ScenarioRun| run.valuations.iter().map(|v| v.nii).collect::<Vec<_>>();
        let base_bucket_nii = bucket_nii(&repricing_table, &exposures, &nii_values(base));

        let mut eve_drivers = Vec::new();
        let mut nii_drivers = Vec::new();
        let mut breakdown = Vec::new();
        let mut repricing_net_positions = Vec::new();
        for run in &runs {
            let mut run_drivers = Vec::with_capacity(run.valuations.len());
            for (valuation, base_valuation) in run.valuations.iter().zip(&base.valuations) {
                eve_drivers.push(EveDriver {
                    scenario: run.name.clone(),
                    instrument_id: valuation.instrument_id.clone(),
                    instrument_type: valuation.instrument_type.clone(),
                    base_pv: base_valuation.pv,
                    shocked_pv: valuation.pv,
                    duration: valuation.duration,
                });
                run_drivers.push(NiiDriver {
                    scenario: run.name.clone(),
                    instrument_id: valuation.instrument_id.clone(),
                    instrument_type: valuation.instrument_type.clone(),
                    nii: valuation.nii,
                });
            }
            let shocked_bucket_nii = bucket_nii(&repricing_table, &exposures, &nii_values(run));
            breakdown.extend(nii_breakdown(&run.name, &run_drivers, &gaps.repricing_gap, &shocked_bucket_nii));
            repricing_net_positions.extend(net_positions(
                &run.name,
                &gaps.repricing_gap,
                &base_bucket_nii,
                &shocked_bucket_nii,
            ));
            nii_drivers.extend(run_drivers);
        }

        let composition = composition(&valid);
        let yield_curves: Vec<_> = runs.iter().flat_map(|r| curve_points(&r.name, &r.curve)).collect();

        let mut scenarios = Vec::with_capacity(runs.len());
        let mut cashflow_ladder = Vec::new();
        for run in runs {
            scenarios.push(ScenarioResult {
                kind: run.kind,
                scenario: run.name,
                eve: run.totals.eve(),
                nii: run.totals.nii(),
                totals: run.totals,
            });
            cashflow_ladder.extend(run.ladder);
        }

        info!(
            "Valuation complete: base EVE {:.2}, base NII {:.2}, EVE +200bps {:+.2}%",
            metrics.base_eve, metrics.base_nii, metrics.eve_sensitivity_up
        );

        Ok(ValuationReport {
            valuation_date: today,
            metrics,
            scenarios,
            repricing_gap: gaps.repricing_gap,
            maturity_gap: gaps.maturity_gap,
            repricing_exposures: gaps.repricing_exposures,
            eve_drivers,
            nii_drivers,
            nii_breakdown: breakdown,
            repricing_net_positions,
            cashflow_ladder,
            yield_curves,
            composition,
            skipped,
        })
    }

    /// Split the snapshot into instruments that can be valued and those that
    /// cannot, checking each record and a trial generation on the base curve.
    /// Errors not tied to a single instrument are returned.
    fn screen(
        &self,
        instruments: &[Instrument],
        today: NaiveDate,
    ) -> EngineResult<(Vec<Instrument>, Vec<SkippedInstrument>)> {
        let generator = CashflowGenerator::new(today, &self.base_curve, &self.base_curve, &self.config.assumptions);
        let mut valid = Vec::with_capacity(instruments.len());
        let mut skipped = Vec::new();

        for instrument in instruments {
            let checked = instrument
                .validate()
                .and_then(|_| generator.generate(instrument, ProjectionHorizon::full_life()).map(|_| ()));
            match checked {
                Ok(()) => valid.push(instrument.clone()),
                Err(e) if !e.is_instrument_error() => return Err(e),
                Err(e) => {
                    warn!("Skipping instrument {}: {}", instrument.id(), e);
                    skipped.push(SkippedInstrument {
                        id: instrument.id().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok((valid, skipped))
    }

    fn run_scenario(
        &self,
        kind: ScenarioKind,
        scenario: &Scenario,
        instruments: &[Instrument],
        today: NaiveDate,
    ) -> EngineResult<ScenarioRun> {
        let curve = self.base_curve.shock(scenario);
        let generator = CashflowGenerator::new(today, &curve, &self.base_curve, &self.config.assumptions);

        let mut totals = ScenarioTotals::default();
        let mut valuations = Vec::with_capacity(instruments.len());
        let mut ladder = Vec::new();

        for instrument in instruments {
            let (valuation, schedules) =
                value_instrument(&generator, instrument, &curve, today, self.config.nii_horizon_days)?;
            totals.add(&valuation);
            if self.config.detailed_output {
                ladder.extend(ladder_rows(&scenario.name, instrument, &schedules, &curve, today));
            }
            valuations.push(valuation);
        }

        debug!("{}: EVE {:.2}, NII {:.2}", scenario.name, totals.eve(), totals.nii());

        Ok(ScenarioRun {
            kind,
            name: scenario.name.clone(),
            curve,
            totals,
            valuations,
            ladder,
        })
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
