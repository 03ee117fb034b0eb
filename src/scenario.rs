//! Scenario runner: full simulations for one or many parameter sets
//!
//! Each simulation runs the amortization and the projection from scratch;
//! independent parameter sets are evaluated in parallel.

use crate::amortization::{compute_amortization, AmortizationSchedule};
use crate::error::Result;
use crate::params::{DeferralModality, InvestmentParameters, Scenario};
use crate::projection::{InvestmentSummary, ProjectionConfig, ProjectionEngine, ProjectionResult};
use rayon::prelude::*;
use serde::Serialize;

/// Schedule and projection for one parameter set
#[derive(Debug, Clone, Serialize)]
pub struct Simulation {
    pub params: InvestmentParameters,
    pub schedule: AmortizationSchedule,
    pub projection: ProjectionResult,
}

impl Simulation {
    pub fn summary(&self) -> InvestmentSummary {
        self.projection.summary(&self.params)
    }
}

/// Outcome of one named scenario in a batch
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: Result<Simulation>,
}

/// Break-even and yields at one interest rate
#[derive(Debug, Clone, Serialize)]
pub struct SensitivityPoint {
    pub annual_rate: f64,
    pub monthly_installment: f64,
    pub breakeven_year: Option<u32>,
    pub gross_yield_pct: Option<f64>,
    pub net_yield_pct: Option<f64>,
}

/// Run a simulation over the default horizon
pub fn simulate(params: &InvestmentParameters) -> Result<Simulation> {
    ScenarioRunner::new().run(params)
}

/// Runner holding the projection configuration shared by every scenario
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
        }
    }

    /// Run a single simulation
    pub fn run(&self, params: &InvestmentParameters) -> Result<Simulation> {
        warn_on_unusual_inputs(params);

        let schedule = compute_amortization(&params.loan)?;
        let projection = self.engine.project(params, &schedule)?;

        log::debug!(
            "Simulated {} months / {} years, break-even {:?}",
            schedule.len(),
            projection.years.len(),
            projection.breakeven_year
        );

        Ok(Simulation {
            params: params.clone(),
            schedule,
            projection,
        })
    }

    /// Run named scenarios in parallel; failures stay per scenario
    pub fn run_batch(&self, scenarios: &[Scenario]) -> Vec<ScenarioOutcome> {
        log::info!("Running {} scenarios", scenarios.len());

        let outcomes: Vec<ScenarioOutcome> = scenarios
            .par_iter()
            .map(|scenario| ScenarioOutcome {
                name: scenario.name.clone(),
                result: self.run(&scenario.params),
            })
            .collect();

        for outcome in &outcomes {
            if let Err(e) = &outcome.result {
                log::warn!("Scenario `{}` failed: {}", outcome.name, e);
            }
        }

        outcomes
    }

    /// Re-run `base` at each interest rate
    pub fn rate_sensitivity(
        &self,
        base: &InvestmentParameters,
        rates: &[f64],
    ) -> Result<Vec<SensitivityPoint>> {
        rates
            .par_iter()
            .map(|&annual_rate| -> Result<SensitivityPoint> {
                let mut params = base.clone();
                params.loan.annual_rate = annual_rate;
                let simulation = self.run(&params)?;
                let summary = simulation.summary();

                let monthly_installment = simulation
                    .schedule
                    .rows
                    .last()
                    .map(|r| r.installment_incl_insurance)
                    .unwrap_or(0.0);

                Ok(SensitivityPoint {
                    annual_rate,
                    monthly_installment,
                    breakeven_year: summary.breakeven_year,
                    gross_yield_pct: summary.gross_yield_pct,
                    net_yield_pct: summary.net_yield_pct,
                })
            })
            .collect()
    }
}

fn warn_on_unusual_inputs(params: &InvestmentParameters) {
    if !params.is_standard_bracket() {
        log::warn!(
            "Marginal tax rate {:.2}% is not a French bracket",
            params.marginal_tax_rate * 100.0
        );
    }
    if params.loan.deferral == DeferralModality::None && params.loan.deferral_months > 0 {
        log::warn!(
            "Deferral of {} months ignored: no deferral modality selected",
            params.loan.deferral_months
        );
    }
}
