//! AWS Lambda handler for running a single simulation
//!
//! Accepts a JSON parameter set and returns the amortization schedule, the
//! yearly projection, the exit analysis and the headline summary.

use chrono::{NaiveDate, Utc};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use scpi_simulator::{
    amortization::AmortizationRow,
    projection::{ExitPoint, InvestmentSummary, YearRow},
    scenario::ScenarioRunner,
    InvestmentParameters,
};
use serde::{Deserialize, Serialize};

/// Input payload
#[derive(Debug, Deserialize)]
pub struct SimulationRequest {
    /// Parameter set (simulator defaults when omitted)
    #[serde(default)]
    pub params: Option<InvestmentParameters>,

    /// Whether to return the month-by-month schedule (default: true)
    #[serde(default = "default_include_schedule")]
    pub include_schedule: bool,
}

fn default_include_schedule() -> bool {
    true
}

#[derive(Debug, Serialize, Default)]
pub struct SimulationResponse {
    generated_on: Option<NaiveDate>,
    breakeven_year: Option<u32>,
    summary: Option<InvestmentSummary>,
    yearly_remaining_principal: Vec<f64>,
    schedule: Vec<AmortizationRow>,
    projection: Vec<YearRow>,
    exit_points: Vec<ExitPoint>,
    execution_time_ms: u64,
    error: Option<String>,
}

async fn handler(event: LambdaEvent<SimulationRequest>) -> Result<SimulationResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;
    let params = request.params.unwrap_or_default();

    log::info!(
        "Simulating {:.0} EUR over {} months",
        params.loan.investment_amount,
        params.loan.term_months
    );

    let simulation = match ScenarioRunner::new().run(&params) {
        Ok(simulation) => simulation,
        Err(e) => {
            log::warn!("Rejected simulation request: {e}");
            return Ok(SimulationResponse {
                error: Some(e.to_string()),
                ..Default::default()
            });
        }
    };

    let summary = simulation.summary();
    let schedule = if request.include_schedule {
        simulation.schedule.rows
    } else {
        Vec::new()
    };

    Ok(SimulationResponse {
        generated_on: Some(Utc::now().date_naive()),
        breakeven_year: simulation.projection.breakeven_year,
        summary: Some(summary),
        yearly_remaining_principal: simulation.schedule.yearly_remaining_principal,
        schedule,
        projection: simulation.projection.years,
        exit_points: simulation.projection.exit_points,
        execution_time_ms: start.elapsed().as_millis() as u64,
        error: None,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
