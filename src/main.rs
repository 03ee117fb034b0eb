//! SCPI Simulator CLI
//!
//! Command-line interface for running leveraged SCPI investment simulations

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use scpi_simulator::{
    export,
    params::{load_parameters_json, load_scenarios},
    scenario::ScenarioRunner,
    DeferralModality, InvestmentParameters, Simulation,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scpi-simulator", version, about = "Leveraged SCPI investment simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate one parameter set and print the yearly projection
    Simulate {
        #[command(flatten)]
        inputs: ParamArgs,

        /// Number of projection years to print
        #[arg(long, default_value_t = 50)]
        years: u32,

        /// Write the schedule, projection and exit tables as CSV here
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Print the full simulation as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Simulate every scenario of a CSV file
    Batch {
        /// Scenario CSV (one parameter set per row)
        path: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Break-even and yields across interest rates
    Sweep {
        #[command(flatten)]
        inputs: ParamArgs,

        /// Annual interest rates in percent
        #[arg(long, value_delimiter = ',', default_values_t = [3.0, 3.5, 4.0, 4.5, 5.0, 5.5, 6.0])]
        rates: Vec<f64>,
    },
}

/// Parameter overrides, rates in percent as in the simulator form
#[derive(Args)]
struct ParamArgs {
    /// JSON parameter file used as the base (defaults otherwise)
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(long)]
    investment: Option<f64>,
    #[arg(long)]
    down_payment: Option<f64>,
    #[arg(long)]
    term_months: Option<u32>,
    #[arg(long)]
    rate_pct: Option<f64>,
    #[arg(long)]
    insurance_pct: Option<f64>,
    /// none | partial | total
    #[arg(long)]
    deferral: Option<DeferralModality>,
    #[arg(long)]
    deferral_months: Option<u32>,
    #[arg(long)]
    fee: Option<f64>,
    /// Fees folded into the loan
    #[arg(long)]
    fee_financed: Option<bool>,
    #[arg(long)]
    yield_pct: Option<f64>,
    #[arg(long)]
    entry_delay_months: Option<u32>,
    #[arg(long)]
    revaluation_pct: Option<f64>,
    #[arg(long)]
    subscription_fee_pct: Option<f64>,
    /// Marginal tax bracket (0, 11, 30, 41, 45)
    #[arg(long)]
    tmi_pct: Option<f64>,
    /// Foreign allocation in percent; enables foreign investment when > 0
    #[arg(long)]
    foreign_pct: Option<f64>,
}

impl ParamArgs {
    fn resolve(&self) -> Result<InvestmentParameters> {
        let mut params = match &self.params {
            Some(path) => load_parameters_json(path)
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("reading parameters from {}", path.display()))?,
            None => InvestmentParameters::default(),
        };

        let loan = &mut params.loan;
        if let Some(v) = self.investment { loan.investment_amount = v; }
        if let Some(v) = self.down_payment { loan.down_payment = v; }
        if let Some(v) = self.term_months { loan.term_months = v; }
        if let Some(v) = self.rate_pct { loan.annual_rate = v / 100.0; }
        if let Some(v) = self.insurance_pct { loan.insurance_rate = v / 100.0; }
        if let Some(v) = self.deferral { loan.deferral = v; }
        if let Some(v) = self.deferral_months { loan.deferral_months = v; }
        if let Some(v) = self.fee { loan.fee_amount = v; }
        if let Some(v) = self.fee_financed { loan.fee_financed = v; }

        if let Some(v) = self.yield_pct { params.rental_yield = v / 100.0; }
        if let Some(v) = self.entry_delay_months { params.entry_delay_months = v; }
        if let Some(v) = self.revaluation_pct { params.revaluation_rate = v / 100.0; }
        if let Some(v) = self.subscription_fee_pct { params.subscription_fee_rate = v / 100.0; }
        if let Some(v) = self.tmi_pct { params.marginal_tax_rate = v / 100.0; }
        if let Some(v) = self.foreign_pct {
            params.foreign_investment = v > 0.0;
            params.foreign_allocation_pct = v;
        }

        params.validate().context("invalid simulation parameters")?;
        Ok(params)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let runner = ScenarioRunner::new();

    match cli.command {
        Command::Simulate { inputs, years, export_dir, json } => {
            let params = inputs.resolve()?;
            let simulation = runner.run(&params).context("simulation failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&simulation)?);
            } else {
                print_simulation(&simulation, years);
            }

            if let Some(dir) = export_dir {
                let written = export::export_to_dir(&dir, &simulation.schedule, &simulation.projection)
                    .map_err(|e| anyhow::anyhow!("{e}"))
                    .with_context(|| format!("exporting to {}", dir.display()))?;
                for path in written {
                    println!("Written: {}", path.display());
                }
            }
        }
        Command::Batch { path, json } => {
            let scenarios = load_scenarios(&path)
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("loading scenarios from {}", path.display()))?;

            let outcomes = runner.run_batch(&scenarios);

            if json {
                let rows: Vec<_> = outcomes
                    .iter()
                    .map(|o| match &o.result {
                        Ok(sim) => serde_json::json!({ "name": o.name, "summary": sim.summary() }),
                        Err(e) => serde_json::json!({ "name": o.name, "error": e.to_string() }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:<20} {:>10} {:>12} {:>10} {:>10}",
                    "Scenario", "Break-even", "Effort/mo", "Gross %", "Net %");
                println!("{}", "-".repeat(66));
                for outcome in &outcomes {
                    match &outcome.result {
                        Ok(sim) => {
                            let s = sim.summary();
                            println!("{:<20} {:>10} {:>12} {:>10} {:>10}",
                                outcome.name,
                                fmt_year(s.breakeven_year),
                                fmt_opt(s.average_monthly_effort, 0),
                                fmt_opt(s.gross_yield_pct, 2),
                                fmt_opt(s.net_yield_pct, 2),
                            );
                        }
                        Err(e) => println!("{:<20} error: {}", outcome.name, e),
                    }
                }
            }
        }
        Command::Sweep { inputs, rates } => {
            let base = inputs.resolve()?;
            let rates: Vec<f64> = rates.iter().map(|r| r / 100.0).collect();
            let points = runner.rate_sensitivity(&base, &rates).context("rate sweep failed")?;

            println!("{:>8} {:>12} {:>10} {:>10} {:>10}",
                "Rate %", "Installment", "Break-even", "Gross %", "Net %");
            println!("{}", "-".repeat(54));
            for p in &points {
                println!("{:>8.2} {:>12.2} {:>10} {:>10} {:>10}",
                    p.annual_rate * 100.0,
                    p.monthly_installment,
                    fmt_year(p.breakeven_year),
                    fmt_opt(p.gross_yield_pct, 2),
                    fmt_opt(p.net_yield_pct, 2),
                );
            }
        }
    }

    Ok(())
}

fn print_simulation(simulation: &Simulation, years: u32) {
    let params = &simulation.params;
    let loan = &params.loan;
    let schedule = simulation.schedule.summary();

    println!("SCPI Simulator v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");

    println!("Investment: {:.0} EUR (down payment {:.0})", loan.investment_amount, loan.down_payment);
    println!("  Financed: {:.2} over {} months at {:.2}%", schedule.financed_principal, loan.term_months, loan.annual_rate * 100.0);
    println!("  Deferral: {} ({} months)", loan.deferral, loan.effective_deferral_months());
    println!("  Total interest: {:.2}, insurance: {:.2}", schedule.total_interest, schedule.total_insurance);
    println!();

    println!("{:>5} {:>10} {:>10} {:>11} {:>10} {:>10} {:>11} {:>12}",
        "Year", "Gross rent", "Effort", "Deductible", "Tax", "Carried", "Net effort", "Resale");
    println!("{}", "-".repeat(86));

    for row in simulation.projection.years.iter().take(years as usize) {
        println!("{:>5} {:>10.0} {:>10.0} {:>11.0} {:>10.0} {:>10.0} {:>11.0} {:>12.0}",
            row.year,
            row.gross_rent,
            row.annual_effort,
            row.deductible_amount,
            row.total_tax,
            row.carried_deductible,
            row.net_annual_effort,
            row.resale_value,
        );
    }

    let summary = simulation.summary();
    println!("\nSummary:");
    println!("  Monthly rent after loan: {:.0} EUR", summary.monthly_rent_after_loan);
    println!("  Average monthly effort: {} EUR (down payment excluded)", fmt_opt(summary.average_monthly_effort, 0));
    println!("  Gross yield: {}%", fmt_opt(summary.gross_yield_pct, 2));
    println!("  Net yield: {}%", fmt_opt(summary.net_yield_pct, 2));
    match summary.breakeven_year {
        Some(year) => println!(
            "  Exit without loss: year {} (IRR {}%)",
            year,
            fmt_opt(summary.breakeven_irr.map(|r| r * 100.0), 2)
        ),
        None => println!("  Exit without loss: not reached within the horizon"),
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_year(year: Option<u32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
}
