//! Simulation parameters and scenario loading

mod data;
pub mod loader;

pub use data::{
    DeferralModality, InvestmentParameters, LoanParameters, MARGINAL_TAX_BRACKETS,
    MAX_ENTRY_DELAY_MONTHS, MAX_TERM_MONTHS,
};
pub use loader::{load_parameters_json, load_scenarios, load_scenarios_from_reader, Scenario};
