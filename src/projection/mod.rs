//! Yearly investment projection: rent, financing effort, taxation, resale

mod engine;
mod cashflows;
mod irr;
mod tax;

pub use engine::{
    compute_projection, gross_rent, resale_value, ProjectionConfig, ProjectionEngine,
    PROJECTION_YEARS,
};
pub use cashflows::{find_breakeven_year, ExitPoint, InvestmentSummary, ProjectionResult, YearRow};
pub use irr::{calculate_irr, exit_cash_flows};
pub use tax::{
    domestic_tax_rate, foreign_tax, CarryForward, DomesticSettlement, FOREIGN_TAX_FLOOR,
    SOCIAL_LEVY_RATE,
};
