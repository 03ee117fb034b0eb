//! Loan amortization schedule generation

mod engine;
mod schedule;
mod state;

pub use engine::{annuity_payment, compute_amortization};
pub use schedule::{AmortizationRow, AmortizationSchedule, ScheduleSummary};
pub use state::{LoanState, MonthPhase};
