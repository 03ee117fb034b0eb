//! SCPI Simulator - Leveraged real-estate fund investment projections
//!
//! This library provides:
//! - Loan amortization schedules with partial or total deferral
//! - 50-year rent, financing effort and tax projections
//! - Deficit carry-forward on French rental income, foreign income taxation
//! - Break-even ("exit without loss") detection and exit IRR
//! - Parallel scenario batches and CSV export

pub mod error;
pub mod params;
pub mod amortization;
pub mod projection;
pub mod scenario;
pub mod export;

// Re-export commonly used types
pub use error::{ConfigurationError, Result};
pub use params::{DeferralModality, InvestmentParameters, LoanParameters, Scenario};
pub use amortization::{compute_amortization, AmortizationRow, AmortizationSchedule};
pub use projection::{compute_projection, ProjectionResult, YearRow};
pub use scenario::{simulate, ScenarioRunner, Simulation};
