//! Running loan state during schedule generation

use crate::params::DeferralModality;

/// What the borrower pays in a given month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthPhase {
    /// Total deferral: insurance only, interest capitalizes
    Capitalizing,
    /// Partial deferral: interest and insurance, no principal
    InterestOnly,
    /// Regular annuity installment
    Amortizing,
}

impl MonthPhase {
    pub fn for_month(modality: DeferralModality, deferral_months: u32, month: u32) -> Self {
        if month > deferral_months {
            return MonthPhase::Amortizing;
        }
        match modality {
            DeferralModality::Total => MonthPhase::Capitalizing,
            DeferralModality::Partial => MonthPhase::InterestOnly,
            DeferralModality::None => MonthPhase::Amortizing,
        }
    }
}

/// State of the loan at a point in the schedule
#[derive(Debug, Clone)]
pub struct LoanState {
    /// Current month (1-indexed, 0 before the first payment)
    pub month: u32,

    /// Principal outstanding at the start of the current month
    pub remaining_principal: f64,

    /// Annuity installment, fixed at the first amortizing month
    pub installment: Option<f64>,

    /// Interest added to principal during a total deferral
    pub capitalized_interest: f64,
}

impl LoanState {
    pub fn new(financed_principal: f64) -> Self {
        Self {
            month: 0,
            remaining_principal: financed_principal,
            installment: None,
            capitalized_interest: 0.0,
        }
    }

    pub fn advance_month(&mut self) {
        self.month += 1;
    }
}
