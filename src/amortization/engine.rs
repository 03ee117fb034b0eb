//! Month-by-month loan amortization with optional deferral

use crate::error::{ensure_finite, ConfigurationError, Result};
use crate::params::LoanParameters;
use super::schedule::{AmortizationRow, AmortizationSchedule};
use super::state::{LoanState, MonthPhase};

/// Standard fixed-rate installment: P * r / (1 - (1+r)^-n)
///
/// A zero rate degenerates to straight-line repayment.
pub fn annuity_payment(principal: f64, monthly_rate: f64, months: u32) -> Result<f64> {
    if months == 0 {
        if principal == 0.0 {
            return Ok(0.0);
        }
        return Err(ConfigurationError::invalid(
            "term_months",
            "annuity over zero months",
        ));
    }

    if monthly_rate == 0.0 {
        return Ok(principal / months as f64);
    }

    let periods = i32::try_from(months).map_err(|_| {
        ConfigurationError::invalid("term_months", format!("{months} months is out of range"))
    })?;
    let discount = (1.0 + monthly_rate).powi(-periods);
    let payment = principal * monthly_rate / (1.0 - discount);

    ensure_finite(|| "annuity installment".to_string(), &[payment])?;
    Ok(payment)
}

/// Build the full amortization schedule for a loan
///
/// The installment is computed at the first month past the deferral, on
/// the principal outstanding at that point and over the remaining term,
/// then held constant. Without deferral this is the plain annuity over
/// the whole term.
pub fn compute_amortization(params: &LoanParameters) -> Result<AmortizationSchedule> {
    params.validate()?;

    let financed = params.financed_principal();
    let deferral_months = params.effective_deferral_months();
    let monthly_rate = params.annual_rate / 12.0;
    // Insurance stays on the original financed amount, even once interest
    // has capitalized.
    let insurance = financed * (params.insurance_rate / 12.0);

    let mut state = LoanState::new(financed);
    let mut rows = Vec::with_capacity(params.term_months as usize);

    for _month in 1..=params.term_months {
        state.advance_month();

        let interest = state.remaining_principal * monthly_rate;
        let phase = MonthPhase::for_month(params.deferral, deferral_months, state.month);

        let (installment_excl_insurance, principal_repaid) = match phase {
            MonthPhase::Capitalizing => {
                state.remaining_principal += interest;
                state.capitalized_interest += interest;
                (0.0, 0.0)
            }
            MonthPhase::InterestOnly => (interest, 0.0),
            MonthPhase::Amortizing => {
                let installment = match state.installment {
                    Some(installment) => installment,
                    None => {
                        let installment = annuity_payment(
                            state.remaining_principal,
                            monthly_rate,
                            params.term_months - deferral_months,
                        )?;
                        state.installment = Some(installment);
                        installment
                    }
                };
                (installment, installment - interest)
            }
        };

        let installment_incl_insurance = match phase {
            MonthPhase::Capitalizing => insurance,
            MonthPhase::InterestOnly | MonthPhase::Amortizing => {
                installment_excl_insurance + insurance
            }
        };

        state.remaining_principal -= principal_repaid;

        let row = AmortizationRow {
            month: state.month,
            installment_excl_insurance,
            installment_incl_insurance,
            interest,
            insurance,
            principal_repaid,
            remaining_principal: state.remaining_principal,
        };

        ensure_finite(
            || format!("amortization month {}", row.month),
            &[
                row.installment_incl_insurance,
                row.interest,
                row.principal_repaid,
                row.remaining_principal,
            ],
        )?;

        rows.push(row);
    }

    Ok(AmortizationSchedule::from_rows(financed, rows))
}
