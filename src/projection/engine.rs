//! Yearly cash-flow, tax and valuation projection built on a loan schedule

use crate::amortization::AmortizationSchedule;
use crate::error::{ensure_finite, ConfigurationError, Result};
use crate::params::{DeferralModality, InvestmentParameters, MAX_ENTRY_DELAY_MONTHS};
use super::cashflows::{find_breakeven_year, ExitPoint, ProjectionResult, YearRow};
use super::tax::{domestic_tax_rate, foreign_tax, CarryForward};

/// Default projection horizon
pub const PROJECTION_YEARS: u32 = 50;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Number of years to project
    pub horizon_years: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_years: PROJECTION_YEARS,
        }
    }
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

/// Project the investment over the default 50-year horizon
pub fn compute_projection(
    params: &InvestmentParameters,
    schedule: &AmortizationSchedule,
) -> Result<ProjectionResult> {
    ProjectionEngine::default().project(params, schedule)
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run the projection for one parameter set and its loan schedule
    pub fn project(
        &self,
        params: &InvestmentParameters,
        schedule: &AmortizationSchedule,
    ) -> Result<ProjectionResult> {
        params.validate()?;
        if schedule.len() != params.loan.term_months as usize {
            return Err(ConfigurationError::invalid(
                "schedule",
                format!(
                    "schedule has {} months but the loan term is {}",
                    schedule.len(),
                    params.loan.term_months
                ),
            ));
        }

        let horizon = self.config.horizon_years as usize;
        let mut years = Vec::with_capacity(horizon);
        let mut exit_points = Vec::with_capacity(horizon);

        let mut carry = CarryForward::default();
        let mut cumulative_net_effort = 0.0;

        for year in 1..=self.config.horizon_years {
            let row = self.calculate_year(params, schedule, year, &mut carry);

            cumulative_net_effort += row.net_annual_effort;
            let exit = exit_point(params, schedule, &row, cumulative_net_effort);

            ensure_finite(
                || format!("projection year {year}"),
                &[
                    row.gross_rent,
                    row.annual_effort,
                    row.deductible_amount,
                    row.total_tax,
                    row.carried_deductible,
                    row.net_annual_effort,
                    row.resale_value,
                    exit.cumulative_cost,
                ],
            )?;

            years.push(row);
            exit_points.push(exit);
        }

        let breakeven_year = find_breakeven_year(&exit_points);

        Ok(ProjectionResult {
            years,
            exit_points,
            breakeven_year,
            down_payment: params.loan.down_payment,
        })
    }

    /// Calculate one year, updating the carried deductible
    fn calculate_year(
        &self,
        params: &InvestmentParameters,
        schedule: &AmortizationSchedule,
        year: u32,
        carry: &mut CarryForward,
    ) -> YearRow {
        let gross_rent = gross_rent(params, year);
        let foreign_share = params.foreign_share();
        let domestic_rent = gross_rent * (1.0 - foreign_share);
        let foreign_rent = gross_rent * foreign_share;

        let annual_effort = financing_effort(params, schedule, year, gross_rent);
        let deductible_amount = deductible_amount(params, schedule, year);

        // Only the domestic share of the deductible offsets domestic rent;
        // nothing is deducted from the foreign share.
        let domestic_taxable = domestic_rent - deductible_amount * params.domestic_share();
        let foreign_taxable = foreign_rent;

        let settlement = carry.settle(domestic_taxable, domestic_tax_rate(params.marginal_tax_rate));
        *carry = settlement.carry;

        let domestic_tax = settlement.tax;
        let foreign_tax = foreign_tax(foreign_taxable, params.marginal_tax_rate);
        let total_tax = domestic_tax + foreign_tax;
        let net_annual_effort = annual_effort + total_tax;

        YearRow {
            year,
            gross_rent,
            domestic_rent,
            foreign_rent,
            annual_effort,
            deductible_amount,
            domestic_taxable,
            foreign_taxable,
            domestic_tax,
            foreign_tax,
            total_tax,
            carried_deductible: carry.balance,
            net_annual_effort,
            net_monthly_effort: net_annual_effort / 12.0,
            resale_value: resale_value(params, year),
            net_domestic_rent: domestic_rent - domestic_tax,
            net_foreign_rent: foreign_rent - foreign_tax,
        }
    }
}

/// Gross rent: year 1 pro-rated by the entry delay, later years revalued
///
/// A delay of a full year or more leaves no rent in year 1.
pub fn gross_rent(params: &InvestmentParameters, year: u32) -> f64 {
    let base = params.base_annual_rent();
    if year <= 1 {
        let months = MAX_ENTRY_DELAY_MONTHS.saturating_sub(params.entry_delay_months);
        base * months as f64 / 12.0
    } else {
        base * (1.0 + params.revaluation_rate).powi(year as i32 - 1)
    }
}

/// Share value net of the subscription fee at the end of `year`
pub fn resale_value(params: &InvestmentParameters, year: u32) -> f64 {
    params.loan.investment_amount
        * (1.0 - params.subscription_fee_rate)
        * (1.0 + params.revaluation_rate).powi(year as i32)
}

/// Debt service minus rent; pure income once the loan term is over
fn financing_effort(
    params: &InvestmentParameters,
    schedule: &AmortizationSchedule,
    year: u32,
    gross_rent: f64,
) -> f64 {
    let loan = &params.loan;
    if year > loan.term_years() {
        return -gross_rent;
    }

    let mut effort = schedule.sum_year(year, |r| r.installment_incl_insurance) - gross_rent;
    if year == 1 && !loan.fee_financed {
        effort += loan.fee_amount;
    }
    effort
}

/// Interest, insurance and (in year 1) fees deductible from rental income
fn deductible_amount(params: &InvestmentParameters, schedule: &AmortizationSchedule, year: u32) -> f64 {
    let loan = &params.loan;
    if year > loan.term_years() {
        return 0.0;
    }
    if year > 1 {
        return schedule.sum_year(year, |r| r.interest + r.insurance);
    }

    // Capitalized interest was never paid, so it is not deductible
    let first_interest_month = match loan.deferral {
        DeferralModality::Total => loan.effective_deferral_months() + 1,
        DeferralModality::Partial | DeferralModality::None => 1,
    };

    schedule.sum_months(1, 12, |r| r.insurance)
        + schedule.sum_months(first_interest_month, 12, |r| r.interest)
        + loan.fee_amount
}

fn exit_point(
    params: &InvestmentParameters,
    schedule: &AmortizationSchedule,
    row: &YearRow,
    cumulative_net_effort: f64,
) -> ExitPoint {
    let remaining_principal = schedule.remaining_principal_at_year(row.year);
    let down_payment = if row.year == 1 {
        params.loan.down_payment
    } else {
        0.0
    };
    let cumulative_cost = cumulative_net_effort + remaining_principal + down_payment;

    ExitPoint {
        year: row.year,
        cumulative_net_effort,
        remaining_principal,
        cumulative_cost,
        resale_value: row.resale_value,
        surplus: row.resale_value - cumulative_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::compute_amortization;
    use crate::projection::tax::SOCIAL_LEVY_RATE;
    use approx::assert_abs_diff_eq;

    fn reference_params(deferral: DeferralModality, deferral_months: u32) -> InvestmentParameters {
        let mut params = InvestmentParameters::default();
        params.loan.fee_financed = true;
        params.loan.deferral = deferral;
        params.loan.deferral_months = deferral_months;
        params
    }

    fn project(params: &InvestmentParameters) -> ProjectionResult {
        let schedule = compute_amortization(&params.loan).unwrap();
        compute_projection(params, &schedule).unwrap()
    }

    #[test]
    fn test_projection_runs_fifty_years() {
        let result = project(&reference_params(DeferralModality::None, 0));
        assert_eq!(result.years.len(), 50);
        assert_eq!(result.exit_points.len(), 50);
        assert_eq!(result.years[0].year, 1);
        assert_eq!(result.years[49].year, 50);
    }

    #[test]
    fn test_year_one_rent_ramp() {
        let params = reference_params(DeferralModality::None, 0);
        assert_abs_diff_eq!(gross_rent(&params, 1), 2_500.0, epsilon = 1e-9);
        // The ramp applies once: year 2 is a full revalued year
        assert_abs_diff_eq!(gross_rent(&params, 2), 5_050.0, epsilon = 1e-9);
        assert_abs_diff_eq!(gross_rent(&params, 3), 5_000.0 * 1.01 * 1.01, epsilon = 1e-9);
    }

    #[test]
    fn test_entry_delay_beyond_a_year_leaves_no_first_year_rent() {
        let mut params = reference_params(DeferralModality::None, 0);
        params.entry_delay_months = 13;
        assert_eq!(gross_rent(&params, 1), 0.0);
        assert_abs_diff_eq!(gross_rent(&params, 2), 5_050.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reference_projection_no_deferral() {
        let result = project(&reference_params(DeferralModality::None, 0));

        let y1 = result.year(1).unwrap();
        assert_abs_diff_eq!(y1.deductible_amount, 7_376.07, epsilon = 0.01);
        assert_abs_diff_eq!(y1.domestic_taxable, -4_876.07, epsilon = 0.01);
        assert_eq!(y1.domestic_tax, 0.0);
        assert_abs_diff_eq!(y1.carried_deductible, 4_876.07, epsilon = 0.01);
        assert_abs_diff_eq!(y1.net_annual_effort, 4_746.60, epsilon = 0.01);

        let y2 = result.year(2).unwrap();
        assert_abs_diff_eq!(y2.carried_deductible, 4_844.55, epsilon = 0.01);

        let y25 = result.year(25).unwrap();
        assert_abs_diff_eq!(y25.domestic_tax, 2_859.43, epsilon = 0.01);
        assert_eq!(y25.carried_deductible, 0.0);

        // Loan over: pure income
        let y26 = result.year(26).unwrap();
        assert_abs_diff_eq!(y26.annual_effort, -y26.gross_rent, epsilon = 1e-9);
        assert_eq!(y26.deductible_amount, 0.0);
        assert_abs_diff_eq!(y26.net_annual_effort, -3_385.62, epsilon = 0.01);

        assert_eq!(result.breakeven_year, Some(11));
    }

    #[test]
    fn test_total_deferral_year_one_deductible() {
        let params = reference_params(DeferralModality::Total, 9);
        let schedule = compute_amortization(&params.loan).unwrap();
        let result = compute_projection(&params, &schedule).unwrap();

        let expected = schedule.sum_months(1, 12, |r| r.insurance)
            + schedule.sum_months(10, 12, |r| r.interest)
            + params.loan.fee_amount;
        let y1 = result.year(1).unwrap();
        assert_abs_diff_eq!(y1.deductible_amount, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(y1.deductible_amount, 3_665.76, epsilon = 0.01);
        assert_eq!(result.breakeven_year, Some(13));
    }

    #[test]
    fn test_partial_deferral_interest_deductible() {
        let result = project(&reference_params(DeferralModality::Partial, 9));
        assert_abs_diff_eq!(result.year(1).unwrap().deductible_amount, 7_421.59, epsilon = 0.01);
        assert_eq!(result.breakeven_year, Some(12));
    }

    #[test]
    fn test_unfinanced_fee_paid_in_year_one() {
        let financed = project(&reference_params(DeferralModality::None, 0));

        let mut params = reference_params(DeferralModality::None, 0);
        params.loan.fee_financed = false;
        let schedule = compute_amortization(&params.loan).unwrap();
        let result = compute_projection(&params, &schedule).unwrap();

        let y1 = result.year(1).unwrap();
        let expected = schedule.sum_year(1, |r| r.installment_incl_insurance) - 2_500.0 + 2_250.0;
        assert_abs_diff_eq!(y1.annual_effort, expected, epsilon = 1e-9);

        // The fee is deductible whether financed or not
        let financed_insurance_and_interest =
            financed.year(1).unwrap().deductible_amount - 2_250.0;
        assert!(y1.deductible_amount - 2_250.0 < financed_insurance_and_interest);
    }

    #[test]
    fn test_tax_totals_and_net_rents() {
        let mut params = reference_params(DeferralModality::None, 0);
        params.foreign_investment = true;
        params.foreign_allocation_pct = 50.0;
        let result = project(&params);

        for row in &result.years {
            assert_abs_diff_eq!(row.total_tax, row.domestic_tax + row.foreign_tax, epsilon = 1e-9);
            assert_abs_diff_eq!(row.domestic_rent + row.foreign_rent, row.gross_rent, epsilon = 1e-9);
            assert_abs_diff_eq!(row.net_domestic_rent, row.domestic_rent - row.domestic_tax, epsilon = 1e-9);
            assert_abs_diff_eq!(row.net_foreign_rent, row.foreign_rent - row.foreign_tax, epsilon = 1e-9);
            assert_abs_diff_eq!(row.net_monthly_effort * 12.0, row.net_annual_effort, epsilon = 1e-9);
            assert!(row.carried_deductible >= 0.0);
            // Foreign income at the 30% bracket, above the 20% floor
            assert_abs_diff_eq!(row.foreign_tax, row.foreign_rent * 0.30, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_foreign_share_gets_no_deduction() {
        // Only the domestic share of the deductible is used; the foreign
        // share of it is dropped rather than applied to foreign rent.
        let mut params = reference_params(DeferralModality::None, 0);
        params.foreign_investment = true;
        params.foreign_allocation_pct = 40.0;
        let result = project(&params);

        let y3 = result.year(3).unwrap();
        assert_abs_diff_eq!(y3.foreign_taxable, y3.foreign_rent, epsilon = 1e-12);
        assert_abs_diff_eq!(
            y3.domestic_taxable,
            y3.domestic_rent - y3.deductible_amount * 0.6,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_carry_forward_never_loses_deductible() {
        let result = project(&reference_params(DeferralModality::Total, 9));
        let rate = 0.30 + SOCIAL_LEVY_RATE;

        let mut previous_balance = 0.0;
        let mut taxed_base = 0.0;
        let mut absorbed = 0.0;
        let mut paid = 0.0;
        for row in &result.years {
            assert!(row.carried_deductible >= 0.0);
            if row.domestic_taxable >= 0.0 {
                let used = previous_balance - row.carried_deductible;
                assert!(used >= -1e-9);
                taxed_base += row.domestic_taxable;
                absorbed += used;
                paid += row.domestic_tax;
            } else {
                assert_eq!(row.domestic_tax, 0.0);
                assert_abs_diff_eq!(
                    row.carried_deductible,
                    previous_balance - row.domestic_taxable,
                    epsilon = 1e-9
                );
            }
            previous_balance = row.carried_deductible;
        }
        assert_abs_diff_eq!(paid, (taxed_base - absorbed) * rate, epsilon = 1e-6);
    }

    #[test]
    fn test_breakeven_matches_exit_points() {
        let result = project(&reference_params(DeferralModality::None, 0));
        let year = result.breakeven_year.unwrap();

        for point in &result.exit_points[..(year - 1) as usize] {
            assert!(point.cumulative_cost > point.resale_value);
        }
        let hit = result.exit_point(year).unwrap();
        assert!(hit.resale_value >= hit.cumulative_cost);
        assert_abs_diff_eq!(hit.surplus, hit.resale_value - hit.cumulative_cost, epsilon = 1e-9);
    }

    #[test]
    fn test_down_payment_counted_in_year_one_only() {
        let mut params = reference_params(DeferralModality::None, 0);
        params.loan.down_payment = 20_000.0;
        let schedule = compute_amortization(&params.loan).unwrap();
        let result = compute_projection(&params, &schedule).unwrap();

        let y1 = result.exit_point(1).unwrap();
        assert_abs_diff_eq!(
            y1.cumulative_cost,
            y1.cumulative_net_effort + schedule.remaining_principal_at_year(1) + 20_000.0,
            epsilon = 1e-9
        );
        let y2 = result.exit_point(2).unwrap();
        assert_abs_diff_eq!(
            y2.cumulative_cost,
            y2.cumulative_net_effort + schedule.remaining_principal_at_year(2),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_no_breakeven_when_resale_never_covers_cost() {
        let mut params = reference_params(DeferralModality::None, 0);
        params.rental_yield = 0.0;
        params.revaluation_rate = 0.0;
        let result = project(&params);
        assert_eq!(result.breakeven_year, None);
    }

    #[test]
    fn test_resale_value() {
        let params = reference_params(DeferralModality::None, 0);
        assert_abs_diff_eq!(resale_value(&params, 1), 88_880.0, epsilon = 1e-9);
        assert_abs_diff_eq!(resale_value(&params, 2), 88_000.0 * 1.01 * 1.01, epsilon = 1e-9);
    }

    #[test]
    fn test_short_loan_has_no_loan_years() {
        // Less than a year of debt: never within a whole loan year
        let mut params = reference_params(DeferralModality::None, 0);
        params.loan.term_months = 6;
        let result = project(&params);
        let y1 = result.year(1).unwrap();
        assert_eq!(y1.deductible_amount, 0.0);
        assert_abs_diff_eq!(y1.annual_effort, -y1.gross_rent, epsilon = 1e-12);
    }

    #[test]
    fn test_mismatched_schedule_rejected() {
        let params = reference_params(DeferralModality::None, 0);
        let mut other = params.clone();
        other.loan.term_months = 240;
        let schedule = compute_amortization(&other.loan).unwrap();
        assert!(matches!(
            compute_projection(&params, &schedule),
            Err(ConfigurationError::InvalidParameter { field: "schedule", .. })
        ));
    }

    #[test]
    fn test_custom_horizon() {
        let params = reference_params(DeferralModality::None, 0);
        let schedule = compute_amortization(&params.loan).unwrap();
        let engine = ProjectionEngine::new(ProjectionConfig { horizon_years: 30 });
        let result = engine.project(&params, &schedule).unwrap();
        assert_eq!(result.years.len(), 30);
    }
}
