//! Yearly projection output structures

use serde::{Deserialize, Serialize};
use crate::params::InvestmentParameters;
use super::irr::{calculate_irr, exit_cash_flows};
use super::tax::domestic_tax_rate;

/// One projected year of the investment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    /// Projection year (1-indexed)
    pub year: u32,

    // Rent
    pub gross_rent: f64,
    pub domestic_rent: f64,
    pub foreign_rent: f64,

    /// Debt service net of rent (negative once rent exceeds it)
    pub annual_effort: f64,

    // Taxation
    pub deductible_amount: f64,
    pub domestic_taxable: f64,
    pub foreign_taxable: f64,
    pub domestic_tax: f64,
    pub foreign_tax: f64,
    pub total_tax: f64,
    /// Carried deductible balance after this year
    pub carried_deductible: f64,

    // Result
    pub net_annual_effort: f64,
    pub net_monthly_effort: f64,
    pub resale_value: f64,
    pub net_domestic_rent: f64,
    pub net_foreign_rent: f64,
}

/// Cost of exiting at the end of a year versus what the shares fetch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitPoint {
    pub year: u32,
    pub cumulative_net_effort: f64,
    /// Principal still owed at year end (0 once the loan is repaid)
    pub remaining_principal: f64,
    /// Cumulative effort + remaining principal (+ down payment in year 1)
    pub cumulative_cost: f64,
    pub resale_value: f64,
    /// Resale value minus cumulative cost
    pub surplus: f64,
}

/// First year whose resale value covers the cumulative cost
pub fn find_breakeven_year(points: &[ExitPoint]) -> Option<u32> {
    points
        .iter()
        .find(|p| p.resale_value >= p.cumulative_cost)
        .map(|p| p.year)
}

/// Complete projection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Yearly rows, year 1 first
    pub years: Vec<YearRow>,

    /// Exit analysis per year, aligned with `years`
    pub exit_points: Vec<ExitPoint>,

    /// First year the investment can be sold without loss
    pub breakeven_year: Option<u32>,

    /// Personal contribution paid up front
    pub down_payment: f64,
}

impl ProjectionResult {
    /// Row for a 1-indexed year
    pub fn year(&self, year: u32) -> Option<&YearRow> {
        year.checked_sub(1)
            .and_then(|idx| self.years.get(idx as usize))
    }

    pub fn exit_point(&self, year: u32) -> Option<&ExitPoint> {
        year.checked_sub(1)
            .and_then(|idx| self.exit_points.get(idx as usize))
    }

    pub fn total_tax(&self) -> f64 {
        self.years.iter().map(|r| r.total_tax).sum()
    }

    /// Annual IRR for an investor selling at the end of `year`
    pub fn exit_irr(&self, year: u32) -> Option<f64> {
        let flows = exit_cash_flows(self, year)?;
        calculate_irr(&flows)
    }

    /// Headline figures over the loan period
    pub fn summary(&self, params: &InvestmentParameters) -> InvestmentSummary {
        let loan_years = params.loan.term_years();
        let loan_rows = || self.years.iter().take(loan_years as usize);

        let total_net_effort =
            loan_rows().map(|r| r.net_annual_effort).sum::<f64>() + params.loan.down_payment;
        let rent_after_loan =
            params.base_annual_rent() * (1.0 + params.revaluation_rate).powi(loan_years as i32);
        let net_rent_after_loan =
            rent_after_loan * (1.0 - domestic_tax_rate(params.marginal_tax_rate));

        let average_monthly_effort = if loan_years > 0 {
            Some(loan_rows().map(|r| r.net_monthly_effort).sum::<f64>() / loan_years as f64)
        } else {
            None
        };

        let yield_on_effort = |rent: f64| {
            let pct = rent / total_net_effort * 100.0;
            (total_net_effort > 0.0 && pct.is_finite()).then_some(pct)
        };

        InvestmentSummary {
            loan_term_years: loan_years,
            total_net_effort,
            rent_after_loan,
            monthly_rent_after_loan: rent_after_loan / 12.0,
            average_monthly_effort,
            gross_yield_pct: yield_on_effort(rent_after_loan),
            net_yield_pct: yield_on_effort(net_rent_after_loan),
            total_tax: self.total_tax(),
            breakeven_year: self.breakeven_year,
            breakeven_irr: self.breakeven_year.and_then(|y| self.exit_irr(y)),
        }
    }
}

/// Headline figures of a simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentSummary {
    pub loan_term_years: u32,
    /// Net effort over the loan years plus the down payment
    pub total_net_effort: f64,
    /// Gross annual rent in the first year without debt
    pub rent_after_loan: f64,
    pub monthly_rent_after_loan: f64,
    /// Down payment excluded
    pub average_monthly_effort: Option<f64>,
    pub gross_yield_pct: Option<f64>,
    pub net_yield_pct: Option<f64>,
    pub total_tax: f64,
    pub breakeven_year: Option<u32>,
    pub breakeven_irr: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(year: u32, cost: f64, resale: f64) -> ExitPoint {
        ExitPoint {
            year,
            cumulative_net_effort: cost,
            remaining_principal: 0.0,
            cumulative_cost: cost,
            resale_value: resale,
            surplus: resale - cost,
        }
    }

    #[test]
    fn test_breakeven_is_first_covered_year() {
        let points = [
            point(1, 100.0, 80.0),
            point(2, 95.0, 90.0),
            point(3, 90.0, 90.0),
            point(4, 85.0, 70.0),
            point(5, 80.0, 95.0),
        ];
        assert_eq!(find_breakeven_year(&points), Some(3));
    }

    #[test]
    fn test_no_breakeven() {
        let points = [point(1, 100.0, 80.0), point(2, 100.0, 99.0)];
        assert_eq!(find_breakeven_year(&points), None);
        assert_eq!(find_breakeven_year(&[]), None);
    }
}
