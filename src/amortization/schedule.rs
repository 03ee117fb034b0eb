//! Amortization schedule output structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One month of the loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Month index (1-indexed)
    pub month: u32,
    pub installment_excl_insurance: f64,
    pub installment_incl_insurance: f64,
    pub interest: f64,
    pub insurance: f64,
    pub principal_repaid: f64,
    /// Remaining principal after this month's payment
    pub remaining_principal: f64,
}

/// Complete month-by-month schedule with its year-end balances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    /// Amount borrowed at month 0
    pub financed_principal: f64,

    /// Monthly rows, month 1 first
    pub rows: Vec<AmortizationRow>,

    /// Remaining principal at the last month of each 12-month block
    /// (index 0 = year 1); a partial final block uses its last month
    pub yearly_remaining_principal: Vec<f64>,
}

impl AmortizationSchedule {
    pub(crate) fn from_rows(financed_principal: f64, rows: Vec<AmortizationRow>) -> Self {
        let yearly_remaining_principal = rows
            .chunks(12)
            .filter_map(|block| block.last().map(|r| r.remaining_principal))
            .collect();

        Self {
            financed_principal,
            rows,
            yearly_remaining_principal,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a 1-indexed month
    pub fn row(&self, month: u32) -> Option<&AmortizationRow> {
        month
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx as usize))
    }

    /// Year-end remaining principal, 0 once past the schedule
    pub fn remaining_principal_at_year(&self, year: u32) -> f64 {
        year.checked_sub(1)
            .and_then(|idx| self.yearly_remaining_principal.get(idx as usize))
            .copied()
            .unwrap_or(0.0)
    }

    /// Year-end balances keyed by 1-indexed year
    pub fn yearly_remaining_principal_map(&self) -> BTreeMap<u32, f64> {
        self.yearly_remaining_principal
            .iter()
            .enumerate()
            .map(|(idx, &balance)| (idx as u32 + 1, balance))
            .collect()
    }

    /// Sum `field` over months `first..=last` (1-indexed), clamped to the
    /// months that exist
    pub fn sum_months<F>(&self, first: u32, last: u32, field: F) -> f64
    where
        F: Fn(&AmortizationRow) -> f64,
    {
        if first > last {
            return 0.0;
        }
        let start = (first.max(1) - 1) as usize;
        let end = (last as usize).min(self.rows.len());
        if start >= end {
            return 0.0;
        }
        self.rows[start..end].iter().map(field).sum()
    }

    /// Sum `field` over the twelve months of a 1-indexed year
    pub fn sum_year<F>(&self, year: u32, field: F) -> f64
    where
        F: Fn(&AmortizationRow) -> f64,
    {
        if year == 0 {
            return 0.0;
        }
        self.sum_months((year - 1) * 12 + 1, year * 12, field)
    }

    pub fn summary(&self) -> ScheduleSummary {
        let total_interest: f64 = self.rows.iter().map(|r| r.interest).sum();
        let total_insurance: f64 = self.rows.iter().map(|r| r.insurance).sum();
        let total_principal_repaid: f64 = self.rows.iter().map(|r| r.principal_repaid).sum();
        let total_paid: f64 = self.rows.iter().map(|r| r.installment_incl_insurance).sum();

        ScheduleSummary {
            total_months: self.rows.len() as u32,
            financed_principal: self.financed_principal,
            total_interest,
            total_insurance,
            total_principal_repaid,
            total_paid,
            final_remaining_principal: self
                .rows
                .last()
                .map(|r| r.remaining_principal)
                .unwrap_or(self.financed_principal),
        }
    }
}

/// Totals over the life of the loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_months: u32,
    pub financed_principal: f64,
    pub total_interest: f64,
    pub total_insurance: f64,
    pub total_principal_repaid: f64,
    /// Installments including insurance
    pub total_paid: f64,
    pub final_remaining_principal: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_rows(months: u32) -> Vec<AmortizationRow> {
        (1..=months)
            .map(|m| AmortizationRow {
                month: m,
                installment_excl_insurance: 10.0,
                installment_incl_insurance: 11.0,
                interest: 2.0,
                insurance: 1.0,
                principal_repaid: 8.0,
                remaining_principal: 1_000.0 - 8.0 * m as f64,
            })
            .collect()
    }

    #[test]
    fn test_yearly_blocks_with_partial_final_year() {
        let schedule = AmortizationSchedule::from_rows(1_000.0, flat_rows(30));

        assert_eq!(schedule.yearly_remaining_principal.len(), 3);
        assert_eq!(schedule.remaining_principal_at_year(1), 1_000.0 - 96.0);
        assert_eq!(schedule.remaining_principal_at_year(2), 1_000.0 - 192.0);
        // Year 3 only has months 25..=30
        assert_eq!(schedule.remaining_principal_at_year(3), 1_000.0 - 240.0);
        assert_eq!(schedule.remaining_principal_at_year(4), 0.0);
        assert_eq!(schedule.remaining_principal_at_year(0), 0.0);

        let map = schedule.yearly_remaining_principal_map();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_month_sums_are_clamped() {
        let schedule = AmortizationSchedule::from_rows(1_000.0, flat_rows(30));

        assert_eq!(schedule.sum_year(1, |r| r.interest), 24.0);
        assert_eq!(schedule.sum_year(3, |r| r.interest), 12.0);
        assert_eq!(schedule.sum_year(4, |r| r.interest), 0.0);
        assert_eq!(schedule.sum_months(10, 12, |r| r.insurance), 3.0);
        assert_eq!(schedule.sum_months(13, 12, |r| r.insurance), 0.0);
        assert_eq!(schedule.row(30).map(|r| r.month), Some(30));
        assert!(schedule.row(0).is_none());
    }
}
