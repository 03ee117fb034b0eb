//! Loan and investment parameter sets

use crate::error::{ConfigurationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// French marginal income-tax brackets (TMI)
pub const MARGINAL_TAX_BRACKETS: [f64; 5] = [0.0, 0.11, 0.30, 0.41, 0.45];

/// Longest entry delay, in months, before rent starts flowing
pub const MAX_ENTRY_DELAY_MONTHS: u32 = 12;

/// Longest accepted loan term, in months
pub const MAX_TERM_MONTHS: u32 = 600;

/// Grace-period modality of the loan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeferralModality {
    /// Standard annuity from the first month
    #[default]
    None,
    /// Interest paid during the deferral, principal untouched
    Partial,
    /// Nothing but insurance paid; interest capitalizes
    Total,
}

impl DeferralModality {
    /// French label, as shown on the input form
    pub fn as_str(&self) -> &'static str {
        match self {
            DeferralModality::None => "Sans différé",
            DeferralModality::Partial => "Différé partiel",
            DeferralModality::Total => "Différé total",
        }
    }
}

impl fmt::Display for DeferralModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeferralModality {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "sans différé" | "" => Ok(DeferralModality::None),
            "partial" | "différé partiel" => Ok(DeferralModality::Partial),
            "total" | "différé total" => Ok(DeferralModality::Total),
            other => Err(ConfigurationError::invalid(
                "deferral",
                format!("unknown deferral modality `{other}`"),
            )),
        }
    }
}

/// Financing side of the investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Amount invested in fund shares
    pub investment_amount: f64,

    /// Personal contribution, deducted from the financed amount
    pub down_payment: f64,

    /// Loan duration in months
    pub term_months: u32,

    /// Annual nominal interest rate (0.0496 for 4.96%)
    pub annual_rate: f64,

    /// Annual borrower insurance rate, applied to the financed principal
    pub insurance_rate: f64,

    #[serde(default)]
    pub deferral: DeferralModality,

    /// Grace period length; ignored when `deferral` is `None`
    #[serde(default)]
    pub deferral_months: u32,

    /// Brokerage / file fees
    #[serde(default)]
    pub fee_amount: f64,

    /// Whether the fees are added to the financed amount
    #[serde(default)]
    pub fee_financed: bool,
}

impl LoanParameters {
    /// Amount actually borrowed
    pub fn financed_principal(&self) -> f64 {
        let base = self.investment_amount - self.down_payment;
        if self.fee_financed {
            base + self.fee_amount
        } else {
            base
        }
    }

    /// Deferral length once the modality is taken into account
    pub fn effective_deferral_months(&self) -> u32 {
        match self.deferral {
            DeferralModality::None => 0,
            DeferralModality::Partial | DeferralModality::Total => self.deferral_months,
        }
    }

    /// Whole years covered by the loan (floor division)
    pub fn term_years(&self) -> u32 {
        self.term_months / 12
    }

    pub fn validate(&self) -> Result<()> {
        non_negative("investment_amount", self.investment_amount)?;
        non_negative("down_payment", self.down_payment)?;
        non_negative("annual_rate", self.annual_rate)?;
        non_negative("insurance_rate", self.insurance_rate)?;
        non_negative("fee_amount", self.fee_amount)?;

        if self.down_payment > self.investment_amount {
            return Err(ConfigurationError::invalid(
                "down_payment",
                format!(
                    "down payment {:.2} exceeds investment amount {:.2}",
                    self.down_payment, self.investment_amount
                ),
            ));
        }

        if self.term_months > MAX_TERM_MONTHS {
            return Err(ConfigurationError::invalid(
                "term_months",
                format!(
                    "loan term of {} months exceeds {} months",
                    self.term_months, MAX_TERM_MONTHS
                ),
            ));
        }

        if self.effective_deferral_months() > self.term_months {
            return Err(ConfigurationError::invalid(
                "deferral_months",
                format!(
                    "deferral of {} months exceeds loan term of {} months",
                    self.deferral_months, self.term_months
                ),
            ));
        }

        if self.term_months == 0 && self.financed_principal() > 0.0 {
            return Err(ConfigurationError::invalid(
                "term_months",
                format!(
                    "zero-length loan cannot finance {:.2}",
                    self.financed_principal()
                ),
            ));
        }

        Ok(())
    }
}

/// Full parameter set for the investment projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentParameters {
    pub loan: LoanParameters,

    /// Target gross rental yield on the investment amount
    pub rental_yield: f64,

    /// Months without rent after subscription (year 1 only)
    #[serde(default)]
    pub entry_delay_months: u32,

    /// Annual revaluation of both rent and share price
    #[serde(default)]
    pub revaluation_rate: f64,

    /// Subscription fee, lost on resale
    #[serde(default)]
    pub subscription_fee_rate: f64,

    /// Marginal income-tax rate (TMI), without social levies
    pub marginal_tax_rate: f64,

    #[serde(default)]
    pub foreign_investment: bool,

    /// Share of the portfolio held abroad, in percent (0..=100)
    #[serde(default)]
    pub foreign_allocation_pct: f64,
}

impl InvestmentParameters {
    /// Fraction of the rent earned abroad
    pub fn foreign_share(&self) -> f64 {
        if self.foreign_investment {
            self.foreign_allocation_pct / 100.0
        } else {
            0.0
        }
    }

    /// Fraction of the rent earned in France
    pub fn domestic_share(&self) -> f64 {
        1.0 - self.foreign_share()
    }

    /// Full-year gross rent before any revaluation
    pub fn base_annual_rent(&self) -> f64 {
        self.loan.investment_amount * self.rental_yield
    }

    /// Whether the marginal rate is one of the French brackets
    pub fn is_standard_bracket(&self) -> bool {
        MARGINAL_TAX_BRACKETS
            .iter()
            .any(|b| (b - self.marginal_tax_rate).abs() < 1e-9)
    }

    pub fn validate(&self) -> Result<()> {
        self.loan.validate()?;

        non_negative("rental_yield", self.rental_yield)?;
        non_negative("subscription_fee_rate", self.subscription_fee_rate)?;

        if self.entry_delay_months > MAX_ENTRY_DELAY_MONTHS {
            return Err(ConfigurationError::invalid(
                "entry_delay_months",
                format!(
                    "entry delay of {} months exceeds {MAX_ENTRY_DELAY_MONTHS}",
                    self.entry_delay_months
                ),
            ));
        }
        if !self.revaluation_rate.is_finite() || self.revaluation_rate <= -1.0 {
            return Err(ConfigurationError::invalid(
                "revaluation_rate",
                "revaluation rate must be finite and above -100%",
            ));
        }
        if self.subscription_fee_rate > 1.0 {
            return Err(ConfigurationError::invalid(
                "subscription_fee_rate",
                "subscription fee cannot exceed 100%",
            ));
        }
        unit_interval("marginal_tax_rate", self.marginal_tax_rate)?;
        if !self.foreign_allocation_pct.is_finite()
            || !(0.0..=100.0).contains(&self.foreign_allocation_pct)
        {
            return Err(ConfigurationError::invalid(
                "foreign_allocation_pct",
                "foreign allocation must be between 0 and 100",
            ));
        }

        Ok(())
    }
}

impl Default for InvestmentParameters {
    /// Input form defaults
    fn default() -> Self {
        Self {
            loan: LoanParameters {
                investment_amount: 100_000.0,
                down_payment: 0.0,
                term_months: 300,
                annual_rate: 0.0496,
                insurance_rate: 0.0010,
                deferral: DeferralModality::None,
                deferral_months: 0,
                fee_amount: 2_250.0,
                fee_financed: false,
            },
            rental_yield: 0.05,
            entry_delay_months: 6,
            revaluation_rate: 0.01,
            subscription_fee_rate: 0.12,
            marginal_tax_rate: 0.30,
            foreign_investment: false,
            foreign_allocation_pct: 0.0,
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::invalid(
            field,
            format!("expected a finite non-negative amount, got {value}"),
        ))
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigurationError::invalid(
            field,
            format!("expected a rate between 0 and 1, got {value}"),
        ))
    }
}
