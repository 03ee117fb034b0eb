//! Rental income taxation and the deficit carry-forward

/// Flat social levy added on top of the marginal income-tax rate
pub const SOCIAL_LEVY_RATE: f64 = 0.172;

/// Minimum effective rate on foreign rental income
pub const FOREIGN_TAX_FLOOR: f64 = 0.20;

/// Rate applied to French rental income: marginal rate plus social levies
pub fn domestic_tax_rate(marginal_tax_rate: f64) -> f64 {
    marginal_tax_rate + SOCIAL_LEVY_RATE
}

/// Tax on foreign rental income; no carry-forward applies abroad
pub fn foreign_tax(foreign_taxable: f64, marginal_tax_rate: f64) -> f64 {
    foreign_taxable * marginal_tax_rate.max(FOREIGN_TAX_FLOOR)
}

/// Unused deductible carried from one year to the next
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarryForward {
    pub balance: f64,
}

/// Outcome of one year's domestic taxation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomesticSettlement {
    pub tax: f64,
    /// Part of the taxable base offset by the carried balance
    pub absorbed: f64,
    /// Balance to carry into the next year
    pub carry: CarryForward,
}

impl CarryForward {
    /// Tax one year's domestic base against the carried balance
    ///
    /// A negative base grows the balance. A positive base is first offset
    /// by the balance; only what remains is taxed.
    pub fn settle(self, taxable: f64, rate: f64) -> DomesticSettlement {
        if taxable < 0.0 {
            return DomesticSettlement {
                tax: 0.0,
                absorbed: 0.0,
                carry: CarryForward {
                    balance: self.balance + taxable.abs(),
                },
            };
        }

        if self.balance > 0.0 {
            if self.balance < taxable {
                DomesticSettlement {
                    tax: (taxable - self.balance) * rate,
                    absorbed: self.balance,
                    carry: CarryForward::default(),
                }
            } else {
                DomesticSettlement {
                    tax: 0.0,
                    absorbed: taxable,
                    carry: CarryForward {
                        balance: self.balance - taxable,
                    },
                }
            }
        } else {
            DomesticSettlement {
                tax: taxable * rate,
                absorbed: 0.0,
                carry: self,
            }
        }
    }
}
