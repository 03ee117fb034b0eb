//! Load named parameter scenarios from CSV or JSON

use super::{DeferralModality, InvestmentParameters, LoanParameters};
use csv::Reader;
use std::error::Error;
use std::fs::File;
use std::path::Path;

/// A parameter set with a label, as found in a scenario file
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scenario {
    pub name: String,
    pub params: InvestmentParameters,
}

/// Raw CSV row, rates given in percent as in the simulator's input form
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    name: String,
    investment_amount: f64,
    #[serde(default)]
    down_payment: f64,
    term_months: u32,
    interest_rate_pct: f64,
    insurance_rate_pct: f64,
    #[serde(default)]
    deferral: String,
    #[serde(default)]
    deferral_months: u32,
    #[serde(default)]
    fee_amount: f64,
    #[serde(default)]
    fee_financed: bool,
    rental_yield_pct: f64,
    #[serde(default)]
    entry_delay_months: u32,
    #[serde(default)]
    revaluation_rate_pct: f64,
    #[serde(default)]
    subscription_fee_pct: f64,
    marginal_tax_rate_pct: f64,
    #[serde(default)]
    foreign_allocation_pct: f64,
}

impl CsvRow {
    fn into_scenario(self) -> Result<Scenario, Box<dyn Error>> {
        let deferral: DeferralModality = self.deferral.parse()?;

        let params = InvestmentParameters {
            loan: LoanParameters {
                investment_amount: self.investment_amount,
                down_payment: self.down_payment,
                term_months: self.term_months,
                annual_rate: self.interest_rate_pct / 100.0,
                insurance_rate: self.insurance_rate_pct / 100.0,
                deferral,
                deferral_months: self.deferral_months,
                fee_amount: self.fee_amount,
                fee_financed: self.fee_financed,
            },
            rental_yield: self.rental_yield_pct / 100.0,
            entry_delay_months: self.entry_delay_months,
            revaluation_rate: self.revaluation_rate_pct / 100.0,
            subscription_fee_rate: self.subscription_fee_pct / 100.0,
            marginal_tax_rate: self.marginal_tax_rate_pct / 100.0,
            foreign_investment: self.foreign_allocation_pct > 0.0,
            foreign_allocation_pct: self.foreign_allocation_pct,
        };

        if let Err(e) = params.validate() {
            return Err(format!("scenario `{}`: {}", self.name, e).into());
        }

        Ok(Scenario {
            name: self.name,
            params,
        })
    }
}

/// Load all scenarios from a CSV file
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<Scenario>, Box<dyn Error>> {
    let file = File::open(path.as_ref())?;
    let scenarios = load_scenarios_from_reader(file)?;
    log::info!(
        "Loaded {} scenarios from {}",
        scenarios.len(),
        path.as_ref().display()
    );
    Ok(scenarios)
}

/// Load scenarios from any reader (e.g., string buffer, request body)
pub fn load_scenarios_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Scenario>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut scenarios = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        scenarios.push(row.into_scenario()?);
    }

    Ok(scenarios)
}

/// Load a single parameter set from a JSON file
pub fn load_parameters_json<P: AsRef<Path>>(path: P) -> Result<InvestmentParameters, Box<dyn Error>> {
    let file = File::open(path.as_ref())?;
    let params: InvestmentParameters = serde_json::from_reader(file)?;
    params.validate()?;
    log::debug!("Loaded parameters from {}", path.as_ref().display());
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
name,investment_amount,down_payment,term_months,interest_rate_pct,insurance_rate_pct,deferral,deferral_months,fee_amount,fee_financed,rental_yield_pct,entry_delay_months,revaluation_rate_pct,subscription_fee_pct,marginal_tax_rate_pct,foreign_allocation_pct
baseline,100000,0,300,4.96,0.10,none,0,2250,false,5.0,6,1.0,12.0,30,0
grace,100000,10000,240,4.50,0.10,Différé total,9,2250,true,5.5,6,1.0,10.0,41,50
";

    #[test]
    fn test_load_scenarios() {
        let scenarios = load_scenarios_from_reader(SAMPLE.as_bytes()).expect("Failed to load scenarios");
        assert_eq!(scenarios.len(), 2);

        let baseline = &scenarios[0];
        assert_eq!(baseline.name, "baseline");
        assert_eq!(baseline.params.loan.term_months, 300);
        assert_eq!(baseline.params.loan.deferral, DeferralModality::None);
        assert!((baseline.params.loan.annual_rate - 0.0496).abs() < 1e-12);
        assert!((baseline.params.loan.insurance_rate - 0.001).abs() < 1e-12);
        assert!((baseline.params.subscription_fee_rate - 0.12).abs() < 1e-12);
        assert!(!baseline.params.foreign_investment);

        let grace = &scenarios[1];
        assert_eq!(grace.params.loan.deferral, DeferralModality::Total);
        assert_eq!(grace.params.loan.deferral_months, 9);
        assert!(grace.params.loan.fee_financed);
        assert!(grace.params.foreign_investment);
        assert!((grace.params.marginal_tax_rate - 0.41).abs() < 1e-12);
    }

    #[test]
    fn test_load_bundled_files() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");

        let scenarios = load_scenarios(dir.join("scenarios.csv")).expect("Failed to load scenarios");
        assert_eq!(scenarios.len(), 5);
        assert_eq!(scenarios[3].name, "total_grace");

        let params = load_parameters_json(dir.join("params.json")).expect("Failed to load parameters");
        assert_eq!(params.loan.deferral, DeferralModality::Total);
        assert_eq!(params.loan.financed_principal(), 102_250.0);
    }

    #[test]
    fn test_invalid_scenario_reports_name() {
        let csv = "\
name,investment_amount,down_payment,term_months,interest_rate_pct,insurance_rate_pct,rental_yield_pct,marginal_tax_rate_pct
broken,50000,60000,240,4.0,0.1,5.0,30
";
        let err = load_scenarios_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert!(err.to_string().contains("down_payment"));
    }

    #[test]
    fn test_unknown_modality_rejected() {
        let csv = "\
name,investment_amount,term_months,interest_rate_pct,insurance_rate_pct,deferral,rental_yield_pct,marginal_tax_rate_pct
odd,50000,240,4.0,0.1,sometimes,5.0,30
";
        assert!(load_scenarios_from_reader(csv.as_bytes()).is_err());
    }
}
