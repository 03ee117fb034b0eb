//! Internal Rate of Return (IRR) of the investor's cash flows
//!
//! Used to rate an exit at a given year of the projection

use super::cashflows::ProjectionResult;

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;
const MIN_RATE: f64 = -0.99;
const MAX_RATE: f64 = 10.0;

/// Investor cash flows when selling at the end of `year`
///
/// t = 0 is the down payment, each following year the net effort is paid
/// (or received when negative), and the final year adds the resale value
/// minus the principal still owed.
pub fn exit_cash_flows(result: &ProjectionResult, year: u32) -> Option<Vec<f64>> {
    let exit = result.exit_point(year)?;

    let mut flows = Vec::with_capacity(year as usize + 1);
    flows.push(-result.down_payment);
    flows.extend(
        result
            .years
            .iter()
            .take(year as usize)
            .map(|r| -r.net_annual_effort),
    );
    if let Some(last) = flows.last_mut() {
        *last += exit.resale_value - exit.remaining_principal;
    }

    Some(flows)
}

/// Annual IRR of cash flows one year apart
///
/// Newton-Raphson on the rate, falling back to bisection when the
/// derivative vanishes or the iteration does not settle. `None` when the
/// flows never change sign.
pub fn calculate_irr(cashflows: &[f64]) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }
    if cashflows.iter().all(|cf| cf.abs() < TOLERANCE) {
        return Some(0.0);
    }

    let has_inflow = cashflows.iter().any(|&cf| cf > TOLERANCE);
    let has_outflow = cashflows.iter().any(|&cf| cf < -TOLERANCE);
    if !has_inflow || !has_outflow {
        return None;
    }

    let mut rate = 0.05;
    for _ in 0..MAX_ITERATIONS {
        let (npv, slope) = npv_and_derivative(cashflows, rate);
        if slope.abs() < 1e-20 {
            break;
        }

        let next = (rate - npv / slope).clamp(MIN_RATE, MAX_RATE);
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }

    bisect(cashflows)
}

fn npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    cashflows
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(value, slope), (t, &cf)| {
            let discount = (1.0 + rate).powi(t as i32);
            (
                value + cf / discount,
                slope - t as f64 * cf / (discount * (1.0 + rate)),
            )
        })
}

/// Rate by bisection over [MIN_RATE, MAX_RATE]
fn bisect(cashflows: &[f64]) -> Option<f64> {
    let (mut low, mut high) = (MIN_RATE, MAX_RATE);
    let mut npv_low = npv(cashflows, low);

    if npv_low * npv(cashflows, high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(cashflows, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}
