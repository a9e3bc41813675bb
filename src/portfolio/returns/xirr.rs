//! Internal rate of return for irregularly dated cash flows, solved
//! numerically: Newton–Raphson first, bisection as the fallback when the
//! derivative misbehaves. Root finding runs in `f64`; the flows only enter
//! through the net-present-value sum, so decimal exactness buys nothing
//! here.

use log::debug;
use num_traits::ToPrimitive;

use super::returns_model::CashFlow;

const DAYS_PER_YEAR: f64 = 365.0;
const INITIAL_GUESS: f64 = 0.10;
const RATE_MIN: f64 = -0.99;
const RATE_MAX: f64 = 10.0;
const DERIVATIVE_STEP: f64 = 1e-4;
const CONVERGENCE_TOLERANCE: f64 = 1e-6;
const MAX_ITERATIONS: usize = 100;

/// Annualized rate as a fraction (0.10 = 10% p.a.), or `None` when the
/// flows cannot produce a root or neither method converges.
pub fn solve(cash_flows: &[CashFlow]) -> Option<f64> {
    if cash_flows.len() < 2 {
        return None;
    }

    let has_inflow = cash_flows.iter().any(|f| f.amount.is_sign_positive() && !f.amount.is_zero());
    let has_outflow = cash_flows.iter().any(|f| f.amount.is_sign_negative());
    if !has_inflow || !has_outflow {
        // No sign change, no root.
        return None;
    }

    let mut flows: Vec<(f64, f64)> = {
        let first_date = cash_flows.iter().map(|f| f.date).min()?;
        cash_flows
            .iter()
            .map(|f| {
                let years = (f.date - first_date).num_days() as f64 / DAYS_PER_YEAR;
                (years, f.amount.to_f64().unwrap_or_default())
            })
            .collect()
    };
    flows.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    newton(&flows).or_else(|| {
        debug!("Newton-Raphson did not converge, falling back to bisection");
        bisection(&flows)
    })
}

fn net_present_value(flows: &[(f64, f64)], rate: f64) -> f64 {
    flows
        .iter()
        .map(|&(years, amount)| amount / (1.0 + rate).powf(years))
        .sum()
}

fn newton(flows: &[(f64, f64)]) -> Option<f64> {
    let mut rate = INITIAL_GUESS;

    for _ in 0..MAX_ITERATIONS {
        let value = net_present_value(flows, rate);
        let derivative = (net_present_value(flows, rate + DERIVATIVE_STEP)
            - net_present_value(flows, rate - DERIVATIVE_STEP))
            / (2.0 * DERIVATIVE_STEP);

        if !derivative.is_finite() || derivative.abs() < f64::EPSILON {
            return None;
        }

        let next = (rate - value / derivative).clamp(RATE_MIN, RATE_MAX);
        if !next.is_finite() {
            return None;
        }

        if (next - rate).abs() < CONVERGENCE_TOLERANCE {
            return Some(next);
        }
        rate = next;
    }

    None
}

fn bisection(flows: &[(f64, f64)]) -> Option<f64> {
    let mut low = RATE_MIN;
    let mut high = RATE_MAX;

    let mut value_low = net_present_value(flows, low);
    let value_high = net_present_value(flows, high);
    if value_low * value_high > 0.0 {
        // f does not change sign over the bracket.
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let value_mid = net_present_value(flows, mid);

        if (high - low).abs() < CONVERGENCE_TOLERANCE || value_mid == 0.0 {
            return Some(mid);
        }

        if value_low * value_mid < 0.0 {
            high = mid;
        } else {
            low = mid;
            value_low = value_mid;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn one_year_ten_percent() {
        let flows = vec![
            CashFlow::new(date(2024, 1, 1), dec!(-1000)),
            CashFlow::new(date(2024, 12, 31), dec!(1100)),
        ];
        let rate = solve(&flows).unwrap();
        assert!((rate - 0.10).abs() < 1e-4, "rate was {}", rate);
    }

    #[test]
    fn all_positive_flows_have_no_root() {
        let flows = vec![
            CashFlow::new(date(2024, 1, 1), dec!(1000)),
            CashFlow::new(date(2024, 6, 1), dec!(500)),
        ];
        assert!(solve(&flows).is_none());
    }

    #[test]
    fn all_negative_flows_have_no_root() {
        let flows = vec![
            CashFlow::new(date(2024, 1, 1), dec!(-1000)),
            CashFlow::new(date(2024, 6, 1), dec!(-500)),
        ];
        assert!(solve(&flows).is_none());
    }

    #[test]
    fn single_flow_is_undefined() {
        let flows = vec![CashFlow::new(date(2024, 1, 1), dec!(-1000))];
        assert!(solve(&flows).is_none());
    }

    #[test]
    fn loss_resolves_to_negative_rate() {
        let flows = vec![
            CashFlow::new(date(2023, 1, 1), dec!(-1000)),
            CashFlow::new(date(2023, 12, 31), dec!(800)),
        ];
        let rate = solve(&flows).unwrap();
        assert!((rate - (-0.20)).abs() < 1e-3, "rate was {}", rate);
    }

    #[test]
    fn multi_flow_series_converges() {
        // Two staggered investments, dividends along the way, final sale.
        let flows = vec![
            CashFlow::new(date(2022, 1, 10), dec!(-5000)),
            CashFlow::new(date(2022, 7, 15), dec!(-2500)),
            CashFlow::new(date(2022, 12, 20), dec!(120)),
            CashFlow::new(date(2023, 12, 20), dec!(130)),
            CashFlow::new(date(2024, 6, 28), dec!(9100)),
        ];
        let rate = solve(&flows).unwrap();
        // f(rate) must be ~0 at the solution.
        let first = date(2022, 1, 10);
        let npv: f64 = flows
            .iter()
            .map(|f| {
                let t = (f.date - first).num_days() as f64 / 365.0;
                num_traits::ToPrimitive::to_f64(&f.amount).unwrap() / (1.0 + rate).powf(t)
            })
            .sum();
        assert!(npv.abs() < 1.0, "npv at solution was {}", npv);
        assert!(rate > 0.0 && rate < 0.25, "rate was {}", rate);
    }

    #[test]
    fn extreme_short_horizon_gain_saturates_at_the_rate_ceiling() {
        // +50% in a week annualizes far beyond the search range; the clamp
        // pins the iteration at the upper bound instead of diverging.
        let flows = vec![
            CashFlow::new(date(2024, 1, 1), dec!(-100)),
            CashFlow::new(date(2024, 1, 8), dec!(150)),
        ];
        let rate = solve(&flows).unwrap();
        assert!((rate - 10.0).abs() < 1e-6, "rate was {}", rate);
    }

    #[test]
    fn deep_loss_resolves_near_the_lower_bound() {
        // Newton's first step from 0.10 lands on the lower clamp; the
        // iteration has to climb back to a root close to -1.
        let flows = vec![
            CashFlow::new(date(2022, 1, 1), dec!(-1000)),
            CashFlow::new(date(2023, 1, 1), dec!(30)),
            CashFlow::new(date(2024, 1, 1), dec!(20)),
        ];
        let rate = solve(&flows).unwrap();
        // f must vanish at the reported rate.
        let npv = -1000.0 + 30.0 / (1.0 + rate) + 20.0 / (1.0 + rate).powf(2.0);
        assert!(npv.abs() < 0.5, "npv at solution was {}", npv);
        assert!(rate < 0.0, "rate was {}", rate);
    }
}
