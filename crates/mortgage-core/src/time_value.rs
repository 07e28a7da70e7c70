use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::MortgageError;
use crate::types::{Money, Percent, Rate};
use crate::MortgageResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const PERIODS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Convert an annual nominal percent (4.5) into the monthly periodic rate (0.00375).
pub fn monthly_rate(annual_pct: Percent) -> Rate {
    annual_pct / PERCENT / PERIODS_PER_YEAR
}

/// Convert a monthly periodic rate back into an annual nominal percent.
pub fn annual_percent(monthly: Rate) -> Percent {
    monthly * PERIODS_PER_YEAR * PERCENT
}

/// (1 + rate)^-nper by repeated multiplication.
///
/// Shrinks toward zero for large rates and terms instead of overflowing.
pub fn discount_factor(rate: Rate, nper: u32) -> MortgageResult<Decimal> {
    if rate <= dec!(-1) {
        return Err(MortgageError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate must be greater than -100%".into(),
        });
    }
    let v = Decimal::ONE / (Decimal::ONE + rate);
    let mut factor = Decimal::ONE;
    for _ in 0..nper {
        factor = factor
            .checked_mul(v)
            .ok_or_else(|| MortgageError::computation("discount factor", "decimal overflow"))?;
    }
    Ok(factor)
}

/// Level payment that retires `balance` over `nper` periods at `rate`.
///
/// `M = P·r / (1 − (1+r)^−k)`, degrading to `P / k` at a zero rate.
pub fn annuity_payment(balance: Money, rate: Rate, nper: u32) -> MortgageResult<Money> {
    if nper == 0 {
        return Err(MortgageError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate < Decimal::ZERO {
        return Err(MortgageError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate must be non-negative".into(),
        });
    }

    let periods = Decimal::from(nper);
    if rate.is_zero() {
        return Ok(balance / periods);
    }

    let annuity_factor = Decimal::ONE - discount_factor(rate, nper)?;
    if annuity_factor.is_zero() {
        // Rate too small to register at 28 digits.
        return Ok(balance / periods);
    }

    balance
        .checked_mul(rate)
        .map(|v| v / annuity_factor)
        .ok_or_else(|| MortgageError::computation("annuity payment", "decimal overflow"))
}

/// Number of periods a fixed `payment` needs to clear `balance`, capped at `max_periods`.
///
/// Returns `None` when the payment does not cover the periodic interest or
/// the balance is still outstanding after `max_periods`.
pub fn periods_to_repay(
    balance: Money,
    rate: Rate,
    payment: Money,
    max_periods: u32,
) -> Option<u32> {
    if balance <= Decimal::ZERO {
        return Some(0);
    }
    if payment <= balance * rate {
        return None;
    }

    let mut remaining = balance;
    for period in 1..=max_periods {
        let interest = remaining * rate;
        remaining -= payment - interest;
        if remaining <= Decimal::ZERO {
            return Some(period);
        }
    }
    None
}

/// Periodic Internal Rate of Return using Newton-Raphson
pub fn irr(cash_flows: &[Money], guess: Rate) -> MortgageResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(MortgageError::InvalidInput {
            field: "cash_flows".into(),
            reason: "IRR requires at least 2 cash flows".into(),
        });
    }

    let mut rate = guess;

    for _ in 0..MAX_IRR_ITERATIONS {
        let v = Decimal::ONE / (Decimal::ONE + rate);
        let mut discount = Decimal::ONE;
        let mut npv_val = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;

        for (t, cf) in cash_flows.iter().enumerate() {
            if t > 0 {
                discount *= v;
                dnpv -= Decimal::from(t as u64) * cf * discount * v;
            }
            npv_val += cf * discount;
        }

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }
        if dnpv.is_zero() {
            break;
        }

        rate -= npv_val / dnpv;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(10.0) {
            rate = dec!(10.0);
        }
    }

    Err(MortgageError::computation(
        "IRR",
        format!("did not converge after {MAX_IRR_ITERATIONS} iterations"),
    ))
}
