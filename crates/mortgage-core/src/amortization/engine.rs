//! Month-by-month ledger for one loan.
//!
//! The standard payment is fixed until something it depends on changes: a new
//! rate period starts, or a reduce-payment overpayment lowers the balance it
//! was computed from. Reduce-term overpayments keep the payment and shorten
//! the effective remaining term instead, so a later rate reset re-amortizes
//! over the shortened term rather than stretching back to the nominal end.

use chrono::{Months, NaiveDate};
use log::{debug, trace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::loan::{rate_for_period, LoanDetails, OverpaymentEffect};
use crate::time_value::{annuity_payment, monthly_rate, periods_to_repay};
use crate::types::{Money, Percent};
use crate::validation::validate;
use crate::MortgageResult;

/// Balances closer to zero than this are treated as fully repaid.
pub const BALANCE_EPSILON: Decimal = dec!(0.01);

/// One payment period of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// Payment number, starting at 1.
    pub period: u32,
    /// Due date: start date plus `period` calendar months.
    pub date: NaiveDate,
    /// Scheduled payment (principal + interest), excluding overpayments.
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub overpayment_applied: Money,
    pub remaining_balance: Money,
    /// Annual percent in force for the period.
    pub interest_rate: Percent,
}

/// Build the amortization ledger for `loan`.
///
/// The loan is validated first; any violation blocks the calculation. The
/// sequence ends at the nominal term or at the period the balance reaches
/// zero, whichever comes first.
pub fn amortize(loan: &LoanDetails) -> MortgageResult<Vec<AmortizationEntry>> {
    validate(loan).into_result()?;
    build_schedule(loan)
}

struct LedgerState {
    balance: Money,
    payment: Money,
    active_rate: Option<Percent>,
    /// Periods left to amortize over, counting the current one.
    remaining_term: u32,
    recompute: bool,
}

/// Ledger for a loan that already passed validation.
pub(crate) fn build_schedule(loan: &LoanDetails) -> MortgageResult<Vec<AmortizationEntry>> {
    let total_periods = loan.total_periods();
    let rate_periods = loan.ordered_rate_periods();
    let mut entries = Vec::with_capacity(total_periods as usize);

    let mut state = LedgerState {
        balance: loan.principal,
        payment: Decimal::ZERO,
        active_rate: None,
        remaining_term: total_periods,
        recompute: true,
    };

    for period in 1..=total_periods {
        if state.balance <= Decimal::ZERO {
            break;
        }

        let annual_rate = rate_for_period(&rate_periods, period).ok_or_else(|| {
            MortgageError::computation("rate lookup", format!("no rate period covers period {period}"))
        })?;
        let rate = monthly_rate(annual_rate);

        if state.active_rate != Some(annual_rate) {
            if let Some(previous) = state.active_rate {
                debug!("period {period}: rate reset {previous}% -> {annual_rate}%");
            }
            state.active_rate = Some(annual_rate);
            state.recompute = true;
        }

        if state.recompute {
            if state.remaining_term == 0 {
                return Err(MortgageError::computation(
                    "payment recompute",
                    format!(
                        "no remaining term at period {period} with {} outstanding",
                        state.balance
                    ),
                ));
            }
            state.payment = annuity_payment(state.balance, rate, state.remaining_term)?;
            state.recompute = false;
            debug!(
                "period {period}: standard payment {} over {} periods",
                state.payment, state.remaining_term
            );
        }

        let interest = state.balance * rate;
        let mut principal = state.payment - interest;
        if principal < Decimal::ZERO {
            return Err(MortgageError::computation(
                "amortization",
                format!("payment {} does not cover interest {interest} at period {period}", state.payment),
            ));
        }
        let mut payment_amount = state.payment;
        // The last nominal period settles whatever the level payment left.
        if principal >= state.balance || period == total_periods {
            principal = state.balance;
            payment_amount = principal + interest;
        }
        state.balance -= principal;

        let mut overpayment = Decimal::ZERO;
        let mut shorten_term = false;
        let mut lower_payment = false;
        for plan in loan.overpayment_plans.iter().filter(|p| p.fires_at(period)) {
            if state.balance <= Decimal::ZERO {
                break;
            }
            let applied = plan.amount.min(state.balance);
            state.balance -= applied;
            overpayment += applied;
            match plan.effect {
                OverpaymentEffect::ReduceTerm => shorten_term = true,
                OverpaymentEffect::ReducePayment => lower_payment = true,
            }
        }

        // Fold sub-cent residue into this period's principal.
        if !state.balance.is_zero() && state.balance.abs() < BALANCE_EPSILON {
            principal += state.balance;
            payment_amount += state.balance;
            state.balance = Decimal::ZERO;
        }

        state.remaining_term = state.remaining_term.saturating_sub(1);
        if state.balance > Decimal::ZERO {
            let nominal_left = total_periods - period;
            if shorten_term {
                state.remaining_term =
                    periods_to_repay(state.balance, rate, state.payment, nominal_left)
                        .unwrap_or(nominal_left);
                debug!(
                    "period {period}: overpayment {overpayment} shortens term to {} periods",
                    state.remaining_term
                );
            }
            if lower_payment {
                state.recompute = true;
            }
        }

        let date = payment_date(loan.start_date, period)?;
        trace!(
            "period {period}: paid {payment_amount} (principal {principal}, interest {interest}), \
             overpaid {overpayment}, balance {}",
            state.balance
        );

        entries.push(AmortizationEntry {
            period,
            date,
            payment_amount,
            principal_portion: principal,
            interest_portion: interest,
            overpayment_applied: overpayment,
            remaining_balance: state.balance,
            interest_rate: annual_rate,
        });

        if state.balance.is_zero() && period < total_periods {
            debug!("loan repaid at period {period} of {total_periods}");
        }
    }

    Ok(entries)
}

fn payment_date(start: NaiveDate, period: u32) -> MortgageResult<NaiveDate> {
    start
        .checked_add_months(Months::new(period))
        .ok_or_else(|| MortgageError::DateError(format!("payment date overflow at period {period}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{InterestRatePeriod, OverpaymentPlan};
    use rust_decimal_macros::dec;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    fn standard_loan() -> LoanDetails {
        LoanDetails::fixed_rate(dec!(250000), dec!(4.5), 30, start())
    }

    // -----------------------------------------------------------------------
    // 1. Fixed-rate ledger has the nominal length and a constant payment
    // -----------------------------------------------------------------------
    #[test]
    fn test_fixed_rate_full_term() {
        let entries = amortize(&standard_loan()).unwrap();
        assert_eq!(entries.len(), 360);
        let first = entries[0].payment_amount;
        assert!((first - dec!(1266.71)).abs() < dec!(0.01), "got {first}");
        for e in &entries[..359] {
            assert_eq!(e.payment_amount, first, "period {}", e.period);
        }
        assert_eq!(entries[359].remaining_balance, Decimal::ZERO);
    }

    // -----------------------------------------------------------------------
    // 2. First-period split
    // -----------------------------------------------------------------------
    #[test]
    fn test_first_period_interest_split() {
        let entries = amortize(&standard_loan()).unwrap();
        // 250000 * 0.045 / 12 = 937.50
        assert_eq!(entries[0].interest_portion, dec!(937.5));
        assert_eq!(
            entries[0].principal_portion + entries[0].interest_portion,
            entries[0].payment_amount
        );
    }

    // -----------------------------------------------------------------------
    // 3. Dates clamp to month end
    // -----------------------------------------------------------------------
    #[test]
    fn test_payment_dates_follow_calendar_months() {
        let entries = amortize(&standard_loan()).unwrap();
        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(entries[1].date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(entries[11].date, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }

    // -----------------------------------------------------------------------
    // 4. Rate change recomputes the payment from that period on
    // -----------------------------------------------------------------------
    #[test]
    fn test_rate_change_recomputes_payment() {
        let loan = LoanDetails::fixed_rate(dec!(200000), dec!(3), 25, start())
            .with_rate_change(61, dec!(5));
        let entries = amortize(&loan).unwrap();
        assert_eq!(entries.len(), 300);
        assert_eq!(entries[59].interest_rate, dec!(3));
        assert_eq!(entries[60].interest_rate, dec!(5));
        assert!(entries[60].payment_amount > entries[59].payment_amount);

        let expected = annuity_payment(entries[59].remaining_balance, monthly_rate(dec!(5)), 240).unwrap();
        assert_eq!(entries[60].payment_amount, expected);
        assert_eq!(entries.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    // -----------------------------------------------------------------------
    // 5. Repeating the same rate does not trigger a recompute
    // -----------------------------------------------------------------------
    #[test]
    fn test_same_rate_period_keeps_payment() {
        let loan = LoanDetails::fixed_rate(dec!(100000), dec!(4), 10, start())
            .with_rate_change(24, dec!(4));
        let entries = amortize(&loan).unwrap();
        assert_eq!(entries[22].payment_amount, entries[23].payment_amount);
    }

    // -----------------------------------------------------------------------
    // 6. Reduce-term overpayment shortens the ledger, keeps the payment
    // -----------------------------------------------------------------------
    #[test]
    fn test_reduce_term_overpayment() {
        let base = amortize(&standard_loan()).unwrap();
        let loan = standard_loan().with_overpayment(OverpaymentPlan::one_time(
            dec!(30000),
            12,
            OverpaymentEffect::ReduceTerm,
        ));
        let entries = amortize(&loan).unwrap();
        assert!(entries.len() < base.len());
        assert_eq!(entries[11].overpayment_applied, dec!(30000));
        let payment = base[0].payment_amount;
        for e in &entries[..entries.len() - 1] {
            assert_eq!(e.payment_amount, payment, "period {}", e.period);
        }
    }

    // -----------------------------------------------------------------------
    // 7. Reduce-payment overpayment keeps the term, lowers the payment
    // -----------------------------------------------------------------------
    #[test]
    fn test_reduce_payment_overpayment() {
        let base = amortize(&standard_loan()).unwrap();
        let loan = standard_loan().with_overpayment(OverpaymentPlan::one_time(
            dec!(30000),
            12,
            OverpaymentEffect::ReducePayment,
        ));
        let entries = amortize(&loan).unwrap();
        assert_eq!(entries.len(), 360);
        assert_eq!(entries[11].payment_amount, base[11].payment_amount);
        assert!(entries[12].payment_amount < base[12].payment_amount);
    }

    // -----------------------------------------------------------------------
    // 8. Overpayment larger than the balance is clamped to exactly zero
    // -----------------------------------------------------------------------
    #[test]
    fn test_overpayment_clamped_to_balance() {
        let loan = LoanDetails::fixed_rate(dec!(50000), dec!(5), 10, start()).with_overpayment(
            OverpaymentPlan::one_time(dec!(1000000), 6, OverpaymentEffect::ReduceTerm),
        );
        let entries = amortize(&loan).unwrap();
        assert_eq!(entries.len(), 6);
        let last = entries.last().unwrap();
        assert_eq!(last.remaining_balance, Decimal::ZERO);
        assert_eq!(last.overpayment_applied, entries[4].remaining_balance - last.principal_portion);
    }

    // -----------------------------------------------------------------------
    // 9. Rate reset after a reduce-term overpayment keeps the shorter term
    // -----------------------------------------------------------------------
    #[test]
    fn test_rate_reset_after_reduce_term_keeps_shortened_term() {
        let loan = LoanDetails::fixed_rate(dec!(200000), dec!(4), 30, start())
            .with_overpayment(OverpaymentPlan::one_time(
                dec!(50000),
                12,
                OverpaymentEffect::ReduceTerm,
            ))
            .with_rate_change(60, dec!(6));
        let shortened = amortize(&LoanDetails {
            interest_rate_periods: vec![InterestRatePeriod::new(0, dec!(4))],
            ..loan.clone()
        })
        .unwrap();
        let entries = amortize(&loan).unwrap();
        assert!(shortened.len() < 360);
        assert_eq!(entries.len(), shortened.len());
    }

    // -----------------------------------------------------------------------
    // 10. Sub-cent residue left by an overpayment is folded into principal
    // -----------------------------------------------------------------------
    #[test]
    fn test_sub_cent_residue_folded_into_principal() {
        let plain = amortize(&standard_loan()).unwrap();
        let loan = standard_loan().with_overpayment(OverpaymentPlan::one_time(
            plain[5].remaining_balance - dec!(0.004),
            6,
            OverpaymentEffect::ReduceTerm,
        ));
        let entries = amortize(&loan).unwrap();
        assert_eq!(entries.len(), 6);
        let last = entries.last().unwrap();
        assert_eq!(last.remaining_balance, Decimal::ZERO);
        assert_eq!(last.principal_portion, plain[5].principal_portion + dec!(0.004));
        assert_eq!(last.payment_amount, plain[5].payment_amount + dec!(0.004));
    }

    // -----------------------------------------------------------------------
    // 11. Recurring reduce-payment overpayments can still retire the loan early
    // -----------------------------------------------------------------------
    #[test]
    fn test_recurring_reduce_payment_pays_off_early() {
        let loan = standard_loan().with_overpayment(OverpaymentPlan::monthly(
            dec!(500),
            1,
            None,
            OverpaymentEffect::ReducePayment,
        ));
        let entries = amortize(&loan).unwrap();
        assert!(entries.len() < 360, "got {}", entries.len());
        for pair in entries.windows(2) {
            assert!(pair[1].payment_amount <= pair[0].payment_amount, "period {}", pair[1].period);
        }
        let last = entries.last().unwrap();
        assert_eq!(last.remaining_balance, Decimal::ZERO);
        assert!(last.overpayment_applied < dec!(500));
    }

    // -----------------------------------------------------------------------
    // 12. Interest-only level payment still clears the balance at the term end
    // -----------------------------------------------------------------------
    #[test]
    fn test_extreme_rate_settles_in_final_period() {
        let loan = LoanDetails::fixed_rate(dec!(100000), dec!(300), 30, start());
        let entries = amortize(&loan).unwrap();
        assert_eq!(entries.len(), 360);
        let last = entries.last().unwrap();
        assert_eq!(last.remaining_balance, Decimal::ZERO);
        assert!(last.payment_amount > entries[0].payment_amount);
    }

    // -----------------------------------------------------------------------
    // 13. Zero rate is linear amortization
    // -----------------------------------------------------------------------
    #[test]
    fn test_zero_rate_linear() {
        let loan = LoanDetails::fixed_rate(dec!(120000), Decimal::ZERO, 10, start());
        let entries = amortize(&loan).unwrap();
        assert_eq!(entries.len(), 120);
        assert!(entries.iter().all(|e| e.payment_amount == dec!(1000)));
        assert!(entries.iter().all(|e| e.interest_portion.is_zero()));
    }

    // -----------------------------------------------------------------------
    // 14. Invalid input never reaches the ledger
    // -----------------------------------------------------------------------
    #[test]
    fn test_invalid_loan_blocked() {
        let mut loan = standard_loan();
        loan.principal = Decimal::ZERO;
        let err = amortize(&loan).unwrap_err();
        assert!(err.is_validation_failure());
    }
}
