use chrono::NaiveDate;
use mortgage_core::amortization::{aggregate, amortize, analyze_loan, calculate};
use mortgage_core::loan::{
    AdditionalCosts, LoanDetails, OverpaymentEffect, OverpaymentPlan,
};
use mortgage_core::validation::{validate, Violation};
use mortgage_core::MortgageError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn jan_2024() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn close_to(actual: Decimal, expected: Decimal, tolerance: Decimal) -> bool {
    (actual - expected).abs() <= tolerance
}

// ===========================================================================
// Reference payments
// ===========================================================================

#[test]
fn test_thirty_year_at_four_and_a_half() {
    let loan = LoanDetails::fixed_rate(dec!(250000), dec!(4.5), 30, jan_2024());
    let result = calculate(&loan).unwrap();
    assert!(
        close_to(result.monthly_payment, dec!(1266.71), dec!(0.005)),
        "got {}",
        result.monthly_payment
    );
    assert_eq!(result.number_of_payments, 360);
}

#[test]
fn test_fifteen_year_at_three_and_a_half() {
    let loan = LoanDetails::fixed_rate(dec!(200000), dec!(3.5), 15, jan_2024());
    let result = calculate(&loan).unwrap();
    assert!(
        close_to(result.monthly_payment, dec!(1429.77), dec!(0.005)),
        "got {}",
        result.monthly_payment
    );
}

#[test]
fn test_zero_rate_is_linear() {
    let loan = LoanDetails::fixed_rate(dec!(120000), Decimal::ZERO, 10, jan_2024());
    let result = calculate(&loan).unwrap();
    assert_eq!(result.monthly_payment, dec!(1000));
    assert_eq!(result.total_interest, Decimal::ZERO);
    assert_eq!(result.total_payment, dec!(120000));
    assert_eq!(result.yearly_data.len(), 10);
}

// ===========================================================================
// Ledger invariants
// ===========================================================================

fn busy_loan() -> LoanDetails {
    LoanDetails::fixed_rate(dec!(320000), dec!(3.9), 30, jan_2024())
        .with_rate_change(60, dec!(5.4))
        .with_rate_change(120, dec!(4.1))
        .with_overpayment(OverpaymentPlan::monthly(
            dec!(150),
            1,
            Some(48),
            OverpaymentEffect::ReduceTerm,
        ))
        .with_overpayment(OverpaymentPlan::annual(
            dec!(5000),
            12,
            None,
            OverpaymentEffect::ReducePayment,
        ))
        .with_additional_costs(AdditionalCosts {
            one_time: dec!(1250),
            monthly: dec!(10),
        })
}

#[test]
fn test_totals_identity_holds() {
    let loan = busy_loan();
    let result = calculate(&loan).unwrap();
    let expected = result.total_interest + loan.principal + result.total_fees;
    assert!(
        close_to(expected, result.total_payment, dec!(0.01)),
        "{expected} vs {}",
        result.total_payment
    );
    assert!(close_to(result.total_principal, loan.principal, dec!(0.01)));
}

#[test]
fn test_balance_never_increases_and_ends_at_zero() {
    let entries = amortize(&busy_loan()).unwrap();
    let mut previous = dec!(320000);
    for e in &entries {
        assert!(e.remaining_balance >= Decimal::ZERO, "period {}", e.period);
        assert!(e.remaining_balance <= previous, "period {}", e.period);
        previous = e.remaining_balance;
    }
    assert_eq!(entries.last().unwrap().remaining_balance, Decimal::ZERO);
}

#[test]
fn test_yearly_buckets_match_ledger_totals() {
    let loan = busy_loan();
    let result = calculate(&loan).unwrap();
    let yearly_interest: Decimal = result.yearly_data.iter().map(|y| y.interest).sum();
    let yearly_over: Decimal = result.yearly_data.iter().map(|y| y.overpayment).sum();
    assert_eq!(yearly_interest, result.total_interest);
    assert_eq!(yearly_over, result.total_overpayment);
    assert_eq!(
        result.yearly_data.len(),
        (result.number_of_payments as usize).div_ceil(12)
    );
    assert_eq!(aggregate(&result.amortization_schedule).yearly_data, result.yearly_data);
}

#[test]
fn test_calculation_is_idempotent() {
    let loan = busy_loan();
    assert_eq!(calculate(&loan).unwrap(), calculate(&loan).unwrap());
}

#[test]
fn test_input_left_untouched() {
    let mut loan = busy_loan();
    loan.interest_rate_periods.reverse();
    let snapshot = loan.clone();
    let _ = calculate(&loan).unwrap();
    assert_eq!(loan, snapshot);
}

// ===========================================================================
// Overpayments
// ===========================================================================

#[test]
fn test_reduce_term_shortens_loan() {
    let base = LoanDetails::fixed_rate(dec!(250000), dec!(4.5), 30, jan_2024());
    let loan = base.clone().with_overpayment(OverpaymentPlan::monthly(
        dec!(300),
        1,
        None,
        OverpaymentEffect::ReduceTerm,
    ));
    let result = calculate(&loan).unwrap();
    let baseline = calculate(&base).unwrap();
    assert!(result.number_of_payments < 360);
    assert!(result.total_interest < baseline.total_interest);
    let savings = result.savings.unwrap();
    assert_eq!(savings.actual_term_months, result.number_of_payments);
    assert_eq!(savings.baseline_total_interest, baseline.total_interest);
}

#[test]
fn test_reduce_payment_keeps_term() {
    let loan = LoanDetails::fixed_rate(dec!(250000), dec!(4.5), 30, jan_2024()).with_overpayment(
        OverpaymentPlan::annual(dec!(4000), 12, Some(120), OverpaymentEffect::ReducePayment),
    );
    let result = calculate(&loan).unwrap();
    assert_eq!(result.number_of_payments, 360);
    let schedule = &result.amortization_schedule;
    assert!(schedule[12].payment_amount < schedule[11].payment_amount);
    assert!(schedule[24].payment_amount < schedule[23].payment_amount);
    assert_eq!(schedule[13].payment_amount, schedule[12].payment_amount);
}

#[test]
fn test_oversized_overpayment_pays_off_exactly() {
    let loan = LoanDetails::fixed_rate(dec!(90000), dec!(6), 20, jan_2024()).with_overpayment(
        OverpaymentPlan::one_time(dec!(500000), 3, OverpaymentEffect::ReducePayment),
    );
    let result = calculate(&loan).unwrap();
    assert_eq!(result.number_of_payments, 3);
    let last = result.amortization_schedule.last().unwrap();
    assert_eq!(last.remaining_balance, Decimal::ZERO);
    assert!(last.overpayment_applied < dec!(500000));
    assert_eq!(result.payoff_date, NaiveDate::from_ymd_opt(2024, 4, 1));
}

#[test]
fn test_overpayment_after_payoff_warns() {
    let loan = LoanDetails::fixed_rate(dec!(20000), dec!(5), 2, jan_2024()).with_overpayment(
        OverpaymentPlan::one_time(dec!(1000), 40, OverpaymentEffect::ReduceTerm),
    );
    let output = analyze_loan(&loan).unwrap();
    assert_eq!(output.result.total_overpayment, Decimal::ZERO);
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.metadata.precision, "rust_decimal_128bit");
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_validation_blocks_calculation() {
    let mut loan = LoanDetails::fixed_rate(Decimal::ZERO, dec!(-1), 0, jan_2024());
    loan.additional_costs = Some(AdditionalCosts {
        one_time: dec!(-5),
        monthly: Decimal::ZERO,
    });

    let outcome = validate(&loan);
    assert_eq!(
        outcome.violations,
        vec![
            Violation::NonPositivePrincipal {
                principal: Decimal::ZERO
            },
            Violation::NegativeInterestRate {
                index: 0,
                interest_rate: dec!(-1)
            },
            Violation::NonPositiveTerm,
            Violation::NegativeFee {
                field: "one_time".into(),
                amount: dec!(-5)
            },
        ]
    );

    match calculate(&loan) {
        Err(MortgageError::Validation(violations)) => assert_eq!(violations.len(), 4),
        other => panic!("expected validation failure, got {other:?}"),
    }
}

// ===========================================================================
// Serialization
// ===========================================================================

#[test]
fn test_loan_from_json_input() {
    let json = r#"{
        "principal": "250000",
        "interest_rate_periods": [
            { "start_month": 0, "interest_rate": "4.5" }
        ],
        "loan_term_years": 30,
        "overpayment_plans": [
            {
                "amount": "10000",
                "start_month": 12,
                "is_recurring": false,
                "frequency": "one_time",
                "effect": "reduceTerm"
            }
        ],
        "start_date": "2024-01-01",
        "currency": "GBP"
    }"#;
    let loan: LoanDetails = serde_json::from_str(json).unwrap();
    let result = calculate(&loan).unwrap();
    assert!(result.number_of_payments < 360);
    assert_eq!(result.total_overpayment, dec!(10000));

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["currency"], "GBP");
    assert!(value["monthly_payment"].is_string());
}
