use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::engine::AmortizationEntry;
use crate::loan::MONTHS_PER_YEAR;
use crate::types::Money;

/// Sums over one loan year (12 periods, fewer for a final partial year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyData {
    /// Loan year, starting at 1.
    pub year: u32,
    /// Scheduled payments, excluding overpayments.
    pub payment: Money,
    pub overpayment: Money,
    /// Scheduled principal, excluding overpayments.
    pub principal: Money,
    pub interest: Money,
    /// Balance after the last period of the year.
    pub balance: Money,
}

/// Yearly buckets plus ledger totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub yearly_data: Vec<YearlyData>,
    pub total_scheduled_payment: Money,
    pub total_overpayment: Money,
    /// Principal repaid, overpayments included.
    pub total_principal: Money,
    pub total_interest: Money,
    /// Principal plus interest, overpayments included. Fees are not part of the ledger.
    pub total_payment: Money,
}

/// Roll a ledger into yearly buckets and totals.
pub fn aggregate(entries: &[AmortizationEntry]) -> Aggregation {
    let yearly_data: Vec<YearlyData> = entries
        .chunks(MONTHS_PER_YEAR as usize)
        .enumerate()
        .map(|(i, bucket)| YearlyData {
            year: i as u32 + 1,
            payment: bucket.iter().map(|e| e.payment_amount).sum(),
            overpayment: bucket.iter().map(|e| e.overpayment_applied).sum(),
            principal: bucket.iter().map(|e| e.principal_portion).sum(),
            interest: bucket.iter().map(|e| e.interest_portion).sum(),
            balance: bucket
                .last()
                .map(|e| e.remaining_balance)
                .unwrap_or(Decimal::ZERO),
        })
        .collect();

    let total_scheduled_payment: Money = yearly_data.iter().map(|y| y.payment).sum();
    let total_overpayment: Money = yearly_data.iter().map(|y| y.overpayment).sum();
    let scheduled_principal: Money = yearly_data.iter().map(|y| y.principal).sum();
    let total_interest: Money = yearly_data.iter().map(|y| y.interest).sum();
    let total_principal = scheduled_principal + total_overpayment;

    Aggregation {
        yearly_data,
        total_scheduled_payment,
        total_overpayment,
        total_principal,
        total_interest,
        total_payment: total_principal + total_interest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(period: u32, principal: Money, interest: Money, over: Money, balance: Money) -> AmortizationEntry {
        AmortizationEntry {
            period,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            payment_amount: principal + interest,
            principal_portion: principal,
            interest_portion: interest,
            overpayment_applied: over,
            remaining_balance: balance,
            interest_rate: dec!(5),
        }
    }

    #[test]
    fn test_empty_ledger_aggregates_to_zero() {
        let agg = aggregate(&[]);
        assert_eq!(agg, Aggregation::default());
    }

    #[test]
    fn test_partial_final_year() {
        let entries: Vec<_> = (1..=14)
            .map(|p| entry(p, dec!(100), dec!(10), Decimal::ZERO, dec!(1400) - dec!(100) * Decimal::from(p)))
            .collect();
        let agg = aggregate(&entries);
        assert_eq!(agg.yearly_data.len(), 2);
        assert_eq!(agg.yearly_data[0].principal, dec!(1200));
        assert_eq!(agg.yearly_data[0].balance, dec!(200));
        assert_eq!(agg.yearly_data[1].year, 2);
        assert_eq!(agg.yearly_data[1].interest, dec!(20));
        assert_eq!(agg.yearly_data[1].balance, Decimal::ZERO);
        assert_eq!(agg.total_payment, dec!(1540));
    }

    #[test]
    fn test_overpayments_count_toward_principal() {
        let entries = vec![
            entry(1, dec!(100), dec!(10), dec!(500), dec!(400)),
            entry(2, dec!(100), dec!(5), Decimal::ZERO, dec!(300)),
        ];
        let agg = aggregate(&entries);
        assert_eq!(agg.total_overpayment, dec!(500));
        assert_eq!(agg.total_principal, dec!(700));
        assert_eq!(agg.total_scheduled_payment, dec!(215));
        assert_eq!(agg.total_payment, dec!(715));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let entries = vec![entry(1, dec!(100), dec!(10), Decimal::ZERO, dec!(0))];
        assert_eq!(aggregate(&entries), aggregate(&entries));
    }
}
