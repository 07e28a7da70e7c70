//! Loan definition: rate periods, overpayment plans and fees.
//!
//! Every type here is an immutable value object. Helpers that "modify" a loan
//! consume it and return a new value, so a caller's snapshot can never be
//! changed by a calculation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Currency, Money, Percent};

/// Months in a loan year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// A span of periods sharing one annual interest rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestRatePeriod {
    /// First payment period the rate applies to (0 = from the start).
    pub start_month: u32,
    /// Annual nominal rate in percent (4.5 = 4.5%).
    pub interest_rate: Percent,
}

impl InterestRatePeriod {
    pub fn new(start_month: u32, interest_rate: Percent) -> Self {
        Self {
            start_month,
            interest_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpaymentFrequency {
    #[serde(alias = "one-time")]
    OneTime,
    Monthly,
    Annual,
}

/// What the engine does with the standard payment after an overpayment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpaymentEffect {
    /// Keep the payment, finish earlier.
    #[serde(alias = "reduceTerm")]
    ReduceTerm,
    /// Keep the end date, lower the payment.
    #[serde(alias = "reducePayment")]
    ReducePayment,
}

/// Extra principal paid on top of the scheduled payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpaymentPlan {
    pub amount: Money,
    /// First period the plan fires (1-indexed).
    pub start_month: u32,
    /// Last period the plan may fire, inclusive. `None` runs to loan end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_month: Option<u32>,
    #[serde(default)]
    pub is_recurring: bool,
    pub frequency: OverpaymentFrequency,
    pub effect: OverpaymentEffect,
}

impl OverpaymentPlan {
    pub fn one_time(amount: Money, month: u32, effect: OverpaymentEffect) -> Self {
        Self {
            amount,
            start_month: month,
            end_month: None,
            is_recurring: false,
            frequency: OverpaymentFrequency::OneTime,
            effect,
        }
    }

    pub fn monthly(
        amount: Money,
        start_month: u32,
        end_month: Option<u32>,
        effect: OverpaymentEffect,
    ) -> Self {
        Self {
            amount,
            start_month,
            end_month,
            is_recurring: true,
            frequency: OverpaymentFrequency::Monthly,
            effect,
        }
    }

    pub fn annual(
        amount: Money,
        start_month: u32,
        end_month: Option<u32>,
        effect: OverpaymentEffect,
    ) -> Self {
        Self {
            amount,
            start_month,
            end_month,
            is_recurring: true,
            frequency: OverpaymentFrequency::Annual,
            effect,
        }
    }

    /// Whether the plan is scheduled to fire at `period`.
    ///
    /// Non-recurring plans and one-time plans fire only at `start_month`.
    pub fn fires_at(&self, period: u32) -> bool {
        if period < self.start_month {
            return false;
        }
        if matches!(self.end_month, Some(end) if period > end) {
            return false;
        }
        if !self.is_recurring {
            return period == self.start_month;
        }
        match self.frequency {
            OverpaymentFrequency::OneTime => period == self.start_month,
            OverpaymentFrequency::Monthly => true,
            OverpaymentFrequency::Annual => (period - self.start_month) % MONTHS_PER_YEAR == 0,
        }
    }
}

/// Fees on top of principal and interest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalCosts {
    /// Paid once at origination (arrangement, valuation, broker fees).
    #[serde(default)]
    pub one_time: Money,
    /// Charged with every payment period actually emitted.
    #[serde(default)]
    pub monthly: Money,
}

impl AdditionalCosts {
    /// Total fees for a ledger of `periods` payments.
    pub fn total_for(&self, periods: usize) -> Money {
        self.one_time + self.monthly * Decimal::from(periods as u64)
    }
}

/// Input snapshot for a single calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDetails {
    pub principal: Money,
    pub interest_rate_periods: Vec<InterestRatePeriod>,
    pub loan_term_years: u32,
    #[serde(default)]
    pub overpayment_plans: Vec<OverpaymentPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_costs: Option<AdditionalCosts>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub currency: Currency,
}

impl LoanDetails {
    /// A single-rate loan with no overpayments or fees.
    pub fn fixed_rate(
        principal: Money,
        interest_rate: Percent,
        loan_term_years: u32,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            principal,
            interest_rate_periods: vec![InterestRatePeriod::new(0, interest_rate)],
            loan_term_years,
            overpayment_plans: Vec::new(),
            additional_costs: None,
            start_date,
            currency: Currency::default(),
        }
    }

    pub fn with_overpayment(mut self, plan: OverpaymentPlan) -> Self {
        self.overpayment_plans.push(plan);
        self
    }

    /// Add a rate period, replacing any existing period with the same start.
    pub fn with_rate_change(mut self, start_month: u32, interest_rate: Percent) -> Self {
        self.interest_rate_periods
            .retain(|p| p.start_month != start_month);
        self.interest_rate_periods
            .push(InterestRatePeriod::new(start_month, interest_rate));
        self.interest_rate_periods.sort_by_key(|p| p.start_month);
        self
    }

    pub fn with_additional_costs(mut self, costs: AdditionalCosts) -> Self {
        self.additional_costs = Some(costs);
        self
    }

    /// The same loan with every overpayment plan removed.
    pub fn without_overpayments(&self) -> Self {
        Self {
            overpayment_plans: Vec::new(),
            ..self.clone()
        }
    }

    /// Nominal number of monthly payments.
    pub fn total_periods(&self) -> u32 {
        self.loan_term_years.saturating_mul(MONTHS_PER_YEAR)
    }

    /// Rate periods ordered by `start_month`, leaving `self` untouched.
    pub fn ordered_rate_periods(&self) -> Vec<InterestRatePeriod> {
        let mut periods = self.interest_rate_periods.clone();
        periods.sort_by_key(|p| p.start_month);
        periods
    }

    /// Rate of the earliest period, if any.
    pub fn initial_rate(&self) -> Option<Percent> {
        self.interest_rate_periods
            .iter()
            .min_by_key(|p| p.start_month)
            .map(|p| p.interest_rate)
    }

    pub fn has_overpayments(&self) -> bool {
        !self.overpayment_plans.is_empty()
    }

    pub fn fees(&self) -> AdditionalCosts {
        self.additional_costs.clone().unwrap_or_default()
    }
}

/// Rate active at `period`: the ordered period with the greatest `start_month <= period`.
///
/// `periods` must be ordered by `start_month`.
pub fn rate_for_period(periods: &[InterestRatePeriod], period: u32) -> Option<Percent> {
    periods
        .iter()
        .take_while(|p| p.start_month <= period)
        .last()
        .map(|p| p.interest_rate)
}
