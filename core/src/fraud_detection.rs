//! Pension deposit fraud check.
//!
//! Rules run independently and accumulate (no short-circuit):
//!   1. Deviation from the expected pension amount
//!   2. Absolute floor on the deposit amount
//!   3. Velocity of the customer's recent transactions
//!   4. Recent high-severity indicators already on file
//!
//! An existing active schedule for the same pension is NOT a signal;
//! the scheduler updates it in place.
//!
//! `evaluate` is the pure decision over gathered signals. `FraudChecker`
//! gathers those signals from the store and, when the verdict rejects,
//! appends every indicator to the fraud log.

use crate::{
    config::FraudThresholds,
    error::{DeskError, DeskResult},
    store::{DeskStore, FraudIndicatorRow},
    types::format_timestamp,
};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ── Indicator categories ─────────────────────────────────────────────────────

pub const UNUSUAL_AMOUNT: &str = "unusual_amount";
pub const SUSPICIOUS_LOW_AMOUNT: &str = "suspicious_low_amount";
pub const VELOCITY_CHECK: &str = "velocity_check";

// ── Verdict types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Unknown labels read back from the log count as low.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "high" => Severity::High,
            "medium" => Severity::Medium,
            other => {
                log::debug!("Unknown severity label {other:?} read as low");
                Severity::Low
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Approve,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudIndicator {
    #[serde(rename = "type")]
    pub indicator_type: String,
    pub description: String,
    pub severity: Severity,
}

impl FraudIndicator {
    fn new(indicator_type: &str, description: String, severity: Severity) -> Self {
        Self {
            indicator_type: indicator_type.to_string(),
            description,
            severity,
        }
    }
}

impl From<FraudIndicatorRow> for FraudIndicator {
    fn from(row: FraudIndicatorRow) -> Self {
        Self {
            indicator_type: row.indicator_type,
            description: row.description.unwrap_or_default(),
            severity: Severity::parse(&row.severity),
        }
    }
}

/// Everything the rules look at for one proposed deposit.
#[derive(Debug, Clone, PartialEq)]
pub struct FraudSignals {
    pub amount: f64,
    pub expected_amount: f64,
    /// Transactions for the customer inside the velocity window.
    pub recent_transactions: i64,
    /// High-severity indicators on file inside the history window,
    /// newest first, at most `history_lookback_limit` of them.
    pub recent_high_indicators: Vec<FraudIndicator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub flagged: bool,
    pub severity: Severity,
    pub indicators: Vec<FraudIndicator>,
}

impl Assessment {
    pub fn recommendation(&self) -> Recommendation {
        if self.flagged {
            Recommendation::Reject
        } else {
            Recommendation::Approve
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudVerdict {
    pub customer_id: String,
    pub pension_id: String,
    pub amount: f64,
    pub expected_amount: f64,
    #[serde(rename = "is_fraudulent")]
    pub flagged: bool,
    pub severity: Severity,
    #[serde(rename = "fraud_indicators")]
    pub indicators: Vec<FraudIndicator>,
    #[serde(rename = "fraud_score")]
    pub score: usize,
    pub recommendation: Recommendation,
}

impl FraudVerdict {
    pub fn is_rejected(&self) -> bool {
        self.recommendation == Recommendation::Reject
    }
}

// ── Decision ─────────────────────────────────────────────────────────────────

/// Relative deviation of `amount` from `expected`. A non-positive
/// expectation makes any positive amount unbounded.
pub fn amount_deviation(amount: f64, expected: f64) -> f64 {
    if expected > 0.0 {
        (amount - expected).abs() / expected
    } else if amount == expected {
        0.0
    } else {
        f64::INFINITY
    }
}

pub fn evaluate(signals: &FraudSignals, thresholds: &FraudThresholds) -> Assessment {
    let mut indicators = Vec::new();
    let mut flagged = false;

    // Rule 1: deviation. The medium band is informational only.
    let deviation = amount_deviation(signals.amount, signals.expected_amount);
    if deviation > thresholds.reject_deviation {
        flagged = true;
        indicators.push(FraudIndicator::new(
            UNUSUAL_AMOUNT,
            format!(
                "Amount ${:.2} deviates {:.1}% from expected ${:.2}",
                signals.amount,
                deviation * 100.0,
                signals.expected_amount
            ),
            Severity::High,
        ));
    } else if deviation > thresholds.warn_deviation {
        indicators.push(FraudIndicator::new(
            UNUSUAL_AMOUNT,
            format!(
                "Amount ${:.2} slightly deviates from expected ${:.2}",
                signals.amount, signals.expected_amount
            ),
            Severity::Medium,
        ));
    }

    // Rule 2: floor.
    if signals.amount < thresholds.min_amount {
        flagged = true;
        indicators.push(FraudIndicator::new(
            SUSPICIOUS_LOW_AMOUNT,
            format!(
                "Amount ${:.2} is suspiciously low for pension deposit",
                signals.amount
            ),
            Severity::High,
        ));
    }

    // Rule 3: velocity.
    if signals.recent_transactions > thresholds.max_recent_transactions {
        flagged = true;
        indicators.push(FraudIndicator::new(
            VELOCITY_CHECK,
            format!(
                "{} transactions detected in last {} hours - possible fraud",
                signals.recent_transactions, thresholds.velocity_window_hours
            ),
            Severity::High,
        ));
    }

    // Rule 4: history. Re-surface what is on file and force the reject.
    if signals.recent_high_indicators.len() >= thresholds.history_reject_count {
        flagged = true;
        indicators.extend(signals.recent_high_indicators.iter().cloned());
    }

    Assessment {
        flagged,
        severity: if flagged { Severity::High } else { Severity::Low },
        indicators,
    }
}

// ── Checker ──────────────────────────────────────────────────────────────────

pub struct FraudChecker<'a> {
    store: &'a DeskStore,
    thresholds: &'a FraudThresholds,
}

impl<'a> FraudChecker<'a> {
    pub fn new(store: &'a DeskStore, thresholds: &'a FraudThresholds) -> Self {
        Self { store, thresholds }
    }

    /// Gather signals for the proposed deposit as of `now`.
    pub fn gather(
        &self,
        customer_id: &str,
        pension_id: &str,
        amount: f64,
        now: NaiveDateTime,
    ) -> DeskResult<FraudSignals> {
        let pension = self
            .store
            .pension_for_customer(customer_id, pension_id)?
            .ok_or_else(|| DeskError::PensionNotFound {
                customer_id: customer_id.to_string(),
                pension_id: pension_id.to_string(),
            })?;

        let velocity_since =
            format_timestamp(now - Duration::hours(self.thresholds.velocity_window_hours));
        let recent_transactions = self
            .store
            .count_transactions_since(customer_id, &velocity_since)?;

        let history_since =
            format_timestamp(now - Duration::days(self.thresholds.history_window_days));
        let recent_high_indicators = self
            .store
            .recent_fraud_indicators(
                customer_id,
                Severity::High.as_str(),
                &history_since,
                self.thresholds.history_lookback_limit,
            )?
            .into_iter()
            .map(FraudIndicator::from)
            .collect();

        Ok(FraudSignals {
            amount,
            expected_amount: pension.monthly_amount,
            recent_transactions,
            recent_high_indicators,
        })
    }

    /// Run the full check. A rejecting verdict appends each of its
    /// indicators to the fraud log; prior entries are never touched.
    pub fn check(
        &self,
        customer_id: &str,
        pension_id: &str,
        amount: f64,
        now: NaiveDateTime,
    ) -> DeskResult<FraudVerdict> {
        let signals = self.gather(customer_id, pension_id, amount, now)?;
        log::debug!(
            "Fraud signals for {customer_id}/{pension_id}: amount={amount:.2} expected={:.2} recent_txns={} recent_high={}",
            signals.expected_amount,
            signals.recent_transactions,
            signals.recent_high_indicators.len()
        );

        let assessment = evaluate(&signals, self.thresholds);
        let verdict = FraudVerdict {
            customer_id: customer_id.to_string(),
            pension_id: pension_id.to_string(),
            amount,
            expected_amount: signals.expected_amount,
            flagged: assessment.flagged,
            severity: assessment.severity,
            score: assessment.indicators.len(),
            recommendation: assessment.recommendation(),
            indicators: assessment.indicators,
        };

        if verdict.is_rejected() {
            let detected_at = format_timestamp(now);
            self.store.in_transaction(|store| {
                for indicator in &verdict.indicators {
                    store.insert_fraud_indicator(
                        customer_id,
                        &indicator.indicator_type,
                        &indicator.description,
                        indicator.severity.as_str(),
                        &detected_at,
                    )?;
                }
                Ok(())
            })?;
            log::warn!(
                "Deposit of {amount:.2} for {customer_id}/{pension_id} rejected with {} indicator(s)",
                verdict.score
            );
        }

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(amount: f64) -> FraudSignals {
        FraudSignals {
            amount,
            expected_amount: 2500.0,
            recent_transactions: 0,
            recent_high_indicators: Vec::new(),
        }
    }

    fn high(kind: &str) -> FraudIndicator {
        FraudIndicator::new(kind, format!("earlier {kind}"), Severity::High)
    }

    #[test]
    fn amount_near_expectation_is_approved() {
        let a = evaluate(&signals(2600.0), &FraudThresholds::default());
        assert!(!a.flagged);
        assert!(a.indicators.is_empty());
        assert_eq!(a.severity, Severity::Low);
        assert_eq!(a.recommendation(), Recommendation::Approve);
    }

    #[test]
    fn medium_deviation_is_informational_only() {
        let a = evaluate(&signals(1900.0), &FraudThresholds::default());
        assert!(!a.flagged);
        assert_eq!(a.recommendation(), Recommendation::Approve);
        assert_eq!(a.severity, Severity::Low);
        assert_eq!(a.indicators.len(), 1);
        assert_eq!(a.indicators[0].indicator_type, UNUSUAL_AMOUNT);
        assert_eq!(a.indicators[0].severity, Severity::Medium);
    }

    #[test]
    fn deviation_boundaries_are_exclusive() {
        let t = FraudThresholds::default();
        // exactly 20% and exactly 50% do not cross their bands
        assert!(evaluate(&signals(2000.0), &t).indicators.is_empty());
        let at_half = evaluate(&signals(3750.0), &t);
        assert!(!at_half.flagged);
        assert_eq!(at_half.indicators[0].severity, Severity::Medium);
    }

    #[test]
    fn rules_accumulate_without_short_circuit() {
        let mut s = signals(50.0);
        s.recent_transactions = 4;
        let a = evaluate(&s, &FraudThresholds::default());
        assert!(a.flagged);
        let kinds: Vec<_> = a.indicators.iter().map(|i| i.indicator_type.as_str()).collect();
        assert_eq!(kinds, vec![UNUSUAL_AMOUNT, SUSPICIOUS_LOW_AMOUNT, VELOCITY_CHECK]);
        assert!(a.indicators.iter().all(|i| i.severity == Severity::High));
    }

    #[test]
    fn floor_rejects_even_when_expectation_is_tiny() {
        let s = FraudSignals {
            amount: 80.0,
            expected_amount: 60.0,
            recent_transactions: 0,
            recent_high_indicators: Vec::new(),
        };
        let a = evaluate(&s, &FraudThresholds::default());
        assert!(a.flagged);
        assert_eq!(a.indicators.len(), 2);
        assert_eq!(a.indicators[0].severity, Severity::Medium);
        assert_eq!(a.indicators[1].indicator_type, SUSPICIOUS_LOW_AMOUNT);
    }

    #[test]
    fn single_prior_high_indicator_is_not_enough() {
        let mut s = signals(2500.0);
        s.recent_high_indicators = vec![high(VELOCITY_CHECK)];
        assert!(!evaluate(&s, &FraudThresholds::default()).flagged);

        s.recent_high_indicators.push(high(SUSPICIOUS_LOW_AMOUNT));
        let a = evaluate(&s, &FraudThresholds::default());
        assert!(a.flagged);
        assert_eq!(a.indicators, s.recent_high_indicators);
    }

    #[test]
    fn unknown_severity_labels_read_as_low() {
        assert_eq!(Severity::parse("high"), Severity::High);
        assert_eq!(Severity::parse("medium"), Severity::Medium);
        assert_eq!(Severity::parse("low"), Severity::Low);
        assert_eq!(Severity::parse("critical"), Severity::Low);
        assert_eq!(Severity::parse("HIGH"), Severity::Low);
    }

    #[test]
    fn zero_expectation_counts_as_unbounded_deviation() {
        assert_eq!(amount_deviation(0.0, 0.0), 0.0);
        assert!(amount_deviation(500.0, 0.0).is_infinite());
        let mut s = signals(500.0);
        s.expected_amount = 0.0;
        assert!(evaluate(&s, &FraudThresholds::default()).flagged);
    }
}
