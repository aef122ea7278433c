//! Recurring pension deposit scheduling.
//!
//! ORDER (fixed):
//!   1. Resolve defaulted account / amount from the active pension
//!   2. Fraud check; a reject stops here with no schedule writes
//!   3. Upsert the single active schedule for (customer, pension)
//!   4. Append one future-dated "scheduled" transaction
//!
//! Steps 3 and 4 share one SQLite transaction.

use crate::{
    config::FraudThresholds,
    error::{DeskError, DeskResult},
    fraud_detection::{FraudChecker, FraudVerdict},
    store::{DeskStore, ScheduleRow, TransactionRow},
    types::{format_date, format_timestamp, short_id},
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Frequency {
    #[default]
    Monthly,
    Weekly,
    /// Anything else is kept verbatim and recurs monthly.
    Other(String),
}

impl Frequency {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "monthly" => Frequency::Monthly,
            "weekly" => Frequency::Weekly,
            other => Frequency::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Weekly => "weekly",
            Frequency::Other(raw) => raw,
        }
    }

    pub fn interval_days(&self) -> i64 {
        match self {
            Frequency::Weekly => 7,
            Frequency::Monthly | Frequency::Other(_) => 30,
        }
    }

    pub fn next_occurrence(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.interval_days())
    }
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A schedule request as the agent sends it. Account and amount may be
/// left out and are resolved from the customer's active pension.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRequest {
    pub customer_id: String,
    pub pension_id: Option<String>,
    pub amount: Option<f64>,
    pub frequency: Frequency,
}

impl ScheduleRequest {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            pension_id: None,
            amount: None,
            frequency: Frequency::default(),
        }
    }

    pub fn pension(mut self, pension_id: impl Into<String>) -> Self {
        self.pension_id = Some(pension_id.into());
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }
}

/// A request with every default filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub customer_id: String,
    pub pension_id: String,
    pub amount: f64,
    pub frequency: Frequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleAction {
    Created,
    Updated,
}

impl ScheduleAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleAction::Created => "created",
            ScheduleAction::Updated => "updated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleConfirmation {
    pub action: ScheduleAction,
    pub schedule_id: String,
    pub transaction_id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub pension_id: String,
    pub pension_type: String,
    pub bank_account: Option<String>,
    pub amount: f64,
    pub frequency: Frequency,
    pub next_deposit_date: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleOutcome {
    Scheduled(ScheduleConfirmation),
    Rejected {
        request: ResolvedRequest,
        verdict: FraudVerdict,
    },
}

/// Fill in a missing account or amount from the customer's active pension.
pub fn resolve(store: &DeskStore, request: ScheduleRequest) -> DeskResult<ResolvedRequest> {
    let ScheduleRequest {
        customer_id,
        pension_id,
        amount,
        frequency,
    } = request;

    let (pension_id, amount) = match (pension_id, amount) {
        (Some(pension_id), Some(amount)) => (pension_id, amount),
        (pension_id, amount) => {
            let customer = store
                .get_customer(&customer_id)?
                .ok_or_else(|| DeskError::CustomerNotFound {
                    customer_id: customer_id.clone(),
                })?;
            let pension = store
                .active_pension_for_customer(&customer_id)?
                .ok_or_else(|| DeskError::NoActivePension {
                    customer_id: customer_id.clone(),
                    customer_name: customer.name.clone(),
                })?;
            (
                pension_id.unwrap_or(pension.pension_id),
                amount.unwrap_or(pension.monthly_amount),
            )
        }
    };

    Ok(ResolvedRequest {
        customer_id,
        pension_id,
        amount,
        frequency,
    })
}

pub struct DepositScheduler<'a> {
    store: &'a DeskStore,
    thresholds: &'a FraudThresholds,
}

impl<'a> DepositScheduler<'a> {
    pub fn new(store: &'a DeskStore, thresholds: &'a FraudThresholds) -> Self {
        Self { store, thresholds }
    }

    pub fn schedule(&self, request: ScheduleRequest, now: NaiveDateTime) -> DeskResult<ScheduleOutcome> {
        let request = resolve(self.store, request)?;

        let verdict = FraudChecker::new(self.store, self.thresholds).check(
            &request.customer_id,
            &request.pension_id,
            request.amount,
            now,
        )?;
        if verdict.flagged {
            return Ok(ScheduleOutcome::Rejected { request, verdict });
        }

        let target = self
            .store
            .schedule_target(&request.customer_id, &request.pension_id)?
            .ok_or_else(|| DeskError::PensionNotFound {
                customer_id: request.customer_id.clone(),
                pension_id: request.pension_id.clone(),
            })?;

        let next_date = format_date(request.frequency.next_occurrence(now.date()));
        let created_at = format_timestamp(now);

        let (action, schedule_id, transaction_id) = self.store.in_transaction(|store| {
            let (action, schedule_id) =
                match store.active_schedule(&request.customer_id, &request.pension_id)? {
                    Some(existing) => {
                        store.update_schedule(
                            &existing.schedule_id,
                            request.amount,
                            request.frequency.as_str(),
                            &next_date,
                        )?;
                        (ScheduleAction::Updated, existing.schedule_id)
                    }
                    None => {
                        let schedule_id = short_id('S');
                        store.insert_schedule(&ScheduleRow {
                            schedule_id: schedule_id.clone(),
                            customer_id: request.customer_id.clone(),
                            pension_id: request.pension_id.clone(),
                            amount: request.amount,
                            frequency: request.frequency.as_str().to_string(),
                            next_deposit_date: next_date.clone(),
                            status: "active".into(),
                            created_at: created_at.clone(),
                        })?;
                        (ScheduleAction::Created, schedule_id)
                    }
                };

            let transaction_id = short_id('T');
            store.insert_transaction(&TransactionRow {
                transaction_id: transaction_id.clone(),
                customer_id: request.customer_id.clone(),
                pension_id: request.pension_id.clone(),
                amount: request.amount,
                transaction_date: created_at.clone(),
                transaction_type: "deposit".into(),
                status: "scheduled".into(),
                is_fraudulent: false,
                scheduled_date: Some(next_date.clone()),
            })?;

            Ok((action, schedule_id, transaction_id))
        })?;

        log::info!(
            "Schedule {schedule_id} {} for {}/{}: {:.2} {} next on {next_date}",
            action.as_str(),
            request.customer_id,
            request.pension_id,
            request.amount,
            request.frequency.as_str()
        );

        let message = format!(
            "Successfully {} {} pension deposit schedule for {}",
            action.as_str(),
            request.frequency.as_str(),
            target.customer_name
        );

        Ok(ScheduleOutcome::Scheduled(ScheduleConfirmation {
            action,
            schedule_id,
            transaction_id,
            customer_id: request.customer_id,
            customer_name: target.customer_name,
            pension_id: request.pension_id,
            pension_type: target.pension_type,
            bank_account: target.bank_account,
            amount: request.amount,
            frequency: request.frequency,
            next_deposit_date: next_date,
            status: "active".into(),
            message,
        }))
    }
}
