//! Read-only reports behind the agent's status tools.
//!
//! Each report is one or two store queries shaped into a payload.
//! "This month" means from the first of the month of `now`; "upcoming"
//! means due today or later.

use crate::{
    error::{DeskError, DeskResult},
    store::{CategoryTotal, DeskStore, FinancialStatusRow, ScheduleListing},
    types::{format_date, parse_date},
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

const RECENT_TRANSACTION_LIMIT: usize = 5;
const INCOME_WINDOW_DAYS: i64 = 30;

fn first_of_month(now: NaiveDateTime) -> NaiveDate {
    let today = now.date();
    today.with_day(1).unwrap_or(today)
}

fn month_label(now: NaiveDateTime) -> String {
    now.format("%B %Y").to_string()
}

fn require_status(store: &DeskStore, customer_id: &str) -> DeskResult<FinancialStatusRow> {
    store
        .financial_status(customer_id)?
        .ok_or_else(|| DeskError::FinancialStatusNotFound {
            customer_id: customer_id.to_string(),
        })
}

// ── Pension details ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTransaction {
    pub transaction_id: String,
    pub amount: f64,
    pub date: String,
    pub status: String,
    pub is_fraudulent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PensionDetails {
    pub customer_id: String,
    pub customer_name: String,
    pub account_number: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub pension_id: String,
    pub pension_type: String,
    pub monthly_amount: f64,
    pub start_date: String,
    pub status: String,
    pub bank_account: Option<String>,
    pub ifsc_code: Option<String>,
    pub recent_transactions: Vec<RecentTransaction>,
}

pub fn pension_details(store: &DeskStore, customer_id: &str) -> DeskResult<PensionDetails> {
    let customer = store
        .get_customer(customer_id)?
        .ok_or_else(|| DeskError::CustomerNotFound {
            customer_id: customer_id.to_string(),
        })?;
    let pension = store
        .active_pension_for_customer(customer_id)?
        .ok_or_else(|| DeskError::NoActivePension {
            customer_id: customer_id.to_string(),
            customer_name: customer.name.clone(),
        })?;

    let recent_transactions = store
        .recent_transactions(customer_id, RECENT_TRANSACTION_LIMIT)?
        .into_iter()
        .map(|t| RecentTransaction {
            transaction_id: t.transaction_id,
            amount: t.amount,
            date: t.transaction_date,
            status: t.status,
            is_fraudulent: t.is_fraudulent,
        })
        .collect();

    Ok(PensionDetails {
        customer_id: customer.customer_id,
        customer_name: customer.name,
        account_number: customer.account_number,
        email: customer.email,
        phone: customer.phone,
        pension_id: pension.pension_id,
        pension_type: pension.pension_type,
        monthly_amount: pension.monthly_amount,
        start_date: pension.start_date,
        status: pension.status,
        bank_account: pension.bank_account,
        ifsc_code: pension.ifsc_code,
        recent_transactions,
    })
}

// ── Scheduled deposits ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledDeposits {
    pub count: usize,
    pub schedules: Vec<ScheduleListing>,
}

pub fn scheduled_deposits(store: &DeskStore, customer_id: Option<&str>) -> DeskResult<ScheduledDeposits> {
    let schedules = store.schedule_listings(customer_id)?;
    Ok(ScheduledDeposits {
        count: schedules.len(),
        schedules,
    })
}

// ── Financial overview ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialOverview {
    pub customer_id: String,
    pub customer_name: String,
    pub net_worth: f64,
    pub current_balance: f64,
    pub monthly_spending: f64,
    pub upcoming_bills: f64,
    pub emergency_fund: f64,
    pub emergency_target: f64,
    pub last_updated: String,
}

pub fn financial_status(
    store: &DeskStore,
    customer_id: &str,
    now: NaiveDateTime,
) -> DeskResult<FinancialOverview> {
    let customer = store
        .get_customer(customer_id)?
        .ok_or_else(|| DeskError::CustomerNotFound {
            customer_id: customer_id.to_string(),
        })?;
    let status = require_status(store, customer_id)?;

    let monthly_spending =
        store.sum_spending_since(customer_id, &format_date(first_of_month(now)))?;
    let upcoming_bills =
        store.sum_pending_bills_due_from(customer_id, &format_date(now.date()))?;

    Ok(FinancialOverview {
        customer_id: customer.customer_id,
        customer_name: customer.name,
        net_worth: status.net_worth,
        current_balance: status.current_balance,
        monthly_spending,
        upcoming_bills,
        emergency_fund: status.emergency_fund,
        emergency_target: status.emergency_target,
        last_updated: status.last_updated,
    })
}

// ── Bills ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillSufficiency {
    pub customer_id: String,
    pub current_balance: f64,
    pub upcoming_bills: f64,
    pub surplus: f64,
    pub is_sufficient: bool,
    pub status: String,
    pub message: String,
}

pub fn bill_sufficiency(
    store: &DeskStore,
    customer_id: &str,
    now: NaiveDateTime,
) -> DeskResult<BillSufficiency> {
    let status = require_status(store, customer_id)?;
    let upcoming_bills =
        store.sum_pending_bills_due_from(customer_id, &format_date(now.date()))?;

    let surplus = status.current_balance - upcoming_bills;
    let is_sufficient = surplus >= 0.0;

    Ok(BillSufficiency {
        customer_id: customer_id.to_string(),
        current_balance: status.current_balance,
        upcoming_bills,
        surplus,
        is_sufficient,
        status: if is_sufficient { "Sufficient" } else { "Insufficient" }.to_string(),
        message: format!(
            "You have {} funds to cover your bills",
            if is_sufficient { "enough" } else { "insufficient" }
        ),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillEntry {
    pub bill_name: String,
    pub amount: f64,
    pub due_date: String,
    pub category: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingBills {
    pub customer_id: String,
    pub bills_count: usize,
    pub total_amount: f64,
    pub bills: Vec<BillEntry>,
}

pub fn upcoming_bills(
    store: &DeskStore,
    customer_id: &str,
    now: NaiveDateTime,
) -> DeskResult<UpcomingBills> {
    let bills: Vec<BillEntry> = store
        .pending_bills_due_from(customer_id, &format_date(now.date()))?
        .into_iter()
        .map(|b| BillEntry {
            bill_name: b.bill_name,
            amount: b.amount,
            due_date: b.due_date,
            category: b.category,
            status: b.status,
        })
        .collect();

    Ok(UpcomingBills {
        customer_id: customer_id.to_string(),
        bills_count: bills.len(),
        total_amount: bills.iter().map(|b| b.amount).sum(),
        bills,
    })
}

// ── Emergency fund ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencyFundStatus {
    pub customer_id: String,
    pub emergency_fund: f64,
    pub recommended_target: f64,
    pub gap_to_target: f64,
    pub percentage_of_target: f64,
    pub status: String,
    pub recommendation: String,
}

pub fn emergency_fund_status(store: &DeskStore, customer_id: &str) -> DeskResult<EmergencyFundStatus> {
    let status = require_status(store, customer_id)?;
    let fund = status.emergency_fund;
    let target = status.emergency_target;

    let gap = target - fund;
    let percentage = if target > 0.0 { fund / target * 100.0 } else { 0.0 };

    Ok(EmergencyFundStatus {
        customer_id: customer_id.to_string(),
        emergency_fund: fund,
        recommended_target: target,
        gap_to_target: gap.max(0.0),
        percentage_of_target: (percentage * 100.0).round() / 100.0,
        status: if fund < target { "Below Target" } else { "Target Met" }.to_string(),
        recommendation: if gap > 0.0 {
            format!("Build emergency fund by ${gap:.2}")
        } else {
            "Emergency fund target achieved!".to_string()
        },
    })
}

// ── Income ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeEntry {
    pub income_type: String,
    pub amount: f64,
    pub expected_date: String,
    pub actual_date: Option<String>,
    pub status: String,
    pub is_delayed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeStatus {
    pub customer_id: String,
    pub income_sources_count: usize,
    pub total_expected: f64,
    pub on_time_count: usize,
    pub delayed_count: usize,
    pub income_sources: Vec<IncomeEntry>,
}

/// Delayed: flagged as such, or the expected date has passed with nothing
/// received.
pub fn is_income_delayed(status: &str, expected_date: &str, actual_date: Option<&str>, today: NaiveDate) -> bool {
    if status == "delayed" {
        return true;
    }
    actual_date.is_none() && parse_date(expected_date).is_some_and(|expected| today > expected)
}

pub fn income_status(store: &DeskStore, customer_id: &str, now: NaiveDateTime) -> DeskResult<IncomeStatus> {
    let today = now.date();
    let from = format_date(today - Duration::days(INCOME_WINDOW_DAYS));
    let to = format_date(today + Duration::days(INCOME_WINDOW_DAYS));

    let income_sources: Vec<IncomeEntry> = store
        .income_expected_between(customer_id, &from, &to)?
        .into_iter()
        .map(|i| {
            let is_delayed =
                is_income_delayed(&i.status, &i.expected_date, i.actual_date.as_deref(), today);
            let status = if is_delayed {
                "Delayed"
            } else if i.actual_date.is_some() {
                "Received"
            } else {
                "On Time"
            };
            IncomeEntry {
                income_type: i.income_type,
                amount: i.amount,
                expected_date: i.expected_date,
                actual_date: i.actual_date,
                status: status.to_string(),
                is_delayed,
            }
        })
        .collect();

    let delayed_count = income_sources.iter().filter(|i| i.is_delayed).count();
    Ok(IncomeStatus {
        customer_id: customer_id.to_string(),
        income_sources_count: income_sources.len(),
        total_expected: income_sources.iter().map(|i| i.amount).sum(),
        on_time_count: income_sources.len() - delayed_count,
        delayed_count,
        income_sources,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyIncomeEntry {
    pub income_type: String,
    pub amount: f64,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyIncome {
    pub customer_id: String,
    pub month: String,
    pub income_count: usize,
    pub total_income: f64,
    pub income_sources: Vec<MonthlyIncomeEntry>,
}

pub fn monthly_income(store: &DeskStore, customer_id: &str, now: NaiveDateTime) -> DeskResult<MonthlyIncome> {
    let income_sources: Vec<MonthlyIncomeEntry> = store
        .income_expected_since(customer_id, &format_date(first_of_month(now)))?
        .into_iter()
        .map(|i| MonthlyIncomeEntry {
            income_type: i.income_type,
            amount: i.amount,
            date: i.expected_date,
            status: i.status,
        })
        .collect();

    Ok(MonthlyIncome {
        customer_id: customer_id.to_string(),
        month: month_label(now),
        income_count: income_sources.len(),
        total_income: income_sources.iter().map(|i| i.amount).sum(),
        income_sources,
    })
}

// ── Tax tips ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxTipEntry {
    pub category: String,
    pub suggestion: String,
    pub estimated_savings: Option<f64>,
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxTips {
    pub customer_id: String,
    pub tips_count: usize,
    pub total_estimated_savings: f64,
    pub tax_tips: Vec<TaxTipEntry>,
}

pub fn tax_tips(store: &DeskStore, customer_id: &str) -> DeskResult<TaxTips> {
    let tax_tips: Vec<TaxTipEntry> = store
        .tax_tips(customer_id)?
        .into_iter()
        .map(|t| TaxTipEntry {
            category: t.tip_category,
            suggestion: t.suggestion,
            estimated_savings: t.estimated_savings,
            period: t.applicable_period,
        })
        .collect();

    Ok(TaxTips {
        customer_id: customer_id.to_string(),
        tips_count: tax_tips.len(),
        total_estimated_savings: tax_tips.iter().filter_map(|t| t.estimated_savings).sum(),
        tax_tips,
    })
}

// ── Spending ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySpending {
    pub customer_id: String,
    pub month: String,
    pub total_spending: f64,
    pub categories_count: usize,
    pub spending_by_category: Vec<CategoryTotal>,
}

pub fn monthly_spending(store: &DeskStore, customer_id: &str, now: NaiveDateTime) -> DeskResult<MonthlySpending> {
    let spending_by_category =
        store.spending_by_category_since(customer_id, &format_date(first_of_month(now)))?;

    Ok(MonthlySpending {
        customer_id: customer_id.to_string(),
        month: month_label(now),
        total_spending: spending_by_category.iter().map(|c| c.amount).sum(),
        categories_count: spending_by_category.len(),
        spending_by_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_past_due_without_receipt_is_delayed() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        assert!(is_income_delayed("pending", "2026-03-19", None, today));
        assert!(!is_income_delayed("pending", "2026-03-19", Some("2026-03-19"), today));
        assert!(!is_income_delayed("pending", "2026-03-20", None, today));
        assert!(is_income_delayed("delayed", "2026-04-01", None, today));
        assert!(!is_income_delayed("pending", "not-a-date", None, today));
    }
}
