//! Demo data for a fresh desk database.
//!
//! Three retired customers with one active pension each, plus household
//! finances. Dates are laid out relative to `now` so the reporting tools
//! always have "this month" spending and upcoming bills to show.

use crate::{
    error::DeskResult,
    store::{
        BillRow, CustomerRow, DeskStore, FinancialStatusRow, IncomeRow, PensionRow, SpendingRow,
        TaxTipRow,
    },
    types::{format_date, format_timestamp},
};
use chrono::{Duration, NaiveDateTime};

// (id, name, account, age, email, phone)
const CUSTOMERS: &[(&str, &str, &str, i64, &str, &str)] = &[
    ("C001", "John Doe", "ACC1001", 67, "john.doe@email.com", "+1-555-0101"),
    ("C002", "Jane Smith", "ACC1002", 72, "jane.smith@email.com", "+1-555-0102"),
    ("C003", "Robert Johnson", "ACC1003", 69, "robert.j@email.com", "+1-555-0103"),
];

// (pension, customer, type, monthly amount, start, bank account, ifsc)
const PENSIONS: &[(&str, &str, &str, f64, &str, &str, &str)] = &[
    ("P001", "C001", "Government Pension", 2500.0, "2020-01-01", "ACC1001", "BANK001"),
    ("P002", "C002", "Private Pension", 3200.0, "2019-06-15", "ACC1002", "BANK002"),
    ("P003", "C003", "Government Pension", 2800.0, "2021-03-20", "ACC1003", "BANK003"),
];

// (status id, customer, net worth, balance, emergency fund, emergency target)
const FINANCIAL_STATUS: &[(&str, &str, f64, f64, f64, f64)] = &[
    ("FS001", "C001", 85_000.0, 4_500.0, 500.0, 1_000.0),
    ("FS002", "C002", 92_000.0, 5_200.0, 1_200.0, 1_500.0),
    ("FS003", "C003", 78_000.0, 3_800.0, 800.0, 1_200.0),
];

// (customer, category, amount, description, days ago)
const SPENDING: &[(&str, &str, f64, &str, i64)] = &[
    ("C001", "Groceries", 450.0, "Weekly grocery shopping", 5),
    ("C001", "Healthcare", 320.0, "Prescription medications", 10),
    ("C001", "Utilities", 180.0, "Water and electricity", 15),
    ("C001", "Entertainment", 150.0, "Movies and dining", 7),
    ("C001", "Transportation", 100.0, "Gas and maintenance", 3),
    ("C002", "Groceries", 520.0, "Grocery shopping", 6),
    ("C002", "Healthcare", 410.0, "Doctor visit and meds", 12),
    ("C002", "Entertainment", 200.0, "Concert tickets", 8),
    ("C003", "Groceries", 380.0, "Weekly shopping", 4),
    ("C003", "Utilities", 220.0, "Internet and phone", 14),
];

// (customer, bill, amount, days ahead, category)
const BILLS: &[(&str, &str, f64, i64, &str)] = &[
    ("C001", "Electricity", 120.0, 17, "Utilities"),
    ("C001", "Insurance", 250.0, 22, "Insurance"),
    ("C001", "Healthcare", 300.0, 27, "Healthcare"),
    ("C001", "Internet", 80.0, 12, "Utilities"),
    ("C002", "Property Tax", 450.0, 25, "Tax"),
    ("C002", "Car Insurance", 320.0, 18, "Insurance"),
    ("C002", "Phone Bill", 95.0, 10, "Utilities"),
    ("C003", "Rent", 800.0, 5, "Housing"),
    ("C003", "Health Insurance", 280.0, 20, "Insurance"),
];

// (customer, income type, amount, days ahead, status)
const INCOME: &[(&str, &str, f64, i64, &str)] = &[
    ("C001", "Pension", 1200.0, 5, "pending"),
    ("C001", "Social Security", 900.0, 12, "pending"),
    ("C001", "Rental Income", 400.0, 8, "delayed"),
    ("C002", "Pension", 1500.0, 6, "pending"),
    ("C002", "Social Security", 1100.0, 11, "pending"),
    ("C002", "Investment Income", 300.0, 15, "pending"),
    ("C003", "Pension", 950.0, 7, "pending"),
    ("C003", "Social Security", 850.0, 13, "pending"),
];

// (customer, category, suggestion, estimated savings)
const TAX_TIPS: &[(&str, &str, &str, f64)] = &[
    ("C001", "Retirement", "Use tax-efficient withdrawals from retirement accounts", 300.0),
    ("C001", "Healthcare", "Maximize medical expense deductions if over 7.5% AGI", 150.0),
    ("C001", "Charitable", "Consider qualified charitable distributions from IRA", 200.0),
    ("C002", "Retirement", "Optimize Roth conversion ladder strategy", 400.0),
    ("C002", "Investment", "Harvest tax losses from investment portfolio", 250.0),
    ("C003", "Healthcare", "Contribute to HSA for tax-free medical expenses", 180.0),
    ("C003", "Retirement", "Delay Social Security for higher benefits", 500.0),
];

/// Seed the demo data when the customers table is empty. Returns whether
/// anything was written.
pub fn seed_if_empty(store: &DeskStore, now: NaiveDateTime) -> DeskResult<bool> {
    if store.customer_count()? > 0 {
        return Ok(false);
    }
    store.in_transaction(|s| seed_demo_data(s, now))?;
    log::info!("Seeded demo data for {} customers", CUSTOMERS.len());
    Ok(true)
}

/// Drop every table, re-create the schema and seed it again.
pub fn reset(store: &DeskStore, now: NaiveDateTime) -> DeskResult<()> {
    store.drop_all_tables()?;
    store.migrate()?;
    store.in_transaction(|s| seed_demo_data(s, now))?;
    log::info!("Desk database reset");
    Ok(())
}

fn seed_demo_data(store: &DeskStore, now: NaiveDateTime) -> DeskResult<()> {
    let created_at = format_timestamp(now);
    let today = now.date();

    for &(customer_id, name, account, age, email, phone) in CUSTOMERS {
        store.insert_customer(
            &CustomerRow {
                customer_id: customer_id.into(),
                name: name.into(),
                account_number: account.into(),
                age: Some(age),
                email: Some(email.into()),
                phone: Some(phone.into()),
            },
            &created_at,
        )?;
    }

    for &(pension_id, customer_id, pension_type, monthly_amount, start, bank, ifsc) in PENSIONS {
        store.insert_pension(&PensionRow {
            pension_id: pension_id.into(),
            customer_id: customer_id.into(),
            pension_type: pension_type.into(),
            monthly_amount,
            start_date: start.into(),
            status: "active".into(),
            bank_account: Some(bank.into()),
            ifsc_code: Some(ifsc.into()),
        })?;
    }

    for &(status_id, customer_id, net_worth, balance, fund, target) in FINANCIAL_STATUS {
        store.insert_financial_status(&FinancialStatusRow {
            status_id: status_id.into(),
            customer_id: customer_id.into(),
            net_worth,
            current_balance: balance,
            emergency_fund: fund,
            emergency_target: target,
            last_updated: created_at.clone(),
        })?;
    }

    for &(customer_id, category, amount, description, days_ago) in SPENDING {
        store.insert_spending(&SpendingRow {
            customer_id: customer_id.into(),
            category: category.into(),
            amount,
            description: Some(description.into()),
            spending_date: format_date(today - Duration::days(days_ago)),
        })?;
    }

    for &(customer_id, bill_name, amount, days_ahead, category) in BILLS {
        store.insert_bill(&BillRow {
            customer_id: customer_id.into(),
            bill_name: bill_name.into(),
            amount,
            due_date: format_date(today + Duration::days(days_ahead)),
            status: "pending".into(),
            category: Some(category.into()),
        })?;
    }

    for &(customer_id, income_type, amount, days_ahead, status) in INCOME {
        store.insert_income(&IncomeRow {
            customer_id: customer_id.into(),
            income_type: income_type.into(),
            amount,
            expected_date: format_date(today + Duration::days(days_ahead)),
            actual_date: None,
            status: status.into(),
        })?;
    }

    for &(customer_id, category, suggestion, savings) in TAX_TIPS {
        store.insert_tax_tip(&TaxTipRow {
            customer_id: customer_id.into(),
            tip_category: category.into(),
            suggestion: suggestion.into(),
            estimated_savings: Some(savings),
            applicable_period: Some("Annual".into()),
        })?;
    }

    Ok(())
}
