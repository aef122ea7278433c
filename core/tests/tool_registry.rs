//! End-to-end tool calls through the registry, against a file database.

use chrono::{NaiveDate, NaiveDateTime};
use pension_desk_core::{
    clock::FixedClock,
    config::DeskConfig,
    registry::{ToolContext, ToolRegistry},
};
use serde_json::json;
use std::path::PathBuf;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 20)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .expect("valid test timestamp")
}

/// A database file that is removed, with its WAL companions, on drop.
struct TempDb(PathBuf);

impl TempDb {
    fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self(std::env::temp_dir().join(format!("desk-test-{}.db", uuid::Uuid::new_v4())))
    }

    fn context(&self) -> ToolContext {
        let config = DeskConfig::with_db_path(self.0.to_string_lossy().into_owned());
        ToolContext::new(config, FixedClock::new(now()))
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.0.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

#[test]
fn registry_lists_every_desk_tool() {
    let registry = ToolRegistry::with_desk_tools();
    let names = registry.list();
    assert_eq!(names.len(), 13, "{names:?}");
    for expected in [
        "initialize_database",
        "get_pension_details",
        "check_fraud_status",
        "schedule_recurring_deposit",
        "get_scheduled_deposits",
        "get_financial_status",
        "check_bill_sufficiency",
        "get_upcoming_bills",
        "get_emergency_fund_status",
        "get_income_status",
        "get_monthly_income",
        "get_tax_tips",
        "get_monthly_spending",
    ] {
        assert!(names.contains(&expected), "missing tool {expected}");
    }
}

#[test]
fn first_call_seeds_the_database() {
    let db = TempDb::new();
    let ctx = db.context();
    let registry = ToolRegistry::with_desk_tools();

    let reply = registry.call(&ctx, "get_pension_details", &json!({ "customer_id": "C001" }));
    assert_eq!(reply["success"], true, "{reply}");
    assert_eq!(reply["customer_name"], "John Doe");
    assert_eq!(reply["pension_id"], "P001");
    assert_eq!(reply["monthly_amount"], 2500.0);
}

#[test]
fn errors_become_failure_envelopes() {
    let db = TempDb::new();
    let ctx = db.context();
    let registry = ToolRegistry::with_desk_tools();

    let reply = registry.call(&ctx, "transfer_everything", &json!({}));
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error_kind"], "unknown_tool");

    let reply = registry.call(&ctx, "check_fraud_status", &json!({ "customer_id": "C001" }));
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error_kind"], "invalid_argument");
    assert!(reply["error"].as_str().unwrap_or_default().contains("pension_id"));

    let reply = registry.call(&ctx, "get_financial_status", &json!({ "customer_id": "C404" }));
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error_kind"], "not_found");
}

#[test]
fn fraud_check_accepts_string_amounts() {
    let db = TempDb::new();
    let ctx = db.context();
    let registry = ToolRegistry::with_desk_tools();

    let reply = registry.call(
        &ctx,
        "check_fraud_status",
        &json!({ "customer_id": "C001", "pension_id": "P001", "amount": "2600" }),
    );
    assert_eq!(reply["success"], true, "{reply}");
    assert_eq!(reply["is_fraudulent"], false);
    assert_eq!(reply["recommendation"], "APPROVE");
}

#[test]
fn schedule_tool_confirms_and_lists() {
    let db = TempDb::new();
    let ctx = db.context();
    let registry = ToolRegistry::with_desk_tools();

    let reply = registry.call(
        &ctx,
        "schedule_recurring_deposit",
        &json!({ "customer_id": "C001", "frequency": "weekly" }),
    );
    assert_eq!(reply["success"], true, "{reply}");
    assert_eq!(reply["action"], "created");
    assert_eq!(reply["frequency"], "weekly");
    assert_eq!(reply["amount"], 2500.0);
    assert_eq!(reply["next_deposit_date"], "2026-03-27");

    let listing = registry.call(&ctx, "get_scheduled_deposits", &json!({}));
    assert_eq!(listing["success"], true);
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["schedules"][0]["customer_name"], "John Doe");
}

#[test]
fn schedule_tool_reports_fraud_rejects() {
    let db = TempDb::new();
    let ctx = db.context();
    let registry = ToolRegistry::with_desk_tools();

    let reply = registry.call(
        &ctx,
        "schedule_recurring_deposit",
        &json!({ "customer_id": "C002", "pension_id": "P002", "amount": 50 }),
    );
    assert_eq!(reply["success"], false, "{reply}");
    assert_eq!(reply["error"], "Transaction rejected due to fraud detection");
    assert_eq!(reply["fraud_check"]["recommendation"], "REJECT");
    assert_eq!(
        reply["message"],
        "FRAUD DETECTED: REJECT - Found 2 fraud indicators"
    );

    let listing = registry.call(&ctx, "get_scheduled_deposits", &json!({ "customer_id": "C002" }));
    assert_eq!(listing["count"], 0);
}

#[test]
fn initialize_database_resets_state() {
    let db = TempDb::new();
    let ctx = db.context();
    let registry = ToolRegistry::with_desk_tools();

    let reply = registry.call(&ctx, "schedule_recurring_deposit", &json!({ "customer_id": "C003" }));
    assert_eq!(reply["success"], true, "{reply}");

    let reply = registry.call(&ctx, "initialize_database", &json!({}));
    assert_eq!(reply["success"], true, "{reply}");
    assert_eq!(reply["customers"].as_array().map(Vec::len), Some(3));
    assert_eq!(reply["pensions"][2]["id"], "P003");

    let listing = registry.call(&ctx, "get_scheduled_deposits", &json!({}));
    assert_eq!(listing["count"], 0);
}
