//! The desk's tools, as exposed to the host agent.

use crate::{
    deposit_schedule::{DepositScheduler, Frequency, ScheduleOutcome, ScheduleRequest},
    error::DeskResult,
    fraud_detection::FraudChecker,
    registry::{
        optional_f64, optional_str, required_f64, required_str, success, with_success, Tool,
        ToolContext, ToolRegistry,
    },
    reports, seed,
    store::DeskStore,
};
use chrono::NaiveDateTime;
use serde_json::{json, Value};

pub fn register_all(registry: &mut ToolRegistry) {
    registry.register(Box::new(InitializeDatabase));
    registry.register(Box::new(GetPensionDetails));
    registry.register(Box::new(CheckFraudStatus));
    registry.register(Box::new(ScheduleRecurringDeposit));
    registry.register(Box::new(GetScheduledDeposits));
    for tool in customer_reports() {
        registry.register(Box::new(tool));
    }
}

fn customer_id_schema() -> Value {
    json!({
        "type": "string",
        "description": "The unique identifier for the customer (e.g., C001)"
    })
}

fn customer_only_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "customer_id": customer_id_schema() },
        "required": ["customer_id"]
    })
}

// ── Database administration ──────────────────────────────────────────

pub struct InitializeDatabase;

impl Tool for InitializeDatabase {
    fn name(&self) -> &'static str {
        "initialize_database"
    }

    fn description(&self) -> &'static str {
        "Reset the database and recreate the three sample customers (C001, C002, C003) \
         with their pensions and household finances."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn invoke(&self, ctx: &ToolContext, _args: &Value) -> DeskResult<Value> {
        let store = DeskStore::open(&ctx.config().db_path)?;
        seed::reset(&store, ctx.now())?;

        let customers: Vec<Value> = store
            .all_customers()?
            .into_iter()
            .map(|c| json!({ "id": c.customer_id, "name": c.name }))
            .collect();
        let pensions: Vec<Value> = store
            .all_pensions()?
            .into_iter()
            .map(|p| json!({ "id": p.pension_id, "customer_id": p.customer_id, "amount": p.monthly_amount }))
            .collect();

        success(json!({
            "message": "Database initialized successfully. Pension deposits can be set up for customers C001, C002 or C003.",
            "db_path": store.path(),
            "customers": customers,
            "pensions": pensions,
        }))
    }
}

// ── Pension tools ────────────────────────────────────────────────────

pub struct GetPensionDetails;

impl Tool for GetPensionDetails {
    fn name(&self) -> &'static str {
        "get_pension_details"
    }

    fn description(&self) -> &'static str {
        "Retrieve a customer's active pension from the core banking system: pension type, \
         monthly amount, bank account and the five most recent transactions."
    }

    fn parameters(&self) -> Value {
        customer_only_schema()
    }

    fn invoke(&self, ctx: &ToolContext, args: &Value) -> DeskResult<Value> {
        let customer_id = required_str(args, "customer_id")?;
        let store = ctx.open_store()?;
        success(reports::pension_details(&store, customer_id)?)
    }
}

pub struct CheckFraudStatus;

impl Tool for CheckFraudStatus {
    fn name(&self) -> &'static str {
        "check_fraud_status"
    }

    fn description(&self) -> &'static str {
        "Check whether a proposed pension deposit is fraudulent: amount deviation, low-value, \
         velocity and recent fraud history checks. Returns indicators, a fraud score and an \
         APPROVE/REJECT recommendation."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_id": customer_id_schema(),
                "pension_id": {
                    "type": "string",
                    "description": "The pension account identifier (e.g., P001)"
                },
                "amount": {
                    "type": "number",
                    "description": "The deposit amount to verify (e.g., 800.50)"
                }
            },
            "required": ["customer_id", "pension_id", "amount"]
        })
    }

    fn invoke(&self, ctx: &ToolContext, args: &Value) -> DeskResult<Value> {
        let customer_id = required_str(args, "customer_id")?;
        let pension_id = required_str(args, "pension_id")?;
        let amount = required_f64(args, "amount")?;

        let store = ctx.open_store()?;
        let verdict = FraudChecker::new(&store, &ctx.config().fraud).check(
            customer_id,
            pension_id,
            amount,
            ctx.now(),
        )?;
        success(verdict)
    }
}

pub struct ScheduleRecurringDeposit;

impl Tool for ScheduleRecurringDeposit {
    fn name(&self) -> &'static str {
        "schedule_recurring_deposit"
    }

    fn description(&self) -> &'static str {
        "Schedule or update a recurring pension deposit. The pension account and amount default \
         to the customer's active pension. A fraud check runs first; rejected deposits are not \
         scheduled."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_id": customer_id_schema(),
                "pension_id": {
                    "type": "string",
                    "description": "Optional pension account identifier; defaults to the active pension"
                },
                "amount": {
                    "type": "number",
                    "description": "Optional deposit amount; defaults to the standard pension amount"
                },
                "frequency": {
                    "type": "string",
                    "description": "Deposit frequency: monthly (default) or weekly",
                    "default": "monthly"
                }
            },
            "required": ["customer_id"]
        })
    }

    fn invoke(&self, ctx: &ToolContext, args: &Value) -> DeskResult<Value> {
        let mut request = ScheduleRequest::new(required_str(args, "customer_id")?);
        if let Some(pension_id) = optional_str(args, "pension_id")? {
            request = request.pension(pension_id);
        }
        if let Some(amount) = optional_f64(args, "amount")? {
            request = request.amount(amount);
        }
        if let Some(frequency) = optional_str(args, "frequency")? {
            request = request.frequency(Frequency::parse(frequency));
        }

        let store = ctx.open_store()?;
        match DepositScheduler::new(&store, &ctx.config().fraud).schedule(request, ctx.now())? {
            ScheduleOutcome::Scheduled(confirmation) => success(confirmation),
            ScheduleOutcome::Rejected { request, verdict } => with_success(
                json!({
                    "error": "Transaction rejected due to fraud detection",
                    "customer_id": request.customer_id,
                    "pension_id": request.pension_id,
                    "amount": request.amount,
                    "message": format!(
                        "FRAUD DETECTED: REJECT - Found {} fraud indicators",
                        verdict.score
                    ),
                    "fraud_check": verdict,
                }),
                false,
            ),
        }
    }
}

pub struct GetScheduledDeposits;

impl Tool for GetScheduledDeposits {
    fn name(&self) -> &'static str {
        "get_scheduled_deposits"
    }

    fn description(&self) -> &'static str {
        "List scheduled pension deposits with amount, frequency, next deposit date and status, \
         optionally for one customer."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_id": {
                    "type": "string",
                    "description": "Optional customer ID filter (e.g., C001); omit for all schedules"
                }
            }
        })
    }

    fn invoke(&self, ctx: &ToolContext, args: &Value) -> DeskResult<Value> {
        let customer_id = optional_str(args, "customer_id")?;
        let store = ctx.open_store()?;
        success(reports::scheduled_deposits(&store, customer_id)?)
    }
}

// ── Per-customer status reports ──────────────────────────────────────

type ReportFn = fn(&DeskStore, &str, NaiveDateTime) -> DeskResult<Value>;

/// A read-only report keyed by customer id.
pub struct CustomerReport {
    name: &'static str,
    description: &'static str,
    run: ReportFn,
}

impl Tool for CustomerReport {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn parameters(&self) -> Value {
        customer_only_schema()
    }

    fn invoke(&self, ctx: &ToolContext, args: &Value) -> DeskResult<Value> {
        let customer_id = required_str(args, "customer_id")?;
        let store = ctx.open_store()?;
        (self.run)(&store, customer_id, ctx.now())
    }
}

fn customer_reports() -> Vec<CustomerReport> {
    vec![
        CustomerReport {
            name: "get_financial_status",
            description: "Financial snapshot: net worth, current balance, this month's spending, \
                          upcoming bills and emergency fund.",
            run: |store, id, now| success(reports::financial_status(store, id, now)?),
        },
        CustomerReport {
            name: "check_bill_sufficiency",
            description: "Compare the current balance with upcoming bills and report the surplus \
                          or deficit.",
            run: |store, id, now| success(reports::bill_sufficiency(store, id, now)?),
        },
        CustomerReport {
            name: "get_upcoming_bills",
            description: "Pending bills due today or later, soonest first, with their total.",
            run: |store, id, now| success(reports::upcoming_bills(store, id, now)?),
        },
        CustomerReport {
            name: "get_emergency_fund_status",
            description: "Emergency fund balance against its target: gap, percentage achieved \
                          and a recommendation.",
            run: |store, id, _| success(reports::emergency_fund_status(store, id)?),
        },
        CustomerReport {
            name: "get_income_status",
            description: "Income expected within 30 days either side of today, flagging delayed \
                          deposits.",
            run: |store, id, now| success(reports::income_status(store, id, now)?),
        },
        CustomerReport {
            name: "get_monthly_income",
            description: "Income expected from the first of the current month onwards.",
            run: |store, id, now| success(reports::monthly_income(store, id, now)?),
        },
        CustomerReport {
            name: "get_tax_tips",
            description: "Personalized tax-saving suggestions with estimated annual savings.",
            run: |store, id, _| success(reports::tax_tips(store, id)?),
        },
        CustomerReport {
            name: "get_monthly_spending",
            description: "This month's spending broken down by category, largest first.",
            run: |store, id, now| success(reports::monthly_spending(store, id, now)?),
        },
    ]
}
