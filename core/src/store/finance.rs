use super::DeskStore;
use crate::error::DeskResult;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatusRow {
    pub status_id: String,
    pub customer_id: String,
    pub net_worth: f64,
    pub current_balance: f64,
    pub emergency_fund: f64,
    pub emergency_target: f64,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingRow {
    pub customer_id: String,
    pub category: String,
    pub amount: f64,
    pub description: Option<String>,
    pub spending_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillRow {
    pub customer_id: String,
    pub bill_name: String,
    pub amount: f64,
    pub due_date: String,
    pub status: String, // pending | paid
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRow {
    pub customer_id: String,
    pub income_type: String,
    pub amount: f64,
    pub expected_date: String,
    pub actual_date: Option<String>,
    pub status: String, // pending | delayed | received
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTipRow {
    pub customer_id: String,
    pub tip_category: String,
    pub suggestion: String,
    pub estimated_savings: Option<f64>,
    pub applicable_period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub transaction_count: i64,
}

fn income_from_row(r: &Row<'_>) -> rusqlite::Result<IncomeRow> {
    Ok(IncomeRow {
        customer_id: r.get(0)?,
        income_type: r.get(1)?,
        amount: r.get(2)?,
        expected_date: r.get(3)?,
        actual_date: r.get(4)?,
        status: r.get(5)?,
    })
}

impl DeskStore {
    // ── Financial status ──────────────────────────────────────────

    pub fn insert_financial_status(&self, s: &FinancialStatusRow) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO financial_status (
                status_id, customer_id, net_worth, current_balance,
                emergency_fund, emergency_target, last_updated
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &s.status_id,
                &s.customer_id,
                s.net_worth,
                s.current_balance,
                s.emergency_fund,
                s.emergency_target,
                &s.last_updated
            ],
        )?;
        Ok(())
    }

    pub fn financial_status(&self, customer_id: &str) -> DeskResult<Option<FinancialStatusRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT status_id, customer_id, net_worth, current_balance,
                        emergency_fund, emergency_target, last_updated
                 FROM financial_status WHERE customer_id = ?1",
                params![customer_id],
                |r| {
                    Ok(FinancialStatusRow {
                        status_id: r.get(0)?,
                        customer_id: r.get(1)?,
                        net_worth: r.get(2)?,
                        current_balance: r.get(3)?,
                        emergency_fund: r.get(4)?,
                        emergency_target: r.get(5)?,
                        last_updated: r.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    // ── Spending ──────────────────────────────────────────────────

    pub fn insert_spending(&self, s: &SpendingRow) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO spending (customer_id, category, amount, description, spending_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![&s.customer_id, &s.category, s.amount, &s.description, &s.spending_date],
        )?;
        Ok(())
    }

    pub fn sum_spending_since(&self, customer_id: &str, since: &str) -> DeskResult<f64> {
        let total: Option<f64> = self.conn.query_row(
            "SELECT SUM(amount) FROM spending
             WHERE customer_id = ?1 AND spending_date >= ?2",
            params![customer_id, since],
            |r| r.get(0),
        )?;
        Ok(total.unwrap_or(0.0))
    }

    /// Spending since `since` grouped by category, largest first.
    pub fn spending_by_category_since(
        &self,
        customer_id: &str,
        since: &str,
    ) -> DeskResult<Vec<CategoryTotal>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, SUM(amount) AS total, COUNT(*)
             FROM spending
             WHERE customer_id = ?1 AND spending_date >= ?2
             GROUP BY category
             ORDER BY total DESC, category ASC",
        )?;
        let rows = stmt.query_map(params![customer_id, since], |r| {
            Ok(CategoryTotal {
                category: r.get(0)?,
                amount: r.get(1)?,
                transaction_count: r.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Bills ─────────────────────────────────────────────────────

    pub fn insert_bill(&self, b: &BillRow) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO bills (customer_id, bill_name, amount, due_date, status, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![&b.customer_id, &b.bill_name, b.amount, &b.due_date, &b.status, &b.category],
        )?;
        Ok(())
    }

    /// Pending bills due on or after `from`, soonest first.
    pub fn pending_bills_due_from(&self, customer_id: &str, from: &str) -> DeskResult<Vec<BillRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, bill_name, amount, due_date, status, category
             FROM bills
             WHERE customer_id = ?1 AND due_date >= ?2 AND status = 'pending'
             ORDER BY due_date ASC, bill_id ASC",
        )?;
        let rows = stmt.query_map(params![customer_id, from], |r| {
            Ok(BillRow {
                customer_id: r.get(0)?,
                bill_name: r.get(1)?,
                amount: r.get(2)?,
                due_date: r.get(3)?,
                status: r.get(4)?,
                category: r.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn sum_pending_bills_due_from(&self, customer_id: &str, from: &str) -> DeskResult<f64> {
        let total: Option<f64> = self.conn.query_row(
            "SELECT SUM(amount) FROM bills
             WHERE customer_id = ?1 AND due_date >= ?2 AND status = 'pending'",
            params![customer_id, from],
            |r| r.get(0),
        )?;
        Ok(total.unwrap_or(0.0))
    }

    // ── Income ────────────────────────────────────────────────────

    pub fn insert_income(&self, i: &IncomeRow) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO income (customer_id, income_type, amount, expected_date, actual_date, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &i.customer_id,
                &i.income_type,
                i.amount,
                &i.expected_date,
                &i.actual_date,
                &i.status
            ],
        )?;
        Ok(())
    }

    /// Income expected within `[from, to]`, soonest first.
    pub fn income_expected_between(
        &self,
        customer_id: &str,
        from: &str,
        to: &str,
    ) -> DeskResult<Vec<IncomeRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, income_type, amount, expected_date, actual_date, status
             FROM income
             WHERE customer_id = ?1 AND expected_date BETWEEN ?2 AND ?3
             ORDER BY expected_date ASC, income_id ASC",
        )?;
        let rows = stmt.query_map(params![customer_id, from, to], income_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Income expected on or after `from`, soonest first.
    pub fn income_expected_since(&self, customer_id: &str, from: &str) -> DeskResult<Vec<IncomeRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, income_type, amount, expected_date, actual_date, status
             FROM income
             WHERE customer_id = ?1 AND expected_date >= ?2
             ORDER BY expected_date ASC, income_id ASC",
        )?;
        let rows = stmt.query_map(params![customer_id, from], income_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Tax tips ──────────────────────────────────────────────────

    pub fn insert_tax_tip(&self, t: &TaxTipRow) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO tax_tips (customer_id, tip_category, suggestion, estimated_savings, applicable_period)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &t.customer_id,
                &t.tip_category,
                &t.suggestion,
                t.estimated_savings,
                &t.applicable_period
            ],
        )?;
        Ok(())
    }

    /// Largest estimated savings first.
    pub fn tax_tips(&self, customer_id: &str) -> DeskResult<Vec<TaxTipRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, tip_category, suggestion, estimated_savings, applicable_period
             FROM tax_tips
             WHERE customer_id = ?1
             ORDER BY estimated_savings DESC, tip_id ASC",
        )?;
        let rows = stmt.query_map(params![customer_id], |r| {
            Ok(TaxTipRow {
                customer_id: r.get(0)?,
                tip_category: r.get(1)?,
                suggestion: r.get(2)?,
                estimated_savings: r.get(3)?,
                applicable_period: r.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
