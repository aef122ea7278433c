use super::DeskStore;
use crate::error::DeskResult;
use rusqlite::params;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub transaction_id: String,
    pub customer_id: String,
    pub pension_id: String,
    pub amount: f64,
    pub transaction_date: String,
    pub transaction_type: String, // deposit | withdrawal
    pub status: String,           // pending | scheduled | completed
    pub is_fraudulent: bool,
    pub scheduled_date: Option<String>,
}

impl DeskStore {
    // ── Transaction log (append-only) ─────────────────────────────

    pub fn insert_transaction(&self, t: &TransactionRow) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO transactions (
                transaction_id, customer_id, pension_id, amount, transaction_date,
                transaction_type, status, is_fraudulent, scheduled_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &t.transaction_id,
                &t.customer_id,
                &t.pension_id,
                t.amount,
                &t.transaction_date,
                &t.transaction_type,
                &t.status,
                if t.is_fraudulent { 1 } else { 0 },
                &t.scheduled_date
            ],
        )?;
        Ok(())
    }

    /// Newest first.
    pub fn recent_transactions(&self, customer_id: &str, limit: usize) -> DeskResult<Vec<TransactionRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT transaction_id, customer_id, pension_id, amount, transaction_date,
                    transaction_type, status, is_fraudulent, scheduled_date
             FROM transactions WHERE customer_id = ?1
             ORDER BY transaction_date DESC, rowid DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![customer_id, limit as i64], |r| {
            Ok(TransactionRow {
                transaction_id: r.get(0)?,
                customer_id: r.get(1)?,
                pension_id: r.get(2)?,
                amount: r.get(3)?,
                transaction_date: r.get(4)?,
                transaction_type: r.get(5)?,
                status: r.get(6)?,
                is_fraudulent: r.get::<_, i32>(7)? != 0,
                scheduled_date: r.get(8)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Transactions for the customer strictly after `since`.
    pub fn count_transactions_since(&self, customer_id: &str, since: &str) -> DeskResult<i64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions
             WHERE customer_id = ?1 AND transaction_date > ?2",
            params![customer_id, since],
            |r| r.get(0),
        )?;
        Ok(n)
    }

    pub fn transaction_count(&self, customer_id: &str) -> DeskResult<i64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE customer_id = ?1",
            params![customer_id],
            |r| r.get(0),
        )?;
        Ok(n)
    }
}
