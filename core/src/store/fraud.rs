use super::DeskStore;
use crate::error::DeskResult;
use rusqlite::params;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudIndicatorRow {
    pub indicator_id: i64,
    pub customer_id: String,
    pub indicator_type: String,
    pub description: Option<String>,
    pub severity: String,
    pub detected_at: String,
}

impl DeskStore {
    // ── Fraud indicators (append-only) ────────────────────────────

    pub fn insert_fraud_indicator(
        &self,
        customer_id: &str,
        indicator_type: &str,
        description: &str,
        severity: &str,
        detected_at: &str,
    ) -> DeskResult<i64> {
        self.conn.execute(
            "INSERT INTO fraud_indicators (customer_id, indicator_type, description, severity, detected_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![customer_id, indicator_type, description, severity, detected_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Indicators of one severity detected strictly after `since`,
    /// newest first.
    pub fn recent_fraud_indicators(
        &self,
        customer_id: &str,
        severity: &str,
        since: &str,
        limit: usize,
    ) -> DeskResult<Vec<FraudIndicatorRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT indicator_id, customer_id, indicator_type, description, severity, detected_at
             FROM fraud_indicators
             WHERE customer_id = ?1 AND severity = ?2 AND detected_at > ?3
             ORDER BY detected_at DESC, indicator_id DESC
             LIMIT ?4",
        )?;
        let rows = stmt.query_map(params![customer_id, severity, since, limit as i64], |r| {
            Ok(FraudIndicatorRow {
                indicator_id: r.get(0)?,
                customer_id: r.get(1)?,
                indicator_type: r.get(2)?,
                description: r.get(3)?,
                severity: r.get(4)?,
                detected_at: r.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn fraud_indicator_count(&self, customer_id: &str) -> DeskResult<i64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM fraud_indicators WHERE customer_id = ?1",
            params![customer_id],
            |r| r.get(0),
        )?;
        Ok(n)
    }
}
