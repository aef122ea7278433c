use super::DeskStore;
use crate::error::DeskResult;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PensionRow {
    pub pension_id: String,
    pub customer_id: String,
    pub pension_type: String,
    pub monthly_amount: f64,
    pub start_date: String,
    pub status: String, // active | inactive
    pub bank_account: Option<String>,
    pub ifsc_code: Option<String>,
}

const PENSION_COLUMNS: &str = "pension_id, customer_id, pension_type, monthly_amount,
                               start_date, status, bank_account, ifsc_code";

fn pension_from_row(r: &Row<'_>) -> rusqlite::Result<PensionRow> {
    Ok(PensionRow {
        pension_id: r.get(0)?,
        customer_id: r.get(1)?,
        pension_type: r.get(2)?,
        monthly_amount: r.get(3)?,
        start_date: r.get(4)?,
        status: r.get(5)?,
        bank_account: r.get(6)?,
        ifsc_code: r.get(7)?,
    })
}

impl DeskStore {
    // ── Pension ───────────────────────────────────────────────────

    pub fn insert_pension(&self, p: &PensionRow) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO pension_details (
                pension_id, customer_id, pension_type, monthly_amount,
                start_date, status, bank_account, ifsc_code
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &p.pension_id,
                &p.customer_id,
                &p.pension_type,
                p.monthly_amount,
                &p.start_date,
                &p.status,
                &p.bank_account,
                &p.ifsc_code
            ],
        )?;
        Ok(())
    }

    /// The customer's active pension. With several active, the oldest wins.
    pub fn active_pension_for_customer(&self, customer_id: &str) -> DeskResult<Option<PensionRow>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {PENSION_COLUMNS} FROM pension_details
                     WHERE customer_id = ?1 AND status = 'active'
                     ORDER BY start_date ASC, pension_id ASC LIMIT 1"
                ),
                params![customer_id],
                pension_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// A specific pension, only if it belongs to `customer_id`. Any status.
    pub fn pension_for_customer(
        &self,
        customer_id: &str,
        pension_id: &str,
    ) -> DeskResult<Option<PensionRow>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {PENSION_COLUMNS} FROM pension_details
                     WHERE pension_id = ?1 AND customer_id = ?2"
                ),
                params![pension_id, customer_id],
                pension_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn all_pensions(&self) -> DeskResult<Vec<PensionRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PENSION_COLUMNS} FROM pension_details ORDER BY pension_id"
        ))?;
        let rows = stmt.query_map([], pension_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
