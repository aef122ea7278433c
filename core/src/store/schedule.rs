use super::DeskStore;
use crate::error::DeskResult;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub schedule_id: String,
    pub customer_id: String,
    pub pension_id: String,
    pub amount: f64,
    pub frequency: String,
    pub next_deposit_date: String,
    pub status: String, // active | cancelled
    pub created_at: String,
}

/// A schedule joined with its customer's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleListing {
    pub schedule_id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub pension_id: String,
    pub amount: f64,
    pub frequency: String,
    pub next_deposit_date: String,
    pub status: String,
}

/// What a schedule confirmation needs to know about the pair it targets.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTarget {
    pub customer_name: String,
    pub pension_type: String,
    pub bank_account: Option<String>,
}

impl DeskStore {
    // ── Scheduled deposits ────────────────────────────────────────

    pub fn schedule_target(
        &self,
        customer_id: &str,
        pension_id: &str,
    ) -> DeskResult<Option<ScheduleTarget>> {
        let row = self
            .conn
            .query_row(
                "SELECT c.name, p.pension_type, p.bank_account
                 FROM customers c
                 JOIN pension_details p ON c.customer_id = p.customer_id
                 WHERE c.customer_id = ?1 AND p.pension_id = ?2",
                params![customer_id, pension_id],
                |r| {
                    Ok(ScheduleTarget {
                        customer_name: r.get(0)?,
                        pension_type: r.get(1)?,
                        bank_account: r.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn active_schedule(
        &self,
        customer_id: &str,
        pension_id: &str,
    ) -> DeskResult<Option<ScheduleRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT schedule_id, customer_id, pension_id, amount, frequency,
                        next_deposit_date, status, created_at
                 FROM scheduled_deposits
                 WHERE customer_id = ?1 AND pension_id = ?2 AND status = 'active'",
                params![customer_id, pension_id],
                |r| {
                    Ok(ScheduleRow {
                        schedule_id: r.get(0)?,
                        customer_id: r.get(1)?,
                        pension_id: r.get(2)?,
                        amount: r.get(3)?,
                        frequency: r.get(4)?,
                        next_deposit_date: r.get(5)?,
                        status: r.get(6)?,
                        created_at: r.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn insert_schedule(&self, s: &ScheduleRow) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO scheduled_deposits (
                schedule_id, customer_id, pension_id, amount, frequency,
                next_deposit_date, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &s.schedule_id,
                &s.customer_id,
                &s.pension_id,
                s.amount,
                &s.frequency,
                &s.next_deposit_date,
                &s.status,
                &s.created_at
            ],
        )?;
        Ok(())
    }

    pub fn update_schedule(
        &self,
        schedule_id: &str,
        amount: f64,
        frequency: &str,
        next_deposit_date: &str,
    ) -> DeskResult<()> {
        self.conn.execute(
            "UPDATE scheduled_deposits
             SET amount = ?1, frequency = ?2, next_deposit_date = ?3
             WHERE schedule_id = ?4",
            params![amount, frequency, next_deposit_date, schedule_id],
        )?;
        Ok(())
    }

    /// All schedules (optionally for one customer), soonest first.
    pub fn schedule_listings(&self, customer_id: Option<&str>) -> DeskResult<Vec<ScheduleListing>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.schedule_id, s.customer_id, c.name, s.pension_id,
                    s.amount, s.frequency, s.next_deposit_date, s.status
             FROM scheduled_deposits s
             JOIN customers c ON s.customer_id = c.customer_id
             WHERE ?1 IS NULL OR s.customer_id = ?1
             ORDER BY s.next_deposit_date, s.schedule_id",
        )?;
        let rows = stmt.query_map(params![customer_id], |r| {
            Ok(ScheduleListing {
                schedule_id: r.get(0)?,
                customer_id: r.get(1)?,
                customer_name: r.get(2)?,
                pension_id: r.get(3)?,
                amount: r.get(4)?,
                frequency: r.get(5)?,
                next_deposit_date: r.get(6)?,
                status: r.get(7)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn active_schedule_count(&self, customer_id: &str, pension_id: &str) -> DeskResult<i64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM scheduled_deposits
             WHERE customer_id = ?1 AND pension_id = ?2 AND status = 'active'",
            params![customer_id, pension_id],
            |r| r.get(0),
        )?;
        Ok(n)
    }

    pub fn schedule_count(&self) -> DeskResult<i64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scheduled_deposits", [], |r| r.get(0))?;
        Ok(n)
    }
}
