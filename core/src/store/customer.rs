use super::DeskStore;
use crate::error::DeskResult;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRow {
    pub customer_id: String,
    pub name: String,
    pub account_number: String,
    pub age: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl DeskStore {
    // ── Customer ──────────────────────────────────────────────────

    pub fn insert_customer(&self, c: &CustomerRow, created_at: &str) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO customers (customer_id, name, account_number, age, email, phone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &c.customer_id,
                &c.name,
                &c.account_number,
                c.age,
                &c.email,
                &c.phone,
                created_at
            ],
        )?;
        Ok(())
    }

    pub fn get_customer(&self, customer_id: &str) -> DeskResult<Option<CustomerRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT customer_id, name, account_number, age, email, phone
                 FROM customers WHERE customer_id = ?1",
                params![customer_id],
                |r| {
                    Ok(CustomerRow {
                        customer_id: r.get(0)?,
                        name: r.get(1)?,
                        account_number: r.get(2)?,
                        age: r.get(3)?,
                        email: r.get(4)?,
                        phone: r.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn all_customers(&self) -> DeskResult<Vec<CustomerRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, name, account_number, age, email, phone
             FROM customers ORDER BY customer_id",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok(CustomerRow {
                customer_id: r.get(0)?,
                name: r.get(1)?,
                account_number: r.get(2)?,
                age: r.get(3)?,
                email: r.get(4)?,
                phone: r.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn customer_count(&self) -> DeskResult<i64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM customers", [], |r| r.get(0))?;
        Ok(n)
    }
}
