//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Fraud checks, scheduling and reports call store methods; they never
//! execute SQL directly.

use crate::error::DeskResult;
use rusqlite::{Connection, OpenFlags};

mod customer;
mod finance;
mod fraud;
mod pension;
mod schedule;
mod transaction;

pub use customer::CustomerRow;
pub use finance::{BillRow, CategoryTotal, FinancialStatusRow, IncomeRow, SpendingRow, TaxTipRow};
pub use fraud::FraudIndicatorRow;
pub use pension::PensionRow;
pub use schedule::{ScheduleListing, ScheduleRow, ScheduleTarget};
pub use transaction::TransactionRow;

/// Tables in drop order (children before parents).
const TABLES: &[&str] = &[
    "tax_tips",
    "income",
    "bills",
    "spending",
    "financial_status",
    "scheduled_deposits",
    "fraud_indicators",
    "transactions",
    "pension_details",
    "customers",
];

pub struct DeskStore {
    conn: Connection,
    path: Option<String>, // None for :memory:
}

impl DeskStore {
    pub fn open(path: &str) -> DeskResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        log::debug!("Opened store at {path}");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DeskResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order. Idempotent.
    pub fn migrate(&self) -> DeskResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_core_banking.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_financial_status.sql"))?;
        Ok(())
    }

    /// Drop every desk table. Callers re-run `migrate` afterwards.
    pub fn drop_all_tables(&self) -> DeskResult<()> {
        for table in TABLES {
            self.conn
                .execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
        }
        Ok(())
    }

    /// Run raw SQL against the connection. Test fixtures only (e.g.
    /// installing a failing trigger); desk code goes through typed methods.
    #[doc(hidden)]
    pub fn execute_batch(&self, sql: &str) -> DeskResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Run `f` inside one SQLite transaction. Any error returned by `f`
    /// drops the transaction, which rolls back every write it made.
    /// Not reentrant: `f` must not call `in_transaction` again.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> DeskResult<T>) -> DeskResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeskError;

    fn customer(id: &str) -> CustomerRow {
        CustomerRow {
            customer_id: id.into(),
            name: "Test Customer".into(),
            account_number: "ACC0000".into(),
            age: Some(70),
            email: None,
            phone: None,
        }
    }

    #[test]
    fn migrate_is_idempotent() {
        let store = DeskStore::in_memory().unwrap();
        store.migrate().unwrap();
        store.migrate().unwrap();
        assert_eq!(store.customer_count().unwrap(), 0);
    }

    #[test]
    fn failed_transaction_rolls_back_every_write() {
        let store = DeskStore::in_memory().unwrap();
        store.migrate().unwrap();

        let result: DeskResult<()> = store.in_transaction(|s| {
            s.insert_customer(&customer("C100"), "2026-03-20T10:00:00")?;
            Err(DeskError::Other(anyhow::anyhow!("boom")))
        });
        assert!(result.is_err());
        assert_eq!(store.customer_count().unwrap(), 0);

        store
            .in_transaction(|s| s.insert_customer(&customer("C101"), "2026-03-20T10:00:00"))
            .unwrap();
        assert_eq!(store.customer_count().unwrap(), 1);
    }

    #[test]
    fn drop_all_tables_then_migrate_leaves_empty_schema() {
        let store = DeskStore::in_memory().unwrap();
        store.migrate().unwrap();
        store
            .insert_customer(&customer("C102"), "2026-03-20T10:00:00")
            .unwrap();

        store.drop_all_tables().unwrap();
        store.migrate().unwrap();
        assert_eq!(store.customer_count().unwrap(), 0);
    }
}
