use anyhow::Result;
use rusqlite::Connection;

use crate::Database;

/// Dashboard tile counts. One query per entity type; the API layer issues
/// them concurrently and fails the whole request if any branch fails.
impl Database {
    pub fn count_circles(&self) -> Result<i64> {
        self.with_conn(|conn| count(conn, "circles"))
    }

    pub fn count_testimonies(&self) -> Result<i64> {
        self.with_conn(|conn| count(conn, "testimonies"))
    }

    pub fn count_prayers(&self) -> Result<i64> {
        self.with_conn(|conn| count(conn, "prayer_requests"))
    }

    pub fn count_events(&self) -> Result<i64> {
        self.with_conn(|conn| count(conn, "events"))
    }
}

fn count(conn: &Connection, table: &str) -> Result<i64> {
    // table names are compile-time constants above, never user input
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(n)
}
