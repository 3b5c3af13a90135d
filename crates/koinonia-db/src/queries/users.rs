use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use crate::Database;
use crate::models::UserRow;

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password, first_name, last_name)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, email, password_hash, first_name, last_name),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is a compile-time constant at both call sites, never user input
    let sql = format!(
        "SELECT id, email, password, first_name, last_name, avatar_url, created_at
         FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                password: row.get(2)?,
                first_name: row.get(3)?,
                last_name: row.get(4)?,
                avatar_url: row.get(5)?,
                created_at: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use crate::queries::test_support::{db, seed_user};

    #[test]
    fn create_and_fetch_user() {
        let db = db();
        seed_user(&db, "u1", "grace@example.com");

        let user = db.get_user_by_email("grace@example.com").unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.first_name, "Test");

        assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
        assert!(db.get_user_by_id("u1").unwrap().is_some());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = db();
        seed_user(&db, "u1", "grace@example.com");
        let err = db.create_user("u2", "grace@example.com", "hash", "A", "B");
        assert!(err.is_err());
    }
}
