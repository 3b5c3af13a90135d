use anyhow::Result;
use rusqlite::{OptionalExtension, params};

use crate::Database;
use crate::models::ReadingPlanRow;

impl Database {
    pub fn create_reading_plan(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
        duration_days: u32,
        is_public: bool,
        created_by: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO reading_plans (id, name, description, duration_days, is_public, created_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, name, description, duration_days, is_public, created_by],
            )?;
            Ok(())
        })
    }

    pub fn reading_plan_creator(&self, id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let creator = conn
                .query_row(
                    "SELECT created_by FROM reading_plans WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(creator)
        })
    }

    pub fn reading_plan_duration(&self, id: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let duration = conn
                .query_row(
                    "SELECT duration_days FROM reading_plans WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(duration)
        })
    }

    pub fn delete_reading_plan(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM reading_plans WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn list_public_plans(&self) -> Result<Vec<ReadingPlanRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.name, p.description, p.duration_days, p.is_public,
                        p.created_by, u.first_name, u.last_name,
                        (SELECT COUNT(*) FROM reading_plan_assignments a
                         WHERE a.plan_id = p.id),
                        p.created_at
                 FROM reading_plans p
                 JOIN users u ON p.created_by = u.id
                 WHERE p.is_public = 1
                 ORDER BY p.created_at DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ReadingPlanRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        duration_days: row.get(3)?,
                        is_public: row.get(4)?,
                        created_by: row.get(5)?,
                        creator_first_name: row.get(6)?,
                        creator_last_name: row.get(7)?,
                        assignment_count: row.get(8)?,
                        start_date: None,
                        progress_count: None,
                        created_at: row.get(9)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Plans the user has joined, with their start date and how many days
    /// they have completed so far.
    pub fn list_my_plans(&self, user_id: &str) -> Result<Vec<ReadingPlanRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.name, p.description, p.duration_days, p.is_public,
                        p.created_by, u.first_name, u.last_name,
                        (SELECT COUNT(*) FROM reading_plan_assignments x
                         WHERE x.plan_id = p.id),
                        a.start_date,
                        (SELECT COUNT(*) FROM reading_progress rp
                         WHERE rp.assignment_id = a.id),
                        p.created_at
                 FROM reading_plan_assignments a
                 JOIN reading_plans p ON a.plan_id = p.id
                 JOIN users u ON p.created_by = u.id
                 WHERE a.user_id = ?1
                 ORDER BY a.start_date DESC",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(ReadingPlanRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        duration_days: row.get(3)?,
                        is_public: row.get(4)?,
                        created_by: row.get(5)?,
                        creator_first_name: row.get(6)?,
                        creator_last_name: row.get(7)?,
                        assignment_count: row.get(8)?,
                        start_date: row.get(9)?,
                        progress_count: row.get(10)?,
                        created_at: row.get(11)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Idempotent join: a second join keeps the original start date.
    pub fn join_reading_plan(
        &self,
        assignment_id: &str,
        plan_id: &str,
        user_id: &str,
        start_date: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO reading_plan_assignments (id, plan_id, user_id, start_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![assignment_id, plan_id, user_id, start_date],
            )?;
            Ok(())
        })
    }

    /// Records a completed day. Returns the new completed-day count, or None
    /// when the user has no assignment for the plan.
    pub fn record_reading_progress(
        &self,
        plan_id: &str,
        user_id: &str,
        day: u32,
    ) -> Result<Option<i64>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let assignment: Option<String> = tx
                .query_row(
                    "SELECT id FROM reading_plan_assignments
                     WHERE plan_id = ?1 AND user_id = ?2",
                    params![plan_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(assignment_id) = assignment else {
                return Ok(None);
            };

            tx.execute(
                "INSERT OR IGNORE INTO reading_progress (assignment_id, day)
                 VALUES (?1, ?2)",
                params![assignment_id, day],
            )?;
            let count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM reading_progress WHERE assignment_id = ?1",
                [&assignment_id],
                |row| row.get(0),
            )?;

            tx.commit()?;
            Ok(Some(count))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::queries::test_support::{db, seed_user};

    #[test]
    fn join_is_idempotent_and_keeps_start_date() {
        let db = db();
        seed_user(&db, "u1", "creator@example.com");
        seed_user(&db, "u2", "reader@example.com");
        db.create_reading_plan("rp1", "Psalms in 30 days", None, 30, true, "u1")
            .unwrap();

        db.join_reading_plan("a1", "rp1", "u2", "2026-08-01").unwrap();
        db.join_reading_plan("a2", "rp1", "u2", "2026-08-20").unwrap();

        let mine = db.list_my_plans("u2").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].start_date.as_deref(), Some("2026-08-01"));
        assert_eq!(mine[0].assignment_count, 1);
    }

    #[test]
    fn progress_counts_each_day_once() {
        let db = db();
        seed_user(&db, "u1", "creator@example.com");
        db.create_reading_plan("rp1", "Psalms in 30 days", None, 30, true, "u1")
            .unwrap();
        db.join_reading_plan("a1", "rp1", "u1", "2026-08-01").unwrap();

        assert_eq!(db.record_reading_progress("rp1", "u1", 1).unwrap(), Some(1));
        assert_eq!(db.record_reading_progress("rp1", "u1", 1).unwrap(), Some(1));
        assert_eq!(db.record_reading_progress("rp1", "u1", 2).unwrap(), Some(2));

        let mine = db.list_my_plans("u1").unwrap();
        assert_eq!(mine[0].progress_count, Some(2));
    }

    #[test]
    fn progress_without_assignment_is_rejected() {
        let db = db();
        seed_user(&db, "u1", "creator@example.com");
        db.create_reading_plan("rp1", "Psalms in 30 days", None, 30, true, "u1")
            .unwrap();

        assert_eq!(db.record_reading_progress("rp1", "u1", 1).unwrap(), None);
    }

    #[test]
    fn public_listing_hides_private_plans() {
        let db = db();
        seed_user(&db, "u1", "creator@example.com");
        db.create_reading_plan("rp1", "Public plan", None, 7, true, "u1")
            .unwrap();
        db.create_reading_plan("rp2", "Private plan", None, 7, false, "u1")
            .unwrap();

        let plans = db.list_public_plans().unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].name, "Public plan");
    }
}
