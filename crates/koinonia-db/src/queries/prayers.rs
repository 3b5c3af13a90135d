use anyhow::Result;
use rusqlite::{OptionalExtension, params};

use crate::Database;
use crate::models::PrayerRow;

impl Database {
    pub fn create_prayer(
        &self,
        id: &str,
        title: &str,
        content: &str,
        author_id: &str,
        is_public: bool,
        is_urgent: bool,
        circle_id: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO prayer_requests
                     (id, title, content, author_id, is_public, is_urgent, circle_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, title, content, author_id, is_public, is_urgent, circle_id],
            )?;
            Ok(())
        })
    }

    pub fn prayer_author(&self, id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let author = conn
                .query_row(
                    "SELECT author_id FROM prayer_requests WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(author)
        })
    }

    pub fn set_prayer_status(&self, id: &str, status: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE prayer_requests SET status = ?2 WHERE id = ?1",
                params![id, status],
            )?;
            Ok(())
        })
    }

    pub fn delete_prayer(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM prayer_requests WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// Upsert keyed (prayer, user): supporting twice leaves exactly one row.
    pub fn support_prayer(&self, prayer_id: &str, user_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO prayer_support (prayer_id, user_id)
                 VALUES (?1, ?2)",
                params![prayer_id, user_id],
            )?;
            Ok(())
        })
    }

    pub fn prayer_support_count(&self, prayer_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM prayer_support WHERE prayer_id = ?1",
                [prayer_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Visibility is enforced here, not in the client: public requests,
    /// the viewer's own, and requests scoped to circles the viewer belongs
    /// to. Status/urgency filters narrow further.
    pub fn list_prayers(
        &self,
        viewer_id: &str,
        status: Option<&str>,
        urgent_only: bool,
        limit: u32,
    ) -> Result<Vec<PrayerRow>> {
        let mut sql = String::from(
            "SELECT p.id, p.title, p.content, p.author_id,
                    u.first_name, u.last_name, u.avatar_url,
                    p.is_public, p.is_urgent, p.status,
                    c.name,
                    (SELECT COUNT(*) FROM prayer_support s WHERE s.prayer_id = p.id),
                    EXISTS(SELECT 1 FROM prayer_support s
                           WHERE s.prayer_id = p.id AND s.user_id = ?1),
                    p.created_at
             FROM prayer_requests p
             JOIN users u ON p.author_id = u.id
             LEFT JOIN circles c ON p.circle_id = c.id
             WHERE (p.is_public = 1
                    OR p.author_id = ?1
                    OR p.circle_id IN (SELECT circle_id FROM circle_members
                                       WHERE user_id = ?1))",
        );
        if status.is_some() {
            sql.push_str(" AND p.status = ?2");
        }
        if urgent_only {
            sql.push_str(" AND p.is_urgent = 1");
        }
        sql.push_str(" ORDER BY p.created_at DESC, p.id DESC LIMIT ?3");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    params![viewer_id, status.unwrap_or(""), limit],
                    |row| {
                        Ok(PrayerRow {
                            id: row.get(0)?,
                            title: row.get(1)?,
                            content: row.get(2)?,
                            author_id: row.get(3)?,
                            author_first_name: row.get(4)?,
                            author_last_name: row.get(5)?,
                            author_avatar_url: row.get(6)?,
                            is_public: row.get(7)?,
                            is_urgent: row.get(8)?,
                            status: row.get(9)?,
                            circle_name: row.get(10)?,
                            support_count: row.get(11)?,
                            supported_by_me: row.get(12)?,
                            created_at: row.get(13)?,
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::queries::test_support::{db, seed_user};

    #[test]
    fn support_twice_counts_once() {
        let db = db();
        seed_user(&db, "u1", "author@example.com");
        seed_user(&db, "u2", "friend@example.com");
        db.create_prayer("p1", "Need strength", "...", "u1", true, false, None)
            .unwrap();

        db.support_prayer("p1", "u2").unwrap();
        db.support_prayer("p1", "u2").unwrap();
        assert_eq!(db.prayer_support_count("p1").unwrap(), 1);

        let rows = db.list_prayers("u2", None, false, 50).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].supported_by_me);
        assert_eq!(rows[0].support_count, 1);
    }

    #[test]
    fn status_filter_partitions_active_and_answered() {
        let db = db();
        seed_user(&db, "u1", "author@example.com");
        db.create_prayer("p1", "Need strength", "...", "u1", true, false, None)
            .unwrap();

        let active = db.list_prayers("u1", Some("active"), false, 50).unwrap();
        assert_eq!(active.len(), 1);
        assert!(db.list_prayers("u1", Some("answered"), false, 50).unwrap().is_empty());

        db.set_prayer_status("p1", "answered").unwrap();
        assert!(db.list_prayers("u1", Some("active"), false, 50).unwrap().is_empty());
        assert_eq!(db.list_prayers("u1", Some("answered"), false, 50).unwrap().len(), 1);
    }

    #[test]
    fn circle_scoped_prayers_hidden_from_non_members() {
        let db = db();
        seed_user(&db, "u1", "author@example.com");
        seed_user(&db, "u2", "member@example.com");
        seed_user(&db, "u3", "outsider@example.com");
        db.create_circle("c1", "Small Group", None, "private", "u1", None)
            .unwrap();
        db.join_circle("c1", "u2").unwrap();
        db.create_prayer("p1", "For my family", "...", "u1", false, false, Some("c1"))
            .unwrap();

        assert_eq!(db.list_prayers("u1", None, false, 50).unwrap().len(), 1);
        assert_eq!(db.list_prayers("u2", None, false, 50).unwrap().len(), 1);
        assert!(db.list_prayers("u3", None, false, 50).unwrap().is_empty());
    }

    #[test]
    fn urgent_filter_selects_urgent_only() {
        let db = db();
        seed_user(&db, "u1", "author@example.com");
        db.create_prayer("p1", "Urgent need", "...", "u1", true, true, None)
            .unwrap();
        db.create_prayer("p2", "Ordinary need", "...", "u1", true, false, None)
            .unwrap();

        let urgent = db.list_prayers("u1", None, true, 50).unwrap();
        assert_eq!(urgent.len(), 1);
        assert_eq!(urgent[0].title, "Urgent need");
    }

    #[test]
    fn circle_scoped_prayer_requires_circle_reference() {
        let db = db();
        seed_user(&db, "u1", "author@example.com");
        // the schema-level CHECK backs up the API validation
        let res = db.create_prayer("p1", "Oops", "...", "u1", false, false, None);
        assert!(res.is_err());
    }
}
