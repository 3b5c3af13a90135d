use anyhow::Result;
use rusqlite::{OptionalExtension, params};

use crate::Database;
use crate::models::CircleRow;

/// Shared projection for circle lists: owner display name, member count and
/// the viewer's membership in one round trip (no N+1).
const CIRCLE_SELECT: &str = "
    SELECT c.id, c.name, c.description, c.privacy, c.owner_id,
           u.first_name, u.last_name,
           ch.name,
           (SELECT COUNT(*) FROM circle_members m WHERE m.circle_id = c.id),
           EXISTS(SELECT 1 FROM circle_members m
                  WHERE m.circle_id = c.id AND m.user_id = ?1),
           c.created_at
    FROM circles c
    JOIN users u ON c.owner_id = u.id
    LEFT JOIN churches ch ON c.church_id = ch.id";

impl Database {
    /// Creates the circle and its owner membership in one transaction so a
    /// circle can never exist without its owner as a member.
    pub fn create_circle(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
        privacy: &str,
        owner_id: &str,
        church_id: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO circles (id, name, description, privacy, owner_id, church_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, name, description, privacy, owner_id, church_id],
            )?;
            tx.execute(
                "INSERT INTO circle_members (circle_id, user_id, role)
                 VALUES (?1, ?2, 'owner')",
                params![id, owner_id],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn update_circle(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
        privacy: &str,
        church_id: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE circles SET name = ?2, description = ?3, privacy = ?4, church_id = ?5
                 WHERE id = ?1",
                params![id, name, description, privacy, church_id],
            )?;
            Ok(())
        })
    }

    pub fn delete_circle(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM circles WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// Owner id, or None when the circle does not exist. The mutation
    /// handlers check this before any write — ownership is a data-layer
    /// policy, not a hidden button.
    pub fn circle_owner(&self, id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let owner = conn
                .query_row("SELECT owner_id FROM circles WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(owner)
        })
    }

    pub fn list_my_circles(&self, user_id: &str, pattern: &str) -> Result<Vec<CircleRow>> {
        let sql = format!(
            "{CIRCLE_SELECT}
             WHERE c.id IN (SELECT circle_id FROM circle_members WHERE user_id = ?1)
               AND (LOWER(c.name) LIKE ?2 OR LOWER(IFNULL(c.description, '')) LIKE ?2)
             ORDER BY c.created_at DESC"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![user_id, pattern], map_circle_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_public_circles(&self, viewer_id: &str, pattern: &str) -> Result<Vec<CircleRow>> {
        let sql = format!(
            "{CIRCLE_SELECT}
             WHERE c.privacy = 'public'
               AND (LOWER(c.name) LIKE ?2 OR LOWER(IFNULL(c.description, '')) LIKE ?2)
             ORDER BY c.created_at DESC"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![viewer_id, pattern], map_circle_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Idempotent join: a second join for the same (circle, user) is a no-op.
    pub fn join_circle(&self, circle_id: &str, user_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO circle_members (circle_id, user_id, role)
                 VALUES (?1, ?2, 'member')",
                params![circle_id, user_id],
            )?;
            Ok(())
        })
    }

    pub fn leave_circle(&self, circle_id: &str, user_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "DELETE FROM circle_members WHERE circle_id = ?1 AND user_id = ?2",
                params![circle_id, user_id],
            )?;
            Ok(())
        })
    }

    pub fn is_circle_member(&self, circle_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let member: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM circle_members
                 WHERE circle_id = ?1 AND user_id = ?2)",
                params![circle_id, user_id],
                |row| row.get(0),
            )?;
            Ok(member)
        })
    }

    pub fn member_count(&self, circle_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM circle_members WHERE circle_id = ?1",
                [circle_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}

fn map_circle_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CircleRow> {
    Ok(CircleRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        privacy: row.get(3)?,
        owner_id: row.get(4)?,
        owner_first_name: row.get(5)?,
        owner_last_name: row.get(6)?,
        church_name: row.get(7)?,
        member_count: row.get(8)?,
        is_member: row.get(9)?,
        created_at: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::queries::like_pattern;
    use crate::queries::test_support::{db, seed_user};

    #[test]
    fn create_circle_adds_owner_membership() {
        let db = db();
        seed_user(&db, "u1", "owner@example.com");
        db.create_circle("c1", "Bible Study", None, "public", "u1", None)
            .unwrap();

        assert!(db.is_circle_member("c1", "u1").unwrap());
        assert_eq!(db.member_count("c1").unwrap(), 1);
        assert_eq!(db.circle_owner("c1").unwrap().as_deref(), Some("u1"));
    }

    #[test]
    fn join_twice_yields_one_membership_row() {
        let db = db();
        seed_user(&db, "u1", "owner@example.com");
        seed_user(&db, "u2", "member@example.com");
        db.create_circle("c1", "Bible Study", None, "public", "u1", None)
            .unwrap();

        db.join_circle("c1", "u2").unwrap();
        db.join_circle("c1", "u2").unwrap();
        assert_eq!(db.member_count("c1").unwrap(), 2);

        db.leave_circle("c1", "u2").unwrap();
        assert_eq!(db.member_count("c1").unwrap(), 1);
    }

    #[test]
    fn public_listing_excludes_private_circles() {
        let db = db();
        seed_user(&db, "u1", "owner@example.com");
        seed_user(&db, "u2", "viewer@example.com");
        db.create_circle("c1", "Open Group", None, "public", "u1", None)
            .unwrap();
        db.create_circle("c2", "Closed Group", None, "private", "u1", None)
            .unwrap();

        let all = db.list_public_circles("u2", &like_pattern("")).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Open Group");
        assert!(!all[0].is_member);

        let mine = db.list_my_circles("u1", &like_pattern("")).unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let db = db();
        seed_user(&db, "u1", "owner@example.com");
        db.create_circle("c1", "Morning Prayer", Some("daily devotion"), "public", "u1", None)
            .unwrap();

        let by_name = db.list_public_circles("u1", &like_pattern("MORNING")).unwrap();
        assert_eq!(by_name.len(), 1);

        let by_desc = db.list_public_circles("u1", &like_pattern("devotion")).unwrap();
        assert_eq!(by_desc.len(), 1);

        let none = db.list_public_circles("u1", &like_pattern("evening")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn delete_circle_cascades_memberships() {
        let db = db();
        seed_user(&db, "u1", "owner@example.com");
        db.create_circle("c1", "Bible Study", None, "public", "u1", None)
            .unwrap();
        db.delete_circle("c1").unwrap();

        assert!(db.circle_owner("c1").unwrap().is_none());
        assert!(!db.is_circle_member("c1", "u1").unwrap());
    }
}
