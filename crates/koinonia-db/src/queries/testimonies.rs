use anyhow::Result;
use rusqlite::{OptionalExtension, params};

use crate::Database;
use crate::models::{CommentRow, ReactionRow, TestimonyRow};

impl Database {
    pub fn create_testimony(
        &self,
        id: &str,
        title: &str,
        content: &str,
        author_id: &str,
        visibility: &str,
        circle_id: Option<&str>,
        media_urls_json: &str,
        media_types_json: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO testimonies
                     (id, title, content, author_id, visibility, circle_id,
                      media_urls, media_types)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id,
                    title,
                    content,
                    author_id,
                    visibility,
                    circle_id,
                    media_urls_json,
                    media_types_json,
                ],
            )?;
            Ok(())
        })
    }

    pub fn testimony_author(&self, id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let author = conn
                .query_row(
                    "SELECT author_id FROM testimonies WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(author)
        })
    }

    pub fn delete_testimony(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM testimonies WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// One reaction per (testimony, user); a later write overwrites the
    /// earlier reaction type.
    pub fn set_reaction(
        &self,
        testimony_id: &str,
        user_id: &str,
        reaction_type: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO testimony_reactions (testimony_id, user_id, reaction_type)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(testimony_id, user_id)
                 DO UPDATE SET reaction_type = excluded.reaction_type,
                               created_at = datetime('now')",
                params![testimony_id, user_id, reaction_type],
            )?;
            Ok(())
        })
    }

    pub fn add_comment(
        &self,
        id: &str,
        testimony_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO testimony_comments (id, testimony_id, author_id, content)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, testimony_id, author_id, content],
            )?;
            Ok(())
        })
    }

    /// Visibility enforced at the data layer: public to everyone, private to
    /// the author, circle-scoped to members. Cursor pagination via `before`
    /// (created_at of the oldest row from the previous page).
    pub fn list_testimonies(
        &self,
        viewer_id: &str,
        visibility: Option<&str>,
        limit: u32,
        before: Option<&str>,
    ) -> Result<Vec<TestimonyRow>> {
        let mut sql = String::from(
            "SELECT t.id, t.title, t.content, t.author_id,
                    u.first_name, u.last_name, u.avatar_url,
                    t.visibility, c.name, t.media_urls, t.media_types, t.created_at
             FROM testimonies t
             JOIN users u ON t.author_id = u.id
             LEFT JOIN circles c ON t.circle_id = c.id
             WHERE (t.visibility = 'public'
                    OR t.author_id = ?1
                    OR (t.visibility = 'circle'
                        AND t.circle_id IN (SELECT circle_id FROM circle_members
                                            WHERE user_id = ?1)))",
        );
        if visibility.is_some() {
            sql.push_str(" AND t.visibility = ?2");
        }
        if before.is_some() {
            sql.push_str(" AND t.created_at < ?3");
        }
        sql.push_str(" ORDER BY t.created_at DESC, t.id DESC LIMIT ?4");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    params![viewer_id, visibility.unwrap_or(""), before.unwrap_or(""), limit],
                    |row| {
                        Ok(TestimonyRow {
                            id: row.get(0)?,
                            title: row.get(1)?,
                            content: row.get(2)?,
                            author_id: row.get(3)?,
                            author_first_name: row.get(4)?,
                            author_last_name: row.get(5)?,
                            author_avatar_url: row.get(6)?,
                            visibility: row.get(7)?,
                            circle_name: row.get(8)?,
                            media_urls: row.get(9)?,
                            media_types: row.get(10)?,
                            created_at: row.get(11)?,
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Batch-fetch reactions for a page of testimonies (no N+1).
    pub fn get_reactions_for(&self, testimony_ids: &[String]) -> Result<Vec<ReactionRow>> {
        if testimony_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=testimony_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT testimony_id, user_id, reaction_type
                 FROM testimony_reactions WHERE testimony_id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let bindings: Vec<&dyn rusqlite::types::ToSql> = testimony_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(bindings.as_slice(), |row| {
                    Ok(ReactionRow {
                        testimony_id: row.get(0)?,
                        user_id: row.get(1)?,
                        reaction_type: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Batch-fetch comments with author names joined in.
    pub fn get_comments_for(&self, testimony_ids: &[String]) -> Result<Vec<CommentRow>> {
        if testimony_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=testimony_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT tc.id, tc.testimony_id, tc.author_id, u.first_name, u.last_name,
                        tc.content, tc.created_at
                 FROM testimony_comments tc
                 JOIN users u ON tc.author_id = u.id
                 WHERE tc.testimony_id IN ({})
                 ORDER BY tc.created_at",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let bindings: Vec<&dyn rusqlite::types::ToSql> = testimony_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(bindings.as_slice(), |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        testimony_id: row.get(1)?,
                        author_id: row.get(2)?,
                        author_first_name: row.get(3)?,
                        author_last_name: row.get(4)?,
                        content: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::queries::test_support::{db, seed_user};

    #[test]
    fn reaction_upsert_latest_wins() {
        let db = db();
        seed_user(&db, "u1", "author@example.com");
        seed_user(&db, "u2", "reader@example.com");
        db.create_testimony("t1", "Grace", "...", "u1", "public", None, "[]", "[]")
            .unwrap();

        db.set_reaction("t1", "u2", "like").unwrap();
        db.set_reaction("t1", "u2", "amen").unwrap();

        let rows = db.get_reactions_for(&["t1".to_string()]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reaction_type, "amen");
    }

    #[test]
    fn visibility_policy_at_data_layer() {
        let db = db();
        seed_user(&db, "u1", "author@example.com");
        seed_user(&db, "u2", "member@example.com");
        seed_user(&db, "u3", "outsider@example.com");
        db.create_circle("c1", "Small Group", None, "private", "u1", None)
            .unwrap();
        db.join_circle("c1", "u2").unwrap();

        db.create_testimony("t1", "Public story", "...", "u1", "public", None, "[]", "[]")
            .unwrap();
        db.create_testimony("t2", "Circle story", "...", "u1", "circle", Some("c1"), "[]", "[]")
            .unwrap();
        db.create_testimony("t3", "Private story", "...", "u1", "private", None, "[]", "[]")
            .unwrap();

        assert_eq!(db.list_testimonies("u1", None, 50, None).unwrap().len(), 3);
        assert_eq!(db.list_testimonies("u2", None, 50, None).unwrap().len(), 2);
        assert_eq!(db.list_testimonies("u3", None, 50, None).unwrap().len(), 1);
    }

    #[test]
    fn circle_visibility_requires_circle_reference() {
        let db = db();
        seed_user(&db, "u1", "author@example.com");
        let res = db.create_testimony("t1", "Oops", "...", "u1", "circle", None, "[]", "[]");
        assert!(res.is_err());
    }

    #[test]
    fn comments_join_author_names() {
        let db = db();
        seed_user(&db, "u1", "author@example.com");
        db.create_testimony("t1", "Grace", "...", "u1", "public", None, "[]", "[]")
            .unwrap();
        db.add_comment("cm1", "t1", "u1", "Amen!").unwrap();

        let comments = db.get_comments_for(&["t1".to_string()]).unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author_first_name, "Test");
        assert_eq!(comments[0].content, "Amen!");
    }

    #[test]
    fn delete_cascades_reactions_and_comments() {
        let db = db();
        seed_user(&db, "u1", "author@example.com");
        db.create_testimony("t1", "Grace", "...", "u1", "public", None, "[]", "[]")
            .unwrap();
        db.set_reaction("t1", "u1", "like").unwrap();
        db.add_comment("cm1", "t1", "u1", "note").unwrap();

        db.delete_testimony("t1").unwrap();
        assert!(db.get_reactions_for(&["t1".to_string()]).unwrap().is_empty());
        assert!(db.get_comments_for(&["t1".to_string()]).unwrap().is_empty());
    }
}
