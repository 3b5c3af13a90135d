use anyhow::Result;
use rusqlite::{OptionalExtension, params};

use crate::Database;
use crate::models::MediaRow;

impl Database {
    pub fn insert_media(
        &self,
        id: &str,
        owner_id: &str,
        path: &str,
        kind: &str,
        content_type: &str,
        size_bytes: i64,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO media (id, owner_id, path, kind, content_type, size_bytes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, owner_id, path, kind, content_type, size_bytes],
            )?;
            Ok(())
        })
    }

    pub fn get_media(&self, id: &str) -> Result<Option<MediaRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, owner_id, path, kind, content_type, size_bytes, created_at
                     FROM media WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(MediaRow {
                            id: row.get(0)?,
                            owner_id: row.get(1)?,
                            path: row.get(2)?,
                            kind: row.get(3)?,
                            content_type: row.get(4)?,
                            size_bytes: row.get(5)?,
                            created_at: row.get(6)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Kinds of the given stored paths, in request order, when every path is
    /// an upload owned by `owner_id`. Any unknown or foreign path yields
    /// None — the caller must abort the entity creation (all-or-nothing).
    pub fn media_kinds_owned(
        &self,
        owner_id: &str,
        paths: &[String],
    ) -> Result<Option<Vec<String>>> {
        self.with_conn(|conn| {
            let mut kinds = Vec::with_capacity(paths.len());
            for path in paths {
                let kind: Option<String> = conn
                    .query_row(
                        "SELECT kind FROM media WHERE owner_id = ?1 AND path = ?2",
                        params![owner_id, path],
                        |row| row.get(0),
                    )
                    .optional()?;
                match kind {
                    Some(k) => kinds.push(k),
                    None => return Ok(None),
                }
            }
            Ok(Some(kinds))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::queries::test_support::{db, seed_user};

    #[test]
    fn media_kinds_require_ownership() {
        let db = db();
        seed_user(&db, "u1", "author@example.com");
        seed_user(&db, "u2", "other@example.com");
        db.insert_media("m1", "u1", "u1/1-a.jpg", "image", "image/jpeg", 10)
            .unwrap();
        db.insert_media("m2", "u1", "u1/2-b.mp4", "video", "video/mp4", 10)
            .unwrap();

        let kinds = db
            .media_kinds_owned("u1", &["u1/1-a.jpg".into(), "u1/2-b.mp4".into()])
            .unwrap();
        assert_eq!(kinds, Some(vec!["image".to_string(), "video".to_string()]));

        // foreign owner
        assert_eq!(db.media_kinds_owned("u2", &["u1/1-a.jpg".into()]).unwrap(), None);
        // unknown path
        assert_eq!(db.media_kinds_owned("u1", &["u1/ghost.png".into()]).unwrap(), None);
    }
}
