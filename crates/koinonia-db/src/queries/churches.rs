use anyhow::Result;
use koinonia_types::api::ChurchPayload;
use rusqlite::{OptionalExtension, params};

use crate::Database;
use crate::models::ChurchRow;

impl Database {
    pub fn create_church(&self, id: &str, payload: &ChurchPayload, created_by: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO churches (id, name, description, address, city, state, zip_code,
                                       phone, email, website, pastor_name, service_times, created_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    id,
                    payload.name,
                    payload.description,
                    payload.address,
                    payload.city,
                    payload.state,
                    payload.zip_code,
                    payload.phone,
                    payload.email,
                    payload.website,
                    payload.pastor_name,
                    payload.service_times,
                    created_by,
                ],
            )?;
            Ok(())
        })
    }

    pub fn update_church(&self, id: &str, payload: &ChurchPayload) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE churches SET name = ?2, description = ?3, address = ?4, city = ?5,
                        state = ?6, zip_code = ?7, phone = ?8, email = ?9, website = ?10,
                        pastor_name = ?11, service_times = ?12
                 WHERE id = ?1",
                params![
                    id,
                    payload.name,
                    payload.description,
                    payload.address,
                    payload.city,
                    payload.state,
                    payload.zip_code,
                    payload.phone,
                    payload.email,
                    payload.website,
                    payload.pastor_name,
                    payload.service_times,
                ],
            )?;
            Ok(())
        })
    }

    pub fn delete_church(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM churches WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn church_creator(&self, id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let creator = conn
                .query_row("SELECT created_by FROM churches WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(creator)
        })
    }

    pub fn church_exists(&self, id: &str) -> Result<bool> {
        Ok(self.church_creator(id)?.is_some())
    }

    /// Search matches name, city and state, case-insensitively; results
    /// ordered by name for directory-style listing.
    pub fn list_churches(&self, pattern: &str) -> Result<Vec<ChurchRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.name, c.description, c.address, c.city, c.state, c.zip_code,
                        c.phone, c.email, c.website, c.pastor_name, c.service_times,
                        c.created_by, u.first_name, u.last_name, c.created_at
                 FROM churches c
                 JOIN users u ON c.created_by = u.id
                 WHERE LOWER(c.name) LIKE ?1
                    OR LOWER(IFNULL(c.city, '')) LIKE ?1
                    OR LOWER(IFNULL(c.state, '')) LIKE ?1
                 ORDER BY c.name",
            )?;
            let rows = stmt
                .query_map([pattern], |row| {
                    Ok(ChurchRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        address: row.get(3)?,
                        city: row.get(4)?,
                        state: row.get(5)?,
                        zip_code: row.get(6)?,
                        phone: row.get(7)?,
                        email: row.get(8)?,
                        website: row.get(9)?,
                        pastor_name: row.get(10)?,
                        service_times: row.get(11)?,
                        created_by: row.get(12)?,
                        creator_first_name: row.get(13)?,
                        creator_last_name: row.get(14)?,
                        created_at: row.get(15)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use koinonia_types::api::ChurchPayload;

    use crate::queries::like_pattern;
    use crate::queries::test_support::{db, seed_user};

    fn payload(name: &str, city: &str) -> ChurchPayload {
        ChurchPayload {
            name: name.to_string(),
            description: None,
            address: None,
            city: Some(city.to_string()),
            state: Some("TX".to_string()),
            zip_code: None,
            phone: None,
            email: None,
            website: None,
            pastor_name: Some("Pastor Kim".to_string()),
            service_times: Some("Sun 10am".to_string()),
        }
    }

    #[test]
    fn churches_are_searchable_by_name_and_city() {
        let db = db();
        seed_user(&db, "u1", "creator@example.com");
        db.create_church("ch1", &payload("First Baptist", "Austin"), "u1")
            .unwrap();
        db.create_church("ch2", &payload("Grace Chapel", "Dallas"), "u1")
            .unwrap();

        let all = db.list_churches(&like_pattern("")).unwrap();
        assert_eq!(all.len(), 2);
        // ordered by name
        assert_eq!(all[0].name, "First Baptist");

        let austin = db.list_churches(&like_pattern("austin")).unwrap();
        assert_eq!(austin.len(), 1);
        assert_eq!(austin[0].name, "First Baptist");
    }

    #[test]
    fn update_and_delete_church() {
        let db = db();
        seed_user(&db, "u1", "creator@example.com");
        db.create_church("ch1", &payload("First Baptist", "Austin"), "u1")
            .unwrap();

        let mut updated = payload("First Baptist Renamed", "Austin");
        updated.pastor_name = Some("Pastor Lee".to_string());
        db.update_church("ch1", &updated).unwrap();

        let rows = db.list_churches(&like_pattern("renamed")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pastor_name.as_deref(), Some("Pastor Lee"));

        db.delete_church("ch1").unwrap();
        assert!(!db.church_exists("ch1").unwrap());
    }
}
