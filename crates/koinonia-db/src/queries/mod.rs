//! Per-entity query modules. Each extends `Database` with the operations the
//! API layer needs; everything returns `anyhow::Result` and leaves HTTP
//! concerns to the caller.

pub mod churches;
pub mod circles;
pub mod events;
pub mod media;
pub mod prayers;
pub mod reading;
pub mod stats;
pub mod testimonies;
pub mod users;

/// Substring-search pattern for case-insensitive LIKE filters. An empty
/// search term yields a pattern that matches every row.
pub fn like_pattern(q: &str) -> String {
    format!("%{}%", q.to_lowercase())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::Database;

    pub fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    pub fn seed_user(db: &Database, id: &str, email: &str) {
        db.create_user(id, email, "hash", "Test", "User").unwrap();
    }
}
