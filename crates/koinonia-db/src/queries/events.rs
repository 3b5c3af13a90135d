use anyhow::Result;
use rusqlite::{OptionalExtension, params};

use crate::Database;
use crate::models::EventRow;

/// Outcome of an RSVP write; `AtCapacity` means the attendee cap refused an
/// `attending` status and nothing was written.
#[derive(Debug, PartialEq, Eq)]
pub enum RsvpOutcome {
    Accepted,
    AtCapacity,
}

const EVENT_SELECT: &str = "
    SELECT e.id, e.title, e.description, e.event_date, e.location,
           e.organizer_id, u.first_name, u.last_name, u.avatar_url,
           c.name, ch.name, e.max_attendees,
           (SELECT COUNT(*) FROM event_attendees a
            WHERE a.event_id = e.id AND a.status = 'attending'),
           (SELECT a.status FROM event_attendees a
            WHERE a.event_id = e.id AND a.user_id = ?1),
           e.created_at
    FROM events e
    JOIN users u ON e.organizer_id = u.id
    LEFT JOIN circles c ON e.circle_id = c.id
    LEFT JOIN churches ch ON e.church_id = ch.id";

impl Database {
    #[allow(clippy::too_many_arguments)]
    pub fn create_event(
        &self,
        id: &str,
        title: &str,
        description: Option<&str>,
        event_date: &str,
        location: Option<&str>,
        organizer_id: &str,
        circle_id: Option<&str>,
        church_id: Option<&str>,
        max_attendees: Option<u32>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO events
                     (id, title, description, event_date, location, organizer_id,
                      circle_id, church_id, max_attendees)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id, title, description, event_date, location, organizer_id,
                    circle_id, church_id, max_attendees,
                ],
            )?;
            Ok(())
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update_event(
        &self,
        id: &str,
        title: &str,
        description: Option<&str>,
        event_date: &str,
        location: Option<&str>,
        circle_id: Option<&str>,
        church_id: Option<&str>,
        max_attendees: Option<u32>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE events SET title = ?2, description = ?3, event_date = ?4,
                        location = ?5, circle_id = ?6, church_id = ?7, max_attendees = ?8
                 WHERE id = ?1",
                params![
                    id, title, description, event_date, location, circle_id,
                    church_id, max_attendees,
                ],
            )?;
            Ok(())
        })
    }

    pub fn delete_event(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM events WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn event_organizer(&self, id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let organizer = conn
                .query_row(
                    "SELECT organizer_id FROM events WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(organizer)
        })
    }

    /// Tri-state upsert keyed (event, user): the latest status wins. The cap
    /// check and the write run in one transaction so two racing RSVPs cannot
    /// both slip under the limit.
    pub fn rsvp(&self, event_id: &str, user_id: &str, status: &str) -> Result<RsvpOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if status == "attending" {
                let cap: Option<i64> = tx.query_row(
                    "SELECT max_attendees FROM events WHERE id = ?1",
                    [event_id],
                    |row| row.get(0),
                )?;
                if let Some(cap) = cap {
                    let attending: i64 = tx.query_row(
                        "SELECT COUNT(*) FROM event_attendees
                         WHERE event_id = ?1 AND status = 'attending' AND user_id != ?2",
                        params![event_id, user_id],
                        |row| row.get(0),
                    )?;
                    if attending >= cap {
                        return Ok(RsvpOutcome::AtCapacity);
                    }
                }
            }

            tx.execute(
                "INSERT INTO event_attendees (event_id, user_id, status)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(event_id, user_id)
                 DO UPDATE SET status = excluded.status,
                               created_at = datetime('now')",
                params![event_id, user_id, status],
            )?;
            tx.commit()?;
            Ok(RsvpOutcome::Accepted)
        })
    }

    pub fn list_upcoming_events(&self, viewer_id: &str, now: &str, limit: u32) -> Result<Vec<EventRow>> {
        let sql = format!(
            "{EVENT_SELECT} WHERE e.event_date >= ?2
             ORDER BY e.event_date ASC LIMIT ?3"
        );
        self.query_events(&sql, params![viewer_id, now, limit])
    }

    pub fn list_past_events(&self, viewer_id: &str, now: &str, limit: u32) -> Result<Vec<EventRow>> {
        let sql = format!(
            "{EVENT_SELECT} WHERE e.event_date < ?2
             ORDER BY e.event_date DESC LIMIT ?3"
        );
        self.query_events(&sql, params![viewer_id, now, limit])
    }

    pub fn list_my_events(&self, viewer_id: &str, limit: u32) -> Result<Vec<EventRow>> {
        let sql = format!(
            "{EVENT_SELECT} WHERE e.organizer_id = ?1
             ORDER BY e.event_date ASC LIMIT ?2"
        );
        self.query_events(&sql, params![viewer_id, limit])
    }

    fn query_events(
        &self,
        sql: &str,
        bindings: &[&dyn rusqlite::types::ToSql],
    ) -> Result<Vec<EventRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(bindings, |row| {
                    Ok(EventRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        event_date: row.get(3)?,
                        location: row.get(4)?,
                        organizer_id: row.get(5)?,
                        organizer_first_name: row.get(6)?,
                        organizer_last_name: row.get(7)?,
                        organizer_avatar_url: row.get(8)?,
                        circle_name: row.get(9)?,
                        church_name: row.get(10)?,
                        max_attendees: row.get(11)?,
                        attending_count: row.get(12)?,
                        my_status: row.get(13)?,
                        created_at: row.get(14)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
