use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            first_name  TEXT NOT NULL,
            last_name   TEXT NOT NULL,
            avatar_url  TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS churches (
            id             TEXT PRIMARY KEY,
            name           TEXT NOT NULL,
            description    TEXT,
            address        TEXT,
            city           TEXT,
            state          TEXT,
            zip_code       TEXT,
            phone          TEXT,
            email          TEXT,
            website        TEXT,
            pastor_name    TEXT,
            service_times  TEXT,
            created_by     TEXT NOT NULL REFERENCES users(id),
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS circles (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            description TEXT,
            privacy     TEXT NOT NULL CHECK (privacy IN ('public', 'private')),
            owner_id    TEXT NOT NULL REFERENCES users(id),
            church_id   TEXT REFERENCES churches(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS circle_members (
            circle_id   TEXT NOT NULL REFERENCES circles(id) ON DELETE CASCADE,
            user_id     TEXT NOT NULL REFERENCES users(id),
            role        TEXT NOT NULL CHECK (role IN ('owner', 'member')),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(circle_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_circle_members_user
            ON circle_members(user_id);

        CREATE TABLE IF NOT EXISTS prayer_requests (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            content     TEXT NOT NULL,
            author_id   TEXT NOT NULL REFERENCES users(id),
            is_public   INTEGER NOT NULL DEFAULT 1,
            is_urgent   INTEGER NOT NULL DEFAULT 0,
            status      TEXT NOT NULL DEFAULT 'active'
                        CHECK (status IN ('active', 'answered')),
            circle_id   TEXT REFERENCES circles(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            CHECK (is_public = 1 OR circle_id IS NOT NULL)
        );

        CREATE INDEX IF NOT EXISTS idx_prayers_created
            ON prayer_requests(created_at);

        CREATE TABLE IF NOT EXISTS prayer_support (
            prayer_id   TEXT NOT NULL REFERENCES prayer_requests(id) ON DELETE CASCADE,
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(prayer_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS testimonies (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            content     TEXT NOT NULL,
            author_id   TEXT NOT NULL REFERENCES users(id),
            visibility  TEXT NOT NULL
                        CHECK (visibility IN ('public', 'circle', 'private')),
            circle_id   TEXT REFERENCES circles(id) ON DELETE CASCADE,
            media_urls  TEXT NOT NULL DEFAULT '[]',
            media_types TEXT NOT NULL DEFAULT '[]',
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            CHECK (visibility != 'circle' OR circle_id IS NOT NULL)
        );

        CREATE INDEX IF NOT EXISTS idx_testimonies_created
            ON testimonies(created_at);

        CREATE TABLE IF NOT EXISTS testimony_reactions (
            testimony_id   TEXT NOT NULL REFERENCES testimonies(id) ON DELETE CASCADE,
            user_id        TEXT NOT NULL REFERENCES users(id),
            reaction_type  TEXT NOT NULL,
            created_at     TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(testimony_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS testimony_comments (
            id             TEXT PRIMARY KEY,
            testimony_id   TEXT NOT NULL REFERENCES testimonies(id) ON DELETE CASCADE,
            author_id      TEXT NOT NULL REFERENCES users(id),
            content        TEXT NOT NULL,
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_testimony
            ON testimony_comments(testimony_id);

        CREATE TABLE IF NOT EXISTS events (
            id             TEXT PRIMARY KEY,
            title          TEXT NOT NULL,
            description    TEXT,
            event_date     TEXT NOT NULL,
            location       TEXT,
            organizer_id   TEXT NOT NULL REFERENCES users(id),
            circle_id      TEXT REFERENCES circles(id) ON DELETE SET NULL,
            church_id      TEXT REFERENCES churches(id) ON DELETE SET NULL,
            max_attendees  INTEGER,
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_events_date
            ON events(event_date);

        CREATE TABLE IF NOT EXISTS event_attendees (
            event_id    TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            user_id     TEXT NOT NULL REFERENCES users(id),
            status      TEXT NOT NULL
                        CHECK (status IN ('attending', 'not_attending', 'maybe')),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(event_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS reading_plans (
            id             TEXT PRIMARY KEY,
            name           TEXT NOT NULL,
            description    TEXT,
            duration_days  INTEGER NOT NULL CHECK (duration_days >= 1),
            is_public      INTEGER NOT NULL DEFAULT 0,
            created_by     TEXT NOT NULL REFERENCES users(id),
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS reading_plan_assignments (
            id          TEXT PRIMARY KEY,
            plan_id     TEXT NOT NULL REFERENCES reading_plans(id) ON DELETE CASCADE,
            user_id     TEXT NOT NULL REFERENCES users(id),
            start_date  TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(plan_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS reading_progress (
            assignment_id  TEXT NOT NULL REFERENCES reading_plan_assignments(id) ON DELETE CASCADE,
            day            INTEGER NOT NULL,
            created_at     TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(assignment_id, day)
        );

        CREATE TABLE IF NOT EXISTS media (
            id            TEXT PRIMARY KEY,
            owner_id      TEXT NOT NULL REFERENCES users(id),
            path          TEXT NOT NULL UNIQUE,
            kind          TEXT NOT NULL CHECK (kind IN ('image', 'video', 'other')),
            content_type  TEXT NOT NULL,
            size_bytes    INTEGER NOT NULL,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
