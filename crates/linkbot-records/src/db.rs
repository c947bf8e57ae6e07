use rusqlite::Connection;

use crate::error::Result;

/// Initialise the record schema in `conn`. Safe to call on every startup.
///
/// Uniqueness lives in the schema: one schedule per (course, section) and one
/// row per (schedule, url). Concurrent writers that both pass a read check
/// still cannot produce duplicates.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS courses (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT    NOT NULL UNIQUE,
            created_at  TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS schedules (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            course_id   INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            section     TEXT    NOT NULL,
            day         TEXT    NOT NULL,
            time        TEXT    NOT NULL,
            created_at  TEXT    NOT NULL,
            UNIQUE(course_id, section)
        );

        -- Link order is insertion order (id).
        CREATE TABLE IF NOT EXISTS schedule_links (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            schedule_id INTEGER NOT NULL REFERENCES schedules(id) ON DELETE CASCADE,
            url         TEXT    NOT NULL,
            added_at    TEXT    NOT NULL,
            UNIQUE(schedule_id, url)
        );
        CREATE INDEX IF NOT EXISTS idx_links_schedule
            ON schedule_links(schedule_id, id);
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        init_db(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();
        for expected in ["courses", "schedule_links", "schedules"] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[test]
    fn duplicate_section_violates_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn.execute(
            "INSERT INTO courses (name, created_at) VALUES ('CS101', 'now')",
            [],
        )
        .unwrap();
        let insert = "INSERT INTO schedules (course_id, section, day, time, created_at)
                      VALUES (1, 'L1', 'MW', '1000', 'now')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
