use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{ffi, Connection, OptionalExtension};
use tracing::debug;

use crate::db::init_db;
use crate::error::Result;
use crate::types::{Course, NewSchedule, Schedule};

/// How long a writer waits on a locked database file before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of inserting a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Schedule),
    /// A schedule for the same (course, section) already exists.
    AlreadyExists,
}

/// Document-style persistence for courses and schedules.
///
/// Every method is a single atomic step. Callers compose them; nothing here
/// spans more than one logical operation.
pub trait RecordStore: Send + Sync {
    /// Get-or-create a course by name.
    fn upsert_course(&self, name: &str) -> Result<Course>;

    fn find_course(&self, name: &str) -> Result<Option<Course>>;

    /// All courses in creation order.
    fn list_courses(&self) -> Result<Vec<Course>>;

    fn find_schedule(&self, course_id: i64, section: &str) -> Result<Option<Schedule>>;

    /// All schedules of a course in creation order.
    fn find_schedules(&self, course_id: i64) -> Result<Vec<Schedule>>;

    fn insert_schedule(&self, new: &NewSchedule) -> Result<InsertOutcome>;

    /// Append `url` unless already present. Returns `true` when added.
    fn push_link(&self, schedule_id: i64, url: &str) -> Result<bool>;

    /// Remove `url` from the schedule. Returns `true` when a link was removed.
    fn pull_link(&self, schedule_id: i64, url: &str) -> Result<bool>;

    /// Delete one section, or every section when `section` is `None`.
    /// Returns the number of schedules deleted.
    fn delete_schedules(&self, course_id: i64, section: Option<&str>) -> Result<usize>;

    /// Delete the course only if it has no schedules left.
    fn delete_course_if_empty(&self, course_id: i64) -> Result<bool>;

    /// Delete the course and, through it, every schedule it owns.
    fn delete_course(&self, course_id: i64) -> Result<bool>;

    /// Drop every course, schedule and link.
    fn clear(&self) -> Result<()>;
}

/// SQLite-backed [`RecordStore`]. One connection, serialised by a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap `conn`, creating the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves SQLite consistent; keep serving.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordStore for SqliteStore {
    fn upsert_course(&self, name: &str) -> Result<Course> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        // DO UPDATE (not DO NOTHING) so RETURNING yields the existing row too.
        let course = conn.query_row(
            "INSERT INTO courses (name, created_at) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET name = excluded.name
             RETURNING id, name, created_at",
            rusqlite::params![name, now],
            row_to_course,
        )?;
        Ok(course)
    }

    fn find_course(&self, name: &str) -> Result<Option<Course>> {
        let conn = self.conn();
        let course = conn
            .query_row(
                "SELECT id, name, created_at FROM courses WHERE name = ?1",
                [name],
                row_to_course,
            )
            .optional()?;
        Ok(course)
    }

    fn list_courses(&self) -> Result<Vec<Course>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM courses ORDER BY id")?;
        let courses = stmt
            .query_map([], row_to_course)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(courses)
    }

    fn find_schedule(&self, course_id: i64, section: &str) -> Result<Option<Schedule>> {
        let conn = self.conn();
        let schedule = conn
            .query_row(
                "SELECT id, course_id, section, day, time, created_at
                 FROM schedules WHERE course_id = ?1 AND section = ?2",
                rusqlite::params![course_id, section],
                row_to_schedule,
            )
            .optional()?;
        match schedule {
            Some(mut s) => {
                s.links = links_for(&conn, s.id)?;
                Ok(Some(s))
            }
            None => Ok(None),
        }
    }

    fn find_schedules(&self, course_id: i64) -> Result<Vec<Schedule>> {
        let conn = self.conn();
        let mut schedules = {
            let mut stmt = conn.prepare_cached(
                "SELECT id, course_id, section, day, time, created_at
                 FROM schedules WHERE course_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([course_id], row_to_schedule)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        for schedule in &mut schedules {
            schedule.links = links_for(&conn, schedule.id)?;
        }
        Ok(schedules)
    }

    fn insert_schedule(&self, new: &NewSchedule) -> Result<InsertOutcome> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let inserted = tx.execute(
            "INSERT INTO schedules (course_id, section, day, time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![new.course_id, new.section, new.day, new.time, now],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                debug!(course_id = new.course_id, section = %new.section, "schedule already exists");
                return Ok(InsertOutcome::AlreadyExists);
            }
            Err(e) => return Err(e.into()),
        }
        let id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO schedule_links (schedule_id, url, added_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, new.link, now],
        )?;
        tx.commit()?;

        Ok(InsertOutcome::Inserted(Schedule {
            id,
            course_id: new.course_id,
            section: new.section.clone(),
            day: new.day.clone(),
            time: new.time.clone(),
            links: vec![new.link.clone()],
            created_at: now,
        }))
    }

    fn push_link(&self, schedule_id: i64, url: &str) -> Result<bool> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let n = conn.execute(
            "INSERT INTO schedule_links (schedule_id, url, added_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(schedule_id, url) DO NOTHING",
            rusqlite::params![schedule_id, url, now],
        )?;
        Ok(n > 0)
    }

    fn pull_link(&self, schedule_id: i64, url: &str) -> Result<bool> {
        let conn = self.conn();
        let n = conn.execute(
            "DELETE FROM schedule_links WHERE schedule_id = ?1 AND url = ?2",
            rusqlite::params![schedule_id, url],
        )?;
        Ok(n > 0)
    }

    fn delete_schedules(&self, course_id: i64, section: Option<&str>) -> Result<usize> {
        let conn = self.conn();
        let n = match section {
            Some(section) => conn.execute(
                "DELETE FROM schedules WHERE course_id = ?1 AND section = ?2",
                rusqlite::params![course_id, section],
            )?,
            None => conn.execute("DELETE FROM schedules WHERE course_id = ?1", [course_id])?,
        };
        Ok(n)
    }

    fn delete_course_if_empty(&self, course_id: i64) -> Result<bool> {
        let conn = self.conn();
        let n = conn.execute(
            "DELETE FROM courses WHERE id = ?1
             AND NOT EXISTS (SELECT 1 FROM schedules WHERE course_id = ?1)",
            [course_id],
        )?;
        Ok(n > 0)
    }

    fn delete_course(&self, course_id: i64) -> Result<bool> {
        let conn = self.conn();
        let n = conn.execute("DELETE FROM courses WHERE id = ?1", [course_id])?;
        Ok(n > 0)
    }

    fn clear(&self) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM schedule_links;
             DELETE FROM schedules;
             DELETE FROM courses;",
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn links_for(conn: &Connection, schedule_id: i64) -> rusqlite::Result<Vec<String>> {
    let mut stmt =
        conn.prepare_cached("SELECT url FROM schedule_links WHERE schedule_id = ?1 ORDER BY id")?;
    let links = stmt
        .query_map([schedule_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(links)
}

fn row_to_course(row: &rusqlite::Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

/// Links are loaded separately; the row only carries schedule columns.
fn row_to_schedule(row: &rusqlite::Row<'_>) -> rusqlite::Result<Schedule> {
    Ok(Schedule {
        id: row.get(0)?,
        course_id: row.get(1)?,
        section: row.get(2)?,
        day: row.get(3)?,
        time: row.get(4)?,
        links: Vec::new(),
        created_at: row.get(5)?,
    })
}
