use tracing::{debug, info, warn};

use crate::error::{RecordError, Result, ValidationError};
use crate::store::{InsertOutcome, RecordStore};
use crate::types::{
    AddLinkOutcome, Course, NewSchedule, RemoveLinkOutcome, Role, Schedule, SectionFilter,
};
use crate::validate;

/// Course and schedule operations behind the chat commands.
///
/// Holds no state of its own: the injected store is the only source of
/// truth, so any number of managers may share one database.
pub struct RecordManager<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> RecordManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a new section of `course` with its first meeting link.
    ///
    /// The course is created on first reference. Registering an existing
    /// (course, section) fails with `Conflict` and leaves the record as is.
    pub fn register(
        &self,
        course: &str,
        section: &str,
        day: &str,
        time: &str,
        link: &str,
    ) -> Result<Schedule> {
        require_link(link)?;
        require_shape(Role::Course, course, validate::is_course)?;
        require_shape(Role::Section, section, validate::is_section)?;
        require_shape(Role::Day, day, validate::is_day)?;
        require_shape(Role::Time, time, validate::is_time)?;

        let owner = self.store.upsert_course(course)?;
        if self.store.find_schedule(owner.id, section)?.is_some() {
            return Err(conflict(course, section));
        }

        let new = NewSchedule {
            course_id: owner.id,
            section: section.to_string(),
            day: day.to_uppercase(),
            time: time.to_string(),
            link: link.to_string(),
        };
        let outcome = match self.store.insert_schedule(&new) {
            Ok(outcome) => outcome,
            Err(e) => {
                // A course only exists while it has sections.
                if let Err(cleanup) = self.store.delete_course_if_empty(owner.id) {
                    warn!(course, error = %cleanup, "could not drop empty course");
                }
                return Err(e);
            }
        };
        match outcome {
            InsertOutcome::Inserted(schedule) => {
                info!(course, section, day = %schedule.day, time, "section registered");
                Ok(schedule)
            }
            // Lost a race with another register between the check and the insert.
            InsertOutcome::AlreadyExists => Err(conflict(course, section)),
        }
    }

    /// Append `link` to an existing section.
    pub fn add_link(&self, course: &str, section: &str, link: &str) -> Result<AddLinkOutcome> {
        require_link(link)?;
        let schedule = self.require_schedule(course, section)?;

        if self.store.push_link(schedule.id, link)? {
            info!(course, section, link, "link added");
            Ok(AddLinkOutcome::Added)
        } else {
            debug!(course, section, link, "link already present");
            Ok(AddLinkOutcome::Duplicate)
        }
    }

    /// Links of one section, or of every section of the course concatenated
    /// in registration order.
    pub fn get_link(&self, course: &str, section: SectionFilter) -> Result<Vec<String>> {
        match section {
            SectionFilter::Section(section) => {
                Ok(self.require_schedule(course, &section)?.links)
            }
            SectionFilter::All => {
                let owner = self.require_course(course)?;
                let links = self
                    .store
                    .find_schedules(owner.id)?
                    .into_iter()
                    .flat_map(|s| s.links)
                    .collect();
                Ok(links)
            }
        }
    }

    /// Remove `link` from a section. The update targets the schedule by id,
    /// so a concurrent change to its other links is never overwritten.
    pub fn remove_link(
        &self,
        course: &str,
        section: &str,
        link: &str,
    ) -> Result<RemoveLinkOutcome> {
        let schedule = self.require_schedule(course, section)?;

        if self.store.pull_link(schedule.id, link)? {
            info!(course, section, link, "link removed");
            Ok(RemoveLinkOutcome::Removed)
        } else {
            Ok(RemoveLinkOutcome::NotPresent)
        }
    }

    /// `deregister <course> [section]` with raw command arguments.
    ///
    /// Returns the number of schedules deleted (0 when the course does not
    /// exist) or `InvalidArity` for anything but one or two arguments.
    pub fn deregister<A: AsRef<str>>(&self, args: &[A]) -> Result<usize> {
        match args {
            [course] => self.deregister_course(course.as_ref()),
            [course, section] => self.deregister_section(course.as_ref(), section.as_ref()),
            _ => Err(RecordError::InvalidArity { got: args.len() }),
        }
    }

    /// Delete one section; the course goes too once it has none left.
    pub fn deregister_section(&self, course: &str, section: &str) -> Result<usize> {
        let Some(owner) = self.store.find_course(course)? else {
            return Ok(0);
        };
        let deleted = self.store.delete_schedules(owner.id, Some(section))?;
        let course_removed = self.store.delete_course_if_empty(owner.id)?;
        info!(course, section, deleted, course_removed, "section deregistered");
        Ok(deleted)
    }

    /// Delete every section of the course and the course itself.
    pub fn deregister_course(&self, course: &str) -> Result<usize> {
        let Some(owner) = self.store.find_course(course)? else {
            return Ok(0);
        };
        let deleted = self.store.delete_schedules(owner.id, None)?;
        self.store.delete_course(owner.id)?;
        info!(course, deleted, "course deregistered");
        Ok(deleted)
    }

    /// Drop every course and schedule. Irreversible.
    pub fn clear_all(&self) -> Result<()> {
        self.store.clear()?;
        warn!("all courses and schedules cleared");
        Ok(())
    }

    pub fn list_courses(&self) -> Result<Vec<Course>> {
        self.store.list_courses()
    }

    fn require_course(&self, course: &str) -> Result<Course> {
        self.store
            .find_course(course)?
            .ok_or_else(|| RecordError::CourseNotFound(course.to_string()))
    }

    fn require_schedule(&self, course: &str, section: &str) -> Result<Schedule> {
        let owner = self.require_course(course)?;
        self.store
            .find_schedule(owner.id, section)?
            .ok_or_else(|| RecordError::ScheduleNotFound {
                course: course.to_string(),
                section: section.to_string(),
            })
    }
}

fn require_link(link: &str) -> Result<()> {
    if validate::is_valid_url(link) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUrl(link.to_string()).into())
    }
}

fn require_shape(role: Role, value: &str, is_valid: fn(&str) -> bool) -> Result<()> {
    if is_valid(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidShape {
            role,
            value: value.to_string(),
        }
        .into())
    }
}

fn conflict(course: &str, section: &str) -> RecordError {
    RecordError::Conflict {
        course: course.to_string(),
        section: section.to_string(),
    }
}
