use thiserror::Error;

use crate::types::Role;

/// Caller-supplied input that was rejected before touching the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("Too many arguments: got {got}, at most {max} allowed")]
    TooManyArguments { got: usize, max: usize },

    /// Two tokens classified into the same slot.
    #[error("More than one {role} given: `{first}` and `{second}`")]
    DuplicateRole {
        role: Role,
        first: String,
        second: String,
    },

    #[error("`{value}` is not a valid {role}")]
    InvalidShape { role: Role, value: String },
}

/// All record-layer errors. The command layer maps each variant to a reply.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{course} {section} is already registered! Use addlink to add a link to the record.")]
    Conflict { course: String, section: String },

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Section not found: {course} {section}")]
    ScheduleNotFound { course: String, section: String },

    #[error("Expected a course and an optional section, got {got} arguments")]
    InvalidArity { got: usize },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl RecordError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RecordError::CourseNotFound(_) | RecordError::ScheduleNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;
