//! `linkbot-records`: course and schedule records behind the chat commands.
//!
//! # Overview
//!
//! A [`manager::RecordManager`] sits between the command layer and a
//! [`store::RecordStore`]. It validates arguments, then issues a short
//! sequence of store calls per operation. The SQLite store pushes the
//! uniqueness rules into the schema, so two commands racing on the same
//! (course, section) or link resolve to one winner and one typed outcome.
//!
//! | Operation      | Outcome                                     |
//! |----------------|---------------------------------------------|
//! | `register`     | new [`Schedule`] or `Conflict`              |
//! | `add_link`     | [`AddLinkOutcome`]                          |
//! | `get_link`     | links of one section or the whole course    |
//! | `remove_link`  | [`RemoveLinkOutcome`]                       |
//! | `deregister`   | number of schedules deleted                 |
//! | `clear_all`    | everything dropped                          |

pub mod classify;
pub mod db;
pub mod error;
pub mod manager;
pub mod store;
pub mod types;
pub mod validate;

pub use classify::{classify, ClassifiedArgs};
pub use error::{RecordError, Result, ValidationError};
pub use manager::RecordManager;
pub use store::{InsertOutcome, RecordStore, SqliteStore};
pub use types::{
    AddLinkOutcome, Course, NewSchedule, RemoveLinkOutcome, Role, Schedule, SectionFilter,
};
