//! Command execution and the outcome → reply mapping.

use linkbot_records::{
    AddLinkOutcome, RecordError, RecordManager, RecordStore, RemoveLinkOutcome, SectionFilter,
    ValidationError,
};
use tracing::warn;

use crate::commands::{Command, UsageError};

/// What the bot sends back for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Acknowledge with a 👌 reaction on the command message.
    Ok,
    Text(String),
    /// Latency check; the handler looks up the heartbeat and fills in the number.
    Pong,
}

impl From<UsageError> for Reply {
    fn from(e: UsageError) -> Self {
        Reply::Text(e.usage)
    }
}

const DB_FAILURE: &str = "\u{26a0}\u{fe0f} Could not reach the course database. Please try again later.";
const NOT_ADDED: &str = "You sure that course/link has been added?";
const BAD_SYNTAX: &str = "C'mon, that's not even valid syntax";
const LINK_NOT_PRESENT: &str = "Link not present.";

/// Run `command` against the record manager and pick the reply.
pub fn execute<S: RecordStore>(records: &RecordManager<S>, command: Command) -> Reply {
    let name = command.name();
    match command {
        Command::Ping => Reply::Pong,
        Command::Help { prefix } => Reply::Text(help_text(&prefix)),

        Command::Register {
            course,
            section,
            day,
            time,
            link,
        } => match records.register(&course, &section, &day, &time, &link) {
            Ok(_) => Reply::Ok,
            Err(e) => failure(name, e, |e| e.to_string()),
        },

        Command::Deregister { args } => match records.deregister(&args) {
            Ok(0) => Reply::Text("Course does not exist.".to_string()),
            Ok(_) => Reply::Ok,
            Err(e) => failure(name, e, |e| match e {
                RecordError::InvalidArity { .. } => BAD_SYNTAX.to_string(),
                other => other.to_string(),
            }),
        },

        Command::AddLink {
            course,
            section,
            link,
        } => match records.add_link(&course, &section, &link) {
            Ok(AddLinkOutcome::Added) => Reply::Ok,
            Ok(AddLinkOutcome::Duplicate) => Reply::Text("Link already exists!".to_string()),
            Err(e) => failure(name, e, |e| match e {
                RecordError::Validation(ValidationError::InvalidUrl(_)) => {
                    "Invalid URL Format.".to_string()
                }
                RecordError::CourseNotFound(_) | RecordError::ScheduleNotFound { .. } => format!(
                    "{course} {section} is not registered yet. Register it first."
                ),
                other => other.to_string(),
            }),
        },

        Command::GetLink { course, section } => {
            let filter = SectionFilter::from(section.as_deref());
            match records.get_link(&course, filter) {
                Ok(links) if links.is_empty() => {
                    Reply::Text(format!("No links saved for {course}."))
                }
                Ok(links) => Reply::Text(format_links(&links)),
                // Any lookup failure reads the same to the user.
                Err(e) => failure(name, e, |_| NOT_ADDED.to_string()),
            }
        }

        Command::RemoveLink {
            course,
            section,
            link,
        } => match records.remove_link(&course, &section, &link) {
            Ok(RemoveLinkOutcome::Removed) => {
                Reply::Text(format!("Link removed from {course} {section}"))
            }
            Ok(RemoveLinkOutcome::NotPresent) => Reply::Text(LINK_NOT_PRESENT.to_string()),
            Err(e) => failure(name, e, |e| {
                if e.is_not_found() {
                    LINK_NOT_PRESENT.to_string()
                } else {
                    e.to_string()
                }
            }),
        },

        Command::ShowAll => match records.list_courses() {
            Ok(courses) if courses.is_empty() => {
                Reply::Text("No courses registered.".to_string())
            }
            Ok(courses) => Reply::Text(
                courses
                    .into_iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Err(e) => failure(name, e, |e| e.to_string()),
        },

        Command::ClearDatabase => match records.clear_all() {
            Ok(()) => Reply::Text("Database cleared.".to_string()),
            Err(e) => failure(name, e, |e| e.to_string()),
        },
    }
}

/// Database failures get a generic reply and a log line; everything else is
/// the caller's to word.
fn failure(command: &str, e: RecordError, describe: impl FnOnce(&RecordError) -> String) -> Reply {
    if let RecordError::Database(ref db) = e {
        warn!(command, error = %db, "record store failure");
        return Reply::Text(DB_FAILURE.to_string());
    }
    Reply::Text(describe(&e))
}

/// One link per line, wrapped in `<>` so Discord does not unfurl previews.
pub fn format_links(links: &[String]) -> String {
    links
        .iter()
        .map(|l| format!("<{l}>"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn help_text(prefix: &str) -> String {
    format!(
        "**Linkbot Commands**\n\
         - `{p}register <course> <section> <day> <time> <link>`: add a course section\n\
         - `{p}deregister <course> [section]`: remove a section, or the whole course\n\
         - `{p}addlink <course> <section> <link>`: add a meeting link (any order)\n\
         - `{p}getlink <course> [section]`: show links, all sections if omitted\n\
         - `{p}removelink <course> <section> <link>`: remove a meeting link\n\
         - `{p}show_all`: list registered courses\n\
         - `{p}clear_database`: deregister everything. Use with caution!\n\
         - `{p}ping`: check that the bot is alive",
        p = prefix
    )
}
