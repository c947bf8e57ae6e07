//! Prefix command parsing: `$register`, `$addlink`, `$getlink`, ...
//!
//! Parsing is pure: it turns message text into a [`Command`] or a usage
//! error and never touches the store. Execution lives in [`crate::respond`].

use linkbot_records::classify;

/// Commands understood by the bot, with arguments already arranged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Help {
        prefix: String,
    },
    Register {
        course: String,
        section: String,
        day: String,
        time: String,
        link: String,
    },
    /// Arity is checked by the record manager so its error drives the reply.
    Deregister {
        args: Vec<String>,
    },
    AddLink {
        course: String,
        section: String,
        link: String,
    },
    GetLink {
        course: String,
        section: Option<String>,
    },
    RemoveLink {
        course: String,
        section: String,
        link: String,
    },
    ShowAll,
    ClearDatabase,
}

impl Command {
    /// Canonical name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "ping",
            Command::Help { .. } => "help",
            Command::Register { .. } => "register",
            Command::Deregister { .. } => "deregister",
            Command::AddLink { .. } => "addlink",
            Command::GetLink { .. } => "getlink",
            Command::RemoveLink { .. } => "removelink",
            Command::ShowAll => "show_all",
            Command::ClearDatabase => "clear_database",
        }
    }
}

/// A recognised command with unusable arguments; carries the usage line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError {
    pub usage: String,
}

impl UsageError {
    fn new(prefix: &str, usage: &str) -> Self {
        Self {
            usage: format!("Usage: `{prefix}{usage}`"),
        }
    }
}

const REGISTER_USAGE: &str = "register <course> <section> <day> <time> <link>";
const ADDLINK_USAGE: &str = "addlink <course> <section> <link>";
const REMOVELINK_USAGE: &str = "removelink <course> <section> <link>";
const GETLINK_USAGE: &str = "getlink <course> [section]";

/// Parse a message. `None` means the message is not for the bot: no
/// prefix, or an unknown command name.
pub fn parse(content: &str, prefix: &str) -> Option<Result<Command, UsageError>> {
    let body = content.trim().strip_prefix(prefix)?;
    // The command name must follow the prefix directly: `$ register` is chat.
    if body.starts_with(char::is_whitespace) {
        return None;
    }
    let mut tokens = body.split_whitespace();
    let name = tokens.next()?.to_ascii_lowercase();
    let args: Vec<String> = tokens.map(String::from).collect();

    let parsed = match name.as_str() {
        "ping" => Ok(Command::Ping),
        "help" => Ok(Command::Help {
            prefix: prefix.to_string(),
        }),
        "register" | "register_course" | "add" => parse_register(prefix, args),
        "deregister" => Ok(Command::Deregister { args }),
        "addlink" | "add_link" => resolve_triplet(&args)
            .map(|(course, section, link)| Command::AddLink {
                course,
                section,
                link,
            })
            .ok_or_else(|| UsageError::new(prefix, ADDLINK_USAGE)),
        "getlink" => match args.as_slice() {
            [course] => Ok(Command::GetLink {
                course: course.clone(),
                section: None,
            }),
            [course, section] => Ok(Command::GetLink {
                course: course.clone(),
                section: Some(section.clone()),
            }),
            _ => Err(UsageError::new(prefix, GETLINK_USAGE)),
        },
        "removelink" | "remove_link" => resolve_triplet(&args)
            .map(|(course, section, link)| Command::RemoveLink {
                course,
                section,
                link,
            })
            .ok_or_else(|| UsageError::new(prefix, REMOVELINK_USAGE)),
        "show_all" => Ok(Command::ShowAll),
        "clear_database" => Ok(Command::ClearDatabase),
        _ => return None,
    };
    Some(parsed)
}

/// Registration keeps the documented positional order.
fn parse_register(prefix: &str, args: Vec<String>) -> Result<Command, UsageError> {
    let [course, section, day, time, link] = <[String; 5]>::try_from(args)
        .map_err(|_| UsageError::new(prefix, REGISTER_USAGE))?;
    Ok(Command::Register {
        course,
        section,
        day,
        time,
        link,
    })
}

/// Arrange (course, section, link) from three tokens in any order.
///
/// When the tokens do not classify cleanly into exactly those roles, fall
/// back to positional order so the record manager can name the bad value
/// (usually an invalid link).
fn resolve_triplet(args: &[String]) -> Option<(String, String, String)> {
    let [first, second, third] = args else {
        return None;
    };
    if let Ok(classified) = classify(args) {
        if let (Some(course), Some(section), Some(link)) =
            (classified.course(), classified.section(), classified.link())
        {
            return Some((course.to_string(), section.to_string(), link.to_string()));
        }
    }
    Some((first.clone(), second.clone(), third.clone()))
}
