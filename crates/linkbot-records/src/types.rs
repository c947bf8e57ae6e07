/// Positional role a command argument can play.
///
/// Declaration order is the canonical output order of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Course,
    Section,
    Day,
    Time,
    Link,
}

impl Role {
    /// All roles in canonical order.
    pub const ALL: [Role; 5] = [
        Role::Course,
        Role::Section,
        Role::Day,
        Role::Time,
        Role::Link,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Course => write!(f, "course"),
            Self::Section => write!(f, "section"),
            Self::Day => write!(f, "day"),
            Self::Time => write!(f, "time"),
            Self::Link => write!(f, "link"),
        }
    }
}

/// A named subject, unique by `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// One section of a course together with its meeting links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub id: i64,
    pub course_id: i64,
    /// Section label, e.g. `L1`, `T2`, `P3`.
    pub section: String,
    /// Uppercased day codes, e.g. `MW`, `TTH`.
    pub day: String,
    pub time: String,
    /// Meeting links in insertion order, no duplicates.
    pub links: Vec<String>,
    pub created_at: String,
}

/// Insert payload for a schedule; the first link seeds the link list.
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub course_id: i64,
    pub section: String,
    pub day: String,
    pub time: String,
    pub link: String,
}

/// Which sections of a course a lookup covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionFilter {
    All,
    Section(String),
}

impl From<Option<&str>> for SectionFilter {
    fn from(section: Option<&str>) -> Self {
        match section {
            Some(s) => SectionFilter::Section(s.to_string()),
            None => SectionFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddLinkOutcome {
    Added,
    /// The link was already in the schedule's list; nothing changed.
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveLinkOutcome {
    Removed,
    NotPresent,
}
