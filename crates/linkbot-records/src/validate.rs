//! Shape predicates for command arguments.
//!
//! Each predicate answers one question about a bare token. The classifier
//! chains them in a fixed order; `register` uses them directly.

use std::net::IpAddr;
use std::sync::OnceLock;

use regex::Regex;
use url::{Host, Url};

const LINK_SCHEMES: &[&str] = &["http", "https", "ftp"];

fn day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Letters of M, T, W, Th, F, S in any combination.
    RE.get_or_init(|| Regex::new(r"(?i)^[mtwhfs]+$").expect("day pattern compiles"))
}

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[TtPpLl]\d+$").expect("section pattern compiles"))
}

fn course_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9-]+$").expect("course pattern compiles"))
}

/// Returns `true` for an absolute http(s)/ftp URL with a plausible host:
/// an IP address, `localhost`, or a dotted domain whose labels are non-empty.
pub fn is_valid_url(token: &str) -> bool {
    let Ok(url) = Url::parse(token) else {
        return false;
    };
    if !LINK_SCHEMES.contains(&url.scheme()) {
        return false;
    }
    match url.host() {
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        Some(Host::Domain(domain)) => {
            if domain.eq_ignore_ascii_case("localhost") || domain.parse::<IpAddr>().is_ok() {
                return true;
            }
            let labels: Vec<&str> = domain.trim_end_matches('.').split('.').collect();
            labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
        }
        None => false,
    }
}

/// Meeting time: one or more ASCII digits (`1000`, `930`).
pub fn is_time(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_day(token: &str) -> bool {
    day_re().is_match(token)
}

/// Section label: a type letter (tutorial, practical, lecture) then a number.
pub fn is_section(token: &str) -> bool {
    section_re().is_match(token)
}

pub fn is_course(token: &str) -> bool {
    course_re().is_match(token)
}
