//! Order-independent argument classification.
//!
//! Users type `addlink https://meet.example/x CS101 L1` as often as the
//! documented order, so each token's role is inferred from its shape instead
//! of its position.

use crate::error::ValidationError;
use crate::types::Role;
use crate::validate;

/// Upper bound on tokens: one per role.
pub const MAX_ARGS: usize = Role::ALL.len();

/// Tokens sorted into their role slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedArgs {
    slots: [Option<String>; MAX_ARGS],
}

impl ClassifiedArgs {
    pub fn get(&self, role: Role) -> Option<&str> {
        self.slots[role.index()].as_deref()
    }

    pub fn course(&self) -> Option<&str> {
        self.get(Role::Course)
    }

    pub fn section(&self) -> Option<&str> {
        self.get(Role::Section)
    }

    pub fn day(&self) -> Option<&str> {
        self.get(Role::Day)
    }

    pub fn time(&self) -> Option<&str> {
        self.get(Role::Time)
    }

    pub fn link(&self) -> Option<&str> {
        self.get(Role::Link)
    }

    /// Filled slots in canonical order (course, section, day, time, link).
    pub fn ordered(&self) -> Vec<&str> {
        self.slots.iter().filter_map(|s| s.as_deref()).collect()
    }
}

/// Infer the role of a single token. Predicates run in priority order; the
/// first match wins.
pub fn role_of(token: &str) -> Result<Role, ValidationError> {
    if validate::is_valid_url(token) {
        Ok(Role::Link)
    } else if validate::is_time(token) {
        Ok(Role::Time)
    } else if validate::is_day(token) {
        Ok(Role::Day)
    } else if validate::is_section(token) {
        Ok(Role::Section)
    } else if validate::is_course(token) {
        Ok(Role::Course)
    } else {
        Err(ValidationError::UnexpectedArgument(token.to_string()))
    }
}

/// Sort up to [`MAX_ARGS`] tokens into role slots.
///
/// Fails on too many tokens, on a token no predicate accepts, and on two
/// tokens claiming the same role.
pub fn classify<S: AsRef<str>>(tokens: &[S]) -> Result<ClassifiedArgs, ValidationError> {
    if tokens.len() > MAX_ARGS {
        return Err(ValidationError::TooManyArguments {
            got: tokens.len(),
            max: MAX_ARGS,
        });
    }

    let mut args = ClassifiedArgs::default();
    for token in tokens {
        let token = token.as_ref();
        let role = role_of(token)?;
        let slot = &mut args.slots[role.index()];
        if let Some(first) = slot {
            return Err(ValidationError::DuplicateRole {
                role,
                first: first.clone(),
                second: token.to_string(),
            });
        }
        *slot = Some(token.to_string());
    }
    Ok(args)
}
