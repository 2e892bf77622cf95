use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::marker::Owner;

static USER_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"[0-9a-f]{8}-?[0-9a-f]{4}-?[0-9a-f]{4}-?[0-9a-f]{4}-?[0-9a-f]{12}")
        .case_insensitive(true)
        .build()
        .expect("user id pattern is valid")
});

static SLASH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?<expression>.+)/(?<flags>[dgimsuvy]*)$").expect("slash pattern is valid")
});

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("invalid owner pattern /{pattern}/: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Predicate over marker owners, parsed from the free-text filter field.
#[derive(Debug, Clone, Default)]
pub enum OwnerFilter {
    /// Empty filter, everything passes.
    #[default]
    Inert,
    /// Lowercased needle matched against user and display names.
    Text(String),
    /// Canonical user id with separators stripped, lowercased.
    UserId(String),
    Pattern(Regex),
}

impl OwnerFilter {
    /// Parse filter text. `/expr/flags` is a regular expression, anything
    /// shaped like a user id matches that id exactly, the rest is a substring.
    pub fn parse(text: &str) -> Result<Self, FilterError> {
        if text.trim().is_empty() {
            return Ok(Self::Inert);
        }

        if let Some(caps) = SLASH_PATTERN.captures(text) {
            let expression = &caps["expression"];
            let flags = &caps["flags"];
            let regex = RegexBuilder::new(expression)
                .case_insensitive(flags.contains('i'))
                .multi_line(flags.contains('m'))
                .dot_matches_new_line(flags.contains('s'))
                .build()
                .map_err(|source| FilterError::InvalidPattern {
                    pattern: expression.to_string(),
                    source,
                })?;
            return Ok(Self::Pattern(regex));
        }

        if USER_ID_PATTERN.is_match(text) {
            return Ok(Self::UserId(normalize_user_id(text)));
        }

        Ok(Self::Text(text.to_lowercase()))
    }

    pub fn is_inert(&self) -> bool {
        matches!(self, Self::Inert)
    }

    /// Markers without an owner are never filtered out.
    pub fn matches(&self, owner: Option<&Owner>) -> bool {
        let Some(owner) = owner else {
            return true;
        };
        match self {
            Self::Inert => true,
            Self::Text(needle) => {
                owner.user_name.to_lowercase().contains(needle.as_str())
                    || owner.display_name.to_lowercase().contains(needle.as_str())
            }
            Self::UserId(id) => normalize_user_id(&owner.user_id) == *id,
            Self::Pattern(regex) => {
                regex.is_match(&owner.user_name) || regex.is_match(&owner.display_name)
            }
        }
    }
}

fn normalize_user_id(id: &str) -> String {
    id.trim().replace('-', "").to_lowercase()
}
