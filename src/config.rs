//! Table configuration.

use serde::Deserialize;
use std::env;

/// Environment variable holding the member table name.
pub const MEMBER_TABLE_ENV: &str = "MEMBER_TABLE";

/// Environment variable holding the team table name.
pub const TEAM_TABLE_ENV: &str = "TEAM_TABLE";

/// Names of the DynamoDB tables backing the repository.
///
/// ```rust
/// use member_repository::config::Tables;
///
/// let tables = Tables {
///     member: "test-member".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(tables.team, "team");
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Tables {
    /// The member table, keyed by `id`.
    pub member: String,
    /// The team table, keyed by `id`.
    pub team: String,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            member: "member".to_string(),
            team: "team".to_string(),
        }
    }
}

impl Tables {
    /// Read table names from `MEMBER_TABLE` and `TEAM_TABLE`, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            member: lookup(MEMBER_TABLE_ENV)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.member),
            team: lookup(TEAM_TABLE_ENV)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.team),
        }
    }
}
