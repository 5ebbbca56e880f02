//! Predicates over members and their joined team.
//!
//! A [`Clause`] is a small expression tree that knows nothing about the store it
//! will run against. The factory functions at the bottom of this module map one
//! optional search criterion to either an active clause or `None`; `None` is the
//! identity of conjunction, so absent criteria simply drop out of a filter.
//!
//! ```rust
//! use member_repository::predicate::{self, Clause, Field, Operand};
//!
//! let clause = predicate::and(predicate::username_eq(Some("   ")), predicate::age_eq(Some(10)));
//! assert_eq!(clause, Some(Clause::Equals(Field::Age, Operand::Integer(10))));
//! ```

/// Composition of clauses into filters.
pub mod filter;

use serde::Serialize;
use std::{cmp, fmt};
use uuid::Uuid;

/// Which stored entity a field belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Source {
    /// Attributes of the member item.
    Member,
    /// Attributes only known after joining the team.
    Team,
}

/// Fields of a member/team row that clauses can refer to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Field {
    /// `member.id`
    MemberId,
    /// `member.username`
    Username,
    /// `member.age`
    Age,
    /// `team.id`
    TeamId,
    /// `team.name`
    TeamName,
}

impl Field {
    /// The entity owning this field.
    pub fn source(self) -> Source {
        match self {
            Self::MemberId | Self::Username | Self::Age => Source::Member,
            Self::TeamId | Self::TeamName => Source::Team,
        }
    }

    /// The attribute name in the owning table.
    pub fn attribute(self) -> &'static str {
        match self {
            Self::MemberId | Self::TeamId => "id",
            Self::Username => "username",
            Self::Age => "age",
            Self::TeamName => "name",
        }
    }
}

/// A literal value compared against a field.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    /// Text value.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Identifier value, stored as a string.
    Id(Uuid),
}

impl Operand {
    /// Compare two operands of the same kind; operands of different kinds are unordered.
    pub fn compare(&self, other: &Self) -> Option<cmp::Ordering> {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => Some(left.cmp(right)),
            (Self::Integer(left), Self::Integer(right)) => Some(left.cmp(right)),
            (Self::Id(left), Self::Id(right)) => Some(left.cmp(right)),
            _ => None,
        }
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Uuid> for Operand {
    fn from(value: Uuid) -> Self {
        Self::Id(value)
    }
}

/// Anything a clause can be evaluated against.
pub trait Record {
    /// The value of `field`, or `None` when it is absent.
    fn value(&self, field: Field) -> Option<Operand>;
}

/// Boolean expression over a row.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Clause {
    /// `field = operand`
    Equals(Field, Operand),
    /// `field >= operand`
    GreaterOrEqual(Field, Operand),
    /// `field <= operand`
    LessOrEqual(Field, Operand),
    /// `field > operand`
    GreaterThan(Field, Operand),
    /// `field < operand`
    LessThan(Field, Operand),
    /// Every inner clause holds. Never nested directly inside another `And`.
    And(Vec<Clause>),
}

impl Clause {
    /// `field = value`
    pub fn eq(field: Field, value: impl Into<Operand>) -> Self {
        Self::Equals(field, value.into())
    }

    /// `field >= value`
    pub fn goe(field: Field, value: impl Into<Operand>) -> Self {
        Self::GreaterOrEqual(field, value.into())
    }

    /// `field <= value`
    pub fn loe(field: Field, value: impl Into<Operand>) -> Self {
        Self::LessOrEqual(field, value.into())
    }

    /// `field > value`
    pub fn gt(field: Field, value: impl Into<Operand>) -> Self {
        Self::GreaterThan(field, value.into())
    }

    /// `field < value`
    pub fn lt(field: Field, value: impl Into<Operand>) -> Self {
        Self::LessThan(field, value.into())
    }

    /// Conjoin with an optional clause. An absent right-hand side leaves `self` unchanged.
    pub fn and(self, other: impl Into<Option<Clause>>) -> Self {
        let Some(other) = other.into() else {
            return self;
        };
        let mut conjuncts = self.into_conjuncts();
        conjuncts.extend(other.into_conjuncts());
        Self::And(conjuncts)
    }

    /// Flatten into the list of clauses that must all hold.
    pub fn into_conjuncts(self) -> Vec<Clause> {
        match self {
            Self::And(clauses) => clauses
                .into_iter()
                .flat_map(Clause::into_conjuncts)
                .collect(),
            clause => vec![clause],
        }
    }

    /// Whether every field referenced by this clause is stored on the member item.
    pub fn is_member_only(&self) -> bool {
        match self {
            Self::Equals(field, _)
            | Self::GreaterOrEqual(field, _)
            | Self::LessOrEqual(field, _)
            | Self::GreaterThan(field, _)
            | Self::LessThan(field, _) => field.source() == Source::Member,
            Self::And(clauses) => clauses.iter().all(Clause::is_member_only),
        }
    }

    /// Evaluate against a record. Comparisons against an absent value never hold.
    pub fn matches(&self, record: &impl Record) -> bool {
        let compare = |field: &Field, operand: &Operand| {
            record
                .value(*field)
                .and_then(|value| value.compare(operand))
        };
        match self {
            Self::Equals(field, operand) => compare(field, operand) == Some(cmp::Ordering::Equal),
            Self::GreaterOrEqual(field, operand) => {
                matches!(compare(field, operand), Some(ordering) if ordering.is_ge())
            }
            Self::LessOrEqual(field, operand) => {
                matches!(compare(field, operand), Some(ordering) if ordering.is_le())
            }
            Self::GreaterThan(field, operand) => compare(field, operand) == Some(cmp::Ordering::Greater),
            Self::LessThan(field, operand) => compare(field, operand) == Some(cmp::Ordering::Less),
            Self::And(clauses) => clauses.iter().all(|clause| clause.matches(record)),
        }
    }
}

fn write_comparison(
    f: &mut fmt::Formatter<'_>,
    field: &Field,
    operator: &str,
    operand: &Operand,
) -> fmt::Result {
    match operand {
        Operand::Text(text) => write!(f, "{field:?} {operator} {text:?}"),
        Operand::Integer(integer) => write!(f, "{field:?} {operator} {integer}"),
        Operand::Id(id) => write!(f, "{field:?} {operator} {id}"),
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(field, operand) => write_comparison(f, field, "=", operand),
            Self::GreaterOrEqual(field, operand) => write_comparison(f, field, ">=", operand),
            Self::LessOrEqual(field, operand) => write_comparison(f, field, "<=", operand),
            Self::GreaterThan(field, operand) => write_comparison(f, field, ">", operand),
            Self::LessThan(field, operand) => write_comparison(f, field, "<", operand),
            Self::And(clauses) => {
                for (index, clause) in clauses.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" AND ")?;
                    }
                    write!(f, "({clause})")?;
                }
                Ok(())
            }
        }
    }
}

/// Conjoin two optional clauses, treating an absent side as "no constraint".
pub fn and(left: Option<Clause>, right: Option<Clause>) -> Option<Clause> {
    match (left, right) {
        (Some(left), right) => Some(left.and(right)),
        (None, right) => right,
    }
}

/// Whether `text` is present and contains at least one non-blank character.
///
/// Non-breaking spaces (U+00A0, U+2007, U+202F) and U+0085 count as text;
/// the information separators U+001C to U+001F count as blank.
pub fn has_text(text: Option<&str>) -> bool {
    text.is_some_and(|text| text.chars().any(|c| !is_blank(c)))
}

fn is_blank(c: char) -> bool {
    match c {
        '\u{a0}' | '\u{2007}' | '\u{202f}' | '\u{85}' => false,
        '\u{1c}'..='\u{1f}' => true,
        c => c.is_whitespace(),
    }
}

/// `member.username = username`, or `None` when the username is blank.
pub fn username_eq(username: Option<&str>) -> Option<Clause> {
    username
        .filter(|username| has_text(Some(username)))
        .map(|username| Clause::eq(Field::Username, username))
}

/// `team.name = team_name`, or `None` when the team name is blank.
pub fn team_name_eq(team_name: Option<&str>) -> Option<Clause> {
    team_name
        .filter(|team_name| has_text(Some(team_name)))
        .map(|team_name| Clause::eq(Field::TeamName, team_name))
}

/// `member.age >= age_goe`, or `None` when absent.
pub fn age_goe(age_goe: Option<i32>) -> Option<Clause> {
    age_goe.map(|age| Clause::goe(Field::Age, age))
}

/// `member.age <= age_loe`, or `None` when absent.
pub fn age_loe(age_loe: Option<i32>) -> Option<Clause> {
    age_loe.map(|age| Clause::loe(Field::Age, age))
}

/// `member.age = age`, or `None` when absent.
pub fn age_eq(age: Option<i32>) -> Option<Clause> {
    age.map(|age| Clause::eq(Field::Age, age))
}
