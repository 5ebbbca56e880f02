//! Conditional member search.
//!
//! A [`MemberSearchCondition`] carries up to four optional criteria. A
//! [`Strategy`] turns it into a [`Filter`], and [`execute`] applies that filter
//! to members left-joined with their teams.
//!
//! ```rust
//! use member_repository::search::{MemberSearchCondition, Strategy};
//!
//! let condition = MemberSearchCondition {
//!     team_name: Some("teamA".to_string()),
//!     age_goe: Some(20),
//!     ..Default::default()
//! };
//! assert_eq!(
//!     Strategy::Accumulator.compose(&condition),
//!     Strategy::ConjunctionList.compose(&condition),
//! );
//! ```

/// Aggregates over search results.
pub mod aggregate;

/// Sorting and pagination of search results.
pub mod page;

use crate::{
    entity::{Member, MemberTeamDto, Team},
    predicate::{
        self,
        filter::{ClauseBuilder, Filter},
    },
};

use serde::Deserialize;
use std::{cmp, collections};
use uuid::Uuid;

/// Optional search criteria. Every field is independent; an empty condition matches everything.
///
/// Blank text (empty or whitespace only) is treated as absent.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(default)]
pub struct MemberSearchCondition {
    /// Exact username.
    pub username: Option<String>,
    /// Exact name of the member's team.
    #[serde(alias = "teamName")]
    pub team_name: Option<String>,
    /// Inclusive lower bound on age.
    #[serde(alias = "ageGoe")]
    pub age_goe: Option<i32>,
    /// Inclusive upper bound on age.
    #[serde(alias = "ageLoe")]
    pub age_loe: Option<i32>,
}

/// How a [`MemberSearchCondition`] is composed into a [`Filter`].
///
/// Both strategies produce equal filters for every condition.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Strategy {
    /// Start from "always true" and fold in each active criterion.
    Accumulator,
    /// Collect every optional clause, then conjoin the present ones.
    #[default]
    ConjunctionList,
}

impl Strategy {
    /// Compose `condition` into a filter.
    pub fn compose(self, condition: &MemberSearchCondition) -> Filter {
        match self {
            Self::Accumulator => {
                let mut builder = ClauseBuilder::new();
                if predicate::has_text(condition.username.as_deref()) {
                    builder.and(predicate::username_eq(condition.username.as_deref()));
                }
                if predicate::has_text(condition.team_name.as_deref()) {
                    builder.and(predicate::team_name_eq(condition.team_name.as_deref()));
                }
                if condition.age_goe.is_some() {
                    builder.and(predicate::age_goe(condition.age_goe));
                }
                if condition.age_loe.is_some() {
                    builder.and(predicate::age_loe(condition.age_loe));
                }
                builder.build()
            }
            Self::ConjunctionList => Filter::all_of([
                predicate::username_eq(condition.username.as_deref()),
                predicate::team_name_eq(condition.team_name.as_deref()),
                predicate::age_goe(condition.age_goe),
                predicate::age_loe(condition.age_loe),
            ]),
        }
    }
}

/// Join every member with its team. Members without a (known) team keep empty team columns.
pub fn left_join(members: &[Member], teams: &[Team]) -> Vec<MemberTeamDto> {
    let teams: collections::HashMap<Uuid, &Team> =
        teams.iter().map(|team| (team.id, team)).collect();
    members
        .iter()
        .map(|member| {
            let team = member
                .team_id
                .and_then(|team_id| teams.get(&team_id).copied());
            MemberTeamDto::new(member, team)
        })
        .collect()
}

/// Default result order: username ascending with absent usernames last, then member id.
pub fn default_order(left: &MemberTeamDto, right: &MemberTeamDto) -> cmp::Ordering {
    let username = match (&left.username, &right.username) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => cmp::Ordering::Less,
        (None, Some(_)) => cmp::Ordering::Greater,
        (None, None) => cmp::Ordering::Equal,
    };
    username.then_with(|| left.member_id.cmp(&right.member_id))
}

/// Left join `members` with `teams`, keep the rows matching `filter`, and order them.
pub fn execute(members: &[Member], teams: &[Team], filter: &Filter) -> Vec<MemberTeamDto> {
    let mut rows: Vec<MemberTeamDto> = left_join(members, teams)
        .into_iter()
        .filter(|row| filter.matches(row))
        .collect();
    rows.sort_by(default_order);
    rows
}
