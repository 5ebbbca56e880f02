//! Stored entities and read-only projections.

use crate::predicate::{Field, Operand, Record};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A team. Members point at their team through `team_id`.
///
/// ```rust
/// use member_repository::entity::Team;
///
/// let team = Team::new("teamA");
/// assert_eq!(team.name, "teamA");
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Team {
    /// Unique identifier, the partition key of the team table.
    pub id: Uuid,
    /// Team name.
    pub name: String,
}

impl Team {
    /// Create a team with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A member, belonging to at most one team.
///
/// ```rust
/// use member_repository::entity::{Member, Team};
///
/// let team = Team::new("teamA");
/// let member = Member::new("member1", 10, Some(&team));
/// assert_eq!(member.team_id, Some(team.id));
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Member {
    /// Unique identifier, the partition key of the member table.
    pub id: Uuid,
    /// Username; members may be stored without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Age in years.
    pub age: i32,
    /// Identifier of the owning team, absent for teamless members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
}

impl Member {
    /// Create a member with a fresh identifier.
    pub fn new(username: impl Into<String>, age: i32, team: Option<&Team>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: Some(username.into()),
            age,
            team_id: team.map(|team| team.id),
        }
    }

    /// Create a member without a username.
    pub fn anonymous(age: i32, team: Option<&Team>) -> Self {
        Self {
            username: None,
            ..Self::new(String::new(), age, team)
        }
    }

    /// Move the member to another team.
    pub fn change_team(&mut self, team: &Team) {
        self.team_id = Some(team.id);
    }
}

impl Record for Member {
    fn value(&self, field: Field) -> Option<Operand> {
        match field {
            Field::MemberId => Some(Operand::Id(self.id)),
            Field::Username => self.username.clone().map(Operand::Text),
            Field::Age => Some(Operand::Integer(self.age.into())),
            // team columns only exist once the team is joined
            Field::TeamId | Field::TeamName => None,
        }
    }
}

/// One search result row: a member left-joined with its team.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemberTeamDto {
    /// The member identifier.
    pub member_id: Uuid,
    /// The member username.
    pub username: Option<String>,
    /// The member age.
    pub age: i32,
    /// The joined team identifier, absent when the member has no team.
    pub team_id: Option<Uuid>,
    /// The joined team name, absent when the member has no team.
    pub team_name: Option<String>,
}

impl MemberTeamDto {
    /// Project a member and its (possibly absent) team into a result row.
    pub fn new(member: &Member, team: Option<&Team>) -> Self {
        Self {
            member_id: member.id,
            username: member.username.clone(),
            age: member.age,
            team_id: team.map(|team| team.id),
            team_name: team.map(|team| team.name.clone()),
        }
    }
}

impl Record for MemberTeamDto {
    fn value(&self, field: Field) -> Option<Operand> {
        match field {
            Field::MemberId => Some(Operand::Id(self.member_id)),
            Field::Username => self.username.clone().map(Operand::Text),
            Field::Age => Some(Operand::Integer(self.age.into())),
            Field::TeamId => self.team_id.map(Operand::Id),
            Field::TeamName => self.team_name.clone().map(Operand::Text),
        }
    }
}

/// Username and age projection of a member.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemberDto {
    /// The member username.
    #[serde(default)]
    pub username: Option<String>,
    /// The member age.
    pub age: i32,
}

impl From<&Member> for MemberDto {
    fn from(member: &Member) -> Self {
        Self {
            username: member.username.clone(),
            age: member.age,
        }
    }
}
