use crate::entity::{Member, MemberTeamDto, Team};

use serde::Serialize;
use uuid::Uuid;

/// Count, sum and average of member ages.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AgeSummary {
    /// Number of members.
    pub count: usize,
    /// Sum of their ages.
    pub sum: i64,
    /// Mean age, `None` when there is no member.
    pub average: Option<f64>,
}

impl AgeSummary {
    /// Summarize the ages of `rows`.
    pub fn of<'a>(rows: impl IntoIterator<Item = &'a MemberTeamDto>) -> Self {
        rows.into_iter().map(|row| row.age).collect()
    }
}

impl FromIterator<i32> for AgeSummary {
    fn from_iter<I: IntoIterator<Item = i32>>(ages: I) -> Self {
        let (count, sum) = ages
            .into_iter()
            .fold((0usize, 0i64), |(count, sum), age| (count + 1, sum + i64::from(age)));
        let average = (count > 0).then(|| sum as f64 / count as f64);
        Self {
            count,
            sum,
            average,
        }
    }
}

/// Average member age of one team.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamAverage {
    /// The team identifier.
    pub team_id: Uuid,
    /// The team name.
    pub team_name: String,
    /// Number of members in the team.
    pub member_count: usize,
    /// Mean age of those members.
    pub average_age: f64,
}

/// Average age per team, ordered by team name.
///
/// Teams are inner-joined: teams without members and members without a team
/// are left out.
pub fn average_age_by_team(members: &[Member], teams: &[Team]) -> Vec<TeamAverage> {
    let mut teams: Vec<&Team> = teams.iter().collect();
    teams.sort_by(|left, right| left.name.cmp(&right.name).then(left.id.cmp(&right.id)));
    teams
        .into_iter()
        .filter_map(|team| {
            let summary: AgeSummary = members
                .iter()
                .filter(|member| member.team_id == Some(team.id))
                .map(|member| member.age)
                .collect();
            summary.average.map(|average_age| TeamAverage {
                team_id: team.id,
                team_name: team.name.clone(),
                member_count: summary.count,
                average_age,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        predicate::filter::Filter,
        search::{
            self,
            tests::{TeamFixture, team_fixture},
        },
    };

    use rstest::rstest;

    #[rstest]
    fn test_age_summary(team_fixture: TeamFixture) {
        let rows = search::execute(&team_fixture.members, &team_fixture.teams, &Filter::none());
        let summary = AgeSummary::of(&rows);
        assert_eq!(
            summary,
            AgeSummary {
                count: 4,
                sum: 100,
                average: Some(25.0),
            }
        );
    }

    #[test]
    fn test_age_summary_of_nothing() {
        let summary = AgeSummary::of(&Vec::<MemberTeamDto>::new());
        assert_eq!(summary, AgeSummary::default());
        assert_eq!(summary.average, None);
    }

    #[rstest]
    fn test_average_age_by_team(mut team_fixture: TeamFixture) {
        team_fixture.members.push(Member::new("member5", 99, None));
        team_fixture.teams.push(Team::new("empty"));
        let averages = average_age_by_team(&team_fixture.members, &team_fixture.teams);
        let actual: Vec<(&str, usize, f64)> = averages
            .iter()
            .map(|average| {
                (
                    average.team_name.as_str(),
                    average.member_count,
                    average.average_age,
                )
            })
            .collect();
        assert_eq!(actual, [("teamA", 2, 15.0), ("teamB", 2, 35.0)]);
    }
}
