use crate::predicate::{Field, Operand, Record};

use serde::Serialize;
use std::cmp;

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Direction {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

/// Placement of rows whose sort field is absent.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Nulls {
    /// Absent values compare as smallest, so they follow the direction.
    #[default]
    Native,
    /// Absent values always come first.
    First,
    /// Absent values always come last.
    Last,
}

/// One sort key.
///
/// ```rust
/// use member_repository::{predicate::Field, search::page::{Nulls, Order}};
///
/// let order = Order::asc(Field::Username).nulls_last();
/// assert_eq!(order.nulls, Nulls::Last);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Order {
    /// The field to sort by.
    pub field: Field,
    /// The sort direction.
    pub direction: Direction,
    /// Where absent values go.
    pub nulls: Nulls,
}

impl Order {
    /// Ascending order on `field`.
    pub fn asc(field: Field) -> Self {
        Self {
            field,
            direction: Direction::Asc,
            nulls: Nulls::Native,
        }
    }

    /// Descending order on `field`.
    pub fn desc(field: Field) -> Self {
        Self {
            direction: Direction::Desc,
            ..Self::asc(field)
        }
    }

    /// Put absent values first.
    pub fn nulls_first(self) -> Self {
        Self {
            nulls: Nulls::First,
            ..self
        }
    }

    /// Put absent values last.
    pub fn nulls_last(self) -> Self {
        Self {
            nulls: Nulls::Last,
            ..self
        }
    }

    fn compare(&self, left: &impl Record, right: &impl Record) -> cmp::Ordering {
        let ordering = match (left.value(self.field), right.value(self.field)) {
            (Some(left), Some(right)) => {
                let ordering = compare_values(&left, &right);
                return match self.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                };
            }
            (None, None) => return cmp::Ordering::Equal,
            (None, Some(_)) => cmp::Ordering::Less,
            (Some(_), None) => cmp::Ordering::Greater,
        };
        match (self.nulls, self.direction) {
            (Nulls::First, _) => ordering,
            (Nulls::Last, _) => ordering.reverse(),
            (Nulls::Native, Direction::Asc) => ordering,
            (Nulls::Native, Direction::Desc) => ordering.reverse(),
        }
    }
}

fn compare_values(left: &Operand, right: &Operand) -> cmp::Ordering {
    left.compare(right).unwrap_or(cmp::Ordering::Equal)
}

/// Sort `rows` in place by `orders`, earlier orders taking precedence.
///
/// The sort is stable: rows equal under every order keep their relative position.
pub fn sort<R: Record>(rows: &mut [R], orders: &[Order]) {
    if orders.is_empty() {
        return;
    }
    rows.sort_by(|left, right| {
        orders
            .iter()
            .map(|order| order.compare(left, right))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(cmp::Ordering::Equal)
    });
}

/// Offset/limit window and ordering of a result page.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct PageRequest {
    /// Number of rows to skip.
    pub offset: usize,
    /// Maximum number of rows to return. `None` returns every remaining row.
    pub limit: Option<usize>,
    /// Ordering applied before slicing. Empty keeps the incoming order.
    pub sort: Vec<Order>,
}

/// One page of results and the total number of matching rows.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Page<T> {
    /// The rows of this page.
    pub content: Vec<T>,
    /// The number of rows matching the query across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Whether the page holds no row.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Sort `rows` by the request ordering and cut out the requested window.
pub fn paginate<R: Record>(mut rows: Vec<R>, request: &PageRequest) -> Page<R> {
    let total = rows.len();
    sort(&mut rows, &request.sort);
    let content = rows
        .into_iter()
        .skip(request.offset)
        .take(request.limit.unwrap_or(usize::MAX))
        .collect();
    Page { content, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::{Member, MemberTeamDto},
        predicate::filter::Filter,
        search::{
            self,
            tests::{TeamFixture, team_fixture},
        },
    };

    use rstest::rstest;

    fn usernames(rows: &[MemberTeamDto]) -> Vec<Option<&str>> {
        rows.iter().map(|row| row.username.as_deref()).collect()
    }

    #[rstest]
    fn test_sort_age_desc_username_asc_nulls_last(mut team_fixture: TeamFixture) {
        team_fixture.members.push(Member::anonymous(100, None));
        team_fixture.members.push(Member::new("member6", 100, None));
        team_fixture.members.push(Member::new("member5", 100, None));
        let mut rows = search::left_join(&team_fixture.members, &team_fixture.teams);
        rows.retain(|row| row.age == 100);
        sort(
            &mut rows,
            &[
                Order::desc(Field::Age),
                Order::asc(Field::Username).nulls_last(),
            ],
        );
        assert_eq!(usernames(&rows), [Some("member5"), Some("member6"), None]);
    }

    #[rstest]
    #[case::asc_native(Order::asc(Field::Username), [None, Some("a"), Some("b")])]
    #[case::desc_native(Order::desc(Field::Username), [Some("b"), Some("a"), None])]
    #[case::asc_last(Order::asc(Field::Username).nulls_last(), [Some("a"), Some("b"), None])]
    #[case::desc_first(Order::desc(Field::Username).nulls_first(), [None, Some("b"), Some("a")])]
    fn test_nulls(#[case] order: Order, #[case] expected: [Option<&str>; 3]) {
        let mut rows: Vec<MemberTeamDto> = [
            Member::new("a", 1, None),
            Member::anonymous(1, None),
            Member::new("b", 1, None),
        ]
        .iter()
        .map(|member| MemberTeamDto::new(member, None))
        .collect();
        sort(&mut rows, &[order]);
        assert_eq!(usernames(&rows), expected);
    }

    #[rstest]
    #[case::first_page(0, Some(2), &["member4", "member3"])]
    #[case::paging1(1, Some(2), &["member3", "member2"])]
    #[case::last_partial_page(3, Some(2), &["member1"])]
    #[case::past_the_end(10, Some(2), &[])]
    #[case::unlimited(2, None, &["member2", "member1"])]
    fn test_paginate(
        team_fixture: TeamFixture,
        #[case] offset: usize,
        #[case] limit: Option<usize>,
        #[case] expected: &[&str],
    ) {
        let rows = search::execute(&team_fixture.members, &team_fixture.teams, &Filter::none());
        let request = PageRequest {
            offset,
            limit,
            sort: vec![Order::desc(Field::Username)],
        };
        let page = paginate(rows, &request);
        assert_eq!(page.total, 4);
        let actual: Vec<&str> = page
            .content
            .iter()
            .filter_map(|row| row.username.as_deref())
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_paginate_without_sort_keeps_order() {
        let rows: Vec<MemberTeamDto> = [Member::new("b", 1, None), Member::new("a", 2, None)]
            .iter()
            .map(|member| MemberTeamDto::new(member, None))
            .collect();
        let page = paginate(rows.clone(), &PageRequest::default());
        assert_eq!(page.content, rows);
        assert!(!page.is_empty());
    }
}
