//! The member repository.
//!
//! Member items carry the username, age and team identifier, so every clause
//! over those attributes is pushed down into the scan filter expression. Team
//! attributes only exist after the join: the teams of the scanned members are
//! batch-read and the remaining clauses are evaluated on the joined rows.

use crate::{
    common::{key::Key, selection::Selection},
    config::Tables,
    entity::{Member, MemberDto, MemberTeamDto, Team},
    error::{Error, Result},
    predicate::{Clause, Field, filter::Filter},
    read::{batch_get_item::BatchGetItem, common::ReadArgs, get_item::GetItem, scan::Scan},
    search::{
        self, MemberSearchCondition, Strategy,
        aggregate::{self, AgeSummary, TeamAverage},
        page::{self, Page, PageRequest},
    },
    write::{
        batch_write_item::{BatchWriteItem, BatchWriteItemRequest},
        put_item::PutItem,
        update_item::{UpdateExpression, UpdateItem},
    },
};

use aws_sdk_dynamodb::{Client, operation::update_item::UpdateItemError, types};
use serde::Serialize;
use serde_dynamo::{from_item, from_items};
use uuid::Uuid;

/// Members and teams stored in DynamoDB, with conditional search.
///
/// ```rust,no_run
/// # #![recursion_limit = "256"]
/// use aws_sdk_dynamodb::Client;
/// use member_repository::{config::Tables, repository::MemberRepository, search::MemberSearchCondition};
///
/// # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
/// let repository = MemberRepository::new(client, Tables::from_env());
/// let condition = MemberSearchCondition {
///     team_name: Some("teamB".to_string()),
///     age_goe: Some(35),
///     ..Default::default()
/// };
/// for row in repository.search(&condition).await? {
///     println!("{row:?}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct MemberRepository {
    client: Client,
    tables: Tables,
}

impl MemberRepository {
    /// Create a repository over `tables`.
    pub fn new(client: Client, tables: Tables) -> Self {
        Self { client, tables }
    }

    /// The tables this repository reads and writes.
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Create or replace a member.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.save", skip(self), err)
    )]
    pub async fn save(&self, member: &Member) -> Result<()> {
        PutItem {
            item: member,
            table_name: self.tables.member.clone(),
        }
        .send(&self.client)
        .await?;
        Ok(())
    }

    /// Create or replace many members, returning how many were written.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "member_repository.save_all",
            skip_all,
            fields(members = members.len()),
            err
        )
    )]
    pub async fn save_all(&self, members: &[Member]) -> Result<usize> {
        let batch_write_item = BatchWriteItem {
            requests: members
                .iter()
                .map(BatchWriteItemRequest::PutItem)
                .collect(),
            table_name: self.tables.member.clone(),
        };
        self.write_batch(batch_write_item).await
    }

    /// Create or replace a team.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.save_team", skip(self), err)
    )]
    pub async fn save_team(&self, team: &Team) -> Result<()> {
        PutItem {
            item: team,
            table_name: self.tables.team.clone(),
        }
        .send(&self.client)
        .await?;
        Ok(())
    }

    /// Look up a member by identifier.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.find_by_id", skip(self), err)
    )]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>> {
        let output = get_by_id(id, &self.tables.member).send(&self.client).await?;
        Ok(output.item.map(from_item).transpose()?)
    }

    /// Look up a team by identifier.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.find_team_by_id", skip(self), err)
    )]
    pub async fn find_team_by_id(&self, id: Uuid) -> Result<Option<Team>> {
        let output = get_by_id(id, &self.tables.team).send(&self.client).await?;
        Ok(output.item.map(from_item).transpose()?)
    }

    /// Every stored member.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.find_all", skip(self), err)
    )]
    pub async fn find_all(&self) -> Result<Vec<Member>> {
        self.scan_members(Filter::none()).await
    }

    /// Members whose username equals `username` exactly.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.find_by_username", skip(self), err)
    )]
    pub async fn find_by_username(&self, username: &str) -> Result<Vec<Member>> {
        self.scan_members(Clause::eq(Field::Username, username).into())
            .await
    }

    /// Username and age of every stored member.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.find_all_dto", skip(self), err)
    )]
    pub async fn find_all_dto(&self) -> Result<Vec<MemberDto>> {
        let selection = [Field::Username, Field::Age]
            .into_iter()
            .map(Field::attribute)
            .collect();
        let output = member_scan(&self.tables, Filter::none(), Some(selection), None)
            .send(&self.client)
            .await?;
        Ok(from_items(output.items.unwrap_or_default())?)
    }

    /// Search with a filter accumulated one criterion at a time.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.search_by_builder", skip(self), err)
    )]
    pub async fn search_by_builder(
        &self,
        condition: &MemberSearchCondition,
    ) -> Result<Vec<MemberTeamDto>> {
        self.search_members(&Strategy::Accumulator.compose(condition))
            .await
    }

    /// Search with a filter built from the list of optional criteria.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.search", skip(self), err)
    )]
    pub async fn search(&self, condition: &MemberSearchCondition) -> Result<Vec<MemberTeamDto>> {
        self.search_members(&Strategy::ConjunctionList.compose(condition))
            .await
    }

    /// Search and return one page of the results.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.search_page", skip(self), err)
    )]
    pub async fn search_page(
        &self,
        condition: &MemberSearchCondition,
        request: &PageRequest,
    ) -> Result<Page<MemberTeamDto>> {
        let rows = self.search(condition).await?;
        Ok(page::paginate(rows, request))
    }

    /// Number of members matching `condition`.
    ///
    /// Conditions on member attributes only are counted by the store; any team
    /// criterion requires the join.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.count", skip(self), err)
    )]
    pub async fn count(&self, condition: &MemberSearchCondition) -> Result<usize> {
        let filter = Strategy::ConjunctionList.compose(condition);
        if !filter.is_member_only() {
            return Ok(self.search_members(&filter).await?.len());
        }
        let output = member_scan(&self.tables, filter, None, Some(types::Select::Count))
            .send(&self.client)
            .await?;
        Ok(usize::try_from(output.count).unwrap_or_default())
    }

    /// Members left-joined with their team, restricted to the rows matching `filter`.
    ///
    /// Rows are ordered by username, absent usernames last.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.search_members", skip(self), err)
    )]
    pub async fn search_members(&self, filter: &Filter) -> Result<Vec<MemberTeamDto>> {
        let (pushdown, residual) = filter.clone().partition();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            pushdown = pushdown.clauses().len(),
            residual = residual.clauses().len(),
            "partitioned filter"
        );
        let members = self.scan_members(pushdown).await?;
        let teams = self.find_teams_of(&members).await?;
        Ok(search::execute(&members, &teams, &residual))
    }

    /// Count, sum and average age of the members matching `filter`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.age_summary", skip(self), err)
    )]
    pub async fn age_summary(&self, filter: &Filter) -> Result<AgeSummary> {
        let rows = self.search_members(filter).await?;
        Ok(AgeSummary::of(&rows))
    }

    /// Average member age of every team with at least one member, ordered by team name.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.average_age_by_team", skip(self), err)
    )]
    pub async fn average_age_by_team(&self) -> Result<Vec<TeamAverage>> {
        let members = self.scan_members(Filter::none()).await?;
        let teams = self.find_teams_of(&members).await?;
        Ok(aggregate::average_age_by_team(&members, &teams))
    }

    /// Set the username of every member matching `filter`, returning how many were updated.
    ///
    /// Members deleted between the match and their update are skipped and not counted.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.bulk_update_username", skip(self), err)
    )]
    pub async fn bulk_update_username(&self, filter: &Filter, username: &str) -> Result<usize> {
        let update_expression =
            UpdateExpression::default().set(Field::Username.attribute(), username);
        self.update_matching(filter, update_expression).await
    }

    /// Add `delta` to the age of every member matching `filter`, returning how many were updated.
    ///
    /// Members deleted between the match and their update are skipped and not counted.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.bulk_add_age", skip(self), err)
    )]
    pub async fn bulk_add_age(&self, filter: &Filter, delta: i64) -> Result<usize> {
        let update_expression = UpdateExpression::default().add(Field::Age.attribute(), delta);
        self.update_matching(filter, update_expression).await
    }

    /// Delete every member matching `filter`, returning how many were deleted.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.bulk_delete", skip(self), err)
    )]
    pub async fn bulk_delete(&self, filter: &Filter) -> Result<usize> {
        let ids = self.matching_ids(filter).await?;
        if ids.is_empty() {
            return Ok(0);
        }
        let batch_write_item = BatchWriteItem::<Member> {
            requests: ids
                .into_iter()
                .map(|id| BatchWriteItemRequest::DeleteItem(Key::from(id)))
                .collect(),
            table_name: self.tables.member.clone(),
        };
        self.write_batch(batch_write_item).await
    }

    async fn scan_members(&self, filter: Filter) -> Result<Vec<Member>> {
        let output = member_scan(&self.tables, filter, None, None)
            .send(&self.client)
            .await?;
        Ok(from_items(output.items.unwrap_or_default())?)
    }

    async fn find_teams_of(&self, members: &[Member]) -> Result<Vec<Team>> {
        let batch_get_item = team_batch_get(&self.tables, members);
        if batch_get_item.keys.is_empty() {
            return Ok(Vec::new());
        }
        let table_name = batch_get_item.table_name.clone();
        let output = batch_get_item.send(&self.client).await?;
        let unprocessed = output
            .unprocessed_keys
            .as_ref()
            .and_then(|unprocessed| unprocessed.get(&table_name))
            .map_or(0, |keys_and_attributes| keys_and_attributes.keys.len());
        if unprocessed > 0 {
            return Err(Error::Unprocessed {
                table_name,
                count: unprocessed,
            });
        }
        let items = output
            .responses
            .and_then(|mut responses| responses.remove(&table_name))
            .unwrap_or_default();
        Ok(from_items(items)?)
    }

    async fn write_batch<T: Serialize>(
        &self,
        batch_write_item: BatchWriteItem<T>,
    ) -> Result<usize> {
        let table_name = batch_write_item.table_name.clone();
        let requested = batch_write_item.requests.len();
        let output = batch_write_item.send(&self.client).await?;
        let unprocessed = output
            .unprocessed_items
            .as_ref()
            .and_then(|unprocessed| unprocessed.get(&table_name))
            .map_or(0, Vec::len);
        if unprocessed > 0 {
            return Err(Error::Unprocessed {
                table_name,
                count: unprocessed,
            });
        }
        Ok(requested)
    }

    async fn matching_ids(&self, filter: &Filter) -> Result<Vec<Uuid>> {
        let rows = self.search_members(filter).await?;
        Ok(rows.into_iter().map(|row| row.member_id).collect())
    }

    async fn update_matching(
        &self,
        filter: &Filter,
        update_expression: UpdateExpression,
    ) -> Result<usize> {
        let ids = self.matching_ids(filter).await?;
        let mut updated = 0;
        for id in ids {
            let update_item = UpdateItem {
                key: Key::from(id),
                table_name: self.tables.member.clone(),
                update_expression: update_expression.clone(),
            };
            match update_item.send(&self.client).await {
                Ok(_) => updated += 1,
                // deleted since it was matched
                Err(err)
                    if err
                        .as_service_error()
                        .is_some_and(UpdateItemError::is_conditional_check_failed_exception) =>
                {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(%id, "member gone before update");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(updated)
    }
}

fn get_by_id(id: Uuid, table_name: &str) -> GetItem {
    GetItem {
        key: Key::from(id),
        consistent_read: None,
        selection: None,
        table_name: table_name.to_string(),
    }
}

fn member_scan(
    tables: &Tables,
    filter: Filter,
    selection: Option<Selection>,
    select: Option<types::Select>,
) -> Scan {
    Scan {
        read_args: ReadArgs {
            filter,
            selection,
            table_name: tables.member.clone(),
            ..Default::default()
        },
        select,
    }
}

fn team_batch_get(tables: &Tables, members: &[Member]) -> BatchGetItem {
    BatchGetItem {
        keys: members
            .iter()
            .filter_map(|member| member.team_id)
            .map(Key::from)
            .collect(),
        table_name: tables.team.clone(),
        ..Default::default()
    }
}
