#![deny(missing_docs)]

//! # Member Repository
//!
//! Conditional search over members and their teams, stored in Amazon DynamoDB.
//!
//! ## Overview
//!
//! A search condition holds up to four optional criteria: username, team name,
//! minimum age and maximum age. Absent or blank criteria are skipped, so an
//! empty condition returns every member. Matching members are left-joined with
//! their team and returned as flat rows.
//!
//! Two composition strategies are provided and always agree:
//! - [`search::Strategy::Accumulator`] starts from "always true" and folds in each
//!   active criterion through a [`predicate::filter::ClauseBuilder`]
//! - [`search::Strategy::ConjunctionList`] hands every optional clause to
//!   [`predicate::filter::Filter::all_of`], which drops the absent ones
//!
//! ## Quick Example
//!
//! ```no_run
//! # #![recursion_limit = "256"]
//! use aws_sdk_dynamodb::Client;
//! use member_repository::{config::Tables, repository::MemberRepository, search::MemberSearchCondition};
//!
//! # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
//! let repository = MemberRepository::new(client, Tables::from_env());
//! let condition = MemberSearchCondition {
//!     age_goe: Some(35),
//!     age_loe: Some(40),
//!     team_name: Some("teamB".to_string()),
//!     ..Default::default()
//! };
//! // age criteria are pushed into the scan filter, the team name is checked after the join
//! let rows = repository.search(&condition).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@predicate`] - Clauses, the predicate factory and filter composition
//! - [`mod@search`] - Search conditions, strategies, join, ordering and paging
//! - [`mod@repository`] - The DynamoDB-backed member repository
//! - [`mod@common`], [`mod@read`], [`mod@write`] - DynamoDB request plumbing

/// Expression rendering for keys, filters and attribute selections.
pub mod common;

/// Table configuration.
pub mod config;

/// Members, teams and their projections.
pub mod entity;

/// Crate-wide error type.
pub mod error;

/// Clauses over member rows and their composition into filters.
pub mod predicate;

/// Read operations for retrieving members and teams.
pub mod read;

/// The DynamoDB-backed member repository.
pub mod repository;

/// Conditional member search.
pub mod search;

/// Write operations for storing and modifying members and teams.
pub mod write;
