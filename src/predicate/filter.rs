use crate::predicate::{Clause, Record};

/// A conjunction of active clauses. An empty filter matches everything.
///
/// Filters are built either with a [`ClauseBuilder`] (accumulate clauses one at a
/// time) or with [`Filter::all_of`] (hand over every optional clause at once).
/// Both flatten nested conjunctions and keep insertion order, so the same
/// clauses added in the same order always produce equal filters.
///
/// ```rust
/// use member_repository::predicate::{self, filter::{ClauseBuilder, Filter}};
///
/// let mut builder = ClauseBuilder::new();
/// builder.and(predicate::username_eq(Some("member1")));
/// builder.and(predicate::age_goe(None));
///
/// let all_of = Filter::all_of([predicate::username_eq(Some("member1")), predicate::age_goe(None)]);
/// assert_eq!(builder.build(), all_of);
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// A filter that matches every record.
    pub fn none() -> Self {
        Self::default()
    }

    /// Conjoin every present clause, dropping absent ones before combining.
    pub fn all_of(clauses: impl IntoIterator<Item = Option<Clause>>) -> Self {
        let clauses = clauses
            .into_iter()
            .flatten()
            .flat_map(Clause::into_conjuncts)
            .collect();
        Self { clauses }
    }

    /// The active conjuncts, in insertion order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether this filter lets every record through.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether every conjunct holds for `record`.
    pub fn matches(&self, record: &impl Record) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }

    /// Whether every conjunct can be evaluated on the member item alone.
    pub fn is_member_only(&self) -> bool {
        self.clauses.iter().all(Clause::is_member_only)
    }

    /// Split into the conjuncts evaluable on the member item and the rest.
    ///
    /// The conjunction of both halves is equivalent to `self`.
    pub fn partition(self) -> (Self, Self) {
        let (member, joined): (Vec<Clause>, Vec<Clause>) = self
            .clauses
            .into_iter()
            .partition(Clause::is_member_only);
        (Self { clauses: member }, Self { clauses: joined })
    }

    /// Collapse into a single clause, or `None` for the empty filter.
    pub fn into_clause(self) -> Option<Clause> {
        let mut clauses = self.clauses;
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Clause::And(clauses)),
        }
    }
}

impl From<Clause> for Filter {
    fn from(clause: Clause) -> Self {
        Self::all_of([Some(clause)])
    }
}

impl From<Option<Clause>> for Filter {
    fn from(clause: Option<Clause>) -> Self {
        Self::all_of([clause])
    }
}

/// Mutable accumulator of clauses, starting from "always true".
///
/// ```rust
/// use member_repository::predicate::{self, filter::ClauseBuilder};
///
/// let mut builder = ClauseBuilder::new();
/// builder.and(predicate::age_goe(Some(20))).and(predicate::age_loe(Some(30)));
/// assert_eq!(builder.build().clauses().len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClauseBuilder {
    clause: Option<Clause>,
}

impl ClauseBuilder {
    /// An empty builder, equivalent to an always-true filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder seeded with an initial clause.
    pub fn with(clause: Clause) -> Self {
        Self {
            clause: Some(clause),
        }
    }

    /// Conjoin `clause` into the accumulated value; absent clauses are skipped.
    pub fn and(&mut self, clause: impl Into<Option<Clause>>) -> &mut Self {
        self.clause = super::and(self.clause.take(), clause.into());
        self
    }

    /// Whether any clause has been accumulated.
    pub fn has_value(&self) -> bool {
        self.clause.is_some()
    }

    /// The accumulated clause, if any.
    pub fn value(&self) -> Option<&Clause> {
        self.clause.as_ref()
    }

    /// Finish accumulation.
    pub fn build(self) -> Filter {
        self.clause.into()
    }
}
