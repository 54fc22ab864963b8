//! Chainable query builder.
//!
//! Conditions accumulate into a single root tree (`and_where` ANDs into it,
//! `or_where` ORs into it); ordering and paging are validated immediately at
//! the call site, before any SQL exists. The terminals compile a
//! [`QuerySpec`] and hand it to the DAO's paged/filtered templates — the
//! builder never talks to the driver directly.

use embersql_core::{Column, Condition, QueryError, QuerySpec};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dao::Dao;
use crate::entity::Entity;
use crate::error::Result;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier pattern"));

/// A query under construction against one table.
#[must_use]
pub struct QueryBuilder<'a, E: Entity> {
    dao: &'a Dao<E>,
    root: Option<Condition>,
    order_by: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl<E: Entity> std::fmt::Debug for QueryBuilder<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("root", &self.root)
            .field("order_by", &self.order_by)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, E: Entity> QueryBuilder<'a, E> {
    pub(crate) fn new(dao: &'a Dao<E>) -> Self {
        Self {
            dao,
            root: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// ANDs a condition into the query (it becomes the root if this is the
    /// first one).
    pub fn and_where(mut self, condition: Condition) -> Self {
        self.root = Some(match self.root.take() {
            Some(root) => root.and(condition),
            None => condition,
        });
        self
    }

    /// ORs a condition into the query (it becomes the root if this is the
    /// first one).
    pub fn or_where(mut self, condition: Condition) -> Self {
        self.root = Some(match self.root.take() {
            Some(root) => root.or(condition),
            None => condition,
        });
        self
    }

    /// Appends an ordering. Order-by targets cannot be parameter-bound, so
    /// the rendered column name must be a plain identifier; anything else
    /// is rejected here, before any SQL is built.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidOrderByColumn`] for non-identifier names.
    pub fn order_by<T>(mut self, column: Column<T>, ascending: bool) -> std::result::Result<Self, QueryError> {
        let name = column.name();
        if !IDENTIFIER.is_match(name) {
            return Err(QueryError::InvalidOrderByColumn {
                name: String::from(name),
            });
        }
        let direction = if ascending { "ASC" } else { "DESC" };
        self.order_by.push(format!("{name} {direction}"));
        Ok(self)
    }

    /// Caps the number of returned rows.
    ///
    /// # Errors
    ///
    /// [`QueryError::NegativeLimit`] for negative values.
    pub fn limit(mut self, limit: i64) -> std::result::Result<Self, QueryError> {
        if limit < 0 {
            return Err(QueryError::NegativeLimit { value: limit });
        }
        self.limit = Some(limit);
        Ok(self)
    }

    /// Skips leading rows.
    ///
    /// # Errors
    ///
    /// [`QueryError::NegativeOffset`] for negative values.
    pub fn offset(mut self, offset: i64) -> std::result::Result<Self, QueryError> {
        if offset < 0 {
            return Err(QueryError::NegativeOffset { value: offset });
        }
        self.offset = Some(offset);
        Ok(self)
    }

    /// Compiles and runs the query, returning the matching rows.
    pub fn find(self) -> Result<Vec<E>> {
        let dao = self.dao;
        let spec = self.into_spec();
        dao.select_by_page(
            &spec.where_clause,
            &spec.args,
            spec.order_by.as_deref(),
            spec.limit,
            spec.offset,
        )
    }

    /// Compiles and runs the query as a count (ordering and paging are
    /// ignored, as only the WHERE fragment applies).
    pub fn count(self) -> Result<i64> {
        let dao = self.dao;
        let spec = self.into_spec();
        dao.count_where(&spec.where_clause, &spec.args)
    }

    fn into_spec(self) -> QuerySpec {
        let (where_clause, args) = match &self.root {
            Some(root) => root.compile(),
            None => (String::new(), Vec::new()),
        };
        QuerySpec {
            where_clause,
            args,
            order_by: if self.order_by.is_empty() {
                None
            } else {
                Some(self.order_by.join(", "))
            },
            limit: self.limit,
            offset: self.offset,
        }
    }
}
