//! Runtime condition tree and query compilation.
//!
//! Typed [`Column`] handles build leaf comparisons; [`Condition::and`] /
//! [`Condition::or`] compose them into a tree. The tree is built fresh per
//! query and discarded after [`Condition::compile`] turns it into a WHERE
//! fragment plus positional arguments.

use std::fmt::Write as _;
use std::marker::PhantomData;

use crate::value::{SqlValue, ToSqlValue};

/// A typed handle to one table column, used to build conditions.
///
/// Entities expose these as `const`s on their table object; the type
/// parameter keeps comparisons against the wrong host type from compiling.
#[derive(Debug, Clone, Copy)]
pub struct Column<T> {
    name: &'static str,
    _marker: PhantomData<T>,
}

impl<T> Column<T> {
    /// Creates a column handle for the given SQL column name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Returns the rendered SQL column name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: ToSqlValue> Column<T> {
    /// `column = value`.
    #[must_use]
    pub fn eq(&self, value: impl Into<T>) -> Condition {
        self.compare(CompareOp::Eq, value)
    }

    /// `column <> value`.
    #[must_use]
    pub fn ne(&self, value: impl Into<T>) -> Condition {
        self.compare(CompareOp::Ne, value)
    }

    /// `column > value`.
    #[must_use]
    pub fn gt(&self, value: impl Into<T>) -> Condition {
        self.compare(CompareOp::Gt, value)
    }

    /// `column < value`.
    #[must_use]
    pub fn lt(&self, value: impl Into<T>) -> Condition {
        self.compare(CompareOp::Lt, value)
    }

    /// `column >= value`.
    #[must_use]
    pub fn ge(&self, value: impl Into<T>) -> Condition {
        self.compare(CompareOp::Ge, value)
    }

    /// `column <= value`.
    #[must_use]
    pub fn le(&self, value: impl Into<T>) -> Condition {
        self.compare(CompareOp::Le, value)
    }

    fn compare(&self, op: CompareOp, value: impl Into<T>) -> Condition {
        Condition::Compare {
            column: self.name,
            op,
            value: value.into().to_sql_value(),
        }
    }
}

impl Column<String> {
    /// `column LIKE pattern`.
    #[must_use]
    pub fn like(&self, pattern: impl Into<String>) -> Condition {
        Condition::Compare {
            column: self.name,
            op: CompareOp::Like,
            value: SqlValue::Text(pattern.into()),
        }
    }
}

/// Comparison operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `LIKE`
    Like,
}

impl CompareOp {
    /// Returns the SQL spelling of the operator.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Like => "LIKE",
        }
    }
}

/// Boolean connective of a composite condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    /// Both children must hold.
    And,
    /// Either child must hold.
    Or,
}

impl Logic {
    /// Returns the SQL spelling of the connective.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A boolean expression over column comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Leaf: `column op value`, value always parameter-bound.
    Compare {
        /// Rendered column name.
        column: &'static str,
        /// Comparison operator.
        op: CompareOp,
        /// Bound value.
        value: SqlValue,
    },
    /// Composite: two subtrees joined by AND/OR.
    Composite {
        /// Left subtree.
        left: Box<Condition>,
        /// Right subtree.
        right: Box<Condition>,
        /// Connective.
        logic: Logic,
    },
}

impl Condition {
    /// Joins two conditions with AND.
    #[must_use]
    pub fn and(self, other: Condition) -> Condition {
        Condition::Composite {
            left: Box::new(self),
            right: Box::new(other),
            logic: Logic::And,
        }
    }

    /// Joins two conditions with OR.
    #[must_use]
    pub fn or(self, other: Condition) -> Condition {
        Condition::Composite {
            left: Box::new(self),
            right: Box::new(other),
            logic: Logic::Or,
        }
    }

    /// Serializes the tree depth-first into a WHERE fragment plus the
    /// positional argument list, collected in left-to-right leaf order.
    ///
    /// Composite children are parenthesized, so nesting is unambiguous
    /// regardless of depth:
    /// `a.eq(1).and(b.gt(2).or(b.lt(0)))` compiles to
    /// `a = ? AND (b > ? OR b < ?)` with arguments `[1, 2, 0]`.
    #[must_use]
    pub fn compile(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::new();
        let mut args = Vec::new();
        self.write(&mut sql, &mut args);
        (sql, args)
    }

    fn write(&self, sql: &mut String, args: &mut Vec<SqlValue>) {
        match self {
            Condition::Compare { column, op, value } => {
                let _ = write!(sql, "{column} {} ?", op.as_sql());
                args.push(value.clone());
            }
            Condition::Composite { left, right, logic } => {
                left.write_child(sql, args);
                let _ = write!(sql, " {} ", logic.as_sql());
                right.write_child(sql, args);
            }
        }
    }

    fn write_child(&self, sql: &mut String, args: &mut Vec<SqlValue>) {
        if matches!(self, Condition::Composite { .. }) {
            sql.push('(');
            self.write(sql, args);
            sql.push(')');
        } else {
            self.write(sql, args);
        }
    }
}

/// A compiled query, handed from the builder to the paged/filtered
/// templates. Transient: one per `find()`/`count()` call.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    /// Compiled WHERE fragment; empty when the query has no conditions.
    pub where_clause: String,
    /// Positional arguments, in left-to-right leaf order.
    pub args: Vec<SqlValue>,
    /// Rendered ORDER BY clause, if any.
    pub order_by: Option<String>,
    /// Row limit, if any.
    pub limit: Option<i64>,
    /// Row offset, if any.
    pub offset: Option<i64>,
}
