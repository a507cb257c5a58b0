//! Shared DTOs for the identity provider and document backend boundary.
//!
//! DESIGN
//! ======
//! `QueryDescription` is the concrete form of a backend query: a collection
//! path plus filter predicates. Backends treat it as opaque input; the binder
//! never compares descriptions structurally, only the memoized identities that
//! wrap them.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Stable provider-assigned user id.
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserIdentity {
    /// Identity with only an id, as produced by anonymous or test providers.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), email: None, display_name: None }
    }
}

/// Comparison operator for a single field predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    ArrayContains,
}

impl FilterOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::In => "in",
            Self::ArrayContains => "array-contains",
        }
    }
}

/// `field <op> value` predicate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: serde_json::Value,
}

/// Sort direction for [`OrderBy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

/// A live query over one backend collection.
///
/// ```
/// use dashgate::net::types::QueryDescription;
///
/// let query = QueryDescription::collection("users/u1/jobs").where_eq("status", "Complete");
/// assert_eq!(query.to_string(), r#"users/u1/jobs where status == "Complete""#);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryDescription {
    /// Slash-separated collection path, e.g. `users/{uid}/jobs`.
    pub collection: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl QueryDescription {
    /// Start a query over every document in `path`.
    pub fn collection(path: impl Into<String>) -> Self {
        Self { collection: path.into(), filters: Vec::new(), order_by: None, limit: None }
    }

    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<serde_json::Value>) -> Self {
        self.filters.push(Filter { field: field.into(), op, value: value.into() });
        self
    }

    #[must_use]
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy { field: field.into(), direction });
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl fmt::Display for QueryDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.collection)?;
        for (i, filter) in self.filters.iter().enumerate() {
            let joiner = if i == 0 { "where" } else { "and" };
            write!(f, " {joiner} {} {} {}", filter.field, filter.op.as_str(), filter.value)?;
        }
        if let Some(order) = &self.order_by {
            let dir = match order.direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            write!(f, " order by {} {dir}", order.field)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit {limit}")?;
        }
        Ok(())
    }
}
