//! Store queries: equality and range filters, ordering, and limits over one
//! collection or every collection sharing a name.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use super::{CollectionPath, DocPath};

/// Which documents a query scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// Direct children of one collection.
    Collection(CollectionPath),
    /// Every collection with this name, anywhere in the tree.
    CollectionGroup(String),
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `==`
    Eq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

/// One field filter. Dotted names reach into nested objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field name.
    pub field: String,
    /// Operator.
    pub op: FilterOp,
    /// Right-hand side.
    pub value: Value,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// A store query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Scanned documents.
    pub scope: QueryScope,
    /// All filters must match.
    pub filters: Vec<Filter>,
    /// Optional ordering.
    pub order_by: Option<(String, Direction)>,
    /// Optional maximum number of results.
    pub limit: Option<usize>,
}

impl Query {
    /// Query over one collection.
    #[must_use]
    pub fn collection(path: CollectionPath) -> Self {
        Self {
            scope: QueryScope::Collection(path),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// Query over every collection named `name`.
    #[must_use]
    pub fn collection_group(name: impl Into<String>) -> Self {
        Self {
            scope: QueryScope::CollectionGroup(name.into()),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// Adds a filter.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if a document at `path` is inside the scope.
    #[must_use]
    pub fn in_scope(&self, path: &DocPath) -> bool {
        match &self.scope {
            QueryScope::Collection(collection) => path.parent() == *collection,
            QueryScope::CollectionGroup(name) => path.parent().name() == name,
        }
    }

    /// Returns true if the body passes every filter.
    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        self.filters.iter().all(|f| {
            field_value(data, &f.field).is_some_and(|v| {
                let ordering = compare_values(v, &f.value);
                match f.op {
                    FilterOp::Eq => ordering == Some(Ordering::Equal),
                    FilterOp::Lt => ordering == Some(Ordering::Less),
                    FilterOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                    FilterOp::Gt => ordering == Some(Ordering::Greater),
                    FilterOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                }
            })
        })
    }
}

/// Looks up a possibly dotted field.
#[must_use]
pub fn field_value<'a>(data: &'a Value, field: &str) -> Option<&'a Value> {
    field.split('.').try_fold(data, |current, key| current.get(key))
}

/// Orders two JSON values of the same kind.
///
/// Strings compare lexicographically (ISO dates sort correctly), numbers
/// compare as decimals, booleans compare directly. Mixed kinds and
/// containers are unordered.
#[must_use]
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => {
            let a = Decimal::from_str(&a.to_string()).ok()?;
            let b = Decimal::from_str(&b.to_string()).ok()?;
            Some(a.cmp(&b))
        }
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
