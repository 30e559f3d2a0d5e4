//! List query translation.
//!
//! Turns raw query-string pairs (`rating[gte]=4&sort=-rating,name&page=2`)
//! into a typed filter, sort order, projection and page request. Operators
//! come from a closed set and are parsed structurally from `field[op]` keys,
//! so a field that happens to be called `gt` is just a field.

use std::cmp::Ordering;

use configs::QueryConfig;
use models::service_provider::{Field, FieldValue, Model};
use sea_orm::{ColumnTrait, Condition};
use serde_json::Value;
use tracing::debug;

use crate::errors::ServiceError;
use crate::pagination::PageRequest;

/// Control keys that never become filter conditions.
pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

const DEFAULT_SORT: &str = "-rating";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl CompareOp {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(CompareOp::Gt),
            "gte" => Some(CompareOp::Gte),
            "lt" => Some(CompareOp::Lt),
            "lte" => Some(CompareOp::Lte),
            "in" => Some(CompareOp::In),
            _ => None,
        }
    }
}

/// One filter condition as it appeared in the query string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCondition {
    pub field: String,
    pub op: CompareOp,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawSortKey {
    pub field: String,
    pub descending: bool,
}

/// Query-string level translation result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListParams {
    pub filter: Vec<RawCondition>,
    pub select: Option<Vec<String>>,
    pub sort: Vec<RawSortKey>,
    pub page: PageRequest,
}

impl ListParams {
    /// Split reserved keys from filter keys. Only the first occurrence of a
    /// reserved key counts; filter keys may repeat and are AND-ed.
    pub fn from_pairs<I, K, V>(pairs: I, cfg: &QueryConfig) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Vec::new();
        let (mut select, mut sort, mut page, mut limit): (Option<String>, Option<String>, Option<String>, Option<String>) =
            (None, None, None, None);

        for (k, v) in pairs {
            let (key, value) = (k.as_ref(), v.as_ref());
            let slot = match key {
                "select" => &mut select,
                "sort" => &mut sort,
                "page" => &mut page,
                "limit" => &mut limit,
                _ => {
                    match split_key(key) {
                        Some((field, op)) => filter.push(RawCondition {
                            field: field.to_string(),
                            op,
                            value: value.to_string(),
                        }),
                        None => debug!(key, "ignoring filter key with unsupported operator"),
                    }
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }

        let select = select
            .map(|s| split_list(&s))
            .filter(|fields| !fields.is_empty());
        let sort = sort
            .map(|s| parse_sort(&s))
            .filter(|keys| !keys.is_empty())
            .unwrap_or_else(|| parse_sort(DEFAULT_SORT));
        let page = PageRequest::from_raw(page.as_deref(), limit.as_deref(), cfg);

        Self { filter, select, sort, page }
    }

    /// Resolve field names against the service provider schema and cast
    /// filter values. Unknown fields are dropped; uncastable values are a
    /// validation error.
    pub fn resolve(&self) -> Result<ProviderQuery, ServiceError> {
        let mut conditions = Vec::with_capacity(self.filter.len());
        for raw in &self.filter {
            let Some(field) = Field::from_name(&raw.field) else {
                debug!(field = %raw.field, "ignoring unknown filter field");
                continue;
            };
            let cast = |s: &str| field.parse_value(s).map_err(ServiceError::from);
            let predicate = match raw.op {
                CompareOp::Eq => Predicate::Eq(cast(&raw.value)?),
                CompareOp::Gt => Predicate::Gt(cast(&raw.value)?),
                CompareOp::Gte => Predicate::Gte(cast(&raw.value)?),
                CompareOp::Lt => Predicate::Lt(cast(&raw.value)?),
                CompareOp::Lte => Predicate::Lte(cast(&raw.value)?),
                CompareOp::In => Predicate::In(
                    split_list(&raw.value).iter().map(|s| cast(s)).collect::<Result<Vec<_>, _>>()?,
                ),
            };
            conditions.push(FieldCondition { field, predicate });
        }

        let sort = self
            .sort
            .iter()
            .filter_map(|k| match Field::from_name(&k.field) {
                Some(field) => Some(SortKey { field, descending: k.descending }),
                None => {
                    debug!(field = %k.field, "ignoring unknown sort field");
                    None
                }
            })
            .collect();

        let projection = self.select.as_ref().map(|names| {
            let fields = names
                .iter()
                .filter_map(|n| {
                    let f = Field::from_name(n);
                    if f.is_none() {
                        debug!(field = %n, "ignoring unknown select field");
                    }
                    f
                })
                .collect();
            Projection::new(fields)
        });

        Ok(ProviderQuery { filter: Filter(conditions), sort, projection, page: self.page })
    }
}

/// `field` or `field[op]`. `None` for an unknown operator or malformed key.
fn split_key(key: &str) -> Option<(&str, CompareOp)> {
    match key.find('[') {
        Some(open) => {
            let field = &key[..open];
            let token = key[open + 1..].strip_suffix(']')?;
            if field.is_empty() {
                return None;
            }
            CompareOp::from_token(token).map(|op| (field, op))
        }
        None if key.contains(']') || key.is_empty() => None,
        None => Some((key, CompareOp::Eq)),
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect()
}

fn parse_sort(s: &str) -> Vec<RawSortKey> {
    split_list(s)
        .into_iter()
        .filter_map(|token| match token.strip_prefix('-') {
            Some("") => None,
            Some(field) => Some(RawSortKey { field: field.to_string(), descending: true }),
            None => Some(RawSortKey { field: token, descending: false }),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Typed query
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Eq(FieldValue),
    Gt(FieldValue),
    Gte(FieldValue),
    Lt(FieldValue),
    Lte(FieldValue),
    In(Vec<FieldValue>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldCondition {
    pub field: Field,
    pub predicate: Predicate,
}

/// Conjunction of field conditions; empty matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter(pub Vec<FieldCondition>);

impl Filter {
    pub fn conditions(&self) -> &[FieldCondition] {
        &self.0
    }

    /// Evaluate against a record in memory.
    pub fn matches(&self, m: &Model) -> bool {
        self.0.iter().all(|c| {
            let actual = c.field.value_of(m);
            let cmp = |v: &FieldValue| actual.compare(v);
            match &c.predicate {
                Predicate::Eq(v) => cmp(v) == Some(Ordering::Equal),
                Predicate::Gt(v) => cmp(v) == Some(Ordering::Greater),
                Predicate::Gte(v) => matches!(cmp(v), Some(Ordering::Greater | Ordering::Equal)),
                Predicate::Lt(v) => cmp(v) == Some(Ordering::Less),
                Predicate::Lte(v) => matches!(cmp(v), Some(Ordering::Less | Ordering::Equal)),
                Predicate::In(vs) => vs.iter().any(|v| cmp(v) == Some(Ordering::Equal)),
            }
        })
    }

    /// Store-side condition for SeaORM selects.
    pub fn to_condition(&self) -> Condition {
        self.0.iter().fold(Condition::all(), |cond, c| {
            let col = c.field.column();
            let expr = match c.predicate.clone() {
                Predicate::Eq(v) => col.eq(v),
                Predicate::Gt(v) => col.gt(v),
                Predicate::Gte(v) => col.gte(v),
                Predicate::Lt(v) => col.lt(v),
                Predicate::Lte(v) => col.lte(v),
                Predicate::In(vs) => col.is_in(vs.into_iter().map(sea_orm::Value::from)),
            };
            cond.add(expr)
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: Field,
    pub descending: bool,
}

/// Order two records by a list of sort keys. Nulls sort before values.
pub fn compare_by(keys: &[SortKey], a: &Model, b: &Model) -> Ordering {
    for key in keys {
        let (va, vb) = (key.field.value_of(a), key.field.value_of(b));
        let ord = match (&va, &vb) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Less,
            (_, FieldValue::Null) => Ordering::Greater,
            _ => va.compare(&vb).unwrap_or(Ordering::Equal),
        };
        let ord = if key.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Field projection; `id` is always kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection(Vec<Field>);

impl Projection {
    pub fn new(mut fields: Vec<Field>) -> Self {
        if !fields.contains(&Field::Id) {
            fields.insert(0, Field::Id);
        }
        Self(fields)
    }

    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    pub fn apply(&self, m: &Model) -> Result<Value, ServiceError> {
        let mut value = serde_json::to_value(m).map_err(|e| ServiceError::Db(e.to_string()))?;
        if let Value::Object(map) = &mut value {
            map.retain(|k, _| self.0.iter().any(|f| f.json_name() == k));
        }
        Ok(value)
    }
}

/// Fully resolved list query.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderQuery {
    pub filter: Filter,
    pub sort: Vec<SortKey>,
    pub projection: Option<Projection>,
    pub page: PageRequest,
}
