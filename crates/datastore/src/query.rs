use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::{DatastoreError, Entity, Key, Result, StoredEntity};

/// Comparison operator of a property filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterOp {
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    NotEqual,
    /// Matches when the property equals any element of a list value.
    In,
}

impl FilterOp {
    /// Returns true for range comparisons, which constrain index ordering.
    pub fn is_inequality(&self) -> bool {
        !matches!(self, FilterOp::Equal | FilterOp::In)
    }

    /// Returns the conventional symbol for this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOp::Equal => "=",
            FilterOp::GreaterThan => ">",
            FilterOp::GreaterThanOrEqual => ">=",
            FilterOp::LessThan => "<",
            FilterOp::LessThanOrEqual => "<=",
            FilterOp::NotEqual => "!=",
            FilterOp::In => "IN",
        }
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single `property <op> value` condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyFilter {
    pub property: String,
    pub op: FilterOp,
    pub value: Value,
}

impl PropertyFilter {
    /// Creates a filter.
    pub fn new(property: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            op,
            value: value.into(),
        }
    }

    /// Evaluates the filter against an entity.
    ///
    /// Entities lacking the property never match. A list-valued property
    /// matches when any of its elements satisfies the comparison.
    pub fn matches(&self, entity: &StoredEntity) -> bool {
        match entity.property(&self.property) {
            None | Some(Value::Null) => false,
            Some(Value::Array(elements)) => elements.iter().any(|e| self.matches_scalar(e)),
            Some(scalar) => self.matches_scalar(scalar),
        }
    }

    fn matches_scalar(&self, actual: &Value) -> bool {
        let ordering = compare_values(actual, &self.value);
        match self.op {
            FilterOp::Equal => ordering == Some(Ordering::Equal),
            FilterOp::NotEqual => ordering != Some(Ordering::Equal),
            FilterOp::GreaterThan => ordering == Some(Ordering::Greater),
            FilterOp::GreaterThanOrEqual => {
                matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
            }
            FilterOp::LessThan => ordering == Some(Ordering::Less),
            FilterOp::LessThanOrEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            FilterOp::In => match &self.value {
                Value::Array(candidates) => candidates
                    .iter()
                    .any(|c| compare_values(actual, c) == Some(Ordering::Equal)),
                single => ordering == Some(Ordering::Equal) && !single.is_null(),
            },
        }
    }
}

/// Sort direction of a query order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One sort key of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortOrder {
    pub property: String,
    pub direction: SortDirection,
}

/// Builder for entity queries.
///
/// Filters are combined with logical AND. When no order is given, results
/// come back in key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityQuery {
    /// The entity kind to scan.
    pub kind: String,

    /// Restricts results to descendants of this key.
    pub ancestor: Option<Key>,

    /// Conditions every result must satisfy.
    pub filters: Vec<PropertyFilter>,

    /// Sort keys, most significant first.
    pub orders: Vec<SortOrder>,

    /// Maximum number of entities to return.
    pub limit: Option<usize>,
}

impl EntityQuery {
    /// Creates a query scanning every entity of a kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ancestor: None,
            filters: Vec::new(),
            orders: Vec::new(),
            limit: None,
        }
    }

    /// Creates a query over an entity type's kind.
    pub fn for_entity<T: Entity>() -> Self {
        Self::new(T::KIND)
    }

    /// Restricts the query to descendants of `ancestor`.
    pub fn ancestor(mut self, ancestor: Key) -> Self {
        self.ancestor = Some(ancestor);
        self
    }

    /// Adds a filter.
    pub fn filter(mut self, property: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(PropertyFilter::new(property, op, value));
        self
    }

    /// Adds an already-built filter.
    pub fn with_filter(mut self, filter: PropertyFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds an ascending sort key.
    pub fn order(mut self, property: impl Into<String>) -> Self {
        self.orders.push(SortOrder {
            property: property.into(),
            direction: SortDirection::Ascending,
        });
        self
    }

    /// Adds a descending sort key.
    pub fn order_desc(mut self, property: impl Into<String>) -> Self {
        self.orders.push(SortOrder {
            property: property.into(),
            direction: SortDirection::Descending,
        });
        self
    }

    /// Limits the number of entities returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the single property carrying range comparisons, if any.
    pub fn inequality_property(&self) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.op.is_inequality())
            .map(|f| f.property.as_str())
    }

    /// Checks the structural constraints of range-indexed execution:
    /// range comparisons touch at most one property, and when the query is
    /// ordered that property must be the first sort key.
    pub fn validate(&self) -> Result<()> {
        let Some(inequality) = self.inequality_property() else {
            return Ok(());
        };

        if let Some(other) = self
            .filters
            .iter()
            .find(|f| f.op.is_inequality() && f.property != inequality)
        {
            return Err(DatastoreError::InvalidQuery(format!(
                "inequality filters on more than one property: {inequality}, {}",
                other.property
            )));
        }

        if let Some(first) = self.orders.first()
            && first.property != inequality
        {
            return Err(DatastoreError::InvalidQuery(format!(
                "first sort order must be the inequality property {inequality}, got {}",
                first.property
            )));
        }

        Ok(())
    }

    /// Returns true if the entity satisfies kind, ancestor and every filter.
    pub fn matches(&self, entity: &StoredEntity) -> bool {
        if entity.key.kind() != self.kind {
            return false;
        }
        if let Some(ref ancestor) = self.ancestor
            && !entity.key.has_ancestor(ancestor)
        {
            return false;
        }
        self.filters.iter().all(|f| f.matches(entity))
    }

    /// Compares two entities by this query's sort keys, falling back to key order.
    pub fn compare(&self, a: &StoredEntity, b: &StoredEntity) -> Ordering {
        for order in &self.orders {
            let left = sort_value(a, order);
            let right = sort_value(b, order);
            let ordering = match order.direction {
                SortDirection::Ascending => total_cmp(left, right),
                SortDirection::Descending => total_cmp(right, left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.key.cmp(&b.key)
    }
}

/// Compares two scalar values of the same type. Mixed types don't compare.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Array(_), _) | (_, Value::Array(_)) | (Value::Object(_), _) | (_, Value::Object(_)) => {
            (a == b).then_some(Ordering::Equal)
        }
        _ => None,
    }
}

// Lists sort by their smallest element ascending and largest descending.
fn sort_value<'a>(entity: &'a StoredEntity, order: &SortOrder) -> Option<&'a Value> {
    match entity.property(&order.property)? {
        Value::Array(elements) => {
            let mut iter = elements.iter();
            let first = iter.next()?;
            Some(iter.fold(first, |best, e| {
                let ordering = total_cmp(Some(e), Some(best));
                match (order.direction, ordering) {
                    (SortDirection::Ascending, Ordering::Less)
                    | (SortDirection::Descending, Ordering::Greater) => e,
                    _ => best,
                }
            }))
        }
        value => Some(value),
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

// Missing values sort first; different types sort by type rank.
fn total_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Version;
    use serde_json::json;

    fn entity(id: i64, properties: Value) -> StoredEntity {
        StoredEntity {
            key: Key::with_id("Conference", id),
            version: Version::first(),
            properties,
        }
    }

    #[test]
    fn equality_on_list_matches_any_element() {
        let conf = entity(1, json!({"topics": ["Rust", "Web"]}));
        assert!(PropertyFilter::new("topics", FilterOp::Equal, "Web").matches(&conf));
        assert!(!PropertyFilter::new("topics", FilterOp::Equal, "Go").matches(&conf));
    }

    #[test]
    fn in_matches_any_candidate() {
        let conf = entity(1, json!({"topics": ["Rust"]}));
        assert!(PropertyFilter::new("topics", FilterOp::In, json!(["Go", "Rust"])).matches(&conf));
        assert!(!PropertyFilter::new("topics", FilterOp::In, json!([])).matches(&conf));
    }

    #[test]
    fn missing_property_never_matches() {
        let conf = entity(1, json!({"name": "x"}));
        assert!(!PropertyFilter::new("city", FilterOp::NotEqual, "Paris").matches(&conf));
    }

    #[test]
    fn range_comparisons_on_numbers() {
        let conf = entity(1, json!({"month": 6}));
        assert!(PropertyFilter::new("month", FilterOp::GreaterThan, 5).matches(&conf));
        assert!(PropertyFilter::new("month", FilterOp::LessThanOrEqual, 6).matches(&conf));
        assert!(!PropertyFilter::new("month", FilterOp::LessThan, 6).matches(&conf));
        assert!(!PropertyFilter::new("month", FilterOp::GreaterThan, "5").matches(&conf));
    }

    #[test]
    fn validate_rejects_two_inequality_properties() {
        let query = EntityQuery::new("Conference")
            .filter("month", FilterOp::GreaterThan, 3)
            .filter("maxAttendees", FilterOp::LessThan, 10);
        assert!(matches!(
            query.validate(),
            Err(DatastoreError::InvalidQuery(_))
        ));
    }

    #[test]
    fn validate_requires_inequality_property_first_in_order() {
        let query = EntityQuery::new("Conference")
            .filter("month", FilterOp::GreaterThan, 3)
            .order("name");
        assert!(query.validate().is_err());

        let query = EntityQuery::new("Conference")
            .filter("month", FilterOp::GreaterThan, 3)
            .filter("month", FilterOp::LessThan, 9)
            .order("month")
            .order("name");
        assert!(query.validate().is_ok());
    }

    #[test]
    fn compare_uses_orders_then_key() {
        let query = EntityQuery::new("Conference").order("month").order("name");
        let a = entity(2, json!({"month": 1, "name": "B"}));
        let b = entity(1, json!({"month": 1, "name": "A"}));
        let c = entity(3, json!({"month": 0, "name": "Z"}));

        let mut all = vec![a.clone(), b.clone(), c.clone()];
        all.sort_by(|x, y| query.compare(x, y));
        assert_eq!(all, vec![c, b, a]);
    }
}
