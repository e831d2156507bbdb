//! Compiles user-supplied conference search conditions into a query.
//!
//! Fields and operators come from fixed allow-lists. Range comparisons may
//! touch only one field; when one does, results are ordered by that field
//! and then by name, otherwise by name alone.

use datastore::{Entity, EntityQuery, FilterOp, PropertyFilter};
use serde_json::Value;

use crate::error::DomainError;
use crate::forms::ConferenceQueryForm;
use crate::model::Conference;

/// A searchable conference field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    City,
    Topic,
    Month,
    MaxAttendees,
}

impl FilterField {
    /// Parses a wire field name (`CITY`, `TOPIC`, `MONTH`, `MAX_ATTENDEES`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "CITY" => Some(Self::City),
            "TOPIC" => Some(Self::Topic),
            "MONTH" => Some(Self::Month),
            "MAX_ATTENDEES" => Some(Self::MaxAttendees),
            _ => None,
        }
    }

    /// Returns the stored property the field maps to.
    pub fn property(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Topic => "topics",
            Self::Month => "month",
            Self::MaxAttendees => "maxAttendees",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Month | Self::MaxAttendees)
    }

    fn coerce(&self, raw: &str) -> Result<Value, DomainError> {
        if !self.is_numeric() {
            return Ok(Value::String(raw.to_string()));
        }
        raw.trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| {
                DomainError::Validation(format!(
                    "'{}' expects an integer, got '{raw}'",
                    self.property()
                ))
            })
    }
}

/// A comparison operator of the search surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Gt,
    Gteq,
    Lt,
    Lteq,
    Ne,
}

impl FilterOperator {
    /// Parses a wire operator name (`EQ`, `GT`, `GTEQ`, `LT`, `LTEQ`, `NE`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "EQ" => Some(Self::Eq),
            "GT" => Some(Self::Gt),
            "GTEQ" => Some(Self::Gteq),
            "LT" => Some(Self::Lt),
            "LTEQ" => Some(Self::Lteq),
            "NE" => Some(Self::Ne),
            _ => None,
        }
    }

    /// Every operator except `EQ` is a range comparison.
    pub fn is_inequality(&self) -> bool {
        !matches!(self, Self::Eq)
    }

    pub fn to_filter_op(self) -> FilterOp {
        match self {
            Self::Eq => FilterOp::Equal,
            Self::Gt => FilterOp::GreaterThan,
            Self::Gteq => FilterOp::GreaterThanOrEqual,
            Self::Lt => FilterOp::LessThan,
            Self::Lteq => FilterOp::LessThanOrEqual,
            Self::Ne => FilterOp::NotEqual,
        }
    }
}

/// Builds a Conference query from search conditions.
///
/// Unknown fields or operators and range comparisons on two fields fail
/// with `InvalidFilter` before values are looked at; malformed numbers then
/// fail with `Validation`.
pub fn compile(filters: &[ConferenceQueryForm]) -> Result<EntityQuery, DomainError> {
    let mut parsed = Vec::with_capacity(filters.len());
    for form in filters {
        let field = FilterField::parse(form.field.trim())
            .ok_or_else(|| DomainError::InvalidFilter(format!("Unknown field: {}", form.field)))?;
        let operator = FilterOperator::parse(form.operator.trim()).ok_or_else(|| {
            DomainError::InvalidFilter(format!("Unknown operator: {}", form.operator))
        })?;
        parsed.push((field, operator, form.value.as_str()));
    }

    let mut inequality_field = None;
    for (field, operator, _) in &parsed {
        if !operator.is_inequality() {
            continue;
        }
        match inequality_field {
            Some(existing) if existing != *field => {
                return Err(DomainError::InvalidFilter(
                    "Inequality filter is allowed on only one field.".into(),
                ));
            }
            _ => inequality_field = Some(*field),
        }
    }

    let mut query = EntityQuery::for_entity::<Conference>();
    if let Some(field) = inequality_field {
        query = query.order(field.property());
    }
    query = query.order("name");

    for (field, operator, raw) in parsed {
        query = query.with_filter(PropertyFilter::new(
            field.property(),
            operator.to_filter_op(),
            field.coerce(raw)?,
        ));
    }

    tracing::debug!(kind = Conference::KIND, filters = query.filters.len(), "compiled conference query");
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(field: &str, op: &str, value: &str) -> ConferenceQueryForm {
        ConferenceQueryForm::new(field, op, value)
    }

    #[test]
    fn no_filters_sort_by_name() {
        let query = compile(&[]).unwrap();
        assert!(query.filters.is_empty());
        let orders: Vec<_> = query.orders.iter().map(|o| o.property.as_str()).collect();
        assert_eq!(orders, vec!["name"]);
    }

    #[test]
    fn equality_only_sorts_by_name() {
        let query = compile(&[f("CITY", "EQ", "London"), f("TOPIC", "EQ", "Rust")]).unwrap();
        let orders: Vec<_> = query.orders.iter().map(|o| o.property.as_str()).collect();
        assert_eq!(orders, vec!["name"]);
        assert_eq!(query.filters[1].property, "topics");
        assert_eq!(query.filters[1].value, Value::from("Rust"));
    }

    #[test]
    fn inequality_field_leads_the_order() {
        let query = compile(&[
            f("CITY", "EQ", "London"),
            f("MONTH", "GT", "3"),
            f("MONTH", "LTEQ", "9"),
        ])
        .unwrap();
        let orders: Vec<_> = query.orders.iter().map(|o| o.property.as_str()).collect();
        assert_eq!(orders, vec!["month", "name"]);
        assert_eq!(query.filters[1].op, FilterOp::GreaterThan);
        assert_eq!(query.filters[1].value, Value::from(3));
        assert!(query.validate().is_ok());
    }

    #[test]
    fn two_inequality_fields_are_rejected() {
        let err = compile(&[f("MONTH", "GT", "3"), f("MAX_ATTENDEES", "LT", "10")]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidFilter(_)));

        let err = compile(&[f("CITY", "NE", "Paris"), f("TOPIC", "NE", "Go")]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidFilter(_)));
    }

    #[test]
    fn unknown_field_or_operator_is_rejected() {
        assert!(matches!(
            compile(&[f("COUNTRY", "EQ", "UK")]),
            Err(DomainError::InvalidFilter(_))
        ));
        assert!(matches!(
            compile(&[f("CITY", "LIKE", "Lon%")]),
            Err(DomainError::InvalidFilter(_))
        ));
    }

    #[test]
    fn malformed_number_is_validation_error() {
        assert!(matches!(
            compile(&[f("MAX_ATTENDEES", "GT", "ten")]),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn structure_is_checked_before_values() {
        let err = compile(&[f("MONTH", "GT", "x"), f("COUNTRY", "EQ", "UK")]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidFilter(_)));
    }
}
