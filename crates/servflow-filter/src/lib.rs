//! Declarative filter predicates and their SQL/BSON translations (§4.A).
//!
//! A [`Filter`] never interpolates its comparator into a query fragment —
//! `toSQL` binds it as a parameter, `toBSON` carries it as a JSON value —
//! so a filter built from untrusted input can never become a SQL
//! injection vector.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The six comparison operators a filter can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl Operation {
    fn sql_operator(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn bson_operator(self) -> Option<&'static str> {
        match self {
            Self::Eq => None,
            Self::Ne => Some("$ne"),
            Self::Lt => Some("$lt"),
            Self::Le => Some("$lte"),
            Self::Gt => Some("$gt"),
            Self::Ge => Some("$gte"),
        }
    }
}

impl std::str::FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            other => Err(UnknownOperation(other.to_string())),
        }
    }
}

/// Raised when a filter's `operation` string doesn't match one of the six
/// known comparison operators.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown filter operation `{0}`")]
pub struct UnknownOperation(pub String);

/// A single `field <op> comparator` predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operation: Operation,
    pub comparator: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, operation: Operation, comparator: Value) -> Self {
        Self {
            field: field.into(),
            operation,
            comparator,
        }
    }

    /// `<field> <op> ?`, with the comparator returned separately to be
    /// bound as a query parameter — never interpolated into the string.
    pub fn to_sql(&self) -> (String, Value) {
        (
            format!("{} {} ?", self.field, self.operation.sql_operator()),
            self.comparator.clone(),
        )
    }

    /// `{field: value}` for equality, `{field: {$op: value}}` otherwise.
    pub fn to_bson(&self) -> Value {
        let inner = match self.operation.bson_operator() {
            None => self.comparator.clone(),
            Some(op) => {
                let mut doc = serde_json::Map::new();
                doc.insert(op.to_string(), self.comparator.clone());
                Value::Object(doc)
            }
        };
        let mut doc = serde_json::Map::new();
        doc.insert(self.field.clone(), inner);
        Value::Object(doc)
    }
}

/// `("f1 AND f2 AND …", [v1, v2, …])`; an empty slice yields an empty
/// fragment and no bound values.
pub fn combine_sql(filters: &[Filter]) -> (String, Vec<Value>) {
    let mut fragments = Vec::with_capacity(filters.len());
    let mut values = Vec::with_capacity(filters.len());
    for filter in filters {
        let (fragment, value) = filter.to_sql();
        fragments.push(fragment);
        values.push(value);
    }
    (fragments.join(" AND "), values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn eq_sql_binds_placeholder() {
        let filter = Filter::new("age", Operation::Eq, json!(30));
        assert_eq!(filter.to_sql(), ("age = ?".to_string(), json!(30)));
    }

    #[test]
    fn comparator_is_never_interpolated_into_the_fragment() {
        let filter = Filter::new("name", Operation::Eq, json!("'; DROP TABLE users; --"));
        let (fragment, value) = filter.to_sql();
        assert_eq!(fragment, "name = ?");
        assert_eq!(value, json!("'; DROP TABLE users; --"));
    }

    #[test]
    fn eq_bson_uses_bare_value() {
        let filter = Filter::new("age", Operation::Eq, json!(30));
        assert_eq!(filter.to_bson(), json!({"age": 30}));
    }

    #[test]
    fn non_eq_bson_wraps_in_operator_document() {
        let filter = Filter::new("age", Operation::Gt, json!(30));
        assert_eq!(filter.to_bson(), json!({"age": {"$gt": 30}}));
    }

    #[test]
    fn combine_sql_joins_with_and() {
        let filters = vec![
            Filter::new("age", Operation::Ge, json!(18)),
            Filter::new("country", Operation::Eq, json!("US")),
        ];
        let (fragment, values) = combine_sql(&filters);
        assert_eq!(fragment, "age >= ? AND country = ?");
        assert_eq!(values, vec![json!(18), json!("US")]);
    }

    #[test]
    fn combine_sql_of_empty_list_is_empty() {
        let (fragment, values) = combine_sql(&[]);
        assert_eq!(fragment, "");
        assert!(values.is_empty());
    }

    #[test]
    fn unknown_operation_string_fails_to_parse() {
        assert_eq!(
            Operation::from_str("~="),
            Err(UnknownOperation("~=".to_string()))
        );
    }

    #[test]
    fn every_known_operator_string_round_trips() {
        for s in ["=", "!=", "<", "<=", ">", ">="] {
            assert_eq!(Operation::from_str(s).unwrap().sql_operator(), s);
        }
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn apply(op: Operation, lhs: i64, rhs: i64) -> bool {
        match op {
            Operation::Eq => lhs == rhs,
            Operation::Ne => lhs != rhs,
            Operation::Lt => lhs < rhs,
            Operation::Le => lhs <= rhs,
            Operation::Gt => lhs > rhs,
            Operation::Ge => lhs >= rhs,
        }
    }

    fn eval_sql(fragment_value: &serde_json::Value, field_value: i64, op: Operation) -> bool {
        let rhs = fragment_value.as_i64().unwrap();
        apply(op, field_value, rhs)
    }

    fn eval_bson(doc: &serde_json::Value, field: &str, field_value: i64) -> bool {
        let entry = &doc[field];
        if let Some(rhs) = entry.as_i64() {
            return field_value == rhs;
        }
        let obj = entry.as_object().expect("non-eq bson is an operator document");
        let (op_key, rhs_value) = obj.iter().next().expect("operator document has one key");
        let rhs = rhs_value.as_i64().unwrap();
        match op_key.as_str() {
            "$ne" => field_value != rhs,
            "$lt" => field_value < rhs,
            "$lte" => field_value <= rhs,
            "$gt" => field_value > rhs,
            "$gte" => field_value >= rhs,
            other => panic!("unexpected bson operator {other}"),
        }
    }

    proptest! {
        #[test]
        fn sql_and_bson_agree_on_the_same_comparison(
            op in prop_oneof![
                Just(Operation::Eq), Just(Operation::Ne), Just(Operation::Lt),
                Just(Operation::Le), Just(Operation::Gt), Just(Operation::Ge),
            ],
            field_value in -1000i64..1000,
            comparator in -1000i64..1000,
        ) {
            let filter = Filter::new("n", op, serde_json::json!(comparator));
            let (_fragment, bound) = filter.to_sql();
            let sql_result = eval_sql(&bound, field_value, op);
            let bson_doc = filter.to_bson();
            let bson_result = eval_bson(&bson_doc, "n", field_value);
            prop_assert_eq!(sql_result, bson_result);
        }
    }
}
