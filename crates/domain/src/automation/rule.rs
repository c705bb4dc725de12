//! Rule — condition list plus fact-setting outcomes, evaluated inside a
//! rules-engine action.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path;

/// Comparison applied by a rule condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanInclusive,
    LessThan,
    LessThanInclusive,
    Contains,
    DoesNotContain,
    In,
    NotIn,
}

impl Operator {
    /// Evaluate this operator against a looked-up value.
    ///
    /// A missing field fails every comparison except the negated ones
    /// (`notEqual`, `doesNotContain`, `notIn`), which hold vacuously.
    #[must_use]
    pub fn evaluate(self, found: Option<&Value>, expected: &Value) -> bool {
        match self {
            Self::Equal => found.is_some_and(|v| loose_eq(v, expected)),
            Self::NotEqual => !found.is_some_and(|v| loose_eq(v, expected)),
            Self::GreaterThan => numeric(found, expected).is_some_and(|(a, b)| a > b),
            Self::GreaterThanInclusive => numeric(found, expected).is_some_and(|(a, b)| a >= b),
            Self::LessThan => numeric(found, expected).is_some_and(|(a, b)| a < b),
            Self::LessThanInclusive => numeric(found, expected).is_some_and(|(a, b)| a <= b),
            Self::Contains => found.is_some_and(|v| contains(v, expected)),
            Self::DoesNotContain => !found.is_some_and(|v| contains(v, expected)),
            Self::In => found.is_some_and(|v| in_set(v, expected)),
            Self::NotIn => !found.is_some_and(|v| in_set(v, expected)),
        }
    }
}

/// Equality over string forms, so `42`, `"42"` and `42.0` compare equal.
fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    path::value_to_string(a) == path::value_to_string(b)
}

fn numeric(found: Option<&Value>, expected: &Value) -> Option<(f64, f64)> {
    Some((path::value_as_f64(found?)?, path::value_as_f64(expected)?))
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::String(s) => s.contains(&path::value_to_string(needle)),
        Value::Array(items) => items.iter().any(|item| loose_eq(item, needle)),
        _ => false,
    }
}

/// Membership of `found` in a comma-delimited string or an array.
fn in_set(found: &Value, set: &Value) -> bool {
    let needle = path::value_to_string(found);
    match set {
        Value::String(s) => s.split(',').any(|item| item.trim() == needle),
        Value::Array(items) => items.iter().any(|item| loose_eq(item, found)),
        _ => false,
    }
}

/// One field comparison inside a rule. Fields starting with `facts.`
/// resolve against the facts accumulated so far instead of the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    /// Evaluate this condition against the payload and current facts.
    #[must_use]
    pub fn evaluate(&self, data: &Value, facts: &Facts) -> bool {
        let found = match self.field.strip_prefix("facts.") {
            Some(rest) => facts.lookup(rest),
            None => path::lookup(data, &self.field),
        };
        self.operator.evaluate(found, &self.value)
    }
}

/// Outcome applied when a rule's conditions all hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleOutcome {
    /// Record a named fact for later rules and execution results.
    SetFact { name: String, value: Value },
}

/// A named condition set with its outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub outcomes: Vec<RuleOutcome>,
}

impl Rule {
    /// Evaluate the rule, applying its outcomes to `facts` when every
    /// condition holds. Returns whether the rule fired.
    #[must_use]
    pub fn evaluate(&self, data: &Value, facts: &mut Facts) -> bool {
        if !self.conditions.iter().all(|c| c.evaluate(data, facts)) {
            return false;
        }
        for outcome in &self.outcomes {
            match outcome {
                RuleOutcome::SetFact { name, value } => facts.set(name, value.clone()),
            }
        }
        true
    }
}

/// Facts accumulated while a rules-engine action runs. Scoped to one
/// action execution; later rules see facts set by earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facts(BTreeMap<String, Value>);

impl Facts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Resolve a dot path, where the first segment names a fact and any
    /// remainder descends into its value.
    #[must_use]
    pub fn lookup(&self, fact_path: &str) -> Option<&Value> {
        let (name, rest) = match fact_path.split_once('.') {
            Some((name, rest)) => (name, Some(rest)),
            None => (fact_path, None),
        };
        let value = self.0.get(name)?;
        match rest {
            Some(rest) => path::lookup(value, rest),
            None => Some(value),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl IntoIterator for Facts {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
