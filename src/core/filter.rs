//! Filter and sort evaluation over JSON records
//!
//! Filters are JSON objects mapping field names to comparisons, combined
//! with `and` / `or`:
//!
//! ```text
//! { "id": { "eq": "id-2" } }
//! { "or": [ { "title": { "like": "Task%" } }, { "done": { "is": true } } ] }
//! ```
//!
//! Every key of one filter object must match (implicit AND).

use anyhow::{Result, anyhow, bail};
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::query::{SortDirection, SortField, SortNulls};

/// Check whether `record` satisfies `filter`
pub fn matches(record: &Value, filter: &Value) -> Result<bool> {
    matches_with(record, filter, &mut LikePatterns::default())
}

fn matches_with(record: &Value, filter: &Value, patterns: &mut LikePatterns) -> Result<bool> {
    let Some(conditions) = filter.as_object() else {
        bail!("Filter must be an object, got {}", filter);
    };

    for (key, condition) in conditions {
        let matched = match key.as_str() {
            "and" => {
                let filters = as_filter_list(key, condition)?;
                let mut all = true;
                for f in filters {
                    if !matches_with(record, f, patterns)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "or" => {
                let filters = as_filter_list(key, condition)?;
                let mut any = false;
                for f in filters {
                    if matches_with(record, f, patterns)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            field => field_matches(
                record.get(field).unwrap_or(&Value::Null),
                field,
                condition,
                patterns,
            )?,
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

fn as_filter_list<'a>(key: &str, value: &'a Value) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| anyhow!("'{}' expects a list of filters", key))
}

fn field_matches(
    value: &Value,
    field: &str,
    comparison: &Value,
    patterns: &mut LikePatterns,
) -> Result<bool> {
    let Some(operators) = comparison.as_object() else {
        bail!("Comparison for '{}' must be an object", field);
    };

    for (op, operand) in operators {
        let matched = match op.as_str() {
            "eq" => value == operand,
            "neq" => value != operand,
            "gt" => compare(value, operand) == Some(Ordering::Greater),
            "gte" => matches!(
                compare(value, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            "lt" => compare(value, operand) == Some(Ordering::Less),
            "lte" => matches!(
                compare(value, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            "in" => as_operand_list(field, op, operand)?.contains(value),
            "notIn" => !as_operand_list(field, op, operand)?.contains(value),
            "like" => patterns.like(value, operand, false)?,
            "notLike" => !patterns.like(value, operand, false)?,
            "iLike" => patterns.like(value, operand, true)?,
            "notILike" => !patterns.like(value, operand, true)?,
            "is" => is(value, operand),
            "isNot" => !is(value, operand),
            other => bail!("Unsupported comparison operator '{}' on '{}'", other, field),
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

fn as_operand_list<'a>(field: &str, op: &str, operand: &'a Value) -> Result<&'a Vec<Value>> {
    operand
        .as_array()
        .ok_or_else(|| anyhow!("'{}' on '{}' expects a list", op, field))
}

/// `is` compares against `true`, `false` or `null`
fn is(value: &Value, operand: &Value) -> bool {
    match operand {
        Value::Null => value.is_null(),
        Value::Bool(b) => value.as_bool() == Some(*b),
        _ => false,
    }
}

/// Compiled `like` patterns, shared across the records of one filter run
#[derive(Default)]
struct LikePatterns {
    compiled: HashMap<(String, bool), Regex>,
}

impl LikePatterns {
    /// SQL-style pattern match: `%` any run, `_` one character
    fn like(&mut self, value: &Value, pattern: &Value, case_insensitive: bool) -> Result<bool> {
        let (Some(value), Some(pattern)) = (value.as_str(), pattern.as_str()) else {
            return Ok(false);
        };

        let key = (pattern.to_string(), case_insensitive);
        if !self.compiled.contains_key(&key) {
            let re = like_regex(pattern, case_insensitive)?;
            self.compiled.insert(key.clone(), re);
        }
        Ok(self.compiled[&key].is_match(value))
    }
}

fn like_regex(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    // `s` lets `%` and `_` span newlines
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push_str(if case_insensitive { "(?si)" } else { "(?s)" });
    source.push('^');
    for c in pattern.chars() {
        match c {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            c => source.push_str(&regex::escape(&c.to_string())),
        }
    }
    source.push('$');

    Regex::new(&source).map_err(|e| anyhow!("Invalid like pattern: {}", e))
}

/// Order two JSON scalars of the same kind
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Keep the records satisfying `filter` (all records when `None`)
pub fn filter_records(records: Vec<Value>, filter: Option<&Value>) -> Result<Vec<Value>> {
    let Some(filter) = filter else {
        return Ok(records);
    };

    let mut patterns = LikePatterns::default();
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if matches_with(&record, filter, &mut patterns)? {
            kept.push(record);
        }
    }
    Ok(kept)
}

/// Sort records by each criterion in turn
///
/// Nulls sort first for ascending order and last for descending order
/// unless `nulls` says otherwise.
pub fn sort_records(records: &mut [Value], sorting: &[SortField]) {
    if sorting.is_empty() {
        return;
    }

    records.sort_by(|a, b| {
        for sort in sorting {
            let left = a.get(&sort.field).unwrap_or(&Value::Null);
            let right = b.get(&sort.field).unwrap_or(&Value::Null);

            let nulls_first = match sort.nulls {
                Some(SortNulls::NullsFirst) => true,
                Some(SortNulls::NullsLast) => false,
                None => sort.direction == SortDirection::Asc,
            };

            let ordering = match (left.is_null(), right.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) if nulls_first => Ordering::Less,
                (true, false) => Ordering::Greater,
                (false, true) if nulls_first => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ordering = compare(left, right).unwrap_or(Ordering::Equal);
                    match sort.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                }
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "id": "id-2",
            "title": "Task One",
            "priority": 3,
            "done": false,
            "readRelationId": "id-1",
            "note": null
        })
    }

    #[test]
    fn test_eq_and_neq() {
        assert!(matches(&record(), &json!({ "id": { "eq": "id-2" } })).unwrap());
        assert!(!matches(&record(), &json!({ "id": { "eq": "id-3" } })).unwrap());
        assert!(matches(&record(), &json!({ "id": { "neq": "id-3" } })).unwrap());
    }

    #[test]
    fn test_ordering_operators() {
        assert!(matches(&record(), &json!({ "priority": { "gt": 2 } })).unwrap());
        assert!(matches(&record(), &json!({ "priority": { "gte": 3, "lte": 3 } })).unwrap());
        assert!(!matches(&record(), &json!({ "priority": { "lt": 3 } })).unwrap());
        // mismatched kinds never compare
        assert!(!matches(&record(), &json!({ "priority": { "gt": "1" } })).unwrap());
    }

    #[test]
    fn test_in_and_not_in() {
        assert!(matches(&record(), &json!({ "id": { "in": ["id-1", "id-2"] } })).unwrap());
        assert!(matches(&record(), &json!({ "id": { "notIn": ["id-1"] } })).unwrap());
        assert!(matches(&record(), &json!({ "id": { "in": "id-2" } })).is_err());
    }

    #[test]
    fn test_like_patterns() {
        assert!(matches(&record(), &json!({ "title": { "like": "Task%" } })).unwrap());
        assert!(matches(&record(), &json!({ "title": { "like": "Task _ne" } })).unwrap());
        assert!(!matches(&record(), &json!({ "title": { "like": "task%" } })).unwrap());
        assert!(matches(&record(), &json!({ "title": { "iLike": "task%" } })).unwrap());
        assert!(matches(&record(), &json!({ "title": { "notLike": "%Two" } })).unwrap());
        // regex metacharacters are literal
        assert!(!matches(&record(), &json!({ "title": { "like": "Task.*" } })).unwrap());
    }

    #[test]
    fn test_like_spans_newlines() {
        let note = json!({ "note": "first line\nsecond line" });
        assert!(matches(&note, &json!({ "note": { "like": "first%line" } })).unwrap());
        assert!(matches(&note, &json!({ "note": { "like": "first line_second%" } })).unwrap());
        assert!(matches(&note, &json!({ "note": { "iLike": "FIRST%LINE" } })).unwrap());
    }

    #[test]
    fn test_like_patterns_compiled_once_per_run() {
        let mut patterns = LikePatterns::default();
        for title in ["Task One", "Task Two", "Chore"] {
            patterns
                .like(&json!(title), &json!("Task%"), false)
                .unwrap();
            patterns.like(&json!(title), &json!("task%"), true).unwrap();
        }
        assert_eq!(patterns.compiled.len(), 2);

        let records = vec![
            json!({ "title": "Task One" }),
            json!({ "title": "Chore" }),
            json!({ "title": "Task Two" }),
        ];
        let kept =
            filter_records(records, Some(&json!({ "title": { "like": "Task%" } }))).unwrap();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_is_and_is_not() {
        assert!(matches(&record(), &json!({ "done": { "is": false } })).unwrap());
        assert!(matches(&record(), &json!({ "note": { "is": null } })).unwrap());
        assert!(matches(&record(), &json!({ "missing": { "is": null } })).unwrap());
        assert!(matches(&record(), &json!({ "done": { "isNot": true } })).unwrap());
    }

    #[test]
    fn test_and_or_combinators() {
        let filter = json!({
            "or": [
                { "id": { "eq": "nope" } },
                { "and": [
                    { "priority": { "gte": 1 } },
                    { "readRelationId": { "eq": "id-1" } }
                ]}
            ]
        });
        assert!(matches(&record(), &filter).unwrap());
        assert!(!matches(&record(), &json!({ "or": [] })).unwrap());
        assert!(matches(&record(), &json!({ "and": [] })).unwrap());
    }

    #[test]
    fn test_invalid_filters() {
        assert!(matches(&record(), &json!("id")).is_err());
        assert!(matches(&record(), &json!({ "id": "id-2" })).is_err());
        assert!(matches(&record(), &json!({ "id": { "between": [1, 2] } })).is_err());
        assert!(matches(&record(), &json!({ "and": {} })).is_err());
    }

    #[test]
    fn test_filter_records() {
        let records = vec![json!({"id": "a"}), json!({"id": "b"})];
        let kept = filter_records(records.clone(), Some(&json!({ "id": { "eq": "b" } }))).unwrap();
        assert_eq!(kept, vec![json!({"id": "b"})]);
        assert_eq!(filter_records(records.clone(), None).unwrap(), records);
    }

    #[test]
    fn test_sort_records() {
        let mut records = vec![
            json!({"id": "a", "priority": 2}),
            json!({"id": "b", "priority": null}),
            json!({"id": "c", "priority": 1}),
            json!({"id": "d", "priority": 2}),
        ];

        sort_records(
            &mut records,
            &[
                SortField {
                    field: "priority".into(),
                    direction: SortDirection::Desc,
                    nulls: None,
                },
                SortField {
                    field: "id".into(),
                    direction: SortDirection::Desc,
                    nulls: None,
                },
            ],
        );
        let ids: Vec<_> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["d", "a", "c", "b"]);

        sort_records(
            &mut records,
            &[SortField {
                field: "priority".into(),
                direction: SortDirection::Asc,
                nulls: Some(SortNulls::NullsLast),
            }],
        );
        let ids: Vec<_> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["c", "d", "a", "b"]);
    }
}
