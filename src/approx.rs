//! Approximate structural equality for JSON values.
//!
//! Transcription timestamps are floating-point values computed by a model
//! that behaves slightly differently across hardware. Comparing them exactly
//! would make every reference machine-specific, so we compare a "loosened"
//! form instead:
//! - floats are rounded to 1 decimal place (negative zero normalizes to zero)
//! - objects compare value-wise, independent of key order
//! - arrays compare element-wise; lengths must match exactly
//! - every other scalar compares exactly
//!
//! A failed comparison produces a list of [`Mismatch`]es, each carrying the
//! JSON-pointer-style path of the differing field and both values, so a
//! regression can be localized without eyeballing two whole files.

use serde_json::Value;

/// A single point of disagreement between two loosened values.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// JSON-pointer-style path to the differing field (`""` for the root).
    pub path: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(
            f,
            "at {path}: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

/// Return the loosened (tolerance-normalized) form of a JSON value.
///
/// Only floats are rewritten: rounded to 1 decimal, with `-0.0` normalized to
/// `0.0`. Integers pass through untouched so counts and indices still compare
/// exactly. A float that is not representable after rounding (NaN, infinity)
/// loosens to `null`; two such values therefore compare equal, which is the
/// behavior we want for artifacts we treat as opaque.
pub fn loosen(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(loosen).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| (key.clone(), loosen(val)))
                .collect(),
        ),
        Value::Number(num) => match num.as_f64() {
            // Leave integers exact; only round genuine floats.
            Some(float) if num.is_f64() => {
                let rounded = (float * 10.0).round() / 10.0;
                let rounded = if rounded == 0.0 { 0.0 } else { rounded };
                serde_json::Number::from_f64(rounded)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
            _ => value.clone(),
        },
        other => other.clone(),
    }
}

/// Compare two values under loosened equality.
pub fn approx_eq(expected: &Value, actual: &Value) -> bool {
    loosen(expected) == loosen(actual)
}

/// Compare two values under loosened equality, reporting every mismatch.
///
/// An empty result means the values are approximately equal.
pub fn approx_diff(expected: &Value, actual: &Value) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    diff_loosened(&loosen(expected), &loosen(actual), "", &mut mismatches);
    mismatches
}

fn diff_loosened(expected: &Value, actual: &Value, path: &str, out: &mut Vec<Mismatch>) {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            for (key, exp_val) in exp {
                match act.get(key) {
                    Some(act_val) => {
                        diff_loosened(exp_val, act_val, &format!("{path}/{key}"), out);
                    }
                    None => out.push(Mismatch {
                        path: format!("{path}/{key}"),
                        expected: render(exp_val),
                        actual: "<absent>".to_string(),
                    }),
                }
            }
            for (key, act_val) in act {
                if !exp.contains_key(key) {
                    out.push(Mismatch {
                        path: format!("{path}/{key}"),
                        expected: "<absent>".to_string(),
                        actual: render(act_val),
                    });
                }
            }
        }
        (Value::Array(exp), Value::Array(act)) => {
            if exp.len() != act.len() {
                // No fuzzy alignment of elements: a length mismatch is
                // reported at the containing path and we stop descending.
                out.push(Mismatch {
                    path: path.to_string(),
                    expected: format!("array of {} elements", exp.len()),
                    actual: format!("array of {} elements", act.len()),
                });
                return;
            }
            for (idx, (exp_val, act_val)) in exp.iter().zip(act).enumerate() {
                diff_loosened(exp_val, act_val, &format!("{path}/{idx}"), out);
            }
        }
        (exp, act) => {
            if exp != act {
                out.push(Mismatch {
                    path: path.to_string(),
                    expected: render(exp),
                    actual: render(act),
                });
            }
        }
    }
}

fn render(value: &Value) -> String {
    // Compact rendering keeps multi-mismatch reports on one line each.
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn approx_eq_is_reflexive() {
        let value = json!({
            "text": "bonjour",
            "segments": [{"start": 0.0, "end": 1.24, "words": ["bonjour"]}],
            "language": "fr",
        });
        assert!(approx_eq(&value, &value));
        assert!(approx_diff(&value, &value).is_empty());
    }

    #[test]
    fn float_noise_within_a_decimal_is_tolerated() {
        let expected = json!({"start": 1.23, "end": 4.49});
        let actual = json!({"start": 1.16, "end": 4.54});
        assert!(approx_eq(&expected, &actual));
    }

    #[test]
    fn float_noise_beyond_a_decimal_is_rejected() {
        let expected = json!({"start": 1.24});
        let actual = json!({"start": 1.36});
        let diff = approx_diff(&expected, &actual);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].path, "/start");
        assert_eq!(diff[0].expected, "1.2");
        assert_eq!(diff[0].actual, "1.4");
    }

    #[test]
    fn negative_zero_normalizes_to_zero() {
        assert!(approx_eq(&json!(-0.04), &json!(0.0)));
        assert_eq!(loosen(&json!(-0.04)), json!(0.0));
    }

    #[test]
    fn integers_compare_exactly() {
        assert!(!approx_eq(&json!(10), &json!(11)));
        assert!(approx_eq(&json!(10), &json!(10)));
    }

    #[test]
    fn strings_and_bools_compare_exactly() {
        assert!(!approx_eq(&json!("bonjour"), &json!("bonsoir")));
        assert!(!approx_eq(&json!(true), &json!(false)));
    }

    #[test]
    fn object_key_order_is_irrelevant() {
        // serde_json preserves insertion order by default, so these two maps
        // genuinely iterate in different orders.
        let a: Value = serde_json::from_str(r#"{"start": 0.1, "end": 0.9}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"end": 0.9, "start": 0.1}"#).unwrap();
        assert!(approx_eq(&a, &b));
    }

    #[test]
    fn missing_and_extra_keys_are_both_reported() {
        let expected = json!({"start": 0.1, "confidence": 0.9});
        let actual = json!({"start": 0.1, "score": 0.9});
        let diff = approx_diff(&expected, &actual);
        let paths: Vec<_> = diff.iter().map(|m| m.path.as_str()).collect();
        assert!(paths.contains(&"/confidence"));
        assert!(paths.contains(&"/score"));
    }

    #[test]
    fn array_length_mismatch_reports_the_containing_path() {
        let expected = json!({"words": [1.0, 2.0, 3.0]});
        let actual = json!({"words": [1.0, 2.0]});
        let diff = approx_diff(&expected, &actual);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].path, "/words");
        assert!(diff[0].expected.contains("3 elements"));
    }

    #[test]
    fn mismatch_path_localizes_nested_fields() {
        let expected = json!({"segments": [{"words": [{"start": 0.1}]}]});
        let actual = json!({"segments": [{"words": [{"start": 0.5}]}]});
        let diff = approx_diff(&expected, &actual);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].path, "/segments/0/words/0/start");
    }

    #[test]
    fn non_finite_floats_loosen_to_null() {
        let nan = serde_json::Number::from_f64(f64::NAN);
        // serde_json cannot even represent NaN, so the only way to reach the
        // fallback is through arithmetic overflow during rounding.
        assert!(nan.is_none());
        assert_eq!(loosen(&json!(f64::MAX)), loosen(&json!(f64::MAX)));
    }
}
