//! Structural equality and numeric helpers for JSON values.
//!
//! JSON Schema compares values mathematically: `1` equals `1.0`, and object
//! key order never matters.

use std::cmp::Ordering;

use serde_json::{Number, Value};

/// Deep structural equality with numeric normalization.
pub fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare(a, b) == Some(Ordering::Equal),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| equal(x, y)))
        }
        _ => left == right,
    }
}

/// Returns true if every element of `items` is distinct under [`equal`].
pub fn all_unique(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, a)| items[i + 1..].iter().all(|b| !equal(a, b)))
}

fn as_i128(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Order two JSON numbers. Integers compare exactly; anything else falls
/// back to `f64`.
pub fn compare(a: &Number, b: &Number) -> Option<Ordering> {
    match (as_i128(a), as_i128(b)) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// Draft-06 integer check: any number without a fractional part.
pub fn is_integer(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Relative tolerance applied to the quotient in [`is_multiple_of`].
const MULTIPLE_OF_ULPS: f64 = 8.0;

/// Returns true if `value` is an integer multiple of `divisor`.
///
/// Integer operands use exact remainder arithmetic. Otherwise the quotient
/// is accepted when it is within a few ULPs of an integer, so `0.3` is a
/// multiple of `0.1` despite binary representation error.
pub fn is_multiple_of(value: &Number, divisor: &Number) -> bool {
    if let (Some(v), Some(d)) = (as_i128(value), as_i128(divisor)) {
        return d != 0 && v % d == 0;
    }
    let (Some(v), Some(d)) = (value.as_f64(), divisor.as_f64()) else {
        return false;
    };
    if d == 0.0 {
        return false;
    }
    let quotient = v / d;
    if !quotient.is_finite() {
        return false;
    }
    let distance = (quotient - quotient.round()).abs();
    distance <= f64::EPSILON * quotient.abs().max(1.0) * MULTIPLE_OF_ULPS
}

/// Render a value for use inside a violation message, truncated to keep
/// messages readable for large instances.
pub(crate) fn show(value: &Value) -> String {
    const LIMIT: usize = 80;
    let rendered = value.to_string();
    if rendered.chars().count() <= LIMIT {
        rendered
    } else {
        let truncated: String = rendered.chars().take(LIMIT).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn num(v: Value) -> Number {
        match v {
            Value::Number(n) => n,
            other => panic!("not a number: {other}"),
        }
    }

    #[test]
    fn integers_and_floats_compare_equal() {
        assert!(equal(&json!(1), &json!(1.0)));
        assert!(equal(&json!([1, {"a": 2.0}]), &json!([1.0, {"a": 2}])));
        assert!(!equal(&json!(1), &json!("1")));
        assert!(!equal(&json!(true), &json!(1)));
    }

    #[test]
    fn object_key_order_is_irrelevant() {
        let a: Value = serde_json::from_str(r#"{"a": 1, "b": [1, 2]}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"b": [1, 2], "a": 1}"#).unwrap();
        assert!(equal(&a, &b));
        assert!(!equal(&a, &json!({"a": 1})));
    }

    #[test]
    fn uniqueness_uses_structural_equality() {
        assert!(all_unique(&[json!(1), json!(2), json!("1")]));
        assert!(!all_unique(&[json!({"a": 1, "b": 2}), json!({"b": 2, "a": 1})]));
        assert!(!all_unique(&[json!(1), json!(1.0)]));
        assert!(all_unique(&[]));
    }

    #[test]
    fn integer_detection() {
        assert!(is_integer(&num(json!(3))));
        assert!(is_integer(&num(json!(-3))));
        assert!(is_integer(&num(json!(3.0))));
        assert!(!is_integer(&num(json!(3.5))));
    }

    #[test]
    fn compare_handles_mixed_representations() {
        assert_eq!(compare(&num(json!(2)), &num(json!(2.5))), Some(Ordering::Less));
        assert_eq!(
            compare(&num(json!(u64::MAX)), &num(json!(-1))),
            Some(Ordering::Greater)
        );
        assert_eq!(compare(&num(json!(5)), &num(json!(5.0))), Some(Ordering::Equal));
    }

    #[test]
    fn multiple_of_tolerates_binary_representation_error() {
        assert!(is_multiple_of(&num(json!(0.3)), &num(json!(0.1))));
        assert!(is_multiple_of(&num(json!(19.99)), &num(json!(0.01))));
        assert!(is_multiple_of(&num(json!(4.5)), &num(json!(1.5))));
        assert!(!is_multiple_of(&num(json!(0.3)), &num(json!(0.2))));
        assert!(!is_multiple_of(&num(json!(35)), &num(json!(1.5))));
    }

    #[test]
    fn multiple_of_integers_is_exact() {
        assert!(is_multiple_of(&num(json!(10)), &num(json!(5))));
        assert!(!is_multiple_of(&num(json!(7)), &num(json!(2))));
        assert!(is_multiple_of(&num(json!(0)), &num(json!(7))));
    }

    #[test]
    fn show_truncates_long_values() {
        let long = json!("x".repeat(200));
        let shown = show(&long);
        assert!(shown.ends_with('…'));
        assert_eq!(shown.chars().count(), 81);
        assert_eq!(show(&json!(1)), "1");
    }

    proptest! {
        #[test]
        fn integer_multiples_are_accepted(k in -10_000i64..10_000, d in 1i64..1_000) {
            prop_assert!(is_multiple_of(&Number::from(k * d), &Number::from(d)));
        }

        #[test]
        fn equality_is_reflexive_for_strings(s in ".*") {
            let v = Value::String(s);
            prop_assert!(equal(&v, &v.clone()));
        }
    }
}
