use nestdoc_query::{FieldFilterCompiler, Filter, coerce_literal, field_values};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

// ── Coercion policy ──────────────────────────────────────────────

#[test]
fn integers_become_numbers() {
    assert_eq!(coerce_literal("20"), json!(20));
    assert_eq!(coerce_literal("-3"), json!(-3));
    assert_eq!(coerce_literal(" 7 "), json!(7));
}

#[test]
fn floats_become_numbers() {
    assert_eq!(coerce_literal("2.5"), json!(2.5));
    assert_eq!(coerce_literal("1e3"), json!(1000.0));
}

#[test]
fn text_stays_text() {
    assert_eq!(coerce_literal("John"), json!("John"));
    assert_eq!(coerce_literal("12abc"), json!("12abc"));
    assert_eq!(coerce_literal(""), json!(""));
    assert_eq!(coerce_literal("   "), json!("   "));
}

#[test]
fn non_finite_floats_stay_text() {
    assert_eq!(coerce_literal("NaN"), json!("NaN"));
    assert_eq!(coerce_literal("inf"), json!("inf"));
}

#[test]
fn numeric_looking_strings_are_coerced() {
    // Lossy on purpose: a zip code stored as a string will not match.
    assert_eq!(coerce_literal("007"), json!(7));
}

proptest! {
    #[test]
    fn any_integer_roundtrips(n in any::<i64>()) {
        prop_assert_eq!(coerce_literal(&n.to_string()), json!(n));
    }

    #[test]
    fn alphabetic_text_is_untouched(s in "[a-zA-Z][a-zA-Z ]{0,16}") {
        prop_assume!(!["inf", "infinity", "nan"].contains(&s.trim().to_lowercase().as_str()));
        prop_assert_eq!(coerce_literal(&s), json!(s));
    }
}

// ── Compilation ──────────────────────────────────────────────────

#[test]
fn compile_builds_ordered_conjunction() {
    let filter = FieldFilterCompiler::compile(vec![("name", "John"), ("age", "20")]);
    assert_eq!(
        filter,
        Filter::And(vec![Filter::eq("name", "John"), Filter::eq("age", 20)])
    );
}

#[test]
fn empty_compile_matches_everything() {
    let filter = FieldFilterCompiler::compile(Vec::<(String, String)>::new());
    assert!(filter.matches(&json!({"anything": 1})));
}

// ── Matching ─────────────────────────────────────────────────────

#[test]
fn numeric_literal_matches_numeric_field() {
    let filter = FieldFilterCompiler::compile(vec![("age", "20")]);
    assert!(filter.matches(&json!({"age": 20})));
    assert!(filter.matches(&json!({"age": 20.0})));
    assert!(!filter.matches(&json!({"age": "20"})));
}

#[test]
fn all_clauses_must_match() {
    let filter = FieldFilterCompiler::compile(vec![("name", "John"), ("age", "20")]);
    assert!(filter.matches(&json!({"name": "John", "age": 20})));
    assert!(!filter.matches(&json!({"name": "John", "age": 21})));
    assert!(!filter.matches(&json!({"name": "John"})));
}

#[test]
fn dotted_paths_reach_nested_fields() {
    let filter = Filter::eq("address.city", "Oslo");
    assert!(filter.matches(&json!({"address": {"city": "Oslo"}})));
    assert!(!filter.matches(&json!({"address": {"city": "Bergen"}})));
}

#[test]
fn paths_fan_out_across_arrays() {
    let doc = json!({"environments": [{"dev": {}}, {"prod": {}}]});
    assert!(Filter::exists("environments.prod").matches(&doc));
    assert!(!Filter::exists("environments.qa").matches(&doc));
    assert_eq!(field_values(&doc, "environments.dev").len(), 1);
}

#[test]
fn eq_matches_array_members() {
    assert!(Filter::eq("tags", "a").matches(&json!({"tags": ["a", "b"]})));
}

#[test]
fn qualified_prefixes_fields() {
    let filter = Filter::and([Filter::eq("_id", "x"), Filter::exists("dev")]).qualified("envId");
    assert_eq!(filter.to_string(), "envId._id==x && envId.dev exists");
}

#[test]
fn and_flattens() {
    let filter = Filter::and([Filter::and([Filter::eq("a", 1)]), Filter::eq("b", 2)]);
    assert_eq!(
        filter,
        Filter::And(vec![Filter::eq("a", 1), Filter::eq("b", 2)])
    );
}
