//! Tests for placeholder substitution.

use rowsmith_batch::{placeholders, render_template};
use std::collections::HashMap;

fn input(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_substitutes_present_key() {
    assert_eq!(
        render_template("Hello {{name}}", &input(&[("name", "Bob")])),
        "Hello Bob"
    );
}

#[test]
fn test_missing_key_left_literal() {
    assert_eq!(render_template("Hi {{missing}}", &HashMap::new()), "Hi {{missing}}");
}

#[test]
fn test_repeated_and_multiple_keys() {
    let row = input(&[("product", "lamp"), ("tone", "playful")]);
    assert_eq!(
        render_template("{{product}}: a {{tone}} {{product}} ad", &row),
        "lamp: a playful lamp ad"
    );
}

#[test]
fn test_keys_match_exactly() {
    let row = input(&[("name", "Bob")]);
    assert_eq!(render_template("Hi {{ name }}", &row), "Hi {{ name }}");
    assert_eq!(render_template("Hi {{Name}}", &row), "Hi {{Name}}");
}

#[test]
fn test_substituted_values_are_not_rescanned() {
    let row = input(&[("a", "{{b}}"), ("b", "nope")]);
    assert_eq!(render_template("{{a}}", &row), "{{b}}");
}

#[test]
fn test_template_without_placeholders_unchanged() {
    let row = input(&[("name", "Bob")]);
    assert_eq!(render_template("plain text {not one}", &row), "plain text {not one}");
}

#[test]
fn test_placeholders_listed_once_in_order() {
    assert_eq!(
        placeholders("{{b}} and {{a}} then {{b}}"),
        vec!["b".to_string(), "a".to_string()]
    );
    assert!(placeholders("nothing here").is_empty());
}
