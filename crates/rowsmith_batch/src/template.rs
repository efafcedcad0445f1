//! `{{column}}` placeholder substitution.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").ok());

/// Replace every `{{key}}` in `template` with `input[key]`.
///
/// Keys match exactly, including whitespace. A placeholder whose key is absent
/// from `input` is left in place as literal text.
///
/// # Examples
///
/// ```
/// use rowsmith_batch::render_template;
/// use std::collections::HashMap;
///
/// let input = HashMap::from([("name".to_string(), "Bob".to_string())]);
/// assert_eq!(render_template("Hello {{name}}", &input), "Hello Bob");
/// assert_eq!(render_template("Hi {{missing}}", &input), "Hi {{missing}}");
/// ```
pub fn render_template(template: &str, input: &HashMap<String, String>) -> String {
    let Some(pattern) = PLACEHOLDER.as_ref() else {
        return template.to_string();
    };
    let rendered: Cow<'_, str> = pattern.replace_all(template, |caps: &Captures<'_>| {
        caps.get(1)
            .and_then(|key| input.get(key.as_str()))
            .map_or_else(|| caps[0].to_string(), Clone::clone)
    });
    rendered.into_owned()
}

/// Keys referenced by `template`, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let Some(pattern) = PLACEHOLDER.as_ref() else {
        return Vec::new();
    };
    let mut keys: Vec<String> = Vec::new();
    for caps in pattern.captures_iter(template) {
        let Some(key) = caps.get(1) else {
            continue;
        };
        if !keys.iter().any(|k| k == key.as_str()) {
            keys.push(key.as_str().to_string());
        }
    }
    keys
}
