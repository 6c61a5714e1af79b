use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Matches `{{ env.NAME }}` with an optional `| default("value")` suffix
fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

/// Substitute environment placeholders in raw configuration text
///
/// Comment lines are copied verbatim so that disabled settings never
/// require their variables to be present.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut lines = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_owned());
            continue;
        }

        let mut failure = None;
        let expanded = placeholder().replace_all(line, |caps: &Captures<'_>| match resolve(caps) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        });

        if let Some(e) = failure {
            return Err(e);
        }

        lines.push(expanded.into_owned());
    }

    let mut output = lines.join("\n");
    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

/// Resolve a single placeholder match to its value
fn resolve(caps: &Captures<'_>) -> Result<String, String> {
    let key = &caps[1];
    let fallback = caps.get(2).map(|m| m.as_str());

    let Some(name) = key.strip_prefix("env.").filter(|rest| !rest.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{name}`")),
    }
}
