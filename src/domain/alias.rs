//! Legacy option names
//!
//! Raw blocks are rewritten into their canonical shape once, before any
//! defaulting runs. The resolvers only ever see current field names.

use serde_yaml::{Mapping, Value};

use super::coerce;

/// (legacy name, current name)
const LEGACY_FIELDS: &[(&str, &str)] = &[
    ("default", "enabled"),
    ("source", "payload"),
    ("sourceRaw", "payloadRaw"),
];

/// Rewrite legacy field names to their current names
///
/// When both names are present the current one wins and the legacy value is
/// dropped.
pub fn normalize(raw: &Mapping) -> Mapping {
    let mut canonical = Mapping::new();

    for (key, value) in raw {
        let legacy = key
            .as_str()
            .and_then(|k| LEGACY_FIELDS.iter().find(|(old, _)| *old == k));

        match legacy {
            Some((_, current)) => {
                if !raw.contains_key(*current) {
                    canonical.insert(Value::from(*current), value.clone());
                }
            }
            None => {
                canonical.insert(key.clone(), value.clone());
            }
        }
    }

    canonical
}

/// Canonical shape of a group block
///
/// On top of [`normalize`], upgrades the legacy `schedule` shorthand (a single
/// expression or a list of expressions) into a structured `events` list.
pub fn normalize_group(raw: &Mapping) -> Mapping {
    let mut canonical = normalize(raw);

    if let Some(schedule) = canonical.remove("schedule") {
        if !canonical.contains_key("events") {
            if let Some(events) = schedule_events(&schedule) {
                canonical.insert(Value::from("events"), events);
            }
        }
    }

    canonical
}

fn schedule_events(schedule: &Value) -> Option<Value> {
    let expressions = match schedule {
        Value::String(expression) => vec![expression.clone()],
        other => coerce::as_string_list(other)?,
    };

    let events = expressions
        .into_iter()
        .map(|expression| {
            let mut event = Mapping::new();
            event.insert(Value::from("schedule"), Value::from(expression));
            Value::Mapping(event)
        })
        .collect();

    Some(Value::Sequence(events))
}

/// Packaging patterns from a raw `package` block
///
/// `patterns` is the current form. The legacy `include`/`exclude` lists are
/// folded into it as `!<exclude>` entries followed by the includes.
pub fn package_patterns(package: &Mapping) -> Option<Vec<String>> {
    if let Some(patterns) = package.get("patterns").and_then(coerce::as_string_list) {
        return Some(patterns);
    }

    let exclude = package.get("exclude").and_then(coerce::as_string_list);
    let include = package.get("include").and_then(coerce::as_string_list);
    if exclude.is_none() && include.is_none() {
        return None;
    }

    let mut patterns: Vec<String> = exclude
        .unwrap_or_default()
        .into_iter()
        .map(|pattern| format!("!{}", pattern))
        .collect();
    patterns.extend(include.unwrap_or_default());
    Some(patterns)
}
