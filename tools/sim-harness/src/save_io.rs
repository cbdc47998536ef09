//! Save files: pretty JSON on disk, structurally checked before parsing.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use fodder_core::save::SaveSnapshot;

pub fn write_save(path: &Path, snapshot: &SaveSnapshot) -> Result<()> {
    let text = serde_json::to_string_pretty(snapshot).context("serializing save")?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

pub fn read_save(path: &Path) -> Result<SaveSnapshot> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_save(&text).with_context(|| format!("loading {}", path.display()))
}

/// Parse save text, rejecting documents with missing or mistyped fields.
pub fn parse_save(text: &str) -> Result<SaveSnapshot> {
    let value: Value = serde_json::from_str(text).context("save is not valid JSON")?;
    let problems = validate(&value);
    if !problems.is_empty() {
        bail!("invalid save: {}", problems.join("; "));
    }
    Ok(serde_json::from_value(value)?)
}

/// Every structural problem in a save document.
pub fn validate(doc: &Value) -> Vec<String> {
    let mut problems = Vec::new();

    match doc.get("squad") {
        Some(squad) if squad.is_object() => {
            require_numbers(squad, "squad", &["x", "y"], &mut problems);
            for_each_item(squad, "soldiers", "squad.soldiers", &mut problems, |item, at, p| {
                require_numbers(item, at, &["hp"], p);
                require_string(item, at, "weaponType", p);
            });
        }
        _ => problems.push("squad must be an object".to_string()),
    }

    for_each_item(doc, "enemies", "enemies", &mut problems, |item, at, p| {
        require_numbers(item, at, &["x", "y", "hp"], p);
        match item.get("type").and_then(Value::as_str) {
            Some("LIGHT" | "HEAVY" | "SNIPER") => {}
            _ => p.push(format!("{at}.type must be LIGHT, HEAVY or SNIPER")),
        }
    });

    for_each_item(doc, "cages", "cages", &mut problems, |item, at, p| {
        require_numbers(item, at, &["x", "y"], p);
    });

    for_each_item(doc, "weaponCrates", "weaponCrates", &mut problems, |item, at, p| {
        require_numbers(item, at, &["x", "y"], p);
        require_string(item, at, "weaponType", p);
    });

    if !doc.get("timestamp").is_some_and(|t| t.is_i64() || t.is_u64()) {
        problems.push("timestamp must be an integer".to_string());
    }

    problems
}

fn for_each_item(
    parent: &Value,
    field: &str,
    path: &str,
    problems: &mut Vec<String>,
    mut check: impl FnMut(&Value, &str, &mut Vec<String>),
) {
    match parent.get(field).and_then(Value::as_array) {
        Some(items) => {
            for (i, item) in items.iter().enumerate() {
                check(item, &format!("{path}[{i}]"), problems);
            }
        }
        None => problems.push(format!("{path} must be an array")),
    }
}

fn require_numbers(item: &Value, at: &str, fields: &[&str], problems: &mut Vec<String>) {
    for field in fields {
        if !item.get(*field).is_some_and(Value::is_number) {
            problems.push(format!("{at}.{field} must be a number"));
        }
    }
}

fn require_string(item: &Value, at: &str, field: &str, problems: &mut Vec<String>) {
    if !item.get(field).is_some_and(Value::is_string) {
        problems.push(format!("{at}.{field} must be a string"));
    }
}
