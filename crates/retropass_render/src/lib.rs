use std::fmt::Write as _;

use retropass_core::core_api::{FieldEntry, Result};
use retropass_core::password::Password;
use serde_json::{Map as JsonMap, Value as JsonValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    pub verbose: bool,
}

/// Field ids requested on the command line, in request order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub ids: Vec<String>,
}

impl FieldSelection {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_any_selected(&self) -> bool {
        !self.ids.is_empty()
    }
}

/// The password text on one line, then the field dump when verbose.
pub fn render_text(password: &Password, options: TextRenderOptions) -> Result<String> {
    let mut out = String::new();
    let _ = writeln!(out, "{password}");
    if options.verbose {
        out.push('\n');
        out.push_str(&password.dump()?);
    }
    Ok(out)
}

/// `id=value` per requested field, in request order.
pub fn render_selected(password: &Password, fields: &FieldSelection) -> Result<String> {
    let mut out = String::new();
    for (id, value) in selected_pairs(password, fields)? {
        let _ = writeln!(out, "{id}={value}");
    }
    Ok(out)
}

/// `game`, `password`, `checksum`, then `fields` sorted by id.
pub fn render_json(password: &Password) -> Result<JsonValue> {
    Ok(JsonValue::Object(default_json(password)?))
}

/// `game`, then only the requested `fields` in request order.
pub fn render_json_selected(password: &Password, fields: &FieldSelection) -> Result<JsonValue> {
    let mut out = JsonMap::new();
    out.insert("game".to_string(), game_json(password));
    let mut selected = JsonMap::new();
    for (id, value) in selected_pairs(password, fields)? {
        selected.insert(id, JsonValue::from(value));
    }
    out.insert("fields".to_string(), JsonValue::Object(selected));
    Ok(JsonValue::Object(out))
}

fn selected_pairs(password: &Password, fields: &FieldSelection) -> Result<Vec<(String, i64)>> {
    fields
        .ids
        .iter()
        .map(|id| Ok((id.clone(), password.get(id)?)))
        .collect()
}

fn default_json(password: &Password) -> Result<JsonMap<String, JsonValue>> {
    let mut out = JsonMap::new();
    out.insert("game".to_string(), game_json(password));
    out.insert(
        "password".to_string(),
        JsonValue::String(password.to_string()),
    );
    out.insert(
        "checksum".to_string(),
        password
            .checksum()
            .map(JsonValue::from)
            .unwrap_or(JsonValue::Null),
    );
    out.insert(
        "fields".to_string(),
        JsonValue::Object(entries_to_json(&password.entries()?)),
    );
    Ok(out)
}

fn game_json(password: &Password) -> JsonValue {
    JsonValue::String(password.game().id().to_string())
}

fn entries_to_json(entries: &[FieldEntry]) -> JsonMap<String, JsonValue> {
    entries
        .iter()
        .map(|entry| (entry.name.clone(), JsonValue::from(entry.value)))
        .collect()
}
