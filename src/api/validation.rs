use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Field-level rejection details from a `400 Bad Request` body.
///
/// Accepts the shapes the backend produces: `{"field": ["msg", ..]}`,
/// `{"detail": "msg"}`, `["msg", ..]` or a bare string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
    general: Vec<String>,
}

const GENERAL_KEYS: &[&str] = &["detail", "non_field_errors"];

impl FieldErrors {
    pub fn parse(body: Option<&str>) -> Self {
        let mut errors = Self::default();
        let Some(body) = body.map(str::trim).filter(|b| !b.is_empty()) else {
            return errors;
        };

        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => {
                for (name, value) in map {
                    let messages = flatten_messages(value);
                    if GENERAL_KEYS.contains(&name.as_str()) {
                        errors.general.extend(messages);
                    } else if !messages.is_empty() {
                        errors.fields.insert(name, messages);
                    }
                }
            }
            Ok(value) => errors.general = flatten_messages(value),
            Err(_) => errors.general.push(body.to_string()),
        }

        errors
    }

    /// All messages reported against `name`, joined into one line.
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|m| m.join(" "))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_empty()
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .general
            .iter()
            .cloned()
            .chain(
                self.fields
                    .iter()
                    .map(|(name, messages)| format!("{name}: {}", messages.join(" "))),
            )
            .collect::<Vec<_>>();

        f.write_str(&parts.join("; "))
    }
}

fn flatten_messages(value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => vec![s],
        Value::Array(items) => items.into_iter().flat_map(flatten_messages).collect(),
        Value::Object(map) => map
            .into_iter()
            .flat_map(|(name, value)| {
                flatten_messages(value)
                    .into_iter()
                    .map(move |m| format!("{name}: {m}"))
            })
            .collect(),
        other => vec![other.to_string()],
    }
}
