//! Parameter values back to source: references, token strings, dictionaries
//! and plain literals.

use std::collections::HashMap;

use serde_json::{Map, Value as Json};

use super::Decompiler;
use super::names::sanitize;
use crate::codegen::ATTACHMENT_CHARACTER;
use crate::context::GLOBALS;
use crate::error::Diagnostic;
use crate::parse::values::INLINE_REFERENCE;
use crate::tables;

/// A Cherri string literal.
pub fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A Cherri raw string literal. Raw strings never interpolate `{name}`.
pub fn raw_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "\\'"))
}

/// JSON with a space after `:` and `,`, as dictionary literals are written.
pub fn json_literal(value: &Json) -> String {
    match value {
        Json::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{}: {}", Json::String(key.clone()), json_literal(value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Json::Array(items) => {
            let items: Vec<String> = items.iter().map(json_literal).collect();
            format!("[{}]", items.join(", "))
        }
        other => other.to_string(),
    }
}

fn serialization_type(value: &Json) -> Option<&str> {
    value.get("WFSerializationType").and_then(Json::as_str)
}

/// `"{12, 1}"` → `12`.
fn range_offset(key: &str) -> Option<usize> {
    key.trim_start_matches('{').split(',').next()?.trim().parse().ok()
}

impl Decompiler<'_> {
    pub(crate) fn warn(&mut self, code: &'static str, message: impl Into<String>) {
        self.warnings.push(Diagnostic {
            code,
            message: message.into(),
            location: None,
        });
    }

    /// Source form of a reference `Value` dictionary, including its
    /// aggrandizements: `name`, `name['key']`, `name.coerce`.
    pub(crate) fn reference(&mut self, value: &Json) -> String {
        let kind = value.get("Type").and_then(Json::as_str).unwrap_or_default();
        let mut out = match kind {
            "Variable" => {
                let name = value.get("VariableName").and_then(Json::as_str).unwrap_or_default();
                self.variable_name(name)
            }
            "ActionOutput" => self.output_name(value),
            other => match GLOBALS
                .iter()
                .find(|(_, target, global_kind, _)| {
                    global_kind.plist_type() == other && !target.starts_with("Repeat ")
                }) {
                Some((global, ..)) => global.to_string(),
                None => {
                    self.warn("W011", format!("Unknown reference type '{other}'"));
                    sanitize(other)
                }
            },
        };

        let mut key = None;
        let mut coerce = None;
        let aggrandizements = value.get("Aggrandizements").and_then(Json::as_array);
        for aggrandizement in aggrandizements.into_iter().flatten() {
            let field = |name: &str| aggrandizement.get(name).and_then(Json::as_str);
            match field("Type").unwrap_or_default() {
                "WFCoercionVariableAggrandizement" => {
                    coerce = field("CoercionItemClass").and_then(tables::content_item_name);
                }
                "WFDictionaryValueVariableAggrandizement" => key = field("DictionaryKey"),
                "WFPropertyVariableAggrandizement" => key = field("PropertyName"),
                other => {
                    let other = other.to_string();
                    self.warn("W011", format!("Unknown aggrandizement '{other}' on '{out}'"));
                }
            }
        }
        if let Some(key) = key {
            out.push_str(&format!("['{key}']"));
        }
        if let Some(coerce) = coerce {
            out.push('.');
            out.push_str(coerce);
        }
        out
    }

    fn output_name(&mut self, value: &Json) -> String {
        let uuid = value.get("OutputUUID").and_then(Json::as_str).unwrap_or_default();
        let written = value.get("OutputName").and_then(Json::as_str).unwrap_or_default();
        if self.names.is_control_output(uuid) {
            self.warn(
                "W010",
                format!("'{written}' is the implicit output of a control flow block"),
            );
        }
        match self.names.output(uuid) {
            Some(name) => name.to_string(),
            None => {
                self.warn("W011", format!("Output '{written}' is never produced"));
                sanitize(written)
            }
        }
    }

    /// Loop aliases for `Repeat Item`, `Repeat Index 2` and so on; plain
    /// variable names otherwise.
    pub(crate) fn variable_name(&self, name: &str) -> String {
        for (base, global) in [("Repeat Item", "RepeatItem"), ("Repeat Index", "RepeatIndex")] {
            let Some(rest) = name.strip_prefix(base) else {
                continue;
            };
            let depth = match rest.trim() {
                "" => Some(1),
                n => n.parse::<usize>().ok(),
            };
            if let Some(depth) = depth {
                return self
                    .loop_alias(depth)
                    .map(str::to_string)
                    .unwrap_or_else(|| global.to_string());
            }
        }
        sanitize(name)
    }

    /// A `WFTextTokenAttachment` parameter as a reference.
    pub(crate) fn attachment(&mut self, param: &Json) -> Option<String> {
        if serialization_type(param) != Some("WFTextTokenAttachment") {
            return None;
        }
        let value = param.get("Value")?.clone();
        Some(self.reference(&value))
    }

    /// Text of a plain string or a `WFTextTokenString`, with each attachment
    /// written back as `{reference}`.
    pub(crate) fn token_text(&mut self, param: &Json) -> Option<String> {
        if let Json::String(text) = param {
            return Some(text.clone());
        }
        if serialization_type(param) != Some("WFTextTokenString") {
            return None;
        }
        let Some(value) = param.get("Value") else {
            return Some(String::new());
        };
        let string = value.get("string").and_then(Json::as_str).unwrap_or_default();
        let empty = Map::new();
        let attachments = value
            .get("attachmentsByRange")
            .and_then(Json::as_object)
            .unwrap_or(&empty);
        let mut by_offset = HashMap::new();
        for (range, reference) in attachments {
            if let Some(offset) = range_offset(range) {
                by_offset.insert(offset, reference.clone());
            }
        }

        let mut out = String::with_capacity(string.len());
        for (offset, c) in string.chars().enumerate() {
            match by_offset.get(&offset) {
                Some(reference) if c == ATTACHMENT_CHARACTER => {
                    let reference = self.reference(reference);
                    out.push('{');
                    out.push_str(&reference);
                    out.push('}');
                }
                _ => out.push(c),
            }
        }
        Some(out)
    }

    /// Literal text as source. Text that would read as an inline reference
    /// is written as a raw string; a backslash rules that out, so it is
    /// written as is with a warning.
    pub(crate) fn text_literal(&mut self, text: &str) -> String {
        if !INLINE_REFERENCE.is_match(text) {
            return string_literal(text);
        }
        if !text.contains('\\') {
            return raw_literal(text);
        }
        self.warn("W015", format!("Text '{text}' reads as an inline reference"));
        string_literal(text)
    }

    /// A plain string or a `WFTextTokenString` as a string literal.
    pub(crate) fn token_literal(&mut self, param: &Json) -> Option<String> {
        let text = self.token_text(param)?;
        let value = param.get("Value");
        let attached = value
            .and_then(|value| value.get("attachmentsByRange"))
            .and_then(Json::as_object)
            .is_some_and(|attachments| !attachments.is_empty());
        if !attached {
            return Some(self.text_literal(&text));
        }
        let literal = value
            .and_then(|value| value.get("string"))
            .and_then(Json::as_str)
            .unwrap_or_default();
        if INLINE_REFERENCE.is_match(literal) {
            self.warn("W015", format!("Text '{literal}' has braces that read as inline references"));
        }
        Some(string_literal(&text))
    }

    /// Source for a parameter value, or `None` when it has no source form.
    pub(crate) fn value(&mut self, param: &Json) -> Option<String> {
        match param {
            Json::String(text) => Some(self.text_literal(text)),
            Json::Number(n) => Some(n.to_string()),
            Json::Bool(b) => Some(b.to_string()),
            Json::Array(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    elements.push(self.json_element(item)?);
                }
                Some(json_literal(&Json::Array(elements)))
            }
            Json::Object(_) => match serialization_type(param)? {
                "WFTextTokenString" => self.token_literal(param),
                "WFTextTokenAttachment" => self.attachment(param),
                "WFDictionaryFieldValue" => {
                    let dictionary = self.dictionary(param)?;
                    Some(json_literal(&dictionary))
                }
                _ => None,
            },
            Json::Null => None,
        }
    }

    /// An element of a list literal.
    fn json_element(&mut self, item: &Json) -> Option<Json> {
        match item {
            Json::String(_) | Json::Number(_) | Json::Bool(_) => Some(item.clone()),
            Json::Object(_) if serialization_type(item) == Some("WFTextTokenString") => {
                self.token_text(item).map(Json::String)
            }
            Json::Object(_) if serialization_type(item) == Some("WFDictionaryFieldValue") => {
                self.dictionary(item)
            }
            _ => None,
        }
    }

    /// A `WFDictionaryFieldValue` as the JSON object it was written as.
    pub(crate) fn dictionary(&mut self, param: &Json) -> Option<Json> {
        let items = param
            .get("Value")
            .and_then(|value| value.get("WFDictionaryFieldValueItems"))
            .and_then(Json::as_array)
            .cloned()
            .unwrap_or_default();
        let mut map = Map::new();
        for item in &items {
            let key = self.token_text(item.get("WFKey")?)?;
            let value = self.dictionary_field(item)?;
            map.insert(key, value);
        }
        Some(Json::Object(map))
    }

    fn dictionary_field(&mut self, item: &Json) -> Option<Json> {
        let field = item.get("WFValue")?;
        let item_type = item.get("WFItemType").and_then(Json::as_i64).unwrap_or(0);
        match item_type {
            0 => self.token_text(field).map(Json::String),
            1 => self.dictionary(field.get("Value")?),
            2 => {
                let elements = field.get("Value").and_then(Json::as_array).cloned().unwrap_or_default();
                let mut out = Vec::with_capacity(elements.len());
                for element in &elements {
                    out.push(self.dictionary_field(element)?);
                }
                Some(Json::Array(out))
            }
            3 => {
                let text = self.token_text(field)?;
                Some(match text.parse::<i64>() {
                    Ok(n) => Json::from(n),
                    Err(_) => text
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map_or(Json::String(text), Json::Number),
                })
            }
            4 => field.get("Value").and_then(Json::as_bool).map(Json::Bool),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literals_escape() {
        assert_eq!(string_literal("a\"b\\c\nd"), r#""a\"b\\c\nd""#);
    }

    #[test]
    fn raw_literals_escape_single_quotes() {
        assert_eq!(raw_literal("it's {x}"), r"'it\'s {x}'");
    }

    #[test]
    fn json_literals_are_spaced() {
        let value = serde_json::json!({ "a": 1, "b": ["x", true], "c": { "d": "{name}" } });
        assert_eq!(
            json_literal(&value),
            r#"{"a": 1, "b": ["x", true], "c": {"d": "{name}"}}"#
        );
    }

    #[test]
    fn range_keys() {
        assert_eq!(range_offset("{12, 1}"), Some(12));
        assert_eq!(range_offset("{0, 1}"), Some(0));
        assert_eq!(range_offset("bad"), None);
    }
}
