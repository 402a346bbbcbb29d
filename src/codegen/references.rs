//! Parameter values: variable attachments, text token strings and
//! dictionary field encoding.

use serde_json::{Map, Value as Json, json};

use super::Emitter;
use crate::error::CompilerError;
use crate::parse::types::{Refs, Template, Value, ValueType, VarRef, VariableKind};
use crate::parse::values::INLINE_REFERENCE;
use crate::tables;

/// Placeholder character standing in for each attachment in a token string.
pub const ATTACHMENT_CHARACTER: char = '\u{FFFC}';

/// A reference to the named output of an earlier action.
pub(crate) fn output_ref(name: &str, value_type: ValueType) -> VarRef {
    VarRef {
        name: name.to_string(),
        target: name.to_string(),
        kind: VariableKind::Variable,
        value_type,
        constant: true,
        repeat_item: false,
        get_as: None,
        coerce: None,
    }
}

impl Emitter<'_> {
    /// The `Value` dictionary of a reference: the variable or action output
    /// it points at plus its aggrandizements.
    pub(crate) fn variable_value(&mut self, var: &VarRef) -> Json {
        let mut value = Map::new();
        if var.constant {
            value.insert("OutputName".into(), json!(var.target));
            value.insert("OutputUUID".into(), json!(self.outputs.uuid_for(&var.target)));
            value.insert("Type".into(), json!("ActionOutput"));
        } else {
            value.insert("Type".into(), json!(var.kind.plist_type()));
            if var.kind == VariableKind::Variable {
                value.insert("VariableName".into(), json!(var.target));
            }
        }

        let mut aggrandizements = Vec::new();
        if let Some(key) = &var.get_as {
            if var.value_type == ValueType::Dictionary {
                aggrandizements.push(json!({
                    "Type": "WFDictionaryValueVariableAggrandizement",
                    "DictionaryKey": key,
                }));
            } else {
                aggrandizements.push(json!({
                    "Type": "WFPropertyVariableAggrandizement",
                    "PropertyName": key,
                    "PropertyUserInfo": 0,
                }));
            }
        }
        if let Some(class) = var.coerce.as_deref().and_then(tables::content_item) {
            aggrandizements.push(json!({
                "Type": "WFCoercionVariableAggrandizement",
                "CoercionItemClass": class,
            }));
        }
        if !aggrandizements.is_empty() {
            value.insert("Aggrandizements".into(), Json::Array(aggrandizements));
        }
        Json::Object(value)
    }

    pub(crate) fn attachment(&mut self, var: &VarRef) -> Json {
        json!({
            "Value": self.variable_value(var),
            "WFSerializationType": "WFTextTokenAttachment",
        })
    }

    /// Encode text with inline references. Each `{name}` site becomes one
    /// placeholder character, and `attachmentsByRange` is keyed by the
    /// placeholder's offset in characters, not bytes.
    pub(crate) fn token_string(&mut self, template: &Template) -> Json {
        let mut string = String::new();
        let mut attachments = Map::new();
        let mut offset = 0;
        let mut last = 0;
        for captures in INLINE_REFERENCE.captures_iter(&template.text) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let Some(base) = template.refs.get(&captures[1]) else {
                continue;
            };
            let mut var = base.clone();
            var.get_as = captures.get(2).map(|m| m.as_str().to_string());
            var.coerce = captures.get(3).map(|m| m.as_str().to_string());

            let before = &template.text[last..whole.start()];
            string.push_str(before);
            offset += before.chars().count();
            attachments.insert(format!("{{{offset}, 1}}"), self.variable_value(&var));
            string.push(ATTACHMENT_CHARACTER);
            offset += 1;
            last = whole.end();
        }
        string.push_str(&template.text[last..]);

        let mut value = Map::new();
        value.insert("string".into(), json!(string));
        if !attachments.is_empty() {
            value.insert("attachmentsByRange".into(), Json::Object(attachments));
        }
        json!({ "Value": value, "WFSerializationType": "WFTextTokenString" })
    }

    /// Plain text stays a plain string; text with references becomes a
    /// token string.
    pub(crate) fn text_param(&mut self, template: &Template) -> Json {
        if template.has_refs() {
            self.token_string(template)
        } else {
            json!(template.text)
        }
    }

    /// A text field that is always a token string, as dictionary keys,
    /// dictionary values and menu items are.
    pub(crate) fn text_field(&mut self, text: &str, refs: &Refs) -> Json {
        if text.is_empty() {
            return json!({ "WFSerializationType": "WFTextTokenString" });
        }
        self.token_string(&Template {
            text: text.to_string(),
            refs: refs.clone(),
        })
    }

    /// `text_field` for an arbitrary value, such as a menu item label.
    pub(crate) fn value_field(&mut self, value: &Value) -> Result<Json, CompilerError> {
        match value {
            Value::Text(template) => Ok(self.text_field(&template.text, &template.refs)),
            Value::Variable(var) => Ok(self.token_string(&Template::reference(var))),
            Value::Action(_) | Value::Expression(_) => {
                let var = self.materialize(value)?;
                Ok(self.token_string(&Template::reference(&var)))
            }
            other => {
                let text = other
                    .literal()
                    .map(|literal| match literal {
                        Json::String(s) => s,
                        other => other.to_string(),
                    })
                    .unwrap_or_default();
                Ok(self.text_field(&text, &Refs::new()))
            }
        }
    }

    /// Encode an argument for a parameter of type `handle_as`.
    pub(crate) fn encode_value(
        &mut self,
        arg: &Value,
        handle_as: ValueType,
    ) -> Result<Json, CompilerError> {
        Ok(match arg {
            Value::Nil => Json::Object(Map::new()),
            Value::Variable(var) => match handle_as {
                ValueType::Text | ValueType::RawText => self.token_string(&Template::reference(var)),
                _ => self.attachment(var),
            },
            Value::Text(template) => self.text_param(template),
            Value::RawText(text) => json!(text),
            Value::Number(n) => json!(n),
            Value::Float(f) => json!(f),
            Value::Bool(b) => json!(b),
            Value::Question(_) => json!(""),
            Value::Dictionary { entries, refs } => self.dictionary_value(entries, refs),
            Value::Array { items, refs } => {
                let mut encoded = Vec::with_capacity(items.len());
                for item in items {
                    encoded.push(self.array_element(item, refs));
                }
                Json::Array(encoded)
            }
            Value::Action(_) | Value::Expression(_) => {
                let var = self.materialize(arg)?;
                return self.encode_value(&Value::Variable(var), handle_as);
            }
        })
    }

    fn array_element(&mut self, item: &Json, refs: &Refs) -> Json {
        match item {
            Json::String(text) if INLINE_REFERENCE.is_match(text) && !refs.is_empty() => {
                self.token_string(&Template {
                    text: text.clone(),
                    refs: refs.clone(),
                })
            }
            other => other.clone(),
        }
    }

    /// `WFDictionaryFieldValue` for a JSON object literal.
    pub(crate) fn dictionary_value(&mut self, entries: &Map<String, Json>, refs: &Refs) -> Json {
        let mut items = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            items.push(self.dictionary_item(Some(key), value, refs));
        }
        json!({
            "Value": { "WFDictionaryFieldValueItems": items },
            "WFSerializationType": "WFDictionaryFieldValue",
        })
    }

    /// One dictionary field. Item types: text 0, dictionary 1, array 2,
    /// number 3, boolean 4. Array elements carry no key.
    fn dictionary_item(&mut self, key: Option<&str>, value: &Json, refs: &Refs) -> Json {
        let (item_type, field) = match value {
            Json::String(text) => (0, self.text_field(text, refs)),
            Json::Null => (0, self.text_field("", refs)),
            Json::Number(n) => (3, self.text_field(&n.to_string(), refs)),
            Json::Bool(b) => (
                4,
                json!({ "Value": b, "WFSerializationType": "WFNumberSubstitutableState" }),
            ),
            Json::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.dictionary_item(None, element, refs));
                }
                (
                    2,
                    json!({ "Value": items, "WFSerializationType": "WFArrayParameterState" }),
                )
            }
            Json::Object(map) => (
                1,
                json!({
                    "Value": self.dictionary_value(map, refs),
                    "WFSerializationType": "WFDictionaryFieldValue",
                }),
            ),
        };
        let mut item = Map::new();
        item.insert("WFItemType".into(), json!(item_type));
        if let Some(key) = key {
            item.insert("WFKey".into(), self.text_field(key, refs));
        }
        item.insert("WFValue".into(), field);
        Json::Object(item)
    }

    /// Emit `value` as a producer with a fresh output name and return a
    /// reference to that output.
    pub(crate) fn materialize(&mut self, value: &Value) -> Result<VarRef, CompilerError> {
        let (base, value_type) = match value {
            Value::Action(call) => (
                call.name.as_str(),
                call.output_type.unwrap_or(ValueType::Variable),
            ),
            Value::Expression(_) => ("expression", ValueType::Number),
            Value::Text(_) | Value::RawText(_) | Value::Question(_) => ("text", ValueType::Text),
            Value::Number(_) | Value::Bool(_) => ("number", ValueType::Number),
            Value::Float(_) => ("number", ValueType::Float),
            Value::Dictionary { .. } => ("dictionary", ValueType::Dictionary),
            Value::Array { .. } => ("list", ValueType::Array),
            Value::Variable(var) => return Ok(var.clone()),
            Value::Nil => ("value", ValueType::Variable),
        };
        let name = self.outputs.fresh_name(base);
        self.produce(value, &name)?;
        Ok(output_ref(&name, value_type))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::emit;
    use super::*;

    #[test]
    fn attachment_offsets_count_characters() {
        let (shortcut, _) = emit("@name = \"Ada\"\n@s = \"héllo {name}!\"").unwrap();
        let text = shortcut.actions[2].param("WFTextActionText").unwrap();
        assert_eq!(text["WFSerializationType"], "WFTextTokenString");
        assert_eq!(text["Value"]["string"], "héllo \u{FFFC}!");
        let attachments = text["Value"]["attachmentsByRange"].as_object().unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments["{6, 1}"]["VariableName"], "name");
        assert_eq!(attachments["{6, 1}"]["Type"], "Variable");
    }

    #[test]
    fn each_site_gets_its_own_aggrandizements() {
        let (shortcut, _) =
            emit("@x = \"1\"\n@y = {\"k\": \"v\"}\n@s = \"a{x}b{y['k']}c\"").unwrap();
        let text = &shortcut.actions.last().unwrap().param("WFInput").unwrap()["Value"];
        let producer = shortcut
            .actions
            .iter()
            .rev()
            .find(|a| a.short_identifier() == "gettext")
            .unwrap();
        assert_eq!(text["OutputName"], "s");
        let value = &producer.param("WFTextActionText").unwrap()["Value"];
        assert_eq!(value["string"], "a\u{FFFC}b\u{FFFC}c");
        let attachments = value["attachmentsByRange"].as_object().unwrap();
        assert_eq!(attachments.len(), 2);
        assert!(attachments["{1, 1}"].get("Aggrandizements").is_none());
        assert_eq!(
            attachments["{3, 1}"]["Aggrandizements"][0],
            json!({ "Type": "WFDictionaryValueVariableAggrandizement", "DictionaryKey": "k" })
        );
    }

    #[test]
    fn property_is_read_before_coercion() {
        let (shortcut, _) = emit("show(\"{ShortcutInput['name'].text}\")").unwrap();
        let value = &shortcut.actions[0].param("Text").unwrap()["Value"];
        let attachment = &value["attachmentsByRange"]["{0, 1}"];
        assert_eq!(attachment["Type"], "ExtensionInput");
        assert!(attachment.get("VariableName").is_none());
        assert_eq!(
            attachment["Aggrandizements"],
            json!([
                { "Type": "WFPropertyVariableAggrandizement", "PropertyName": "name", "PropertyUserInfo": 0 },
                { "Type": "WFCoercionVariableAggrandizement", "CoercionItemClass": "WFStringContentItem" },
            ])
        );
    }

    #[test]
    fn dictionary_key_is_read_before_coercion() {
        let (shortcut, _) = emit("@d = {\"k\": \"v\"}\nshow(\"{d['k'].text}\")").unwrap();
        let value = &shortcut.actions.last().unwrap().param("Text").unwrap()["Value"];
        assert_eq!(
            value["attachmentsByRange"]["{0, 1}"]["Aggrandizements"],
            json!([
                { "Type": "WFDictionaryValueVariableAggrandizement", "DictionaryKey": "k" },
                { "Type": "WFCoercionVariableAggrandizement", "CoercionItemClass": "WFStringContentItem" },
            ])
        );
    }

    #[test]
    fn constants_are_referenced_by_output() {
        let (shortcut, _) = emit("const c = 5\nwait(c)").unwrap();
        let uuid = shortcut.actions[0].uuid().unwrap().to_string();
        let delay = shortcut.actions[1].param("WFDelayTime").unwrap();
        assert_eq!(delay["Value"]["Type"], "ActionOutput");
        assert_eq!(delay["Value"]["OutputName"], "c");
        assert_eq!(delay["Value"]["OutputUUID"], json!(uuid));
    }

    #[test]
    fn dictionary_fields_are_typed() {
        let (shortcut, _) = emit(
            "@d = {\"s\": \"\", \"n\": 2, \"b\": true, \"l\": [\"x\"], \"o\": {\"k\": \"v\"}}",
        )
        .unwrap();
        let items = &shortcut.actions[0].param("WFItems").unwrap()["Value"]["WFDictionaryFieldValueItems"];
        let types: Vec<i64> = items
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["WFItemType"].as_i64().unwrap())
            .collect();
        assert_eq!(types, vec![0, 3, 4, 2, 1]);
        assert_eq!(items[0]["WFValue"], json!({ "WFSerializationType": "WFTextTokenString" }));
        assert_eq!(items[1]["WFValue"]["Value"]["string"], "2");
        assert_eq!(
            items[0]["WFKey"],
            json!({ "Value": { "string": "s" }, "WFSerializationType": "WFTextTokenString" })
        );
        assert!(items[3]["WFValue"]["Value"][0].get("WFKey").is_none());
        assert_eq!(items[4]["WFValue"]["WFSerializationType"], "WFDictionaryFieldValue");
    }

    #[test]
    fn inline_calls_are_materialized_first() {
        let (shortcut, _) = emit("show(text(\"a\"))").unwrap();
        assert_eq!(shortcut.actions.len(), 2);
        assert_eq!(shortcut.actions[0].param_str("CustomOutputName"), Some("text"));
        let shown = &shortcut.actions[1].param("Text").unwrap()["Value"];
        assert_eq!(shown["attachmentsByRange"]["{0, 1}"]["OutputName"], "text");
    }
}
