//! Picks the catalog entry that best explains an action.
//!
//! Candidates share the action's identifier. An entry is eligible when the
//! fixed parameters it always adds are present with the same values and its
//! parameters account for every observed key. Among eligible entries the
//! score is (parameter keys present, fixed or enum/default values equal).
//! A `default_action` entry whose parameters all appear wins outright.

use serde_json::Value as Json;

use crate::catalog::{ActionDefinition, Catalog, EnumSource, ParamEmitter, Params};
use crate::error::CompilerError;
use crate::parse::types::{Value, ValueType};
use crate::shortcut::ShortcutAction;

/// Keys every named action may carry regardless of its catalog entry.
pub const OUTPUT_KEYS: &[&str] = &["UUID", "CustomOutputName", "AppIntentDescriptor"];

/// Stands in for the emitter when computing an entry's fixed parameters.
struct LiteralEmitter;

impl ParamEmitter for LiteralEmitter {
    fn param_value(&mut self, arg: &Value, _: ValueType) -> Result<Json, CompilerError> {
        Ok(arg.literal().unwrap_or(Json::Null))
    }
}

pub fn fixed_params(definition: &ActionDefinition) -> Option<Params> {
    match definition.add_params {
        Some(add_params) => add_params(&mut LiteralEmitter, &[]).ok(),
        None => Some(Params::new()),
    }
}

fn value_matches(parameter_enum: Option<&EnumSource>, default: Option<&Json>, observed: &Json) -> bool {
    if default == Some(observed) {
        return true;
    }
    match (parameter_enum, observed.as_str()) {
        (Some(EnumSource::Values(values)), Some(observed)) => values.iter().any(|v| v == observed),
        _ => false,
    }
}

/// The best catalog entry for `action`, if any is eligible.
pub fn best_match<'c>(
    catalog: &'c Catalog,
    action: &ShortcutAction,
) -> Option<(&'c str, &'c ActionDefinition)> {
    let mut best: Option<((usize, usize), &'c str, &'c ActionDefinition)> = None;
    for (name, definition) in catalog.candidates(&action.identifier) {
        if definition.make.is_some() {
            continue;
        }
        let Some(fixed) = fixed_params(definition) else {
            continue;
        };
        if fixed.iter().any(|(key, value)| action.param(key) != Some(value)) {
            continue;
        }
        let covered = action.parameters.keys().all(|key| {
            OUTPUT_KEYS.contains(&key.as_str())
                || fixed.contains_key(key)
                || definition.parameters.iter().any(|p| &p.key == key)
        });
        if !covered {
            continue;
        }

        let present: Vec<_> = definition
            .parameters
            .iter()
            .filter(|p| !p.key.is_empty() && action.param(&p.key).is_some())
            .collect();
        if definition.default_action && present.len() == definition.parameters.len() {
            return Some((name, definition));
        }
        let equal = fixed.len()
            + present
                .iter()
                .filter(|p| {
                    action.param(&p.key).is_some_and(|observed| {
                        value_matches(p.enumeration.as_ref(), p.default_value.as_ref(), observed)
                    })
                })
                .count();
        let score = (present.len(), equal);
        let better = match &best {
            None => true,
            Some((best_score, _, best_definition)) => {
                score > *best_score
                    || (score == *best_score && definition.default_action && !best_definition.default_action)
            }
        };
        if better {
            best = Some((score, name, definition));
        }
    }
    best.map(|(_, name, definition)| (name, definition))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn action(identifier: &str, parameters: Json) -> ShortcutAction {
        let Json::Object(parameters) = parameters else {
            panic!("parameters must be an object");
        };
        ShortcutAction::new(identifier, parameters)
    }

    fn matched(parameters: Json, identifier: &str) -> Option<&'static str> {
        static CATALOG: std::sync::LazyLock<Catalog> = std::sync::LazyLock::new(Catalog::standard);
        best_match(&CATALOG, &action(identifier, parameters)).map(|(name, _)| name)
    }

    #[test]
    fn fixed_parameters_pick_the_variant() {
        let alert = json!({ "WFAlertActionMessage": "hi", "WFAlertActionCancelButtonShown": false });
        let confirm = json!({ "WFAlertActionMessage": "hi", "WFAlertActionCancelButtonShown": true });
        assert_eq!(matched(alert, "is.workflow.actions.alert"), Some("alert"));
        assert_eq!(matched(confirm, "is.workflow.actions.alert"), Some("confirm"));
    }

    #[test]
    fn default_entries_win_when_their_parameters_appear() {
        let get = json!({
            "WFGetDictionaryValueType": "Value",
            "WFInput": "x",
            "WFDictionaryKey": "k",
        });
        assert_eq!(matched(get, "is.workflow.actions.getvalueforkey"), Some("getValue"));
        let keys = json!({ "WFGetDictionaryValueType": "All Keys", "WFInput": "x" });
        assert_eq!(matched(keys, "is.workflow.actions.getvalueforkey"), Some("getKeys"));
    }

    #[test]
    fn unexplained_keys_have_no_match() {
        let unknown = json!({ "WFAlertActionMessage": "hi", "Mystery": 1 });
        assert_eq!(matched(unknown, "is.workflow.actions.alert"), None);
        assert_eq!(matched(json!({}), "com.example.unknown"), None);
    }

    #[test]
    fn output_keys_are_always_allowed() {
        let text = json!({ "WFTextActionText": "a", "CustomOutputName": "t", "UUID": "U" });
        assert_eq!(matched(text, "is.workflow.actions.gettext"), Some("text"));
    }
}
