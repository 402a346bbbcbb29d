//! Structural rules over the emitted action list (E010–E013).

use std::collections::HashSet;

use serde_json::Value as Json;

use crate::error::CompilerError;
use crate::shortcut::{Shortcut, ShortcutAction};

/// Run all structural rules. Returns all errors found.
pub fn validate_structural(shortcut: &Shortcut) -> Vec<CompilerError> {
    let mut errors = Vec::new();

    e010_identifiers_are_qualified(&shortcut.actions, &mut errors);
    e011_control_flow_has_grouping(&shortcut.actions, &mut errors);
    e012_groups_are_nested(&shortcut.actions, &mut errors);
    e013_outputs_precede_references(&shortcut.actions, &mut errors);

    errors
}

fn e010_identifiers_are_qualified(actions: &[ShortcutAction], errors: &mut Vec<CompilerError>) {
    for (index, action) in actions.iter().enumerate() {
        let qualified = action
            .identifier
            .split('.')
            .filter(|part| !part.is_empty())
            .count()
            > 1;
        if !qualified {
            errors.push(CompilerError::emit(
                "E010",
                format!("Action {index} has invalid identifier '{}'", action.identifier),
            ));
        }
    }
}

fn e011_control_flow_has_grouping(actions: &[ShortcutAction], errors: &mut Vec<CompilerError>) {
    for (index, action) in actions.iter().enumerate() {
        if action.control_flow_mode().is_some() && action.grouping().is_none() {
            errors.push(CompilerError::emit(
                "E011",
                format!(
                    "Control flow action {index} ('{}') has no GroupingIdentifier",
                    action.short_identifier()
                ),
            ));
        }
    }
}

fn e012_groups_are_nested(actions: &[ShortcutAction], errors: &mut Vec<CompilerError>) {
    let mut open: Vec<(&str, &str)> = Vec::new();
    for (index, action) in actions.iter().enumerate() {
        let (Some(mode), Some(group)) = (action.control_flow_mode(), action.grouping()) else {
            continue;
        };
        match mode {
            0 => open.push((group, action.identifier.as_str())),
            1 | 2 => {
                let matches_top = open
                    .last()
                    .is_some_and(|(top, identifier)| *top == group && *identifier == action.identifier);
                if !matches_top {
                    errors.push(CompilerError::emit(
                        "E012",
                        format!("Action {index} continues group '{group}' out of order"),
                    ));
                    return;
                }
                if mode == 2 {
                    open.pop();
                }
            }
            other => {
                errors.push(CompilerError::emit(
                    "E012",
                    format!("Action {index} has unknown control flow mode {other}"),
                ));
                return;
            }
        }
    }
    for (group, _) in open {
        errors.push(CompilerError::emit("E012", format!("Group '{group}' is never closed")));
    }
}

fn e013_outputs_precede_references(actions: &[ShortcutAction], errors: &mut Vec<CompilerError>) {
    let mut seen = HashSet::new();
    for (index, action) in actions.iter().enumerate() {
        let mut referenced = Vec::new();
        for value in action.parameters.values() {
            collect_output_uuids(value, &mut referenced);
        }
        for uuid in referenced {
            if !seen.contains(uuid) {
                errors.push(CompilerError::emit(
                    "E013",
                    format!("Action {index} references output '{uuid}' before it exists"),
                ));
            }
        }
        if let Some(uuid) = action.uuid() {
            seen.insert(uuid);
        }
    }
}

fn collect_output_uuids<'a>(value: &'a Json, out: &mut Vec<&'a str>) {
    match value {
        Json::Object(map) => {
            if let Some(Json::String(uuid)) = map.get("OutputUUID") {
                out.push(uuid);
            }
            for nested in map.values() {
                collect_output_uuids(nested, out);
            }
        }
        Json::Array(items) => {
            for item in items {
                collect_output_uuids(item, out);
            }
        }
        _ => {}
    }
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

    fn codes(actions: Vec<ShortcutAction>) -> Vec<String> {
        let shortcut = Shortcut {
            actions,
            ..Shortcut::default()
        };
        validate_structural(&shortcut).into_iter().map(|e| e.code).collect()
    }

    #[test]
    fn well_formed_groups_pass() {
        let actions = vec![
            action("is.workflow.actions.conditional", json!({ "GroupingIdentifier": "G", "WFControlFlowMode": 0 })),
            action("is.workflow.actions.nothing", json!({})),
            action("is.workflow.actions.conditional", json!({ "GroupingIdentifier": "G", "WFControlFlowMode": 1 })),
            action("is.workflow.actions.nothing", json!({})),
            action("is.workflow.actions.conditional", json!({ "GroupingIdentifier": "G", "WFControlFlowMode": 2 })),
        ];
        assert!(codes(actions).is_empty());
    }

    #[test]
    fn unclosed_and_crossed_groups_fail() {
        let unclosed = vec![action(
            "is.workflow.actions.repeat.count",
            json!({ "GroupingIdentifier": "A", "WFControlFlowMode": 0 }),
        )];
        assert_eq!(codes(unclosed), vec!["E012"]);

        let crossed = vec![
            action("is.workflow.actions.repeat.count", json!({ "GroupingIdentifier": "A", "WFControlFlowMode": 0 })),
            action("is.workflow.actions.repeat.count", json!({ "GroupingIdentifier": "B", "WFControlFlowMode": 0 })),
            action("is.workflow.actions.repeat.count", json!({ "GroupingIdentifier": "A", "WFControlFlowMode": 2 })),
        ];
        assert_eq!(codes(crossed)[0], "E012");
    }

    #[test]
    fn dangling_output_references_fail() {
        let actions = vec![
            action(
                "is.workflow.actions.showresult",
                json!({ "Text": { "Value": { "OutputUUID": "U1", "OutputName": "x" } } }),
            ),
            action("is.workflow.actions.gettext", json!({ "UUID": "U1" })),
        ];
        assert_eq!(codes(actions), vec!["E013"]);
    }

    #[test]
    fn bare_identifiers_fail() {
        assert_eq!(codes(vec![action("gettext", json!({}))]), vec!["E010"]);
        assert_eq!(
            codes(vec![action("is.workflow.actions.repeat.count", json!({ "WFControlFlowMode": 0 }))]),
            vec!["E011"]
        );
    }
}
