//! Source identifiers for action outputs and variables.

use std::collections::{HashMap, HashSet};

use serde_json::Value as Json;

use crate::codegen::output::OutputNames;
use crate::parse::is_keyword;
use crate::shortcut::ShortcutAction;

/// Reduce a plist name to a Cherri identifier: dashes and spaces become
/// underscores, anything else outside `[A-Za-z0-9_]` is dropped. Keywords
/// get a trailing underscore.
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .filter_map(|c| match c {
            '-' | ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '_' => Some(c),
            _ => None,
        })
        .collect();
    if out.is_empty() {
        out.push_str("output");
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if is_keyword(&out) {
        out.push('_');
    }
    out
}

#[derive(Debug, Default)]
pub struct Names {
    outputs: HashMap<String, String>,
    uses: HashMap<String, usize>,
    control_outputs: HashSet<String>,
    appended: HashSet<String>,
}

impl Names {
    /// Allocate identifiers for every output in `actions`, in order.
    pub fn scan(actions: &[ShortcutAction]) -> Self {
        let mut names = Names::default();
        let mut allocator = OutputNames::default();
        for action in actions {
            if let (Some(name), Some(uuid)) = (action.param_str("CustomOutputName"), action.uuid()) {
                names.allocate(&mut allocator, uuid, name);
            }
            if action.control_flow_mode().is_some() {
                if let Some(uuid) = action.uuid() {
                    names.control_outputs.insert(uuid.to_string());
                }
            }
            if action.short_identifier() == "appendvariable" {
                if let Some(variable) = action.param_str("WFVariableName") {
                    names.appended.insert(sanitize(variable));
                }
            }
            let mut referenced = Vec::new();
            for value in action.parameters.values() {
                collect_outputs(value, &mut referenced);
            }
            for (uuid, name) in referenced {
                *names.uses.entry(uuid.to_string()).or_default() += 1;
                names.allocate(&mut allocator, uuid, name);
            }
        }
        names
    }

    fn allocate(&mut self, allocator: &mut OutputNames, uuid: &str, name: &str) {
        if !self.outputs.contains_key(uuid) {
            let identifier = allocator.fresh_name(&sanitize(name));
            self.outputs.insert(uuid.to_string(), identifier);
        }
    }

    pub fn output(&self, uuid: &str) -> Option<&str> {
        self.outputs.get(uuid).map(String::as_str)
    }

    /// How many parameters reference the output.
    pub fn uses(&self, uuid: &str) -> usize {
        self.uses.get(uuid).copied().unwrap_or(0)
    }

    /// The output belongs to a control flow block (If Result, Repeat
    /// Results, Menu Result).
    pub fn is_control_output(&self, uuid: &str) -> bool {
        self.control_outputs.contains(uuid)
    }

    /// Some `appendvariable` action targets the variable.
    pub fn is_appended(&self, variable: &str) -> bool {
        self.appended.contains(variable)
    }
}

fn collect_outputs<'a>(value: &'a Json, out: &mut Vec<(&'a str, &'a str)>) {
    match value {
        Json::Object(map) => {
            if let (Some(Json::String(uuid)), Some(Json::String(name))) =
                (map.get("OutputUUID"), map.get("OutputName"))
            {
                out.push((uuid, name));
            }
            for nested in map.values() {
                collect_outputs(nested, out);
            }
        }
        Json::Array(items) => {
            for item in items {
                collect_outputs(item, out);
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

    #[test]
    fn sanitizes_plist_names() {
        assert_eq!(sanitize("Repeat-Item 2"), "Repeat_Item_2");
        assert_eq!(sanitize("héllo!"), "hllo");
        assert_eq!(sanitize("1st"), "_1st");
        assert_eq!(sanitize("..."), "output");
        assert_eq!(sanitize("if"), "if_");
        assert_eq!(sanitize("menu"), "menu_");
    }

    #[test]
    fn outputs_get_unique_identifiers() {
        let actions = vec![
            action("is.workflow.actions.gettext", json!({ "CustomOutputName": "Text", "UUID": "A" })),
            action("is.workflow.actions.gettext", json!({ "CustomOutputName": "Text", "UUID": "B" })),
            action(
                "is.workflow.actions.appendvariable",
                json!({
                    "WFInput": { "Value": { "OutputName": "Text", "OutputUUID": "B", "Type": "ActionOutput" } },
                    "WFVariableName": "my list",
                }),
            ),
        ];
        let names = Names::scan(&actions);
        assert_eq!(names.output("A"), Some("Text"));
        assert_eq!(names.output("B"), Some("Text1"));
        assert_eq!(names.uses("B"), 1);
        assert_eq!(names.uses("A"), 0);
        assert!(names.is_appended("my_list"));
    }
}
