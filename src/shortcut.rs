//! The Shortcut property-list tree handed to the plist marshaller.
//!
//! Field names follow the Shortcuts schema verbatim. Action parameters stay
//! as an ordered JSON-shaped map so any serde format can marshal them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::tables;

pub type Params = Map<String, Json>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowIcon {
    #[serde(rename = "WFWorkflowIconGlyphNumber")]
    pub glyph_number: i64,
    #[serde(rename = "WFWorkflowIconStartColor")]
    pub start_color: i64,
}

impl Default for WorkflowIcon {
    fn default() -> Self {
        WorkflowIcon {
            glyph_number: tables::DEFAULT_GLYPH,
            start_color: tables::DEFAULT_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShortcutAction {
    #[serde(rename = "WFWorkflowActionIdentifier")]
    pub identifier: String,
    #[serde(rename = "WFWorkflowActionParameters", default)]
    pub parameters: Params,
}

impl ShortcutAction {
    pub fn new(identifier: impl Into<String>, parameters: Params) -> Self {
        ShortcutAction {
            identifier: identifier.into(),
            parameters,
        }
    }

    /// The identifier with the standard `is.workflow.actions.` prefix removed.
    pub fn short_identifier(&self) -> &str {
        self.identifier
            .strip_prefix("is.workflow.actions.")
            .unwrap_or(&self.identifier)
    }

    pub fn param(&self, key: &str) -> Option<&Json> {
        self.parameters.get(key)
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Json::as_str)
    }

    pub fn param_i64(&self, key: &str) -> Option<i64> {
        self.parameters.get(key).and_then(|v| match v {
            Json::Number(n) => n.as_i64(),
            Json::String(s) => s.parse().ok(),
            _ => None,
        })
    }

    pub fn uuid(&self) -> Option<&str> {
        self.param_str("UUID")
    }

    pub fn grouping(&self) -> Option<&str> {
        self.param_str("GroupingIdentifier")
    }

    pub fn control_flow_mode(&self) -> Option<i64> {
        self.param_i64("WFControlFlowMode")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportQuestion {
    #[serde(rename = "ParameterKey")]
    pub parameter_key: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "ActionIndex")]
    pub action_index: usize,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "DefaultValue")]
    pub default_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoInputBehavior {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Parameters", default)]
    pub parameters: Map<String, Json>,
}

impl NoInputBehavior {
    pub const SHOW_ERROR: &'static str = "WFWorkflowNoInputBehaviorShowError";
    pub const ASK_FOR_INPUT: &'static str = "WFWorkflowNoInputBehaviorAskForInput";
    pub const GET_CLIPBOARD: &'static str = "WFWorkflowNoInputBehaviorGetClipboard";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortcut {
    #[serde(rename = "WFWorkflowName", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "WFWorkflowIcon", default)]
    pub icon: WorkflowIcon,
    #[serde(rename = "WFWorkflowClientVersion", default)]
    pub client_version: String,
    #[serde(rename = "WFWorkflowMinimumClientVersion", default)]
    pub minimum_client_version: i64,
    #[serde(rename = "WFWorkflowMinimumClientVersionString", default)]
    pub minimum_client_version_string: String,
    #[serde(rename = "WFWorkflowHasShortcutInputVariables", default)]
    pub has_shortcut_input_variables: bool,
    #[serde(rename = "WFWorkflowHasOutputFallback", default)]
    pub has_output_fallback: bool,
    #[serde(rename = "WFWorkflowTypes", default)]
    pub types: Vec<String>,
    #[serde(rename = "WFQuickActionSurfaces", default)]
    pub quick_action_surfaces: Vec<String>,
    #[serde(rename = "WFWorkflowInputContentItemClasses", default)]
    pub input_content_item_classes: Vec<String>,
    #[serde(rename = "WFWorkflowOutputContentItemClasses", default)]
    pub output_content_item_classes: Vec<String>,
    #[serde(rename = "WFWorkflowImportQuestions", default)]
    pub import_questions: Vec<ImportQuestion>,
    #[serde(
        rename = "WFWorkflowNoInputBehavior",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub no_input_behavior: Option<NoInputBehavior>,
    #[serde(rename = "WFWorkflowActions", default)]
    pub actions: Vec<ShortcutAction>,
}

impl Default for Shortcut {
    fn default() -> Self {
        Shortcut {
            name: None,
            icon: WorkflowIcon::default(),
            client_version: String::new(),
            minimum_client_version: tables::MINIMUM_CLIENT_VERSION,
            minimum_client_version_string: tables::MINIMUM_CLIENT_VERSION.to_string(),
            has_shortcut_input_variables: false,
            has_output_fallback: false,
            types: Vec::new(),
            quick_action_surfaces: Vec::new(),
            input_content_item_classes: Vec::new(),
            output_content_item_classes: Vec::new(),
            import_questions: Vec::new(),
            no_input_behavior: None,
            actions: Vec::new(),
        }
    }
}

impl Shortcut {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_schema_keys() {
        let shortcut = Shortcut {
            actions: vec![ShortcutAction::new("is.workflow.actions.nothing", Params::new())],
            ..Shortcut::default()
        };
        let json = serde_json::to_value(&shortcut).unwrap();
        assert_eq!(json["WFWorkflowMinimumClientVersion"], 900);
        assert_eq!(json["WFWorkflowMinimumClientVersionString"], "900");
        assert_eq!(json["WFWorkflowIcon"]["WFWorkflowIconGlyphNumber"], 61440);
        assert_eq!(
            json["WFWorkflowActions"][0]["WFWorkflowActionIdentifier"],
            "is.workflow.actions.nothing"
        );
        assert!(json.get("WFWorkflowNoInputBehavior").is_none());
    }

    #[test]
    fn deserializes_sparse_workflows() {
        let shortcut = Shortcut::from_json(
            r#"{"WFWorkflowActions":[{"WFWorkflowActionIdentifier":"is.workflow.actions.alert"}]}"#,
        )
        .unwrap();
        assert_eq!(shortcut.actions[0].short_identifier(), "alert");
        assert!(shortcut.actions[0].parameters.is_empty());
        assert_eq!(shortcut.icon, WorkflowIcon::default());
    }
}
