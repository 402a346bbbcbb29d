//! Pipeline-scoped state shared by the preprocessor, parser and emitter.
//!
//! One `Context` lives for exactly one compilation; nothing here is global,
//! so the compiler can be driven repeatedly in one process.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{Catalog, ParameterDefinition};
use crate::error::{CompilerError, Diagnostic};
use crate::parse::types::{Token, Value, ValueType, VarRef, VariableKind};
use crate::shortcut::NoInputBehavior;
use crate::source::Origin;
use crate::tables;

// =============================================================================
// Options
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Path of the main file. Relative includes resolve against its directory.
    pub file_path: String,
    /// Emit `comment` actions for source comments.
    pub comments: bool,
    /// Version selector, as accepted by `#define version`.
    pub min_version: Option<String>,
    /// Workflow name used when the source has no `#define name`.
    pub name: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            file_path: "main.cherri".into(),
            comments: false,
            min_version: None,
            name: None,
        }
    }
}

// =============================================================================
// Metadata
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub name: Option<String>,
    pub glyph: i64,
    pub color: i64,
    pub client_version: String,
    pub ios_version: f64,
    /// Declared input content-item classes. Empty means "accept everything".
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub types: Vec<String>,
    pub quick_actions: Vec<String>,
    pub no_input: Option<NoInputBehavior>,
    pub mac: Option<bool>,
}

impl Default for Metadata {
    fn default() -> Self {
        let (client_version, ios_version) =
            tables::version(tables::DEFAULT_VERSION).unwrap_or(("4033.0.4.3", 26.0));
        Metadata {
            name: None,
            glyph: tables::DEFAULT_GLYPH,
            color: tables::DEFAULT_COLOR,
            client_version: client_version.into(),
            ios_version,
            inputs: Vec::new(),
            outputs: Vec::new(),
            types: Vec::new(),
            quick_actions: Vec::new(),
            no_input: None,
            mac: None,
        }
    }
}

impl Metadata {
    pub fn set_version(&mut self, selector: &str) -> Result<(), String> {
        let (client, ios) = tables::version(selector).ok_or_else(|| {
            let list: Vec<(&str, ())> = tables::VERSIONS.iter().map(|(v, _, _)| (*v, ())).collect();
            format!(
                "Invalid version '{selector}'\n\n{}",
                tables::key_list("Available versions:", &list)
            )
        })?;
        self.client_version = client.into();
        self.ios_version = ios;
        Ok(())
    }
}

// =============================================================================
// Variables
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct VariableValue {
    pub kind: VariableKind,
    pub value_type: ValueType,
    /// The last value bound, used to resolve variable-to-variable chains.
    pub value: Option<Value>,
    pub constant: bool,
    pub repeat_item: bool,
    /// Type written in an explicit `@name: type` declaration.
    pub declared: Option<ValueType>,
}

impl VariableValue {
    pub fn new(value_type: ValueType, value: Option<Value>, constant: bool) -> Self {
        VariableValue {
            kind: VariableKind::Variable,
            value_type,
            value,
            constant,
            repeat_item: false,
            declared: None,
        }
    }

    pub fn reference(&self, name: &str) -> VarRef {
        VarRef {
            name: name.into(),
            target: name.into(),
            kind: self.kind,
            value_type: self.value_type,
            constant: self.constant,
            repeat_item: self.repeat_item,
            get_as: None,
            coerce: None,
        }
    }
}

/// Built-in names: source identifier, plist target, kind and value type.
pub const GLOBALS: &[(&str, &str, VariableKind, ValueType)] = &[
    ("ShortcutInput", "ShortcutInput", VariableKind::ExtensionInput, ValueType::Variable),
    ("CurrentDate", "CurrentDate", VariableKind::CurrentDate, ValueType::Variable),
    ("Clipboard", "Clipboard", VariableKind::Clipboard, ValueType::Variable),
    ("Device", "Device", VariableKind::DeviceDetails, ValueType::Variable),
    ("Ask", "Ask", VariableKind::Ask, ValueType::Variable),
    ("RepeatItem", "Repeat Item", VariableKind::Variable, ValueType::Variable),
    ("RepeatIndex", "Repeat Index", VariableKind::Variable, ValueType::Number),
];

pub fn is_global(name: &str) -> bool {
    GLOBALS.iter().any(|(global, ..)| *global == name)
}

pub fn global(name: &str) -> Option<VarRef> {
    GLOBALS
        .iter()
        .find(|(global, ..)| *global == name)
        .map(|(global, target, kind, value_type)| VarRef {
            name: global.to_string(),
            target: target.to_string(),
            kind: *kind,
            value_type: *value_type,
            constant: false,
            repeat_item: target.starts_with("Repeat "),
            get_as: None,
            coerce: None,
        })
}

// =============================================================================
// Questions, user actions, includes
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub identifier: String,
    pub text: String,
    pub default_value: String,
    /// Parameter key and action index, filled in when the question is wired.
    pub wired: Option<(String, usize)>,
    pub used: bool,
}

/// A user-defined action, declared with `action name(...) { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAction {
    pub name: String,
    pub parameters: Vec<ParameterDefinition>,
    pub output_type: Option<ValueType>,
    pub body: Vec<String>,
    pub body_origins: Vec<Origin>,
    pub used: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncludeRecord {
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
}

// =============================================================================
// Context
// =============================================================================

pub struct Context {
    pub options: CompileOptions,
    pub catalog: Catalog,
    pub metadata: Metadata,
    pub variables: BTreeMap<String, VariableValue>,
    pub questions: Vec<Question>,
    pub enums: HashMap<String, Vec<String>>,
    /// Menu item labels keyed by grouping identifier.
    pub menus: HashMap<String, Vec<Value>>,
    pub user_actions: BTreeMap<String, UserAction>,
    pub includes: Vec<IncludeRecord>,
    pub tokens: Vec<Token>,
    pub warnings: Vec<Diagnostic>,
    pub uses_shortcut_input: bool,
}

impl Context {
    pub fn new(options: CompileOptions) -> Result<Self, CompilerError> {
        let mut metadata = Metadata::default();
        if let Some(selector) = &options.min_version {
            metadata
                .set_version(selector)
                .map_err(|message| CompilerError::semantic("S050", message))?;
        }
        metadata.name = options.name.clone();
        Ok(Context {
            options,
            catalog: Catalog::standard(),
            metadata,
            variables: BTreeMap::new(),
            questions: Vec::new(),
            enums: HashMap::new(),
            menus: HashMap::new(),
            user_actions: BTreeMap::new(),
            includes: Vec::new(),
            tokens: Vec::new(),
            warnings: Vec::new(),
            uses_shortcut_input: false,
        })
    }

    pub fn file_path(&self) -> &str {
        &self.options.file_path
    }

    /// Record a warning and forward it to the tracing subscriber.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        warn!(code = diagnostic.code, "{}", diagnostic.message);
        self.warnings.push(diagnostic);
    }

    pub fn question(&self, identifier: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.identifier == identifier)
    }

    pub fn question_mut(&mut self, identifier: &str) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.identifier == identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_deserialize_camel_case_with_defaults() {
        let options: CompileOptions =
            serde_json::from_str(r#"{"filePath":"a/b.cherri","minVersion":"17"}"#).unwrap();
        assert_eq!(options.file_path, "a/b.cherri");
        assert_eq!(options.min_version.as_deref(), Some("17"));
        assert!(!options.comments);
    }

    #[test]
    fn context_applies_min_version() {
        let ctx = Context::new(CompileOptions {
            min_version: Some("17".into()),
            ..CompileOptions::default()
        })
        .unwrap();
        assert_eq!(ctx.metadata.client_version, "2106.0.3");
        assert_eq!(ctx.metadata.ios_version, 17.0);

        let err = Context::new(CompileOptions {
            min_version: Some("3".into()),
            ..CompileOptions::default()
        })
        .err()
        .unwrap();
        assert!(err.message.contains("Available versions"));
    }

    #[test]
    fn globals_resolve_to_plist_targets() {
        let input = global("ShortcutInput").unwrap();
        assert_eq!(input.kind, VariableKind::ExtensionInput);
        let item = global("RepeatItem").unwrap();
        assert_eq!(item.target, "Repeat Item");
        assert!(item.repeat_item);
        assert!(global("Nope").is_none());
    }
}
