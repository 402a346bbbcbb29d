//! Action catalog: Cherri identifiers mapped to the recipes that emit
//! Shortcuts actions.
//!
//! The compiler core only goes through `ActionDefinition` and
//! `ParamEmitter`; the category modules are plain data.

mod calendar;
mod contacts;
mod device;
mod documents;
mod libraries;
mod location;
mod math;
mod media;
mod scripting;
mod text;
mod web;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Value as Json, json};

use crate::error::CompilerError;
use crate::parse::types::{Value, ValueType};
pub use crate::shortcut::Params;

pub use libraries::library_names;

pub const STANDARD_PREFIX: &str = "is.workflow.actions.";

/// Validates arguments before emission and may rewrite them in place.
pub type CheckFn = fn(&mut Vec<Value>, &ActionDefinition) -> Result<(), String>;

/// Builds parameters from arguments through the emitter.
pub type ParamsFn = fn(&mut dyn ParamEmitter, &[Value]) -> Result<Params, CompilerError>;

/// The emitter as seen by catalog recipes.
pub trait ParamEmitter {
    /// Encode `arg` for a parameter of type `handle_as`.
    fn param_value(&mut self, arg: &Value, handle_as: ValueType) -> Result<Json, CompilerError>;
}

// =============================================================================
// Parameters
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum EnumSource {
    Values(Vec<String>),
    /// A source-level `enum` declaration.
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    pub name: String,
    pub valid_type: ValueType,
    pub key: String,
    pub enumeration: Option<EnumSource>,
    pub default_value: Option<Json>,
    pub optional: bool,
    pub infinite: bool,
    pub literal: bool,
}

impl ParameterDefinition {
    pub fn new(name: &str, valid_type: ValueType, key: &str) -> Self {
        ParameterDefinition {
            name: name.into(),
            valid_type,
            key: key.into(),
            enumeration: None,
            default_value: None,
            optional: false,
            infinite: false,
            literal: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Json>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn enumerate(mut self, values: &[&str]) -> Self {
        self.enumeration = Some(EnumSource::Values(
            values.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    pub fn literal(mut self) -> Self {
        self.literal = true;
        self
    }

    pub fn infinite(mut self) -> Self {
        self.infinite = true;
        self
    }

    pub fn is_required(&self) -> bool {
        !self.optional && self.default_value.is_none() && !self.infinite
    }

    /// Source form, e.g. `text ?title = "Alert"`.
    pub fn render(&self) -> String {
        let mut out = format!("{} ", self.valid_type.name());
        if self.infinite {
            out.push_str("...");
        } else if !self.is_required() {
            out.push('?');
        }
        out.push_str(&self.name);
        if let Some(default) = &self.default_value {
            out.push_str(&format!(" = {default}"));
        }
        out
    }
}

// =============================================================================
// Actions
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AppIntent {
    pub bundle_identifier: String,
    pub name: String,
    pub intent_identifier: String,
}

#[derive(Clone)]
pub struct ActionDefinition {
    pub identifier: Option<String>,
    pub app_identifier: Option<String>,
    pub override_identifier: Option<String>,
    pub parameters: Vec<ParameterDefinition>,
    pub check: Option<CheckFn>,
    pub make: Option<ParamsFn>,
    pub add_params: Option<ParamsFn>,
    pub output_type: Option<ValueType>,
    pub app_intent: Option<AppIntent>,
    pub mac: bool,
    pub min_version: f64,
    pub max_version: f64,
    pub default_action: bool,
    /// The first argument names the action identifier.
    pub raw: bool,
    /// Another spelling of an action; never chosen when decompiling.
    pub shorthand: bool,
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("identifier", &self.identifier)
            .field("app_identifier", &self.app_identifier)
            .field("override_identifier", &self.override_identifier)
            .field("parameters", &self.parameters)
            .field("output_type", &self.output_type)
            .field("default_action", &self.default_action)
            .field("shorthand", &self.shorthand)
            .finish_non_exhaustive()
    }
}

impl ActionDefinition {
    fn empty() -> Self {
        ActionDefinition {
            identifier: None,
            app_identifier: None,
            override_identifier: None,
            parameters: Vec::new(),
            check: None,
            make: None,
            add_params: None,
            output_type: None,
            app_intent: None,
            mac: false,
            min_version: 0.0,
            max_version: 0.0,
            default_action: false,
            raw: false,
            shorthand: false,
        }
    }

    /// A standard action, `is.workflow.actions.<identifier>`.
    pub fn standard(identifier: &str) -> Self {
        ActionDefinition {
            identifier: Some(identifier.into()),
            ..Self::empty()
        }
    }

    /// An action named by the lowercased call name.
    pub fn implicit() -> Self {
        Self::empty()
    }

    /// An action whose full identifier is used verbatim.
    pub fn overridden(identifier: &str) -> Self {
        ActionDefinition {
            override_identifier: Some(identifier.into()),
            ..Self::empty()
        }
    }

    /// An action exposed by a third-party or system app.
    pub fn app(app_identifier: &str, identifier: &str) -> Self {
        ActionDefinition {
            identifier: Some(identifier.into()),
            app_identifier: Some(app_identifier.into()),
            ..Self::empty()
        }
    }

    pub fn params(mut self, parameters: Vec<ParameterDefinition>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn output(mut self, output_type: ValueType) -> Self {
        self.output_type = Some(output_type);
        self
    }

    pub fn check(mut self, check: CheckFn) -> Self {
        self.check = Some(check);
        self
    }

    pub fn make(mut self, make: ParamsFn) -> Self {
        self.make = Some(make);
        self
    }

    pub fn add_params(mut self, add_params: ParamsFn) -> Self {
        self.add_params = Some(add_params);
        self
    }

    pub fn intent(mut self, intent: AppIntent) -> Self {
        self.app_intent = Some(intent);
        self
    }

    pub fn mac_only(mut self) -> Self {
        self.mac = true;
        self
    }

    pub fn min_version(mut self, version: f64) -> Self {
        self.min_version = version;
        self
    }

    pub fn max_version(mut self, version: f64) -> Self {
        self.max_version = version;
        self
    }

    pub fn default_action(mut self) -> Self {
        self.default_action = true;
        self
    }

    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    pub fn shorthand(mut self) -> Self {
        self.shorthand = true;
        self
    }

    /// Full workflow identifier for a call to `name`.
    pub fn resolved_identifier(&self, name: &str) -> String {
        if let Some(id) = &self.override_identifier {
            return id.clone();
        }
        match (&self.app_identifier, &self.identifier) {
            (Some(app), Some(id)) => format!("{app}.{id}"),
            (Some(app), None) => format!("{app}.{name}"),
            (None, Some(id)) => format!("{STANDARD_PREFIX}{id}"),
            (None, None) => format!("{STANDARD_PREFIX}{}", name.to_lowercase()),
        }
    }

    /// Parameter definition governing the argument at `index`; infinite
    /// parameters absorb every further argument.
    pub fn parameter_for(&self, index: usize) -> Option<&ParameterDefinition> {
        self.parameters.get(index).or_else(|| {
            self.parameters
                .last()
                .filter(|last| last.infinite && index >= self.parameters.len())
        })
    }

    pub fn signature(&self, name: &str) -> String {
        let params: Vec<String> = self.parameters.iter().map(ParameterDefinition::render).collect();
        format!("{name}({})", params.join(", "))
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Clone, Default)]
pub struct Catalog {
    actions: BTreeMap<String, ActionDefinition>,
}

impl Catalog {
    /// Every built-in action.
    pub fn standard() -> Self {
        let mut catalog = Catalog::default();
        scripting::register(&mut catalog);
        text::register(&mut catalog);
        math::register(&mut catalog);
        calendar::register(&mut catalog);
        web::register(&mut catalog);
        device::register(&mut catalog);
        media::register(&mut catalog);
        documents::register(&mut catalog);
        contacts::register(&mut catalog);
        location::register(&mut catalog);
        catalog
    }

    pub fn insert(&mut self, name: impl Into<String>, definition: ActionDefinition) {
        self.actions.insert(name.into(), definition);
    }

    /// Register `alias` as a shorthand spelling of the existing `target`.
    pub fn alias(&mut self, alias: &str, target: &str) {
        if let Some(definition) = self.actions.get(target).cloned() {
            self.insert(alias, definition.shorthand());
        }
    }

    pub fn get(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionDefinition)> {
        self.actions.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Entries that emit `identifier`, accepting both the full and the
    /// short standard form.
    pub fn candidates(&self, identifier: &str) -> Vec<(&str, &ActionDefinition)> {
        let full = if identifier.contains('.') {
            identifier.to_string()
        } else {
            format!("{STANDARD_PREFIX}{identifier}")
        };
        self.iter()
            .filter(|(name, def)| {
                !def.raw && !def.shorthand && def.resolved_identifier(name) == full
            })
            .collect()
    }

    /// Register the entries of a named library.
    pub fn import(&mut self, library: &str) -> Result<(), String> {
        libraries::import(self, library)
    }
}

/// The closest catalog name to `name`, for "did you mean" hints.
pub fn suggest<'a>(catalog: &'a Catalog, name: &str) -> Option<&'a str> {
    let lower = name.to_lowercase();
    catalog
        .iter()
        .map(|(candidate, _)| candidate)
        .find(|candidate| candidate.to_lowercase() == lower)
}

// =============================================================================
// Recipe helpers
// =============================================================================

/// Encode the argument at `index`, if present and not `nil`, under `key`.
pub fn put(
    emitter: &mut dyn ParamEmitter,
    params: &mut Params,
    args: &[Value],
    index: usize,
    key: &str,
    handle_as: ValueType,
) -> Result<(), CompilerError> {
    if let Some(arg) = args.get(index).filter(|arg| !matches!(arg, Value::Nil)) {
        let value = emitter.param_value(arg, handle_as)?;
        params.insert(key.to_string(), value);
    }
    Ok(())
}

pub fn fixed(pairs: &[(&str, Json)]) -> Params {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// A `WFQuantityFieldValue` with an optional magnitude.
pub fn quantity(magnitude: Option<Json>, unit: &str) -> Json {
    let mut value = serde_json::Map::new();
    if let Some(magnitude) = magnitude {
        value.insert("Magnitude".into(), magnitude);
    }
    value.insert("Unit".into(), json!(unit));
    json!({ "Value": value, "WFSerializationType": "WFQuantityFieldValue" })
}

pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

pub fn enum_listing(values: &[String]) -> String {
    let mut out = String::from("Available values:\n");
    for value in values {
        out.push_str(&format!("- {value}\n"));
    }
    out
}
