//! Emit phase: token stream → Shortcut plist tree.
//!
//! Public API: `generate(ctx) -> Shortcut`
//!
//! Tokens are lowered in source order. Values that an action needs as input
//! (inline calls, arithmetic, array items) are materialized first as their
//! own producer actions with a named output, so emission order always matches
//! data flow.

mod control;
pub mod output;
mod references;
mod variables;

use serde_json::{Map, Value as Json, json};
use tracing::{debug, debug_span, trace};

use crate::catalog::{ParamEmitter, Params, STANDARD_PREFIX};
use crate::context::Context;
use crate::error::CompilerError;
use crate::parse::types::{ActionCall, Token, Value, ValueType};
use crate::shortcut::{ImportQuestion, Shortcut, ShortcutAction, WorkflowIcon};
use crate::tables;
use output::OutputNames;
pub use references::ATTACHMENT_CHARACTER;
pub(crate) use variables::ARITHMETIC;

pub(crate) const COMMENT: &str = "comment";
pub(crate) const NOTHING: &str = "nothing";
pub(crate) const GET_TEXT: &str = "gettext";
pub(crate) const NUMBER: &str = "number";
pub(crate) const DICTIONARY: &str = "dictionary";
pub(crate) const LIST: &str = "list";
pub(crate) const MATH: &str = "math";
pub(crate) const CALCULATE_EXPRESSION: &str = "calculateexpression";
pub(crate) const SET_VARIABLE: &str = "setvariable";
pub(crate) const APPEND_VARIABLE: &str = "appendvariable";
pub(crate) const CONDITIONAL: &str = "conditional";
pub(crate) const REPEAT_COUNT: &str = "repeat.count";
pub(crate) const REPEAT_EACH: &str = "repeat.each";
pub(crate) const MENU: &str = "choosefrommenu";

/// Full identifier of a standard action.
pub fn standard(identifier: &str) -> String {
    format!("{STANDARD_PREFIX}{identifier}")
}

pub struct Emitter<'a> {
    pub(crate) ctx: &'a mut Context,
    pub(crate) actions: Vec<ShortcutAction>,
    pub(crate) outputs: OutputNames,
}

/// Lower the context's tokens and metadata into a Shortcut.
pub fn generate(ctx: &mut Context) -> Result<Shortcut, CompilerError> {
    let _span = debug_span!("emit", file = %ctx.file_path()).entered();
    let tokens = std::mem::take(&mut ctx.tokens);
    let mut emitter = Emitter::new(ctx);
    let result = tokens.iter().try_for_each(|token| emitter.emit_token(token));
    let actions = std::mem::take(&mut emitter.actions);
    ctx.tokens = tokens;
    result?;
    debug!(actions = actions.len(), "emitted");
    Ok(build_shortcut(ctx, actions))
}

impl<'a> Emitter<'a> {
    pub fn new(ctx: &'a mut Context) -> Self {
        let mut outputs = OutputNames::default();
        outputs.reserve(ctx.variables.keys().map(String::as_str));
        Emitter {
            ctx,
            actions: Vec::new(),
            outputs,
        }
    }

    fn emit_token(&mut self, token: &Token) -> Result<(), CompilerError> {
        match token {
            Token::Comment(text) => {
                let mut params = Params::new();
                params.insert("WFCommentActionText".into(), json!(text));
                self.push(standard(COMMENT), params);
                Ok(())
            }
            Token::VariableSet(assignment) => self.emit_assignment(assignment),
            Token::Action(call) => self.emit_call(call, None),
            Token::RepeatOpen { group, count } => self.emit_repeat(group, count),
            Token::RepeatEachOpen { group, iterable } => self.emit_repeat_each(group, iterable),
            Token::MenuOpen { group, prompt } => self.emit_menu(group, prompt),
            Token::MenuItem { group, label } => self.emit_menu_item(group, label),
            Token::ConditionalOpen { group, conditions } => self.emit_conditional(group, conditions),
            Token::ConditionalElse { group } => self.emit_else(group),
            Token::Close { group, kind } => self.emit_close(group, *kind),
        }
    }

    pub(crate) fn push(&mut self, identifier: String, parameters: Params) {
        trace!(%identifier, "action");
        self.actions.push(ShortcutAction::new(identifier, parameters));
    }

    /// Push an action whose output is named, reusing the UUID cached for
    /// that name.
    pub(crate) fn push_output(&mut self, identifier: String, mut parameters: Params, name: &str) {
        parameters.insert("CustomOutputName".into(), json!(name));
        parameters.insert("UUID".into(), json!(self.outputs.uuid_for(name)));
        self.push(identifier, parameters);
    }

    /// Emit a catalog action. `output` names its result.
    pub(crate) fn emit_call(
        &mut self,
        call: &ActionCall,
        output: Option<&str>,
    ) -> Result<(), CompilerError> {
        let definition = self.ctx.catalog.get(&call.name).cloned().ok_or_else(|| {
            CompilerError::emit("E001", format!("No catalog entry for '{}()'", call.name))
        })?;

        let mut args = call.arguments.clone();
        let mut questions = Vec::new();
        for (index, arg) in args.iter_mut().enumerate() {
            if let Value::Question(identifier) = arg {
                let key = definition
                    .parameter_for(index)
                    .map(|param| param.key.clone())
                    .unwrap_or_default();
                questions.push((identifier.clone(), key));
                *arg = Value::text("");
            }
        }

        let identifier = if definition.raw {
            let raw = args.first().and_then(Value::literal_str).unwrap_or_default();
            if raw.contains('.') {
                raw.to_string()
            } else {
                standard(raw)
            }
        } else {
            definition.resolved_identifier(&call.name)
        };

        let mut params = Params::new();
        if let Some(add_params) = definition.add_params {
            params.extend(add_params(self, &args)?);
        }
        if let Some(intent) = &definition.app_intent {
            params.insert(
                "AppIntentDescriptor".into(),
                json!({
                    "TeamIdentifier": "0000000000",
                    "BundleIdentifier": intent.bundle_identifier,
                    "Name": intent.name,
                    "AppIntentIdentifier": intent.intent_identifier,
                }),
            );
        }
        if let Some(make) = definition.make {
            params = make(self, &args)?;
        } else {
            for (index, arg) in args.iter().enumerate() {
                let Some(param) = definition.parameter_for(index) else {
                    continue;
                };
                if param.key.is_empty() || matches!(arg, Value::Nil) {
                    continue;
                }
                let value = match arg {
                    Value::Variable(var) if param.valid_type == ValueType::Variable => {
                        self.attachment(var)
                    }
                    _ => self.encode_value(arg, param.valid_type)?,
                };
                if param.infinite {
                    let slot = params
                        .entry(param.key.clone())
                        .or_insert_with(|| Json::Array(Vec::new()));
                    if let Json::Array(items) = slot {
                        items.push(value);
                    }
                } else {
                    params.entry(param.key.clone()).or_insert(value);
                }
            }
        }

        let index = self.actions.len();
        for (identifier, key) in questions {
            if let Some(question) = self.ctx.question_mut(&identifier) {
                question.wired = Some((key, index));
            }
        }
        match output {
            Some(name) => self.push_output(identifier, params, name),
            None => self.push(identifier, params),
        }
        Ok(())
    }
}

impl ParamEmitter for Emitter<'_> {
    fn param_value(&mut self, arg: &Value, handle_as: ValueType) -> Result<Json, CompilerError> {
        self.encode_value(arg, handle_as)
    }
}

fn build_shortcut(ctx: &mut Context, actions: Vec<ShortcutAction>) -> Shortcut {
    let mut import_questions = Vec::new();
    let mut unused = Vec::new();
    for question in &ctx.questions {
        match &question.wired {
            Some((key, index)) => import_questions.push(ImportQuestion {
                parameter_key: key.clone(),
                category: "Parameter".into(),
                action_index: *index,
                text: question.text.clone(),
                default_value: question.default_value.clone(),
            }),
            None => unused.push(question.identifier.clone()),
        }
    }
    for identifier in unused {
        ctx.warn(crate::error::Diagnostic {
            code: "W005",
            message: format!("Question '{identifier}' is never used"),
            location: None,
        });
    }

    let meta = &ctx.metadata;
    let inputs = if meta.inputs.is_empty() {
        tables::all_content_item_classes()
    } else {
        meta.inputs.clone()
    };
    Shortcut {
        name: meta.name.clone(),
        icon: WorkflowIcon {
            glyph_number: meta.glyph,
            start_color: meta.color,
        },
        client_version: meta.client_version.clone(),
        has_shortcut_input_variables: ctx.uses_shortcut_input,
        types: meta.types.clone(),
        quick_action_surfaces: meta.quick_actions.clone(),
        input_content_item_classes: inputs,
        output_content_item_classes: meta.outputs.clone(),
        import_questions,
        no_input_behavior: meta.no_input.clone(),
        actions,
        ..Shortcut::default()
    }
}

/// A parameter map with the given entries, in order.
pub(crate) fn params<const N: usize>(entries: [(&str, Json); N]) -> Params {
    let mut map = Map::new();
    for (key, value) in entries {
        map.insert(key.to_string(), value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompileOptions;
    use crate::parse::parse;
    use crate::source::Cursor;

    pub(super) fn emit(source: &str) -> Result<(Shortcut, Context), CompilerError> {
        let mut ctx = Context::new(CompileOptions::default())?;
        let mut cursor = Cursor::new(source, "main.cherri");
        parse(&mut ctx, &mut cursor)?;
        let shortcut = generate(&mut ctx)?;
        Ok((shortcut, ctx))
    }

    pub(super) fn identifiers(shortcut: &Shortcut) -> Vec<&str> {
        shortcut.actions.iter().map(|a| a.short_identifier()).collect()
    }

    #[test]
    fn defaults_accept_every_input() {
        let (shortcut, _) = emit("show(\"hi\")").unwrap();
        assert_eq!(
            shortcut.input_content_item_classes.len(),
            tables::CONTENT_ITEMS.len()
        );
        assert_eq!(shortcut.client_version, "4033.0.4.3");
        assert_eq!(identifiers(&shortcut), vec!["showresult"]);
        assert_eq!(shortcut.actions[0].param("Text"), Some(&json!("hi")));
    }

    #[test]
    fn add_params_come_first_and_are_not_overwritten() {
        let (shortcut, _) = emit("alert(\"body\", \"title\")").unwrap();
        let keys: Vec<&str> = shortcut.actions[0].parameters.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["WFAlertActionCancelButtonShown", "WFAlertActionMessage", "WFAlertActionTitle"]
        );
    }

    #[test]
    fn variable_arguments_to_variable_parameters_are_attachments() {
        let (shortcut, _) = emit("@d = {\"a\": 1}\n@v = getValue(d, \"a\")").unwrap();
        let get = shortcut
            .actions
            .iter()
            .find(|a| a.short_identifier() == "getvalueforkey")
            .unwrap();
        assert_eq!(get.param("WFInput").unwrap()["WFSerializationType"], "WFTextTokenAttachment");
        assert_eq!(get.param("WFInput").unwrap()["Value"]["VariableName"], "d");
        assert_eq!(get.param_str("WFDictionaryKey"), Some("a"));
        assert_eq!(get.param_str("CustomOutputName"), Some("v"));
    }

    #[test]
    fn infinite_parameters_collect_into_a_list() {
        let (shortcut, _) = emit("@l = list(\"a\", \"b\", \"c\")").unwrap();
        assert_eq!(shortcut.actions[0].param("WFItems"), Some(&json!(["a", "b", "c"])));
    }

    #[test]
    fn raw_actions_use_their_literal_identifier() {
        let (shortcut, _) =
            emit("rawAction(\"com.example.ping\", [{\"Host\": \"local\"}])").unwrap();
        assert_eq!(shortcut.actions[0].identifier, "com.example.ping");
        assert_eq!(shortcut.actions[0].param_str("Host"), Some("local"));
    }

    #[test]
    fn questions_are_wired_to_their_parameter() {
        let (shortcut, ctx) =
            emit("#question who \"Who?\" \"me\"\nwait(1)\nalert(who)").unwrap();
        assert_eq!(shortcut.import_questions.len(), 1);
        let question = &shortcut.import_questions[0];
        assert_eq!(question.parameter_key, "WFAlertActionMessage");
        assert_eq!(question.action_index, 1);
        assert_eq!(question.category, "Parameter");
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn unused_questions_warn() {
        let (shortcut, ctx) = emit("#question who \"Who?\" \"me\"").unwrap();
        assert!(shortcut.import_questions.is_empty());
        assert_eq!(ctx.warnings[0].code, "W005");
    }

    #[test]
    fn comments_become_actions_when_enabled() {
        let mut ctx = Context::new(CompileOptions {
            comments: true,
            ..CompileOptions::default()
        })
        .unwrap();
        let mut cursor = Cursor::new("// note", "main.cherri");
        parse(&mut ctx, &mut cursor).unwrap();
        let shortcut = generate(&mut ctx).unwrap();
        assert_eq!(shortcut.actions[0].short_identifier(), "comment");
        assert_eq!(shortcut.actions[0].param_str("WFCommentActionText"), Some("note"));
    }
}
