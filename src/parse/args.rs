//! Action calls: argument collection, argument checks and the lowering of
//! calls to user-defined actions.

use std::collections::HashSet;

use serde_json::{Map, Value as Json, json};

use super::Parser;
use super::types::{ActionCall, AssignOp, Refs, Template, Token, Value, ValueType, VarRef};
use super::values::End;
use crate::catalog::{self, ActionDefinition, EnumSource, ParameterDefinition};
use crate::context::UserAction;
use crate::error::CompilerError;

/// Whether an argument of type `actual` may be passed for `expected`.
pub fn accepts(expected: ValueType, actual: ValueType) -> bool {
    use ValueType::*;
    match (expected, actual) {
        (Variable, _) | (_, Variable | Action | Expression | Question | Nil) => true,
        (Text | RawText, Text | RawText | Number | Float | Bool) => true,
        (Number | Float, Number | Float) => true,
        (Bool, Bool) => true,
        (Dictionary, Dictionary) | (Array, Array) => true,
        _ => false,
    }
}

/// Variables are typed loosely; only collection/scalar confusion is caught.
fn accepts_variable(expected: ValueType, actual: ValueType) -> bool {
    use ValueType::*;
    match expected {
        Dictionary | Array => !matches!(actual, Text | RawText | Number | Float | Bool),
        Number | Float | Bool => !matches!(actual, Dictionary | Array),
        _ => true,
    }
}

impl Parser<'_> {
    pub(crate) fn parse_call_statement(&mut self, name: &str) -> Result<(), CompilerError> {
        if let Value::Action(call) = self.parse_call_as(name, true)? {
            self.push(Token::Action(*call));
        }
        Ok(())
    }

    /// A call in value position. The cursor is on `(`.
    pub(crate) fn parse_call(&mut self, name: &str) -> Result<Value, CompilerError> {
        self.parse_call_as(name, false)
    }

    fn parse_call_as(&mut self, name: &str, statement: bool) -> Result<Value, CompilerError> {
        let arguments = self.collect_arguments()?;
        if let Some(action) = self.ctx.user_actions.get(name).cloned() {
            return self.lower_user_call(&action, arguments, statement);
        }
        let Some(definition) = self.ctx.catalog.get(name).cloned() else {
            let message = match catalog::suggest(&self.ctx.catalog, name) {
                Some(hint) => format!("Unknown action '{name}()'. Did you mean '{hint}()'?"),
                None => format!("Unknown action '{name}()'"),
            };
            return Err(self.semantic("S020", message));
        };
        let mut arguments = self.check_arguments(name, &definition, arguments)?;
        if let Some(check) = definition.check {
            check(&mut arguments, &definition).map_err(|message| self.semantic("S015", message))?;
        }
        self.check_availability(name, &definition)?;
        Ok(Value::Action(Box::new(ActionCall {
            name: name.to_string(),
            arguments,
            output_type: definition.output_type,
        })))
    }

    fn collect_arguments(&mut self) -> Result<Vec<Value>, CompilerError> {
        self.cursor.advance();
        let mut arguments = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            match self.cursor.char() {
                None => return Err(self.error("P013", "Expected ')'")),
                Some(')') => {
                    self.cursor.advance();
                    break;
                }
                _ => {}
            }
            arguments.push(self.parse_value(End::Argument)?);
            self.cursor.skip_whitespace();
            match self.cursor.char() {
                Some(',') => self.cursor.advance(),
                Some(')') => {
                    self.cursor.advance();
                    break;
                }
                _ => return Err(self.error("P013", "Expected ',' or ')'")),
            }
        }
        Ok(arguments)
    }

    // =========================================================================
    // Checks
    // =========================================================================

    fn check_arguments(
        &mut self,
        name: &str,
        definition: &ActionDefinition,
        arguments: Vec<Value>,
    ) -> Result<Vec<Value>, CompilerError> {
        let signature = definition.signature(name);
        let infinite = definition.parameters.last().is_some_and(|p| p.infinite);
        if arguments.len() > definition.parameters.len() && !infinite {
            return Err(self.semantic(
                "S021",
                format!(
                    "Too many arguments for '{name}()': expected {}, got {}\n\n{signature}",
                    definition.parameters.len(),
                    arguments.len()
                ),
            ));
        }
        for (i, param) in definition.parameters.iter().enumerate() {
            if param.is_required() && arguments.get(i).is_none() {
                return Err(self.semantic(
                    "S022",
                    format!(
                        "Missing required {} argument '{}'\n\n{signature}",
                        catalog::ordinal(i + 1),
                        param.name
                    ),
                ));
            }
        }
        for (i, argument) in arguments.iter().enumerate() {
            if let Some(param) = definition.parameter_for(i) {
                self.check_argument(&signature, i, param, argument)?;
            }
        }
        Ok(arguments)
    }

    fn check_argument(
        &mut self,
        signature: &str,
        index: usize,
        param: &ParameterDefinition,
        argument: &Value,
    ) -> Result<(), CompilerError> {
        let position = catalog::ordinal(index + 1);
        match argument {
            Value::Question(identifier) => return self.claim_question(identifier),
            Value::Nil => return Ok(()),
            _ => {}
        }

        if param.literal && argument.literal().is_none() {
            return Err(self.semantic(
                "S011",
                format!(
                    "{position} argument '{}' must be a literal value\n\n{signature}",
                    param.name
                ),
            ));
        }

        if let (Some(values), Some(given)) = (self.enum_values(param), argument.literal_str()) {
            if !values.iter().any(|v| v == given) {
                return Err(self.semantic(
                    "S012",
                    format!(
                        "Invalid value '{given}' for {position} argument '{}'\n\n{}\n{signature}",
                        param.name,
                        catalog::enum_listing(&values)
                    ),
                ));
            }
        }

        let compatible = match argument {
            Value::Variable(reference) => {
                let resolved = self.resolved_type(reference)?;
                accepts_variable(param.valid_type, resolved)
            }
            other => accepts(param.valid_type, other.value_type()),
        };
        if !compatible {
            let given = match argument {
                Value::Variable(reference) => self.resolved_type(reference)?,
                other => other.value_type(),
            };
            let mut message = format!(
                "Type mismatch for {position} argument '{}': expected {}, got {}\n\n{signature}",
                param.name,
                param.valid_type.name(),
                given.name()
            );
            if let Some(values) = self.enum_values(param) {
                message.push_str(&format!("\n\n{}", catalog::enum_listing(&values)));
            }
            return Err(self.semantic("S013", message));
        }

        if let (Some(default), Some(given)) = (&param.default_value, argument.literal()) {
            if *default == given {
                let warning = self.cursor.warning(
                    "W002",
                    format!(
                        "Value for '{}' is the same as its default value and can be omitted",
                        param.name
                    ),
                );
                self.ctx.warn(warning);
            }
        }
        Ok(())
    }

    fn enum_values(&self, param: &ParameterDefinition) -> Option<Vec<String>> {
        match param.enumeration.as_ref()? {
            EnumSource::Values(values) => Some(values.clone()),
            EnumSource::Named(name) => self.ctx.enums.get(name).cloned(),
        }
    }

    /// Follow variable-to-variable bindings down to a concrete type.
    pub(crate) fn resolved_type(&self, reference: &VarRef) -> Result<ValueType, CompilerError> {
        if reference.get_as.is_some() || reference.coerce.is_some() {
            return Ok(ValueType::Variable);
        }
        let mut seen = HashSet::new();
        let mut current = reference.clone();
        loop {
            if !seen.insert(current.name.clone()) {
                return Err(self.semantic(
                    "S014",
                    format!("Infinite variable reference through '{}'", reference.name),
                ));
            }
            let Some(var) = self.ctx.variables.get(&current.name) else {
                return Ok(current.value_type);
            };
            if let Some(declared) = var.declared {
                return Ok(declared);
            }
            match &var.value {
                Some(Value::Variable(next)) if next.get_as.is_none() && next.coerce.is_none() => {
                    current = next.clone();
                }
                _ => return Ok(var.value_type),
            }
        }
    }

    pub(crate) fn claim_question(&mut self, identifier: &str) -> Result<(), CompilerError> {
        let already_used = self.ctx.question(identifier).is_some_and(|q| q.used);
        if already_used {
            return Err(self.semantic(
                "S030",
                format!("Question '{identifier}' has already been used by another argument"),
            ));
        }
        if let Some(question) = self.ctx.question_mut(identifier) {
            question.used = true;
        }
        Ok(())
    }

    fn check_availability(
        &mut self,
        name: &str,
        definition: &ActionDefinition,
    ) -> Result<(), CompilerError> {
        let ios = self.ctx.metadata.ios_version;
        if definition.min_version > ios {
            return Err(self.semantic(
                "S016",
                format!(
                    "Action '{name}()' requires iOS {} or later, but the target is iOS {ios}",
                    definition.min_version
                ),
            ));
        }
        if definition.max_version != 0.0 {
            let warning = self.cursor.warning(
                "W003",
                format!(
                    "Action '{name}()' is deprecated after iOS {}",
                    definition.max_version
                ),
            );
            self.ctx.warn(warning);
            if definition.max_version < ios {
                return Err(self.semantic(
                    "S017",
                    format!(
                        "Action '{name}()' is not available after iOS {}, but the target is iOS {ios}",
                        definition.max_version
                    ),
                ));
            }
        }
        if definition.mac && self.ctx.metadata.mac == Some(false) {
            return Err(self.semantic(
                "S018",
                format!("Action '{name}()' is only available on macOS"),
            ));
        }
        Ok(())
    }

    // =========================================================================
    // User actions
    // =========================================================================

    /// Lower `f(args)` into a call dictionary and a run of the shortcut
    /// itself, coercing the result to the declared output type.
    fn lower_user_call(
        &mut self,
        action: &UserAction,
        arguments: Vec<Value>,
        statement: bool,
    ) -> Result<Value, CompilerError> {
        let definition = ActionDefinition::implicit().params(action.parameters.clone());
        let arguments = self.check_arguments(&action.name, &definition, arguments)?;
        self.user_calls += 1;
        let n = self.user_calls;

        let mut refs = Refs::new();
        let mut wrapped = Vec::new();
        for (i, argument) in arguments.into_iter().enumerate() {
            let item = match argument {
                Value::Text(template) => {
                    refs.extend(template.refs);
                    Json::String(template.text)
                }
                Value::RawText(text) => Json::String(text),
                Value::Number(number) => json!(number),
                Value::Float(float) => json!(float),
                Value::Bool(flag) => json!(flag),
                Value::Nil => Json::String(String::new()),
                Value::Dictionary { entries, refs: inner } => {
                    refs.extend(inner);
                    Json::Object(entries)
                }
                Value::Array { items, refs: inner } => {
                    refs.extend(inner);
                    json!({ "array": items })
                }
                Value::Variable(reference) => {
                    let is_array = self.resolved_type(&reference)? == ValueType::Array;
                    let template = Template::reference(&reference);
                    refs.extend(template.refs);
                    if is_array {
                        json!({ "array": template.text })
                    } else {
                        Json::String(template.text)
                    }
                }
                Value::Question(identifier) => {
                    return Err(self.semantic(
                        "S031",
                        format!("Question '{identifier}' cannot be passed to '{}()'", action.name),
                    ));
                }
                value @ (Value::Action(_) | Value::Expression(_)) => {
                    let temp = format!("_{}_cherri_arg{n}_{}", action.name, i + 1);
                    let reference = self.bind(&temp, AssignOp::Set, Some(value), true)?;
                    let template = Template::reference(&reference);
                    refs.extend(template.refs);
                    Json::String(template.text)
                }
            };
            wrapped.push(item);
        }

        let mut entries = Map::new();
        entries.insert("cherri_functions".into(), json!(1));
        entries.insert("function".into(), json!(action.name));
        entries.insert("arguments".into(), Json::Array(wrapped));
        let call_name = format!("_{}_cherri_call{n}", action.name);
        let input = self.bind(&call_name, AssignOp::Set, Some(Value::Dictionary { entries, refs }), true)?;
        let run = ActionCall {
            name: "runSelf".into(),
            arguments: vec![Value::Variable(input)],
            output_type: None,
        };

        let Some(output_type) = action.output_type.filter(|_| !statement) else {
            return Ok(Value::Action(Box::new(run)));
        };
        let output_name = format!("_{}_cherri_output{n}", action.name);
        let output = self.bind(&output_name, AssignOp::Set, Some(Value::Action(Box::new(run))), true)?;
        let coerced = |name: &str, argument: Value, output_type: ValueType| {
            Value::Action(Box::new(ActionCall {
                name: name.into(),
                arguments: vec![argument],
                output_type: Some(output_type),
            }))
        };
        Ok(match output_type {
            ValueType::Text | ValueType::RawText => coerced(
                "text",
                Value::Text(Template::reference(&output)),
                ValueType::Text,
            ),
            ValueType::Number | ValueType::Float | ValueType::Bool => {
                coerced("number", Value::Variable(output), ValueType::Number)
            }
            ValueType::Dictionary => {
                coerced("getDictionary", Value::Variable(output), ValueType::Dictionary)
            }
            ValueType::Array => Value::Variable(VarRef {
                value_type: ValueType::Array,
                ..output
            }),
            _ => Value::Variable(output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CompileOptions, Context};
    use crate::parse::parse;
    use crate::source::Cursor;

    fn parse_source(source: &str) -> Result<Context, CompilerError> {
        let mut ctx = Context::new(CompileOptions::default())?;
        let mut cursor = Cursor::new(source, "main.cherri");
        parse(&mut ctx, &mut cursor)?;
        Ok(ctx)
    }

    #[test]
    fn type_table() {
        assert!(accepts(ValueType::Text, ValueType::Number));
        assert!(accepts(ValueType::Number, ValueType::Expression));
        assert!(!accepts(ValueType::Number, ValueType::Text));
        assert!(!accepts(ValueType::Dictionary, ValueType::Array));
        assert!(accepts(ValueType::Variable, ValueType::Dictionary));
    }

    #[test]
    fn unknown_action_suggests_a_close_name() {
        let err = parse_source("Show(\"x\")").err().unwrap();
        assert_eq!(err.code, "S020");
        assert!(err.message.contains("Did you mean 'show()'"));
    }

    #[test]
    fn missing_required_argument_quotes_signature() {
        let err = parse_source("alert()").err().unwrap();
        assert_eq!(err.code, "S022");
        assert!(err.message.starts_with("Missing required 1st argument 'alert'"));
        assert!(err.message.contains("alert(text alert"));
    }

    #[test]
    fn too_many_arguments() {
        let err = parse_source("show(\"a\", \"b\")").err().unwrap();
        assert_eq!(err.code, "S021");
    }

    #[test]
    fn type_mismatch_is_reported() {
        let err = parse_source("wait(\"soon\")").err().unwrap();
        assert_eq!(err.code, "S013");
        assert!(err.message.contains("expected number, got text"));
    }

    #[test]
    fn variable_cycles_are_rejected() {
        let err = parse_source("@a = 1\n@b = a\n@a = b\nwait(a)").err().unwrap();
        assert_eq!(err.code, "S014");
    }

    #[test]
    fn questions_can_only_be_used_once() {
        let source = "#question q \"Who?\" \"me\"\nshow(q)\nshow(q)";
        let err = parse_source(source).err().unwrap();
        assert_eq!(err.code, "S030");
        let ctx = parse_source("#question q \"Who?\" \"me\"\nshow(q)").unwrap();
        assert!(ctx.question("q").unwrap().used);
    }

    #[test]
    fn newer_actions_are_gated_by_version() {
        let err = parse_source("#define version 16\nlockScreen()").err().unwrap();
        assert_eq!(err.code, "S016");
    }

    #[test]
    fn removed_actions_error_on_newer_targets() {
        let err = parse_source("setFocusMode(true)").err().unwrap();
        assert_eq!(err.code, "S017");
    }

    #[test]
    fn enum_mismatch_lists_valid_values() {
        let err = parse_source("setAppearance(\"sepia\")").err().unwrap();
        assert_eq!(err.code, "S012");
        assert!(err.message.starts_with("Invalid value 'sepia'"), "{}", err.message);
        assert!(err.message.contains("Available values:\n- light\n- dark\n"));
    }

    #[test]
    fn default_literal_warns() {
        let ctx = parse_source("timeBetween(CurrentDate, CurrentDate, \"Minutes\")").unwrap();
        let codes: Vec<_> = ctx.warnings.iter().map(|w| w.code).collect();
        assert_eq!(codes, vec!["W002"]);
        let ctx = parse_source("timeBetween(CurrentDate, CurrentDate, \"Hours\")").unwrap();
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn deprecated_actions_warn_while_still_available() {
        let ctx = parse_source("#define version 16\nsetFocusMode(true)").unwrap();
        assert!(ctx.warnings.iter().any(|w| w.code == "W003"));
    }

    #[test]
    fn mac_only_actions_respect_the_mac_definition() {
        let err = parse_source("#define mac false\nstartScreensaver()").err().unwrap();
        assert_eq!(err.code, "S018");
        assert!(parse_source("#define mac true\nstartScreensaver()").is_ok());
        assert!(parse_source("startScreensaver()").is_ok());
    }

    #[test]
    fn user_action_calls_lower_to_run_self() {
        let mut ctx = Context::new(CompileOptions::default()).unwrap();
        let mut cursor = Cursor::new(
            "action double(number x) number {\n    output(x * 2)\n}\n@y = double(21)",
            "main.cherri",
        );
        crate::preprocess::actions::resolve(&mut ctx, &mut cursor).unwrap();
        parse(&mut ctx, &mut cursor).unwrap();

        let names: Vec<&str> = ctx
            .tokens
            .iter()
            .rev()
            .take(3)
            .filter_map(|t| match t {
                Token::VariableSet(a) => Some(a.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["y", "_double_cherri_output1", "_double_cherri_call1"]);

        let Some(Token::VariableSet(y)) = ctx.tokens.last() else {
            panic!("expected assignment");
        };
        assert!(matches!(&y.value, Some(Value::Action(call)) if call.name == "number"));
    }
}
