//! Assignments and the producer actions that create values.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value as Json, json};

use super::references::output_ref;
use super::{
    APPEND_VARIABLE, CALCULATE_EXPRESSION, DICTIONARY, Emitter, GET_TEXT, LIST, MATH, NUMBER,
    SET_VARIABLE, params, standard,
};
use crate::catalog::Params;
use crate::error::CompilerError;
use crate::parse::types::{AssignOp, Assignment, Refs, Template, Value, ValueType};
use crate::parse::values::INLINE_REFERENCE;

/// `a + b` with exactly two operands, each a reference or a number.
pub(crate) static ARITHMETIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\{[^}]*\}|-?[0-9]+(?:\.[0-9]+)?)\s*([-+*/%])\s*(\{[^}]*\}|-?[0-9]+(?:\.[0-9]+)?)\s*$")
        .expect("arithmetic pattern")
});

fn math_symbol(op: &str) -> &'static str {
    match op {
        "+" => "+",
        "-" => "-",
        "*" => "×",
        _ => "÷",
    }
}

impl Emitter<'_> {
    pub(crate) fn emit_assignment(&mut self, assignment: &Assignment) -> Result<(), CompilerError> {
        match assignment.op {
            AssignOp::Set => self.emit_set(assignment),
            _ => self.emit_compound(assignment),
        }
    }

    fn emit_set(&mut self, assignment: &Assignment) -> Result<(), CompilerError> {
        let name = assignment.name.as_str();
        let Some(value) = &assignment.value else {
            return self.set_variable(name, None);
        };
        if assignment.constant {
            return self.produce(value, name);
        }
        match value {
            Value::Nil => self.set_variable(name, None),
            Value::Variable(var) => {
                let input = self.attachment(var);
                self.set_variable(name, Some(input))
            }
            Value::Array { items, refs } => {
                self.set_variable(name, None)?;
                for item in items {
                    let element = json_value(item, refs);
                    self.append_value(name, &element)?;
                }
                Ok(())
            }
            _ => {
                self.produce(value, name)?;
                let input = self.attachment(&output_ref(name, assignment.target.value_type));
                self.set_variable(name, Some(input))
            }
        }
    }

    /// `+=` and friends. Numbers go through the math action, text is
    /// concatenated with a text action and arrays are appended to.
    fn emit_compound(&mut self, assignment: &Assignment) -> Result<(), CompilerError> {
        let name = assignment.name.as_str();
        let value = assignment.value.as_ref().ok_or_else(|| {
            CompilerError::emit("E003", format!("Compound assignment to '{name}' has no value"))
        })?;
        let target = &assignment.target;
        match target.value_type {
            ValueType::Number | ValueType::Float => {
                let operation = assignment.op.math_operation().unwrap_or("+");
                let input = self.attachment(target);
                let operand = self.encode_value(value, ValueType::Number)?;
                let math = params([
                    ("WFInput", input),
                    ("WFMathOperation", json!(operation)),
                    ("WFMathOperand", operand),
                ]);
                self.push_output(standard(MATH), math, name);
                let input = self.attachment(&output_ref(name, target.value_type));
                self.set_variable(name, Some(input))
            }
            ValueType::Text | ValueType::RawText => {
                let mut template = Template::reference(target);
                template.append(&self.template_of(value)?);
                let text = self.token_string(&template);
                self.push_output(standard(GET_TEXT), params([("WFTextActionText", text)]), name);
                let input = self.attachment(&output_ref(name, ValueType::Text));
                self.set_variable(name, Some(input))
            }
            ValueType::Array => self.append_value(name, value),
            other => Err(CompilerError::emit(
                "E003",
                format!("Cannot apply '{}' to {} variable '{name}'", assignment.op.symbol(), other.name()),
            )),
        }
    }

    fn set_variable(&mut self, name: &str, input: Option<Json>) -> Result<(), CompilerError> {
        let mut parameters = Params::new();
        if let Some(input) = input {
            parameters.insert("WFInput".into(), input);
        }
        parameters.insert("WFVariableName".into(), json!(name));
        self.push(standard(SET_VARIABLE), parameters);
        Ok(())
    }

    fn append_value(&mut self, name: &str, value: &Value) -> Result<(), CompilerError> {
        let var = self.materialize(value)?;
        let input = self.attachment(&var);
        self.push(
            standard(APPEND_VARIABLE),
            params([("WFInput", input), ("WFVariableName", json!(name))]),
        );
        Ok(())
    }

    /// Text form of a value for concatenation.
    fn template_of(&mut self, value: &Value) -> Result<Template, CompilerError> {
        Ok(match value {
            Value::Text(template) => template.clone(),
            Value::Variable(var) => Template::reference(var),
            Value::Action(_) | Value::Expression(_) => Template::reference(&self.materialize(value)?),
            other => match other.literal() {
                Some(Json::String(text)) => Template::plain(text),
                Some(literal) => Template::plain(literal.to_string()),
                None => {
                    return Err(CompilerError::emit(
                        "E003",
                        format!("Cannot concatenate a {} value", other.value_type().name()),
                    ));
                }
            },
        })
    }

    /// Emit the action that creates `value`, naming its output `name`.
    pub(crate) fn produce(&mut self, value: &Value, name: &str) -> Result<(), CompilerError> {
        let (identifier, parameters) = match value {
            Value::Action(call) => return self.emit_call(call, Some(name)),
            Value::Expression(template) => return self.emit_expression(template, name),
            Value::Text(template) => {
                let text = self.text_param(template);
                (GET_TEXT, params([("WFTextActionText", text)]))
            }
            Value::RawText(text) => (GET_TEXT, params([("WFTextActionText", json!(text))])),
            Value::Nil => (GET_TEXT, params([("WFTextActionText", json!(""))])),
            Value::Question(identifier) => {
                let index = self.actions.len();
                if let Some(question) = self.ctx.question_mut(identifier) {
                    question.wired = Some(("WFTextActionText".into(), index));
                }
                (GET_TEXT, params([("WFTextActionText", json!(""))]))
            }
            Value::Variable(var) => {
                let text = self.token_string(&Template::reference(var));
                (GET_TEXT, params([("WFTextActionText", text)]))
            }
            Value::Number(n) => (NUMBER, params([("WFNumberActionNumber", json!(n))])),
            Value::Float(f) => (NUMBER, params([("WFNumberActionNumber", json!(f))])),
            Value::Bool(b) => (
                NUMBER,
                params([("WFNumberActionNumber", json!(if *b { "1" } else { "0" }))]),
            ),
            Value::Dictionary { entries, refs } => {
                let items = self.dictionary_value(entries, refs);
                (DICTIONARY, params([("WFItems", items)]))
            }
            Value::Array { items, refs } => {
                let mut texts = Vec::with_capacity(items.len());
                for item in items {
                    let text = match item {
                        Json::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                    texts.push(self.text_param(&Template {
                        text,
                        refs: refs.clone(),
                    }));
                }
                (LIST, params([("WFItems", Json::Array(texts))]))
            }
        };
        self.push_output(standard(identifier), parameters, name);
        Ok(())
    }

    /// Two-operand arithmetic uses the math action (`%` through its
    /// scientific modulus). Anything longer is handed to the expression
    /// calculator.
    fn emit_expression(&mut self, template: &Template, name: &str) -> Result<(), CompilerError> {
        let Some(captures) = ARITHMETIC.captures(&template.text) else {
            let input = self.token_string(template);
            self.push_output(standard(CALCULATE_EXPRESSION), params([("Input", input)]), name);
            return Ok(());
        };
        let input = self.operand(&captures[1], &template.refs)?;
        let operand = self.operand(&captures[3], &template.refs)?;
        let parameters = match &captures[2] {
            "%" => params([
                ("WFInput", input),
                ("WFMathOperation", json!("…")),
                ("WFScientificMathOperation", json!("Modulus")),
                ("WFScientificMathOperand", operand),
            ]),
            op => params([
                ("WFInput", input),
                ("WFMathOperation", json!(math_symbol(op))),
                ("WFMathOperand", operand),
            ]),
        };
        self.push_output(standard(MATH), parameters, name);
        Ok(())
    }

    fn operand(&mut self, text: &str, refs: &Refs) -> Result<Json, CompilerError> {
        if let Some(captures) = INLINE_REFERENCE.captures(text) {
            let mut var = refs.get(&captures[1]).cloned().ok_or_else(|| {
                CompilerError::emit("E002", format!("Unresolved operand '{}'", &captures[1]))
            })?;
            var.get_as = captures.get(2).map(|m| m.as_str().to_string());
            var.coerce = captures.get(3).map(|m| m.as_str().to_string());
            return Ok(self.attachment(&var));
        }
        if let Ok(n) = text.parse::<i64>() {
            return Ok(json!(n));
        }
        text.parse::<f64>()
            .map(|f| json!(f))
            .map_err(|_| CompilerError::emit("E002", format!("Invalid operand '{text}'")))
    }
}

/// An array element as a value, keeping the references its text uses.
fn json_value(item: &Json, refs: &Refs) -> Value {
    match item {
        Json::String(text) => Value::Text(Template {
            text: text.clone(),
            refs: INLINE_REFERENCE
                .captures_iter(text)
                .filter_map(|captures| refs.get_key_value(&captures[1]))
                .map(|(name, var)| (name.clone(), var.clone()))
                .collect(),
        }),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Number(i),
            None => Value::Float(n.as_f64().unwrap_or_default()),
        },
        Json::Bool(b) => Value::Bool(*b),
        Json::Null => Value::Nil,
        Json::Object(entries) => Value::Dictionary {
            entries: entries.clone(),
            refs: refs.clone(),
        },
        Json::Array(items) => Value::Array {
            items: items.clone(),
            refs: refs.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{emit, identifiers};
    use super::*;

    #[test]
    fn hello_world_lowering() {
        let (shortcut, _) = emit("@greet = \"Hello, World!\"\nshow(greet)").unwrap();
        assert_eq!(identifiers(&shortcut), vec!["gettext", "setvariable", "showresult"]);
        let producer = &shortcut.actions[0];
        assert_eq!(producer.param_str("WFTextActionText"), Some("Hello, World!"));
        assert_eq!(producer.param_str("CustomOutputName"), Some("greet"));

        let set = &shortcut.actions[1];
        assert_eq!(set.param_str("WFVariableName"), Some("greet"));
        let input = &set.param("WFInput").unwrap()["Value"];
        assert_eq!(input["OutputName"], "greet");
        assert_eq!(input["OutputUUID"], json!(producer.uuid().unwrap()));
    }

    #[test]
    fn constants_have_no_set_variable() {
        let (shortcut, _) = emit("const answer = 42").unwrap();
        assert_eq!(identifiers(&shortcut), vec!["number"]);
        assert_eq!(shortcut.actions[0].param_str("CustomOutputName"), Some("answer"));
        assert!(shortcut.actions[0].uuid().is_some());
    }

    #[test]
    fn arrays_append_each_item() {
        let (shortcut, _) = emit("@items = [\"a\", 2]").unwrap();
        assert_eq!(
            identifiers(&shortcut),
            vec!["setvariable", "gettext", "appendvariable", "number", "appendvariable"]
        );
        assert!(shortcut.actions[0].param("WFInput").is_none());
        assert_eq!(shortcut.actions[2].param_str("WFVariableName"), Some("items"));
    }

    #[test]
    fn compound_assignment_by_type() {
        let (shortcut, _) = emit("@n = 1\n@n *= 3").unwrap();
        let math = &shortcut.actions[2];
        assert_eq!(math.short_identifier(), "math");
        assert_eq!(math.param_str("WFMathOperation"), Some("×"));
        assert_eq!(math.param("WFMathOperand"), Some(&json!(3)));
        assert_eq!(math.param("WFInput").unwrap()["Value"]["VariableName"], "n");

        let (shortcut, _) = emit("@s = \"a\"\n@s += \"b\"").unwrap();
        let concat = &shortcut.actions[2].param("WFTextActionText").unwrap()["Value"];
        assert_eq!(concat["string"], "\u{FFFC}b");

        let (shortcut, _) = emit("@l = [\"a\"]\n@l += \"b\"").unwrap();
        assert_eq!(shortcut.actions.last().unwrap().short_identifier(), "appendvariable");
    }

    #[test]
    fn arithmetic_lowering() {
        let (shortcut, _) = emit("@n = 7\n@m = n % 3").unwrap();
        let math = &shortcut.actions[2];
        assert_eq!(math.param_str("WFMathOperation"), Some("…"));
        assert_eq!(math.param_str("WFScientificMathOperation"), Some("Modulus"));
        assert_eq!(math.param("WFScientificMathOperand"), Some(&json!(3)));

        let (shortcut, _) = emit("@n = 7\n@m = n * 2 + 1").unwrap();
        let calc = &shortcut.actions[2];
        assert_eq!(calc.short_identifier(), "calculateexpression");
        assert_eq!(calc.param("Input").unwrap()["Value"]["string"], "\u{FFFC} * 2 + 1");
    }

    #[test]
    fn declarations_without_value() {
        let (shortcut, _) = emit("@v: variable").unwrap();
        assert_eq!(identifiers(&shortcut), vec!["setvariable"]);
        assert!(shortcut.actions[0].param("WFInput").is_none());
    }
}
