//! `@name = value`, `@name: type`, compound assignment and `const`.

use super::Parser;
use super::types::{AssignOp, Assignment, Token, Value, ValueType, VarRef};
use super::values::End;
use crate::context::{VariableValue, is_global};
use crate::error::CompilerError;

/// The value a bare `@name: type` declaration starts out with.
fn zero_value(value_type: ValueType) -> Option<Value> {
    match value_type {
        ValueType::Text | ValueType::RawText => Some(Value::text("")),
        ValueType::Number => Some(Value::Number(0)),
        ValueType::Float => Some(Value::Float(0.0)),
        ValueType::Bool => Some(Value::Bool(false)),
        ValueType::Dictionary => Some(Value::Dictionary {
            entries: Default::default(),
            refs: Default::default(),
        }),
        ValueType::Array => Some(Value::Array {
            items: Vec::new(),
            refs: Default::default(),
        }),
        _ => None,
    }
}

impl Parser<'_> {
    /// The cursor is past `@` or the `const` keyword.
    pub(crate) fn parse_variable(&mut self, constant: bool) -> Result<(), CompilerError> {
        self.cursor.skip_spaces();
        let name = self.cursor.collect_identifier();
        if name.is_empty() {
            return Err(self.error("P030", "Expected variable identifier"));
        }
        if super::is_keyword(&name) {
            return Err(self.semantic("S009", format!("'{name}' is a reserved word")));
        }
        self.cursor.skip_spaces();

        if !constant && self.cursor.char() == Some(':') {
            self.cursor.advance();
            self.cursor.skip_spaces();
            let type_name = self.cursor.collect_identifier();
            let value_type = ValueType::from_type_name(&type_name)
                .ok_or_else(|| self.error("P031", format!("Unknown type '{type_name}'")))?;
            self.bind(&name, AssignOp::Set, zero_value(value_type), false)?;
            if let Some(var) = self.ctx.variables.get_mut(&name) {
                var.declared = Some(value_type);
                var.value_type = value_type;
            }
            return Ok(());
        }

        let op = match (self.cursor.char(), self.cursor.next(1)) {
            (Some('='), _) => AssignOp::Set,
            (Some('+'), Some('=')) => AssignOp::Add,
            (Some('-'), Some('=')) => AssignOp::Subtract,
            (Some('*'), Some('=')) => AssignOp::Multiply,
            (Some('/'), Some('=')) => AssignOp::Divide,
            _ if constant => return Err(self.error("P032", "Expected '='")),
            _ => return Err(self.error("P032", "Expected '=' or ':'")),
        };
        if constant && op != AssignOp::Set {
            return Err(self.semantic(
                "S006",
                format!("Constant '{name}' can only be assigned with '='"),
            ));
        }
        self.cursor.advance_times(op.symbol().len());

        let value = self.parse_value(End::Line)?;
        self.cursor.skip_spaces();
        match self.cursor.char() {
            None | Some('\n') | Some('/') => {}
            Some(c) => return Err(self.error("P033", format!("Unexpected '{c}' after value"))),
        }
        self.bind(&name, op, Some(value), constant)?;
        Ok(())
    }

    /// Record an assignment and emit its token. Returns the binding as it
    /// stands after the assignment.
    pub(crate) fn bind(
        &mut self,
        name: &str,
        op: AssignOp,
        value: Option<Value>,
        constant: bool,
    ) -> Result<VarRef, CompilerError> {
        if is_global(name) || self.aliases.iter().any(|a| a.name == name) {
            return Err(self.semantic("S004", format!("Cannot redefine '{name}'")));
        }
        let existing = self.ctx.variables.get(name).cloned();
        if let Some(var) = &existing {
            if var.constant {
                return Err(self.semantic("S008", format!("Cannot redefine constant '{name}'")));
            }
            if constant {
                return Err(self.semantic(
                    "S008",
                    format!("'{name}' is already declared as a variable"),
                ));
            }
        }
        if constant {
            match &value {
                Some(Value::Array { .. }) => {
                    return Err(self.semantic(
                        "S007",
                        format!("Constant '{name}' cannot be an array. Use '@{name}' instead"),
                    ));
                }
                Some(Value::Variable(_)) => {
                    return Err(self.semantic(
                        "S007",
                        format!("Constant '{name}' cannot reference a variable. Use '@{name}' instead"),
                    ));
                }
                _ => {}
            }
        }
        if let Some(Value::Question(identifier)) = &value {
            let identifier = identifier.clone();
            self.claim_question(&identifier)?;
        }

        let value_type = match (&existing, op) {
            (Some(var), AssignOp::Set) => match var.declared {
                Some(declared) => declared,
                None => self.type_of(value.as_ref())?,
            },
            (Some(var), _) => {
                let current = var.declared.unwrap_or(var.value_type);
                let allowed = match current {
                    ValueType::Number | ValueType::Float => true,
                    ValueType::Text | ValueType::RawText | ValueType::Array => op == AssignOp::Add,
                    _ => false,
                };
                if !allowed {
                    return Err(self.semantic(
                        "S005",
                        format!(
                            "Cannot use '{}' on {} variable '{name}'",
                            op.symbol(),
                            current.name()
                        ),
                    ));
                }
                current
            }
            (None, AssignOp::Set) => self.type_of(value.as_ref())?,
            (None, _) => {
                return Err(self.semantic(
                    "S002",
                    format!("Cannot use '{}' on undefined variable '{name}'", op.symbol()),
                ));
            }
        };

        let target = match &existing {
            Some(var) => var.reference(name),
            None => VariableValue::new(value_type, None, constant).reference(name),
        };
        let stored = match op {
            AssignOp::Set => value.clone(),
            _ => existing.as_ref().and_then(|var| var.value.clone()),
        };
        let mut binding = VariableValue::new(value_type, stored, constant);
        binding.declared = existing.as_ref().and_then(|var| var.declared);
        let reference = binding.reference(name);
        self.ctx.variables.insert(name.to_string(), binding);

        self.push(Token::VariableSet(Assignment {
            name: name.to_string(),
            op,
            value,
            constant,
            target,
        }));
        Ok(reference)
    }

    fn type_of(&self, value: Option<&Value>) -> Result<ValueType, CompilerError> {
        Ok(match value {
            None | Some(Value::Nil) => ValueType::Variable,
            Some(Value::Variable(reference)) => self.resolved_type(reference)?,
            Some(Value::Action(call)) => call.output_type.unwrap_or(ValueType::Variable),
            Some(Value::Expression(_)) => ValueType::Number,
            Some(Value::RawText(_) | Value::Question(_)) => ValueType::Text,
            Some(other) => other.value_type(),
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
    fn declarations_start_with_a_zero_value() {
        let ctx = parse_source("@count: number").unwrap();
        let var = &ctx.variables["count"];
        assert_eq!(var.declared, Some(ValueType::Number));
        assert_eq!(var.value, Some(Value::Number(0)));
    }

    #[test]
    fn compound_assignment_keeps_the_type() {
        let ctx = parse_source("@n = 1\n@n += 2\n@s = \"a\"\n@s += \"b\"").unwrap();
        assert_eq!(ctx.variables["n"].value_type, ValueType::Number);
        let Token::VariableSet(assignment) = &ctx.tokens[1] else {
            panic!("expected assignment");
        };
        assert_eq!(assignment.op, AssignOp::Add);
        assert_eq!(assignment.target.name, "n");
    }

    #[test]
    fn compound_assignment_rules() {
        let err = parse_source("@s = \"a\"\n@s -= \"b\"").err().unwrap();
        assert_eq!(err.code, "S005");
        let err = parse_source("@missing += 1").err().unwrap();
        assert_eq!(err.code, "S002");
    }

    #[test]
    fn constants_are_single_assignment() {
        let err = parse_source("const c = 1\n@c = 2").err().unwrap();
        assert_eq!(err.code, "S008");
        let err = parse_source("const c = 1\nconst c += 2").err().unwrap();
        assert_eq!(err.code, "S006");
        let err = parse_source("const list = [1, 2]").err().unwrap();
        assert_eq!(err.code, "S007");
    }

    #[test]
    fn globals_cannot_be_assigned() {
        let err = parse_source("@ShortcutInput = 1").err().unwrap();
        assert_eq!(err.code, "S004");
    }

    #[test]
    fn reserved_words_cannot_be_bound() {
        let err = parse_source("const if = \"q\"").err().unwrap();
        assert_eq!(err.code, "S009");
        let err = parse_source("@repeat = 1").err().unwrap();
        assert_eq!(err.code, "S009");
        assert!(parse_source("@iffy = 1").is_ok());
    }

    #[test]
    fn dangling_operators_are_rejected() {
        let err = parse_source("@x = 1 +").err().unwrap();
        assert_eq!(err.code, "P010");
        let err = parse_source("@x = -").err().unwrap();
        assert_eq!(err.code, "P010");
    }

    #[test]
    fn trailing_text_after_value_is_an_error() {
        let err = parse_source("@a = 1 2").err().unwrap();
        assert_eq!(err.code, "P010");
    }
}
