//! `if` conditions: `a == b`, `!a`, `a`, `a between 1 and 5`, joined with
//! `&&` or `||`.

use super::Parser;
use super::types::{Condition, ConditionOperator, Conditions, FilterPrefix, Value, ValueType};
use super::values::End;
use crate::error::CompilerError;

/// Versions before this one only accept a single condition per `if`.
const MULTIPLE_CONDITIONS_VERSION: f64 = 18.0;

impl Parser<'_> {
    pub(crate) fn parse_conditions(&mut self) -> Result<Conditions, CompilerError> {
        let mut prefix = None;
        let mut list = Vec::new();
        loop {
            list.push(self.parse_condition()?);
            self.cursor.skip_spaces();
            let next = if self.cursor.token_ahead("&&") {
                FilterPrefix::And
            } else if self.cursor.token_ahead("||") {
                FilterPrefix::Or
            } else {
                break;
            };
            match prefix {
                Some(current) if current != next => {
                    return Err(self.semantic(
                        "S043",
                        "Cannot mix '&&' and '||' in one condition",
                    ));
                }
                _ => prefix = Some(next),
            }
        }
        if list.len() > 1 && self.ctx.metadata.ios_version < MULTIPLE_CONDITIONS_VERSION {
            return Err(self.semantic(
                "S046",
                "Multiple conditions require iOS 18 or later",
            ));
        }
        Ok(Conditions {
            prefix: prefix.unwrap_or(FilterPrefix::And),
            list,
        })
    }

    fn parse_condition(&mut self) -> Result<Condition, CompilerError> {
        self.cursor.skip_spaces();
        let negated = self.cursor.char() == Some('!') && self.cursor.next(1) != Some('=');
        if negated {
            self.cursor.advance();
        }

        let subject = self.parse_value(End::Space)?;
        if !matches!(subject, Value::Variable(_)) {
            return Err(self.semantic(
                "S044",
                "The first operand of a condition must be a variable",
            ));
        }
        self.cursor.skip_spaces();

        let unary = match self.cursor.char() {
            Some('{') | None => true,
            Some('&') => self.cursor.next(1) == Some('&'),
            Some('|') => self.cursor.next(1) == Some('|'),
            _ => false,
        };
        if unary {
            let operator = if negated {
                ConditionOperator::Empty
            } else {
                ConditionOperator::Any
            };
            return Ok(Condition {
                operator,
                arguments: vec![subject],
            });
        }
        if negated {
            return Err(self.error("P045", "'!' only applies to a condition without an operator"));
        }

        let start = self.cursor.idx();
        let mut symbol = String::new();
        while let Some(c) = self.cursor.char() {
            if c.is_whitespace() {
                break;
            }
            symbol.push(c);
            self.cursor.advance();
        }
        let operator = match symbol.as_str() {
            "<>" => Some(ConditionOperator::Between),
            other => ConditionOperator::from_symbol(other),
        };
        let Some(operator) = operator else {
            self.cursor.seek(start);
            return Err(self.error("P045", format!("Invalid conditional '{symbol}'")));
        };

        let mut arguments = vec![subject];
        arguments.push(self.parse_operand(operator)?);
        if operator == ConditionOperator::Between {
            self.cursor.skip_spaces();
            if self.cursor.char() == Some(',') {
                self.cursor.advance();
            } else {
                self.cursor.keyword_ahead("and");
            }
            arguments.push(self.parse_operand(operator)?);
        }
        Ok(Condition {
            operator,
            arguments,
        })
    }

    fn parse_operand(&mut self, operator: ConditionOperator) -> Result<Value, CompilerError> {
        let value = self.parse_value(End::Space)?;
        let value_type = match &value {
            Value::Variable(_) | Value::Question(_) => ValueType::Variable,
            Value::Action(call) => call.output_type.unwrap_or(ValueType::Variable),
            Value::Expression(_) => ValueType::Number,
            other => other.value_type(),
        };
        if !operator.accepts(value_type) {
            return Err(self.semantic(
                "S045",
                format!(
                    "Cannot compare {} with '{}'",
                    value_type.name(),
                    operator.symbol()
                ),
            ));
        }
        if let Value::Question(identifier) = &value {
            let identifier = identifier.clone();
            self.claim_question(&identifier)?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CompileOptions, Context};
    use crate::parse::{Token, parse};
    use crate::source::Cursor;

    fn conditions(source: &str) -> Result<Conditions, CompilerError> {
        let mut ctx = Context::new(CompileOptions::default())?;
        let mut cursor = Cursor::new(source, "main.cherri");
        parse(&mut ctx, &mut cursor)?;
        ctx.tokens
            .into_iter()
            .find_map(|token| match token {
                Token::ConditionalOpen { conditions, .. } => Some(conditions),
                _ => None,
            })
            .ok_or_else(|| CompilerError::parse("P000", "no conditional"))
    }

    #[test]
    fn binary_condition() {
        let parsed = conditions("@x = 1\nif x >= 2 {\n}").unwrap();
        assert_eq!(parsed.prefix, FilterPrefix::And);
        assert_eq!(parsed.list.len(), 1);
        assert_eq!(parsed.list[0].operator, ConditionOperator::GreaterOrEqual);
        assert_eq!(parsed.list[0].arguments[1], Value::Number(2));
    }

    #[test]
    fn unary_conditions() {
        let parsed = conditions("@x = \"a\"\nif x {\n}").unwrap();
        assert_eq!(parsed.list[0].operator, ConditionOperator::Any);
        let parsed = conditions("@x = \"a\"\nif !x {\n}").unwrap();
        assert_eq!(parsed.list[0].operator, ConditionOperator::Empty);
        assert_eq!(parsed.list[0].arguments.len(), 1);
    }

    #[test]
    fn between_takes_two_bounds() {
        let parsed = conditions("@x = 3\nif x between 1 and 5 {\n}").unwrap();
        assert_eq!(parsed.list[0].operator, ConditionOperator::Between);
        assert_eq!(parsed.list[0].arguments[2], Value::Number(5));
        let parsed = conditions("@x = 3\nif x <> 1, 5 {\n}").unwrap();
        assert_eq!(parsed.list[0].arguments.len(), 3);
    }

    #[test]
    fn joined_conditions() {
        let parsed = conditions("@x = 3\n@y = \"a\"\nif x > 1 || y contains \"b\" {\n}").unwrap();
        assert_eq!(parsed.prefix, FilterPrefix::Or);
        assert_eq!(parsed.list.len(), 2);

        let err = conditions("@x = 3\nif x > 1 && x < 5 || x == 3 {\n}").unwrap_err();
        assert_eq!(err.code, "S043");
    }

    #[test]
    fn older_targets_take_one_condition() {
        let err = conditions("#define version 17\n@x = 3\nif x > 1 && x < 5 {\n}").unwrap_err();
        assert_eq!(err.code, "S046");
    }

    #[test]
    fn operand_rules() {
        let err = conditions("if \"a\" == \"b\" {\n}").unwrap_err();
        assert_eq!(err.code, "S044");
        let err = conditions("@x = 3\nif x > \"big\" {\n}").unwrap_err();
        assert_eq!(err.code, "S045");
        let err = conditions("@x = 3\nif x ~ 2 {\n}").unwrap_err();
        assert_eq!(err.code, "P045");
    }
}
