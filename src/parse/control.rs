//! Blocks: `if`/`else`, `repeat`, `for ... in`, `menu`/`item` and the
//! closing brace.

use uuid::Uuid;

use super::types::{GroupKind, Token, ValueType, VarRef, VariableKind};
use super::values::End;
use super::{Alias, Group, Parser};
use crate::error::CompilerError;

pub fn new_grouping_identifier() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

impl Parser<'_> {
    pub(crate) fn parse_if(&mut self) -> Result<(), CompilerError> {
        let conditions = self.parse_conditions()?;
        self.expect_block_open()?;
        let group = self.open_group(GroupKind::Conditional);
        self.push(Token::ConditionalOpen { group, conditions });
        Ok(())
    }

    pub(crate) fn parse_repeat(&mut self) -> Result<(), CompilerError> {
        let alias = self.loop_alias("index")?;
        if !self.cursor.keyword_ahead("for") {
            return Err(self.error("P041", "Expected 'for'"));
        }
        let count = self.parse_value(End::Block)?;
        let count_type = match &count {
            super::Value::Variable(reference) => self.resolved_type(reference)?,
            other => other.value_type(),
        };
        if matches!(
            count_type,
            ValueType::Text | ValueType::RawText | ValueType::Bool | ValueType::Dictionary | ValueType::Array
        ) {
            return Err(self.semantic(
                "S041",
                format!("Repeat count must be a number, got {}", count_type.name()),
            ));
        }
        self.expect_block_open()?;
        let group = self.open_group(GroupKind::Repeat);
        self.bind_loop_alias(alias, "Repeat Index", ValueType::Number);
        self.push(Token::RepeatOpen { group, count });
        Ok(())
    }

    pub(crate) fn parse_for(&mut self) -> Result<(), CompilerError> {
        let alias = self.loop_alias("item")?;
        if !self.cursor.keyword_ahead("in") {
            return Err(self.error("P041", "Expected 'in'"));
        }
        let iterable = self.parse_value(End::Block)?;
        self.expect_block_open()?;
        let group = self.open_group(GroupKind::RepeatEach);
        self.bind_loop_alias(alias, "Repeat Item", ValueType::Variable);
        self.push(Token::RepeatEachOpen { group, iterable });
        Ok(())
    }

    pub(crate) fn parse_menu(&mut self) -> Result<(), CompilerError> {
        let prompt = self.parse_value(End::Block)?;
        self.expect_block_open()?;
        let group = self.open_group(GroupKind::Menu);
        self.ctx.menus.insert(group.clone(), Vec::new());
        self.push(Token::MenuOpen { group, prompt });
        Ok(())
    }

    pub(crate) fn parse_menu_item(&mut self) -> Result<(), CompilerError> {
        let group = match self.groups.last() {
            Some(group) if group.kind == GroupKind::Menu => group.id.clone(),
            _ => return Err(self.semantic("S042", "'item' has no enclosing menu")),
        };
        let label = self.parse_value(End::Colon)?;
        self.cursor.skip_spaces();
        if self.cursor.char() != Some(':') {
            return Err(self.error("P043", "Expected ':' after menu item"));
        }
        self.cursor.advance();
        if let Some(top) = self.groups.last_mut() {
            top.has_item = true;
        }
        self.ctx.menus.entry(group.clone()).or_default().push(label.clone());
        self.push(Token::MenuItem { group, label });
        Ok(())
    }

    pub(crate) fn parse_close(&mut self) -> Result<(), CompilerError> {
        let Some(mut group) = self.groups.pop() else {
            return Err(self.error("P044", "'}' has no opening block"));
        };
        self.cursor.advance();

        if group.kind == GroupKind::Conditional && !group.has_else {
            let after_brace = self.cursor.idx();
            self.cursor.skip_whitespace();
            if self.cursor.keyword_ahead("else") {
                self.expect_block_open()?;
                group.has_else = true;
                let id = group.id.clone();
                self.groups.push(group);
                self.push(Token::ConditionalElse { group: id });
                return Ok(());
            }
            self.cursor.seek(after_brace);
        }
        if group.kind == GroupKind::Menu && !group.has_item {
            let warning = self.cursor.warning("W004", "Menu has no items");
            self.ctx.warn(warning);
        }

        let depth = self.groups.len();
        self.aliases.retain(|alias| alias.depth <= depth);
        self.push(Token::Close {
            group: group.id,
            kind: group.kind,
        });
        Ok(())
    }

    fn expect_block_open(&mut self) -> Result<(), CompilerError> {
        self.cursor.skip_whitespace();
        if self.cursor.char() != Some('{') {
            return Err(self.error("P042", "Expected '{'"));
        }
        self.cursor.advance();
        Ok(())
    }

    fn open_group(&mut self, kind: GroupKind) -> String {
        let id = new_grouping_identifier();
        self.groups.push(Group {
            id: id.clone(),
            kind,
            has_else: false,
            has_item: false,
        });
        id
    }

    /// The identifier after `repeat` or `for`. `_` binds nothing.
    fn loop_alias(&mut self, what: &str) -> Result<Option<String>, CompilerError> {
        self.cursor.skip_spaces();
        let alias = self.cursor.collect_identifier();
        if alias.is_empty() {
            return Err(self.error("P040", format!("Expected loop {what} identifier")));
        }
        self.cursor.skip_spaces();
        if alias == "_" {
            return Ok(None);
        }
        if self.ctx.variables.contains_key(&alias) || crate::context::is_global(&alias) {
            return Err(self.semantic(
                "S004",
                format!("Loop {what} '{alias}' shadows an existing variable"),
            ));
        }
        Ok(Some(alias))
    }

    /// Nested loops use numbered names: `Repeat Item 2`, `Repeat Index 3`.
    fn bind_loop_alias(&mut self, alias: Option<String>, base: &str, value_type: ValueType) {
        let Some(name) = alias else {
            return;
        };
        let loops = self
            .groups
            .iter()
            .filter(|g| matches!(g.kind, GroupKind::Repeat | GroupKind::RepeatEach))
            .count();
        let target = if loops > 1 {
            format!("{base} {loops}")
        } else {
            base.to_string()
        };
        self.aliases.push(Alias {
            name: name.clone(),
            reference: VarRef {
                name,
                target,
                kind: VariableKind::Variable,
                value_type,
                constant: false,
                repeat_item: true,
                get_as: None,
                coerce: None,
            },
            depth: self.groups.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CompileOptions, Context};
    use crate::parse::{Value, parse};
    use crate::source::Cursor;

    fn parse_source(source: &str) -> Result<Context, CompilerError> {
        let mut ctx = Context::new(CompileOptions::default())?;
        let mut cursor = Cursor::new(source, "main.cherri");
        parse(&mut ctx, &mut cursor)?;
        Ok(ctx)
    }

    #[test]
    fn if_else_shares_one_group() {
        let ctx = parse_source("@x = 1\nif x == 1 {\n    show(\"eq\")\n} else {\n    show(\"ne\")\n}").unwrap();
        let groups: Vec<&str> = ctx
            .tokens
            .iter()
            .filter_map(|t| match t {
                Token::ConditionalOpen { group, .. }
                | Token::ConditionalElse { group }
                | Token::Close { group, .. } => Some(group.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| *g == groups[0]));
    }

    #[test]
    fn nested_loops_number_their_aliases() {
        let ctx = parse_source(
            "@list = [\"a\"]\nfor item in list {\n    for inner in list {\n        show(\"{item}{inner}\")\n    }\n}",
        )
        .unwrap();
        let show = ctx
            .tokens
            .iter()
            .find_map(|t| match t {
                Token::Action(call) if call.name == "show" => Some(call),
                _ => None,
            })
            .unwrap();
        let Value::Text(template) = &show.arguments[0] else {
            panic!("expected text");
        };
        assert_eq!(template.refs["item"].target, "Repeat Item");
        assert_eq!(template.refs["inner"].target, "Repeat Item 2");
    }

    #[test]
    fn loop_aliases_end_with_their_block() {
        let err = parse_source("repeat i for 2 {\n}\nshow(i)").err().unwrap();
        assert_eq!(err.code, "S001");
    }

    #[test]
    fn menu_items_are_recorded() {
        let ctx = parse_source("menu \"Pick\" {\n    item \"A\":\n        show(\"a\")\n    item \"B\":\n        show(\"b\")\n}").unwrap();
        let labels = ctx.menus.values().next().unwrap();
        assert_eq!(labels, &vec![Value::text("A"), Value::text("B")]);
    }

    #[test]
    fn item_outside_menu_is_an_error() {
        let err = parse_source("item \"A\":").err().unwrap();
        assert_eq!(err.code, "S042");
    }

    #[test]
    fn stray_close_is_an_error() {
        let err = parse_source("}").err().unwrap();
        assert_eq!(err.code, "P044");
    }

    #[test]
    fn repeat_count_must_be_numeric() {
        let err = parse_source("repeat i for \"three\" {\n}").err().unwrap();
        assert_eq!(err.code, "S041");
    }
}
