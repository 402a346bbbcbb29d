//! Parse phase: preprocessed source → token stream on the context.
//!
//! A single pass over the cursor. Each statement is dispatched on its first
//! lexeme and appends zero or more tokens; references are resolved here so
//! the emitter never needs the parser's scope.

pub mod args;
pub mod conditions;
pub mod control;
pub mod definitions;
pub mod types;
pub mod values;
pub mod variables;

pub use types::*;

use tracing::{debug, debug_span};

use crate::context::Context;
use crate::error::{CompilerError, Phase};
use crate::source::Cursor;

/// Calls after which nothing in the same block runs.
pub const TERMINAL_ACTIONS: &[&str] = &["stop", "output", "mustOutput", "outputOrClipboard"];

/// Words that open statements or blocks, or spell literals.
pub const KEYWORDS: &[&str] = &[
    "action", "const", "copy", "else", "enum", "false", "for", "if", "in", "item", "menu",
    "nil", "paste", "repeat", "true",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// One open control-flow block.
#[derive(Debug, Clone)]
pub(crate) struct Group {
    pub id: String,
    pub kind: GroupKind,
    pub has_else: bool,
    pub has_item: bool,
}

/// A name bound for the duration of a block, such as a loop alias.
#[derive(Debug, Clone)]
pub(crate) struct Alias {
    pub name: String,
    pub reference: VarRef,
    pub depth: usize,
}

pub struct Parser<'a> {
    pub(crate) ctx: &'a mut Context,
    pub(crate) cursor: &'a mut Cursor,
    pub(crate) groups: Vec<Group>,
    pub(crate) aliases: Vec<Alias>,
    /// Lowered user-action calls so far, used to name their temporaries.
    pub(crate) user_calls: usize,
}

pub fn parse(ctx: &mut Context, cursor: &mut Cursor) -> Result<(), CompilerError> {
    let _span = debug_span!("parse", file = %ctx.file_path()).entered();
    let mut parser = Parser::new(ctx, cursor);
    parser.run()?;
    debug!(tokens = parser.ctx.tokens.len(), "parsed");
    Ok(())
}

impl<'a> Parser<'a> {
    pub fn new(ctx: &'a mut Context, cursor: &'a mut Cursor) -> Self {
        Parser {
            ctx,
            cursor,
            groups: Vec::new(),
            aliases: Vec::new(),
            user_calls: 0,
        }
    }

    pub fn run(&mut self) -> Result<(), CompilerError> {
        loop {
            self.cursor.skip_whitespace();
            let Some(c) = self.cursor.char() else {
                break;
            };
            match c {
                '/' if matches!(self.cursor.next(1), Some('/' | '*')) => self.parse_comment(),
                '#' => self.parse_directive()?,
                '@' => {
                    self.cursor.advance();
                    self.parse_variable(false)?;
                }
                '}' => self.parse_close()?,
                _ => self.parse_statement()?,
            }
        }
        if let Some(group) = self.groups.last() {
            return Err(self.error(
                "P020",
                format!("Unclosed '{}' block", group.kind.name()),
            ));
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> Result<(), CompilerError> {
        if self.cursor.keyword_ahead("const") {
            return self.parse_variable(true);
        }
        if self.cursor.keyword_ahead("if") {
            return self.parse_if();
        }
        if self.cursor.keyword_ahead("repeat") {
            return self.parse_repeat();
        }
        if self.cursor.keyword_ahead("for") {
            return self.parse_for();
        }
        if self.cursor.keyword_ahead("menu") {
            return self.parse_menu();
        }
        if self.cursor.keyword_ahead("item") {
            return self.parse_menu_item();
        }
        if self.cursor.keyword_ahead("enum") {
            return self.parse_enum();
        }

        let start = self.cursor.idx();
        let identifier = self.cursor.collect_identifier();
        if !identifier.is_empty() && self.cursor.char() == Some('(') {
            return self.parse_call_statement(&identifier);
        }
        self.cursor.seek(start);
        let found = self.cursor.char().map(String::from).unwrap_or_default();
        let message = if identifier.is_empty() {
            format!("Illegal character '{found}'")
        } else if self.resolve(&identifier).is_some() {
            format!("Unexpected '{identifier}'. Variables are assigned with '@{identifier} = value'")
        } else {
            format!("Unexpected '{identifier}'")
        };
        Err(self.error("P003", message))
    }

    fn parse_comment(&mut self) {
        let multi_line = self.cursor.next(1) == Some('*');
        let start = self.cursor.idx() + 2;
        self.cursor.skip_comment();
        let end = if multi_line {
            self.cursor.idx().saturating_sub(2)
        } else {
            self.cursor.idx()
        };
        if !self.ctx.options.comments {
            return;
        }
        let text = self.cursor.text_between(start, end).trim().to_string();
        if !text.is_empty() {
            self.push(Token::Comment(text));
        }
    }

    fn parse_enum(&mut self) -> Result<(), CompilerError> {
        self.cursor.skip_spaces();
        let name = self.cursor.collect_identifier();
        if name.is_empty() {
            return Err(self.error("P021", "Expected enum identifier"));
        }
        if self.ctx.enums.contains_key(&name) {
            return Err(self.semantic("S060", format!("Duplicate declaration of enum '{name}'")));
        }
        self.cursor.skip_whitespace();
        if self.cursor.char() != Some('{') {
            return Err(self.error("P022", "Expected '{'"));
        }
        let body = self.cursor.collect_balanced('{', '}')?;
        let mut values = Vec::new();
        for part in crate::preprocess::actions::split_top_level(&body) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let value = values::unquote_literal(part)
                .ok_or_else(|| self.error("P023", format!("Expected quoted enum value, found '{part}'")))?;
            values.push(value);
        }
        self.ctx.enums.insert(name, values);
        Ok(())
    }

    /// Append a token, warning when it follows a terminal call in the same
    /// unconditional block.
    pub(crate) fn push(&mut self, token: Token) {
        let reachable_boundary = matches!(
            token,
            Token::Close { .. } | Token::ConditionalElse { .. } | Token::MenuItem { .. }
        );
        let in_branch = self
            .groups
            .iter()
            .any(|g| matches!(g.kind, GroupKind::Conditional | GroupKind::Menu));
        if !reachable_boundary
            && !in_branch
            && self
                .ctx
                .tokens
                .last()
                .is_some_and(|last| last.is_call_to(TERMINAL_ACTIONS))
        {
            let warning = self.cursor.warning("W001", "Statement is unreachable");
            self.ctx.warn(warning);
        }
        self.ctx.tokens.push(token);
    }

    pub(crate) fn error(&self, code: &str, message: impl Into<String>) -> CompilerError {
        self.cursor.error(Phase::Parse, code, message)
    }

    pub(crate) fn semantic(&self, code: &str, message: impl Into<String>) -> CompilerError {
        self.cursor.error(Phase::Semantic, code, message)
    }

    /// Look a name up through the block aliases, declared variables and
    /// globals, innermost first.
    pub(crate) fn resolve(&mut self, name: &str) -> Option<VarRef> {
        if let Some(alias) = self.aliases.iter().rev().find(|a| a.name == name) {
            return Some(alias.reference.clone());
        }
        if let Some(var) = self.ctx.variables.get(name) {
            return Some(var.reference(name));
        }
        let global = crate::context::global(name)?;
        if name == "ShortcutInput" {
            self.ctx.uses_shortcut_input = true;
        }
        Some(global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompileOptions;

    fn tokens(source: &str) -> Result<Vec<Token>, CompilerError> {
        let mut ctx = Context::new(CompileOptions::default())?;
        let mut cursor = Cursor::new(source, "main.cherri");
        parse(&mut ctx, &mut cursor)?;
        Ok(ctx.tokens)
    }

    #[test]
    fn statements_produce_tokens_in_order() {
        let tokens = tokens("@a = 1\nshow(a)\nconst b = \"x\"").unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(matches!(&tokens[0], Token::VariableSet(a) if a.name == "a" && !a.constant));
        assert!(tokens[1].is_call_to(&["show"]));
        assert!(matches!(&tokens[2], Token::VariableSet(a) if a.name == "b" && a.constant));
    }

    #[test]
    fn unknown_statement_is_an_error() {
        let err = tokens("$x").unwrap_err();
        assert_eq!(err.code, "P003");
        assert!(err.message.contains("Illegal character '$'"));
    }

    #[test]
    fn comments_only_become_tokens_when_enabled() {
        assert!(tokens("// hi\n/* there */").unwrap().is_empty());

        let mut ctx = Context::new(CompileOptions {
            comments: true,
            ..CompileOptions::default()
        })
        .unwrap();
        let mut cursor = Cursor::new("// hi\n/* there */", "main.cherri");
        parse(&mut ctx, &mut cursor).unwrap();
        assert_eq!(
            ctx.tokens,
            vec![Token::Comment("hi".into()), Token::Comment("there".into())]
        );
    }

    #[test]
    fn statement_after_stop_warns() {
        let mut ctx = Context::new(CompileOptions::default()).unwrap();
        let mut cursor = Cursor::new("stop()\nshow(\"never\")", "main.cherri");
        parse(&mut ctx, &mut cursor).unwrap();
        assert_eq!(ctx.warnings.len(), 1);
        assert_eq!(ctx.warnings[0].code, "W001");
    }

    #[test]
    fn unclosed_block_is_an_error() {
        let err = tokens("repeat i for 2 {\nshow(i)").unwrap_err();
        assert!(err.message.contains("Unclosed 'repeat' block"));
    }

    #[test]
    fn enums_collect_quoted_values() {
        let mut ctx = Context::new(CompileOptions::default()).unwrap();
        let mut cursor = Cursor::new("enum Size { 'small', \"large\" }", "main.cherri");
        parse(&mut ctx, &mut cursor).unwrap();
        assert_eq!(ctx.enums["Size"], vec!["small".to_string(), "large".to_string()]);
    }
}
