//! `#define`, `#import` and `#question` directives.

use serde_json::{Map, Value as Json};

use super::Parser;
use super::types::ValueType;
use super::values::unquote_literal;
use crate::catalog::ActionDefinition;
use crate::context::Question;
use crate::error::CompilerError;
use crate::preprocess::actions::parse_parameters;
use crate::shortcut::NoInputBehavior;
use crate::tables;

impl Parser<'_> {
    /// The cursor is on `#`.
    pub(crate) fn parse_directive(&mut self) -> Result<(), CompilerError> {
        self.cursor.advance();
        let directive = self.cursor.collect_identifier();
        match directive.as_str() {
            "define" => self.parse_define(),
            "import" => {
                let library = self.rest_of_line();
                let library = unquote_literal(&library).unwrap_or(library);
                self.ctx
                    .catalog
                    .import(&library)
                    .map_err(|message| self.semantic("S052", message))
            }
            "question" => self.parse_question(),
            "include" => Err(self.error("P050", "Unresolved include")),
            other => Err(self.error("P051", format!("Unknown directive '#{other}'"))),
        }
    }

    /// Everything up to the end of the line, without a trailing comment.
    fn rest_of_line(&mut self) -> String {
        let line = self.cursor.collect_until('\n');
        let line = match line.find(" //") {
            Some(comment) => &line[..comment],
            None => line.as_str(),
        };
        line.trim().to_string()
    }

    fn parse_define(&mut self) -> Result<(), CompilerError> {
        self.cursor.skip_spaces();
        let kind = self.cursor.collect_identifier();
        if kind == "action" {
            return self.parse_action_definition();
        }
        let value = self.rest_of_line();
        if value.is_empty() {
            return Err(self.error("P052", format!("Expected a value for '#define {kind}'")));
        }

        match kind.as_str() {
            "name" => {
                self.ctx.metadata.name = Some(unquote_literal(&value).unwrap_or(value));
            }
            "color" => {
                self.ctx.metadata.color = tables::color(&value).ok_or_else(|| {
                    self.semantic(
                        "S051",
                        format!(
                            "Invalid color '{value}'\n\n{}",
                            tables::key_list("Available colors:", tables::COLORS)
                        ),
                    )
                })?;
            }
            "glyph" => {
                self.ctx.metadata.glyph = tables::glyph(&value)
                    .ok_or_else(|| self.semantic("S051", format!("Invalid glyph '{value}'")))?;
            }
            "inputs" => {
                self.ctx.metadata.inputs =
                    self.table_list(&value, "content item", tables::CONTENT_ITEMS)?;
            }
            "outputs" => {
                self.ctx.metadata.outputs =
                    self.table_list(&value, "content item", tables::CONTENT_ITEMS)?;
            }
            "from" => {
                self.ctx.metadata.types =
                    self.table_list(&value, "workflow type", tables::WORKFLOW_TYPES)?;
            }
            "quickactions" => {
                self.ctx.metadata.quick_actions =
                    self.table_list(&value, "quick action", tables::QUICK_ACTIONS)?;
            }
            "noinput" => {
                let behavior = self.no_input_behavior(&value)?;
                self.ctx.metadata.no_input = Some(behavior);
            }
            "mac" => {
                self.ctx.metadata.mac = Some(match value.as_str() {
                    "true" => true,
                    "false" => false,
                    _ => return Err(self.error("P052", "Expected 'true' or 'false'")),
                });
            }
            "version" => {
                self.ctx
                    .metadata
                    .set_version(&value)
                    .map_err(|message| self.semantic("S050", message))?;
            }
            other => return Err(self.error("P051", format!("Unknown definition '{other}'"))),
        }
        Ok(())
    }

    /// Map a comma-separated list of names through a table.
    fn table_list(
        &self,
        value: &str,
        what: &str,
        table: &[(&str, &str)],
    ) -> Result<Vec<String>, CompilerError> {
        value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                table
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, mapped)| mapped.to_string())
                    .ok_or_else(|| {
                        self.semantic(
                            "S051",
                            format!(
                                "Invalid {what} '{name}'\n\n{}",
                                tables::key_list("Available values:", table)
                            ),
                        )
                    })
            })
            .collect()
    }

    fn no_input_behavior(&self, value: &str) -> Result<NoInputBehavior, CompilerError> {
        let (mode, argument) = match value.split_once(char::is_whitespace) {
            Some((mode, argument)) => (mode, argument.trim()),
            None => (value, ""),
        };
        let mut parameters = Map::new();
        let name = match mode {
            "stopwith" => {
                let message = unquote_literal(argument)
                    .ok_or_else(|| self.error("P052", "Expected a quoted error message"))?;
                parameters.insert("Error".into(), Json::String(message));
                NoInputBehavior::SHOW_ERROR
            }
            "askfor" => {
                let class = tables::content_item(argument).ok_or_else(|| {
                    self.semantic(
                        "S051",
                        format!(
                            "Invalid content item '{argument}'\n\n{}",
                            tables::key_list("Available values:", tables::CONTENT_ITEMS)
                        ),
                    )
                })?;
                parameters.insert("ItemClass".into(), Json::String(class.into()));
                NoInputBehavior::ASK_FOR_INPUT
            }
            "getclipboard" => NoInputBehavior::GET_CLIPBOARD,
            other => {
                return Err(self.error(
                    "P052",
                    format!("Unknown no-input mode '{other}'. Use stopwith, askfor or getclipboard"),
                ));
            }
        };
        Ok(NoInputBehavior {
            name: name.into(),
            parameters,
        })
    }

    /// `#define action 'identifier' name(params) type`
    fn parse_action_definition(&mut self) -> Result<(), CompilerError> {
        self.cursor.skip_spaces();
        if self.cursor.char() != Some('\'') {
            return Err(self.error("P052", "Expected quoted workflow identifier"));
        }
        self.cursor.advance();
        let identifier = self.cursor.collect_until('\'');
        self.cursor.advance();
        self.cursor.skip_spaces();

        let name = self.cursor.collect_identifier();
        if name.is_empty() || self.cursor.char() != Some('(') {
            return Err(self.error("P052", "Expected action name and parameter list"));
        }
        if self.ctx.catalog.contains(&name) || self.ctx.user_actions.contains_key(&name) {
            return Err(self.semantic("S054", format!("Action '{name}()' is already defined")));
        }
        let params = self.cursor.collect_balanced('(', ')')?;
        let parameters =
            parse_parameters(&params, &self.ctx.enums).map_err(|message| self.error("P031", message))?;

        let output = self.rest_of_line();
        let output = output.trim_start_matches(':').trim();
        let mut definition = if identifier.contains('.') {
            ActionDefinition::overridden(&identifier)
        } else {
            ActionDefinition::standard(&identifier)
        }
        .params(parameters);
        if !output.is_empty() {
            let output_type = ValueType::from_type_name(output)
                .ok_or_else(|| self.error("P031", format!("Unknown type '{output}'")))?;
            definition = definition.output(output_type);
        }
        self.ctx.catalog.insert(name, definition);
        Ok(())
    }

    /// `#question identifier "prompt" "default"`
    fn parse_question(&mut self) -> Result<(), CompilerError> {
        self.cursor.skip_spaces();
        let identifier = self.cursor.collect_identifier();
        if identifier.is_empty() {
            return Err(self.error("P052", "Expected question identifier"));
        }
        if self.ctx.question(&identifier).is_some() {
            return Err(self.semantic(
                "S053",
                format!("Duplicate declaration of question '{identifier}'"),
            ));
        }
        let rest = self.rest_of_line();
        let mut literals = quoted_literals(&rest)
            .ok_or_else(|| self.error("P052", "Expected quoted question prompt"))?
            .into_iter();
        let text = literals
            .next()
            .ok_or_else(|| self.error("P052", "Expected quoted question prompt"))?;
        let default_value = literals.next().unwrap_or_default();
        self.ctx.questions.push(Question {
            identifier,
            text,
            default_value,
            wired: None,
            used: false,
        });
        Ok(())
    }
}

/// Consecutive quoted strings separated by whitespace.
fn quoted_literals(text: &str) -> Option<Vec<String>> {
    let mut literals = Vec::new();
    let mut chars = text.trim().chars().peekable();
    while let Some(quote) = chars.next() {
        if !matches!(quote, '"' | '\'') {
            return None;
        }
        let mut literal = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek() == Some(&quote) => {
                    literal.push(quote);
                    chars.next();
                }
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => literal.push(c),
            }
        }
        if !closed {
            return None;
        }
        literals.push(literal);
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
    }
    Some(literals)
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
    fn metadata_definitions() {
        let ctx = parse_source(
            "#define name Daily Log\n#define color red\n#define glyph house\n#define inputs text, image\n#define from sharesheet\n#define mac false\n#define version 17",
        )
        .unwrap();
        let meta = &ctx.metadata;
        assert_eq!(meta.name.as_deref(), Some("Daily Log"));
        assert_eq!(meta.color, 4282601983);
        assert_eq!(meta.glyph, 59755);
        assert_eq!(meta.inputs, vec!["WFStringContentItem", "WFImageContentItem"]);
        assert_eq!(meta.types, vec!["ActionExtension"]);
        assert_eq!(meta.mac, Some(false));
        assert_eq!(meta.client_version, "2106.0.3");
    }

    #[test]
    fn invalid_table_values_list_alternatives() {
        let err = parse_source("#define color mauve").err().unwrap();
        assert_eq!(err.code, "S051");
        assert!(err.message.contains("- red"));
        let err = parse_source("#define version 3").err().unwrap();
        assert_eq!(err.code, "S050");
    }

    #[test]
    fn no_input_modes() {
        let ctx = parse_source("#define noinput stopwith \"Need input\"").unwrap();
        let behavior = ctx.metadata.no_input.unwrap();
        assert_eq!(behavior.name, NoInputBehavior::SHOW_ERROR);
        assert_eq!(behavior.parameters["Error"], "Need input");

        let ctx = parse_source("#define noinput askfor text").unwrap();
        let behavior = ctx.metadata.no_input.unwrap();
        assert_eq!(behavior.parameters["ItemClass"], "WFStringContentItem");

        let ctx = parse_source("#define noinput getclipboard").unwrap();
        assert!(ctx.metadata.no_input.unwrap().parameters.is_empty());
    }

    #[test]
    fn questions_are_declared_once() {
        let ctx = parse_source("#question who \"Who are you?\" \"me\"").unwrap();
        let question = ctx.question("who").unwrap();
        assert_eq!(question.text, "Who are you?");
        assert_eq!(question.default_value, "me");

        let err = parse_source("#question who \"A\" \"\"\n#question who \"B\" \"\"").err().unwrap();
        assert_eq!(err.code, "S053");
    }

    #[test]
    fn defined_actions_join_the_catalog() {
        let ctx = parse_source(
            "#define action 'com.example.greet' greet(text name) text\n@g = greet(\"Ada\")",
        )
        .unwrap();
        let definition = ctx.catalog.get("greet").unwrap();
        assert_eq!(definition.resolved_identifier("greet"), "com.example.greet");
        assert_eq!(definition.output_type, Some(ValueType::Text));
        assert_eq!(ctx.variables["g"].value_type, ValueType::Text);

        let ctx = parse_source("#define action 'beep' beep()").unwrap();
        assert_eq!(
            ctx.catalog.get("beep").unwrap().resolved_identifier("beep"),
            "is.workflow.actions.beep"
        );
    }

    #[test]
    fn directive_errors() {
        assert_eq!(parse_source("#import \"nope\"").err().unwrap().code, "S052");
        assert_eq!(parse_source("#define weather sunny").err().unwrap().code, "P051");
        assert_eq!(parse_source("#pragma once").err().unwrap().code, "P051");
    }

    #[test]
    fn quoted_literal_lists() {
        assert_eq!(
            quoted_literals(r#""a b" 'c\'d'"#),
            Some(vec!["a b".to_string(), "c'd".to_string()])
        );
        assert_eq!(quoted_literals("bare"), None);
    }
}
