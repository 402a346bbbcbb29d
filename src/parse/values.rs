//! Value literals: strings with inline references, raw strings, numbers,
//! JSON dictionaries and arrays, expressions and variable references.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as Json;

use super::Parser;
use super::types::{Refs, Template, Value, VarRef};
use crate::error::{CompilerError, Phase};
use crate::tables;

/// `{name}`, `{name['key']}`, `{name.coerce}` inside a string.
pub static INLINE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_]+)(?:\['([^']*)'\])?(?:\.([A-Za-z0-9_]+))?\}").expect("inline pattern")
});

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)(?:\['([^']*)'\])?(?:\.([A-Za-z0-9_]+))?$")
        .expect("reference pattern")
});

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("integer pattern"));

static FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+\.[0-9]+$").expect("float pattern"));

pub(crate) static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_\s.()]*[-+*/%][A-Za-z0-9_\s.()+*/%-]*$").expect("expression pattern")
});

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("identifier pattern"));

/// Operands joined by binary operators, with balanced parentheses and an
/// optional leading minus on any operand. At least one operator is required.
pub(crate) fn is_arithmetic(raw: &str) -> bool {
    let mut chars = raw.chars().peekable();
    let mut depth = 0usize;
    let mut operators = 0;
    let mut expect_operand = true;
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if expect_operand {
            match c {
                '(' => depth += 1,
                '-' => {}
                c if c.is_ascii_alphanumeric() || c == '_' || c == '.' => {
                    while chars
                        .peek()
                        .is_some_and(|n| n.is_ascii_alphanumeric() || *n == '_' || *n == '.')
                    {
                        chars.next();
                    }
                    expect_operand = false;
                }
                _ => return false,
            }
        } else {
            match c {
                ')' if depth > 0 => depth -= 1,
                '+' | '-' | '*' | '/' | '%' => {
                    operators += 1;
                    expect_operand = true;
                }
                _ => return false,
            }
        }
    }
    !expect_operand && depth == 0 && operators > 0
}

/// Where an unstructured value stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    /// End of line or a trailing `//` comment.
    Line,
    /// `,` or `)` of an argument list.
    Argument,
    /// The `{` opening a block.
    Block,
    /// Whitespace, inside conditions.
    Space,
    /// The `:` after a menu item label.
    Colon,
}

impl End {
    fn stops(&self, c: char, next: Option<char>) -> bool {
        match self {
            End::Line => c == '\n' || (c == '/' && next == Some('/')),
            End::Argument => matches!(c, ',' | ')' | '\n'),
            End::Block => matches!(c, '{' | '\n'),
            End::Space => c.is_whitespace() || matches!(c, '{' | ','),
            End::Colon => matches!(c, ':' | '\n'),
        }
    }
}

/// Strip matching single or double quotes and unescape the quote character.
pub fn unquote_literal(text: &str) -> Option<String> {
    let quote = text.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
    Some(inner.replace(&format!("\\{quote}"), &quote.to_string()))
}

impl Parser<'_> {
    pub(crate) fn parse_value(&mut self, end: End) -> Result<Value, CompilerError> {
        self.cursor.skip_spaces();
        match self.cursor.char() {
            None => Err(self.error("P010", "Expected value")),
            Some('"') => self.parse_string(),
            Some('\'') => self.parse_raw_string(),
            Some('{') => self.parse_dictionary(),
            Some('[') => self.parse_array(),
            Some(_) => {
                let start = self.cursor.idx();
                let identifier = self.cursor.collect_identifier();
                if !identifier.is_empty() && self.cursor.char() == Some('(') {
                    return self.parse_call(&identifier);
                }
                self.cursor.seek(start);
                let raw = self.collect_raw(end);
                self.classify(&raw)
            }
        }
    }

    /// Collect up to `end`, skipping over quotes and bracketed groups.
    fn collect_raw(&mut self, end: End) -> String {
        let start = self.cursor.idx();
        let mut depth = 0usize;
        while let Some(c) = self.cursor.char() {
            if depth == 0 && end.stops(c, self.cursor.next(1)) {
                break;
            }
            match c {
                '"' | '\'' => {
                    self.cursor.skip_quoted();
                    continue;
                }
                '(' | '[' => depth += 1,
                ')' | ']' if depth > 0 => depth -= 1,
                '\n' => break,
                _ => {}
            }
            self.cursor.advance();
        }
        self.cursor.text_between(start, self.cursor.idx()).trim().to_string()
    }

    fn classify(&mut self, raw: &str) -> Result<Value, CompilerError> {
        match raw {
            "" => return Err(self.error("P010", "Expected value")),
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            "nil" => return Ok(Value::Nil),
            _ => {}
        }
        if INTEGER.is_match(raw) {
            return raw
                .parse()
                .map(Value::Number)
                .map_err(|_| self.error("P012", format!("Number '{raw}' is out of range")));
        }
        if FLOAT.is_match(raw) {
            return raw
                .parse()
                .map(Value::Float)
                .map_err(|_| self.error("P012", format!("Invalid number '{raw}'")));
        }
        if let Some(captures) = REFERENCE.captures(raw) {
            let name = &captures[1];
            let key = captures.get(2).map(|m| m.as_str());
            let coerce = captures.get(3).map(|m| m.as_str());
            if let Some(reference) = self.reference(name, key, coerce)? {
                return Ok(Value::Variable(reference));
            }
            if key.is_none() && coerce.is_none() && self.ctx.question(name).is_some() {
                return Ok(Value::Question(name.to_string()));
            }
            return Err(self.undefined(name));
        }
        if EXPRESSION.is_match(raw) {
            if !is_arithmetic(raw) {
                return Err(self.error("P010", format!("Malformed expression '{raw}'")));
            }
            return self.expression(raw);
        }
        Err(self.error("P010", format!("Unknown value '{raw}'")))
    }

    /// Resolve a reference and apply its key and coercion.
    pub(crate) fn reference(
        &mut self,
        name: &str,
        key: Option<&str>,
        coerce: Option<&str>,
    ) -> Result<Option<VarRef>, CompilerError> {
        let Some(mut reference) = self.resolve(name) else {
            return Ok(None);
        };
        if let Some(coerce) = coerce {
            if tables::content_item(coerce).is_none() {
                return Err(self.semantic(
                    "S003",
                    format!(
                        "Invalid type coercion '{coerce}'\n\n{}",
                        tables::key_list("Available types:", tables::CONTENT_ITEMS)
                    ),
                ));
            }
            reference.coerce = Some(coerce.to_string());
        }
        reference.get_as = key.map(str::to_string);
        Ok(Some(reference))
    }

    pub(crate) fn undefined(&self, name: &str) -> CompilerError {
        let lower = name.to_lowercase();
        let hint = self
            .ctx
            .variables
            .keys()
            .map(String::as_str)
            .chain(crate::context::GLOBALS.iter().map(|(global, ..)| *global))
            .find(|candidate| candidate.to_lowercase() == lower);
        match hint {
            Some(hint) => self.semantic(
                "S001",
                format!("Undefined variable '{name}'. Did you mean '{hint}'?"),
            ),
            None => self.semantic("S001", format!("Undefined variable '{name}'")),
        }
    }

    fn expression(&mut self, raw: &str) -> Result<Value, CompilerError> {
        let mut template = Template::default();
        let mut last = 0;
        for found in IDENTIFIER.find_iter(raw) {
            let preceded_by_digit = raw[..found.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit() || c == '.');
            if preceded_by_digit {
                continue;
            }
            let name = found.as_str();
            let reference = self.resolve(name).ok_or_else(|| self.undefined(name))?;
            template.push_str(&raw[last..found.start()]);
            template.append(&Template::reference(&reference));
            last = found.end();
        }
        template.push_str(&raw[last..]);
        Ok(Value::Expression(template))
    }

    // =========================================================================
    // Strings
    // =========================================================================

    fn parse_string(&mut self) -> Result<Value, CompilerError> {
        self.cursor.advance();
        let mut text = String::new();
        loop {
            match self.cursor.char() {
                None => {
                    return Err(self.cursor.error(Phase::Lex, "L001", "Unterminated string"));
                }
                Some('"') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    let escaped = self.cursor.next(1);
                    match escaped {
                        Some('"') => text.push('"'),
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some('r') => text.push('\r'),
                        Some('\\') => text.push('\\'),
                        Some(other) => {
                            text.push('\\');
                            text.push(other);
                        }
                        None => {
                            return Err(self.cursor.error(Phase::Lex, "L001", "Unterminated string"));
                        }
                    }
                    self.cursor.advance_times(2);
                }
                Some(c) => {
                    text.push(c);
                    self.cursor.advance();
                }
            }
        }
        let refs = self.inline_references(&text)?;
        Ok(Value::Text(Template { text, refs }))
    }

    fn parse_raw_string(&mut self) -> Result<Value, CompilerError> {
        self.cursor.advance();
        let mut text = String::new();
        loop {
            match self.cursor.char() {
                None => {
                    return Err(self.cursor.error(Phase::Lex, "L001", "Unterminated raw string"));
                }
                Some('\'') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') if self.cursor.next(1) == Some('\'') => {
                    text.push('\'');
                    self.cursor.advance_times(2);
                }
                Some(c) => {
                    text.push(c);
                    self.cursor.advance();
                }
            }
        }
        Ok(Value::RawText(text))
    }

    /// Base references for every `{name}` in `text`. Keys and coercions stay
    /// in the text and are applied per site by the emitter.
    pub(crate) fn inline_references(&mut self, text: &str) -> Result<Refs, CompilerError> {
        let mut refs = Refs::new();
        for captures in INLINE_REFERENCE.captures_iter(text) {
            let name = &captures[1];
            let coerce = captures.get(3).map(|m| m.as_str());
            let mut reference = self
                .reference(name, None, coerce)?
                .ok_or_else(|| self.undefined(name))?;
            reference.coerce = None;
            refs.entry(name.to_string()).or_insert(reference);
        }
        Ok(refs)
    }

    // =========================================================================
    // JSON collections
    // =========================================================================

    fn parse_dictionary(&mut self) -> Result<Value, CompilerError> {
        let start = self.cursor.idx();
        let body = self.cursor.collect_balanced('{', '}')?;
        let json: Json = serde_json::from_str(&format!("{{{body}}}")).map_err(|err| {
            self.cursor.seek(start);
            self.error("P011", format!("Invalid dictionary: {err}"))
        })?;
        let Json::Object(entries) = json else {
            return Err(self.error("P011", "Invalid dictionary"));
        };
        let mut refs = Refs::new();
        for (key, value) in &entries {
            refs.extend(self.inline_references(key)?);
            self.json_references(value, &mut refs)?;
        }
        Ok(Value::Dictionary { entries, refs })
    }

    fn parse_array(&mut self) -> Result<Value, CompilerError> {
        let start = self.cursor.idx();
        let body = self.cursor.collect_balanced('[', ']')?;
        let json: Json = serde_json::from_str(&format!("[{body}]")).map_err(|err| {
            self.cursor.seek(start);
            self.error("P011", format!("Invalid array: {err}"))
        })?;
        let Json::Array(items) = json else {
            return Err(self.error("P011", "Invalid array"));
        };
        let mut refs = Refs::new();
        for item in &items {
            self.json_references(item, &mut refs)?;
        }
        Ok(Value::Array { items, refs })
    }

    fn json_references(&mut self, value: &Json, refs: &mut Refs) -> Result<(), CompilerError> {
        match value {
            Json::String(s) => refs.extend(self.inline_references(s)?),
            Json::Array(items) => {
                for item in items {
                    self.json_references(item, refs)?;
                }
            }
            Json::Object(map) => {
                for (key, item) in map {
                    refs.extend(self.inline_references(key)?);
                    self.json_references(item, refs)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CompileOptions, Context, VariableValue};
    use crate::parse::types::ValueType;
    use crate::source::Cursor;

    fn value(source: &str, end: End) -> Result<Value, CompilerError> {
        let mut ctx = Context::new(CompileOptions::default())?;
        ctx.variables
            .insert("name".into(), VariableValue::new(ValueType::Text, None, false));
        ctx.variables
            .insert("n".into(), VariableValue::new(ValueType::Number, None, false));
        let mut cursor = Cursor::new(source, "main.cherri");
        let mut parser = Parser::new(&mut ctx, &mut cursor);
        parser.parse_value(end)
    }

    #[test]
    fn strings_unescape_and_collect_references() {
        let Value::Text(template) = value(r#""a\"b\n{name}""#, End::Line).unwrap() else {
            panic!("expected text");
        };
        assert_eq!(template.text, "a\"b\n{name}");
        assert!(template.refs.contains_key("name"));
    }

    #[test]
    fn undefined_inline_reference_is_an_error() {
        let err = value(r#""hi {who}""#, End::Line).unwrap_err();
        assert_eq!(err.code, "S001");
    }

    #[test]
    fn numbers_and_literals() {
        assert_eq!(value("42", End::Line).unwrap(), Value::Number(42));
        assert_eq!(value("-1.5", End::Line).unwrap(), Value::Float(-1.5));
        assert_eq!(value("true", End::Line).unwrap(), Value::Bool(true));
        assert_eq!(value("nil", End::Line).unwrap(), Value::Nil);
        assert_eq!(value("'raw {x}'", End::Line).unwrap(), Value::RawText("raw {x}".into()));
    }

    #[test]
    fn expressions_wrap_identifiers() {
        let Value::Expression(template) = value("n * 2 + 1", End::Line).unwrap() else {
            panic!("expected expression");
        };
        assert_eq!(template.text, "{n} * 2 + 1");
        assert!(template.refs.contains_key("n"));
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        for raw in ["-", "1 +", "n * * 2", "(n + 1", "n + 1)"] {
            let err = value(raw, End::Line).unwrap_err();
            assert_eq!(err.code, "P010", "{raw}");
        }
        assert!(is_arithmetic("(n + 1) * -2"));
        assert!(is_arithmetic("n % 3"));
        assert!(!is_arithmetic("n"));
        assert!(!is_arithmetic("a b + 1"));
    }

    #[test]
    fn references_carry_key_and_coercion() {
        let Value::Variable(reference) = value("name['first'].text", End::Line).unwrap() else {
            panic!("expected variable");
        };
        assert_eq!(reference.get_as.as_deref(), Some("first"));
        assert_eq!(reference.coerce.as_deref(), Some("text"));

        let err = value("name.bogus", End::Line).unwrap_err();
        assert_eq!(err.code, "S003");
    }

    #[test]
    fn dictionaries_parse_as_json() {
        let Value::Dictionary { entries, refs } =
            value(r#"{"a": 1, "b": ["{name}"]}"#, End::Line).unwrap()
        else {
            panic!("expected dictionary");
        };
        assert_eq!(entries.len(), 2);
        assert!(refs.contains_key("name"));
    }

    #[test]
    fn argument_values_stop_at_commas() {
        let mut ctx = Context::new(CompileOptions::default()).unwrap();
        let mut cursor = Cursor::new("5, 6)", "main.cherri");
        let mut parser = Parser::new(&mut ctx, &mut cursor);
        assert_eq!(parser.parse_value(End::Argument).unwrap(), Value::Number(5));
        assert_eq!(parser.cursor.char(), Some(','));
    }

    #[test]
    fn unquote_handles_both_quotes() {
        assert_eq!(unquote_literal("'it\\'s'").as_deref(), Some("it's"));
        assert_eq!(unquote_literal("\"x\"").as_deref(), Some("x"));
        assert_eq!(unquote_literal("x"), None);
    }
}
