//! User-defined actions.
//!
//! `action name(params) type? { body }` declarations are lifted out of the
//! buffer. When any of them is called, a dispatcher is prepended that reads
//! the call dictionary from the shortcut's own input, coerces the
//! arguments and runs the matching body. Calls themselves are lowered by
//! the parser into a `runSelf` invocation.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as Json;
use tracing::debug;

use super::{block_lines, erase_lines};
use crate::catalog::{EnumSource, ParameterDefinition};
use crate::context::{Context, UserAction};
use crate::error::{CompilerError, Phase};
use crate::parse::types::ValueType;
use crate::source::{Cursor, Origin};

static USAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+)\(").expect("usage pattern"));

static TERMINAL_OUTPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:mustOutput|outputOrClipboard|output)\(").expect("output pattern")
});

pub const GENERATED: &str = "(generated)";

pub fn resolve(ctx: &mut Context, cursor: &mut Cursor) -> Result<(), CompilerError> {
    cursor.reset();
    let mut erased = Vec::new();

    while cursor.seek_line_keyword("action") {
        let start_line = cursor.line_idx();
        let action = collect_declaration(ctx, cursor)?;
        erased.push((start_line, cursor.line_idx()));
        ctx.user_actions.insert(action.name.clone(), action);
    }
    if ctx.user_actions.is_empty() {
        return Ok(());
    }
    for (start, end) in erased {
        erase_lines(cursor, start, end);
    }

    let mut used: Vec<String> = Vec::new();
    let mut scanned: Vec<&str> = cursor.lines().iter().map(String::as_str).collect();
    for action in ctx.user_actions.values() {
        scanned.extend(action.body.iter().map(String::as_str));
    }
    for line in scanned {
        for capture in USAGE.captures_iter(line) {
            let name = &capture[1];
            if ctx.user_actions.contains_key(name) && !used.iter().any(|u| u == name) {
                used.push(name.to_string());
            }
        }
    }
    for name in &used {
        if let Some(action) = ctx.user_actions.get_mut(name) {
            action.used = true;
        }
    }
    if used.is_empty() {
        cursor.reset();
        return Ok(());
    }

    debug!(actions = ?used, "user actions used");
    ctx.uses_shortcut_input = true;
    let (lines, origins) = dispatcher(ctx);
    cursor.splice_lines(0, 0, lines, origins);
    cursor.reset();
    Ok(())
}

fn collect_declaration(ctx: &Context, cursor: &mut Cursor) -> Result<UserAction, CompilerError> {
    cursor.skip_spaces();
    let name = cursor.collect_identifier();
    if name.is_empty() {
        return Err(cursor.error(Phase::Preprocess, "R020", "Expected action identifier"));
    }
    if ctx.user_actions.contains_key(&name) || ctx.catalog.contains(&name) {
        return Err(cursor.error(
            Phase::Preprocess,
            "R021",
            format!("Duplicate declaration of action '{name}()'"),
        ));
    }
    cursor.skip_spaces();
    if cursor.char() != Some('(') {
        return Err(cursor.error(Phase::Preprocess, "R022", "Expected '('"));
    }
    let params = cursor.collect_balanced('(', ')')?;
    let parameters = parse_parameters(&params, &ctx.enums)
        .map_err(|msg| cursor.error(Phase::Preprocess, "R023", msg))?;

    cursor.skip_spaces();
    let mut output_type = None;
    if cursor.char().is_some_and(|c| c.is_ascii_alphabetic()) {
        let type_name = cursor.collect_identifier();
        output_type = Some(ValueType::from_type_name(&type_name).ok_or_else(|| {
            cursor.error(
                Phase::Preprocess,
                "R024",
                format!("Unknown type '{type_name}'"),
            )
        })?);
    }
    cursor.skip_whitespace();
    if cursor.char() != Some('{') {
        return Err(cursor.error(Phase::Preprocess, "R025", "Expected '{'"));
    }
    let body_line = cursor.line_idx();
    let body = cursor.collect_balanced('{', '}')?;
    let (body, body_origins) = block_lines(cursor, body_line, &body);

    Ok(UserAction {
        name,
        parameters,
        output_type,
        body,
        body_origins,
        used: false,
    })
}

// =============================================================================
// Parameter lists
// =============================================================================

/// Parse `type[?] name [: 'Key'] [= default], ...`. Also accepts `type ?name`
/// and `type ...name` for infinite parameters. A declared `enum` name is
/// accepted as a type and restricts the parameter to its values.
pub fn parse_parameters(
    text: &str,
    enums: &HashMap<String, Vec<String>>,
) -> Result<Vec<ParameterDefinition>, String> {
    split_top_level(text)
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .map(|part| parse_parameter(part.trim(), enums))
        .collect()
}

fn parse_parameter(
    text: &str,
    enums: &HashMap<String, Vec<String>>,
) -> Result<ParameterDefinition, String> {
    let (head, default) = match split_once_unquoted(text, '=') {
        Some((head, default)) => (head.trim(), Some(parse_default(default.trim())?)),
        None => (text, None),
    };
    let (head, key) = match split_once_unquoted(head, ':') {
        Some((head, key)) => (head.trim(), Some(unquote(key.trim())?)),
        None => (head, None),
    };

    let mut words = head.split_whitespace();
    let type_word = words
        .next()
        .ok_or_else(|| format!("Expected parameter type in '{text}'"))?;
    let name_word = words
        .next()
        .ok_or_else(|| format!("Expected parameter name in '{text}'"))?;
    if words.next().is_some() {
        return Err(format!("Unexpected text in parameter '{text}'"));
    }

    let mut optional = false;
    let type_name = match type_word.strip_suffix('?') {
        Some(stripped) => {
            optional = true;
            stripped
        }
        None => type_word,
    };
    let mut infinite = false;
    let name = if let Some(stripped) = name_word.strip_prefix("...") {
        infinite = true;
        stripped
    } else if let Some(stripped) = name_word.strip_prefix('?') {
        optional = true;
        stripped
    } else {
        name_word
    };
    let (valid_type, enumeration) = match ValueType::from_type_name(type_name) {
        Some(valid_type) => (valid_type, None),
        None if enums.contains_key(type_name) => {
            (ValueType::Text, Some(EnumSource::Named(type_name.to_string())))
        }
        None => return Err(format!("Unknown type '{type_name}'")),
    };
    if !name.chars().all(crate::source::cursor::is_ident_char) || name.is_empty() {
        return Err(format!("Invalid parameter name '{name}'"));
    }

    let mut param = ParameterDefinition::new(name, valid_type, key.as_deref().unwrap_or(""));
    param.optional = optional;
    param.infinite = infinite;
    param.default_value = default;
    param.enumeration = enumeration;
    Ok(param)
}

fn parse_default(text: &str) -> Result<Json, String> {
    if text.starts_with('"') || text.starts_with('\'') {
        return unquote(text).map(Json::String);
    }
    match text {
        "true" => return Ok(Json::Bool(true)),
        "false" => return Ok(Json::Bool(false)),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Json::from(n));
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Json::Number)
        .ok_or_else(|| format!("Invalid default value '{text}'"))
}

fn unquote(text: &str) -> Result<String, String> {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open @ ('"' | '\'')), Some(close)) if open == close && text.len() >= 2 => {
            Ok(text[1..text.len() - 1].replace("\\'", "'").replace("\\\"", "\""))
        }
        _ => Err(format!("Expected quoted string, found '{text}'")),
    }
}

/// Split on commas that are outside quotes and brackets.
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn split_once_unquoted(text: &str, sep: char) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, c) if c == sep => return Some((&text[..i], &text[i + 1..])),
            _ => {}
        }
    }
    None
}

// =============================================================================
// Dispatcher
// =============================================================================

struct Generated {
    lines: Vec<String>,
    origins: Vec<Origin>,
}

impl Generated {
    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        self.lines.push(format!("{}{}", "    ".repeat(depth), text.as_ref()));
        self.origins.push(Origin {
            file: GENERATED.into(),
            line: self.lines.len(),
        });
    }
}

fn dispatcher(ctx: &Context) -> (Vec<String>, Vec<Origin>) {
    let mut out = Generated {
        lines: Vec::new(),
        origins: Vec::new(),
    };
    out.line(0, "if ShortcutInput {");
    out.line(1, "@_cherri_empty_dictionary: dictionary");
    out.line(1, "const _cherri_dictionary_type_name = typeOf(_cherri_empty_dictionary)");
    out.line(1, "const _cherri_input_type = typeOf(ShortcutInput)");
    out.line(1, "if _cherri_input_type == _cherri_dictionary_type_name {");
    out.line(2, "const _cherri_input = getDictionary(ShortcutInput)");
    out.line(2, "const _cherri_identifier = getValue(_cherri_input, \"cherri_functions\")");
    out.line(2, "const _cherri_valid = number(_cherri_identifier)");
    out.line(2, "if _cherri_valid == 1 {");
    out.line(3, "const _cherri_function = getValue(_cherri_input, \"function\")");
    out.line(3, "const _cherri_function_name = \"{_cherri_function}\"");
    out.line(3, "const _cherri_function_args = getValue(_cherri_input, \"arguments\")");

    for action in ctx.user_actions.values().filter(|a| a.used) {
        out.line(3, format!("if _cherri_function_name == \"{}\" {{", action.name));
        for (i, param) in action.parameters.iter().enumerate() {
            argument_lines(&mut out, &action.name, i + 1, param);
        }
        for (line, origin) in action.body.iter().zip(&action.body_origins) {
            out.lines.push(line.clone());
            out.origins.push(origin.clone());
        }
        let terminal = action
            .body
            .iter()
            .rev()
            .find(|line| !line.trim().is_empty())
            .is_some_and(|line| TERMINAL_OUTPUT.is_match(line));
        if !terminal {
            out.line(4, "output(nil)");
        }
        out.line(3, "}");
    }

    out.line(2, "}");
    out.line(1, "}");
    out.line(0, "}");
    (out.lines, out.origins)
}

fn argument_lines(out: &mut Generated, action: &str, index: usize, param: &ParameterDefinition) {
    let name = &param.name;
    let arg = format!("_cherri_{action}_arg_{index}_{name}");
    out.line(4, format!("const {arg} = getListItem(_cherri_function_args, {index})"));
    out.line(4, format!("@{name}: {}", param.valid_type.name()));
    let coerced = match param.valid_type {
        ValueType::Text | ValueType::RawText => format!("\"{{{arg}}}\""),
        ValueType::Number | ValueType::Float | ValueType::Bool => format!("number({arg})"),
        ValueType::Dictionary => format!("getDictionary({arg})"),
        ValueType::Array => format!("getValue({arg}, \"array\")"),
        _ => arg.clone(),
    };
    out.line(4, format!("@{name} = {coerced}"));
    if let Some(default) = &param.default_value {
        out.line(4, format!("if !{arg} {{"));
        out.line(5, format!("@{name} = {default}"));
        out.line(4, "}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_accept_every_form() {
        let params = parse_parameters(
            "text name, number? count = 5, bool ?flag: 'WFFlag' = true, text ...rest",
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(params.len(), 4);
        assert_eq!(params[0].name, "name");
        assert!(params[0].is_required());
        assert!(params[1].optional);
        assert_eq!(params[1].default_value, Some(Json::from(5)));
        assert_eq!(params[2].key, "WFFlag");
        assert_eq!(params[2].default_value, Some(Json::Bool(true)));
        assert!(params[3].infinite);
    }

    #[test]
    fn parameter_defaults_keep_commas_inside_quotes() {
        let params = parse_parameters("text glue = \", \", number n", &HashMap::new()).unwrap();
        assert_eq!(params[0].default_value, Some(Json::String(", ".into())));
        assert_eq!(params[1].name, "n");
    }

    #[test]
    fn unknown_parameter_type_is_rejected() {
        let err = parse_parameters("string name", &HashMap::new()).unwrap_err();
        assert_eq!(err, "Unknown type 'string'");

        let mut enums = HashMap::new();
        enums.insert("Unit".to_string(), vec!["cm".to_string(), "in".to_string()]);
        let params = parse_parameters("Unit unit", &enums).unwrap();
        assert_eq!(params[0].enumeration, Some(EnumSource::Named("Unit".into())));
    }

    #[test]
    fn declarations_are_lifted_and_dispatcher_prepended() {
        let mut ctx = Context::new(Default::default()).unwrap();
        let mut cursor = Cursor::new(
            "action double(number x) number {\n    output(x * 2)\n}\n@y = double(21)",
            "main.cherri",
        );
        resolve(&mut ctx, &mut cursor).unwrap();
        let action = &ctx.user_actions["double"];
        assert!(action.used);
        assert_eq!(action.output_type, Some(ValueType::Number));

        let lines = cursor.lines();
        assert_eq!(lines[0], "if ShortcutInput {");
        assert!(lines.iter().any(|l| l.trim() == "@x = number(_cherri_double_arg_1_x)"));
        assert!(!lines.iter().any(|l| l.trim() == "output(nil)"));
        assert_eq!(lines.last().map(String::as_str), Some("@y = double(21)"));
        assert_eq!(cursor.origins()[0].file, GENERATED);
    }

    #[test]
    fn unused_actions_add_no_dispatcher() {
        let mut ctx = Context::new(Default::default()).unwrap();
        let mut cursor = Cursor::new("action noop() {\n    show(\"x\")\n}\nshow(\"y\")", "main.cherri");
        resolve(&mut ctx, &mut cursor).unwrap();
        assert!(!ctx.user_actions["noop"].used);
        assert_eq!(cursor.lines()[0], "");
    }
}
