//! Shortcut → Cherri source.
//!
//! The walk mirrors what the emitter produces: a named producer followed by
//! a `setvariable` of the same name becomes `@name = value`, control flow
//! groups become blocks, and catalog actions are matched back to their call
//! form. Anything without a faithful source form is written through
//! `rawAction()` with a warning so recompiling keeps identifiers and keys.

mod matcher;
mod names;
mod values;
mod writer;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Value as Json, json};
use tracing::{debug, debug_span};

use crate::catalog::Catalog;
use crate::codegen::ARITHMETIC;
use crate::error::{CompilerError, Diagnostic};
use crate::parse::types::{ConditionOperator, FilterPrefix};
use crate::parse::values::{EXPRESSION, is_arithmetic};
use crate::shortcut::{NoInputBehavior, Shortcut, ShortcutAction};
use crate::tables;

use matcher::OUTPUT_KEYS;
use names::{Names, sanitize};
pub use values::{json_literal, string_literal};
pub use writer::CodeWriter;

static WRAPPED_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("wrapped identifier pattern")
});

static PLAIN_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("plain identifier pattern"));

/// Source recovered from a Shortcut, with everything that could not be
/// expressed exactly.
#[derive(Debug, Clone, Serialize)]
pub struct Decompilation {
    pub source: String,
    pub warnings: Vec<Diagnostic>,
}

pub fn decompile(shortcut: &Shortcut) -> Result<Decompilation, CompilerError> {
    let _span = debug_span!("decompile", actions = shortcut.actions.len()).entered();
    let mut decompiler = Decompiler::new(shortcut);
    decompiler.preamble();
    decompiler.body()?;
    debug!(warnings = decompiler.warnings.len(), "decompiled");
    Ok(Decompilation {
        source: decompiler.writer.finish(),
        warnings: decompiler.warnings,
    })
}

enum Block {
    Conditional,
    Loop(String),
    Menu { has_item: bool },
}

pub(crate) struct Decompiler<'a> {
    shortcut: &'a Shortcut,
    catalog: Catalog,
    names: Names,
    /// (action index, parameter key) → question identifier.
    questions: HashMap<(usize, String), String>,
    blocks: Vec<Block>,
    writer: CodeWriter,
    warnings: Vec<Diagnostic>,
}

impl<'a> Decompiler<'a> {
    fn new(shortcut: &'a Shortcut) -> Self {
        Decompiler {
            shortcut,
            catalog: Catalog::standard(),
            names: Names::scan(&shortcut.actions),
            questions: HashMap::new(),
            blocks: Vec::new(),
            writer: CodeWriter::new(),
            warnings: Vec::new(),
        }
    }

    /// Alias of the loop `depth` levels deep, outermost first.
    pub(crate) fn loop_alias(&self, depth: usize) -> Option<&str> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Loop(alias) => Some(alias.as_str()),
                _ => None,
            })
            .nth(depth.checked_sub(1)?)
    }

    fn loop_depth(&self) -> usize {
        self.blocks.iter().filter(|block| matches!(block, Block::Loop(_))).count()
    }

    // -------------------------------------------------------------------------
    // Header
    // -------------------------------------------------------------------------

    fn preamble(&mut self) {
        let shortcut = self.shortcut;
        let mut lines = Vec::new();

        if let Some(name) = &shortcut.name {
            lines.push(format!("#define name {name}"));
        }
        if shortcut.icon.start_color != tables::DEFAULT_COLOR {
            match tables::color_name(shortcut.icon.start_color) {
                Some(color) => lines.push(format!("#define color {color}")),
                None => self.warn(
                    "W014",
                    format!("Icon color {} has no name", shortcut.icon.start_color),
                ),
            }
        }
        if shortcut.icon.glyph_number != tables::DEFAULT_GLYPH {
            match tables::glyph_name(shortcut.icon.glyph_number) {
                Some(glyph) => lines.push(format!("#define glyph {glyph}")),
                None => self.warn(
                    "W014",
                    format!("Icon glyph {} has no name", shortcut.icon.glyph_number),
                ),
            }
        }
        if !shortcut.input_content_item_classes.is_empty()
            && shortcut.input_content_item_classes != tables::all_content_item_classes()
        {
            let inputs = self.listing(&shortcut.input_content_item_classes, tables::content_item_name);
            lines.push(format!("#define inputs {inputs}"));
        }
        if !shortcut.output_content_item_classes.is_empty() {
            let outputs = self.listing(&shortcut.output_content_item_classes, tables::content_item_name);
            lines.push(format!("#define outputs {outputs}"));
        }
        if !shortcut.types.is_empty() {
            let types = self.listing(&shortcut.types, tables::workflow_type_name);
            lines.push(format!("#define from {types}"));
        }
        if !shortcut.quick_action_surfaces.is_empty() {
            let surfaces = self.listing(&shortcut.quick_action_surfaces, tables::quick_action_name);
            lines.push(format!("#define quickactions {surfaces}"));
        }
        if let Some(behavior) = &shortcut.no_input_behavior {
            if let Some(line) = self.no_input(behavior) {
                lines.push(line);
            }
        }
        let default_client = tables::version(tables::DEFAULT_VERSION).map(|(client, _)| client);
        if !shortcut.client_version.is_empty() && Some(shortcut.client_version.as_str()) != default_client {
            match tables::version_name(&shortcut.client_version) {
                Some(version) => lines.push(format!("#define version {version}")),
                None => self.warn(
                    "W014",
                    format!("Client version '{}' has no selector", shortcut.client_version),
                ),
            }
        }

        for (n, question) in shortcut.import_questions.iter().enumerate() {
            let identifier = format!("question{}", n + 1);
            lines.push(format!(
                "#question {identifier} {} {}",
                string_literal(&question.text),
                string_literal(&question.default_value)
            ));
            self.questions
                .insert((question.action_index, question.parameter_key.clone()), identifier);
        }

        for line in &lines {
            self.writer.line(line);
        }
        if !lines.is_empty() {
            self.writer.blank();
        }
    }

    fn listing(&mut self, values: &[String], name: fn(&str) -> Option<&'static str>) -> String {
        let mut names = Vec::with_capacity(values.len());
        for value in values {
            match name(value) {
                Some(known) => names.push(known),
                None => self.warn("W014", format!("'{value}' has no source name")),
            }
        }
        names.join(", ")
    }

    fn no_input(&mut self, behavior: &NoInputBehavior) -> Option<String> {
        let parameter = |key: &str| behavior.parameters.get(key).and_then(Json::as_str);
        match behavior.name.as_str() {
            NoInputBehavior::SHOW_ERROR => Some(format!(
                "#define noinput stopwith {}",
                string_literal(parameter("Error").unwrap_or_default())
            )),
            NoInputBehavior::ASK_FOR_INPUT => {
                let class = parameter("ItemClass").and_then(tables::content_item_name)?;
                Some(format!("#define noinput askfor {class}"))
            }
            NoInputBehavior::GET_CLIPBOARD => Some("#define noinput getclipboard".into()),
            other => {
                self.warn("W014", format!("Unknown no-input behavior '{other}'"));
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    fn body(&mut self) -> Result<(), CompilerError> {
        let mut index = 0;
        while index < self.shortcut.actions.len() {
            index += self.statement(index)?;
        }
        while let Some(block) = self.blocks.pop() {
            self.warn("W013", "Control flow block is never closed");
            if matches!(block, Block::Menu { has_item: true }) {
                self.writer.dedent();
            }
            self.writer.block_close();
        }
        Ok(())
    }

    /// Write the statement starting at `index`; returns how many actions it
    /// consumed.
    fn statement(&mut self, index: usize) -> Result<usize, CompilerError> {
        let shortcut = self.shortcut;
        let actions = &shortcut.actions;
        let action = &actions[index];
        let short = action.short_identifier();

        if let Some(mode) = action.control_flow_mode() {
            if is_control(short) {
                self.control(action, mode)?;
                return Ok(1);
            }
        }
        match short {
            "nothing" if action.parameters.is_empty() => {
                let separator = actions
                    .get(index + 1)
                    .and_then(ShortcutAction::control_flow_mode)
                    .is_some_and(|mode| mode == 1 || mode == 2);
                if !separator {
                    self.writer.line("nothing()");
                }
                Ok(1)
            }
            "setvariable" => {
                self.set_variable(action);
                Ok(1)
            }
            "appendvariable" if action.param("WFInput").is_some() => {
                self.append_variable(action);
                Ok(1)
            }
            _ => Ok(self.producer(index)),
        }
    }

    fn set_variable(&mut self, action: &ShortcutAction) {
        let name = sanitize(action.param_str("WFVariableName").unwrap_or_default());
        let line = match action.param("WFInput") {
            None if self.names.is_appended(&name) => Some(format!("@{name}: array")),
            None => Some(format!("@{name}: variable")),
            Some(input) => self.value(input).map(|value| format!("@{name} = {value}")),
        };
        match line {
            Some(line) if only_keys(action, &["WFInput", "WFVariableName"]) => self.writer.line(&line),
            _ => {
                let raw = self.raw(action);
                self.writer.line(&raw);
            }
        }
    }

    fn append_variable(&mut self, action: &ShortcutAction) {
        let name = sanitize(action.param_str("WFVariableName").unwrap_or_default());
        let value = action.param("WFInput").and_then(|input| self.value(input));
        match value {
            Some(value) if only_keys(action, &["WFInput", "WFVariableName"]) => {
                self.writer.line(&format!("@{name} += {value}"));
            }
            _ => {
                let raw = self.raw(action);
                self.writer.line(&raw);
            }
        }
    }

    /// A value-producing or catalog action, possibly folded together with
    /// the `setvariable` or `appendvariable` that consumes it.
    fn producer(&mut self, index: usize) -> usize {
        let shortcut = self.shortcut;
        let actions = &shortcut.actions;
        let action = &actions[index];
        let expression = self.expression(index, action);

        let output = action.uuid().and_then(|uuid| {
            let named = action.param("CustomOutputName").is_some() || self.names.uses(uuid) > 0;
            let name = self.names.output(uuid)?;
            named.then(|| (uuid, name.to_string()))
        });
        let Some((uuid, name)) = output else {
            self.writer.line(&expression);
            return 1;
        };

        if let Some(next) = actions.get(index + 1) {
            let consumes = input_uuid(next) == Some(uuid)
                && only_keys(next, &["WFInput", "WFVariableName"]);
            let variable = next.param_str("WFVariableName").map(sanitize);
            match next.short_identifier() {
                "setvariable" if consumes && variable.as_deref() == Some(name.as_str()) => {
                    self.writer.line(&format!("@{name} = {expression}"));
                    return 2;
                }
                "appendvariable" if consumes && self.names.uses(uuid) == 1 => {
                    let variable = variable.unwrap_or_default();
                    self.writer.line(&format!("@{variable} += {expression}"));
                    return 2;
                }
                _ => {}
            }
        }
        self.writer.line(&format!("const {name} = {expression}"));
        1
    }

    /// The right-hand side for an action: a literal for plain producers, a
    /// catalog call, or `rawAction()`.
    fn expression(&mut self, index: usize, action: &ShortcutAction) -> String {
        if let Some(literal) = self.literal(index, action) {
            return literal;
        }
        if let Some(call) = self.call(index, action) {
            return call;
        }
        self.raw(action)
    }

    fn literal(&mut self, index: usize, action: &ShortcutAction) -> Option<String> {
        match action.short_identifier() {
            "gettext" if only_keys(action, &["WFTextActionText"]) => {
                if let Some(question) = self.questions.get(&(index, "WFTextActionText".to_string())) {
                    return Some(question.clone());
                }
                match action.param("WFTextActionText") {
                    Some(param) => self.token_literal(param),
                    None => Some(string_literal("")),
                }
            }
            "number" if only_keys(action, &["WFNumberActionNumber"]) => {
                match action.param("WFNumberActionNumber")? {
                    Json::Number(n) => Some(n.to_string()),
                    Json::String(s) if s.parse::<f64>().is_ok() => Some(s.clone()),
                    _ => None,
                }
            }
            "dictionary" if only_keys(action, &["WFItems"]) => match action.param("WFItems") {
                Some(items) => {
                    let dictionary = self.dictionary(items)?;
                    Some(json_literal(&dictionary))
                }
                None => Some("{}".into()),
            },
            "math" => self.math(action),
            "calculateexpression" if only_keys(action, &["Input"]) => {
                let text = self.token_text(action.param("Input")?)?;
                if ARITHMETIC.is_match(&text) {
                    return None;
                }
                let expression = WRAPPED_IDENTIFIER.replace_all(&text, "$1").into_owned();
                (EXPRESSION.is_match(&expression) && is_arithmetic(&expression))
                    .then_some(expression)
            }
            _ => None,
        }
    }

    /// `a + b` for the arithmetic and modulus forms of the math action.
    fn math(&mut self, action: &ShortcutAction) -> Option<String> {
        let symbol = match action.param_str("WFMathOperation")? {
            "+" => "+",
            "-" => "-",
            "×" => "*",
            "÷" => "/",
            "…" if action.param_str("WFScientificMathOperation") == Some("Modulus") => "%",
            _ => return None,
        };
        let operand_key = if symbol == "%" {
            if !only_keys(
                action,
                &["WFInput", "WFMathOperation", "WFScientificMathOperation", "WFScientificMathOperand"],
            ) {
                return None;
            }
            "WFScientificMathOperand"
        } else {
            if !only_keys(action, &["WFInput", "WFMathOperation", "WFMathOperand"]) {
                return None;
            }
            "WFMathOperand"
        };
        let lhs = self.math_operand(action.param("WFInput")?)?;
        let rhs = self.math_operand(action.param(operand_key)?)?;
        Some(format!("{lhs} {symbol} {rhs}"))
    }

    fn math_operand(&mut self, param: &Json) -> Option<String> {
        match param {
            Json::Number(n) => Some(n.to_string()),
            Json::String(s) if s.parse::<f64>().is_ok() => Some(s.clone()),
            _ => {
                let reference = self.attachment(param)?;
                PLAIN_IDENTIFIER.is_match(&reference).then_some(reference)
            }
        }
    }

    /// `name(args)` for the best catalog match.
    fn call(&mut self, index: usize, action: &ShortcutAction) -> Option<String> {
        let (name, definition) = matcher::best_match(&self.catalog, action)?;
        let (name, definition) = (name.to_string(), definition.clone());

        let mut args: Vec<Option<String>> = Vec::new();
        for param in &definition.parameters {
            if param.key.is_empty() {
                args.push(None);
                continue;
            }
            if let Some(question) = self.questions.get(&(index, param.key.clone())) {
                args.push(Some(question.clone()));
                continue;
            }
            match action.param(&param.key) {
                None => args.push(None),
                Some(Json::Array(items)) if param.infinite => {
                    for item in items {
                        args.push(Some(self.value(item)?));
                    }
                }
                Some(value) => args.push(Some(self.value(value)?)),
            }
        }
        while matches!(args.last(), Some(None)) {
            args.pop();
        }
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.unwrap_or_else(|| "nil".into()))
            .collect();
        Some(format!("{name}({})", args.join(", ")))
    }

    /// `rawAction("identifier", [{"Key": value}, ...])`.
    fn raw(&mut self, action: &ShortcutAction) -> String {
        self.warn(
            "W012",
            format!("'{}' has no source form; written as rawAction()", action.identifier),
        );
        let entries: Vec<Json> = action
            .parameters
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "UUID" | "CustomOutputName"))
            .map(|(key, value)| json!({ key: value }))
            .collect();
        if entries.is_empty() {
            format!("rawAction({})", string_literal(&action.identifier))
        } else {
            format!(
                "rawAction({}, {})",
                string_literal(&action.identifier),
                json_literal(&Json::Array(entries))
            )
        }
    }

    // -------------------------------------------------------------------------
    // Control flow
    // -------------------------------------------------------------------------

    fn control(&mut self, action: &ShortcutAction, mode: i64) -> Result<(), CompilerError> {
        match (action.short_identifier(), mode) {
            ("conditional", 0) => {
                let conditions = self.conditions(action)?;
                self.writer.block_open(&format!("if {conditions}"));
                self.blocks.push(Block::Conditional);
            }
            ("conditional", 1) => self.writer.block_else(),
            ("repeat.count", 0) => {
                let depth = self.loop_depth() + 1;
                let alias = numbered("i", depth);
                let count = action
                    .param("WFRepeatCount")
                    .and_then(|count| self.value(count))
                    .ok_or_else(|| CompilerError::decompile("D001", "Repeat has no count"))?;
                self.writer.block_open(&format!("repeat {alias} for {count}"));
                self.blocks.push(Block::Loop(alias));
            }
            ("repeat.each", 0) => {
                let depth = self.loop_depth() + 1;
                let alias = numbered("item", depth);
                let iterable = action
                    .param("WFInput")
                    .and_then(|input| self.value(input))
                    .ok_or_else(|| CompilerError::decompile("D001", "Repeat each has no input"))?;
                self.writer.block_open(&format!("for {alias} in {iterable}"));
                self.blocks.push(Block::Loop(alias));
            }
            ("choosefrommenu", 0) => {
                let prompt = match action.param("WFMenuPrompt") {
                    Some(prompt) => self.value(prompt).unwrap_or_else(|| "\"\"".into()),
                    None => "\"\"".into(),
                };
                self.writer.block_open(&format!("menu {prompt}"));
                self.blocks.push(Block::Menu { has_item: false });
            }
            ("choosefrommenu", 1) => {
                let label = match action.param("WFMenuItemAttributedTitle") {
                    Some(title) => self.value(title),
                    None => action.param_str("WFMenuItemTitle").map(|title| self.text_literal(title)),
                }
                .unwrap_or_else(|| "\"\"".into());
                if let Some(Block::Menu { has_item }) = self.blocks.last_mut() {
                    if *has_item {
                        self.writer.dedent();
                    }
                    *has_item = true;
                }
                self.writer.line(&format!("item {label}:"));
                self.writer.indent();
            }
            (_, 2) => {
                match self.blocks.pop() {
                    Some(Block::Menu { has_item: true }) => self.writer.dedent(),
                    Some(_) => {}
                    None => {
                        return Err(CompilerError::decompile(
                            "D002",
                            format!("'{}' closes a block that was never opened", action.identifier),
                        ));
                    }
                }
                self.writer.block_close();
            }
            (short, mode) => {
                return Err(CompilerError::decompile(
                    "D002",
                    format!("'{short}' has no control flow mode {mode}"),
                ));
            }
        }
        Ok(())
    }

    fn conditions(&mut self, action: &ShortcutAction) -> Result<String, CompilerError> {
        let (prefix, templates) = match action.param("WFConditions").and_then(|c| c.get("Value")) {
            Some(table) => {
                let prefix = table
                    .get("WFActionParameterFilterPrefix")
                    .and_then(Json::as_i64)
                    .map_or(FilterPrefix::And, FilterPrefix::from_code);
                let templates = table
                    .get("WFActionParameterFilterTemplates")
                    .and_then(Json::as_array)
                    .cloned()
                    .unwrap_or_default();
                (prefix, templates)
            }
            None => (FilterPrefix::And, vec![Json::Object(action.parameters.clone())]),
        };
        let mut parts = Vec::with_capacity(templates.len());
        for template in &templates {
            parts.push(self.condition(template)?);
        }
        if parts.is_empty() {
            return Err(CompilerError::decompile("D001", "Conditional has no conditions"));
        }
        Ok(parts.join(&format!(" {} ", prefix.symbol())))
    }

    fn condition(&mut self, template: &Json) -> Result<String, CompilerError> {
        let input = template.get("WFInput");
        let subject = input
            .and_then(|input| input.get("Variable"))
            .or(input)
            .and_then(|variable| self.attachment(variable))
            .ok_or_else(|| CompilerError::decompile("D001", "Condition has no variable subject"))?;

        let code = template.get("WFCondition").and_then(Json::as_i64);
        let Some(operator) = code.and_then(ConditionOperator::from_code) else {
            self.warn(
                "W013",
                format!(
                    "Unknown condition {} on '{subject}'; written as a truthiness check",
                    code.map_or_else(|| "(none)".to_string(), |code| code.to_string())
                ),
            );
            return Ok(subject);
        };
        let number = |key: &str| template.get(key).and_then(number_text);
        let rendered = match operator {
            ConditionOperator::Any => Some(subject.clone()),
            ConditionOperator::Empty => Some(format!("!{subject}")),
            ConditionOperator::Between => number("WFNumberValue")
                .zip(number("WFAnotherNumber"))
                .map(|(low, high)| format!("{subject} between {low} and {high}")),
            binary => {
                let operand = match template.get("WFConditionalActionString") {
                    Some(text) => self.value(text),
                    None => match template.get("WFNumberValue") {
                        Some(value) => number_text(value).or_else(|| self.value(value)),
                        None => None,
                    },
                };
                operand.map(|operand| format!("{subject} {} {operand}", binary.symbol()))
            }
        };
        Ok(rendered.unwrap_or_else(|| {
            self.warn(
                "W013",
                format!("Condition on '{subject}' has no usable operand; written as a truthiness check"),
            );
            subject
        }))
    }
}

fn is_control(short: &str) -> bool {
    matches!(short, "conditional" | "repeat.count" | "repeat.each" | "choosefrommenu")
}

fn numbered(base: &str, depth: usize) -> String {
    if depth == 1 { base.to_string() } else { format!("{base}{depth}") }
}

fn number_text(value: &Json) -> Option<String> {
    match value {
        Json::Number(n) => Some(n.to_string()),
        Json::String(s) if s.parse::<f64>().is_ok() => Some(s.clone()),
        _ => None,
    }
}

fn input_uuid(action: &ShortcutAction) -> Option<&str> {
    action
        .param("WFInput")?
        .get("Value")?
        .get("OutputUUID")?
        .as_str()
}

/// Every key is one of `allowed` or an output key.
fn only_keys(action: &ShortcutAction, allowed: &[&str]) -> bool {
    action
        .parameters
        .keys()
        .all(|key| allowed.contains(&key.as_str()) || OUTPUT_KEYS.contains(&key.as_str()))
}
