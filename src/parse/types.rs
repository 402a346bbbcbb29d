//! Token stream and value types produced by the parser and consumed by the
//! emitter.

use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};

// =============================================================================
// Value types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Text,
    RawText,
    Number,
    Float,
    Bool,
    Dictionary,
    Array,
    /// Any value. As a parameter type it accepts every argument.
    Variable,
    Nil,
    Expression,
    Action,
    Question,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Text => "text",
            ValueType::RawText => "rawtext",
            ValueType::Number => "number",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::Dictionary => "dictionary",
            ValueType::Array => "array",
            ValueType::Variable => "variable",
            ValueType::Nil => "nil",
            ValueType::Expression => "expression",
            ValueType::Action => "action",
            ValueType::Question => "question",
        }
    }

    /// Types that may be written in declarations and parameter lists.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(ValueType::Text),
            "rawtext" => Some(ValueType::RawText),
            "number" => Some(ValueType::Number),
            "float" => Some(ValueType::Float),
            "bool" => Some(ValueType::Bool),
            "dictionary" => Some(ValueType::Dictionary),
            "array" => Some(ValueType::Array),
            "variable" => Some(ValueType::Variable),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Number | ValueType::Float)
    }
}

// =============================================================================
// References
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Variable,
    ExtensionInput,
    Clipboard,
    CurrentDate,
    DeviceDetails,
    Ask,
}

impl VariableKind {
    /// The `Type` written into a reference's `Value` dictionary.
    pub fn plist_type(&self) -> &'static str {
        match self {
            VariableKind::Variable => "Variable",
            VariableKind::ExtensionInput => "ExtensionInput",
            VariableKind::Clipboard => "Clipboard",
            VariableKind::CurrentDate => "CurrentDate",
            VariableKind::DeviceDetails => "DeviceDetails",
            VariableKind::Ask => "Ask",
        }
    }
}

/// A resolved reference to a variable, constant, global or loop alias.
/// Resolution happens in the parser so that scoped names such as loop
/// aliases keep the meaning they had at the point of use.
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    /// Identifier as written in source.
    pub name: String,
    /// Name written into the plist (`VariableName` or `OutputName`).
    pub target: String,
    pub kind: VariableKind,
    pub value_type: ValueType,
    pub constant: bool,
    pub repeat_item: bool,
    pub get_as: Option<String>,
    pub coerce: Option<String>,
}

impl VarRef {
    /// Source form used inside attachment templates, e.g. `{name['key'].text}`.
    pub fn template(&self) -> String {
        let mut out = format!("{{{}", self.name);
        if let Some(key) = &self.get_as {
            out.push_str(&format!("['{key}']"));
        }
        if let Some(coerce) = &self.coerce {
            out.push('.');
            out.push_str(coerce);
        }
        out.push('}');
        out
    }
}

/// References used by inline `{name}` sites, keyed by identifier.
pub type Refs = BTreeMap<String, VarRef>;

/// Text that may contain inline `{name}` references.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub text: String,
    pub refs: Refs,
}

impl Template {
    pub fn plain(text: impl Into<String>) -> Self {
        Template {
            text: text.into(),
            refs: Refs::new(),
        }
    }

    pub fn reference(var: &VarRef) -> Self {
        let mut refs = Refs::new();
        refs.insert(var.name.clone(), var.clone());
        Template {
            text: var.template(),
            refs,
        }
    }

    pub fn has_refs(&self) -> bool {
        !self.refs.is_empty()
    }

    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn append(&mut self, other: &Template) {
        self.text.push_str(&other.text);
        for (name, var) in &other.refs {
            self.refs.entry(name.clone()).or_insert_with(|| var.clone());
        }
    }
}

// =============================================================================
// Values
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ActionCall {
    pub name: String,
    pub arguments: Vec<Value>,
    pub output_type: Option<ValueType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(Template),
    RawText(String),
    Number(i64),
    Float(f64),
    Bool(bool),
    Dictionary { entries: Map<String, Json>, refs: Refs },
    Array { items: Vec<Json>, refs: Refs },
    Variable(VarRef),
    Action(Box<ActionCall>),
    /// Arithmetic with identifiers wrapped as `{name}`.
    Expression(Template),
    Nil,
    Question(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Text(_) => ValueType::Text,
            Value::RawText(_) => ValueType::RawText,
            Value::Number(_) => ValueType::Number,
            Value::Float(_) => ValueType::Float,
            Value::Bool(_) => ValueType::Bool,
            Value::Dictionary { .. } => ValueType::Dictionary,
            Value::Array { .. } => ValueType::Array,
            Value::Variable(_) => ValueType::Variable,
            Value::Action(_) => ValueType::Action,
            Value::Expression(_) => ValueType::Expression,
            Value::Nil => ValueType::Nil,
            Value::Question(_) => ValueType::Question,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(Template::plain(text))
    }

    /// The value as a plain JSON literal, if it is one: strings without
    /// references, numbers and booleans.
    pub fn literal(&self) -> Option<Json> {
        match self {
            Value::Text(t) if !t.has_refs() => Some(Json::String(t.text.clone())),
            Value::RawText(s) => Some(Json::String(s.clone())),
            Value::Number(n) => Some(Json::from(*n)),
            Value::Float(f) => serde_json::Number::from_f64(*f).map(Json::Number),
            Value::Bool(b) => Some(Json::Bool(*b)),
            _ => None,
        }
    }

    /// The string payload of a literal text value.
    pub fn literal_str(&self) -> Option<&str> {
        match self {
            Value::Text(t) if !t.has_refs() => Some(&t.text),
            Value::RawText(s) => Some(s),
            _ => None,
        }
    }
}

// =============================================================================
// Conditions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    Is,
    Not,
    Any,
    Empty,
    Contains,
    DoesNotContain,
    BeginsWith,
    EndsWith,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Between,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 13] = [
        ConditionOperator::Is,
        ConditionOperator::Not,
        ConditionOperator::Any,
        ConditionOperator::Empty,
        ConditionOperator::Contains,
        ConditionOperator::DoesNotContain,
        ConditionOperator::BeginsWith,
        ConditionOperator::EndsWith,
        ConditionOperator::GreaterThan,
        ConditionOperator::GreaterOrEqual,
        ConditionOperator::LessThan,
        ConditionOperator::LessOrEqual,
        ConditionOperator::Between,
    ];

    pub fn code(&self) -> i64 {
        match self {
            ConditionOperator::Is => 4,
            ConditionOperator::Not => 5,
            ConditionOperator::Any => 100,
            ConditionOperator::Empty => 101,
            ConditionOperator::Contains => 99,
            ConditionOperator::DoesNotContain => 999,
            ConditionOperator::BeginsWith => 8,
            ConditionOperator::EndsWith => 9,
            ConditionOperator::GreaterThan => 2,
            ConditionOperator::GreaterOrEqual => 3,
            ConditionOperator::LessThan => 0,
            ConditionOperator::LessOrEqual => 1,
            ConditionOperator::Between => 1003,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    /// Source spelling of binary operators. `Any` and `Empty` have none.
    pub fn symbol(&self) -> &'static str {
        match self {
            ConditionOperator::Is => "==",
            ConditionOperator::Not => "!=",
            ConditionOperator::Any => "",
            ConditionOperator::Empty => "!",
            ConditionOperator::Contains => "contains",
            ConditionOperator::DoesNotContain => "!contains",
            ConditionOperator::BeginsWith => "beginsWith",
            ConditionOperator::EndsWith => "endsWith",
            ConditionOperator::GreaterThan => ">",
            ConditionOperator::GreaterOrEqual => ">=",
            ConditionOperator::LessThan => "<",
            ConditionOperator::LessOrEqual => "<=",
            ConditionOperator::Between => "between",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter(|op| !matches!(op, ConditionOperator::Any | ConditionOperator::Empty))
            .find(|op| op.symbol() == symbol)
    }

    /// Operand types the right-hand side may have.
    pub fn accepts(&self, value_type: ValueType) -> bool {
        use ValueType::*;
        match self {
            ConditionOperator::Any | ConditionOperator::Empty => true,
            ConditionOperator::Is | ConditionOperator::Not => matches!(
                value_type,
                Text | RawText | Number | Float | Bool | Variable
            ),
            ConditionOperator::Contains
            | ConditionOperator::DoesNotContain
            | ConditionOperator::BeginsWith
            | ConditionOperator::EndsWith => matches!(value_type, Text | RawText | Variable),
            ConditionOperator::GreaterThan
            | ConditionOperator::GreaterOrEqual
            | ConditionOperator::LessThan
            | ConditionOperator::LessOrEqual
            | ConditionOperator::Between => matches!(value_type, Number | Float | Variable),
        }
    }

    pub fn operand_count(&self) -> usize {
        match self {
            ConditionOperator::Any | ConditionOperator::Empty => 1,
            ConditionOperator::Between => 3,
            _ => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPrefix {
    And,
    Or,
}

impl FilterPrefix {
    pub fn code(&self) -> i64 {
        match self {
            FilterPrefix::And => 1,
            FilterPrefix::Or => 2,
        }
    }

    /// `0` is what Shortcuts itself writes for "any"; both decode to `Or`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => FilterPrefix::And,
            _ => FilterPrefix::Or,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            FilterPrefix::And => "&&",
            FilterPrefix::Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub operator: ConditionOperator,
    /// One to three operands; the first is always a variable reference.
    pub arguments: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    pub prefix: FilterPrefix,
    pub list: Vec<Condition>,
}

// =============================================================================
// Tokens
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl AssignOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Subtract => "-=",
            AssignOp::Multiply => "*=",
            AssignOp::Divide => "/=",
        }
    }

    /// Operation name used by the math action.
    pub fn math_operation(&self) -> Option<&'static str> {
        match self {
            AssignOp::Set => None,
            AssignOp::Add => Some("+"),
            AssignOp::Subtract => Some("-"),
            AssignOp::Multiply => Some("×"),
            AssignOp::Divide => Some("÷"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub op: AssignOp,
    /// `None` for a bare declaration (`@name: type`).
    pub value: Option<Value>,
    pub constant: bool,
    /// The binding as it was before this statement, used by compound
    /// operators.
    pub target: VarRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Repeat,
    RepeatEach,
    Menu,
    Conditional,
}

impl GroupKind {
    pub fn name(&self) -> &'static str {
        match self {
            GroupKind::Repeat => "repeat",
            GroupKind::RepeatEach => "for",
            GroupKind::Menu => "menu",
            GroupKind::Conditional => "if",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Comment(String),
    VariableSet(Assignment),
    Action(ActionCall),
    RepeatOpen { group: String, count: Value },
    RepeatEachOpen { group: String, iterable: Value },
    MenuOpen { group: String, prompt: Value },
    MenuItem { group: String, label: Value },
    ConditionalOpen { group: String, conditions: Conditions },
    ConditionalElse { group: String },
    Close { group: String, kind: GroupKind },
}

impl Token {
    pub fn is_call_to(&self, names: &[&str]) -> bool {
        matches!(self, Token::Action(call) if names.contains(&call.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_codes_round_trip() {
        for op in ConditionOperator::ALL {
            assert_eq!(ConditionOperator::from_code(op.code()), Some(op));
        }
        assert_eq!(ConditionOperator::Is.code(), 4);
        assert_eq!(ConditionOperator::DoesNotContain.code(), 999);
        assert_eq!(ConditionOperator::Between.code(), 1003);
    }

    #[test]
    fn from_symbol_ignores_unary_operators() {
        assert_eq!(ConditionOperator::from_symbol(">="), Some(ConditionOperator::GreaterOrEqual));
        assert_eq!(ConditionOperator::from_symbol(""), None);
        assert_eq!(ConditionOperator::from_symbol("!"), None);
    }

    #[test]
    fn filter_prefix_codes() {
        assert_eq!(FilterPrefix::And.code(), 1);
        assert_eq!(FilterPrefix::Or.code(), 2);
        assert_eq!(FilterPrefix::from_code(0), FilterPrefix::Or);
    }

    #[test]
    fn var_ref_template_form() {
        let var = VarRef {
            name: "info".into(),
            target: "info".into(),
            kind: VariableKind::Variable,
            value_type: ValueType::Dictionary,
            constant: false,
            repeat_item: false,
            get_as: Some("name".into()),
            coerce: Some("text".into()),
        };
        assert_eq!(var.template(), "{info['name'].text}");
    }
}
