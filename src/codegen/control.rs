//! Control flow groups: repeat, repeat-each, menus and conditionals.
//!
//! Every group is a run of actions sharing one `GroupingIdentifier`. The
//! opener has mode 0, `else` and menu items mode 1, the closer mode 2.

use serde_json::{Map, Value as Json, json};

use super::output::new_uuid;
use super::{
    CONDITIONAL, Emitter, MENU, NOTHING, REPEAT_COUNT, REPEAT_EACH, params, standard,
};
use crate::catalog::Params;
use crate::error::CompilerError;
use crate::parse::types::{
    Condition, ConditionOperator, Conditions, GroupKind, Template, Value, ValueType,
};

/// Versions from this one on nest condition templates under `WFConditions`.
const CONDITION_TABLE_VERSION: f64 = 18.0;

fn group_identifier(kind: GroupKind) -> &'static str {
    match kind {
        GroupKind::Repeat => REPEAT_COUNT,
        GroupKind::RepeatEach => REPEAT_EACH,
        GroupKind::Menu => MENU,
        GroupKind::Conditional => CONDITIONAL,
    }
}

impl Emitter<'_> {
    /// Shortcuts passes the output of the last action in a branch out of the
    /// group, so each branch ends with an empty action.
    fn separate(&mut self) {
        let ends_empty = self
            .actions
            .last()
            .is_some_and(|action| action.short_identifier() == NOTHING);
        if !ends_empty {
            self.push(standard(NOTHING), Params::new());
        }
    }

    pub(crate) fn emit_repeat(&mut self, group: &str, count: &Value) -> Result<(), CompilerError> {
        let count = self.encode_value(count, ValueType::Number)?;
        self.push(
            standard(REPEAT_COUNT),
            params([
                ("GroupingIdentifier", json!(group)),
                ("WFControlFlowMode", json!(0)),
                ("WFRepeatCount", count),
                ("UUID", json!(new_uuid())),
            ]),
        );
        Ok(())
    }

    pub(crate) fn emit_repeat_each(
        &mut self,
        group: &str,
        iterable: &Value,
    ) -> Result<(), CompilerError> {
        let var = self.materialize(iterable)?;
        let input = self.attachment(&var);
        self.push(
            standard(REPEAT_EACH),
            params([
                ("GroupingIdentifier", json!(group)),
                ("WFControlFlowMode", json!(0)),
                ("WFInput", input),
                ("UUID", json!(new_uuid())),
            ]),
        );
        Ok(())
    }

    pub(crate) fn emit_menu(&mut self, group: &str, prompt: &Value) -> Result<(), CompilerError> {
        let prompt = self.encode_value(prompt, ValueType::Text)?;
        let labels = self.ctx.menus.get(group).cloned().unwrap_or_default();
        let mut items = Vec::with_capacity(labels.len());
        for label in &labels {
            let field = self.value_field(label)?;
            items.push(json!({ "WFItemType": 0, "WFValue": field }));
        }
        self.push(
            standard(MENU),
            params([
                ("GroupingIdentifier", json!(group)),
                ("WFControlFlowMode", json!(0)),
                ("WFMenuPrompt", prompt),
                ("WFMenuItems", Json::Array(items)),
                ("UUID", json!(new_uuid())),
            ]),
        );
        Ok(())
    }

    pub(crate) fn emit_menu_item(&mut self, group: &str, label: &Value) -> Result<(), CompilerError> {
        let follows_opener = self.actions.last().is_some_and(|action| {
            action.grouping() == Some(group) && action.control_flow_mode() == Some(0)
        });
        if !follows_opener {
            self.separate();
        }
        let attributed = self.value_field(label)?;
        let title = match label {
            Value::Text(template) => template.text.clone(),
            Value::Variable(var) => var.template(),
            other => other
                .literal()
                .map(|literal| match literal {
                    Json::String(s) => s,
                    other => other.to_string(),
                })
                .unwrap_or_default(),
        };
        self.push(
            standard(MENU),
            params([
                ("GroupingIdentifier", json!(group)),
                ("WFControlFlowMode", json!(1)),
                ("WFMenuItemAttributedTitle", attributed),
                ("WFMenuItemTitle", json!(title)),
            ]),
        );
        Ok(())
    }

    pub(crate) fn emit_conditional(
        &mut self,
        group: &str,
        conditions: &Conditions,
    ) -> Result<(), CompilerError> {
        let mut templates = Vec::with_capacity(conditions.list.len());
        for condition in &conditions.list {
            templates.push(self.condition_template(condition)?);
        }

        let mut parameters = params([
            ("GroupingIdentifier", json!(group)),
            ("WFControlFlowMode", json!(0)),
        ]);
        if self.ctx.metadata.ios_version >= CONDITION_TABLE_VERSION {
            parameters.insert(
                "WFConditions".into(),
                json!({
                    "Value": {
                        "WFActionParameterFilterPrefix": conditions.prefix.code(),
                        "WFActionParameterFilterTemplates": templates,
                    },
                    "WFSerializationType": "WFContentPredicateTableTemplate",
                }),
            );
        } else {
            let single = templates.into_iter().next().ok_or_else(|| {
                CompilerError::emit("E004", "Conditional without a condition")
            })?;
            if let Json::Object(fields) = single {
                parameters.extend(fields);
            }
        }
        parameters.insert("UUID".into(), json!(new_uuid()));
        self.push(standard(CONDITIONAL), parameters);
        Ok(())
    }

    pub(crate) fn emit_else(&mut self, group: &str) -> Result<(), CompilerError> {
        self.separate();
        self.push(
            standard(CONDITIONAL),
            params([
                ("GroupingIdentifier", json!(group)),
                ("WFControlFlowMode", json!(1)),
            ]),
        );
        Ok(())
    }

    pub(crate) fn emit_close(&mut self, group: &str, kind: GroupKind) -> Result<(), CompilerError> {
        self.separate();
        self.push(
            standard(group_identifier(kind)),
            params([
                ("GroupingIdentifier", json!(group)),
                ("WFControlFlowMode", json!(2)),
                ("UUID", json!(new_uuid())),
            ]),
        );
        Ok(())
    }

    /// One `WFCondition` template: the subject as a variable input, then the
    /// operand fields the operator needs.
    fn condition_template(&mut self, condition: &Condition) -> Result<Json, CompilerError> {
        let mut arguments = condition.arguments.iter();
        let subject = arguments
            .next()
            .ok_or_else(|| CompilerError::emit("E004", "Condition without a subject"))?;
        let subject = self.materialize(subject)?;

        let mut template = Map::new();
        template.insert("WFCondition".into(), json!(condition.operator.code()));
        template.insert(
            "WFInput".into(),
            json!({ "Type": "Variable", "Variable": self.attachment(&subject) }),
        );
        if let Some(operand) = arguments.next() {
            let (key, value) = self.condition_operand(condition.operator, operand)?;
            template.insert(key.into(), value);
        }
        if let Some(upper) = arguments.next() {
            let value = self.numeric_operand(upper)?;
            template.insert("WFAnotherNumber".into(), value);
        }
        Ok(Json::Object(template))
    }

    fn condition_operand(
        &mut self,
        operator: ConditionOperator,
        operand: &Value,
    ) -> Result<(&'static str, Json), CompilerError> {
        let numeric = matches!(
            operator,
            ConditionOperator::GreaterThan
                | ConditionOperator::GreaterOrEqual
                | ConditionOperator::LessThan
                | ConditionOperator::LessOrEqual
                | ConditionOperator::Between
        );
        if numeric {
            return Ok(("WFNumberValue", self.numeric_operand(operand)?));
        }
        Ok(match operand {
            Value::Text(template) => ("WFConditionalActionString", self.text_param(template)),
            Value::RawText(text) => ("WFConditionalActionString", json!(text)),
            Value::Number(_) | Value::Float(_) | Value::Bool(_) => {
                ("WFNumberValue", self.numeric_operand(operand)?)
            }
            Value::Variable(var) if var.value_type.is_numeric() => {
                ("WFNumberValue", self.attachment(var))
            }
            Value::Variable(var) => (
                "WFConditionalActionString",
                self.token_string(&Template::reference(var)),
            ),
            other => {
                let var = self.materialize(other)?;
                return self.condition_operand(operator, &Value::Variable(var));
            }
        })
    }

    fn numeric_operand(&mut self, operand: &Value) -> Result<Json, CompilerError> {
        Ok(match operand {
            Value::Number(n) => json!(n),
            Value::Float(f) => json!(f),
            Value::Bool(b) => json!(if *b { "1" } else { "0" }),
            Value::Variable(var) => self.attachment(var),
            other => {
                let var = self.materialize(other)?;
                self.attachment(&var)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{emit, identifiers};
    use super::*;

    #[test]
    fn branches_are_separated_and_share_a_group() {
        let (shortcut, _) = emit(
            "@x = 1\nif x == 1 {\n    show(\"eq\")\n} else {\n    show(\"ne\")\n}",
        )
        .unwrap();
        assert_eq!(
            identifiers(&shortcut),
            vec![
                "number",
                "setvariable",
                "conditional",
                "showresult",
                "nothing",
                "conditional",
                "showresult",
                "nothing",
                "conditional",
            ]
        );
        let groups: Vec<&Json> = shortcut.actions[2..]
            .iter()
            .filter_map(|a| a.param("GroupingIdentifier"))
            .collect();
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| *g == groups[0]));
        let modes: Vec<i64> = shortcut.actions[2..]
            .iter()
            .filter_map(|a| a.control_flow_mode())
            .collect();
        assert_eq!(modes, vec![0, 1, 2]);
    }

    #[test]
    fn condition_table_shape() {
        let (shortcut, _) = emit("@x = 1\nif x > 0 || x == 5 {\n}").unwrap();
        let conditions = shortcut.actions[2].param("WFConditions").unwrap();
        assert_eq!(conditions["WFSerializationType"], "WFContentPredicateTableTemplate");
        assert_eq!(conditions["Value"]["WFActionParameterFilterPrefix"], 2);
        let templates = conditions["Value"]["WFActionParameterFilterTemplates"].as_array().unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0]["WFCondition"], 2);
        assert_eq!(templates[0]["WFNumberValue"], 0);
        assert_eq!(templates[0]["WFInput"]["Type"], "Variable");
        assert_eq!(templates[0]["WFInput"]["Variable"]["Value"]["VariableName"], "x");
        assert_eq!(templates[1]["WFCondition"], 4);
    }

    #[test]
    fn legacy_conditions_are_flat() {
        let (shortcut, _) =
            emit("#define version 17\n@s = \"a\"\nif s contains \"b\" {\n}").unwrap();
        let conditional = &shortcut.actions[2];
        assert!(conditional.param("WFConditions").is_none());
        assert_eq!(conditional.param("WFCondition"), Some(&json!(99)));
        assert_eq!(conditional.param_str("WFConditionalActionString"), Some("b"));
    }

    #[test]
    fn between_uses_two_numbers() {
        let (shortcut, _) = emit("@x = 3\nif x between 1 and 5 {\n}").unwrap();
        let template = &shortcut.actions[2].param("WFConditions").unwrap()["Value"]
            ["WFActionParameterFilterTemplates"][0];
        assert_eq!(template["WFCondition"], 1003);
        assert_eq!(template["WFNumberValue"], 1);
        assert_eq!(template["WFAnotherNumber"], 5);
    }

    #[test]
    fn repeat_blocks() {
        let (shortcut, _) = emit("repeat i for 3 {\n    show(\"{i}\")\n}").unwrap();
        assert_eq!(identifiers(&shortcut), vec!["repeat.count", "showresult", "nothing", "repeat.count"]);
        assert_eq!(shortcut.actions[0].param("WFRepeatCount"), Some(&json!(3)));
        let shown = &shortcut.actions[1].param("Text").unwrap()["Value"];
        assert_eq!(shown["attachmentsByRange"]["{0, 1}"]["VariableName"], "Repeat Index");
    }

    #[test]
    fn empty_blocks_get_one_separator() {
        let (shortcut, _) = emit("@l = [\"a\"]\nfor item in l {\n}").unwrap();
        assert_eq!(
            identifiers(&shortcut),
            vec!["setvariable", "gettext", "appendvariable", "repeat.each", "nothing", "repeat.each"]
        );
        assert_eq!(shortcut.actions[3].param("WFInput").unwrap()["Value"]["VariableName"], "l");
    }

    #[test]
    fn menus_list_their_items() {
        let (shortcut, _) = emit(
            "menu \"Pick\" {\n    item \"A\":\n        show(\"a\")\n    item \"B\":\n        show(\"b\")\n}",
        )
        .unwrap();
        assert_eq!(
            identifiers(&shortcut),
            vec![
                "choosefrommenu",
                "choosefrommenu",
                "showresult",
                "nothing",
                "choosefrommenu",
                "showresult",
                "nothing",
                "choosefrommenu",
            ]
        );
        let menu = &shortcut.actions[0];
        assert_eq!(menu.param_str("WFMenuPrompt"), Some("Pick"));
        let items = menu.param("WFMenuItems").unwrap().as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["WFValue"]["Value"]["string"], "B");
        assert_eq!(shortcut.actions[1].param_str("WFMenuItemTitle"), Some("A"));
        assert_eq!(shortcut.actions[1].control_flow_mode(), Some(1));
    }
}
