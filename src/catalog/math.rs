use serde_json::json;

use super::{ActionDefinition as A, Catalog, ParameterDefinition as P, fixed};
use crate::parse::types::ValueType::*;

const ROUND_TO: &[&str] = &[
    "Ones Place",
    "Tens Place",
    "Hundreds Place",
    "Thousands",
    "Ten Thousands",
    "Hundred Thousands",
    "Millions",
];

/// `statistics` with the operation fixed.
macro_rules! statistic {
    ($c:expr, $name:literal, $operation:literal) => {
        $c.insert(
            $name,
            A::standard("statistics")
                .params(vec![P::new("input", Variable, "Input")])
                .add_params(|_, _| Ok(fixed(&[("WFStatisticsOperation", json!($operation))])))
                .output(Number),
        );
    };
}

pub(super) fn register(c: &mut Catalog) {
    c.insert(
        "round",
        A::standard("round")
            .params(vec![
                P::new("number", Number, "WFInput"),
                P::new("roundTo", Text, "WFRoundTo")
                    .enumerate(ROUND_TO)
                    .default_value("Ones Place"),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFRoundMode", json!("Normal"))])))
            .output(Number)
            .default_action(),
    );
    c.insert(
        "ceil",
        A::standard("round")
            .params(vec![
                P::new("number", Number, "WFInput"),
                P::new("roundTo", Text, "WFRoundTo")
                    .enumerate(ROUND_TO)
                    .default_value("Ones Place"),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFRoundMode", json!("Always Round Up"))])))
            .output(Number),
    );
    c.insert(
        "floor",
        A::standard("round")
            .params(vec![
                P::new("number", Number, "WFInput"),
                P::new("roundTo", Text, "WFRoundTo")
                    .enumerate(ROUND_TO)
                    .default_value("Ones Place"),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFRoundMode", json!("Always Round Down"))])))
            .output(Number),
    );
    c.alias("roundUp", "ceil");
    c.alias("roundDown", "floor");
    c.insert(
        "randomNumber",
        A::standard("number.random")
            .params(vec![
                P::new("min", Number, "WFRandomNumberMinimum"),
                P::new("max", Number, "WFRandomNumberMaximum"),
            ])
            .output(Number),
    );
    c.insert(
        "statistic",
        A::standard("statistics")
            .params(vec![
                P::new("input", Variable, "Input"),
                P::new("operation", Text, "WFStatisticsOperation").enumerate(&[
                    "Average",
                    "Minimum",
                    "Maximum",
                    "Sum",
                    "Median",
                    "Mode",
                    "Range",
                    "Standard Deviation",
                ]),
            ])
            .output(Number),
    );
    statistic!(c, "calcAverage", "Average");
    statistic!(c, "calcMin", "Minimum");
    statistic!(c, "calcMax", "Maximum");
    statistic!(c, "calcSum", "Sum");
    statistic!(c, "calcMedian", "Median");
    statistic!(c, "calcMode", "Mode");
    statistic!(c, "calcRange", "Range");
    statistic!(c, "calcStdDevi", "Standard Deviation");
    c.insert(
        "formatNumber",
        A::standard("format.number")
            .params(vec![
                P::new("number", Number, "WFNumber"),
                P::new("decimalPlaces", Number, "WFNumberFormatDecimalPlaces").default_value(2),
            ])
            .output(Text),
    );
    c.insert(
        "squareRoot",
        A::standard("math")
            .params(vec![P::new("number", Number, "WFInput")])
            .add_params(|_, _| {
                Ok(fixed(&[
                    ("WFMathOperation", json!("…")),
                    ("WFScientificMathOperation", json!("√x")),
                ]))
            })
            .output(Number),
    );
}
