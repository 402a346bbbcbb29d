use serde_json::json;

use super::{ActionDefinition as A, Catalog, ParamEmitter, Params, ParameterDefinition as P, fixed, quantity};
use crate::error::CompilerError;
use crate::parse::types::Value;
use crate::parse::types::ValueType::*;

const DATE_STYLES: &[&str] = &[
    "None",
    "Short",
    "Medium",
    "Long",
    "Relative",
    "RFC 2822",
    "ISO 8601",
    "Custom",
];

/// Builds the operation and duration of an `adjustdate` action.
fn adjust(
    emitter: &mut dyn ParamEmitter,
    args: &[Value],
    operation: &str,
    unit: &str,
) -> Result<Params, CompilerError> {
    let magnitude = match args.get(1) {
        Some(arg) => Some(emitter.param_value(arg, Number)?),
        None => None,
    };
    let mut params = fixed(&[("WFAdjustOperation", json!(operation))]);
    params.insert("WFDuration".into(), quantity(magnitude, unit));
    Ok(params)
}

macro_rules! adjust_date {
    ($c:expr, $name:literal, $operation:literal, $unit:literal) => {
        $c.insert(
            $name,
            A::standard("adjustdate")
                .params(vec![
                    P::new("date", Text, "WFDate"),
                    P::new("magnitude", Number, "WFDuration"),
                ])
                .add_params(|emitter, args| adjust(emitter, args, $operation, $unit))
                .output(Text),
        );
    };
}

/// `adjustdate` rounding a date down to the start of a period.
macro_rules! start_of {
    ($c:expr, $name:literal, $operation:literal) => {
        $c.insert(
            $name,
            A::standard("adjustdate")
                .params(vec![P::new("date", Text, "WFDate")])
                .add_params(|_, _| Ok(fixed(&[("WFAdjustOperation", json!($operation))])))
                .output(Text),
        );
    };
}

pub(super) fn register(c: &mut Catalog) {
    c.insert(
        "date",
        A::standard("date")
            .params(vec![P::new("date", Text, "WFDateActionDate")])
            .add_params(|_, _| Ok(fixed(&[("WFDateActionMode", json!("Specified Date"))])))
            .output(Text),
    );
    c.insert(
        "formatDate",
        A::standard("format.date")
            .params(vec![
                P::new("date", Variable, "WFDate"),
                P::new("dateFormat", Text, "WFDateFormatStyle")
                    .enumerate(DATE_STYLES)
                    .default_value("Short"),
                P::new("customDateFormat", Text, "WFDateFormat").optional(),
            ])
            .output(Text)
            .default_action(),
    );
    c.insert(
        "formatTime",
        A::standard("format.date")
            .params(vec![
                P::new("time", Variable, "WFDate"),
                P::new("timeFormat", Text, "WFTimeFormatStyle")
                    .enumerate(&["None", "Short", "Medium", "Long", "Relative"])
                    .default_value("Short"),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFDateFormatStyle", json!("None"))])))
            .output(Text),
    );
    c.insert(
        "timeBetween",
        A::standard("gettimebetweendates")
            .params(vec![
                P::new("start", Variable, "WFInput"),
                P::new("end", Variable, "WFTimeUntilFromDate"),
                P::new("unit", Text, "WFTimeUntilUnit")
                    .enumerate(&["Total Time", "Seconds", "Minutes", "Hours", "Days", "Weeks", "Months", "Years"])
                    .default_value("Minutes"),
            ])
            .output(Number),
    );

    adjust_date!(c, "addSeconds", "Add", "sec");
    adjust_date!(c, "addMinutes", "Add", "min");
    adjust_date!(c, "addHours", "Add", "hr");
    adjust_date!(c, "addDays", "Add", "days");
    adjust_date!(c, "addWeeks", "Add", "weeks");
    adjust_date!(c, "addMonths", "Add", "months");
    adjust_date!(c, "addYears", "Add", "yr");
    adjust_date!(c, "subtractSeconds", "Subtract", "sec");
    adjust_date!(c, "subtractMinutes", "Subtract", "min");
    adjust_date!(c, "subtractHours", "Subtract", "hr");
    adjust_date!(c, "subtractDays", "Subtract", "days");
    adjust_date!(c, "subtractWeeks", "Subtract", "weeks");
    adjust_date!(c, "subtractMonths", "Subtract", "months");
    adjust_date!(c, "subtractYears", "Subtract", "yr");

    start_of!(c, "getStartMinute", "Get Start of Minute");
    start_of!(c, "getStartHour", "Get Start of Hour");
    start_of!(c, "getStartWeek", "Get Start of Week");
    start_of!(c, "getStartMonth", "Get Start of Month");
    start_of!(c, "getStartYear", "Get Start of Year");

    c.insert(
        "addCalendar",
        A::standard("addnewcalendar").params(vec![P::new("name", Text, "CalendarName")]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as Json;

    struct Literal;

    impl ParamEmitter for Literal {
        fn param_value(&mut self, arg: &Value, _: crate::parse::types::ValueType) -> Result<Json, CompilerError> {
            Ok(arg.literal().unwrap_or(Json::Null))
        }
    }

    #[test]
    fn adjust_builds_quantity_duration() {
        let catalog = Catalog::standard();
        let add = catalog.get("subtractYears").unwrap().add_params.unwrap();
        let params = add(&mut Literal, &[Value::text("today"), Value::Number(2)]).unwrap();
        assert_eq!(params["WFAdjustOperation"], "Subtract");
        assert_eq!(
            params["WFDuration"],
            json!({
                "Value": { "Magnitude": 2, "Unit": "yr" },
                "WFSerializationType": "WFQuantityFieldValue"
            })
        );
    }

    #[test]
    fn adjust_without_arguments_yields_fixed_shape() {
        let catalog = Catalog::standard();
        let add = catalog.get("addDays").unwrap().add_params.unwrap();
        let params = add(&mut Literal, &[]).unwrap();
        assert_eq!(params["WFDuration"]["Value"], json!({ "Unit": "days" }));
    }
}
