//! Output, control, variables, lists, dictionaries, content detection,
//! network addresses and shortcut plumbing.

use serde_json::json;

use super::{ActionDefinition as A, Catalog, ParamEmitter, Params, ParameterDefinition as P, fixed};
use crate::error::CompilerError;
use crate::parse::types::Value;
use crate::parse::types::ValueType::*;

const IP_TYPES: &[&str] = &["IPv4", "IPv6"];

/// `count` with the unit fixed.
macro_rules! count_of {
    ($c:expr, $name:literal, $unit:literal) => {
        $c.insert(
            $name,
            A::standard("count")
                .params(vec![P::new("input", Variable, "Input")])
                .add_params(|_, _| Ok(fixed(&[("WFCountType", json!($unit))])))
                .output(Number),
        );
    };
}

/// Content detection: `detect.<kind>` over any input.
macro_rules! detect {
    ($c:expr, $name:literal, $kind:literal, $output:expr) => {
        $c.insert(
            $name,
            A::standard(concat!("detect.", $kind))
                .params(vec![P::new("input", Variable, "WFInput")])
                .output($output),
        );
    };
}

pub(super) fn register(c: &mut Catalog) {
    c.insert(
        "comment",
        A::standard("comment").params(vec![P::new("text", RawText, "WFCommentActionText").literal()]),
    );
    c.insert("show", A::standard("showresult").params(vec![P::new("input", Text, "Text")]));
    c.insert(
        "alert",
        A::standard("alert")
            .params(vec![
                P::new("alert", Text, "WFAlertActionMessage"),
                P::new("title", Text, "WFAlertActionTitle").optional(),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFAlertActionCancelButtonShown", json!(false))])))
            .default_action(),
    );
    c.insert(
        "confirm",
        A::standard("alert")
            .params(vec![
                P::new("alert", Text, "WFAlertActionMessage"),
                P::new("title", Text, "WFAlertActionTitle").optional(),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFAlertActionCancelButtonShown", json!(true))]))),
    );

    // Output

    c.insert(
        "output",
        A::standard("output")
            .params(vec![P::new("output", Text, "WFOutput")])
            .default_action(),
    );
    c.insert(
        "mustOutput",
        A::standard("output")
            .params(vec![
                P::new("output", Text, "WFOutput"),
                P::new("response", Text, "WFResponse").optional(),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFNoOutputSurfaceBehavior", json!("Respond"))]))),
    );
    c.insert(
        "outputOrClipboard",
        A::standard("output")
            .params(vec![P::new("output", Text, "WFOutput")])
            .add_params(|_, _| {
                Ok(fixed(&[("WFNoOutputSurfaceBehavior", json!("Copy to Clipboard"))]))
            }),
    );
    c.insert("stop", A::standard("exit"));
    c.insert("nothing", A::standard("nothing"));
    c.insert("wait", A::standard("delay").params(vec![P::new("seconds", Number, "WFDelayTime")]));
    c.insert("waitToReturn", A::standard("waittoreturn"));

    // Values

    c.insert(
        "text",
        A::standard("gettext")
            .params(vec![P::new("text", Text, "WFTextActionText")])
            .output(Text),
    );
    c.insert(
        "number",
        A::standard("number")
            .params(vec![P::new("number", Number, "WFNumberActionNumber")])
            .output(Number),
    );
    c.insert(
        "list",
        A::standard("list")
            .params(vec![P::new("items", Text, "WFItems").infinite()])
            .output(Array),
    );
    c.insert(
        "typeOf",
        A::standard("getitemtype")
            .params(vec![P::new("input", Variable, "WFInput")])
            .output(Text),
    );
    c.alias("getType", "typeOf");
    c.insert(
        "getName",
        A::standard("getitemname")
            .params(vec![P::new("item", Variable, "WFInput")])
            .output(Text),
    );
    c.insert(
        "setName",
        A::standard("setitemname").params(vec![
            P::new("item", Variable, "WFInput"),
            P::new("name", Text, "WFName"),
        ]),
    );
    c.insert(
        "count",
        A::standard("count")
            .params(vec![
                P::new("input", Variable, "Input"),
                P::new("type", Text, "WFCountType")
                    .enumerate(&["Items", "Characters", "Words", "Sentences", "Lines"])
                    .default_value("Items"),
            ])
            .output(Number),
    );
    count_of!(c, "countItems", "Items");
    count_of!(c, "countChars", "Characters");
    count_of!(c, "countWords", "Words");
    count_of!(c, "countSentences", "Sentences");
    count_of!(c, "countLines", "Lines");
    c.insert(
        "getObjectOfClass",
        A::standard("getclassaction").params(vec![
            P::new("class", Text, "Class"),
            P::new("from", Variable, "Input"),
        ]),
    );
    c.insert(
        "getFileFrom",
        A::standard("gettypeaction").params(vec![
            P::new("type", Text, "WFFileType"),
            P::new("from", Variable, "WFInput"),
        ]),
    );
    c.insert(
        "contentGraph",
        A::standard("viewresult").params(vec![P::new("input", Variable, "WFInput")]),
    );
    c.insert(
        "append",
        A::standard("appendvariable").params(vec![
            P::new("value", Variable, "WFInput"),
            P::new("variable", Text, "WFVariableName").literal(),
        ]),
    );

    // Detection

    detect!(c, "getNumbers", "number", Number);
    detect!(c, "getText", "text", Text);
    detect!(c, "getContacts", "contacts", Array);
    detect!(c, "getDates", "date", Array);
    detect!(c, "getEmails", "emailaddress", Array);
    detect!(c, "getImages", "images", Array);
    detect!(c, "getPhoneNumbers", "phonenumber", Array);
    detect!(c, "getURLs", "link", Array);

    // Dictionaries

    c.insert(
        "getDictionary",
        A::standard("detect.dictionary")
            .params(vec![P::new("input", Variable, "WFInput")])
            .output(Dictionary),
    );
    c.insert(
        "getValue",
        A::standard("getvalueforkey")
            .params(vec![
                P::new("dictionary", Variable, "WFInput"),
                P::new("key", Text, "WFDictionaryKey"),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFGetDictionaryValueType", json!("Value"))])))
            .default_action(),
    );
    c.insert(
        "getKeys",
        A::standard("getvalueforkey")
            .params(vec![P::new("dictionary", Variable, "WFInput")])
            .add_params(|_, _| Ok(fixed(&[("WFGetDictionaryValueType", json!("All Keys"))])))
            .output(Array),
    );
    c.insert(
        "getValues",
        A::standard("getvalueforkey")
            .params(vec![P::new("dictionary", Variable, "WFInput")])
            .add_params(|_, _| Ok(fixed(&[("WFGetDictionaryValueType", json!("All Values"))])))
            .output(Array),
    );
    c.insert(
        "setValue",
        A::standard("setvalueforkey")
            .params(vec![
                P::new("dictionary", Variable, "WFDictionary"),
                P::new("key", Text, "WFDictionaryKey"),
                P::new("value", Text, "WFDictionaryValue"),
            ])
            .output(Dictionary),
    );

    // Lists

    c.insert(
        "getListItem",
        A::standard("getitemfromlist")
            .params(vec![
                P::new("list", Variable, "WFInput"),
                P::new("index", Number, "WFItemIndex"),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFItemSpecifier", json!("Item At Index"))])))
            .default_action(),
    );
    c.insert(
        "getFirstItem",
        A::standard("getitemfromlist")
            .params(vec![P::new("list", Variable, "WFInput")])
            .add_params(|_, _| Ok(fixed(&[("WFItemSpecifier", json!("First Item"))]))),
    );
    c.insert(
        "getLastItem",
        A::standard("getitemfromlist")
            .params(vec![P::new("list", Variable, "WFInput")])
            .add_params(|_, _| Ok(fixed(&[("WFItemSpecifier", json!("Last Item"))]))),
    );
    c.insert(
        "getRandomItem",
        A::standard("getitemfromlist")
            .params(vec![P::new("list", Variable, "WFInput")])
            .add_params(|_, _| Ok(fixed(&[("WFItemSpecifier", json!("Random Item"))]))),
    );
    c.alias("firstListItem", "getFirstItem");
    c.alias("lastListItem", "getLastItem");
    c.alias("randomListItem", "getRandomItem");
    c.insert(
        "getListItems",
        A::standard("getitemfromlist")
            .params(vec![
                P::new("list", Variable, "WFInput"),
                P::new("start", Number, "WFItemRangeStart"),
                P::new("end", Number, "WFItemRangeEnd"),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFItemSpecifier", json!("Items in Range"))])))
            .output(Array),
    );
    c.insert(
        "chooseFromList",
        A::standard("choosefromlist").params(vec![
            P::new("list", Variable, "WFInput"),
            P::new("prompt", Text, "WFChooseFromListActionPrompt").optional(),
            P::new("selectMultiple", Bool, "WFChooseFromListActionSelectMultiple")
                .default_value(false),
        ]),
    );
    c.insert(
        "chooseMultipleFromList",
        A::standard("choosefromlist")
            .params(vec![
                P::new("list", Variable, "WFInput"),
                P::new("prompt", Text, "WFChooseFromListActionPrompt").optional(),
                P::new("selectAll", Bool, "WFChooseFromListActionSelectAll").default_value(false),
            ])
            .add_params(|_, _| {
                Ok(fixed(&[("WFChooseFromListActionSelectMultiple", json!(true))]))
            }),
    );
    c.insert(
        "prompt",
        A::standard("ask")
            .params(vec![
                P::new("prompt", Text, "WFAskActionPrompt"),
                P::new("inputType", Text, "WFInputType")
                    .enumerate(&["Text", "Number", "URL", "Date", "Time", "Date and Time"])
                    .default_value("Text"),
                P::new("defaultAnswer", Text, "WFAskActionDefaultAnswer").optional(),
            ])
            .output(Text),
    );
    c.insert(
        "askForInput",
        A::standard("ask")
            .params(vec![
                P::new("inputType", Text, "WFInputType")
                    .enumerate(&["Text", "Number", "URL", "Date", "Time", "Date and Time"]),
                P::new("prompt", Text, "WFAskActionPrompt"),
                P::new("defaultAnswer", Text, "WFAskActionDefaultAnswer").optional(),
            ])
            .output(Text)
            .shorthand(),
    );

    // Network

    c.insert(
        "isOnline",
        A::standard("getipaddress")
            .add_params(|_, _| {
                Ok(fixed(&[
                    ("WFIPAddressSourceOption", json!("External")),
                    ("WFIPAddressTypeOption", json!("IPv4")),
                ]))
            })
            .output(Text),
    );
    c.insert(
        "getLocalIP",
        A::standard("getipaddress")
            .params(vec![
                P::new("type", Text, "WFIPAddressTypeOption")
                    .enumerate(IP_TYPES)
                    .default_value("IPv4"),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFIPAddressSourceOption", json!("Local"))])))
            .output(Text),
    );
    c.insert(
        "getExternalIP",
        A::standard("getipaddress")
            .params(vec![
                P::new("type", Text, "WFIPAddressTypeOption")
                    .enumerate(IP_TYPES)
                    .default_value("IPv4"),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFIPAddressSourceOption", json!("External"))])))
            .output(Text),
    );

    // Shortcuts

    c.insert(
        "runSelf",
        A::standard("runworkflow")
            .params(vec![P::new("input", Variable, "WFInput").optional()])
            .add_params(|_, _| {
                Ok(fixed(&[
                    ("WFWorkflow", json!({ "isSelf": true })),
                    ("WFShowWorkflow", json!(false)),
                ]))
            }),
    );
    c.insert(
        "run",
        A::standard("runworkflow")
            .params(vec![
                P::new("shortcut", Text, "WFWorkflowName").literal(),
                P::new("input", Variable, "WFInput").optional(),
            ])
            .add_params(run_workflow)
            .default_action(),
    );
    c.insert(
        "open",
        A::standard("openworkflow")
            .params(vec![P::new("shortcut", Text, "").literal()])
            .add_params(|_, args| {
                let mut params = Params::new();
                if let Some(name) = args.first().and_then(Value::literal_str) {
                    params.insert("WFWorkflow".into(), workflow(name));
                }
                Ok(params)
            }),
    );
    c.insert(
        "getShortcuts",
        A::standard("getmyworkflows").output(Array),
    );
    c.insert(
        "openApp",
        A::standard("openapp").params(vec![P::new("appID", Text, "WFAppIdentifier").literal()]),
    );
    c.insert("dismissSiri", A::standard("dismisssiri"));
    c.insert(
        "openXCallbackURL",
        A::standard("openxcallbackurl")
            .params(vec![P::new("url", Text, "WFXCallbackURL")])
            .default_action(),
    );
    c.insert(
        "openCustomXCallbackURL",
        A::standard("openxcallbackurl")
            .params(vec![
                P::new("url", Text, "WFXCallbackURL"),
                P::new("successKey", Text, "WFXCallbackCustomSuccessKey").optional(),
                P::new("cancelKey", Text, "WFXCallbackCustomCancelKey").optional(),
                P::new("errorKey", Text, "WFXCallbackCustomErrorKey").optional(),
                P::new("successURL", Text, "WFXCallbackCustomSuccessURL").optional(),
            ])
            .add_params(callback_options),
    );
    c.insert(
        "runShellScript",
        A::standard("runshellscript")
            .params(vec![
                P::new("script", Text, "Script"),
                P::new("input", Variable, "Input").optional(),
                P::new("shell", Text, "Shell").default_value("/bin/zsh"),
            ])
            .output(Text)
            .mac_only(),
    );
    c.insert(
        "rawAction",
        A::implicit()
            .params(vec![
                P::new("identifier", Text, "").literal(),
                P::new("parameters", Array, "").optional(),
            ])
            .make(raw_parameters)
            .raw(),
    );
}

fn workflow(name: &str) -> serde_json::Value {
    json!({ "workflowName": name, "isSelf": false })
}

fn run_workflow(_: &mut dyn ParamEmitter, args: &[Value]) -> Result<Params, CompilerError> {
    let mut params = fixed(&[("WFShowWorkflow", json!(false))]);
    if let Some(name) = args.first().and_then(Value::literal_str) {
        params.insert("WFWorkflow".into(), workflow(name));
    }
    Ok(params)
}

/// Custom keys and a success URL switch on their toggles.
fn callback_options(_: &mut dyn ParamEmitter, args: &[Value]) -> Result<Params, CompilerError> {
    let given = |index: usize| args.get(index).is_some_and(|arg| !matches!(arg, Value::Nil));
    let mut params = Params::new();
    if (1..=3).any(|index| given(index)) {
        params.insert("WFXCallbackCustomCallbackEnabled".into(), json!(true));
    }
    if given(4) {
        params.insert("WFXCallbackCustomSuccessURLEnabled".into(), json!(true));
    }
    Ok(params)
}

/// `rawAction("id", [{"Key": value}, ...])`: every dictionary in the list is
/// merged into the parameters as written.
fn raw_parameters(_: &mut dyn ParamEmitter, args: &[Value]) -> Result<Params, CompilerError> {
    let mut params = Params::new();
    let Some(Value::Array { items, .. }) = args.get(1) else {
        return Ok(params);
    };
    for item in items {
        let Some(object) = item.as_object() else {
            return Err(CompilerError::semantic(
                "S040",
                "rawAction parameters must be a list of dictionaries",
            ));
        };
        for (key, value) in object {
            params.insert(key.clone(), value.clone());
        }
    }
    Ok(params)
}
