//! End-to-end compilation of small programs through the public API.

mod helpers;

use cherri::CompileOptions;
use pretty_assertions::assert_eq;
use serde_json::json;

use helpers::{compile, find, identifiers, output_uuid};

#[test]
fn hello_world() {
    let compilation = compile("@greet = \"Hello, World!\"\nshow(greet)");
    let shortcut = &compilation.shortcut;
    assert_eq!(identifiers(shortcut), vec!["gettext", "setvariable", "showresult"]);

    let text = &shortcut.actions[0];
    assert_eq!(text.param("WFTextActionText"), Some(&json!("Hello, World!")));
    let set = &shortcut.actions[1];
    assert_eq!(set.param_str("WFVariableName"), Some("greet"));
    let input = set.param("WFInput").unwrap();
    assert_eq!(input["Value"]["OutputName"], "greet");
    assert_eq!(output_uuid(input), text.uuid());

    let shown = shortcut.actions[2].param("Text").unwrap();
    assert_eq!(shown["WFSerializationType"], "WFTextTokenString");
    assert_eq!(shown["Value"]["attachmentsByRange"]["{0, 1}"]["VariableName"], "greet");
    assert!(compilation.warnings.is_empty());
}

#[test]
fn conditional_with_else() {
    let shortcut = compile(
        "@x = 1\nif x == 1 {\n    show(\"eq\")\n} else {\n    show(\"ne\")\n}",
    )
    .shortcut;
    let conditionals = find(&shortcut, "conditional");
    assert_eq!(conditionals.len(), 3);
    let group = conditionals[0].grouping();
    assert!(group.is_some());
    assert!(conditionals.iter().all(|action| action.grouping() == group));
    let modes: Vec<_> = conditionals.iter().map(|a| a.control_flow_mode()).collect();
    assert_eq!(modes, vec![Some(0), Some(1), Some(2)]);

    let table = &conditionals[0].param("WFConditions").unwrap()["Value"];
    assert_eq!(table["WFActionParameterFilterTemplates"][0]["WFCondition"], 4);
    assert_eq!(find(&shortcut, "showresult").len(), 2);
    assert_eq!(find(&shortcut, "nothing").len(), 2);
}

#[test]
fn repeat_count() {
    let shortcut = compile("repeat i for 3 {\n    show(\"x{i}\")\n}").shortcut;
    assert_eq!(
        identifiers(&shortcut),
        vec!["repeat.count", "showresult", "nothing", "repeat.count"]
    );
    let open = &shortcut.actions[0];
    assert_eq!(open.param("WFRepeatCount"), Some(&json!(3)));
    assert_eq!(open.control_flow_mode(), Some(0));
    assert_eq!(shortcut.actions[3].control_flow_mode(), Some(2));
    assert_eq!(open.grouping(), shortcut.actions[3].grouping());

    let text = shortcut.actions[1].param("Text").unwrap();
    assert_eq!(text["Value"]["attachmentsByRange"]["{1, 1}"]["VariableName"], "Repeat Index");
}

#[test]
fn inline_attachment() {
    let shortcut = compile("@name = \"Ada\"\n@s = \"hi, {name}\"").shortcut;
    assert_eq!(
        identifiers(&shortcut),
        vec!["gettext", "setvariable", "gettext", "setvariable"]
    );
    let text = shortcut.actions[2].param("WFTextActionText").unwrap();
    assert_eq!(text["WFSerializationType"], "WFTextTokenString");
    assert_eq!(text["Value"]["string"], "hi, \u{FFFC}");
    let attachment = &text["Value"]["attachmentsByRange"]["{4, 1}"];
    assert_eq!(attachment["Type"], "Variable");
    assert_eq!(attachment["VariableName"], "name");
}

#[test]
fn user_action_call_runs_the_shortcut_itself() {
    let compilation = compile(
        "action double(number x) number {\n    output(x * 2)\n}\n@y = double(21)",
    );
    let shortcut = &compilation.shortcut;
    assert!(shortcut.has_shortcut_input_variables);
    assert_eq!(shortcut.actions[0].short_identifier(), "conditional");

    let run = shortcut
        .actions
        .iter()
        .position(|action| {
            action.short_identifier() == "runworkflow"
                && action.param("WFWorkflow") == Some(&json!({ "isSelf": true }))
        })
        .expect("runSelf call");
    let call = &shortcut.actions[run - 1];
    assert_eq!(call.short_identifier(), "dictionary");
    assert_eq!(
        output_uuid(shortcut.actions[run].param("WFInput").unwrap()),
        call.uuid()
    );

    let tail: Vec<_> = identifiers(shortcut).into_iter().rev().take(2).collect();
    assert_eq!(tail, vec!["setvariable", "number"]);
    let coerced = &shortcut.actions[shortcut.actions.len() - 2];
    assert_eq!(coerced.param_str("CustomOutputName"), Some("y"));
}

// =============================================================================
// Invariants
// =============================================================================

#[test]
fn reassignment_reuses_the_output_uuid() {
    let shortcut = compile("@a = 1\n@a = 2\nwait(a)").shortcut;
    let numbers = find(&shortcut, "number");
    assert_eq!(numbers.len(), 2);
    assert!(numbers[0].uuid().is_some());
    assert_eq!(numbers[0].uuid(), numbers[1].uuid());
}

#[test]
fn every_control_flow_action_is_grouped() {
    let shortcut = compile(
        "@n = 2\nrepeat i for n {\n    if i > 1 {\n        show(\"big\")\n    }\n}\nmenu \"Pick\" {\n    item \"A\":\n        show(\"a\")\n}",
    )
    .shortcut;
    for action in &shortcut.actions {
        if action.control_flow_mode().is_some() {
            assert!(action.grouping().is_some(), "{} has no group", action.identifier);
        }
    }
    let groups: std::collections::HashSet<_> =
        shortcut.actions.iter().filter_map(|a| a.grouping()).collect();
    assert_eq!(groups.len(), 3);
}

#[test]
fn comments_become_actions_only_when_enabled() {
    let source = "// greet\nshow(\"hi\")";
    assert_eq!(identifiers(&compile(source).shortcut), vec!["showresult"]);

    let options = CompileOptions {
        comments: true,
        ..CompileOptions::default()
    };
    let shortcut = cherri::compile_with_loader(source, options, &cherri::MemoryLoader::new())
        .unwrap()
        .shortcut;
    assert_eq!(identifiers(&shortcut), vec!["comment", "showresult"]);
    assert_eq!(shortcut.actions[0].param_str("WFCommentActionText"), Some("greet"));
}

#[test]
fn options_set_name_and_version() {
    let options = CompileOptions {
        name: Some("From Options".into()),
        min_version: Some("17".into()),
        ..CompileOptions::default()
    };
    let shortcut = cherri::compile_with_loader(
        "@x = 1\nif x == 1 {\n    show(\"one\")\n}",
        options,
        &cherri::MemoryLoader::new(),
    )
    .unwrap()
    .shortcut;
    assert_eq!(shortcut.name.as_deref(), Some("From Options"));
    assert_eq!(shortcut.client_version, "2106.0.3");
    let open = find(&shortcut, "conditional")[0];
    assert!(open.param("WFConditions").is_none());
    assert_eq!(open.param("WFCondition"), Some(&json!(4)));
}

#[test]
fn metadata_definitions() {
    let shortcut = compile(
        "#define name Tools\n#define color blue\n#define glyph house\n#define inputs text, url\n#define outputs text\n#define noinput getclipboard\nshow(\"x\")",
    )
    .shortcut;
    assert_eq!(shortcut.name.as_deref(), Some("Tools"));
    assert_eq!(shortcut.icon.start_color, 463140863);
    assert_eq!(shortcut.icon.glyph_number, 59755);
    assert_eq!(
        shortcut.input_content_item_classes,
        vec!["WFStringContentItem", "WFURLContentItem"]
    );
    assert_eq!(shortcut.output_content_item_classes, vec!["WFStringContentItem"]);
    assert_eq!(
        shortcut.no_input_behavior.as_ref().map(|b| b.name.as_str()),
        Some("WFWorkflowNoInputBehaviorGetClipboard")
    );
}

#[test]
fn shortcut_serializes_with_plist_keys() {
    let shortcut = compile("show(\"hi\")").shortcut;
    let value = serde_json::to_value(&shortcut).unwrap();
    assert_eq!(value["WFWorkflowActions"][0]["WFWorkflowActionIdentifier"], "is.workflow.actions.showresult");
    assert_eq!(value["WFWorkflowClientVersion"], "4033.0.4.3");
    assert_eq!(value["WFWorkflowIcon"]["WFWorkflowIconStartColor"], -1263359489);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn undefined_variable_points_at_its_line() {
    let err = cherri::compile_with_loader(
        "show(\"a\")\nshow(missing)",
        CompileOptions::default(),
        &cherri::MemoryLoader::new(),
    )
    .unwrap_err();
    assert_eq!(err.code, "S001");
    let location = err.location.expect("location");
    assert_eq!(location.file, "main.cherri");
    assert_eq!(location.line, 2);
}

#[test]
fn unknown_action_suggests_a_name() {
    let err = cherri::compile_with_loader(
        "Show(\"a\")",
        CompileOptions::default(),
        &cherri::MemoryLoader::new(),
    )
    .unwrap_err();
    assert_eq!(err.code, "S020");
    assert!(err.message.contains("Did you mean 'show()'"), "{}", err.message);
}

#[test]
fn invalid_version_option_is_rejected() {
    let options = CompileOptions {
        min_version: Some("99".into()),
        ..CompileOptions::default()
    };
    let err = cherri::compile_with_loader("show(\"a\")", options, &cherri::MemoryLoader::new())
        .unwrap_err();
    assert_eq!(err.code, "S050");
}

#[test]
fn long_standing_action_spellings_compile() {
    let shortcut = compile(
        "@words = list(\"a\", \"b\")\n@n = countWords(words)\n@joined = combineText(words, \"Spaces\")\n@avg = calcAverage(words)\n@first = firstListItem(words)",
    )
    .shortcut;
    assert_eq!(find(&shortcut, "count")[0].param_str("WFCountType"), Some("Words"));
    assert_eq!(
        find(&shortcut, "text.combine")[0].param_str("WFTextSeparator"),
        Some("Spaces")
    );
    assert_eq!(
        find(&shortcut, "statistics")[0].param_str("WFStatisticsOperation"),
        Some("Average")
    );
    assert_eq!(
        find(&shortcut, "getitemfromlist")[0].param_str("WFItemSpecifier"),
        Some("First Item")
    );
}
