//! Decompiling compiled Shortcuts, and compiling the result again.

mod helpers;

use pretty_assertions::assert_eq;
use serde_json::json;

use cherri::{Shortcut, ShortcutAction, decompile};
use helpers::{compile, fixture, shape};

/// Compile, decompile, recompile; the two Shortcuts must agree on every
/// action identifier and parameter key set.
fn assert_round_trip(source: &str) -> String {
    let first = compile(source).shortcut;
    let decompiled = decompile(&first).unwrap().source;
    let second = compile(&decompiled).shortcut;
    assert_eq!(shape(&first), shape(&second), "decompiled as:\n{decompiled}");
    decompiled
}

#[test]
fn reference_fixture_decompiles_exactly() {
    let shortcut = compile(&fixture("decomp_me.cherri")).shortcut;
    let decompilation = decompile(&shortcut).unwrap();
    assert_eq!(decompilation.source, fixture("decomp_expected.cherri"));

    let codes: Vec<_> = decompilation.warnings.iter().map(|w| w.code).collect();
    assert_eq!(codes, vec!["W012"]);
}

#[test]
fn reference_fixture_round_trips() {
    assert_round_trip(&fixture("decomp_me.cherri"));
}

#[test]
fn decompiled_source_is_a_fixed_point() {
    let expected = fixture("decomp_expected.cherri");
    let shortcut = compile(&expected).shortcut;
    assert_eq!(decompile(&shortcut).unwrap().source, expected);
}

#[test]
fn variables_and_constants() {
    let source = assert_round_trip("@a = 5\nconst b = \"x{a}\"\n@a *= 2\nshow(b)");
    assert_eq!(source, "@a = 5\nconst b = \"x{a}\"\n@a = a * 2\nshow(\"{b}\")\n");
}

#[test]
fn expressions() {
    let source = assert_round_trip("@n = 7\n@m = n % 3\n@k = n * 2 + 1");
    assert_eq!(source, "@n = 7\n@m = n % 3\n@k = n * 2 + 1\n");
}

#[test]
fn nested_loops_use_depth_aliases() {
    let source = assert_round_trip(
        "@l = list(\"a\", \"b\")\nfor x in l {\n    repeat j for 2 {\n        show(\"{x} {j}\")\n    }\n}",
    );
    assert_eq!(
        source,
        "@l = list(\"a\", \"b\")\nfor item in l {\n    repeat i2 for 2 {\n        show(\"{item} {i2}\")\n    }\n}\n"
    );
}

#[test]
fn conditions_join_with_their_prefix() {
    let source = assert_round_trip(
        "@a = 1\n@b = \"t\"\nif a >= 1 || b contains \"x\" {\n    show(\"yes\")\n}\nif a between 1 and 5 {\n    show(\"in\")\n}\nif !b {\n    show(\"empty\")\n}",
    );
    assert!(source.contains("if a >= 1 || b contains \"x\" {\n"), "{source}");
    assert!(source.contains("if a between 1 and 5 {\n"), "{source}");
    assert!(source.contains("if !b {\n"), "{source}");
}

#[test]
fn catalog_calls_keep_optional_arguments() {
    let source = assert_round_trip("alert(\"body\")\nconfirm(\"sure?\", \"Title\")\nwait(2)");
    assert_eq!(source, "alert(\"body\")\nconfirm(\"sure?\", \"Title\")\nwait(2)\n");
}

#[test]
fn unknown_actions_survive_as_raw_actions() {
    let shortcut = Shortcut {
        actions: vec![ShortcutAction::new(
            "com.example.lamp",
            serde_json::from_value(json!({ "Brightness": 40, "Room": "Hall" })).unwrap(),
        )],
        ..Shortcut::default()
    };
    let decompilation = decompile(&shortcut).unwrap();
    insta::assert_snapshot!(
        decompilation.source,
        @r#"rawAction("com.example.lamp", [{"Brightness": 40}, {"Room": "Hall"}])"#
    );
    let recompiled = compile(&decompilation.source).shortcut;
    assert_eq!(shape(&shortcut), shape(&recompiled));
}

#[test]
fn implicit_block_outputs_warn() {
    let mut shortcut = compile("@x = 1\nif x == 1 {\n    show(\"one\")\n}").shortcut;
    let close = shortcut.actions.last().unwrap();
    let uuid = close.uuid().unwrap().to_string();
    let mut parameters = serde_json::Map::new();
    parameters.insert(
        "Text".into(),
        json!({
            "Value": { "OutputName": "If Result", "OutputUUID": uuid, "Type": "ActionOutput" },
            "WFSerializationType": "WFTextTokenAttachment",
        }),
    );
    shortcut
        .actions
        .push(ShortcutAction::new("is.workflow.actions.showresult", parameters));

    let decompilation = decompile(&shortcut).unwrap();
    assert!(decompilation.source.ends_with("show(If_Result)\n"), "{}", decompilation.source);
    assert!(decompilation.warnings.iter().any(|w| w.code == "W010"));
}

#[test]
fn literal_braces_become_raw_strings() {
    let source = assert_round_trip("@s = 'lit {braces}'\nshow(s)");
    assert!(source.starts_with("@s = 'lit {braces}'\n"), "{source}");
}

#[test]
fn outputs_named_like_keywords_are_renamed() {
    let shortcut = Shortcut {
        actions: vec![
            ShortcutAction::new(
                "is.workflow.actions.gettext",
                serde_json::from_value(json!({
                    "CustomOutputName": "if",
                    "UUID": "A1",
                    "WFTextActionText": "q",
                }))
                .unwrap(),
            ),
            ShortcutAction::new(
                "is.workflow.actions.showresult",
                serde_json::from_value(json!({
                    "Text": {
                        "Value": { "OutputName": "if", "OutputUUID": "A1", "Type": "ActionOutput" },
                        "WFSerializationType": "WFTextTokenAttachment",
                    },
                }))
                .unwrap(),
            ),
        ],
        ..Shortcut::default()
    };
    let source = decompile(&shortcut).unwrap().source;
    assert_eq!(source, "const if_ = \"q\"\nshow(if_)\n");
    let recompiled = compile(&source).shortcut;
    assert_eq!(shape(&shortcut), shape(&recompiled));
}

#[test]
fn shorthand_spellings_decompile_to_canonical_names() {
    let source = assert_round_trip("@l = list(\"a\", \"b\")\n@t = combineText(l, \"Spaces\")\nshow(t)");
    assert!(source.contains("joinText("), "{source}");
    assert!(!source.contains("combineText"), "{source}");
}
