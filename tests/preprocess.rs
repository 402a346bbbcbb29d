//! Includes, copy/paste and user actions through the full pipeline.

mod helpers;

use pretty_assertions::assert_eq;

use helpers::{compile, compile_with_files, identifiers};

#[test]
fn includes_splice_in_place() {
    let compilation = compile_with_files(
        "show(\"before\")\n#include \"lib.cherri\"\nshow(greeting)",
        &[("lib.cherri", "@greeting = \"hi\"")],
    )
    .unwrap();
    assert_eq!(
        identifiers(&compilation.shortcut),
        vec!["showresult", "gettext", "setvariable", "showresult"]
    );
}

#[test]
fn missing_include_is_reported() {
    let err = compile_with_files("#include \"nope.cherri\"", &[]).unwrap_err();
    assert_eq!(err.code, "R002");
    assert!(err.message.contains("nope.cherri"));
}

#[test]
fn include_cycles_are_rejected() {
    let err = compile_with_files(
        "#include \"a.cherri\"",
        &[("a.cherri", "#include \"b.cherri\""), ("b.cherri", "#include \"a.cherri\"")],
    )
    .unwrap_err();
    assert_eq!(err.code, "R004");
    assert!(err.message.starts_with("Include cycle"), "{}", err.message);
}

#[test]
fn errors_inside_includes_point_at_the_included_file() {
    let err = compile_with_files(
        "show(\"ok\")\n#include \"lib.cherri\"",
        &[("lib.cherri", "\nshow(undefined_name)")],
    )
    .unwrap_err();
    assert_eq!(err.code, "S001");
    let location = err.location.expect("location");
    assert_eq!(location.file, "lib.cherri");
    assert_eq!(location.line, 2);
}

#[test]
fn paste_repeats_a_template() {
    let shortcut = compile(
        "copy greet {\n    show(\"hi\")\n}\npaste greet\npaste greet",
    )
    .shortcut;
    assert_eq!(identifiers(&shortcut), vec!["showresult", "showresult"]);
}

#[test]
fn unused_user_actions_leave_no_trace() {
    let shortcut = compile("action noop() {\n    show(\"x\")\n}\nshow(\"y\")").shortcut;
    assert_eq!(identifiers(&shortcut), vec!["showresult"]);
    assert!(!shortcut.has_shortcut_input_variables);
}
