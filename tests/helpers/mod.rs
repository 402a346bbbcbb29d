#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use cherri::{CompileOptions, Compilation, MemoryLoader, Shortcut, ShortcutAction};
use serde_json::Value as Json;

// =============================================================================
// Pipeline
// =============================================================================

/// Compile `source` with default options and no includes.
pub fn compile(source: &str) -> Compilation {
    match cherri::compile_with_loader(source, CompileOptions::default(), &MemoryLoader::new()) {
        Ok(compilation) => compilation,
        Err(err) => panic!("compile failed:\n{}", err.render()),
    }
}

/// Compile `source` as `main.cherri` next to the given in-memory files.
pub fn compile_with_files(source: &str, files: &[(&str, &str)]) -> Result<Compilation, cherri::CompilerError> {
    let loader = files
        .iter()
        .fold(MemoryLoader::new(), |loader, (path, contents)| loader.with_file(*path, *contents));
    cherri::compile_with_loader(source, CompileOptions::default(), &loader)
}

pub fn fixture(name: &str) -> String {
    fs::read_to_string(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join(name))
        .unwrap_or_else(|err| panic!("fixture {name}: {err}"))
}

// =============================================================================
// Shortcut inspection
// =============================================================================

/// Short identifiers of every action, in order.
pub fn identifiers(shortcut: &Shortcut) -> Vec<&str> {
    shortcut.actions.iter().map(ShortcutAction::short_identifier).collect()
}

/// Identifier and parameter key set of every action.
pub fn shape(shortcut: &Shortcut) -> Vec<(String, BTreeSet<String>)> {
    shortcut
        .actions
        .iter()
        .map(|action| (action.identifier.clone(), action.parameters.keys().cloned().collect()))
        .collect()
}

pub fn find<'a>(shortcut: &'a Shortcut, short: &str) -> Vec<&'a ShortcutAction> {
    shortcut
        .actions
        .iter()
        .filter(|action| action.short_identifier() == short)
        .collect()
}

/// The `OutputUUID` an attachment parameter points at.
pub fn output_uuid(param: &Json) -> Option<&str> {
    param.get("Value")?.get("OutputUUID")?.as_str()
}
