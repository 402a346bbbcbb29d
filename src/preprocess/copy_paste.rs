//! `copy name { ... }` templates and `paste name` lines.

use std::collections::HashMap;

use tracing::debug;

use super::{block_lines, erase_lines};
use crate::error::{CompilerError, Phase};
use crate::source::{Cursor, Origin};

struct Pastable {
    lines: Vec<String>,
    origins: Vec<Origin>,
}

pub fn resolve(cursor: &mut Cursor) -> Result<(), CompilerError> {
    cursor.reset();
    let mut pastables: HashMap<String, Pastable> = HashMap::new();
    let mut erased = Vec::new();

    while cursor.seek_line_keyword("copy") {
        let start_line = cursor.line_idx();
        cursor.skip_spaces();
        let identifier = cursor.collect_identifier();
        if identifier.is_empty() {
            return Err(cursor.error(Phase::Preprocess, "R010", "Expected copy identifier"));
        }
        if pastables.contains_key(&identifier) {
            return Err(cursor.error(
                Phase::Preprocess,
                "R011",
                format!("Duplicate declaration of copy '{identifier}'"),
            ));
        }
        cursor.skip_whitespace();
        if cursor.char() != Some('{') {
            return Err(cursor.error(Phase::Preprocess, "R012", "Expected '{'"));
        }
        let body_line = cursor.line_idx();
        let body = cursor.collect_balanced('{', '}')?;
        let (lines, origins) = block_lines(cursor, body_line, &body);
        erased.push((start_line, cursor.line_idx()));
        pastables.insert(identifier, Pastable { lines, origins });
    }

    if pastables.is_empty() {
        return paste_undefined(cursor);
    }
    for (start, end) in erased {
        erase_lines(cursor, start, end);
    }

    // Splice from the bottom so earlier line indices stay valid.
    let pastes: Vec<(usize, String)> = cursor
        .lines()
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| paste_target(line).map(|name| (idx, name.to_string())))
        .collect();
    for (idx, name) in pastes.into_iter().rev() {
        let Some(pastable) = pastables.get(&name) else {
            cursor.reset();
            seek_line(cursor, idx);
            return Err(cursor.error(
                Phase::Preprocess,
                "R013",
                format!("Unable to paste undefined copy '{name}'"),
            ));
        };
        debug!(copy = %name, line = idx + 1, "paste");
        cursor.splice_lines(idx, 1, pastable.lines.clone(), pastable.origins.clone());
    }
    cursor.reset();
    Ok(())
}

/// With no templates declared, any `paste` line is an error.
fn paste_undefined(cursor: &mut Cursor) -> Result<(), CompilerError> {
    let first = cursor
        .lines()
        .iter()
        .enumerate()
        .find_map(|(idx, line)| paste_target(line).map(|name| (idx, name.to_string())));
    if let Some((idx, name)) = first {
        cursor.reset();
        seek_line(cursor, idx);
        return Err(cursor.error(
            Phase::Preprocess,
            "R013",
            format!("Unable to paste undefined copy '{name}'"),
        ));
    }
    cursor.reset();
    Ok(())
}

fn paste_target(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("paste")?;
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let name = rest.trim();
    (!name.is_empty() && name.chars().all(crate::source::cursor::is_ident_char)).then_some(name)
}

fn seek_line(cursor: &mut Cursor, line_idx: usize) {
    let offset: usize = cursor
        .lines()
        .iter()
        .take(line_idx)
        .map(|line| line.chars().count() + 1)
        .sum();
    cursor.seek(offset);
    cursor.skip_spaces();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paste_replaces_line_with_template_body() {
        let mut cursor = Cursor::new(
            "copy greet {\n    show(\"hi\")\n    show(\"there\")\n}\npaste greet\nshow(\"end\")",
            "main.cherri",
        );
        resolve(&mut cursor).unwrap();
        let lines: Vec<&str> = cursor.lines().iter().map(|l| l.trim()).collect();
        assert_eq!(lines, vec!["", "", "", "", "show(\"hi\")", "show(\"there\")", "show(\"end\")"]);
        assert_eq!(cursor.origins()[4].line, 2);
    }

    #[test]
    fn duplicate_copy_is_an_error() {
        let mut cursor = Cursor::new("copy a {\n}\ncopy a {\n}", "main.cherri");
        let err = resolve(&mut cursor).unwrap_err();
        assert!(err.message.contains("Duplicate declaration of copy 'a'"));
    }

    #[test]
    fn undefined_paste_is_an_error() {
        let mut cursor = Cursor::new("show(1)\npaste nope", "main.cherri");
        let err = resolve(&mut cursor).unwrap_err();
        assert!(err.message.contains("undefined copy 'nope'"));
        assert_eq!(err.location.unwrap().line, 2);
    }
}
