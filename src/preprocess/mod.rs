//! Source rewriting that runs before parsing: includes, copy/paste
//! templates and user-defined actions. Each pass ends with a cursor reset.

pub mod actions;
pub mod copy_paste;
pub mod includes;

use tracing::debug_span;

use crate::context::Context;
use crate::error::CompilerError;
use crate::source::{Cursor, Origin, SourceLoader};

pub fn preprocess(
    ctx: &mut Context,
    cursor: &mut Cursor,
    loader: &dyn SourceLoader,
) -> Result<(), CompilerError> {
    let _span = debug_span!("preprocess", file = %ctx.file_path()).entered();
    includes::resolve(ctx, cursor, loader)?;
    copy_paste::resolve(cursor)?;
    actions::resolve(ctx, cursor)?;
    cursor.reset();
    Ok(())
}

/// Lines of a brace body collected by `Cursor::collect_balanced`, paired with
/// their origins. The body starts on `start_line`, right after the `{`.
/// Leading and trailing blank lines are dropped.
pub(crate) fn block_lines(cursor: &Cursor, start_line: usize, body: &str) -> (Vec<String>, Vec<Origin>) {
    let mut lines = Vec::new();
    let mut origins = Vec::new();
    for (offset, line) in body.split('\n').enumerate() {
        let origin = cursor
            .origin(start_line + offset)
            .cloned()
            .unwrap_or_else(|| Origin {
                file: String::new(),
                line: start_line + offset + 1,
            });
        lines.push(line.to_string());
        origins.push(origin);
    }
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => (
            lines[first..=last].to_vec(),
            origins[first..=last].to_vec(),
        ),
        _ => (Vec::new(), Vec::new()),
    }
}

/// Blank out buffer lines `start..=end`, keeping the line count stable.
pub(crate) fn erase_lines(cursor: &mut Cursor, start: usize, end: usize) {
    for idx in start..=end {
        cursor.set_line(idx, String::new());
    }
}
