//! Cherri: a small language that compiles to Apple Shortcuts, and back.
//!
//! `compile` runs preprocess → parse → emit → structural validation and
//! returns the Shortcut tree ready for a property-list marshaller.
//! `decompile` turns a Shortcut back into source.

pub mod catalog;
pub mod codegen;
pub mod context;
pub mod decompile;
pub mod error;
pub mod parse;
pub mod preprocess;
pub mod shortcut;
pub mod source;
pub mod tables;
pub mod validate;
pub mod wasm;

use serde::Serialize;
use tracing::{debug, info_span};

pub use context::CompileOptions;
pub use decompile::{Decompilation, decompile};
pub use error::{CompilerError, Diagnostic};
pub use shortcut::{Shortcut, ShortcutAction};
pub use source::{FsLoader, MemoryLoader, SourceLoader};

#[derive(Debug, Clone, Serialize)]
pub struct Compilation {
    pub shortcut: Shortcut,
    pub warnings: Vec<Diagnostic>,
}

/// Compile `source`, reading includes from the filesystem.
pub fn compile(source: &str, options: CompileOptions) -> Result<Compilation, CompilerError> {
    compile_with_loader(source, options, &FsLoader)
}

pub fn compile_with_loader(
    source: &str,
    options: CompileOptions,
    loader: &dyn SourceLoader,
) -> Result<Compilation, CompilerError> {
    let mut ctx = context::Context::new(options)?;
    let _span = info_span!("compile", file = %ctx.file_path()).entered();
    let mut cursor = source::Cursor::new(source, ctx.file_path());

    preprocess::preprocess(&mut ctx, &mut cursor, loader)?;
    parse::parse(&mut ctx, &mut cursor)?;
    let shortcut = codegen::generate(&mut ctx)?;
    validate::validate_shortcut(&shortcut)?;

    debug!(actions = shortcut.actions.len(), warnings = ctx.warnings.len(), "compiled");
    Ok(Compilation {
        shortcut,
        warnings: ctx.warnings,
    })
}
