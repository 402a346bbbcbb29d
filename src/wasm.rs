//! WASM entry points for browser use.

use std::collections::HashMap;

use wasm_bindgen::prelude::*;

use crate::context::CompileOptions;
use crate::error::{CompilerError, Diagnostic};
use crate::shortcut::Shortcut;
use crate::source::MemoryLoader;

/// Compile source text. `options` is a `CompileOptions` object (camelCase
/// keys, all optional); `files` maps include paths to their contents.
/// Returns `{status: "success", shortcut, warnings}` or
/// `{status: "errors", errors}`.
#[wasm_bindgen]
pub fn compile(source: &str, options: JsValue, files: JsValue) -> JsValue {
    let result = compile_inner(source, options, files);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn compile_inner(source: &str, options: JsValue, files: JsValue) -> CompileResult {
    let options: CompileOptions = if options.is_undefined() || options.is_null() {
        CompileOptions::default()
    } else {
        match serde_wasm_bindgen::from_value(options) {
            Ok(o) => o,
            Err(e) => {
                return CompileResult::Errors {
                    errors: vec![input_error(format!("Invalid options: {e}"))],
                };
            }
        }
    };
    let files: HashMap<String, String> = if files.is_undefined() || files.is_null() {
        HashMap::new()
    } else {
        match serde_wasm_bindgen::from_value(files) {
            Ok(f) => f,
            Err(e) => {
                return CompileResult::Errors {
                    errors: vec![input_error(format!("Invalid files: {e}"))],
                };
            }
        }
    };
    let loader = files
        .into_iter()
        .fold(MemoryLoader::new(), |loader, (path, contents)| loader.with_file(path, contents));

    match crate::compile_with_loader(source, options, &loader) {
        Ok(compilation) => CompileResult::Success {
            shortcut: compilation.shortcut,
            warnings: compilation.warnings.into_iter().map(WarningDto::from).collect(),
        },
        Err(e) => CompileResult::Errors {
            errors: vec![ErrorDto::from(e)],
        },
    }
}

/// Decompile a Shortcut given as JSON with plist key names.
/// Returns `{status: "success", source, warnings}` or
/// `{status: "errors", errors}`.
#[wasm_bindgen]
pub fn decompile(shortcut_json: &str) -> JsValue {
    let result = decompile_inner(shortcut_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn decompile_inner(shortcut_json: &str) -> DecompileResult {
    let shortcut = match Shortcut::from_json(shortcut_json) {
        Ok(s) => s,
        Err(e) => {
            return DecompileResult::Errors {
                errors: vec![input_error(format!("Failed to parse Shortcut JSON: {e}"))],
            };
        }
    };
    match crate::decompile(&shortcut) {
        Ok(decompilation) => DecompileResult::Success {
            source: decompilation.source,
            warnings: decompilation.warnings.into_iter().map(WarningDto::from).collect(),
        },
        Err(e) => DecompileResult::Errors {
            errors: vec![ErrorDto::from(e)],
        },
    }
}

fn input_error(message: String) -> ErrorDto {
    ErrorDto {
        code: "P001".into(),
        phase: "Parse".into(),
        message,
        location: None,
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    location: Option<String>,
}

impl From<CompilerError> for ErrorDto {
    fn from(e: CompilerError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            location: e.location.map(|loc| loc.to_string()),
        }
    }
}

#[derive(serde::Serialize)]
struct WarningDto {
    code: String,
    message: String,
    location: Option<String>,
}

impl From<Diagnostic> for WarningDto {
    fn from(d: Diagnostic) -> Self {
        WarningDto {
            code: d.code.to_string(),
            message: d.message,
            location: d.location.map(|loc| loc.to_string()),
        }
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "status")]
enum CompileResult {
    #[serde(rename = "success")]
    Success {
        shortcut: Shortcut,
        warnings: Vec<WarningDto>,
    },
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}

#[derive(serde::Serialize)]
#[serde(tag = "status")]
enum DecompileResult {
    #[serde(rename = "success")]
    Success {
        source: String,
        warnings: Vec<WarningDto>,
    },
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}
