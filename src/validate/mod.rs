//! Post-emit validation.
//!
//! Checks the emitted action list for the structure Shortcuts relies on.
//! Anything reported here is a compiler bug rather than a user error, so the
//! first failure aborts the compilation as an `Emit` error.

pub mod structural;

use tracing::debug;

use crate::error::CompilerError;
use crate::shortcut::Shortcut;

/// Validate an emitted Shortcut. Returns the first structural error.
pub fn validate_shortcut(shortcut: &Shortcut) -> Result<(), CompilerError> {
    let errors = structural::validate_structural(shortcut);
    debug!(errors = errors.len(), "validated");
    match errors.into_iter().next() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
