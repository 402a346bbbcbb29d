//! Unified compiler error type used across all phases.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Lex,
    Preprocess,
    Parse,
    Semantic,
    Emit,
    Decompile,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Lex => write!(f, "Lex"),
            Phase::Preprocess => write!(f, "Preprocess"),
            Phase::Parse => write!(f, "Parse"),
            Phase::Semantic => write!(f, "Semantic"),
            Phase::Emit => write!(f, "Emit"),
            Phase::Decompile => write!(f, "Decompile"),
        }
    }
}

/// A position in an original source file. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// The lines surrounding an error, taken from the preprocessed buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Excerpt {
    pub line: usize,
    pub column: usize,
    pub previous: Option<String>,
    pub current: String,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompilerError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub location: Option<Location>,
    #[serde(skip)]
    pub excerpt: Option<Excerpt>,
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "[{}:{}] {} ({})", self.phase, self.code, self.message, loc),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for CompilerError {}

impl CompilerError {
    fn new(phase: Phase, code: &str, message: impl Into<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase,
            message: message.into(),
            location: None,
            excerpt: None,
        }
    }

    pub fn lex(code: &str, message: impl Into<String>) -> Self {
        Self::new(Phase::Lex, code, message)
    }

    pub fn preprocess(code: &str, message: impl Into<String>) -> Self {
        Self::new(Phase::Preprocess, code, message)
    }

    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        Self::new(Phase::Parse, code, message)
    }

    pub fn semantic(code: &str, message: impl Into<String>) -> Self {
        Self::new(Phase::Semantic, code, message)
    }

    pub fn emit(code: &str, message: impl Into<String>) -> Self {
        Self::new(Phase::Emit, code, message)
    }

    pub fn decompile(code: &str, message: impl Into<String>) -> Self {
        Self::new(Phase::Decompile, code, message)
    }

    pub fn at(mut self, location: Location, excerpt: Option<Excerpt>) -> Self {
        self.location = Some(location);
        self.excerpt = excerpt;
        self
    }

    /// Render the error with the previous, current and next source lines,
    /// underlining the offending column.
    pub fn render(&self) -> String {
        let mut out = self.to_string();
        let Some(excerpt) = &self.excerpt else {
            return out;
        };
        let width = (excerpt.line + 1).to_string().len();
        out.push('\n');
        if let Some(prev) = &excerpt.previous {
            out.push_str(&format!("{:>width$} | {}\n", excerpt.line - 1, prev));
        }
        out.push_str(&format!("{:>width$} | {}\n", excerpt.line, excerpt.current));
        let pad: String = excerpt
            .current
            .chars()
            .take(excerpt.column.saturating_sub(1))
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        out.push_str(&format!("{:>width$} | {}^\n", "", pad));
        if let Some(next) = &excerpt.next {
            out.push_str(&format!("{:>width$} | {}\n", excerpt.line + 1, next));
        }
        out
    }
}

/// A recoverable problem. Collected on the pipeline context and returned
/// next to the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub location: Option<Location>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "warning[{}]: {} ({})", self.code, self.message, loc),
            None => write!(f, "warning[{}]: {}", self.code, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let err = CompilerError::semantic("S001", "Undefined variable 'x'").at(
            Location {
                file: "main.cherri".into(),
                line: 3,
                column: 7,
            },
            None,
        );
        assert_eq!(
            err.to_string(),
            "[Semantic:S001] Undefined variable 'x' (main.cherri:3:7)"
        );
    }

    #[test]
    fn render_underlines_column() {
        let err = CompilerError::parse("P001", "Expected '('").at(
            Location {
                file: "main.cherri".into(),
                line: 2,
                column: 5,
            },
            Some(Excerpt {
                line: 2,
                column: 5,
                previous: Some("@a = 1".into()),
                current: "show x".into(),
                next: None,
            }),
        );
        let rendered = err.render();
        assert!(rendered.contains("1 | @a = 1"));
        assert!(rendered.contains("2 | show x"));
        assert!(rendered.ends_with("  |     ^\n"));
    }
}
