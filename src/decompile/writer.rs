//! Indent-aware string builder for Cherri source.
//!
//! Cherri uses 4-space indentation.

/// Indent-aware string builder that produces formatted Cherri source.
pub struct CodeWriter {
    buf: String,
    indent_level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(4096),
            indent_level: 0,
        }
    }

    /// Write a complete line (appends newline).
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.indent_level {
            self.buf.push_str("    ");
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Write `text {` and increase indent (e.g. `if x == 1 {`).
    pub fn block_open(&mut self, text: &str) {
        self.line(&format!("{text} {{"));
        self.indent();
    }

    /// Decrease indent and write `}`.
    pub fn block_close(&mut self) {
        self.dedent();
        self.line("}");
    }

    /// Decrease indent and write `} else {` and re-indent.
    pub fn block_else(&mut self) {
        self.dedent();
        self.line("} else {");
        self.indent();
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the generated string.
    pub fn finish(self) -> String {
        self.buf
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}
