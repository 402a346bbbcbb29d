//! Character cursor over the preprocessed source buffer.
//!
//! The buffer is kept twice: as lines (which the preprocessor rewrites) and
//! as a flat character vector (which the lexer walks). `reset` folds the
//! lines back into the character vector and rewinds to the start.

use crate::error::{CompilerError, Diagnostic, Excerpt, Location, Phase};

/// Where a buffer line came from before preprocessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub file: String,
    /// 1-based line number in `file`.
    pub line: usize,
}

pub struct Cursor {
    lines: Vec<String>,
    origins: Vec<Origin>,
    chars: Vec<char>,
    line_starts: Vec<usize>,
    idx: usize,
}

pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl Cursor {
    pub fn new(source: &str, file: &str) -> Self {
        let lines: Vec<String> = source
            .replace("\r\n", "\n")
            .split('\n')
            .map(str::to_string)
            .collect();
        let origins = (0..lines.len())
            .map(|i| Origin {
                file: file.to_string(),
                line: i + 1,
            })
            .collect();
        let mut cursor = Cursor {
            lines,
            origins,
            chars: Vec::new(),
            line_starts: Vec::new(),
            idx: 0,
        };
        cursor.reset();
        cursor
    }

    /// Merge the line slice back into the character buffer and re-prime the
    /// cursor at the first character.
    pub fn reset(&mut self) {
        self.chars = self.lines.join("\n").chars().collect();
        self.line_starts.clear();
        self.line_starts.push(0);
        for (i, c) in self.chars.iter().enumerate() {
            if *c == '\n' {
                self.line_starts.push(i + 1);
            }
        }
        self.idx = 0;
    }

    // =========================================================================
    // Position
    // =========================================================================

    pub fn char(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    pub fn is_eof(&self) -> bool {
        self.idx >= self.chars.len()
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn seek(&mut self, idx: usize) {
        self.idx = idx.min(self.chars.len());
    }

    /// 0-based index of the line holding the current character.
    pub fn line_idx(&self) -> usize {
        self.line_of(self.idx)
    }

    /// 0-based column of the current character within its line.
    pub fn col_idx(&self) -> usize {
        self.idx - self.line_starts[self.line_idx()]
    }

    fn line_of(&self, idx: usize) -> usize {
        self.line_starts
            .partition_point(|start| *start <= idx)
            .saturating_sub(1)
    }

    pub fn at_line_start(&self) -> bool {
        self.idx == 0 || self.prev(1) == Some('\n')
    }

    // =========================================================================
    // Movement
    // =========================================================================

    pub fn advance(&mut self) {
        if self.idx < self.chars.len() {
            self.idx += 1;
        }
    }

    pub fn advance_times(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Advance until the current character is `ch` or the buffer ends.
    pub fn advance_until(&mut self, ch: char) {
        while let Some(c) = self.char() {
            if c == ch {
                break;
            }
            self.advance();
        }
    }

    /// Like `advance_until`, but fails once more than `max` characters were
    /// skipped without finding `ch`.
    pub fn advance_until_expect(&mut self, ch: char, max: usize) -> Result<(), CompilerError> {
        let mut advanced = 0;
        while self.char() != Some(ch) {
            if self.is_eof() || advanced >= max {
                return Err(self.error(Phase::Parse, "P001", format!("Expected '{ch}'")));
            }
            self.advance();
            advanced += 1;
        }
        Ok(())
    }

    /// The character `k` positions ahead, without moving.
    pub fn next(&self, k: usize) -> Option<char> {
        self.chars.get(self.idx + k).copied()
    }

    /// The character `k` positions behind, without moving.
    pub fn prev(&self, k: usize) -> Option<char> {
        self.idx.checked_sub(k).and_then(|i| self.chars.get(i).copied())
    }

    /// Match `keyword` at the cursor: the first character compares
    /// case-insensitively and the rest case-sensitively. On a match the cursor
    /// moves past the keyword.
    pub fn token_ahead(&mut self, keyword: &str) -> bool {
        if self.matches_ahead(keyword) {
            self.advance_times(keyword.chars().count());
            return true;
        }
        false
    }

    fn matches_ahead(&self, keyword: &str) -> bool {
        let mut expected = keyword.chars();
        let Some(first) = expected.next() else {
            return false;
        };
        match self.char() {
            Some(c) if c.to_lowercase().eq(first.to_lowercase()) => {}
            _ => return false,
        }
        expected
            .enumerate()
            .all(|(i, ch)| self.next(i + 1) == Some(ch))
    }

    /// `token_ahead` for words: the keyword must not run on into an identifier.
    pub fn keyword_ahead(&mut self, keyword: &str) -> bool {
        let len = keyword.chars().count();
        if self.matches_ahead(keyword) && !self.next(len).is_some_and(is_ident_char) {
            self.advance_times(len);
            return true;
        }
        false
    }

    /// Everything from the cursor up to (not including) `ch` or the end of the
    /// buffer. Does not move.
    pub fn look_ahead_until(&self, ch: char) -> String {
        self.chars[self.idx..]
            .iter()
            .take_while(|c| **c != ch)
            .collect()
    }

    /// Consume up to (not including) `ch` and return what was consumed.
    pub fn collect_until(&mut self, ch: char) -> String {
        let collected = self.look_ahead_until(ch);
        self.advance_times(collected.chars().count());
        collected
    }

    pub fn collect_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.char() {
            if !is_ident_char(c) {
                break;
            }
            ident.push(c);
            self.advance();
        }
        ident
    }

    /// Skip spaces and tabs, stopping at line breaks.
    pub fn skip_spaces(&mut self) {
        while matches!(self.char(), Some(' ' | '\t' | '\r')) {
            self.advance();
        }
    }

    /// Skip all whitespace including line breaks.
    pub fn skip_whitespace(&mut self) {
        while self.char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    pub fn text_between(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        if start >= end {
            return String::new();
        }
        self.chars[start..end].iter().collect()
    }

    // =========================================================================
    // Lexical skipping shared by the preprocessor passes
    // =========================================================================

    /// Skip a quoted literal starting at the cursor (`"` or `'`), honoring
    /// backslash escapes. Returns false if the literal is unterminated.
    pub fn skip_quoted(&mut self) -> bool {
        let Some(quote) = self.char() else {
            return false;
        };
        self.advance();
        while let Some(c) = self.char() {
            match c {
                '\\' => self.advance_times(2),
                c if c == quote => {
                    self.advance();
                    return true;
                }
                _ => self.advance(),
            }
        }
        false
    }

    /// Skip a `//` or `/* */` comment if one starts at the cursor.
    pub fn skip_comment(&mut self) -> bool {
        match (self.char(), self.next(1)) {
            (Some('/'), Some('/')) => {
                self.advance_until('\n');
                true
            }
            (Some('/'), Some('*')) => {
                self.advance_times(2);
                while !self.is_eof() && !(self.char() == Some('*') && self.next(1) == Some('/')) {
                    self.advance();
                }
                self.advance_times(2);
                true
            }
            _ => false,
        }
    }

    /// Move to the next line whose first lexeme is the word `keyword`, skipping
    /// string literals and comments. Leaves the cursor just past the keyword.
    pub fn seek_line_keyword(&mut self, keyword: &str) -> bool {
        while !self.is_eof() {
            if self.at_line_start() {
                self.skip_spaces();
                if self.keyword_ahead(keyword) {
                    return true;
                }
            }
            match self.char() {
                Some('"' | '\'') => {
                    self.skip_quoted();
                }
                Some('/') if self.skip_comment() => {}
                _ => self.advance(),
            }
        }
        false
    }

    /// With the cursor on `open`, consume through the matching `close` and
    /// return the text in between. Quoted literals and comments are skipped
    /// while counting.
    pub fn collect_balanced(&mut self, open: char, close: char) -> Result<String, CompilerError> {
        let start = self.idx;
        let mut depth = 0usize;
        while let Some(c) = self.char() {
            match c {
                '"' | '\'' => {
                    self.skip_quoted();
                    continue;
                }
                '/' if self.skip_comment() => continue,
                c if c == open => depth += 1,
                c if c == close => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let inner = self.text_between(start + 1, self.idx);
                        self.advance();
                        return Ok(inner);
                    }
                }
                _ => {}
            }
            self.advance();
        }
        self.seek(start);
        Err(self.error(Phase::Parse, "P002", format!("Expected closing '{close}'")))
    }

    // =========================================================================
    // Lines
    // =========================================================================

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn origins(&self) -> &[Origin] {
        &self.origins
    }

    pub fn set_line(&mut self, idx: usize, text: String) {
        if let Some(line) = self.lines.get_mut(idx) {
            *line = text;
        }
    }

    /// Replace `remove` lines at `at` with `lines`, attributing the new lines
    /// to `origins`. Takes effect on the next `reset`.
    pub fn splice_lines(&mut self, at: usize, remove: usize, lines: Vec<String>, origins: Vec<Origin>) {
        let end = (at + remove).min(self.lines.len());
        self.lines.splice(at..end, lines);
        self.origins.splice(at..end, origins);
    }

    pub fn origin(&self, line_idx: usize) -> Option<&Origin> {
        self.origins.get(line_idx)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub fn location(&self) -> Location {
        let line_idx = self.line_idx();
        match self.origins.get(line_idx) {
            Some(origin) => Location {
                file: origin.file.clone(),
                line: origin.line,
                column: self.col_idx() + 1,
            },
            None => Location {
                file: String::new(),
                line: line_idx + 1,
                column: self.col_idx() + 1,
            },
        }
    }

    fn excerpt(&self) -> Excerpt {
        let line_idx = self.line_idx();
        let location = self.location();
        Excerpt {
            line: location.line,
            column: location.column,
            previous: line_idx
                .checked_sub(1)
                .and_then(|i| self.lines.get(i))
                .cloned(),
            current: self.lines.get(line_idx).cloned().unwrap_or_default(),
            next: self.lines.get(line_idx + 1).cloned(),
        }
    }

    /// Build an error positioned at the cursor.
    pub fn error(&self, phase: Phase, code: &str, message: impl Into<String>) -> CompilerError {
        let err = match phase {
            Phase::Lex => CompilerError::lex(code, message),
            Phase::Preprocess => CompilerError::preprocess(code, message),
            Phase::Parse => CompilerError::parse(code, message),
            Phase::Semantic => CompilerError::semantic(code, message),
            Phase::Emit => CompilerError::emit(code, message),
            Phase::Decompile => CompilerError::decompile(code, message),
        };
        err.at(self.location(), Some(self.excerpt()))
    }

    pub fn warning(&self, code: &'static str, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            code,
            message: message.into(),
            location: Some(self.location()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ahead_first_char_is_case_insensitive() {
        let mut cursor = Cursor::new("If x", "main.cherri");
        assert!(cursor.token_ahead("if"));
        assert_eq!(cursor.char(), Some(' '));
    }

    #[test]
    fn token_ahead_rest_is_case_sensitive() {
        let mut cursor = Cursor::new("iF x", "main.cherri");
        assert!(!cursor.token_ahead("if"));
        assert_eq!(cursor.idx(), 0);
    }

    #[test]
    fn keyword_ahead_respects_word_boundary() {
        let mut cursor = Cursor::new("iffy()", "main.cherri");
        assert!(!cursor.keyword_ahead("if"));
        assert!(cursor.token_ahead("if"));
    }

    #[test]
    fn line_and_column_follow_the_cursor() {
        let mut cursor = Cursor::new("ab\ncd", "main.cherri");
        cursor.advance_times(4);
        assert_eq!(cursor.char(), Some('d'));
        assert_eq!(cursor.line_idx(), 1);
        assert_eq!(cursor.col_idx(), 1);
        assert_eq!(cursor.location().line, 2);
        assert_eq!(cursor.location().column, 2);
    }

    #[test]
    fn advance_until_expect_fails_past_limit() {
        let mut cursor = Cursor::new("abcdef)", "main.cherri");
        assert!(cursor.advance_until_expect(')', 3).is_err());
        cursor.seek(0);
        assert!(cursor.advance_until_expect(')', 10).is_ok());
        assert_eq!(cursor.char(), Some(')'));
    }

    #[test]
    fn next_and_prev_do_not_move() {
        let mut cursor = Cursor::new("xyz", "main.cherri");
        cursor.advance();
        assert_eq!(cursor.next(1), Some('z'));
        assert_eq!(cursor.prev(1), Some('x'));
        assert_eq!(cursor.prev(2), None);
        assert_eq!(cursor.char(), Some('y'));
    }

    #[test]
    fn look_ahead_until_stops_before_delimiter() {
        let cursor = Cursor::new("show(x)", "main.cherri");
        assert_eq!(cursor.look_ahead_until('('), "show");
    }

    #[test]
    fn collect_balanced_skips_strings() {
        let mut cursor = Cursor::new("{ \"}\" { a } }rest", "main.cherri");
        let inner = cursor.collect_balanced('{', '}').unwrap();
        assert_eq!(inner, " \"}\" { a } ");
        assert_eq!(cursor.char(), Some('r'));
    }

    #[test]
    fn reset_reflects_rewritten_lines() {
        let mut cursor = Cursor::new("one\ntwo", "main.cherri");
        cursor.splice_lines(
            1,
            1,
            vec!["2a".into(), "2b".into()],
            vec![
                Origin { file: "inc.cherri".into(), line: 1 },
                Origin { file: "inc.cherri".into(), line: 2 },
            ],
        );
        cursor.reset();
        cursor.advance_times(7);
        assert_eq!(cursor.char(), Some('2'));
        assert_eq!(cursor.location().file, "inc.cherri");
        assert_eq!(cursor.location().line, 2);
    }

    #[test]
    fn seek_line_keyword_ignores_strings() {
        let mut cursor = Cursor::new("show(\"\ncopy\")\n  copy a {}", "main.cherri");
        assert!(cursor.seek_line_keyword("copy"));
        assert_eq!(cursor.line_idx(), 2);
    }
}
