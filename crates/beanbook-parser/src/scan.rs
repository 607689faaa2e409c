//! Tokenizing scanner: raw UTF-8 source to a sequence of flagged lines.
//!
//! The scanner is a character-driven state machine. It knows nothing about
//! directives; it only splits the input into [`Line`]s of [`Token`]s,
//! recording for each line where it started and whether it was indented.
//! Quoted strings may span lines and keep the starting line number.
//! Scanning never fails: an unterminated string runs to end-of-input and
//! becomes one long quoted token.

/// A minimal part of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text, with quotes stripped and `\"` escapes resolved
    pub text: String,
    /// True when the token came from a quoted string
    pub quoted: bool,
}

impl Token {
    #[cfg(test)]
    fn bare(text: &str) -> Self {
        Self {
            text: text.to_string(),
            quoted: false,
        }
    }
}

/// A collection of tokens from one input line.
///
/// A line containing a multi-line quoted string covers several physical
/// lines; `number` is always the line it started on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// 1-based starting line number
    pub number: usize,
    /// True when whitespace preceded the first token content
    pub indented: bool,
    /// Tokens in input order
    pub tokens: Vec<Token>,
}

impl Line {
    /// A line with no tokens at all.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Scanner state while walking the input.
#[derive(Debug, Default)]
struct Scanner {
    // current token
    buf: String,
    in_quote: bool,
    quoted: bool,
    prev: Option<char>,

    // current line
    cursor_line: usize,
    line_start: usize,
    in_comment: bool,
    indented: bool,
    tokens: Vec<Token>,

    lines: Vec<Line>,
}

impl Scanner {
    fn new() -> Self {
        Self {
            cursor_line: 1,
            line_start: 1,
            ..Self::default()
        }
    }

    fn flush_token(&mut self) {
        if !self.buf.is_empty() || self.quoted {
            self.tokens.push(Token {
                text: std::mem::take(&mut self.buf),
                quoted: self.quoted,
            });
        }
        self.in_quote = false;
        self.quoted = false;
    }

    fn end_line(&mut self) {
        self.lines.push(Line {
            number: self.line_start,
            indented: self.indented,
            tokens: std::mem::take(&mut self.tokens),
        });
        self.indented = false;
        self.in_comment = false;
    }

    fn step(&mut self, ch: char) {
        match ch {
            '\n' => {
                self.cursor_line += 1;
                if self.in_quote {
                    self.buf.push(ch);
                } else {
                    self.flush_token();
                    self.end_line();
                    self.line_start = self.cursor_line;
                }
            }
            ' ' | '\t' | '\r' if !self.in_quote => {
                if self.in_comment {
                    // comment text is discarded wholesale
                } else if self.tokens.is_empty() && self.buf.is_empty() {
                    self.indented = true;
                } else {
                    self.flush_token();
                }
            }
            '"' if !self.in_comment => {
                if self.in_quote {
                    if self.prev == Some('\\') {
                        // drop the backslash that was buffered before the quote
                        self.buf.pop();
                        self.buf.push(ch);
                    } else {
                        self.quoted = true;
                        self.flush_token();
                    }
                } else {
                    self.flush_token();
                    self.in_quote = true;
                }
            }
            ';' if !self.in_quote => {
                if !self.in_comment {
                    self.flush_token();
                    self.in_comment = true;
                }
            }
            '{' | '}' if !self.in_quote && !self.in_comment => {
                self.flush_token();
                self.buf.push(ch);
                self.flush_token();
            }
            _ => {
                if !self.in_comment {
                    self.buf.push(ch);
                }
            }
        }
        self.prev = Some(ch);
    }

    fn finish(mut self) -> Vec<Line> {
        // Input ended without a newline: close the pending token and line.
        if self.in_quote {
            self.quoted = true;
        }
        self.flush_token();
        if !self.tokens.is_empty() {
            self.end_line();
            self.line_start = self.cursor_line + 1;
        }
        // Ensure the output ends with a blank line.
        if self.lines.last().is_some_and(|l| !l.is_blank()) {
            self.lines.push(Line {
                number: self.line_start,
                ..Line::default()
            });
        }
        self.lines
    }
}

/// Scan source text into lines of tokens.
///
/// The output always ends with a blank [`Line`] when any line was produced
/// at all.
#[must_use]
pub fn scan(source: &str) -> Vec<Line> {
    let mut scanner = Scanner::new();
    for ch in source.chars() {
        scanner.step(ch);
    }
    scanner.finish()
}
