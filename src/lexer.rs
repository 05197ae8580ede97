//! Scanner for Arden source text.
//!
//! The lexer is pull-based: callers repeatedly invoke [`Lexer::scan_token`]
//! until `Eof`. Indentation is turned into synthetic `Indent`/`Dedent`
//! tokens by a state machine that keeps a stack of indent widths; a line
//! that closes several blocks at once emits one `Dedent` per call, with the
//! remaining state parked in `pending_indent` until the stack matches.
//!
//! All lexemes are slices into an arena-owned copy of the source, so they
//! stay valid for the lifetime of the compilation.

use crate::arena::Arena;
use crate::token::{keyword_kind, Payload, Token, TokenKind};

pub struct Lexer<'a> {
    arena: &'a Arena,
    src: &'a str,
    bytes: &'a [u8],
    filename: &'a str,
    start: usize,
    cursor: usize,
    line: u32,
    indent_stack: Vec<i32>,
    at_line_start: bool,
    pending_indent: Option<i32>,
    pending_cursor: usize,
}

const MAX_NUMBER_LEN: usize = 255;

impl<'a> Lexer<'a> {
    pub fn new(arena: &'a Arena, source: &str, filename: &str) -> Lexer<'a> {
        let src = arena.alloc_str(source);
        Lexer {
            arena,
            src,
            bytes: src.as_bytes(),
            filename: arena.alloc_str(filename),
            start: 0,
            cursor: 0,
            line: 1,
            indent_stack: vec![0],
            at_line_start: true,
            pending_indent: None,
            pending_cursor: 0,
        }
    }

    /// Indent levels currently open, the zero baseline included.
    pub fn indent_depth(&self) -> usize {
        self.indent_stack.len()
    }

    fn is_at_end(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    fn peek(&self) -> u8 {
        if self.cursor < self.bytes.len() {
            self.bytes[self.cursor]
        } else {
            0
        }
    }

    fn peek_next(&self) -> u8 {
        if self.cursor + 1 < self.bytes.len() {
            self.bytes[self.cursor + 1]
        } else {
            0
        }
    }

    fn advance(&mut self) -> u8 {
        let c = self.peek();
        self.cursor += 1;
        c
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == expected {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn lexeme(&self) -> &'a str {
        self.src.get(self.start..self.cursor).unwrap_or("")
    }

    fn make_token(&self, kind: TokenKind) -> Token<'a> {
        Token::new(kind, self.lexeme(), self.line, self.filename)
    }

    fn error_token(&self, message: &str) -> Token<'a> {
        self.error_token_at(message, self.line)
    }

    fn error_token_at(&self, message: &str, line: u32) -> Token<'a> {
        Token::new(
            TokenKind::Error,
            self.arena.alloc_str(message),
            line,
            self.filename,
        )
    }

    /// True when `#` at `pos` begins a `#pragma` directive rather than a
    /// line comment.
    fn is_pragma_at(&self, pos: usize) -> bool {
        self.bytes[pos..].starts_with(b"#pragma")
    }

    /// Skip spaces, tabs, carriage returns, and line comments. Newlines
    /// are grammar tokens and are never consumed here.
    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' => {
                    self.cursor += 1;
                }
                b'/' if self.peek_next() == b'/' => {
                    while !self.is_at_end() && self.peek() != b'\n' {
                        self.cursor += 1;
                    }
                }
                b'#' => {
                    if self.is_pragma_at(self.cursor) {
                        return;
                    }
                    while !self.is_at_end() && self.peek() != b'\n' {
                        self.cursor += 1;
                    }
                }
                _ => return,
            }
        }
    }

    /// Beginning-of-line indentation processing. Returns a token when an
    /// `Indent`/`Dedent`/`Error` must be emitted before any real token.
    fn handle_line_start(&mut self) -> Option<Token<'a>> {
        let current_indent;
        let content_cursor;

        if let Some(pending) = self.pending_indent {
            // Multi-dedent replay: reuse the indent measured last call.
            current_indent = pending;
            content_cursor = self.pending_cursor;
        } else {
            let indent_start = self.cursor;
            let mut indent = 0;
            while self.peek() == b' ' || self.peek() == b'\t' {
                indent += 1;
                self.cursor += 1;
            }
            current_indent = indent;
            content_cursor = self.cursor;

            // Blank and comment-only lines do not participate in the
            // indent grammar; #pragma is not a comment.
            let c = self.peek();
            let comment_only = self.is_at_end()
                || c == b'\n'
                || c == b'\r'
                || (c == b'/' && self.peek_next() == b'/')
                || (c == b'#' && !self.is_pragma_at(self.cursor));
            if comment_only {
                self.cursor = indent_start;
                self.start = indent_start;
                return None;
            }
        }

        self.cursor = content_cursor;
        self.start = content_cursor;
        let top = *self.indent_stack.last().unwrap();

        if current_indent > top {
            self.indent_stack.push(current_indent);
            self.at_line_start = false;
            self.pending_indent = None;
            return Some(self.make_token(TokenKind::Indent));
        }
        if current_indent < top {
            self.indent_stack.pop();
            let new_top = *self.indent_stack.last().unwrap();
            if current_indent == new_top {
                self.at_line_start = false;
                self.pending_indent = None;
            } else if current_indent > new_top {
                self.at_line_start = false;
                self.pending_indent = None;
                return Some(self.error_token("Inconsistent indentation"));
            } else {
                // More dedents to come; park the measured indent so the
                // next call replays this comparison.
                self.pending_indent = Some(current_indent);
                self.pending_cursor = content_cursor;
            }
            return Some(self.make_token(TokenKind::Dedent));
        }

        self.at_line_start = false;
        self.pending_indent = None;
        None
    }

    /// Scan the next token. Never panics on malformed input; problems
    /// come back as `Error` tokens and scanning continues.
    pub fn scan_token(&mut self) -> Token<'a> {
        if self.at_line_start {
            if let Some(token) = self.handle_line_start() {
                return token;
            }
        }

        self.skip_whitespace();
        self.start = self.cursor;

        if !self.is_at_end() && self.peek() == b'\n' {
            let line = self.line;
            self.cursor += 1;
            self.line += 1;
            self.at_line_start = true;
            return Token::new(TokenKind::Newline, "", line, self.filename);
        }

        if self.is_at_end() {
            // Close any blocks still open, one Dedent per call.
            if self.indent_stack.len() > 1 {
                self.indent_stack.pop();
                return Token::new(TokenKind::Dedent, "", self.line, self.filename);
            }
            return Token::new(TokenKind::Eof, "", self.line, self.filename);
        }

        let c = self.advance();

        if c.is_ascii_alphabetic() || c == b'_' {
            return self.scan_identifier();
        }
        if c.is_ascii_digit() {
            return self.scan_number();
        }

        match c {
            b'(' => self.make_token(TokenKind::LeftParen),
            b')' => self.make_token(TokenKind::RightParen),
            b'{' => self.make_token(TokenKind::LeftBrace),
            b'}' => self.make_token(TokenKind::RightBrace),
            b'[' => self.make_token(TokenKind::LeftBracket),
            b']' => self.make_token(TokenKind::RightBracket),
            b',' => self.make_token(TokenKind::Comma),
            b';' => self.make_token(TokenKind::Semicolon),
            b':' => self.make_token(TokenKind::Colon),
            b'.' => {
                if self.match_byte(b'.') {
                    if self.match_byte(b'.') {
                        self.make_token(TokenKind::Spread)
                    } else {
                        self.make_token(TokenKind::Range)
                    }
                } else {
                    self.make_token(TokenKind::Dot)
                }
            }
            b'+' => {
                if self.match_byte(b'+') {
                    self.make_token(TokenKind::PlusPlus)
                } else if self.match_byte(b'=') {
                    self.make_token(TokenKind::PlusEqual)
                } else {
                    self.make_token(TokenKind::Plus)
                }
            }
            b'-' => {
                if self.match_byte(b'-') {
                    self.make_token(TokenKind::MinusMinus)
                } else if self.match_byte(b'=') {
                    self.make_token(TokenKind::MinusEqual)
                } else if self.match_byte(b'>') {
                    self.make_token(TokenKind::Arrow)
                } else {
                    self.make_token(TokenKind::Minus)
                }
            }
            b'*' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::StarEqual)
                } else {
                    self.make_token(TokenKind::Star)
                }
            }
            b'/' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::SlashEqual)
                } else {
                    self.make_token(TokenKind::Slash)
                }
            }
            b'%' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::PercentEqual)
                } else {
                    self.make_token(TokenKind::Percent)
                }
            }
            b'=' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::EqualEqual)
                } else if self.match_byte(b'>') {
                    self.make_token(TokenKind::Arrow)
                } else {
                    self.make_token(TokenKind::Equal)
                }
            }
            b'!' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::BangEqual)
                } else {
                    self.make_token(TokenKind::Bang)
                }
            }
            b'<' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::LessEqual)
                } else {
                    self.make_token(TokenKind::Less)
                }
            }
            b'>' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::GreaterEqual)
                } else {
                    self.make_token(TokenKind::Greater)
                }
            }
            b'&' => {
                if self.match_byte(b'&') {
                    self.make_token(TokenKind::And)
                } else {
                    self.make_token(TokenKind::Ampersand)
                }
            }
            b'|' => {
                if self.match_byte(b'|') {
                    return self.make_token(TokenKind::Or);
                }
                if self.pipe_opens_block() {
                    return self.scan_pipe_string(false);
                }
                self.make_token(TokenKind::Or)
            }
            b'"' => self.scan_string(TokenKind::StringLiteral),
            b'\'' => self.scan_char(),
            b'$' => {
                if self.peek() == b'"' {
                    self.cursor += 1;
                    return self.scan_string(TokenKind::InterpolString);
                }
                if self.peek() == b'|' {
                    self.cursor += 1;
                    if self.pipe_opens_block() {
                        return self.scan_pipe_string(true);
                    }
                    self.cursor -= 1;
                }
                self.error_token("Unexpected character '$'")
            }
            b'#' => {
                if self.bytes[self.cursor..].starts_with(b"pragma") {
                    self.cursor += 6;
                    while self.peek() == b' ' || self.peek() == b'\t' {
                        self.cursor += 1;
                    }
                    self.at_line_start = false;
                    let directives: [(&[u8], TokenKind); 5] = [
                        (b"include", TokenKind::PragmaInclude),
                        (b"link", TokenKind::PragmaLink),
                        (b"source", TokenKind::PragmaSource),
                        (b"pack", TokenKind::PragmaPack),
                        (b"alias", TokenKind::PragmaAlias),
                    ];
                    for (word, kind) in directives {
                        if self.bytes[self.cursor..].starts_with(word) {
                            self.cursor += word.len();
                            return self.make_token(kind);
                        }
                    }
                    return self.error_token("Unknown pragma directive");
                }
                self.error_token("Unexpected character '#'")
            }
            other => {
                let message = if other.is_ascii_graphic() {
                    format!("Unexpected character '{}'", other as char)
                } else {
                    format!("Unexpected character (byte 0x{other:02x})")
                };
                self.error_token(&message)
            }
        }
    }

    fn scan_identifier(&mut self) -> Token<'a> {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.cursor += 1;
        }
        let text = self.lexeme();
        match keyword_kind(text) {
            Some(TokenKind::BoolLiteral) => {
                let mut token = self.make_token(TokenKind::BoolLiteral);
                token.payload = Payload::Bool(text == "true");
                token
            }
            Some(kind) => self.make_token(kind),
            None => self.make_token(TokenKind::Identifier),
        }
    }

    fn scan_number(&mut self) -> Token<'a> {
        while self.peek().is_ascii_digit() {
            self.cursor += 1;
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.cursor += 1;
            while self.peek().is_ascii_digit() {
                self.cursor += 1;
            }
            let digits_end = self.cursor;
            let kind = match self.peek() {
                b'f' | b'F' => {
                    self.cursor += 1;
                    TokenKind::FloatLiteral
                }
                b'd' | b'D' => {
                    self.cursor += 1;
                    TokenKind::DoubleLiteral
                }
                _ => TokenKind::DoubleLiteral,
            };
            return self.finish_float(kind, digits_end);
        }

        let digits_end = self.cursor;
        match self.peek() {
            b'l' | b'L' => {
                self.cursor += 1;
                self.finish_int(TokenKind::LongLiteral, digits_end)
            }
            b'b' | b'B' => {
                self.cursor += 1;
                self.finish_byte(digits_end)
            }
            b'u' | b'U' => {
                self.cursor += 1;
                if self.peek() == b'3' && self.peek_next() == b'2' {
                    self.cursor += 2;
                    self.finish_uint32(digits_end)
                } else {
                    self.finish_uint(digits_end)
                }
            }
            b'i' | b'I' if self.peek_next() == b'3' => {
                self.cursor += 1;
                if self.peek() == b'3' && self.peek_next() == b'2' {
                    self.cursor += 2;
                    self.finish_int32(digits_end)
                } else {
                    self.error_token("Invalid number suffix")
                }
            }
            _ => self.finish_int(TokenKind::IntLiteral, digits_end),
        }
    }

    fn digits(&self, digits_end: usize) -> Option<&'a str> {
        let text = &self.src[self.start..digits_end];
        if text.len() > MAX_NUMBER_LEN {
            None
        } else {
            Some(text)
        }
    }

    fn finish_int(&mut self, kind: TokenKind, digits_end: usize) -> Token<'a> {
        let Some(text) = self.digits(digits_end) else {
            return self.error_token("Number literal too long");
        };
        let Ok(value) = text.parse::<i64>() else {
            return match kind {
                TokenKind::LongLiteral => self.error_token("Long literal out of range"),
                _ => self.error_token("Int literal out of range"),
            };
        };
        let mut token = self.make_token(kind);
        token.payload = Payload::Int(value);
        token
    }

    fn finish_byte(&mut self, digits_end: usize) -> Token<'a> {
        let Some(text) = self.digits(digits_end) else {
            return self.error_token("Number literal too long");
        };
        match text.parse::<i64>() {
            Ok(value) if (0..=255).contains(&value) => {
                let mut token = self.make_token(TokenKind::ByteLiteral);
                token.payload = Payload::Int(value);
                token
            }
            _ => self.error_token("Byte literal out of range (0-255)"),
        }
    }

    fn finish_uint(&mut self, digits_end: usize) -> Token<'a> {
        let Some(text) = self.digits(digits_end) else {
            return self.error_token("Number literal too long");
        };
        let Ok(value) = text.parse::<u64>() else {
            return self.error_token("Uint literal out of range");
        };
        let mut token = self.make_token(TokenKind::UintLiteral);
        token.payload = Payload::Int(value as i64);
        token
    }

    fn finish_uint32(&mut self, digits_end: usize) -> Token<'a> {
        let Some(text) = self.digits(digits_end) else {
            return self.error_token("Number literal too long");
        };
        match text.parse::<u64>() {
            Ok(value) if value <= u32::MAX as u64 => {
                let mut token = self.make_token(TokenKind::Uint32Literal);
                token.payload = Payload::Int(value as i64);
                token
            }
            _ => self.error_token("Uint32 literal out of range"),
        }
    }

    fn finish_int32(&mut self, digits_end: usize) -> Token<'a> {
        let Some(text) = self.digits(digits_end) else {
            return self.error_token("Number literal too long");
        };
        match text.parse::<i64>() {
            Ok(value) if (i32::MIN as i64..=i32::MAX as i64).contains(&value) => {
                let mut token = self.make_token(TokenKind::Int32Literal);
                token.payload = Payload::Int(value);
                token
            }
            _ => self.error_token("Int32 literal out of range"),
        }
    }

    fn finish_float(&mut self, kind: TokenKind, digits_end: usize) -> Token<'a> {
        let Some(text) = self.digits(digits_end) else {
            return self.error_token("Number literal too long");
        };
        let Ok(value) = text.parse::<f64>() else {
            return self.error_token("Malformed number literal");
        };
        let mut token = self.make_token(kind);
        token.payload = Payload::Double(value);
        token
    }

    /// String body scanning, shared by `"..."` and `$"..."`.
    ///
    /// Escapes are processed only at interpolation depth zero; the text of
    /// `{...}` fragments is preserved verbatim for the parser to re-lex,
    /// with nested string literals inside braces tracked so their quotes
    /// do not terminate the outer string.
    fn scan_string(&mut self, kind: TokenKind) -> Token<'a> {
        let mut buf: Vec<u8> = Vec::new();
        let mut brace_depth = 0usize;
        let mut string_depth = 0usize;
        let start_line = self.line;

        while !self.is_at_end() {
            let c = self.peek();

            if c == b'"' && brace_depth == 0 && string_depth == 0 {
                break;
            }
            if c == b'\n' {
                self.line += 1;
            }

            if c == b'\\' {
                self.cursor += 1;
                if self.is_at_end() {
                    buf.push(b'\\');
                    break;
                }
                let escaped = self.peek();
                if brace_depth == 0 && string_depth == 0 {
                    match escaped {
                        b'\\' => buf.push(b'\\'),
                        b'n' => buf.push(b'\n'),
                        b'r' => buf.push(b'\r'),
                        b't' => buf.push(b'\t'),
                        b'"' => buf.push(b'"'),
                        _ => return self.error_token("Invalid escape sequence"),
                    }
                } else {
                    buf.push(b'\\');
                    buf.push(escaped);
                }
                self.cursor += 1;
            } else if c == b'$' && brace_depth > 0 && string_depth == 0 && self.peek_next() == b'"'
            {
                buf.push(b'$');
                buf.push(b'"');
                self.cursor += 2;
                string_depth += 1;
            } else if c == b'"' && brace_depth > 0 {
                buf.push(b'"');
                self.cursor += 1;
                if string_depth > 0 {
                    string_depth -= 1;
                } else {
                    string_depth += 1;
                }
            } else if c == b'{' && string_depth == 0 {
                brace_depth += 1;
                buf.push(c);
                self.cursor += 1;
            } else if c == b'}' && string_depth == 0 {
                brace_depth = brace_depth.saturating_sub(1);
                buf.push(c);
                self.cursor += 1;
            } else {
                buf.push(c);
                self.cursor += 1;
            }
        }

        if self.is_at_end() {
            let message = format!("Unterminated string starting at line {start_line}");
            return self.error_token_at(&message, start_line);
        }
        self.cursor += 1;

        let mut token = self.make_token(kind);
        let owned = String::from_utf8_lossy(&buf);
        token.payload = Payload::Str(self.arena.alloc_str(&owned));
        token
    }

    fn scan_char(&mut self) -> Token<'a> {
        let value;
        if self.peek() == b'\\' {
            self.cursor += 1;
            value = match self.peek() {
                b'\\' => b'\\',
                b'n' => b'\n',
                b'r' => b'\r',
                b't' => b'\t',
                b'\'' => b'\'',
                _ => return self.error_token("Invalid escape sequence"),
            };
        } else if self.peek() == b'\'' {
            return self.error_token("Empty character literal");
        } else {
            value = self.peek();
        }
        self.cursor += 1;
        if self.peek() != b'\'' {
            return self.error_token("Unterminated character literal");
        }
        self.cursor += 1;
        let mut token = self.make_token(TokenKind::CharLiteral);
        token.payload = Payload::Char(value);
        token
    }

    /// After consuming `|` (or `$|`): does only whitespace separate the
    /// pipe from the end of the line?
    fn pipe_opens_block(&self) -> bool {
        let mut pos = self.cursor;
        while pos < self.bytes.len() && (self.bytes[pos] == b' ' || self.bytes[pos] == b'\t') {
            pos += 1;
        }
        pos >= self.bytes.len() || self.bytes[pos] == b'\n' || self.bytes[pos] == b'\r'
    }

    /// Pipe block string: the lines indented past the current block are
    /// collected, the common indent of the non-blank lines is stripped,
    /// and the result (one `\n` after every line, blank lines kept as bare
    /// `\n`) becomes the token payload. The terminating line's preceding
    /// newline is handed back to the normal scanner so the block is still
    /// followed by a `Newline` token.
    fn scan_pipe_string(&mut self, is_interpolated: bool) -> Token<'a> {
        while self.peek() == b' ' || self.peek() == b'\t' {
            self.cursor += 1;
        }
        if !self.is_at_end() && self.peek() != b'\n' && self.peek() != b'\r' {
            return self.error_token("Pipe block string requires newline after '|'");
        }

        // Consume the newline after '|', remembering where it began in
        // case the block turns out to be empty.
        let mut last_eol = self.cursor;
        if self.peek() == b'\r' {
            self.cursor += 1;
        }
        if self.peek() == b'\n' {
            self.cursor += 1;
            self.line += 1;
        }

        let base_indent = *self.indent_stack.last().unwrap();

        struct PipeLine {
            start: usize,
            end: usize,
            indent: i32,
            blank: bool,
        }
        let mut lines: Vec<PipeLine> = Vec::new();
        let mut min_content_indent = i32::MAX;
        let mut terminated_by_dedent = false;

        while !self.is_at_end() {
            let line_start = self.cursor;
            let mut line_indent = 0;
            while self.peek() == b' ' || self.peek() == b'\t' {
                line_indent += 1;
                self.cursor += 1;
            }

            let is_blank =
                self.is_at_end() || self.peek() == b'\n' || self.peek() == b'\r';

            if !is_blank && line_indent <= base_indent {
                // Dedent ends the block; resume scanning at the newline
                // that preceded this line.
                self.cursor = line_start;
                terminated_by_dedent = true;
                break;
            }

            let content_start = self.cursor;
            while !self.is_at_end() && self.peek() != b'\n' && self.peek() != b'\r' {
                self.cursor += 1;
            }
            lines.push(PipeLine {
                start: content_start,
                end: self.cursor,
                indent: if is_blank { 0 } else { line_indent },
                blank: is_blank,
            });
            if !is_blank && line_indent < min_content_indent {
                min_content_indent = line_indent;
            }

            last_eol = self.cursor;
            if self.peek() == b'\r' {
                self.cursor += 1;
            }
            if self.peek() == b'\n' {
                self.cursor += 1;
                self.line += 1;
            }
        }

        if min_content_indent == i32::MAX {
            min_content_indent = base_indent + 1;
        }

        let mut buf = String::new();
        for line in &lines {
            if line.blank {
                buf.push('\n');
                continue;
            }
            for _ in 0..(line.indent - min_content_indent).max(0) {
                buf.push(' ');
            }
            buf.push_str(&self.src[line.start..line.end]);
            buf.push('\n');
        }

        if terminated_by_dedent {
            self.cursor = last_eol;
            self.line -= 1;
            self.at_line_start = false;
        } else {
            self.at_line_start = true;
        }

        let kind = if is_interpolated {
            TokenKind::InterpolString
        } else {
            TokenKind::StringLiteral
        };
        let mut token = self.make_token(kind);
        token.payload = Payload::Str(self.arena.alloc_str(&buf));
        token
    }
}
