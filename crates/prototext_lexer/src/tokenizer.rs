//! The tokenizer driver and lexeme recognizers.
//!
//! `next()` skips whitespace and comments (emitting them only when asked),
//! dispatches on the current byte to a recognizer, and leaves the result in
//! `current()` with the previously emitted token in `previous()`. Malformed
//! input never aborts tokenization: problems are reported to the error
//! collector and scanning continues, so one `next()` call can deliver
//! several error reports while still producing a token.

use crate::classify;
use crate::cursor::InputCursor;
use crate::input::ZeroCopyInput;
use crate::report::ErrorCollector;
use crate::token::{Token, TokenKind};

/// Which comment syntax the tokenizer recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentStyle {
    /// `//` line comments and `/* */` block comments.
    Cpp,
    /// `#` line comments.
    Sh,
}

/// Outcome of the comment-start disambiguator.
enum CommentStatus {
    /// Started a line comment.
    LineComment,
    /// Started a block comment.
    BlockComment,
    /// Consumed a slash, then realized it wasn't a comment. `current` has
    /// been filled in with a slash token; the caller should return it.
    SlashNotComment,
    /// We do not appear to be starting a comment here.
    NoComment,
}

/// Streaming tokenizer for protobuf-style text syntax.
///
/// Borrows its input stream and error collector for its whole lifetime. On
/// drop, the unread suffix of the current buffer is handed back to the
/// stream so a subsequent reader can resume from the exact byte position.
pub struct Tokenizer<'a, I: ZeroCopyInput<'a>> {
    cursor: InputCursor<'a, I>,
    errors: &'a mut dyn ErrorCollector,
    current: Token,
    previous: Token,

    comment_style: CommentStyle,
    allow_f_after_float: bool,
    require_space_after_number: bool,
    allow_multiline_strings: bool,
    report_whitespace: bool,
    report_newlines: bool,
}

impl<'a, I: ZeroCopyInput<'a>> Tokenizer<'a, I> {
    /// Create a tokenizer reading from `input`.
    pub fn new(input: I, errors: &'a mut dyn ErrorCollector) -> Self {
        Self::with_initial_buffer(&[], input, errors)
    }

    /// Create a tokenizer that consumes `initial` first, then `input`.
    pub fn with_initial_buffer(
        initial: &'a [u8],
        input: I,
        errors: &'a mut dyn ErrorCollector,
    ) -> Self {
        Self {
            cursor: InputCursor::new(Some(initial), input),
            errors,
            current: Token::default(),
            previous: Token::default(),
            comment_style: CommentStyle::Cpp,
            allow_f_after_float: false,
            require_space_after_number: true,
            allow_multiline_strings: false,
            report_whitespace: false,
            report_newlines: false,
        }
    }

    // === Configuration ===

    /// Set the comment style. Default: [`CommentStyle::Cpp`].
    pub fn set_comment_style(&mut self, style: CommentStyle) {
        self.comment_style = style;
    }

    /// Allow numeric literals suffixed with the letter `f`. Tokens which
    /// would otherwise be integers but carry the suffix are forced to be
    /// floats. Default: false.
    pub fn set_allow_f_after_float(&mut self, allow: bool) {
        self.allow_f_after_float = allow;
    }

    /// Whether a letter directly after a number is an error. Default: true.
    pub fn set_require_space_after_number(&mut self, require: bool) {
        self.require_space_after_number = require;
    }

    /// Whether string literals may span line breaks. Default: false.
    pub fn set_allow_multiline_strings(&mut self, allow: bool) {
        self.allow_multiline_strings = allow;
    }

    /// If true, whitespace tokens are reported by `next()`. Turning this
    /// off also turns off newline reporting.
    pub fn set_report_whitespace(&mut self, report: bool) {
        self.report_whitespace = report;
        self.report_newlines &= report;
    }

    /// If true, newline tokens are reported by `next()`. Turning this on
    /// also turns on whitespace reporting.
    pub fn set_report_newlines(&mut self, report: bool) {
        self.report_newlines = report;
        self.report_whitespace |= report;
    }

    pub fn report_whitespace(&self) -> bool {
        self.report_whitespace
    }

    pub fn report_newlines(&self) -> bool {
        self.report_newlines
    }

    // === Inspection ===

    /// The token produced by the most recent `next()` call.
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// A copy of the token that preceded `current()`.
    pub fn previous(&self) -> &Token {
        &self.previous
    }

    // === Driver ===

    /// Advance to the next token. Returns false once the end of input is
    /// reached, leaving an [`TokenKind::End`] token in `current()`.
    #[allow(
        clippy::should_implement_trait,
        reason = "not an iterator: false still leaves an END token in current()"
    )]
    pub fn next(&mut self) -> bool {
        // Swap rather than copy so the text buffers are reused.
        std::mem::swap(&mut self.previous, &mut self.current);

        while !self.cursor.read_error() {
            self.start_token();
            let report_token = self.try_consume_whitespace() || self.try_consume_newline();
            self.end_token();
            if report_token {
                return true;
            }

            match self.try_consume_comment_start() {
                CommentStatus::LineComment => {
                    self.consume_line_comment(None);
                    continue;
                }
                CommentStatus::BlockComment => {
                    self.consume_block_comment(None);
                    continue;
                }
                CommentStatus::SlashNotComment => return true,
                CommentStatus::NoComment => {}
            }

            // Check for EOF before continuing.
            if self.cursor.read_error() {
                break;
            }

            if classify::is_unprintable(self.cursor.current()) || self.cursor.current() == 0 {
                self.add_error("Invalid control characters encountered in text.");
                self.cursor.advance();
                // Drain the rest of the run. '\0' is also what current()
                // reports after end of input, so embedded NUL bytes are only
                // consumed while the read-error flag is clear.
                while self.try_consume_one(classify::is_unprintable)
                    || (!self.cursor.read_error() && self.try_consume(0))
                {}
            } else {
                // Reading some sort of token.
                self.start_token();

                if self.try_consume_one(classify::is_letter) {
                    self.consume_zero_or_more(classify::is_alphanumeric);
                    self.current.kind = TokenKind::Identifier;
                } else if self.try_consume(b'0') {
                    self.current.kind = self.consume_number(true, false);
                } else if self.try_consume(b'.') {
                    // This could be the beginning of a floating-point number,
                    // or it could just be a '.' symbol.
                    if self.try_consume_one(classify::is_digit) {
                        // Syntax like "blah.123" is not accepted.
                        if self.previous.kind == TokenKind::Identifier
                            && self.current.line == self.previous.line
                            && self.current.column == self.previous.end_column
                        {
                            let line = self.cursor.line();
                            let column = self.cursor.column() - 2;
                            self.errors.add_error(
                                line,
                                column,
                                "Need space between identifier and decimal point.",
                            );
                        }
                        self.current.kind = self.consume_number(false, true);
                    } else {
                        self.current.kind = TokenKind::Symbol;
                    }
                } else if self.try_consume_one(classify::is_digit) {
                    self.current.kind = self.consume_number(false, false);
                } else if self.try_consume(b'"') {
                    self.consume_string(b'"');
                    self.current.kind = TokenKind::String;
                } else if self.try_consume(b'\'') {
                    self.consume_string(b'\'');
                    self.current.kind = TokenKind::String;
                } else {
                    let byte = self.cursor.current();
                    if byte & 0x80 != 0 {
                        let line = self.cursor.line();
                        let column = self.cursor.column();
                        let message = format!("Interpreting non ascii codepoint {byte}.");
                        self.errors.add_error(line, column, &message);
                    }
                    self.cursor.advance();
                    self.current.kind = TokenKind::Symbol;
                }

                self.end_token();
                return true;
            }
        }

        // End of input.
        self.current.kind = TokenKind::End;
        self.current.text.clear();
        self.current.line = self.cursor.line();
        self.current.column = self.cursor.column();
        self.current.end_column = self.cursor.column();
        false
    }

    // === Consumption helpers ===

    /// Report an error at the cursor's current position.
    fn add_error(&mut self, message: &str) {
        let line = self.cursor.line();
        let column = self.cursor.column();
        self.errors.add_error(line, column, message);
    }

    /// Consume `byte` if it is the current byte.
    fn try_consume(&mut self, byte: u8) -> bool {
        if self.cursor.current() == byte {
            self.cursor.advance();
            true
        } else {
            false
        }
    }

    /// Consume one byte of the given class, if present.
    fn try_consume_one(&mut self, class: impl Fn(u8) -> bool) -> bool {
        if class(self.cursor.current()) {
            self.cursor.advance();
            true
        } else {
            false
        }
    }

    fn consume_zero_or_more(&mut self, class: impl Fn(u8) -> bool) {
        while class(self.cursor.current()) {
            self.cursor.advance();
        }
    }

    /// Consume at least one byte of the given class, reporting `error` at
    /// the current position if none is there.
    fn consume_one_or_more(&mut self, class: impl Fn(u8) -> bool, error: &str) {
        if class(self.cursor.current()) {
            while class(self.cursor.current()) {
                self.cursor.advance();
            }
        } else {
            self.add_error(error);
        }
    }

    /// Begin the current token at the cursor position and start capturing
    /// its text.
    fn start_token(&mut self) {
        self.current.kind = TokenKind::Start;
        self.current.text.clear();
        self.current.line = self.cursor.line();
        self.current.column = self.cursor.column();
        self.cursor.start_recording();
    }

    /// Finish the current token: stop capturing and stamp the end column.
    fn end_token(&mut self) {
        self.cursor.stop_recording(&mut self.current.text);
        self.current.end_column = self.cursor.column();
    }

    // === Whitespace ===

    fn try_consume_whitespace(&mut self) -> bool {
        if self.report_newlines {
            if self.try_consume_one(classify::is_whitespace_no_newline) {
                self.consume_zero_or_more(classify::is_whitespace_no_newline);
                self.current.kind = TokenKind::Whitespace;
                return true;
            }
            return false;
        }
        if self.try_consume_one(classify::is_whitespace) {
            self.consume_zero_or_more(classify::is_whitespace);
            self.current.kind = TokenKind::Whitespace;
            return self.report_whitespace;
        }
        false
    }

    fn try_consume_newline(&mut self) -> bool {
        if !self.report_whitespace || !self.report_newlines {
            return false;
        }
        if self.try_consume(b'\n') {
            self.current.kind = TokenKind::Newline;
            return true;
        }
        false
    }

    // === Comments ===

    fn try_consume_comment_start(&mut self) -> CommentStatus {
        if self.comment_style == CommentStyle::Cpp && self.try_consume(b'/') {
            if self.try_consume(b'/') {
                CommentStatus::LineComment
            } else if self.try_consume(b'*') {
                CommentStatus::BlockComment
            } else {
                // Oops, it was just a slash. Return it.
                self.current.kind = TokenKind::Symbol;
                self.current.text.clear();
                self.current.text.push(b'/');
                self.current.line = self.cursor.line();
                self.current.column = self.cursor.column() - 1;
                self.current.end_column = self.cursor.column();
                CommentStatus::SlashNotComment
            }
        } else if self.comment_style == CommentStyle::Sh && self.try_consume(b'#') {
            CommentStatus::LineComment
        } else {
            CommentStatus::NoComment
        }
    }

    /// Consume the rest of a line comment. If `content` is given, the
    /// comment body (including the trailing newline, when present) is
    /// appended to it.
    fn consume_line_comment(&mut self, content: Option<&mut Vec<u8>>) {
        if content.is_some() {
            self.cursor.start_recording();
        }
        self.cursor.skip_to_line_end();
        self.try_consume(b'\n');
        if let Some(out) = content {
            self.cursor.stop_recording(out);
        }
    }

    /// Consume the rest of a block comment; the opening `/*` has already
    /// been consumed. If `content` is given, the body is appended to it
    /// with each continuation line's leading `whitespace '*'` and the
    /// closing `*/` excluded.
    fn consume_block_comment(&mut self, mut content: Option<&mut Vec<u8>>) {
        let start_line = self.cursor.line();
        let start_column = self.cursor.column() - 2;

        if content.is_some() {
            self.cursor.start_recording();
        }

        loop {
            self.cursor.skip_to_block_delim();

            if self.try_consume(b'\n') {
                if let Some(out) = content.as_deref_mut() {
                    self.cursor.stop_recording(out);
                }
                // Consume leading whitespace and asterisk of a
                // continuation line.
                self.consume_zero_or_more(classify::is_whitespace_no_newline);
                if self.try_consume(b'*') && self.try_consume(b'/') {
                    // End of comment.
                    return;
                }
                if content.is_some() {
                    self.cursor.start_recording();
                }
            } else if self.try_consume(b'*') && self.try_consume(b'/') {
                // End of comment.
                if let Some(out) = content.as_deref_mut() {
                    self.cursor.stop_recording(out);
                    // Strip the trailing "*/".
                    out.truncate(out.len() - 2);
                }
                return;
            } else if self.try_consume(b'/') && self.cursor.current() == b'*' {
                // The '*' is not consumed: if a '/' follows it can still
                // close the outer comment.
                self.add_error(
                    "\"/*\" inside block comment.  Block comments cannot be nested.",
                );
            } else if self.cursor.current() == 0 {
                self.add_error("End-of-file inside block comment.");
                self.errors
                    .add_error(start_line, start_column, "  Comment started here.");
                if let Some(out) = content.as_deref_mut() {
                    self.cursor.stop_recording(out);
                }
                return;
            }
        }
    }

    // === Numbers ===

    /// Consume a numeric literal. The first byte (`0`, `.`, or another
    /// digit, per the shape hints) has already been consumed.
    fn consume_number(&mut self, started_with_zero: bool, started_with_dot: bool) -> TokenKind {
        let mut is_float = false;

        if started_with_zero && (self.try_consume(b'x') || self.try_consume(b'X')) {
            // A hex number.
            self.consume_one_or_more(
                classify::is_hex_digit,
                "\"0x\" must be followed by hex digits.",
            );
        } else if started_with_zero && classify::is_digit(self.cursor.current()) {
            // An octal number (had a leading zero).
            self.consume_zero_or_more(classify::is_octal_digit);
            if classify::is_digit(self.cursor.current()) {
                self.add_error("Numbers starting with leading zero must be in octal.");
                self.consume_zero_or_more(classify::is_digit);
            }
        } else {
            // A decimal number.
            if started_with_dot {
                is_float = true;
                self.consume_zero_or_more(classify::is_digit);
            } else {
                self.consume_zero_or_more(classify::is_digit);
                if self.try_consume(b'.') {
                    is_float = true;
                    self.consume_zero_or_more(classify::is_digit);
                }
            }

            if self.try_consume(b'e') || self.try_consume(b'E') {
                is_float = true;
                let _ = self.try_consume(b'-') || self.try_consume(b'+');
                self.consume_one_or_more(classify::is_digit, "\"e\" must be followed by exponent.");
            }

            if self.allow_f_after_float && (self.try_consume(b'f') || self.try_consume(b'F')) {
                is_float = true;
            }
        }

        if classify::is_letter(self.cursor.current()) && self.require_space_after_number {
            self.add_error("Need space between number and identifier.");
        } else if self.cursor.current() == b'.' {
            if is_float {
                self.add_error("Already saw decimal point or exponent; can't have another one.");
            } else {
                self.add_error("Hex and octal numbers must be integers.");
            }
        }

        if is_float {
            TokenKind::Float
        } else {
            TokenKind::Integer
        }
    }

    // === Strings ===

    /// Consume a string literal; the opening quote has already been
    /// consumed. The token keeps whatever was scanned even when malformed.
    fn consume_string(&mut self, delimiter: u8) {
        loop {
            self.cursor.skip_to_string_delim(delimiter);
            match self.cursor.current() {
                0 => {
                    self.add_error("Unexpected end of string.");
                    return;
                }
                b'\n' => {
                    if !self.allow_multiline_strings {
                        self.add_error("String literals cannot cross line boundaries.");
                        return;
                    }
                    self.cursor.advance();
                }
                b'\\' => {
                    // An escape sequence.
                    self.cursor.advance();
                    if self.try_consume_one(classify::is_escape_char) {
                        // Valid escape sequence.
                    } else if self.try_consume_one(classify::is_octal_digit) {
                        // Possibly followed by two more octal digits, but
                        // those are picked up by the main loop anyway.
                    } else if self.try_consume(b'x') {
                        if !self.try_consume_one(classify::is_hex_digit) {
                            self.add_error("Expected hex digits for escape sequence.");
                        }
                        // Possibly followed by another hex digit; ignored here.
                    } else if self.try_consume(b'u') {
                        if !self.try_consume_one(classify::is_hex_digit)
                            || !self.try_consume_one(classify::is_hex_digit)
                            || !self.try_consume_one(classify::is_hex_digit)
                            || !self.try_consume_one(classify::is_hex_digit)
                        {
                            self.add_error("Expected four hex digits for \\u escape sequence.");
                        }
                    } else if self.try_consume(b'U') {
                        // Eight hex digits, but only the range up to
                        // U+10FFFF is allowed.
                        if !self.try_consume(b'0')
                            || !self.try_consume(b'0')
                            || !(self.try_consume(b'0') || self.try_consume(b'1'))
                            || !self.try_consume_one(classify::is_hex_digit)
                            || !self.try_consume_one(classify::is_hex_digit)
                            || !self.try_consume_one(classify::is_hex_digit)
                            || !self.try_consume_one(classify::is_hex_digit)
                            || !self.try_consume_one(classify::is_hex_digit)
                        {
                            self.add_error(
                                "Expected eight hex digits up to 10ffff for \\U escape sequence",
                            );
                        }
                    } else {
                        self.add_error("Invalid escape sequence in string literal.");
                    }
                }
                b if b == delimiter => {
                    self.cursor.advance();
                    return;
                }
                _ => unreachable!("skip_to_string_delim stopped on an unexpected byte"),
            }
        }
    }
}

impl<'a, I: ZeroCopyInput<'a>> Drop for Tokenizer<'a, I> {
    fn drop(&mut self) {
        self.cursor.return_unread();
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests {
    use super::*;
    use crate::input::SliceInput;
    use crate::report::ErrorLog;
    use pretty_assertions::assert_eq;

    #[derive(Clone, Copy, Default)]
    struct Opts {
        style: Option<CommentStyle>,
        allow_f: bool,
        no_space_needed: bool,
        multiline: bool,
        whitespace: bool,
        newlines: bool,
    }

    /// Tokenize `source`, delivered in buffers of `block_size` bytes
    /// (0 = all at once), returning every emitted token and the error log.
    fn scan_opts(source: &[u8], block_size: usize, opts: Opts) -> (Vec<Token>, ErrorLog) {
        let mut log = ErrorLog::new();
        let mut tokens = Vec::new();
        {
            let mut tokenizer =
                Tokenizer::new(SliceInput::with_block_size(source, block_size), &mut log);
            if let Some(style) = opts.style {
                tokenizer.set_comment_style(style);
            }
            if opts.allow_f {
                tokenizer.set_allow_f_after_float(true);
            }
            if opts.no_space_needed {
                tokenizer.set_require_space_after_number(false);
            }
            if opts.multiline {
                tokenizer.set_allow_multiline_strings(true);
            }
            if opts.whitespace {
                tokenizer.set_report_whitespace(true);
            }
            if opts.newlines {
                tokenizer.set_report_newlines(true);
            }
            while tokenizer.next() {
                tokens.push(tokenizer.current().clone());
            }
            assert_eq!(tokenizer.current().kind, TokenKind::End);
        }
        (tokens, log)
    }

    fn scan(source: &[u8]) -> (Vec<Token>, ErrorLog) {
        scan_opts(source, 0, Opts::default())
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn texts(tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .map(|t| String::from_utf8_lossy(&t.text).into_owned())
            .collect()
    }

    fn messages(log: &ErrorLog) -> Vec<String> {
        log.errors.iter().map(|e| e.message.clone()).collect()
    }

    use TokenKind::{Float, Identifier, Integer, Newline, String as Str, Symbol, Whitespace};

    // === Basic tokens ===

    #[test]
    fn identifiers() {
        let (tokens, log) = scan(b"foo fooBar foo_bar _foo foo123 _");
        assert_eq!(kinds(&tokens), vec![Identifier; 6]);
        assert_eq!(
            texts(&tokens),
            vec!["foo", "fooBar", "foo_bar", "_foo", "foo123", "_"]
        );
        assert!(log.is_clean());
    }

    #[test]
    fn integers() {
        let (tokens, log) = scan(b"42 0 0755 0x2A 0XFF 123456789");
        assert_eq!(kinds(&tokens), vec![Integer; 6]);
        assert_eq!(
            texts(&tokens),
            vec!["42", "0", "0755", "0x2A", "0XFF", "123456789"]
        );
        assert!(log.is_clean());
    }

    #[test]
    fn floats() {
        let (tokens, log) = scan(b"1.0 .5 1. 3.14e-2 1e5 1E+3 0.5 2e2");
        assert_eq!(kinds(&tokens), vec![Float; 8]);
        assert_eq!(
            texts(&tokens),
            vec!["1.0", ".5", "1.", "3.14e-2", "1e5", "1E+3", "0.5", "2e2"]
        );
        assert!(log.is_clean());
    }

    #[test]
    fn strings_with_both_quote_styles() {
        let (tokens, log) = scan(br#""hello" 'world' "mixed'quote" "" "a\"b""#);
        assert_eq!(kinds(&tokens), vec![Str; 5]);
        assert_eq!(
            texts(&tokens),
            vec![
                r#""hello""#,
                "'world'",
                r#""mixed'quote""#,
                r#""""#,
                r#""a\"b""#
            ]
        );
        assert!(log.is_clean());
    }

    #[test]
    fn symbols_are_one_byte_each() {
        let (tokens, log) = scan(b"!+$%");
        assert_eq!(kinds(&tokens), vec![Symbol; 4]);
        assert_eq!(texts(&tokens), vec!["!", "+", "$", "%"]);
        assert!(log.is_clean());
    }

    #[test]
    fn lone_dot_is_a_symbol() {
        let (tokens, log) = scan(b". .x");
        assert_eq!(kinds(&tokens), vec![Symbol, Symbol, Identifier]);
        assert_eq!(texts(&tokens), vec![".", ".", "x"]);
        assert!(log.is_clean());
    }

    // === End-to-end scenarios ===

    #[test]
    fn mixed_literal_stream() {
        for block_size in [0, 1, 2, 3] {
            let (tokens, log) = scan_opts(
                br#"foo_1 42 0x2A 0755 3.14e-2 "he\tllo""#,
                block_size,
                Opts::default(),
            );
            assert_eq!(
                kinds(&tokens),
                vec![Identifier, Integer, Integer, Integer, Float, Str],
                "block size {block_size}"
            );
            assert_eq!(
                texts(&tokens),
                vec!["foo_1", "42", "0x2A", "0755", "3.14e-2", r#""he\tllo""#]
            );
            assert!(log.is_clean());
        }
    }

    #[test]
    fn hex_prefix_without_digits() {
        let (tokens, log) = scan(b"0x");
        assert_eq!(kinds(&tokens), vec![Integer]);
        assert_eq!(texts(&tokens), vec!["0x"]);
        assert_eq!(messages(&log), vec!["\"0x\" must be followed by hex digits."]);
        assert_eq!((log.errors[0].line, log.errors[0].column), (0, 2));
    }

    #[test]
    fn unterminated_string() {
        let (tokens, log) = scan(b"\"unterminated");
        assert_eq!(kinds(&tokens), vec![Str]);
        assert_eq!(texts(&tokens), vec!["\"unterminated"]);
        assert_eq!(messages(&log), vec!["Unexpected end of string."]);
    }

    #[test]
    fn block_comment_is_skipped() {
        let (tokens, log) = scan(b"/* a\n * b\n */x");
        assert_eq!(kinds(&tokens), vec![Identifier]);
        assert_eq!(texts(&tokens), vec!["x"]);
        let x = &tokens[0];
        assert_eq!((x.line, x.column, x.end_column), (2, 3, 4));
        assert!(log.is_clean());
    }

    #[test]
    fn leading_zero_with_decimal_digits() {
        let (tokens, log) = scan(b"099");
        assert_eq!(kinds(&tokens), vec![Integer]);
        assert_eq!(texts(&tokens), vec!["099"]);
        assert_eq!(
            messages(&log),
            vec!["Numbers starting with leading zero must be in octal."]
        );
    }

    #[test]
    fn f_suffix_requires_opt_in() {
        let (tokens, log) = scan(b"1.0f");
        assert_eq!(kinds(&tokens), vec![Float, Identifier]);
        assert_eq!(texts(&tokens), vec!["1.0", "f"]);
        assert_eq!(messages(&log), vec!["Need space between number and identifier."]);

        let opts = Opts {
            allow_f: true,
            ..Opts::default()
        };
        let (tokens, log) = scan_opts(b"1.0f", 0, opts);
        assert_eq!(kinds(&tokens), vec![Float]);
        assert_eq!(texts(&tokens), vec!["1.0f"]);
        assert!(log.is_clean());
    }

    #[test]
    fn f_suffix_forces_integer_to_float() {
        let opts = Opts {
            allow_f: true,
            ..Opts::default()
        };
        let (tokens, log) = scan_opts(b"1f 2.5F", 0, opts);
        assert_eq!(kinds(&tokens), vec![Float, Float]);
        assert_eq!(texts(&tokens), vec!["1f", "2.5F"]);
        assert!(log.is_clean());
    }

    // === Numeric edge cases ===

    #[test]
    fn missing_exponent_digits() {
        let (tokens, log) = scan(b"1e");
        assert_eq!(kinds(&tokens), vec![Float]);
        assert_eq!(texts(&tokens), vec!["1e"]);
        assert_eq!(messages(&log), vec!["\"e\" must be followed by exponent."]);

        let (tokens, log) = scan(b"1e-");
        assert_eq!(texts(&tokens), vec!["1e-"]);
        assert_eq!(messages(&log), vec!["\"e\" must be followed by exponent."]);
    }

    #[test]
    fn second_decimal_point() {
        let (tokens, log) = scan(b"1.2.3");
        assert_eq!(kinds(&tokens), vec![Float, Float]);
        assert_eq!(texts(&tokens), vec!["1.2", ".3"]);
        assert_eq!(
            messages(&log),
            vec!["Already saw decimal point or exponent; can't have another one."]
        );
    }

    #[test]
    fn dot_after_hex_integer() {
        let (tokens, log) = scan(b"0x1.5");
        assert_eq!(kinds(&tokens), vec![Integer, Float]);
        assert_eq!(texts(&tokens), vec!["0x1", ".5"]);
        assert_eq!(messages(&log), vec!["Hex and octal numbers must be integers."]);
    }

    #[test]
    fn letter_after_number() {
        let (tokens, log) = scan(b"12a");
        assert_eq!(kinds(&tokens), vec![Integer, Identifier]);
        assert_eq!(texts(&tokens), vec!["12", "a"]);
        assert_eq!(messages(&log), vec!["Need space between number and identifier."]);

        let opts = Opts {
            no_space_needed: true,
            ..Opts::default()
        };
        let (tokens, log) = scan_opts(b"12a", 0, opts);
        assert_eq!(kinds(&tokens), vec![Integer, Identifier]);
        assert!(log.is_clean());
    }

    #[test]
    fn identifier_abutting_decimal_point() {
        let (tokens, log) = scan(b"blah.123");
        assert_eq!(kinds(&tokens), vec![Identifier, Float]);
        assert_eq!(texts(&tokens), vec!["blah", ".123"]);
        assert_eq!(
            messages(&log),
            vec!["Need space between identifier and decimal point."]
        );
        // Reported at the column of the '.'.
        assert_eq!((log.errors[0].line, log.errors[0].column), (0, 4));

        // With a space in between there is no complaint.
        let (_, log) = scan(b"blah .123");
        assert!(log.is_clean());
    }

    // === Strings ===

    #[test]
    fn string_escapes_scan_clean() {
        let (tokens, log) = scan(br#""\a\b\f\n\r\t\v\\\?\'\" \0 \01 \012 \x1 \x20 \uABCD \U0010ffff""#);
        assert_eq!(kinds(&tokens), vec![Str]);
        assert!(log.is_clean());
    }

    #[test]
    fn string_newline_is_an_error_by_default() {
        let (tokens, log) = scan(b"\"line\nrest\"");
        assert_eq!(kinds(&tokens)[0], Str);
        assert_eq!(texts(&tokens)[0], "\"line");
        assert_eq!(
            messages(&log),
            vec![
                "String literals cannot cross line boundaries.",
                "Unexpected end of string.",
            ]
        );
    }

    #[test]
    fn multiline_strings_when_allowed() {
        let opts = Opts {
            multiline: true,
            ..Opts::default()
        };
        let (tokens, log) = scan_opts(b"\"line\nrest\"", 0, opts);
        assert_eq!(kinds(&tokens), vec![Str]);
        assert_eq!(texts(&tokens), vec!["\"line\nrest\""]);
        assert!(log.is_clean());
    }

    #[test]
    fn invalid_escape_sequences() {
        let (_, log) = scan(br#""\q""#);
        assert_eq!(messages(&log), vec!["Invalid escape sequence in string literal."]);

        let (_, log) = scan(br#""\x""#);
        assert_eq!(messages(&log), vec!["Expected hex digits for escape sequence."]);

        let (_, log) = scan(br#""\u12""#);
        assert_eq!(
            messages(&log),
            vec!["Expected four hex digits for \\u escape sequence."]
        );

        let (_, log) = scan(br#""\U12345678""#);
        assert_eq!(
            messages(&log),
            vec!["Expected eight hex digits up to 10ffff for \\U escape sequence"]
        );

        let (_, log) = scan(br#""\U0010ffff" "\U00200000""#);
        assert_eq!(
            messages(&log),
            vec!["Expected eight hex digits up to 10ffff for \\U escape sequence"]
        );
    }

    #[test]
    fn octal_escape_digits_absorbed_by_main_loop() {
        let (tokens, log) = scan(br#""\1234""#);
        // \123 is the escape; the trailing 4 is a plain byte.
        assert_eq!(kinds(&tokens), vec![Str]);
        assert!(log.is_clean());
    }

    // === Comments ===

    #[test]
    fn line_comments_are_skipped() {
        let (tokens, log) = scan(b"foo // comment\nbar");
        assert_eq!(kinds(&tokens), vec![Identifier, Identifier]);
        assert_eq!(texts(&tokens), vec!["foo", "bar"]);
        assert_eq!(tokens[1].line, 1);
        assert!(log.is_clean());
    }

    #[test]
    fn block_comments_between_tokens() {
        let (tokens, log) = scan(b"a /* one */ /* two */ b");
        assert_eq!(texts(&tokens), vec!["a", "b"]);
        assert!(log.is_clean());

        let (tokens, log) = scan(b"a/**/b");
        assert_eq!(texts(&tokens), vec!["a", "b"]);
        assert!(log.is_clean());
    }

    #[test]
    fn slash_alone_is_a_symbol() {
        let (tokens, log) = scan(b"a / b");
        assert_eq!(kinds(&tokens), vec![Identifier, Symbol, Identifier]);
        assert_eq!(texts(&tokens), vec!["a", "/", "b"]);
        let slash = &tokens[1];
        assert_eq!((slash.line, slash.column, slash.end_column), (0, 2, 3));
        assert!(log.is_clean());

        let (tokens, _) = scan(b"/");
        assert_eq!(kinds(&tokens), vec![Symbol]);
        assert_eq!(texts(&tokens), vec!["/"]);
    }

    #[test]
    fn sh_style_comments() {
        let opts = Opts {
            style: Some(CommentStyle::Sh),
            ..Opts::default()
        };
        let (tokens, log) = scan_opts(b"foo # comment\nbar", 0, opts);
        assert_eq!(texts(&tokens), vec!["foo", "bar"]);
        assert!(log.is_clean());

        // In sh style a slash is an ordinary symbol, even doubled.
        let (tokens, log) = scan_opts(b"// x", 0, opts);
        assert_eq!(kinds(&tokens), vec![Symbol, Symbol, Identifier]);
        assert!(log.is_clean());
    }

    #[test]
    fn hash_is_a_symbol_in_cpp_style() {
        let (tokens, log) = scan(b"# x");
        assert_eq!(kinds(&tokens), vec![Symbol, Identifier]);
        assert!(log.is_clean());
    }

    #[test]
    fn nested_block_comment_reports_error() {
        let (tokens, log) = scan(b"/* outer /* inner */ x");
        assert_eq!(texts(&tokens), vec!["x"]);
        assert_eq!(
            messages(&log),
            vec!["\"/*\" inside block comment.  Block comments cannot be nested."]
        );
    }

    #[test]
    fn unterminated_block_comment() {
        let (tokens, log) = scan(b"foo /* never closed");
        assert_eq!(texts(&tokens), vec!["foo"]);
        assert_eq!(
            messages(&log),
            vec!["End-of-file inside block comment.", "  Comment started here."]
        );
        // The companion report points at the opening "/*".
        assert_eq!((log.errors[1].line, log.errors[1].column), (0, 4));
    }

    #[test]
    fn line_comment_content_capture() {
        let mut log = ErrorLog::new();
        let mut tokenizer = Tokenizer::new(SliceInput::new(b"// hello\nx"), &mut log);
        assert!(matches!(
            tokenizer.try_consume_comment_start(),
            CommentStatus::LineComment
        ));
        let mut content = Vec::new();
        tokenizer.consume_line_comment(Some(&mut content));
        assert_eq!(content, b" hello\n");
        assert!(tokenizer.next());
        assert_eq!(tokenizer.current().text, b"x");
    }

    #[test]
    fn block_comment_content_strips_continuation_markers() {
        for block_size in [0, 1, 2] {
            let mut log = ErrorLog::new();
            let mut tokenizer = Tokenizer::new(
                SliceInput::with_block_size(b"/* a\n * b\n */x", block_size),
                &mut log,
            );
            assert!(matches!(
                tokenizer.try_consume_comment_start(),
                CommentStatus::BlockComment
            ));
            let mut content = Vec::new();
            tokenizer.consume_block_comment(Some(&mut content));
            assert_eq!(content, b" a\n b\n", "block size {block_size}");
            assert!(tokenizer.next());
            assert_eq!(tokenizer.current().text, b"x");
        }
    }

    // === Control characters & non-ASCII ===

    #[test]
    fn control_characters_report_once_per_run() {
        let (tokens, log) = scan(b"\x01\x02\x03x");
        assert_eq!(kinds(&tokens), vec![Identifier]);
        assert_eq!(texts(&tokens), vec!["x"]);
        assert_eq!(
            messages(&log),
            vec!["Invalid control characters encountered in text."]
        );
        assert_eq!((log.errors[0].line, log.errors[0].column), (0, 0));
    }

    #[test]
    fn interior_null_is_drained_with_the_run() {
        let (tokens, log) = scan(b"a\0\x01b");
        assert_eq!(texts(&tokens), vec!["a", "b"]);
        assert_eq!(
            messages(&log),
            vec!["Invalid control characters encountered in text."]
        );
    }

    #[test]
    fn non_ascii_bytes_become_symbols_with_a_report() {
        let (tokens, log) = scan(b"\xC3\xA9");
        assert_eq!(kinds(&tokens), vec![Symbol, Symbol]);
        assert_eq!(tokens[0].text, vec![0xC3]);
        assert_eq!(tokens[1].text, vec![0xA9]);
        assert_eq!(
            messages(&log),
            vec![
                "Interpreting non ascii codepoint 195.",
                "Interpreting non ascii codepoint 169.",
            ]
        );
    }

    // === Whitespace reporting ===

    #[test]
    fn whitespace_is_silent_by_default() {
        let (tokens, log) = scan(b"a \t b\n c");
        assert_eq!(kinds(&tokens), vec![Identifier; 3]);
        assert!(log.is_clean());
    }

    #[test]
    fn report_whitespace_emits_runs_including_newlines() {
        let opts = Opts {
            whitespace: true,
            ..Opts::default()
        };
        let (tokens, log) = scan_opts(b"a b\nc", 0, opts);
        assert_eq!(
            kinds(&tokens),
            vec![Identifier, Whitespace, Identifier, Whitespace, Identifier]
        );
        assert_eq!(texts(&tokens), vec!["a", " ", "b", "\n", "c"]);
        assert!(log.is_clean());
    }

    #[test]
    fn report_newlines_splits_whitespace_and_newline_tokens() {
        let opts = Opts {
            newlines: true,
            ..Opts::default()
        };
        let (tokens, log) = scan_opts(b"a \n b", 0, opts);
        assert_eq!(
            kinds(&tokens),
            vec![Identifier, Whitespace, Newline, Whitespace, Identifier]
        );
        assert_eq!(texts(&tokens), vec!["a", " ", "\n", " ", "b"]);
        assert!(log.is_clean());
    }

    #[test]
    fn whitespace_inside_comments_is_never_reported() {
        let opts = Opts {
            newlines: true,
            ..Opts::default()
        };
        let (tokens, _) = scan_opts(b"a/* x\ny */b", 0, opts);
        assert_eq!(kinds(&tokens), vec![Identifier, Identifier]);
    }

    #[test]
    fn report_flag_coupling() {
        let mut log = ErrorLog::new();
        let mut tokenizer = Tokenizer::new(SliceInput::new(b""), &mut log);

        tokenizer.set_report_newlines(true);
        assert!(tokenizer.report_whitespace());
        assert!(tokenizer.report_newlines());

        tokenizer.set_report_whitespace(false);
        assert!(!tokenizer.report_whitespace());
        assert!(!tokenizer.report_newlines());
    }

    // === Positions ===

    #[test]
    fn columns_expand_tabs() {
        let (tokens, _) = scan(b"\tfoo");
        let foo = &tokens[0];
        assert_eq!((foo.line, foo.column, foo.end_column), (0, 8, 11));

        let (tokens, _) = scan(b"ab\tcd");
        let cd = &tokens[1];
        assert_eq!((cd.column, cd.end_column), (8, 10));
    }

    #[test]
    fn token_positions_across_lines() {
        let (tokens, _) = scan(b"foo\n  bar");
        assert_eq!((tokens[0].line, tokens[0].column), (0, 0));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 2));
    }

    #[test]
    fn end_token_carries_the_final_position() {
        let mut log = ErrorLog::new();
        let mut tokenizer = Tokenizer::new(SliceInput::new(b"ab\n"), &mut log);
        while tokenizer.next() {}
        let end = tokenizer.current();
        assert_eq!(end.kind, TokenKind::End);
        assert!(end.text.is_empty());
        assert_eq!((end.line, end.column, end.end_column), (1, 0, 0));
    }

    #[test]
    fn positions_are_monotonic() {
        let opts = Opts {
            newlines: true,
            ..Opts::default()
        };
        let (tokens, _) = scan_opts(b"foo 42\n\t'str' 1.5 /* c */ sym!\n.5", 0, opts);
        let mut last = (0u32, 0u32);
        for token in &tokens {
            assert!(
                (token.line, token.column) >= last,
                "token {token:?} starts before {last:?}"
            );
            last = (token.line, token.end_column);
        }
    }

    // === Previous token ===

    #[test]
    fn previous_tracks_last_emission() {
        let mut log = ErrorLog::new();
        let mut tokenizer = Tokenizer::new(SliceInput::new(b"foo 42"), &mut log);
        assert_eq!(tokenizer.previous().kind, TokenKind::Start);
        assert_eq!(tokenizer.current().kind, TokenKind::Start);

        assert!(tokenizer.next());
        assert_eq!(tokenizer.previous().kind, TokenKind::Start);
        assert_eq!(tokenizer.current().text, b"foo");

        assert!(tokenizer.next());
        assert_eq!(tokenizer.previous().text, b"foo");
        assert_eq!(tokenizer.current().text, b"42");

        assert!(!tokenizer.next());
        assert_eq!(tokenizer.previous().text, b"42");
        assert_eq!(tokenizer.current().kind, TokenKind::End);
    }

    // === Text fidelity ===

    #[test]
    fn concatenated_texts_reproduce_the_input() {
        let sources: [&[u8]; 4] = [
            b"foo 42 0x2A\n\t.5 'str' sym!",
            b"  leading and trailing  ",
            b"a\n\n\nb",
            b"\"quoted \\n text\" 1.5e-3",
        ];
        for source in sources {
            for block_size in [0, 1, 3] {
                let opts = Opts {
                    newlines: true,
                    ..Opts::default()
                };
                let (tokens, _) = scan_opts(source, block_size, opts);
                let joined: Vec<u8> = tokens.iter().flat_map(|t| t.text.clone()).collect();
                assert_eq!(joined, source, "block size {block_size}");
            }
        }
    }

    // === Construction & teardown ===

    #[test]
    fn initial_buffer_is_read_before_the_stream() {
        let mut log = ErrorLog::new();
        let mut input = SliceInput::new(b"o bar");
        let mut tokenizer = Tokenizer::with_initial_buffer(b"fo", &mut input, &mut log);
        assert!(tokenizer.next());
        assert_eq!(tokenizer.current().text, b"foo");
        assert!(tokenizer.next());
        assert_eq!(tokenizer.current().text, b"bar");
        assert!(!tokenizer.next());
    }

    #[test]
    fn drop_returns_unread_bytes_to_the_stream() {
        let mut log = ErrorLog::new();
        let mut input = SliceInput::new(b"foo bar");
        {
            let mut tokenizer = Tokenizer::new(&mut input, &mut log);
            assert!(tokenizer.next());
            assert_eq!(tokenizer.current().text, b"foo");
        }
        // "foo" was consumed; everything from the space on went back.
        assert_eq!(input.position(), 3);
        assert_eq!(input.bytes_backed_up(), 4);
    }

    #[test]
    fn next_after_end_keeps_returning_end() {
        let mut log = ErrorLog::new();
        let mut tokenizer = Tokenizer::new(SliceInput::new(b"x"), &mut log);
        assert!(tokenizer.next());
        assert!(!tokenizer.next());
        assert!(!tokenizer.next());
        assert_eq!(tokenizer.current().kind, TokenKind::End);
    }

    // === Property tests ===

    #[allow(
        clippy::disallowed_types,
        reason = "proptest macros internally use Arc"
    )]
    mod proptest_driver {
        use super::*;
        use proptest::prelude::*;

        /// Printable-ish source material; excludes comment starters so the
        /// fidelity property can treat every byte as token text.
        fn source_strategy() -> impl Strategy<Value = Vec<u8>> {
            proptest::collection::vec(
                prop_oneof![
                    Just(b'a'),
                    Just(b'Z'),
                    Just(b'_'),
                    Just(b'0'),
                    Just(b'7'),
                    Just(b'9'),
                    Just(b'.'),
                    Just(b'+'),
                    Just(b'!'),
                    Just(b' '),
                    Just(b'\t'),
                    Just(b'\n'),
                ],
                0..64,
            )
        }

        proptest! {
            #[test]
            fn positions_never_go_backwards(source in source_strategy()) {
                let opts = Opts { newlines: true, ..Opts::default() };
                let (tokens, _) = scan_opts(&source, 0, opts);
                let mut last = (0u32, 0u32);
                for token in &tokens {
                    prop_assert!((token.line, token.column) >= last);
                    last = (token.line, token.end_column);
                }
            }

            #[test]
            fn token_texts_partition_the_input(source in source_strategy()) {
                let opts = Opts { newlines: true, ..Opts::default() };
                let (tokens, _) = scan_opts(&source, 2, opts);
                let joined: Vec<u8> = tokens.iter().flat_map(|t| t.text.clone()).collect();
                prop_assert_eq!(joined, source);
            }
        }
    }
}
