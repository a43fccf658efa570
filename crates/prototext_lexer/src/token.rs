//! Token kind and token record produced by the tokenizer.

/// Kind of a token produced by [`Tokenizer::next`](crate::Tokenizer::next).
///
/// `#[repr(u8)]` keeps the tag a single byte for compact storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    /// `next()` has not yet been called.
    Start = 0,
    /// End of input reached; `text` is empty.
    End = 1,
    /// A sequence of letters, digits, and underscores, not starting with a
    /// digit. It is an error for a number to be followed by an identifier
    /// with no space in between.
    Identifier = 2,
    /// A sequence of digits representing an integer. A `0x` prefix means
    /// hex and a leading zero means octal, like C numeric literals. A
    /// leading minus sign is never part of the token; interpreting unary
    /// minus is the parser's job.
    Integer = 3,
    /// A floating point literal, with a fractional part and/or an
    /// exponent. Always decimal, never negative.
    Float = 4,
    /// A quoted sequence of escaped characters. Single or double quotes
    /// both work but must match, and the literal cannot cross a line break
    /// unless multiline strings are enabled.
    String = 5,
    /// Any other printable character, like `!` or `+`. Symbols are always
    /// one byte wide, so `!+$%` is four tokens.
    Symbol = 6,
    /// A run of whitespace. Only produced when whitespace reporting is on,
    /// and never for whitespace inside comments or strings.
    Whitespace = 7,
    /// A newline. Only produced when both whitespace and newline reporting
    /// are on.
    Newline = 8,
}

/// A single token: kind, verbatim text, and source position.
///
/// `text` holds the exact bytes consumed — string literals keep their
/// quotes and escapes, and symbol tokens may carry a non-ASCII byte as-is.
/// Positions are zero-based; `column` and `end_column` are display columns
/// with tabs expanded to 8-column stops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact bytes consumed, verbatim.
    pub text: Vec<u8>,
    /// Zero-based line of the first byte.
    pub line: u32,
    /// Zero-based display column of the first byte.
    pub column: u32,
    /// Zero-based display column just past the last byte.
    pub end_column: u32,
}

impl Default for Token {
    /// The pre-first-call sentinel: [`TokenKind::Start`] with empty text at
    /// the origin.
    fn default() -> Self {
        Self {
            kind: TokenKind::Start,
            text: Vec::new(),
            line: 0,
            column: 0,
            end_column: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_token_is_the_start_sentinel() {
        let token = Token::default();
        assert_eq!(token.kind, TokenKind::Start);
        assert!(token.text.is_empty());
        assert_eq!((token.line, token.column, token.end_column), (0, 0, 0));
    }
}
