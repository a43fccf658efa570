//! Streaming tokenizer for protobuf-style text syntax.
//!
//! This crate is a standalone lexical layer: it converts a byte stream into
//! a forward sequence of tokens (identifiers, integers, floats, quoted
//! strings, one-byte symbols, and optionally whitespace/newlines), each
//! carrying its verbatim text and zero-based source position with
//! tab-expanded display columns. Grammar-level parsing is the caller's job:
//! the parser composes tokens into higher-level constructs.
//!
//! # Architecture
//!
//! - [`ZeroCopyInput`] supplies input one borrowed buffer at a time; large
//!   inputs never materialize in full. [`SliceInput`] is the in-memory
//!   implementation.
//! - [`Tokenizer::next`] produces tokens in source order. Malformed input
//!   never halts scanning: every problem goes to the [`ErrorCollector`]
//!   with its position, and the offending token is still emitted with
//!   whatever text was scanned.
//! - The `parse_*` decoders interpret the text of already-emitted tokens:
//!   base-aware overflow-checked integers, suffix-tolerant floats, and
//!   escape interpretation with UTF-16 surrogate-pair assembly.
//!
//! # Usage
//!
//! ```
//! use prototext_lexer::{parse_integer, ErrorLog, SliceInput, TokenKind, Tokenizer};
//!
//! let mut log = ErrorLog::new();
//! let mut tokenizer = Tokenizer::new(SliceInput::new(b"value: 0x2A"), &mut log);
//!
//! assert!(tokenizer.next());
//! assert_eq!(tokenizer.current().kind, TokenKind::Identifier);
//! assert_eq!(tokenizer.current().text, b"value");
//!
//! assert!(tokenizer.next());
//! assert_eq!(tokenizer.current().kind, TokenKind::Symbol);
//!
//! assert!(tokenizer.next());
//! assert_eq!(tokenizer.current().kind, TokenKind::Integer);
//! assert_eq!(parse_integer(&tokenizer.current().text, u64::MAX), Some(42));
//! ```

mod classify;
mod cursor;
mod decode;
mod input;
mod report;
mod token;
mod tokenizer;

pub use decode::{is_identifier, parse_float, parse_integer, parse_string, parse_string_append};
pub use input::{SliceInput, ZeroCopyInput};
pub use report::{ErrorCollector, ErrorLog, Report};
pub use token::{Token, TokenKind};
pub use tokenizer::{CommentStyle, Tokenizer};
