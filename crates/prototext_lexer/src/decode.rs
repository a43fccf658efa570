//! Post-tokenization decoders.
//!
//! These functions interpret the verbatim text of tokens the tokenizer has
//! already produced. They assume well-formed token text by construction:
//! the tokenizer reported any lexical problems while scanning, so text that
//! could never have been emitted is a programming error here, not a runtime
//! condition (debug assertion in debug builds, best-effort result in
//! release).

use crate::classify;

/// Smallest UTF-16 head (high) surrogate.
const MIN_HEAD_SURROGATE: u32 = 0xD800;
/// One past the largest UTF-16 head surrogate / smallest trail surrogate.
const MIN_TRAIL_SURROGATE: u32 = 0xDC00;
/// One past the largest UTF-16 trail surrogate.
const MAX_TRAIL_SURROGATE: u32 = 0xE000;

/// Decode an [`Integer`](crate::TokenKind::Integer) token.
///
/// The base comes from the prefix: `0x`/`0X` means hex, a leading zero
/// means octal, anything else decimal. Returns `None` when the value
/// overflows `u64`, exceeds `max_value`, or contains a digit invalid for
/// its base (e.g. `099`, which the tokenizer emits with an error but still
/// tags as an integer). A minus sign is never accepted; the token grammar
/// does not produce one.
pub fn parse_integer(text: &[u8], max_value: u64) -> Option<u64> {
    let (base, digits) = match text {
        [b'0', b'x' | b'X', rest @ ..] => (16u64, rest),
        [b'0', ..] => (8u64, text),
        _ => (10u64, text),
    };

    let mut result: u64 = 0;
    for &byte in digits {
        let digit = u64::from(classify::digit_value(byte));
        if digit >= base {
            return None;
        }
        result = result.checked_mul(base)?.checked_add(digit)?;
    }
    if result > max_value {
        return None;
    }
    Some(result)
}

/// Decode a [`Float`](crate::TokenKind::Float) token.
///
/// The tokenizer can emit text like `1e` (with an error already reported)
/// or `1.0f` (when the `f` suffix is allowed), so a dangling exponent and a
/// trailing `f`/`F` are tolerated. For any other malformed input the result
/// is unspecified (0.0 in release builds, assertion in debug builds).
pub fn parse_float(text: &[u8]) -> f64 {
    match try_parse_float(text) {
        Some(value) => value,
        None => {
            debug_assert!(
                false,
                "parse_float called on text the tokenizer could not have produced: {:?}",
                String::from_utf8_lossy(text)
            );
            0.0
        }
    }
}

fn try_parse_float(text: &[u8]) -> Option<f64> {
    if text.first() == Some(&b'-') {
        return None;
    }
    let text = std::str::from_utf8(text).ok()?;

    // An 'f' suffix is ignored for value purposes.
    let text = text.strip_suffix(['f', 'F']).unwrap_or(text);
    if let Ok(value) = text.parse::<f64>() {
        return Some(value);
    }

    // "1e" is not a valid float, but the tokenizer reports the error and
    // still emits it as a token. Accept it here anyway.
    let trimmed = text.strip_suffix(['+', '-']).unwrap_or(text);
    let trimmed = trimmed.strip_suffix(['e', 'E'])?;
    trimmed.parse().ok()
}

/// Decode a [`String`](crate::TokenKind::String) token, replacing the
/// contents of `output`.
pub fn parse_string(text: &[u8], output: &mut Vec<u8>) {
    output.clear();
    parse_string_append(text, output);
}

/// Decode a [`String`](crate::TokenKind::String) token, appending to
/// `output`.
///
/// `text` includes the surrounding quote bytes. The opening quote is
/// skipped; the final byte is treated as the closing quote only when it
/// matches `text[0]` (for tokenizer-produced strings the quotes always
/// match, so this only matters for adversarial input). Escape sequences
/// are interpreted; any invalid ones were already reported during
/// tokenization, so this stays tolerant and produces best-effort bytes.
#[allow(
    clippy::cast_possible_truncation,
    reason = "escape codes are reduced mod 256 before the byte cast"
)]
pub fn parse_string_append(text: &[u8], output: &mut Vec<u8>) {
    let Some((&quote, bytes)) = text.split_first() else {
        debug_assert!(false, "parse_string_append called on empty text");
        return;
    };
    output.reserve(text.len());

    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        if byte == b'\\' && i + 1 < bytes.len() {
            i += 1;
            let escaped = bytes[i];
            if classify::is_octal_digit(escaped) {
                // An octal escape: one, two, or three digits.
                let mut code = u32::from(classify::digit_value(escaped));
                for _ in 0..2 {
                    match bytes.get(i + 1) {
                        Some(&digit) if classify::is_octal_digit(digit) => {
                            i += 1;
                            code = code * 8 + u32::from(classify::digit_value(digit));
                        }
                        _ => break,
                    }
                }
                output.push((code % 256) as u8);
            } else if escaped == b'x' {
                // A hex escape: zero, one, or two digits. (The zero case
                // was reported as an error during tokenization.)
                let mut code = 0u32;
                for _ in 0..2 {
                    match bytes.get(i + 1) {
                        Some(&digit) if classify::is_hex_digit(digit) => {
                            i += 1;
                            code = code * 16 + u32::from(classify::digit_value(digit));
                        }
                        _ => break,
                    }
                }
                output.push((code % 256) as u8);
            } else if escaped == b'u' || escaped == b'U' {
                match fetch_unicode_point(bytes, i) {
                    Some((code_point, end)) => {
                        append_utf8(code_point, output);
                        i = end - 1; // the loop's increment lands on `end`
                    }
                    // Failure: just dump what we saw, don't try to parse it.
                    None => output.push(escaped),
                }
            } else {
                output.push(translate_escape(escaped));
            }
        } else if byte == quote && i + 1 == bytes.len() {
            // The closing quote matching the opening one.
        } else {
            output.push(byte);
        }
        i += 1;
    }
}

/// True iff `text` would be emitted as a single
/// [`Identifier`](crate::TokenKind::Identifier) token: non-empty, starting
/// with a letter or underscore, continuing with letters, digits, or
/// underscores.
pub fn is_identifier(text: &[u8]) -> bool {
    let Some((&first, rest)) = text.split_first() else {
        return false;
    };
    classify::is_letter(first) && rest.iter().all(|&b| classify::is_alphanumeric(b))
}

/// Translate a simple escape character to the byte it stands for.
///
/// Escape sequences were validated during tokenization; anything
/// unrecognized here decodes to `?`.
fn translate_escape(byte: u8) -> u8 {
    match byte {
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0C,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0B,
        b'\\' => b'\\',
        b'?' => b'?',
        b'\'' => b'\'',
        b'"' => b'"',
        _ => b'?',
    }
}

/// Read exactly `count` hex digits starting at `start`.
fn read_hex_digits(bytes: &[u8], start: usize, count: usize) -> Option<u32> {
    let digits = bytes.get(start..start + count)?;
    let mut result = 0u32;
    for &byte in digits {
        if !classify::is_hex_digit(byte) {
            return None;
        }
        result = result * 16 + u32::from(classify::digit_value(byte));
    }
    Some(result)
}

/// Fetch the code point of a `\u`/`\U` escape whose `u`/`U` sits at
/// `start`, assembling UTF-16 surrogate pairs into a single supplementary
/// code point.
///
/// A head surrogate immediately followed by `\u` plus a valid trail
/// surrogate decodes as a pair; otherwise the head surrogate is kept as-is
/// (bogus, but so was the string, and the scanner already complained).
/// Trail surrogates may only use `\u`, not `\U`. Returns the code point and
/// the index just past the consumed escape, or `None` when the digits are
/// missing or malformed.
fn fetch_unicode_point(bytes: &[u8], start: usize) -> Option<(u32, usize)> {
    let count = if bytes[start] == b'u' { 4 } else { 8 };
    let mut code_point = read_hex_digits(bytes, start + 1, count)?;
    let mut end = start + 1 + count;

    if (MIN_HEAD_SURROGATE..MIN_TRAIL_SURROGATE).contains(&code_point)
        && bytes.get(end) == Some(&b'\\')
        && bytes.get(end + 1) == Some(&b'u')
    {
        if let Some(trail) = read_hex_digits(bytes, end + 2, 4) {
            if (MIN_TRAIL_SURROGATE..MAX_TRAIL_SURROGATE).contains(&trail) {
                code_point =
                    0x10000 + ((code_point - MIN_HEAD_SURROGATE) << 10) + (trail - MIN_TRAIL_SURROGATE);
                end += 6;
            }
        }
    }

    Some((code_point, end))
}

/// Append `code_point` to `output` as UTF-8.
///
/// Unpaired surrogates are emitted as their 3-byte encoding rather than
/// rejected. Code points past U+10FFFF cannot be encoded at all and fall
/// back to the literal `\U%08x` text.
#[allow(
    clippy::cast_possible_truncation,
    reason = "each shifted value is masked to fit in one byte"
)]
fn append_utf8(code_point: u32, output: &mut Vec<u8>) {
    match code_point {
        0..=0x7F => output.push(code_point as u8),
        0x80..=0x7FF => {
            output.push(0xC0 | (code_point >> 6) as u8);
            output.push(0x80 | (code_point & 0x3F) as u8);
        }
        0x800..=0xFFFF => {
            output.push(0xE0 | (code_point >> 12) as u8);
            output.push(0x80 | ((code_point >> 6) & 0x3F) as u8);
            output.push(0x80 | (code_point & 0x3F) as u8);
        }
        0x1_0000..=0x10_FFFF => {
            output.push(0xF0 | (code_point >> 18) as u8);
            output.push(0x80 | ((code_point >> 12) & 0x3F) as u8);
            output.push(0x80 | ((code_point >> 6) & 0x3F) as u8);
            output.push(0x80 | (code_point & 0x3F) as u8);
        }
        _ => {
            output.extend_from_slice(format!("\\U{code_point:08x}").as_bytes());
        }
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
    use pretty_assertions::assert_eq;

    // === parse_integer ===

    #[test]
    fn decodes_each_base() {
        assert_eq!(parse_integer(b"42", u64::MAX), Some(42));
        assert_eq!(parse_integer(b"0x2A", u64::MAX), Some(42));
        assert_eq!(parse_integer(b"0X2a", u64::MAX), Some(42));
        assert_eq!(parse_integer(b"0755", u64::MAX), Some(493));
        assert_eq!(parse_integer(b"0", u64::MAX), Some(0));
        assert_eq!(parse_integer(b"00", u64::MAX), Some(0));
    }

    #[test]
    fn rejects_digits_invalid_for_the_base() {
        // "099" is tokenized as an integer (with an error); it must not
        // decode.
        assert_eq!(parse_integer(b"099", u64::MAX), None);
        assert_eq!(parse_integer(b"08", u64::MAX), None);
    }

    #[test]
    fn u64_overflow_boundary() {
        assert_eq!(
            parse_integer(b"18446744073709551615", u64::MAX),
            Some(u64::MAX)
        );
        assert_eq!(parse_integer(b"18446744073709551616", u64::MAX), None);
        assert_eq!(parse_integer(b"0xFFFFFFFFFFFFFFFF", u64::MAX), Some(u64::MAX));
        assert_eq!(parse_integer(b"0x10000000000000000", u64::MAX), None);
        assert_eq!(
            parse_integer(b"01777777777777777777777", u64::MAX),
            Some(u64::MAX)
        );
        assert_eq!(parse_integer(b"02000000000000000000000", u64::MAX), None);
    }

    #[test]
    fn max_value_boundary() {
        assert_eq!(parse_integer(b"255", 255), Some(255));
        assert_eq!(parse_integer(b"256", 255), None);
        assert_eq!(parse_integer(b"0xFF", 255), Some(255));
        assert_eq!(parse_integer(b"0x100", 255), None);
    }

    // === parse_float ===

    #[test]
    #[allow(clippy::float_cmp, reason = "exact decimal values are expected")]
    fn decodes_plain_floats() {
        assert_eq!(parse_float(b"1.0"), 1.0);
        assert_eq!(parse_float(b".5"), 0.5);
        assert_eq!(parse_float(b"1."), 1.0);
        assert_eq!(parse_float(b"5"), 5.0);
        assert_eq!(parse_float(b"1e3"), 1000.0);
        assert_eq!(parse_float(b"1.5E+2"), 150.0);
        assert_eq!(parse_float(b"3.14e-2"), 0.0314);
    }

    #[test]
    #[allow(clippy::float_cmp, reason = "exact decimal values are expected")]
    fn tolerates_dangling_exponent_and_f_suffix() {
        // The tokenizer emits these (with errors or with the f option on).
        assert_eq!(parse_float(b"1e"), 1.0);
        assert_eq!(parse_float(b"1e-"), 1.0);
        assert_eq!(parse_float(b"1E+"), 1.0);
        assert_eq!(parse_float(b"1.0f"), 1.0);
        assert_eq!(parse_float(b"2.5F"), 2.5);
        assert_eq!(parse_float(b"1e5f"), 100000.0);
    }

    // === parse_string ===

    fn decoded(text: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        parse_string_append(text, &mut out);
        out
    }

    #[test]
    fn plain_strings_drop_their_quotes() {
        assert_eq!(decoded(br#""hello""#), b"hello");
        assert_eq!(decoded(b"'hello'"), b"hello");
        assert_eq!(decoded(br#""""#), b"");
    }

    #[test]
    fn parse_string_clears_parse_string_append_appends() {
        let mut out = b"old".to_vec();
        parse_string(br#""new""#, &mut out);
        assert_eq!(out, b"new");

        let mut out = b"keep ".to_vec();
        parse_string_append(br#""this""#, &mut out);
        assert_eq!(out, b"keep this");
    }

    #[test]
    fn simple_escapes() {
        assert_eq!(
            decoded(br#""\a\b\f\n\r\t\v\\\?\'\"""#),
            b"\x07\x08\x0C\n\r\t\x0B\\?'\""
        );
    }

    #[test]
    fn octal_escapes_take_up_to_three_digits() {
        assert_eq!(decoded(br#""\0""#), b"\x00");
        assert_eq!(decoded(br#""\01""#), b"\x01");
        assert_eq!(decoded(br#""\012""#), b"\n");
        assert_eq!(decoded(br#""\0123""#), b"\n3");
        assert_eq!(decoded(br#""\377""#), b"\xFF");
        // Three digits wrap mod 256.
        assert_eq!(decoded(br#""\777""#), b"\xFF");
    }

    #[test]
    fn hex_escapes_take_up_to_two_digits() {
        assert_eq!(decoded(br#""\x20""#), b" ");
        assert_eq!(decoded(br#""\x2""#), b"\x02");
        assert_eq!(decoded(br#""\x41B""#), b"AB");
        assert_eq!(decoded(br#""\xff""#), b"\xFF");
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(decoded(br#""\u0041""#), b"A");
        assert_eq!(decoded(br#""\u00e9""#), "é".as_bytes());
        assert_eq!(decoded(br#""\u2713""#), "\u{2713}".as_bytes());
        assert_eq!(decoded(br#""\U0001F600""#), "\u{1F600}".as_bytes());
        assert_eq!(decoded(br#""\U0010FFFF""#), "\u{10FFFF}".as_bytes());
    }

    #[test]
    fn surrogate_pair_assembles_into_one_code_point() {
        assert_eq!(decoded(br#""\uD83D\uDE00""#), [0xF0, 0x9F, 0x98, 0x80]);
    }

    #[test]
    fn unpaired_head_surrogate_keeps_its_raw_encoding() {
        // Bogus, but defined: the 3-byte encoding of U+D83D.
        assert_eq!(decoded(br#""\uD83D""#), [0xED, 0xA0, 0xBD]);
        // A head surrogate followed by a non-trail \u stays unpaired too.
        assert_eq!(
            decoded(br#""\uD83D\u0041""#),
            [0xED, 0xA0, 0xBD, b'A']
        );
    }

    #[test]
    fn trail_surrogate_must_use_lowercase_u_form() {
        // \U trail escapes never pair; both halves stay raw.
        let out = decoded(br#""\uD83D\U0000DE00""#);
        assert_eq!(&out[..3], [0xED, 0xA0, 0xBD]);
    }

    #[test]
    fn out_of_range_code_point_falls_back_to_literal_text() {
        // The scanner pattern admits up to 0x1FFFFF, which cannot be
        // encoded as UTF-8.
        assert_eq!(decoded(br#""\U001FFFFF""#), b"\\U001fffff");
    }

    #[test]
    fn malformed_unicode_escape_dumps_the_escape_char() {
        assert_eq!(decoded(br#""\u12""#), b"u12");
        assert_eq!(decoded(br#""\uXYZW""#), b"uXYZW");
    }

    #[test]
    fn unknown_escape_decodes_to_question_mark() {
        assert_eq!(decoded(br#""\q""#), b"?");
    }

    #[test]
    fn trailing_lone_backslash_is_kept() {
        assert_eq!(decoded(br#""abc\"#), b"abc\\");
    }

    #[test]
    fn final_byte_is_a_quote_only_when_it_matches_the_opener() {
        // Adversarial input: mismatched final quote is payload, not a
        // delimiter.
        assert_eq!(decoded(b"\"abc'"), b"abc'");
        // A matching quote mid-string is payload as well.
        assert_eq!(decoded(b"'a'b'"), b"a'b");
    }

    // === is_identifier ===

    #[test]
    fn identifier_predicate() {
        assert!(is_identifier(b"foo"));
        assert!(is_identifier(b"_foo"));
        assert!(is_identifier(b"foo_123"));
        assert!(is_identifier(b"_"));
        assert!(!is_identifier(b""));
        assert!(!is_identifier(b"1foo"));
        assert!(!is_identifier(b"foo bar"));
        assert!(!is_identifier(b"foo-bar"));
        assert!(!is_identifier(b"caf\xC3\xA9"));
    }

    // === Property tests ===

    #[allow(
        clippy::disallowed_types,
        reason = "proptest macros internally use Arc"
    )]
    mod proptest_decode {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn integer_round_trips_in_every_base(value: u64) {
                let decimal = format!("{value}");
                prop_assert_eq!(parse_integer(decimal.as_bytes(), u64::MAX), Some(value));

                let hex = format!("0x{value:X}");
                prop_assert_eq!(parse_integer(hex.as_bytes(), u64::MAX), Some(value));

                let octal = format!("0{value:o}");
                prop_assert_eq!(parse_integer(octal.as_bytes(), u64::MAX), Some(value));
            }

            #[test]
            fn max_value_is_a_hard_ceiling(value: u64, max_value: u64) {
                let text = format!("{value}");
                let expected = if value <= max_value { Some(value) } else { None };
                prop_assert_eq!(parse_integer(text.as_bytes(), max_value), expected);
            }

            #[test]
            fn octal_escape_round_trips_every_byte(byte: u8) {
                let text = format!("\"\\{byte:03o}\"");
                let mut out = Vec::new();
                parse_string_append(text.as_bytes(), &mut out);
                prop_assert_eq!(out, vec![byte]);
            }
        }
    }
}
