//! Byte classification for the tokenizer.
//!
//! Every classifier is a pure predicate over a single byte. The `0x00` byte
//! maps to `false` in every class, so cursor loops that scan "while class"
//! terminate naturally at end of input without a separate bounds check.

/// 256-byte lookup table for identifier continuation bytes.
/// `true` for a-z, A-Z, 0-9, and underscore.
/// Table lookup replaces the multi-range `matches!` with a single indexed
/// read in the hottest scanning loop.
#[allow(
    clippy::cast_possible_truncation,
    reason = "loop counter i is 0..=255, always fits in u8"
)]
static IS_ALPHANUMERIC_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0u16;
    while i < 256 {
        table[i as usize] = matches!(
            i as u8,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_'
        );
        i += 1;
    }
    table
};

/// Digit values for bases up to 36; `36` marks a byte that is not a digit
/// in any supported base.
#[allow(
    clippy::cast_possible_truncation,
    reason = "loop counter i is 0..=255, always fits in u8"
)]
static DIGIT_VALUE_TABLE: [u8; 256] = {
    let mut table = [36u8; 256];
    let mut i = 0u16;
    while i < 256 {
        let b = i as u8;
        table[i as usize] = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'z' => b - b'a' + 10,
            b'A'..=b'Z' => b - b'A' + 10,
            _ => 36,
        };
        i += 1;
    }
    table
};

/// Whitespace, including newlines: space, LF, HT, CR, VT, FF.
#[inline]
pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\t' | b'\r' | 0x0B | 0x0C)
}

/// Whitespace excluding LF: space, HT, CR, VT, FF.
#[inline]
pub(crate) fn is_whitespace_no_newline(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | 0x0B | 0x0C)
}

/// Control bytes below `0x20`, excluding NUL (which marks end of input).
#[inline]
pub(crate) fn is_unprintable(b: u8) -> bool {
    b < b' ' && b != 0
}

#[inline]
pub(crate) fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

#[inline]
pub(crate) fn is_octal_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'7')
}

#[inline]
pub(crate) fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

/// ASCII letter or underscore: the bytes an identifier may start with.
#[inline]
pub(crate) fn is_letter(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// Letter, digit, or underscore: the bytes an identifier may continue with.
#[inline]
pub(crate) fn is_alphanumeric(b: u8) -> bool {
    IS_ALPHANUMERIC_TABLE[b as usize]
}

/// Bytes that form a valid simple escape after a backslash.
#[inline]
pub(crate) fn is_escape_char(b: u8) -> bool {
    matches!(
        b,
        b'a' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' | b'\\' | b'?' | b'\'' | b'"'
    )
}

/// Interpret a byte as a numeric digit and return its value.
///
/// Supports any base up to 36; returns 36 for bytes that are not a digit in
/// any base, so `digit_value(b) >= base` rejects invalid digits uniformly.
#[inline]
pub(crate) fn digit_value(b: u8) -> u8 {
    DIGIT_VALUE_TABLE[b as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Whitespace ===

    #[test]
    fn whitespace_classes() {
        for b in [b' ', b'\n', b'\t', b'\r', 0x0B, 0x0C] {
            assert!(is_whitespace(b), "byte {b:#04x} should be whitespace");
        }
        assert!(!is_whitespace(0));
        assert!(!is_whitespace(b'a'));

        assert!(is_whitespace_no_newline(b' '));
        assert!(is_whitespace_no_newline(b'\r'));
        assert!(!is_whitespace_no_newline(b'\n'));
        assert!(!is_whitespace_no_newline(0));
    }

    #[test]
    fn unprintable_excludes_nul_and_space() {
        assert!(!is_unprintable(0));
        assert!(!is_unprintable(b' '));
        assert!(is_unprintable(0x01));
        assert!(is_unprintable(0x1F));
        assert!(is_unprintable(b'\t'));
        assert!(!is_unprintable(b'~'));
        assert!(!is_unprintable(0x80));
    }

    // === Digits & Letters ===

    #[test]
    fn digit_classes() {
        assert!(is_digit(b'0'));
        assert!(is_digit(b'9'));
        assert!(!is_digit(b'a'));

        assert!(is_octal_digit(b'7'));
        assert!(!is_octal_digit(b'8'));

        assert!(is_hex_digit(b'f'));
        assert!(is_hex_digit(b'F'));
        assert!(is_hex_digit(b'0'));
        assert!(!is_hex_digit(b'g'));
    }

    #[test]
    fn letter_includes_underscore() {
        assert!(is_letter(b'a'));
        assert!(is_letter(b'Z'));
        assert!(is_letter(b'_'));
        assert!(!is_letter(b'0'));
        assert!(!is_letter(b'-'));
    }

    #[test]
    fn alphanumeric_matches_letter_or_digit() {
        for b in 0u16..=255 {
            #[allow(clippy::cast_possible_truncation, reason = "b is 0..=255")]
            let b = b as u8;
            assert_eq!(is_alphanumeric(b), is_letter(b) || is_digit(b), "byte {b:#04x}");
        }
    }

    // === Escapes ===

    #[test]
    fn escape_chars() {
        for b in [
            b'a', b'b', b'f', b'n', b'r', b't', b'v', b'\\', b'?', b'\'', b'"',
        ] {
            assert!(is_escape_char(b), "byte {:?} should be an escape", b as char);
        }
        assert!(!is_escape_char(b'x'));
        assert!(!is_escape_char(b'u'));
        assert!(!is_escape_char(b'0'));
    }

    // === Digit values ===

    #[test]
    fn digit_values_all_bases() {
        assert_eq!(digit_value(b'0'), 0);
        assert_eq!(digit_value(b'9'), 9);
        assert_eq!(digit_value(b'a'), 10);
        assert_eq!(digit_value(b'A'), 10);
        assert_eq!(digit_value(b'f'), 15);
        assert_eq!(digit_value(b'z'), 35);
        assert_eq!(digit_value(b'Z'), 35);
    }

    #[test]
    fn digit_value_invalid_is_36() {
        for b in [0u8, b' ', b'/', b':', b'@', b'[', b'`', b'{', 0x80, 0xFF] {
            assert_eq!(digit_value(b), 36, "byte {b:#04x}");
        }
    }
}
