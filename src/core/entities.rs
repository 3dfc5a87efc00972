//! XML Entity Decoding
//!
//! Handles the text between `&` and `;`:
//! - Predefined entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//!
//! Anything else is not an error. The name itself, without the `&` and `;`
//! delimiters, is written in place of the reference.

use log::trace;

use super::scratch::ScratchBuffer;

/// Decode one of the five predefined entity names into its single byte.
///
/// Matches on length first, then content.
#[inline]
pub fn decode_predefined(name: &[u8]) -> Option<u8> {
    match name.len() {
        2 => match name {
            b"lt" => Some(b'<'),
            b"gt" => Some(b'>'),
            _ => None,
        },
        3 => match name {
            b"amp" => Some(b'&'),
            _ => None,
        },
        4 => match name {
            b"apos" => Some(b'\''),
            b"quot" => Some(b'"'),
            _ => None,
        },
        _ => None,
    }
}

/// Decode a numeric character reference body (the part after `&`, starting with `#`).
pub fn decode_char_ref(name: &[u8]) -> Option<char> {
    let digits = name.strip_prefix(b"#")?;
    if digits.is_empty() {
        return None;
    }

    let codepoint = if digits[0] == b'x' || digits[0] == b'X' {
        // Hexadecimal: &#xHHHH;
        let hex = std::str::from_utf8(&digits[1..]).ok()?;
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(hex, 16).ok()?
    } else {
        // Decimal: &#DDDD;
        if !digits.iter().all(u8::is_ascii_digit) {
            return None;
        }
        std::str::from_utf8(digits).ok()?.parse::<u32>().ok()?
    };

    char::from_u32(codepoint)
}

/// Decode an escape name and append the result to `buf`.
pub fn decode_into(name: &[u8], buf: &mut ScratchBuffer) {
    if let Some(b) = decode_predefined(name) {
        buf.push(b);
        return;
    }

    if let Some(c) = decode_char_ref(name) {
        let mut utf8 = [0u8; 4];
        buf.append(c.encode_utf8(&mut utf8).as_bytes());
        return;
    }

    trace!(
        "not a known encoding name '{}'; using the original text",
        String::from_utf8_lossy(name)
    );
    buf.append(name);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(name: &[u8]) -> Vec<u8> {
        let mut buf = ScratchBuffer::new();
        decode_into(name, &mut buf);
        buf.get().to_vec()
    }

    #[test]
    fn test_predefined() {
        assert_eq!(decode_predefined(b"lt"), Some(b'<'));
        assert_eq!(decode_predefined(b"gt"), Some(b'>'));
        assert_eq!(decode_predefined(b"amp"), Some(b'&'));
        assert_eq!(decode_predefined(b"apos"), Some(b'\''));
        assert_eq!(decode_predefined(b"quot"), Some(b'"'));
        assert_eq!(decode_predefined(b"nbsp"), None);
        assert_eq!(decode_predefined(b"am"), None);
        assert_eq!(decode_predefined(b""), None);
    }

    #[test]
    fn test_numeric_decimal() {
        assert_eq!(decode(b"#65"), b"A");
        assert_eq!(decode_char_ref(b"#65"), Some('A'));
    }

    #[test]
    fn test_numeric_hex() {
        assert_eq!(decode(b"#x41"), b"A");
        assert_eq!(decode(b"#X42"), b"B");
    }

    #[test]
    fn test_unicode_entity() {
        let bytes = decode(b"#x1F600");
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), "\u{1F600}");
        let bytes = decode(b"#233");
        assert_eq!(bytes, "\u{e9}".as_bytes());
    }

    #[test]
    fn test_unknown_entity_loses_delimiters() {
        assert_eq!(decode(b"unknown"), b"unknown");
    }

    #[test]
    fn test_invalid_char_ref_falls_back() {
        assert_eq!(decode(b"#xD800"), b"#xD800");
        assert_eq!(decode(b"#12a"), b"#12a");
        assert_eq!(decode(b"#"), b"#");
        assert_eq!(decode(b"#x"), b"#x");
    }
}
