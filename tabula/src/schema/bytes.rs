//! Printable-or-escaped binary strings (`row\x00key`).

/// Decode a string where any byte may be written as `\xHH`.
///
/// Anything that is not a well-formed escape is taken literally.
pub fn to_bytes_binary(input: &str) -> Vec<u8> {
    let raw = input.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'\\' && i + 3 < raw.len() && raw[i + 1] == b'x' {
            if let (Some(hi), Some(lo)) = (hex_value(raw[i + 2]), hex_value(raw[i + 3])) {
                out.push((hi << 4) | lo);
                i += 4;
                continue;
            }
        }
        out.push(raw[i]);
        i += 1;
    }
    out
}

/// Encode bytes so that printable ASCII stays readable and everything
/// else (including `\`) becomes `\xHH`.
pub fn to_string_binary(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (b' '..=b'~').contains(&b) && b != b'\\' {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{:02X}", b));
        }
    }
    out
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_unchanged() {
        assert_eq!(to_bytes_binary("abc"), b"abc".to_vec());
    }

    #[test]
    fn test_escapes_decode() {
        assert_eq!(to_bytes_binary("a\\x00\\xFFz"), vec![b'a', 0x00, 0xFF, b'z']);
        assert_eq!(to_bytes_binary("\\x7f"), vec![0x7F]);
    }

    #[test]
    fn test_malformed_escapes_are_literal() {
        assert_eq!(to_bytes_binary("\\xZZ"), b"\\xZZ".to_vec());
        assert_eq!(to_bytes_binary("\\x1"), b"\\x1".to_vec());
        assert_eq!(to_bytes_binary("end\\"), b"end\\".to_vec());
    }

    #[test]
    fn test_string_binary_escapes_non_printables() {
        assert_eq!(to_string_binary(&[b'r', 0x00, b'\\', 0xAB]), "r\\x00\\x5C\\xAB");
        assert_eq!(to_bytes_binary(&to_string_binary(&[0x00, b'm', 0xFF])), vec![0x00, b'm', 0xFF]);
    }
}
