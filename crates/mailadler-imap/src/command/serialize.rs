//! Command serialization helpers.

/// Writes a quoted string, escaping `"` and `\`.
pub fn write_quoted(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for b in s.bytes() {
        if b == b'"' || b == b'\\' {
            buf.push(b'\\');
        }
        buf.push(b);
    }
    buf.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_quoted_plain() {
        let mut buf = Vec::new();
        write_quoted(&mut buf, "Sent Items");
        assert_eq!(buf, b"\"Sent Items\"");
    }

    #[test]
    fn test_write_quoted_empty() {
        let mut buf = Vec::new();
        write_quoted(&mut buf, "");
        assert_eq!(buf, b"\"\"");
    }
}
