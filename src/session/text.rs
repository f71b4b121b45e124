use core::fmt::{self, Write as _};

/// Renders frame bytes as text; invalid UTF-8 sequences become U+FFFD.
pub struct PayloadText<'a>(pub &'a [u8]);

impl fmt::Display for PayloadText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.0.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_char(char::REPLACEMENT_CHARACTER)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PayloadText;

    #[test]
    fn valid_text_passes_through() {
        assert_eq!(PayloadText(b"ping").to_string(), "ping");
        assert_eq!(PayloadText("héllo".as_bytes()).to_string(), "héllo");
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        assert_eq!(PayloadText(b"ab\xffcd").to_string(), "ab\u{FFFD}cd");
        assert_eq!(PayloadText(b"\xc3").to_string(), "\u{FFFD}");
    }
}
