use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub html: String,
    pub encoding: &'static str,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("page bytes are not valid {encoding}")]
pub struct DecodeError {
    pub encoding: &'static str,
}

/// Decode a schedule page into UTF-8.
///
/// Encoding precedence: byte order mark, then the Content-Type charset, then `chardetng`.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedPage, DecodeError> {
    let encoding = resolve_encoding(bytes, content_type);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError {
            encoding: used.name(),
        });
    }
    Ok(DecodedPage {
        html: text.into_owned(),
        encoding: used.name(),
    })
}

fn resolve_encoding(bytes: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if let Some(encoding) = content_type
        .and_then(header_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn header_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(&['"', '\''][..]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_charset_ignores_case_and_quotes() {
        assert_eq!(header_charset("text/html; CharSet=\"Shift_JIS\""), Some("Shift_JIS"));
        assert_eq!(header_charset("text/html"), None);
    }
}
