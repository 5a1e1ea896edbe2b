//! Response body decoding
//!
//! Many catalog sites still serve GBK or Big5 without declaring a charset, so
//! bodies are decoded from bytes: byte order mark first, then the Content-Type
//! charset, then content sniffing.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Decodes a response body to text
///
/// Malformed sequences are replaced rather than rejected; the encoding used is
/// returned alongside the text.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> (String, &'static Encoding) {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(encoding) = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, encoding);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(&['"', '\''][..]).to_string())
    })
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> (String, &'static Encoding) {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!("Body had malformed {} sequences", used.name());
    }
    (text.into_owned(), used)
}
