use chardetng::EncodingDetector;
use encoding_rs::{
    Encoding,
    UTF_8,
};
use tracing::warn;

/// Decodes subtitle bytes, honouring a byte order mark and otherwise guessing
/// the charset from the content. Returns the text and the encoding used.
pub fn decode(bytes: &[u8]) -> (String, &'static Encoding) {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return (text.into_owned(), encoding);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), UTF_8);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!("Subtitle contained bytes that are invalid in {}", used.name());
    }
    (text.into_owned(), used)
}
