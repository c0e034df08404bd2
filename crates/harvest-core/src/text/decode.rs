//! Best-effort byte decoding. Never fails; gives `""` when nothing fits.

use chardetng::EncodingDetector;

const UTF8_SIGNATURE: &[u8] = b"\xEF\xBB\xBF";

/// Share of control characters above which decoded text is taken for binary.
const MAX_CONTROL_RATIO: f64 = 0.01;

/// Decode `bytes` trying, in order: UTF-8 with signature, UTF-8 (which covers
/// ASCII), strict ISO-8859-1, a statistical guess, then plain ISO-8859-1.
/// Returns `""` only when the input looks binary.
pub fn decode(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(UTF8_SIGNATURE) {
        if let Ok(s) = std::str::from_utf8(rest) {
            return s.to_string();
        }
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    if let Some(s) = decode_latin1(bytes) {
        return s;
    }
    if let Some(s) = decode_detected(bytes) {
        return s;
    }
    let text: String = bytes.iter().map(|&b| char::from(b)).collect();
    if !looks_binary(&text) {
        tracing::debug!(bytes = bytes.len(), "decoded as plain ISO-8859-1");
        return text;
    }
    tracing::debug!(bytes = bytes.len(), "no encoding fits, dropping document");
    String::new()
}

/// ISO-8859-1 without the C1 block; 0x80..=0x9F almost always means a
/// Windows code page, which the detector handles.
fn decode_latin1(bytes: &[u8]) -> Option<String> {
    if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
        return None;
    }
    Some(bytes.iter().map(|&b| char::from(b)).collect())
}

fn decode_detected(bytes: &[u8]) -> Option<String> {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors || looks_binary(&text) {
        tracing::debug!(encoding = encoding.name(), "detected encoding rejected");
        return None;
    }
    tracing::debug!(encoding = encoding.name(), "decoded with detected encoding");
    Some(text.into_owned())
}

/// NUL anywhere, or more than `MAX_CONTROL_RATIO` of the text in control characters.
fn looks_binary(text: &str) -> bool {
    let mut total = 0usize;
    let mut controls = 0usize;
    for c in text.chars() {
        if c == '\u{0}' {
            return true;
        }
        total += 1;
        if is_unexpected_control(c) {
            controls += 1;
        }
    }
    total > 0 && controls as f64 > total as f64 * MAX_CONTROL_RATIO
}

fn is_unexpected_control(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' | '\u{0c}' => false,
        '\u{00}'..='\u{1f}' | '\u{7f}'..='\u{9f}' | '\u{fffd}' => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_signature_is_stripped() {
        assert_eq!(decode(b"\xEF\xBB\xBFhello"), "hello");
    }

    #[test]
    fn utf8_and_ascii() {
        assert_eq!(decode("naïve café".as_bytes()), "naïve café");
        assert_eq!(decode(b"plain ascii"), "plain ascii");
        assert_eq!(decode(b""), "");
    }

    #[test]
    fn latin1_fallback() {
        assert_eq!(decode(b"caf\xe9 cr\xe8me"), "café crème");
    }

    #[test]
    fn windows_1252_goes_to_detector() {
        let bytes = b"He said \x93hello\x94 to the crowd, and it\x92s a fine day in the town square.";
        assert_eq!(
            decode(bytes),
            "He said \u{201c}hello\u{201d} to the crowd, and it\u{2019}s a fine day in the town square."
        );
    }

    #[test]
    fn undecodable_bytes_give_empty_string() {
        assert_eq!(decode(b"\x00\x81\x00\x90"), "");
    }

    #[test]
    fn stray_c1_byte_keeps_latin1_document() {
        let mut bytes = Vec::new();
        for _ in 0..50 {
            bytes.extend_from_slice(b"Il \xe9tait une fois une b\xeate qui r\xeavait pr\xe8s de la rivi\xe8re. ");
        }
        bytes.push(0x81);
        bytes.extend_from_slice(b"Fin.");
        let text = decode(&bytes);
        assert!(text.starts_with("Il \u{e9}tait une fois"));
        assert!(text.ends_with("Fin."));
        assert_eq!(text.chars().filter(|&c| c == '\u{e9}').count(), 50);
    }

    #[test]
    fn binary_detection() {
        assert!(looks_binary("ab\u{0}cd"));
        assert!(looks_binary("\u{81}\u{90}abc"));
        assert!(!looks_binary(&format!("{}\u{81}", "x".repeat(200))));
        assert!(!looks_binary(""));
    }

    #[test]
    fn control_filter() {
        assert!(!is_unexpected_control('\n'));
        assert!(!is_unexpected_control('\u{0c}'));
        assert!(is_unexpected_control('\u{0}'));
        assert!(is_unexpected_control('\u{85}'));
        assert!(is_unexpected_control('\u{fffd}'));
        assert!(!is_unexpected_control('é'));
    }
}
