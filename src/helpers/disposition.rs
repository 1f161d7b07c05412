//! `Content-Disposition` values for attachments with arbitrary Unicode names.
//!
//! Emits both parameters per RFC 6266: a plain ASCII `filename` for legacy
//! clients and an RFC 5987 `filename*=UTF-8''...` that round-trips the
//! original name exactly.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use unicode_normalization::UnicodeNormalization;

/// Substituted when a name has no usable ASCII characters at all.
pub static FALLBACK_FILE_NAME: &str = "download.mp3";

/// RFC 5987 value-chars. Only unreserved characters stay literal; spaces,
/// reserved punctuation and every non-ASCII byte get percent-encoded.
const RFC5987_VALUE_CHARS: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Derive an ASCII-only name usable inside a quoted `filename="..."`.
///
/// NFKD decomposition splits accented letters into base letter plus combining
/// marks, so stripping non-ASCII afterwards keeps the base letters. Double
/// quotes must go since the result is embedded in a quoted parameter.
pub fn ascii_fallback(name: &str) -> String {
    let stripped = name
        .nfkd()
        .filter(|c| matches!(*c, ' '..='~') && *c != '"')
        .collect::<String>();
    let stripped = stripped.trim();

    if stripped.is_empty() {
        FALLBACK_FILE_NAME.to_owned()
    } else {
        stripped.to_owned()
    }
}

/// Build the full header value for the given display name.
///
/// The result is always a valid HTTP header value regardless of the input.
pub fn attachment_header(name: &str) -> String {
    let fallback = ascii_fallback(name);
    let encoded = utf8_percent_encode(name, RFC5987_VALUE_CHARS);

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
    use percent_encoding::percent_decode_str;

    use super::*;

    fn extended_value(header: &str) -> &str {
        header
            .split_once("filename*=UTF-8''")
            .map(|(_, rest)| rest)
            .unwrap_or_default()
    }

    #[test]
    fn fallback_transliterates_accents() {
        assert_eq!(ascii_fallback("Café del Mar"), "Cafe del Mar");
        assert_eq!(ascii_fallback("Noël Coward"), "Noel Coward");
    }

    #[test]
    fn fallback_strips_quotes_and_trims() {
        assert_eq!(ascii_fallback("Rock \"n\" Roll"), "Rock n Roll");
        assert_eq!(ascii_fallback("  padded  "), "padded");
    }

    #[test]
    fn fallback_substitutes_placeholder_when_nothing_survives() {
        assert_eq!(ascii_fallback(""), FALLBACK_FILE_NAME);
        assert_eq!(ascii_fallback("測試"), FALLBACK_FILE_NAME);
        assert_eq!(ascii_fallback("   "), FALLBACK_FILE_NAME);
        assert_eq!(ascii_fallback("\"\""), FALLBACK_FILE_NAME);
    }

    #[test]
    fn fallback_is_always_printable_ascii_without_quotes() {
        let inputs = [
            "Café del Mar - Artist",
            "測試 - Artist",
            "Мужчина и женщина",
            "Rock \"n\" Roll\n",
            "a\tb\u{7f}c",
            "🎵🎵🎵",
        ];

        for input in inputs {
            let fallback = ascii_fallback(input);
            assert!(!fallback.is_empty(), "empty fallback for {input:?}");
            assert!(
                fallback.chars().all(|c| matches!(c, ' '..='~') && c != '"'),
                "bad fallback {fallback:?} for {input:?}"
            );
        }
    }

    #[test]
    fn header_has_expected_shape() {
        let header = attachment_header("Café del Mar");

        assert_eq!(
            header,
            "attachment; filename=\"Cafe del Mar\"; filename*=UTF-8''Caf%C3%A9%20del%20Mar"
        );
    }

    #[test]
    fn header_encodes_everything_outside_unreserved() {
        let header = attachment_header("a b(c)[d]/e\"f");
        let encoded = extended_value(&header);

        assert_eq!(encoded, "a%20b%28c%29%5Bd%5D%2Fe%22f");
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '%')));
    }

    #[test]
    fn header_falls_back_to_placeholder_for_non_latin_names() {
        let header = attachment_header("測試");

        assert!(header.starts_with(&format!("attachment; filename=\"{FALLBACK_FILE_NAME}\"; ")));
        assert_eq!(extended_value(&header), "%E6%B8%AC%E8%A9%A6");
    }

    #[test]
    fn extended_value_round_trips_the_original_name() {
        let inputs = ["Café del Mar", "測試 - Artist", "Rock \"n\" Roll", "🎵 mix"];

        for input in inputs {
            let header = attachment_header(input);
            let decoded = percent_decode_str(extended_value(&header))
                .decode_utf8()
                .expect("encoded value should be valid UTF-8");

            assert_eq!(decoded, input);
        }
    }
}
