//! Filename and title extraction from `Content-Disposition`.

use regex::Regex;
use std::sync::OnceLock;

/// `filename*=charset'lang'pct-encoded` (RFC 5987)
fn extended_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)filename\*\s*=\s*([^']*)'[^']*'([^;\s]+)"#)
            .expect("filename* pattern is valid")
    })
}

/// `filename="name"` (with `\"` escapes) or `filename=name`
fn plain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)filename\s*=\s*(?:"((?:[^"\\]|\\.)*)"?|([^;]+))"#)
            .expect("filename pattern is valid")
    })
}

/// Decodes the value of an extended parameter.
///
/// Only UTF-8 and ISO-8859-1 are understood; other charsets yield `None` so
/// the plain `filename` can be used instead.
fn decode_extended(charset: &str, encoded: &str) -> Option<String> {
    let bytes = urlencoding::decode_binary(encoded.as_bytes());
    if charset.eq_ignore_ascii_case("utf-8") {
        String::from_utf8(bytes.into_owned()).ok()
    } else if charset.eq_ignore_ascii_case("iso-8859-1") {
        Some(bytes.iter().map(|&b| b as char).collect())
    } else {
        tracing::debug!("Unsupported filename* charset {:?}", charset);
        None
    }
}

/// Removes quoted-string backslash escapes (`\"` → `"`).
fn unescape_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Extracts the suggested filename from a `Content-Disposition` header value.
///
/// The RFC 5987 `filename*` form wins over plain `filename` when both are
/// present and it decodes. Quotes around the plain form are optional. The
/// result is passed through [`sanitize_file_name`]; `None` means no usable
/// name was found.
pub fn file_name_from_header(value: &str) -> Option<String> {
    if let Some(caps) = extended_regex().captures(value) {
        let name = decode_extended(&caps[1], &caps[2]).and_then(|name| sanitize_file_name(&name));
        if name.is_some() {
            return name;
        }
    }

    let caps = plain_regex().captures(value)?;
    let raw = match (caps.get(1), caps.get(2)) {
        (Some(quoted), _) => unescape_quoted(quoted.as_str()),
        (None, Some(bare)) => bare.as_str().to_string(),
        (None, None) => return None,
    };
    sanitize_file_name(&raw)
}

/// Makes a server-supplied name safe to create inside the output directory.
///
/// Path separators and control characters become `_`; surrounding whitespace
/// is trimmed. Names that end up empty, `.` or `..` are refused.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();

    match cleaned {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Derives a presentable title by dropping the final `.ext` suffix.
///
/// Names without an extension, with a trailing dot, or that are only an
/// extension (`.mp3`) are returned unchanged.
pub fn title_from_file_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => file_name[..idx].to_string(),
        _ => file_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_filename() {
        assert_eq!(
            file_name_from_header(r#"attachment; filename="Song Title.mp3""#),
            Some("Song Title.mp3".to_string())
        );
    }

    #[test]
    fn unquoted_filename() {
        assert_eq!(
            file_name_from_header("attachment; filename=Song Title.mp3"),
            Some("Song Title.mp3".to_string())
        );
        assert_eq!(
            file_name_from_header("attachment; filename=track.mp3; size=42"),
            Some("track.mp3".to_string())
        );
    }

    #[test]
    fn extended_filename_preferred() {
        let header =
            r#"attachment; filename="fallback.mp3"; filename*=UTF-8''Canci%C3%B3n%20Uno.mp3"#;
        assert_eq!(
            file_name_from_header(header),
            Some("Canción Uno.mp3".to_string())
        );
    }

    #[test]
    fn patterns_compile() {
        assert!(extended_regex().is_match("filename*=UTF-8''a.mp3"));
        assert!(plain_regex().is_match("filename=a.mp3"));
    }

    #[test]
    fn latin1_extended_filename() {
        assert_eq!(
            file_name_from_header("attachment; filename*=ISO-8859-1''caf%E9.mp3"),
            Some("café.mp3".to_string())
        );
    }

    #[test]
    fn unsupported_charset_falls_back_to_plain() {
        assert_eq!(
            file_name_from_header(r#"attachment; filename*=KOI8-R''%C1.mp3; filename="plain.mp3""#),
            Some("plain.mp3".to_string())
        );
        assert_eq!(
            file_name_from_header(r#"attachment; filename*=UTF-8''%FF.mp3; filename="plain.mp3""#),
            Some("plain.mp3".to_string())
        );
    }

    #[test]
    fn escaped_quotes_in_filename() {
        let name = file_name_from_header(r#"attachment; filename="a \"b\".mp3""#).unwrap();
        assert_eq!(name, r#"a "b".mp3"#);
        assert_eq!(title_from_file_name(&name), r#"a "b""#);
    }

    #[test]
    fn missing_or_empty_filename() {
        assert_eq!(file_name_from_header("attachment"), None);
        assert_eq!(file_name_from_header(r#"attachment; filename="""#), None);
        assert_eq!(file_name_from_header("inline"), None);
    }

    #[test]
    fn path_components_are_neutralized() {
        assert_eq!(
            file_name_from_header(r#"attachment; filename="../../etc/passwd""#),
            Some(".._.._etc_passwd".to_string())
        );
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name("  a\tb.mp3 "), Some("a_b.mp3".to_string()));
    }

    #[test]
    fn titles() {
        assert_eq!(title_from_file_name("Song Title.mp3"), "Song Title");
        assert_eq!(title_from_file_name("audio.mp3"), "audio");
        assert_eq!(title_from_file_name("Mr. Brightside.mp3"), "Mr. Brightside");
        assert_eq!(title_from_file_name("no extension"), "no extension");
        assert_eq!(title_from_file_name(".mp3"), ".mp3");
        assert_eq!(title_from_file_name("trailing."), "trailing.");
    }
}
