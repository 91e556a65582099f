//! Parser for `type; attr=value; ...` header value syntax.
//!
//! This is the shared grammar behind `Content-Disposition` and
//! `Content-Type` values: a type token, followed by `;`-separated
//! attributes whose values are tokens, quoted strings with `\X` escapes, or
//! RFC 5987 extended values (`charset'lang'pct-encoded`).
//!
//! Results are delivered through the [`ParamVisitor`] callbacks, so callers
//! extract only the attributes they care about without an intermediate map.
//! A syntactic dead end (unterminated quote, missing `'` delimiter) stops
//! the walk without an error; attributes parsed before it remain delivered.

use encoding_rs::Encoding;

/// Callbacks receiving the pieces of a parsed header value.
///
/// All hooks have defaults, so an implementation only overrides what it
/// consumes. `visit_attribute` gates value delivery: returning `false`
/// still parses the value (the walk must advance) but suppresses the
/// `visit_attribute_value` call.
pub trait ParamVisitor {
    /// Called once with the portion before the first `;`, trimmed.
    fn visit_type(&mut self, ty: &str) {
        let _ = ty;
    }

    /// Decides whether the value of `key` is wanted.
    fn visit_attribute(&mut self, key: &str) -> bool {
        let _ = key;
        true
    }

    /// Called with the parsed value of a wanted attribute.
    fn visit_attribute_value(&mut self, key: &str, value: &str) {
        let _ = (key, value);
    }

    /// Whether a key ending in `*` is treated as an RFC 5987 extended
    /// attribute. The trailing `*` is stripped before the other callbacks.
    fn decode_extended_attribute(&self, key: &str) -> bool {
        let _ = key;
        false
    }
}

enum Extended {
    Value(String),
    UnknownCharset,
    Malformed,
}

/// Walks `input` and delivers its pieces to `visitor`.
pub fn parse_parameters<V>(input: &str, visitor: &mut V)
where
    V: ParamVisitor + ?Sized,
{
    let bytes = input.as_bytes();
    let type_end = memchr::memchr(b';', bytes).unwrap_or(bytes.len());
    visitor.visit_type(input[..type_end].trim());

    let mut pos = type_end;
    while pos < bytes.len() {
        pos += 1; // step over ';'
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let rest = &bytes[pos..];
        let Some(eq) = memchr::memchr(b'=', rest) else { break };
        if memchr::memchr(b';', &rest[..eq]).is_some() {
            // attribute without a value
            break;
        }
        let key_raw = input[pos..pos + eq].trim_end();
        let value_start = pos + eq + 1;

        let extended = key_raw.ends_with('*') && visitor.decode_extended_attribute(key_raw);
        let key = if extended { &key_raw[..key_raw.len() - 1] } else { key_raw };
        let want = visitor.visit_attribute(key);

        if extended {
            let end = memchr::memchr(b';', &bytes[value_start..]).map_or(bytes.len(), |r| value_start + r);
            match decode_extended_value(&input[value_start..end]) {
                Extended::Value(value) => {
                    if want {
                        visitor.visit_attribute_value(key, &value);
                    }
                }
                Extended::UnknownCharset => {} // skip this attribute silently
                Extended::Malformed => break,
            }
            pos = end;
        } else if bytes.get(value_start) == Some(&b'"') {
            let tail = &input[value_start + 1..];
            let mut value = String::new();
            let mut escaped = false;
            let mut closing = None;
            for (i, ch) in tail.char_indices() {
                if escaped {
                    value.push(ch);
                    escaped = false;
                    continue;
                }
                match ch {
                    '\\' => escaped = true,
                    '"' => {
                        closing = Some(i);
                        break;
                    }
                    other => value.push(other),
                }
            }
            let Some(closing) = closing else { break }; // unterminated quote
            if want {
                visitor.visit_attribute_value(key, &value);
            }
            let after = value_start + 1 + closing + 1;
            pos = memchr::memchr(b';', &bytes[after..]).map_or(bytes.len(), |r| after + r);
        } else {
            let end = memchr::memchr(b';', &bytes[value_start..]).map_or(bytes.len(), |r| value_start + r);
            let value = input[value_start..end].trim();
            if want {
                visitor.visit_attribute_value(key, value);
            }
            pos = end;
        }
    }
}

/// Decodes `charset'lang'pct-encoded`. An empty charset defaults to UTF-8;
/// the language tag is ignored.
fn decode_extended_value(raw: &str) -> Extended {
    let Some(q1) = raw.find('\'') else {
        return Extended::Malformed;
    };
    let Some(q2) = raw[q1 + 1..].find('\'').map(|r| q1 + 1 + r) else {
        return Extended::Malformed;
    };

    let label = raw[..q1].trim();
    let encoding = if label.is_empty() { Some(encoding_rs::UTF_8) } else { Encoding::for_label(label.as_bytes()) };
    let Some(encoding) = encoding else {
        return Extended::UnknownCharset;
    };

    let bytes = percent_decode(&raw[q2 + 1..]);
    let (text, _, _) = encoding.decode(&bytes);
    Extended::Value(text.into_owned())
}

fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Recorder {
        ty: Option<String>,
        attributes: Vec<(String, String)>,
        extended: bool,
    }

    impl ParamVisitor for Recorder {
        fn visit_type(&mut self, ty: &str) {
            self.ty = Some(ty.to_string());
        }

        fn visit_attribute_value(&mut self, key: &str, value: &str) {
            self.attributes.push((key.to_string(), value.to_string()));
        }

        fn decode_extended_attribute(&self, key: &str) -> bool {
            self.extended && key.ends_with('*')
        }
    }

    fn parse(input: &str) -> Recorder {
        let mut recorder = Recorder::default();
        parse_parameters(input, &mut recorder);
        recorder
    }

    fn parse_extended(input: &str) -> Recorder {
        let mut recorder = Recorder { extended: true, ..Default::default() };
        parse_parameters(input, &mut recorder);
        recorder
    }

    #[test]
    fn type_only() {
        let r = parse("text/plain");
        assert_eq!(r.ty.as_deref(), Some("text/plain"));
        assert!(r.attributes.is_empty());
    }

    #[test]
    fn token_attributes() {
        let r = parse("multipart/mixed; boundary=abc; charset=utf-8");
        assert_eq!(r.ty.as_deref(), Some("multipart/mixed"));
        assert_eq!(
            r.attributes,
            vec![("boundary".to_string(), "abc".to_string()), ("charset".to_string(), "utf-8".to_string())]
        );
    }

    #[test]
    fn quoted_with_escapes() {
        let r = parse(r#"foo; att1="va\"l1"; att2="val2""#);
        assert_eq!(r.ty.as_deref(), Some("foo"));
        assert_eq!(
            r.attributes,
            vec![("att1".to_string(), "va\"l1".to_string()), ("att2".to_string(), "val2".to_string())]
        );
    }

    #[test]
    fn semicolon_inside_quotes_is_literal() {
        let r = parse(r#"foo; a="x;y"; b=z"#);
        assert_eq!(r.attributes, vec![("a".to_string(), "x;y".to_string()), ("b".to_string(), "z".to_string())]);
    }

    #[test]
    fn extended_value_utf8() {
        let r = parse_extended("form-data; filename*=UTF-8''%C3%B6");
        assert_eq!(r.attributes, vec![("filename".to_string(), "ö".to_string())]);
    }

    #[test]
    fn extended_value_default_charset() {
        let r = parse_extended("form-data; filename*=''%C3%B6");
        assert_eq!(r.attributes, vec![("filename".to_string(), "ö".to_string())]);
    }

    #[test]
    fn extended_value_with_language_tag() {
        let r = parse_extended("form-data; filename*=UTF-8'en'a%20b");
        assert_eq!(r.attributes, vec![("filename".to_string(), "a b".to_string())]);
    }

    #[test]
    fn extended_unknown_charset_skipped() {
        let r = parse_extended("form-data; filename*=bogus-charset''x; name=\"a\"");
        // the broken attribute is skipped, the following one still parses
        assert_eq!(r.attributes, vec![("name".to_string(), "a".to_string())]);
    }

    #[test]
    fn extended_without_flag_is_plain_key() {
        let r = parse("form-data; filename*=UTF-8''%C3%B6");
        assert_eq!(r.attributes, vec![("filename*".to_string(), "UTF-8''%C3%B6".to_string())]);
    }

    #[test]
    fn unterminated_quote_keeps_earlier_attributes() {
        let r = parse(r#"foo; a="x"; b="unterminated"#);
        assert_eq!(r.attributes, vec![("a".to_string(), "x".to_string())]);
    }

    #[test]
    fn missing_extended_quote_keeps_earlier_attributes() {
        let r = parse_extended("foo; a=x; b*=UTF-8-no-quotes");
        assert_eq!(r.attributes, vec![("a".to_string(), "x".to_string())]);
    }

    #[test]
    fn unwanted_attribute_is_skipped_but_walk_continues() {
        struct OnlyB {
            values: Vec<(String, String)>,
        }
        impl ParamVisitor for OnlyB {
            fn visit_attribute(&mut self, key: &str) -> bool {
                key == "b"
            }
            fn visit_attribute_value(&mut self, key: &str, value: &str) {
                self.values.push((key.to_string(), value.to_string()));
            }
        }

        let mut visitor = OnlyB { values: Vec::new() };
        parse_parameters(r#"foo; a="skip me"; b=keep"#, &mut visitor);
        assert_eq!(visitor.values, vec![("b".to_string(), "keep".to_string())]);
    }

    proptest! {
        // values without special characters survive parsing unchanged,
        // quoted or not
        #[test]
        fn value_round_trip(value in "[A-Za-z0-9._-]{1,24}") {
            let token = parse(&format!("foo; a={value}"));
            prop_assert_eq!(&token.attributes, &vec![("a".to_string(), value.clone())]);

            let quoted = parse(&format!("foo; a=\"{value}\""));
            prop_assert_eq!(&quoted.attributes, &vec![("a".to_string(), value)]);
        }
    }
}
