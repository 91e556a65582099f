//! Part header line handling.
//!
//! Splits one header line into name and value, and interprets the values of
//! the headers that steer decoding: `Content-Transfer-Encoding` (implied
//! part charset) and `Content-Type` (nested `multipart/mixed` boundary or an
//! explicit part charset). Everything else passes through to the caller
//! untouched.

use crate::codec::params::{ParamVisitor, parse_parameters};
use crate::ensure;
use crate::protocol::ParseError;
use encoding_rs::Encoding;

/// Splits a header line into `(name, value)`.
///
/// The name runs up to the first `:` or whitespace; the value is everything
/// after the `:`, trimmed of surrounding whitespace. An empty value is
/// allowed; a line without a `:` is not.
pub(crate) fn split_header_line(line: &str) -> Result<(String, String), ParseError> {
    let name_end = line
        .bytes()
        .position(|b| b == b':' || b.is_ascii_whitespace())
        .ok_or_else(|| ParseError::invalid_header("header line has no value"))?;
    ensure!(name_end > 0, ParseError::invalid_header("empty header name"));

    let colon = line[name_end..]
        .find(':')
        .ok_or_else(|| ParseError::invalid_header("header line has no ':'"))?;
    let value = line[name_end + colon + 1..].trim();

    Ok((line[..name_end].to_string(), value.to_string()))
}

/// The part charset implied by a `Content-Transfer-Encoding` value.
///
/// `binary` implies no charset at all, hence the nested option.
pub(crate) fn transfer_encoding_charset(value: &str) -> Result<Option<&'static Encoding>, ParseError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("7bit") {
        Ok(Encoding::for_label(b"us-ascii"))
    } else if value.eq_ignore_ascii_case("8bit") {
        Ok(Encoding::for_label(b"iso-8859-1"))
    } else if value.eq_ignore_ascii_case("binary") {
        Ok(None)
    } else {
        Err(ParseError::unknown_transfer_encoding(value))
    }
}

/// What a `Content-Type` header value asks of the decoder.
#[derive(Debug, Default)]
pub(crate) struct ContentTypeDirective {
    /// The type token is `multipart/mixed`
    pub(crate) is_mixed: bool,
    /// The `boundary=` token, without the leading dashes
    pub(crate) boundary: Option<String>,
    /// A resolved `charset=` attribute
    pub(crate) charset: Option<&'static Encoding>,
    /// A `charset=` label that did not resolve
    pub(crate) invalid_charset: Option<String>,
}

/// Extracts the decoding directives from a `Content-Type` value.
///
/// A value with only a type token and no parameters is fine; the directive
/// is simply empty.
pub(crate) fn parse_content_type(value: &str) -> ContentTypeDirective {
    let mut directive = ContentTypeDirective::default();
    parse_parameters(value, &mut directive);
    directive
}

impl ParamVisitor for ContentTypeDirective {
    fn visit_type(&mut self, ty: &str) {
        self.is_mixed = ty.eq_ignore_ascii_case("multipart/mixed");
    }

    fn visit_attribute(&mut self, key: &str) -> bool {
        key.eq_ignore_ascii_case("boundary") || key.eq_ignore_ascii_case("charset")
    }

    fn visit_attribute_value(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case("boundary") {
            self.boundary = Some(value.to_string());
        } else if key.eq_ignore_ascii_case("charset") {
            match Encoding::for_label(value.trim().as_bytes()) {
                Some(encoding) => self.charset = Some(encoding),
                None => self.invalid_charset = Some(value.to_string()),
            }
        }
    }
}
