use crate::codec::params::{ParamVisitor, parse_parameters};

/// A parsed view over a `Content-Disposition` header value.
///
/// Produced on demand by `MultipartDecoder::parsed_header_value()`. Parsing
/// is idempotent: repeated calls on the same header yield equal values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    name: Option<String>,
    file_name: Option<String>,
}

impl ContentDisposition {
    pub(crate) fn parse(value: &str) -> Self {
        let mut collector = Collector { name: None, file_name: None };
        parse_parameters(value, &mut collector);
        Self { name: collector.name, file_name: collector.file_name }
    }

    /// The `name=` attribute, if present
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The `filename=` (or RFC 5987 `filename*=`) attribute, if present
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
}

struct Collector {
    name: Option<String>,
    file_name: Option<String>,
}

impl ParamVisitor for Collector {
    fn visit_attribute(&mut self, key: &str) -> bool {
        key.eq_ignore_ascii_case("name") || key.eq_ignore_ascii_case("filename")
    }

    fn visit_attribute_value(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case("name") {
            self.name = Some(value.to_string());
        } else if key.eq_ignore_ascii_case("filename") {
            self.file_name = Some(value.to_string());
        }
    }

    fn decode_extended_attribute(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case("filename*") || key.eq_ignore_ascii_case("name*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_data_name() {
        let parsed = ContentDisposition::parse(r#"form-data; name="a""#);
        assert_eq!(parsed.name(), Some("a"));
        assert_eq!(parsed.file_name(), None);
    }

    #[test]
    fn name_and_filename() {
        let parsed = ContentDisposition::parse(r#"form-data; name="f"; filename="a.txt""#);
        assert_eq!(parsed.name(), Some("f"));
        assert_eq!(parsed.file_name(), Some("a.txt"));
    }

    #[test]
    fn extended_filename() {
        let parsed = ContentDisposition::parse("form-data; name=\"f\"; filename*=UTF-8''%C3%B6");
        assert_eq!(parsed.name(), Some("f"));
        assert_eq!(parsed.file_name(), Some("ö"));
    }

    #[test]
    fn parse_is_idempotent() {
        let value = r#"form-data; name="f"; filename="a.txt""#;
        assert_eq!(ContentDisposition::parse(value), ContentDisposition::parse(value));
    }
}
