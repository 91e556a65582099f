//! An incremental, pull style decoder for `multipart/form-data` (and nested
//! `multipart/mixed`) request bodies.
//!
//! Input arrives as a sequence of arbitrary byte chunks; output is a
//! deterministic stream of [`MultipartEvent`]s identifying part boundaries,
//! part headers and part payload bytes. The decoder tolerates splits at any
//! byte position: feeding one byte at a time or the whole body at once
//! produces the same events and the same content bytes.
//!
//! # Example
//!
//! ```
//! use micro_multipart::codec::MultipartDecoder;
//! use micro_multipart::protocol::MultipartEvent;
//!
//! let mut decoder = MultipartDecoder::builder().for_multipart_boundary("X");
//! decoder.add(b"--X\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhello\r\n--X--").unwrap();
//!
//! assert_eq!(decoder.next().unwrap(), Some(MultipartEvent::BeginField));
//! assert_eq!(decoder.next().unwrap(), Some(MultipartEvent::Header));
//! assert_eq!(decoder.header_name().unwrap(), "Content-Disposition");
//! assert_eq!(decoder.parsed_header_value().unwrap().unwrap().name(), Some("a"));
//! assert_eq!(decoder.next().unwrap(), Some(MultipartEvent::HeadersComplete));
//! assert_eq!(decoder.next().unwrap(), Some(MultipartEvent::Content));
//! assert_eq!(&decoder.decoded_content().unwrap()[..], b"hello");
//! assert_eq!(decoder.next().unwrap(), Some(MultipartEvent::FieldComplete));
//! assert_eq!(decoder.next().unwrap(), None);
//! ```
//!
//! [`MultipartEvent`]: protocol::MultipartEvent

pub mod codec;
pub mod protocol;

pub(crate) use help::ensure;

mod help {

    macro_rules! ensure {
        ($predicate:expr, $error:expr) => {
            if !$predicate {
                return Err($error);
            }
        };
    }
    pub(crate) use ensure;
}
