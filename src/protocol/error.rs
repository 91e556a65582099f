//! Error types for multipart decoding.
//!
//! All errors are surfaced synchronously from `add()` or `next()`. Structural
//! errors halt decoding: once one has been returned the decoder refuses to
//! advance. Running out of buffered bytes is not an error; it is reported as
//! the `Ok(None)` arm of the decode result, with the reader offset restored.
use std::io;
use thiserror::Error;

/// Errors that occur while decoding a multipart body.
#[derive(Error, Debug)]
pub enum ParseError {
    /// An `add()` would leave more unread bytes buffered than allowed
    #[error("undecoded bytes {current_size} exceed the limit {limit}")]
    LimitExceeded { current_size: usize, limit: usize },

    /// The buffered bytes rule out a delimiter where one is required
    #[error("no delimiter found where one is required")]
    NoDelimiter,

    /// Malformed part header line
    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    /// `Content-Transfer-Encoding` value outside {7bit, 8bit, binary}
    #[error("unknown transfer encoding: {value}")]
    UnknownTransferEncoding { value: String },

    /// Charset name in a header is unresolvable
    #[error("invalid charset: {name}")]
    InvalidCharset { name: String },

    /// `multipart/mixed` inside an already mixed part
    #[error("nested multipart/mixed")]
    NestedMixed,

    /// `multipart/mixed` content type without a `boundary=` attribute
    #[error("multipart/mixed without boundary")]
    MissingBoundary,

    /// Accessor called at the wrong event
    #[error("illegal state: {reason}")]
    IllegalState { reason: String },

    /// I/O error while feeding the decoder
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    /// Creates a new LimitExceeded error
    pub fn limit_exceeded(current_size: usize, limit: usize) -> Self {
        Self::LimitExceeded { current_size, limit }
    }

    /// Creates a new InvalidHeader error
    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    /// Creates a new UnknownTransferEncoding error
    pub fn unknown_transfer_encoding<S: ToString>(str: S) -> Self {
        Self::UnknownTransferEncoding { value: str.to_string() }
    }

    /// Creates a new InvalidCharset error
    pub fn invalid_charset<S: ToString>(str: S) -> Self {
        Self::InvalidCharset { name: str.to_string() }
    }

    /// Creates a new IllegalState error
    pub fn illegal_state<S: ToString>(str: S) -> Self {
        Self::IllegalState { reason: str.to_string() }
    }
}
