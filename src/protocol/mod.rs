//! Protocol level types shared across the codec.
//!
//! This module holds the values the decoder hands to its caller:
//!
//! - [`MultipartEvent`]: the event stream produced by the state machine
//! - [`ContentDisposition`]: a parsed view over a `Content-Disposition` value
//! - [`ParseError`]: every error the decoder can surface

mod event;
pub use event::MultipartEvent;

mod disposition;
pub use disposition::ContentDisposition;

mod error;
pub use error::ParseError;
