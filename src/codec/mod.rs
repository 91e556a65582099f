//! Multipart codec module.
//!
//! This module provides the streaming decoder for `multipart/form-data`
//! bodies. It is organized into several components:
//!
//! - [`MultipartDecoder`]: the state machine and pull interface
//! - Input buffering via the [`buffer`] module (bounded undecoded window)
//! - Byte level scanning via the [`scan`] module (lines and delimiters)
//! - Header value parameter syntax via the [`params`] module
//!
//! # Example
//!
//! ```
//! use micro_multipart::codec::MultipartDecoder;
//!
//! let mut decoder = MultipartDecoder::builder()
//!     .undecoded_limit(8 * 1024)
//!     .for_multipart_boundary("boundary");
//!
//! decoder.add(b"--boundary\r\n").unwrap();
//! // feed more chunks, alternate with decoder.next() ...
//! ```

mod buffer;
mod content_scanner;
mod header;
mod multipart_decoder;
mod scan;

pub mod params;

pub use multipart_decoder::DEFAULT_UNDECODED_LIMIT;
pub use multipart_decoder::MultipartDecoder;
pub use multipart_decoder::MultipartDecoderBuilder;
