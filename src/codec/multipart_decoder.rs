//! The multipart state machine and its pull interface.
//!
//! [`MultipartDecoder`] is a pull parser: the caller alternates `add(chunk)`
//! with `next()` and reads event data through the accessors. It never
//! blocks and never spawns work; `Ok(None)` from `next()` hands control
//! back to the caller to supply more bytes.
//!
//! # State machine
//!
//! ```text
//! start → HeaderDelimiter
//! HeaderDelimiter  --opening delimiter--> Disposition   (emit BeginField)
//! HeaderDelimiter  --closing delimiter--> PreEpilogue   (no event)
//! Disposition      --blank line-->        Content       (emit HeadersComplete)
//! Disposition      --header line-->       Disposition   (emit Header)
//! Content          --delimiter found-->   ContentDone   (emit Content if residual bytes)
//! Content          --more data pending--> Content       (emit Content when bytes available)
//! ContentDone      --always-->            HeaderDelimiter (emit FieldComplete)
//! PreEpilogue      --always-->            PreEpilogue   (next() returns None)
//! ```
//!
//! A part may switch the decoder into a nested `multipart/mixed` context via
//! its `Content-Type` header; the nested boundary then becomes the active
//! delimiter until its closing form pops back to the top-level one.

use crate::codec::buffer::InputBuffer;
use crate::codec::content_scanner::{ScanOutcome, scan_content};
use crate::codec::header;
use crate::codec::scan::{self, DelimiterKind};
use crate::ensure;
use crate::protocol::{ContentDisposition, MultipartEvent, ParseError};
use bytes::{Bytes, BytesMut};
use encoding_rs::{Encoding, UTF_8};
use tokio_util::codec::Decoder;
use tracing::trace;

/// Default bound on buffered unread bytes.
pub const DEFAULT_UNDECODED_LIMIT: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting the next opening or closing delimiter
    HeaderDelimiter,
    /// Reading part header lines up to the blank line
    Disposition,
    /// Streaming payload bytes while searching for the trailing delimiter
    Content,
    /// Delimiter located; the part is about to complete
    ContentDone,
    /// The closing top-level delimiter was consumed; nothing follows
    PreEpilogue,
}

/// An incremental pull decoder for one `multipart/form-data` body.
///
/// Built via [`MultipartDecoder::builder`]. The caller feeds chunks with
/// [`add`](Self::add) and drives decoding with [`next`](Self::next); the
/// accessors are valid only immediately after the matching event:
///
/// | event | accessors |
/// |---|---|
/// | `Header` | [`header_name`](Self::header_name), [`header_value`](Self::header_value), [`parsed_header_value`](Self::parsed_header_value) |
/// | `Content` | [`decoded_content`](Self::decoded_content), at most once |
///
/// The decoder also implements [`tokio_util::codec::Decoder`], so it can be
/// driven by a `FramedRead`; the adapter moves only as many bytes into the
/// bounded window as fit under the undecoded limit and leaves the rest in
/// the framed buffer.
#[derive(Debug)]
pub struct MultipartDecoder {
    charset: &'static Encoding,
    delimiter: Vec<u8>,
    mixed_delimiter: Option<Vec<u8>>,
    buffer: InputBuffer,
    state: State,
    part_charset: Option<&'static Encoding>,
    received_length: u64,
    header: Option<(String, String)>,
    pending_content: Option<Bytes>,
    last_event: Option<MultipartEvent>,
    closed: bool,
    failed: bool,
}

impl MultipartDecoder {
    /// Creates a builder with the default charset and undecoded limit.
    pub fn builder() -> MultipartDecoderBuilder {
        MultipartDecoderBuilder::new()
    }

    /// Appends a chunk of body bytes to the decoder's window.
    ///
    /// # Errors
    ///
    /// `LimitExceeded` if the chunk would leave more than the configured
    /// undecoded limit buffered; the chunk is dropped and already buffered
    /// bytes stay decodable.
    pub fn add(&mut self, chunk: &[u8]) -> Result<(), ParseError> {
        ensure!(!self.closed, ParseError::illegal_state("decoder is closed"));
        self.buffer.add(chunk)
    }

    /// Advances the state machine by at most one event.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` when an event was decided
    /// - `Ok(None)` when more bytes are needed (or decoding is finished)
    /// - `Err(_)` on a structural error; the decoder will not advance past it
    pub fn next(&mut self) -> Result<Option<MultipartEvent>, ParseError> {
        // event data from the previous call expires now
        self.last_event = None;
        self.header = None;
        self.pending_content = None;

        if self.closed || self.state == State::PreEpilogue {
            return Ok(None);
        }
        ensure!(!self.failed, ParseError::illegal_state("decoder already failed"));

        match self.step() {
            Ok(event) => {
                self.last_event = event;
                Ok(event)
            }
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    /// The name of the current part header.
    ///
    /// # Errors
    ///
    /// `IllegalState` unless the last event was `Header`.
    pub fn header_name(&self) -> Result<&str, ParseError> {
        self.current_header().map(|(name, _)| name)
    }

    /// The raw value of the current part header.
    ///
    /// # Errors
    ///
    /// `IllegalState` unless the last event was `Header`.
    pub fn header_value(&self) -> Result<&str, ParseError> {
        self.current_header().map(|(_, value)| value)
    }

    /// A parsed view over the current header, when it is
    /// `Content-Disposition`.
    ///
    /// Parsing is idempotent: calling this repeatedly on the same header
    /// yields equal values.
    ///
    /// # Errors
    ///
    /// `IllegalState` unless the last event was `Header`.
    pub fn parsed_header_value(&self) -> Result<Option<ContentDisposition>, ParseError> {
        let (name, value) = self.current_header()?;
        if name.eq_ignore_ascii_case("content-disposition") {
            Ok(Some(ContentDisposition::parse(value)))
        } else {
            Ok(None)
        }
    }

    fn current_header(&self) -> Result<(&str, &str), ParseError> {
        if self.last_event != Some(MultipartEvent::Header) {
            return Err(ParseError::illegal_state("not positioned on a header"));
        }
        let (name, value) = self.header.as_ref().ok_or_else(|| ParseError::illegal_state("no header available"))?;
        Ok((name, value))
    }

    /// Takes ownership of the payload slice of the current `Content` event.
    ///
    /// Only the identity `Content-Transfer-Encoding` is supported, so the
    /// decoded bytes equal the bytes on the wire.
    ///
    /// # Errors
    ///
    /// `IllegalState` unless the last event was `Content`, or when the slice
    /// was already taken.
    pub fn decoded_content(&mut self) -> Result<Bytes, ParseError> {
        ensure!(
            self.last_event == Some(MultipartEvent::Content),
            ParseError::illegal_state("not positioned on content")
        );
        self.pending_content.take().ok_or_else(|| ParseError::illegal_state("content already taken"))
    }

    /// The charset recorded for the current part, if any.
    ///
    /// Set by an explicit `charset=` on the part's `Content-Type`, possibly
    /// replaced by the charset a `Content-Transfer-Encoding` implies.
    pub fn part_charset(&self) -> Option<&'static Encoding> {
        self.part_charset
    }

    /// Releases all buffered bytes and any pending payload slice. The
    /// decoder is unusable afterwards: `add` fails and `next` returns
    /// `None`.
    pub fn close(&mut self) {
        self.buffer.release();
        self.pending_content = None;
        self.header = None;
        self.last_event = None;
        self.closed = true;
    }

    pub(crate) fn window_room(&self) -> usize {
        self.buffer.room()
    }

    fn active_delimiter(&self) -> &[u8] {
        self.mixed_delimiter.as_deref().unwrap_or(self.delimiter.as_slice())
    }

    fn step(&mut self) -> Result<Option<MultipartEvent>, ParseError> {
        loop {
            match self.state {
                State::HeaderDelimiter => {
                    if scan::skip_control_characters(&mut self.buffer).is_none() {
                        return Ok(None);
                    }
                    let delimiter = self.mixed_delimiter.as_deref().unwrap_or(self.delimiter.as_slice());
                    match scan::read_delimiter(&mut self.buffer, delimiter)? {
                        None => return Ok(None),
                        Some(DelimiterKind::Opening) => {
                            trace!("part opened");
                            self.state = State::Disposition;
                            self.part_charset = None;
                            self.received_length = 0;
                            return Ok(Some(MultipartEvent::BeginField));
                        }
                        Some(DelimiterKind::Closing) => {
                            if self.mixed_delimiter.take().is_some() {
                                trace!("mixed multipart closed");
                                // the top-level delimiter is expected next
                                continue;
                            }
                            trace!("multipart closed");
                            self.state = State::PreEpilogue;
                            return Ok(None);
                        }
                    }
                }

                State::Disposition => {
                    let Some(line) = scan::read_line(&mut self.buffer, self.charset) else {
                        return Ok(None);
                    };
                    if line.is_empty() {
                        self.state = State::Content;
                        return Ok(Some(MultipartEvent::HeadersComplete));
                    }
                    let (name, value) = header::split_header_line(&line)?;
                    self.apply_header(&name, &value)?;
                    trace!(name = %name, "read part header");
                    self.header = Some((name, value));
                    return Ok(Some(MultipartEvent::Header));
                }

                State::Content => {
                    let outcome =
                        scan_content(self.buffer.window(), self.active_delimiter(), self.received_length > 0);
                    match outcome {
                        ScanOutcome::DelimiterFound { payload_len } => {
                            self.state = State::ContentDone;
                            if payload_len > 0 {
                                return Ok(Some(self.emit_content(payload_len)));
                            }
                        }
                        ScanOutcome::NeedMoreData { safe_len } => {
                            if safe_len == 0 {
                                return Ok(None);
                            }
                            return Ok(Some(self.emit_content(safe_len)));
                        }
                    }
                }

                State::ContentDone => {
                    self.state = State::HeaderDelimiter;
                    return Ok(Some(MultipartEvent::FieldComplete));
                }

                State::PreEpilogue => return Ok(None),
            }
        }
    }

    fn emit_content(&mut self, len: usize) -> MultipartEvent {
        let bytes = self.buffer.read_split(len);
        trace!(len, "read payload bytes");
        self.received_length += bytes.len() as u64;
        self.pending_content = Some(bytes);
        MultipartEvent::Content
    }

    fn apply_header(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        if name.eq_ignore_ascii_case("content-transfer-encoding") {
            let implied = header::transfer_encoding_charset(value)?;
            // the implied charset only replaces an explicit one
            if self.part_charset.is_some() {
                self.part_charset = implied;
            }
        } else if name.eq_ignore_ascii_case("content-type") {
            let directive = header::parse_content_type(value);
            if directive.is_mixed {
                ensure!(self.mixed_delimiter.is_none(), ParseError::NestedMixed);
                let boundary = directive.boundary.ok_or(ParseError::MissingBoundary)?;
                self.mixed_delimiter = Some(format!("--{boundary}").into_bytes());
            } else {
                if let Some(label) = directive.invalid_charset {
                    return Err(ParseError::invalid_charset(label));
                }
                if let Some(encoding) = directive.charset {
                    self.part_charset = Some(encoding);
                }
            }
        }
        Ok(())
    }
}

/// Feeding a `FramedRead`: bytes move from the framed buffer into the
/// bounded window, then the state machine is stepped. Event data still goes
/// through the decoder's accessors (`FramedRead::decoder_mut`).
impl Decoder for MultipartDecoder {
    type Item = MultipartEvent;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !src.is_empty() {
            let take = src.len().min(self.window_room());
            if take > 0 {
                let chunk = src.split_to(take);
                self.add(&chunk)?;
            }
        }
        self.next()
    }
}

/// Builder for [`MultipartDecoder`].
#[derive(Debug, Clone)]
pub struct MultipartDecoderBuilder {
    charset: &'static Encoding,
    undecoded_limit: usize,
}

impl MultipartDecoderBuilder {
    pub fn new() -> Self {
        Self { charset: UTF_8, undecoded_limit: DEFAULT_UNDECODED_LIMIT }
    }

    /// The charset used to decode header lines. Defaults to UTF-8.
    pub fn charset(mut self, charset: &'static Encoding) -> Self {
        self.charset = charset;
        self
    }

    /// The maximum number of buffered unread bytes. Defaults to
    /// [`DEFAULT_UNDECODED_LIMIT`].
    pub fn undecoded_limit(mut self, limit: usize) -> Self {
        self.undecoded_limit = limit;
        self
    }

    /// Builds a decoder for a body framed by `boundary`, given without the
    /// two leading dashes.
    pub fn for_multipart_boundary(self, boundary: &str) -> MultipartDecoder {
        MultipartDecoder {
            charset: self.charset,
            delimiter: format!("--{boundary}").into_bytes(),
            mixed_delimiter: None,
            buffer: InputBuffer::with_limit(self.undecoded_limit),
            state: State::HeaderDelimiter,
            part_charset: None,
            received_length: 0,
            header: None,
            pending_content: None,
            last_event: None,
            closed: false,
            failed: false,
        }
    }
}

impl Default for MultipartDecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
