//! Byte level scanning primitives: whitespace runs, line terminators, header
//! lines and part delimiters.
//!
//! Every function here either commits a complete consume or leaves the
//! reader offset exactly where it was on entry. Running out of buffered
//! bytes mid-token is reported as `None` (or `false`), never as an error.

use crate::codec::buffer::InputBuffer;
use crate::protocol::ParseError;
use encoding_rs::Encoding;

/// How a delimiter line ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DelimiterKind {
    /// `--boundary` followed by a line terminator; a part follows
    Opening,
    /// `--boundary--`; no further parts
    Closing,
}

/// Advances the reader past ASCII control and whitespace bytes.
///
/// Returns `None` (reader restored) if the window is exhausted before a
/// non-control byte is seen.
pub(crate) fn skip_control_characters(buf: &mut InputBuffer) -> Option<()> {
    let entry = buf.reader_offset();
    while buf.readable() > 0 {
        let b = buf.get(buf.reader_offset());
        if !is_control_or_space(b) {
            return Some(());
        }
        buf.advance_reader(1);
    }
    buf.set_reader_offset(entry);
    None
}

fn is_control_or_space(b: u8) -> bool {
    b <= b' ' || b == 0x7f
}

/// Consumes exactly one line terminator, CRLF or LF.
///
/// Returns whether one was consumed. A lone CR whose LF has not arrived, or
/// a CR followed by something other than LF, consumes nothing.
pub(crate) fn skip_one_line(buf: &mut InputBuffer) -> bool {
    if buf.readable() == 0 {
        return false;
    }
    let r = buf.reader_offset();
    match buf.get(r) {
        b'\n' => {
            buf.advance_reader(1);
            true
        }
        b'\r' => {
            if buf.readable() >= 2 && buf.get(r + 1) == b'\n' {
                buf.advance_reader(2);
                true
            } else {
                false
            }
        }
        _ => false,
    }
}

/// Reads one line, decoded under `charset`, consuming its terminator.
///
/// The terminator (LF or CRLF) is excluded from the returned text. Returns
/// `None` (reader restored) while no full line is buffered.
pub(crate) fn read_line(buf: &mut InputBuffer, charset: &'static Encoding) -> Option<String> {
    let window = buf.window();
    let lf = memchr::memchr(b'\n', window)?;

    let end = if lf > 0 && window[lf - 1] == b'\r' { lf - 1 } else { lf };
    let (text, _, _) = charset.decode(&window[..end]);
    let line = text.into_owned();

    buf.advance_reader(lf + 1);
    Some(line)
}

/// Reads a `--boundary` delimiter anchored at the reader offset.
///
/// A mismatch within the buffered bytes is `NoDelimiter`; running out of
/// bytes before the form is decided is `Ok(None)` with the reader restored.
/// The closing form (`--boundary--`) tolerates a missing trailing line
/// terminator, which some uploaders omit on the final delimiter; the opening
/// form requires one.
pub(crate) fn read_delimiter(
    buf: &mut InputBuffer,
    delimiter: &[u8],
) -> Result<Option<DelimiterKind>, ParseError> {
    let window = buf.window();
    let n = window.len().min(delimiter.len());
    if window[..n] != delimiter[..n] {
        return Err(ParseError::NoDelimiter);
    }
    if n < delimiter.len() {
        return Ok(None);
    }

    let tail = &window[delimiter.len()..];
    match tail.first() {
        None => Ok(None),
        Some(b'-') => {
            if tail.len() < 2 {
                return Ok(None);
            }
            if tail[1] != b'-' {
                return Err(ParseError::NoDelimiter);
            }
            buf.advance_reader(delimiter.len() + 2);
            skip_one_line(buf);
            Ok(Some(DelimiterKind::Closing))
        }
        Some(b'\n') => {
            buf.advance_reader(delimiter.len() + 1);
            Ok(Some(DelimiterKind::Opening))
        }
        Some(b'\r') => {
            if tail.len() < 2 {
                return Ok(None);
            }
            if tail[1] != b'\n' {
                return Err(ParseError::NoDelimiter);
            }
            buf.advance_reader(delimiter.len() + 2);
            Ok(Some(DelimiterKind::Opening))
        }
        Some(_) => Err(ParseError::NoDelimiter),
    }
}
