/// An event produced by the multipart state machine.
///
/// The emitted sequence always matches
/// `(BeginField Header* HeadersComplete Content* FieldComplete)*`.
/// Events carry no data themselves; the decoder's accessors
/// (`header_name`, `header_value`, `decoded_content`) are valid immediately
/// after the matching event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipartEvent {
    /// A new part begins; its opening delimiter has been consumed
    BeginField,
    /// One part header line was read
    Header,
    /// The blank line ending the part headers was consumed
    HeadersComplete,
    /// A slice of part payload bytes is available
    Content,
    /// The current part is complete
    FieldComplete,
}

impl MultipartEvent {
    /// Returns true if this event carries a part header
    #[inline]
    pub fn is_header(&self) -> bool {
        matches!(self, MultipartEvent::Header)
    }

    /// Returns true if this event carries payload bytes
    #[inline]
    pub fn is_content(&self) -> bool {
        matches!(self, MultipartEvent::Content)
    }

    /// Returns true if this event completes a part
    #[inline]
    pub fn is_field_complete(&self) -> bool {
        matches!(self, MultipartEvent::FieldComplete)
    }
}
