#![no_std]

//! X12 segment tokenizer
//!
//! A `no_std`, zero-copy tokenizer for ANSI X12 EDI documents. It converts a
//! byte buffer into a sequence of [`Segment`]s without allocating and without
//! interpreting segment content beyond the delimiters every X12 interchange
//! declares in its `ISA` header.
//!
//! # Design philosophy
//! - Zero-copy: every [`Element`] borrows from the caller's buffer.
//! - Streaming: segments are produced one at a time from whatever buffer the
//!   caller currently has in hand; growing that buffer across reads is the
//!   caller's concern (see the `reader` crate for a `std::io::Read` wrapper).
//! - Silent on meaning: this crate does not know what `NM1` or `HL` mean. The
//!   loop-resolution engine lives in `x12-parser`, one layer up.

/// X12 delimiters extracted from the `ISA` segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    /// Element separator (ISA byte 3, typically `*`).
    pub element: u8,
    /// Component (sub-element) separator (ISA byte 104, typically `:`).
    pub subelement: u8,
    /// Segment terminator (ISA byte 105, typically `~`).
    pub segment: u8,
    /// Repetition separator (ISA11 in 5010; `^` by convention, absent in 4010).
    pub repetition: u8,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            element: b'*',
            subelement: b':',
            segment: b'~',
            repetition: b'^',
        }
    }
}

impl Delimiters {
    /// Number of bytes that make up an `ISA` segment, terminator included.
    pub const ISA_SIZE_BYTES: usize = 106;

    /// Discovers delimiters from a complete, fixed-width `ISA` header by
    /// reading the separator bytes at their fixed offsets. Returns `None` if
    /// `isa` is too short, doesn't start with `ISA`, or the three mandatory
    /// separators aren't distinct.
    ///
    /// Used directly by callers (e.g. the `reader` crate) that need
    /// delimiters without going through [`SegmentParser`]'s push-style
    /// [`SegmentHandler`] callback.
    pub fn discover(isa: &[u8]) -> Option<Self> {
        if isa.len() < Self::ISA_SIZE_BYTES || &isa[0..3] != b"ISA" {
            return None;
        }

        let element = isa[3];
        let subelement = isa[104];
        let segment = isa[105];

        if element == subelement || element == segment || subelement == segment {
            return None;
        }

        let mut delimiters = Self {
            element,
            subelement,
            segment,
            ..Self::default()
        };

        if let Some(rep) = Segment::new(b"ISA", &isa[4..105], delimiters)
            .element(11)
            .and_then(|e| e.as_bytes().first())
            .copied()
        {
            delimiters.repetition = rep;
        }

        Some(delimiters)
    }
}

/// A single element within a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    data: &'a [u8],
}

impl<'a> Element<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the element as a string, if it is valid UTF-8 (X12 is ASCII
    /// by default, so this is almost always `Some`).
    #[inline]
    pub fn as_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.data).ok()
    }

    /// Splits a composite element into its components on `separator`.
    pub fn split_components(&self, separator: u8) -> ComponentIter<'a> {
        ComponentIter {
            data: self.data,
            separator,
            pos: 0,
        }
    }
}

/// Iterator over the sub-elements of a composite [`Element`].
pub struct ComponentIter<'a> {
    data: &'a [u8],
    separator: u8,
    pos: usize,
}

impl<'a> Iterator for ComponentIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        split_next(self.data, self.separator, &mut self.pos)
    }
}

/// Iterator over the [`Element`]s of a [`Segment`], not including the
/// segment identifier.
pub struct ElementIter<'a> {
    data: &'a [u8],
    separator: u8,
    pos: usize,
}

impl<'a> Iterator for ElementIter<'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        split_next(self.data, self.separator, &mut self.pos).map(Element::new)
    }
}

/// Shared split-on-separator stepping logic for [`ComponentIter`] and
/// [`ElementIter`]. Handles trailing separators by yielding one final empty
/// slice, matching X12's convention that a trailing delimiter still denotes
/// an (empty) element.
fn split_next<'a>(data: &'a [u8], separator: u8, pos: &mut usize) -> Option<&'a [u8]> {
    if *pos > data.len() {
        return None;
    }

    let start = *pos;
    let remaining = &data[start..];

    if let Some(idx) = remaining.iter().position(|&b| b == separator) {
        *pos = start + idx + 1;
        Some(&remaining[..idx])
    } else if start < data.len() {
        *pos = data.len() + 1;
        Some(remaining)
    } else if start == data.len() && start > 0 {
        *pos = data.len() + 1;
        Some(&[])
    } else {
        None
    }
}

/// A parsed X12 segment, retaining its original elements as zero-copy slices
/// of the caller's buffer.
///
/// Element numbering matches the X12 standard: `element(0)` is the segment
/// identifier itself, `element(1)` is the first data element, and so on.
/// This avoids the off-by-one translation every reference to "CLM05-2" or
/// "ISA13" would otherwise require.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    /// Segment identifier (e.g. `ISA`, `GS`, `ST`, `HL`, `NM1`).
    pub id: &'a [u8],
    data: &'a [u8],
    /// Delimiters in effect for this segment.
    pub delimiters: Delimiters,
}

impl<'a> Segment<'a> {
    /// Builds a segment view over already-framed `id`/`data` slices.
    ///
    /// Exposed so callers that own their own buffer (e.g. a container tree
    /// re-deriving a view for serialization) can construct a [`Segment`]
    /// without re-tokenizing; [`SegmentParser`] is still the only way to
    /// frame segments out of a raw byte stream.
    pub fn new(id: &'a [u8], data: &'a [u8], delimiters: Delimiters) -> Self {
        Self {
            id,
            data,
            delimiters,
        }
    }

    #[inline]
    pub fn id_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.id).ok()
    }

    /// Iterates over the data elements (excluding the segment id).
    pub fn elements(&self) -> ElementIter<'a> {
        ElementIter {
            data: self.data,
            separator: self.delimiters.element,
            pos: 0,
        }
    }

    /// The raw element bytes following the segment id, exactly as framed
    /// (no terminator, id's element separator not included). Lets a caller
    /// that owns a copy of this data reconstruct an equivalent `Segment`
    /// later via [`Segment::new`], e.g. for storage in a container tree.
    #[inline]
    pub fn elements_raw(&self) -> &'a [u8] {
        self.data
    }

    /// Returns element `n` using X12 numbering (`element(0)` is the segment
    /// id; `element(1)` is the first data element).
    #[inline]
    pub fn element(&self, element_number: usize) -> Option<Element<'a>> {
        match element_number {
            0 => Some(Element::new(self.id)),
            n => self.elements().nth(n - 1),
        }
    }

    /// Returns the required element at `n`, or `MissingRequiredElement` if it
    /// is absent or empty.
    pub fn required_element(&self, element_number: usize) -> Result<Element<'a>, SegmentError> {
        match self.element(element_number) {
            Some(elem) if !elem.is_empty() => Ok(elem),
            _ => Err(SegmentError::MissingRequiredElement),
        }
    }

    /// Total element count, including the segment id as element 0.
    pub fn element_count(&self) -> usize {
        self.elements().count() + 1
    }

    /// Splits a raw, terminator-stripped segment string (as returned by
    /// `reader::StreamReader::read_next_segment`) into a [`Segment`] view,
    /// without re-deriving delimiters.
    ///
    /// Shared by anything that reads whole segment strings out of a buffer
    /// it doesn't own long enough to hold onto a borrowed id/data split by
    /// hand — `x12-parser`'s run loop is the first such caller.
    pub fn tokenize(raw: &'a [u8], delimiters: Delimiters) -> Self {
        let id_end = raw
            .iter()
            .position(|&b| b == delimiters.element)
            .unwrap_or(raw.len());
        let id = &raw[..id_end];
        let data = if id_end < raw.len() {
            &raw[id_end + 1..]
        } else {
            &[]
        };
        Self::new(id, data, delimiters)
    }
}

/// Non-fatal tokenizer-level errors surfaced through [`Segment`] accessors.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentError {
    #[error("required element is missing or empty")]
    MissingRequiredElement,
}

/// Trait for handling tokenized segments as they are produced.
///
/// Implementations should accumulate validation errors internally rather
/// than returning `Err` for them — reserve `Err(Halt)` for catastrophic
/// conditions that make it impossible to continue (corrupted structure,
/// handler-side resource exhaustion). This lets a single pass collect every
/// error in a document instead of stopping at the first one.
pub trait SegmentHandler {
    fn handle(&mut self, segment: &Segment) -> Result<(), Halt>;
}

/// A catastrophic, unrecoverable tokenizing error.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{message}")]
pub struct Halt {
    pub message: &'static str,
}

impl Halt {
    #[inline]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Errors from [`SegmentParser::parse_segments`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentParserError {
    /// The buffer does not contain a complete segment yet. Not an error in
    /// the streaming sense — the caller should read more data and retry.
    #[error("incomplete segment, need more data")]
    Incomplete,
    /// Parsing cannot continue: invalid structure, or the handler itself
    /// requested a halt.
    #[error("{0}")]
    Halt(#[from] Halt),
}

/// Tokenizer state.
///
/// `Initial` waits for the fixed-width `ISA` header to discover delimiters;
/// `Processing` tokenizes regular delimiter-terminated segments using those
/// delimiters.
pub enum SegmentParser {
    Initial,
    Processing(Delimiters),
}

impl SegmentParser {
    pub fn init() -> Self {
        Self::Initial
    }

    const ISA_SIZE_BYTES: usize = Delimiters::ISA_SIZE_BYTES;

    /// Skips leading `\r`/`\n` bytes, advancing `buffer` and returning the
    /// count skipped. X12 does not mandate newlines between segments, but
    /// real-world interchanges commonly add them after the terminator for
    /// human readability.
    fn skip_lf_crlf(buffer: &mut &[u8]) -> usize {
        let skipped = buffer
            .iter()
            .take_while(|&&b| b == b'\r' || b == b'\n')
            .count();
        *buffer = &buffer[skipped..];
        skipped
    }

    /// Tokenizes every complete segment currently available in `buffer`,
    /// invoking `handler` for each. Returns the number of bytes consumed.
    ///
    /// An incomplete trailing segment is left unconsumed rather than being
    /// treated as an error, as long as at least one segment was parsed from
    /// this call; the caller is expected to append more data and call again.
    pub fn parse_segments<H: SegmentHandler>(
        &mut self,
        mut buffer: &[u8],
        handler: &mut H,
    ) -> Result<usize, SegmentParserError> {
        let mut total_bytes_parsed = 0;

        total_bytes_parsed += Self::skip_lf_crlf(&mut buffer);

        while !buffer.is_empty() {
            total_bytes_parsed += match self {
                SegmentParser::Initial => {
                    let (bytes_parsed, delimiters) =
                        Self::parse_isa_segment(&mut buffer, handler)?;
                    *self = SegmentParser::Processing(delimiters);
                    bytes_parsed
                }
                SegmentParser::Processing(delimiters) => {
                    match Self::parse_regular_segment(&mut buffer, handler, *delimiters) {
                        Ok(consumed) => consumed,
                        Err(SegmentParserError::Incomplete) if total_bytes_parsed > 0 => break,
                        Err(e) => return Err(e),
                    }
                }
            };

            total_bytes_parsed += Self::skip_lf_crlf(&mut buffer);
        }

        Ok(total_bytes_parsed)
    }

    /// Parses the fixed-width `ISA` header and discovers delimiters from it.
    fn parse_isa_segment<H: SegmentHandler>(
        buffer: &mut &[u8],
        handler: &mut H,
    ) -> Result<(usize, Delimiters), SegmentParserError> {
        if buffer.len() < Self::ISA_SIZE_BYTES {
            return Err(SegmentParserError::Incomplete);
        }

        if &buffer[0..3] != b"ISA" {
            return Err(Halt::new("invalid ISA header: first three bytes must be 'ISA'").into());
        }

        let delimiters = Delimiters::discover(&buffer[..Self::ISA_SIZE_BYTES])
            .ok_or_else(|| Halt::new("ISA delimiters must be three distinct bytes"))?;

        let data = &buffer[4..105];
        handler.handle(&Segment::new(b"ISA", data, delimiters))?;
        *buffer = &buffer[Self::ISA_SIZE_BYTES..];
        Ok((Self::ISA_SIZE_BYTES, delimiters))
    }

    /// Parses one delimiter-terminated segment.
    fn parse_regular_segment<H: SegmentHandler>(
        buffer: &mut &[u8],
        handler: &mut H,
        delimiters: Delimiters,
    ) -> Result<usize, SegmentParserError> {
        let segment_end = buffer
            .iter()
            .position(|&b| b == delimiters.segment)
            .ok_or(SegmentParserError::Incomplete)?;

        let segment_data = &buffer[..segment_end];

        let id_end = segment_data
            .iter()
            .position(|&b| b == delimiters.element)
            .unwrap_or(segment_data.len());

        if id_end == 0 {
            return Err(Halt::new("segment ID cannot be empty").into());
        }

        let segment_id = &segment_data[..id_end];
        let elements_data = if id_end < segment_data.len() {
            &segment_data[id_end + 1..]
        } else {
            &[]
        };

        let segment = Segment::new(segment_id, elements_data, delimiters);
        handler.handle(&segment)?;

        let consumed = segment_end + 1;
        *buffer = &buffer[consumed..];
        Ok(consumed)
    }
}

impl Default for SegmentParser {
    fn default() -> Self {
        Self::init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingHandler {
        count: usize,
    }

    impl SegmentHandler for CountingHandler {
        fn handle(&mut self, _segment: &Segment) -> Result<(), Halt> {
            self.count += 1;
            Ok(())
        }
    }

    #[test]
    fn parses_isa_and_discovers_delimiters() {
        let data = b"ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *231213*1430*^*00501*000000001*0*P*:~";

        let mut parser = SegmentParser::init();
        let mut handler = CountingHandler { count: 0 };

        let consumed = parser.parse_segments(data, &mut handler).unwrap();
        assert_eq!(consumed, data.len());
        assert_eq!(handler.count, 1);
    }

    #[test]
    fn incomplete_isa_is_not_an_error_until_flushed() {
        let data = b"ISA*00*          *00*";
        let mut parser = SegmentParser::init();
        let mut handler = CountingHandler { count: 0 };

        let result = parser.parse_segments(data, &mut handler);
        assert_eq!(result, Err(SegmentParserError::Incomplete));
    }

    #[test]
    fn element_zero_is_the_segment_id() {
        let data = b"ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *231213*1430*^*00501*000000001*0*P*:~NM1*41*2*ACME~";

        struct Capture(Option<([u8; 3], usize)>);
        impl SegmentHandler for Capture {
            fn handle(&mut self, segment: &Segment) -> Result<(), Halt> {
                if segment.id == b"NM1" {
                    let mut id = [0u8; 3];
                    id.copy_from_slice(segment.id);
                    self.0 = Some((id, segment.element_count()));
                }
                Ok(())
            }
        }

        let mut parser = SegmentParser::init();
        let mut capture = Capture(None);
        parser.parse_segments(data, &mut capture).unwrap();

        let (id, count) = capture.0.unwrap();
        assert_eq!(&id, b"NM1");
        // NM1*41*2*ACME -> 3 data elements plus the id itself
        assert_eq!(count, 4);
    }

    #[test]
    fn tokenize_splits_id_from_data_on_element_separator() {
        let delimiters = Delimiters::default();
        let segment = Segment::tokenize(b"NM1*41*2*ACME", delimiters);
        assert_eq!(segment.id, b"NM1");
        assert_eq!(segment.element(1).unwrap().as_bytes(), b"41");
    }

    #[test]
    fn tokenize_handles_a_bare_segment_id_with_no_elements() {
        let delimiters = Delimiters::default();
        let segment = Segment::tokenize(b"SE", delimiters);
        assert_eq!(segment.id, b"SE");
        assert_eq!(segment.elements_raw(), b"");
    }

    #[test]
    fn split_components_handles_trailing_separator() {
        let element = Element::new(b"AA:BB:");
        let expected: [&[u8]; 3] = [b"AA", b"BB", b""];
        for (actual, expected) in element.split_components(b':').zip(expected) {
            assert_eq!(actual, expected);
        }
    }
}
