//! Pull-style framing reader for X12 EDI streams.
//!
//! Wraps any [`std::io::Read`] and turns its bytes into a sequence of
//! segment strings, discovering delimiters from the leading `ISA` header.
//! This is the std half of the tokenizing boundary: [`segment`] frames
//! segments out of a buffer the caller already holds; `StreamReader` owns
//! the buffer and grows it as the underlying stream is read, the way
//! `x12-host`'s chunked file parser used to before that buffer-growth logic
//! moved here.

use std::io::Read;

use segment::Delimiters;

/// Errors produced while framing segments from the underlying stream.
#[derive(thiserror::Error, Debug)]
pub enum ReaderError {
    /// The stream is shorter than 106 bytes, or its first three bytes
    /// aren't `ISA`, or the three separator bytes in the header coincide.
    #[error("malformed ISA header")]
    MalformedHeader,
    /// The stream produced zero bytes before EOF. Distinct from
    /// [`ReaderError::MalformedHeader`] so callers can treat "nothing to
    /// parse" as an empty result rather than a syntax error.
    #[error("stream is empty")]
    EmptyStream,
    /// The underlying stream could not be read.
    #[error("I/O error reading X12 stream: {0}")]
    Io(#[from] std::io::Error),
    /// The buffer grew to `max_buffer_size` without finding a segment
    /// terminator.
    #[error("segment exceeds the configured maximum buffer size ({0} bytes)")]
    BufferExhausted(usize),
    /// The stream ended with unterminated trailing bytes still buffered.
    #[error("stream ended mid-segment with {0} unterminated byte(s) buffered")]
    TruncatedStream(usize),
}

/// Tunables for the reader's internal growable buffer.
///
/// Mirrors the knobs `x12-host` used to expose on `ChunkedParseConfig`.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Initial buffer size in bytes.
    pub initial_buffer_size: usize,
    /// Maximum buffer size in bytes; a single segment larger than this
    /// fails with [`ReaderError::BufferExhausted`].
    pub max_buffer_size: usize,
    /// Buffer size multiplier applied when growing (e.g. 2 for doubling).
    pub resize_multiplier: usize,
    /// Bytes skipped wherever they appear in segment content — typically
    /// the CR/LF pairs real-world interchanges add after the terminator
    /// for human readability.
    pub ignored_chars: Vec<u8>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            initial_buffer_size: 8 * 1024,
            max_buffer_size: 16 * 1024 * 1024,
            resize_multiplier: 2,
            ignored_chars: vec![b'\r', b'\n'],
        }
    }
}

/// Converts bytes from an underlying reader into a sequence of segment
/// strings, exposing the delimiters and raw `ISA` header discovered at
/// construction.
///
/// Does not interpret segment contents beyond the delimiters every X12
/// interchange declares in its header, and allocates only the string
/// handed back from each [`StreamReader::read_next_segment`] call.
pub struct StreamReader<R: Read> {
    reader: R,
    config: ReaderConfig,
    delimiters: Delimiters,
    current_isa_segment: [u8; Delimiters::ISA_SIZE_BYTES],
    buffer: Vec<u8>,
    start: usize,
    end: usize,
    exhausted: bool,
}

impl<R: Read> StreamReader<R> {
    /// Constructs a reader with the default [`ReaderConfig`].
    pub fn new(reader: R) -> Result<Self, ReaderError> {
        Self::with_config(reader, ReaderConfig::default())
    }

    /// Constructs a reader, reading and validating the first 106 bytes
    /// up front.
    pub fn with_config(reader: R, config: ReaderConfig) -> Result<Self, ReaderError> {
        let initial = config.initial_buffer_size.max(Delimiters::ISA_SIZE_BYTES);
        let mut this = Self {
            reader,
            config,
            delimiters: Delimiters::default(),
            current_isa_segment: [0u8; Delimiters::ISA_SIZE_BYTES],
            buffer: vec![0u8; initial],
            start: 0,
            end: 0,
            exhausted: false,
        };

        this.fill_to(Delimiters::ISA_SIZE_BYTES)?;
        if this.end - this.start == 0 {
            return Err(ReaderError::EmptyStream);
        }
        if this.end - this.start < Delimiters::ISA_SIZE_BYTES {
            return Err(ReaderError::MalformedHeader);
        }

        let isa_bytes = &this.buffer[this.start..this.start + Delimiters::ISA_SIZE_BYTES];
        let delimiters = Delimiters::discover(isa_bytes).ok_or(ReaderError::MalformedHeader)?;

        this.current_isa_segment.copy_from_slice(isa_bytes);
        this.delimiters = delimiters;
        this.start += Delimiters::ISA_SIZE_BYTES;

        log::debug!(
            "discovered delimiters element={} subelement={} segment={} repetition={}",
            delimiters.element as char,
            delimiters.subelement as char,
            delimiters.segment as char,
            delimiters.repetition as char,
        );

        Ok(this)
    }

    /// Delimiters discovered from the interchange header.
    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    /// The exact 106-byte `ISA` prefix the stream began with.
    pub fn current_isa_segment(&self) -> &[u8] {
        &self.current_isa_segment
    }

    /// Returns the next segment string, without its terminator, skipping
    /// any configured `ignored_chars` wherever they occur. End of stream
    /// yields `Ok(String::new())`, which callers use as loop termination.
    pub fn read_next_segment(&mut self) -> Result<String, ReaderError> {
        loop {
            if let Some(end) = self.find_terminator() {
                let raw = &self.buffer[self.start..end];
                let out: Vec<u8> = raw
                    .iter()
                    .copied()
                    .filter(|b| !self.config.ignored_chars.contains(b))
                    .collect();
                self.start = end + 1;
                return Ok(String::from_utf8_lossy(&out).into_owned());
            }

            if self.exhausted {
                let remaining = self.end - self.start;
                if remaining == 0 {
                    return Ok(String::new());
                }
                return Err(ReaderError::TruncatedStream(remaining));
            }

            self.fill_more()?;
        }
    }

    /// Returns the substring of `s` up to (but not including) the first
    /// element separator, or all of `s` if none is present.
    pub fn read_segment_id<'s>(&self, s: &'s str) -> &'s str {
        match s.as_bytes().iter().position(|&b| b == self.delimiters.element) {
            Some(idx) => &s[..idx],
            None => s,
        }
    }

    fn find_terminator(&self) -> Option<usize> {
        self.buffer[self.start..self.end]
            .iter()
            .position(|&b| b == self.delimiters.segment)
            .map(|rel| self.start + rel)
    }

    /// Ensures at least `needed` bytes are buffered from `start`, reading
    /// and growing as necessary. Used only during construction.
    fn fill_to(&mut self, needed: usize) -> Result<(), ReaderError> {
        while self.end - self.start < needed && !self.exhausted {
            self.fill_more()?;
        }
        Ok(())
    }

    /// Reads one chunk from the underlying stream, compacting or growing
    /// the buffer first if it's full. Mirrors the buffer-management loop
    /// `x12-host`'s `ChunkedParser` used before this logic moved here.
    fn fill_more(&mut self) -> Result<(), ReaderError> {
        if self.exhausted {
            return Ok(());
        }

        if self.start > 0 && (self.start > self.buffer.len() / 2 || self.end == self.buffer.len())
        {
            self.buffer.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }

        if self.end == self.buffer.len() {
            let new_size = (self.buffer.len() * self.config.resize_multiplier)
                .min(self.config.max_buffer_size);
            if new_size == self.buffer.len() {
                return Err(ReaderError::BufferExhausted(self.buffer.len()));
            }
            self.buffer.resize(new_size, 0);
        }

        let bytes_read = self.reader.read(&mut self.buffer[self.end..])?;
        if bytes_read == 0 {
            self.exhausted = true;
        } else {
            self.end += bytes_read;
        }

        Ok(())
    }
}
