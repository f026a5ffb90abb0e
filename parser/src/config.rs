use std::collections::HashSet;

/// Parser-wide configuration (spec.md §6.3).
///
/// Constructed programmatically by library callers; `x12-host` is the only
/// place a CLI surface (`clap`) sits in front of these fields.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// `true` (the default): a non-empty structural error list raises
    /// [`crate::ParseError::Aggregate`] and downgradable errors are NOT
    /// downgraded. `false`: lenient mode — `MissingParentId` and
    /// `SegmentCannotBeIdentified` become warnings and the parser
    /// force-attaches the offending segment to keep going.
    pub throw_exception_on_syntax_errors: bool,
    /// Bytes silently skipped between segments, e.g. `{CR, LF}` for
    /// human-formatted interchanges. Empty by default, matching spec.md's
    /// stated default — contrast with [`reader::ReaderConfig`]'s own
    /// standalone default of stripping CR/LF, which only applies when a
    /// caller uses `reader::StreamReader` directly rather than through this
    /// parser.
    pub ignored_chars: HashSet<u8>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            throw_exception_on_syntax_errors: true,
            ignored_chars: HashSet::new(),
        }
    }
}

impl ParserConfig {
    pub(crate) fn strict(&self) -> bool {
        self.throw_exception_on_syntax_errors
    }

    pub(crate) fn reader_config(&self) -> reader::ReaderConfig {
        reader::ReaderConfig {
            ignored_chars: self.ignored_chars.iter().copied().collect(),
            ..reader::ReaderConfig::default()
        }
    }
}
