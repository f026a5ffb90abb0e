//! The structural error taxonomy and the aggregate parse error.

/// One structural defect encountered while walking the segment stream.
///
/// These accumulate during a parse (§4.3.3); a non-empty list at end of
/// stream is raised as [`ParseError::Aggregate`]. In lenient mode, several
/// of these are downgraded to a warning instead of being recorded here —
/// see [`crate::ParserConfig`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A trailer (`IEA`/`GE`/`SE`) with no matching opener.
    #[error("{trailer} at segment {segment_index} has no matching opener")]
    MismatchSegment { trailer: String, segment_index: usize },

    /// A framing segment appeared before the segment it depends on, e.g.
    /// `GS`/`TA1` before any `ISA`.
    #[error("{segment_id} at segment {segment_index} appeared with no open parent container")]
    MissingPrecedingSegment { segment_id: String, segment_index: usize },

    /// `ST` with no open functional group.
    #[error("ST at segment {segment_index} has no open functional group")]
    MissingGsSegment { segment_index: usize },

    /// No ancestor container accepts this `HL`'s level code.
    #[error("HL {hl_id} (level {level_code}) at segment {segment_index} has no ancestor that accepts it")]
    InvalidHLoopSpecification {
        hl_id: String,
        level_code: String,
        segment_index: usize,
    },

    /// Strict-mode only: `HL02` names a parent id not yet seen in this
    /// transaction.
    #[error("HL {hl_id} at segment {segment_index} references unknown parent {parent_id}")]
    MissingParentId {
        hl_id: String,
        parent_id: String,
        segment_index: usize,
    },

    /// Duplicate `HL01` within one transaction.
    #[error("HL id {hl_id} already exists in this transaction (segment {segment_index})")]
    HLoopIdExists { hl_id: String, segment_index: usize },

    /// Strict-mode detail-placement failure: the segment fit nowhere in
    /// the loop tree between `current_container` and the transaction root.
    #[error(
        "segment {segment_id} at index {segment_index} in transaction {transaction_code}/{control_number} could not be identified; walked past {breadcrumbs:?}"
    )]
    SegmentCannotBeIdentified {
        transaction_code: String,
        control_number: String,
        segment_id: String,
        segment_index: usize,
        breadcrumbs: Vec<String>,
    },

    /// The injected [`spec::SpecificationFinder`] has no specification for
    /// this transaction set / version pair. Not part of spec.md's original
    /// taxonomy (§7) — added because the finder is a real extension seam
    /// the core must react to, not an external collaborator's concern.
    #[error("no specification for transaction set {transaction_set_identifier_code} version {version} (segment {segment_index})")]
    UnknownTransactionSpec {
        transaction_set_identifier_code: String,
        version: String,
        segment_index: usize,
    },
}

/// Top-level error from [`crate::StructuralParser::parse_multiple`].
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    /// The underlying stream could not be framed into segments at all —
    /// fatal, halts parsing immediately (spec.md §7's `MalformedHeader`/
    /// `IoError`).
    #[error(transparent)]
    Reader(#[from] reader::ReaderError),

    /// One or more structural errors were recorded during the parse.
    /// Partial trees are discarded by the caller, per spec.md §4.3.3.
    #[error("{} structural error(s) encountered", .0.len())]
    Aggregate(Vec<StructuralError>),
}
