#![no_std]

//! Declarative transaction specification model.
//!
//! A [`TransactionSpecification`] names a transaction set and recursively
//! describes which segments and loops it allows, deeply enough for the
//! structural parser to decide where an incoming segment belongs. Every
//! specification here is a tree of `'static` references: nothing is
//! allocated, nothing is mutable after it's written, and a whole
//! specification can be defined as a `const`.

pub mod embedded;

/// Identifies a loop by the id its specification is keyed under (e.g.
/// `"2300"`, `"1000A"`). Distinct from the starting segment id that
/// triggers entry into the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopId(pub &'static str);

/// The `HL03` level code a [`HierarchicalLoopSpecification`] is keyed
/// under (e.g. `"20"` for a billing-provider level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelCode(pub &'static str);

/// Whether a segment must appear in a container or may be omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Mandatory,
    Optional,
}

/// A single allowed direct-child segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpecification {
    pub id: &'static str,
    pub requirement: Requirement,
}

impl SegmentSpecification {
    pub const fn mandatory(id: &'static str) -> Self {
        Self {
            id,
            requirement: Requirement::Mandatory,
        }
    }

    pub const fn optional(id: &'static str) -> Self {
        Self {
            id,
            requirement: Requirement::Optional,
        }
    }
}

/// A loop entered by a designated starting segment id.
#[derive(Debug, Clone, Copy)]
pub struct LoopSpecification {
    pub id: LoopId,
    /// The segment id that triggers entry into this loop.
    pub starting_segment: &'static str,
    pub segments: &'static [SegmentSpecification],
    pub loops: &'static [LoopSpecification],
}

/// A loop keyed by `HL03` level code rather than a starting segment id.
#[derive(Debug, Clone, Copy)]
pub struct HierarchicalLoopSpecification {
    pub level_code: LevelCode,
    pub segments: &'static [SegmentSpecification],
    pub loops: &'static [LoopSpecification],
    pub hloops: &'static [HierarchicalLoopSpecification],
}

/// Capability shared by every node that can host child loops and direct
/// segments: `Transaction`, `Loop`, and `HierarchicalLoop` specifications.
///
/// Mirrors the `LoopContainer` / `HierarchicalLoopContainer` capability
/// split used by the container tree one layer up (`tree` crate) — here it
/// is read-only data rather than a live tree, but the same "dispatch on
/// capability, not on node identity" shape applies.
pub trait LoopContainerSpec {
    fn segments(&self) -> &'static [SegmentSpecification];
    fn loops(&self) -> &'static [LoopSpecification];

    /// Whether `id` is listed as one of this container's direct segments.
    fn allows_segment(&self, id: &str) -> bool {
        self.segments().iter().any(|s| s.id == id)
    }

    /// The child loop specification whose starting segment matches `id`,
    /// if any.
    fn find_loop(&self, id: &str) -> Option<&'static LoopSpecification> {
        self.loops().iter().find(|l| l.starting_segment == id)
    }
}

/// Capability for containers that accept `HL` children filtered by level
/// code: `Transaction` and `HierarchicalLoop`.
pub trait HierarchicalLoopContainerSpec {
    fn hloops(&self) -> &'static [HierarchicalLoopSpecification];

    fn allows_hierarchical_loop(&self, level_code: &str) -> bool {
        self.hloops().iter().any(|h| h.level_code.0 == level_code)
    }

    fn find_hierarchical_loop(
        &self,
        level_code: &str,
    ) -> Option<&'static HierarchicalLoopSpecification> {
        self.hloops().iter().find(|h| h.level_code.0 == level_code)
    }

    fn has_hierarchical_specs(&self) -> bool {
        !self.hloops().is_empty()
    }
}

impl LoopContainerSpec for LoopSpecification {
    fn segments(&self) -> &'static [SegmentSpecification] {
        self.segments
    }

    fn loops(&self) -> &'static [LoopSpecification] {
        self.loops
    }
}

impl LoopContainerSpec for HierarchicalLoopSpecification {
    fn segments(&self) -> &'static [SegmentSpecification] {
        self.segments
    }

    fn loops(&self) -> &'static [LoopSpecification] {
        self.loops
    }
}

impl HierarchicalLoopContainerSpec for HierarchicalLoopSpecification {
    fn hloops(&self) -> &'static [HierarchicalLoopSpecification] {
        self.hloops
    }
}

/// The allowed structure of one transaction set (e.g. `837`), read-only
/// and valid for the process lifetime.
#[derive(Debug, Clone, Copy)]
pub struct TransactionSpecification {
    pub transaction_set_identifier_code: &'static str,
    pub version: &'static str,
    pub segments: &'static [SegmentSpecification],
    pub loops: &'static [LoopSpecification],
    pub hloops: &'static [HierarchicalLoopSpecification],
}

impl LoopContainerSpec for TransactionSpecification {
    fn segments(&self) -> &'static [SegmentSpecification] {
        self.segments
    }

    fn loops(&self) -> &'static [LoopSpecification] {
        self.loops
    }
}

impl HierarchicalLoopContainerSpec for TransactionSpecification {
    fn hloops(&self) -> &'static [HierarchicalLoopSpecification] {
        self.hloops
    }
}

/// Errors raised while locating a specification for an opened transaction.
///
/// Borrows straight from the `ST` segment's elements rather than the
/// `'static` specification data, so it carries the lifetime of whatever
/// buffer the caller parsed that segment from.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecError<'a> {
    #[error("no specification registered for transaction set {transaction_set_identifier_code} version {version}")]
    UnknownTransactionSet {
        transaction_set_identifier_code: &'a str,
        version: &'a str,
    },
}

/// Locates the specification governing a transaction set. Called once per
/// `ST`; the parser treats the return value as immutable.
///
/// Implementations may be file-backed, embedded, or composite. Must be
/// `Send + Sync` to be shared across parses running on distinct streams.
pub trait SpecificationFinder {
    fn find_transaction_spec<'a>(
        &self,
        functional_group_code: &'a str,
        version: &'a str,
        transaction_set_identifier_code: &'a str,
    ) -> Result<TransactionSpecification, SpecError<'a>>;
}
