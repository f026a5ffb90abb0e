//! Support code for the `x12-parse` binary: file I/O, diagnostics
//! rendering, and the unbundling output layout built on top of
//! `x12_parser` and `x12_validation`.
//!
//! Kept as a library separate from `main.rs` so the CLI's actual behavior
//! is unit-testable without shelling out to the binary, mirroring how the
//! teacher split its own chunked-parsing logic into `lib.rs` behind a thin
//! `main.rs`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use segment::SegmentParser;
use spec::embedded::EmbeddedSpecificationFinder;
use tree::serialize::serialize_interchange;
use tree::{Child, Node, NodeId, Tree};
use x12_parser::{
    unbundle_by_loop, unbundle_by_transaction, ParseError, ParsedDocument, ParserConfig,
    SegmentWarning, StructuralParser,
};
use x12_validation::ValidationSuite;

#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("loop {loop_id} does not occur in {}", path.display())]
    NoMatchingLoop { path: PathBuf, loop_id: String },
}

pub fn read_file(path: &Path) -> Result<Vec<u8>, HostError> {
    fs::read(path).map_err(|source| HostError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Builds a [`StructuralParser`] over the embedded 837 specification,
/// logging every lenient-mode warning through the `log` facade — the
/// operational trace `x12-host` adds on top of the library's own
/// in-process warning channel (SPEC_FULL.md §3).
pub fn build_parser(lenient: bool) -> StructuralParser<EmbeddedSpecificationFinder> {
    let mut config = ParserConfig::default();
    config.throw_exception_on_syntax_errors = !lenient;

    StructuralParser::with_config(EmbeddedSpecificationFinder, config).on_warning(
        |w: SegmentWarning| {
            log::warn!(
                "segment {} ({}) at index {}: {}",
                w.segment_id,
                w.segment_string,
                w.segment_index,
                w.message
            );
        },
    )
}

pub fn parse_file(path: &Path, lenient: bool) -> Result<ParsedDocument, HostError> {
    let bytes = read_file(path)?;
    let mut parser = build_parser(lenient);
    parser.parse_multiple(bytes.as_slice()).map_err(Into::into)
}

/// Renders every interchange in `document` as an indented outline of its
/// container tree, for the `parse` subcommand's human-readable output.
pub fn describe_document(document: &ParsedDocument) -> String {
    let mut out = String::new();
    for (n, &interchange) in document.interchanges.iter().enumerate() {
        if n > 0 {
            out.push('\n');
        }
        describe_node(&document.tree, interchange, 0, &mut out);
    }
    out
}

fn describe_node(tree: &Tree, id: NodeId, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let label = match tree.node(id) {
        Node::Interchange(i) => format!("Interchange {}", i.isa.id_str()),
        Node::FunctionGroup(g) => format!("FunctionGroup {}", g.gs.id_str()),
        Node::Transaction(t) => format!(
            "Transaction {} ({})",
            t.st.id_str(),
            t.spec.transaction_set_identifier_code
        ),
        Node::Loop(l) => format!("Loop {}", l.spec.id.0),
        Node::HierarchicalLoop(h) => format!(
            "HierarchicalLoop id={} parent={} level={}",
            h.id,
            h.parent_hl_id.as_deref().unwrap_or("-"),
            h.level_code
        ),
    };
    out.push_str(&indent);
    out.push_str(&label);
    out.push('\n');

    for child in tree.children(id) {
        match child {
            Child::Segment(s) => {
                out.push_str(&"  ".repeat(depth + 1));
                out.push_str(s.id_str());
                out.push('\n');
            }
            Child::Node(child_id) => describe_node(tree, *child_id, depth + 1, out),
        }
    }
}

/// Runs the ambient SNIP1/SNIP7 syntax-level checks over `path` and
/// returns the formatted error list, independent of (and in addition to)
/// the structural parse — a malformed file can fail either or both
/// (SPEC_FULL.md §3).
pub fn validate_file(path: &Path) -> Result<Vec<String>, HostError> {
    let bytes = read_file(path)?;
    let mut suite = ValidationSuite::all_snip_levels();
    let mut remaining = bytes.as_slice();
    let mut tokenizer = SegmentParser::init();

    while !remaining.is_empty() {
        match tokenizer.parse_segments(remaining, &mut suite) {
            Ok(0) => break,
            Ok(consumed) => remaining = &remaining[consumed..],
            Err(_) => break,
        }
    }

    Ok(suite.finish().into_iter().map(|e| e.to_string()).collect())
}

/// Parses `path` and writes one standalone interchange per transaction
/// into `out_dir`, named `transaction-0001.x12`, `transaction-0002.x12`,
/// etc. Returns the number of files written.
pub fn unbundle_by_transaction_to_dir(
    path: &Path,
    out_dir: &Path,
    lenient: bool,
) -> Result<usize, HostError> {
    let document = parse_file(path, lenient)?;
    let finder = EmbeddedSpecificationFinder;

    let mut written = 0;
    for &interchange in &document.interchanges {
        let parts = unbundle_by_transaction(&document.tree, interchange, &finder)?;
        for (n, part) in parts.iter().enumerate() {
            let file_path = out_dir.join(format!("transaction-{:04}.x12", written + n + 1));
            write_part(&file_path, part)?;
        }
        written += parts.len();
    }
    Ok(written)
}

/// Parses `path` and writes one standalone interchange per occurrence of
/// loop `loop_id` into `out_dir`. Returns the number of files written.
pub fn unbundle_by_loop_to_dir(
    path: &Path,
    loop_id: &str,
    out_dir: &Path,
    lenient: bool,
) -> Result<usize, HostError> {
    let document = parse_file(path, lenient)?;
    let finder = EmbeddedSpecificationFinder;

    let mut written = 0;
    for &interchange in &document.interchanges {
        let parts = unbundle_by_loop(&document.tree, interchange, loop_id, &finder)?;
        for (n, part) in parts.iter().enumerate() {
            let file_path = out_dir.join(format!("{loop_id}-{:04}.x12", written + n + 1));
            write_part(&file_path, part)?;
        }
        written += parts.len();
    }

    if written == 0 {
        return Err(HostError::NoMatchingLoop {
            path: path.to_path_buf(),
            loop_id: loop_id.to_string(),
        });
    }
    Ok(written)
}

fn write_part(path: &Path, part: &ParsedDocument) -> Result<(), HostError> {
    let interchange = *part
        .interchanges
        .first()
        .expect("unbundle always reparses exactly one interchange per output");
    let wire = serialize_interchange(&part.tree, interchange);
    fs::write(path, wire).map_err(|source| HostError::Write {
        path: path.to_path_buf(),
        source,
    })
}
