//! Splitting one parsed interchange into several standalone interchanges
//! (spec.md §4.4).
//!
//! Both entry points build wire bytes for each output rather than cloning
//! tree nodes directly, then hand those bytes back through
//! [`crate::StructuralParser`] — an unbundled document gets the exact same
//! invariant checks (HL uniqueness, spec membership, trailer placement) as
//! one read fresh off the wire, instead of a second, divergent code path
//! that could drift out of sync with the structural rules.

use spec::SpecificationFinder;
use tree::serialize::serialize_node;
use tree::{Child, Node, NodeId, StoredSegment, Transaction, Tree};

use crate::document::ParsedDocument;
use crate::error::ParseError;
use crate::StructuralParser;

/// Splits `interchange` into one standalone interchange per transaction it
/// contains. Each output reuses the original `ISA`/`GS`/`GE`/`IEA` segments
/// verbatim — their count fields (e.g. `GE01`) become stale for a
/// single-transaction excerpt, matching `GE01`'s role as a trailer the
/// reparse step re-validates rather than a value this function recomputes.
pub fn unbundle_by_transaction<F: SpecificationFinder + Clone>(
    tree: &Tree,
    interchange: NodeId,
    finder: &F,
) -> Result<Vec<ParsedDocument>, ParseError> {
    let (isa, iea, terminator) = envelope_parts(tree, interchange);

    let mut out = Vec::new();
    for group_id in node_children(tree, interchange) {
        let (gs, ge) = match tree.node(group_id) {
            Node::FunctionGroup(g) => (g.gs.clone(), g.ge.clone()),
            _ => continue,
        };

        for txn_id in node_children(tree, group_id) {
            let transaction = match tree.node(txn_id) {
                Node::Transaction(t) => t,
                _ => continue,
            };

            let body: Vec<Child> = tree.children(txn_id).to_vec();
            let wire = build_interchange_wire(
                tree, &isa, &gs, ge.as_ref(), iea.as_ref(), transaction, &body, terminator,
            );
            out.push(reparse(&wire, finder)?);
        }
    }
    Ok(out)
}

/// Splits `interchange` into one standalone interchange per maximal
/// occurrence of loop `loop_id`, wherever in the loop tree it appears
/// (including nested inside a hierarchical loop). Each output carries the
/// transaction's direct-child segments and loops that precede its first
/// `HL`, plus the matched loop itself — the ancestor `HL` chain the match
/// was nested under is not reconstructed, so the output is the matched
/// loop's own content, not a re-nested excerpt of the hierarchy it came
/// from.
pub fn unbundle_by_loop<F: SpecificationFinder + Clone>(
    tree: &Tree,
    interchange: NodeId,
    loop_id: &str,
    finder: &F,
) -> Result<Vec<ParsedDocument>, ParseError> {
    let (isa, iea, terminator) = envelope_parts(tree, interchange);

    let mut out = Vec::new();
    for group_id in node_children(tree, interchange) {
        let (gs, ge) = match tree.node(group_id) {
            Node::FunctionGroup(g) => (g.gs.clone(), g.ge.clone()),
            _ => continue,
        };

        for txn_id in node_children(tree, group_id) {
            let transaction = match tree.node(txn_id) {
                Node::Transaction(t) => t,
                _ => continue,
            };

            let mut matches = Vec::new();
            find_matching_loops(tree, txn_id, loop_id, &mut matches);
            if matches.is_empty() {
                continue;
            }

            let context = preceding_context(tree, txn_id);
            for matched in matches {
                let mut body = context.clone();
                body.push(Child::Node(matched));
                let wire = build_interchange_wire(
                    tree, &isa, &gs, ge.as_ref(), iea.as_ref(), transaction, &body, terminator,
                );
                out.push(reparse(&wire, finder)?);
            }
        }
    }
    Ok(out)
}

fn envelope_parts(tree: &Tree, interchange: NodeId) -> (StoredSegment, Option<StoredSegment>, u8) {
    match tree.node(interchange) {
        Node::Interchange(i) => (i.isa.clone(), i.iea.clone(), i.delimiters.segment),
        other => panic!("unbundle called on a non-interchange node: {other:?}"),
    }
}

/// `Child::Node` entries among `id`'s direct children, in document order.
/// `FunctionGroup`/`Transaction` children are always `Child::Node` (see
/// `Tree::open_function_group`/`open_transaction`), so this never silently
/// drops one.
fn node_children(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    tree.children(id)
        .iter()
        .filter_map(|c| match c {
            Child::Node(id) => Some(*id),
            Child::Segment(_) => None,
        })
        .collect()
}

/// Direct children of `transaction` up to (not including) the first
/// `HierarchicalLoop` child.
fn preceding_context(tree: &Tree, transaction: NodeId) -> Vec<Child> {
    let mut out = Vec::new();
    for child in tree.children(transaction) {
        if let Child::Node(id) = child {
            if matches!(tree.node(*id), Node::HierarchicalLoop(_)) {
                break;
            }
        }
        out.push(child.clone());
    }
    out
}

/// Collects every maximal occurrence of loop `loop_id` reachable from
/// `root`, descending through `HierarchicalLoop`s and non-matching `Loop`s
/// but not into a matched loop's own children — a claim loop nested inside
/// another claim-shaped loop (not a real 837 shape, but not precluded by
/// the specification model either) would otherwise be reported twice.
fn find_matching_loops(tree: &Tree, root: NodeId, loop_id: &str, out: &mut Vec<NodeId>) {
    for child in tree.children(root) {
        let Child::Node(id) = child else { continue };
        match tree.node(*id) {
            Node::Loop(l) if l.spec.id.0 == loop_id => out.push(*id),
            _ => find_matching_loops(tree, *id, loop_id, out),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_interchange_wire(
    tree: &Tree,
    isa: &StoredSegment,
    gs: &StoredSegment,
    ge: Option<&StoredSegment>,
    iea: Option<&StoredSegment>,
    transaction: &Transaction,
    body: &[Child],
    terminator: u8,
) -> Vec<u8> {
    let mut out = Vec::new();
    write_segment(&mut out, isa, terminator);
    write_segment(&mut out, gs, terminator);
    write_segment(&mut out, &transaction.st, terminator);

    for child in body {
        match child {
            Child::Segment(s) => write_segment(&mut out, s, terminator),
            Child::Node(id) => out.extend(serialize_node(tree, *id, terminator)),
        }
    }

    if let Some(se) = &transaction.se {
        write_segment(&mut out, se, terminator);
    }
    if let Some(ge) = ge {
        write_segment(&mut out, ge, terminator);
    }
    if let Some(iea) = iea {
        write_segment(&mut out, iea, terminator);
    }
    out
}

fn write_segment(out: &mut Vec<u8>, s: &StoredSegment, terminator: u8) {
    out.extend_from_slice(&s.to_wire());
    out.push(terminator);
}

fn reparse<F: SpecificationFinder + Clone>(
    wire: &[u8],
    finder: &F,
) -> Result<ParsedDocument, ParseError> {
    let mut parser = StructuralParser::new(finder.clone());
    parser.parse_multiple(wire)
}
