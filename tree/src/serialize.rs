//! Re-emits a container tree as X12 wire bytes.
//!
//! Walks the tree in document order (the order [`Child`] entries were
//! appended in, which always matches the order segments were read) and
//! writes each stored segment back out with the interchange's own
//! delimiters, terminator included. Since every [`StoredSegment`] kept its
//! exact original element bytes, a tree built from valid input and
//! serialized without modification reproduces that input byte-for-byte
//! modulo the skipped-on-read `\r`/`\n` padding between segments.

use crate::{Child, Node, NodeId, Tree};

/// Serializes the interchange rooted at `root` (as returned by
/// [`Tree::open_interchange`]) to its wire form.
pub fn serialize_interchange(tree: &Tree, root: NodeId) -> Vec<u8> {
    let delimiters = match tree.node(root) {
        Node::Interchange(i) => i.delimiters,
        _ => panic!("serialize_interchange called on a non-interchange node"),
    };

    let mut out = Vec::new();
    write_node(tree, root, delimiters.segment, &mut out);
    out
}

/// Serializes an arbitrary node of the tree, not necessarily an
/// interchange root — used by the unbundler to emit a standalone
/// transaction or loop subtree reusing the interchange's own terminator.
pub fn serialize_node(tree: &Tree, id: NodeId, terminator: u8) -> Vec<u8> {
    let mut out = Vec::new();
    write_node(tree, id, terminator, &mut out);
    out
}

fn write_node(tree: &Tree, id: NodeId, terminator: u8, out: &mut Vec<u8>) {
    match tree.node(id) {
        Node::Interchange(i) => {
            write_segment(&i.isa, terminator, out);
            write_children(tree, id, terminator, out);
            if let Some(iea) = &i.iea {
                write_segment(iea, terminator, out);
            }
        }
        Node::FunctionGroup(g) => {
            write_segment(&g.gs, terminator, out);
            write_children(tree, id, terminator, out);
            if let Some(ge) = &g.ge {
                write_segment(ge, terminator, out);
            }
        }
        Node::Transaction(t) => {
            write_segment(&t.st, terminator, out);
            write_children(tree, id, terminator, out);
            if let Some(se) = &t.se {
                write_segment(se, terminator, out);
            }
        }
        // A Loop/HierarchicalLoop's triggering segment (NM1, HL, ...) is
        // already its first child, stored by `Tree::add_loop`/`add_hloop`.
        Node::Loop(_) | Node::HierarchicalLoop(_) => {
            write_children(tree, id, terminator, out);
        }
    }
}

fn write_children(tree: &Tree, id: NodeId, terminator: u8, out: &mut Vec<u8>) {
    for child in tree.children(id) {
        match child {
            Child::Segment(s) => write_segment(s, terminator, out),
            Child::Node(child_id) => write_node(tree, *child_id, terminator, out),
        }
    }
}

fn write_segment(s: &crate::StoredSegment, terminator: u8, out: &mut Vec<u8>) {
    out.extend_from_slice(&s.to_wire());
    out.push(terminator);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use segment::Delimiters;
    use spec::embedded::TRANSACTION_837_005010X222A1;

    fn stored(id: &str, data: &[u8]) -> crate::StoredSegment {
        crate::StoredSegment {
            id: id.as_bytes().to_vec(),
            data: data.to_vec(),
            delimiters: Delimiters::default(),
        }
    }

    #[test]
    fn round_trips_a_minimal_document() {
        let mut tree = Tree::new();
        let delimiters = Delimiters::default();
        let interchange = tree.open_interchange(stored("ISA", b"00*..."), delimiters);
        let group = tree.open_function_group(interchange, stored("GS", b"HC*SENDER*RECEIVER"));
        let transaction =
            tree.open_transaction(group, stored("ST", b"837*0001"), TRANSACTION_837_005010X222A1);
        tree.add_segment(transaction, stored("BHT", b"0019*00"), false);
        tree.set_terminating_trailer_segment(transaction, stored("SE", b"2*0001"));
        tree.set_terminating_trailer_segment(group, stored("GE", b"1*1"));
        tree.set_terminating_trailer_segment(interchange, stored("IEA", b"1*000000001"));

        let wire = serialize_interchange(&tree, interchange);
        let expected = b"ISA*00*...~GS*HC*SENDER*RECEIVER~ST*837*0001~BHT*0019*00~SE*2*0001~GE*1*1~IEA*1*000000001~";
        assert_eq!(wire, expected.to_vec());
    }

    #[test]
    fn preserves_nested_loop_order() {
        let mut tree = Tree::new();
        let delimiters = Delimiters::default();
        let interchange = tree.open_interchange(stored("ISA", b""), delimiters);
        let group = tree.open_function_group(interchange, stored("GS", b""));
        let transaction =
            tree.open_transaction(group, stored("ST", b"837"), TRANSACTION_837_005010X222A1);

        let submitter = tree
            .add_loop(transaction, &stored("NM1", b"41*2*ACME"))
            .unwrap();
        tree.add_segment(submitter, stored("PER", b"IC"), true);

        let wire = serialize_interchange(&tree, interchange);
        let expected = b"ISA~GS~ST*837~NM1*41*2*ACME~PER*IC~";
        assert_eq!(wire, expected.to_vec());
    }
}
