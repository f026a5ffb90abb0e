use tree::{NodeId, Tree};

/// The output of a parse: one arena holding every node produced, and the
/// ordered list of interchange roots within it.
///
/// A single [`Tree`] can hold more than one interchange (back-to-back
/// `ISA…IEA` envelopes in one stream all land in the same arena) — each
/// [`NodeId`] in `interchanges` is an independent root with no parent.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub tree: Tree,
    pub interchanges: Vec<NodeId>,
}

impl ParsedDocument {
    pub fn empty() -> Self {
        Self {
            tree: Tree::new(),
            interchanges: Vec::new(),
        }
    }
}
