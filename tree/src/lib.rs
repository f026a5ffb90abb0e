//! The parsed-document container tree.
//!
//! Strictly tree-shaped, with upward parent references realized as arena
//! indices rather than owning pointers — the usual way to give a node a
//! parent reference in a language that won't let two structs own each
//! other. `Tree` owns every node; a [`NodeId`] is only meaningful against
//! the `Tree` that produced it.
//!
//! Node kinds are a tagged enum ([`Node`]) rather than a class hierarchy;
//! the structural parser dispatches on *capability* (can this node host
//! child loops? hierarchical loops?) via [`Node::loop_spec`] and
//! [`Node::hierarchical_loop_spec`], not on which `Node` variant it is.

pub mod serialize;

use segment::{Delimiters, Segment};
use spec::{
    HierarchicalLoopContainerSpec, HierarchicalLoopSpecification, LoopContainerSpec,
    LoopSpecification, TransactionSpecification,
};

/// Index of a node within a [`Tree`]. Only valid against the tree that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// An owned copy of a tokenized segment, kept around after the borrowed
/// [`segment::Segment`] it came from goes out of scope.
///
/// Reconstructs an equivalent [`Segment`] on demand via
/// [`StoredSegment::as_segment`] for element access and reserialization.
#[derive(Debug, Clone)]
pub struct StoredSegment {
    id: Vec<u8>,
    data: Vec<u8>,
    pub delimiters: Delimiters,
}

impl StoredSegment {
    pub fn from_segment(segment: &Segment) -> Self {
        Self {
            id: segment.id.to_vec(),
            data: segment.elements_raw().to_vec(),
            delimiters: segment.delimiters,
        }
    }

    pub fn as_segment(&self) -> Segment<'_> {
        Segment::new(&self.id, &self.data, self.delimiters)
    }

    pub fn id_str(&self) -> &str {
        core::str::from_utf8(&self.id).unwrap_or("")
    }

    /// Reconstructs the original wire form (id + element separator +
    /// elements), without the trailing terminator.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.id.len() + 1 + self.data.len());
        out.extend_from_slice(&self.id);
        if !self.data.is_empty() {
            out.push(self.delimiters.element);
            out.extend_from_slice(&self.data);
        }
        out
    }
}

/// A child of a container, in document order: either a direct segment or
/// a nested container node.
#[derive(Debug, Clone)]
pub enum Child {
    Segment(StoredSegment),
    Node(NodeId),
}

#[derive(Debug, Clone)]
pub struct Interchange {
    pub delimiters: Delimiters,
    pub isa: StoredSegment,
    pub iea: Option<StoredSegment>,
    children: Vec<Child>,
}

#[derive(Debug, Clone)]
pub struct FunctionGroup {
    pub parent: NodeId,
    pub gs: StoredSegment,
    pub ge: Option<StoredSegment>,
    children: Vec<Child>,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub parent: NodeId,
    pub st: StoredSegment,
    pub se: Option<StoredSegment>,
    pub spec: TransactionSpecification,
    children: Vec<Child>,
}

#[derive(Debug, Clone)]
pub struct Loop {
    pub parent: NodeId,
    pub spec: LoopSpecification,
    children: Vec<Child>,
}

#[derive(Debug, Clone)]
pub struct HierarchicalLoop {
    pub parent: NodeId,
    /// `HL01`.
    pub id: String,
    /// `HL02`, empty if this is a top-level hierarchical loop.
    pub parent_hl_id: Option<String>,
    /// `HL03`.
    pub level_code: String,
    pub spec: HierarchicalLoopSpecification,
    children: Vec<Child>,
}

/// One node of the container tree. See the module documentation for why
/// this is a tagged enum rather than a class hierarchy.
#[derive(Debug, Clone)]
pub enum Node {
    Interchange(Interchange),
    FunctionGroup(FunctionGroup),
    Transaction(Transaction),
    Loop(Loop),
    HierarchicalLoop(HierarchicalLoop),
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Interchange(_) => None,
            Node::FunctionGroup(g) => Some(g.parent),
            Node::Transaction(t) => Some(t.parent),
            Node::Loop(l) => Some(l.parent),
            Node::HierarchicalLoop(h) => Some(h.parent),
        }
    }

    pub fn children(&self) -> &[Child] {
        match self {
            Node::Interchange(i) => &i.children,
            Node::FunctionGroup(g) => &g.children,
            Node::Transaction(t) => &t.children,
            Node::Loop(l) => &l.children,
            Node::HierarchicalLoop(h) => &h.children,
        }
    }

    fn children_mut(&mut self) -> &mut Vec<Child> {
        match self {
            Node::Interchange(i) => &mut i.children,
            Node::FunctionGroup(g) => &mut g.children,
            Node::Transaction(t) => &mut t.children,
            Node::Loop(l) => &mut l.children,
            Node::HierarchicalLoop(h) => &mut h.children,
        }
    }

    /// The `LoopContainer` capability: present on `Transaction`, `Loop`,
    /// and `HierarchicalLoop`; absent on `Interchange`/`FunctionGroup`,
    /// which only accept the envelope segments the structural parser
    /// hardcodes (`TA1`, trailers).
    pub fn loop_spec(&self) -> Option<&dyn LoopContainerSpec> {
        match self {
            Node::Transaction(t) => Some(&t.spec),
            Node::Loop(l) => Some(&l.spec),
            Node::HierarchicalLoop(h) => Some(&h.spec),
            Node::Interchange(_) | Node::FunctionGroup(_) => None,
        }
    }

    /// The `HierarchicalLoopContainer` capability: present on
    /// `Transaction` and `HierarchicalLoop` only.
    pub fn hierarchical_loop_spec(&self) -> Option<&dyn HierarchicalLoopContainerSpec> {
        match self {
            Node::Transaction(t) => Some(&t.spec),
            Node::HierarchicalLoop(h) => Some(&h.spec),
            Node::Loop(_) | Node::Interchange(_) | Node::FunctionGroup(_) => None,
        }
    }
}

/// Arena owning every node of one parsed document forest. A fresh `Tree`
/// is created per `ISA`; [`add_segment`](Tree::add_segment) et al. mutate
/// it as the structural parser walks the input.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent()
    }

    pub fn children(&self, id: NodeId) -> &[Child] {
        self.node(id).children()
    }

    /// Starts a new interchange; the returned id is the tree's root.
    pub fn open_interchange(&mut self, isa: StoredSegment, delimiters: Delimiters) -> NodeId {
        self.push(Node::Interchange(Interchange {
            delimiters,
            isa,
            iea: None,
            children: Vec::new(),
        }))
    }

    pub fn open_function_group(&mut self, interchange: NodeId, gs: StoredSegment) -> NodeId {
        let id = self.push(Node::FunctionGroup(FunctionGroup {
            parent: interchange,
            gs,
            ge: None,
            children: Vec::new(),
        }));
        self.nodes[interchange.0].children_mut().push(Child::Node(id));
        id
    }

    pub fn open_transaction(
        &mut self,
        group: NodeId,
        st: StoredSegment,
        spec: TransactionSpecification,
    ) -> NodeId {
        let id = self.push(Node::Transaction(Transaction {
            parent: group,
            st,
            se: None,
            spec,
            children: Vec::new(),
        }));
        self.nodes[group.0].children_mut().push(Child::Node(id));
        id
    }

    /// Accepts `s` as a direct child of `container` if its id is listed in
    /// the container's specification, or unconditionally if `force` is
    /// set (the parser's recovery path). Does not mutate on rejection.
    pub fn add_segment(
        &mut self,
        container: NodeId,
        s: StoredSegment,
        force: bool,
    ) -> Option<StoredSegment> {
        let allowed = force
            || self
                .node(container)
                .loop_spec()
                .is_some_and(|spec| spec.allows_segment(s.id_str()));

        if !allowed {
            return None;
        }

        let copy = s.clone();
        self.nodes[container.0]
            .children_mut()
            .push(Child::Segment(s));
        Some(copy)
    }

    /// If `s`'s id matches the starting segment of a child
    /// [`LoopSpecification`] of `container`, opens that loop, attaches `s`
    /// as its first segment, and returns the new loop's id.
    pub fn add_loop(&mut self, container: NodeId, s: &StoredSegment) -> Option<NodeId> {
        let found = *self.node(container).loop_spec()?.find_loop(s.id_str())?;

        let id = self.push(Node::Loop(Loop {
            parent: container,
            spec: found,
            children: vec![Child::Segment(s.clone())],
        }));
        self.nodes[container.0].children_mut().push(Child::Node(id));
        Some(id)
    }

    /// Opens a `HierarchicalLoop` child of `container` if the container's
    /// spec allows `level_code`. Caller is responsible for HL01/HL02
    /// bookkeeping (the `hloops` map lives in the parser, not the tree).
    pub fn add_hloop(
        &mut self,
        container: NodeId,
        hl_id: String,
        parent_hl_id: Option<String>,
        level_code: String,
        s: StoredSegment,
    ) -> Option<NodeId> {
        let found = *self
            .node(container)
            .hierarchical_loop_spec()?
            .find_hierarchical_loop(&level_code)?;

        let id = self.push(Node::HierarchicalLoop(HierarchicalLoop {
            parent: container,
            id: hl_id,
            parent_hl_id,
            level_code,
            spec: found,
            children: vec![Child::Segment(s)],
        }));
        self.nodes[container.0].children_mut().push(Child::Node(id));
        Some(id)
    }

    pub fn allows_hierarchical_loop(&self, container: NodeId, level_code: &str) -> bool {
        self.node(container)
            .hierarchical_loop_spec()
            .is_some_and(|spec| spec.allows_hierarchical_loop(level_code))
    }

    pub fn has_hierarchical_specs(&self, container: NodeId) -> bool {
        self.node(container)
            .hierarchical_loop_spec()
            .is_some_and(|spec| spec.has_hierarchical_specs())
    }

    /// Records the closing `IEA`/`GE`/`SE` on a container that has one.
    /// A no-op on loop containers, which have no trailer of their own.
    pub fn set_terminating_trailer_segment(&mut self, container: NodeId, s: StoredSegment) {
        match &mut self.nodes[container.0] {
            Node::Interchange(i) => i.iea = Some(s),
            Node::FunctionGroup(g) => g.ge = Some(s),
            Node::Transaction(t) => t.se = Some(s),
            Node::Loop(_) | Node::HierarchicalLoop(_) => {}
        }
    }

    /// A human-readable breadcrumb for diagnostics: the loop id, or
    /// `"{loopId}[{hlId}]"` for a hierarchical loop.
    pub fn breadcrumb(&self, container: NodeId) -> String {
        match self.node(container) {
            Node::Loop(l) => l.spec.id.0.to_string(),
            Node::HierarchicalLoop(h) => format!("{}[{}]", h.spec.level_code.0, h.id),
            Node::Transaction(t) => format!("ST:{}", t.spec.transaction_set_identifier_code),
            Node::FunctionGroup(_) => "GS".to_string(),
            Node::Interchange(_) => "ISA".to_string(),
        }
    }
}
