//! The structural parser: the engine that reconstructs envelope → group →
//! transaction → loop → hierarchical-loop nesting from a flat segment
//! stream, consulting an injected [`SpecificationFinder`].
//!
//! Built on `reader::StreamReader` for framing and `tree::Tree` for the
//! output; this crate owns the one piece neither of those layers knows
//! about — *which* container a given segment belongs in.

mod config;
mod document;
mod error;
mod unbundle;
mod warning;

pub use config::ParserConfig;
pub use document::ParsedDocument;
pub use error::{ParseError, StructuralError};
pub use unbundle::{unbundle_by_loop, unbundle_by_transaction};
pub use warning::SegmentWarning;

use std::collections::HashMap;
use std::io::Read;

use reader::{ReaderError, StreamReader};
use segment::{Delimiters, Segment};
use spec::SpecificationFinder;
use tree::{NodeId, StoredSegment, Tree};

/// Reconstructs the container tree for one or more back-to-back
/// interchanges read from a stream, given a [`SpecificationFinder`] to
/// resolve each `ST`'s transaction specification.
///
/// Holds no state between calls to [`StructuralParser::parse_multiple`]
/// beyond configuration and the warning callback — safe to reuse across
/// streams, not safe to call re-entrantly from within a warning callback
/// (spec.md §5 / SPEC_FULL.md §10).
pub struct StructuralParser<F: SpecificationFinder> {
    finder: F,
    config: ParserConfig,
    on_warning: Option<Box<dyn FnMut(SegmentWarning)>>,
}

impl<F: SpecificationFinder> StructuralParser<F> {
    pub fn new(finder: F) -> Self {
        Self::with_config(finder, ParserConfig::default())
    }

    pub fn with_config(finder: F, config: ParserConfig) -> Self {
        Self {
            finder,
            config,
            on_warning: None,
        }
    }

    /// Registers a callback invoked synchronously for every lenient-mode
    /// diagnostic. The callback never sees a borrow into the partial tree
    /// (spec.md §5) — only the owned fields of [`SegmentWarning`].
    pub fn on_warning(mut self, callback: impl FnMut(SegmentWarning) + 'static) -> Self {
        self.on_warning = Some(Box::new(callback));
        self
    }

    /// Convenience wrapper over [`StructuralParser::parse_multiple`] for
    /// callers already holding a complete document in memory.
    pub fn parse_str(&mut self, s: &str) -> Result<ParsedDocument, ParseError> {
        self.parse_multiple(s.as_bytes())
    }

    /// Parses every interchange found in `reader`. A stream producing zero
    /// bytes yields an empty document rather than
    /// [`ReaderError::MalformedHeader`] (spec.md's S1 fixture).
    ///
    /// Multiple back-to-back `ISA…IEA` interchanges in one stream all
    /// share the delimiter set discovered from the first `ISA` —
    /// `reader::StreamReader` only discovers delimiters once, at
    /// construction. A caller whose interchanges genuinely use different
    /// delimiters must call this once per interchange.
    pub fn parse_multiple<R: Read>(&mut self, reader: R) -> Result<ParsedDocument, ParseError> {
        let mut stream = match StreamReader::with_config(reader, self.config.reader_config()) {
            Ok(stream) => stream,
            Err(ReaderError::EmptyStream) => return Ok(ParsedDocument::empty()),
            Err(e) => return Err(e.into()),
        };

        let mut document = ParsedDocument::empty();
        let mut state = RunState::default();
        let mut errors: Vec<StructuralError> = Vec::new();

        let isa_len = Delimiters::ISA_SIZE_BYTES - 1; // drop the trailing terminator byte
        let mut pending =
            Some(String::from_utf8_lossy(&stream.current_isa_segment()[..isa_len]).into_owned());

        loop {
            let raw = match pending.take() {
                Some(raw) => raw,
                None => stream.read_next_segment()?,
            };
            if raw.is_empty() {
                break;
            }

            state.segment_index += 1;
            let id = stream.read_segment_id(&raw).to_string();
            let segment = Segment::tokenize(raw.as_bytes(), stream.delimiters());
            let stored = StoredSegment::from_segment(&segment);

            match id.as_str() {
                "ISA" => self.handle_isa(&mut document, &mut state, stored, &segment),
                "IEA" => self.handle_iea(&mut document, &mut state, &mut errors, stored),
                "GS" => self.handle_gs(&mut document, &mut state, &mut errors, stored, &segment),
                "GE" => self.handle_ge(&mut document, &mut state, &mut errors, stored),
                "ST" => self.handle_st(&mut document, &mut state, &mut errors, stored, &segment),
                "SE" => self.handle_se(&mut document, &mut state, &mut errors, stored),
                "TA1" => self.handle_ta1(&mut document, &mut state, &mut errors, stored),
                "HL" => self.handle_hl(&mut document, &mut state, &mut errors, stored, &segment),
                _ => self.handle_detail(&mut document, &mut state, &mut errors, stored, &id),
            }
        }

        if errors.is_empty() {
            Ok(document)
        } else {
            Err(ParseError::Aggregate(errors))
        }
    }

    fn handle_isa(
        &mut self,
        document: &mut ParsedDocument,
        state: &mut RunState,
        s: StoredSegment,
        segment: &Segment,
    ) {
        log::debug!("ISA at segment {}: opening a new interchange", state.segment_index);
        let interchange_cn = segment.element(13).and_then(|e| e.as_str()).map(str::to_string);
        let delimiters = segment.delimiters;
        let node = document.tree.open_interchange(s, delimiters);
        document.interchanges.push(node);

        *state = RunState {
            current_interchange: Some(node),
            interchange_cn,
            ..RunState::default()
        };
    }

    fn handle_iea(
        &mut self,
        document: &mut ParsedDocument,
        state: &mut RunState,
        errors: &mut Vec<StructuralError>,
        s: StoredSegment,
    ) {
        let Some(interchange) = state.current_interchange else {
            errors.push(StructuralError::MismatchSegment {
                trailer: "IEA".to_string(),
                segment_index: state.segment_index,
            });
            return;
        };
        document.tree.set_terminating_trailer_segment(interchange, s);
        state.current_interchange = None;
        state.current_group = None;
        state.current_transaction = None;
        state.current_container = None;
    }

    fn handle_gs(
        &mut self,
        document: &mut ParsedDocument,
        state: &mut RunState,
        errors: &mut Vec<StructuralError>,
        s: StoredSegment,
        segment: &Segment,
    ) {
        let Some(interchange) = state.current_interchange else {
            errors.push(StructuralError::MissingPrecedingSegment {
                segment_id: "GS".to_string(),
                segment_index: state.segment_index,
            });
            return;
        };

        state.group_functional_code = element_str(segment, 1);
        state.group_version = element_str(segment, 8);
        state.group_cn = segment.element(6).and_then(|e| e.as_str()).map(str::to_string);

        let group = document.tree.open_function_group(interchange, s);
        state.current_group = Some(group);
        state.current_transaction = None;
        state.current_container = None;
    }

    fn handle_ge(
        &mut self,
        document: &mut ParsedDocument,
        state: &mut RunState,
        errors: &mut Vec<StructuralError>,
        s: StoredSegment,
    ) {
        let Some(group) = state.current_group else {
            errors.push(StructuralError::MismatchSegment {
                trailer: "GE".to_string(),
                segment_index: state.segment_index,
            });
            return;
        };
        document.tree.set_terminating_trailer_segment(group, s);
        state.current_group = None;
        state.current_transaction = None;
        state.current_container = None;
    }

    fn handle_st(
        &mut self,
        document: &mut ParsedDocument,
        state: &mut RunState,
        errors: &mut Vec<StructuralError>,
        s: StoredSegment,
        segment: &Segment,
    ) {
        let Some(group) = state.current_group else {
            errors.push(StructuralError::MissingGsSegment {
                segment_index: state.segment_index,
            });
            return;
        };

        let transaction_set_identifier_code = element_str(segment, 1);
        state.transaction_cn = segment.element(2).and_then(|e| e.as_str()).map(str::to_string);

        match self.finder.find_transaction_spec(
            &state.group_functional_code,
            &state.group_version,
            &transaction_set_identifier_code,
        ) {
            Ok(spec) => {
                let transaction = document.tree.open_transaction(group, s, spec);
                state.current_transaction = Some(transaction);
                state.current_container = Some(transaction);
                state.transaction_code = transaction_set_identifier_code;
                state.hloops.clear();
            }
            Err(_) => errors.push(StructuralError::UnknownTransactionSpec {
                transaction_set_identifier_code,
                version: state.group_version.clone(),
                segment_index: state.segment_index,
            }),
        }
    }

    fn handle_se(
        &mut self,
        document: &mut ParsedDocument,
        state: &mut RunState,
        errors: &mut Vec<StructuralError>,
        s: StoredSegment,
    ) {
        let Some(transaction) = state.current_transaction else {
            errors.push(StructuralError::MismatchSegment {
                trailer: "SE".to_string(),
                segment_index: state.segment_index,
            });
            return;
        };
        document.tree.set_terminating_trailer_segment(transaction, s);
        state.current_transaction = None;
        state.current_container = None;
        state.hloops.clear();
    }

    /// `TA1` is an interchange acknowledgment, valid directly under the
    /// interchange even though `Interchange` doesn't implement
    /// `LoopContainerSpec` (spec.md's data model only gives segment lists
    /// to `Transaction`/`Loop`/`HierarchicalLoop`) — `force=true` is the
    /// documented escape hatch for exactly this kind of structurally-known
    /// exception.
    fn handle_ta1(
        &mut self,
        document: &mut ParsedDocument,
        state: &mut RunState,
        errors: &mut Vec<StructuralError>,
        s: StoredSegment,
    ) {
        let Some(interchange) = state.current_interchange else {
            errors.push(StructuralError::MissingPrecedingSegment {
                segment_id: "TA1".to_string(),
                segment_index: state.segment_index,
            });
            return;
        };
        document.tree.add_segment(interchange, s, true);
    }

    /// HL placement (spec.md §4.3.1): resolve `HL02`'s parent to a
    /// container, honoring strict/lenient divergence on an unresolved
    /// parent id, then attach via [`Tree::add_hloop`], which itself
    /// re-validates the level code against the resolved container's
    /// specification.
    fn handle_hl(
        &mut self,
        document: &mut ParsedDocument,
        state: &mut RunState,
        errors: &mut Vec<StructuralError>,
        s: StoredSegment,
        segment: &Segment,
    ) {
        let Some(transaction) = state.current_transaction else {
            errors.push(StructuralError::MissingPrecedingSegment {
                segment_id: "HL".to_string(),
                segment_index: state.segment_index,
            });
            return;
        };

        let hl_id = element_str(segment, 1);
        let parent_id = segment
            .element(2)
            .and_then(|e| e.as_str())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let level_code = element_str(segment, 3);

        if state.hloops.contains_key(&hl_id) {
            errors.push(StructuralError::HLoopIdExists {
                hl_id,
                segment_index: state.segment_index,
            });
            return;
        }

        let start = state.current_container.unwrap_or(transaction);

        let container = match &parent_id {
            Some(pid) => match state.hloops.get(pid).copied() {
                Some(parent_node) => Some(parent_node),
                None if self.config.strict() => {
                    errors.push(StructuralError::MissingParentId {
                        hl_id,
                        parent_id: pid.clone(),
                        segment_index: state.segment_index,
                    });
                    return;
                }
                None => {
                    self.warn(
                        state,
                        "HL",
                        &segment_string(&s),
                        &format!(
                            "HL {hl_id} references parent {pid} not yet seen; falling back to the nearest eligible ancestor"
                        ),
                    );
                    ascend_hloop_container(&document.tree, start, &level_code)
                }
            },
            None => ascend_hloop_container(&document.tree, start, &level_code),
        };

        let Some(container) = container else {
            errors.push(StructuralError::InvalidHLoopSpecification {
                hl_id,
                level_code,
                segment_index: state.segment_index,
            });
            return;
        };

        match document
            .tree
            .add_hloop(container, hl_id.clone(), parent_id, level_code.clone(), s)
        {
            Some(node) => {
                state.hloops.insert(hl_id, node);
                state.current_container = Some(node);
            }
            None => errors.push(StructuralError::InvalidHLoopSpecification {
                hl_id,
                level_code,
                segment_index: state.segment_index,
            }),
        }
    }

    /// Detail placement (spec.md §4.3.2): try attaching directly at the
    /// current container, then try opening a nested loop there; on
    /// rejection, ascend toward the transaction root (never past it)
    /// trying each ancestor in turn. The first container (at any depth)
    /// that accepts the segment becomes the new current container —
    /// finding one two levels up is how this parser notices a loop
    /// implicitly closed, since X12 has no explicit "end of loop" segment.
    fn handle_detail(
        &mut self,
        document: &mut ParsedDocument,
        state: &mut RunState,
        errors: &mut Vec<StructuralError>,
        s: StoredSegment,
        segment_id: &str,
    ) {
        let Some(transaction) = state.current_transaction else {
            errors.push(StructuralError::MissingPrecedingSegment {
                segment_id: segment_id.to_string(),
                segment_index: state.segment_index,
            });
            return;
        };

        let start = state.current_container.unwrap_or(transaction);
        let mut breadcrumbs = Vec::new();
        let mut candidate = Some(start);

        while let Some(c) = candidate {
            if document.tree.add_segment(c, s.clone(), false).is_some() {
                state.current_container = Some(c);
                return;
            }
            if let Some(opened) = document.tree.add_loop(c, &s) {
                state.current_container = Some(opened);
                return;
            }

            breadcrumbs.push(document.tree.breadcrumb(c));

            // Don't ascend past the transaction root (spec.md §4.3.2(c)) —
            // FunctionGroup/Interchange never host loop-resolved segments.
            if c == transaction {
                break;
            }
            candidate = document.tree.parent(c);
        }

        if self.config.strict() {
            errors.push(StructuralError::SegmentCannotBeIdentified {
                transaction_code: state.transaction_code.clone(),
                control_number: state.transaction_cn.clone().unwrap_or_default(),
                segment_id: segment_id.to_string(),
                segment_index: state.segment_index,
                breadcrumbs,
            });
        } else {
            self.warn(
                state,
                segment_id,
                &segment_string(&s),
                &format!(
                    "segment {segment_id} did not match any container in the loop tree; force-attached"
                ),
            );
            let fallback = state.current_container.unwrap_or(transaction);
            document.tree.add_segment(fallback, s, true);
        }
    }

    fn warn(&mut self, state: &RunState, segment_id: &str, segment_string: &str, message: &str) {
        log::warn!("{message}");
        if let Some(callback) = self.on_warning.as_mut() {
            callback(SegmentWarning {
                interchange_control_number: state.interchange_cn.clone(),
                group_control_number: state.group_cn.clone(),
                transaction_control_number: state.transaction_cn.clone(),
                segment_index: state.segment_index,
                segment_id: segment_id.to_string(),
                segment_string: segment_string.to_string(),
                message: message.to_string(),
                file_is_valid: false,
            });
        }
    }
}

/// Running state threaded through one `parse_multiple` call. Reset (mostly)
/// whenever a new `ISA` is seen, since the reader's shared-delimiters
/// simplification still lets several interchanges share one call.
#[derive(Default)]
struct RunState {
    current_interchange: Option<NodeId>,
    current_group: Option<NodeId>,
    current_transaction: Option<NodeId>,
    current_container: Option<NodeId>,
    hloops: HashMap<String, NodeId>,
    segment_index: usize,
    interchange_cn: Option<String>,
    group_cn: Option<String>,
    transaction_cn: Option<String>,
    group_functional_code: String,
    group_version: String,
    transaction_code: String,
}

fn element_str(segment: &Segment, n: usize) -> String {
    segment.element(n).and_then(|e| e.as_str()).unwrap_or("").to_string()
}

fn segment_string(s: &StoredSegment) -> String {
    String::from_utf8_lossy(&s.to_wire()).into_owned()
}

/// Ascends from `start` (inclusive) toward the transaction root, returning
/// the first container whose specification accepts `level_code`.
fn ascend_hloop_container(tree: &Tree, start: NodeId, level_code: &str) -> Option<NodeId> {
    let mut candidate = Some(start);
    while let Some(c) = candidate {
        if tree.allows_hierarchical_loop(c, level_code) {
            return Some(c);
        }
        candidate = tree.parent(c);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use spec::embedded::EmbeddedSpecificationFinder;
    use tree::{Child, Node};

    fn isa_header() -> &'static str {
        "ISA*00*          *00*          *ZZ*SENDER123      *ZZ*RECEIVER456    *231213*1430*^*00501*000000001*0*P*:~"
    }

    fn minimal_837() -> String {
        format!(
            "{isa}GS*HC*SENDER*RECEIVER*20231213*1430*1*X*005010X222A1~\
             ST*837*0001~\
             BHT*0019*00~\
             NM1*41*2*SUBMITTER~\
             HL*1**20*1~\
             NM1*85*2*BILLING PROVIDER~\
             HL*2*1*22*0~\
             NM1*IL*1*DOE*JANE~\
             CLM*CLAIM001*100~\
             LX*1~\
             SV1*HC:99213*100~\
             SE*10*0001~\
             GE*1*1~\
             IEA*1*000000001~",
            isa = isa_header()
        )
    }

    fn only_child(tree: &Tree, id: NodeId) -> NodeId {
        match tree.children(id).first().expect("at least one child") {
            Child::Node(child) => *child,
            Child::Segment(_) => panic!("expected a node child, found a segment"),
        }
    }

    fn find_node<P: Fn(&Node) -> bool>(tree: &Tree, id: NodeId, predicate: P) -> Option<NodeId> {
        tree.children(id).iter().find_map(|c| match c {
            Child::Node(child) if predicate(tree.node(*child)) => Some(*child),
            _ => None,
        })
    }

    #[test]
    fn empty_stream_yields_an_empty_document() {
        let mut parser = StructuralParser::new(EmbeddedSpecificationFinder);
        let document = parser.parse_str("").expect("empty stream is not an error");
        assert!(document.interchanges.is_empty());
    }

    #[test]
    fn parses_a_minimal_837_into_the_expected_shape() {
        let mut parser = StructuralParser::new(EmbeddedSpecificationFinder);
        let document = parser.parse_str(&minimal_837()).expect("valid document");

        assert_eq!(document.interchanges.len(), 1);
        let interchange = document.interchanges[0];
        match document.tree.node(interchange) {
            Node::Interchange(i) => assert!(i.iea.is_some()),
            other => panic!("expected an interchange, got {other:?}"),
        }

        let group = only_child(&document.tree, interchange);
        let transaction = only_child(&document.tree, group);

        let billing_level =
            find_node(&document.tree, transaction, |n| {
                matches!(n, Node::HierarchicalLoop(h) if h.level_code == "20")
            })
            .expect("billing provider HL (level 20) present");

        let subscriber_level =
            find_node(&document.tree, billing_level, |n| {
                matches!(n, Node::HierarchicalLoop(h) if h.level_code == "22")
            })
            .expect("subscriber HL (level 22) nested under billing provider");

        let claim_loop = find_node(&document.tree, subscriber_level, |n| {
            matches!(n, Node::Loop(l) if l.spec.id.0 == "2300")
        })
        .expect("claim loop nested under the subscriber HL");

        let service_line = find_node(&document.tree, claim_loop, |n| {
            matches!(n, Node::Loop(l) if l.spec.id.0 == "2400")
        })
        .expect("service line loop nested under the claim");

        assert_eq!(document.tree.children(service_line).len(), 2); // LX, SV1
    }

    #[test]
    fn duplicate_hl_id_within_a_transaction_is_a_structural_error() {
        let body = format!(
            "{isa}GS*HC*SENDER*RECEIVER*20231213*1430*1*X*005010X222A1~\
             ST*837*0001~\
             BHT*0019*00~\
             HL*1**20*1~\
             HL*1**20*1~\
             SE*5*0001~\
             GE*1*1~\
             IEA*1*000000001~",
            isa = isa_header()
        );

        let mut parser = StructuralParser::new(EmbeddedSpecificationFinder);
        let err = parser.parse_str(&body).unwrap_err();
        match err {
            ParseError::Aggregate(errors) => assert!(errors
                .iter()
                .any(|e| matches!(e, StructuralError::HLoopIdExists { .. }))),
            other => panic!("expected an aggregate structural error, got {other:?}"),
        }
    }

    #[test]
    fn lenient_mode_force_attaches_an_unplaceable_segment_instead_of_erroring() {
        let body = format!(
            "{isa}GS*HC*SENDER*RECEIVER*20231213*1430*1*X*005010X222A1~\
             ST*837*0001~\
             ZZZ*unrecognized~\
             SE*3*0001~\
             GE*1*1~\
             IEA*1*000000001~",
            isa = isa_header()
        );

        let config = ParserConfig {
            throw_exception_on_syntax_errors: false,
            ..ParserConfig::default()
        };

        let (tx, rx) = std::sync::mpsc::channel();
        let mut parser =
            StructuralParser::with_config(EmbeddedSpecificationFinder, config).on_warning(move |w| {
                tx.send(w).expect("receiver still alive for the duration of the parse")
            });

        let document = parser.parse_str(&body).expect("lenient mode never raises");

        let received: Vec<_> = rx.try_iter().collect();
        assert!(received.iter().any(|w| w.segment_id == "ZZZ" && !w.file_is_valid));

        let interchange = document.interchanges[0];
        let group = only_child(&document.tree, interchange);
        let transaction = only_child(&document.tree, group);
        assert_eq!(document.tree.children(transaction).len(), 1); // force-attached ZZZ
    }
}
