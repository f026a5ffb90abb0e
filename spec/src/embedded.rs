//! A hand-built, illustrative 837 005010X222A1 specification.
//!
//! This is deliberately not exhaustive — real 837 implementation guides
//! run hundreds of pages — but covers enough of the loop map (submitter
//! and receiver name loops, the billing/subscriber/patient hierarchical
//! levels, and the claim/service-line detail loops) to exercise the
//! structural parser end to end without an external specification
//! repository. Production deployments inject their own
//! [`SpecificationFinder`] built from a real implementation guide; that's
//! the extension seam this module demonstrates rather than replaces.

use crate::{
    HierarchicalLoopSpecification, LevelCode, LoopId, LoopSpecification, SegmentSpecification,
    SpecError, SpecificationFinder, TransactionSpecification,
};

const LOOP_1000A_SUBMITTER_NAME: LoopSpecification = LoopSpecification {
    id: LoopId("1000A"),
    starting_segment: "NM1",
    segments: &[],
    loops: &[],
};

const LOOP_1000B_RECEIVER_NAME: LoopSpecification = LoopSpecification {
    id: LoopId("1000B"),
    starting_segment: "NM1",
    segments: &[],
    loops: &[],
};

const LOOP_2010AA_BILLING_PROVIDER_NAME: LoopSpecification = LoopSpecification {
    id: LoopId("2010AA"),
    starting_segment: "NM1",
    segments: &[],
    loops: &[],
};

const LOOP_2010BA_SUBSCRIBER_NAME: LoopSpecification = LoopSpecification {
    id: LoopId("2010BA"),
    starting_segment: "NM1",
    segments: &[],
    loops: &[],
};

const LOOP_2010CA_PATIENT_NAME: LoopSpecification = LoopSpecification {
    id: LoopId("2010CA"),
    starting_segment: "NM1",
    segments: &[],
    loops: &[],
};

const LOOP_2400_SERVICE_LINE: LoopSpecification = LoopSpecification {
    id: LoopId("2400"),
    starting_segment: "LX",
    segments: &[
        SegmentSpecification::optional("SV1"),
        SegmentSpecification::optional("SV2"),
        SegmentSpecification::optional("DTP"),
    ],
    loops: &[],
};

const LOOP_2300_CLAIM: LoopSpecification = LoopSpecification {
    id: LoopId("2300"),
    starting_segment: "CLM",
    segments: &[
        SegmentSpecification::optional("DTP"),
        SegmentSpecification::optional("REF"),
        SegmentSpecification::optional("HI"),
    ],
    loops: &[LOOP_2400_SERVICE_LINE],
};

const HLOOP_2000C_PATIENT: HierarchicalLoopSpecification = HierarchicalLoopSpecification {
    level_code: LevelCode("23"),
    segments: &[],
    loops: &[LOOP_2010CA_PATIENT_NAME, LOOP_2300_CLAIM],
    hloops: &[],
};

const HLOOP_2000B_SUBSCRIBER: HierarchicalLoopSpecification = HierarchicalLoopSpecification {
    level_code: LevelCode("22"),
    segments: &[],
    loops: &[LOOP_2010BA_SUBSCRIBER_NAME, LOOP_2300_CLAIM],
    hloops: &[HLOOP_2000C_PATIENT],
};

const HLOOP_2000A_BILLING_PROVIDER: HierarchicalLoopSpecification = HierarchicalLoopSpecification {
    level_code: LevelCode("20"),
    segments: &[],
    loops: &[LOOP_2010AA_BILLING_PROVIDER_NAME],
    hloops: &[HLOOP_2000B_SUBSCRIBER],
};

/// The embedded 837 005010X222A1 skeleton.
pub const TRANSACTION_837_005010X222A1: TransactionSpecification = TransactionSpecification {
    transaction_set_identifier_code: "837",
    version: "005010X222A1",
    segments: &[SegmentSpecification::mandatory("BHT")],
    loops: &[LOOP_1000A_SUBMITTER_NAME, LOOP_1000B_RECEIVER_NAME],
    hloops: &[HLOOP_2000A_BILLING_PROVIDER],
};

/// A [`SpecificationFinder`] backed by the specifications embedded in this
/// module. The default finder when a caller doesn't inject their own.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedSpecificationFinder;

impl SpecificationFinder for EmbeddedSpecificationFinder {
    fn find_transaction_spec<'a>(
        &self,
        _functional_group_code: &'a str,
        version: &'a str,
        transaction_set_identifier_code: &'a str,
    ) -> Result<TransactionSpecification, SpecError<'a>> {
        match (transaction_set_identifier_code, version) {
            ("837", "005010X222A1") => Ok(TRANSACTION_837_005010X222A1),
            _ => Err(SpecError::UnknownTransactionSet {
                transaction_set_identifier_code,
                version,
            }),
        }
    }
}
