//! Ordering of candidate issuers

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::{CertificateTrust, ParsedCertificate};

/// [`CandidateIssuer`] is a candidate issuer certificate along with the trust verdict obtained when
/// it was added to a node.
#[derive(Clone, Debug)]
pub struct CandidateIssuer {
    /// Candidate issuer certificate
    pub cert: Arc<ParsedCertificate>,
    /// Trust verdict for `cert`
    pub trust: CertificateTrust,
}

fn trust_rank(trust: CertificateTrust) -> u8 {
    match trust {
        CertificateTrust::Trusted => 0,
        CertificateTrust::Unspecified => 1,
        CertificateTrust::Distrusted => 2,
    }
}

/// Exact match of the tail's AKID with the candidate's SKID ranks first, a mismatch ranks last.
fn key_id_rank(tail: &ParsedCertificate, candidate: &ParsedCertificate) -> u8 {
    match (&tail.akid, &candidate.skid) {
        (Some(akid), Some(skid)) if akid == skid => 0,
        (Some(_), Some(_)) => 2,
        _ => 1,
    }
}

/// `compare_candidates` orders two candidate issuers of `tail`. Lesser values are attempted first.
///
/// The criteria, in decreasing precedence:
/// 1. trust anchors, then certificates of unspecified trust, then distrusted certificates
/// 2. key identifier match, then absent key identifiers, then key identifier mismatch
/// 3. self-issued certificates
/// 4. more recent notBefore
/// 5. later notAfter
/// 6. encoded certificate bytes
pub fn compare_candidates(
    tail: &ParsedCertificate,
    a: &CandidateIssuer,
    b: &CandidateIssuer,
) -> Ordering {
    trust_rank(a.trust)
        .cmp(&trust_rank(b.trust))
        .then_with(|| key_id_rank(tail, &a.cert).cmp(&key_id_rank(tail, &b.cert)))
        .then_with(|| b.cert.self_issued.cmp(&a.cert.self_issued))
        .then_with(|| b.cert.not_before.cmp(&a.cert.not_before))
        .then_with(|| b.cert.not_after.cmp(&a.cert.not_after))
        .then_with(|| a.cert.der().cmp(b.cert.der()))
}

/// `order_in_place` sorts candidates per [`compare_candidates`].
pub fn order_in_place(tail: &ParsedCertificate, candidates: &mut [CandidateIssuer]) {
    candidates.sort_by(|a, b| compare_candidates(tail, a, b));
}

/// `order` returns the candidates sorted per [`compare_candidates`]. The result does not depend on
/// the order of the input.
pub fn order(tail: &ParsedCertificate, mut candidates: Vec<CandidateIssuer>) -> Vec<CandidateIssuer> {
    order_in_place(tail, &mut candidates);
    candidates
}
