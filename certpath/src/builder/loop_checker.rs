//! Loop detection for candidate certification paths

use alloc::sync::Arc;

use crate::ParsedCertificate;

/// `would_loop` returns true if adding `candidate` to `path` would repeat an entity already in the
/// path, i.e., a certificate with the same subject name and subject public key info.
///
/// Comparing entities rather than encodings also rejects re-issued or cross-certified copies of a
/// certificate already in the path.
pub fn would_loop(path: &[Arc<ParsedCertificate>], candidate: &ParsedCertificate) -> bool {
    path.iter().any(|c| c.same_name_and_spki(candidate))
}
