//! The pki_environment_traits module features trait definitions and type definitions for the
//! collaborators consulted by [`CertPathBuilder`](crate::CertPathBuilder): trust stores, issuer
//! sources, chain validators and path builder delegates.

use alloc::sync::Arc;
use core::fmt;

use futures::stream::BoxStream;

use crate::{
    CertPathErrors, ParsedCertificate, ParsedCertificateList, PolicyConstraints, ResultPath,
    TimeOfInterest,
};

/// `CertificateTrust` is the verdict a [`TrustStore`] returns for a certificate.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum CertificateTrust {
    /// The certificate is a trust anchor
    Trusted,
    /// The certificate is explicitly distrusted and must not appear in any path
    Distrusted,
    /// The trust store has no opinion about the certificate
    #[default]
    Unspecified,
}

impl CertificateTrust {
    /// True for [`CertificateTrust::Trusted`]
    pub fn is_trusted(&self) -> bool {
        matches!(self, CertificateTrust::Trusted)
    }

    /// True for [`CertificateTrust::Distrusted`]
    pub fn is_distrusted(&self) -> bool {
        matches!(self, CertificateTrust::Distrusted)
    }
}

impl fmt::Display for CertificateTrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateTrust::Trusted => write!(f, "Trusted"),
            CertificateTrust::Distrusted => write!(f, "Distrusted"),
            CertificateTrust::Unspecified => write!(f, "Unspecified"),
        }
    }
}

/// The [`TrustStore`] trait defines the interface for classifying certificates as trust anchors,
/// distrusted certificates or neither. Implementations are queried synchronously.
pub trait TrustStore {
    /// get_trust returns the verdict for the presented certificate.
    fn get_trust(&self, cert: &ParsedCertificate) -> CertificateTrust;

    /// issuer_source returns the store viewed as a [`CertIssuerSource`] for stores that can also
    /// supply the certificates they hold as candidate issuers.
    /// [`CertPathBuilder`](crate::CertPathBuilder) registers this source ahead of any added via
    /// `add_cert_issuer_source`.
    fn issuer_source(&self) -> Option<&dyn CertIssuerSource> {
        None
    }
}

/// `IssuerRequest` is an outstanding asynchronous issuer lookup. Each item is one batch of
/// candidate issuers. The request is finished when the stream ends or yields an empty batch.
/// Dropping the stream cancels the request.
pub type IssuerRequest = BoxStream<'static, ParsedCertificateList>;

/// The [`CertIssuerSource`] trait defines the interface for retrieving candidate issuers of a
/// certificate. Sources may answer synchronously, asynchronously or both.
pub trait CertIssuerSource {
    /// sync_get_issuers_of returns candidate issuers that are available immediately.
    fn sync_get_issuers_of(&self, cert: &ParsedCertificate) -> ParsedCertificateList;

    /// async_get_issuers_of starts an asynchronous lookup. Sources that do not support asynchronous
    /// retrieval return None.
    fn async_get_issuers_of(&self, _cert: &Arc<ParsedCertificate>) -> Option<IssuerRequest> {
        None
    }
}

/// The [`ChainValidator`] trait defines the interface used to decide whether a structurally
/// complete candidate path (target first, trust anchor last) is acceptable. Problems are recorded
/// in `errors`; a chain is valid if no high severity error was recorded.
pub trait ChainValidator {
    /// validate checks the presented chain, recording any problems in `errors`.
    fn validate(
        &self,
        chain: &[Arc<ParsedCertificate>],
        time_of_interest: TimeOfInterest,
        policy: &PolicyConstraints,
        errors: &mut CertPathErrors,
    );
}

/// The [`PathBuilderDelegate`] trait extends [`ChainValidator`] with a hook that runs exactly once
/// for each structurally complete path after it has been validated. The hook may add warnings or
/// errors (including making a valid path invalid) and may attach opaque data to the path.
pub trait PathBuilderDelegate: ChainValidator {
    /// check_path_after_verification inspects and optionally annotates a completed path.
    fn check_path_after_verification(&self, _path: &mut ResultPath) {}
}
