//! Trust store implementations: a manually populated in-memory store and a collection that
//! combines the verdicts of several stores. Both also serve as issuer sources for the certificates
//! they hold.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{
    environment::pki_environment_traits::*, get_leaf_rdn, log_message, CertIssuerSourceStatic,
    ParsedCertificate, ParsedCertificateList, PeLogLevels,
};

/// [`TrustStoreInMemory`] maps encoded certificates to trust verdicts. Certificates that were not
/// added are [`CertificateTrust::Unspecified`]. Every added certificate, whatever its verdict, is
/// also available as a candidate issuer.
#[derive(Clone, Debug, Default)]
pub struct TrustStoreInMemory {
    trust_map: BTreeMap<Vec<u8>, CertificateTrust>,
    issuers: CertIssuerSourceStatic,
}

impl TrustStoreInMemory {
    /// TrustStoreInMemory::new instantiates a new empty TrustStoreInMemory.
    pub fn new() -> Self {
        Self::default()
    }

    /// add_trust_anchor marks the certificate as a trust anchor.
    pub fn add_trust_anchor(&mut self, cert: &Arc<ParsedCertificate>) {
        self.add_certificate(cert, CertificateTrust::Trusted);
    }

    /// add_distrusted_certificate marks the certificate as distrusted.
    pub fn add_distrusted_certificate(&mut self, cert: &Arc<ParsedCertificate>) {
        self.add_certificate(cert, CertificateTrust::Distrusted);
    }

    /// add_certificate_with_unspecified_trust records the certificate without expressing trust,
    /// overriding any earlier verdict.
    pub fn add_certificate_with_unspecified_trust(&mut self, cert: &Arc<ParsedCertificate>) {
        self.add_certificate(cert, CertificateTrust::Unspecified);
    }

    fn add_certificate(&mut self, cert: &Arc<ParsedCertificate>, trust: CertificateTrust) {
        log_message(
            &PeLogLevels::PeDebug,
            alloc::format!(
                "Adding {} to trust store as {}",
                get_leaf_rdn(cert.subject()),
                trust
            )
            .as_str(),
        );
        self.trust_map.insert(cert.der().to_vec(), trust);
        self.issuers.add_cert(cert.clone());
    }

    /// True if the certificate was added to the store, regardless of verdict
    pub fn contains(&self, cert: &ParsedCertificate) -> bool {
        self.trust_map.contains_key(cert.der())
    }

    /// Number of certificates in the store
    pub fn len(&self) -> usize {
        self.trust_map.len()
    }

    /// True if the store is empty
    pub fn is_empty(&self) -> bool {
        self.trust_map.is_empty()
    }

    /// Removes all entries
    pub fn clear(&mut self) {
        self.trust_map.clear();
        self.issuers = CertIssuerSourceStatic::new();
    }
}

impl TrustStore for TrustStoreInMemory {
    fn get_trust(&self, cert: &ParsedCertificate) -> CertificateTrust {
        match self.trust_map.get(cert.der()) {
            Some(trust) => *trust,
            None => CertificateTrust::Unspecified,
        }
    }

    fn issuer_source(&self) -> Option<&dyn CertIssuerSource> {
        Some(self as &dyn CertIssuerSource)
    }
}

impl CertIssuerSource for TrustStoreInMemory {
    fn sync_get_issuers_of(&self, cert: &ParsedCertificate) -> ParsedCertificateList {
        self.issuers.sync_get_issuers_of(cert)
    }
}

/// [`TrustStoreCollection`] combines several trust stores. A certificate distrusted by any store is
/// distrusted, otherwise one trusted by any store is trusted.
#[derive(Default)]
pub struct TrustStoreCollection<'a> {
    stores: Vec<&'a dyn TrustStore>,
}

impl<'a> TrustStoreCollection<'a> {
    /// TrustStoreCollection::new instantiates a new empty TrustStoreCollection.
    pub fn new() -> Self {
        TrustStoreCollection { stores: Vec::new() }
    }

    /// add_trust_store appends a store to the collection.
    pub fn add_trust_store(&mut self, store: &'a dyn TrustStore) {
        self.stores.push(store);
    }
}

impl<'a> TrustStore for TrustStoreCollection<'a> {
    fn get_trust(&self, cert: &ParsedCertificate) -> CertificateTrust {
        let mut result = CertificateTrust::Unspecified;
        for store in &self.stores {
            match store.get_trust(cert) {
                CertificateTrust::Distrusted => return CertificateTrust::Distrusted,
                CertificateTrust::Trusted => result = CertificateTrust::Trusted,
                CertificateTrust::Unspecified => {}
            }
        }
        result
    }

    fn issuer_source(&self) -> Option<&dyn CertIssuerSource> {
        Some(self as &dyn CertIssuerSource)
    }
}

impl<'a> CertIssuerSource for TrustStoreCollection<'a> {
    fn sync_get_issuers_of(&self, cert: &ParsedCertificate) -> ParsedCertificateList {
        let mut issuers = Vec::new();
        for source in self.stores.iter().filter_map(|s| s.issuer_source()) {
            issuers.append(&mut source.sync_get_issuers_of(cert));
        }
        issuers
    }
}
