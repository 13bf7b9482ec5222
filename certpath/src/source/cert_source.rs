//! The cert_source module provides an implementation of a manually populated in-memory issuer
//! source.
//!
//! The following snip illustrates preparation and use of a [`CertIssuerSourceStatic`] object.
//!
//! ```
//! use certpath::{CertIssuerSource, CertIssuerSourceStatic};
//!
//! let mut cert_source = CertIssuerSourceStatic::new();
//! // populate via add_cert or add_encoded_cert, then register the source with a CertPathBuilder
//! // via add_cert_issuer_source.
//! assert!(cert_source.is_empty());
//! ```

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::{format, vec, vec::Vec};

use x509_cert::name::Name;

use crate::{
    environment::pki_environment_traits::*, log_message, normalized_name_string, util::error::*,
    ParsedCertificate, ParsedCertificateList, PeLogLevels,
};

/// [`CertIssuerSourceStatic`] holds a fixed set of certificates and answers issuer queries
/// synchronously by matching the issuer name of the presented certificate against the subject
/// names of the stored certificates.
#[derive(Clone, Debug, Default)]
pub struct CertIssuerSourceStatic {
    /// Certificates available from this source
    pub certs: ParsedCertificateList,

    /// Maps normalized certificate subject names to keys in the `certs` field. Names are normalized
    /// via [`normalized_name_string`] so lookups tolerate case and whitespace differences.
    pub name_map: BTreeMap<String, Vec<usize>>,
}

impl CertIssuerSourceStatic {
    /// CertIssuerSourceStatic::new instantiates a new empty CertIssuerSourceStatic.
    pub fn new() -> Self {
        Self::default()
    }

    /// add_cert adds a certificate to the source and indexes it by subject name. Certificates with
    /// the same encoding as one already present are ignored.
    pub fn add_cert(&mut self, cert: Arc<ParsedCertificate>) {
        if self.certs.iter().any(|c| c.der() == cert.der()) {
            return;
        }
        let name_str = normalized_name_string(cert.subject());
        let index = self.certs.len();
        self.certs.push(cert);
        match self.name_map.get_mut(&name_str) {
            Some(v) => v.push(index),
            None => {
                self.name_map.insert(name_str, vec![index]);
            }
        }
    }

    /// add_encoded_cert parses a DER-encoded certificate and adds it to the source.
    pub fn add_encoded_cert(&mut self, enc_cert: &[u8]) -> Result<()> {
        match ParsedCertificate::try_from(enc_cert) {
            Ok(cert) => {
                self.add_cert(Arc::new(cert));
                Ok(())
            }
            Err(e) => {
                log_message(
                    &PeLogLevels::PeError,
                    format!("Failed to parse certificate for issuer source: {}", e).as_str(),
                );
                Err(e)
            }
        }
    }

    /// get_certificates_for_name returns certificates whose subject name matches the presented name
    /// per [`compare_names`](crate::compare_names).
    pub fn get_certificates_for_name(&self, name: &Name) -> ParsedCertificateList {
        let name_str = normalized_name_string(name);
        match self.name_map.get(&name_str) {
            Some(indices) => indices.iter().map(|i| self.certs[*i].clone()).collect(),
            None => vec![],
        }
    }

    /// Number of certificates in the source
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// True if the source holds no certificates
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }
}

impl CertIssuerSource for CertIssuerSourceStatic {
    fn sync_get_issuers_of(&self, cert: &ParsedCertificate) -> ParsedCertificateList {
        self.get_certificates_for_name(cert.issuer())
    }
}
