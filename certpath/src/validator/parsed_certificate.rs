//! Wrapper around a decoded certificate exposing the fields used during certification path building

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use der::{Decode, Encode};
use spki::SubjectPublicKeyInfoOwned;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::Certificate;

use crate::util::error::*;
use crate::util::pdv_utilities::*;

/// `ParsedCertificateList` is a typedef for a vector of shared [`ParsedCertificate`] instances, i.e.,
/// the unit in which issuer sources deliver candidate issuers.
pub type ParsedCertificateList = Vec<Arc<ParsedCertificate>>;

/// [`ParsedCertificate`] aggregates a binary, DER-encoded Certificate, the parsed Certificate and
/// the identity fields consulted while building certification paths. Instances are never modified
/// after creation and are shared via `Arc`.
#[readonly::make]
#[derive(Clone, Eq, PartialEq)]
pub struct ParsedCertificate {
    /// Binary, encoded Certificate object
    pub encoded_cert: Vec<u8>,
    /// Decoded Certificate object
    pub decoded_cert: Certificate,
    /// DER encoding of the subject name
    pub subject_der: Vec<u8>,
    /// DER encoding of the subject public key info
    pub spki_der: Vec<u8>,
    /// notBefore expressed as seconds since Unix epoch
    pub not_before: u64,
    /// notAfter expressed as seconds since Unix epoch
    pub not_after: u64,
    /// Value of the subject key identifier extension, if present
    pub skid: Option<Vec<u8>>,
    /// Value of the keyIdentifier field of the authority key identifier extension, if present
    pub akid: Option<Vec<u8>>,
    /// True if the subject and issuer names match
    pub self_issued: bool,
}

impl ParsedCertificate {
    /// Subject name
    pub fn subject(&self) -> &Name {
        &self.decoded_cert.tbs_certificate.subject
    }

    /// Issuer name
    pub fn issuer(&self) -> &Name {
        &self.decoded_cert.tbs_certificate.issuer
    }

    /// Subject public key info
    pub fn spki(&self) -> &SubjectPublicKeyInfoOwned {
        &self.decoded_cert.tbs_certificate.subject_public_key_info
    }

    /// Serial number
    pub fn serial_number(&self) -> &SerialNumber {
        &self.decoded_cert.tbs_certificate.serial_number
    }

    /// Encoded certificate
    pub fn der(&self) -> &[u8] {
        self.encoded_cert.as_slice()
    }

    /// `same_name_and_spki` returns true if the other certificate has the same subject name and the
    /// same subject public key info as this one, i.e., the two certificates represent the same
    /// entity for loop checking purposes.
    pub fn same_name_and_spki(&self, other: &ParsedCertificate) -> bool {
        self.spki_der == other.spki_der
            && (self.subject_der == other.subject_der || compare_names(self.subject(), other.subject()))
    }

    fn from_parts(encoded_cert: Vec<u8>, decoded_cert: Certificate) -> Result<Self> {
        let tbs = &decoded_cert.tbs_certificate;
        let subject_der = tbs.subject.to_der()?;
        let spki_der = tbs.subject_public_key_info.to_der()?;
        let not_before = tbs.validity.not_before.to_unix_duration().as_secs();
        let not_after = tbs.validity.not_after.to_unix_duration().as_secs();
        let skid = get_subject_key_identifier(&decoded_cert)?;
        let akid = get_authority_key_identifier(&decoded_cert)?;
        let self_issued = is_self_issued(&decoded_cert);
        Ok(ParsedCertificate {
            encoded_cert,
            decoded_cert,
            subject_der,
            spki_der,
            not_before,
            not_after,
            skid,
            akid,
            self_issued,
        })
    }
}

impl TryFrom<&[u8]> for ParsedCertificate {
    type Error = Error;

    fn try_from(enc_cert: &[u8]) -> Result<Self> {
        let cert = Certificate::from_der(enc_cert)?;
        ParsedCertificate::from_parts(enc_cert.to_vec(), cert)
    }
}

impl TryFrom<Certificate> for ParsedCertificate {
    type Error = Error;

    fn try_from(cert: Certificate) -> Result<Self> {
        let enc_cert = cert.to_der()?;
        ParsedCertificate::from_parts(enc_cert, cert)
    }
}

impl fmt::Debug for ParsedCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedCertificate")
            .field("subject", &name_to_string(self.subject()))
            .field("issuer", &name_to_string(self.issuer()))
            .field("serial", &buffer_to_hex(self.serial_number().as_bytes()))
            .finish()
    }
}

impl fmt::Display for ParsedCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", name_to_string(self.subject()))
    }
}

#[test]
fn parse_garbage_test() {
    let r = ParsedCertificate::try_from([0x30u8, 0x03, 0x02, 0x01, 0x01].as_slice());
    assert!(matches!(r, Err(Error::Asn1Error(_))));
}
