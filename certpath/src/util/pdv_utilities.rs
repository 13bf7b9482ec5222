//! Utility functions that support certification path building

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use log::error;

use const_oid::db::rfc5280::{ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_SUBJECT_KEY_IDENTIFIER};
use der::asn1::{Ia5String, PrintableString, Utf8StringRef};
use der::{Decode, Encode, Tagged};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::ext::pkix::{AuthorityKeyIdentifier, SubjectKeyIdentifier};
use x509_cert::name::Name;
use x509_cert::Certificate;

use crate::util::error::*;

/// `name_to_string` returns a string representation of given Name value.
pub fn name_to_string(name: &Name) -> String {
    name.to_string()
}

/// Retrieves a string value from the last RDN element in the presented Name, or an empty string
/// for an empty name.
pub fn get_leaf_rdn(name: &Name) -> String {
    match name.0.last() {
        Some(rdn) => rdn.to_string(),
        None => String::new(),
    }
}

/// `buffer_to_hex` returns a string of upper case ASCII hex characters (without commas, spaces, or
/// brackets) representing the given buffer.
pub fn buffer_to_hex(buffer: &[u8]) -> String {
    buffer.iter().map(|b| format!("{:02X}", b)).collect()
}

pub(crate) fn log_error_for_name(name: &Name, msg: &str) {
    let name_str = name_to_string(name);
    error!(
        "Encountered error while processing certificate with subject {}: {}",
        name_str, msg
    );
}

/// get_value_from_rdn returns the value from AttributeTypeAndValue as a string for use in comparing
/// values where leading whitespace may be a factor
pub fn get_value_from_rdn(atav: &AttributeTypeAndValue) -> Result<String> {
    let val = match atav.value.tag() {
        der::Tag::PrintableString => atav
            .value
            .decode_as()
            .ok()
            .map(|s: PrintableString| s.to_string()),
        der::Tag::Utf8String => atav
            .value
            .decode_as()
            .ok()
            .map(|s: Utf8StringRef<'_>| s.to_string()),
        der::Tag::Ia5String => atav
            .value
            .decode_as()
            .ok()
            .map(|s: Ia5String| s.to_string()),
        _ => None,
    };

    match val {
        Some(val) => Ok(val),
        None => {
            let val = atav.value.to_der()?;
            Ok(format!("{}=#{}", atav.oid, buffer_to_hex(&val)))
        }
    }
}

/// [`compare_names`] compares two Name values returning true if they match and false otherwise.
///
/// Attribute values that differ only in case, leading or trailing whitespace or runs of internal
/// whitespace are treated as equal.
pub fn compare_names(left: &Name, right: &Name) -> bool {
    if left == right {
        return true;
    }

    // no match if not the same number of RDNs
    if left.0.len() != right.0.len() {
        return false;
    }

    for (lrdn, rrdn) in left.0.iter().zip(right.0.iter()) {
        if lrdn.0.len() != rrdn.0.len() {
            return false;
        }
        if lrdn == rrdn {
            continue;
        }

        for (l, r) in lrdn.0.iter().zip(rrdn.0.iter()) {
            if l.oid != r.oid {
                return false;
            }
            let (l_val, r_val) = match (get_value_from_rdn(l), get_value_from_rdn(r)) {
                (Ok(l_val), Ok(r_val)) => (l_val, r_val),
                _ => return false,
            };

            if normalize_value(&l_val) != normalize_value(&r_val) {
                return false;
            }
        }
    }
    true
}

// collapse multiple whitespace instances into one and convert to lowercase
fn normalize_value(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase()
}

/// `normalized_name_string` renders a Name as a string that is equal for any two names that
/// [`compare_names`] considers a match. It is suitable as a lookup key for name-indexed maps.
pub fn normalized_name_string(name: &Name) -> String {
    name.0
        .iter()
        .map(|rdn| {
            rdn.0
                .iter()
                .map(|atav| match get_value_from_rdn(atav) {
                    Ok(v) => format!("{}={}", atav.oid, normalize_value(&v)),
                    Err(_) => atav.to_string(),
                })
                .collect::<Vec<String>>()
                .join("+")
        })
        .collect::<Vec<String>>()
        .join(",")
}

/// `is_self_issued` returns true if the subject field in the certificate is the same as the issuer
/// field.
pub fn is_self_issued(cert: &Certificate) -> bool {
    compare_names(&cert.tbs_certificate.issuer, &cert.tbs_certificate.subject)
}

/// `get_subject_key_identifier` returns the key identifier from the subject key identifier
/// extension, if present.
pub fn get_subject_key_identifier(cert: &Certificate) -> Result<Option<Vec<u8>>> {
    if let Some(exts) = &cert.tbs_certificate.extensions {
        for ext in exts {
            if ext.extn_id == ID_CE_SUBJECT_KEY_IDENTIFIER {
                let skid = SubjectKeyIdentifier::from_der(ext.extn_value.as_bytes())?;
                return Ok(Some(skid.0.as_bytes().to_vec()));
            }
        }
    }
    Ok(None)
}

/// `get_authority_key_identifier` returns the keyIdentifier field from the authority key
/// identifier extension, if present. An extension that only carries issuer name and serial number
/// yields `None`.
pub fn get_authority_key_identifier(cert: &Certificate) -> Result<Option<Vec<u8>>> {
    if let Some(exts) = &cert.tbs_certificate.extensions {
        for ext in exts {
            if ext.extn_id == ID_CE_AUTHORITY_KEY_IDENTIFIER {
                let akid = AuthorityKeyIdentifier::from_der(ext.extn_value.as_bytes())?;
                return Ok(akid.key_identifier.map(|kid| kid.as_bytes().to_vec()));
            }
        }
    }
    Ok(None)
}

#[test]
fn buffer_to_hex_test() {
    use hex_literal::hex;

    assert_eq!("", buffer_to_hex(&[]));
    assert_eq!("00A1FF", buffer_to_hex(&[0x00, 0xa1, 0xff]));
    let skid = hex!("6C8A94A277B180721D817A16AAF2DCCE66EE45C0");
    assert_eq!("6C8A94A277B180721D817A16AAF2DCCE66EE45C0", buffer_to_hex(&skid));
}

#[test]
fn compare_names_test() {
    use core::str::FromStr;

    let a = Name::from_str("CN=Test CA,O=Example").unwrap();
    let b = Name::from_str("CN=test   ca,O=EXAMPLE").unwrap();
    let c = Name::from_str("CN=Other CA,O=Example").unwrap();
    let d = Name::from_str("CN=Test CA").unwrap();
    assert!(compare_names(&a, &a));
    assert!(compare_names(&a, &b));
    assert!(!compare_names(&a, &c));
    assert!(!compare_names(&a, &d));
    assert_eq!("CN=Test CA", get_leaf_rdn(&d));

    assert_eq!(normalized_name_string(&a), normalized_name_string(&b));
    assert_ne!(normalized_name_string(&a), normalized_name_string(&c));
    assert_ne!(normalized_name_string(&a), normalized_name_string(&d));
    assert_eq!("2.5.4.3=test ca", normalized_name_string(&d));
}
