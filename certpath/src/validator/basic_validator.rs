//! A basic chain validator that checks name chaining, key identifier chaining and validity periods

use alloc::format;
use alloc::string::ToString;
use alloc::sync::Arc;

use crate::{
    environment::pki_environment_traits::*, util::pdv_utilities::*, CertPathErrors,
    CertificationPathSettings, ParsedCertificate, PathValidationStatus, PolicyConstraints,
    TimeOfInterest,
};

/// [`BasicChainValidator`] performs the structural checks that can be made without cryptography:
///
/// - name chaining, i.e., each certificate's issuer name matches the subject name of the next
///   certificate in the chain
/// - key identifier chaining, i.e., a certificate whose authority key identifier names a key other
///   than the one identified by the next certificate's subject key identifier cannot have been
///   signed by that certificate
/// - validity periods at the time of interest (unless the time of interest is disabled or
///   `ignore_expired` is set)
///
/// Policy constraints are accepted but not evaluated.
#[derive(Clone, Debug, Default)]
pub struct BasicChainValidator {
    /// Tolerate certificates that are expired or not yet valid
    pub ignore_expired: bool,
}

impl BasicChainValidator {
    /// BasicChainValidator::new instantiates a validator that enforces validity periods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiates a validator configured from `PS_IGNORE_EXPIRED`.
    pub fn from_settings(cps: &CertificationPathSettings) -> Self {
        BasicChainValidator {
            ignore_expired: cps.get_ignore_expired(),
        }
    }

    fn check_validity(
        &self,
        chain: &[Arc<ParsedCertificate>],
        time_of_interest: TimeOfInterest,
        errors: &mut CertPathErrors,
    ) {
        if self.ignore_expired || time_of_interest.is_disabled() {
            return;
        }
        for (pos, cert) in chain.iter().enumerate() {
            if let Err(status) = time_of_interest.check_validity(cert.not_before, cert.not_after) {
                log_error_for_name(
                    cert.subject(),
                    format!(
                        "certificate is not valid at the time of interest ({})",
                        time_of_interest
                    )
                    .as_str(),
                );
                errors
                    .get_errors_for_cert(pos)
                    .add_error(status, Some(time_of_interest.to_string()));
            }
        }
    }
}

impl ChainValidator for BasicChainValidator {
    fn validate(
        &self,
        chain: &[Arc<ParsedCertificate>],
        time_of_interest: TimeOfInterest,
        _policy: &PolicyConstraints,
        errors: &mut CertPathErrors,
    ) {
        if chain.is_empty() {
            errors
                .get_other_errors()
                .add_error(PathValidationStatus::MissingCertificate, None);
            return;
        }

        for (pos, pair) in chain.windows(2).enumerate() {
            let (child, parent) = (&pair[0], &pair[1]);
            if !compare_names(child.issuer(), parent.subject()) {
                log_error_for_name(child.subject(), "name chaining violation");
                errors.get_errors_for_cert(pos).add_error(
                    PathValidationStatus::NameChainingFailure,
                    Some(name_to_string(parent.subject())),
                );
            }
            if let (Some(akid), Some(skid)) = (&child.akid, &parent.skid) {
                if akid != skid {
                    log_error_for_name(
                        child.subject(),
                        "authority key identifier does not match issuer's subject key identifier",
                    );
                    errors.get_errors_for_cert(pos).add_error(
                        PathValidationStatus::SignatureVerificationFailure,
                        Some(buffer_to_hex(skid)),
                    );
                }
            }
        }

        self.check_validity(chain, time_of_interest, errors);
    }
}

impl PathBuilderDelegate for BasicChainValidator {}

#[test]
fn empty_chain_test() {
    let mut errors = CertPathErrors::new();
    BasicChainValidator::new().validate(
        &[],
        TimeOfInterest::disabled(),
        &PolicyConstraints::default(),
        &mut errors,
    );
    assert!(errors.contains_error(PathValidationStatus::MissingCertificate));
    assert!(errors.contains_high_severity_errors());
}

#[test]
fn from_settings_test() {
    let mut cps = CertificationPathSettings::new();
    assert!(!BasicChainValidator::from_settings(&cps).ignore_expired);
    cps.set_ignore_expired(true);
    assert!(BasicChainValidator::from_settings(&cps).ignore_expired);
}
