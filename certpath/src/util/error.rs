//! Error types

use core::fmt;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// Status codes attached to individual certificates within a candidate certification path.
///
/// Codes are produced by the path builder itself (trust store verdicts, dead ends and resource
/// limits), by a [`ChainValidator`](crate::ChainValidator) or by a
/// [`PathBuilderDelegate`](crate::PathBuilderDelegate) after validation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum PathValidationStatus {
    /// No errors were encountered while validating certification path
    Valid,
    /// DistrustedByTrustStore occurs when a trust store explicitly distrusts a certificate in the
    /// candidate path.
    DistrustedByTrustStore,
    /// NoIssuersFound occurs when path building reaches a certificate that is not a trust anchor and
    /// for which no usable issuer certificates could be found.
    NoIssuersFound,
    /// IterationLimitExceeded occurs when path building is stopped because the number of node
    /// expansions reached the configured limit.
    IterationLimitExceeded,
    /// DeadlineExceeded occurs when path building is stopped because the configured deadline passed.
    DeadlineExceeded,
    /// NameChainingFailure occurs when a CertificationPath features certificates for which the subject
    /// name of a superior certificate does not match the issuer name of the immediately subordinate certificate.
    NameChainingFailure,
    /// SignatureVerificationFailure occurs when a superior certificate cannot have issued the
    /// immediately subordinate certificate.
    SignatureVerificationFailure,
    /// InvalidNotBeforeDate occurs when a CertificationPath features a certificate that contains a notBefore
    /// date that is after the time of interest used for a certification path validation operation.
    InvalidNotBeforeDate,
    /// InvalidNotAfterDate occurs when a CertificationPath features a certificate that contains a notAfter
    /// date that is before the time of interest used for a certification path validation operation.
    InvalidNotAfterDate,
    /// MissingCertificate occurs when a chain presented for validation is empty.
    MissingCertificate,
    /// RejectedByDelegate is available to path builder delegates that reject (or annotate) a path
    /// after it has been validated.
    RejectedByDelegate,
    /// A configuration error was detected. See textual log output for more details.
    Misconfiguration,
}

/// Error type
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// PathValidationError encountered
    PathValidation(PathValidationStatus),
    /// NotFound occurs when an action failed because a necessary artifact was not found.
    NotFound,
    /// Unrecognized occurs when an error conditions does not match anything else here.
    Unrecognized,
    /// An artifact could not be parsed
    ParseError,
    /// Asn1Error is used to propagate error information from the x509 crate.
    Asn1Error(der::Error),
    /// Error encapsulates an error derived from [std::io::ErrorKind]
    StdIoError(std::io::ErrorKind),
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::Asn1Error(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::StdIoError(err.kind())
    }
}

impl fmt::Display for PathValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValidationStatus::Valid => write!(f, "Valid"),
            PathValidationStatus::DistrustedByTrustStore => write!(f, "DistrustedByTrustStore"),
            PathValidationStatus::NoIssuersFound => write!(f, "NoIssuersFound"),
            PathValidationStatus::IterationLimitExceeded => write!(f, "IterationLimitExceeded"),
            PathValidationStatus::DeadlineExceeded => write!(f, "DeadlineExceeded"),
            PathValidationStatus::NameChainingFailure => write!(f, "Name chaining failure"),
            PathValidationStatus::SignatureVerificationFailure => {
                write!(f, "Signature verification failure")
            }
            PathValidationStatus::InvalidNotBeforeDate => write!(f, "InvalidNotBeforeDate"),
            PathValidationStatus::InvalidNotAfterDate => write!(f, "InvalidNotAfterDate"),
            PathValidationStatus::MissingCertificate => write!(f, "MissingCertificate"),
            PathValidationStatus::RejectedByDelegate => write!(f, "RejectedByDelegate"),
            PathValidationStatus::Misconfiguration => write!(f, "Misconfiguration"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PathValidation(err) => write!(f, "PathValidationError: {}", err),
            Error::NotFound => write!(f, "NotFound"),
            Error::Unrecognized => write!(f, "Unrecognized"),
            Error::ParseError => write!(f, "ParseError"),
            Error::Asn1Error(err) => write!(f, "Asn1Error: {}", err),
            Error::StdIoError(err) => write!(f, "StdError: {:?}", err),
        }
    }
}

impl std::error::Error for Error {}

#[test]
fn error_test() {
    assert_eq!("Valid", format!("{}", PathValidationStatus::Valid));
    assert_eq!(
        "DistrustedByTrustStore",
        format!("{}", PathValidationStatus::DistrustedByTrustStore)
    );
    assert_eq!(
        "NoIssuersFound",
        format!("{}", PathValidationStatus::NoIssuersFound)
    );
    let _s = format!("{}", PathValidationStatus::IterationLimitExceeded);
    let _s = format!("{}", PathValidationStatus::DeadlineExceeded);
    let _s = format!("{}", PathValidationStatus::NameChainingFailure);
    let _s = format!("{}", PathValidationStatus::SignatureVerificationFailure);
    let _s = format!("{}", PathValidationStatus::InvalidNotBeforeDate);
    let _s = format!("{}", PathValidationStatus::InvalidNotAfterDate);
    let _s = format!("{}", PathValidationStatus::MissingCertificate);
    let _s = format!("{}", PathValidationStatus::RejectedByDelegate);
    let _s = format!("{}", PathValidationStatus::Misconfiguration);

    assert_eq!(
        "PathValidationError: NoIssuersFound",
        format!(
            "{}",
            Error::PathValidation(PathValidationStatus::NoIssuersFound)
        )
    );
    let _s = format!("{}", Error::NotFound);
    let _s = format!("{}", Error::Unrecognized);
    let _s = format!("{}", Error::ParseError);
    let e: Error = std::io::Error::from(std::io::ErrorKind::NotFound).into();
    assert_eq!(Error::StdIoError(std::io::ErrorKind::NotFound), e);
}
