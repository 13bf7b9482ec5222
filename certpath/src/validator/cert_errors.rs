//! Per-certificate error records attached to candidate certification paths

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::PathValidationStatus;

/// Severity of a [`CertError`]. Paths with at least one `Error` severity record are invalid.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational, does not affect validity
    Warning,
    /// Renders the path invalid
    Error,
}

/// [`CertError`] couples a status code with a severity and optional detail text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CertError {
    /// Error kind
    pub status: PathValidationStatus,
    /// Severity
    pub severity: Severity,
    /// Optional human readable detail
    pub detail: Option<String>,
}

impl fmt::Display for CertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        match &self.detail {
            Some(d) => write!(f, "{}: {} ({})", sev, self.status, d),
            None => write!(f, "{}: {}", sev, self.status),
        }
    }
}

/// [`CertErrors`] collects the errors recorded against a single certificate.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CertErrors(pub Vec<CertError>);

impl CertErrors {
    /// Creates a new empty [`CertErrors`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error
    pub fn add_error(&mut self, status: PathValidationStatus, detail: Option<String>) {
        self.0.push(CertError {
            status,
            severity: Severity::Error,
            detail,
        });
    }

    /// Records a warning
    pub fn add_warning(&mut self, status: PathValidationStatus, detail: Option<String>) {
        self.0.push(CertError {
            status,
            severity: Severity::Warning,
            detail,
        });
    }

    /// True if any record has `Error` severity
    pub fn contains_high_severity_errors(&self) -> bool {
        self.0.iter().any(|e| e.severity == Severity::Error)
    }

    /// True if any record carries the given status
    pub fn contains_error(&self, status: PathValidationStatus) -> bool {
        self.0.iter().any(|e| e.status == status)
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// [`CertPathErrors`] holds one [`CertErrors`] per certificate position in a candidate path plus a
/// bucket for errors that apply to the path as a whole.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CertPathErrors {
    cert_errors: Vec<CertErrors>,
    other_errors: CertErrors,
}

impl CertPathErrors {
    /// Creates a new empty [`CertPathErrors`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the errors for the certificate at the given index, growing storage as needed
    pub fn get_errors_for_cert(&mut self, index: usize) -> &mut CertErrors {
        if self.cert_errors.len() <= index {
            self.cert_errors.resize_with(index + 1, CertErrors::new);
        }
        &mut self.cert_errors[index]
    }

    /// Returns the errors for the certificate at the given index without growing storage
    pub fn errors_for_cert(&self, index: usize) -> Option<&CertErrors> {
        self.cert_errors.get(index)
    }

    /// Returns the errors that are not associated with a particular certificate
    pub fn get_other_errors(&mut self) -> &mut CertErrors {
        &mut self.other_errors
    }

    /// True if any record anywhere has `Error` severity
    pub fn contains_high_severity_errors(&self) -> bool {
        self.other_errors.contains_high_severity_errors()
            || self
                .cert_errors
                .iter()
                .any(CertErrors::contains_high_severity_errors)
    }

    /// True if any record anywhere carries the given status
    pub fn contains_error(&self, status: PathValidationStatus) -> bool {
        self.other_errors.contains_error(status)
            || self.cert_errors.iter().any(|e| e.contains_error(status))
    }

    /// Returns the status of the first high severity record, scanning the path-wide bucket first
    /// then certificates in path order.
    pub fn first_error_status(&self) -> Option<PathValidationStatus> {
        core::iter::once(&self.other_errors)
            .chain(self.cert_errors.iter())
            .flat_map(|e| e.0.iter())
            .find(|e| e.severity == Severity::Error)
            .map(|e| e.status)
    }

    /// Iterates over `(certificate index, error)` pairs for logging.
    pub fn iter(&self) -> impl Iterator<Item = (Option<usize>, &CertError)> + '_ {
        self.other_errors
            .0
            .iter()
            .map(|e| (None, e))
            .chain(
                self.cert_errors
                    .iter()
                    .enumerate()
                    .flat_map(|(i, errs)| errs.0.iter().map(move |e| (Some(i), e))),
            )
    }
}

#[test]
fn cert_path_errors_test() {
    let mut errs = CertPathErrors::new();
    assert!(!errs.contains_high_severity_errors());
    assert!(errs.errors_for_cert(2).is_none());

    errs.get_errors_for_cert(2)
        .add_warning(PathValidationStatus::RejectedByDelegate, None);
    assert!(!errs.contains_high_severity_errors());
    assert!(errs.contains_error(PathValidationStatus::RejectedByDelegate));
    assert!(errs.errors_for_cert(1).unwrap().is_empty());

    errs.get_errors_for_cert(0)
        .add_error(PathValidationStatus::NameChainingFailure, Some("x".into()));
    errs.get_other_errors()
        .add_error(PathValidationStatus::MissingCertificate, None);
    assert!(errs.contains_high_severity_errors());
    assert_eq!(
        Some(PathValidationStatus::MissingCertificate),
        errs.first_error_status()
    );
    assert_eq!(3, errs.iter().count());
    assert_eq!(
        "ERROR: Name chaining failure (x)",
        format!("{}", errs.errors_for_cert(0).unwrap().0[0])
    );
}
