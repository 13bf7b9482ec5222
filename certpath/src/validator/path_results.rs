//! Structures and functions related to results from certification path building operations

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::{
    is_log_enabled, log_message, name_to_string, CertPathErrors, CertificateTrust, Error,
    ParsedCertificateList, PathValidationStatus, PeLogLevels, Result,
};

/// [`ResultPath`] is a candidate certification path recorded by the path builder along with the
/// errors recorded against it. `certs[0]` is always the target certificate.
pub struct ResultPath {
    /// Certificates in the path, beginning with the target
    pub certs: ParsedCertificateList,
    /// Errors recorded against certificates in the path
    pub errors: CertPathErrors,
    /// Trust verdict for the last certificate in `certs`
    pub last_cert_trust: CertificateTrust,
    /// Opaque data attached by a [`PathBuilderDelegate`](crate::PathBuilderDelegate)
    pub delegate_data: Option<Box<dyn Any + Send + Sync>>,
}

impl ResultPath {
    /// Creates a new [`ResultPath`] with no errors
    pub fn new(certs: ParsedCertificateList, last_cert_trust: CertificateTrust) -> Self {
        ResultPath {
            certs,
            errors: CertPathErrors::new(),
            last_cert_trust,
            delegate_data: None,
        }
    }

    /// A path is valid if no high severity error was recorded against it.
    pub fn is_valid(&self) -> bool {
        !self.errors.contains_high_severity_errors()
    }

    /// True if an error (of any severity) with the given status was recorded against the path.
    pub fn contains_error(&self, status: PathValidationStatus) -> bool {
        self.errors.contains_error(status)
    }

    /// Number of certificates in the path
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// True if the path has no certificates
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    fn describe(&self) -> String {
        let names: Vec<String> = self
            .certs
            .iter()
            .map(|c| name_to_string(c.subject()))
            .collect();
        names.join(" -> ")
    }
}

impl fmt::Debug for ResultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultPath")
            .field("certs", &self.certs)
            .field("errors", &self.errors)
            .field("last_cert_trust", &self.last_cert_trust)
            .field("delegate_data", &self.delegate_data.is_some())
            .finish()
    }
}

/// [`CertPathBuilderResult`] is returned by [`CertPathBuilder::run`](crate::CertPathBuilder::run).
/// It lists every path recorded during the search, in the order recorded, and identifies the best
/// one.
#[readonly::make]
#[derive(Debug, Default)]
pub struct CertPathBuilderResult {
    /// Paths recorded during the search
    pub paths: Vec<ResultPath>,
    /// Index of the first valid path if there is one, otherwise of the most informative invalid path
    pub best_result_index: usize,
    /// True if the search stopped because the iteration limit was reached
    pub exceeded_iteration_limit: bool,
    /// True if the search stopped because the deadline passed
    pub exceeded_deadline: bool,
    /// Number of node expansions performed
    pub iteration_count: u32,
}

impl CertPathBuilderResult {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a path, updating `best_result_index`, and returns its index.
    pub(crate) fn add_path(&mut self, path: ResultPath) -> usize {
        let index = self.paths.len();
        self.paths.push(path);
        if index == 0 {
            self.best_result_index = 0;
            return index;
        }

        let best = &self.paths[self.best_result_index];
        let added = &self.paths[index];
        if !best.is_valid() && (added.is_valid() || is_more_informative(added, best)) {
            self.best_result_index = index;
        }
        index
    }

    pub(crate) fn set_exceeded_iteration_limit(&mut self) {
        self.exceeded_iteration_limit = true;
    }

    pub(crate) fn set_exceeded_deadline(&mut self) {
        self.exceeded_deadline = true;
    }

    pub(crate) fn set_iteration_count(&mut self, count: u32) {
        self.iteration_count = count;
    }

    /// True if the best path is valid
    pub fn has_valid_path(&self) -> bool {
        match self.paths.get(self.best_result_index) {
            Some(p) => p.is_valid(),
            None => false,
        }
    }

    /// Returns the best valid path or [`Error::NotFound`] if none was found.
    pub fn get_best_valid_path(&self) -> Result<&ResultPath> {
        match self.paths.get(self.best_result_index) {
            Some(p) if p.is_valid() => Ok(p),
            _ => Err(Error::NotFound),
        }
    }

    /// Returns the best path, which may be invalid, or None if no path was recorded.
    pub fn get_best_path_possibly_invalid(&self) -> Option<&ResultPath> {
        self.paths.get(self.best_result_index)
    }

    /// `log_result` writes a summary of the search and each recorded path to the log.
    pub fn log_result(&self) {
        if !is_log_enabled(&PeLogLevels::PeInfo) {
            return;
        }
        log_message(
            &PeLogLevels::PeInfo,
            format!(
                "Path building recorded {} path(s) after {} iteration(s); best index: {}; valid: {}; exceeded iteration limit: {}; exceeded deadline: {}",
                self.paths.len(),
                self.iteration_count,
                self.best_result_index,
                self.has_valid_path(),
                self.exceeded_iteration_limit,
                self.exceeded_deadline
            )
            .as_str(),
        );
        for (i, path) in self.paths.iter().enumerate() {
            log_message(
                &PeLogLevels::PeInfo,
                format!(
                    "Path {} ({}, last certificate {:?}): {}",
                    i,
                    if path.is_valid() { "valid" } else { "invalid" },
                    path.last_cert_trust,
                    path.describe()
                )
                .as_str(),
            );
            for (pos, err) in path.errors.iter() {
                let msg = match pos {
                    Some(pos) => format!(" - certificate {}: {}", pos, err),
                    None => format!(" - path: {}", err),
                };
                log_message(&PeLogLevels::PeInfo, msg.as_str());
            }
        }
    }
}

fn is_distrust_failure(p: &ResultPath) -> bool {
    p.contains_error(PathValidationStatus::DistrustedByTrustStore)
}

/// Ranks invalid paths: longer paths first, then a failure other than distrust over a distrust
/// failure. Ties keep the earlier path.
fn is_more_informative(candidate: &ResultPath, current: &ResultPath) -> bool {
    if candidate.len() != current.len() {
        return candidate.len() > current.len();
    }
    !is_distrust_failure(candidate) && is_distrust_failure(current)
}

#[test]
fn best_result_index_test() {
    use alloc::vec;

    let mut result = CertPathBuilderResult::new();
    assert!(!result.has_valid_path());
    assert!(result.get_best_path_possibly_invalid().is_none());
    assert_eq!(Err(Error::NotFound), result.get_best_valid_path().map(|_| ()));

    let mut distrusted = ResultPath::new(vec![], CertificateTrust::Distrusted);
    distrusted
        .errors
        .get_errors_for_cert(0)
        .add_error(PathValidationStatus::DistrustedByTrustStore, None);
    assert_eq!(0, result.add_path(distrusted));
    assert_eq!(0, result.best_result_index);

    let mut dead_end = ResultPath::new(vec![], CertificateTrust::Unspecified);
    dead_end
        .errors
        .get_errors_for_cert(0)
        .add_error(PathValidationStatus::NoIssuersFound, None);
    assert_eq!(1, result.add_path(dead_end));
    assert_eq!(1, result.best_result_index);

    let mut another_dead_end = ResultPath::new(vec![], CertificateTrust::Unspecified);
    another_dead_end
        .errors
        .get_other_errors()
        .add_error(PathValidationStatus::NoIssuersFound, None);
    result.add_path(another_dead_end);
    assert_eq!(1, result.best_result_index);
    assert!(!result.has_valid_path());

    let mut valid = ResultPath::new(vec![], CertificateTrust::Trusted);
    valid
        .errors
        .get_errors_for_cert(0)
        .add_warning(PathValidationStatus::RejectedByDelegate, None);
    result.add_path(valid);
    assert_eq!(3, result.best_result_index);
    assert!(result.has_valid_path());
    assert!(result.get_best_valid_path().is_ok());

    // the first valid path stays best
    result.add_path(ResultPath::new(vec![], CertificateTrust::Trusted));
    assert_eq!(3, result.best_result_index);
    result.log_result();
}
