//! Depth-first certification path building with backtracking
//!
//! [`CertPathBuilder`] searches from a target certificate towards a trust anchor. Each step of the
//! search asks the certificate at the top of an explicit stack for its next candidate issuer:
//!
//! - a distrusted candidate closes the branch and is recorded as an invalid path
//! - a trusted candidate completes a path, which is validated and recorded
//! - any other candidate is pushed and becomes the certificate whose issuers are sought next
//! - when a certificate has no more candidates it is popped
//!
//! The search stops when a valid path is found (unless exploring all paths), when the stack is
//! empty, or when the iteration limit or deadline is reached.
//!
//! ```no_run
//! use std::sync::Arc;
//! use certpath::*;
//!
//! async fn build(
//!     target: Arc<ParsedCertificate>,
//!     trust_store: &TrustStoreInMemory,
//!     intermediates: &CertIssuerSourceStatic,
//! ) -> bool {
//!     let delegate = BasicChainValidator::new();
//!     let mut builder = CertPathBuilder::new(
//!         target,
//!         trust_store,
//!         &delegate,
//!         TimeOfInterest::now(),
//!         PolicyConstraints::default(),
//!     );
//!     builder.add_cert_issuer_source(intermediates);
//!     builder.set_iteration_limit(1000);
//!     let result = builder.run().await;
//!     result.has_valid_path()
//! }
//! ```

use alloc::format;
use alloc::sync::Arc;
use alloc::{vec, vec::Vec};
use std::time::Instant;

use crate::builder::cert_issuers_iter::CertIssuersIter;
use crate::{
    log_message, name_to_string, CertIssuerSource, CertPathBuilderResult, CertificateTrust,
    CertificationPathSettings, ParsedCertificate, ParsedCertificateList, PathBuilderDelegate,
    PathValidationStatus, PeLogLevels, PolicyConstraints, Result, ResultPath, TimeOfInterest,
    TrustStore,
};

/// [`BuildBudget`] tracks the resources consumed by a path building operation.
#[derive(Clone, Debug)]
pub struct BuildBudget {
    iteration_limit: u32,
    iterations: u32,
    deadline: Option<Instant>,
}

impl BuildBudget {
    /// Creates a budget. An iteration limit of zero means unlimited.
    pub fn new(iteration_limit: u32, deadline: Option<Instant>) -> Self {
        BuildBudget {
            iteration_limit,
            iterations: 0,
            deadline,
        }
    }

    /// `check` reports whether another node expansion may be performed. The deadline is checked
    /// before the iteration limit.
    pub fn check(&self) -> core::result::Result<(), PathValidationStatus> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(PathValidationStatus::DeadlineExceeded);
            }
        }
        if self.iteration_limit > 0 && self.iterations >= self.iteration_limit {
            return Err(PathValidationStatus::IterationLimitExceeded);
        }
        Ok(())
    }

    /// Records a node expansion
    pub fn consume_iteration(&mut self) {
        self.iterations = self.iterations.saturating_add(1);
    }

    /// Number of node expansions recorded so far
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

/// [`CertPathBuilder`] finds certification paths from a target certificate to a trust anchor.
///
/// The builder borrows its trust store, delegate and issuer sources for its lifetime. Running the
/// builder consumes it.
pub struct CertPathBuilder<'a> {
    target: Arc<ParsedCertificate>,
    trust_store: &'a dyn TrustStore,
    delegate: &'a dyn PathBuilderDelegate,
    time_of_interest: TimeOfInterest,
    policy: PolicyConstraints,
    sources: Vec<&'a dyn CertIssuerSource>,
    iteration_limit: u32,
    deadline: Option<Instant>,
    explore_all_paths: bool,
}

impl<'a> CertPathBuilder<'a> {
    /// Creates a builder with no iteration limit and no deadline that stops at the first valid path.
    /// If the trust store also serves as an issuer source it is the first source consulted.
    pub fn new(
        target: Arc<ParsedCertificate>,
        trust_store: &'a dyn TrustStore,
        delegate: &'a dyn PathBuilderDelegate,
        time_of_interest: TimeOfInterest,
        policy: PolicyConstraints,
    ) -> Self {
        CertPathBuilder {
            target,
            trust_store,
            delegate,
            time_of_interest,
            policy,
            sources: trust_store.issuer_source().into_iter().collect(),
            iteration_limit: 0,
            deadline: None,
            explore_all_paths: false,
        }
    }

    /// Creates a builder configured from a [`CertificationPathSettings`] instance, i.e., time of
    /// interest, policy constraints, iteration limit, explore all paths and build timeout. The
    /// deadline is computed relative to the time this function is called.
    pub fn from_settings(
        target: Arc<ParsedCertificate>,
        trust_store: &'a dyn TrustStore,
        delegate: &'a dyn PathBuilderDelegate,
        cps: &CertificationPathSettings,
    ) -> Result<Self> {
        let mut builder = CertPathBuilder::new(
            target,
            trust_store,
            delegate,
            cps.get_time_of_interest_value()?,
            cps.get_policy_constraints(),
        );
        builder.set_iteration_limit(cps.get_iteration_limit());
        builder.set_explore_all_paths(cps.get_explore_all_paths());
        if let Some(timeout) = cps.get_build_timeout() {
            builder.set_deadline(Instant::now() + timeout);
        }
        Ok(builder)
    }

    /// Adds an issuer source. Sources are queried in the order added, after the trust store.
    pub fn add_cert_issuer_source(&mut self, source: &'a dyn CertIssuerSource) {
        self.sources.push(source);
    }

    /// Sets the maximum number of node expansions. Zero means unlimited.
    pub fn set_iteration_limit(&mut self, limit: u32) {
        self.iteration_limit = limit;
    }

    /// Sets the time after which no further node expansions are performed.
    pub fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    /// Returns the deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// When set, the search continues after finding a valid path.
    pub fn set_explore_all_paths(&mut self, explore_all_paths: bool) {
        self.explore_all_paths = explore_all_paths;
    }

    /// `run` performs the search and returns every path recorded along the way.
    pub async fn run(self) -> CertPathBuilderResult {
        let mut result = CertPathBuilderResult::new();
        let mut budget = BuildBudget::new(self.iteration_limit, self.deadline);
        let target = self.target.clone();

        let target_trust = self.trust_store.get_trust(&target);
        match target_trust {
            CertificateTrust::Distrusted => {
                let mut path = ResultPath::new(vec![target], target_trust);
                path.errors
                    .get_errors_for_cert(0)
                    .add_error(PathValidationStatus::DistrustedByTrustStore, None);
                self.record_invalid_path(&mut result, path);
                return result;
            }
            CertificateTrust::Trusted => {
                if self.complete_path(&mut result, vec![target.clone()], target_trust)
                    && !self.explore_all_paths
                {
                    return result;
                }
            }
            CertificateTrust::Unspecified => {}
        }

        let mut path: ParsedCertificateList = vec![target.clone()];
        let mut stack: Vec<CertIssuersIter> = vec![CertIssuersIter::new(target, target_trust)];

        while let Some(node) = stack.last_mut() {
            if let Err(status) = budget.check() {
                let mut partial = ResultPath::new(path.clone(), node.trust());
                partial
                    .errors
                    .get_errors_for_cert(path.len() - 1)
                    .add_error(status, None);
                if status == PathValidationStatus::DeadlineExceeded {
                    result.set_exceeded_deadline();
                } else {
                    result.set_exceeded_iteration_limit();
                }
                log_message(
                    &PeLogLevels::PeError,
                    format!(
                        "Path building for {} stopped after {} iteration(s): {}",
                        name_to_string(self.target.subject()),
                        budget.iterations(),
                        status
                    )
                    .as_str(),
                );
                self.record_invalid_path(&mut result, partial);
                break;
            }
            budget.consume_iteration();

            let candidate = match node
                .next_issuer(&path, self.trust_store, &self.sources)
                .await
            {
                Some(candidate) => candidate,
                None => {
                    log_message(
                        &PeLogLevels::PeDebug,
                        format!(
                            "Issuers of {} exhausted at depth {}",
                            name_to_string(node.cert().subject()),
                            path.len() - 1
                        )
                        .as_str(),
                    );
                    if !node.had_non_skipped_issuers() && !node.trust().is_trusted() {
                        let mut partial = ResultPath::new(path.clone(), node.trust());
                        partial
                            .errors
                            .get_errors_for_cert(path.len() - 1)
                            .add_error(PathValidationStatus::NoIssuersFound, None);
                        self.record_invalid_path(&mut result, partial);
                    }
                    stack.pop();
                    path.pop();
                    continue;
                }
            };

            match candidate.trust {
                CertificateTrust::Distrusted => {
                    let mut certs = path.clone();
                    certs.push(candidate.cert);
                    let pos = certs.len() - 1;
                    let mut distrusted = ResultPath::new(certs, candidate.trust);
                    distrusted
                        .errors
                        .get_errors_for_cert(pos)
                        .add_error(PathValidationStatus::DistrustedByTrustStore, None);
                    self.record_invalid_path(&mut result, distrusted);
                }
                CertificateTrust::Trusted => {
                    let mut certs = path.clone();
                    certs.push(candidate.cert);
                    if self.complete_path(&mut result, certs, candidate.trust)
                        && !self.explore_all_paths
                    {
                        log_message(
                            &PeLogLevels::PeInfo,
                            format!(
                                "Found valid path for {} after {} iteration(s)",
                                name_to_string(self.target.subject()),
                                budget.iterations()
                            )
                            .as_str(),
                        );
                        break;
                    }
                }
                CertificateTrust::Unspecified => {
                    path.push(candidate.cert.clone());
                    stack.push(CertIssuersIter::new(candidate.cert, candidate.trust));
                }
            }
        }

        result.set_iteration_count(budget.iterations());
        result
    }

    /// Validates a structurally complete path, runs the delegate hook and records the path.
    /// Returns true if the recorded path is valid.
    fn complete_path(
        &self,
        result: &mut CertPathBuilderResult,
        certs: ParsedCertificateList,
        last_cert_trust: CertificateTrust,
    ) -> bool {
        let mut path = ResultPath::new(certs, last_cert_trust);
        self.delegate.validate(
            &path.certs,
            self.time_of_interest,
            &self.policy,
            &mut path.errors,
        );
        self.delegate.check_path_after_verification(&mut path);
        let valid = path.is_valid();
        log_message(
            &PeLogLevels::PeDebug,
            format!(
                "Recorded {} path of length {} for {}",
                if valid { "valid" } else { "invalid" },
                path.len(),
                name_to_string(self.target.subject())
            )
            .as_str(),
        );
        result.add_path(path);
        valid
    }

    fn record_invalid_path(&self, result: &mut CertPathBuilderResult, path: ResultPath) {
        log_message(
            &PeLogLevels::PeDebug,
            format!(
                "Recorded invalid path of length {} for {}: {}",
                path.len(),
                name_to_string(self.target.subject()),
                match path.errors.first_error_status() {
                    Some(status) => format!("{}", status),
                    None => format!("{}", PathValidationStatus::Valid),
                }
            )
            .as_str(),
        );
        result.add_path(path);
    }
}

#[test]
fn build_budget_iteration_limit_test() {
    let mut budget = BuildBudget::new(2, None);
    assert_eq!(Ok(()), budget.check());
    budget.consume_iteration();
    assert_eq!(Ok(()), budget.check());
    budget.consume_iteration();
    assert_eq!(
        Err(PathValidationStatus::IterationLimitExceeded),
        budget.check()
    );
    assert_eq!(2, budget.iterations());

    let mut unlimited = BuildBudget::new(0, None);
    for _ in 0..100 {
        unlimited.consume_iteration();
    }
    assert_eq!(Ok(()), unlimited.check());
}

#[test]
fn build_budget_deadline_test() {
    let past = BuildBudget::new(1, Some(Instant::now()));
    assert_eq!(Err(PathValidationStatus::DeadlineExceeded), past.check());

    let future = BuildBudget::new(0, Some(Instant::now() + std::time::Duration::from_secs(3600)));
    assert_eq!(Ok(()), future.check());
}
