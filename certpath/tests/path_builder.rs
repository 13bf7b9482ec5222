
use std::sync::Arc;
use std::time::{Duration, Instant};

use builder_utils::*;
use certpath::*;

fn new_builder<'a>(
    target: &Arc<ParsedCertificate>,
    trust_store: &'a dyn TrustStore,
    delegate: &'a dyn PathBuilderDelegate,
) -> CertPathBuilder<'a> {
    CertPathBuilder::new(
        target.clone(),
        trust_store,
        delegate,
        toi(),
        PolicyConstraints::default(),
    )
}

/// Target issued by an intermediate that is available in two versions (same name and key,
/// different validity), each issued by either of two versions of a trusted root.
struct TwoByTwo {
    target: Arc<ParsedCertificate>,
    new_int: Arc<ParsedCertificate>,
    old_int: Arc<ParsedCertificate>,
    new_root: Arc<ParsedCertificate>,
    old_root: Arc<ParsedCertificate>,
}

impl TwoByTwo {
    fn new() -> Self {
        TwoByTwo {
            target: CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build(),
            new_int: CertParams::new("CN=Intermediate", "CN=Root", 2, 3)
                .serial(20)
                .validity(DEFAULT_NOT_BEFORE + 1000, DEFAULT_NOT_AFTER)
                .build(),
            old_int: CertParams::new("CN=Intermediate", "CN=Root", 2, 3)
                .serial(21)
                .build(),
            new_root: CertParams::root("CN=Root", 3)
                .serial(30)
                .validity(DEFAULT_NOT_BEFORE + 1000, DEFAULT_NOT_AFTER)
                .build(),
            old_root: CertParams::root("CN=Root", 3).serial(31).build(),
        }
    }

    fn source(&self) -> CertIssuerSourceStatic {
        static_source(&[&self.old_root, &self.old_int, &self.new_root, &self.new_int])
    }

    fn reversed_source(&self) -> CertIssuerSourceStatic {
        static_source(&[&self.new_int, &self.new_root, &self.old_int, &self.old_root])
    }

    fn trust_store(&self) -> TrustStoreInMemory {
        trust_anchors(&[&self.new_root, &self.old_root])
    }
}

#[tokio::test]
async fn simple_chain() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&int, &root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(result.has_valid_path());
    assert_eq!(1, result.paths.len());
    assert_eq!(0, result.best_result_index);
    assert!(!result.exceeded_iteration_limit);
    assert!(!result.exceeded_deadline);
    assert_eq!(2, result.iteration_count);
    let best = result.get_best_valid_path().unwrap();
    assert!(same_certs(best, &[&target, &int, &root]));
    assert_eq!(CertificateTrust::Trusted, best.last_cert_trust);
    result.log_result();
}

// Backtracking: the chain through F (available synchronously) dead ends, the chain through C
// (available only asynchronously) reaches a trust anchor.
#[tokio::test]
async fn backtracking_sync_then_async() {
    let target = CertParams::new("CN=Target", "CN=B", 1, 2).build();
    let b_by_f = CertParams::new("CN=B", "CN=F", 2, 6).serial(100).build();
    let f = CertParams::new("CN=F", "CN=Nowhere", 6, 9).build();
    let b_by_c = CertParams::new("CN=B", "CN=C", 2, 3).serial(101).build();
    let c = CertParams::root("CN=C", 3).build();

    let sync_source = static_source(&[&b_by_f, &f]);
    let async_source = AsyncStaticSource::new(&[&b_by_c, &c]);
    let trust_store = trust_anchors(&[&c]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&sync_source);
    builder.add_cert_issuer_source(&async_source);
    let result = builder.run().await;

    assert!(result.has_valid_path());
    assert_eq!(2, result.paths.len());
    assert_eq!(1, result.best_result_index);

    let dead_end = &result.paths[0];
    assert!(!dead_end.is_valid());
    assert!(same_certs(dead_end, &[&target, &b_by_f, &f]));
    assert!(dead_end
        .errors
        .errors_for_cert(2)
        .unwrap()
        .contains_error(PathValidationStatus::NoIssuersFound));

    let valid = &result.paths[1];
    assert!(valid.is_valid());
    assert!(same_certs(valid, &[&target, &b_by_c, &c]));
}

#[tokio::test]
async fn distrusted_intermediate() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&int, &root]);
    let mut trust_store = trust_anchors(&[&root]);
    trust_store.add_distrusted_certificate(&int);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(!result.has_valid_path());
    assert!(result.get_best_valid_path().is_err());
    let best = result.get_best_path_possibly_invalid().unwrap();
    assert_eq!(2, best.certs.len());
    assert!(same_certs(best, &[&target, &int]));
    assert!(best.contains_error(PathValidationStatus::DistrustedByTrustStore));
    assert_eq!(CertificateTrust::Distrusted, best.last_cert_trust);
}

#[tokio::test]
async fn distrusted_target() {
    let target = CertParams::new("CN=Target", "CN=Root", 1, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&root]);
    let mut trust_store = trust_anchors(&[&root]);
    trust_store.add_distrusted_certificate(&target);
    let delegate = RecordingDelegate::new(DelegateMode::NoOp);

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(!result.has_valid_path());
    assert_eq!(1, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target]));
    assert!(result.paths[0].contains_error(PathValidationStatus::DistrustedByTrustStore));
    assert_eq!(0, delegate.calls());
}

#[tokio::test]
async fn target_is_trust_anchor() {
    let target = CertParams::root("CN=Anchor", 1).build();
    let trust_store = trust_anchors(&[&target]);
    let delegate = RecordingDelegate::new(DelegateMode::NoOp);

    let result = new_builder(&target, &trust_store, &delegate).run().await;

    assert!(result.has_valid_path());
    assert_eq!(1, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target]));
    assert_eq!(1, delegate.calls());
    assert_eq!(0, result.iteration_count);
}

#[tokio::test]
async fn self_issued_anchor_preferred() {
    let target = CertParams::new("CN=Target", "CN=Root", 1, 3).build();
    // cross-certified version of the root is newer but not self-issued
    let cross_root = CertParams::new("CN=Root", "CN=Other Root", 3, 4)
        .serial(40)
        .validity(DEFAULT_NOT_BEFORE + 5000, DEFAULT_NOT_AFTER)
        .build();
    let self_signed_root = CertParams::root("CN=Root", 3).serial(41).build();
    let source = static_source(&[&cross_root, &self_signed_root]);
    let trust_store = trust_anchors(&[&cross_root, &self_signed_root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;
    assert_eq!(1, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target, &self_signed_root]));

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    builder.set_explore_all_paths(true);
    let result = builder.run().await;
    assert_eq!(2, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target, &self_signed_root]));
    assert!(same_certs(&result.paths[1], &[&target, &cross_root]));
    assert_eq!(0, result.best_result_index);
}

#[tokio::test]
async fn no_valid_path_reports_longest_attempt() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=Missing Root", 2, 3).build();
    let unrelated = CertParams::root("CN=Unrelated", 8).build();
    let source = static_source(&[&int]);
    let trust_store = trust_anchors(&[&unrelated]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(!result.has_valid_path());
    assert!(!result.paths.is_empty());
    let best = result.get_best_path_possibly_invalid().unwrap();
    assert_eq!(
        vec!["CN=Target".to_string(), "CN=Intermediate".to_string()],
        subjects(best)
    );
    assert!(best.contains_error(PathValidationStatus::NoIssuersFound));
}

#[tokio::test]
async fn target_without_issuers() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let trust_store = TrustStoreInMemory::new();
    let delegate = BasicChainValidator::new();

    let result = new_builder(&target, &trust_store, &delegate).run().await;

    assert!(!result.has_valid_path());
    assert_eq!(1, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target]));
    assert!(result.paths[0]
        .errors
        .errors_for_cert(0)
        .unwrap()
        .contains_error(PathValidationStatus::NoIssuersFound));
}

#[tokio::test]
async fn loops_are_not_followed() {
    let target = CertParams::new("CN=Target", "CN=A", 1, 2).build();
    let a_by_b = CertParams::new("CN=A", "CN=B", 2, 3).build();
    let b_by_a = CertParams::new("CN=B", "CN=A", 3, 2).build();
    // same entity as a_by_b, re-issued
    let a_by_b_again = CertParams::new("CN=A", "CN=B", 2, 3).serial(99).build();
    let source = static_source(&[&a_by_b, &b_by_a, &a_by_b_again]);
    let trust_store = TrustStoreInMemory::new();
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(!result.has_valid_path());
    assert!(!result.paths.is_empty());
    for path in &result.paths {
        for (i, a) in path.certs.iter().enumerate() {
            for b in path.certs.iter().skip(i + 1) {
                assert!(!a.same_name_and_spki(b));
            }
        }
    }
}

#[tokio::test]
async fn explore_all_paths() {
    let fixture = TwoByTwo::new();
    let source = fixture.source();
    let trust_store = fixture.trust_store();
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&fixture.target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    builder.set_explore_all_paths(true);
    let result = builder.run().await;

    assert_eq!(4, result.paths.len());
    assert!(result.paths.iter().all(|p| p.is_valid()));
    assert!(same_certs(
        &result.paths[0],
        &[&fixture.target, &fixture.new_int, &fixture.new_root]
    ));
    assert!(same_certs(
        &result.paths[1],
        &[&fixture.target, &fixture.new_int, &fixture.old_root]
    ));
    assert!(same_certs(
        &result.paths[2],
        &[&fixture.target, &fixture.old_int, &fixture.new_root]
    ));
    assert!(same_certs(
        &result.paths[3],
        &[&fixture.target, &fixture.old_int, &fixture.old_root]
    ));
    assert_eq!(9, result.iteration_count);
}

#[tokio::test]
async fn explore_all_paths_with_iteration_limit() {
    let fixture = TwoByTwo::new();
    let source = fixture.source();
    let trust_store = fixture.trust_store();
    let delegate = BasicChainValidator::new();

    // (limit, number of complete paths, last partial path or None)
    let expectations: Vec<(u32, usize, Option<Vec<&Arc<ParsedCertificate>>>)> = vec![
        (0, 4, None),
        (1, 0, Some(vec![&fixture.target, &fixture.new_int])),
        (2, 1, Some(vec![&fixture.target, &fixture.new_int])),
        (3, 2, Some(vec![&fixture.target, &fixture.new_int])),
        (4, 2, Some(vec![&fixture.target])),
        (5, 2, Some(vec![&fixture.target, &fixture.old_int])),
        (6, 3, Some(vec![&fixture.target, &fixture.old_int])),
        (7, 4, Some(vec![&fixture.target, &fixture.old_int])),
    ];

    for (limit, valid_paths, partial) in expectations {
        let mut builder = new_builder(&fixture.target, &trust_store, &delegate);
        builder.add_cert_issuer_source(&source);
        builder.set_explore_all_paths(true);
        builder.set_iteration_limit(limit);
        let result = builder.run().await;

        let complete = result.paths.iter().filter(|p| p.is_valid()).count();
        assert_eq!(valid_paths, complete, "limit {}", limit);
        match partial {
            None => {
                assert!(!result.exceeded_iteration_limit, "limit {}", limit);
                assert_eq!(valid_paths, result.paths.len(), "limit {}", limit);
            }
            Some(expected) => {
                assert!(result.exceeded_iteration_limit, "limit {}", limit);
                assert_eq!(valid_paths + 1, result.paths.len(), "limit {}", limit);
                let last = &result.paths[result.paths.len() - 1];
                assert!(same_certs(last, &expected), "limit {}", limit);
                assert!(last
                    .errors
                    .errors_for_cert(expected.len() - 1)
                    .unwrap()
                    .contains_error(PathValidationStatus::IterationLimitExceeded));
                assert_eq!(limit, result.iteration_count);
            }
        }
    }
}

#[tokio::test]
async fn iteration_limit() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&int, &root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    builder.set_iteration_limit(2);
    let result = builder.run().await;
    assert!(result.has_valid_path());
    assert!(!result.exceeded_iteration_limit);

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    builder.set_iteration_limit(1);
    let result = builder.run().await;
    assert!(!result.has_valid_path());
    assert!(result.exceeded_iteration_limit);
    assert!(!result.exceeded_deadline);
    let best = result.get_best_path_possibly_invalid().unwrap();
    assert!(same_certs(best, &[&target, &int]));
    assert!(best.contains_error(PathValidationStatus::IterationLimitExceeded));
}

#[tokio::test]
async fn deadline_already_passed() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&int, &root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let deadline = Instant::now();
    builder.set_deadline(deadline);
    assert_eq!(Some(deadline), builder.deadline());
    let result = builder.run().await;

    assert!(!result.has_valid_path());
    assert!(result.exceeded_deadline);
    assert!(!result.exceeded_iteration_limit);
    assert_eq!(1, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target]));
    assert!(result.paths[0].contains_error(PathValidationStatus::DeadlineExceeded));
    assert_eq!(0, result.iteration_count);
}

#[tokio::test]
async fn deadline_passes_while_waiting_for_issuers() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let slow_source = AsyncStaticSource::with_delay(&[&int], Duration::from_millis(100));
    let root_source = static_source(&[&root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&slow_source);
    builder.add_cert_issuer_source(&root_source);
    builder.set_deadline(Instant::now() + Duration::from_millis(10));
    let result = builder.run().await;

    assert!(!result.has_valid_path());
    assert!(result.exceeded_deadline);
    let last = &result.paths[result.paths.len() - 1];
    assert!(same_certs(last, &[&target, &int]));
    assert!(last
        .errors
        .errors_for_cert(1)
        .unwrap()
        .contains_error(PathValidationStatus::DeadlineExceeded));
}

#[tokio::test]
async fn from_settings() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&int, &root]);
    let trust_store = trust_anchors(&[&root]);

    let mut cps = CertificationPathSettings::new();
    cps.set_time_of_interest(TOI);
    cps.set_iteration_limit(1);
    cps.set_build_timeout(Duration::from_secs(3600));
    let delegate = BasicChainValidator::from_settings(&cps);

    let mut builder = CertPathBuilder::from_settings(target.clone(), &trust_store, &delegate, &cps)
        .unwrap();
    assert!(builder.deadline().is_some());
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;
    assert!(result.exceeded_iteration_limit);
    assert!(!result.has_valid_path());

    cps.set_iteration_limit(0);
    let mut builder = CertPathBuilder::from_settings(target.clone(), &trust_store, &delegate, &cps)
        .unwrap();
    builder.add_cert_issuer_source(&source);
    assert!(builder.run().await.has_valid_path());
}

#[tokio::test]
async fn expired_certificates() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3)
        .validity(DEFAULT_NOT_BEFORE, TOI - 1)
        .build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&int, &root]);
    let trust_store = trust_anchors(&[&root]);

    let delegate = BasicChainValidator::new();
    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;
    assert!(!result.has_valid_path());
    let best = result.get_best_path_possibly_invalid().unwrap();
    assert!(same_certs(best, &[&target, &int, &root]));
    assert!(best
        .errors
        .errors_for_cert(1)
        .unwrap()
        .contains_error(PathValidationStatus::InvalidNotAfterDate));

    let mut cps = CertificationPathSettings::new();
    cps.set_ignore_expired(true);
    let delegate = BasicChainValidator::from_settings(&cps);
    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    assert!(builder.run().await.has_valid_path());
}

#[tokio::test]
async fn newer_intermediate_preferred() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let expired_int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3)
        .serial(10)
        .validity(DEFAULT_NOT_BEFORE - 1000, TOI - 1)
        .build();
    let current_int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3)
        .serial(11)
        .build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&expired_int, &root, &current_int]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(result.has_valid_path());
    assert_eq!(1, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target, &current_int, &root]));
}

#[tokio::test]
async fn key_identifier_match_preferred() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let mismatched = CertParams::new("CN=Intermediate", "CN=Root", 5, 3).build();
    let no_skid = CertParams::new("CN=Intermediate", "CN=Root", 7, 3)
        .without_skid()
        .build();
    let matched = CertParams::new("CN=Intermediate", "CN=Root", 2, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&mismatched, &no_skid, &matched, &root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    builder.set_explore_all_paths(true);
    let result = builder.run().await;

    assert_eq!(3, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target, &matched, &root]));
    assert!(same_certs(&result.paths[1], &[&target, &no_skid, &root]));
    assert!(same_certs(&result.paths[2], &[&target, &mismatched, &root]));
    assert!(result.paths[0].is_valid());
    assert!(result.paths[1].is_valid());
    assert!(!result.paths[2].is_valid());
    assert!(result.paths[2]
        .errors
        .errors_for_cert(0)
        .unwrap()
        .contains_error(PathValidationStatus::SignatureVerificationFailure));
    assert_eq!(0, result.best_result_index);
}

#[tokio::test]
async fn order_independent_of_source_order() {
    let fixture = TwoByTwo::new();
    let source = fixture.source();
    let reversed = fixture.reversed_source();
    let trust_store = fixture.trust_store();
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&fixture.target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    builder.set_explore_all_paths(true);
    let result = builder.run().await;

    let mut builder = new_builder(&fixture.target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&reversed);
    builder.set_explore_all_paths(true);
    let reversed_result = builder.run().await;

    assert_eq!(result.paths.len(), reversed_result.paths.len());
    for (a, b) in result.paths.iter().zip(reversed_result.paths.iter()) {
        let a_certs: Vec<&[u8]> = a.certs.iter().map(|c| c.der()).collect();
        let b_certs: Vec<&[u8]> = b.certs.iter().map(|c| c.der()).collect();
        assert_eq!(a_certs, b_certs);
    }
    assert_eq!(result.best_result_index, reversed_result.best_result_index);
}

#[tokio::test]
async fn multiple_async_batches_from_one_source() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let dead_end_int = CertParams::new("CN=Intermediate", "CN=Nowhere", 2, 9)
        .serial(50)
        .build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3)
        .serial(51)
        .build();
    let root = CertParams::root("CN=Root", 3).build();

    let mut mock = MockIssuerSource::new();
    mock.add_async_batches(&target, vec![vec![dead_end_int.clone()], vec![int.clone()]]);
    let root_source = static_source(&[&root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&mock);
    builder.add_cert_issuer_source(&root_source);
    let result = builder.run().await;

    assert!(result.has_valid_path());
    assert_eq!(2, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target, &dead_end_int]));
    assert!(result.paths[0].contains_error(PathValidationStatus::NoIssuersFound));
    assert!(same_certs(&result.paths[1], &[&target, &int, &root]));
    assert_eq!(1, result.best_result_index);
    assert_eq!(1, mock.async_calls_for(&target));
}

#[tokio::test]
async fn duplicate_async_batches() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let dead_end_int = CertParams::new("CN=Intermediate", "CN=Nowhere", 2, 9).build();

    let mut mock = MockIssuerSource::new();
    mock.add_async_batches(
        &target,
        vec![vec![dead_end_int.clone()], vec![dead_end_int.clone()]],
    );
    let trust_store = TrustStoreInMemory::new();
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&mock);
    let result = builder.run().await;

    assert!(!result.has_valid_path());
    assert_eq!(1, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target, &dead_end_int]));
}

#[tokio::test]
async fn sync_and_async_duplicates() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3).build();
    let root = CertParams::root("CN=Root", 3).build();

    let sync_source = static_source(&[&int, &root]);
    let async_source = AsyncStaticSource::new(&[&int, &root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&sync_source);
    builder.add_cert_issuer_source(&async_source);
    builder.set_explore_all_paths(true);
    let result = builder.run().await;

    assert_eq!(1, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target, &int, &root]));
}

#[tokio::test]
async fn no_async_queries_when_sync_path_found() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let other_int = CertParams::new("CN=Intermediate", "CN=Other", 2, 4).build();

    let sync_source = static_source(&[&int, &root]);
    let mut mock = MockIssuerSource::new();
    mock.add_async_batches(&target, vec![vec![other_int]]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&sync_source);
    builder.add_cert_issuer_source(&mock);
    let result = builder.run().await;

    assert!(result.has_valid_path());
    assert_eq!(2, mock.sync_calls());
    assert_eq!(0, mock.async_calls());
}

#[tokio::test]
async fn async_queries_issued_together() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let dead_end_int = CertParams::new("CN=Intermediate", "CN=Nowhere", 2, 9)
        .serial(60)
        .build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3)
        .serial(61)
        .build();
    let root = CertParams::root("CN=Root", 3).build();

    let mut first = MockIssuerSource::new();
    first.add_async_batches(&target, vec![vec![dead_end_int.clone()]]);
    let mut second = MockIssuerSource::new();
    second.add_async_batches(&target, vec![vec![int.clone()]]);
    let root_source = static_source(&[&root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&first);
    builder.add_cert_issuer_source(&second);
    builder.add_cert_issuer_source(&root_source);
    let result = builder.run().await;

    assert!(result.has_valid_path());
    assert_eq!(1, first.async_calls_for(&target));
    assert_eq!(1, second.async_calls_for(&target));
    let best = result.get_best_valid_path().unwrap();
    assert!(same_certs(best, &[&target, &int, &root]));
}

#[tokio::test]
async fn delegate_no_op() {
    let target = CertParams::new("CN=Target", "CN=Root", 1, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = RecordingDelegate::new(DelegateMode::NoOp);

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(result.has_valid_path());
    assert_eq!(1, delegate.calls());
    assert!(result.paths[0].errors.errors_for_cert(1).map_or(true, |e| e.is_empty()));
    assert!(result.paths[0].delegate_data.is_none());
}

#[tokio::test]
async fn delegate_adds_warning() {
    let target = CertParams::new("CN=Target", "CN=Root", 1, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = RecordingDelegate::new(DelegateMode::AddWarning);

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(result.has_valid_path());
    let best = result.get_best_valid_path().unwrap();
    assert!(best.contains_error(PathValidationStatus::RejectedByDelegate));
    assert!(best.is_valid());
}

#[tokio::test]
async fn delegate_adds_error() {
    let target = CertParams::new("CN=Target", "CN=Root", 1, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = RecordingDelegate::new(DelegateMode::AddError);

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(!result.has_valid_path());
    assert_eq!(1, result.paths.len());
    assert_eq!(1, delegate.calls());
    assert!(result.paths[0].contains_error(PathValidationStatus::RejectedByDelegate));
    assert_eq!(Err(Error::NotFound), result.get_best_valid_path().map(|_| ()));
}

#[tokio::test]
async fn delegate_attaches_data() {
    let target = CertParams::new("CN=Target", "CN=Root", 1, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&root]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = RecordingDelegate::new(DelegateMode::AttachData);

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    let best = result.get_best_valid_path().unwrap();
    let data = best.delegate_data.as_ref().unwrap();
    assert_eq!(Some(&2usize), data.downcast_ref::<usize>());
}

#[tokio::test]
async fn target_directly_issued_by_trust_anchor() {
    let target = CertParams::new("CN=Target", "CN=Root", 1, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let result = new_builder(&target, &trust_store, &delegate).run().await;

    assert!(result.has_valid_path());
    assert_eq!(1, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target, &root]));
    assert_eq!(CertificateTrust::Trusted, result.paths[0].last_cert_trust);
    assert_eq!(1, result.iteration_count);
}

#[tokio::test]
async fn distrusted_path_preferred_over_partial_path() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=Root", 2, 3).build();
    let dead_end_int = CertParams::new("CN=Intermediate", "CN=Nowhere", 2, 9)
        .serial(50)
        .validity(DEFAULT_NOT_BEFORE - 1000, DEFAULT_NOT_AFTER)
        .build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&int, &dead_end_int]);
    let mut trust_store = TrustStoreInMemory::new();
    trust_store.add_distrusted_certificate(&root);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(!result.has_valid_path());
    assert_eq!(2, result.paths.len());
    assert!(same_certs(&result.paths[1], &[&target, &dead_end_int]));
    assert!(result.paths[1].contains_error(PathValidationStatus::NoIssuersFound));
    assert_eq!(0, result.best_result_index);
    let best = result.get_best_path_possibly_invalid().unwrap();
    assert!(same_certs(best, &[&target, &int, &root]));
    assert!(best.contains_error(PathValidationStatus::DistrustedByTrustStore));
    assert_eq!(CertificateTrust::Distrusted, best.last_cert_trust);
}

#[tokio::test]
async fn issuer_name_matched_ignoring_case() {
    let target = CertParams::new("CN=Target", "CN=intermediate", 1, 2).build();
    let int = CertParams::new("CN=Intermediate", "CN=ROOT", 2, 3).build();
    let root = CertParams::root("CN=Root", 3).build();
    let source = static_source(&[&int]);
    let trust_store = trust_anchors(&[&root]);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(result.has_valid_path());
    assert_eq!(1, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target, &int, &root]));
}

// authorityCertIssuer and authorityCertSerialNumber do not influence candidate order, so the
// intermediates are tried newest first.
#[tokio::test]
async fn key_identifier_issuer_and_serial_ignored() {
    let target = CertParams::new("CN=Target", "CN=Intermediate", 1, 2)
        .akid_issuer_and_serial("CN=Root", 10)
        .build();
    let int_mismatch = CertParams::new("CN=Intermediate", "CN=Root", 5, 3)
        .serial(30)
        .validity(DEFAULT_NOT_BEFORE + 200, DEFAULT_NOT_AFTER)
        .build();
    let int_match_name_only = CertParams::new("CN=Intermediate", "CN=Root", 6, 3)
        .serial(31)
        .validity(DEFAULT_NOT_BEFORE + 100, DEFAULT_NOT_AFTER)
        .build();
    let int_matching = CertParams::new("CN=Intermediate", "CN=Root", 7, 3)
        .serial(10)
        .build();
    let root = CertParams::root("CN=Root", 3).build();
    assert!(target.akid.is_none());

    let source = static_source(&[&int_matching, &int_match_name_only, &int_mismatch]);
    let mut trust_store = TrustStoreInMemory::new();
    trust_store.add_distrusted_certificate(&root);
    let delegate = BasicChainValidator::new();

    let mut builder = new_builder(&target, &trust_store, &delegate);
    builder.add_cert_issuer_source(&source);
    let result = builder.run().await;

    assert!(!result.has_valid_path());
    assert_eq!(3, result.paths.len());
    assert!(same_certs(&result.paths[0], &[&target, &int_mismatch, &root]));
    assert!(same_certs(&result.paths[1], &[&target, &int_match_name_only, &root]));
    assert!(same_certs(&result.paths[2], &[&target, &int_matching, &root]));
    assert!(result
        .paths
        .iter()
        .all(|p| p.contains_error(PathValidationStatus::DistrustedByTrustStore)));
    assert_eq!(0, result.best_result_index);
}
