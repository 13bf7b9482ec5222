//! Search nodes: a certificate in the candidate path along with the issuers not yet attempted for it

use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;

use futures::future;
use futures::stream::{select_all, SelectAll, StreamExt};

use crate::builder::loop_checker::would_loop;
use crate::builder::prioritizer::{order_in_place, CandidateIssuer};
use crate::{
    log_message, name_to_string, CertIssuerSource, CertificateTrust, IssuerRequest,
    ParsedCertificate, ParsedCertificateList, PeLogLevels, TrustStore,
};

/// [`CertIssuersIter`] yields the candidate issuers of one certificate in priority order.
///
/// Candidates are gathered lazily. The first call queries every source synchronously. When those
/// candidates have been handed out, every source is asked to start an asynchronous lookup and the
/// resulting batches are merged as they arrive. Each merged batch is filtered (loop check and
/// duplicate encodings) and the candidates that have not been handed out yet are re-ordered.
///
/// Dropping the iterator drops any outstanding asynchronous requests.
pub struct CertIssuersIter {
    cert: Arc<ParsedCertificate>,
    trust: CertificateTrust,
    candidates: Vec<CandidateIssuer>,
    cursor: usize,
    did_sync_query: bool,
    did_async_query: bool,
    pending: Option<SelectAll<IssuerRequest>>,
}

impl CertIssuersIter {
    /// Creates a node for the presented certificate and its trust verdict. No source is consulted
    /// until the first call to [`next_issuer`](CertIssuersIter::next_issuer).
    pub fn new(cert: Arc<ParsedCertificate>, trust: CertificateTrust) -> Self {
        CertIssuersIter {
            cert,
            trust,
            candidates: Vec::new(),
            cursor: 0,
            did_sync_query: false,
            did_async_query: false,
            pending: None,
        }
    }

    /// Certificate this node gathers issuers for
    pub fn cert(&self) -> &Arc<ParsedCertificate> {
        &self.cert
    }

    /// Trust verdict for the node's certificate
    pub fn trust(&self) -> CertificateTrust {
        self.trust
    }

    /// True if at least one candidate survived filtering, whether or not it has been handed out yet
    pub fn had_non_skipped_issuers(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// `next_issuer` returns the next candidate issuer, waiting on asynchronous requests when the
    /// candidates available so far are exhausted. None indicates all sources are exhausted.
    ///
    /// `path` is the candidate path ending with this node's certificate.
    pub async fn next_issuer(
        &mut self,
        path: &[Arc<ParsedCertificate>],
        trust_store: &dyn TrustStore,
        sources: &[&dyn CertIssuerSource],
    ) -> Option<CandidateIssuer> {
        if !self.did_sync_query {
            self.did_sync_query = true;
            for source in sources {
                let batch = source.sync_get_issuers_of(&self.cert);
                self.add_issuers(batch, path, trust_store);
            }
        }

        loop {
            if let Some(candidate) = self.candidates.get(self.cursor) {
                self.cursor += 1;
                return Some(candidate.clone());
            }

            if !self.did_async_query {
                self.did_async_query = true;
                self.start_async_queries(sources);
            }

            let pending = self.pending.as_mut()?;
            match pending.next().await {
                Some(batch) => self.add_issuers(batch, path, trust_store),
                None => {
                    self.pending = None;
                    return None;
                }
            }
        }
    }

    fn start_async_queries(&mut self, sources: &[&dyn CertIssuerSource]) {
        let requests: Vec<IssuerRequest> = sources
            .iter()
            .filter_map(|source| source.async_get_issuers_of(&self.cert))
            .map(|request| {
                request
                    .take_while(|batch| future::ready(!batch.is_empty()))
                    .boxed()
            })
            .collect();
        if !requests.is_empty() {
            log_message(
                &PeLogLevels::PeDebug,
                format!(
                    "Started {} asynchronous issuer request(s) for {}",
                    requests.len(),
                    name_to_string(self.cert.subject())
                )
                .as_str(),
            );
            self.pending = Some(select_all(requests));
        }
    }

    fn add_issuers(
        &mut self,
        batch: ParsedCertificateList,
        path: &[Arc<ParsedCertificate>],
        trust_store: &dyn TrustStore,
    ) {
        if batch.is_empty() {
            return;
        }
        for cert in batch {
            if would_loop(path, &cert) {
                log_message(
                    &PeLogLevels::PeDebug,
                    format!(
                        "Skipping candidate issuer {} that would form a loop",
                        name_to_string(cert.subject())
                    )
                    .as_str(),
                );
                continue;
            }
            if self.candidates.iter().any(|c| c.cert.der() == cert.der()) {
                continue;
            }
            let trust = trust_store.get_trust(&cert);
            self.candidates.push(CandidateIssuer { cert, trust });
        }
        order_in_place(&self.cert, &mut self.candidates[self.cursor..]);
    }
}
