//! Public form submission: validate, analyze, store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use case_intake_analysis::iso_timestamp;
use chrono::Utc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::form::{IntakeForm, ValidationErrors};
use crate::gateway::{AnalysisSource, RemoteAnalyzer};
use crate::models::Case;
use crate::storage::KeyValueStorage;
use crate::store::{CaseStore, StoreError};

/// Submission errors.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Invalid submission: {0}")]
    Validation(ValidationErrors),

    #[error("A submission is already in progress")]
    InProgress,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

pub type SubmitResult<T> = Result<T, SubmitError>;

/// A stored submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub case: Case,
    /// Where the attached analysis came from
    pub source: AnalysisSource,
}

/// Handles public intake submissions against a shared store.
pub struct IntakeService<S: KeyValueStorage> {
    store: Arc<Mutex<CaseStore<S>>>,
    analyzer: RemoteAnalyzer,
    in_flight: AtomicBool,
    /// Token of the submission holding `in_flight`; written only under it
    pending: Mutex<Option<CancellationToken>>,
}

impl<S: KeyValueStorage> IntakeService<S> {
    pub fn new(store: Arc<Mutex<CaseStore<S>>>, analyzer: RemoteAnalyzer) -> Self {
        Self {
            store,
            analyzer,
            in_flight: AtomicBool::new(false),
            pending: Mutex::new(None),
        }
    }

    /// Shared handle to the underlying store.
    pub fn store(&self) -> &Arc<Mutex<CaseStore<S>>> {
        &self.store
    }

    pub fn analyzer(&self) -> &RemoteAnalyzer {
        &self.analyzer
    }

    /// True while a submission is waiting on the analyzer.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Cancel the analyzer call of the pending submission, if any.
    ///
    /// The submission still completes with a locally scored analysis.
    /// Returns `false` when nothing was pending.
    pub fn cancel_pending(&self) -> bool {
        let pending = match self.pending.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        match pending.as_ref() {
            Some(token) => {
                tracing::debug!("Cancelling pending analysis");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Validate and store a submission.
    ///
    /// Only one submission may be pending at a time; a second call while the
    /// first awaits the analyzer fails with [`SubmitError::InProgress`]. The
    /// store lock is not held while the analyzer is called. `cancel`, when
    /// given, is linked to the token [`IntakeService::cancel_pending`] fires.
    pub async fn submit(
        &self,
        form: &IntakeForm,
        cancel: Option<&CancellationToken>,
    ) -> SubmitResult<Submission> {
        let errors = form.validate();
        if !errors.is_empty() {
            tracing::debug!(%errors, "Rejected invalid submission");
            return Err(SubmitError::Validation(errors));
        }

        let in_flight = InFlight::acquire(&self.in_flight, &self.pending)
            .ok_or(SubmitError::InProgress)?;
        let token = cancel
            .map(CancellationToken::child_token)
            .unwrap_or_else(CancellationToken::new);
        in_flight.track(token.clone());

        let payload = form.to_payload();
        let outcome = self.analyzer.analyze_intake(&payload, Some(&token)).await;
        let source = outcome.source();
        let analysis_enabled = self.analyzer.config().enable_intake_analysis;

        let now = Utc::now();
        let mut store = self.store.lock().map_err(|_| SubmitError::LockPoisoned)?;
        let case = Case::from_submission(
            store.next_case_id(now),
            payload,
            outcome.into_analysis(),
            analysis_enabled,
            iso_timestamp(now),
        );
        store.add_case(case.clone())?;

        tracing::info!(case_id = %case.id, status = %case.status, ?source, "Case submitted");
        Ok(Submission { case, source })
    }
}

/// Holds the in-flight flag and owns the pending token slot; both are
/// released on drop.
struct InFlight<'a> {
    flag: &'a AtomicBool,
    pending: &'a Mutex<Option<CancellationToken>>,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, pending: &'a Mutex<Option<CancellationToken>>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight { flag, pending })
    }

    fn track(&self, token: CancellationToken) {
        *self.slot() = Some(token);
    }

    fn slot(&self) -> std::sync::MutexGuard<'a, Option<CancellationToken>> {
        match self.pending.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.slot() = None;
        self.flag.store(false, Ordering::Release);
    }
}
