//! In-memory case and partner collections backed by a key-value medium.
//!
//! Every mutation updates memory first and then rewrites the whole affected
//! collection. A failed write is returned to the caller, but the in-memory
//! change stays applied.

mod seed;

pub use seed::*;

use case_intake_analysis::{iso_timestamp, score};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Case, Partner};
use crate::storage::{
    load, save, KeyValueStorage, StorageError, CASES_KEY, CURRENT_PARTNER_KEY, PARTNERS_KEY,
};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Owner of the case and partner collections.
pub struct CaseStore<S: KeyValueStorage> {
    storage: S,
    cases: Vec<Case>,
    partners: Vec<Partner>,
    current_partner_id: Option<String>,
}

impl<S: KeyValueStorage> CaseStore<S> {
    /// Load persisted state, seeding demo data when both collections are empty.
    pub fn open(storage: S) -> StoreResult<Self> {
        Self::open_at(storage, Utc::now())
    }

    /// [`CaseStore::open`] with an explicit clock for seed timestamps.
    pub fn open_at(storage: S, now: DateTime<Utc>) -> StoreResult<Self> {
        let cases: Vec<Case> = load(&storage, CASES_KEY, Vec::new());
        let partners: Vec<Partner> = load(&storage, PARTNERS_KEY, Vec::new());
        let current_partner_id: Option<String> = load(&storage, CURRENT_PARTNER_KEY, None);

        let mut store = Self {
            storage,
            cases,
            partners,
            current_partner_id,
        };

        // Seed whenever both are empty, not only on first run
        if store.cases.is_empty() && store.partners.is_empty() {
            tracing::info!("Storage empty; loading seed data");
            store.cases = seed_cases(&iso_timestamp(now));
            store.partners = seed_partners();
            store.persist_cases()?;
            store.persist_partners()?;
        } else {
            tracing::debug!(
                cases = store.cases.len(),
                partners = store.partners.len(),
                "Loaded persisted state"
            );
        }

        Ok(store)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn partners(&self) -> &[Partner] {
        &self.partners
    }

    pub fn case(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == id)
    }

    pub fn partner(&self, id: &str) -> Option<&Partner> {
        self.partners.iter().find(|p| p.id == id)
    }

    pub fn current_partner_id(&self) -> Option<&str> {
        self.current_partner_id.as_deref()
    }

    /// The partner selected for the partner view, if it still exists.
    pub fn current_partner(&self) -> Option<&Partner> {
        self.current_partner_id().and_then(|id| self.partner(id))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // =========================================================================
    // Case Operations
    // =========================================================================

    /// Append a case. Duplicate IDs are not checked.
    pub fn add_case(&mut self, case: Case) -> StoreResult<()> {
        tracing::debug!(case_id = %case.id, status = %case.status, "Adding case");
        self.cases.push(case);
        self.persist_cases()
    }

    /// Attach a fresh deterministic analysis seeded by the case ID.
    ///
    /// Returns `false` without writing when no case has `id`. Re-analysis is
    /// allowed; status is never moved backwards.
    pub fn analyze_case(&mut self, id: &str) -> StoreResult<bool> {
        let Some(case) = self.cases.iter_mut().find(|c| c.id == id) else {
            tracing::debug!(case_id = id, "Analyze requested for unknown case");
            return Ok(false);
        };

        let analysis = score(&case.id);
        tracing::debug!(case_id = id, score = analysis.score, "Case analyzed");
        case.attach_analysis(analysis);
        self.persist_cases()?;
        Ok(true)
    }

    /// Assign a case to a partner.
    ///
    /// The partner's active flag and capacity are not consulted.
    pub fn assign_case(&mut self, id: &str, partner_id: &str) -> StoreResult<bool> {
        let Some(case) = self.cases.iter_mut().find(|c| c.id == id) else {
            tracing::debug!(case_id = id, "Assign requested for unknown case");
            return Ok(false);
        };

        case.assign_to(partner_id);
        tracing::debug!(case_id = id, partner_id, "Case assigned");
        self.persist_cases()?;
        Ok(true)
    }

    // =========================================================================
    // Partner Operations
    // =========================================================================

    /// Append a partner. Duplicate IDs and emails are not checked.
    pub fn create_partner(&mut self, partner: Partner) -> StoreResult<()> {
        tracing::debug!(partner_id = %partner.id, "Creating partner");
        self.partners.push(partner);
        self.persist_partners()
    }

    /// Flip a partner's active flag. Returns `false` when no partner has `id`.
    pub fn toggle_partner(&mut self, id: &str) -> StoreResult<bool> {
        let Some(partner) = self.partners.iter_mut().find(|p| p.id == id) else {
            tracing::debug!(partner_id = id, "Toggle requested for unknown partner");
            return Ok(false);
        };

        partner.active = !partner.active;
        tracing::debug!(partner_id = id, active = partner.active, "Partner toggled");
        self.persist_partners()?;
        Ok(true)
    }

    /// Select the partner whose cases the partner view shows.
    pub fn set_current_partner_id(&mut self, id: Option<String>) -> StoreResult<()> {
        self.current_partner_id = id;
        self.persist_current_partner()
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Wipe storage and restore the seed data.
    pub fn reset_demo(&mut self) -> StoreResult<()> {
        self.reset_demo_at(Utc::now())
    }

    pub fn reset_demo_at(&mut self, now: DateTime<Utc>) -> StoreResult<()> {
        tracing::info!("Resetting demo data");
        self.cases = seed_cases(&iso_timestamp(now));
        self.partners = seed_partners();
        self.current_partner_id = None;

        self.storage.clear().map_err(|e| {
            tracing::warn!(error = %e, "Failed to clear storage");
            StoreError::from(e)
        })?;
        self.persist_cases()?;
        self.persist_partners()
    }

    // =========================================================================
    // ID Allocation
    // =========================================================================

    /// `case-<millis>`, bumped past any ID already in use.
    pub fn next_case_id(&self, now: DateTime<Utc>) -> String {
        next_free_id("case", now, |id| self.case(id).is_some())
    }

    /// `partner-<millis>`, bumped past any ID already in use.
    pub fn next_partner_id(&self, now: DateTime<Utc>) -> String {
        next_free_id("partner", now, |id| self.partner(id).is_some())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn persist_cases(&mut self) -> StoreResult<()> {
        save(&mut self.storage, CASES_KEY, &self.cases).map_err(|e| write_failed(CASES_KEY, e))
    }

    fn persist_partners(&mut self) -> StoreResult<()> {
        save(&mut self.storage, PARTNERS_KEY, &self.partners)
            .map_err(|e| write_failed(PARTNERS_KEY, e))
    }

    fn persist_current_partner(&mut self) -> StoreResult<()> {
        let result = match &self.current_partner_id {
            Some(id) => save(&mut self.storage, CURRENT_PARTNER_KEY, id),
            None => self.storage.remove_item(CURRENT_PARTNER_KEY),
        };
        result.map_err(|e| write_failed(CURRENT_PARTNER_KEY, e))
    }
}

fn write_failed(key: &str, error: StorageError) -> StoreError {
    tracing::warn!(key, error = %error, "Failed to persist collection");
    StoreError::Storage(error)
}

fn next_free_id(prefix: &str, now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let id = format!("{}-{}", prefix, millis);
        if !taken(&id) {
            return id;
        }
        millis += 1;
    }
}
