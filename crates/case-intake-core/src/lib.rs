//! Case Intake Core Library
//!
//! Local-first intake store for personal-injury cases: submissions are
//! validated, optionally analyzed, kept in a key-value medium, and handed to
//! partner firms from the admin dashboard.
//!
//! # Architecture
//!
//! ```text
//! Intake form → validate → [optional] POST {api}/analyze ──fail──▶ local scoring
//!                                   │                                  │
//!                                   └──────────────┬───────────────────┘
//!                                                  ▼
//!                                        CaseStore (cases, partners)
//!                                                  │
//!                                       KeyValueStorage (SQLite / memory)
//!                                                  │
//!                     Dashboard: filter, stats, analyze, assign, partners
//! ```
//!
//! # Modules
//!
//! - [`storage`]: Key-value medium trait and JSON load/save helpers
//! - [`db`]: SQLite-backed medium
//! - [`models`]: Domain types (Case, Partner, Analysis)
//! - [`store`]: Case/partner collections with seed data
//! - [`gateway`]: Optional remote analyzer with deterministic fallback
//! - [`intake`]: Form validation and submission
//! - [`dashboard`]: Filters, counters, and the add-partner form

pub mod dashboard;
pub mod db;
pub mod gateway;
pub mod intake;
pub mod models;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use dashboard::{CaseFilter, DashboardStats, PartnerForm};
pub use db::Database;
pub use gateway::{AnalysisOutcome, AnalysisSource, IntakeConfig, RemoteAnalyzer};
pub use intake::{IntakeForm, IntakeService, Submission, SubmitError, ValidationErrors};
pub use models::{Analysis, Case, CaseStatus, IntakePayload, Partner};
pub use storage::{KeyValueStorage, MemoryStorage, StorageError};
pub use store::{CaseStore, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum CaseIntakeError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("A submission is already in progress")]
    SubmissionInProgress,
}

impl From<StorageError> for CaseIntakeError {
    fn from(e: StorageError) -> Self {
        CaseIntakeError::StorageError(e.to_string())
    }
}

impl From<StoreError> for CaseIntakeError {
    fn from(e: StoreError) -> Self {
        CaseIntakeError::StorageError(e.to_string())
    }
}

impl From<SubmitError> for CaseIntakeError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Validation(errors) => CaseIntakeError::ValidationError(errors.to_string()),
            SubmitError::InProgress => CaseIntakeError::SubmissionInProgress,
            SubmitError::Store(e) => e.into(),
            SubmitError::LockPoisoned => CaseIntakeError::StorageError("Lock poisoned".into()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for CaseIntakeError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        CaseIntakeError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Logging
// =========================================================================

/// Install a `tracing` subscriber writing to stderr.
///
/// `filter` uses `EnvFilter` syntax; when absent, `RUST_LOG` is consulted and
/// then `case_intake_core=info`. Calling again after a subscriber is set is a
/// no-op.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    use tracing_subscriber::EnvFilter;

    let filter = filter
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| "case_intake_core=info,case_intake_analysis=info".into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a store at the given path. Integration settings come from
/// the environment (and `.env`, if present).
#[uniffi::export]
pub fn open_case_store(path: String) -> Result<Arc<CaseIntakeCore>, CaseIntakeError> {
    let db = Database::open(&path)?;
    CaseIntakeCore::build(db, IntakeConfig::from_dotenv())
}

/// Create an in-memory store (for testing). Integration settings are read
/// the same way as [`open_case_store`].
#[uniffi::export]
pub fn open_case_store_in_memory() -> Result<Arc<CaseIntakeCore>, CaseIntakeError> {
    let db = Database::open_in_memory()?;
    CaseIntakeCore::build(db, IntakeConfig::from_dotenv())
}

/// Open a store with explicit integration settings. `path = None` keeps
/// everything in memory.
#[uniffi::export]
pub fn open_case_store_with_config(
    path: Option<String>,
    config: FfiIntakeConfig,
) -> Result<Arc<CaseIntakeCore>, CaseIntakeError> {
    let db = match path {
        Some(path) => Database::open(&path)?,
        None => Database::open_in_memory()?,
    };
    CaseIntakeCore::build(db, config.into())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store and submission service for FFI.
#[derive(uniffi::Object)]
pub struct CaseIntakeCore {
    service: IntakeService<Database>,
}

impl CaseIntakeCore {
    fn build(db: Database, config: IntakeConfig) -> Result<Arc<Self>, CaseIntakeError> {
        let store = CaseStore::open(db)?;
        tracing::info!(
            cases = store.cases().len(),
            partners = store.partners().len(),
            analysis = config.enable_intake_analysis,
            "Case store opened"
        );
        Ok(Arc::new(Self {
            service: IntakeService::new(Arc::new(Mutex::new(store)), RemoteAnalyzer::new(config)),
        }))
    }

    fn store(&self) -> Result<std::sync::MutexGuard<'_, CaseStore<Database>>, CaseIntakeError> {
        Ok(self.service.store().lock()?)
    }
}

#[uniffi::export]
impl CaseIntakeCore {
    // =========================================================================
    // Case Operations
    // =========================================================================

    /// List cases in submission order, optionally filtered.
    pub fn list_cases(&self, filter: Option<FfiCaseFilter>) -> Result<Vec<FfiCase>, CaseIntakeError> {
        let filter = match filter {
            Some(f) => CaseFilter::try_from(f)?,
            None => CaseFilter::default(),
        };
        let store = self.store()?;
        Ok(dashboard::filter_cases(store.cases(), &filter)
            .into_iter()
            .map(|c| c.clone().into())
            .collect())
    }

    /// Get a case by ID.
    pub fn get_case(&self, id: String) -> Result<Option<FfiCase>, CaseIntakeError> {
        let store = self.store()?;
        Ok(store.case(&id).cloned().map(Into::into))
    }

    /// Attach a deterministic analysis. Returns false for unknown IDs.
    pub fn analyze_case(&self, id: String) -> Result<bool, CaseIntakeError> {
        let mut store = self.store()?;
        Ok(store.analyze_case(&id)?)
    }

    /// Assign a case to a partner. Returns false for unknown case IDs.
    pub fn assign_case(&self, id: String, partner_id: String) -> Result<bool, CaseIntakeError> {
        let mut store = self.store()?;
        Ok(store.assign_case(&id, &partner_id)?)
    }

    /// Distinct injury types for the filter dropdown.
    pub fn injury_type_options(&self) -> Result<Vec<String>, CaseIntakeError> {
        let store = self.store()?;
        Ok(dashboard::injury_type_options(store.cases()))
    }

    /// Headline dashboard counters.
    pub fn dashboard_stats(&self) -> Result<FfiDashboardStats, CaseIntakeError> {
        let store = self.store()?;
        Ok(DashboardStats::compute(store.cases(), store.partners()).into())
    }

    // =========================================================================
    // Partner Operations
    // =========================================================================

    pub fn list_partners(&self) -> Result<Vec<FfiPartner>, CaseIntakeError> {
        let store = self.store()?;
        Ok(store.partners().iter().cloned().map(Into::into).collect())
    }

    /// Create an active partner from the add-partner form.
    pub fn create_partner(&self, form: FfiPartnerForm) -> Result<FfiPartner, CaseIntakeError> {
        let mut store = self.store()?;
        let id = store.next_partner_id(chrono::Utc::now());
        let partner = PartnerForm::from(form).into_partner(id);
        store.create_partner(partner.clone())?;
        Ok(partner.into())
    }

    /// Flip a partner's active flag. Returns false for unknown IDs.
    pub fn toggle_partner(&self, id: String) -> Result<bool, CaseIntakeError> {
        let mut store = self.store()?;
        Ok(store.toggle_partner(&id)?)
    }

    pub fn current_partner_id(&self) -> Result<Option<String>, CaseIntakeError> {
        let store = self.store()?;
        Ok(store.current_partner_id().map(String::from))
    }

    pub fn set_current_partner_id(&self, id: Option<String>) -> Result<(), CaseIntakeError> {
        let mut store = self.store()?;
        Ok(store.set_current_partner_id(id)?)
    }

    /// Cases assigned to a partner, for the partner view.
    pub fn partner_cases(&self, partner_id: String) -> Result<Vec<FfiCase>, CaseIntakeError> {
        let store = self.store()?;
        Ok(dashboard::cases_for_partner(store.cases(), &partner_id)
            .into_iter()
            .map(|c| c.clone().into())
            .collect())
    }

    /// First active partner, preselected in the assignment dialog.
    pub fn default_assignee(&self) -> Result<Option<FfiPartner>, CaseIntakeError> {
        let store = self.store()?;
        Ok(dashboard::first_active_partner(store.partners())
            .cloned()
            .map(Into::into))
    }

    /// Wipe storage and restore the demo data.
    pub fn reset_demo(&self) -> Result<(), CaseIntakeError> {
        let mut store = self.store()?;
        Ok(store.reset_demo()?)
    }

    // =========================================================================
    // Intake
    // =========================================================================

    /// Per-field validation messages; empty when the form may be submitted.
    pub fn validate_intake(&self, form: FfiIntakeForm) -> Vec<FfiFieldError> {
        IntakeForm::from(form)
            .validate()
            .fields()
            .into_iter()
            .map(|(field, message)| FfiFieldError {
                field: field.to_string(),
                message: message.to_string(),
            })
            .collect()
    }

    /// True while a submission awaits the analyzer.
    pub fn is_submitting(&self) -> bool {
        self.service.is_submitting()
    }

    /// Abort the pending analyzer call. The submission still completes with
    /// a locally scored analysis. Returns false when nothing was pending.
    pub fn cancel_submission(&self) -> bool {
        self.service.cancel_pending()
    }

    /// Integration settings this store was opened with.
    pub fn config(&self) -> FfiIntakeConfig {
        self.service.analyzer().config().into()
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl CaseIntakeCore {
    /// Validate, analyze, and store a public submission.
    pub async fn submit_intake(
        self: Arc<Self>,
        form: FfiIntakeForm,
    ) -> Result<FfiSubmission, CaseIntakeError> {
        let form = IntakeForm::from(form);
        Ok(self.service.submit(&form, None).await?.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe integration settings.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiIntakeConfig {
    pub api_url: Option<String>,
    pub enable_intake_analysis: bool,
    pub enable_remote_db: bool,
}

impl From<FfiIntakeConfig> for IntakeConfig {
    fn from(config: FfiIntakeConfig) -> Self {
        IntakeConfig {
            api_url: config.api_url.filter(|u| !u.trim().is_empty()),
            enable_intake_analysis: config.enable_intake_analysis,
            enable_remote_db: config.enable_remote_db,
        }
    }
}

impl From<&IntakeConfig> for FfiIntakeConfig {
    fn from(config: &IntakeConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            enable_intake_analysis: config.enable_intake_analysis,
            enable_remote_db: config.enable_remote_db,
        }
    }
}

/// FFI-safe analysis.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnalysis {
    pub score: i64,
    pub estimated_value: i64,
    pub risk_factors: Vec<String>,
    pub recommendation: String,
    pub timestamp: String,
    pub high_priority: bool,
}

impl From<Analysis> for FfiAnalysis {
    fn from(analysis: Analysis) -> Self {
        Self {
            high_priority: analysis.is_high_priority(),
            score: analysis.score,
            estimated_value: analysis.estimated_value,
            risk_factors: analysis.risk_factors,
            recommendation: analysis.recommendation,
            timestamp: analysis.timestamp,
        }
    }
}

/// FFI-safe case.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCase {
    pub id: String,
    pub submitted_at: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub incident_date: Option<String>,
    pub injury_type: String,
    pub description: String,
    /// `NEW`, `ANALYZED`, `ASSIGNED`, or `DECLINED`
    pub status: String,
    pub analysis: Option<FfiAnalysis>,
    pub assigned_partner_id: Option<String>,
}

impl From<Case> for FfiCase {
    fn from(case: Case) -> Self {
        Self {
            id: case.id,
            submitted_at: case.submitted_at,
            full_name: case.full_name,
            email: case.email,
            phone: case.phone,
            location: case.location,
            incident_date: case.incident_date,
            injury_type: case.injury_type,
            description: case.description,
            status: case.status.as_str().to_string(),
            analysis: case.analysis.map(Into::into),
            assigned_partner_id: case.assigned_partner_id,
        }
    }
}

/// FFI-safe partner.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPartner {
    pub id: String,
    pub name: String,
    pub email: String,
    pub api_endpoint: Option<String>,
    pub specialties: Vec<String>,
    pub coverage: Vec<String>,
    pub capacity: i64,
    pub active: bool,
}

impl From<Partner> for FfiPartner {
    fn from(partner: Partner) -> Self {
        Self {
            id: partner.id,
            name: partner.name,
            email: partner.email,
            api_endpoint: partner.api_endpoint,
            specialties: partner.specialties,
            coverage: partner.coverage,
            capacity: partner.capacity,
            active: partner.active,
        }
    }
}

/// FFI-safe intake form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiIntakeForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub incident_date: String,
    pub injury_type: String,
    pub description: String,
    pub consent: bool,
}

impl From<FfiIntakeForm> for IntakeForm {
    fn from(form: FfiIntakeForm) -> Self {
        IntakeForm {
            full_name: form.full_name,
            email: form.email,
            phone: form.phone,
            location: form.location,
            incident_date: form.incident_date,
            injury_type: form.injury_type,
            description: form.description,
            consent: form.consent,
        }
    }
}

/// One failed intake field.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFieldError {
    pub field: String,
    pub message: String,
}

/// FFI-safe add-partner form. List fields are comma-separated.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPartnerForm {
    pub name: String,
    pub email: String,
    pub specialties: String,
    pub coverage: String,
    pub capacity: u32,
}

impl From<FfiPartnerForm> for PartnerForm {
    fn from(form: FfiPartnerForm) -> Self {
        PartnerForm {
            name: form.name,
            email: form.email,
            specialties: form.specialties,
            coverage: form.coverage,
            capacity: form.capacity,
        }
    }
}

/// FFI-safe case filter. Blank strings mean "any".
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCaseFilter {
    pub search: String,
    pub status: Option<String>,
    pub injury_type: Option<String>,
}

impl TryFrom<FfiCaseFilter> for CaseFilter {
    type Error = CaseIntakeError;

    fn try_from(filter: FfiCaseFilter) -> Result<Self, Self::Error> {
        let status = filter
            .status
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<CaseStatus>())
            .transpose()
            .map_err(CaseIntakeError::InvalidInput)?;

        Ok(CaseFilter {
            search: filter.search,
            status,
            injury_type: filter.injury_type.filter(|t| !t.is_empty()),
        })
    }
}

/// FFI-safe dashboard counters.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboardStats {
    pub total_new: u64,
    pub total_analyzed: u64,
    pub total_assigned: u64,
    pub active_partners: u64,
}

impl From<DashboardStats> for FfiDashboardStats {
    fn from(stats: DashboardStats) -> Self {
        let widen = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);
        Self {
            total_new: widen(stats.total_new),
            total_analyzed: widen(stats.total_analyzed),
            total_assigned: widen(stats.total_assigned),
            active_partners: widen(stats.active_partners),
        }
    }
}

/// FFI-safe submission result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSubmission {
    pub case: FfiCase,
    /// `none`, `remote`, or `fallback`
    pub analysis_source: String,
}

impl From<Submission> for FfiSubmission {
    fn from(submission: Submission) -> Self {
        let analysis_source = match submission.source {
            AnalysisSource::None => "none",
            AnalysisSource::Remote => "remote",
            AnalysisSource::Fallback => "fallback",
        };
        Self {
            case: submission.case.into(),
            analysis_source: analysis_source.to_string(),
        }
    }
}
