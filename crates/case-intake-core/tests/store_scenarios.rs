//! End-to-end store scenarios against both storage media.

use case_intake_core::db::Database;
use case_intake_core::models::{CaseStatus, Partner};
use case_intake_core::storage::{
    load, save, try_load, KeyValueStorage, Loaded, MemoryStorage, CASES_KEY, CURRENT_PARTNER_KEY,
    PARTNERS_KEY,
};
use case_intake_core::store::{seed_cases, seed_partners, CaseStore};
use chrono::{TimeZone, Utc};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 14, 0, 0).unwrap()
}

#[test]
fn test_empty_storage_is_seeded_and_persisted() {
    let store = CaseStore::open_at(MemoryStorage::new(), now()).unwrap();
    assert_eq!(store.cases().len(), 2);
    assert_eq!(store.partners().len(), 3);

    let storage = store.into_storage();
    let cases: Vec<case_intake_core::Case> = load(&storage, CASES_KEY, Vec::new());
    let partners: Vec<Partner> = load(&storage, PARTNERS_KEY, Vec::new());
    assert_eq!(cases, seed_cases("2024-05-20T14:00:00.000Z"));
    assert_eq!(partners, seed_partners());
    assert!(storage.get_item(CURRENT_PARTNER_KEY).unwrap().is_none());
}

#[test]
fn test_analyze_seed_case() {
    let mut store = CaseStore::open(MemoryStorage::new()).unwrap();
    assert!(store.analyze_case("case-1").unwrap());

    let case = store.case("case-1").unwrap();
    assert_eq!(case.status, CaseStatus::Analyzed);
    let analysis = case.analysis.as_ref().unwrap();
    assert!((50..=99).contains(&analysis.score));
    assert_eq!(analysis.estimated_value, analysis.score * 1000);

    // the stored copy matches memory
    let stored: Vec<case_intake_core::Case> = load(store.storage(), CASES_KEY, Vec::new());
    assert_eq!(stored[0].status, CaseStatus::Analyzed);
}

#[test]
fn test_unknown_case_is_a_no_op() {
    let mut store = CaseStore::open(MemoryStorage::new()).unwrap();
    let before = store.storage().get_item(CASES_KEY).unwrap();

    assert!(!store.analyze_case("case-999").unwrap());
    assert!(!store.assign_case("case-999", "partner-1").unwrap());

    assert_eq!(store.cases().len(), 2);
    assert_eq!(store.storage().get_item(CASES_KEY).unwrap(), before);
}

#[test]
fn test_assign_ignores_partner_state() {
    let mut store = CaseStore::open(MemoryStorage::new()).unwrap();

    // partner-3 is inactive in the seed data
    assert!(store.assign_case("case-1", "partner-3").unwrap());
    let case = store.case("case-1").unwrap();
    assert_eq!(case.status, CaseStatus::Assigned);
    assert_eq!(case.assigned_partner_id.as_deref(), Some("partner-3"));

    // unknown partner IDs are accepted too
    assert!(store.assign_case("case-2", "partner-404").unwrap());
    assert_eq!(store.case("case-2").unwrap().status, CaseStatus::Assigned);
}

#[test]
fn test_reset_restores_seed() {
    let mut store = CaseStore::open_at(MemoryStorage::new(), now()).unwrap();
    store.analyze_case("case-1").unwrap();
    store.toggle_partner("partner-1").unwrap();
    store.set_current_partner_id(Some("partner-2".into())).unwrap();

    let mut extra = store.partners()[0].clone();
    extra.id = "partner-extra".into();
    store.create_partner(extra).unwrap();

    store.reset_demo_at(now()).unwrap();

    assert_eq!(store.cases(), seed_cases("2024-05-20T14:00:00.000Z").as_slice());
    assert_eq!(store.partners(), seed_partners().as_slice());
    assert!(store.current_partner_id().is_none());
    assert!(store.storage().get_item(CURRENT_PARTNER_KEY).unwrap().is_none());
}

#[test]
fn test_undecodable_collection_reads_as_empty() {
    let mut storage = MemoryStorage::new();
    storage.set_item(CASES_KEY, "{not json").unwrap();
    save(&mut storage, PARTNERS_KEY, &seed_partners()).unwrap();

    let loaded: Loaded<Vec<case_intake_core::Case>> = try_load(&storage, CASES_KEY);
    assert!(matches!(loaded, Loaded::Undecodable(_)));

    // partners survive, so nothing is reseeded
    let store = CaseStore::open(storage).unwrap();
    assert!(store.cases().is_empty());
    assert_eq!(store.partners().len(), 3);
}

#[test]
fn test_wrong_shape_collection_reads_as_empty() {
    let mut storage = MemoryStorage::new();
    storage.set_item(CASES_KEY, r#"{"id":"case-1"}"#).unwrap();
    storage.set_item(PARTNERS_KEY, "[]").unwrap();

    // both effectively empty, so the seed comes back
    let store = CaseStore::open(storage).unwrap();
    assert_eq!(store.cases().len(), 2);
    assert_eq!(store.partners().len(), 3);
}

#[test]
fn test_sqlite_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intake.db");

    {
        let mut store = CaseStore::open_at(Database::open(&path).unwrap(), now()).unwrap();
        store.analyze_case("case-2").unwrap();
        store.assign_case("case-1", "partner-1").unwrap();
        store.toggle_partner("partner-3").unwrap();
        store.set_current_partner_id(Some("partner-1".into())).unwrap();
    }

    let store = CaseStore::open(Database::open(&path).unwrap()).unwrap();
    assert_eq!(store.case("case-1").unwrap().status, CaseStatus::Assigned);
    assert_eq!(store.case("case-2").unwrap().status, CaseStatus::Analyzed);
    assert_eq!(store.case("case-2").unwrap().analysis.as_ref().unwrap().score, 57);
    assert!(store.partner("partner-3").unwrap().active);
    assert_eq!(store.current_partner().unwrap().name, "Auto Experts LLC");
    assert_eq!(store.cases()[0].submitted_at, "2024-05-20T14:00:00.000Z");

    let keys = store.storage().keys().unwrap();
    assert_eq!(keys, vec!["cases", "currentPartnerId", "partners"]);
}

#[test]
fn test_sqlite_reset_clears_table() {
    let mut store = CaseStore::open(Database::open_in_memory().unwrap()).unwrap();
    store.set_current_partner_id(Some("partner-2".into())).unwrap();
    store.reset_demo().unwrap();

    let keys = store.storage().keys().unwrap();
    assert_eq!(keys, vec!["cases", "partners"]);
    assert_eq!(store.cases().len(), 2);
}

#[test]
fn test_loose_partner_capacity_survives_create() {
    let mut storage = MemoryStorage::new();
    storage
        .set_item(
            PARTNERS_KEY,
            r#"[{"id":"partner-legacy","name":"Legacy Law","email":"legacy@example.com","specialties":["Auto"],"coverage":["NY"],"capacity":7.5,"active":true}]"#,
        )
        .unwrap();

    let mut store = CaseStore::open(storage).unwrap();
    assert_eq!(store.partners().len(), 1);
    assert_eq!(store.partners()[0].capacity, 7);

    let fresh = Partner::new("partner-new".into(), "New Firm".into(), "new@example.com".into());
    store.create_partner(fresh).unwrap();

    let stored: Vec<Partner> = load(store.storage(), PARTNERS_KEY, Vec::new());
    let ids: Vec<&str> = stored.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["partner-legacy", "partner-new"]);
}
