//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use funnel_core::{
    config::AnalyticsConfig,
    engine::{AnalyticsEngine, AnalyticsQuery, AnalyticsReport},
    model::{
        Household, HouseholdStatus, LeadSource, MarketingBucket, Quote, Sale, SpendLedgerEntry,
        TeamMember,
    },
    store::AgencyStore,
};

pub const AGENCY: &str = "agency-1";

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Migrated in-memory store with one agency and no commission rate set.
pub fn store() -> AgencyStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = AgencyStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
        .insert_agency(AGENCY, "Test Agency", None)
        .expect("insert agency");
    store
}

pub fn run(store: &AgencyStore, query: &AnalyticsQuery) -> AnalyticsReport {
    AnalyticsEngine::new(store, AnalyticsConfig::default())
        .expect("engine")
        .run(query)
        .expect("report")
}

pub fn add_bucket(store: &AgencyStore, id: &str, name: &str) {
    store
        .insert_bucket(
            AGENCY,
            &MarketingBucket {
                bucket_id: id.into(),
                name: name.into(),
            },
        )
        .unwrap();
}

pub fn add_source(store: &AgencyStore, id: &str, name: &str, bucket: Option<&str>) {
    store
        .insert_lead_source(
            AGENCY,
            &LeadSource {
                lead_source_id: id.into(),
                name: name.into(),
                bucket_id: bucket.map(str::to_string),
            },
        )
        .unwrap();
}

pub fn add_member(store: &AgencyStore, id: &str, name: &str) {
    store
        .insert_team_member(
            AGENCY,
            &TeamMember {
                team_member_id: id.into(),
                name: name.into(),
            },
        )
        .unwrap();
}

pub fn add_spend(store: &AgencyStore, source: Option<&str>, month: NaiveDate, cents: i64) {
    store
        .insert_spend(
            AGENCY,
            &SpendLedgerEntry {
                lead_source_id: source.map(str::to_string),
                month,
                spend_cents: cents,
            },
        )
        .unwrap();
}

pub fn household(id: &str, status: HouseholdStatus, source: Option<&str>, lead: NaiveDate) -> Household {
    Household {
        household_id: id.into(),
        agency_id: AGENCY.into(),
        status,
        lead_source_id: source.map(str::to_string),
        created_at: lead.and_hms_opt(9, 0, 0).unwrap().and_utc(),
        lead_received_date: Some(lead),
    }
}

pub fn add_household(store: &AgencyStore, id: &str, status: HouseholdStatus, source: Option<&str>, lead: NaiveDate) {
    store
        .insert_household(&household(id, status, source, lead))
        .unwrap();
}

pub fn quote(id: &str, hh: &str, producer: Option<&str>, premium: i64, product: &str, date: NaiveDate) -> Quote {
    Quote {
        quote_id: id.into(),
        household_id: hh.into(),
        team_member_id: producer.map(str::to_string),
        items_quoted: None,
        premium_cents: premium,
        product_type: Some(product.into()),
        quote_date: date,
    }
}

pub fn add_quote(store: &AgencyStore, id: &str, hh: &str, producer: Option<&str>, premium: i64, product: &str, date: NaiveDate) {
    store
        .insert_quote(AGENCY, &quote(id, hh, producer, premium, product, date))
        .unwrap();
}

pub fn sale(id: &str, hh: &str, producer: Option<&str>, premium: i64, product: &str, date: NaiveDate) -> Sale {
    Sale {
        sale_id: id.into(),
        household_id: hh.into(),
        team_member_id: producer.map(str::to_string),
        items_sold: None,
        policies_sold: None,
        premium_cents: premium,
        product_type: Some(product.into()),
        sale_date: date,
    }
}

pub fn add_sale(store: &AgencyStore, id: &str, hh: &str, producer: Option<&str>, premium: i64, product: &str, date: NaiveDate) {
    store
        .insert_sale(AGENCY, &sale(id, hh, producer, premium, product, date))
        .unwrap();
}

pub fn assert_close(actual: Option<f64>, expected: f64, what: &str) {
    let value = actual.unwrap_or_else(|| panic!("{what} was None, expected {expected}"));
    assert!(
        (value - expected).abs() < 1e-9,
        "{what}: expected {expected}, got {value}"
    );
}
