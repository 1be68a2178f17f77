//! SQLite-backed Record Store and Settings Provider.
//!
//! RULE: Only the store module talks to the database.
//! The engine reads through the RecordStore / SettingsProvider traits.
//! Insert methods exist for seeding (tests, the demo agency) only.

use crate::{
    error::AnalyticsResult,
    model::{Household, LeadSource, MarketingBucket, Quote, Sale, SpendLedgerEntry, TeamMember},
    record_store::{PageWindow, RecordFilter, RecordStore, SettingsProvider},
};
use rusqlite::{params, Connection, OptionalExtension};

mod household;
mod policy;
mod reference;

pub struct AgencyStore {
    conn: Connection,
}

impl AgencyStore {
    /// Open (or create) the agency database at `path`.
    pub fn open(path: &str) -> AnalyticsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only applies to real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> AnalyticsResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> AnalyticsResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_agency.sql"))?;
        Ok(())
    }

    /// Run `f` inside one transaction. Any error rolls the whole batch back.
    pub fn in_transaction<T, F>(&self, f: F) -> AnalyticsResult<T>
    where
        F: FnOnce(&Self) -> AnalyticsResult<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }

    // ── Agency ─────────────────────────────────────────────────

    pub fn insert_agency(
        &self,
        agency_id: &str,
        name: &str,
        commission_rate: Option<f64>,
    ) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO agency (agency_id, name, commission_rate) VALUES (?1, ?2, ?3)",
            params![agency_id, name, commission_rate],
        )?;
        Ok(())
    }

    pub fn set_commission_rate(&self, agency_id: &str, rate: Option<f64>) -> AnalyticsResult<()> {
        self.conn.execute(
            "UPDATE agency SET commission_rate = ?1 WHERE agency_id = ?2",
            params![rate, agency_id],
        )?;
        Ok(())
    }
}

impl SettingsProvider for AgencyStore {
    fn commission_rate(&self, agency_id: &str) -> AnalyticsResult<Option<f64>> {
        let rate: Option<Option<f64>> = self
            .conn
            .query_row(
                "SELECT commission_rate FROM agency WHERE agency_id = ?1",
                params![agency_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(rate.flatten())
    }
}

impl RecordStore for AgencyStore {
    fn households(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<Household>> {
        self.page_households(&filter.agency_id, page)
    }

    fn quotes(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<Quote>> {
        self.page_quotes(filter, page)
    }

    fn sales(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<Sale>> {
        self.page_sales(filter, page)
    }

    fn lead_sources(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<LeadSource>> {
        self.page_lead_sources(&filter.agency_id, page)
    }

    fn buckets(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<MarketingBucket>> {
        self.page_buckets(&filter.agency_id, page)
    }

    fn spend_ledger(
        &self,
        filter: &RecordFilter,
        page: PageWindow,
    ) -> AnalyticsResult<Vec<SpendLedgerEntry>> {
        self.page_spend(filter, page)
    }

    fn team_members(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<TeamMember>> {
        self.page_team_members(&filter.agency_id, page)
    }
}

/// LIMIT / OFFSET parameters for a page window.
fn limit_offset(page: PageWindow) -> (i64, i64) {
    (page.limit as i64, page.offset as i64)
}
