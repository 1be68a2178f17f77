//! The Record Store and Settings Provider seams.
//!
//! RULE: The engine reads records only through these traits.
//! It never writes, and it never talks to a database directly.
//!
//! PAGINATION PRECONDITION: an implementation must only return a page
//! shorter than the requested window when no further rows exist. The
//! paged fetcher stops on the first short page and will silently miss
//! rows from a store that violates this.

use crate::{
    error::AnalyticsResult,
    mode::DateRange,
    model::{Household, LeadSource, MarketingBucket, Quote, Sale, SpendLedgerEntry, TeamMember},
    types::AgencyId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The collections the engine reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Households,
    Quotes,
    Sales,
    LeadSources,
    Buckets,
    SpendLedger,
    TeamMembers,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Households  => "households",
            Self::Quotes      => "quotes",
            Self::Sales       => "sales",
            Self::LeadSources => "lead_sources",
            Self::Buckets     => "marketing_buckets",
            Self::SpendLedger => "spend_ledger",
            Self::TeamMembers => "team_members",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Equality and range filters applied by the store.
///
/// `date_range` is honoured server-side by quotes (`quote_date`), sales
/// (`sale_date`) and the spend ledger (`month`, month granularity).
/// Every other collection ignores it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFilter {
    pub agency_id: AgencyId,
    pub date_range: Option<DateRange>,
}

impl RecordFilter {
    pub fn agency(agency_id: &str) -> Self {
        Self {
            agency_id: agency_id.to_string(),
            date_range: None,
        }
    }

    pub fn with_range(mut self, range: Option<DateRange>) -> Self {
        self.date_range = range;
        self
    }
}

/// The `[offset, offset + limit)` window of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

/// Paged, filtered read access to an agency's records.
pub trait RecordStore {
    fn households(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<Household>>;

    fn quotes(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<Quote>>;

    fn sales(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<Sale>>;

    fn lead_sources(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<LeadSource>>;

    fn buckets(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<MarketingBucket>>;

    fn spend_ledger(
        &self,
        filter: &RecordFilter,
        page: PageWindow,
    ) -> AnalyticsResult<Vec<SpendLedgerEntry>>;

    fn team_members(&self, filter: &RecordFilter, page: PageWindow) -> AnalyticsResult<Vec<TeamMember>>;
}

/// Source of agency-level settings.
pub trait SettingsProvider {
    /// Commission percentage (0-100), or None when the agency has not set one.
    fn commission_rate(&self, agency_id: &str) -> AnalyticsResult<Option<f64>>;
}
