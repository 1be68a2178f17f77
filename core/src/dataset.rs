//! Fully materialised rows for one computation.
//!
//! FunnelData is the tagged union the aggregators match on. Pipeline and
//! Activity each carry their own rows, so the two code paths never share
//! a conditional and can be tested in isolation.

use crate::{
    mode::{DateRange, ReportMode},
    model::{Household, LeadSource, MarketingBucket, Quote, Sale, SpendLedgerEntry, TeamMember},
    record_store::Collection,
};
use std::collections::HashMap;

/// Status snapshot: every household, every quote, every sale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineData {
    pub households: Vec<Household>,
    pub quotes: Vec<Quote>,
    pub sales: Vec<Sale>,
}

/// Event window: quotes and sales dated inside the range, plus every
/// household of the agency (needed to resolve lead sources and to find
/// leads received in the window).
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityData {
    range: DateRange,
    households: Vec<Household>,
    quotes: Vec<Quote>,
    sales: Vec<Sale>,
}

impl ActivityData {
    /// Rows dated outside `range` are dropped here, so a store that
    /// ignores the server-side filter cannot leak them into the window.
    pub fn new(range: DateRange, households: Vec<Household>, mut quotes: Vec<Quote>, mut sales: Vec<Sale>) -> Self {
        quotes.retain(|q| range.contains(q.quote_date));
        sales.retain(|s| range.contains(s.sale_date));
        Self {
            range,
            households,
            quotes,
            sales,
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn households(&self) -> &[Household] {
        &self.households
    }

    /// Households whose lead arrived inside the window.
    pub fn leads(&self) -> impl Iterator<Item = &Household> + '_ {
        self.households
            .iter()
            .filter(move |h| self.range.contains(h.lead_date()))
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunnelData {
    Pipeline(PipelineData),
    Activity(ActivityData),
}

impl FunnelData {
    pub fn mode(&self) -> ReportMode {
        match self {
            Self::Pipeline(_) => ReportMode::Pipeline,
            Self::Activity(data) => ReportMode::Activity { range: data.range() },
        }
    }

    pub fn households(&self) -> &[Household] {
        match self {
            Self::Pipeline(data) => &data.households,
            Self::Activity(data) => data.households(),
        }
    }

    pub fn quotes(&self) -> &[Quote] {
        match self {
            Self::Pipeline(data) => &data.quotes,
            Self::Activity(data) => data.quotes(),
        }
    }

    pub fn sales(&self) -> &[Sale] {
        match self {
            Self::Pipeline(data) => &data.sales,
            Self::Activity(data) => data.sales(),
        }
    }
}

/// Lookup collections and the spend ledger. Independent of the funnel
/// rows and joined to them by key only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub lead_sources: Vec<LeadSource>,
    pub buckets: Vec<MarketingBucket>,
    pub team_members: Vec<TeamMember>,
    pub spend: Vec<SpendLedgerEntry>,
}

impl ReferenceData {
    /// Display name for a producer key.
    pub fn producer_name(&self, team_member_id: Option<&str>) -> String {
        match team_member_id {
            None => "Unassigned".to_string(),
            Some(id) => self
                .team_members
                .iter()
                .find(|m| m.team_member_id == id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }

    pub fn lead_source(&self, lead_source_id: &str) -> Option<&LeadSource> {
        self.lead_sources
            .iter()
            .find(|s| s.lead_source_id == lead_source_id)
    }

    pub fn bucket_name(&self, bucket_id: &str) -> Option<&str> {
        self.buckets
            .iter()
            .find(|b| b.bucket_id == bucket_id)
            .map(|b| b.name.as_str())
    }
}

/// Everything fetched for one (agency, range) query.
#[derive(Debug, Clone, PartialEq)]
pub struct AgencySnapshot {
    pub data: FunnelData,
    pub reference: ReferenceData,
    /// Collections whose fetch stopped at the ceiling.
    pub truncated: Vec<Collection>,
}

/// Household id -> lead source id, for attributing quote and sale rows.
pub struct HouseholdIndex<'a> {
    lead_sources: HashMap<&'a str, Option<&'a str>>,
}

impl<'a> HouseholdIndex<'a> {
    pub fn build(households: &'a [Household]) -> Self {
        let lead_sources = households
            .iter()
            .map(|h| (h.household_id.as_str(), h.lead_source_id.as_deref()))
            .collect();
        Self { lead_sources }
    }

    /// Lead source of a household. An unknown household is unattributed.
    pub fn lead_source_of(&self, household_id: &str) -> Option<&'a str> {
        self.lead_sources.get(household_id).copied().flatten()
    }
}
