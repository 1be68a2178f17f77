//! The analytics engine: one computation per (agency, date range).
//!
//! FLOW (fixed):
//!   1. Temporal mode selection   (range present → Activity, else Pipeline)
//!   2. Paged fetch of every collection the mode needs
//!   3. Lead-source aggregation   }
//!   4. Producer aggregation      } independent folds over the same rows
//!   5. Bucket roll-up and summary reduction
//!
//! RULES:
//!   - Steps 3-5 are a pure function of the fetched rows (see `compute`).
//!   - Any failed fetch fails the whole computation. No partial report.
//!   - Nothing is cached between computations.

use crate::{
    bucket::{self, BucketRoiRow},
    config::AnalyticsConfig,
    dataset::{ActivityData, AgencySnapshot, FunnelData, PipelineData, ReferenceData},
    error::AnalyticsResult,
    fetcher::{Paged, PagedFetcher},
    lead_source::{self, LeadSourceRoiRow},
    mode::{DateRange, ReportMode},
    producer::{self, ProducerMetrics},
    record_store::{Collection, PageWindow, RecordFilter, RecordStore, SettingsProvider},
    summary::Summary,
    types::AgencyId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsQuery {
    pub agency_id: AgencyId,
    pub range: Option<DateRange>,
}

impl AnalyticsQuery {
    pub fn pipeline(agency_id: &str) -> Self {
        Self {
            agency_id: agency_id.to_string(),
            range: None,
        }
    }

    pub fn activity(agency_id: &str, range: DateRange) -> Self {
        Self {
            agency_id: agency_id.to_string(),
            range: Some(range),
        }
    }
}

/// Everything handed to the presentation and export layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsReport {
    pub summary: Summary,
    pub lead_sources: Vec<LeadSourceRoiRow>,
    pub buckets: Vec<BucketRoiRow>,
    pub quoted_by: Vec<ProducerMetrics>,
    pub sold_by: Vec<ProducerMetrics>,
}

pub struct AnalyticsEngine<'s, S> {
    store: &'s S,
    config: AnalyticsConfig,
    fetcher: PagedFetcher,
}

impl<'s, S> AnalyticsEngine<'s, S>
where
    S: RecordStore + SettingsProvider,
{
    pub fn new(store: &'s S, config: AnalyticsConfig) -> AnalyticsResult<Self> {
        config.validate()?;
        let fetcher = PagedFetcher::new(config.page_size, config.fetch_ceiling);
        Ok(Self {
            store,
            config,
            fetcher,
        })
    }

    /// Fetch, aggregate and summarise one agency.
    pub fn run(&self, query: &AnalyticsQuery) -> AnalyticsResult<AnalyticsReport> {
        let rate = self
            .config
            .commission_rate(self.store.commission_rate(&query.agency_id)?);
        let snapshot = self.fetch(query)?;
        let report = compute(&snapshot, rate);
        log::info!(
            "agency={} mode={} lead_sources={} quoted_by={} sold_by={} premium={}",
            query.agency_id,
            if snapshot.data.mode().is_activity() { "activity" } else { "pipeline" },
            report.lead_sources.len(),
            report.quoted_by.len(),
            report.sold_by.len(),
            report.summary.total_premium_cents,
        );
        Ok(report)
    }

    /// Fetch every collection the selected mode needs.
    pub fn fetch(&self, query: &AnalyticsQuery) -> AnalyticsResult<AgencySnapshot> {
        let mode = ReportMode::select(query.range);
        let agency_wide = RecordFilter::agency(&query.agency_id);
        let windowed = agency_wide.clone().with_range(mode.range());
        let mut truncated = Vec::new();

        // Households are always agency-wide: the lead-date filter needs the
        // created_at fallback and runs client-side.
        let households = self.collect(Collection::Households, &mut truncated, |w| {
            self.store.households(&agency_wide, w)
        })?;
        let quotes = self.collect(Collection::Quotes, &mut truncated, |w| {
            self.store.quotes(&windowed, w)
        })?;
        let sales = self.collect(Collection::Sales, &mut truncated, |w| {
            self.store.sales(&windowed, w)
        })?;
        let mut spend = self.collect(Collection::SpendLedger, &mut truncated, |w| {
            self.store.spend_ledger(&windowed, w)
        })?;
        let lead_sources = self.collect(Collection::LeadSources, &mut truncated, |w| {
            self.store.lead_sources(&agency_wide, w)
        })?;
        let buckets = self.collect(Collection::Buckets, &mut truncated, |w| {
            self.store.buckets(&agency_wide, w)
        })?;
        let team_members = self.collect(Collection::TeamMembers, &mut truncated, |w| {
            self.store.team_members(&agency_wide, w)
        })?;

        let data = match mode {
            ReportMode::Pipeline => FunnelData::Pipeline(PipelineData {
                households,
                quotes,
                sales,
            }),
            ReportMode::Activity { range } => {
                spend.retain(|entry| range.overlaps_month(entry.month));
                FunnelData::Activity(ActivityData::new(range, households, quotes, sales))
            }
        };

        Ok(AgencySnapshot {
            data,
            reference: ReferenceData {
                lead_sources,
                buckets,
                team_members,
                spend,
            },
            truncated,
        })
    }

    fn collect<T, F>(
        &self,
        collection: Collection,
        truncated: &mut Vec<Collection>,
        fetch_page: F,
    ) -> AnalyticsResult<Vec<T>>
    where
        F: FnMut(PageWindow) -> AnalyticsResult<Vec<T>>,
    {
        let Paged { rows, truncated: was_truncated } = self.fetcher.fetch_all(collection, fetch_page)?;
        if was_truncated {
            truncated.push(collection);
        }
        Ok(rows)
    }
}

/// Aggregate already-fetched rows. Pure: the same snapshot and rate
/// always give an identical report.
pub fn compute(snapshot: &AgencySnapshot, commission_rate: f64) -> AnalyticsReport {
    let data = &snapshot.data;
    let reference = &snapshot.reference;
    let with_quote_rate = !data.mode().is_activity();

    let lead_sources = lead_source::aggregate(data, reference, commission_rate);
    let producers = producer::aggregate(data, reference, commission_rate);
    let buckets = bucket::roll_up(&lead_sources, reference, commission_rate, with_quote_rate);
    let summary = Summary::reduce(data, &lead_sources, commission_rate, &snapshot.truncated);

    AnalyticsReport {
        summary,
        lead_sources,
        buckets,
        quoted_by: producers.quoted_by,
        sold_by: producers.sold_by,
    }
}
