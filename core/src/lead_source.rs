//! Lead-source aggregator: per-channel funnel counts, spend and ROI.
//!
//! Households, quotes and sales are attributed through the household's
//! lead source. Spend comes from the ledger and is joined by key only.
//!
//! Group order before sorting: configured lead sources in store order,
//! then Unattributed, then unknown ids in the order they are met.
//! Rows are then stably sorted by written premium, descending.

use crate::{
    dataset::{ActivityData, FunnelData, HouseholdIndex, PipelineData, ReferenceData},
    group::{GroupKey, Groups},
    metrics::{self, FunnelMetrics, FunnelTotals, ProductTypesByHousehold},
    model::{HouseholdStatus, Quote, Sale},
    types::{Cents, EntityId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const UNATTRIBUTED: &str = "Unattributed";
pub const UNKNOWN_SOURCE: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadSourceRoiRow {
    /// None for the synthetic Unattributed row.
    pub lead_source_id: Option<EntityId>,
    pub name: String,
    pub bucket_id: Option<EntityId>,
    pub bucket_name: Option<String>,
    #[serde(flatten)]
    pub totals: FunnelTotals,
    #[serde(flatten)]
    pub metrics: FunnelMetrics,
}

#[derive(Debug, Default)]
struct SourceAccumulator {
    leads: i64,
    quoted_households: HashSet<String>,
    sold_households: HashSet<String>,
    quoted_policies: i64,
    quoted_items: i64,
    quoted_premium_cents: Cents,
    written_policies: i64,
    written_items: i64,
    premium_cents: Cents,
    spend_cents: Cents,
    product_types: ProductTypesByHousehold,
}

impl SourceAccumulator {
    fn add_quote(&mut self, quote: &Quote) {
        self.quoted_policies += 1;
        self.quoted_items += quote.items();
        self.quoted_premium_cents += quote.premium_cents;
    }

    fn add_sale(&mut self, sale: &Sale) {
        self.written_policies += sale.policies();
        self.written_items += sale.items();
        self.premium_cents += sale.premium_cents;
        metrics::record_product_type(
            &mut self.product_types,
            &sale.household_id,
            sale.product_type.as_deref(),
        );
    }

    fn totals(&self) -> FunnelTotals {
        FunnelTotals {
            leads: self.leads,
            quoted_households: self.quoted_households.len() as i64,
            sold_households: self.sold_households.len() as i64,
            bundled_households: metrics::bundled_count(&self.product_types, &self.sold_households),
            quoted_policies: self.quoted_policies,
            quoted_items: self.quoted_items,
            quoted_premium_cents: self.quoted_premium_cents,
            written_policies: self.written_policies,
            written_items: self.written_items,
            premium_cents: self.premium_cents,
            spend_cents: self.spend_cents,
        }
    }
}

/// Build one row per lead source plus the Unattributed row.
pub fn aggregate(
    data: &FunnelData,
    reference: &ReferenceData,
    commission_rate: f64,
) -> Vec<LeadSourceRoiRow> {
    let index = HouseholdIndex::build(data.households());
    let mut groups: Groups<SourceAccumulator> = Groups::new();
    for source in &reference.lead_sources {
        groups.entry(Some(source.lead_source_id.as_str()));
    }
    groups.entry(None);

    match data {
        FunnelData::Pipeline(pipeline) => classify_by_status(&mut groups, pipeline),
        FunnelData::Activity(activity) => classify_by_events(&mut groups, activity, &index),
    }

    for quote in data.quotes() {
        groups
            .entry(index.lead_source_of(&quote.household_id))
            .add_quote(quote);
    }
    for sale in data.sales() {
        groups
            .entry(index.lead_source_of(&sale.household_id))
            .add_sale(sale);
    }
    for entry in &reference.spend {
        groups.entry(entry.lead_source_id.as_deref()).spend_cents += entry.spend_cents;
    }

    let with_quote_rate = !data.mode().is_activity();
    let mut rows: Vec<LeadSourceRoiRow> = groups
        .into_entries()
        .into_iter()
        .map(|(key, acc)| finish_row(key, &acc, reference, commission_rate, with_quote_rate))
        .collect();
    // sort_by is stable: equal premiums keep group order.
    rows.sort_by(|a, b| b.totals.premium_cents.cmp(&a.totals.premium_cents));
    rows
}

/// Pipeline: leads are all households; quoted/sold come from status.
fn classify_by_status(groups: &mut Groups<SourceAccumulator>, data: &PipelineData) {
    for household in &data.households {
        let acc = groups.entry(household.lead_source_id.as_deref());
        acc.leads += 1;
        if household.status.reached_quote() {
            acc.quoted_households.insert(household.household_id.clone());
        }
        if household.status == HouseholdStatus::Sold {
            acc.sold_households.insert(household.household_id.clone());
        }
    }
}

/// Activity: leads by lead date, quoted/sold by dated rows. Status is ignored.
fn classify_by_events(
    groups: &mut Groups<SourceAccumulator>,
    data: &ActivityData,
    index: &HouseholdIndex<'_>,
) {
    for household in data.leads() {
        groups.entry(household.lead_source_id.as_deref()).leads += 1;
    }
    for quote in data.quotes() {
        groups
            .entry(index.lead_source_of(&quote.household_id))
            .quoted_households
            .insert(quote.household_id.clone());
    }
    for sale in data.sales() {
        groups
            .entry(index.lead_source_of(&sale.household_id))
            .sold_households
            .insert(sale.household_id.clone());
    }
}

fn finish_row(
    key: GroupKey,
    acc: &SourceAccumulator,
    reference: &ReferenceData,
    commission_rate: f64,
    with_quote_rate: bool,
) -> LeadSourceRoiRow {
    let source = key.as_deref().and_then(|id| reference.lead_source(id));
    let name = match (&key, source) {
        (None, _) => UNATTRIBUTED.to_string(),
        (Some(_), Some(source)) => source.name.clone(),
        (Some(_), None) => UNKNOWN_SOURCE.to_string(),
    };
    let bucket_id = source.and_then(|s| s.bucket_id.clone());
    let bucket_name = bucket_id
        .as_deref()
        .and_then(|id| reference.bucket_name(id))
        .map(str::to_string);

    let totals = acc.totals();
    let metrics = FunnelMetrics::compute(&totals, commission_rate, with_quote_rate);
    LeadSourceRoiRow {
        lead_source_id: key,
        name,
        bucket_id,
        bucket_name,
        totals,
        metrics,
    }
}
