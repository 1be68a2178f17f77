//! Marketing bucket roll-up over the lead-source rows.
//!
//! A lead source belongs to at most one bucket, so pooling the rows'
//! counts never counts a household twice. Ratios are recomputed from
//! the pooled counts, never averaged.

use crate::{
    dataset::ReferenceData,
    group::Groups,
    lead_source::LeadSourceRoiRow,
    metrics::{FunnelMetrics, FunnelTotals},
    types::EntityId,
};
use serde::{Deserialize, Serialize};

pub const UNBUCKETED: &str = "Unbucketed";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketRoiRow {
    pub bucket_id: Option<EntityId>,
    pub name: String,
    pub lead_source_count: usize,
    #[serde(flatten)]
    pub totals: FunnelTotals,
    #[serde(flatten)]
    pub metrics: FunnelMetrics,
}

#[derive(Debug, Default)]
struct BucketAccumulator {
    lead_sources: usize,
    totals: FunnelTotals,
}

pub fn roll_up(
    rows: &[LeadSourceRoiRow],
    reference: &ReferenceData,
    commission_rate: f64,
    with_quote_rate: bool,
) -> Vec<BucketRoiRow> {
    let mut groups: Groups<BucketAccumulator> = Groups::new();
    for bucket in &reference.buckets {
        groups.entry(Some(bucket.bucket_id.as_str()));
    }
    for row in rows {
        let acc = groups.entry(row.bucket_id.as_deref());
        acc.lead_sources += 1;
        acc.totals.add(&row.totals);
    }

    let mut buckets: Vec<BucketRoiRow> = groups
        .into_entries()
        .into_iter()
        .map(|(key, acc)| {
            let name = match key.as_deref() {
                None => UNBUCKETED.to_string(),
                Some(id) => reference
                    .bucket_name(id)
                    .unwrap_or("Unknown")
                    .to_string(),
            };
            BucketRoiRow {
                bucket_id: key,
                name,
                lead_source_count: acc.lead_sources,
                metrics: FunnelMetrics::compute(&acc.totals, commission_rate, with_quote_rate),
                totals: acc.totals,
            }
        })
        .collect();
    buckets.sort_by(|a, b| b.totals.premium_cents.cmp(&a.totals.premium_cents));
    buckets
}
