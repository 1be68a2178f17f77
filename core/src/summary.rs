//! Summary reducer: one top-level object per computation.

use crate::{
    dataset::FunnelData,
    lead_source::LeadSourceRoiRow,
    metrics::{self, FunnelTotals},
    mode::ReportMode,
    model::HouseholdStatus,
    record_store::Collection,
    types::Cents,
};
use serde::{Deserialize, Serialize};

/// Headline counts. Their meaning differs per mode, so do their names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunnelCounts {
    /// Households bucketed by current status.
    Pipeline {
        total_households: i64,
        open_leads: i64,
        /// Status quoted only. Sold households are not included here,
        /// unlike the per-source `quoted_households`.
        currently_quoted: i64,
        sold_households: i64,
    },
    /// Distinct households with an event inside the window.
    Activity {
        leads_received: i64,
        households_quoted: i64,
        households_sold: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub mode: ReportMode,
    pub counts: FunnelCounts,
    pub commission_rate: f64,
    pub quoted_policies: i64,
    pub quoted_items: i64,
    pub quoted_premium_cents: Cents,
    pub written_policies: i64,
    pub written_items: i64,
    pub total_premium_cents: Cents,
    pub total_commission_cents: Cents,
    pub total_spend_cents: Cents,
    pub roi: Option<f64>,
    /// Pipeline only: households that reached a quote per household.
    pub quote_rate: Option<f64>,
    /// Pipeline only: sold households per household that reached a quote.
    pub close_rate: Option<f64>,
    pub bundled_households: i64,
    pub bundle_ratio: Option<f64>,
    /// Collections that hit the fetch ceiling. Non-empty means the
    /// figures above undercount.
    pub truncated_collections: Vec<Collection>,
}

impl Summary {
    pub fn reduce(
        data: &FunnelData,
        rows: &[LeadSourceRoiRow],
        commission_rate: f64,
        truncated: &[Collection],
    ) -> Self {
        let mut pooled = FunnelTotals::default();
        for row in rows {
            pooled.add(&row.totals);
        }

        let (counts, quote_rate, close_rate) = match data {
            FunnelData::Pipeline(pipeline) => {
                let status_count = |status: HouseholdStatus| {
                    pipeline
                        .households
                        .iter()
                        .filter(|h| h.status == status)
                        .count() as i64
                };
                let total = pipeline.households.len() as i64;
                let open = status_count(HouseholdStatus::Lead);
                let quoted = status_count(HouseholdStatus::Quoted);
                let sold = status_count(HouseholdStatus::Sold);
                (
                    FunnelCounts::Pipeline {
                        total_households: total,
                        open_leads: open,
                        currently_quoted: quoted,
                        sold_households: sold,
                    },
                    metrics::ratio_pct(quoted + sold, total),
                    metrics::ratio_pct(sold, quoted + sold),
                )
            }
            // A windowed quote count has no matching lead denominator,
            // so neither rate is defined in Activity mode.
            FunnelData::Activity(_) => (
                FunnelCounts::Activity {
                    leads_received: pooled.leads,
                    households_quoted: pooled.quoted_households,
                    households_sold: pooled.sold_households,
                },
                None,
                None,
            ),
        };

        Self {
            mode: data.mode(),
            counts,
            commission_rate,
            quoted_policies: pooled.quoted_policies,
            quoted_items: pooled.quoted_items,
            quoted_premium_cents: pooled.quoted_premium_cents,
            written_policies: pooled.written_policies,
            written_items: pooled.written_items,
            total_premium_cents: pooled.premium_cents,
            total_commission_cents: metrics::commission(pooled.premium_cents, commission_rate),
            total_spend_cents: pooled.spend_cents,
            roi: metrics::roi(pooled.premium_cents, commission_rate, pooled.spend_cents),
            quote_rate,
            close_rate,
            bundled_households: pooled.bundled_households,
            bundle_ratio: metrics::ratio_pct(pooled.bundled_households, pooled.sold_households),
            truncated_collections: truncated.to_vec(),
        }
    }
}
