//! Producer aggregator: "Quoted By" and "Sold By" views.
//!
//! The two views answer different questions and their close ratios are
//! not the same formula:
//!
//!   Quoted By: of the households this producer quoted, the share sold
//!              by anyone.  |quoted ∩ sold_global| / |quoted| * 100
//!   Sold By:   of all households quoted by anyone, the share this
//!              producer closed.  |sold| / |quoted_global| * 100
//!
//! Sold-side totals on Quoted By rows stay zero; crediting closed premium
//! to the quoter would double count against the Sold By view.

use crate::{
    dataset::{FunnelData, ReferenceData},
    group::Groups,
    metrics::{self, ProductTypesByHousehold},
    model::{Quote, Sale},
    types::{Cents, EntityId},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProducerView {
    QuotedBy,
    SoldBy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProducerMetrics {
    pub view: ProducerView,
    /// None groups records with no producer ("Unassigned").
    pub team_member_id: Option<EntityId>,
    pub name: String,
    pub quoted_households: i64,
    pub sold_households: i64,
    pub bundled_households: i64,
    pub quoted_policies: i64,
    pub quoted_items: i64,
    pub quoted_premium_cents: Cents,
    pub written_policies: i64,
    pub written_items: i64,
    pub written_premium_cents: Cents,
    pub commission_cents: Cents,
    pub close_ratio: Option<f64>,
    pub bundle_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProducerViews {
    pub quoted_by: Vec<ProducerMetrics>,
    pub sold_by: Vec<ProducerMetrics>,
}

/// Funnel-wide household sets shared by both views.
struct GlobalSets {
    quoted: HashSet<String>,
    sold: HashSet<String>,
    product_types: ProductTypesByHousehold,
}

impl GlobalSets {
    fn collect(quotes: &[Quote], sales: &[Sale]) -> Self {
        let quoted = quotes.iter().map(|q| q.household_id.clone()).collect();
        let mut sold = HashSet::new();
        let mut product_types = ProductTypesByHousehold::new();
        for sale in sales {
            sold.insert(sale.household_id.clone());
            metrics::record_product_type(
                &mut product_types,
                &sale.household_id,
                sale.product_type.as_deref(),
            );
        }
        Self {
            quoted,
            sold,
            product_types,
        }
    }
}

#[derive(Debug, Default)]
struct QuoterAccumulator {
    households: HashSet<String>,
    policies: i64,
    items: i64,
    premium_cents: Cents,
}

#[derive(Debug, Default)]
struct CloserAccumulator {
    households: HashSet<String>,
    policies: i64,
    items: i64,
    premium_cents: Cents,
    product_types: ProductTypesByHousehold,
}

/// Both producer views over the same quote and sale rows.
pub fn aggregate(data: &FunnelData, reference: &ReferenceData, commission_rate: f64) -> ProducerViews {
    let globals = GlobalSets::collect(data.quotes(), data.sales());
    let mut quoted_by = quoted_by_view(data.quotes(), &globals, reference);
    let mut sold_by = sold_by_view(data.sales(), &globals, reference, commission_rate);

    quoted_by.sort_by(|a, b| {
        b.quoted_households
            .cmp(&a.quoted_households)
            .then_with(|| by_name(a, b))
    });
    sold_by.sort_by(|a, b| {
        b.written_premium_cents
            .cmp(&a.written_premium_cents)
            .then_with(|| by_name(a, b))
    });

    ProducerViews { quoted_by, sold_by }
}

fn quoted_by_view(
    quotes: &[Quote],
    globals: &GlobalSets,
    reference: &ReferenceData,
) -> Vec<ProducerMetrics> {
    let mut groups: Groups<QuoterAccumulator> = Groups::new();
    for quote in quotes {
        let acc = groups.entry(quote.team_member_id.as_deref());
        acc.households.insert(quote.household_id.clone());
        acc.policies += 1;
        acc.items += quote.items();
        acc.premium_cents += quote.premium_cents;
    }

    groups
        .into_entries()
        .into_iter()
        .map(|(key, acc)| {
            // Quoted households that were closed by anyone.
            let converted: HashSet<String> = acc
                .households
                .intersection(&globals.sold)
                .cloned()
                .collect();
            let converted_count = converted.len() as i64;
            let bundled = metrics::bundled_count(&globals.product_types, &converted);
            let quoted_count = acc.households.len() as i64;

            ProducerMetrics {
                view: ProducerView::QuotedBy,
                name: reference.producer_name(key.as_deref()),
                team_member_id: key,
                quoted_households: quoted_count,
                sold_households: converted_count,
                bundled_households: bundled,
                quoted_policies: acc.policies,
                quoted_items: acc.items,
                quoted_premium_cents: acc.premium_cents,
                written_policies: 0,
                written_items: 0,
                written_premium_cents: 0,
                commission_cents: 0,
                close_ratio: metrics::ratio_pct(converted_count, quoted_count),
                bundle_ratio: metrics::ratio_pct(bundled, converted_count),
            }
        })
        .collect()
}

fn sold_by_view(
    sales: &[Sale],
    globals: &GlobalSets,
    reference: &ReferenceData,
    commission_rate: f64,
) -> Vec<ProducerMetrics> {
    let mut groups: Groups<CloserAccumulator> = Groups::new();
    for sale in sales {
        let acc = groups.entry(sale.team_member_id.as_deref());
        acc.households.insert(sale.household_id.clone());
        acc.policies += sale.policies();
        acc.items += sale.items();
        acc.premium_cents += sale.premium_cents;
        metrics::record_product_type(
            &mut acc.product_types,
            &sale.household_id,
            sale.product_type.as_deref(),
        );
    }

    let quoted_global = globals.quoted.len() as i64;
    groups
        .into_entries()
        .into_iter()
        .map(|(key, acc)| {
            let sold_count = acc.households.len() as i64;
            let bundled = metrics::bundled_count(&acc.product_types, &acc.households);

            ProducerMetrics {
                view: ProducerView::SoldBy,
                name: reference.producer_name(key.as_deref()),
                team_member_id: key,
                quoted_households: 0,
                sold_households: sold_count,
                bundled_households: bundled,
                quoted_policies: 0,
                quoted_items: 0,
                quoted_premium_cents: 0,
                written_policies: acc.policies,
                written_items: acc.items,
                written_premium_cents: acc.premium_cents,
                commission_cents: metrics::commission(acc.premium_cents, commission_rate),
                close_ratio: metrics::ratio_pct(sold_count, quoted_global),
                bundle_ratio: metrics::ratio_pct(bundled, sold_count),
            }
        })
        .collect()
}

fn by_name(a: &ProducerMetrics, b: &ProducerMetrics) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| a.team_member_id.cmp(&b.team_member_id))
}
