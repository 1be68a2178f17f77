//! Metric calculator: pure, null-safe ratio and cost functions.
//!
//! RULE: A zero denominator yields None. No function here may return
//! NaN or an infinity, and none may panic.

use crate::types::Cents;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// `numerator / denominator * 100`, or None when the denominator is zero.
pub fn ratio_pct(numerator: i64, denominator: i64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(numerator as f64 / denominator as f64 * 100.0)
}

/// Spend per unit, rounded to the nearest cent.
/// None when there are no units or no recorded spend.
pub fn cost_per(spend_cents: Cents, units: i64) -> Option<Cents> {
    if units <= 0 || spend_cents <= 0 {
        return None;
    }
    Some((spend_cents as f64 / units as f64).round() as Cents)
}

/// Commission earned on `premium_cents` at `rate` percent, rounded to the cent.
pub fn commission(premium_cents: Cents, rate: f64) -> Cents {
    (premium_cents as f64 * rate / 100.0).round() as Cents
}

/// Commission earned per dollar of spend. None without positive spend.
pub fn roi(premium_cents: Cents, rate: f64, spend_cents: Cents) -> Option<f64> {
    if spend_cents <= 0 {
        return None;
    }
    let earned = premium_cents as f64 * rate / 100.0;
    Some(earned / spend_cents as f64)
}

/// Distinct product types per sold household, built from sale rows only.
pub type ProductTypesByHousehold = HashMap<String, HashSet<String>>;

/// Households in `sold` carrying at least two distinct product types.
pub fn bundled_count(types: &ProductTypesByHousehold, sold: &HashSet<String>) -> i64 {
    sold.iter()
        .filter(|id| types.get(id.as_str()).is_some_and(|t| t.len() >= 2))
        .count() as i64
}

pub fn record_product_type(
    types: &mut ProductTypesByHousehold,
    household_id: &str,
    product_type: Option<&str>,
) {
    let entry = types.entry(household_id.to_string()).or_default();
    if let Some(product) = product_type {
        entry.insert(product.to_string());
    }
}

/// Raw funnel counts for one group (or for a pool of groups).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunnelTotals {
    pub leads: i64,
    pub quoted_households: i64,
    pub sold_households: i64,
    pub bundled_households: i64,
    pub quoted_policies: i64,
    pub quoted_items: i64,
    pub quoted_premium_cents: Cents,
    pub written_policies: i64,
    pub written_items: i64,
    pub premium_cents: Cents,
    pub spend_cents: Cents,
}

impl FunnelTotals {
    pub fn add(&mut self, other: &FunnelTotals) {
        self.leads += other.leads;
        self.quoted_households += other.quoted_households;
        self.sold_households += other.sold_households;
        self.bundled_households += other.bundled_households;
        self.quoted_policies += other.quoted_policies;
        self.quoted_items += other.quoted_items;
        self.quoted_premium_cents += other.quoted_premium_cents;
        self.written_policies += other.written_policies;
        self.written_items += other.written_items;
        self.premium_cents += other.premium_cents;
        self.spend_cents += other.spend_cents;
    }
}

/// Derived per-group metrics. Every Option is None for a zero divisor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunnelMetrics {
    pub commission_cents: Cents,
    /// Quoted households per lead. Pipeline mode only.
    pub quote_rate: Option<f64>,
    pub close_ratio: Option<f64>,
    pub bundle_ratio: Option<f64>,
    pub cost_per_quoted_household: Option<Cents>,
    pub cost_per_quoted_policy: Option<Cents>,
    pub cost_per_quoted_item: Option<Cents>,
    pub household_acq_cost: Option<Cents>,
    pub policy_acq_cost: Option<Cents>,
    pub item_acq_cost: Option<Cents>,
    pub cost_per_sale: Option<Cents>,
    pub roi: Option<f64>,
}

impl FunnelMetrics {
    pub fn compute(totals: &FunnelTotals, commission_rate: f64, with_quote_rate: bool) -> Self {
        let spend = totals.spend_cents;
        Self {
            commission_cents: commission(totals.premium_cents, commission_rate),
            quote_rate: if with_quote_rate {
                ratio_pct(totals.quoted_households, totals.leads)
            } else {
                None
            },
            close_ratio: ratio_pct(totals.sold_households, totals.quoted_households),
            bundle_ratio: ratio_pct(totals.bundled_households, totals.sold_households),
            cost_per_quoted_household: cost_per(spend, totals.quoted_households),
            cost_per_quoted_policy: cost_per(spend, totals.quoted_policies),
            cost_per_quoted_item: cost_per(spend, totals.quoted_items),
            household_acq_cost: cost_per(spend, totals.sold_households),
            policy_acq_cost: cost_per(spend, totals.written_policies),
            item_acq_cost: cost_per(spend, totals.written_items),
            cost_per_sale: cost_per(spend, totals.sold_households),
            roi: roi(totals.premium_cents, commission_rate, spend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominators_are_none() {
        assert_eq!(ratio_pct(5, 0), None);
        assert_eq!(cost_per(50_000, 0), None);
        assert_eq!(roi(100_000, 22.0, 0), None);
    }

    #[test]
    fn zero_spend_has_no_cost_or_roi() {
        assert_eq!(cost_per(0, 2), None);
        assert_eq!(roi(100_000, 22.0, 0), None);
    }

    #[test]
    fn cost_per_rounds_to_nearest_cent() {
        // $500 over 3 sales is $166.666...
        assert_eq!(cost_per(50_000, 3), Some(16_667));
    }

    #[test]
    fn commission_and_roi() {
        assert_eq!(commission(900_000, 20.0), 180_000);
        let r = roi(900_000, 20.0, 50_000).unwrap();
        assert!((r - 3.6).abs() < 1e-9, "roi was {r}");
    }

    #[test]
    fn bundles_count_distinct_types_not_rows() {
        let mut types = ProductTypesByHousehold::new();
        record_product_type(&mut types, "h1", Some("auto"));
        record_product_type(&mut types, "h1", Some("auto"));
        record_product_type(&mut types, "h2", Some("auto"));
        record_product_type(&mut types, "h2", Some("home"));
        record_product_type(&mut types, "h3", None);
        let sold: HashSet<String> = ["h1", "h2", "h3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(bundled_count(&types, &sold), 1);
    }

    #[test]
    fn metrics_for_an_empty_group_are_all_none() {
        let m = FunnelMetrics::compute(&FunnelTotals::default(), 22.0, true);
        assert_eq!(m.commission_cents, 0);
        assert!(m.quote_rate.is_none());
        assert!(m.close_ratio.is_none());
        assert!(m.bundle_ratio.is_none());
        assert!(m.cost_per_quoted_household.is_none());
        assert!(m.cost_per_quoted_policy.is_none());
        assert!(m.cost_per_quoted_item.is_none());
        assert!(m.household_acq_cost.is_none());
        assert!(m.policy_acq_cost.is_none());
        assert!(m.item_acq_cost.is_none());
        assert!(m.cost_per_sale.is_none());
        assert!(m.roi.is_none());
    }
}
