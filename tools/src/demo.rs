//! Deterministic demo agency.
//!
//! RULE: The same seed always produces the same agency, ids included.
//! Nothing here may call a platform RNG; every draw (uuids too) comes
//! from the single seeded stream.

use anyhow::Result;
use chrono::{Datelike, Duration, Months, NaiveDate};
use funnel_core::{
    error::AnalyticsResult,
    model::{
        Household, HouseholdStatus, LeadSource, MarketingBucket, Quote, Sale, SpendLedgerEntry,
        TeamMember,
    },
    store::AgencyStore,
    types::Cents,
};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Seeded stream behind every demo draw.
pub struct DemoRng {
    inner: Pcg64Mcg,
}

impl DemoRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll an integer in [lo, hi].
    pub fn between(&mut self, lo: i64, hi: i64) -> i64 {
        let span = (hi - lo + 1).max(1) as u64;
        lo + (self.inner.next_u64() % span) as i64
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let index = self.inner.next_u64() % items.len() as u64;
        &items[index as usize]
    }

    /// A v4-shaped uuid whose bytes come from the seeded stream.
    pub fn uuid(&mut self) -> String {
        let mut bytes = [0u8; 16];
        self.inner.fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string()
    }
}

struct SourcePlan {
    name: &'static str,
    bucket: Option<usize>,
    leads_per_month: (i64, i64),
    /// Monthly spend range in whole dollars. (0, 0) means free.
    spend_dollars: (i64, i64),
    quote_chance: f64,
}

const BUCKETS: &[&str] = &["Paid Digital", "Referral Partners"];

const SOURCES: &[SourcePlan] = &[
    SourcePlan { name: "Facebook Ads",    bucket: Some(0), leads_per_month: (10, 22), spend_dollars: (1_500, 3_500), quote_chance: 0.55 },
    SourcePlan { name: "Google Ads",      bucket: Some(0), leads_per_month: (8, 16),  spend_dollars: (2_000, 4_000), quote_chance: 0.65 },
    SourcePlan { name: "Realtor Network", bucket: Some(1), leads_per_month: (3, 8),   spend_dollars: (150, 400),     quote_chance: 0.80 },
    SourcePlan { name: "Walk-in",         bucket: None,    leads_per_month: (2, 6),   spend_dollars: (0, 0),         quote_chance: 0.70 },
];

/// (product type, annual premium range in whole dollars)
const PRODUCTS: &[(&str, (i64, i64))] = &[
    ("auto", (900, 2_400)),
    ("home", (800, 2_000)),
    ("renters", (150, 350)),
    ("umbrella", (250, 600)),
    ("life", (400, 1_500)),
];

const FIRST_NAMES: &[&str] = &[
    "James", "Maria", "Robert", "Linda", "Michael", "Susan", "David", "Karen",
    "Daniel", "Nancy", "Kevin", "Emily", "Jason", "Angela", "Ryan", "Rachel",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Garcia", "Nguyen", "Patel", "Brooks", "Reyes", "Foster", "Murphy",
    "Coleman", "Chen", "Sullivan", "Hayes", "Ortiz", "Palmer", "Wallace", "Kim",
];

const PRODUCERS: usize = 4;

/// What the seeder wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DemoCounts {
    pub households: usize,
    pub quotes: usize,
    pub sales: usize,
    pub spend_entries: usize,
}

/// Seed `months` months of synthetic agency history starting at the
/// month containing `start`.
pub fn seed_agency(
    store: &AgencyStore,
    agency_id: &str,
    seed: u64,
    start: NaiveDate,
    months: u32,
) -> Result<DemoCounts> {
    let mut rng = DemoRng::new(seed);
    let first_month = start.with_day(1).unwrap_or(start);

    let counts = store.in_transaction(|store| {
        store.insert_agency(agency_id, "Demo Agency", None)?;

        let bucket_ids: Vec<String> = BUCKETS
            .iter()
            .map(|name| {
                let bucket = MarketingBucket {
                    bucket_id: rng.uuid(),
                    name: name.to_string(),
                };
                store.insert_bucket(agency_id, &bucket)?;
                Ok(bucket.bucket_id)
            })
            .collect::<AnalyticsResult<_>>()?;

        let source_ids: Vec<String> = SOURCES
            .iter()
            .map(|plan| {
                let source = LeadSource {
                    lead_source_id: rng.uuid(),
                    name: plan.name.to_string(),
                    bucket_id: plan.bucket.map(|i| bucket_ids[i].clone()),
                };
                store.insert_lead_source(agency_id, &source)?;
                Ok(source.lead_source_id)
            })
            .collect::<AnalyticsResult<_>>()?;

        let mut producer_ids = Vec::with_capacity(PRODUCERS);
        for _ in 0..PRODUCERS {
            let member = TeamMember {
                team_member_id: rng.uuid(),
                name: format!("{} {}", rng.pick(FIRST_NAMES), rng.pick(LAST_NAMES)),
            };
            store.insert_team_member(agency_id, &member)?;
            producer_ids.push(member.team_member_id);
        }

        let mut counts = DemoCounts::default();
        for m in 0..months {
            let Some(month) = first_month.checked_add_months(Months::new(m)) else {
                break;
            };
            let days_in_month = days_in(month);

            for (plan, source_id) in SOURCES.iter().zip(&source_ids) {
                if plan.spend_dollars.1 > 0 {
                    let dollars = rng.between(plan.spend_dollars.0, plan.spend_dollars.1);
                    store.insert_spend(
                        agency_id,
                        &SpendLedgerEntry {
                            lead_source_id: Some(source_id.clone()),
                            month,
                            spend_cents: dollars * 100,
                        },
                    )?;
                    counts.spend_entries += 1;
                }

                let leads = rng.between(plan.leads_per_month.0, plan.leads_per_month.1);
                for _ in 0..leads {
                    let lead_date = month + Duration::days(rng.between(0, days_in_month - 1));
                    // A few households lose their source on import.
                    let source = if rng.chance(0.05) {
                        None
                    } else {
                        Some(source_id.as_str())
                    };
                    seed_household(store, agency_id, &mut rng, &producer_ids, plan, source, lead_date, &mut counts)?;
                }
            }
        }
        Ok(counts)
    })?;

    log::info!(
        "demo agency {agency_id}: seed={seed} households={} quotes={} sales={} spend_entries={}",
        counts.households,
        counts.quotes,
        counts.sales,
        counts.spend_entries
    );
    Ok(counts)
}

#[allow(clippy::too_many_arguments)]
fn seed_household(
    store: &AgencyStore,
    agency_id: &str,
    rng: &mut DemoRng,
    producer_ids: &[String],
    plan: &SourcePlan,
    source: Option<&str>,
    lead_date: NaiveDate,
    counts: &mut DemoCounts,
) -> AnalyticsResult<()> {
    let household_id = rng.uuid();
    let quoted = rng.chance(plan.quote_chance);
    let sold = quoted && rng.chance(0.45);
    let status = match (quoted, sold) {
        (_, true) => HouseholdStatus::Sold,
        (true, false) => HouseholdStatus::Quoted,
        _ => HouseholdStatus::Lead,
    };

    let created_at = lead_date
        .and_hms_opt(rng.between(8, 18) as u32, rng.between(0, 59) as u32, 0)
        .unwrap_or_default()
        .and_utc();
    store.insert_household(&Household {
        household_id: household_id.clone(),
        agency_id: agency_id.to_string(),
        status,
        lead_source_id: source.map(str::to_string),
        created_at,
        // Older imports never recorded a lead date.
        lead_received_date: (!rng.chance(0.1)).then_some(lead_date),
    })?;
    counts.households += 1;

    if !quoted {
        return Ok(());
    }

    let quoter = pick_producer(rng, producer_ids);
    let quote_date = lead_date + Duration::days(rng.between(0, 6));
    let product_count = rng.between(1, 3) as usize;
    let mut quoted_products: Vec<(&str, Cents)> = Vec::with_capacity(product_count);
    for _ in 0..product_count {
        let (product, (lo, hi)) = *rng.pick(PRODUCTS);
        if quoted_products.iter().any(|(p, _)| *p == product) {
            continue;
        }
        let premium = rng.between(lo, hi) * 100;
        store.insert_quote(
            agency_id,
            &Quote {
                quote_id: rng.uuid(),
                household_id: household_id.clone(),
                team_member_id: quoter.clone(),
                items_quoted: Some(rng.between(1, 2)),
                premium_cents: premium,
                product_type: Some(product.to_string()),
                quote_date,
            },
        )?;
        quoted_products.push((product, premium));
        counts.quotes += 1;
    }

    if !sold {
        return Ok(());
    }

    // Closers are usually the quoter, but not always.
    let closer = if rng.chance(0.7) {
        quoter
    } else {
        pick_producer(rng, producer_ids)
    };
    let sale_date = quote_date + Duration::days(rng.between(1, 14));
    for (i, (product, quoted_premium)) in quoted_products.iter().enumerate() {
        if i > 0 && !rng.chance(0.6) {
            continue;
        }
        // Final premium lands within +/-10% of the quote.
        let adjust = 0.9 + rng.next_f64() * 0.2;
        store.insert_sale(
            agency_id,
            &Sale {
                sale_id: rng.uuid(),
                household_id: household_id.clone(),
                team_member_id: closer.clone(),
                items_sold: Some(rng.between(1, 2)),
                policies_sold: Some(1),
                premium_cents: (*quoted_premium as f64 * adjust).round() as Cents,
                product_type: Some(product.to_string()),
                sale_date,
            },
        )?;
        counts.sales += 1;
    }
    Ok(())
}

/// Roughly one record in twenty carries no producer.
fn pick_producer(rng: &mut DemoRng, producer_ids: &[String]) -> Option<String> {
    if rng.chance(0.05) {
        None
    } else {
        Some(rng.pick(producer_ids).clone())
    }
}

fn days_in(month: NaiveDate) -> i64 {
    month
        .checked_add_months(Months::new(1))
        .map(|next| (next - month).num_days())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::{config::AnalyticsConfig, engine::{AnalyticsEngine, AnalyticsQuery}};

    fn seeded(seed: u64) -> (AgencyStore, DemoCounts) {
        let store = AgencyStore::in_memory().unwrap();
        store.migrate().unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let counts = seed_agency(&store, "demo", seed, start, 3).unwrap();
        (store, counts)
    }

    #[test]
    fn same_seed_same_agency() {
        let (a, counts_a) = seeded(7);
        let (b, counts_b) = seeded(7);
        assert_eq!(counts_a, counts_b);

        let query = AnalyticsQuery::pipeline("demo");
        let report_a = AnalyticsEngine::new(&a, AnalyticsConfig::default()).unwrap().run(&query).unwrap();
        let report_b = AnalyticsEngine::new(&b, AnalyticsConfig::default()).unwrap().run(&query).unwrap();
        assert_eq!(report_a, report_b, "same seed must reproduce the same report");
    }

    #[test]
    fn seeds_every_collection() {
        let (store, counts) = seeded(42);
        assert!(counts.households > 0);
        assert!(counts.quotes > 0);
        assert!(counts.sales > 0);
        // Three paid or partner sources, three months.
        assert_eq!(counts.spend_entries, 9);

        let report = AnalyticsEngine::new(&store, AnalyticsConfig::default())
            .unwrap()
            .run(&AnalyticsQuery::pipeline("demo"))
            .unwrap();
        assert!(report.summary.total_premium_cents > 0);
        assert!(!report.sold_by.is_empty());
        assert!(report.buckets.iter().any(|b| b.name == "Paid Digital"));
    }

    #[test]
    fn uuids_are_well_formed_and_distinct() {
        let mut rng = DemoRng::new(1);
        let a = rng.uuid();
        let b = rng.uuid();
        assert_ne!(a, b);
        assert_eq!(uuid::Uuid::parse_str(&a).unwrap().get_version_num(), 4);
    }
}
