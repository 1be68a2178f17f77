//! funnel-report: headless attribution report for one agency.
//!
//! Usage:
//!   funnel-report --db agency.db --agency agency-1
//!   funnel-report --db agency.db --agency agency-1 --start 2024-03-01 --end 2024-03-31
//!   funnel-report --seed-demo 42 --months 6 --json
//!
//! No --start/--end runs the Pipeline view (current household status).
//! Both together run the Activity view for that window.

mod demo;
mod format;

use anyhow::{bail, Result};
use chrono::{Months, NaiveDate};
use format::{dollars, dollars_opt, multiple, percent};
use funnel_core::{
    config::AnalyticsConfig,
    engine::{AnalyticsEngine, AnalyticsQuery, AnalyticsReport},
    mode::DateRange,
    store::AgencyStore,
    summary::FunnelCounts,
};
use std::env;

const DEMO_AGENCY: &str = "demo-agency";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let json = args.iter().any(|a| a == "--json");
    let demo_seed: Option<u64> = flag_value(&args, "--seed-demo")
        .map(|v| v.parse())
        .transpose()
        .map_err(|e| anyhow::anyhow!("--seed-demo: {e}"))?;
    let months = parse_arg(&args, "--months", 6u32);

    let config = match flag_value(&args, "--config") {
        Some(path) => AnalyticsConfig::load(path)?,
        None => AnalyticsConfig::default(),
    };
    let range = parse_range(flag_value(&args, "--start"), flag_value(&args, "--end"))?;

    let store = AgencyStore::open(db)?;
    store.migrate()?;

    // An in-memory database starts empty, so it always gets the demo agency.
    let demo_seed = match (demo_seed, db) {
        (None, ":memory:") => Some(42),
        (seed, _) => seed,
    };
    let agency_id = match demo_seed {
        Some(seed) => {
            // Without a window, end the demo history at the current month.
            let start = range.map(|r| r.start()).unwrap_or_else(|| {
                let today = chrono::Utc::now().date_naive();
                today
                    .checked_sub_months(Months::new(months.saturating_sub(1)))
                    .unwrap_or(today)
            });
            let counts = demo::seed_agency(&store, DEMO_AGENCY, seed, start, months)?;
            if !json {
                println!(
                    "Seeded demo agency '{DEMO_AGENCY}' (seed {seed}): {} households, {} quotes, {} sales",
                    counts.households, counts.quotes, counts.sales
                );
                println!();
            }
            DEMO_AGENCY.to_string()
        }
        None => match flag_value(&args, "--agency") {
            Some(agency) => agency.to_string(),
            None => bail!("--agency is required unless --seed-demo is given"),
        },
    };

    let query = AnalyticsQuery {
        agency_id,
        range,
    };
    let engine = AnalyticsEngine::new(&store, config)?;
    let report = engine.run(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&query, &report);
    }
    Ok(())
}

fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<Option<DateRange>> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => {
            let start = parse_date("--start", start)?;
            let end = parse_date("--end", end)?;
            Ok(Some(DateRange::new(start, end)?))
        }
        _ => bail!("--start and --end must be given together"),
    }
}

fn parse_date(flag: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("{flag} {value}: expected YYYY-MM-DD ({e})"))
}

fn print_report(query: &AnalyticsQuery, report: &AnalyticsReport) {
    let s = &report.summary;

    println!("=== FUNNEL SUMMARY ===");
    println!("  agency:          {}", query.agency_id);
    match query.range {
        Some(range) => println!("  mode:            activity ({} to {})", range.start(), range.end()),
        None => println!("  mode:            pipeline"),
    }
    match &s.counts {
        FunnelCounts::Pipeline {
            total_households,
            open_leads,
            currently_quoted,
            sold_households,
        } => {
            println!("  households:      {total_households}");
            println!("  open leads:      {open_leads}");
            println!("  quoted (open):   {currently_quoted}");
            println!("  sold:            {sold_households}");
        }
        FunnelCounts::Activity {
            leads_received,
            households_quoted,
            households_sold,
        } => {
            println!("  leads received:  {leads_received}");
            println!("  hh quoted:       {households_quoted}");
            println!("  hh sold:         {households_sold}");
        }
    }
    println!("  quote rate:      {}", percent(s.quote_rate));
    println!("  close rate:      {}", percent(s.close_rate));
    println!("  policies:        {} quoted / {} written", s.quoted_policies, s.written_policies);
    println!("  items:           {} quoted / {} written", s.quoted_items, s.written_items);
    println!("  premium:         {}", dollars(s.total_premium_cents));
    println!("  commission:      {} at {:.1}%", dollars(s.total_commission_cents), s.commission_rate);
    println!("  spend:           {}", dollars(s.total_spend_cents));
    println!("  roi:             {}", multiple(s.roi));
    println!("  bundle ratio:    {}", percent(s.bundle_ratio));
    for collection in &s.truncated_collections {
        println!("  WARNING: {collection} hit the fetch ceiling; figures undercount");
    }

    println!();
    println!("=== LEAD SOURCES ===");
    println!(
        "  {:<22} {:>6} {:>6} {:>5} {:>14} {:>12} {:>7} {:>7} {:>11} {:>7}",
        "source", "leads", "quoted", "sold", "premium", "spend", "quote%", "close%", "cost/sale", "roi"
    );
    for row in &report.lead_sources {
        let t = &row.totals;
        let m = &row.metrics;
        println!(
            "  {:<22} {:>6} {:>6} {:>5} {:>14} {:>12} {:>7} {:>7} {:>11} {:>7}",
            truncate(&row.name, 22),
            t.leads,
            t.quoted_households,
            t.sold_households,
            dollars(t.premium_cents),
            dollars(t.spend_cents),
            percent(m.quote_rate),
            percent(m.close_ratio),
            dollars_opt(m.cost_per_sale),
            multiple(m.roi),
        );
    }

    println!();
    println!("=== MARKETING BUCKETS ===");
    for row in &report.buckets {
        println!(
            "  {:<22} {:>2} sources | premium {:>14} | spend {:>12} | roi {:>7} | hh acq {:>10}",
            truncate(&row.name, 22),
            row.lead_source_count,
            dollars(row.totals.premium_cents),
            dollars(row.totals.spend_cents),
            multiple(row.metrics.roi),
            dollars_opt(row.metrics.household_acq_cost),
        );
    }

    println!();
    println!("=== QUOTED BY ===");
    for p in &report.quoted_by {
        println!(
            "  {:<22} quoted {:>4} hh / {:>4} policies | {:>14} quoted | close {:>7} | bundle {:>7}",
            truncate(&p.name, 22),
            p.quoted_households,
            p.quoted_policies,
            dollars(p.quoted_premium_cents),
            percent(p.close_ratio),
            percent(p.bundle_ratio),
        );
    }

    println!();
    println!("=== SOLD BY ===");
    for p in &report.sold_by {
        println!(
            "  {:<22} sold {:>4} hh / {:>4} policies | {:>14} written | {:>12} comm | close {:>7}",
            truncate(&p.name, 22),
            p.sold_households,
            p.written_policies,
            dollars(p.written_premium_cents),
            dollars(p.commission_cents),
            percent(p.close_ratio),
        );
    }
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(width - 1).collect();
        short.push('…');
        short
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
