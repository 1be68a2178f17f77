mod common;

use common::*;
use funnel_core::{
    engine::AnalyticsQuery,
    mode::{DateRange, ReportMode},
    model::{Household, HouseholdStatus::{Lead, Quoted, Sold}},
    store::AgencyStore,
    summary::FunnelCounts,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn range(start: chrono::NaiveDate, end: chrono::NaiveDate) -> DateRange {
    DateRange::new(start, end).unwrap()
}

fn all_time() -> DateRange {
    range(d(2000, 1, 1), d(2099, 12, 31))
}

/// Well-formed agency: status agrees with the child rows.
fn consistent_agency() -> AgencyStore {
    let store = store();
    add_source(&store, "fb", "FB Ads", None);
    add_source(&store, "web", "Website", None);
    add_member(&store, "p1", "Pat");
    add_spend(&store, Some("fb"), d(2024, 1, 1), 40_000);
    add_spend(&store, Some("web"), d(2024, 2, 1), 25_000);
    add_spend(&store, None, d(2024, 3, 1), 5_000);

    add_household(&store, "h1", Lead, Some("fb"), d(2024, 1, 5));
    add_household(&store, "h2", Quoted, Some("fb"), d(2024, 1, 6));
    add_household(&store, "h3", Sold, Some("fb"), d(2024, 1, 7));
    add_household(&store, "h4", Sold, Some("web"), d(2024, 2, 3));
    add_household(&store, "h5", Quoted, None, d(2024, 3, 3));

    add_quote(&store, "q1", "h2", Some("p1"), 70_000, "auto", d(2024, 1, 10));
    add_quote(&store, "q2", "h3", Some("p1"), 80_000, "auto", d(2024, 1, 11));
    add_quote(&store, "q3", "h3", Some("p1"), 60_000, "home", d(2024, 1, 11));
    add_quote(&store, "q4", "h4", None, 50_000, "auto", d(2024, 2, 9));
    add_quote(&store, "q5", "h5", Some("p1"), 30_000, "auto", d(2024, 3, 9));
    add_sale(&store, "s1", "h3", Some("p1"), 140_000, "auto", d(2024, 1, 20));
    add_sale(&store, "s2", "h3", Some("p1"), 60_000, "home", d(2024, 1, 20));
    add_sale(&store, "s3", "h4", Some("p1"), 50_000, "auto", d(2024, 2, 15));
    store
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// An unbounded window must reconcile with the status snapshot.
#[test]
fn all_time_activity_matches_pipeline_totals() {
    let store = consistent_agency();
    let pipeline = run(&store, &AnalyticsQuery::pipeline(AGENCY));
    let activity = run(&store, &AnalyticsQuery::activity(AGENCY, all_time()));

    let (p, a) = (&pipeline.summary, &activity.summary);
    assert_eq!(p.quoted_policies, a.quoted_policies);
    assert_eq!(p.quoted_items, a.quoted_items);
    assert_eq!(p.quoted_premium_cents, a.quoted_premium_cents);
    assert_eq!(p.written_policies, a.written_policies);
    assert_eq!(p.written_items, a.written_items);
    assert_eq!(p.total_premium_cents, a.total_premium_cents);
    assert_eq!(p.total_commission_cents, a.total_commission_cents);
    assert_eq!(p.total_spend_cents, a.total_spend_cents);
    assert_eq!(p.roi, a.roi);
    assert_eq!(p.bundle_ratio, a.bundle_ratio);

    for row in &pipeline.lead_sources {
        let other = activity
            .lead_sources
            .iter()
            .find(|r| r.lead_source_id == row.lead_source_id)
            .expect("same groups in both modes");
        assert_eq!(row.totals, other.totals, "totals diverged for {}", row.name);
    }
    assert_eq!(pipeline.sold_by, activity.sold_by);
    assert_eq!(pipeline.quoted_by, activity.quoted_by);
}

#[test]
fn counts_are_named_per_mode() {
    let store = consistent_agency();
    let pipeline = run(&store, &AnalyticsQuery::pipeline(AGENCY));
    assert_eq!(pipeline.summary.mode, ReportMode::Pipeline);
    assert_eq!(
        pipeline.summary.counts,
        FunnelCounts::Pipeline {
            total_households: 5,
            open_leads: 1,
            currently_quoted: 2,
            sold_households: 2,
        }
    );
    assert_close(pipeline.summary.quote_rate, 80.0, "pipeline quote rate");
    assert_close(pipeline.summary.close_rate, 50.0, "pipeline close rate");

    let window = range(d(2024, 1, 1), d(2024, 1, 31));
    let activity = run(&store, &AnalyticsQuery::activity(AGENCY, window));
    assert_eq!(activity.summary.mode, ReportMode::Activity { range: window });
    assert_eq!(
        activity.summary.counts,
        FunnelCounts::Activity {
            leads_received: 3,
            households_quoted: 2,
            households_sold: 1,
        }
    );
    assert_eq!(activity.summary.quote_rate, None);
    assert_eq!(activity.summary.close_rate, None);
    assert!(activity.lead_sources.iter().all(|r| r.metrics.quote_rate.is_none()));
}

/// Activity mode trusts event rows: a household marked sold with no sale
/// rows contributes nothing there, while Pipeline still buckets it as sold.
#[test]
fn activity_ignores_status_pipeline_trusts_it() {
    let store = store();
    add_source(&store, "fb", "FB Ads", None);
    add_household(&store, "h1", Sold, Some("fb"), d(2024, 5, 1));

    let pipeline = run(&store, &AnalyticsQuery::pipeline(AGENCY));
    let fb = pipeline.lead_sources.iter().find(|r| r.name == "FB Ads").unwrap();
    assert_eq!(fb.totals.sold_households, 1);
    assert_eq!(fb.totals.premium_cents, 0);

    let activity = run(&store, &AnalyticsQuery::activity(AGENCY, all_time()));
    let fb = activity.lead_sources.iter().find(|r| r.name == "FB Ads").unwrap();
    assert_eq!(fb.totals.leads, 1);
    assert_eq!(fb.totals.sold_households, 0);
    assert_eq!(fb.totals.quoted_households, 0);
}

/// A sale inside the window counts as a close even when its quote fell
/// before the window.
#[test]
fn sale_in_window_counts_without_its_quote() {
    let store = consistent_agency();
    // h4 was quoted 2024-02-09 and sold 2024-02-15.
    let window = range(d(2024, 2, 10), d(2024, 2, 29));
    let report = run(&store, &AnalyticsQuery::activity(AGENCY, window));

    let web = report.lead_sources.iter().find(|r| r.name == "Website").unwrap();
    assert_eq!(web.totals.quoted_households, 0);
    assert_eq!(web.totals.sold_households, 1);
    assert_eq!(web.totals.premium_cents, 50_000);
    assert_eq!(web.metrics.close_ratio, None, "no quotes in window to divide by");
}

#[test]
fn lead_date_falls_back_to_created_at() {
    let store = store();
    let mut hh: Household = household("h1", Lead, None, d(2024, 7, 4));
    hh.lead_received_date = None;
    store.insert_household(&hh).unwrap();
    // lead_received_date wins over created_at when both exist.
    let mut late = household("h2", Lead, None, d(2024, 6, 1));
    late.lead_received_date = Some(d(2024, 9, 1));
    store.insert_household(&late).unwrap();

    let report = run(
        &store,
        &AnalyticsQuery::activity(AGENCY, range(d(2024, 7, 1), d(2024, 7, 31))),
    );
    assert_eq!(
        report.summary.counts,
        FunnelCounts::Activity {
            leads_received: 1,
            households_quoted: 0,
            households_sold: 0,
        }
    );
}

/// Spend is summed by month: a mid-month window takes the whole month.
#[test]
fn spend_is_selected_by_month() {
    let store = consistent_agency();
    let window = range(d(2024, 2, 14), d(2024, 2, 20));
    let report = run(&store, &AnalyticsQuery::activity(AGENCY, window));
    assert_eq!(report.summary.total_spend_cents, 25_000);

    let q1 = range(d(2024, 1, 31), d(2024, 3, 1));
    let report = run(&store, &AnalyticsQuery::activity(AGENCY, q1));
    assert_eq!(report.summary.total_spend_cents, 70_000);
}

#[test]
fn quotes_outside_the_window_are_excluded() {
    let store = consistent_agency();
    let report = run(
        &store,
        &AnalyticsQuery::activity(AGENCY, range(d(2024, 3, 1), d(2024, 3, 31))),
    );
    assert_eq!(report.summary.quoted_policies, 1);
    assert_eq!(report.summary.quoted_premium_cents, 30_000);
    assert_eq!(report.summary.written_policies, 0);
    let unattributed = report
        .lead_sources
        .iter()
        .find(|r| r.lead_source_id.is_none())
        .unwrap();
    assert_eq!(unattributed.totals.quoted_households, 1);
    assert_eq!(unattributed.totals.spend_cents, 5_000);
}

/// A ledger month recorded mid-month still belongs to that month, so a
/// window early in the month picks it up just as Pipeline does.
#[test]
fn mid_month_ledger_entry_counts_for_its_month() {
    let store = store();
    add_source(&store, "fb", "FB Ads", None);
    add_spend(&store, Some("fb"), d(2024, 5, 15), 10_000);

    let window = range(d(2024, 5, 1), d(2024, 5, 10));
    assert!(window.overlaps_month(d(2024, 5, 15)));
    let activity = run(&store, &AnalyticsQuery::activity(AGENCY, window));
    assert_eq!(activity.summary.total_spend_cents, 10_000);

    let pipeline = run(&store, &AnalyticsQuery::pipeline(AGENCY));
    assert_eq!(pipeline.summary.total_spend_cents, activity.summary.total_spend_cents);

    let june = run(
        &store,
        &AnalyticsQuery::activity(AGENCY, range(d(2024, 6, 1), d(2024, 6, 30))),
    );
    assert_eq!(june.summary.total_spend_cents, 0);
}
