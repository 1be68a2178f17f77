use super::{limit_offset, AgencyStore};
use crate::{
    error::AnalyticsResult,
    model::{LeadSource, MarketingBucket, SpendLedgerEntry, TeamMember},
    record_store::{PageWindow, RecordFilter},
};
use rusqlite::params;

impl AgencyStore {
    // ── Marketing buckets and lead sources ────────────────────────

    pub fn insert_bucket(&self, agency_id: &str, b: &MarketingBucket) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO marketing_bucket (bucket_id, agency_id, name) VALUES (?1, ?2, ?3)",
            params![&b.bucket_id, agency_id, &b.name],
        )?;
        Ok(())
    }

    pub(super) fn page_buckets(
        &self,
        agency_id: &str,
        page: PageWindow,
    ) -> AnalyticsResult<Vec<MarketingBucket>> {
        let (limit, offset) = limit_offset(page);
        let mut stmt = self.conn.prepare(
            "SELECT bucket_id, name FROM marketing_bucket WHERE agency_id = ?1
             ORDER BY rowid ASC LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![agency_id, limit, offset], |row| {
            Ok(MarketingBucket {
                bucket_id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn insert_lead_source(&self, agency_id: &str, s: &LeadSource) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO lead_source (lead_source_id, agency_id, name, bucket_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![&s.lead_source_id, agency_id, &s.name, &s.bucket_id],
        )?;
        Ok(())
    }

    pub(super) fn page_lead_sources(
        &self,
        agency_id: &str,
        page: PageWindow,
    ) -> AnalyticsResult<Vec<LeadSource>> {
        let (limit, offset) = limit_offset(page);
        let mut stmt = self.conn.prepare(
            "SELECT lead_source_id, name, bucket_id FROM lead_source WHERE agency_id = ?1
             ORDER BY rowid ASC LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![agency_id, limit, offset], |row| {
            Ok(LeadSource {
                lead_source_id: row.get(0)?,
                name: row.get(1)?,
                bucket_id: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Team members ──────────────────────────────────────────────

    pub fn insert_team_member(&self, agency_id: &str, m: &TeamMember) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO team_member (team_member_id, agency_id, name) VALUES (?1, ?2, ?3)",
            params![&m.team_member_id, agency_id, &m.name],
        )?;
        Ok(())
    }

    pub(super) fn page_team_members(
        &self,
        agency_id: &str,
        page: PageWindow,
    ) -> AnalyticsResult<Vec<TeamMember>> {
        let (limit, offset) = limit_offset(page);
        let mut stmt = self.conn.prepare(
            "SELECT team_member_id, name FROM team_member WHERE agency_id = ?1
             ORDER BY rowid ASC LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![agency_id, limit, offset], |row| {
            Ok(TeamMember {
                team_member_id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Spend ledger ──────────────────────────────────────────────

    pub fn insert_spend(&self, agency_id: &str, e: &SpendLedgerEntry) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO spend_ledger (agency_id, lead_source_id, month, spend_cents)
             VALUES (?1, ?2, ?3, ?4)",
            params![agency_id, &e.lead_source_id, e.month, e.spend_cents],
        )?;
        Ok(())
    }

    /// Ledger months overlapping the filter's range (month granularity).
    /// A month stored mid-month is compared by its first day, matching
    /// `DateRange::overlaps_month`.
    pub(super) fn page_spend(
        &self,
        filter: &RecordFilter,
        page: PageWindow,
    ) -> AnalyticsResult<Vec<SpendLedgerEntry>> {
        let (limit, offset) = limit_offset(page);
        let first_month = filter.date_range.map(|r| r.first_month());
        let end = filter.date_range.map(|r| r.end());
        let mut stmt = self.conn.prepare(
            "SELECT lead_source_id, month, spend_cents
             FROM spend_ledger
             WHERE agency_id = ?1
               AND (?2 IS NULL OR date(month, 'start of month') BETWEEN ?2 AND ?3)
             ORDER BY entry_id ASC LIMIT ?4 OFFSET ?5",
        )?;
        let rows = stmt.query_map(params![&filter.agency_id, first_month, end, limit, offset], |row| {
            Ok(SpendLedgerEntry {
                lead_source_id: row.get(0)?,
                month: row.get(1)?,
                spend_cents: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
