use super::{limit_offset, AgencyStore};
use crate::{
    error::AnalyticsResult,
    model::{Quote, Sale},
    record_store::{PageWindow, RecordFilter},
};
use rusqlite::params;

impl AgencyStore {
    // ── Quote ─────────────────────────────────────────────────────

    pub fn insert_quote(&self, agency_id: &str, q: &Quote) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO quote (
                quote_id, agency_id, household_id, team_member_id,
                items_quoted, premium_cents, product_type, quote_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &q.quote_id,
                agency_id,
                &q.household_id,
                &q.team_member_id,
                q.items_quoted,
                q.premium_cents,
                &q.product_type,
                q.quote_date,
            ],
        )?;
        Ok(())
    }

    /// Quotes for the agency, limited to `quote_date` inside the filter's
    /// range when one is set.
    pub(super) fn page_quotes(
        &self,
        filter: &RecordFilter,
        page: PageWindow,
    ) -> AnalyticsResult<Vec<Quote>> {
        let (limit, offset) = limit_offset(page);
        let start = filter.date_range.map(|r| r.start());
        let end = filter.date_range.map(|r| r.end());
        let mut stmt = self.conn.prepare(
            "SELECT quote_id, household_id, team_member_id, items_quoted,
                    premium_cents, product_type, quote_date
             FROM quote
             WHERE agency_id = ?1
               AND (?2 IS NULL OR quote_date BETWEEN ?2 AND ?3)
             ORDER BY rowid ASC LIMIT ?4 OFFSET ?5",
        )?;
        let rows = stmt.query_map(params![&filter.agency_id, start, end, limit, offset], |row| {
            Ok(Quote {
                quote_id: row.get(0)?,
                household_id: row.get(1)?,
                team_member_id: row.get(2)?,
                items_quoted: row.get(3)?,
                premium_cents: row.get(4)?,
                product_type: row.get(5)?,
                quote_date: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Sale ──────────────────────────────────────────────────────

    pub fn insert_sale(&self, agency_id: &str, s: &Sale) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO sale (
                sale_id, agency_id, household_id, team_member_id,
                items_sold, policies_sold, premium_cents, product_type, sale_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &s.sale_id,
                agency_id,
                &s.household_id,
                &s.team_member_id,
                s.items_sold,
                s.policies_sold,
                s.premium_cents,
                &s.product_type,
                s.sale_date,
            ],
        )?;
        Ok(())
    }

    pub(super) fn page_sales(
        &self,
        filter: &RecordFilter,
        page: PageWindow,
    ) -> AnalyticsResult<Vec<Sale>> {
        let (limit, offset) = limit_offset(page);
        let start = filter.date_range.map(|r| r.start());
        let end = filter.date_range.map(|r| r.end());
        let mut stmt = self.conn.prepare(
            "SELECT sale_id, household_id, team_member_id, items_sold, policies_sold,
                    premium_cents, product_type, sale_date
             FROM sale
             WHERE agency_id = ?1
               AND (?2 IS NULL OR sale_date BETWEEN ?2 AND ?3)
             ORDER BY rowid ASC LIMIT ?4 OFFSET ?5",
        )?;
        let rows = stmt.query_map(params![&filter.agency_id, start, end, limit, offset], |row| {
            Ok(Sale {
                sale_id: row.get(0)?,
                household_id: row.get(1)?,
                team_member_id: row.get(2)?,
                items_sold: row.get(3)?,
                policies_sold: row.get(4)?,
                premium_cents: row.get(5)?,
                product_type: row.get(6)?,
                sale_date: row.get(7)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
