use super::{limit_offset, AgencyStore};
use crate::{
    error::AnalyticsResult,
    model::{Household, HouseholdStatus},
    record_store::PageWindow,
};
use rusqlite::{params, types::Type};

impl AgencyStore {
    // ── Household ─────────────────────────────────────────────────

    pub fn insert_household(&self, h: &Household) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO household (
                household_id, agency_id, status, lead_source_id, created_at, lead_received_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &h.household_id,
                &h.agency_id,
                h.status.as_str(),
                &h.lead_source_id,
                h.created_at,
                h.lead_received_date,
            ],
        )?;
        Ok(())
    }

    /// Agency-wide page, ordered by rowid so consecutive windows never
    /// overlap or skip.
    pub(super) fn page_households(
        &self,
        agency_id: &str,
        page: PageWindow,
    ) -> AnalyticsResult<Vec<Household>> {
        let (limit, offset) = limit_offset(page);
        let mut stmt = self.conn.prepare(
            "SELECT household_id, agency_id, status, lead_source_id, created_at, lead_received_date
             FROM household WHERE agency_id = ?1
             ORDER BY rowid ASC LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![agency_id, limit, offset], |row| {
            let raw_status: String = row.get(2)?;
            let status = HouseholdStatus::parse(&raw_status).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    Type::Text,
                    format!("unknown household status '{raw_status}'").into(),
                )
            })?;
            Ok(Household {
                household_id: row.get(0)?,
                agency_id: row.get(1)?,
                status,
                lead_source_id: row.get(3)?,
                created_at: row.get(4)?,
                lead_received_date: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
