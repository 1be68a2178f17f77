//! Read-only record snapshots supplied by the Record Store.
//!
//! RULE: The engine never mutates these. Status fields are denormalised
//! and may disagree with the child quote/sale rows; callers must not
//! assume otherwise.

use crate::types::{AgencyId, Cents, EntityId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Current lifecycle status of a household.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HouseholdStatus {
    Lead,
    Quoted,
    Sold,
}

impl HouseholdStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead   => "lead",
            Self::Quoted => "quoted",
            Self::Sold   => "sold",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "lead"   => Some(Self::Lead),
            "quoted" => Some(Self::Quoted),
            "sold"   => Some(Self::Sold),
            _        => None,
        }
    }

    /// True once the household has reached the quoted stage (quoted or sold).
    pub fn reached_quote(&self) -> bool {
        matches!(self, Self::Quoted | Self::Sold)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Household {
    pub household_id: EntityId,
    pub agency_id: AgencyId,
    pub status: HouseholdStatus,
    pub lead_source_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
    pub lead_received_date: Option<NaiveDate>,
}

impl Household {
    /// The date the lead arrived, falling back to the record's creation day.
    pub fn lead_date(&self) -> NaiveDate {
        self.lead_received_date
            .unwrap_or_else(|| self.created_at.date_naive())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub quote_id: EntityId,
    pub household_id: EntityId,
    pub team_member_id: Option<EntityId>,
    pub items_quoted: Option<i64>,
    pub premium_cents: Cents,
    pub product_type: Option<String>,
    pub quote_date: NaiveDate,
}

impl Quote {
    /// Items on the quote; a missing or zero count means one item.
    pub fn items(&self) -> i64 {
        at_least_one(self.items_quoted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    pub sale_id: EntityId,
    pub household_id: EntityId,
    pub team_member_id: Option<EntityId>,
    pub items_sold: Option<i64>,
    pub policies_sold: Option<i64>,
    pub premium_cents: Cents,
    pub product_type: Option<String>,
    pub sale_date: NaiveDate,
}

impl Sale {
    pub fn items(&self) -> i64 {
        at_least_one(self.items_sold)
    }

    pub fn policies(&self) -> i64 {
        at_least_one(self.policies_sold)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadSource {
    pub lead_source_id: EntityId,
    pub name: String,
    pub bucket_id: Option<EntityId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketingBucket {
    pub bucket_id: EntityId,
    pub name: String,
}

/// One month of marketing spend. A null lead source is unattributed spend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendLedgerEntry {
    pub lead_source_id: Option<EntityId>,
    /// First day of the month the spend belongs to.
    pub month: NaiveDate,
    pub spend_cents: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamMember {
    pub team_member_id: EntityId,
    pub name: String,
}

fn at_least_one(count: Option<i64>) -> i64 {
    match count {
        Some(n) if n > 0 => n,
        _ => 1,
    }
}
