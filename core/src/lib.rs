//! Marketing attribution and sales-funnel analytics for an insurance agency.
//!
//! Turns households, quotes, sales and the spend ledger into per-lead-source
//! ROI rows, per-producer performance rows and one summary. See `engine`
//! for the flow.

pub mod bucket;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod group;
pub mod lead_source;
pub mod metrics;
pub mod mode;
pub mod model;
pub mod producer;
pub mod record_store;
pub mod store;
pub mod summary;
pub mod types;
