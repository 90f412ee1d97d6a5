//! Comparable-sales valuation and comp data-quality auditing.
//!
//! [`valuation`] turns a subject property and a handful of comparable sales into an
//! adjusted value range, [`quality`] audits stored comp sets for systemic defects
//! before they are trusted for pricing, and [`import`] reads comp records from the
//! CSV and NDJSON exports the engine is usually fed with.

pub mod config;
pub mod error;
pub mod import;
pub mod quality;
pub mod router;
pub mod service;
pub mod telemetry;
pub mod valuation;
