//! Search orchestration: query fan-out and per-driver deduplication.
//!
//! [`search`] runs every driver's queries against a backend. [`dedup`]
//! then removes exact-URL and near-duplicate results within each driver,
//! using [`fingerprint`] for content similarity and, optionally,
//! [`url_normalize`] for URL equivalence.

pub mod dedup;
pub mod fingerprint;
pub mod search;
pub mod url_normalize;
