//! Per-driver deduplication of search results.
//!
//! Each partition (driver) gets a fresh [`PartitionAccumulator`] holding the
//! URLs seen and fingerprints accepted so far. Items are offered in input order,
//! across all of the partition's queries, so the first-seen item wins:
//!
//! 1. no URL: skipped, not remembered
//! 2. URL already seen: skipped
//! 3. URL remembered; fingerprint within the threshold of an accepted
//!    one: skipped
//! 4. otherwise accepted and its fingerprint remembered
//!
//! Partitions never share state. Every query bucket of the input appears in
//! the output, possibly empty.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::DedupConfig;
use crate::types::{SearchResultItem, SearchResults};

use super::fingerprint::Fingerprint;
use super::url_normalize::normalize_url;

/// Why an item was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The item has no URL (or an empty one).
    MissingUrl,
    /// An item with the same URL was already seen in this partition.
    DuplicateUrl,
    /// The item's fingerprint is within the threshold of an accepted one.
    NearDuplicate {
        /// Distance to the first accepted fingerprint that matched.
        distance: u32,
    },
}

/// Outcome of offering one item to a [`PartitionAccumulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupDecision {
    /// The item is new; its fingerprint has been recorded.
    Accepted(Fingerprint),
    /// The item was dropped.
    Skipped(SkipReason),
}

impl DedupDecision {
    /// `true` for [`DedupDecision::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Dedup state for a single partition.
///
/// Construct one per partition per run; it is never shared.
#[derive(Debug)]
pub struct PartitionAccumulator {
    threshold: u32,
    normalize_urls: bool,
    seen_urls: HashSet<String>,
    fingerprints: Vec<Fingerprint>,
}

impl PartitionAccumulator {
    /// Create an empty accumulator.
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            threshold: config.simhash_threshold,
            normalize_urls: config.normalize_urls,
            seen_urls: HashSet::new(),
            fingerprints: Vec::new(),
        }
    }

    /// Decide whether `item` is new, recording it if so.
    pub fn offer(&mut self, item: &SearchResultItem) -> DedupDecision {
        let Some(url) = item.url_str() else {
            return DedupDecision::Skipped(SkipReason::MissingUrl);
        };

        let key = if self.normalize_urls {
            normalize_url(url)
        } else {
            url.to_owned()
        };
        // The URL is claimed even if the content check below rejects the
        // item, so a later result with the same URL never survives.
        if !self.seen_urls.insert(key) {
            return DedupDecision::Skipped(SkipReason::DuplicateUrl);
        }

        let fingerprint = Fingerprint::of_item(item);
        if let Some(distance) = self.nearest_match(fingerprint) {
            return DedupDecision::Skipped(SkipReason::NearDuplicate { distance });
        }

        self.fingerprints.push(fingerprint);
        DedupDecision::Accepted(fingerprint)
    }

    /// Distance to the first accepted fingerprint within the threshold.
    ///
    /// Linear scan in acceptance order.
    // TODO: bucket fingerprints by a bit prefix if partitions grow past a few hundred items.
    fn nearest_match(&self, fingerprint: Fingerprint) -> Option<u32> {
        self.fingerprints
            .iter()
            .map(|existing| existing.distance(fingerprint))
            .find(|distance| *distance <= self.threshold)
    }

    /// Number of accepted items.
    pub fn accepted(&self) -> usize {
        self.fingerprints.len()
    }

    /// Accepted fingerprints in acceptance order.
    pub fn fingerprints(&self) -> &[Fingerprint] {
        &self.fingerprints
    }
}

/// Per-partition counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionStats {
    /// Items offered.
    pub seen: usize,
    /// Items kept.
    pub accepted: usize,
    /// Items dropped for lacking a URL.
    pub missing_url: usize,
    /// Items dropped for a repeated URL.
    pub duplicate_url: usize,
    /// Items dropped as near-duplicates.
    pub near_duplicate: usize,
}

impl PartitionStats {
    fn record(&mut self, decision: DedupDecision) {
        self.seen += 1;
        match decision {
            DedupDecision::Accepted(_) => self.accepted += 1,
            DedupDecision::Skipped(SkipReason::MissingUrl) => self.missing_url += 1,
            DedupDecision::Skipped(SkipReason::DuplicateUrl) => self.duplicate_url += 1,
            DedupDecision::Skipped(SkipReason::NearDuplicate { .. }) => self.near_duplicate += 1,
        }
    }

    /// Items dropped for any reason.
    pub fn dropped(&self) -> usize {
        self.seen - self.accepted
    }
}

/// Cleaned results plus per-partition counters.
#[derive(Debug, Clone, Default)]
pub struct DedupReport {
    /// Surviving items, same shape as the input.
    pub results: SearchResults,
    /// Counters keyed by partition, in input order.
    pub stats: IndexMap<String, PartitionStats>,
}

/// Deduplicate one partition's query buckets.
pub fn deduplicate_partition(
    partition: &str,
    queries: IndexMap<String, Vec<SearchResultItem>>,
    config: &DedupConfig,
) -> (IndexMap<String, Vec<SearchResultItem>>, PartitionStats) {
    let mut acc = PartitionAccumulator::new(config);
    let mut stats = PartitionStats::default();
    let mut cleaned = IndexMap::with_capacity(queries.len());

    for (query, items) in queries {
        let mut kept = Vec::new();
        for item in items {
            let decision = acc.offer(&item);
            stats.record(decision);
            match decision {
                DedupDecision::Accepted(_) => kept.push(item),
                DedupDecision::Skipped(reason) => {
                    tracing::trace!(
                        partition,
                        query = %query,
                        url = item.url_str().unwrap_or_default(),
                        ?reason,
                        "dropped search result"
                    );
                }
            }
        }
        cleaned.insert(query, kept);
    }

    tracing::debug!(
        partition,
        seen = stats.seen,
        accepted = stats.accepted,
        duplicate_url = stats.duplicate_url,
        near_duplicate = stats.near_duplicate,
        missing_url = stats.missing_url,
        "partition deduplicated"
    );

    (cleaned, stats)
}

/// Deduplicate every partition and report per-partition counters.
pub fn deduplicate_with_report(results: SearchResults, config: &DedupConfig) -> DedupReport {
    let mut report = DedupReport {
        results: IndexMap::with_capacity(results.len()),
        stats: IndexMap::with_capacity(results.len()),
    };

    for (partition, queries) in results {
        let (cleaned, stats) = deduplicate_partition(&partition, queries, config);
        report.stats.insert(partition.clone(), stats);
        report.results.insert(partition, cleaned);
    }

    report
}

/// Remove exact-URL and near-duplicate results within each partition.
///
/// The output has the same partitions and query buckets as the input, in
/// the same order; surviving items keep their relative order. Never fails.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use scout_search::orchestrator::dedup::deduplicate_search_results;
/// use scout_search::{DedupConfig, SearchResultItem, SearchResults};
///
/// let mut queries = IndexMap::new();
/// queries.insert(
///     "data center buildout".to_string(),
///     vec![
///         SearchResultItem::new("a.com/1", "AWS expands capacity", "large buildout"),
///         SearchResultItem::new("a.com/1", "duplicate url", ""),
///     ],
/// );
/// let mut results = SearchResults::new();
/// results.insert("capex".to_string(), queries);
///
/// let cleaned = deduplicate_search_results(results, &DedupConfig::default());
/// assert_eq!(cleaned["capex"]["data center buildout"].len(), 1);
/// ```
pub fn deduplicate_search_results(results: SearchResults, config: &DedupConfig) -> SearchResults {
    deduplicate_with_report(results, config).results
}
