//! Search executor: runs every driver's queries and groups the results.
//!
//! Drivers are processed in order. Within a driver, distinct queries run
//! through a [`buffered`](futures::StreamExt::buffered) stream, so at most
//! `max_concurrent_queries` requests are in flight and results stay in
//! query order. A failed query is logged and yields an empty
//! bucket, so the dedup stage always receives a well-formed structure.

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;

use crate::cache::{CacheKey, SearchCache};
use crate::config::SearchConfig;
use crate::engine::SearchBackend;
use crate::types::{SearchResultItem, SearchResults};

/// Run all queries for all drivers.
///
/// The output has one partition per driver and one bucket per distinct
/// query, both in input order. Each item is tagged with its `query`,
/// `driver` and `freshness_window_days`.
pub async fn run_search<B: SearchBackend>(
    backend: &B,
    queries_by_driver: &IndexMap<String, Vec<String>>,
    config: &SearchConfig,
    cache: &SearchCache,
) -> SearchResults {
    let mut all_results = SearchResults::with_capacity(queries_by_driver.len());

    for (driver, queries) in queries_by_driver {
        let mut distinct: Vec<&str> = Vec::with_capacity(queries.len());
        for query in queries {
            if !distinct.contains(&query.as_str()) {
                distinct.push(query);
            }
        }

        let outcomes: Vec<Vec<SearchResultItem>> = stream::iter(distinct.iter())
            .map(|query| search_one(backend, query, config, cache))
            .buffered(config.max_concurrent_queries.max(1))
            .collect()
            .await;

        let mut driver_results = IndexMap::with_capacity(distinct.len());
        for (query, mut items) in distinct.into_iter().zip(outcomes) {
            for item in &mut items {
                item.query = Some(query.to_owned());
                item.driver = Some(driver.clone());
                item.freshness_window_days = Some(config.freshness_days);
            }
            driver_results.insert(query.to_owned(), items);
        }

        tracing::debug!(
            %driver,
            queries = driver_results.len(),
            results = driver_results.values().map(Vec::len).sum::<usize>(),
            "driver search complete"
        );
        all_results.insert(driver.clone(), driver_results);
    }

    all_results
}

/// Run one query through the cache and backend; failures become empty.
async fn search_one<B: SearchBackend>(
    backend: &B,
    query: &str,
    config: &SearchConfig,
    cache: &SearchCache,
) -> Vec<SearchResultItem> {
    let key = CacheKey::new(query, config.freshness_days);
    if let Some(hit) = cache.get(&key).await {
        tracing::trace!(query, "search cache hit");
        return hit;
    }

    match backend.search(query, config).await {
        Ok(results) => {
            cache.insert(key, results.clone()).await;
            results
        }
        Err(err) => {
            tracing::warn!(engine = backend.name(), error = %err, "search query failed");
            Vec::new()
        }
    }
}
