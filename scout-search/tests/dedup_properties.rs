//! Invariant tests for per-driver deduplication.
//!
//! Random inputs draw URLs and words from small pools so that exact and
//! near duplicates are common.

use std::collections::HashSet;

use indexmap::IndexMap;
use proptest::prelude::*;
use scout_search::orchestrator::fingerprint::Fingerprint;
use scout_search::{deduplicate_search_results, DedupConfig, SearchResultItem, SearchResults};

const WORDS: &[&str] = &[
    "aws", "expands", "capacity", "data", "center", "buildout", "cooling", "power", "grid",
    "chips", "capex", "guidance",
];

fn arb_item() -> impl Strategy<Value = SearchResultItem> {
    (
        prop::option::of(0u8..6),
        prop::collection::vec(0..WORDS.len(), 0..6),
        prop::collection::vec(0..WORDS.len(), 0..4),
    )
        .prop_map(|(url, title, description)| SearchResultItem {
            url: url.map(|n| {
                if n == 0 {
                    String::new()
                } else {
                    format!("https://site{n}.com/story")
                }
            }),
            title: Some(title.iter().map(|i| WORDS[*i]).collect::<Vec<_>>().join(" ")),
            description: (!description.is_empty())
                .then(|| description.iter().map(|i| WORDS[*i]).collect::<Vec<_>>().join(" ")),
            ..Default::default()
        })
}

fn arb_results() -> impl Strategy<Value = SearchResults> {
    prop::collection::vec(
        (
            0u8..3,
            prop::collection::vec((0u8..4, prop::collection::vec(arb_item(), 0..8)), 0..4),
        ),
        0..4,
    )
    .prop_map(|partitions| {
        partitions
            .into_iter()
            .map(|(p, queries)| {
                let queries = queries
                    .into_iter()
                    .map(|(q, items)| (format!("query {q}"), items))
                    .collect::<IndexMap<_, _>>();
                (format!("driver {p}"), queries)
            })
            .collect()
    })
}

/// Ordered view of a result set, for order-sensitive comparison.
fn flatten(results: &SearchResults) -> Vec<(String, String, Vec<SearchResultItem>)> {
    results
        .iter()
        .flat_map(|(p, queries)| {
            queries
                .iter()
                .map(move |(q, items)| (p.clone(), q.clone(), items.clone()))
        })
        .collect()
}

fn item(url: &str, title: &str, description: &str) -> SearchResultItem {
    SearchResultItem::new(url, title, description)
}

fn one_partition(partition: &str, query: &str, items: Vec<SearchResultItem>) -> SearchResults {
    let mut queries = IndexMap::new();
    queries.insert(query.to_string(), items);
    let mut results = SearchResults::new();
    results.insert(partition.to_string(), queries);
    results
}

proptest! {
    #[test]
    fn dedup_is_deterministic(input in arb_results(), threshold in 0u32..12) {
        let config = DedupConfig::with_threshold(threshold);
        let a = deduplicate_search_results(input.clone(), &config);
        let b = deduplicate_search_results(input, &config);
        prop_assert_eq!(flatten(&a), flatten(&b));
    }

    #[test]
    fn survivors_have_unique_urls(input in arb_results(), threshold in 0u32..12) {
        let cleaned = deduplicate_search_results(input, &DedupConfig::with_threshold(threshold));
        for queries in cleaned.values() {
            let mut seen = HashSet::new();
            for item in queries.values().flatten() {
                let url = item.url_str();
                prop_assert!(url.is_some(), "survivor without URL");
                prop_assert!(seen.insert(url.map(str::to_owned)), "duplicate URL survived");
            }
        }
    }

    #[test]
    fn survivors_are_pairwise_distant(input in arb_results(), threshold in 0u32..12) {
        let cleaned = deduplicate_search_results(input, &DedupConfig::with_threshold(threshold));
        for queries in cleaned.values() {
            let fps: Vec<Fingerprint> = queries.values().flatten().map(Fingerprint::of_item).collect();
            for (i, a) in fps.iter().enumerate() {
                for b in &fps[i + 1..] {
                    prop_assert!(a.distance(*b) > threshold);
                }
            }
        }
    }

    #[test]
    fn shape_is_preserved(input in arb_results()) {
        let cleaned = deduplicate_search_results(input.clone(), &DedupConfig::default());
        let in_keys: Vec<_> = input.iter().map(|(p, q)| (p.clone(), q.keys().cloned().collect::<Vec<_>>())).collect();
        let out_keys: Vec<_> = cleaned.iter().map(|(p, q)| (p.clone(), q.keys().cloned().collect::<Vec<_>>())).collect();
        prop_assert_eq!(in_keys, out_keys);
    }

    #[test]
    fn survivors_keep_relative_order(input in arb_results(), threshold in 0u32..12) {
        let cleaned = deduplicate_search_results(input.clone(), &DedupConfig::with_threshold(threshold));
        for (p, queries) in &cleaned {
            for (q, kept) in queries {
                let original = &input[p][q];
                let mut cursor = original.iter();
                for survivor in kept {
                    prop_assert!(cursor.any(|candidate| candidate == survivor), "survivor out of order");
                }
            }
        }
    }

    #[test]
    fn repeated_url_never_survives_twice_and_first_wins(input in arb_results()) {
        let cleaned = deduplicate_search_results(input.clone(), &DedupConfig::default());
        for (p, queries) in &input {
            let first_with_url: Vec<&SearchResultItem> = {
                let mut seen = HashSet::new();
                queries
                    .values()
                    .flatten()
                    .filter(|i| i.url_str().is_some_and(|u| seen.insert(u.to_owned())))
                    .collect()
            };
            let survivors: Vec<&SearchResultItem> = cleaned[p].values().flatten().collect();
            for survivor in survivors {
                prop_assert!(first_with_url.iter().any(|f| *f == survivor));
            }
        }
    }
}

#[test]
fn cross_partition_duplicates_both_survive() {
    let mut input = one_partition("capex", "q", vec![item("https://a.com", "same story", "")]);
    input.extend(one_partition("cooling", "q", vec![item("https://a.com", "same story", "")]));
    let cleaned = deduplicate_search_results(input, &DedupConfig::default());
    assert_eq!(cleaned["capex"]["q"].len(), 1);
    assert_eq!(cleaned["cooling"]["q"].len(), 1);
}

#[test]
fn first_seen_wins_for_identical_urls() {
    let input = one_partition(
        "capex",
        "q",
        vec![
            item("https://a.com", "first version", ""),
            item("https://a.com", "second version", ""),
        ],
    );
    let cleaned = deduplicate_search_results(input, &DedupConfig::default());
    assert_eq!(cleaned["capex"]["q"].len(), 1);
    assert_eq!(cleaned["capex"]["q"][0].title_str(), "first version");
}

#[test]
fn capex_scenario() {
    let input = one_partition(
        "capex",
        "data center buildout",
        vec![
            item("a.com/1", "AWS expands capacity", "large buildout"),
            SearchResultItem {
                url: Some("a.com/1".into()),
                title: Some("duplicate url".into()),
                ..Default::default()
            },
            item("b.com/2", "AWS expands capacity", "large buildout"),
        ],
    );
    let cleaned = deduplicate_search_results(input, &DedupConfig::default());
    let kept = &cleaned["capex"]["data center buildout"];
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].url_str(), Some("a.com/1"));
}

#[test]
fn empty_url_dropped_even_when_unique() {
    let input = one_partition("p", "q", vec![item("", "nothing like this anywhere", "")]);
    let cleaned = deduplicate_search_results(input, &DedupConfig::default());
    assert!(cleaned["p"]["q"].is_empty());
}

#[test]
fn empty_input_scenario() {
    let cleaned = deduplicate_search_results(SearchResults::new(), &DedupConfig::default());
    assert!(cleaned.is_empty());
}

#[test]
fn results_round_trip_through_json_in_order() {
    let input = one_partition(
        "capex",
        "q",
        vec![item("https://b.com", "b", ""), item("https://a.com", "a", "")],
    );
    let json = serde_json::to_string(&input).expect("serialize");
    let decoded: SearchResults = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(flatten(&decoded), flatten(&input));
}
