//! Full research runs against a canned search backend, a scripted text
//! generator and a mock article server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use scout_search::{SearchBackend, SearchConfig, SearchError, SearchResultItem};
use signal_scout::{
    Pipeline, PromptSet, ResearchContext, ScoutConfig, ScoutError, TextGenerator,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Returns fixed results keyed on a word in the query.
struct CannedBackend {
    base: String,
    calls: AtomicUsize,
}

impl CannedBackend {
    fn item(&self, page: &str, title: &str, description: &str) -> SearchResultItem {
        SearchResultItem {
            source: Some("example.com".into()),
            ..SearchResultItem::new(&format!("{}/{page}", self.base), title, description)
        }
    }
}

impl SearchBackend for CannedBackend {
    async fn search(
        &self,
        query: &str,
        _config: &SearchConfig,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut items = if query.contains("grid") {
            vec![
                self.item("a", "Utility signs record grid interconnect deal", "Substation capacity doubles"),
                self.item("b", "Utility signs record grid interconnect deal", "Substation capacity doubles"),
                self.item("missing", "Regulator delays transmission line approval", "Hearings pushed to spring"),
                self.item("d", "Turbine makers report backlog for onsite generation", "Gas gensets sold out"),
            ]
        } else if query.contains("cooling") {
            vec![
                self.item("a", "Repeat of an earlier story", "Different text entirely"),
                self.item("c", "Immersion cooling pilots expand at colocation sites", "Operators cite density"),
            ]
        } else {
            Vec::new()
        };
        for (i, item) in items.iter_mut().enumerate() {
            item.rank = Some(i as u32 + 1);
        }
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

/// Answers each prompt kind with a fixed reply.
struct ScriptedLlm {
    failing_driver: &'static str,
}

#[async_trait]
impl TextGenerator for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> signal_scout::Result<String> {
        if prompt.contains("<integer 1-5>") {
            let score = if prompt.contains("Immersion") { 9 } else { 4 };
            return Ok(format!(r#"{{"score": {score}, "summary": "Relevant signal"}}"#));
        }
        if prompt.contains("<query 12>") {
            return Ok(r#"{"queries": ["grid interconnect", "cooling retrofit"]}"#.into());
        }
        if prompt.contains(self.failing_driver) {
            return Err(ScoutError::Llm("provider unavailable".into()));
        }
        Ok("Write search queries about the driver.".into())
    }
}

fn page(body: &str) -> String {
    format!(
        "<html><head><title>Story</title></head><body><nav>Menu</nav>\
         <article><p>{}</p></article></body></html>",
        body.repeat(6)
    )
}

async fn article_server() -> MockServer {
    let server = MockServer::start().await;
    for (route, text) in [
        ("/a", "Utilities are racing to connect new data center campuses to the grid. "),
        ("/d", "Onsite generation orders climbed as operators hedge against grid delays. "),
        ("/c", "Immersion cooling trials are moving into production at colocation sites. "),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(text)))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

fn config() -> ScoutConfig {
    let mut config = ScoutConfig::default();
    config.search.user_agent = Some("SignalScoutTest/1.0".into());
    config.pipeline.concurrency = 3;
    config
}

fn research() -> ResearchContext {
    ResearchContext {
        context: "Supplier of power and cooling equipment for data centers".into(),
        metric: "Revenue".into(),
        drivers: vec!["Grid power".into(), "Thermal management".into(), "Broken".into()],
    }
}

#[tokio::test]
async fn full_run_groups_scored_articles_per_driver() {
    let server = article_server().await;
    let backend = CannedBackend {
        base: server.uri(),
        calls: AtomicUsize::new(0),
    };
    let llm = Arc::new(ScriptedLlm {
        failing_driver: "Broken",
    });
    let pipeline = Pipeline::new(backend, llm, PromptSet::default(), config()).expect("pipeline");

    let report = pipeline.run(&research()).await.expect("run");

    assert_eq!(report.drivers, 3);
    assert_eq!(report.queries["Grid power"].len(), 12);
    assert!(report.queries["Broken"].is_empty());
    assert_eq!(report.queries_generated, 24);

    // Per driver: a, missing, d from the grid query; c from the cooling query.
    assert_eq!(report.articles_processed, 8);
    assert_eq!(report.articles_evaluated, 6);

    let grid_query = &report.queries["Grid power"][0];
    assert!(grid_query.starts_with("grid interconnect across"));

    for driver in ["Grid power", "Thermal management"] {
        let buckets = &report.results[driver];
        let grid: Vec<&str> = buckets[0].iter().map(|a| a.url.as_str()).collect();
        assert_eq!(grid, vec![format!("{}/a", server.uri()), format!("{}/d", server.uri())]);
        assert!(buckets[0].iter().all(|a| a.score == 4));

        let cooling = &buckets[1];
        assert_eq!(cooling.len(), 1);
        assert_eq!(cooling[0].url, format!("{}/c", server.uri()));
        assert_eq!(cooling[0].score, 5);
        assert_eq!(cooling[0].rank, Some(2));
        assert_eq!(cooling[0].source.as_deref(), Some("example.com"));

        let stats = report.dedup[driver];
        assert_eq!(stats.seen, 6);
        assert_eq!(stats.accepted, 4);
        assert_eq!(stats.duplicate_url, 1);
        assert_eq!(stats.near_duplicate, 1);
    }
    assert!(!report.results.contains_key("Broken"));
}

// The second driver's identical queries are served from the run cache.
#[tokio::test]
async fn backend_is_queried_once_per_distinct_query() {
    let server = article_server().await;
    let backend = Arc::new(CannedBackend {
        base: server.uri(),
        calls: AtomicUsize::new(0),
    });
    let llm = Arc::new(ScriptedLlm {
        failing_driver: "Broken",
    });
    let pipeline = Pipeline::new(SharedBackend(Arc::clone(&backend)), llm, PromptSet::default(), config())
        .expect("pipeline");

    pipeline.run(&research()).await.expect("run");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
}

struct SharedBackend(Arc<CannedBackend>);

impl SearchBackend for SharedBackend {
    async fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        self.0.search(query, config).await
    }

    fn name(&self) -> &'static str {
        self.0.name()
    }
}

#[tokio::test]
async fn incomplete_context_is_rejected() {
    let backend = CannedBackend {
        base: "http://127.0.0.1:9".into(),
        calls: AtomicUsize::new(0),
    };
    let llm = Arc::new(ScriptedLlm {
        failing_driver: "Broken",
    });
    let pipeline = Pipeline::new(backend, llm, PromptSet::default(), config()).expect("pipeline");

    let mut research = research();
    research.drivers.clear();
    let err = pipeline.run(&research).await.unwrap_err();
    assert!(matches!(err, ScoutError::InvalidContext(_)));
}

#[tokio::test]
async fn invalid_config_rejected_at_construction() {
    let mut config = config();
    config.dedup.simhash_threshold = 65;
    let backend = CannedBackend {
        base: "http://127.0.0.1:9".into(),
        calls: AtomicUsize::new(0),
    };
    let llm = Arc::new(ScriptedLlm {
        failing_driver: "Broken",
    });
    assert!(Pipeline::new(backend, llm, PromptSet::default(), config).is_err());
}

#[tokio::test]
async fn report_serializes_with_counts() {
    let server = article_server().await;
    let backend = CannedBackend {
        base: server.uri(),
        calls: AtomicUsize::new(0),
    };
    let llm = Arc::new(ScriptedLlm {
        failing_driver: "Broken",
    });
    let pipeline = Pipeline::new(backend, llm, PromptSet::default(), config()).expect("pipeline");
    let report = pipeline.run(&research()).await.expect("run");

    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(json["articles_evaluated"], 6);
    assert_eq!(json["dedup"]["Grid power"]["near_duplicate"], 1);
    let first = &json["results"]["Grid power"];
    assert!(first.is_object());
}
