use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use wrc_harvest::config::{
    Config, CrawlerConfig, RunContext, SiteConfig, StoreConfig, UserAgentConfig,
};
use wrc_harvest::crawler::run_harvest;
use wrc_harvest::query::BodyCategory;
use wrc_harvest::storage::{
    ContentStore, MemoryContentStore, SqliteContentStore, StoreError, StoreResult, StoredObject,
};
use wrc_harvest::window::DateWindow;
use wrc_harvest::HarvestError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const BUCKET: &str = "legal-documents";

/// Creates a test configuration pointing at the mock site
fn create_test_config(base_domain: &str, bodies: Vec<u32>, db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_requests: 4,
            request_timeout_secs: 5,
            retries: 1,
            retry_delay_ms: 10, // Very short for testing
            max_pages_per_query: 500,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        site: SiteConfig {
            base_domain: base_domain.to_string(),
            bodies: bodies.into_iter().map(BodyCategory).collect(),
        },
        store: StoreConfig {
            database_path: db_path.to_string(),
            bucket: BUCKET.to_string(),
            principal: "test-harvester".to_string(),
        },
    }
}

/// Matches requests carrying a query parameter, whatever its value
struct HasQueryParam(&'static str);

impl Match for HasQueryParam {
    fn matches(&self, request: &Request) -> bool {
        request.url.query_pairs().any(|(k, _)| k == self.0)
    }
}

/// In-memory store that refuses every key starting with a given prefix
struct RejectingStore {
    inner: MemoryContentStore,
    rejected_prefix: &'static str,
}

#[async_trait]
impl ContentStore for RejectingStore {
    async fn ensure_namespace(&self, name: &str) -> StoreResult<()> {
        self.inner.ensure_namespace(name).await
    }

    async fn put(
        &self,
        namespace: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> StoreResult<()> {
        if key.starts_with(self.rejected_prefix) {
            return Err(StoreError::Unavailable(format!("write to {} refused", key)));
        }
        self.inner.put(namespace, key, body, content_type).await
    }

    async fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<StoredObject>> {
        self.inner.get(namespace, key).await
    }

    async fn list_keys(&self, namespace: &str) -> StoreResult<Vec<String>> {
        self.inner.list_keys(namespace).await
    }
}

fn january() -> DateWindow {
    DateWindow::parse("01-01-2024", "31-01-2024").expect("valid window")
}

fn context(server: &MockServer, bodies: Vec<u32>) -> RunContext {
    let config = create_test_config(&server.uri(), bodies, ":memory:");
    RunContext::new(&config, january())
}

fn seed_page(hits_text: &str) -> String {
    format!(
        r#"<html><body>
        <div class="row searchhead">
            {}
        </div>
        </body></html>"#,
        hits_text
    )
}

fn result_item(identifier: Option<&str>, href: &str) -> String {
    let title = match identifier {
        Some(id) => format!(r#"<h2 class="title"><a title="{id}" href="{href}">{id}</a></h2>"#),
        None => r#"<h2 class="title"><a>Untitled</a></h2>"#.to_string(),
    };
    format!(
        r#"<li class="each-item clearfix">
            {title}
            <p class="description">Unfair Dismissals Acts</p>
            <span class="date">15/01/2024</span>
            <a class="btn btn-primary" href="{href}">View Page</a>
        </li>"#
    )
}

fn results_page(items: &[String]) -> String {
    format!(
        r#"<html><body><div class="search-list"><ul>{}</ul></div></body></html>"#,
        items.join("\n")
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// Mounts a results page for `body` / `page_number`
///
/// Page mocks must be mounted before the seed mock for the same body: the
/// first mounted matching mock answers.
async fn mount_results_page(server: &MockServer, body: &str, page_number: &str, page: String) {
    Mock::given(method("GET"))
        .and(path("/en/search/"))
        .and(query_param("body", body))
        .and(query_param("pageNumber", page_number))
        .respond_with(html(page))
        .mount(server)
        .await;
}

async fn mount_seed(server: &MockServer, body: &str, page: String) {
    Mock::given(method("GET"))
        .and(path("/en/search/"))
        .and(query_param("body", body))
        .and(query_param("from", "01-01-2024"))
        .and(query_param("to", "31-01-2024"))
        .respond_with(html(page))
        .mount(server)
        .await;
}

async fn mount_document(server: &MockServer, doc_path: &str, content_type: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(doc_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .insert_header("content-type", content_type),
        )
        .mount(server)
        .await;
}

/// Mounts a small site: body 1 has two result pages, body 2 has no hits
async fn mount_small_site(server: &MockServer) {
    let base = server.uri();

    mount_results_page(
        server,
        "1",
        "1",
        results_page(&[
            result_item(Some("WRC 2021 001"), "/en/case/1"),
            result_item(None, "/en/case/broken"),
        ]),
    )
    .await;
    mount_results_page(
        server,
        "1",
        "2",
        results_page(&[result_item(
            Some("ADJ-00002"),
            &format!("{}/en/case/2", base),
        )]),
    )
    .await;
    mount_seed(server, "1", seed_page("Showing 1 - 10 of 12 results")).await;
    mount_seed(server, "2", "<html><body><p>Nothing here</p></body></html>".to_string()).await;

    mount_document(server, "/en/case/1", "application/pdf", b"%PDF-1.4 decision").await;
    mount_document(server, "/en/case/2", "text/html", b"<html>decision</html>").await;
}

#[tokio::test]
async fn test_full_harvest() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let store = Arc::new(MemoryContentStore::new("test-harvester"));
    let outcome = run_harvest(context(&server, vec![1, 2]), store.clone())
        .await
        .expect("harvest failed");

    // Records
    let keys: BTreeSet<String> = outcome
        .records
        .iter()
        .map(|r| r.storage_key.clone())
        .collect();
    assert_eq!(
        keys,
        BTreeSet::from(["ADJ-00002.html".to_string(), "WRC_2021_001.pdf".to_string()])
    );

    let pdf = outcome
        .records
        .iter()
        .find(|r| r.record.identifier == "WRC 2021 001")
        .expect("pdf record");
    assert_eq!(pdf.storage_bucket, BUCKET);
    assert_eq!(pdf.link_to_doc.as_str(), format!("{}/en/case/1", server.uri()));
    assert_eq!(pdf.record.description.as_deref(), Some("Unfair Dismissals Acts"));
    assert_eq!(
        pdf.record.partition_date,
        chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
    );

    // Store contents
    let object = store
        .get(BUCKET, "WRC_2021_001.pdf")
        .await
        .unwrap()
        .expect("pdf stored");
    assert_eq!(object.body, b"%PDF-1.4 decision");
    assert_eq!(object.content_type, "application/pdf");

    // Statistics
    let stats = outcome.stats;
    assert_eq!(stats.queries, 2);
    assert_eq!(stats.queries_without_hits, 1);
    assert_eq!(stats.pages_requested, 2);
    assert_eq!(stats.items_found, 3);
    assert_eq!(stats.extraction_errors, 1);
    assert_eq!(stats.fetch_errors, 0);
    assert_eq!(stats.documents_stored, 2);
}

#[tokio::test]
async fn test_hit_count_drives_page_requests() {
    let server = MockServer::start().await;

    // Every results page is empty
    Mock::given(method("GET"))
        .and(path("/en/search/"))
        .and(query_param("body", "3"))
        .and(HasQueryParam("pageNumber"))
        .respond_with(html(results_page(&[])))
        .mount(&server)
        .await;
    mount_seed(&server, "3", seed_page("1,234 results")).await;

    let store = Arc::new(MemoryContentStore::new("test-harvester"));
    let outcome = run_harvest(context(&server, vec![3]), store)
        .await
        .expect("harvest failed");

    assert_eq!(outcome.stats.pages_requested, 124);
    assert_eq!(outcome.stats.pages_without_items, 124);
    assert!(outcome.records.is_empty());

    let requests = server.received_requests().await.expect("recording enabled");
    let mut page_numbers: Vec<u64> = requests
        .iter()
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "pageNumber")
                .and_then(|(_, v)| v.parse().ok())
        })
        .collect();
    page_numbers.sort_unstable();
    assert_eq!(page_numbers, (1..=124).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_document_failure_is_isolated() {
    let server = MockServer::start().await;

    mount_results_page(
        &server,
        "1",
        "1",
        results_page(&[
            result_item(Some("ADJ-1"), "/en/case/gone"),
            result_item(Some("ADJ-2"), "/en/case/ok"),
        ]),
    )
    .await;
    mount_seed(&server, "1", seed_page("2 results")).await;
    mount_document(&server, "/en/case/ok", "text/html", b"<html/>").await;
    Mock::given(method("GET"))
        .and(path("/en/case/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryContentStore::new("test-harvester"));
    let outcome = run_harvest(context(&server, vec![1]), store.clone())
        .await
        .expect("harvest failed");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].storage_key, "ADJ-2.html");
    assert_eq!(outcome.stats.fetch_errors, 1);
    assert_eq!(store.list_keys(BUCKET).await.unwrap(), vec!["ADJ-2.html"]);
}

#[tokio::test]
async fn test_store_failure_is_isolated() {
    let server = MockServer::start().await;

    mount_results_page(
        &server,
        "1",
        "1",
        results_page(&[
            result_item(Some("BAD 1"), "/en/case/bad"),
            result_item(Some("OK 2"), "/en/case/ok"),
        ]),
    )
    .await;
    mount_seed(&server, "1", seed_page("2 results")).await;
    mount_document(&server, "/en/case/bad", "text/html", b"<html>bad</html>").await;
    mount_document(&server, "/en/case/ok", "text/html", b"<html>ok</html>").await;

    let store = Arc::new(RejectingStore {
        inner: MemoryContentStore::new("test-harvester"),
        rejected_prefix: "BAD",
    });
    let outcome = run_harvest(context(&server, vec![1]), store.clone())
        .await
        .expect("harvest failed");

    let keys: Vec<&str> = outcome
        .records
        .iter()
        .map(|r| r.storage_key.as_str())
        .collect();
    assert_eq!(keys, vec!["OK_2.html"]);
    assert_eq!(outcome.stats.store_errors, 1);
    assert_eq!(outcome.stats.fetch_errors, 0);
    assert_eq!(outcome.stats.documents_stored, 1);
    assert_eq!(store.list_keys(BUCKET).await.unwrap(), vec!["OK_2.html"]);
}

#[tokio::test]
async fn test_page_failure_is_isolated() {
    let server = MockServer::start().await;

    // Page 1 keeps failing through every retry, page 2 is fine
    Mock::given(method("GET"))
        .and(path("/en/search/"))
        .and(query_param("body", "1"))
        .and(query_param("pageNumber", "1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_results_page(
        &server,
        "1",
        "2",
        results_page(&[result_item(Some("ADJ-00002"), "/en/case/2")]),
    )
    .await;
    mount_seed(&server, "1", seed_page("Showing 1 - 10 of 12 results")).await;
    mount_document(&server, "/en/case/2", "text/html", b"<html>decision</html>").await;

    let store = Arc::new(MemoryContentStore::new("test-harvester"));
    let outcome = run_harvest(context(&server, vec![1]), store)
        .await
        .expect("harvest failed");

    assert_eq!(outcome.stats.pages_requested, 2);
    assert_eq!(outcome.stats.fetch_errors, 1);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].storage_key, "ADJ-00002.html");
}

#[tokio::test]
async fn test_server_error_is_retried_by_fetch_layer() {
    let server = MockServer::start().await;

    mount_results_page(
        &server,
        "1",
        "1",
        results_page(&[result_item(Some("ADJ-7"), "/en/case/flaky")]),
    )
    .await;
    mount_seed(&server, "1", seed_page("1 result")).await;

    // First attempt fails, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/en/case/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_document(&server, "/en/case/flaky", "application/pdf", b"%PDF").await;

    let store = Arc::new(MemoryContentStore::new("test-harvester"));
    let outcome = run_harvest(context(&server, vec![1]), store)
        .await
        .expect("harvest failed");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].storage_key, "ADJ-7.pdf");
    assert_eq!(outcome.stats.fetch_errors, 0);
}

#[tokio::test]
async fn test_seed_failure_is_isolated() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    // Body 15376 has no mock at all, so its seed fetch is a 404
    let store = Arc::new(MemoryContentStore::new("test-harvester"));
    let outcome = run_harvest(context(&server, vec![15376, 1]), store)
        .await
        .expect("harvest failed");

    assert_eq!(outcome.stats.fetch_errors, 1);
    assert_eq!(outcome.records.len(), 2);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let dir = tempfile::TempDir::new().expect("temp dir");
    let db_path = dir.path().join("store.db");

    let mut runs = Vec::new();
    for _ in 0..2 {
        let store = Arc::new(
            SqliteContentStore::open(&db_path, "test-harvester").expect("open store"),
        );
        let outcome = run_harvest(context(&server, vec![1, 2]), store.clone())
            .await
            .expect("harvest failed");
        assert_eq!(outcome.records.len(), 2);
        runs.push(store.list_keys(BUCKET).await.expect("list keys"));
    }

    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[1], vec!["ADJ-00002.html", "WRC_2021_001.pdf"]);
}

#[tokio::test]
async fn test_namespace_conflict_aborts_before_fetching() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let store = Arc::new(
        MemoryContentStore::new("test-harvester").with_foreign_namespace(BUCKET, "another-team"),
    );
    let result = run_harvest(context(&server, vec![1, 2]), store).await;

    assert!(matches!(
        result,
        Err(HarvestError::Store(StoreError::NamespaceConflict { .. }))
    ));

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty(), "no fetch may be issued after a fatal error");
}
