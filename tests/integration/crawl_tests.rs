//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl, classify, and report cycle end-to-end.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url_evaluator::classifier::{ScoreError, TopicScorer, TopicScores};
use url_evaluator::config::{ClassifierConfig, CrawlerConfig};
use url_evaluator::crawler::Coordinator;
use url_evaluator::output::aggregate_topic_scores;
use url_evaluator::storage::{SqliteStorage, Storage};
use url_evaluator::LinkClassifier;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Crawler settings with no inter-request delay
fn test_crawler_config() -> CrawlerConfig {
    CrawlerConfig {
        request_delay_ms: 0,
        fetch_timeout_secs: 5,
        ..CrawlerConfig::default()
    }
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

fn db_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("results.db")
}

async fn crawl(seed: &str, max_depth: u32, config: CrawlerConfig, db: &Path) {
    let storage = SqliteStorage::new(db).unwrap();
    Coordinator::new(seed, max_depth, config, storage)
        .unwrap()
        .run()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_branch_and_back_link() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            r#"<ul><li><a href="/b">Broken</a></li><li><a href="/c">Working</a></li></ul>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(html_page("C", r#"<p><a href="/">Back home</a></p>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);

    let storage = SqliteStorage::new(&db).unwrap();
    let report = Coordinator::new(&seed, 1, test_crawler_config(), storage)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.pages_attempted, 3);
    assert_eq!(report.pages_stored, 2);
    assert_eq!(report.fetch_failures, 1);

    let storage = SqliteStorage::new(&db).unwrap();
    assert_eq!(storage.count_pages().unwrap(), 2);

    let home = storage.get_page_by_url(&seed).unwrap().unwrap();
    assert_eq!(home.title, "Home");
    assert_eq!(home.depth, 0);
    assert_eq!(home.source_url, None);

    let c_url = format!("{}/c", mock_server.uri());
    let c_page = storage.get_page_by_url(&c_url).unwrap().unwrap();
    assert_eq!(c_page.depth, 1);
    assert_eq!(c_page.source_url.as_deref(), Some(seed.as_str()));

    let b_url = format!("{}/b", mock_server.uri());
    assert!(storage.get_page_by_url(&b_url).unwrap().is_none());

    let home_links = storage.get_links_for_page(home.id).unwrap();
    let urls: Vec<&str> = home_links.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(urls, vec![b_url.as_str(), c_url.as_str()]);
    assert_eq!(home_links[0].link_text, "Broken");
    assert!(home_links[0].visited_at.is_some());
    assert!(storage.is_visited(&b_url).unwrap());

    let c_links = storage.get_links_for_page(c_page.id).unwrap();
    assert_eq!(c_links.len(), 1);
    assert_eq!(c_links[0].url, seed);
}

#[tokio::test]
async fn test_depth_limit_respected() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    for (from, to) in [("/", "/1"), ("/1", "/2"), ("/2", "/3")] {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(html_page(from, &format!(r#"<a href="{}">next</a>"#, to)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/3"))
        .respond_with(html_page("too deep", ""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);
    crawl(&seed, 2, test_crawler_config(), &db).await;

    let storage = SqliteStorage::new(&db).unwrap();
    assert_eq!(storage.count_pages().unwrap(), 3);
    let deepest = storage
        .get_page_by_url(&format!("{}/2", mock_server.uri()))
        .unwrap()
        .unwrap();
    assert_eq!(deepest.depth, 2);
    // Links on the deepest page are recorded even though they are not followed
    assert_eq!(storage.count_links().unwrap(), 3);
}

#[tokio::test]
async fn test_depth_first_order() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            r#"<a href="/x">x</a><a href="/y">y</a>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(html_page("X", r#"<a href="/x/deep">deep</a>"#))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x/deep"))
        .respond_with(html_page("Deep", ""))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/y"))
        .respond_with(html_page("Y", ""))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);
    crawl(&seed, 2, test_crawler_config(), &db).await;

    let requests = mock_server.received_requests().await.unwrap();
    let order: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(order, vec!["/", "/x", "/x/deep", "/y"]);
}

#[tokio::test]
async fn test_page_limit_caps_visits() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">page {}</a>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", &links))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(html_page("Leaf", ""))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);
    let config = CrawlerConfig {
        max_pages: 4,
        ..test_crawler_config()
    };

    let storage = SqliteStorage::new(&db).unwrap();
    let report = Coordinator::new(&seed, 3, config, storage)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.pages_attempted, 4);
    assert_eq!(report.pages_stored, 4);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 4);

    let storage = SqliteStorage::new(&db).unwrap();
    assert_eq!(storage.count_pages().unwrap(), 4);
}

#[tokio::test]
async fn test_recrawl_writes_nothing_new() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", r#"<a href="/a">a</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page("A", r#"<a href="/">home</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);

    crawl(&seed, 2, test_crawler_config(), &db).await;

    let storage = SqliteStorage::new(&db).unwrap();
    let pages = storage.count_pages().unwrap();
    let links = storage.count_links().unwrap();
    storage.close().unwrap();

    let storage = SqliteStorage::new(&db).unwrap();
    let report = Coordinator::new(&seed, 2, test_crawler_config(), storage)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.pages_attempted, 0);
    let storage = SqliteStorage::new(&db).unwrap();
    assert_eq!(storage.count_pages().unwrap(), pages);
    assert_eq!(storage.count_links().unwrap(), links);
}

#[tokio::test]
async fn test_invalid_seed_fails_before_io() {
    let dir = tempfile::tempdir().unwrap();
    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();

    let result = Coordinator::new("/relative/path", 2, test_crawler_config(), storage);

    assert!(result.is_err());
}

/// Scores by keyword so results are deterministic
struct KeywordScorer;

#[async_trait]
impl TopicScorer for KeywordScorer {
    async fn score(&self, text: &str, labels: &[String]) -> Result<TopicScores, ScoreError> {
        let text = text.to_lowercase();
        Ok(labels
            .iter()
            .map(|label| {
                let score = match (label.as_str(), text.contains("gpu"), text.contains("goal")) {
                    ("technology", true, _) => 0.8,
                    ("technology", _, _) => 0.6,
                    ("sports", _, true) => 0.9,
                    _ => 0.1,
                };
                (label.clone(), score)
            })
            .collect())
    }
}

#[tokio::test]
async fn test_crawl_classify_report() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", r#"<nav><a href="/news">News</a></nav>"#))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(html_page(
            "News",
            r#"<p><a href="/gpu">New GPU ships</a></p><p><a href="/match">Late goal wins it</a></p>"#,
        ))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);
    crawl(&seed, 1, test_crawler_config(), &db).await;

    let config = ClassifierConfig {
        batch_size: 1,
        ..ClassifierConfig::default()
    };
    let storage = SqliteStorage::new(&db).unwrap();
    let report = LinkClassifier::new(&seed, config, storage, KeywordScorer)
        .unwrap()
        .classify_all_pending()
        .await
        .unwrap();

    // Only links found on pages the seed linked to are queued
    assert_eq!(report.total_pending, 2);
    assert_eq!(report.classified, 2);
    assert_eq!(report.batches, 2);

    let storage = SqliteStorage::new(&db).unwrap();
    assert_eq!(storage.count_pending(&seed).unwrap(), 0);

    let averages = aggregate_topic_scores(&storage, &seed).unwrap();
    let topics: Vec<&str> = averages.iter().map(|a| a.topic.as_str()).collect();
    assert_eq!(
        topics,
        vec!["entertainment", "politics", "science", "sports", "technology"]
    );

    let technology = averages.iter().find(|a| a.topic == "technology").unwrap();
    assert!((technology.average_score - 0.7).abs() < 1e-9);
    assert_eq!(technology.samples, 2);

    let sports = averages.iter().find(|a| a.topic == "sports").unwrap();
    assert!((sports.average_score - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_classification_resumes_where_it_stopped() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", r#"<a href="/list">List</a>"#))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(html_page(
            "List",
            r#"<a href="/1">one</a><a href="/2">two</a><a href="/3">three</a>"#,
        ))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);
    crawl(&seed, 1, test_crawler_config(), &db).await;

    // Classify one link out of band, as an interrupted run would have
    let mut storage = SqliteStorage::new(&db).unwrap();
    let first = storage.fetch_pending_batch(&seed, 1, None).unwrap()[0].id;
    let scores: TopicScores = [("science".to_string(), 0.3)].into_iter().collect();
    storage.update_classification(first, &scores).unwrap();
    storage.close().unwrap();

    let storage = SqliteStorage::new(&db).unwrap();
    let report = LinkClassifier::new(&seed, ClassifierConfig::default(), storage, KeywordScorer)
        .unwrap()
        .classify_all_pending()
        .await
        .unwrap();

    assert_eq!(report.total_pending, 2);
    assert_eq!(report.classified, 2);

    let storage = SqliteStorage::new(&db).unwrap();
    let kept = storage.get_link(first).unwrap();
    assert_eq!(kept.topic_scores, Some(scores));
}
