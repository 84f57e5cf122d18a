use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use cinepick_api::{
    api::{create_router, AppState},
    error::{AppError, AppResult},
    models::{CatalogId, CatalogMovie, Credential},
    services::{catalog::CatalogProvider, generation::TextGenerator},
};

/// Generator that replays a canned reply and counts calls
struct CannedGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str, _credential: &Credential) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| AppError::ExternalApi("OpenAI API returned status 503: busy".to_string()))
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

/// In-memory catalog
struct FakeCatalog {
    movies: Vec<CatalogMovie>,
}

#[async_trait::async_trait]
impl CatalogProvider for FakeCatalog {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<CatalogMovie>> {
        let query = query.to_lowercase();
        Ok(self
            .movies
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }

    async fn recommendations(&self, id: CatalogId) -> AppResult<Vec<CatalogMovie>> {
        Ok(self.movies.iter().filter(|m| m.id != id).cloned().collect())
    }

    async fn similar(&self, _id: CatalogId) -> AppResult<Vec<CatalogMovie>> {
        Ok(vec![])
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

fn movie(id: u64, title: &str, year: u16, rating: f64) -> CatalogMovie {
    CatalogMovie {
        id: CatalogId(id),
        title: title.to_string(),
        year: Some(year),
        rating,
        popularity: 10.0,
        synopsis: format!("{} synopsis.", title),
    }
}

fn catalog() -> Arc<FakeCatalog> {
    Arc::new(FakeCatalog {
        movies: vec![
            movie(949, "Heat", 1995, 7.9),
            movie(11423, "Thief", 1981, 7.2),
            movie(1422, "The Departed", 2006, 8.2),
        ],
    })
}

fn valid_reply() -> String {
    let mut reply = String::from("You gravitate to tense, intelligent crime stories. Professionals under pressure.\n\n");
    for n in 1..=15 {
        reply.push_str(&format!("{}. Crime Film {} ({})\nTight and tense.\n\n", n, n, 1960 + n));
    }
    reply
}

fn create_test_server(reply: Option<String>, credential: Option<&str>) -> (TestServer, Arc<CannedGenerator>) {
    let generator = Arc::new(CannedGenerator {
        reply,
        calls: AtomicUsize::new(0),
    });
    let state = AppState::new(
        generator.clone(),
        catalog(),
        credential.and_then(Credential::new),
    );
    let app = create_router(state);
    (TestServer::new(app).unwrap(), generator)
}

fn heat_request() -> Value {
    json!({
        "seeds": [{ "title": "Heat", "year": 1995, "catalog_id": 949 }],
        "genre": "Crime"
    })
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server(None, None);
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (server, _) = create_test_server(None, None);
    let response = server
        .get("/health")
        .add_header("x-request-id".parse::<axum::http::HeaderName>().unwrap(), "trace-42".parse::<axum::http::HeaderValue>().unwrap())
        .await;
    assert_eq!(response.header("x-request-id"), "trace-42");

    let response = server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_title_search() {
    let (server, _) = create_test_server(None, None);
    let response = server
        .get("/api/v1/titles/search")
        .add_query_param("q", "the")
        .await;

    response.assert_status_ok();
    let titles: Vec<Value> = response.json();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0]["id"], 1422);
    assert_eq!(titles[0]["year"], 2006);
}

#[tokio::test]
async fn test_title_search_blank_query() {
    let (server, _) = create_test_server(None, None);
    let response = server
        .get("/api/v1/titles/search")
        .add_query_param("q", "  ")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_from_generator() {
    let (server, generator) = create_test_server(Some(valid_reply()), Some("sk-test"));
    let response = server
        .post("/api/v1/recommendations")
        .json(&heat_request())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "llm");
    assert_eq!(
        body["analysis"],
        "You gravitate to tense, intelligent crime stories. Professionals under pressure."
    );

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 15);
    for (idx, item) in items.iter().enumerate() {
        assert_eq!(item["rank"], idx + 1);
    }
    assert_eq!(items[0]["title"], "Crime Film 1");
    assert_eq!(items[0]["year"], 1961);
    assert!(body["text"]
        .as_str()
        .unwrap()
        .contains("RECOMMENDATIONS:\n\n1. Crime Film 1 (1961)\nTight and tense."));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_recommendations_fall_back_on_generator_failure() {
    let (server, _) = create_test_server(None, Some("sk-test"));
    let response = server
        .post("/api/v1/recommendations")
        .json(&heat_request())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["analysis"], Value::Null);

    let titles: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["The Departed", "Thief"]);
}

#[tokio::test]
async fn test_recommendations_without_credential_skip_generator() {
    let (server, generator) = create_test_server(Some(valid_reply()), None);
    let response = server
        .post("/api/v1/recommendations")
        .json(&heat_request())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "fallback");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_recommendations_resolve_seed_without_id() {
    let (server, _) = create_test_server(Some("not a list".to_string()), Some("sk-test"));
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "seeds": [{ "title": "Thief (1981)" }],
            "genre": "Crime"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let titles: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["The Departed", "Heat"]);
}

#[tokio::test]
async fn test_recommendations_reject_invalid_input() {
    let (server, _) = create_test_server(None, None);

    let no_seeds = server
        .post("/api/v1/recommendations")
        .json(&json!({ "seeds": [], "genre": "Crime" }))
        .await;
    no_seeds.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = no_seeds.json();
    assert!(body["error"].is_string());

    let six_seeds: Vec<Value> = (0..6).map(|n| json!({ "title": format!("Movie {}", n) })).collect();
    server
        .post("/api/v1/recommendations")
        .json(&json!({ "seeds": six_seeds, "genre": "Crime" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/v1/recommendations")
        .json(&json!({ "seeds": [{ "title": "Heat" }], "genre": "  " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/v1/recommendations")
        .json(&json!({
            "seeds": [{ "title": "Heat" }],
            "genre": "Crime",
            "preferences": { "tone": { "value": 1.5, "enabled": true } }
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_fallback_is_bad_gateway() {
    let generator = Arc::new(CannedGenerator {
        reply: None,
        calls: AtomicUsize::new(0),
    });
    let state = AppState::new(
        generator,
        Arc::new(FakeCatalog { movies: vec![] }),
        Credential::new("sk-test"),
    );
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "seeds": [{ "title": "Heat", "catalog_id": 949 }],
            "genre": "Crime"
        }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"], "No recommendations received");
}
