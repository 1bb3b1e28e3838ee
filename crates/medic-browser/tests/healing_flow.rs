//! End-to-end healing: resolver -> shared registry -> real model client ->
//! in-process fake backend, over an in-memory page.

use async_trait::async_trait;
use axum::{extract::State, response::Json, routing::post, Router};
use medic_agent::SharedClientRegistry;
use medic_browser::{ActivityLog, ElementLookup, HealingObserver, LocatorResolver, Lookup};
use medic_core::{ElementDescription, Locator, ModelConfig, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct StaticPage {
    markup: String,
    elements: HashMap<Locator, &'static str>,
}

#[async_trait]
impl ElementLookup for StaticPage {
    type Element = &'static str;

    async fn find_element(&self, locator: &Locator) -> Result<Lookup<&'static str>> {
        Ok(match self.elements.get(locator) {
            Some(name) => Lookup::Found(*name),
            None => Lookup::NotFound,
        })
    }

    async fn current_markup(&self) -> Result<String> {
        Ok(self.markup.clone())
    }
}

#[derive(Clone)]
struct Backend {
    answers: Arc<Mutex<Vec<&'static str>>>,
    requests: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
}

async fn generate(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    *backend.last_body.lock().unwrap() = Some(body);
    let answer = {
        let mut answers = backend.answers.lock().unwrap();
        if answers.is_empty() {
            ""
        } else {
            answers.remove(0)
        }
    };
    Json(json!({ "response": answer, "done": true }))
}

async fn spawn_backend(answers: Vec<&'static str>) -> (String, Backend) {
    let backend = Backend {
        answers: Arc::new(Mutex::new(answers)),
        requests: Arc::new(AtomicUsize::new(0)),
        last_body: Arc::new(Mutex::new(None)),
    };
    let router = Router::new()
        .route("/api/generate", post(generate))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), backend)
}

fn wikipedia_page() -> StaticPage {
    let mut elements = HashMap::new();
    elements.insert(Locator::css("input[name='search']"), "search-input");
    elements.insert(Locator::xpath("//button[@type='submit']"), "search-button");
    StaticPage {
        markup: "<form><input name='search'><button type='submit'>Go</button></form>".to_string(),
        elements,
    }
}

fn registry_for(base_url: &str) -> Arc<SharedClientRegistry> {
    Arc::new(SharedClientRegistry::from_config(ModelConfig {
        base_url: base_url.to_string(),
        model: "m".to_string(),
        ..ModelConfig::default()
    }))
}

#[tokio::test]
async fn test_heals_through_local_backend() {
    let (base_url, backend) = spawn_backend(vec!["nothing-here", "input[name='search']"]).await;
    let registry = registry_for(&base_url);

    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(ActivityLog::new(dir.path().join("activity.log")));

    let resolver = LocatorResolver::new(wikipedia_page(), Arc::clone(&registry))
        .with_observer(log.clone() as Arc<dyn HealingObserver>);

    let element = resolver
        .resolve_element(
            &Locator::id("searchInput"),
            &ElementDescription::new("Wikipedia search box"),
        )
        .await
        .unwrap();

    assert_eq!(element, "search-input");
    assert_eq!(backend.requests.load(Ordering::SeqCst), 2);
    assert!(registry.is_initialized());

    let body = backend.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "m");
    assert_eq!(body["stream"], false);
    assert!(body["prompt"]
        .as_str()
        .unwrap()
        .contains("Failed locator: id=searchInput"));

    let content = tokio::fs::read_to_string(log.path()).await.unwrap();
    let lines: Vec<&str> = content.lines().collect();
    // started, failed, started, healed
    assert_eq!(lines.len(), 4);
    assert!(lines[1].contains("attempt 1/3 failed"));
    assert!(lines[3].contains("with suggestion 'input[name='search']'"));
}

#[tokio::test]
async fn test_direct_hit_sends_no_requests() {
    let (base_url, backend) = spawn_backend(vec!["#unused"]).await;
    let registry = registry_for(&base_url);
    let resolver = LocatorResolver::new(wikipedia_page(), Arc::clone(&registry));

    let element = resolver
        .resolve_element(
            &Locator::xpath("//button[@type='submit']"),
            &ElementDescription::new("Search button"),
        )
        .await
        .unwrap();

    assert_eq!(element, "search-button");
    assert_eq!(backend.requests.load(Ordering::SeqCst), 0);
    assert!(!registry.is_initialized());
}

#[tokio::test]
async fn test_unavailable_backend_exhausts_as_not_found() {
    // Reserve a port, then close it so every request is refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let closed = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let registry = registry_for(&closed);
    let resolver = LocatorResolver::new(wikipedia_page(), registry).with_max_attempts(2);

    let err = resolver
        .resolve_element(&Locator::id("gone"), &ElementDescription::new("Gone element"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Element not found: Gone element");
}
