//! Shared utilities for integration and load testing.
//!
//! Every mock binds `127.0.0.1:0`, so tests can run in parallel.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use cep_weather::config::{AppConfig, ServiceRole};
use cep_weather::observability::Tracer;
use cep_weather::{HttpServer, Shutdown};
use tokio::net::TcpListener;
use tracing::Span;

pub const TEST_TRACEPARENT: &str = "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01";

/// Serve `router` on an ephemeral port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// An address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

/// How the postal mock answers.
#[derive(Clone)]
pub enum PostalBehavior {
    /// Every CEP resolves to this city.
    Found(&'static str),
    /// Each CEP resolves to `City <cep>`.
    CityPerCep,
    /// `{"erro": true}` with status 200.
    NotFound,
    /// `{"erro": "true"}` with status 200.
    NotFoundAsText,
    /// Bare status code with an empty body.
    Status(u16),
}

/// Start a postal-lookup mock. Returns its address and a hit counter.
pub async fn start_postal_mock(behavior: PostalBehavior) -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let router = Router::new().route(
        "/ws/{cep}/json/",
        get(move |Path(cep): Path<String>| {
            let counter = counter.clone();
            let behavior = behavior.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                match behavior {
                    PostalBehavior::Found(city) => Json(postal_body(&cep, city)).into_response(),
                    PostalBehavior::CityPerCep => {
                        Json(postal_body(&cep, &format!("City {}", cep))).into_response()
                    }
                    PostalBehavior::NotFound => {
                        Json(serde_json::json!({"erro": true})).into_response()
                    }
                    PostalBehavior::NotFoundAsText => {
                        Json(serde_json::json!({"erro": "true"})).into_response()
                    }
                    PostalBehavior::Status(code) => {
                        StatusCode::from_u16(code).unwrap().into_response()
                    }
                }
            }
        }),
    );

    (serve(router).await, hits)
}

fn postal_body(cep: &str, city: &str) -> serde_json::Value {
    serde_json::json!({
        "cep": format!("{}-{}", &cep[..5], &cep[5..]),
        "logradouro": "Praça da Sé",
        "complemento": "lado ímpar",
        "bairro": "Sé",
        "localidade": city,
        "uf": "SP",
    })
}

/// How the weather mock answers.
#[derive(Clone)]
pub enum WeatherBehavior {
    /// Always this Celsius reading.
    Reading(f64),
    /// Reading derived from the digits in `q`, so each city gets its own value.
    ReadingPerCity,
    /// Answer after a delay.
    Slow(Duration, f64),
    /// Bare status code with an empty body.
    Status(u16),
}

/// Query parameters seen by the weather mock.
#[derive(Clone, Default)]
pub struct WeatherCalls {
    pub queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl WeatherCalls {
    pub fn count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn last(&self) -> HashMap<String, String> {
        self.queries.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

/// Derived Celsius value used by [`WeatherBehavior::ReadingPerCity`].
pub fn reading_for_city(city: &str) -> f64 {
    let sum: u32 = city.chars().filter_map(|c| c.to_digit(10)).sum();
    f64::from(sum % 40) + 0.5
}

/// Start a weather-provider mock serving `/current.json`.
pub async fn start_weather_mock(behavior: WeatherBehavior) -> (SocketAddr, WeatherCalls) {
    let calls = WeatherCalls::default();
    let recorded = calls.clone();

    let router = Router::new().route(
        "/current.json",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let recorded = recorded.clone();
            let behavior = behavior.clone();
            async move {
                let city = params.get("q").cloned().unwrap_or_default();
                recorded.queries.lock().unwrap().push(params);
                match behavior {
                    WeatherBehavior::Reading(temp) => Json(weather_body(&city, temp)).into_response(),
                    WeatherBehavior::ReadingPerCity => {
                        Json(weather_body(&city, reading_for_city(&city))).into_response()
                    }
                    WeatherBehavior::Slow(delay, temp) => {
                        tokio::time::sleep(delay).await;
                        Json(weather_body(&city, temp)).into_response()
                    }
                    WeatherBehavior::Status(code) => {
                        StatusCode::from_u16(code).unwrap().into_response()
                    }
                }
            }
        }),
    );

    (serve(router).await, calls)
}

fn weather_body(city: &str, temp_c: f64) -> serde_json::Value {
    serde_json::json!({
        "location": {"name": city, "country": "Brazil"},
        "current": {"temp_c": temp_c, "condition": {"text": "Sunny"}}
    })
}

/// Stand-in for the internal service, as seen from the edge.
#[derive(Clone, Default)]
pub struct InternalCalls {
    pub paths: Arc<Mutex<Vec<String>>>,
    pub traceparents: Arc<Mutex<Vec<Option<String>>>>,
    /// Handlers that ran past their delay and produced a response.
    pub completed: Arc<AtomicUsize>,
}

impl InternalCalls {
    pub fn count(&self) -> usize {
        self.paths.lock().unwrap().len()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

/// Start a fake internal service answering every CEP with `status` and `body`
/// after `delay`.
pub async fn start_internal_mock(
    status: u16,
    body: serde_json::Value,
    delay: Duration,
) -> (SocketAddr, InternalCalls) {
    let calls = InternalCalls::default();
    let recorded = calls.clone();

    let router = Router::new().route(
        "/{cep}",
        get(move |Path(cep): Path<String>, headers: HeaderMap| {
            let recorded = recorded.clone();
            let body = body.clone();
            async move {
                recorded.paths.lock().unwrap().push(cep);
                recorded.traceparents.lock().unwrap().push(
                    headers
                        .get("traceparent")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                );
                tokio::time::sleep(delay).await;
                recorded.completed.fetch_add(1, Ordering::SeqCst);
                (StatusCode::from_u16(status).unwrap(), Json(body)).into_response()
            }
        }),
    );

    (serve(router).await, calls)
}

/// Tracer that records span names and injects a fixed `traceparent`.
#[derive(Default)]
pub struct RecordingTracer {
    pub spans: Mutex<Vec<&'static str>>,
    pub continued: Mutex<Vec<String>>,
}

impl RecordingTracer {
    pub fn span_names(&self) -> Vec<&'static str> {
        self.spans.lock().unwrap().clone()
    }

    pub fn continued_traces(&self) -> Vec<String> {
        self.continued.lock().unwrap().clone()
    }
}

impl Tracer for RecordingTracer {
    fn start_span(&self, name: &'static str) -> Span {
        self.spans.lock().unwrap().push(name);
        Span::none()
    }

    fn inject_context(&self, _span: &Span, headers: &mut HeaderMap) {
        headers.insert("traceparent", HeaderValue::from_static(TEST_TRACEPARENT));
    }

    fn continue_trace(&self, _span: &Span, headers: &HeaderMap) {
        if let Some(value) = headers.get("traceparent").and_then(|v| v.to_str().ok()) {
            self.continued.lock().unwrap().push(value.to_string());
        }
    }
}

/// Configuration pointing both services at local mocks.
pub fn test_config(internal: SocketAddr, postal: SocketAddr, weather: SocketAddr) -> AppConfig {
    let mut config = AppConfig::default();
    config.edge.bind_address = "127.0.0.1:0".to_string();
    config.internal.bind_address = "127.0.0.1:0".to_string();
    config.edge.internal_base_url = url(internal);
    config.providers.postal_base_url = url(postal);
    config.providers.weather_base_url = url(weather);
    config.providers.weather_api_key = "test-key".to_string();
    config.timeouts.request_ms = 5_000;
    config.timeouts.upstream_ms = 2_000;
    config
}

/// Start a real service for `role` and return its address.
pub async fn start_service(
    config: &AppConfig,
    role: ServiceRole,
    tracer: Arc<dyn Tracer>,
    shutdown: &Shutdown,
) -> SocketAddr {
    let server = HttpServer::new(config, role, tracer).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });
    addr
}

/// Edge + internal services wired to the given provider mocks.
pub struct Stack {
    pub edge: SocketAddr,
    pub internal: SocketAddr,
    pub edge_tracer: Arc<RecordingTracer>,
    pub internal_tracer: Arc<RecordingTracer>,
    pub shutdown: Shutdown,
}

pub async fn start_stack(postal: SocketAddr, weather: SocketAddr, mut config: AppConfig) -> Stack {
    let shutdown = Shutdown::new();
    let internal_tracer = Arc::new(RecordingTracer::default());
    let edge_tracer = Arc::new(RecordingTracer::default());

    config.providers.postal_base_url = url(postal);
    config.providers.weather_base_url = url(weather);
    let internal = start_service(&config, ServiceRole::Internal, internal_tracer.clone(), &shutdown).await;

    config.edge.internal_base_url = url(internal);
    let edge = start_service(&config, ServiceRole::Edge, edge_tracer.clone(), &shutdown).await;

    Stack {
        edge,
        internal,
        edge_tracer,
        internal_tracer,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// POST a raw body to the edge service.
pub async fn post_edge(addr: SocketAddr, body: &str) -> (u16, serde_json::Value) {
    let res = client()
        .post(url(addr))
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .expect("edge unreachable");
    let status = res.status().as_u16();
    let text = res.text().await.unwrap();
    (status, serde_json::from_str(&text).unwrap_or(serde_json::Value::Null))
}

/// GET a path on the internal service.
pub async fn get_internal(addr: SocketAddr, path: &str) -> (u16, serde_json::Value) {
    let res = client()
        .get(format!("{}{}", url(addr), path))
        .send()
        .await
        .expect("internal unreachable");
    let status = res.status().as_u16();
    let text = res.text().await.unwrap();
    (status, serde_json::from_str(&text).unwrap_or(serde_json::Value::Null))
}
