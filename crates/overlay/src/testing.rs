//! Local stand-in for the remote APIs, served by axum on an ephemeral port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::Router;

/// Air-pollution body with PM2.5 = 40 µg/m³ (AQI 112).
pub const SAMPLE_BODY: &str = r#"{"list":[{"dt":1700000000,"main":{"aqi":2},"components":{"co":200,"no2":10,"o3":30,"pm2_5":40,"pm10":60}}]}"#;

pub fn body_with_pm25(pm2_5: f64) -> String {
    serde_json::json!({
        "list": [{
            "main": {"aqi": 1},
            "components": {"co": 100.0, "no2": 5.0, "o3": 20.0, "pm2_5": pm2_5, "pm10": 10.0}
        }]
    })
    .to_string()
}

#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl UpstreamReply {
    pub fn ok(body: &str) -> Self {
        UpstreamReply::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        UpstreamReply {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

struct UpstreamState {
    /// First route whose pattern occurs in the request URI wins; "" matches anything.
    routes: Vec<(String, UpstreamReply)>,
    log: Mutex<Vec<String>>,
}

pub struct Upstream {
    pub base_url: String,
    state: Arc<UpstreamState>,
}

impl Upstream {
    /// Path and query of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.state.log.lock().unwrap().clone()
    }
}

async fn reply(State(state): State<Arc<UpstreamState>>, uri: Uri) -> (StatusCode, String) {
    let uri = uri.to_string();
    state.log.lock().unwrap().push(uri.clone());

    let reply = state
        .routes
        .iter()
        .find(|(pattern, _)| uri.contains(pattern.as_str()))
        .map(|(_, r)| r.clone())
        .unwrap_or_else(|| UpstreamReply::status(404, "no route"));

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    (StatusCode::from_u16(reply.status).unwrap(), reply.body)
}

pub async fn spawn_routed(routes: Vec<(&str, UpstreamReply)>) -> Upstream {
    let state = Arc::new(UpstreamState {
        routes: routes
            .into_iter()
            .map(|(pattern, r)| (pattern.to_string(), r))
            .collect(),
        log: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(reply).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Upstream {
        base_url: format!("http://{}", addr),
        state,
    }
}

pub async fn spawn_upstream(reply: UpstreamReply) -> Upstream {
    spawn_routed(vec![("", reply)]).await
}
