//! Fixture HTTP server for exercising the typed client over real sockets.
//!
//! Routes:
//! - `ANY /echo` answers 200 with the request body.
//! - `ANY /headers` answers 200 with the received headers as a JSON object.
//! - `ANY /status/{code}` answers with that status and an empty body.
//! - `ANY /secure` answers 401 unless a bearer token is present.
//! - `/items/{id}` stores JSON values: `PUT` upserts, `GET` reads and
//!   `DELETE` removes. `DELETE` requires a JSON body.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub type Db = Arc<RwLock<HashMap<String, Value>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", any(echo))
        .route("/headers", any(headers))
        .route("/status/{code}", any(status))
        .route("/secure", any(secure))
        .route("/items/{id}", get(get_item).put(put_item).delete(delete_item))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(body: String) -> String {
    body
}

async fn headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        out.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    Json(out)
}

async fn status(Path(code): Path<u16>) -> Result<StatusCode, StatusCode> {
    StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)
}

async fn secure(headers: HeaderMap) -> Result<String, StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty());
    match token {
        Some(token) => Ok(token.to_string()),
        None => {
            debug!("rejecting request without bearer token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

async fn get_item(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    let items = db.read().await;
    items.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn put_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(value): Json<Value>,
) -> Json<Value> {
    db.write().await.insert(id, value.clone());
    Json(value)
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(_body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut items = db.write().await;
    items.remove(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}
