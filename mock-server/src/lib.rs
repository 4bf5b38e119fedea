//! Stub HTTP server for exercising the redirecting client end to end.
//!
//! Every response carries `Connection: close`, so the connection ends right
//! after the response and a read-to-close client sees end of response.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderValue, Response, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// One `name=value` pair of the received query string, undecoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPair {
    pub name: String,
    pub value: String,
}

/// Absolute base (`http://ip:port`) used to build `Location` values.
#[derive(Clone, Debug)]
pub struct Stub {
    pub base_url: Arc<str>,
}

pub fn app(addr: SocketAddr) -> Router {
    let stub = Stub {
        base_url: format!("http://{addr}").into(),
    };
    Router::new()
        .route("/search", get(search))
        .route("/echo", get(echo))
        .route("/hop/{n}", get(hop))
        .route("/loop", get(redirect_loop))
        .route("/relative", get(relative))
        .route("/missing-location", get(missing_location))
        .route("/not-found", get(not_found))
        .layer(middleware::map_response(close_connection))
        .with_state(stub)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    axum::serve(listener, app(addr)).await
}

async fn close_connection<B>(mut response: Response<B>) -> Response<B> {
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

fn found(location: &str) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())])
}

async fn search() -> &'static str {
    "ok"
}

async fn echo(RawQuery(query): RawQuery) -> Json<Vec<QueryPair>> {
    let pairs = query
        .as_deref()
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            QueryPair {
                name: name.to_string(),
                value: value.to_string(),
            }
        })
        .collect();
    Json(pairs)
}

async fn hop(State(stub): State<Stub>, Path(n): Path<u32>) -> axum::response::Response {
    if n == 0 {
        return "landed".into_response();
    }
    found(&format!("{}/hop/{}", stub.base_url, n - 1)).into_response()
}

async fn redirect_loop(State(stub): State<Stub>) -> impl IntoResponse {
    found(&format!("{}/loop", stub.base_url))
}

async fn relative() -> impl IntoResponse {
    found("/search")
}

async fn missing_location() -> StatusCode {
    StatusCode::FOUND
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "nothing here")
}
