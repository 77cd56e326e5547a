//! Development HTTP server for the cmdbench HTTP client
//!
//! Serves fixed endpoints (`/`, `/ping`), echo endpoints that return
//! `{path}:{body}` with the request's content type, and `/status/<code>` for
//! driving non-2xx result labels.

use axum::body::Bytes;
use axum::extract::Request;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cmdbench-httpserver", version, about = "Test server for cmdbench-http")]
struct Cli {
    /// Address and port to listen on
    #[arg(short = 'a', default_value = "127.0.0.1:4200", value_name = "ADDR")]
    addr: String,
}

fn app() -> Router {
    let mut router = Router::new()
        .route("/", get(|| async { "OK" }))
        .route("/ping", get(|| async { "PONG" }));
    for path in ["/get", "/put", "/post", "/patch", "/delete", "/echo"] {
        router = router.route(path, any(echo));
    }
    router.fallback(any(fallback))
}

/// Echo the path and request body back with the request's content type
async fn echo(uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("text/plain")
        .to_owned();
    let mut payload = uri.path().as_bytes().to_vec();
    payload.push(b':');
    payload.extend_from_slice(&body);
    ([(header::CONTENT_TYPE, content_type)], payload).into_response()
}

/// `/status/<code>` answers with that status; everything else is 404
async fn fallback(request: Request) -> StatusCode {
    let path = request.uri().path();
    if let Some(code) = path.strip_prefix("/status/") {
        if let Ok(status) = code.parse::<u16>() {
            if let Ok(status) = StatusCode::from_u16(status) {
                return status;
            }
        }
    }
    StatusCode::NOT_FOUND
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    println!("Server listening at {}", cli.addr);
    let listener = tokio::net::TcpListener::bind(&cli.addr).await?;
    axum::serve(listener, app()).await?;
    Ok(())
}
