use std::{io, sync::OnceLock, time};

use application::{api, Args, Config};
use axum::{extract::MatchedPath, Extension};
use axum_client_ip::InsecureClientIp;
use service::{
    infra::{postgres, Postgres},
    Service,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{
        self,
        format::{Compact, DefaultFields, Format},
    },
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            fmt_layer()
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| admits(meta, false))),
        )
        .with(
            fmt_layer()
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| admits(meta, true))),
        )
        .init();

    _ = start().await;
}

/// Returns a compact log formatting layer.
fn fmt_layer<S>() -> fmt::Layer<S, DefaultFields, Format<Compact>> {
    fmt::layer().compact().with_ansi(true).with_thread_names(true)
}

/// Checks whether the described span or event goes to the stderr (or to the
/// stdout otherwise).
fn admits(meta: &log::Metadata<'_>, stderr: bool) -> bool {
    let level = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
    meta.is_span()
        || STDERR_LEVELS.contains(meta.level()) == stderr
            && level >= *meta.level()
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let postgres_config = postgres.into();
    let mut postgres = Postgres::new(&postgres_config).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;

    let report = migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
        })?;
    for m in report.applied_migrations() {
        log::info!("applied migration `{m}`");
    }

    let service = Service::new(service.into(), postgres);

    let cors = cors(&server.cors.origins)?;

    let app = api::router()
        .layer(Extension(service))
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            server.request_timeout,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|r: &http::Request<_>| request_span(r))
                .on_response(
                    |r: &http::Response<_>, dur, span: &log::Span| {
                        log_response(r, dur, span);
                    },
                ),
        );

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}

/// Resolves once the process is asked to terminate.
async fn shutdown() {
    if let Err(e) = signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
    }
    log::info!("shutting down");
}

/// Builds a [`CorsLayer`] admitting the provided `origins`.
///
/// `*` admits any origin.
fn cors(origins: &[String]) -> Result<CorsLayer, ()> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .map(|origin| {
                    origin.parse::<http::HeaderValue>().map_err(|e| {
                        log::error!("`{origin}` is not a CORS origin: {e}");
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        )
    };
    Ok(CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_origin(allow_origin))
}

/// Opens a span for the provided HTTP request.
fn request_span<B>(r: &http::Request<B>) -> log::Span {
    log::info_span!(
        "HTTP request",
        http.client_ip = InsecureClientIp::from(r.headers(), r.extensions())
            .map(|ip| ip.0.to_string())
            .ok(),
        http.flavor = ?r.version(),
        http.method = r.method().as_str(),
        http.route = r
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
        http.target = r
            .uri()
            .path_and_query()
            .map(http::uri::PathAndQuery::as_str),
        http.user_agent = r
            .headers()
            .get(http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok()),
        http.status_code = log::field::Empty,
    )
}

/// Logs the provided HTTP response at the level matching its status.
fn log_response<B>(
    r: &http::Response<B>,
    dur: time::Duration,
    span: &log::Span,
) {
    let status = r.status();
    _ = span.record("http.status_code", status.as_u16());

    let duration = format!("{}ms", dur.as_millis());
    if status.is_server_error() {
        log::error!(%duration);
    } else if status.is_client_error() {
        log::warn!(%duration);
    } else {
        log::info!(%duration);
    }
}
