//! Request-level logging, request IDs, and parent trace extraction.

mod parent_context;
mod request_ids;
mod spans;

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use crate::identity::USER_ID_HEADER;

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Paths scraped by infrastructure; neither logged nor counted.
const UNTRACED_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

/// What is known about a request once the handler chain has run.
#[derive(Debug)]
struct Completed<'a> {
    method: &'a str,
    path: &'a str,
    request_id: &'a str,
    status: StatusCode,
    duration: Duration,
}

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNTRACED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());

    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let spans::RequestSpanName {
        otel_path,
        otel_span_name,
    } = spans::request_span_name(&method, &path);
    let _in_flight_request = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %otel_span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %req.remote_addr(),
        user_id = tracing::field::Empty,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    if let Some(user_id) = req.header::<String>(USER_ID_HEADER) {
        span.record("user_id", user_id.as_str());
    }

    if settings::otel_parent_propagation_enabled()
        && let Some(parent_context) = parent_context::extract_parent_context(req.headers())
        && let Err(source) = span.set_parent(parent_context)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let completed = Completed {
        method: &method,
        path: &path,
        request_id: &request_id,
        status: request_ids::response_status_or_ok(res.status_code),
        duration: started.elapsed(),
    };

    metrics::observe_request(
        &method,
        &otel_path,
        completed.status.as_u16(),
        completed.duration.as_secs_f64(),
    );

    report(&span, &completed);
}

fn report(span: &Span, completed: &Completed<'_>) {
    let status = completed.status.as_u16();
    let duration_ms = completed.duration.as_millis();
    let threshold_ms = u128::from(settings::slow_request_threshold_ms());

    span.record("status", status);
    span.record("duration_ms", duration_ms);

    span.in_scope(|| {
        info!(status, duration_ms, "request.completed");

        if completed.status.is_server_error() {
            error!(
                status,
                method = completed.method,
                path = completed.path,
                request_id = completed.request_id,
                "server error response"
            );
        } else if completed.status.is_client_error() {
            warn!(
                status,
                method = completed.method,
                path = completed.path,
                request_id = completed.request_id,
                "client error response"
            );
        }

        if duration_ms > threshold_ms {
            warn!(
                method = completed.method,
                path = completed.path,
                request_id = completed.request_id,
                duration_ms,
                threshold_ms,
                "slow request detected"
            );
        }
    });
}
