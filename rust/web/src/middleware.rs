use std::convert::Infallible;
use std::time::Instant;
use warp::http::{Method, StatusCode};
use warp::path::FullPath;
use warp::reply::{Reply, Response};
use warp::Filter;

/// Wraps a recovered filter so every request is logged with its status and
/// latency. Wrap after `.recover(..)` so error replies are logged too.
pub fn with_request_logging<F, T>(
    filter: F,
) -> impl Filter<Extract = (Response,), Error = Infallible> + Clone
where
    F: Filter<Extract = (T,), Error = Infallible> + Clone + Send + Sync + 'static,
    T: Reply,
{
    warp::path::full()
        .and(warp::method())
        .map(|path: FullPath, method: Method| {
            tracing::debug!(path = %path.as_str(), method = %method, "incoming request");
            (path.as_str().to_string(), method, Instant::now())
        })
        .and(filter)
        .map(|(path, method, start): (String, Method, Instant), reply: T| {
            let response = reply.into_response();
            log_response(
                response.status(),
                &path,
                method.as_str(),
                start.elapsed().as_millis(),
            );
            response
        })
}

pub fn log_response(status: StatusCode, path: &str, method: &str, duration_ms: u128) {
    if status.is_server_error() {
        tracing::error!(
            status = status.as_u16(),
            path = %path,
            method = %method,
            duration_ms = duration_ms,
            "server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            status = status.as_u16(),
            path = %path,
            method = %method,
            duration_ms = duration_ms,
            "client error"
        );
    } else {
        tracing::info!(
            status = status.as_u16(),
            path = %path,
            method = %method,
            duration_ms = duration_ms,
            "response sent"
        );
    }
}
