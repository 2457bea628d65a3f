use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

/// Header name for trace ID.
pub const TRACE_ID_HEADER: &str = "x-trace-id";
/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Request tracing state.
#[derive(Debug, Clone)]
pub struct TracingState {
    /// Trace ID, propagated from the caller when present.
    pub trace_id: String,
    /// Unique request ID.
    pub request_id: String,
    pub start_time: Instant,
}

impl TracingState {
    pub fn new() -> Self {
        Self::with_trace_id(Uuid::new_v4().to_string())
    }

    /// Create with an existing trace ID.
    pub fn with_trace_id(trace_id: String) -> Self {
        Self {
            trace_id,
            request_id: Uuid::new_v4().to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = request_id;
        self
    }
}

impl Default for TracingState {
    fn default() -> Self {
        Self::new()
    }
}

/// Request ID of the request being handled on this task, if any.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

fn header(req: &Request, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Adds [`TracingState`] to request extensions and echoes the IDs back as
/// response headers.
pub async fn tracing_middleware(mut req: Request, next: Next) -> Response {
    let mut state = match header(&req, TRACE_ID_HEADER) {
        Some(trace_id) => TracingState::with_trace_id(trace_id),
        None => TracingState::new(),
    };
    if let Some(request_id) = header(&req, REQUEST_ID_HEADER) {
        state = state.with_request_id(request_id);
    }

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(state.clone());

    let mut response = REQUEST_ID
        .scope(state.request_id.clone(), next.run(req))
        .await;

    tracing::debug!(
        request_id = %state.request_id,
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = state.start_time.elapsed().as_millis() as u64,
        "Request completed"
    );

    if let Ok(val) = HeaderValue::from_str(&state.trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, val);
    }
    if let Ok(val) = HeaderValue::from_str(&state.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_state_new() {
        let state = TracingState::new();
        assert!(!state.trace_id.is_empty());
        assert!(!state.request_id.is_empty());
        assert_ne!(state.trace_id, state.request_id);
    }

    #[test]
    fn test_tracing_state_propagation() {
        let state = TracingState::with_trace_id("trace-123".to_string())
            .with_request_id("req-9".to_string());
        assert_eq!(state.trace_id, "trace-123");
        assert_eq!(state.request_id, "req-9");
    }

    #[tokio::test]
    async fn test_current_request_id_is_scoped() {
        assert!(current_request_id().is_none());
        let seen = REQUEST_ID
            .scope("req-1".to_string(), async { current_request_id() })
            .await;
        assert_eq!(seen.as_deref(), Some("req-1"));
    }
}
